use crate::foundation::error::{MagicMoveError, MagicMoveResult};
use anyhow::Context as _;
use std::path::Path;
use std::sync::Arc;

/// Font bytes shared by the shaper and the rasterizer.
#[derive(Clone)]
pub struct FontFace {
    /// Raw font file contents.
    pub bytes: Arc<Vec<u8>>,
    /// Face index inside a collection file.
    pub index: u32,
    /// Where the face came from, for logs.
    pub source: String,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .field("source", &self.source)
            .finish()
    }
}

impl FontFace {
    /// Wrap font bytes that are already in memory.
    pub fn from_bytes(bytes: Vec<u8>, index: u32, source: impl Into<String>) -> Self {
        Self {
            bytes: Arc::new(bytes),
            index,
            source: source.into(),
        }
    }

    /// Read a `.ttf`/`.otf`/`.ttc` file (face 0).
    pub fn from_path(path: &Path) -> MagicMoveResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font file '{}'", path.display()))?;
        if bytes.is_empty() {
            return Err(MagicMoveError::layout(format!(
                "font file '{}' is empty",
                path.display()
            )));
        }
        Ok(Self::from_bytes(bytes, 0, path.display().to_string()))
    }

    /// First monospace face installed on the system.
    pub fn system_monospace() -> MagicMoveResult<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();

        let query = usvg::fontdb::Query {
            families: &[usvg::fontdb::Family::Monospace],
            ..Default::default()
        };
        let id = db
            .query(&query)
            .or_else(|| db.faces().find(|f| f.monospaced).map(|f| f.id))
            .ok_or_else(|| MagicMoveError::layout("no monospace font found on this system"))?;

        let source = db
            .face(id)
            .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_else(|| "system monospace".to_owned());
        let (bytes, index) = db
            .with_face_data(id, |data, index| (data.to_vec(), index))
            .ok_or_else(|| MagicMoveError::layout("system font data is unavailable"))?;

        tracing::debug!(font = %source, "using system monospace font");
        Ok(Self::from_bytes(bytes, index, source))
    }

    /// `path` when given, else the system monospace face.
    pub fn resolve(path: Option<&Path>) -> MagicMoveResult<Self> {
        match path {
            Some(p) => Self::from_path(p),
            None => Self::system_monospace(),
        }
    }
}
