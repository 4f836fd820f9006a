/// Convenience result type used across magic-move.
pub type MagicMoveResult<T> = Result<T, MagicMoveError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum MagicMoveError {
    /// Malformed or absent magic-move wrappers, missing steps or invalid step metadata.
    #[error("parse error: {0}")]
    Parse(String),

    /// The raster/text context needed to lay out or paint a step is unavailable.
    #[error("layout error: {0}")]
    Layout(String),

    /// The encoder rejected frames, ended early or the export was cancelled.
    #[error("export error: {0}")]
    Export(String),

    /// Invalid user-provided configuration or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MagicMoveError {
    /// Build a [`MagicMoveError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`MagicMoveError::Layout`] value.
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build a [`MagicMoveError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`MagicMoveError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
