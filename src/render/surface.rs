use crate::foundation::error::{MagicMoveError, MagicMoveResult};

/// Rendered frame pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Raw RGBA8 bytes in row-major order.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Premultiplied RGBA8 of the pixel at `(x, y)`, if inside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy suitable for PNG output.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        if !self.premultiplied {
            return self.data.clone();
        }
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}

/// Raster target the frame renderer paints into.
pub struct Surface {
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl Surface {
    /// Allocate a transparent surface.
    pub fn new(width: u32, height: u32) -> MagicMoveResult<Self> {
        let (w, h) = checked_dims(width, height)?;
        Ok(Self {
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    /// Current width as allocated.
    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    /// Current height as allocated.
    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    /// Reallocate when the size changes; contents are discarded in that case.
    pub fn resize(&mut self, width: u32, height: u32) -> MagicMoveResult<()> {
        if width == self.width() && height == self.height() {
            return Ok(());
        }
        let (w, h) = checked_dims(width, height)?;
        self.pixmap = vello_cpu::Pixmap::new(w, h);
        Ok(())
    }

    /// Copy out the current pixels (premultiplied).
    pub fn to_frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.width(),
            height: self.height(),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut vello_cpu::Pixmap {
        &mut self.pixmap
    }
}

fn checked_dims(width: u32, height: u32) -> MagicMoveResult<(u16, u16)> {
    if width == 0 || height == 0 {
        return Err(MagicMoveError::layout("surface width/height must be non-zero"));
    }
    let w: u16 = width
        .try_into()
        .map_err(|_| MagicMoveError::layout(format!("surface width {width} exceeds u16")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| MagicMoveError::layout(format!("surface height {height} exceeds u16")))?;
    Ok((w, h))
}
