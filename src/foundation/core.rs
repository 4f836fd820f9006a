use crate::foundation::error::{MagicMoveError, MagicMoveResult};

/// Absolute 0-based frame index in export timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> MagicMoveResult<Self> {
        if den == 0 {
            return Err(MagicMoveError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(MagicMoveError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in milliseconds.
    pub fn frame_duration_ms(self) -> f64 {
        1000.0 * f64::from(self.den) / f64::from(self.num)
    }

    /// Timeline position of frame `idx` in milliseconds.
    pub fn frame_to_ms(self, idx: FrameIndex) -> f64 {
        (idx.0 as f64) * 1000.0 * f64::from(self.den) / f64::from(self.num)
    }

    /// Number of frames needed to cover `ms` milliseconds (ceil semantics).
    pub fn ms_to_frames_ceil(self, ms: f64) -> u64 {
        if !ms.is_finite() || ms <= 0.0 {
            return 0;
        }
        (ms * f64::from(self.num) / (1000.0 * f64::from(self.den))).ceil() as u64
    }
}

/// Opaque sRGB colour as produced by the tokenizer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Build a colour from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (leading `#` optional, case-insensitive).
    pub fn from_hex(s: &str) -> MagicMoveResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.is_ascii() {
            return Err(MagicMoveError::validation(
                "hex color must be #RRGGBB (case-insensitive)",
            ));
        }

        fn hex_byte(pair: &str) -> MagicMoveResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| MagicMoveError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        Ok(Self {
            r: hex_byte(&s[0..2])?,
            g: hex_byte(&s[2..4])?,
            b: hex_byte(&s[4..6])?,
        })
    }

    /// Relative luminance in `[0, 1]` (Rec. 709 weights on gamma-encoded channels).
    pub fn luminance(self) -> f64 {
        (0.2126 * f64::from(self.r) + 0.7152 * f64::from(self.g) + 0.0722 * f64::from(self.b))
            / 255.0
    }

    /// Straight-alpha RGBA8 with the given opacity in `[0, 1]`.
    pub fn to_rgba8(self, opacity: f64) -> [u8; 4] {
        let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        [self.r, self.g, self.b, a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
