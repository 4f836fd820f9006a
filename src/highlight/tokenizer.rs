use crate::foundation::core::Rgb8;

/// Background used when a theme does not declare one.
pub const FALLBACK_BACKGROUND: Rgb8 = Rgb8::new(0x12, 0x14, 0x1c);
/// Foreground used by the plain-text tokenizer and themes without a foreground.
pub const FALLBACK_FOREGROUND: Rgb8 = Rgb8::new(0xd8, 0xde, 0xe9);

/// One coloured run of source text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Text content, never containing a newline.
    pub text: String,
    /// Foreground colour.
    pub color: Rgb8,
}

/// Tokens of one source line, left to right.
pub type TokenLine = Vec<Token>;

/// Whether a theme is dark or light; drives auxiliary colours such as gutter numerals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeVariant {
    /// Light text on a dark background.
    Dark,
    /// Dark text on a light background.
    Light,
}

impl ThemeVariant {
    /// Classify a background colour by luminance.
    pub fn from_background(bg: Rgb8) -> Self {
        if bg.luminance() < 0.5 {
            Self::Dark
        } else {
            Self::Light
        }
    }

    /// Colour used for line-number numerals.
    pub fn gutter_color(self) -> Rgb8 {
        match self {
            Self::Dark => Rgb8::new(0x6b, 0x73, 0x85),
            Self::Light => Rgb8::new(0x9a, 0xa0, 0xa6),
        }
    }
}

/// Tokenizer output for one step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighlightedCode {
    /// One entry per `\n`-separated source line.
    pub lines: Vec<TokenLine>,
    /// Theme background.
    pub background: Rgb8,
}

impl HighlightedCode {
    /// Dark/light classification of the background.
    pub fn variant(&self) -> ThemeVariant {
        ThemeVariant::from_background(self.background)
    }

    /// Total number of tokens across all lines.
    pub fn token_count(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }
}

/// Turns raw code into coloured token lines.
///
/// Implementations must never fail: unsupported languages or themes fall back to plain text.
pub trait Tokenizer {
    /// Tokenize `code` written in `language` using `theme`.
    fn tokenize(&mut self, code: &str, language: &str, theme: &str) -> HighlightedCode;
}

/// Tokenizer that emits each line as a single uncoloured token.
#[derive(Clone, Copy, Debug)]
pub struct PlainTokenizer {
    /// Token colour.
    pub foreground: Rgb8,
    /// Reported background.
    pub background: Rgb8,
}

impl Default for PlainTokenizer {
    fn default() -> Self {
        Self {
            foreground: FALLBACK_FOREGROUND,
            background: FALLBACK_BACKGROUND,
        }
    }
}

impl Tokenizer for PlainTokenizer {
    fn tokenize(&mut self, code: &str, _language: &str, _theme: &str) -> HighlightedCode {
        plain_lines(code, self.foreground, self.background)
    }
}

/// Split code into lines and emit one token per non-empty line.
pub(crate) fn plain_lines(code: &str, foreground: Rgb8, background: Rgb8) -> HighlightedCode {
    let lines = source_lines(code)
        .map(|line| {
            if line.is_empty() {
                Vec::new()
            } else {
                vec![Token {
                    text: line.to_owned(),
                    color: foreground,
                }]
            }
        })
        .collect();
    HighlightedCode { lines, background }
}

/// `\n`-separated lines with a trailing `\r` removed; empty code yields one empty line.
pub(crate) fn source_lines(code: &str) -> impl Iterator<Item = &str> {
    code.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}
