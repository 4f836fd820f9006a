use crate::foundation::core::Rgb8;
use crate::highlight::tokenizer::{
    FALLBACK_BACKGROUND, FALLBACK_FOREGROUND, HighlightedCode, Token, Tokenizer, plain_lines,
    source_lines,
};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};

/// Theme used when the requested theme is unknown.
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Languages the bundled grammars lack, mapped onto the closest grammar token.
const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("ts", "js"),
    ("typescript", "js"),
    ("tsx", "js"),
    ("jsx", "js"),
    ("mts", "js"),
    ("cts", "js"),
    ("vue", "html"),
    ("shell", "sh"),
    ("bash", "sh"),
    ("zsh", "sh"),
    ("console", "sh"),
    ("yml", "yaml"),
    ("rs", "rust"),
    ("py", "python"),
];

/// [`Tokenizer`] backed by syntect's bundled grammars and themes.
pub struct SyntectTokenizer {
    syntaxes: SyntaxSet,
    themes: ThemeSet,
}

impl Default for SyntectTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntectTokenizer {
    /// Load the bundled syntax definitions and themes.
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            themes: ThemeSet::load_defaults(),
        }
    }

    /// Names of the available themes, sorted.
    pub fn theme_names(&self) -> Vec<&str> {
        self.themes.themes.keys().map(String::as_str).collect()
    }

    fn resolve_theme(&self, name: &str) -> Option<&Theme> {
        if let Some(theme) = self.themes.themes.get(name) {
            return Some(theme);
        }
        tracing::warn!(theme = name, "unknown theme, using {DEFAULT_THEME}");
        self.themes
            .themes
            .get(DEFAULT_THEME)
            .or_else(|| self.themes.themes.values().next())
    }

    fn resolve_syntax(&self, language: &str) -> Option<&SyntaxReference> {
        let lang = language.trim().to_ascii_lowercase();
        if lang.is_empty() || lang == "text" || lang == "plaintext" || lang == "txt" {
            return None;
        }
        let lang = LANGUAGE_ALIASES
            .iter()
            .find(|(from, _)| *from == lang)
            .map_or(lang.as_str(), |(_, to)| *to);
        self.syntaxes
            .find_syntax_by_token(lang)
            .or_else(|| self.syntaxes.find_syntax_by_name(language.trim()))
    }
}

impl Tokenizer for SyntectTokenizer {
    fn tokenize(&mut self, code: &str, language: &str, theme: &str) -> HighlightedCode {
        let Some(theme) = self.resolve_theme(theme) else {
            return plain_lines(code, FALLBACK_FOREGROUND, FALLBACK_BACKGROUND);
        };
        let background = theme
            .settings
            .background
            .map_or(FALLBACK_BACKGROUND, to_rgb8);
        let foreground = theme
            .settings
            .foreground
            .map_or(FALLBACK_FOREGROUND, to_rgb8);

        let Some(syntax) = self.resolve_syntax(language) else {
            tracing::debug!(language, "no grammar for language, using plain text");
            return plain_lines(code, foreground, background);
        };

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut lines = Vec::new();
        for line in source_lines(code) {
            let with_newline = format!("{line}\n");
            let regions = match highlighter.highlight_line(&with_newline, &self.syntaxes) {
                Ok(regions) => regions,
                Err(e) => {
                    tracing::debug!(language, error = %e, "highlighting failed, using plain text");
                    return plain_lines(code, foreground, background);
                }
            };
            let tokens = regions
                .into_iter()
                .filter_map(|(style, text)| {
                    let text = text.trim_end_matches(['\n', '\r']);
                    (!text.is_empty()).then(|| Token {
                        text: text.to_owned(),
                        color: to_rgb8(style.foreground),
                    })
                })
                .collect();
            lines.push(tokens);
        }

        HighlightedCode { lines, background }
    }
}

fn to_rgb8(c: Color) -> Rgb8 {
    Rgb8::new(c.r, c.g, c.b)
}

#[cfg(test)]
#[path = "../../tests/unit/highlight/syntax.rs"]
mod tests;
