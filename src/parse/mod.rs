//! Markdown magic-move block and step extraction.

/// Wrapper and step extraction.
pub mod blocks;
/// `{key:value,...}` metadata grammar.
pub mod meta;
