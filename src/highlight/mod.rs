//! Tokenizer boundary: raw code in, coloured token lines out.

/// syntect-backed tokenizer.
pub mod syntax;
/// Token types, the `Tokenizer` trait and the plain-text fallback.
pub mod tokenizer;
