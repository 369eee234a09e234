//! Layout and font error types.

/// Errors raised by [`compute_layout`](crate::compute_layout).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// The word/repeat combination yields no letters (or too many to index).
    #[error("invalid layout: {word_len} character(s) x {repeats} repeat(s)")]
    InvalidLayout { word_len: usize, repeats: u32 },

    /// The orbit radius is not a positive number.
    #[error("orbit radius must be positive, got {0}")]
    InvalidRadius(f32),

    /// The extrusion depth is negative or not a number.
    #[error("letter depth must be non-negative, got {0}")]
    InvalidDepth(f32),
}

/// Errors raised while loading a [`BlockFont`](crate::BlockFont).
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    /// The font file could not be read.
    #[error("failed to read font: {0}")]
    Io(#[from] std::io::Error),

    /// The font file is not valid RON.
    #[error("failed to parse font: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// The font declares no rows or a non-positive glyph size.
    #[error("font metrics invalid: {0}")]
    Metrics(String),

    /// A glyph bitmap does not match the font metrics.
    #[error("glyph {ch:?} is malformed: {reason}")]
    MalformedGlyph { ch: char, reason: String },
}
