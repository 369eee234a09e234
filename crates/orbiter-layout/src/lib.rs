//! Orbit layout: places extruded letter glyphs on a tilted, vertically warped
//! circle around the origin.
//!
//! [`compute_layout`] is a pure function of its [`LayoutParams`]; calling it
//! twice with the same input yields bit-identical transforms. Glyph geometry
//! comes from a [`GlyphExtruder`] and is always recentered on its own bounds
//! before placement.

pub mod error;
pub mod font;
pub mod glyph;
pub mod layout;

pub use error::{FontError, LayoutError};
pub use font::BlockFont;
pub use glyph::{Bounds, GlyphExtruder, GlyphMesh, GlyphVertex};
pub use layout::{LayoutParams, LetterTransform, PlacedGlyph, compute_layout, layout_glyphs};
