//! Block font: a bitmap font whose filled cells extrude into cuboids.
//!
//! Fonts are stored as RON:
//!
//! ```ron
//! (
//!     name: "block",
//!     size: 6.0,
//!     rows: 7,
//!     glyphs: {
//!         'I': ["###", ".#.", ".#.", ".#.", ".#.", ".#.", "###"],
//!     },
//! )
//! ```
//!
//! Every glyph has exactly `rows` strings of equal width; `#` marks a filled
//! cell, anything else is empty. Row 0 is the top of the glyph.

use std::collections::BTreeMap;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::FontError;
use crate::glyph::{GlyphExtruder, GlyphMesh};

/// Marker for a filled bitmap cell.
const FILLED: u8 = b'#';

/// A bitmap font used as the glyph extrusion source.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BlockFont {
    /// Human-readable font name.
    pub name: String,
    /// Glyph height in world units.
    pub size: f32,
    /// Bitmap rows per glyph.
    pub rows: usize,
    /// Glyph bitmaps keyed by character.
    pub glyphs: BTreeMap<char, Vec<String>>,
}

impl BlockFont {
    /// Parse and validate a font from RON text.
    pub fn from_ron_str(source: &str) -> Result<Self, FontError> {
        let font: BlockFont = ron::from_str(source)?;
        font.validate()?;
        Ok(font)
    }

    /// Read, parse and validate a font file.
    pub fn load(path: &Path) -> Result<Self, FontError> {
        let source = std::fs::read_to_string(path)?;
        let font = Self::from_ron_str(&source)?;
        log::info!(
            "Loaded font '{}' ({} glyphs) from {}",
            font.name,
            font.glyphs.len(),
            path.display()
        );
        Ok(font)
    }

    /// Check that the metrics are usable and every glyph matches them.
    pub fn validate(&self) -> Result<(), FontError> {
        if self.rows == 0 {
            return Err(FontError::Metrics("rows must be at least 1".into()));
        }
        if !(self.size > 0.0) {
            return Err(FontError::Metrics(format!("size {} is not positive", self.size)));
        }
        for (&ch, bitmap) in &self.glyphs {
            if bitmap.len() != self.rows {
                return Err(FontError::MalformedGlyph {
                    ch,
                    reason: format!("{} rows, expected {}", bitmap.len(), self.rows),
                });
            }
            let width = bitmap[0].len();
            if bitmap.iter().any(|row| row.len() != width) {
                return Err(FontError::MalformedGlyph {
                    ch,
                    reason: "rows have different widths".into(),
                });
            }
        }
        Ok(())
    }

    /// Edge length of one bitmap cell in world units.
    pub fn cell_size(&self) -> f32 {
        self.size / self.rows as f32
    }

    /// Returns `true` if the font has a bitmap for `ch`.
    pub fn has_glyph(&self, ch: char) -> bool {
        self.glyphs.contains_key(&ch)
    }

    fn filled(bitmap: &[String], col: isize, row: isize) -> bool {
        if col < 0 || row < 0 {
            return false;
        }
        bitmap
            .get(row as usize)
            .and_then(|line| line.as_bytes().get(col as usize))
            .is_some_and(|&cell| cell == FILLED)
    }
}

impl GlyphExtruder for BlockFont {
    /// Each filled cell becomes a cuboid spanning `z = 0..depth`. Faces shared
    /// between two filled cells are not emitted. With `depth == 0` only the
    /// front and back caps remain.
    fn extrude(&self, ch: char, depth: f32) -> GlyphMesh {
        let mut mesh = GlyphMesh::new();
        if ch.is_whitespace() {
            return mesh;
        }
        let Some(bitmap) = self.glyphs.get(&ch) else {
            log::debug!("Font '{}' has no glyph for {ch:?}, leaving slot empty", self.name);
            return mesh;
        };

        let cell = self.cell_size();
        let depth = depth.max(0.0);
        let (z0, z1) = (0.0, depth);

        for (row, line) in bitmap.iter().enumerate() {
            for (col, &byte) in line.as_bytes().iter().enumerate() {
                if byte != FILLED {
                    continue;
                }
                let x0 = col as f32 * cell;
                let x1 = x0 + cell;
                let y0 = (self.rows - 1 - row) as f32 * cell;
                let y1 = y0 + cell;
                let (c, r) = (col as isize, row as isize);

                // Front (+Z) and back (-Z) caps.
                mesh.push_quad(
                    [
                        Vec3::new(x0, y0, z1),
                        Vec3::new(x1, y0, z1),
                        Vec3::new(x1, y1, z1),
                        Vec3::new(x0, y1, z1),
                    ],
                    Vec3::Z,
                );
                mesh.push_quad(
                    [
                        Vec3::new(x1, y0, z0),
                        Vec3::new(x0, y0, z0),
                        Vec3::new(x0, y1, z0),
                        Vec3::new(x1, y1, z0),
                    ],
                    Vec3::NEG_Z,
                );

                if depth <= 0.0 {
                    continue;
                }

                if !Self::filled(bitmap, c + 1, r) {
                    mesh.push_quad(
                        [
                            Vec3::new(x1, y0, z1),
                            Vec3::new(x1, y0, z0),
                            Vec3::new(x1, y1, z0),
                            Vec3::new(x1, y1, z1),
                        ],
                        Vec3::X,
                    );
                }
                if !Self::filled(bitmap, c - 1, r) {
                    mesh.push_quad(
                        [
                            Vec3::new(x0, y0, z0),
                            Vec3::new(x0, y0, z1),
                            Vec3::new(x0, y1, z1),
                            Vec3::new(x0, y1, z0),
                        ],
                        Vec3::NEG_X,
                    );
                }
                // Row 0 is the top, so the cell above is row - 1.
                if !Self::filled(bitmap, c, r - 1) {
                    mesh.push_quad(
                        [
                            Vec3::new(x0, y1, z1),
                            Vec3::new(x1, y1, z1),
                            Vec3::new(x1, y1, z0),
                            Vec3::new(x0, y1, z0),
                        ],
                        Vec3::Y,
                    );
                }
                if !Self::filled(bitmap, c, r + 1) {
                    mesh.push_quad(
                        [
                            Vec3::new(x0, y0, z0),
                            Vec3::new(x1, y0, z0),
                            Vec3::new(x1, y0, z1),
                            Vec3::new(x0, y0, z1),
                        ],
                        Vec3::NEG_Y,
                    );
                }
            }
        }

        mesh
    }
}
