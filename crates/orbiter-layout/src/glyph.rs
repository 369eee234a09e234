//! Glyph geometry produced by extrusion, and the bounding-box recentering
//! every glyph goes through before it is placed on the orbit.

use glam::Vec3;

/// A single vertex of an extruded glyph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphVertex {
    /// Position in glyph-local coordinates.
    pub position: [f32; 3],
    /// Face normal.
    pub normal: [f32; 3],
}

/// Triangle mesh of one extruded glyph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphMesh {
    /// Vertex buffer.
    pub vertices: Vec<GlyphVertex>,
    /// Index buffer (triangles, 3 indices per triangle).
    pub indices: Vec<u32>,
}

/// Axis-aligned bounds of a glyph mesh.
///
/// Invariant: `min <= max` on every axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Midpoint of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Edge lengths of the box.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Produces a 3D solid for a single character.
///
/// Whitespace and characters the extruder does not know produce an empty mesh.
pub trait GlyphExtruder {
    /// Extrude `ch` to `depth` units along +Z.
    fn extrude(&self, ch: char, depth: f32) -> GlyphMesh;
}

impl GlyphMesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the mesh has no triangles (whitespace glyphs).
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Pushes a quad given its corners in counter-clockwise order as seen
    /// from the side `normal` points to.
    pub fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3) {
        let base = self.vertices.len() as u32;
        self.vertices
            .extend(corners.iter().map(|c| GlyphVertex {
                position: c.to_array(),
                normal: normal.to_array(),
            }));
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    /// Bounds of all vertices, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut iter = self.vertices.iter().map(|v| Vec3::from_array(v.position));
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Bounds { min, max })
    }

    /// Moves every vertex by `offset`.
    pub fn translate(&mut self, offset: Vec3) {
        for v in &mut self.vertices {
            v.position = (Vec3::from_array(v.position) + offset).to_array();
        }
    }

    /// Moves the mesh so the center of its own bounds sits at the origin.
    ///
    /// Returns the translation that was applied (zero for an empty mesh).
    pub fn recenter(&mut self) -> Vec3 {
        let Some(bounds) = self.bounds() else {
            return Vec3::ZERO;
        };
        let offset = -bounds.center();
        self.translate(offset);
        offset
    }
}
