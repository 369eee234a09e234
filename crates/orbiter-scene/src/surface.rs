//! The rendering collaborator the scene draws through.

use orbiter_layout::GlyphMesh;

use crate::assets::{TextureData, TextureSlot};
use crate::error::SurfaceError;
use crate::frame::Frame;

/// A drawable target with its own GPU-side resources.
///
/// Letter meshes are owned by the scene once uploaded. Dropping a
/// `LetterMesh` must release its geometry and material.
pub trait RenderSurface {
    type LetterMesh;

    /// Current drawable size in pixels.
    fn size(&self) -> (u32, u32);

    /// Highest anisotropic filtering level the device supports, 1 if none.
    fn max_anisotropy(&self) -> u16;

    /// Match the drawable to a new window size. Zero sizes must be accepted.
    fn resize(&mut self, width: u32, height: u32);

    /// Upload the configured scene textures.
    fn install_textures(&mut self, textures: &[(TextureSlot, TextureData)]) -> Result<(), SurfaceError>;

    /// Upload one recentered glyph. Empty meshes (spaces) are valid.
    fn upload_letter(&mut self, mesh: &GlyphMesh) -> Result<Self::LetterMesh, SurfaceError>;

    /// Draw one frame.
    fn render(&mut self, frame: &Frame<'_, Self::LetterMesh>) -> Result<(), SurfaceError>;

    /// Free every remaining resource. Called once, after all letter meshes
    /// have been dropped.
    fn release(&mut self);
}
