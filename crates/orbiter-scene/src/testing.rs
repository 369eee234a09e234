//! In-memory collaborators for scene tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use orbiter_layout::{BlockFont, GlyphMesh};

use crate::assets::{AssetManifest, AssetSource, TextureData, TextureSettings, TextureSlot};
use crate::color::Rgb;
use crate::error::{AssetError, SurfaceError};
use crate::frame::Frame;
use crate::surface::RenderSurface;

pub const TEST_FONT: &str = r####"(
    name: "test",
    size: 6.0,
    rows: 3,
    glyphs: {
        'A': [".#.", "###", "#.#"],
        'B': ["##.", "###", "##."],
        'O': ["###", "#.#", "###"],
    },
)"####;

pub fn test_font() -> BlockFont {
    BlockFont::from_ron_str(TEST_FONT).unwrap()
}

/// What the recording surface has seen so far.
#[derive(Clone, Debug, Default)]
pub struct SurfaceStats {
    pub uploads: usize,
    pub releases: usize,
    pub renders: usize,
    pub resizes: Vec<(u32, u32)>,
    pub textures: Vec<TextureSlot>,
    pub texture_settings: Vec<TextureSettings>,
    pub surface_released: usize,
    pub last_letter_colors: Vec<Rgb>,
    pub last_body_count: usize,
}

impl SurfaceStats {
    pub fn live_meshes(&self) -> usize {
        self.uploads - self.releases
    }
}

/// Stand-in for an uploaded glyph; reports its own release.
#[derive(Debug)]
pub struct RecordingMesh {
    pub triangles: usize,
    stats: Rc<RefCell<SurfaceStats>>,
}

impl Drop for RecordingMesh {
    fn drop(&mut self) {
        self.stats.borrow_mut().releases += 1;
    }
}

pub struct RecordingSurface {
    size: (u32, u32),
    stats: Rc<RefCell<SurfaceStats>>,
    upload_budget: Option<usize>,
    fail_render_at: Option<usize>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            stats: Rc::default(),
            upload_budget: None,
            fail_render_at: None,
        }
    }

    /// Let `count` more uploads succeed, then fail.
    pub fn fail_upload_after(&mut self, count: usize) {
        self.upload_budget = Some(count);
    }

    /// Fail the render call with this (zero-based) index.
    pub fn fail_render_at(&mut self, render: usize) {
        self.fail_render_at = Some(render);
    }

    /// Shared handle, readable after the surface moved into a scene.
    pub fn stats_handle(&self) -> Rc<RefCell<SurfaceStats>> {
        Rc::clone(&self.stats)
    }

    pub fn stats(&self) -> SurfaceStats {
        self.stats.borrow().clone()
    }
}

impl RenderSurface for RecordingSurface {
    type LetterMesh = RecordingMesh;

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn max_anisotropy(&self) -> u16 {
        16
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.stats.borrow_mut().resizes.push((width, height));
    }

    fn install_textures(&mut self, textures: &[(TextureSlot, TextureData)]) -> Result<(), SurfaceError> {
        let mut stats = self.stats.borrow_mut();
        for (slot, texture) in textures {
            stats.textures.push(*slot);
            stats.texture_settings.push(texture.settings);
        }
        Ok(())
    }

    fn upload_letter(&mut self, mesh: &GlyphMesh) -> Result<RecordingMesh, SurfaceError> {
        if let Some(budget) = &mut self.upload_budget {
            if *budget == 0 {
                return Err(SurfaceError::OutOfMemory);
            }
            *budget -= 1;
        }
        self.stats.borrow_mut().uploads += 1;
        Ok(RecordingMesh {
            triangles: mesh.triangle_count(),
            stats: Rc::clone(&self.stats),
        })
    }

    fn render(&mut self, frame: &Frame<'_, RecordingMesh>) -> Result<(), SurfaceError> {
        let mut stats = self.stats.borrow_mut();
        if self.fail_render_at == Some(stats.renders) {
            return Err(SurfaceError::Backend("injected failure".into()));
        }
        stats.renders += 1;
        stats.last_letter_colors = frame.letters.iter().map(|l| l.color).collect();
        stats.last_body_count = frame.bodies.len();
        Ok(())
    }

    fn release(&mut self) {
        self.stats.borrow_mut().surface_released += 1;
    }
}

/// Asset source backed by in-memory maps; counts every fetch.
pub struct MemoryAssets {
    pub textures: HashMap<String, TextureData>,
    pub font: Option<BlockFont>,
    fetches: AtomicUsize,
}

impl MemoryAssets {
    pub fn texture(name: &str) -> TextureData {
        TextureData {
            name: name.to_string(),
            width: 2,
            height: 1,
            rgba: vec![255; 8],
            settings: TextureSettings::default(),
        }
    }

    /// A source holding everything `manifest` asks for.
    pub fn complete(manifest: &AssetManifest) -> Self {
        Self {
            textures: manifest
                .textures
                .iter()
                .map(|(_, id)| (id.clone(), Self::texture(id)))
                .collect(),
            font: Some(test_font()),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn not_found(id: &str) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, id.to_string())
    }
}

impl AssetSource for MemoryAssets {
    fn fetch_texture(&self, id: &str) -> Result<TextureData, AssetError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.textures.get(id).cloned().ok_or_else(|| AssetError::Image {
            path: id.into(),
            source: image::ImageError::IoError(Self::not_found(id)),
        })
    }

    fn fetch_font(&self, id: &str) -> Result<BlockFont, AssetError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.font.clone().ok_or_else(|| AssetError::Font {
            path: id.into(),
            source: orbiter_layout::FontError::Io(Self::not_found(id)),
        })
    }
}
