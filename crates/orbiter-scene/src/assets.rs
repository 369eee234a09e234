//! Asset loading: textures and the glyph font, fetched concurrently and
//! joined all-or-nothing before the scene is built.

use std::path::{Path, PathBuf};

use orbiter_config::AssetConfig;
use orbiter_layout::BlockFont;

use crate::error::AssetError;

/// The textures the scene uses, in load order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Sky,
    EarthMap,
    EarthNormal,
    EarthClouds,
    Moon,
    Mars,
    Jupiter,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 7] = [
        TextureSlot::Sky,
        TextureSlot::EarthMap,
        TextureSlot::EarthNormal,
        TextureSlot::EarthClouds,
        TextureSlot::Moon,
        TextureSlot::Mars,
        TextureSlot::Jupiter,
    ];

    /// Position of the slot in [`TextureSlot::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The sky is wrapped around the viewer; everything else is UV mapped.
    pub fn mapping(self) -> TextureMapping {
        match self {
            TextureSlot::Sky => TextureMapping::Equirectangular,
            _ => TextureMapping::Uv,
        }
    }

    fn file_name(self, config: &AssetConfig) -> &str {
        match self {
            TextureSlot::Sky => &config.sky,
            TextureSlot::EarthMap => &config.earth_map,
            TextureSlot::EarthNormal => &config.earth_normal,
            TextureSlot::EarthClouds => &config.earth_clouds,
            TextureSlot::Moon => &config.moon,
            TextureSlot::Mars => &config.mars,
            TextureSlot::Jupiter => &config.jupiter,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    Srgb,
    Linear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureMapping {
    Uv,
    Equirectangular,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WrapMode {
    ClampToEdge,
    Repeat,
}

/// Sampling configuration applied to a texture after it is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureSettings {
    pub color_space: ColorSpace,
    /// Anisotropic filtering level, 1 means off.
    pub anisotropy: u16,
    pub wrap: WrapMode,
    pub mapping: TextureMapping,
}

impl Default for TextureSettings {
    fn default() -> Self {
        Self {
            color_space: ColorSpace::Linear,
            anisotropy: 1,
            wrap: WrapMode::Repeat,
            mapping: TextureMapping::Uv,
        }
    }
}

/// Decoded RGBA8 pixels plus sampling settings.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    /// Identifier the texture was requested by.
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 rows.
    pub rgba: Vec<u8>,
    pub settings: TextureSettings,
}

/// Post-load configuration: sRGB colour space, the device's maximum
/// anisotropy, clamp-to-edge wrapping and the given mapping.
pub fn configure_texture(texture: &mut TextureData, mapping: TextureMapping, max_anisotropy: u16) {
    texture.settings = TextureSettings {
        color_space: ColorSpace::Srgb,
        anisotropy: max_anisotropy.max(1),
        wrap: WrapMode::ClampToEdge,
        mapping,
    };
}

/// Fetches raw assets by identifier.
///
/// Implementations are called from several loader threads at once.
pub trait AssetSource: Sync {
    fn fetch_texture(&self, id: &str) -> Result<TextureData, AssetError>;
    fn fetch_font(&self, id: &str) -> Result<BlockFont, AssetError>;
}

/// The full list of identifiers one scene needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetManifest {
    pub textures: Vec<(TextureSlot, String)>,
    pub font: String,
}

impl AssetManifest {
    pub fn from_config(config: &AssetConfig) -> Self {
        Self {
            textures: TextureSlot::ALL
                .iter()
                .map(|slot| (*slot, slot.file_name(config).to_string()))
                .collect(),
            font: config.font.clone(),
        }
    }
}

/// Everything the scene needs from disk, in manifest order.
#[derive(Debug)]
pub struct LoadedAssets {
    pub textures: Vec<(TextureSlot, TextureData)>,
    pub font: BlockFont,
}

impl LoadedAssets {
    /// Apply [`configure_texture`] to every texture using its slot's mapping.
    pub fn configure(&mut self, max_anisotropy: u16) {
        for (slot, texture) in &mut self.textures {
            configure_texture(texture, slot.mapping(), max_anisotropy);
        }
    }
}

/// Fetch every texture and the font on separate threads.
///
/// Completes only when all of them have; the first failure in manifest order
/// is returned and nothing partial is handed back.
pub fn load_assets(
    source: &dyn AssetSource,
    manifest: &AssetManifest,
) -> Result<LoadedAssets, AssetError> {
    std::thread::scope(|scope| {
        let texture_handles: Vec<_> = manifest
            .textures
            .iter()
            .map(|(slot, id)| {
                let handle = scope.spawn(move || source.fetch_texture(id));
                (*slot, id.as_str(), handle)
            })
            .collect();
        let font_handle = scope.spawn(|| source.fetch_font(&manifest.font));

        // Join everything before inspecting results so no loader outlives a failure.
        let joined: Vec<_> = texture_handles
            .into_iter()
            .map(|(slot, id, handle)| (slot, id, handle.join()))
            .collect();
        let font = font_handle.join();

        let mut textures = Vec::with_capacity(joined.len());
        for (slot, id, result) in joined {
            let texture = result.map_err(|_| AssetError::LoaderPanicked(id.to_string()))??;
            log::debug!("Loaded texture {id} ({}x{})", texture.width, texture.height);
            textures.push((slot, texture));
        }
        let font = font.map_err(|_| AssetError::LoaderPanicked(manifest.font.clone()))??;

        log::info!("Loaded {} textures and font '{}'", textures.len(), font.name);
        Ok(LoadedAssets { textures, font })
    })
}

/// Loads assets from files under a base directory.
#[derive(Clone, Debug)]
pub struct DirAssetSource {
    base_dir: PathBuf,
}

impl DirAssetSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl AssetSource for DirAssetSource {
    fn fetch_texture(&self, id: &str) -> Result<TextureData, AssetError> {
        let path = self.base_dir.join(id);
        let image = image::open(&path)
            .map_err(|source| AssetError::Image {
                path: path.clone(),
                source,
            })?
            .to_rgba8();
        let (width, height) = image.dimensions();
        Ok(TextureData {
            name: id.to_string(),
            width,
            height,
            rgba: image.into_raw(),
            settings: TextureSettings::default(),
        })
    }

    fn fetch_font(&self, id: &str) -> Result<BlockFont, AssetError> {
        let path = self.base_dir.join(id);
        BlockFont::load(&path).map_err(|source| AssetError::Font { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryAssets, test_font};

    fn manifest() -> AssetManifest {
        AssetManifest::from_config(&AssetConfig::default())
    }

    #[test]
    fn test_manifest_order_matches_slots() {
        let manifest = manifest();
        let slots: Vec<TextureSlot> = manifest.textures.iter().map(|(s, _)| *s).collect();
        assert_eq!(slots, TextureSlot::ALL);
        assert_eq!(manifest.textures[0].1, "milkyway.jpg");
        assert_eq!(manifest.font, "block_font.ron");
    }

    #[test]
    fn test_slot_index() {
        for (i, slot) in TextureSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), i);
        }
    }

    #[test]
    fn test_load_all_in_order() {
        let source = MemoryAssets::complete(&manifest());
        let loaded = load_assets(&source, &manifest()).unwrap();
        assert_eq!(loaded.textures.len(), TextureSlot::ALL.len());
        for ((slot, texture), (expected_slot, id)) in loaded.textures.iter().zip(&manifest().textures)
        {
            assert_eq!(slot, expected_slot);
            assert_eq!(&texture.name, id);
        }
        assert_eq!(loaded.font, test_font());
    }

    #[test]
    fn test_one_failure_fails_everything() {
        let mut source = MemoryAssets::complete(&manifest());
        source.textures.remove("earthnormal.jpg");
        assert!(load_assets(&source, &manifest()).is_err());
        // Every fetch was still attempted and joined.
        assert_eq!(source.fetch_count(), TextureSlot::ALL.len() + 1);
    }

    #[test]
    fn test_missing_font_fails() {
        let mut source = MemoryAssets::complete(&manifest());
        source.font = None;
        let err = load_assets(&source, &manifest()).unwrap_err();
        assert!(matches!(err, AssetError::Font { .. }));
    }

    #[test]
    fn test_configure_textures() {
        let source = MemoryAssets::complete(&manifest());
        let mut loaded = load_assets(&source, &manifest()).unwrap();
        loaded.configure(16);
        for (slot, texture) in &loaded.textures {
            assert_eq!(texture.settings.color_space, ColorSpace::Srgb);
            assert_eq!(texture.settings.anisotropy, 16);
            assert_eq!(texture.settings.wrap, WrapMode::ClampToEdge);
            assert_eq!(texture.settings.mapping, slot.mapping());
        }
        assert_eq!(
            loaded.textures[0].1.settings.mapping,
            TextureMapping::Equirectangular
        );
    }

    #[test]
    fn test_configure_without_anisotropy_support() {
        let mut texture = MemoryAssets::texture("x");
        configure_texture(&mut texture, TextureMapping::Uv, 0);
        assert_eq!(texture.settings.anisotropy, 1);
    }

    #[test]
    fn test_dir_source_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]))
            .save(dir.path().join("tiny.png"))
            .unwrap();
        std::fs::write(dir.path().join("font.ron"), crate::testing::TEST_FONT).unwrap();

        let source = DirAssetSource::new(dir.path());
        let texture = source.fetch_texture("tiny.png").unwrap();
        assert_eq!((texture.width, texture.height), (4, 2));
        assert_eq!(texture.rgba.len(), 4 * 2 * 4);
        assert_eq!(&texture.rgba[..4], &[10, 20, 30, 255]);
        assert_eq!(source.fetch_font("font.ron").unwrap(), test_font());
    }

    #[test]
    fn test_dir_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirAssetSource::new(dir.path());
        assert!(matches!(
            source.fetch_texture("nope.jpg"),
            Err(AssetError::Image { .. })
        ));
        assert!(matches!(
            source.fetch_font("nope.ron"),
            Err(AssetError::Font { .. })
        ));
    }
}
