//! The orbiting text scene: letter group lifecycle, per-frame animation,
//! celestial bodies and the collaborator contracts (assets, render surface)
//! the scene is driven through.

pub mod animation;
pub mod assets;
pub mod billboard;
pub mod camera;
pub mod celestial;
pub mod color;
pub mod error;
pub mod frame;
pub mod letters;
pub mod scene;
pub mod surface;

#[cfg(test)]
pub(crate) mod testing;

pub use animation::{AnimationState, letter_hue, wrap_hue};
pub use assets::{
    AssetManifest, AssetSource, ColorSpace, DirAssetSource, LoadedAssets, TextureData,
    TextureMapping, TextureSettings, TextureSlot, WrapMode, configure_texture, load_assets,
};
pub use billboard::{face_towards, local_facing};
pub use camera::Camera;
pub use celestial::{BodyKind, CelestialBody, Material, apply_options, default_bodies};
pub use color::Rgb;
pub use error::{AssetError, SceneError, SurfaceError};
pub use frame::{BodyDraw, Frame, LetterDraw, Lighting};
pub use letters::{Letter, LetterGroup};
pub use scene::{OrbitingTextScene, SceneStatus};
pub use surface::RenderSurface;
