//! Scene error types.

use std::path::PathBuf;

use orbiter_config::ConfigError;
use orbiter_layout::{FontError, LayoutError};
use thiserror::Error;

/// Failure while fetching a texture or the font.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The image file could not be opened or decoded.
    #[error("failed to load texture {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The font file could not be read or parsed.
    #[error("failed to load font {path}: {source}")]
    Font {
        path: PathBuf,
        #[source]
        source: FontError,
    },

    /// A loader thread panicked before delivering its asset.
    #[error("asset loader for `{0}` panicked")]
    LoaderPanicked(String),
}

/// Errors reported by a [`RenderSurface`](crate::RenderSurface).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The surface was lost and must be recreated.
    #[error("render surface lost")]
    Lost,
    /// Out of GPU memory.
    #[error("out of GPU memory")]
    OutOfMemory,
    /// Any other backend failure.
    #[error("render backend error: {0}")]
    Backend(String),
}

/// Errors surfaced by the scene.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    Options(#[from] ConfigError),

    #[error("letter layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("asset loading failed: {0}")]
    Asset(#[from] AssetError),

    #[error("rendering failed: {0}")]
    Surface(#[from] SurfaceError),

    /// `tick` was called after the loop stopped or the scene was disposed.
    #[error("scene is not running")]
    NotRunning,
}
