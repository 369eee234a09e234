//! Configuration system for the orbiting text scene.
//!
//! Provides the scene options value passed into the scene at construction and
//! on runtime updates, plus window/asset/debug settings that persist to disk as
//! RON. Supports CLI overrides via clap and hot-reload detection.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{AssetConfig, Config, DebugConfig, SceneOptions, WindowConfig, parse_hex_color};
pub use error::ConfigError;
