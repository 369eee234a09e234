//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Orbiting text scene options.
    pub scene: SceneOptions,
    /// Asset locations.
    pub assets: AssetConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Options of the orbiting text scene.
///
/// Passed explicitly into the scene constructor and into runtime updates.
/// Changing any of `word`, `repeats`, `orbit_radius`, `tilt_deg` or
/// `letter_depth` forces a full letter-group rebuild.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneOptions {
    /// Text repeated around the orbit. Whitespace occupies a slot.
    pub word: String,
    /// How many times the word is repeated around one orbit.
    pub repeats: u32,
    /// Orbit tilt in degrees.
    pub tilt_deg: f32,
    /// Base letter colour as `#RRGGBB`.
    pub letter_color: String,
    /// Extrusion depth of every glyph.
    pub letter_depth: f32,
    /// Signed angular rate of the letter group in radians per second.
    pub speed: f32,
    /// Point light intensity.
    pub light_intensity: f32,
    /// Earth tint as `#RRGGBB`.
    pub sphere_color: String,
    /// Earth sphere radius.
    pub earth_radius: f32,
    /// Radius of the letter orbit.
    pub orbit_radius: f32,
    /// Cycle letter hue over time.
    pub change_hue: bool,
    /// Per-letter gradient strength (0 = every letter shares one hue).
    pub colour_letters: f32,
    /// Gradient spread; larger values make the gradient more gradual.
    pub colour_letters_offset: f32,
    /// Starting hue phase in `[0, 1)`.
    pub text_hue: f32,
    /// Hue phase advanced per second.
    pub text_hue_inc: f32,
}

/// Asset locations, relative to `base_dir`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory all other asset paths are resolved against.
    pub base_dir: PathBuf,
    /// Equirectangular sky texture.
    pub sky: String,
    /// Earth colour map.
    pub earth_map: String,
    /// Earth normal map.
    pub earth_normal: String,
    /// Earth cloud layer (with alpha).
    pub earth_clouds: String,
    /// Moon surface map.
    pub moon: String,
    /// Mars surface map.
    pub mars: String,
    /// Jupiter surface map.
    pub jupiter: String,
    /// Block font description (RON).
    pub font: String,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
            title: "Offero Orbiter".to_string(),
        }
    }
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            word: "Offero 04 ".to_string(),
            repeats: 2,
            tilt_deg: 45.0,
            letter_color: "#30FF30".to_string(),
            letter_depth: 1.8,
            speed: -0.6,
            light_intensity: 6000.0,
            sphere_color: "#999999".to_string(),
            earth_radius: 28.0,
            orbit_radius: 35.0,
            change_hue: true,
            colour_letters: 0.0,
            colour_letters_offset: 100.0,
            text_hue: 0.0,
            text_hue_inc: 0.01,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("assets"),
            sky: "milkyway.jpg".to_string(),
            earth_map: "earthmap.jpg".to_string(),
            earth_normal: "earthnormal.jpg".to_string(),
            earth_clouds: "earthclouds.png".to_string(),
            moon: "moonmap.jpg".to_string(),
            mars: "marsmap.jpg".to_string(),
            jupiter: "jupitermap.jpg".to_string(),
            font: "block_font.ron".to_string(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Scene option helpers ---

/// Parse a `#RRGGBB` colour into its three 8-bit channels.
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

impl SceneOptions {
    /// Check every option against its accepted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: String| ConfigError::InvalidValue { field, reason };

        if self.word.is_empty() {
            return Err(invalid("word", "must not be empty".into()));
        }
        if self.repeats == 0 {
            return Err(invalid("repeats", "must be at least 1".into()));
        }
        if !(self.orbit_radius > 0.0) {
            return Err(invalid("orbit_radius", format!("{} is not positive", self.orbit_radius)));
        }
        if !(self.letter_depth >= 0.0) {
            return Err(invalid("letter_depth", format!("{} is negative", self.letter_depth)));
        }
        if !(self.colour_letters_offset > 0.0) {
            return Err(invalid(
                "colour_letters_offset",
                format!("{} is not positive", self.colour_letters_offset),
            ));
        }
        if parse_hex_color(&self.letter_color).is_none() {
            return Err(invalid("letter_color", format!("`{}` is not #RRGGBB", self.letter_color)));
        }
        if parse_hex_color(&self.sphere_color).is_none() {
            return Err(invalid("sphere_color", format!("`{}` is not #RRGGBB", self.sphere_color)));
        }
        Ok(())
    }

    /// Returns `true` if switching from `self` to `other` changes letter placement.
    pub fn affects_layout(&self, other: &SceneOptions) -> bool {
        self.word != other.word
            || self.repeats != other.repeats
            || self.orbit_radius != other.orbit_radius
            || self.tilt_deg != other.tilt_deg
            || self.letter_depth != other.letter_depth
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
