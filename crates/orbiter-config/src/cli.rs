//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Orbiter command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orbiter", about = "Text orbiting a planet")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Word repeated around the orbit.
    #[arg(long)]
    pub word: Option<String>,

    /// Number of times the word is repeated.
    #[arg(long)]
    pub repeats: Option<u32>,

    /// Orbit tilt in degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub tilt_deg: Option<f32>,

    /// Rotation speed of the letter group (radians per second).
    #[arg(long, allow_negative_numbers = true)]
    pub speed: Option<f32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding textures and the font.
    #[arg(long)]
    pub assets: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(ref word) = args.word {
            self.scene.word = word.clone();
        }
        if let Some(repeats) = args.repeats {
            self.scene.repeats = repeats;
        }
        if let Some(tilt) = args.tilt_deg {
            self.scene.tilt_deg = tilt;
        }
        if let Some(speed) = args.speed {
            self.scene.speed = speed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(ref dir) = args.assets {
            self.assets.base_dir = dir.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1920),
            word: Some("HELLO ".to_string()),
            speed: Some(0.3),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.scene.word, "HELLO ");
        assert_eq!(config.scene.speed, 0.3);
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 720);
        assert_eq!(config.scene.repeats, 2);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_negative_speed() {
        let args = CliArgs::parse_from(["orbiter", "--speed", "-1.5", "--repeats", "3"]);
        assert_eq!(args.speed, Some(-1.5));
        assert_eq!(args.repeats, Some(3));
    }
}
