//! The `orbiter` binary: text orbiting a planet.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags,
//! e.g. `orbiter --word "Hello " --repeats 3 --assets ./assets`.

use std::process::ExitCode;

use clap::Parser;
use orbiter_app::platform::PlatformDirs;
use orbiter_app::window;
use orbiter_config::{CliArgs, Config};
use orbiter_scene::{AssetManifest, DirAssetSource, load_assets};
use tracing::{error, info};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let dirs = match args.config.clone() {
        Some(dir) => PlatformDirs::with_config_dir(dir),
        None => match PlatformDirs::resolve() {
            Ok(dirs) => dirs,
            Err(e) => {
                eprintln!("Failed to resolve platform directories: {e}");
                return ExitCode::FAILURE;
            }
        },
    };

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&dirs.config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    orbiter_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    info!("Config directory: {}", dirs.config_dir.display());

    if let Err(e) = config.scene.validate() {
        error!("Invalid scene options: {e}");
        return ExitCode::FAILURE;
    }

    let source = DirAssetSource::new(config.assets.base_dir.clone());
    let manifest = AssetManifest::from_config(&config.assets);
    info!(
        "Loading {} textures and font from {}",
        manifest.textures.len(),
        source.base_dir().display()
    );
    let assets = match load_assets(&source, &manifest) {
        Ok(assets) => assets,
        Err(e) => {
            error!("Asset loading failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    match window::run(config, dirs.config_dir, args, assets) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
