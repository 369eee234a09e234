//! Window and event loop driving the orbiting text scene.
//!
//! Exactly one redraw is outstanding at a time: the scene schedules a frame
//! after each successful tick, and the handler requests the next redraw only
//! when that frame is pending.

use std::path::PathBuf;
use std::sync::Arc;

use orbiter_config::{CliArgs, Config};
use orbiter_render::GpuSurface;
use orbiter_scene::{LoadedAssets, OrbitingTextScene, SceneError};
use tracing::{error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::clock::FrameClock;

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
}

/// Errors that end the event loop before or while the scene runs.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("GPU initialization failed: {0}")]
    Gpu(#[from] orbiter_render::RenderContextError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("assets were already consumed by a previous scene")]
    AssetsConsumed,
}

/// Application state: configuration, window, and the scene once running.
pub struct OrbiterApp {
    config: Config,
    config_dir: PathBuf,
    overrides: CliArgs,
    assets: Option<LoadedAssets>,
    window: Option<Arc<Window>>,
    scene: Option<OrbitingTextScene<GpuSurface>>,
    clock: FrameClock,
    failure: Option<AppError>,
}

impl OrbiterApp {
    pub fn new(config: Config, config_dir: PathBuf, overrides: CliArgs, assets: LoadedAssets) -> Self {
        Self {
            config,
            config_dir,
            overrides,
            assets: Some(assets),
            window: None,
            scene: None,
            clock: FrameClock::new(),
            failure: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window = Arc::new(event_loop.create_window(window_attributes_from_config(&self.config))?);
        let surface = GpuSurface::new(window.clone(), self.config.window.vsync)?;
        let assets = self.assets.take().ok_or(AppError::AssetsConsumed)?;
        let scene = OrbitingTextScene::new(self.config.scene.clone(), assets, surface)?;

        self.clock.reset();
        window.request_redraw();
        self.window = Some(window);
        self.scene = Some(scene);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        error!("{err}");
        self.failure = Some(err);
        self.shutdown();
        event_loop.exit();
    }

    fn shutdown(&mut self) {
        if let Some(mut scene) = self.scene.take() {
            let released = scene.dispose();
            info!("Scene disposed, released {released} letters");
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        if !scene.take_scheduled_frame() {
            return;
        }

        let dt = self.clock.delta();
        if let Err(e) = scene.tick(dt) {
            self.fail(event_loop, e.into());
            return;
        }

        if scene.has_scheduled_frame()
            && let Some(window) = &self.window
        {
            window.request_redraw();
        }
    }

    /// Re-read `config.ron` and apply its scene options to the running scene.
    fn reload_config(&mut self) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        match self.config.reload(&self.config_dir) {
            Ok(Some(mut config)) => {
                config.apply_cli_overrides(&self.overrides);
                match scene.update_options(config.scene.clone()) {
                    Ok(()) => {
                        info!("Applied reloaded scene options");
                        self.config = config;
                    }
                    Err(e) => warn!("Rejected reloaded options: {e}"),
                }
            }
            Ok(None) => info!("Config unchanged"),
            Err(e) => warn!("Config reload failed: {e}"),
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        match event.physical_key {
            PhysicalKey::Code(KeyCode::Escape) => {
                info!("Escape pressed, shutting down");
                self.shutdown();
                event_loop.exit();
            }
            PhysicalKey::Code(KeyCode::KeyR) => self.reload_config(),
            _ => {}
        }
    }

    /// The error that ended the loop, if any.
    pub fn take_failure(&mut self) -> Option<AppError> {
        self.failure.take()
    }

    pub fn scene(&self) -> Option<&OrbitingTextScene<GpuSurface>> {
        self.scene.as_ref()
    }
}

impl ApplicationHandler for OrbiterApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.failure.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(()) => info!("Window and scene initialized"),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(scene) = self.scene.as_mut() {
                    scene.resize(size.width, size.height);
                }
                info!("Window resized to {}x{}", size.width, size.height);
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &event),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

/// Open the window and run the scene until it is closed or fails.
#[instrument(skip_all)]
pub fn run(
    config: Config,
    config_dir: PathBuf,
    overrides: CliArgs,
    assets: LoadedAssets,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = OrbiterApp::new(config, config_dir, overrides, assets);
    event_loop.run_app(&mut app)?;
    match app.take_failure() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
