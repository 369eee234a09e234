//! The orbiting text scene and its frame loop.

use orbiter_config::{ConfigError, SceneOptions};
use orbiter_layout::{BlockFont, LayoutParams};

use crate::animation::{AnimationState, wrap_hue};
use crate::assets::LoadedAssets;
use crate::camera::Camera;
use crate::celestial::{CelestialBody, apply_options, default_bodies};
use crate::color::Rgb;
use crate::error::SceneError;
use crate::frame::{BodyDraw, Frame, Lighting};
use crate::letters::LetterGroup;
use crate::surface::RenderSurface;

/// Saturation and lightness of hue-cycled letters.
const LETTER_SATURATION: f32 = 1.0;
const LETTER_LIGHTNESS: f32 = 0.5;

/// Lifecycle of the frame loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneStatus {
    /// Ticks are accepted and the next one is scheduled after each.
    Running,
    /// A tick failed; the loop is stopped but resources are still held.
    Stopped,
    /// Every resource has been released.
    Disposed,
}

/// Orbiting letters around a spinning earth, drawn through a [`RenderSurface`].
///
/// The host drives the loop: it calls [`tick`](Self::tick) whenever
/// [`take_scheduled_frame`](Self::take_scheduled_frame) reports a pending
/// frame. At most one frame is ever pending.
pub struct OrbitingTextScene<S: RenderSurface> {
    options: SceneOptions,
    font: BlockFont,
    camera: Camera,
    lighting: Lighting,
    animation: AnimationState,
    letters: LetterGroup<S::LetterMesh>,
    bodies: Vec<CelestialBody>,
    surface: Option<S>,
    status: SceneStatus,
    frame_pending: bool,
}

fn layout_params(options: &SceneOptions) -> LayoutParams {
    LayoutParams {
        word: options.word.clone(),
        repeats: options.repeats,
        orbit_radius: options.orbit_radius,
        tilt_deg: options.tilt_deg,
        letter_depth: options.letter_depth,
    }
}

fn letter_color(options: &SceneOptions) -> Result<Rgb, ConfigError> {
    Rgb::from_hex(&options.letter_color).ok_or_else(|| ConfigError::InvalidValue {
        field: "letter_color",
        reason: format!("`{}` is not #RRGGBB", options.letter_color),
    })
}

impl<S: RenderSurface> OrbitingTextScene<S> {
    /// Build the scene from loaded assets and take ownership of `surface`.
    ///
    /// The first frame is scheduled on success.
    pub fn new(options: SceneOptions, mut assets: LoadedAssets, mut surface: S) -> Result<Self, SceneError> {
        options.validate()?;

        assets.configure(surface.max_anisotropy());
        surface.install_textures(&assets.textures)?;

        let (width, height) = surface.size();
        let camera = Camera::orbit_view(width, height);
        let animation = AnimationState::new(options.text_hue);

        let mut letters = LetterGroup::build(
            &layout_params(&options),
            &assets.font,
            letter_color(&options)?,
            &mut surface,
        )?;
        letters.set_yaw(animation.group_yaw);
        letters.billboard(camera.position);

        log::info!(
            "Scene ready: {} letters, {} bodies, {width}x{height}",
            letters.len(),
            default_bodies(&options).len()
        );

        Ok(Self {
            lighting: Lighting::from_options(&options),
            bodies: default_bodies(&options),
            font: assets.font,
            options,
            camera,
            animation,
            letters,
            surface: Some(surface),
            status: SceneStatus::Running,
            frame_pending: true,
        })
    }

    /// Advance the animation by `dt` seconds and draw one frame.
    ///
    /// Steps run in a fixed order: group yaw, letter colours, billboarding,
    /// global hue, body spin, render. Any failure stops the loop and is
    /// returned; no further frame is scheduled.
    pub fn tick(&mut self, dt: f32) -> Result<(), SceneError> {
        if self.status != SceneStatus::Running {
            return Err(SceneError::NotRunning);
        }
        self.frame_pending = false;

        match self.step(dt) {
            Ok(()) => {
                self.animation.frame += 1;
                self.frame_pending = true;
                Ok(())
            }
            Err(e) => {
                log::error!("Frame {} failed, stopping the loop: {e}", self.animation.frame);
                self.status = SceneStatus::Stopped;
                Err(e)
            }
        }
    }

    fn step(&mut self, dt: f32) -> Result<(), SceneError> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        self.animation.advance_yaw(self.options.speed, dt);
        self.letters.set_yaw(self.animation.group_yaw);

        if self.options.change_hue {
            let animation = self.animation;
            let options = &self.options;
            self.letters.recolor(|i| {
                Rgb::from_hsl(
                    animation.letter_hue(i, options),
                    LETTER_SATURATION,
                    LETTER_LIGHTNESS,
                )
            });
        }

        self.letters.billboard(self.camera.position);

        if self.options.change_hue {
            self.animation.advance_hue(self.options.text_hue_inc, dt);
        }

        for body in &mut self.bodies {
            body.advance(dt);
        }

        self.render()
    }

    fn render(&mut self) -> Result<(), SceneError> {
        let surface = self.surface.as_mut().ok_or(SceneError::NotRunning)?;
        let frame = Frame {
            view_proj: self.camera.view_projection_matrix(),
            camera_position: self.camera.position,
            lighting: self.lighting,
            bodies: self.bodies.iter().map(BodyDraw::from).collect(),
            letters: self.letters.draws(),
        };
        surface.render(&frame)?;
        Ok(())
    }

    /// Consume the pending frame, if any. The host ticks only when this
    /// returns `true`.
    pub fn take_scheduled_frame(&mut self) -> bool {
        std::mem::take(&mut self.frame_pending)
    }

    /// Whether a frame is waiting to be ticked.
    pub fn has_scheduled_frame(&self) -> bool {
        self.frame_pending
    }

    /// Update the projection and drawable size. Takes effect on the next tick.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect_ratio(width as f32, height as f32);
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(width, height);
        }
        log::debug!("Resized to {width}x{height}");
    }

    /// Apply new options. Letters are rebuilt when placement or letter colour
    /// changes; lights and body tints always follow the new values.
    ///
    /// Invalid options, or a failed rebuild, leave the scene untouched.
    pub fn update_options(&mut self, options: SceneOptions) -> Result<(), SceneError> {
        if self.status == SceneStatus::Disposed {
            return Err(SceneError::NotRunning);
        }
        options.validate()?;

        if self.options.affects_layout(&options) || self.options.letter_color != options.letter_color {
            self.install_letters(&options)?;
        }
        if options.text_hue != self.options.text_hue {
            self.animation.global_hue = wrap_hue(options.text_hue);
        }
        self.lighting = Lighting::from_options(&options);
        apply_options(&mut self.bodies, &options);
        self.options = options;
        Ok(())
    }

    /// Tear down and rebuild the letter group from the current options.
    pub fn rebuild(&mut self) -> Result<(), SceneError> {
        if self.status == SceneStatus::Disposed {
            return Err(SceneError::NotRunning);
        }
        let options = self.options.clone();
        self.install_letters(&options)
    }

    /// Build a complete group for `options`, then swap it in and drop the old one.
    fn install_letters(&mut self, options: &SceneOptions) -> Result<(), SceneError> {
        let surface = self.surface.as_mut().ok_or(SceneError::NotRunning)?;
        let mut letters =
            LetterGroup::build(&layout_params(options), &self.font, letter_color(options)?, surface)?;
        letters.set_yaw(self.animation.group_yaw);
        letters.billboard(self.camera.position);

        let mut previous = std::mem::replace(&mut self.letters, letters);
        let released = previous.clear();
        log::info!("Rebuilt {} letters, released {released}", self.letters.len());
        Ok(())
    }

    /// Stop the loop, release every letter, then release the surface.
    ///
    /// Idempotent. Returns the number of letters released by this call.
    pub fn dispose(&mut self) -> usize {
        self.frame_pending = false;
        self.status = SceneStatus::Disposed;
        let released = self.letters.clear();
        if let Some(mut surface) = self.surface.take() {
            surface.release();
            log::info!("Scene disposed, released {released} letters");
        }
        released
    }

    pub fn status(&self) -> SceneStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == SceneStatus::Running
    }

    pub fn options(&self) -> &SceneOptions {
        &self.options
    }

    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    pub fn letters(&self) -> &LetterGroup<S::LetterMesh> {
        &self.letters
    }

    pub fn bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }
}

impl<S: RenderSurface> Drop for OrbitingTextScene<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetManifest, ColorSpace, TextureSlot, load_assets};
    use crate::celestial::BodyKind;
    use crate::testing::{MemoryAssets, RecordingSurface};
    use orbiter_config::AssetConfig;

    fn assets() -> LoadedAssets {
        let manifest = AssetManifest::from_config(&AssetConfig::default());
        load_assets(&MemoryAssets::complete(&manifest), &manifest).unwrap()
    }

    fn options(word: &str, repeats: u32) -> SceneOptions {
        SceneOptions {
            word: word.to_string(),
            repeats,
            ..SceneOptions::default()
        }
    }

    fn scene(options: SceneOptions) -> OrbitingTextScene<RecordingSurface> {
        OrbitingTextScene::new(options, assets(), RecordingSurface::new(1280, 720)).unwrap()
    }

    fn transforms(scene: &OrbitingTextScene<RecordingSurface>) -> Vec<orbiter_layout::LetterTransform> {
        scene.letters().letters().iter().map(|l| l.transform).collect()
    }

    #[test]
    fn test_new_builds_letters_and_textures() {
        let scene = scene(options("AB", 2));
        let stats = scene.surface().unwrap().stats();
        assert_eq!(scene.letters().len(), 4);
        assert_eq!(stats.uploads, 4);
        assert_eq!(stats.textures, TextureSlot::ALL);
        assert!(stats.texture_settings.iter().all(|s| s.color_space == ColorSpace::Srgb));
        assert!(stats.texture_settings.iter().all(|s| s.anisotropy == 16));
        assert!(scene.is_running());
        assert!(scene.has_scheduled_frame());
    }

    #[test]
    fn test_new_rejects_invalid_options() {
        let result =
            OrbitingTextScene::new(options("", 2), assets(), RecordingSurface::new(800, 600));
        assert!(matches!(result, Err(SceneError::Options(_))));
    }

    #[test]
    fn test_tick_accumulates_yaw() {
        let mut scene = scene(options("AB", 2));
        for _ in 0..10 {
            assert!(scene.take_scheduled_frame());
            scene.tick(0.1).unwrap();
        }
        assert!((scene.animation().group_yaw - (-0.6)).abs() < 1e-5);
        assert_eq!(scene.letters().yaw(), scene.animation().group_yaw);
        assert_eq!(scene.animation().frame, 10);
        assert_eq!(scene.surface().unwrap().stats().renders, 10);
    }

    #[test]
    fn test_only_one_frame_pending() {
        let mut scene = scene(options("AB", 1));
        assert!(scene.take_scheduled_frame());
        assert!(!scene.take_scheduled_frame());
        scene.tick(0.016).unwrap();
        assert!(scene.take_scheduled_frame());
        assert!(!scene.has_scheduled_frame());
    }

    #[test]
    fn test_hue_uses_pre_increment_value() {
        let mut opts = options("AB", 1);
        opts.text_hue = 0.25;
        opts.text_hue_inc = 0.1;
        opts.colour_letters = 0.0;
        let mut scene = scene(opts);
        scene.tick(1.0).unwrap();

        let colors = scene.surface().unwrap().stats().last_letter_colors;
        let expected = Rgb::from_hsl(0.25, 1.0, 0.5);
        assert!(colors.iter().all(|c| *c == expected));
        assert!((scene.animation().global_hue - 0.35).abs() < 1e-5);
    }

    #[test]
    fn test_hue_gradient_across_letters() {
        let mut opts = options("AB", 2);
        opts.text_hue = 0.0;
        opts.colour_letters = 10.0;
        opts.colour_letters_offset = 100.0;
        let mut scene = scene(opts);
        scene.tick(0.0).unwrap();

        let colors = scene.surface().unwrap().stats().last_letter_colors;
        for (i, color) in colors.iter().enumerate() {
            assert_eq!(*color, Rgb::from_hsl(i as f32 * 0.1, 1.0, 0.5));
        }
    }

    #[test]
    fn test_hue_wraps_continuously() {
        let mut opts = options("A", 1);
        opts.text_hue = 0.99;
        opts.text_hue_inc = 0.01;
        let mut scene = scene(opts);
        let mut previous = scene.animation().global_hue;
        for _ in 0..200 {
            scene.tick(0.1).unwrap();
            let hue = scene.animation().global_hue;
            assert!((0.0..1.0).contains(&hue));
            let step = (hue - previous).rem_euclid(1.0);
            assert!((step - 0.001).abs() < 1e-4, "step {step}");
            previous = hue;
        }
    }

    #[test]
    fn test_static_colour_when_hue_disabled() {
        let mut opts = options("AB", 2);
        opts.change_hue = false;
        opts.colour_letters = 50.0;
        opts.text_hue = 0.4;
        let mut scene = scene(opts);
        for _ in 0..5 {
            scene.tick(0.5).unwrap();
        }
        let expected = Rgb::from_hex("#30FF30").unwrap();
        let colors = scene.surface().unwrap().stats().last_letter_colors;
        assert_eq!(colors.len(), 4);
        assert!(colors.iter().all(|c| *c == expected));
        assert_eq!(scene.animation().global_hue, 0.4);
    }

    #[test]
    fn test_bodies_spin_each_tick() {
        let mut scene = scene(options("AB", 1));
        let earth_before = scene.bodies().iter().find(|b| b.kind == BodyKind::Earth).unwrap().yaw;
        scene.tick(2.0).unwrap();
        let earth_after = scene.bodies().iter().find(|b| b.kind == BodyKind::Earth).unwrap().yaw;
        assert!((earth_after - earth_before - 0.2).abs() < 1e-5);
        assert_eq!(scene.surface().unwrap().stats().last_body_count, 6);
    }

    #[test]
    fn test_render_failure_stops_loop() {
        let mut surface = RecordingSurface::new(800, 600);
        surface.fail_render_at(2);
        let mut scene = OrbitingTextScene::new(options("AB", 1), assets(), surface).unwrap();
        scene.tick(0.1).unwrap();
        scene.tick(0.1).unwrap();
        let err = scene.tick(0.1).unwrap_err();
        assert!(matches!(err, SceneError::Surface(_)));
        assert_eq!(scene.status(), SceneStatus::Stopped);
        assert!(!scene.has_scheduled_frame());
        assert!(matches!(scene.tick(0.1), Err(SceneError::NotRunning)));
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let mut scene = scene(options("AB", 3));
        let stats = scene.surface().unwrap().stats_handle();
        let first = transforms(&scene);

        scene.rebuild().unwrap();
        scene.rebuild().unwrap();

        assert_eq!(transforms(&scene), first);
        assert_eq!(stats.borrow().live_meshes(), 6);
        assert_eq!(stats.borrow().releases, 12);
    }

    #[test]
    fn test_update_options_rebuilds_on_layout_change() {
        let mut scene = scene(options("AB", 2));
        let stats = scene.surface().unwrap().stats_handle();
        scene.update_options(options("OBA", 3)).unwrap();
        assert_eq!(scene.letters().len(), 9);
        assert_eq!(stats.borrow().live_meshes(), 9);
        assert_eq!(stats.borrow().releases, 4);
    }

    #[test]
    fn test_update_options_without_layout_change_keeps_letters() {
        let mut scene = scene(options("AB", 2));
        let stats = scene.surface().unwrap().stats_handle();
        let mut next = options("AB", 2);
        next.light_intensity = 1000.0;
        next.sphere_color = "#FF0000".into();
        scene.update_options(next).unwrap();
        assert_eq!(stats.borrow().uploads, 4);
        assert_eq!(scene.lighting().point_intensity, 1000.0);
        let earth = scene.bodies().iter().find(|b| b.kind == BodyKind::Earth).unwrap();
        assert_eq!(earth.tint, Rgb::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_update_options_letter_colour_rebuilds() {
        let mut scene = scene(options("AB", 2));
        let mut next = options("AB", 2);
        next.letter_color = "#0000FF".into();
        scene.update_options(next).unwrap();
        let blue = Rgb::new(0.0, 0.0, 1.0);
        assert!(scene.letters().letters().iter().all(|l| l.base_color == blue));
    }

    #[test]
    fn test_invalid_update_keeps_previous_group() {
        let mut scene = scene(options("AB", 2));
        let before = transforms(&scene);
        let result = scene.update_options(options("AB", 0));
        assert!(matches!(result, Err(SceneError::Options(_))));
        assert_eq!(transforms(&scene), before);
        assert_eq!(scene.options().repeats, 2);
    }

    #[test]
    fn test_update_text_hue_resets_phase() {
        let mut scene = scene(options("AB", 2));
        scene.tick(3.0).unwrap();
        let mut next = options("AB", 2);
        next.text_hue = 0.6;
        scene.update_options(next).unwrap();
        assert!((scene.animation().global_hue - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_dispose_releases_everything() {
        let mut scene = scene(options("AB", 3));
        let stats = scene.surface().unwrap().stats_handle();
        scene.tick(0.1).unwrap();

        assert_eq!(scene.dispose(), 6);
        assert_eq!(stats.borrow().releases, 6);
        assert_eq!(stats.borrow().live_meshes(), 0);
        assert_eq!(stats.borrow().surface_released, 1);
        assert!(!scene.has_scheduled_frame());
        assert!(!scene.take_scheduled_frame());
        assert!(matches!(scene.tick(0.1), Err(SceneError::NotRunning)));

        assert_eq!(scene.dispose(), 0);
        drop(scene);
        assert_eq!(stats.borrow().surface_released, 1);
    }

    #[test]
    fn test_drop_disposes() {
        let scene = scene(options("AB", 2));
        let stats = scene.surface().unwrap().stats_handle();
        drop(scene);
        assert_eq!(stats.borrow().live_meshes(), 0);
        assert_eq!(stats.borrow().surface_released, 1);
    }

    #[test]
    fn test_failed_rebuild_keeps_old_group_and_leaks_nothing() {
        let mut surface = RecordingSurface::new(800, 600);
        surface.fail_upload_after(4 + 2);
        let mut scene = OrbitingTextScene::new(options("AB", 2), assets(), surface).unwrap();
        let stats = scene.surface().unwrap().stats_handle();

        let result = scene.update_options(options("AB", 5));
        assert!(matches!(result, Err(SceneError::Surface(_))));
        assert_eq!(scene.letters().len(), 4);
        assert_eq!(stats.borrow().live_meshes(), 4);
        assert_eq!(scene.options().repeats, 2);

        scene.dispose();
        assert_eq!(stats.borrow().live_meshes(), 0);
    }

    #[test]
    fn test_resize_updates_projection() {
        let mut scene = scene(options("AB", 1));
        scene.resize(1000, 500);
        assert!((scene.camera().aspect_ratio - 2.0).abs() < 1e-6);
        assert_eq!(scene.surface().unwrap().stats().resizes, vec![(1000, 500)]);
        scene.resize(0, 0);
        scene.tick(0.1).unwrap();
    }

    #[test]
    fn test_non_finite_dt_is_ignored() {
        let mut scene = scene(options("AB", 1));
        scene.tick(f32::NAN).unwrap();
        scene.tick(-1.0).unwrap();
        assert_eq!(scene.animation().group_yaw, 0.0);
    }
}
