//! Per-frame draw list handed to the render surface.

use glam::{Mat4, Vec3};
use orbiter_config::SceneOptions;

use crate::assets::TextureSlot;
use crate::celestial::{BodyKind, CelestialBody, Material};
use crate::color::Rgb;

/// Position of the scene's point light.
pub const POINT_LIGHT_POSITION: Vec3 = Vec3::new(50.0, 10.0, 70.0);

/// Strength of the uniform ambient term.
pub const AMBIENT_INTENSITY: f32 = 0.15;

/// One ambient light plus one point light with inverse-square falloff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighting {
    pub ambient_color: Rgb,
    pub ambient_intensity: f32,
    pub point_color: Rgb,
    pub point_position: Vec3,
    /// Intensity at unit distance.
    pub point_intensity: f32,
}

impl Lighting {
    pub fn from_options(options: &SceneOptions) -> Self {
        Self {
            ambient_color: Rgb::WHITE,
            ambient_intensity: AMBIENT_INTENSITY,
            point_color: Rgb::WHITE,
            point_position: POINT_LIGHT_POSITION,
            point_intensity: options.light_intensity,
        }
    }
}

/// Draw command for one background body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyDraw {
    pub kind: BodyKind,
    pub model: Mat4,
    pub texture: TextureSlot,
    pub normal_map: Option<TextureSlot>,
    pub tint: Rgb,
    pub opacity: f32,
    pub inside_out: bool,
    pub material: Material,
}

impl From<&CelestialBody> for BodyDraw {
    fn from(body: &CelestialBody) -> Self {
        Self {
            kind: body.kind,
            model: body.model_matrix(),
            texture: body.texture,
            normal_map: body.normal_map,
            tint: body.tint,
            opacity: body.opacity,
            inside_out: body.inside_out,
            material: body.material,
        }
    }
}

/// Draw command for one letter. `mesh` is the surface's own upload.
#[derive(Debug)]
pub struct LetterDraw<'a, M> {
    pub mesh: &'a M,
    pub model: Mat4,
    pub color: Rgb,
}

/// Everything the surface needs to draw one frame.
#[derive(Debug)]
pub struct Frame<'a, M> {
    pub view_proj: Mat4,
    pub camera_position: Vec3,
    pub lighting: Lighting,
    pub bodies: Vec<BodyDraw>,
    pub letters: Vec<LetterDraw<'a, M>>,
}
