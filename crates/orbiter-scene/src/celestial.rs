//! Background bodies: the sky sphere, the earth with its cloud shell, and a
//! few distant planets. Each spins about its own Y axis at a fixed rate.

use glam::{Mat4, Vec3};
use orbiter_config::SceneOptions;

use crate::assets::TextureSlot;
use crate::color::Rgb;

/// Radius of the sky sphere.
pub const SKY_RADIUS: f32 = 100.0;

/// Gap between the earth's surface and the cloud shell.
pub const CLOUD_GAP: f32 = 0.4;

/// Earth axial tilt, used as the earth's starting yaw.
pub const AXIAL_TILT_DEG: f32 = 23.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Sky,
    Earth,
    Clouds,
    Moon,
    Mars,
    Jupiter,
}

/// Surface response of a body to the point light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub metalness: f32,
    pub roughness: f32,
    /// Unlit bodies ignore the lights (the sky).
    pub lit: bool,
}

impl Material {
    const UNLIT: Material = Material {
        metalness: 0.0,
        roughness: 1.0,
        lit: false,
    };

    const MATTE: Material = Material {
        metalness: 0.0,
        roughness: 1.0,
        lit: true,
    };
}

/// A textured sphere in the background.
#[derive(Clone, Debug, PartialEq)]
pub struct CelestialBody {
    pub kind: BodyKind,
    pub center: Vec3,
    pub radius: f32,
    /// Fixed rotation about X applied before the spin.
    pub pitch: f32,
    /// Current spin about Y, in radians.
    pub yaw: f32,
    /// Spin rate in radians per second. Negative spins the other way.
    pub angular_velocity: f32,
    pub texture: TextureSlot,
    pub normal_map: Option<TextureSlot>,
    pub tint: Rgb,
    /// 1.0 is opaque.
    pub opacity: f32,
    /// Rendered from inside (back faces) rather than outside.
    pub inside_out: bool,
    pub material: Material,
}

impl CelestialBody {
    fn new(kind: BodyKind, center: Vec3, radius: f32, texture: TextureSlot, angular_velocity: f32) -> Self {
        Self {
            kind,
            center,
            radius,
            pitch: 0.0,
            yaw: 0.0,
            angular_velocity,
            texture,
            normal_map: None,
            tint: Rgb::WHITE,
            opacity: 1.0,
            inside_out: false,
            material: Material::MATTE,
        }
    }

    /// Spin forward by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.yaw += self.angular_velocity * dt;
    }

    /// `translation * pitch * spin * scale`.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.center)
            * Mat4::from_rotation_x(self.pitch)
            * Mat4::from_rotation_y(self.yaw)
            * Mat4::from_scale(Vec3::splat(self.radius))
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// The bodies of a fresh scene, back to front.
pub fn default_bodies(options: &SceneOptions) -> Vec<CelestialBody> {
    let sphere_tint = Rgb::from_hex(&options.sphere_color).unwrap_or(Rgb::WHITE);

    let mut sky = CelestialBody::new(BodyKind::Sky, Vec3::ZERO, SKY_RADIUS, TextureSlot::Sky, 0.005);
    sky.pitch = std::f32::consts::PI;
    sky.opacity = 0.2;
    sky.inside_out = true;
    sky.material = Material::UNLIT;

    let mut jupiter = CelestialBody::new(
        BodyKind::Jupiter,
        Vec3::new(-62.0, 24.0, -48.0),
        9.0,
        TextureSlot::Jupiter,
        -0.04,
    );
    jupiter.material.roughness = 0.8;

    let mut mars = CelestialBody::new(
        BodyKind::Mars,
        Vec3::new(66.0, -14.0, -52.0),
        4.0,
        TextureSlot::Mars,
        0.07,
    );
    mars.material.roughness = 0.9;

    let moon = CelestialBody::new(
        BodyKind::Moon,
        Vec3::new(48.0, 16.0, 20.0),
        3.0,
        TextureSlot::Moon,
        -0.02,
    );

    let mut earth = CelestialBody::new(
        BodyKind::Earth,
        Vec3::ZERO,
        options.earth_radius,
        TextureSlot::EarthMap,
        0.1,
    );
    earth.yaw = AXIAL_TILT_DEG.to_radians();
    earth.normal_map = Some(TextureSlot::EarthNormal);
    earth.tint = sphere_tint;
    earth.material = Material {
        metalness: 0.3,
        roughness: 0.6,
        lit: true,
    };

    let mut clouds = CelestialBody::new(
        BodyKind::Clouds,
        Vec3::ZERO,
        options.earth_radius + CLOUD_GAP,
        TextureSlot::EarthClouds,
        0.12,
    );
    clouds.opacity = 0.55;

    vec![sky, jupiter, mars, moon, earth, clouds]
}

/// Push option changes into existing bodies without resetting their spin.
pub fn apply_options(bodies: &mut [CelestialBody], options: &SceneOptions) {
    let sphere_tint = Rgb::from_hex(&options.sphere_color).unwrap_or(Rgb::WHITE);
    for body in bodies {
        match body.kind {
            BodyKind::Earth => {
                body.tint = sphere_tint;
                body.radius = options.earth_radius;
            }
            BodyKind::Clouds => body.radius = options.earth_radius + CLOUD_GAP,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(bodies: &[CelestialBody], kind: BodyKind) -> &CelestialBody {
        bodies.iter().find(|b| b.kind == kind).unwrap()
    }

    #[test]
    fn test_default_bodies() {
        let bodies = default_bodies(&SceneOptions::default());
        assert_eq!(bodies.len(), 6);
        assert_eq!(bodies[0].kind, BodyKind::Sky);

        let earth = find(&bodies, BodyKind::Earth);
        assert_eq!(earth.radius, 28.0);
        assert!((earth.yaw - 23.5_f32.to_radians()).abs() < 1e-6);
        assert_eq!(earth.normal_map, Some(TextureSlot::EarthNormal));
        assert!((earth.tint.r - 0x99 as f32 / 255.0).abs() < 1e-6);

        let clouds = find(&bodies, BodyKind::Clouds);
        assert!((clouds.radius - 28.4).abs() < 1e-5);
        assert!(clouds.is_transparent());
    }

    #[test]
    fn test_bodies_stay_inside_sky() {
        for body in default_bodies(&SceneOptions::default()) {
            if body.kind != BodyKind::Sky {
                assert!(body.center.length() + body.radius < SKY_RADIUS, "{:?}", body.kind);
            }
        }
    }

    #[test]
    fn test_spin_rates() {
        let mut bodies = default_bodies(&SceneOptions::default());
        let before: Vec<f32> = bodies.iter().map(|b| b.yaw).collect();
        for body in &mut bodies {
            body.advance(10.0);
        }
        let delta = |kind: BodyKind| {
            let i = bodies.iter().position(|b| b.kind == kind).unwrap();
            bodies[i].yaw - before[i]
        };
        assert!((delta(BodyKind::Earth) - 1.0).abs() < 1e-5);
        assert!((delta(BodyKind::Clouds) - 1.2).abs() < 1e-5);
        assert!((delta(BodyKind::Sky) - 0.05).abs() < 1e-5);
        assert!(delta(BodyKind::Moon) < 0.0);
        assert!(delta(BodyKind::Jupiter) < 0.0);
    }

    #[test]
    fn test_model_matrix_scales_and_translates() {
        let bodies = default_bodies(&SceneOptions::default());
        let mars = find(&bodies, BodyKind::Mars);
        let top = mars.model_matrix().transform_point3(Vec3::Y);
        assert!((top - (mars.center + Vec3::Y * mars.radius)).length() < 1e-4);
    }

    #[test]
    fn test_sky_is_flipped() {
        let bodies = default_bodies(&SceneOptions::default());
        let sky = find(&bodies, BodyKind::Sky);
        let top = sky.model_matrix().transform_point3(Vec3::Y);
        assert!(top.y < -99.0);
    }

    #[test]
    fn test_apply_options_keeps_spin() {
        let mut bodies = default_bodies(&SceneOptions::default());
        for body in &mut bodies {
            body.advance(3.0);
        }
        let yaws: Vec<f32> = bodies.iter().map(|b| b.yaw).collect();
        let options = SceneOptions {
            sphere_color: "#FF0000".into(),
            earth_radius: 20.0,
            ..SceneOptions::default()
        };
        apply_options(&mut bodies, &options);
        assert_eq!(bodies.iter().map(|b| b.yaw).collect::<Vec<_>>(), yaws);
        assert_eq!(find(&bodies, BodyKind::Earth).tint, Rgb::new(1.0, 0.0, 0.0));
        assert!((find(&bodies, BodyKind::Clouds).radius - 20.4).abs() < 1e-5);
    }
}
