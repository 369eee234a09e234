//! GPU uniform layouts shared with the WGSL shaders.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4};
use orbiter_scene::{BodyDraw, Lighting, Rgb};

/// Per-frame camera and light data, bound at `@group(0) @binding(0)`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    /// xyz camera position, w unused.
    pub camera_pos: [f32; 4],
    /// xyz point light position, w intensity at unit distance.
    pub light_pos: [f32; 4],
    /// rgb point light colour (linear), w unused.
    pub light_color: [f32; 4],
    /// rgb ambient colour (linear) premultiplied by its intensity.
    pub ambient: [f32; 4],
}

impl FrameUniform {
    pub fn new(view_proj: Mat4, camera_pos: glam::Vec3, lighting: &Lighting) -> Self {
        let ambient = lighting.ambient_color.to_linear();
        let point = lighting.point_color.to_linear();
        let p = lighting.point_position;
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: [camera_pos.x, camera_pos.y, camera_pos.z, 0.0],
            light_pos: [p.x, p.y, p.z, lighting.point_intensity],
            light_color: [point.r, point.g, point.b, 0.0],
            ambient: [
                ambient.r * lighting.ambient_intensity,
                ambient.g * lighting.ambient_intensity,
                ambient.b * lighting.ambient_intensity,
                0.0,
            ],
        }
    }
}

/// Per-object transform and material, bound at `@group(1) @binding(0)`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of the model's upper 3x3, padded to 4x4.
    pub normal_matrix: [[f32; 4]; 4],
    /// rgb tint (linear), a opacity.
    pub color: [f32; 4],
    /// metalness, roughness, lit flag, normal-map flag.
    pub material: [f32; 4],
}

/// Material of the extruded letters.
const LETTER_METALNESS: f32 = 0.1;
const LETTER_ROUGHNESS: f32 = 0.4;

fn normal_matrix(model: Mat4) -> [[f32; 4]; 4] {
    Mat4::from_mat3(Mat3::from_mat4(model).inverse().transpose()).to_cols_array_2d()
}

fn flag(on: bool) -> f32 {
    if on { 1.0 } else { 0.0 }
}

impl ObjectUniform {
    pub fn letter(model: Mat4, color: Rgb) -> Self {
        let c = color.to_linear();
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix(model),
            color: [c.r, c.g, c.b, 1.0],
            material: [LETTER_METALNESS, LETTER_ROUGHNESS, 1.0, 0.0],
        }
    }

    pub fn body(draw: &BodyDraw) -> Self {
        let c = draw.tint.to_linear();
        Self {
            model: draw.model.to_cols_array_2d(),
            normal_matrix: normal_matrix(draw.model),
            color: [c.r, c.g, c.b, draw.opacity],
            material: [
                draw.material.metalness,
                draw.material.roughness,
                flag(draw.material.lit),
                flag(draw.normal_map.is_some()),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    #[test]
    fn test_uniform_sizes_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<FrameUniform>(), 128);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 160);
        assert_eq!(std::mem::size_of::<FrameUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<ObjectUniform>() % 16, 0);
    }

    #[test]
    fn test_frame_uniform_packs_light() {
        let lighting = Lighting {
            ambient_color: Rgb::WHITE,
            ambient_intensity: 0.15,
            point_color: Rgb::WHITE,
            point_position: Vec3::new(50.0, 10.0, 70.0),
            point_intensity: 6000.0,
        };
        let u = FrameUniform::new(Mat4::IDENTITY, Vec3::new(0.0, 20.0, 130.0), &lighting);
        assert_eq!(u.light_pos, [50.0, 10.0, 70.0, 6000.0]);
        assert_eq!(u.camera_pos, [0.0, 20.0, 130.0, 0.0]);
        assert!((u.ambient[0] - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_rigid_normal_matrix_equals_rotation() {
        let model = Mat4::from_rotation_translation(Quat::from_rotation_y(0.7), Vec3::new(3.0, 1.0, 2.0));
        let u = ObjectUniform::letter(model, Rgb::WHITE);
        let rotation = Mat4::from_quat(Quat::from_rotation_y(0.7)).to_cols_array_2d();
        for col in 0..3 {
            for row in 0..3 {
                assert!((u.normal_matrix[col][row] - rotation[col][row]).abs() < 1e-5);
            }
        }
    }
}
