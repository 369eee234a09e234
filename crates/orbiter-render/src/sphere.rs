//! Latitude/longitude sphere mesh for the textured bodies.
//!
//! UVs follow the equirectangular layout of the planet maps: `u` runs around
//! the equator, `v` from the north pole (0) to the south pole (1).

use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Segments around the equator.
pub const WIDTH_SEGMENTS: u32 = 64;
/// Segments from pole to pole.
pub const HEIGHT_SEGMENTS: u32 = 32;

/// Vertex layout for body meshes: position, normal, tangent, uv.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SphereVertex {
    /// Position on the unit sphere.
    pub position: [f32; 3],
    /// Outward normal (same as position).
    pub normal: [f32; 3],
    /// Direction of increasing `u`, for normal mapping.
    pub tangent: [f32; 3],
    pub uv: [f32; 2],
}

impl SphereVertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
            2 => Float32x3,
            3 => Float32x2,
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SphereVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// A unit sphere ready for upload.
pub struct SphereMesh {
    pub vertices: Vec<SphereVertex>,
    pub indices: Vec<u32>,
}

/// Generate a unit UV sphere, wound counter-clockwise seen from outside.
pub fn generate_uv_sphere(width_segments: u32, height_segments: u32) -> SphereMesh {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let row_len = width_segments + 1;

    let mut vertices = Vec::with_capacity((row_len * (height_segments + 1)) as usize);
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let (sin_theta, cos_theta) = (v * PI).sin_cos();
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let (sin_phi, cos_phi) = (u * TAU).sin_cos();
            let position = Vec3::new(-cos_phi * sin_theta, cos_theta, sin_phi * sin_theta);
            let tangent = Vec3::new(sin_phi, 0.0, cos_phi);
            vertices.push(SphereVertex {
                position: position.to_array(),
                normal: position.normalize_or_zero().to_array(),
                tangent: tangent.to_array(),
                uv: [u, v],
            });
        }
    }

    let mut indices = Vec::new();
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row_len + ix + 1;
            let b = iy * row_len + ix;
            let c = (iy + 1) * row_len + ix;
            let d = (iy + 1) * row_len + ix + 1;
            // Pole rows collapse to single triangles.
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    SphereMesh { vertices, indices }
}
