//! Render pipelines for the textured bodies and the extruded letters.
//!
//! Both share the frame uniform at `@group(0)`. Bodies bind their object
//! uniform, colour map, normal map and sampler at `@group(1)`; letters bind
//! only their object uniform there.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use orbiter_layout::GlyphVertex;
use orbiter_scene::BodyDraw;

use crate::depth::DepthBuffer;
use crate::sphere::SphereVertex;
use crate::uniforms::{FrameUniform, ObjectUniform};

/// Vertex layout for uploaded letter glyphs: position, normal.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LetterVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl From<&GlyphVertex> for LetterVertex {
    fn from(v: &GlyphVertex) -> Self {
        Self {
            position: v.position,
            normal: v.normal,
        }
    }
}

impl LetterVertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LetterVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// How a body is blended and culled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyPass {
    /// Fully opaque, back faces culled, writes depth.
    Opaque,
    /// Alpha blended over what is behind it. Tests depth but does not write it.
    Transparent,
    /// Seen from inside (the sky). Front faces culled, blended.
    InsideOut,
}

impl BodyPass {
    pub const ALL: [BodyPass; 3] = [BodyPass::Opaque, BodyPass::Transparent, BodyPass::InsideOut];

    pub fn for_draw(draw: &BodyDraw) -> Self {
        if draw.inside_out {
            BodyPass::InsideOut
        } else if draw.opacity < 1.0 {
            BodyPass::Transparent
        } else {
            BodyPass::Opaque
        }
    }

    pub fn is_blended(self) -> bool {
        !matches!(self, BodyPass::Opaque)
    }

    fn cull_mode(self) -> Option<wgpu::Face> {
        match self {
            BodyPass::InsideOut => Some(wgpu::Face::Front),
            _ => Some(wgpu::Face::Back),
        }
    }

    fn index(self) -> usize {
        match self {
            BodyPass::Opaque => 0,
            BodyPass::Transparent => 1,
            BodyPass::InsideOut => 2,
        }
    }

    fn label(self) -> &'static str {
        match self {
            BodyPass::Opaque => "body-opaque-pipeline",
            BodyPass::Transparent => "body-transparent-pipeline",
            BodyPass::InsideOut => "body-inside-out-pipeline",
        }
    }
}

/// All pipelines and bind group layouts needed to draw a frame.
pub struct ScenePipelines {
    pub frame_layout: wgpu::BindGroupLayout,
    pub body_layout: wgpu::BindGroupLayout,
    pub letter_layout: wgpu::BindGroupLayout,
    body: [wgpu::RenderPipeline; 3],
    pub letter: wgpu::RenderPipeline,
}

fn uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    size: usize,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(size as u64),
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn primitive(cull_mode: Option<wgpu::Face>) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode,
        unclipped_depth: false,
        polygon_mode: wgpu::PolygonMode::Fill,
        conservative: false,
    }
}

impl ScenePipelines {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene-shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_SHADER_SOURCE.into()),
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame-bgl"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                std::mem::size_of::<FrameUniform>(),
            )],
        });

        let object_size = std::mem::size_of::<ObjectUniform>();
        let body_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("body-bgl"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT, object_size),
                texture_entry(1),
                texture_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let letter_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("letter-bgl"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                object_size,
            )],
        });

        let body_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("body-pipeline-layout"),
            bind_group_layouts: &[&frame_layout, &body_layout],
            immediate_size: 0,
        });
        let letter_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("letter-pipeline-layout"),
                bind_group_layouts: &[&frame_layout, &letter_layout],
                immediate_size: 0,
            });

        let body = BodyPass::ALL.map(|pass| {
            let blend = if pass.is_blended() {
                Some(wgpu::BlendState::ALPHA_BLENDING)
            } else {
                None
            };
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(pass.label()),
                layout: Some(&body_pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_body"),
                    buffers: &[SphereVertex::layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: primitive(pass.cull_mode()),
                depth_stencil: Some(DepthBuffer::stencil_state(!pass.is_blended())),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_body"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multiview_mask: None,
                cache: None,
            })
        });

        // Glyph extrusion emits only exposed faces, so both sides are drawn.
        let letter = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("letter-pipeline"),
            layout: Some(&letter_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_letter"),
                buffers: &[LetterVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: primitive(None),
            depth_stencil: Some(DepthBuffer::stencil_state(true)),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_letter"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            frame_layout,
            body_layout,
            letter_layout,
            body,
            letter,
        }
    }

    pub fn body(&self, pass: BodyPass) -> &wgpu::RenderPipeline {
        &self.body[pass.index()]
    }
}

/// WGSL source for bodies and letters.
///
/// Shading is metal/rough Cook-Torrance with one inverse-square point light
/// and a flat ambient term. Unlit materials return their texture colour.
pub const SCENE_SHADER_SOURCE: &str = r#"
const PI: f32 = 3.14159265359;

struct FrameUniform {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    light_pos: vec4<f32>,
    light_color: vec4<f32>,
    ambient: vec4<f32>,
};

struct ObjectUniform {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    color: vec4<f32>,
    material: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: FrameUniform;

@group(1) @binding(0)
var<uniform> obj: ObjectUniform;

@group(1) @binding(1)
var color_map: texture_2d<f32>;

@group(1) @binding(2)
var normal_map: texture_2d<f32>;

@group(1) @binding(3)
var map_sampler: sampler;

fn distribution_ggx(n_dot_h: f32, roughness: f32) -> f32 {
    let a = roughness * roughness;
    let a2 = a * a;
    let denom = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    return a2 / (PI * denom * denom);
}

fn geometry_schlick_ggx(n_dot: f32, roughness: f32) -> f32 {
    let r = roughness + 1.0;
    let k = (r * r) / 8.0;
    return n_dot / (n_dot * (1.0 - k) + k);
}

fn fresnel_schlick(cos_theta: f32, f0: vec3<f32>) -> vec3<f32> {
    return f0 + (1.0 - f0) * pow(clamp(1.0 - cos_theta, 0.0, 1.0), 5.0);
}

fn shade(world_pos: vec3<f32>, normal: vec3<f32>, albedo: vec3<f32>) -> vec3<f32> {
    let metallic = obj.material.x;
    let roughness = max(obj.material.y, 0.04);

    let to_light = globals.light_pos.xyz - world_pos;
    let dist_sq = max(dot(to_light, to_light), 0.0001);
    let light_dir = to_light * inverseSqrt(dist_sq);
    let view_dir = normalize(globals.camera_pos.xyz - world_pos);
    let half_vec = normalize(view_dir + light_dir);

    let n_dot_l = max(dot(normal, light_dir), 0.0);
    let n_dot_v = max(dot(normal, view_dir), 0.0);
    let n_dot_h = max(dot(normal, half_vec), 0.0);
    let h_dot_v = max(dot(half_vec, view_dir), 0.0);

    let f0 = mix(vec3<f32>(0.04), albedo, metallic);
    let f = fresnel_schlick(h_dot_v, f0);
    let d = distribution_ggx(n_dot_h, roughness);
    let g = geometry_schlick_ggx(n_dot_v, roughness) * geometry_schlick_ggx(n_dot_l, roughness);
    let specular = d * g * f / (4.0 * n_dot_v * n_dot_l + 0.0001);
    let k_d = (vec3<f32>(1.0) - f) * (1.0 - metallic);
    let diffuse = k_d * albedo / PI;

    let radiance = globals.light_color.rgb * globals.light_pos.w / dist_sq;
    let ambient = globals.ambient.rgb * albedo * (1.0 - metallic);
    return ambient + (diffuse + specular) * radiance * n_dot_l;
}

struct BodyInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tangent: vec3<f32>,
    @location(3) uv: vec2<f32>,
};

struct BodyOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tangent: vec3<f32>,
    @location(3) uv: vec2<f32>,
};

@vertex
fn vs_body(in: BodyInput) -> BodyOutput {
    var out: BodyOutput;
    let world = obj.model * vec4<f32>(in.position, 1.0);
    out.clip_position = globals.view_proj * world;
    out.world_position = world.xyz;
    out.normal = (obj.normal_matrix * vec4<f32>(in.normal, 0.0)).xyz;
    out.tangent = (obj.model * vec4<f32>(in.tangent, 0.0)).xyz;
    out.uv = in.uv;
    return out;
}

@fragment
fn fs_body(in: BodyOutput) -> @location(0) vec4<f32> {
    // Both maps are sampled before any branch to keep control flow uniform.
    let texel = textureSample(color_map, map_sampler, in.uv);
    let bump = textureSample(normal_map, map_sampler, in.uv).xyz * 2.0 - 1.0;

    let albedo = texel.rgb * obj.color.rgb;
    let alpha = texel.a * obj.color.a;
    if obj.material.z < 0.5 {
        return vec4<f32>(albedo, alpha);
    }

    var n = normalize(in.normal);
    if obj.material.w > 0.5 {
        let t = normalize(in.tangent - n * dot(n, in.tangent));
        let b = cross(n, t);
        n = normalize(mat3x3<f32>(t, b, n) * bump);
    }
    return vec4<f32>(shade(in.world_position, n, albedo), alpha);
}

struct LetterInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct LetterOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

@vertex
fn vs_letter(in: LetterInput) -> LetterOutput {
    var out: LetterOutput;
    let world = obj.model * vec4<f32>(in.position, 1.0);
    out.clip_position = globals.view_proj * world;
    out.world_position = world.xyz;
    out.normal = (obj.normal_matrix * vec4<f32>(in.normal, 0.0)).xyz;
    return out;
}

@fragment
fn fs_letter(in: LetterOutput, @builtin(front_facing) front: bool) -> @location(0) vec4<f32> {
    var n = normalize(in.normal);
    if !front {
        n = -n;
    }
    return vec4<f32>(shade(in.world_position, n, obj.color.rgb), 1.0);
}
"#;
