//! [`RenderSurface`] implementation on top of wgpu.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec3;
use orbiter_layout::GlyphMesh;
use orbiter_scene::{
    BodyDraw, BodyKind, ColorSpace, Frame, RenderSurface, SurfaceError, TextureData, TextureSlot,
};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::context::{RenderContext, RenderContextError, init_render_context_blocking};
use crate::depth::DepthBuffer;
use crate::pipeline::{BodyPass, LetterVertex, ScenePipelines};
use crate::sphere::{HEIGHT_SEGMENTS, WIDTH_SEGMENTS, generate_uv_sphere};
use crate::texture::{GpuTexture, TextureError};
use crate::uniforms::{FrameUniform, ObjectUniform};

/// Tangent-space "straight up", used when a body has no normal map.
const FLAT_NORMAL: [u8; 4] = [128, 128, 255, 255];

/// Background behind the sky sphere.
const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

impl From<TextureError> for SurfaceError {
    fn from(err: TextureError) -> Self {
        SurfaceError::Backend(err.to_string())
    }
}

struct LetterGeometry {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// One uploaded letter: geometry plus its own material uniform.
///
/// Dropping it destroys the GPU buffers.
pub struct GpuLetter {
    geometry: Option<LetterGeometry>,
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl GpuLetter {
    /// Whether the glyph had no faces (a space).
    pub fn is_empty(&self) -> bool {
        self.geometry.is_none()
    }
}

impl std::fmt::Debug for GpuLetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuLetter")
            .field("index_count", &self.geometry.as_ref().map(|g| g.index_count))
            .finish()
    }
}

impl Drop for GpuLetter {
    fn drop(&mut self) {
        if let Some(geometry) = self.geometry.take() {
            geometry.vertex_buffer.destroy();
            geometry.index_buffer.destroy();
        }
        self.uniform.destroy();
    }
}

/// Per-body uniform and bind group, rebuilt when its texture slots change.
struct BodyBinding {
    texture: TextureSlot,
    normal_map: Option<TextureSlot>,
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// The window surface the scene draws through.
pub struct GpuSurface {
    context: RenderContext,
    depth: DepthBuffer,
    size: (u32, u32),
    pipelines: ScenePipelines,
    frame_uniform: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    sphere_vertices: wgpu::Buffer,
    sphere_indices: wgpu::Buffer,
    sphere_index_count: u32,
    textures: [Option<GpuTexture>; 7],
    flat_normal: GpuTexture,
    bodies: HashMap<BodyKind, BodyBinding>,
    released: bool,
}

impl GpuSurface {
    /// Initialise the GPU for `window` and build every pipeline.
    pub fn new(window: Arc<Window>, vsync: bool) -> Result<Self, RenderContextError> {
        let size = window.inner_size();
        let context = init_render_context_blocking(window, vsync)?;
        let device = &context.device;

        let depth = DepthBuffer::new(device, size.width, size.height);
        let pipelines = ScenePipelines::new(device, context.surface_format);

        let frame_uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame-uniform"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame-bind-group"),
            layout: &pipelines.frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_uniform.as_entire_binding(),
            }],
        });

        let sphere = generate_uv_sphere(WIDTH_SEGMENTS, HEIGHT_SEGMENTS);
        let sphere_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere-vertices"),
            contents: bytemuck::cast_slice(&sphere.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let sphere_indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere-indices"),
            contents: bytemuck::cast_slice(&sphere.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let flat_normal = GpuTexture::solid(
            device,
            &context.queue,
            "flat-normal",
            FLAT_NORMAL,
            ColorSpace::Linear,
        )?;

        log::info!(
            "GPU surface ready: {}x{}, {:?}, anisotropy {}",
            size.width,
            size.height,
            context.surface_format,
            context.max_anisotropy
        );

        Ok(Self {
            depth,
            size: (size.width, size.height),
            pipelines,
            frame_uniform,
            frame_bind_group,
            sphere_vertices,
            sphere_indices,
            sphere_index_count: sphere.indices.len() as u32,
            textures: Default::default(),
            flat_normal,
            bodies: HashMap::new(),
            released: false,
            context,
        })
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    fn texture(&self, slot: TextureSlot) -> Result<&GpuTexture, SurfaceError> {
        self.textures[slot.index()]
            .as_ref()
            .ok_or_else(|| SurfaceError::Backend(format!("texture {slot:?} is not installed")))
    }

    /// Make sure `draw` has a bind group for its current textures and write its uniform.
    fn prepare_body(&mut self, draw: &BodyDraw) -> Result<(), SurfaceError> {
        let stale = self
            .bodies
            .get(&draw.kind)
            .is_none_or(|b| b.texture != draw.texture || b.normal_map != draw.normal_map);
        if stale {
            let color = self.texture(draw.texture)?;
            let normal = match draw.normal_map {
                Some(slot) => self.texture(slot)?,
                None => &self.flat_normal,
            };
            let device = &self.context.device;
            let uniform = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("body-uniform"),
                size: std::mem::size_of::<ObjectUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("body-bind-group"),
                layout: &self.pipelines.body_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&color.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(&normal.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::Sampler(&color.sampler),
                    },
                ],
            });
            log::debug!("Created bind group for {:?}", draw.kind);
            self.bodies.insert(
                draw.kind,
                BodyBinding {
                    texture: draw.texture,
                    normal_map: draw.normal_map,
                    uniform,
                    bind_group,
                },
            );
        }

        if let Some(binding) = self.bodies.get(&draw.kind) {
            self.context.queue.write_buffer(
                &binding.uniform,
                0,
                bytemuck::bytes_of(&ObjectUniform::body(draw)),
            );
        }
        Ok(())
    }

    fn draw_body(&self, pass: &mut wgpu::RenderPass<'_>, draw: &BodyDraw) {
        let Some(binding) = self.bodies.get(&draw.kind) else {
            return;
        };
        pass.set_pipeline(self.pipelines.body(BodyPass::for_draw(draw)));
        pass.set_bind_group(1, &binding.bind_group, &[]);
        pass.set_vertex_buffer(0, self.sphere_vertices.slice(..));
        pass.set_index_buffer(self.sphere_indices.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.sphere_index_count, 0, 0..1);
    }
}

/// Split bodies into opaque ones and blended ones, the latter sorted far to near.
pub fn order_bodies(bodies: &[BodyDraw], camera: Vec3) -> (Vec<&BodyDraw>, Vec<&BodyDraw>) {
    let (opaque, mut blended): (Vec<&BodyDraw>, Vec<&BodyDraw>) = bodies
        .iter()
        .partition(|draw| !BodyPass::for_draw(draw).is_blended());
    let distance = |draw: &BodyDraw| camera.distance_squared(draw.model.w_axis.truncate());
    blended.sort_by(|a, b| distance(b).total_cmp(&distance(a)));
    (opaque, blended)
}

impl RenderSurface for GpuSurface {
    type LetterMesh = GpuLetter;

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn max_anisotropy(&self) -> u16 {
        self.context.max_anisotropy
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        if width == 0 || height == 0 {
            return;
        }
        self.context.resize(width, height);
        self.depth.resize(&self.context.device, width, height);
    }

    fn install_textures(
        &mut self,
        textures: &[(TextureSlot, TextureData)],
    ) -> Result<(), SurfaceError> {
        for (slot, data) in textures {
            let texture = GpuTexture::upload(&self.context.device, &self.context.queue, data)?;
            self.textures[slot.index()] = Some(texture);
        }
        self.bodies.clear();
        log::info!("Installed {} textures", textures.len());
        Ok(())
    }

    fn upload_letter(&mut self, mesh: &GlyphMesh) -> Result<GpuLetter, SurfaceError> {
        if self.released {
            return Err(SurfaceError::Backend("surface already released".into()));
        }
        let device = &self.context.device;

        let geometry = (!mesh.is_empty()).then(|| {
            let vertices: Vec<LetterVertex> = mesh.vertices.iter().map(LetterVertex::from).collect();
            LetterGeometry {
                vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("letter-vertices"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("letter-indices"),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
                index_count: mesh.indices.len() as u32,
            }
        });

        let uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("letter-uniform"),
            size: std::mem::size_of::<ObjectUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("letter-bind-group"),
            layout: &self.pipelines.letter_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            }],
        });

        Ok(GpuLetter {
            geometry,
            uniform,
            bind_group,
        })
    }

    fn render(&mut self, frame: &Frame<'_, GpuLetter>) -> Result<(), SurfaceError> {
        if self.released {
            return Err(SurfaceError::Backend("surface already released".into()));
        }
        let (width, height) = self.size;
        if width == 0 || height == 0 {
            return Ok(());
        }

        for draw in &frame.bodies {
            self.prepare_body(draw)?;
        }

        let Some(output) = self.context.get_current_texture()? else {
            return Ok(());
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let queue = &self.context.queue;
        let frame_uniform = FrameUniform::new(frame.view_proj, frame.camera_position, &frame.lighting);
        queue.write_buffer(&self.frame_uniform, 0, bytemuck::bytes_of(&frame_uniform));
        for letter in &frame.letters {
            queue.write_buffer(
                &letter.mesh.uniform,
                0,
                bytemuck::bytes_of(&ObjectUniform::letter(letter.model, letter.color)),
            );
        }

        let (opaque, blended) = order_bodies(&frame.bodies, frame.camera_position);

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene-encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(DepthBuffer::CLEAR_VALUE),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_bind_group(0, &self.frame_bind_group, &[]);

            for draw in opaque {
                self.draw_body(&mut pass, draw);
            }

            pass.set_pipeline(&self.pipelines.letter);
            for letter in &frame.letters {
                let Some(geometry) = &letter.mesh.geometry else {
                    continue;
                };
                pass.set_bind_group(1, &letter.mesh.bind_group, &[]);
                pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
                pass.set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..geometry.index_count, 0, 0..1);
            }

            for draw in blended {
                self.draw_body(&mut pass, draw);
            }
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.bodies.clear();
        for texture in self.textures.iter_mut().filter_map(Option::take) {
            texture.texture.destroy();
        }
        self.sphere_vertices.destroy();
        self.sphere_indices.destroy();
        log::info!("GPU surface released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;
    use orbiter_scene::{Material, Rgb};

    fn body(kind: BodyKind, center: Vec3, opacity: f32, inside_out: bool) -> BodyDraw {
        BodyDraw {
            kind,
            model: Mat4::from_translation(center),
            texture: TextureSlot::Moon,
            normal_map: None,
            tint: Rgb::WHITE,
            opacity,
            inside_out,
            material: Material {
                metalness: 0.0,
                roughness: 1.0,
                lit: true,
            },
        }
    }

    #[test]
    fn test_opaque_bodies_keep_submission_order() {
        let bodies = [
            body(BodyKind::Jupiter, Vec3::new(-62.0, 24.0, -48.0), 1.0, false),
            body(BodyKind::Moon, Vec3::new(48.0, 16.0, 20.0), 1.0, false),
        ];
        let (opaque, blended) = order_bodies(&bodies, Vec3::new(0.0, 20.0, 130.0));
        assert!(blended.is_empty());
        let kinds: Vec<_> = opaque.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![BodyKind::Jupiter, BodyKind::Moon]);
    }

    #[test]
    fn test_blended_bodies_sorted_far_to_near() {
        let bodies = [
            body(BodyKind::Clouds, Vec3::ZERO, 0.55, false),
            body(BodyKind::Earth, Vec3::ZERO, 1.0, false),
            body(BodyKind::Sky, Vec3::new(0.0, 0.0, -50.0), 0.2, true),
        ];
        let (opaque, blended) = order_bodies(&bodies, Vec3::new(0.0, 20.0, 130.0));
        assert_eq!(opaque.len(), 1);
        let kinds: Vec<_> = blended.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![BodyKind::Sky, BodyKind::Clouds]);
    }

    #[test]
    fn test_texture_error_maps_to_backend() {
        let err: SurfaceError = TextureError::ZeroDimensions {
            name: "moon".into(),
            width: 0,
            height: 0,
        }
        .into();
        assert!(matches!(err, SurfaceError::Backend(msg) if msg.contains("moon")));
    }
}
