//! wgpu backend for the orbiting text scene: device and surface setup,
//! pipelines for textured bodies and extruded letters, and [`GpuSurface`],
//! the [`RenderSurface`](orbiter_scene::RenderSurface) the app draws through.

pub mod context;
pub mod depth;
pub mod gpu_surface;
pub mod pipeline;
pub mod sphere;
pub mod texture;
pub mod uniforms;

pub use context::{RenderContext, RenderContextError, init_render_context_blocking};
pub use depth::DepthBuffer;
pub use gpu_surface::{GpuLetter, GpuSurface, order_bodies};
pub use pipeline::{BodyPass, LetterVertex, ScenePipelines};
pub use sphere::{SphereMesh, SphereVertex, generate_uv_sphere};
pub use texture::{GpuTexture, TextureError};
pub use uniforms::{FrameUniform, ObjectUniform};
