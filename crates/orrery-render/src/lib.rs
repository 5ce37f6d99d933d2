//! wgpu rendering: device and surface management, buffers, textures, render passes, and the orrery pipelines.

pub mod background_pipeline;
pub mod buffer;
pub mod camera;
pub mod depth;
pub mod emissive_pipeline;
pub mod frame;
pub mod gpu;
pub mod lit_pipeline;
mod pipeline;
pub mod scene_uniform;
pub mod shader;
pub mod texture;

pub use background_pipeline::BackgroundPipeline;
pub use buffer::{
    BodyInstance, BufferAllocator, BufferError, IndexData, InstanceBuffer, MeshBuffer,
    check_buffer_size, instance_range, narrow_indices,
};
pub use camera::Camera;
pub use depth::DepthBuffer;
pub use emissive_pipeline::EmissivePipeline;
pub use frame::{Frame, clear_color_from_rgb};
pub use gpu::{
    RenderContext, RenderContextError, SurfaceError, SurfaceSettings, init_render_context_blocking,
};
pub use lit_pipeline::LitPipeline;
pub use scene_uniform::{SceneUniform, scene_bind_group_layout};
pub use shader::{SceneShader, ShaderError, ShaderLibrary, compile_checked};
pub use texture::{
    ColorSpace, ManagedTexture, Placeholder, TextureError, TextureManager, TexturePixels,
    TextureSource, mip_level_count, resolve_texture,
};
