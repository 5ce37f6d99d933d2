//! Unlit pipeline for the sun: texture only, depth tested.

use orrery_mesh::SPHERE_EMISSIVE_LAYOUT;

use crate::buffer::BodyInstance;
use crate::depth::DepthBuffer;
use crate::pipeline::{ScenePipelineDesc, build_scene_pipeline};

pub struct EmissivePipeline {
    /// Unlit textured sphere; `@group(1)` is a single texture.
    pub pipeline: wgpu::RenderPipeline,
}

impl EmissivePipeline {
    /// `texture_bind_group_layout` is the single texture + sampler layout (group 1).
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        scene_bind_group_layout: &wgpu::BindGroupLayout,
        texture_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let pipeline = build_scene_pipeline(
            device,
            ScenePipelineDesc {
                label: "emissive",
                shader,
                bind_group_layouts: &[scene_bind_group_layout, texture_bind_group_layout],
                vertex_buffers: &[SPHERE_EMISSIVE_LAYOUT, BodyInstance::LAYOUT],
                depth: DepthBuffer::depth_stencil_state(),
                surface_format,
            },
        );

        Self { pipeline }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;
    use crate::scene_uniform::scene_bind_group_layout;
    use crate::shader::{SceneShader, ShaderLibrary};
    use crate::texture::TextureManager;

    #[test]
    fn test_emissive_pipeline_creation() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let shader = ShaderLibrary::new()
            .compile(&device, SceneShader::Emissive)
            .unwrap();
        let textures = TextureManager::new(&device);
        let _pipeline = EmissivePipeline::new(
            &device,
            &shader,
            wgpu::TextureFormat::Bgra8UnormSrgb,
            &scene_bind_group_layout(&device),
            textures.bind_group_layout(),
        );
    }
}
