//! Full-screen background pipeline.
//!
//! Runs inside the main pass before any body, with depth compare `Always`
//! and depth writes off, so it can never occlude geometry drawn after it.

use orrery_mesh::{BACKGROUND_LAYOUT, BACKGROUND_QUAD, BACKGROUND_VERTEX_COUNT};

use crate::buffer::BufferAllocator;
use crate::depth::DepthBuffer;
use crate::pipeline::{ScenePipelineDesc, build_scene_pipeline};

pub struct BackgroundPipeline {
    /// Ignores depth, so it must be drawn first.
    pub pipeline: wgpu::RenderPipeline,
    /// Full-screen quad in clip space.
    pub vertex_buffer: wgpu::Buffer,
}

impl BackgroundPipeline {
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        texture_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let pipeline = build_scene_pipeline(
            device,
            ScenePipelineDesc {
                label: "background",
                shader,
                bind_group_layouts: &[texture_bind_group_layout],
                vertex_buffers: &[BACKGROUND_LAYOUT],
                depth: DepthBuffer::ignore_depth_state(),
                surface_format,
            },
        );

        let vertex_buffer = BufferAllocator::new(device)
            .create_vertex_buffer("background-quad", bytemuck::cast_slice(&BACKGROUND_QUAD));

        Self {
            pipeline,
            vertex_buffer,
        }
    }

    /// Draw the quad with `texture` (a texture + sampler bind group).
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, texture: &wgpu::BindGroup) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, texture, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..BACKGROUND_VERTEX_COUNT, 0..1);
    }

    pub fn destroy(&self) {
        self.vertex_buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;
    use crate::shader::{SceneShader, ShaderLibrary};
    use crate::texture::TextureManager;

    #[test]
    fn test_background_pipeline_uploads_quad() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let shader = ShaderLibrary::new()
            .compile(&device, SceneShader::Background)
            .unwrap();
        let textures = TextureManager::new(&device);
        let background = BackgroundPipeline::new(
            &device,
            &shader,
            wgpu::TextureFormat::Bgra8UnormSrgb,
            textures.bind_group_layout(),
        );
        assert_eq!(background.vertex_buffer.size(), 6 * 16);
    }
}
