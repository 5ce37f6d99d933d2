//! Phong-lit pipeline for textured bodies.
//!
//! Scene uniform at `@group(0)`; diffuse map, specular map and sampler at
//! `@group(1)`. Vertex slot 0 is the shared sphere, slot 1 the per-draw
//! [`BodyInstance`].

use orrery_mesh::SPHERE_LIT_LAYOUT;

use crate::buffer::BodyInstance;
use crate::depth::DepthBuffer;
use crate::pipeline::{ScenePipelineDesc, build_scene_pipeline};
use crate::texture::{ManagedTexture, sampler_entry, texture_entry};

const DIFFUSE_BINDING: u32 = 0;
const SPECULAR_BINDING: u32 = 1;
const SAMPLER_BINDING: u32 = 2;

pub struct LitPipeline {
    /// Phong-lit bodies and rings.
    pub pipeline: wgpu::RenderPipeline,
    /// `@group(1)`: diffuse, specular, sampler.
    pub material_bind_group_layout: wgpu::BindGroupLayout,
}

impl LitPipeline {
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        scene_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let material_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("lit-material"),
                entries: &[
                    texture_entry(DIFFUSE_BINDING),
                    texture_entry(SPECULAR_BINDING),
                    sampler_entry(SAMPLER_BINDING),
                ],
            });

        let pipeline = build_scene_pipeline(
            device,
            ScenePipelineDesc {
                label: "lit",
                shader,
                bind_group_layouts: &[scene_bind_group_layout, &material_bind_group_layout],
                vertex_buffers: &[SPHERE_LIT_LAYOUT, BodyInstance::LAYOUT],
                depth: DepthBuffer::depth_stencil_state(),
                surface_format,
            },
        );

        Self {
            pipeline,
            material_bind_group_layout,
        }
    }

    /// The material of one body: its diffuse and specular maps.
    pub fn create_material_bind_group(
        &self,
        device: &wgpu::Device,
        label: &str,
        diffuse: &ManagedTexture,
        specular: &ManagedTexture,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        fn view(binding: u32, texture: &ManagedTexture) -> wgpu::BindGroupEntry<'_> {
            wgpu::BindGroupEntry {
                binding,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            }
        }
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.material_bind_group_layout,
            entries: &[
                view(DIFFUSE_BINDING, diffuse),
                view(SPECULAR_BINDING, specular),
                wgpu::BindGroupEntry {
                    binding: SAMPLER_BINDING,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;
    use crate::scene_uniform::scene_bind_group_layout;
    use crate::shader::{SceneShader, ShaderLibrary};
    use crate::texture::{Placeholder, TextureManager};

    #[test]
    fn test_material_binds_placeholder_maps() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let shader = ShaderLibrary::new()
            .compile(&device, SceneShader::Lit)
            .unwrap();
        let lit = LitPipeline::new(
            &device,
            &shader,
            wgpu::TextureFormat::Bgra8UnormSrgb,
            &scene_bind_group_layout(&device),
        );

        let mut textures = TextureManager::new(&device);
        let diffuse = textures.placeholder(&device, &queue, Placeholder::Diffuse);
        let specular = textures.placeholder(&device, &queue, Placeholder::Specular);
        let _material =
            lit.create_material_bind_group(&device, "moon", &diffuse, &specular, textures.sampler());
    }
}
