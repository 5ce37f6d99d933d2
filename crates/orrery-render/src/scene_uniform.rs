//! Per-frame scene uniform shared by the body pipelines at `@group(0)`.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use orrery_scene::LightParams;

use crate::camera::Camera;

/// Camera and light state for one frame, std140-compatible (112 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SceneUniform {
    /// Reverse-Z projection times view.
    pub view_proj: [[f32; 4]; 4],
    /// xyz = camera position.
    pub view_pos: [f32; 4],
    /// xyz = light position.
    pub light_position: [f32; 4],
    /// ambient, diffuse, specular, shininess.
    pub light_terms: [f32; 4],
}

static_assertions::const_assert_eq!(std::mem::size_of::<SceneUniform>(), 112);

impl SceneUniform {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    pub fn new(camera: &Camera, light: &LightParams) -> Self {
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            view_pos: camera.position.extend(1.0).to_array(),
            light_position: light.position.extend(1.0).to_array(),
            light_terms: [light.ambient, light.diffuse, light.specular, light.shininess],
        }
    }
}

/// Layout for the scene uniform buffer, visible to both shader stages.
pub fn scene_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("scene-bind-group-layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(SceneUniform::SIZE),
            },
            count: None,
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_uniform_carries_camera_and_light() {
        let camera = Camera {
            position: Vec3::new(0.0, 5.0, 40.0),
            ..Camera::default()
        };
        let light = LightParams::default();
        let uniform = SceneUniform::new(&camera, &light);

        assert_eq!(uniform.view_pos, [0.0, 5.0, 40.0, 1.0]);
        assert_eq!(uniform.light_position, [1.2, 1.0, 0.0, 1.0]);
        assert_eq!(uniform.light_terms, [0.25, 0.8, 1.0, 32.0]);
        assert_eq!(
            uniform.view_proj,
            camera.view_projection_matrix().to_cols_array_2d()
        );
    }

    #[test]
    fn test_uniform_size_is_multiple_of_16() {
        assert_eq!(SceneUniform::SIZE % 16, 0);
    }
}
