//! GPU buffers for the scene: the shared sphere mesh, per-draw instances and uniforms.

use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use thiserror::Error;
use wgpu::util::DeviceExt;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("{label} needs {size} bytes, over the device limit of {limit}")]
    TooLarge { label: String, size: u64, limit: u64 },
}

/// Fails when `size` bytes exceed `limit` (the device's `max_buffer_size`).
pub fn check_buffer_size(label: &str, size: u64, limit: u64) -> Result<(), BufferError> {
    if size > limit {
        return Err(BufferError::TooLarge {
            label: label.to_string(),
            size,
            limit,
        });
    }
    Ok(())
}

/// An uploaded indexed mesh.
pub struct MeshBuffer {
    /// Interleaved vertices of the shared mesh.
    pub vertex_buffer: wgpu::Buffer,
    /// Triangle list indices.
    pub index_buffer: wgpu::Buffer,
    /// Indices drawn per instance.
    pub index_count: u32,
    /// `Uint16` when every vertex fits in 16 bits.
    pub index_format: wgpu::IndexFormat,
}

impl MeshBuffer {
    /// Vertex slot 0 plus the index buffer.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), self.index_format);
    }

    pub fn draw_instances(&self, render_pass: &mut wgpu::RenderPass<'_>, instances: Range<u32>) {
        render_pass.draw_indexed(0..self.index_count, 0, instances);
    }

    pub fn destroy(&self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

pub enum IndexData<'a> {
    U16(&'a [u16]),
    U32(&'a [u32]),
}

impl IndexData<'_> {
    pub fn format(&self) -> wgpu::IndexFormat {
        match self {
            Self::U16(_) => wgpu::IndexFormat::Uint16,
            Self::U32(_) => wgpu::IndexFormat::Uint32,
        }
    }

    pub fn count(&self) -> u32 {
        let len = match self {
            Self::U16(indices) => indices.len(),
            Self::U32(indices) => indices.len(),
        };
        len as u32
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::U16(indices) => bytemuck::cast_slice(indices),
            Self::U32(indices) => bytemuck::cast_slice(indices),
        }
    }
}

/// `indices` narrowed to 16 bits when every vertex is addressable that way.
pub fn narrow_indices(indices: &[u32], vertex_count: usize) -> Option<Vec<u16>> {
    (vertex_count <= usize::from(u16::MAX)).then(|| indices.iter().map(|&i| i as u16).collect())
}

/// Creates the renderer's buffers on one device.
pub struct BufferAllocator<'a> {
    device: &'a wgpu::Device,
}

impl<'a> BufferAllocator<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self { device }
    }

    fn init(&self, label: &str, contents: &[u8], usage: wgpu::BufferUsages) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: usage | wgpu::BufferUsages::COPY_DST,
            })
    }

    /// Upload interleaved vertex bytes and their indices as one mesh.
    ///
    /// Either buffer exceeding the device's `max_buffer_size` is `BufferError::TooLarge`.
    pub fn create_mesh(
        &self,
        label: &str,
        vertices: &[u8],
        indices: IndexData,
    ) -> Result<MeshBuffer, BufferError> {
        let limit = self.device.limits().max_buffer_size;
        check_buffer_size(&format!("{label}-vertices"), vertices.len() as u64, limit)?;
        check_buffer_size(&format!("{label}-indices"), indices.as_bytes().len() as u64, limit)?;

        Ok(MeshBuffer {
            vertex_buffer: self.create_vertex_buffer(&format!("{label}-vertices"), vertices),
            index_buffer: self.init(
                &format!("{label}-indices"),
                indices.as_bytes(),
                wgpu::BufferUsages::INDEX,
            ),
            index_count: indices.count(),
            index_format: indices.format(),
        })
    }

    pub fn create_vertex_buffer(&self, label: &str, data: &[u8]) -> wgpu::Buffer {
        self.init(label, data, wgpu::BufferUsages::VERTEX)
    }

    pub fn create_uniform_buffer<T: Pod>(&self, label: &str, value: &T) -> wgpu::Buffer {
        self.init(label, bytemuck::bytes_of(value), wgpu::BufferUsages::UNIFORM)
    }
}

/// Per-draw data: model matrix and its inverse-transpose for normals.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct BodyInstance {
    /// Object to world, column-major.
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`, for normals under non-uniform scale.
    pub normal: [[f32; 4]; 4],
}

static_assertions::assert_eq_size!(BodyInstance, [f32; 32]);

impl BodyInstance {
    pub fn new(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal: model.inverse().transpose().to_cols_array_2d(),
        }
    }

    /// Slot 1, stepped per instance. Each matrix is four vec4 columns.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<BodyInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &wgpu::vertex_attr_array![
            3 => Float32x4,
            4 => Float32x4,
            5 => Float32x4,
            6 => Float32x4,
            7 => Float32x4,
            8 => Float32x4,
            9 => Float32x4,
            10 => Float32x4,
        ],
    };
}

/// One [`BodyInstance`] slot per draw item, rewritten every frame.
///
/// Capacity is a power of two and only grows; item `i` is drawn with
/// instance range `i..i + 1`.
pub struct InstanceBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
}

impl InstanceBuffer {
    pub fn new(device: &wgpu::Device, min_capacity: usize) -> Self {
        let capacity = min_capacity.max(1).next_power_of_two();
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("body-instances"),
            size: (capacity * std::mem::size_of::<BodyInstance>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { buffer, capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Upload `instances` from slot 0, reallocating first if they do not fit.
    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, instances: &[BodyInstance]) {
        if instances.len() > self.capacity {
            let grown = Self::new(device, instances.len());
            log::debug!("Instance buffer {} -> {} slots", self.capacity, grown.capacity);
            std::mem::replace(self, grown).destroy();
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(instances));
        }
    }

    /// Instance slot 1.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(1, self.buffer.slice(..));
    }

    pub fn destroy(&self) {
        self.buffer.destroy();
    }
}

pub fn instance_range(index: usize) -> Range<u32> {
    let i = index as u32;
    i..i + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;
    use glam::Vec3;

    #[test]
    fn test_sphere_mesh_upload() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let sphere = orrery_mesh::generate_uv_sphere(8, 4, 1.0).unwrap();
        let mesh = BufferAllocator::new(&device)
            .create_mesh("sphere", sphere.vertex_bytes(), IndexData::U32(&sphere.indices))
            .unwrap();

        assert_eq!(mesh.index_count, 8 * 4 * 6);
        assert_eq!(mesh.index_format, wgpu::IndexFormat::Uint32);
        assert_eq!(mesh.vertex_buffer.size(), 9 * 5 * 32);
        mesh.destroy();
    }

    #[test]
    fn test_small_spheres_use_16_bit_indices() {
        let default = orrery_mesh::generate_uv_sphere(128, 128, 1.0).unwrap();
        let narrow = narrow_indices(&default.indices, default.vertex_count()).unwrap();
        assert_eq!(narrow.len(), default.indices.len());
        assert_eq!(narrow.last().map(|&i| u32::from(i)), default.indices.last().copied());
        assert_eq!(IndexData::U16(&narrow).as_bytes().len(), default.indices.len() * 2);

        // 256² segments need 257² = 66049 vertices.
        let fine = orrery_mesh::generate_uv_sphere(256, 256, 1.0).unwrap();
        assert!(narrow_indices(&fine.indices, fine.vertex_count()).is_none());
    }

    #[test]
    fn test_oversized_buffer_is_rejected() {
        const DEFAULT_LIMIT: u64 = 256 << 20;
        // 3000 segments: 3001² vertices of 32 bytes.
        let vertex_bytes = 3001u64 * 3001 * 32;
        assert_eq!(
            check_buffer_size("sphere-vertices", vertex_bytes, DEFAULT_LIMIT),
            Err(BufferError::TooLarge {
                label: "sphere-vertices".to_string(),
                size: vertex_bytes,
                limit: DEFAULT_LIMIT,
            })
        );
        // 1024 segments fit.
        assert!(check_buffer_size("sphere-vertices", 1025 * 1025 * 32, DEFAULT_LIMIT).is_ok());
        assert!(check_buffer_size("exact", DEFAULT_LIMIT, DEFAULT_LIMIT).is_ok());
    }

    #[test]
    fn test_instance_buffer_grows_to_power_of_two() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let mut instances = InstanceBuffer::new(&device, 11);
        assert_eq!(instances.capacity(), 16);

        let items = vec![BodyInstance::new(Mat4::IDENTITY); 17];
        instances.write(&device, &queue, &items);
        assert_eq!(instances.capacity(), 32);

        instances.write(&device, &queue, &items[..3]);
        assert_eq!(instances.capacity(), 32);
        assert_eq!(InstanceBuffer::new(&device, 0).capacity(), 1);
    }

    #[test]
    fn test_index_data_formats() {
        let short = IndexData::U16(&[0, 1, 2]);
        let long = IndexData::U32(&[0, 1, 2]);
        assert_eq!(short.format(), wgpu::IndexFormat::Uint16);
        assert_eq!(long.format(), wgpu::IndexFormat::Uint32);
        assert_eq!((short.as_bytes().len(), long.as_bytes().len()), (6, 12));
        assert_eq!(long.count(), 3);
    }

    #[test]
    fn test_instance_layout_is_128_bytes_at_locations_3_to_10() {
        let layout = BodyInstance::LAYOUT;
        assert_eq!(layout.array_stride, 128);
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Instance);
        let locations: Vec<u32> = layout.attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, (3..=10).collect::<Vec<_>>());
        for (i, attr) in layout.attributes.iter().enumerate() {
            assert_eq!(attr.offset, i as u64 * 16);
        }
    }

    #[test]
    fn test_instance_range_is_single_slot() {
        assert_eq!(instance_range(0), 0..1);
        assert_eq!(instance_range(7), 7..8);
    }

    #[test]
    fn test_instance_normal_matrix_undoes_nonuniform_scale() {
        let model = Mat4::from_scale(Vec3::new(10.0, 1.0, 10.0));
        let instance = BodyInstance::new(model);
        let normal = Mat4::from_cols_array_2d(&instance.normal);
        let n = normal.transform_vector3(Vec3::Y).normalize();
        assert!((n - Vec3::Y).length() < 1e-6);
        let n = normal.transform_vector3(Vec3::X);
        assert!((n.x - 0.1).abs() < 1e-6);
    }
}
