//! UV-sphere mesh generation shared by every celestial body.
//!
//! The sphere is a latitude/longitude grid: `x_segments + 1` columns by
//! `y_segments + 1` rows of vertices, with a duplicated seam column so the
//! equirectangular UVs cover `[0, 1]` without wrapping.

use std::f32::consts::PI;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Segment count used for the shared body mesh in both directions.
pub const DEFAULT_SEGMENTS: u32 = 128;

/// Errors returned for invalid sphere parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    /// A segment count of zero produces no triangles.
    #[error("sphere needs at least one segment in each direction, got {x_segments}x{y_segments}")]
    ZeroSegments { x_segments: u32, y_segments: u32 },

    /// The radius must be finite and strictly positive.
    #[error("sphere radius must be finite and positive, got {radius}")]
    InvalidRadius { radius: f32 },

    /// The vertex grid would not be addressable with `u32` indices.
    #[error("{x_segments}x{y_segments} sphere exceeds u32 index range")]
    TooManyVertices { x_segments: u32, y_segments: u32 },
}

/// Interleaved sphere vertex: position, normal, UV (8 floats, 32 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SphereVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Unit radial normal.
    pub normal: [f32; 3],
    /// (longitude fraction, latitude fraction).
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(SphereVertex, [f32; 8]);

/// Triangle-list sphere mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SphereMesh {
    /// Vertices in row-major order (latitude rows, longitude columns).
    pub vertices: Vec<SphereVertex>,
    /// Triangle list indices into `vertices`.
    pub indices: Vec<u32>,
}

impl SphereMesh {
    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of indices (three per triangle).
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Vertex data as a flat float slice, 8 floats per vertex.
    pub fn vertex_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Vertex data as raw bytes for GPU upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Generate a closed UV sphere centered at the origin.
///
/// Produces `(x_segments + 1) * (y_segments + 1)` vertices and
/// `x_segments * y_segments * 6` indices. Output depends only on the inputs.
pub fn generate_uv_sphere(
    x_segments: u32,
    y_segments: u32,
    radius: f32,
) -> Result<SphereMesh, MeshError> {
    if x_segments == 0 || y_segments == 0 {
        return Err(MeshError::ZeroSegments {
            x_segments,
            y_segments,
        });
    }
    if !radius.is_finite() || radius <= 0.0 {
        return Err(MeshError::InvalidRadius { radius });
    }

    let columns = u64::from(x_segments) + 1;
    let rows = u64::from(y_segments) + 1;
    if columns * rows > u64::from(u32::MAX) {
        return Err(MeshError::TooManyVertices {
            x_segments,
            y_segments,
        });
    }

    let mut vertices = Vec::with_capacity((columns * rows) as usize);
    for y in 0..=y_segments {
        for x in 0..=x_segments {
            let x_fraction = x as f32 / x_segments as f32;
            let y_fraction = y as f32 / y_segments as f32;

            let theta = y_fraction * PI;
            let phi = x_fraction * 2.0 * PI;

            let position = Vec3::new(
                radius * theta.sin() * phi.cos(),
                radius * theta.cos(),
                radius * theta.sin() * phi.sin(),
            );
            let normal = position / position.length();

            vertices.push(SphereVertex {
                position: position.to_array(),
                normal: normal.to_array(),
                uv: [x_fraction, y_fraction],
            });
        }
    }

    let row_stride = x_segments + 1;
    let mut indices = Vec::with_capacity((x_segments as usize) * (y_segments as usize) * 6);
    for y in 0..y_segments {
        for x in 0..x_segments {
            let i0 = y * row_stride + x;
            let i1 = (y + 1) * row_stride + x;

            indices.extend_from_slice(&[i0, i1, i0 + 1]);
            indices.extend_from_slice(&[i0 + 1, i1, i1 + 1]);
        }
    }

    Ok(SphereMesh { vertices, indices })
}
