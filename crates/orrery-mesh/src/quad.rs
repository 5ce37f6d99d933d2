//! Full-screen background quad.

use bytemuck::{Pod, Zeroable};

/// Background vertex: clip-space position and UV (4 floats, 16 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    /// Clip-space XY.
    pub position: [f32; 2],
    /// Texture coordinates.
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(QuadVertex, [f32; 4]);

/// Number of vertices drawn for the background (two triangles, non-indexed).
pub const BACKGROUND_VERTEX_COUNT: u32 = 6;

/// Two triangles covering clip space `[-1, 1]²`.
pub const BACKGROUND_QUAD: [QuadVertex; BACKGROUND_VERTEX_COUNT as usize] = [
    QuadVertex {
        position: [-1.0, 1.0],
        uv: [0.0, 1.0],
    },
    QuadVertex {
        position: [-1.0, -1.0],
        uv: [0.0, 0.0],
    },
    QuadVertex {
        position: [1.0, -1.0],
        uv: [1.0, 0.0],
    },
    QuadVertex {
        position: [-1.0, 1.0],
        uv: [0.0, 1.0],
    },
    QuadVertex {
        position: [1.0, -1.0],
        uv: [1.0, 0.0],
    },
    QuadVertex {
        position: [1.0, 1.0],
        uv: [1.0, 1.0],
    },
];
