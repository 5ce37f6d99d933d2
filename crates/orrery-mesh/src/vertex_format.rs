//! Canonical `wgpu::VertexBufferLayout`s for sphere and background rendering.
//!
//! The lit and emissive pipelines share one sphere vertex buffer but read
//! different attribute subsets from it.
//!
//! | Layout          | Location | Offset | Format    | Field    |
//! |-----------------|----------|--------|-----------|----------|
//! | sphere lit      | 0        | 0      | Float32x3 | position |
//! |                 | 1        | 12     | Float32x3 | normal   |
//! |                 | 2        | 24     | Float32x2 | uv       |
//! | sphere emissive | 0        | 0      | Float32x3 | position |
//! |                 | 1        | 24     | Float32x2 | uv       |
//! | background      | 0        | 0      | Float32x2 | position |
//! |                 | 1        | 8      | Float32x2 | uv       |

use std::mem;

use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

use crate::quad::QuadVertex;
use crate::sphere::SphereVertex;

/// Position, normal and UV for the lit body shader.
pub const SPHERE_LIT_ATTRIBUTES: [VertexAttribute; 3] = [
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 12,
        shader_location: 1,
    },
    VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: 24,
        shader_location: 2,
    },
];

/// Lit sphere layout, one [`SphereVertex`] per element.
pub const SPHERE_LIT_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<SphereVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &SPHERE_LIT_ATTRIBUTES,
};

/// Position and UV only; the normal is skipped.
pub const SPHERE_EMISSIVE_ATTRIBUTES: [VertexAttribute; 2] = [
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: 24,
        shader_location: 1,
    },
];

/// Emissive sphere layout over the same buffer as [`SPHERE_LIT_LAYOUT`].
pub const SPHERE_EMISSIVE_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<SphereVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &SPHERE_EMISSIVE_ATTRIBUTES,
};

/// Clip-space position and UV for the background quad.
pub const BACKGROUND_ATTRIBUTES: [VertexAttribute; 2] = [
    VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: 0,
        shader_location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: 8,
        shader_location: 1,
    },
];

/// Background quad layout, one [`QuadVertex`] per element.
pub const BACKGROUND_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<QuadVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &BACKGROUND_ATTRIBUTES,
};

// ---------------------------------------------------------------------------
// Compile-time validation
// ---------------------------------------------------------------------------

const _: () = assert!(
    mem::size_of::<SphereVertex>() == 32,
    "SphereVertex size changed, update the sphere layouts"
);
const _: () = assert!(
    mem::size_of::<QuadVertex>() == 16,
    "QuadVertex size changed, update BACKGROUND_LAYOUT"
);

const _: () = assert!(SPHERE_LIT_ATTRIBUTES[1].offset == mem::offset_of!(SphereVertex, normal) as u64);
const _: () = assert!(SPHERE_LIT_ATTRIBUTES[2].offset == mem::offset_of!(SphereVertex, uv) as u64);
const _: () = assert!(SPHERE_EMISSIVE_ATTRIBUTES[1].offset == mem::offset_of!(SphereVertex, uv) as u64);
const _: () = assert!(BACKGROUND_ATTRIBUTES[1].offset == mem::offset_of!(QuadVertex, uv) as u64);
