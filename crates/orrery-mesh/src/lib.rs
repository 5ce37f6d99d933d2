//! Procedural geometry: UV-sphere generation, the background quad, and the canonical vertex layouts.

pub mod quad;
pub mod sphere;
pub mod vertex_format;

pub use quad::{BACKGROUND_QUAD, BACKGROUND_VERTEX_COUNT, QuadVertex};
pub use sphere::{DEFAULT_SEGMENTS, MeshError, SphereMesh, SphereVertex, generate_uv_sphere};
pub use vertex_format::{
    BACKGROUND_ATTRIBUTES, BACKGROUND_LAYOUT, SPHERE_EMISSIVE_ATTRIBUTES, SPHERE_EMISSIVE_LAYOUT,
    SPHERE_LIT_ATTRIBUTES, SPHERE_LIT_LAYOUT,
};
