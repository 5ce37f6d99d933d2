//! Scene model for the orrery: celestial bodies, parametric orbits, and per-frame draw lists.
//!
//! Everything here is CPU-only and deterministic; the renderer consumes
//! [`DrawItem`]s produced by [`evaluate_frame`].

pub mod body;
pub mod frame;
pub mod lighting;
pub mod orbit;
pub mod solar_system;

pub use body::{BodyTextures, CelestialBody, Motion, Orbit, RingAttachment, Shading};
pub use frame::{DrawItem, DrawKind, evaluate_frame};
pub use lighting::LightParams;
pub use orbit::{model_matrix, orbit_angle, orbital_position, wrap_angle};
pub use solar_system::{BACKGROUND_TEXTURE, SceneConstants, SceneError, SolarSystem, default_bodies};
