//! Per-frame scene evaluation.

use glam::{Mat4, Vec3};

use crate::body::{BodyTextures, CelestialBody, Orbit, Shading};
use crate::orbit::{model_matrix, orbit_angle, orbital_position, wrap_angle};
use crate::solar_system::SceneConstants;

/// What a draw item renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawKind {
    Body,
    /// The ring attached to the body at the same index.
    Ring,
}

/// One draw call's worth of scene state.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawItem {
    /// Index of the owning body in the table.
    pub body: usize,
    /// Body or ring.
    pub kind: DrawKind,
    /// Selects the pipeline.
    pub shading: Shading,
    /// World position of the owning body.
    pub position: Vec3,
    /// Object to world for this draw; a ring has its own spin and scale.
    pub model: Mat4,
    /// Maps bound for this draw.
    pub textures: BodyTextures,
}

/// Evaluate every body at time `t`, in table order, each ring right after its body.
///
/// Satellites anchor to the already-evaluated position of their parent. A
/// satellite whose parent does not appear earlier orbits `sun_position`.
pub fn evaluate_frame(bodies: &[CelestialBody], constants: &SceneConstants, t: f64) -> Vec<DrawItem> {
    let ring_count = bodies.iter().filter(|b| b.ring.is_some()).count();
    let mut items = Vec::with_capacity(bodies.len() + ring_count);
    let mut positions: Vec<(&str, Vec3)> = Vec::with_capacity(bodies.len());

    for (index, body) in bodies.iter().enumerate() {
        let angle = orbit_angle(&body.motion, t, constants.time_scale);
        let anchor = match body.orbit {
            Orbit::Satellite { parent, .. } => positions
                .iter()
                .find(|(name, _)| *name == parent)
                .map(|(_, p)| *p)
                .unwrap_or(constants.sun_position),
            _ => constants.sun_position,
        };
        let position = orbital_position(&body.orbit, wrap_angle(angle), t, anchor);
        positions.push((body.name, position));

        items.push(DrawItem {
            body: index,
            kind: DrawKind::Body,
            shading: body.shading,
            position,
            model: model_matrix(
                position,
                body.axial_tilt_deg,
                wrap_angle(f64::from(body.spin_multiplier) * angle),
                Vec3::splat(body.scale),
            ),
            textures: body.textures,
        });

        if let Some(ring) = &body.ring {
            items.push(DrawItem {
                body: index,
                kind: DrawKind::Ring,
                shading: Shading::Lit,
                position,
                model: model_matrix(
                    position,
                    body.axial_tilt_deg,
                    wrap_angle(f64::from(ring.spin_multiplier) * angle),
                    ring.scale,
                ),
                textures: BodyTextures::diffuse(ring.texture),
            });
        }
    }

    items
}
