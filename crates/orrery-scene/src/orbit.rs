//! Parametric orbit evaluation and model matrix composition.
//!
//! Orbits are cosmetic curves, not simulated: every function here is a pure
//! function of its arguments. Time and unwrapped angles stay `f64`; only the
//! angle wrapped into one turn is narrowed for glam.

use std::f64::consts::TAU;

use glam::{Mat4, Quat, Vec3};

use crate::body::{Motion, Orbit};

/// Unwrapped orbit angle in radians after `t` seconds.
///
/// `time_scale` only applies when the motion is time-scaled.
pub fn orbit_angle(motion: &Motion, t: f64, time_scale: f32) -> f64 {
    let scale = if motion.time_scaled {
        f64::from(time_scale)
    } else {
        1.0
    };
    t * f64::from(motion.angular_rate) * scale
}

/// `angle` reduced to `[0, 2π)`, then narrowed.
pub fn wrap_angle(angle: f64) -> f32 {
    angle.rem_euclid(TAU) as f32
}

/// World position of a body at orbit angle `angle`.
///
/// `anchor` is the scene center for heliocentric orbits and the parent's
/// position this frame for satellites. Fixed orbits ignore it.
pub fn orbital_position(orbit: &Orbit, angle: f32, t: f64, anchor: Vec3) -> Vec3 {
    match *orbit {
        Orbit::Fixed { position } => position,
        Orbit::Heliocentric {
            radius_offset,
            y_amplitude,
        } => Vec3::new(
            (anchor.x + radius_offset) * angle.cos(),
            (anchor.y + y_amplitude) * angle.sin(),
            (anchor.z + radius_offset) * angle.sin(),
        ),
        Orbit::Satellite {
            radius,
            y_amplitude,
            y_rate,
            ..
        } => Vec3::new(
            anchor.x + radius * (-angle).cos(),
            anchor.y + y_amplitude * wrap_angle(t * f64::from(y_rate)).sin(),
            anchor.z + radius * (-angle).sin(),
        ),
    }
}

/// `T(position) · Rz(tilt) · Ry(spin_angle) · S(scale)`.
pub fn model_matrix(position: Vec3, axial_tilt_deg: f32, spin_angle: f32, scale: Vec3) -> Mat4 {
    Mat4::from_translation(position)
        * Mat4::from_quat(Quat::from_rotation_z(axial_tilt_deg.to_radians()))
        * Mat4::from_quat(Quat::from_rotation_y(spin_angle))
        * Mat4::from_scale(scale)
}
