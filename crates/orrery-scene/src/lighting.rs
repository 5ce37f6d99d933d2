//! Point light parameters for Phong shading.

use glam::Vec3;

/// A white point light. Intensities are grey levels applied to all channels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightParams {
    /// World position of the point light.
    pub position: Vec3,
    /// Ambient term, applied everywhere.
    pub ambient: f32,
    /// Lambert term weight.
    pub diffuse: f32,
    /// Highlight weight, scaled by the specular map.
    pub specular: f32,
    /// Specular exponent.
    pub shininess: f32,
}

impl LightParams {
    /// Default intensities placed at `position`.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            position: Vec3::new(1.2, 1.0, 0.0),
            ambient: 0.25,
            diffuse: 0.8,
            specular: 1.0,
            shininess: 32.0,
        }
    }
}
