//! Celestial body records: one entry per drawn sphere, plus optional ring.

use glam::Vec3;

/// How a body is lit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shading {
    /// Self-illuminated: texture only, no lighting.
    Emissive,
    /// Phong-lit by the scene's point light.
    Lit,
}

/// Texture paths relative to the asset directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyTextures {
    /// Color map, relative to the asset dir.
    pub diffuse: &'static str,
    /// `None` means the body has no specular highlight.
    pub specular: Option<&'static str>,
}

impl BodyTextures {
    /// A diffuse map without a specular map.
    pub const fn diffuse(path: &'static str) -> Self {
        Self {
            diffuse: path,
            specular: None,
        }
    }
}

/// Angular motion of a body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    /// Radians per second before time scaling.
    pub angular_rate: f32,
    /// Whether the global time scale applies to this body.
    pub time_scaled: bool,
}

impl Motion {
    pub const fn scaled(angular_rate: f32) -> Self {
        Self {
            angular_rate,
            time_scaled: true,
        }
    }

    pub const fn unscaled(angular_rate: f32) -> Self {
        Self {
            angular_rate,
            time_scaled: false,
        }
    }
}

/// Where a body sits each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Orbit {
    /// Never moves.
    Fixed { position: Vec3 },
    /// Circles the scene center in XZ while bobbing in Y with the same angle.
    Heliocentric { radius_offset: f32, y_amplitude: f32 },
    /// Circles a parent body retrograde, with an independent Y oscillation.
    Satellite {
        parent: &'static str,
        radius: f32,
        y_amplitude: f32,
        /// Radians per second of the Y oscillation, never time-scaled.
        y_rate: f32,
    },
}

/// A textured ring drawn around its parent body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingAttachment {
    /// Diffuse map of the ring.
    pub texture: &'static str,
    /// Spin relative to the parent's orbit angle.
    pub spin_multiplier: f32,
    /// Non-uniform scale (flattened in Y).
    pub scale: Vec3,
}

/// One body of the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct CelestialBody {
    /// Unique name, also used by satellites to reference their parent.
    pub name: &'static str,
    /// Diffuse and optional specular map.
    pub textures: BodyTextures,
    /// Emissive for the sun, lit for everything else.
    pub shading: Shading,
    /// Angular rate of the orbit and, through `spin_multiplier`, of the spin.
    pub motion: Motion,
    /// Path the body follows.
    pub orbit: Orbit,
    /// Rotation about Z applied before spin, in degrees.
    pub axial_tilt_deg: f32,
    /// Spin angle as a multiple of the orbit angle. Negative spins retrograde.
    pub spin_multiplier: f32,
    /// Uniform scale of the unit sphere.
    pub scale: f32,
    /// Drawn right after the body, sharing its position and tilt.
    pub ring: Option<RingAttachment>,
}

impl CelestialBody {
    /// Iterate every texture path this body needs, ring included.
    pub fn texture_paths(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.textures.diffuse)
            .chain(self.textures.specular)
            .chain(self.ring.map(|r| r.texture))
    }
}
