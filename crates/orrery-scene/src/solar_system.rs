//! The body table and its validation.

use std::collections::HashSet;

use glam::Vec3;

use crate::body::{BodyTextures, CelestialBody, Motion, Orbit, RingAttachment, Shading};
use crate::frame::{DrawItem, evaluate_frame};
use crate::lighting::LightParams;

/// Scene-wide tunables shared by every body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneConstants {
    /// Fixed position of the sun, which is also the light position and orbit center.
    pub sun_position: Vec3,
    /// Multiplier applied to time-scaled orbit angles.
    pub time_scale: f32,
    /// Distance unit for heliocentric orbit radii.
    pub size_scale: f32,
    /// Scale of the sun sphere, also added to inner-planet orbit radii.
    pub sun_size: f32,
}

impl Default for SceneConstants {
    fn default() -> Self {
        Self {
            sun_position: Vec3::new(1.2, 1.0, 0.0),
            time_scale: 0.01,
            size_scale: 10.0,
            sun_size: 12.8,
        }
    }
}

/// Errors returned for an inconsistent body table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("body table is empty")]
    Empty,

    #[error("duplicate body name '{name}'")]
    DuplicateName { name: String },

    #[error("body '{body}' orbits '{parent}', which is not defined before it")]
    UnknownParent { body: String, parent: String },

    #[error("body '{body}' has invalid scale {scale}")]
    InvalidScale { body: String, scale: f32 },

    #[error("scene constant '{name}' must be finite, got {value}")]
    NonFiniteConstant { name: &'static str, value: f32 },
}

/// The default solar system table.
///
/// Inner planets orbit just outside the sun's surface; outer planets use the
/// plain distance unit.
pub fn default_bodies(constants: &SceneConstants) -> Vec<CelestialBody> {
    let sun = constants.sun_size;
    let k = constants.size_scale;

    let planet = |name: &'static str,
                  diffuse: &'static str,
                  rate: f32,
                  radius_offset: f32,
                  tilt: f32,
                  spin: f32,
                  scale: f32| CelestialBody {
        name,
        textures: BodyTextures::diffuse(diffuse),
        shading: Shading::Lit,
        motion: Motion::scaled(rate),
        orbit: Orbit::Heliocentric {
            radius_offset,
            y_amplitude: 2.5,
        },
        axial_tilt_deg: tilt,
        spin_multiplier: spin,
        scale,
        ring: None,
    };

    let mut saturn = planet("saturn", "saturn.png", 1.01, 9.58 * k, 26.7, 2.0, 6.844);
    saturn.ring = Some(RingAttachment {
        texture: "saturn_ring.png",
        spin_multiplier: 4.7,
        scale: Vec3::new(10.0, 1.0, 10.0),
    });

    vec![
        CelestialBody {
            name: "sun",
            textures: BodyTextures::diffuse("sun.png"),
            shading: Shading::Emissive,
            motion: Motion::unscaled(0.12),
            orbit: Orbit::Fixed {
                position: constants.sun_position,
            },
            axial_tilt_deg: 7.25,
            spin_multiplier: 1.0,
            scale: sun,
            ring: None,
        },
        CelestialBody {
            name: "earth",
            textures: BodyTextures {
                diffuse: "earth.png",
                specular: Some("earth_specular.png"),
            },
            shading: Shading::Lit,
            motion: Motion::scaled(29.78),
            orbit: Orbit::Heliocentric {
                radius_offset: sun + 1.0 * k,
                y_amplitude: 3.5,
            },
            axial_tilt_deg: 23.5,
            spin_multiplier: 2.0,
            scale: 0.75,
            ring: None,
        },
        CelestialBody {
            name: "moon",
            textures: BodyTextures::diffuse("moon.png"),
            shading: Shading::Lit,
            motion: Motion::unscaled(1.022),
            orbit: Orbit::Satellite {
                parent: "earth",
                radius: 1.2,
                y_amplitude: 0.75,
                y_rate: 0.5,
            },
            axial_tilt_deg: 5.1,
            spin_multiplier: 2.0,
            scale: 0.204,
            ring: None,
        },
        planet("mercury", "mercury.png", 122.8, sun + 0.39 * k, 0.034, 2.0, 0.287),
        planet("venus", "venus.png", 48.6, sun + 0.72 * k, 177.4, -2.0, 0.712),
        planet("mars", "mars.png", 15.8, sun + 1.52 * k, 25.2, 2.0, 0.398),
        planet("jupiter", "jupiter.png", 2.51, 5.20 * k, 3.13, 2.0, 8.21),
        saturn,
        planet("uranus", "uranus.png", 0.355, 19.18 * k, 97.77, -2.0, 2.986),
        planet("neptune", "neptune.png", 0.181, 30.07 * k, 28.3, 2.0, 2.901),
    ]
}

/// Texture drawn behind everything.
pub const BACKGROUND_TEXTURE: &str = "stars.png";

/// A validated body table with its constants.
#[derive(Clone, Debug)]
pub struct SolarSystem {
    bodies: Vec<CelestialBody>,
    constants: SceneConstants,
}

impl SolarSystem {
    /// Validate `bodies` and take ownership of them.
    pub fn new(bodies: Vec<CelestialBody>, constants: SceneConstants) -> Result<Self, SceneError> {
        for (name, value) in [
            ("time_scale", constants.time_scale),
            ("size_scale", constants.size_scale),
            ("sun_size", constants.sun_size),
        ] {
            if !value.is_finite() {
                return Err(SceneError::NonFiniteConstant { name, value });
            }
        }
        if !constants.sun_position.is_finite() {
            return Err(SceneError::NonFiniteConstant {
                name: "sun_position",
                value: f32::NAN,
            });
        }
        if bodies.is_empty() {
            return Err(SceneError::Empty);
        }

        let mut seen = HashSet::new();
        for body in &bodies {
            if !body.scale.is_finite() || body.scale <= 0.0 {
                return Err(SceneError::InvalidScale {
                    body: body.name.to_string(),
                    scale: body.scale,
                });
            }
            if let Some(ring) = &body.ring {
                let s = ring.scale;
                if !s.is_finite() || s.min_element() <= 0.0 {
                    return Err(SceneError::InvalidScale {
                        body: body.name.to_string(),
                        scale: s.min_element(),
                    });
                }
            }
            if let Orbit::Satellite { parent, .. } = body.orbit {
                if !seen.contains(parent) {
                    return Err(SceneError::UnknownParent {
                        body: body.name.to_string(),
                        parent: parent.to_string(),
                    });
                }
            }
            if !seen.insert(body.name) {
                return Err(SceneError::DuplicateName {
                    name: body.name.to_string(),
                });
            }
        }

        log::debug!("Solar system validated: {} bodies", bodies.len());
        Ok(Self { bodies, constants })
    }

    /// The default table built from `constants`.
    pub fn with_constants(constants: SceneConstants) -> Result<Self, SceneError> {
        Self::new(default_bodies(&constants), constants)
    }

    pub fn bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    pub fn constants(&self) -> &SceneConstants {
        &self.constants
    }

    /// Look up a body by name.
    pub fn find(&self, name: &str) -> Option<&CelestialBody> {
        self.bodies.iter().find(|b| b.name == name)
    }

    /// Light at the sun's position with default intensities.
    pub fn light(&self) -> LightParams {
        LightParams::at(self.constants.sun_position)
    }

    /// Every texture path the table references, background first, without duplicates.
    pub fn texture_paths(&self) -> Vec<&'static str> {
        let mut seen = HashSet::new();
        std::iter::once(BACKGROUND_TEXTURE)
            .chain(self.bodies.iter().flat_map(CelestialBody::texture_paths))
            .filter(|p| seen.insert(*p))
            .collect()
    }

    /// Draw items for elapsed time `t` in seconds.
    pub fn evaluate(&self, t: f64) -> Vec<DrawItem> {
        evaluate_frame(&self.bodies, &self.constants, t)
    }
}

impl Default for SolarSystem {
    fn default() -> Self {
        let constants = SceneConstants::default();
        Self {
            bodies: default_bodies(&constants),
            constants,
        }
    }
}
