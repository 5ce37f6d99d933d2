//! Config sections, their defaults, and RON load/save.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "config.ron";

const APP_DIR_NAME: &str = "orrery";

/// Finest sphere tessellation accepted. At 1024 the shared mesh is about 34 MB
/// of vertices, well under wgpu's default 256 MiB buffer limit.
pub const MAX_SPHERE_SEGMENTS: u32 = 1024;

/// `<os config dir>/orrery`, if the platform has one.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME))
}

/// Where [`Config::load_or_create`] got its config from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// An existing file was read.
    Loaded(PathBuf),
    /// No file existed; the defaults were written here.
    Created(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded(path) => write!(f, "Loaded config from {}", path.display()),
            Self::Created(path) => write!(f, "Created default config at {}", path.display()),
        }
    }
}

/// Every section falls back to its defaults, so partial files load.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Presentation settings.
    pub render: RenderConfig,
    /// Solar system scaling and assets.
    pub scene: SceneConfig,
    /// Camera controls.
    pub input: InputConfig,
    /// Logging.
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Start in borderless fullscreen.
    pub fullscreen: bool,
    /// Window title.
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            fullscreen: false,
            title: "Solar System".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Present with `Fifo`; otherwise prefer mailbox/immediate.
    pub vsync: bool,
    /// Linear RGB, visible only where the background texture is missing.
    pub clear_color: [f32; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            vsync: true,
            clear_color: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Multiplier on orbital angular rates.
    pub time_scale: f32,
    /// Distance unit for orbital radii.
    pub size_scale: f32,
    /// Longitude and latitude segment count of the shared sphere.
    pub sphere_segments: u32,
    /// Texture directory, relative to the working directory unless absolute.
    pub asset_dir: PathBuf,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            time_scale: 0.01,
            size_scale: 10.0,
            sphere_segments: 128,
            asset_dir: PathBuf::from("asset").join("textures"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Degrees of rotation per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    /// Units per second.
    pub camera_speed: f32,
    /// Invert the Y axis for mouse look.
    pub invert_y: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 0.1,
            camera_speed: 20.0,
            invert_y: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load `config.ron` from `config_dir`, writing the defaults there first if it is missing.
    ///
    /// Runs before logging is up, so it reports what happened through
    /// [`ConfigSource`] instead of logging.
    pub fn load_or_create(config_dir: &Path) -> Result<(Self, ConfigSource), ConfigError> {
        let path = config_dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            let config = Self::read(&path)?;
            Ok((config, ConfigSource::Loaded(path)))
        } else {
            let config = Self::default();
            config.save(config_dir)?;
            Ok((config, ConfigSource::Created(path)))
        }
    }

    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let path = config_dir.join(CONFIG_FILE_NAME);
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&path, serialized).map_err(|source| ConfigError::Write { path, source })
    }

    /// Re-read the file; `Some` only when it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = Self::read(&config_dir.join(CONFIG_FILE_NAME))?;
        if &fresh == self {
            Ok(None)
        } else {
            log::info!("Config reloaded with changes");
            Ok(Some(fresh))
        }
    }

    /// Reject values the renderer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid {
                field: "window",
                reason: format!("size {}x{} is empty", self.window.width, self.window.height),
            });
        }
        if !(1..=MAX_SPHERE_SEGMENTS).contains(&self.scene.sphere_segments) {
            return Err(ConfigError::Invalid {
                field: "scene.sphere_segments",
                reason: format!(
                    "{} is outside 1..={MAX_SPHERE_SEGMENTS}",
                    self.scene.sphere_segments
                ),
            });
        }
        if !self.scene.time_scale.is_finite() {
            return Err(ConfigError::Invalid {
                field: "scene.time_scale",
                reason: format!("{} is not finite", self.scene.time_scale),
            });
        }
        if !(self.scene.size_scale.is_finite() && self.scene.size_scale > 0.0) {
            return Err(ConfigError::Invalid {
                field: "scene.size_scale",
                reason: format!("{} is not a positive number", self.scene.size_scale),
            });
        }
        Ok(())
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
