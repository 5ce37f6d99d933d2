//! Runtime settings for the orrery, persisted as `config.ron` and overridable from the command line.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE_NAME, Config, ConfigSource, DebugConfig, InputConfig, MAX_SPHERE_SEGMENTS,
    RenderConfig, SceneConfig, WindowConfig, default_config_dir,
};
pub use error::ConfigError;
