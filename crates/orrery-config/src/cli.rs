use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Command-line flags; each one set replaces the value from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Textured, lit solar system demo")]
pub struct CliArgs {
    /// Window width in logical pixels.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height in logical pixels.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in borderless fullscreen.
    #[arg(long)]
    pub fullscreen: bool,

    /// Log filter (error, warn, info, debug, trace, or a full directive).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Directory holding the body and background textures.
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Multiplier on orbital angular rates.
    #[arg(long)]
    pub time_scale: Option<f32>,

    /// Sphere tessellation, used for both longitude and latitude.
    #[arg(long)]
    pub segments: Option<u32>,

    /// Directory containing config.ron (defaults to the OS config dir).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if args.fullscreen {
            self.window.fullscreen = true;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(ref dir) = args.assets {
            self.scene.asset_dir = dir.clone();
        }
        if let Some(scale) = args.time_scale {
            self.scene.time_scale = scale;
        }
        if let Some(segments) = args.segments {
            self.scene.sphere_segments = segments;
        }
    }
}
