use clap::Parser;
use orrery_app::platform::PlatformDirs;
use orrery_config::{CliArgs, Config};

fn main() {
    let args = CliArgs::parse();

    // Logging needs the config, so anything worth reporting before it is up waits here.
    let mut startup_warnings = Vec::new();

    let dirs = match args.config.as_deref() {
        Some(root) => PlatformDirs::resolve_with_root(root),
        None => PlatformDirs::resolve().unwrap_or_else(|e| {
            startup_warnings.push(format!("{e}, using the working directory"));
            PlatformDirs::resolve_with_root(std::path::Path::new("."))
        }),
    };
    if let Err(e) = dirs.create_dirs() {
        startup_warnings.push(e.to_string());
    }

    let (mut config, source) = match Config::load_or_create(&dirs.config_dir) {
        Ok((config, source)) => (config, Some(source)),
        Err(e) => {
            startup_warnings.push(format!("Failed to load config: {e}, using defaults"));
            (Config::default(), None)
        }
    };
    config.apply_cli_overrides(&args);
    if let Err(e) = config.validate() {
        startup_warnings.push(format!("Invalid config: {e}, using defaults"));
        config = Config::default();
    }

    orrery_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    for warning in &startup_warnings {
        tracing::warn!("{warning}");
    }
    if let Some(source) = source {
        tracing::info!("{source}");
    }
    tracing::info!(
        "{}x{} window, {} sphere segments",
        config.window.width,
        config.window.height,
        config.scene.sphere_segments
    );

    if let Err(e) = orrery_app::run(config, dirs.config_dir) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
