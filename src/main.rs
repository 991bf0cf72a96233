mod app;
mod canvas;
mod config;
mod entity;
mod geom;
mod input;
mod random;
mod scene;
mod surface;
mod term;

use anyhow::{Context, Result};
use clap::Parser;
use config::{load_settings, project_paths, save_settings_atomic, Args};
use std::fs::OpenOptions;
use std::path::Path;

fn main() -> Result<()> {
    let args = Args::parse();
    let paths = project_paths(&args)?;
    init_logging(&paths.log_path)?;

    let mut settings = load_settings(&paths.settings_path);
    settings.apply_args(&args);
    let settings = settings.sanitized();
    log::info!("settings: {settings:?}");

    if args.save_settings {
        save_settings_atomic(&paths.settings_path, &settings)?;
        log::info!("saved settings to {}", paths.settings_path.display());
    }

    app::run(settings)
}

/// The terminal is in raw mode while running, so logs go to a file.
fn init_logging(path: &Path) -> Result<()> {
    use env_logger::{Env, Target};

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
