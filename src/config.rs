use crate::scene::SceneConfig;
use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

const MAX_FISH: usize = 200;
const MAX_SEAWEED: usize = 64;
const MAX_CRABS: usize = 32;

#[derive(Parser, Debug, Clone)]
#[command(name = "aquarium")]
#[command(about = "Braille terminal aquarium: fish, bubbles, seaweed and crabs", long_about = None)]
pub(crate) struct Args {
    /// FPS cap (one simulation tick per frame)
    #[arg(long)]
    pub(crate) fps: Option<u32>,

    /// Braille dots per logical unit; smaller zooms out
    #[arg(long)]
    pub(crate) scale: Option<f32>,

    #[arg(long)]
    pub(crate) fish: Option<usize>,

    #[arg(long)]
    pub(crate) seaweed: Option<usize>,

    #[arg(long)]
    pub(crate) crabs: Option<usize>,

    /// Chance per frame of an ambient bubble (0..1)
    #[arg(long)]
    pub(crate) bubble_chance: Option<f32>,

    #[arg(long, default_value_t = false)]
    pub(crate) no_hud: bool,

    /// Settings file (defaults to the platform data dir)
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// Write the effective settings back to the settings file
    #[arg(long, default_value_t = false)]
    pub(crate) save_settings: bool,

    /// Log file (defaults to aquarium.log next to the settings)
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) fps_cap: u32,
    pub(crate) pixel_scale: f32,
    pub(crate) ink_alpha: u8,
    pub(crate) show_hud: bool,
    pub(crate) fish_count: usize,
    pub(crate) seaweed_count: usize,
    pub(crate) crab_count: usize,
    pub(crate) bubble_chance: f32,
}

impl Default for Settings {
    fn default() -> Self {
        let scene = SceneConfig::default();
        Self {
            fps_cap: 60,
            pixel_scale: 0.25,
            ink_alpha: 64,
            show_hud: true,
            fish_count: scene.fish_count,
            seaweed_count: scene.seaweed_count,
            crab_count: scene.crab_count,
            bubble_chance: scene.bubble_chance,
        }
    }
}

impl Settings {
    pub(crate) fn apply_args(&mut self, args: &Args) {
        if let Some(v) = args.fps {
            self.fps_cap = v;
        }
        if let Some(v) = args.scale {
            self.pixel_scale = v;
        }
        if let Some(v) = args.fish {
            self.fish_count = v;
        }
        if let Some(v) = args.seaweed {
            self.seaweed_count = v;
        }
        if let Some(v) = args.crabs {
            self.crab_count = v;
        }
        if let Some(v) = args.bubble_chance {
            self.bubble_chance = v;
        }
        if args.no_hud {
            self.show_hud = false;
        }
    }

    /// Clamps everything into ranges the renderer and scene can handle.
    pub(crate) fn sanitized(mut self) -> Self {
        self.fps_cap = self.fps_cap.clamp(10, 240);
        self.pixel_scale = if self.pixel_scale.is_finite() {
            self.pixel_scale.clamp(0.05, 4.0)
        } else {
            Settings::default().pixel_scale
        };
        self.ink_alpha = self.ink_alpha.max(1);
        self.fish_count = self.fish_count.min(MAX_FISH);
        self.seaweed_count = self.seaweed_count.min(MAX_SEAWEED);
        self.crab_count = self.crab_count.min(MAX_CRABS);
        self.bubble_chance = if self.bubble_chance.is_finite() {
            self.bubble_chance.clamp(0.0, 1.0)
        } else {
            Settings::default().bubble_chance
        };
        self
    }

    pub(crate) fn scene(&self) -> SceneConfig {
        SceneConfig {
            fish_count: self.fish_count,
            seaweed_count: self.seaweed_count,
            crab_count: self.crab_count,
            bubble_chance: self.bubble_chance,
        }
    }
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

pub(crate) fn project_paths(args: &Args) -> Result<Paths> {
    let proj = ProjectDirs::from("com", "aquarium", "Aquarium")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir)
        .with_context(|| format!("creating data dir {}", dir.display()))?;
    Ok(Paths {
        settings_path: args.config.clone().unwrap_or_else(|| dir.join("settings.json")),
        log_path: args.log_file.clone().unwrap_or_else(|| dir.join("aquarium.log")),
    })
}

/// Missing file means defaults; an unreadable or broken file is logged and also means defaults.
pub(crate) fn load_settings(path: &Path) -> Settings {
    let s = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Settings::default(),
        Err(e) => {
            warn!("cannot read {}: {e}", path.display());
            return Settings::default();
        }
    };
    match serde_json::from_str::<Settings>(&s) {
        Ok(v) => v,
        Err(e) => {
            warn!("ignoring {}: {e}", path.display());
            Settings::default()
        }
    }
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
    if path.exists() {
        let _ = fs::remove_file(path);
    }
    fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}
