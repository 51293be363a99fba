use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use luaplayer_lua::registry;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod audio;
mod config;
mod emulator;
mod events;
mod input;
mod script_path;
mod video;

use config::Config;
use emulator::Options;

/// Desktop player for handheld Lua games.
#[derive(Debug, Parser)]
#[command(name = "luaplayer", version)]
struct Cli {
    /// Script file, or a directory containing index.lua or script.lua.
    script: PathBuf,

    /// Window scale factor (clamped to 1..=8).
    #[arg(long)]
    scale: Option<u32>,

    /// Vblank rate scripts are paced to, in Hz.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=240))]
    refresh_rate: Option<u32>,

    /// Draw a frames-per-second counter.
    #[arg(long)]
    show_fps: bool,

    /// Disable audio output.
    #[arg(long)]
    no_audio: bool,

    /// Config file (default: <config dir>/luaplayer/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Command-line flags win over the config file.
    fn options(&self, config: &Config) -> Options {
        Options {
            title: config.display.title.clone(),
            scale: config::clamp_scale(self.scale.unwrap_or(config.display.scale)),
            refresh_rate: self
                .refresh_rate
                .unwrap_or(config.display.refresh_rate)
                .max(1),
            show_fps: self.show_fps || config.display.show_fps,
            audio: config.audio.enabled && !self.no_audio,
            sample_rate: config.audio.sample_rate,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let options = cli.options(&config);

    let script_path = script_path::resolve(&cli.script)?;
    let script_path = script_path
        .canonicalize()
        .with_context(|| format!("failed to resolve {}", script_path.display()))?;

    let (entry, script) = registry::load(&script_path)?;

    if let Some(dir) = script_path::working_dir(&script_path) {
        std::env::set_current_dir(dir)
            .with_context(|| format!("failed to enter {}", dir.display()))?;
    }

    let mut keys = input::default_key_map();
    keys.apply_overrides(&config.keys);

    info!(
        script = %script_path.display(),
        engine = entry.name,
        scale = options.scale,
        refresh_rate = options.refresh_rate,
        "starting"
    );
    emulator::run(&options, script, keys)
}
