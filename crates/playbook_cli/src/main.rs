//! Playbook CLI
//!
//! Configure and run rugby set plays without a display surface.

mod config;
mod demo;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::{PlaybookConfig, CONFIG_FILE};
use demo::{DemoOptions, SpeedChange};

#[derive(Parser)]
#[command(name = "playbook", version, about = "Sketch and play back rugby set plays")]
struct Cli {
    /// Path to playbook.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play the built-in crash ball move and print frames as JSON lines
    Demo {
        /// Starting speed multiplier (0.5 - 3.0)
        #[arg(long)]
        speed: Option<f32>,

        /// Simulated display refresh rate
        #[arg(long)]
        fps: Option<u32>,

        /// Change speed mid-play, as AT_SECS:SPEED (repeatable)
        #[arg(long = "speed-change")]
        speed_changes: Vec<SpeedChange>,

        /// Only print every n-th frame
        #[arg(long, default_value_t = 1)]
        every: u32,
    },

    /// Write a default playbook.toml
    Init {
        /// Directory to write into
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },

    /// Print the effective configuration
    Config,
}

fn init_logging(verbose: u8, configured: &str) {
    let level = match verbose {
        0 => configured,
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = PlaybookConfig::load(cli.config.as_deref())?;
    init_logging(cli.verbose, &config.log.level);

    match cli.command {
        Command::Demo {
            speed,
            fps,
            speed_changes,
            every,
        } => {
            if let Some(speed) = speed {
                anyhow::ensure!(speed.is_finite() && speed > 0.0, "--speed must be a positive number");
                config.playback.speed = speed;
            }
            if let Some(fps) = fps {
                anyhow::ensure!(fps > 0, "--fps must be positive");
                config.playback.refresh_hz = fps;
            }

            let options = DemoOptions {
                field: config.field_size(),
                scheduler: config.scheduler_config(),
                refresh_hz: config.playback.refresh_hz,
                speed_changes,
                every,
            };
            let play = demo::crash_ball_play(options.field)?;
            let stdout = io::stdout();
            demo::run(play, &options, &mut stdout.lock())?;
        }

        Command::Init { path } => {
            let target = path.join(CONFIG_FILE);
            if target.exists() {
                anyhow::bail!("{} already exists", target.display());
            }
            fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            fs::write(&target, PlaybookConfig::default().to_toml()?)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            tracing::info!("Created {}", target.display());
        }

        Command::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
