//! Seasons - seasonal terrain and weather demo
//!
//! Usage:
//!   seasons [--season <name>] [--config <file>] [--assets <dir>] [--fullscreen]
//!   seasons --capture out.png [--frames N] [--season <name>]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use seasons_core::DemoConfig;
use seasons_demo::SeasonsApp;
use seasons_runtime::Season;
use tracing::info;
use winit::event_loop::{ControlFlow, EventLoop};

#[derive(Parser)]
#[command(name = "seasons")]
#[command(about = "Seasonal terrain demo with GPU weather particles and shadow mapping")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Asset directory (overrides the config)
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Season to start in: spring, summer, autumn or winter
    #[arg(long, default_value = "spring")]
    season: Season,

    /// Window or capture width
    #[arg(long)]
    width: Option<u32>,

    /// Window or capture height
    #[arg(long)]
    height: Option<u32>,

    /// Launch in borderless fullscreen
    #[arg(long)]
    fullscreen: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Render offscreen and write the last frame to this PNG
    #[arg(long)]
    capture: Option<PathBuf>,

    /// Frames to simulate before saving a capture
    #[arg(long, default_value_t = 120)]
    frames: u32,
}

impl Args {
    fn load_config(&self) -> Result<DemoConfig> {
        let mut config = match &self.config {
            Some(path) => DemoConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => DemoConfig::default(),
        };
        if let Some(assets) = &self.assets {
            config.assets_dir = assets.clone();
        }
        if let Some(width) = self.width {
            config.window.width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    info!("Starting seasons v{}", env!("CARGO_PKG_VERSION"));

    let config = args.load_config()?;

    if let Some(output) = &args.capture {
        seasons_demo::capture(config, args.season, args.frames, output)
            .with_context(|| format!("Capture to {} failed", output.display()))?;
        return Ok(());
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = SeasonsApp::new(config, args.season, args.fullscreen);
    event_loop.run_app(&mut app)?;

    if let Some(err) = app.take_failure() {
        return Err(err).context("Seasons stopped");
    }
    Ok(())
}
