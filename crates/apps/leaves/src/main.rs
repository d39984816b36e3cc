//! Leaves demo
//!
//! # Usage
//!
//! ```bash
//! # Interactive; Space toggles the settings panel, Esc quits
//! leaves
//!
//! # Fixed instance layout and a custom config
//! leaves --seed 42 --config my_scene.toml
//!
//! # Render 100 frames, save output/frame_last.png, exit
//! leaves --debug 100
//! ```

use anyhow::Context;
use app::run_app;
use clap::Parser;
use leaves::{LeavesApp, LeavesArgs, LeavesConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = LeavesArgs::parse();

    if let Some(frames) = args.debug {
        info!("Debug mode: running {} frames", frames);
    }

    let config_path = args.config_path();
    let config = LeavesConfig::load(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;

    let run_config = args.run_config(&config.window);
    let app = LeavesApp::new(config)
        .with_seed(args.seed)
        .with_paused(args.paused);

    run_app(app, run_config).context("Leaves runtime failed")?;
    Ok(())
}
