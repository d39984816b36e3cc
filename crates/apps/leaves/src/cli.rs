//! Command line arguments

use std::path::PathBuf;

use app::{FrameCapture, RunConfig};
use clap::Parser;

use crate::config::{DEFAULT_CONFIG_PATH, WindowConfig};

/// Instanced translucent leaves with shadows and a skybox
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "leaves")]
#[command(about = "Forward-rendered translucent leaves with a live parameter panel")]
pub struct LeavesArgs {
    /// Scene configuration file
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Seed for leaf placement, overrides the config file
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Start with the settings panel open and the cursor free
    #[arg(long)]
    pub paused: bool,

    /// Render N frames, save output/frame_last.png, then exit
    #[arg(long, value_name = "FRAMES")]
    pub debug: Option<u64>,
}

impl LeavesArgs {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Window settings from the config plus the capture request
    pub fn run_config(&self, window: &WindowConfig) -> RunConfig {
        let mut config = RunConfig::new(window.title.clone(), window.width, window.height);
        config.capture = self.debug.map(FrameCapture::new);
        config
    }
}
