//! Instanced translucent leaves
//!
//! A forward-rendered scene of up to 100 leaf quads lit by a shadowed
//! directional light and a rotating point light, with Beer's-law
//! transmission and a live settings panel.

pub mod camera;
pub mod cli;
pub mod config;
pub mod demo;
pub mod ui;

pub use cli::LeavesArgs;
pub use config::{ConfigError, DEFAULT_CONFIG_PATH, LeavesConfig};
pub use demo::LeavesApp;
