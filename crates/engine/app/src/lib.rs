//! Windowed OpenGL shell
//!
//! Opens one window with a current GL context, drives an [`App`] once per
//! redraw and paints an egui overlay on top of whatever the app rendered.
//!
//! - [`App`]: init / update / render / ui / shutdown hooks
//! - [`Frame`]: GL handle, drawable size and timing for one frame
//! - [`InputState`]: keys and mouse motion gathered since the last frame
//! - [`run_app`]: event loop entry point

use std::sync::Arc;

use glow::Context;
use winit::keyboard::KeyCode;

pub mod error;
pub mod input;
mod overlay;
mod runner;
mod window;

pub use error::RuntimeError;
pub use input::InputState;
pub use runner::{FrameCapture, RunConfig, run_app};

pub use egui;

/// Error returned from [`App::init`]
pub type InitError = Box<dyn std::error::Error + Send + Sync>;

/// Per-frame view of the window handed to every [`App`] hook
pub struct Frame<'a> {
    /// Shared so apps can keep their own handle for GPU wrappers
    pub gl: &'a Arc<Context>,
    /// Drawable size in physical pixels
    pub size: (u32, u32),
    /// Seconds since the previous frame; 0 on the first
    pub delta_time: f32,
    pub index: u64,
}

impl Frame<'_> {
    pub fn width(&self) -> u32 {
        self.size.0
    }

    pub fn height(&self) -> u32 {
        self.size.1
    }

    /// Width over height, 1.0 while minimized
    pub fn aspect_ratio(&self) -> f32 {
        aspect_ratio(self.size)
    }
}

fn aspect_ratio((width, height): (u32, u32)) -> f32 {
    if height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

/// Hooks driven by [`run_app`]
///
/// Order per frame: `update`, `render`, then `ui`. `init` runs once with the
/// context current and `shutdown` once before the context goes away.
pub trait App {
    /// Create GPU resources. An error stops the runtime and is returned from
    /// [`run_app`].
    fn init(&mut self, frame: &Frame) -> Result<(), InitError>;

    fn update(&mut self, frame: &Frame, input: &InputState);

    fn render(&mut self, frame: &Frame);

    /// Build the overlay; drawn after `render` with alpha blending
    fn ui(&mut self, _frame: &Frame, _ctx: &egui::Context) {}

    /// Release GPU resources; the context is still current
    fn shutdown(&mut self, frame: &Frame);

    /// Hide and lock the cursor so raw motion drives the camera
    fn cursor_grabbed(&self) -> bool {
        false
    }

    /// Keys delivered even while an overlay widget has keyboard focus
    fn hotkeys(&self) -> &[KeyCode] {
        &[]
    }

    fn should_exit(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio() {
        assert!((aspect_ratio((1280, 720)) - 16.0 / 9.0).abs() < 1e-6);
        assert_eq!(aspect_ratio((640, 0)), 1.0);
    }
}
