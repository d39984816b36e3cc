//! Error types for the application runtime

use thiserror::Error;

/// Errors that stop the runtime before or while running the event loop
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Event loop error: {0}")]
    EventLoop(String),

    #[error("Display creation failed: {0}")]
    Display(String),

    #[error("OpenGL context error: {0}")]
    Context(String),

    #[error("Window surface error: {0}")]
    Surface(String),

    #[error("Egui setup failed: {0}")]
    Egui(String),

    #[error("App initialization failed: {0}")]
    Init(crate::InitError),

    #[error("Frame capture failed: {0}")]
    Capture(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    pub(crate) fn display(err: impl std::fmt::Display) -> Self {
        Self::Display(err.to_string())
    }

    pub(crate) fn context(err: impl std::fmt::Display) -> Self {
        Self::Context(err.to_string())
    }

    pub(crate) fn surface(err: impl std::fmt::Display) -> Self {
        Self::Surface(err.to_string())
    }
}
