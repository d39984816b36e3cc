//! Error types for the renderer

use thiserror::Error;

/// Result type for renderer operations
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors that can occur while creating or driving GPU resources
#[derive(Error, Debug)]
pub enum RenderError {
    /// Shader stage failed to compile
    #[error("Shader compilation error ({stage}): {log}")]
    ShaderCompile { stage: &'static str, log: String },

    /// Program failed to link
    #[error("Program link error ({label}): {log}")]
    ProgramLink { label: String, log: String },

    /// A GL object could not be created
    #[error("GL error: {0}")]
    Gl(String),

    /// Offscreen framebuffer is not complete
    #[error("Framebuffer incomplete, status: {0:#x}")]
    FramebufferIncomplete(u32),

    /// Image file could not be read or decoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}
