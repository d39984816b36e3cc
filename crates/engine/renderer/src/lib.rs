//! Leaves Renderer Library
//!
//! Forward multi-pass renderer for instanced translucent foliage:
//! - **shadow**: depth-only pass from the primary light
//! - **skybox**: cubemap background
//! - **lit**: ambient + first light base pass, additive pass per extra light
//!
//! # Architecture
//!
//! - **device**: `RenderDevice` trait, the only seam that touches the GPU
//! - **gl_device**: `RenderDevice` over a glow context
//! - **recording**: headless `RenderDevice` used by tests
//! - **bindings**: textures, geometry and the shadow target
//! - **params**: per-frame scene parameters edited by the settings panel
//! - **transforms**: per-instance model matrices
//! - **forward**: `ForwardRenderer`, owns resources and runs the passes

// Core modules
pub mod device;
pub mod error;
pub mod params;

// GPU resources
pub mod bindings;
pub mod geometry;
pub mod textures;
pub mod transforms;

// Passes
pub mod forward;
pub mod passes;

// Backends
pub mod gl_device;
pub mod recording;
pub mod shader_utils;

// Re-export commonly used types at crate root
pub use bindings::{AssetPaths, ResourceBindings};
pub use device::{BlendMode, DepthFunc, RenderDevice, UniformValue, Viewport};
pub use error::{RenderError, Result};
pub use forward::ForwardRenderer;
pub use gl_device::GlDevice;
pub use params::{Light, MaterialParams, SceneParams, ShadingModel};
pub use passes::FrameInputs;
pub use recording::RecordingDevice;
pub use transforms::{InstanceTransforms, MAX_INSTANCES};
