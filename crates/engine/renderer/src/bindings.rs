//! GPU resources shared between passes
//!
//! Texture units are fixed across the frame so every program that shares
//! the common vertex stage can rely on the same sampler assignments.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::device::{DepthTarget, RenderDevice};
use crate::error::Result;
use crate::geometry::{QUAD_LAYOUT, QUAD_VERTICES, SKYBOX_LAYOUT, SKYBOX_VERTICES};
use crate::textures::{TextureFormat, load_cubemap, load_texture};

/// Texture unit assignments
pub mod units {
    /// Cubemap as seen by the skybox pass
    pub const SKYBOX_BACKGROUND: u32 = 0;
    pub const DIFFUSE: u32 = 1;
    pub const NORMAL: u32 = 2;
    /// Cubemap as seen by the lit passes (reflections)
    pub const SKYBOX: u32 = 5;
    pub const SHADOW_MAP: u32 = 6;
    pub const TRANSLUCENCY: u32 = 7;
    pub const ROUGHNESS: u32 = 8;
}

pub const DEFAULT_SHADOW_RESOLUTION: u32 = 2048;

/// Image files loaded at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub diffuse: PathBuf,
    pub normal: PathBuf,
    pub translucency: PathBuf,
    pub roughness: PathBuf,
    /// +X, -X, +Y, -Y, +Z, -Z
    pub skybox: [PathBuf; 6],
    pub shadow_resolution: u32,
}

impl Default for AssetPaths {
    fn default() -> Self {
        let face = |name: &str| PathBuf::from(format!("assets/skybox/{}.tga", name));
        Self {
            diffuse: PathBuf::from("assets/leaf05_basecolor_transparent.png"),
            normal: PathBuf::from("assets/leaf05_normal.png"),
            translucency: PathBuf::from("assets/leaf05_translucency.png"),
            roughness: PathBuf::from("assets/leaf05_roughnessR.png"),
            skybox: [
                face("right"),
                face("left"),
                face("top"),
                face("bottom"),
                face("front"),
                face("back"),
            ],
            shadow_resolution: DEFAULT_SHADOW_RESOLUTION,
        }
    }
}

/// Leaf material textures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafTextures<T> {
    pub diffuse: T,
    pub normal: T,
    pub translucency: T,
    pub roughness: T,
}

/// Every texture, target and vertex array the passes reference
#[derive(Debug)]
pub struct ResourceBindings<D: RenderDevice> {
    pub leaf: LeafTextures<D::Texture>,
    pub skybox: D::Texture,
    pub shadow: DepthTarget<D::Framebuffer, D::Texture>,
    pub quad: D::VertexArray,
    pub skybox_cube: D::VertexArray,
}

impl<D: RenderDevice> ResourceBindings<D> {
    /// Load textures and allocate geometry and the shadow target
    ///
    /// Missing image files degrade to empty textures; only GL object
    /// creation failures are returned.
    pub fn create(device: &mut D, assets: &AssetPaths) -> Result<Self> {
        let leaf = LeafTextures {
            diffuse: load_texture(device, &assets.diffuse, TextureFormat::Rgba)?,
            normal: load_texture(device, &assets.normal, TextureFormat::Rgba)?,
            translucency: load_texture(device, &assets.translucency, TextureFormat::Red)?,
            roughness: load_texture(device, &assets.roughness, TextureFormat::Rgb)?,
        };
        let skybox = load_cubemap(device, &assets.skybox)?;

        let resolution = assets.shadow_resolution.max(1);
        let shadow = device.create_depth_target(resolution, resolution)?;

        let quad = device.create_vertex_array(&QUAD_VERTICES, QUAD_LAYOUT)?;
        let skybox_cube = device.create_vertex_array(&SKYBOX_VERTICES, SKYBOX_LAYOUT)?;

        info!("Resource bindings ready (shadow map {}x{})", resolution, resolution);

        Ok(Self {
            leaf,
            skybox,
            shadow,
            quad,
            skybox_cube,
        })
    }

    /// Release every GPU object
    pub fn destroy(self, device: &mut D) {
        for texture in [
            self.leaf.diffuse,
            self.leaf.normal,
            self.leaf.translucency,
            self.leaf.roughness,
            self.skybox,
            self.shadow.texture,
        ] {
            device.delete_texture(texture);
        }
        device.delete_framebuffer(self.shadow.framebuffer);
        device.delete_vertex_array(self.quad);
        device.delete_vertex_array(self.skybox_cube);
    }
}
