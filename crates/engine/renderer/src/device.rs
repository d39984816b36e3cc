//! Render device abstraction
//!
//! Passes never talk to OpenGL directly. They issue commands through
//! [`RenderDevice`], which has two implementations:
//!
//! - [`GlDevice`](crate::gl_device::GlDevice): forwards to a live `glow` context
//! - [`RecordingDevice`](crate::recording::RecordingDevice): records commands
//!   without a GPU, used for headless runs and tests
//!
//! The device owns the notion of a "current program". Uniform setters always
//! target whichever program was last passed to [`RenderDevice::use_program`].

use std::fmt::Debug;

use glam::{Mat4, Vec3, Vec4};

use crate::error::Result;
use crate::textures::{DecodedImage, TextureFormat};

/// Typed uniform value addressed by name
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    F32(f32),
    I32(i32),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

/// Depth comparison function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthFunc {
    #[default]
    Less,
    Equal,
    LessEqual,
}

/// Color blending mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Source replaces destination
    #[default]
    Disabled,
    /// `src * 1 + dst * 1`
    Additive,
}

/// Texture binding target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureTarget {
    Texture2D,
    CubeMap,
}

/// Primitive topology for draw calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
    TriangleStrip,
}

/// Viewport rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Viewport covering `width` x `height` from the origin
    pub fn sized(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0 {
            self.width as f32 / self.height as f32
        } else {
            1.0
        }
    }
}

/// One float vertex attribute inside an interleaved buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader attribute location
    pub location: u32,
    /// Number of float components
    pub components: i32,
    /// Offset in floats from the start of the vertex
    pub offset: i32,
}

/// Interleaved float vertex layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout<'a> {
    /// Vertex size in floats
    pub stride: i32,
    pub attributes: &'a [VertexAttribute],
}

/// Offscreen depth-only render target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthTarget<F, T> {
    pub framebuffer: F,
    pub texture: T,
    pub width: u32,
    pub height: u32,
}

/// GPU command interface used by every render pass
pub trait RenderDevice {
    type Program: Copy + PartialEq + Debug;
    type Texture: Copy + PartialEq + Debug;
    type Framebuffer: Copy + PartialEq + Debug;
    type VertexArray: Copy + PartialEq + Debug;

    /// Compile and link a program from vertex and fragment sources
    fn create_program(
        &mut self,
        label: &str,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Self::Program>;

    /// Make `program` the target of subsequent uniform and draw calls
    fn use_program(&mut self, program: Self::Program);

    /// Set a uniform on the current program. Unknown names are ignored.
    fn set_uniform(&mut self, name: &str, value: UniformValue);

    /// Allocate a 2D texture and upload `image` with mipmaps if present.
    ///
    /// `None` yields a valid texture object with no storage.
    fn create_texture_2d(
        &mut self,
        format: TextureFormat,
        image: Option<&DecodedImage>,
    ) -> Result<Self::Texture>;

    /// Allocate a cubemap from six faces (+X, -X, +Y, -Y, +Z, -Z).
    /// Missing faces are left without storage.
    fn create_cubemap(&mut self, faces: &[Option<DecodedImage>]) -> Result<Self::Texture>;

    /// Allocate a depth texture attached as the only attachment of a new framebuffer
    fn create_depth_target(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<DepthTarget<Self::Framebuffer, Self::Texture>>;

    /// Upload interleaved float vertices and describe their layout
    fn create_vertex_array(
        &mut self,
        vertices: &[f32],
        layout: VertexLayout<'_>,
    ) -> Result<Self::VertexArray>;

    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: Option<Self::Texture>);

    /// Bind an offscreen framebuffer, or the default one with `None`
    fn bind_framebuffer(&mut self, framebuffer: Option<Self::Framebuffer>);

    fn viewport(&self) -> Viewport;

    fn set_viewport(&mut self, viewport: Viewport);

    /// Clear the bound framebuffer. `color` of `None` leaves color untouched.
    fn clear(&mut self, color: Option<[f32; 4]>, depth: bool);

    fn set_depth_func(&mut self, func: DepthFunc);

    fn set_blend(&mut self, mode: BlendMode);

    /// Toggle linear-to-sRGB conversion on framebuffer writes
    fn set_srgb_output(&mut self, enabled: bool);

    fn draw_arrays(&mut self, vao: Self::VertexArray, primitive: Primitive, count: i32);

    fn draw_arrays_instanced(
        &mut self,
        vao: Self::VertexArray,
        primitive: Primitive,
        count: i32,
        instances: i32,
    );

    fn delete_program(&mut self, program: Self::Program);
    fn delete_texture(&mut self, texture: Self::Texture);
    fn delete_framebuffer(&mut self, framebuffer: Self::Framebuffer);
    fn delete_vertex_array(&mut self, vao: Self::VertexArray);

    // Typed helpers

    fn set_f32(&mut self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::F32(value));
    }

    fn set_i32(&mut self, name: &str, value: i32) {
        self.set_uniform(name, UniformValue::I32(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.set_uniform(name, UniformValue::Vec3(value));
    }

    fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.set_uniform(name, UniformValue::Vec4(value));
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.set_uniform(name, UniformValue::Mat4(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_aspect_ratio() {
        let viewport = Viewport::sized(1280, 720);
        assert!((viewport.aspect_ratio() - 1.7778).abs() < 0.001);
        assert_eq!(Viewport::sized(10, 0).aspect_ratio(), 1.0);
    }

    #[test]
    fn test_state_defaults() {
        assert_eq!(DepthFunc::default(), DepthFunc::Less);
        assert_eq!(BlendMode::default(), BlendMode::Disabled);
    }
}
