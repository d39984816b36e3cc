//! OpenGL implementation of [`RenderDevice`] on top of `glow`

use std::collections::HashMap;
use std::sync::Arc;

use glow::*;
use tracing::{debug, info, warn};

use crate::device::{
    BlendMode, DepthFunc, DepthTarget, Primitive, RenderDevice, TextureTarget, UniformValue,
    VertexLayout, Viewport,
};
use crate::error::{RenderError, Result};
use crate::shader_utils;
use crate::textures::{DecodedImage, TextureFormat};

const SHADOW_BORDER_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Render device driving a live OpenGL context
pub struct GlDevice {
    gl: Arc<Context>,
    current_program: Option<Program>,
    uniform_cache: HashMap<Program, HashMap<String, Option<UniformLocation>>>,
    // Vertex buffers owned by each vertex array, released together
    vertex_buffers: Vec<(VertexArray, Buffer)>,
}

impl GlDevice {
    /// Wrap an OpenGL context
    ///
    /// # Safety
    /// The GL context must be current on this thread for the lifetime of the device.
    pub unsafe fn new(gl: Arc<Context>) -> Self {
        unsafe {
            let version = gl.get_parameter_string(VERSION);
            info!("OpenGL device ready: {}", version);
        }

        Self {
            gl,
            current_program: None,
            uniform_cache: HashMap::new(),
            vertex_buffers: Vec::new(),
        }
    }

    /// Access the underlying context
    pub fn gl(&self) -> &Context {
        &self.gl
    }

    fn uniform_location(&mut self, program: Program, name: &str) -> Option<UniformLocation> {
        let locations = self.uniform_cache.entry(program).or_default();
        if let Some(location) = locations.get(name) {
            return location.clone();
        }

        let location = unsafe { self.gl.get_uniform_location(program, name) };
        if location.is_none() {
            debug!("Uniform '{}' is not active in program {:?}", name, program);
        }
        locations.insert(name.to_string(), location.clone());
        location
    }
}

fn texture_target(target: TextureTarget) -> u32 {
    match target {
        TextureTarget::Texture2D => TEXTURE_2D,
        TextureTarget::CubeMap => TEXTURE_CUBE_MAP,
    }
}

fn primitive_mode(primitive: Primitive) -> u32 {
    match primitive {
        Primitive::Triangles => TRIANGLES,
        Primitive::TriangleStrip => TRIANGLE_STRIP,
    }
}

/// (internal format, pixel format) for an upload
fn upload_formats(format: TextureFormat) -> (u32, u32) {
    match format {
        TextureFormat::Rgba => (RGBA, RGBA),
        TextureFormat::Rgb => (RGB, RGB),
        TextureFormat::Red => (RED, RED),
        TextureFormat::Srgb => (SRGB, RGB),
    }
}

impl RenderDevice for GlDevice {
    type Program = Program;
    type Texture = Texture;
    type Framebuffer = Framebuffer;
    type VertexArray = VertexArray;

    fn create_program(&mut self, label: &str, vertex_src: &str, fragment_src: &str) -> Result<Program> {
        let program = unsafe { shader_utils::create_program(&self.gl, label, vertex_src, fragment_src)? };
        info!("Compiled shader program '{}'", label);
        Ok(program)
    }

    fn use_program(&mut self, program: Program) {
        unsafe {
            self.gl.use_program(Some(program));
        }
        self.current_program = Some(program);
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        let Some(program) = self.current_program else {
            warn!("Uniform '{}' set with no program bound", name);
            return;
        };
        let Some(location) = self.uniform_location(program, name) else {
            return;
        };

        let gl = &self.gl;
        unsafe {
            match value {
                UniformValue::F32(v) => gl.uniform_1_f32(Some(&location), v),
                UniformValue::I32(v) => gl.uniform_1_i32(Some(&location), v),
                UniformValue::Vec3(v) => gl.uniform_3_f32(Some(&location), v.x, v.y, v.z),
                UniformValue::Vec4(v) => gl.uniform_4_f32(Some(&location), v.x, v.y, v.z, v.w),
                UniformValue::Mat4(m) => {
                    gl.uniform_matrix_4_f32_slice(Some(&location), false, &m.to_cols_array())
                }
            }
        }
    }

    fn create_texture_2d(&mut self, format: TextureFormat, image: Option<&DecodedImage>) -> Result<Texture> {
        let gl = &self.gl;
        unsafe {
            let texture = gl
                .create_texture()
                .map_err(|e| RenderError::Gl(format!("Failed to create texture: {}", e)))?;
            gl.bind_texture(TEXTURE_2D, Some(texture));

            gl.tex_parameter_i32(TEXTURE_2D, TEXTURE_WRAP_S, REPEAT as i32);
            gl.tex_parameter_i32(TEXTURE_2D, TEXTURE_WRAP_T, REPEAT as i32);
            gl.tex_parameter_i32(TEXTURE_2D, TEXTURE_MIN_FILTER, LINEAR_MIPMAP_LINEAR as i32);
            gl.tex_parameter_i32(TEXTURE_2D, TEXTURE_MAG_FILTER, LINEAR as i32);

            if let Some(image) = image {
                let (internal, pixel_format) = upload_formats(format);
                gl.pixel_store_i32(UNPACK_ALIGNMENT, 1);
                gl.tex_image_2d(
                    TEXTURE_2D,
                    0,
                    internal as i32,
                    image.width as i32,
                    image.height as i32,
                    0,
                    pixel_format,
                    UNSIGNED_BYTE,
                    PixelUnpackData::Slice(Some(&image.pixels)),
                );
                gl.generate_mipmap(TEXTURE_2D);
                gl.pixel_store_i32(UNPACK_ALIGNMENT, 4);
            }

            gl.bind_texture(TEXTURE_2D, None);
            Ok(texture)
        }
    }

    fn create_cubemap(&mut self, faces: &[Option<DecodedImage>]) -> Result<Texture> {
        let gl = &self.gl;
        unsafe {
            let texture = gl
                .create_texture()
                .map_err(|e| RenderError::Gl(format!("Failed to create cubemap: {}", e)))?;
            gl.bind_texture(TEXTURE_CUBE_MAP, Some(texture));
            gl.pixel_store_i32(UNPACK_ALIGNMENT, 1);

            for (i, face) in faces.iter().enumerate().take(6) {
                let Some(face) = face else { continue };
                let (internal, pixel_format) = upload_formats(face.format);
                gl.tex_image_2d(
                    TEXTURE_CUBE_MAP_POSITIVE_X + i as u32,
                    0,
                    internal as i32,
                    face.width as i32,
                    face.height as i32,
                    0,
                    pixel_format,
                    UNSIGNED_BYTE,
                    PixelUnpackData::Slice(Some(&face.pixels)),
                );
            }

            gl.pixel_store_i32(UNPACK_ALIGNMENT, 4);
            gl.tex_parameter_i32(TEXTURE_CUBE_MAP, TEXTURE_MIN_FILTER, LINEAR_MIPMAP_LINEAR as i32);
            gl.tex_parameter_i32(TEXTURE_CUBE_MAP, TEXTURE_MAG_FILTER, LINEAR as i32);
            gl.tex_parameter_i32(TEXTURE_CUBE_MAP, TEXTURE_WRAP_S, CLAMP_TO_EDGE as i32);
            gl.tex_parameter_i32(TEXTURE_CUBE_MAP, TEXTURE_WRAP_T, CLAMP_TO_EDGE as i32);
            gl.tex_parameter_i32(TEXTURE_CUBE_MAP, TEXTURE_WRAP_R, CLAMP_TO_EDGE as i32);
            if faces.iter().flatten().count() == 6 {
                gl.generate_mipmap(TEXTURE_CUBE_MAP);
            }

            gl.bind_texture(TEXTURE_CUBE_MAP, None);
            Ok(texture)
        }
    }

    fn create_depth_target(&mut self, width: u32, height: u32) -> Result<DepthTarget<Framebuffer, Texture>> {
        let gl = &self.gl;
        unsafe {
            let texture = gl
                .create_texture()
                .map_err(|e| RenderError::Gl(format!("Failed to create depth texture: {}", e)))?;
            gl.bind_texture(TEXTURE_2D, Some(texture));
            gl.tex_image_2d(
                TEXTURE_2D,
                0,
                DEPTH_COMPONENT as i32,
                width as i32,
                height as i32,
                0,
                DEPTH_COMPONENT,
                FLOAT,
                PixelUnpackData::Slice(None),
            );
            // Linear filtering softens the shadow edge
            gl.tex_parameter_i32(TEXTURE_2D, TEXTURE_MIN_FILTER, LINEAR as i32);
            gl.tex_parameter_i32(TEXTURE_2D, TEXTURE_MAG_FILTER, LINEAR as i32);
            gl.tex_parameter_i32(TEXTURE_2D, TEXTURE_WRAP_S, CLAMP_TO_BORDER as i32);
            gl.tex_parameter_i32(TEXTURE_2D, TEXTURE_WRAP_T, CLAMP_TO_BORDER as i32);
            gl.tex_parameter_f32_slice(TEXTURE_2D, TEXTURE_BORDER_COLOR, &SHADOW_BORDER_COLOR);

            let framebuffer = gl
                .create_framebuffer()
                .map_err(|e| RenderError::Gl(format!("Failed to create framebuffer: {}", e)))?;
            gl.bind_framebuffer(FRAMEBUFFER, Some(framebuffer));
            gl.framebuffer_texture_2d(FRAMEBUFFER, DEPTH_ATTACHMENT, TEXTURE_2D, Some(texture), 0);
            gl.draw_buffer(NONE);
            gl.read_buffer(NONE);

            let status = gl.check_framebuffer_status(FRAMEBUFFER);
            gl.bind_framebuffer(FRAMEBUFFER, None);
            gl.bind_texture(TEXTURE_2D, None);

            if status != FRAMEBUFFER_COMPLETE {
                gl.delete_framebuffer(framebuffer);
                gl.delete_texture(texture);
                return Err(RenderError::FramebufferIncomplete(status));
            }

            Ok(DepthTarget {
                framebuffer,
                texture,
                width,
                height,
            })
        }
    }

    fn create_vertex_array(&mut self, vertices: &[f32], layout: VertexLayout<'_>) -> Result<VertexArray> {
        let gl = &self.gl;
        unsafe {
            let vao = gl
                .create_vertex_array()
                .map_err(|e| RenderError::Gl(format!("Failed to create VAO: {}", e)))?;
            gl.bind_vertex_array(Some(vao));

            let vbo = gl
                .create_buffer()
                .map_err(|e| RenderError::Gl(format!("Failed to create VBO: {}", e)))?;
            gl.bind_buffer(ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(ARRAY_BUFFER, bytemuck::cast_slice(vertices), STATIC_DRAW);

            let float_size = std::mem::size_of::<f32>() as i32;
            for attribute in layout.attributes {
                gl.enable_vertex_attrib_array(attribute.location);
                gl.vertex_attrib_pointer_f32(
                    attribute.location,
                    attribute.components,
                    FLOAT,
                    false,
                    layout.stride * float_size,
                    attribute.offset * float_size,
                );
            }

            gl.bind_vertex_array(None);
            gl.bind_buffer(ARRAY_BUFFER, None);

            self.vertex_buffers.push((vao, vbo));
            Ok(vao)
        }
    }

    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: Option<Texture>) {
        unsafe {
            self.gl.active_texture(TEXTURE0 + unit);
            self.gl.bind_texture(texture_target(target), texture);
        }
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<Framebuffer>) {
        unsafe {
            self.gl.bind_framebuffer(FRAMEBUFFER, framebuffer);
        }
    }

    fn viewport(&self) -> Viewport {
        let mut values = [0i32; 4];
        unsafe {
            self.gl.get_parameter_i32_slice(VIEWPORT, &mut values);
        }
        Viewport::new(values[0], values[1], values[2], values[3])
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        unsafe {
            self.gl
                .viewport(viewport.x, viewport.y, viewport.width, viewport.height);
        }
    }

    fn clear(&mut self, color: Option<[f32; 4]>, depth: bool) {
        let mut mask = 0;
        unsafe {
            if let Some([r, g, b, a]) = color {
                self.gl.clear_color(r, g, b, a);
                mask |= COLOR_BUFFER_BIT;
            }
            if depth {
                self.gl.depth_mask(true);
                mask |= DEPTH_BUFFER_BIT;
            }
            if mask != 0 {
                self.gl.clear(mask);
            }
        }
    }

    fn set_depth_func(&mut self, func: DepthFunc) {
        let func = match func {
            DepthFunc::Less => LESS,
            DepthFunc::Equal => EQUAL,
            DepthFunc::LessEqual => LEQUAL,
        };
        unsafe {
            self.gl.enable(DEPTH_TEST);
            self.gl.depth_func(func);
        }
    }

    fn set_blend(&mut self, mode: BlendMode) {
        unsafe {
            match mode {
                BlendMode::Disabled => {
                    self.gl.disable(BLEND);
                    self.gl.blend_func(ONE, ZERO);
                }
                BlendMode::Additive => {
                    self.gl.enable(BLEND);
                    self.gl.blend_func(ONE, ONE);
                }
            }
        }
    }

    fn set_srgb_output(&mut self, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(FRAMEBUFFER_SRGB);
            } else {
                self.gl.disable(FRAMEBUFFER_SRGB);
            }
        }
    }

    fn draw_arrays(&mut self, vao: VertexArray, primitive: Primitive, count: i32) {
        unsafe {
            self.gl.bind_vertex_array(Some(vao));
            self.gl.draw_arrays(primitive_mode(primitive), 0, count);
            self.gl.bind_vertex_array(None);
        }
    }

    fn draw_arrays_instanced(&mut self, vao: VertexArray, primitive: Primitive, count: i32, instances: i32) {
        unsafe {
            self.gl.bind_vertex_array(Some(vao));
            self.gl
                .draw_arrays_instanced(primitive_mode(primitive), 0, count, instances);
            self.gl.bind_vertex_array(None);
        }
    }

    fn delete_program(&mut self, program: Program) {
        self.uniform_cache.remove(&program);
        if self.current_program == Some(program) {
            self.current_program = None;
        }
        unsafe {
            self.gl.delete_program(program);
        }
    }

    fn delete_texture(&mut self, texture: Texture) {
        unsafe {
            self.gl.delete_texture(texture);
        }
    }

    fn delete_framebuffer(&mut self, framebuffer: Framebuffer) {
        unsafe {
            self.gl.delete_framebuffer(framebuffer);
        }
    }

    fn delete_vertex_array(&mut self, vao: VertexArray) {
        let gl = &self.gl;
        self.vertex_buffers.retain(|(owner, vbo)| {
            if *owner == vao {
                unsafe { gl.delete_buffer(*vbo) };
                false
            } else {
                true
            }
        });
        unsafe {
            gl.delete_vertex_array(vao);
        }
    }
}
