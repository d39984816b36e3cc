//! Headless render device that records every command
//!
//! Handles are plain integers. Uniform values are tracked per program so a
//! caller can inspect exactly what a draw would have seen.

use std::collections::HashMap;

use crate::device::{
    BlendMode, DepthFunc, DepthTarget, Primitive, RenderDevice, TextureTarget, UniformValue,
    VertexLayout, Viewport,
};
use crate::error::Result;
use crate::textures::{DecodedImage, TextureFormat};

/// A command issued to a [`RecordingDevice`]
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateProgram { id: u32, label: String },
    UseProgram(u32),
    SetUniform { program: u32, name: String, value: UniformValue },
    CreateTexture { id: u32, format: TextureFormat, uploaded: bool },
    CreateCubemap { id: u32, faces_uploaded: usize },
    CreateDepthTarget { framebuffer: u32, texture: u32, width: u32, height: u32 },
    CreateVertexArray { id: u32, vertices: usize },
    BindTexture { unit: u32, target: TextureTarget, texture: Option<u32> },
    BindFramebuffer(Option<u32>),
    SetViewport(Viewport),
    Clear { color: Option<[f32; 4]>, depth: bool },
    SetDepthFunc(DepthFunc),
    SetBlend(BlendMode),
    SetSrgbOutput(bool),
    Draw { program: Option<u32>, vao: u32, primitive: Primitive, count: i32, instances: i32 },
    DeleteProgram(u32),
    DeleteTexture(u32),
    DeleteFramebuffer(u32),
    DeleteVertexArray(u32),
}

/// Render device with no GPU behind it
#[derive(Debug)]
pub struct RecordingDevice {
    commands: Vec<Command>,
    next_id: u32,
    current_program: Option<u32>,
    uniforms: HashMap<u32, HashMap<String, UniformValue>>,
    viewport: Viewport,
    depth_func: DepthFunc,
    blend: BlendMode,
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new(Viewport::sized(1280, 720))
    }
}

impl RecordingDevice {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            commands: Vec::new(),
            next_id: 1,
            current_program: None,
            uniforms: HashMap::new(),
            viewport,
            depth_func: DepthFunc::Less,
            blend: BlendMode::Disabled,
        }
    }

    fn allocate(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Drop recorded commands, keeping tracked state
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    pub fn current_program(&self) -> Option<u32> {
        self.current_program
    }

    pub fn depth_func(&self) -> DepthFunc {
        self.depth_func
    }

    pub fn blend(&self) -> BlendMode {
        self.blend
    }

    /// Last value written to `name` on `program`
    pub fn uniform(&self, program: u32, name: &str) -> Option<UniformValue> {
        self.uniforms.get(&program)?.get(name).copied()
    }

    /// All draw commands in issue order
    pub fn draws(&self) -> Vec<&Command> {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::Draw { .. }))
            .collect()
    }
}

impl RenderDevice for RecordingDevice {
    type Program = u32;
    type Texture = u32;
    type Framebuffer = u32;
    type VertexArray = u32;

    fn create_program(&mut self, label: &str, _vertex_src: &str, _fragment_src: &str) -> Result<u32> {
        let id = self.allocate();
        self.commands.push(Command::CreateProgram {
            id,
            label: label.to_string(),
        });
        Ok(id)
    }

    fn use_program(&mut self, program: u32) {
        self.current_program = Some(program);
        self.commands.push(Command::UseProgram(program));
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        let Some(program) = self.current_program else {
            return;
        };
        self.uniforms
            .entry(program)
            .or_default()
            .insert(name.to_string(), value);
        self.commands.push(Command::SetUniform {
            program,
            name: name.to_string(),
            value,
        });
    }

    fn create_texture_2d(&mut self, format: TextureFormat, image: Option<&DecodedImage>) -> Result<u32> {
        let id = self.allocate();
        self.commands.push(Command::CreateTexture {
            id,
            format,
            uploaded: image.is_some(),
        });
        Ok(id)
    }

    fn create_cubemap(&mut self, faces: &[Option<DecodedImage>]) -> Result<u32> {
        let id = self.allocate();
        self.commands.push(Command::CreateCubemap {
            id,
            faces_uploaded: faces.iter().flatten().count(),
        });
        Ok(id)
    }

    fn create_depth_target(&mut self, width: u32, height: u32) -> Result<DepthTarget<u32, u32>> {
        let framebuffer = self.allocate();
        let texture = self.allocate();
        self.commands.push(Command::CreateDepthTarget {
            framebuffer,
            texture,
            width,
            height,
        });
        Ok(DepthTarget {
            framebuffer,
            texture,
            width,
            height,
        })
    }

    fn create_vertex_array(&mut self, vertices: &[f32], layout: VertexLayout<'_>) -> Result<u32> {
        let id = self.allocate();
        self.commands.push(Command::CreateVertexArray {
            id,
            vertices: vertices.len() / layout.stride.max(1) as usize,
        });
        Ok(id)
    }

    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: Option<u32>) {
        self.commands.push(Command::BindTexture {
            unit,
            target,
            texture,
        });
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<u32>) {
        self.commands.push(Command::BindFramebuffer(framebuffer));
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.commands.push(Command::SetViewport(viewport));
    }

    fn clear(&mut self, color: Option<[f32; 4]>, depth: bool) {
        self.commands.push(Command::Clear { color, depth });
    }

    fn set_depth_func(&mut self, func: DepthFunc) {
        self.depth_func = func;
        self.commands.push(Command::SetDepthFunc(func));
    }

    fn set_blend(&mut self, mode: BlendMode) {
        self.blend = mode;
        self.commands.push(Command::SetBlend(mode));
    }

    fn set_srgb_output(&mut self, enabled: bool) {
        self.commands.push(Command::SetSrgbOutput(enabled));
    }

    fn draw_arrays(&mut self, vao: u32, primitive: Primitive, count: i32) {
        self.commands.push(Command::Draw {
            program: self.current_program,
            vao,
            primitive,
            count,
            instances: 1,
        });
    }

    fn draw_arrays_instanced(&mut self, vao: u32, primitive: Primitive, count: i32, instances: i32) {
        self.commands.push(Command::Draw {
            program: self.current_program,
            vao,
            primitive,
            count,
            instances,
        });
    }

    fn delete_program(&mut self, program: u32) {
        self.uniforms.remove(&program);
        if self.current_program == Some(program) {
            self.current_program = None;
        }
        self.commands.push(Command::DeleteProgram(program));
    }

    fn delete_texture(&mut self, texture: u32) {
        self.commands.push(Command::DeleteTexture(texture));
    }

    fn delete_framebuffer(&mut self, framebuffer: u32) {
        self.commands.push(Command::DeleteFramebuffer(framebuffer));
    }

    fn delete_vertex_array(&mut self, vao: u32) {
        self.commands.push(Command::DeleteVertexArray(vao));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_uniforms_follow_current_program() {
        let mut device = RecordingDevice::default();
        let a = device.create_program("a", "", "").unwrap();
        let b = device.create_program("b", "", "").unwrap();

        device.use_program(a);
        device.set_f32("value", 1.0);
        device.use_program(b);
        device.set_vec3("value", Vec3::X);

        assert_eq!(device.uniform(a, "value"), Some(UniformValue::F32(1.0)));
        assert_eq!(device.uniform(b, "value"), Some(UniformValue::Vec3(Vec3::X)));
    }

    #[test]
    fn test_uniform_without_program_is_dropped() {
        let mut device = RecordingDevice::default();
        device.set_i32("orphan", 3);
        assert!(device.commands().is_empty());
    }
}
