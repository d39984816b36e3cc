//! Forward renderer that owns every GPU resource of the leaf scene
//!
//! All resources are created in [`ForwardRenderer::new`]; drawing never
//! allocates. A frame runs shadow, skybox, then the lit passes, in that order.

use tracing::info;

use crate::bindings::{AssetPaths, ResourceBindings};
use crate::device::{BlendMode, DepthFunc, RenderDevice};
use crate::error::Result;
use crate::params::{SceneParams, ShadingModel};
use crate::passes::{FrameInputs, Programs, ShadowState, lit_passes, shadow_pass, skybox_pass};
use crate::transforms::InstanceTransforms;

const COMMON_VERTEX: &str = include_str!("shaders/common_shading.vert");
const LEAF_FRAGMENT: &str = include_str!("shaders/leaf_shading.frag");
const LEAF_PBR_FRAGMENT: &str = include_str!("shaders/leaf_pbr.frag");
const SHADOW_VERTEX: &str = include_str!("shaders/shadowmap.vert");
const SHADOW_FRAGMENT: &str = include_str!("shaders/shadowmap.frag");
const SKYBOX_VERTEX: &str = include_str!("shaders/skybox.vert");
const SKYBOX_FRAGMENT: &str = include_str!("shaders/skybox.frag");

/// Background behind the skybox where no face was loaded
pub const CLEAR_COLOR: [f32; 4] = [0.3, 0.3, 0.3, 1.0];

pub struct ForwardRenderer<D: RenderDevice> {
    programs: Programs<D::Program>,
    bindings: ResourceBindings<D>,
    transforms: InstanceTransforms,
    shadow: ShadowState,
}

impl<D: RenderDevice> ForwardRenderer<D> {
    /// Compile programs, load assets and upload the instance transforms
    pub fn new(device: &mut D, assets: &AssetPaths, transforms: InstanceTransforms) -> Result<Self> {
        let programs = Programs {
            translucent: device.create_program("leaf_shading", COMMON_VERTEX, LEAF_FRAGMENT)?,
            pbr: device.create_program("leaf_pbr", COMMON_VERTEX, LEAF_PBR_FRAGMENT)?,
            shadow: device.create_program("shadowmap", SHADOW_VERTEX, SHADOW_FRAGMENT)?,
            skybox: device.create_program("skybox", SKYBOX_VERTEX, SKYBOX_FRAGMENT)?,
        };

        let bindings = ResourceBindings::create(device, assets)?;

        for program in programs.instanced() {
            device.use_program(program);
            transforms.upload(device);
        }
        info!("Uploaded {} instance transforms", transforms.len());

        Ok(Self {
            programs,
            bindings,
            transforms,
            shadow: ShadowState::default(),
        })
    }

    /// Program the lit passes use for `shading`
    pub fn program_for(&self, shading: ShadingModel) -> D::Program {
        match shading {
            ShadingModel::Translucent => self.programs.translucent,
            ShadingModel::Pbr => self.programs.pbr,
        }
    }

    pub fn programs(&self) -> &Programs<D::Program> {
        &self.programs
    }

    pub fn bindings(&self) -> &ResourceBindings<D> {
        &self.bindings
    }

    pub fn transforms(&self) -> &InstanceTransforms {
        &self.transforms
    }

    /// Light-space matrix from the most recent shadow pass
    pub fn light_space_matrix(&self) -> glam::Mat4 {
        self.shadow.light_space
    }

    /// Render one frame into the currently bound framebuffer
    ///
    /// sRGB output is enabled for the scene and disabled again on return so
    /// UI drawn afterwards is not gamma-corrected twice.
    pub fn render_frame(&mut self, device: &mut D, frame: &FrameInputs, params: &SceneParams) {
        let instances = params.clamped_instance_count();

        device.set_srgb_output(true);
        device.set_depth_func(DepthFunc::Less);
        device.set_blend(BlendMode::Disabled);
        device.clear(Some(CLEAR_COLOR), true);

        if let Some(light) = params.primary_light() {
            shadow_pass(
                device,
                self.programs.shadow,
                &self.bindings,
                &mut self.shadow,
                light.position,
                instances,
            );
        }

        skybox_pass(device, self.programs.skybox, &self.bindings, frame);

        lit_passes(
            device,
            self.program_for(params.shading),
            &self.bindings,
            &self.shadow,
            frame,
            params,
        );

        device.set_srgb_output(false);
    }

    /// Release every GPU object
    pub fn destroy(self, device: &mut D) {
        for program in self.programs.all() {
            device.delete_program(program);
        }
        self.bindings.destroy(device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::UniformValue;
    use crate::recording::{Command, RecordingDevice};

    fn renderer(device: &mut RecordingDevice) -> ForwardRenderer<RecordingDevice> {
        ForwardRenderer::new(device, &AssetPaths::default(), InstanceTransforms::from_seed(Some(9)))
            .unwrap()
    }

    #[test]
    fn test_transforms_uploaded_to_instanced_programs_only() {
        let mut device = RecordingDevice::default();
        let renderer = renderer(&mut device);
        let programs = *renderer.programs();
        let first = UniformValue::Mat4(renderer.transforms().models()[0]);

        for program in programs.instanced() {
            assert_eq!(device.uniform(program, "models[0]"), Some(first));
            assert!(device.uniform(program, "models[99]").is_some());
        }
        assert_eq!(device.uniform(programs.skybox, "models[0]"), None);
    }

    #[test]
    fn test_program_follows_shading_model() {
        let mut device = RecordingDevice::default();
        let mut renderer = renderer(&mut device);
        let params = SceneParams {
            shading: ShadingModel::Pbr,
            ..Default::default()
        };
        let frame = FrameInputs::new(glam::Mat4::IDENTITY, glam::Mat4::IDENTITY, glam::Vec3::ZERO);
        device.clear_commands();

        renderer.render_frame(&mut device, &frame, &params);

        let pbr = renderer.program_for(ShadingModel::Pbr);
        let last = device.draws().last().copied().cloned();
        assert!(matches!(last, Some(Command::Draw { program: Some(p), .. }) if p == pbr));
    }

    #[test]
    fn test_frame_brackets_srgb_output() {
        let mut device = RecordingDevice::default();
        let mut renderer = renderer(&mut device);
        let frame = FrameInputs::new(glam::Mat4::IDENTITY, glam::Mat4::IDENTITY, glam::Vec3::ZERO);
        device.clear_commands();

        renderer.render_frame(&mut device, &frame, &SceneParams::default());

        let commands = device.commands();
        assert_eq!(commands.first(), Some(&Command::SetSrgbOutput(true)));
        assert_eq!(commands.last(), Some(&Command::SetSrgbOutput(false)));
        assert!(commands.contains(&Command::Clear {
            color: Some(CLEAR_COLOR),
            depth: true
        }));
    }

    #[test]
    fn test_destroy_deletes_programs() {
        let mut device = RecordingDevice::default();
        let renderer = renderer(&mut device);
        device.clear_commands();

        renderer.destroy(&mut device);

        let deleted = device
            .commands()
            .iter()
            .filter(|c| matches!(c, Command::DeleteProgram(_)))
            .count();
        assert_eq!(deleted, 4);
    }
}
