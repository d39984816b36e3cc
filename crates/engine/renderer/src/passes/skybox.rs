//! Cubemap background
//!
//! The vertex stage writes `pos.xyww`, so the cube lands at depth 1.0 and the
//! depth test must be `LEQUAL` while it draws.

use glam::{Mat3, Mat4};

use crate::bindings::{ResourceBindings, units};
use crate::device::{DepthFunc, Primitive, RenderDevice, TextureTarget};
use crate::geometry::SKYBOX_VERTEX_COUNT;
use crate::passes::FrameInputs;

/// Draw the skybox cube around the camera
pub fn skybox_pass<D: RenderDevice>(
    device: &mut D,
    program: D::Program,
    bindings: &ResourceBindings<D>,
    frame: &FrameInputs,
) {
    device.set_depth_func(DepthFunc::LessEqual);
    device.use_program(program);

    // Drop translation so the cube follows the camera
    let view = Mat4::from_mat3(Mat3::from_mat4(frame.view));
    device.set_mat4("projection", frame.projection);
    device.set_mat4("view", view);
    device.set_i32("skybox", units::SKYBOX_BACKGROUND as i32);

    device.bind_texture(
        units::SKYBOX_BACKGROUND,
        TextureTarget::CubeMap,
        Some(bindings.skybox),
    );
    device.draw_arrays(bindings.skybox_cube, Primitive::Triangles, SKYBOX_VERTEX_COUNT);

    device.set_depth_func(DepthFunc::Less);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::AssetPaths;
    use crate::device::UniformValue;
    use crate::recording::{Command, RecordingDevice};
    use glam::Vec3;

    #[test]
    fn test_skybox_view_has_no_translation() {
        let mut device = RecordingDevice::default();
        let bindings = ResourceBindings::create(&mut device, &AssetPaths::default()).unwrap();
        let program = device.create_program("skybox", "", "").unwrap();

        let view = Mat4::look_at_rh(Vec3::new(3.0, 2.0, 1.0), Vec3::ZERO, Vec3::Y);
        let frame = FrameInputs::new(view, Mat4::IDENTITY, Vec3::new(3.0, 2.0, 1.0));
        skybox_pass(&mut device, program, &bindings, &frame);

        let Some(UniformValue::Mat4(uploaded)) = device.uniform(program, "view") else {
            panic!("view not set");
        };
        assert_eq!(uploaded.w_axis, glam::Vec4::W);
        assert_eq!(device.uniform(program, "skybox"), Some(UniformValue::I32(0)));
    }

    #[test]
    fn test_depth_func_wraps_draw() {
        let mut device = RecordingDevice::default();
        let bindings = ResourceBindings::create(&mut device, &AssetPaths::default()).unwrap();
        let program = device.create_program("skybox", "", "").unwrap();
        device.clear_commands();

        let frame = FrameInputs::new(Mat4::IDENTITY, Mat4::IDENTITY, Vec3::ZERO);
        skybox_pass(&mut device, program, &bindings, &frame);

        let commands = device.commands();
        assert_eq!(commands.first(), Some(&Command::SetDepthFunc(DepthFunc::LessEqual)));
        assert_eq!(commands.last(), Some(&Command::SetDepthFunc(DepthFunc::Less)));
        assert!(commands.contains(&Command::Draw {
            program: Some(program),
            vao: bindings.skybox_cube,
            primitive: Primitive::Triangles,
            count: 36,
            instances: 1,
        }));
    }
}
