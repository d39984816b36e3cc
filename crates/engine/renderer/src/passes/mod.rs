//! Render passes for the leaf scene
//!
//! Each pass takes the program it draws with as an argument and leaves GL
//! state the way the next pass expects it:
//! - [`shadow`] - depth-only render from the primary light
//! - [`skybox`] - cubemap background drawn at the far plane
//! - [`lit`] - ambient + first light, then one additive pass per extra light
//!
//! All leaf-drawing passes go through [`draw_objects`], so the instanced
//! quad is submitted identically regardless of which pass is running.

pub mod lit;
pub mod shadow;
pub mod skybox;

use glam::{Mat4, Vec3};

use crate::bindings::{ResourceBindings, units};
use crate::device::{Primitive, RenderDevice, TextureTarget};
use crate::geometry::QUAD_VERTEX_COUNT;

pub use lit::lit_passes;
pub use shadow::{ShadowState, light_space_matrix, shadow_pass};
pub use skybox::skybox_pass;

/// Per-frame camera data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInputs {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
}

impl FrameInputs {
    pub fn new(view: Mat4, projection: Mat4, camera_position: Vec3) -> Self {
        Self {
            view,
            projection,
            camera_position,
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// Compiled programs, one per pass kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Programs<P> {
    pub translucent: P,
    pub pbr: P,
    pub shadow: P,
    pub skybox: P,
}

impl<P: Copy> Programs<P> {
    /// Programs that share the common vertex stage and read `models[i]`
    pub fn instanced(&self) -> [P; 3] {
        [self.translucent, self.pbr, self.shadow]
    }

    pub fn all(&self) -> [P; 4] {
        [self.translucent, self.pbr, self.shadow, self.skybox]
    }
}

/// Bind the shared leaf resources and draw the instanced quad
///
/// Uses whatever program is current on `device`.
pub fn draw_objects<D: RenderDevice>(
    device: &mut D,
    bindings: &ResourceBindings<D>,
    frame: &FrameInputs,
    instance_count: u32,
) {
    device.set_vec3("camPosition", frame.camera_position);
    device.set_mat4("viewProjection", frame.view_projection());

    device.bind_texture(units::SKYBOX, TextureTarget::CubeMap, Some(bindings.skybox));
    device.set_i32("skybox", units::SKYBOX as i32);

    let leaf = &bindings.leaf;
    for (unit, name, texture) in [
        (units::DIFFUSE, "texture_diffuse1", leaf.diffuse),
        (units::NORMAL, "texture_normal1", leaf.normal),
        (units::TRANSLUCENCY, "texture_translucency1", leaf.translucency),
        (units::ROUGHNESS, "texture_roughness1", leaf.roughness),
    ] {
        device.bind_texture(unit, TextureTarget::Texture2D, Some(texture));
        device.set_i32(name, unit as i32);
    }

    device.draw_arrays_instanced(
        bindings.quad,
        Primitive::TriangleStrip,
        QUAD_VERTEX_COUNT,
        instance_count as i32,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::AssetPaths;
    use crate::device::UniformValue;
    use crate::recording::{Command, RecordingDevice};

    #[test]
    fn test_view_projection_order() {
        let frame = FrameInputs::new(
            Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)),
            Mat4::from_scale(Vec3::splat(2.0)),
            Vec3::new(0.0, 0.0, 5.0),
        );
        let p = frame.view_projection().transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(0.0, 0.0, -10.0));
    }

    #[test]
    fn test_draw_objects_binds_all_leaf_units() {
        let mut device = RecordingDevice::default();
        let bindings = ResourceBindings::create(&mut device, &AssetPaths::default()).unwrap();
        let program = device.create_program("leaf", "", "").unwrap();
        device.use_program(program);
        device.clear_commands();

        let frame = FrameInputs::new(Mat4::IDENTITY, Mat4::IDENTITY, Vec3::ONE);
        draw_objects(&mut device, &bindings, &frame, 3);

        for (unit, name) in [
            (1, "texture_diffuse1"),
            (2, "texture_normal1"),
            (5, "skybox"),
            (7, "texture_translucency1"),
            (8, "texture_roughness1"),
        ] {
            assert_eq!(device.uniform(program, name), Some(UniformValue::I32(unit)), "{}", name);
        }
        assert_eq!(device.uniform(program, "camPosition"), Some(UniformValue::Vec3(Vec3::ONE)));

        assert_eq!(
            device.draws(),
            vec![&Command::Draw {
                program: Some(program),
                vao: bindings.quad,
                primitive: Primitive::TriangleStrip,
                count: 4,
                instances: 3,
            }]
        );
    }
}
