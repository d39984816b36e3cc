//! Depth-only pass from the primary light
//!
//! The light is treated as directional for shadowing: the light camera sits
//! on the light direction, halfway through a fixed orthographic volume, and
//! looks at the origin.

use glam::{Mat4, Vec3};

use crate::bindings::ResourceBindings;
use crate::device::{RenderDevice, Viewport};
use crate::passes::{FrameInputs, draw_objects};

/// Half-width and half-height of the orthographic shadow volume
pub const SHADOW_HALF_EXTENT: f32 = 3.0;
pub const SHADOW_NEAR: f32 = 1.0;
pub const SHADOW_DEPTH_RANGE: f32 = 10.0;

/// `lightProjection * lightView` for a light at `light_position`
///
/// Returns `None` for a zero-length direction.
pub fn light_space_matrix(light_position: Vec3) -> Option<Mat4> {
    let direction = light_position.try_normalize()?;

    // lookAt degenerates when looking straight along the up vector
    let up = if direction.cross(Vec3::Y).length_squared() < 1e-6 {
        Vec3::Z
    } else {
        Vec3::Y
    };

    let eye = direction * SHADOW_DEPTH_RANGE * 0.5;
    let view = Mat4::look_at_rh(eye, Vec3::ZERO, up);
    let projection = Mat4::orthographic_rh_gl(
        -SHADOW_HALF_EXTENT,
        SHADOW_HALF_EXTENT,
        -SHADOW_HALF_EXTENT,
        SHADOW_HALF_EXTENT,
        SHADOW_NEAR,
        SHADOW_NEAR + SHADOW_DEPTH_RANGE,
    );
    Some(projection * view)
}

/// Light-space matrix shared with the lit passes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowState {
    pub light_space: Mat4,
}

impl Default for ShadowState {
    fn default() -> Self {
        Self {
            light_space: Mat4::IDENTITY,
        }
    }
}

/// Render depth from `light_position` into the shadow target
///
/// The target is always cleared. When the light direction is degenerate the
/// draw is skipped and `state` keeps its previous matrix.
pub fn shadow_pass<D: RenderDevice>(
    device: &mut D,
    program: D::Program,
    bindings: &ResourceBindings<D>,
    state: &mut ShadowState,
    light_position: Vec3,
    instance_count: u32,
) {
    let light_space = light_space_matrix(light_position);
    if let Some(matrix) = light_space {
        state.light_space = matrix;
    }

    device.use_program(program);
    device.set_mat4("lightSpaceMatrix", state.light_space);

    let previous = device.viewport();
    let target = &bindings.shadow;
    device.set_viewport(Viewport::sized(target.width, target.height));
    device.bind_framebuffer(Some(target.framebuffer));
    device.clear(None, true);

    if light_space.is_some() {
        // The depth program only reads models, lightSpaceMatrix and the
        // diffuse alpha, camera values are ignored.
        let frame = FrameInputs::new(Mat4::IDENTITY, Mat4::IDENTITY, light_position);
        draw_objects(device, bindings, &frame, instance_count);
    }

    device.bind_framebuffer(None);
    device.set_viewport(previous);
}
