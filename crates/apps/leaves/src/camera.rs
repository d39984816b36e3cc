//! Fly camera steered by raw mouse motion, the wheel and WASD

use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

const PITCH_LIMIT: f32 = 89.0 * std::f32::consts::PI / 180.0;
const FOV_RANGE_DEGREES: (f32, f32) = (1.0, 45.0);
const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;

/// Movement keys held this frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FlyKeys {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// Yaw 0 looks down -Z; positive yaw turns right, positive pitch looks up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyCamera {
    pub position: Vec3,
    /// Radians
    pub yaw: f32,
    /// Radians, within ±89°
    pub pitch: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
}

impl FlyCamera {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            position: config.position,
            yaw: config.yaw.to_radians(),
            pitch: config.pitch.to_radians().clamp(-PITCH_LIMIT, PITCH_LIMIT),
            fov: config.fov.clamp(FOV_RANGE_DEGREES.0, FOV_RANGE_DEGREES.1),
        }
    }

    pub fn forward(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    /// Turn by a mouse delta; screen y grows downward
    pub fn look(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        self.yaw += dx * sensitivity;
        self.pitch = (self.pitch - dy * sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Wheel up narrows the field of view
    pub fn zoom(&mut self, lines: f32, degrees_per_line: f32) {
        let (min, max) = FOV_RANGE_DEGREES;
        self.fov = (self.fov - lines * degrees_per_line).clamp(min, max);
    }

    /// Move along the view direction at `speed` units per second
    pub fn fly(&mut self, keys: FlyKeys, speed: f32, delta_time: f32) {
        let forward = self.forward();
        let right = self.right();
        let mut direction = Vec3::ZERO;
        if keys.forward {
            direction += forward;
        }
        if keys.backward {
            direction -= forward;
        }
        if keys.right {
            direction += right;
        }
        if keys.left {
            direction -= right;
        }
        self.position += direction.normalize_or_zero() * speed * delta_time;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), Vec3::Y)
    }

    pub fn projection(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), aspect_ratio, NEAR, FAR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> FlyCamera {
        FlyCamera::from_config(&CameraConfig::default())
    }

    #[test]
    fn test_default_looks_down_negative_z() {
        let camera = camera();
        assert!(camera.forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(camera.right().abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn test_look_turns_right_and_clamps_pitch() {
        let mut camera = camera();
        camera.look(100.0, 0.0, 0.003);
        assert!(camera.forward().x > 0.0);

        camera.look(0.0, -10_000.0, 0.003);
        assert_eq!(camera.pitch, PITCH_LIMIT);
        camera.look(0.0, 10_000.0, 0.003);
        assert_eq!(camera.pitch, -PITCH_LIMIT);
    }

    #[test]
    fn test_zoom_clamps_fov() {
        let mut camera = camera();
        camera.zoom(2.0, 1.0);
        assert_eq!(camera.fov, 43.0);
        camera.zoom(-10.0, 1.0);
        assert_eq!(camera.fov, 45.0);
        camera.zoom(100.0, 1.0);
        assert_eq!(camera.fov, 1.0);
    }

    #[test]
    fn test_diagonal_fly_is_not_faster() {
        let mut camera = camera();
        let start = camera.position;
        let keys = FlyKeys {
            forward: true,
            right: true,
            ..Default::default()
        };
        camera.fly(keys, 2.0, 0.5);
        assert!(((camera.position - start).length() - 1.0).abs() < 1e-5);

        // Opposing keys cancel
        let before = camera.position;
        let keys = FlyKeys {
            left: true,
            right: true,
            ..Default::default()
        };
        camera.fly(keys, 2.0, 0.5);
        assert_eq!(camera.position, before);
    }

    #[test]
    fn test_view_maps_eye_to_origin() {
        let camera = camera();
        let eye = camera.view().transform_point3(camera.position);
        assert!(eye.abs_diff_eq(Vec3::ZERO, 1e-5));

        let ahead = camera.view().transform_point3(camera.position + camera.forward());
        assert!(ahead.abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }
}
