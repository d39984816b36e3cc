//! Scene parameters read by every pass each frame
//!
//! `SceneParams` is plain data owned by the application loop. The settings
//! panel edits it by reference; passes only read it.

use std::f32::consts::PI;
use std::ops::RangeInclusive;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::transforms::MAX_INSTANCES;

/// Slider range for light positions on each axis
pub const LIGHT_POSITION_RANGE: RangeInclusive<f32> = -20.0..=20.0;
pub const LIGHT_INTENSITY_RANGE: RangeInclusive<f32> = 0.0..=50.0;
pub const LIGHT_RADIUS_RANGE: RangeInclusive<f32> = 0.01..=50.0;
pub const AMBIENT_INTENSITY_RANGE: RangeInclusive<f32> = 0.0..=1.0;
/// Radians per second
pub const ROTATION_SPEED_RANGE: RangeInclusive<f32> = 0.0..=2.0;
/// Range for both Beer's-law constants
pub const BEER_CONSTANT_RANGE: RangeInclusive<f32> = 0.01..=1.0;
pub const THICKNESS_RANGE: RangeInclusive<f32> = 0.01..=10.0;
pub const INSTANCE_COUNT_RANGE: RangeInclusive<u32> = 1..=MAX_INSTANCES as u32;

fn clamp_range(value: f32, range: &RangeInclusive<f32>) -> f32 {
    value.clamp(*range.start(), *range.end())
}

/// Which fragment shading model the lit passes use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadingModel {
    /// Blinn-Phong with Beer's-law transmission
    #[default]
    Translucent,
    /// Energy-conserving microfacet shading with Beer's-law transmission
    Pbr,
}

impl ShadingModel {
    pub fn label(self) -> &'static str {
        match self {
            ShadingModel::Translucent => "Translucent",
            ShadingModel::Pbr => "PBR",
        }
    }
}

/// A light in world space
///
/// For the primary light `position` is the direction toward the light.
/// A radius of zero or less marks a directional light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub radius: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::Y,
            color: Vec3::ONE,
            intensity: 1.0,
            radius: 0.0,
        }
    }
}

impl Light {
    pub fn new(position: Vec3, color: Vec3, intensity: f32, radius: f32) -> Self {
        Self {
            position,
            color,
            intensity,
            radius,
        }
    }

    /// Radiant energy uploaded as `lightColor`
    ///
    /// PBR shading divides diffuse by pi, so the energy is scaled by pi to
    /// keep the same exposure as the translucent model.
    ///
    /// A directional light with a zero direction has no energy.
    pub fn energy(&self, shading: ShadingModel) -> Vec3 {
        if !self.has_direction() {
            return Vec3::ZERO;
        }
        let energy = self.color * self.intensity;
        match shading {
            ShadingModel::Translucent => energy,
            ShadingModel::Pbr => energy * PI,
        }
    }

    pub fn is_directional(&self) -> bool {
        self.radius <= 0.0
    }

    /// False for a directional light whose direction is the zero vector
    pub fn has_direction(&self) -> bool {
        !self.is_directional() || self.position.length_squared() > f32::EPSILON
    }

    fn clamp_to_ranges(&mut self) {
        self.position = self.position.clamp(
            Vec3::splat(*LIGHT_POSITION_RANGE.start()),
            Vec3::splat(*LIGHT_POSITION_RANGE.end()),
        );
        self.color = self.color.clamp(Vec3::ZERO, Vec3::ONE);
        self.intensity = clamp_range(self.intensity, &LIGHT_INTENSITY_RANGE);
        // Directional lights keep a zero radius
        if self.radius > 0.0 {
            self.radius = clamp_range(self.radius, &LIGHT_RADIUS_RANGE);
        } else {
            self.radius = 0.0;
        }
    }
}

/// Surface reflectance coefficients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialParams {
    pub reflection_color: Vec3,
    pub ambient_reflectance: f32,
    pub diffuse_reflectance: f32,
    pub specular_reflectance: f32,
    pub specular_exponent: f32,
    pub roughness: f32,
    pub metalness: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            reflection_color: Vec3::new(0.9, 0.9, 0.2),
            ambient_reflectance: 0.75,
            diffuse_reflectance: 0.75,
            specular_reflectance: 0.5,
            specular_exponent: 10.0,
            roughness: 0.5,
            metalness: 0.0,
        }
    }
}

/// Everything the passes read each frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneParams {
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    pub material: MaterialParams,
    /// Light 0 casts the shadow; the rest are added unshadowed
    pub lights: Vec<Light>,
    /// Angular speed of light 1 around world up, radians per second
    pub light_rotation_speed: f32,
    /// Beer's-law absorption coefficient
    pub epsilon: f32,
    /// Beer's-law concentration
    pub c: f32,
    /// Min and max are clamped independently; the shader orders them
    pub min_thickness: f32,
    pub max_thickness: f32,
    pub instance_count: u32,
    pub shading: ShadingModel,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            ambient_color: Vec3::ONE,
            ambient_intensity: 0.25,
            material: MaterialParams::default(),
            lights: vec![
                Light::new(Vec3::new(-1.0, 1.0, -0.5), Vec3::ONE, 30.0, 0.0),
                Light::new(Vec3::new(1.0, 1.5, 0.0), Vec3::new(0.7, 0.2, 1.0), 0.0, 10.0),
            ],
            light_rotation_speed: 1.0,
            epsilon: 1.0,
            c: 1.0,
            min_thickness: 0.1,
            max_thickness: 5.0,
            instance_count: 1,
            shading: ShadingModel::Translucent,
        }
    }
}

impl SceneParams {
    /// Ambient term for the base pass
    pub fn ambient(&self) -> Vec3 {
        self.ambient_color * self.ambient_intensity
    }

    /// Combined Beer's-law coefficient, `epsilon * c`
    pub fn attenuation_coefficient(&self) -> f32 {
        self.epsilon * self.c
    }

    /// The shadow-casting light
    pub fn primary_light(&self) -> Option<&Light> {
        self.lights.first()
    }

    /// Instances actually drawn, within [1, 100]
    pub fn clamped_instance_count(&self) -> u32 {
        self.instance_count
            .clamp(*INSTANCE_COUNT_RANGE.start(), *INSTANCE_COUNT_RANGE.end())
    }

    /// Rotate light 1 about world up by `light_rotation_speed * dt` radians
    pub fn rotate_secondary_light(&mut self, dt: f32) {
        if self.light_rotation_speed <= 0.0 {
            return;
        }
        let angle = self.light_rotation_speed * dt;
        if let Some(light) = self.lights.get_mut(1) {
            light.position = Quat::from_rotation_y(angle) * light.position;
        }
    }

    /// Clamp every field to the range the settings panel allows
    pub fn clamp_to_ranges(&mut self) {
        self.ambient_color = self.ambient_color.clamp(Vec3::ZERO, Vec3::ONE);
        self.ambient_intensity = clamp_range(self.ambient_intensity, &AMBIENT_INTENSITY_RANGE);
        self.light_rotation_speed = clamp_range(self.light_rotation_speed, &ROTATION_SPEED_RANGE);
        self.epsilon = clamp_range(self.epsilon, &BEER_CONSTANT_RANGE);
        self.c = clamp_range(self.c, &BEER_CONSTANT_RANGE);
        self.min_thickness = clamp_range(self.min_thickness, &THICKNESS_RANGE);
        self.max_thickness = clamp_range(self.max_thickness, &THICKNESS_RANGE);
        self.instance_count = self.clamped_instance_count();
        for light in &mut self.lights {
            light.clamp_to_ranges();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attenuation_coefficient() {
        let params = SceneParams {
            epsilon: 0.5,
            c: 0.2,
            ..Default::default()
        };
        assert_eq!(params.attenuation_coefficient(), 0.1);
    }

    #[test]
    fn test_zero_intensity_has_zero_energy() {
        let light = Light::new(Vec3::new(3.0, 1.0, 2.0), Vec3::new(0.7, 0.2, 1.0), 0.0, 10.0);
        assert_eq!(light.energy(ShadingModel::Translucent), Vec3::ZERO);
        assert_eq!(light.energy(ShadingModel::Pbr), Vec3::ZERO);
    }

    #[test]
    fn test_pbr_energy_scaled_by_pi() {
        let light = Light::new(Vec3::Y, Vec3::new(1.0, 0.5, 0.25), 2.0, 0.0);
        assert_eq!(light.energy(ShadingModel::Translucent), Vec3::new(2.0, 1.0, 0.5));
        assert_eq!(light.energy(ShadingModel::Pbr), Vec3::new(2.0, 1.0, 0.5) * PI);
    }

    #[test]
    fn test_zero_direction_has_no_energy() {
        let directional = Light::new(Vec3::ZERO, Vec3::ONE, 30.0, 0.0);
        assert!(!directional.has_direction());
        assert_eq!(directional.energy(ShadingModel::Translucent), Vec3::ZERO);
        assert_eq!(directional.energy(ShadingModel::Pbr), Vec3::ZERO);

        // A point light at the origin still lights everything around it
        let point = Light::new(Vec3::ZERO, Vec3::ONE, 2.0, 5.0);
        assert!(point.has_direction());
        assert_eq!(point.energy(ShadingModel::Translucent), Vec3::splat(2.0));
    }

    #[test]
    fn test_ambient_is_color_times_intensity() {
        let params = SceneParams {
            ambient_color: Vec3::new(0.2, 0.4, 1.0),
            ambient_intensity: 0.5,
            ..Default::default()
        };
        assert_eq!(params.ambient(), Vec3::new(0.1, 0.2, 0.5));
    }

    #[test]
    fn test_rotation_preserves_distance() {
        let mut params = SceneParams::default();
        params.light_rotation_speed = 1.5;
        let before = params.lights[1].position;

        params.rotate_secondary_light(0.25);
        let after = params.lights[1].position;

        let expected = Quat::from_axis_angle(Vec3::Y, 1.5 * 0.25) * before;
        assert!((after - expected).length() < 1e-5);
        assert!((after.length() - before.length()).abs() < 1e-5);
        assert!((after.y - before.y).abs() < 1e-6);
        // Primary light untouched
        assert_eq!(params.lights[0], SceneParams::default().lights[0]);
    }

    #[test]
    fn test_rotation_disabled_at_zero_speed() {
        let mut params = SceneParams::default();
        params.light_rotation_speed = 0.0;
        let before = params.lights[1].position;
        params.rotate_secondary_light(10.0);
        assert_eq!(params.lights[1].position, before);
    }

    #[test]
    fn test_rotation_with_single_light_is_noop() {
        let mut params = SceneParams::default();
        params.lights.truncate(1);
        params.rotate_secondary_light(1.0);
        assert_eq!(params.lights.len(), 1);
    }

    #[test]
    fn test_clamp_keeps_thickness_order_unenforced() {
        let mut params = SceneParams {
            min_thickness: 8.0,
            max_thickness: 0.0,
            instance_count: 500,
            epsilon: 3.0,
            ..Default::default()
        };
        params.clamp_to_ranges();

        assert_eq!(params.min_thickness, 8.0);
        assert_eq!(params.max_thickness, 0.01);
        assert_eq!(params.instance_count, 100);
        assert_eq!(params.epsilon, 1.0);
    }

    #[test]
    fn test_clamp_instance_count_lower_bound() {
        let mut params = SceneParams {
            instance_count: 0,
            ..Default::default()
        };
        params.clamp_to_ranges();
        assert_eq!(params.instance_count, 1);
    }

    #[test]
    fn test_directional_radius_stays_zero() {
        let mut params = SceneParams::default();
        params.clamp_to_ranges();
        assert!(params.lights[0].is_directional());
        assert!(!params.lights[1].is_directional());
    }

    #[test]
    fn test_defaults_from_partial_toml() {
        let params: SceneParams = toml::from_str(
            r#"
            epsilon = 0.5
            shading = "pbr"

            [[lights]]
            position = [0.0, 2.0, 0.0]
            intensity = 12.0
            "#,
        )
        .unwrap();

        assert_eq!(params.epsilon, 0.5);
        assert_eq!(params.c, 1.0);
        assert_eq!(params.shading, ShadingModel::Pbr);
        assert_eq!(params.lights.len(), 1);
        assert_eq!(params.lights[0].position, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(params.lights[0].color, Vec3::ONE);
    }
}
