//! Forward lit passes
//!
//! The first light is drawn together with ambient and shadows. Every further
//! light is accumulated with additive blending and an `EQUAL` depth test, so
//! only the surfaces that won the base pass receive more light. Ambient and
//! shadows are off in the additive passes; they were already counted once.

use glam::Vec3;

use crate::bindings::{ResourceBindings, units};
use crate::device::{BlendMode, DepthFunc, RenderDevice, TextureTarget};
use crate::params::{Light, SceneParams, ShadingModel};
use crate::passes::{FrameInputs, ShadowState, draw_objects};

/// `ambientLightColor`: rgb is the ambient term, w flags environment reflection
fn set_ambient_uniforms<D: RenderDevice>(device: &mut D, ambient: Vec3) {
    let enabled = if ambient.length() > 0.0 { 1.0 } else { 0.0 };
    device.set_vec4("ambientLightColor", ambient.extend(enabled));
}

fn set_light_uniforms<D: RenderDevice>(device: &mut D, light: &Light, shading: ShadingModel) {
    device.set_vec3("lightPosition", light.position);
    device.set_vec3("lightColor", light.energy(shading));
    device.set_f32("lightRadius", light.radius);
}

fn set_material_uniforms<D: RenderDevice>(device: &mut D, params: &SceneParams) {
    let material = &params.material;
    device.set_f32("ambientReflectance", material.ambient_reflectance);
    match params.shading {
        ShadingModel::Translucent => {
            device.set_vec3("reflectionColor", material.reflection_color);
            device.set_f32("diffuseReflectance", material.diffuse_reflectance);
            device.set_f32("specularReflectance", material.specular_reflectance);
            device.set_f32("specularExponent", material.specular_exponent);
        }
        ShadingModel::Pbr => {
            device.set_f32("roughness", material.roughness);
            device.set_f32("metalness", material.metalness);
        }
    }

    device.set_f32("epsilonC", params.attenuation_coefficient());
    device.set_f32("minThickness", params.min_thickness);
    device.set_f32("maxThickness", params.max_thickness);
}

fn set_shadow_uniforms<D: RenderDevice>(
    device: &mut D,
    bindings: &ResourceBindings<D>,
    shadow: &ShadowState,
) {
    device.set_mat4("lightSpaceMatrix", shadow.light_space);
    device.bind_texture(
        units::SHADOW_MAP,
        TextureTarget::Texture2D,
        Some(bindings.shadow.texture),
    );
    device.set_i32("shadowMap", units::SHADOW_MAP as i32);
    device.set_i32("shadowEnabled", 1);
}

fn setup_additive_pass<D: RenderDevice>(device: &mut D) {
    set_ambient_uniforms(device, Vec3::ZERO);
    device.set_blend(BlendMode::Additive);
    device.set_depth_func(DepthFunc::Equal);
    device.bind_texture(units::SHADOW_MAP, TextureTarget::Texture2D, None);
    device.set_i32("shadowEnabled", 0);
}

fn reset_additive_pass<D: RenderDevice>(device: &mut D, ambient: Vec3) {
    set_ambient_uniforms(device, ambient);
    device.set_blend(BlendMode::Disabled);
    device.set_depth_func(DepthFunc::Less);
    device.bind_texture(units::SHADOW_MAP, TextureTarget::Texture2D, None);
}

/// Draw the base pass and one additive pass per extra light
///
/// With no lights the base pass still draws, lit by ambient only.
pub fn lit_passes<D: RenderDevice>(
    device: &mut D,
    program: D::Program,
    bindings: &ResourceBindings<D>,
    shadow: &ShadowState,
    frame: &FrameInputs,
    params: &SceneParams,
) {
    let instances = params.clamped_instance_count();
    let ambient = params.ambient();

    device.use_program(program);
    set_material_uniforms(device, params);

    // Base pass
    device.set_depth_func(DepthFunc::Less);
    device.set_blend(BlendMode::Disabled);
    set_ambient_uniforms(device, ambient);
    set_shadow_uniforms(device, bindings, shadow);
    match params.primary_light() {
        Some(light) => set_light_uniforms(device, light, params.shading),
        None => device.set_vec3("lightColor", Vec3::ZERO),
    }
    draw_objects(device, bindings, frame, instances);

    let extra_lights = params.lights.get(1..).unwrap_or_default();
    if !extra_lights.is_empty() {
        setup_additive_pass(device);
        for light in extra_lights {
            set_light_uniforms(device, light, params.shading);
            draw_objects(device, bindings, frame, instances);
        }
    }
    reset_additive_pass(device, ambient);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::AssetPaths;
    use crate::device::UniformValue;
    use crate::recording::{Command, RecordingDevice};
    use glam::{Mat4, Vec4};

    fn setup() -> (RecordingDevice, ResourceBindings<RecordingDevice>, u32) {
        let mut device = RecordingDevice::default();
        let bindings = ResourceBindings::create(&mut device, &AssetPaths::default()).unwrap();
        let program = device.create_program("leaf", "", "").unwrap();
        device.clear_commands();
        (device, bindings, program)
    }

    fn frame() -> FrameInputs {
        FrameInputs::new(Mat4::IDENTITY, Mat4::IDENTITY, Vec3::new(0.0, 1.6, 5.0))
    }

    #[test]
    fn test_single_light_skips_additive_state() {
        let (mut device, bindings, program) = setup();
        let params = SceneParams {
            lights: vec![Light::default()],
            ..Default::default()
        };

        lit_passes(&mut device, program, &bindings, &ShadowState::default(), &frame(), &params);

        assert_eq!(device.draws().len(), 1);
        assert!(!device.commands().contains(&Command::SetBlend(BlendMode::Additive)));
        assert_eq!(device.depth_func(), DepthFunc::Less);
    }

    #[test]
    fn test_shadow_unit_unbound_after_single_light() {
        let (mut device, bindings, program) = setup();
        let params = SceneParams {
            lights: vec![Light::default()],
            ..Default::default()
        };

        lit_passes(&mut device, program, &bindings, &ShadowState::default(), &frame(), &params);

        let last_shadow_bind = device.commands().iter().rev().find_map(|cmd| match cmd {
            Command::BindTexture { unit, texture, .. } if *unit == units::SHADOW_MAP => {
                Some(*texture)
            }
            _ => None,
        });
        assert_eq!(last_shadow_bind, Some(None));
        assert_eq!(
            device.uniform(program, "ambientLightColor"),
            Some(UniformValue::Vec4(params.ambient().extend(1.0)))
        );
    }

    #[test]
    fn test_directionless_light_uploads_zero_energy() {
        let (mut device, bindings, program) = setup();
        let mut params = SceneParams::default();
        params.lights.truncate(1);
        params.lights[0].position = Vec3::ZERO;

        lit_passes(&mut device, program, &bindings, &ShadowState::default(), &frame(), &params);

        assert_eq!(device.uniform(program, "lightColor"), Some(UniformValue::Vec3(Vec3::ZERO)));
        assert_eq!(device.draws().len(), 1);
    }

    #[test]
    fn test_no_lights_draws_ambient_only() {
        let (mut device, bindings, program) = setup();
        let params = SceneParams {
            lights: Vec::new(),
            ..Default::default()
        };

        lit_passes(&mut device, program, &bindings, &ShadowState::default(), &frame(), &params);

        assert_eq!(device.draws().len(), 1);
        assert_eq!(device.uniform(program, "lightColor"), Some(UniformValue::Vec3(Vec3::ZERO)));
    }

    #[test]
    fn test_zero_intensity_light_uploads_zero_energy() {
        let (mut device, bindings, program) = setup();
        let mut params = SceneParams::default();
        params.lights.truncate(1);
        params.lights[0].intensity = 0.0;
        params.shading = ShadingModel::Pbr;

        lit_passes(&mut device, program, &bindings, &ShadowState::default(), &frame(), &params);

        assert_eq!(device.uniform(program, "lightColor"), Some(UniformValue::Vec3(Vec3::ZERO)));
    }

    #[test]
    fn test_pbr_sets_roughness_and_metalness() {
        let (mut device, bindings, program) = setup();
        let params = SceneParams {
            shading: ShadingModel::Pbr,
            ..Default::default()
        };

        lit_passes(&mut device, program, &bindings, &ShadowState::default(), &frame(), &params);

        assert_eq!(device.uniform(program, "roughness"), Some(UniformValue::F32(0.5)));
        assert_eq!(device.uniform(program, "metalness"), Some(UniformValue::F32(0.0)));
        assert_eq!(device.uniform(program, "specularExponent"), None);
    }

    #[test]
    fn test_ambient_flag_tracks_length() {
        let (mut device, bindings, program) = setup();
        let params = SceneParams {
            ambient_intensity: 0.0,
            ..Default::default()
        };

        lit_passes(&mut device, program, &bindings, &ShadowState::default(), &frame(), &params);

        assert_eq!(
            device.uniform(program, "ambientLightColor"),
            Some(UniformValue::Vec4(Vec4::ZERO))
        );
    }
}
