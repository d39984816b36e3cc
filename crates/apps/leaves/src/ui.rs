//! Settings panel
//!
//! Edits [`SceneParams`] in place. The only validation is the slider ranges,
//! which are the same ranges the config loader clamps to.

use glam::Vec3;
use renderer::SceneParams;
use renderer::params::{
    AMBIENT_INTENSITY_RANGE, BEER_CONSTANT_RANGE, INSTANCE_COUNT_RANGE, LIGHT_INTENSITY_RANGE,
    LIGHT_POSITION_RANGE, LIGHT_RADIUS_RANGE, Light, ROTATION_SPEED_RANGE, ShadingModel,
    THICKNESS_RANGE,
};

/// Frame time line shown at the bottom of the panel
pub fn frame_stats_label(delta_time: f32) -> String {
    let fps = if delta_time > 0.0 { 1.0 / delta_time } else { 0.0 };
    format!("{:.3} ms/frame ({:.1} FPS)", delta_time * 1000.0, fps)
}

fn color_edit(ui: &mut egui::Ui, label: &str, color: &mut Vec3) {
    ui.horizontal(|ui| {
        let mut rgb = color.to_array();
        if ui.color_edit_button_rgb(&mut rgb).changed() {
            *color = Vec3::from_array(rgb);
        }
        ui.label(label);
    });
}

fn position_sliders(ui: &mut egui::Ui, label: &str, position: &mut Vec3) {
    ui.label(label);
    let mut xyz = position.to_array();
    for (axis, value) in ["x", "y", "z"].into_iter().zip(xyz.iter_mut()) {
        ui.add(egui::Slider::new(value, LIGHT_POSITION_RANGE).text(axis));
    }
    *position = Vec3::from_array(xyz);
}

fn light_controls(ui: &mut egui::Ui, light: &mut Light, position_label: &str, point: bool) {
    position_sliders(ui, position_label, &mut light.position);
    color_edit(ui, "Color", &mut light.color);
    ui.add(egui::Slider::new(&mut light.intensity, LIGHT_INTENSITY_RANGE).text("Intensity"));
    if point {
        ui.add(
            egui::Slider::new(&mut light.radius, LIGHT_RADIUS_RANGE)
                .logarithmic(true)
                .text("Radius"),
        );
    }
}

/// Draw the settings window
pub fn settings_panel(ctx: &egui::Context, params: &mut SceneParams, delta_time: f32) {
    egui::Window::new("Settings")
        .default_pos(egui::pos2(10.0, 10.0))
        .resizable(false)
        .show(ctx, |ui| {
            egui::CollapsingHeader::new("Ambient light")
                .default_open(true)
                .show(ui, |ui| {
                    color_edit(ui, "Color", &mut params.ambient_color);
                    ui.add(
                        egui::Slider::new(&mut params.ambient_intensity, AMBIENT_INTENSITY_RANGE)
                            .text("Intensity"),
                    );
                });

            if let Some(light) = params.lights.get_mut(0) {
                egui::CollapsingHeader::new("Light 1 (directional, shadowed)")
                    .default_open(true)
                    .show(ui, |ui| light_controls(ui, light, "Direction", false));
            }

            if params.lights.len() > 1 {
                egui::CollapsingHeader::new("Light 2 (point, rotating)")
                    .default_open(true)
                    .show(ui, |ui| {
                        light_controls(ui, &mut params.lights[1], "Position", true);
                        ui.add(
                            egui::Slider::new(
                                &mut params.light_rotation_speed,
                                ROTATION_SPEED_RANGE,
                            )
                            .text("Rotation speed"),
                        );
                    });
            }

            egui::CollapsingHeader::new("Translucency")
                .default_open(true)
                .show(ui, |ui| {
                    ui.add(egui::Slider::new(&mut params.epsilon, BEER_CONSTANT_RANGE).text("Epsilon"));
                    ui.add(egui::Slider::new(&mut params.c, BEER_CONSTANT_RANGE).text("c"));
                    ui.add(
                        egui::Slider::new(&mut params.max_thickness, THICKNESS_RANGE)
                            .text("Max thickness"),
                    );
                    ui.add(
                        egui::Slider::new(&mut params.min_thickness, THICKNESS_RANGE)
                            .text("Min thickness"),
                    );
                    ui.label(format!("epsilon * c = {:.3}", params.attenuation_coefficient()));
                });

            egui::CollapsingHeader::new("Scene")
                .default_open(true)
                .show(ui, |ui| {
                    ui.add(
                        egui::Slider::new(&mut params.instance_count, INSTANCE_COUNT_RANGE)
                            .text("Instances"),
                    );
                    egui::ComboBox::from_label("Shading")
                        .selected_text(params.shading.label())
                        .show_ui(ui, |ui| {
                            for model in [ShadingModel::Translucent, ShadingModel::Pbr] {
                                ui.selectable_value(&mut params.shading, model, model.label());
                            }
                        });
                });

            ui.separator();
            ui.label(frame_stats_label(delta_time));
            ui.small("Space: resume camera | Esc: quit");
        });
}
