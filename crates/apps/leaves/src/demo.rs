//! The leaves demo application
//!
//! Owns the scene parameters, camera and forward renderer, and wires them to
//! the window's frame loop.

use std::sync::Arc;

use app::{App, Frame, InitError, InputState};
use renderer::{
    ForwardRenderer, FrameInputs, GlDevice, InstanceTransforms, RenderDevice, SceneParams, Viewport,
};
use tracing::{info, warn};
use winit::keyboard::KeyCode;

use crate::camera::{FlyCamera, FlyKeys};
use crate::config::{CameraConfig, LeavesConfig};
use crate::ui;

/// Work while the settings panel has keyboard focus
const HOTKEYS: [KeyCode; 2] = [KeyCode::Space, KeyCode::Escape];

pub struct LeavesApp {
    config: LeavesConfig,
    /// Transform seed; CLI value wins over the config
    seed: Option<u64>,
    paused: bool,
    exit_requested: bool,

    device: Option<GlDevice>,
    renderer: Option<ForwardRenderer<GlDevice>>,

    scene: SceneParams,
    camera: FlyCamera,

    last_delta: f32,
}

impl LeavesApp {
    pub fn new(config: LeavesConfig) -> Self {
        Self {
            camera: FlyCamera::from_config(&config.camera),
            seed: config.instances.seed,
            scene: config.scene.clone(),
            config,
            paused: false,
            exit_requested: false,
            device: None,
            renderer: None,
            last_delta: 0.0,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        if seed.is_some() {
            self.seed = seed;
        }
        self
    }

    /// Start with the camera released and the settings panel open
    pub fn with_paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn scene(&self) -> &SceneParams {
        &self.scene
    }

    pub fn camera(&self) -> &FlyCamera {
        &self.camera
    }

    /// Apply one frame of input and advance the animated light
    fn step(&mut self, input: &InputState, delta_time: f32) {
        if input.was_pressed(KeyCode::Escape) {
            info!("Escape pressed, exiting");
            self.exit_requested = true;
        }

        if input.was_pressed(KeyCode::Space) {
            self.paused = !self.paused;
            info!("{}", if self.paused { "Paused" } else { "Resumed" });
        }

        if !self.paused {
            let CameraConfig {
                move_speed,
                mouse_sensitivity,
                zoom_speed,
                ..
            } = self.config.camera;
            let motion = input.mouse_motion;
            self.camera.look(motion.x, motion.y, mouse_sensitivity);
            self.camera.zoom(input.scroll_lines, zoom_speed);

            let keys = FlyKeys {
                forward: input.is_held(KeyCode::KeyW),
                backward: input.is_held(KeyCode::KeyS),
                left: input.is_held(KeyCode::KeyA),
                right: input.is_held(KeyCode::KeyD),
            };
            self.camera.fly(keys, move_speed, delta_time);
        }

        self.scene.rotate_secondary_light(delta_time);
    }
}

impl App for LeavesApp {
    fn init(&mut self, frame: &Frame) -> Result<(), InitError> {
        info!(
            "Initializing leaves: {}x{}, seed {:?}",
            frame.width(),
            frame.height(),
            self.seed
        );

        let mut device = unsafe { GlDevice::new(Arc::clone(frame.gl)) };
        let transforms = InstanceTransforms::from_seed(self.seed);
        let renderer = ForwardRenderer::new(&mut device, &self.config.assets, transforms)?;

        self.device = Some(device);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn shutdown(&mut self, _frame: &Frame) {
        info!("Shutting down, releasing GPU resources");
        if let (Some(renderer), Some(device)) = (self.renderer.take(), self.device.as_mut()) {
            renderer.destroy(device);
        }
        self.device = None;
    }

    fn update(&mut self, frame: &Frame, input: &InputState) {
        self.last_delta = frame.delta_time;
        self.step(input, frame.delta_time);
    }

    fn render(&mut self, frame: &Frame) {
        let (Some(renderer), Some(device)) = (self.renderer.as_mut(), self.device.as_mut()) else {
            warn!("Render called before init");
            return;
        };

        device.set_viewport(Viewport::sized(frame.width(), frame.height()));
        let inputs = FrameInputs::new(
            self.camera.view(),
            self.camera.projection(frame.aspect_ratio()),
            self.camera.position,
        );
        renderer.render_frame(device, &inputs, &self.scene);
    }

    fn ui(&mut self, _frame: &Frame, egui: &egui::Context) {
        if self.paused {
            ui::settings_panel(egui, &mut self.scene, self.last_delta);
        }
    }

    fn cursor_grabbed(&self) -> bool {
        !self.paused
    }

    fn hotkeys(&self) -> &[KeyCode] {
        &HOTKEYS
    }

    fn should_exit(&self) -> bool {
        self.exit_requested
    }
}
