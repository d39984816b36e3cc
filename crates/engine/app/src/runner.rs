//! Event loop driving one [`App`]

use std::path::{Path, PathBuf};
use std::time::Instant;

use glow::{Context, HasContext};
use tracing::{debug, error, info};
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::WindowId;

#[cfg(target_os = "linux")]
use winit::platform::x11::EventLoopBuilderExtX11;

use crate::error::RuntimeError;
use crate::input::{InputState, press_blocked};
use crate::overlay::UiOverlay;
use crate::window::GlWindow;
use crate::{App, Frame};

/// Pixels per wheel line for touchpads that report pixel deltas
const PIXELS_PER_LINE: f64 = 10.0;

/// Save the framebuffer after a fixed number of frames, then exit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameCapture {
    pub after_frames: u64,
    pub path: PathBuf,
}

impl FrameCapture {
    pub fn new(after_frames: u64) -> Self {
        Self {
            after_frames,
            path: PathBuf::from("output/frame_last.png"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub title: String,
    /// Initial size in logical pixels
    pub width: u32,
    pub height: u32,
    pub capture: Option<FrameCapture>,
}

impl RunConfig {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            capture: None,
        }
    }
}

struct Runtime<A: App> {
    config: RunConfig,
    app: A,
    // Overlay first: its painter must be destroyed while the context lives
    overlay: Option<UiOverlay>,
    window: Option<GlWindow>,
    input: InputState,
    last_frame: Option<Instant>,
    frame_index: u64,
    initialized: bool,
    shut_down: bool,
    /// First fatal error, returned from `run_app`
    error: Option<RuntimeError>,
}

impl<A: App> Runtime<A> {
    fn new(app: A, config: RunConfig) -> Self {
        Self {
            config,
            app,
            overlay: None,
            window: None,
            input: InputState::new(),
            last_frame: None,
            frame_index: 0,
            initialized: false,
            shut_down: false,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: RuntimeError) {
        error!("{}", err);
        self.exit(event_loop);
        self.error.get_or_insert(err);
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        self.shutdown_app();
        event_loop.exit();
    }

    /// `App::shutdown` runs once, with the context still current
    fn shutdown_app(&mut self) {
        if self.shut_down || !self.initialized {
            return;
        }
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let frame = Frame {
            gl: &window.gl,
            size: window.size(),
            delta_time: 0.0,
            index: self.frame_index,
        };
        self.app.shutdown(&frame);
        self.shut_down = true;
        info!("App shut down after {} frames", self.frame_index);
    }

    fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<(), RuntimeError> {
        let window = GlWindow::create(
            event_loop,
            &self.config.title,
            self.config.width,
            self.config.height,
        )?;
        let overlay = unsafe { UiOverlay::new(&window.window, window.gl.clone())? };

        let frame = Frame {
            gl: &window.gl,
            size: window.size(),
            delta_time: 0.0,
            index: 0,
        };
        self.app.init(&frame).map_err(RuntimeError::Init)?;
        self.initialized = true;
        info!("App initialized");

        self.window = Some(window);
        self.overlay = Some(overlay);
        Ok(())
    }

    fn on_key(&mut self, event: &winit::event::KeyEvent, ui_consumed: bool) {
        let PhysicalKey::Code(key) = event.physical_key else {
            return;
        };
        let down = event.state == ElementState::Pressed;
        let blocked = press_blocked(key, ui_consumed, self.app.hotkeys());
        self.input.key(key, down, blocked);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(overlay)) = (self.window.as_ref(), self.overlay.as_mut()) else {
            return;
        };

        let now = Instant::now();
        let delta_time = self
            .last_frame
            .map_or(0.0, |last| (now - last).as_secs_f32());
        self.last_frame = Some(now);

        let frame = Frame {
            gl: &window.gl,
            size: window.size(),
            delta_time,
            index: self.frame_index,
        };

        self.app.update(&frame, &self.input);
        self.input.end_frame();

        if self.app.should_exit() {
            info!("App requested exit");
            self.exit(event_loop);
            return;
        }

        window.set_cursor_grabbed(self.app.cursor_grabbed());
        self.app.render(&frame);
        let app = &mut self.app;
        overlay.paint(&window.window, &window.gl, frame.size, |ctx| app.ui(&frame, ctx));

        if let Err(e) = window.present() {
            self.fail(event_loop, e);
            return;
        }
        self.frame_index += 1;

        if let Some(capture) = &self.config.capture {
            if self.frame_index >= capture.after_frames {
                info!("Frame {}: capturing and exiting", self.frame_index);
                match capture_frame(&window.gl, window.size(), &capture.path) {
                    Ok(()) => info!("Frame saved to {}", capture.path.display()),
                    Err(e) => error!("{}", e),
                }
                self.exit(event_loop);
                return;
            }
            debug!("Frame {}/{}", self.frame_index, capture.after_frames);
        }

        window.window.request_redraw();
    }
}

/// Read back the back buffer and write it as an image
fn capture_frame(gl: &Context, (width, height): (u32, u32), path: &Path) -> Result<(), RuntimeError> {
    let mut pixels = vec![0u8; width as usize * height as usize * 4];
    unsafe {
        gl.read_pixels(
            0,
            0,
            width as i32,
            height as i32,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            glow::PixelPackData::Slice(Some(&mut pixels)),
        );
    }
    save_bottom_up(pixels, width, height, path)
}

/// GL rows start at the bottom; image rows start at the top
fn save_bottom_up(pixels: Vec<u8>, width: u32, height: u32, path: &Path) -> Result<(), RuntimeError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let row = width as usize * 4;
    let flipped: Vec<u8> = if row == 0 {
        pixels
    } else {
        pixels.chunks_exact(row).rev().flatten().copied().collect()
    };
    let image = image::RgbaImage::from_raw(width, height, flipped)
        .ok_or_else(|| RuntimeError::Capture("pixel buffer size mismatch".to_string()))?;
    image
        .save(path)
        .map_err(|e| RuntimeError::Capture(e.to_string()))
}

impl<A: App> ApplicationHandler for Runtime<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.initialized {
            return;
        }
        if let Err(e) = self.open(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input.add_motion(delta.0, delta.1);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let ui_consumed = match (self.window.as_ref(), self.overlay.as_mut()) {
            (Some(window), Some(overlay)) => overlay.on_window_event(&window.window, &event),
            _ => false,
        };

        match event {
            // Releases are applied even when egui took the event
            WindowEvent::KeyboardInput { event, .. } => self.on_key(&event, ui_consumed),
            WindowEvent::MouseWheel { delta, .. } if !ui_consumed => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
                };
                self.input.add_scroll(lines);
            }
            WindowEvent::Focused(false) => self.input.release_all(),
            WindowEvent::CloseRequested => {
                info!("Close requested");
                self.exit(event_loop);
            }
            WindowEvent::Resized(size) => {
                if let Some(window) = &self.window {
                    window.resize(size.width, size.height);
                    window.window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown_app();
    }
}

/// Open the window and run `app` until it exits or fails
pub fn run_app<A: App>(app: A, config: RunConfig) -> Result<(), RuntimeError> {
    #[cfg(target_os = "linux")]
    let event_loop = EventLoop::builder().with_x11().build();
    #[cfg(not(target_os = "linux"))]
    let event_loop = EventLoop::new();

    let event_loop = event_loop.map_err(|e| RuntimeError::EventLoop(e.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut runtime = Runtime::new(app, config);
    event_loop
        .run_app(&mut runtime)
        .map_err(|e| RuntimeError::EventLoop(e.to_string()))?;

    match runtime.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_defaults() {
        let capture = FrameCapture::new(10);
        assert_eq!(capture.after_frames, 10);
        assert_eq!(capture.path, PathBuf::from("output/frame_last.png"));
        assert!(RunConfig::new("Leaves", 1280, 720).capture.is_none());
    }

    #[test]
    fn test_saved_image_is_flipped_upright() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("frame.png");

        // Two rows: GL bottom row red, top row blue
        let mut pixels = vec![255, 0, 0, 255];
        pixels.extend([0, 0, 255, 255]);
        save_bottom_up(pixels, 1, 2, &path).unwrap();

        let saved = image::open(&path).unwrap().to_rgba8();
        assert_eq!(saved.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(saved.get_pixel(0, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_short_buffer_is_a_capture_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_bottom_up(vec![0; 4], 2, 2, &dir.path().join("frame.png")).unwrap_err();
        assert!(matches!(err, RuntimeError::Capture(_)));
    }
}
