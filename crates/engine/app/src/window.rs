//! The single window and its current GL context

use std::num::NonZeroU32;
use std::sync::Arc;

use glow::Context;
use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version,
};
use glutin::display::{Display, DisplayApiPreference};
use glutin::prelude::*;
use glutin::surface::{Surface, WindowSurface};
use glutin_winit::GlWindow as _;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{CursorGrabMode, Window};

use crate::error::RuntimeError;

/// Shaders target GLSL 330 core
const GL_VERSION: Version = Version::new(3, 3);

pub(crate) struct GlWindow {
    // Field order is drop order: the surface and context go before the window
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    pub(crate) gl: Arc<Context>,
    pub(crate) window: Window,
}

impl GlWindow {
    pub(crate) fn create(
        event_loop: &ActiveEventLoop,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<Self, RuntimeError> {
        let raw_display = event_loop
            .display_handle()
            .map_err(RuntimeError::display)?
            .as_raw();
        let display =
            unsafe { Display::new(raw_display, api_preference()) }.map_err(RuntimeError::display)?;
        let config = pick_config(&display)?;

        let attributes = Window::default_attributes()
            .with_title(title)
            .with_inner_size(LogicalSize::new(width, height));
        let window = glutin_winit::finalize_window(event_loop, attributes, &config)
            .map_err(RuntimeError::display)?;

        let raw_window = window
            .window_handle()
            .map_err(RuntimeError::surface)?
            .as_raw();
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(GL_VERSION)))
            .with_profile(GlProfile::Core)
            .build(Some(raw_window));
        let context = unsafe { display.create_context(&config, &context_attributes) }
            .map_err(RuntimeError::context)?;

        let surface_attributes = window
            .build_surface_attributes(Default::default())
            .map_err(RuntimeError::surface)?;
        let surface = unsafe { display.create_window_surface(&config, &surface_attributes) }
            .map_err(RuntimeError::surface)?;
        let context = context
            .make_current(&surface)
            .map_err(RuntimeError::context)?;

        let gl = Arc::new(unsafe {
            Context::from_loader_function_cstr(|name| display.get_proc_address(name))
        });

        let size = window.inner_size();
        info!(
            "OpenGL {}.{} core context ({}x{}, {} samples)",
            GL_VERSION.major,
            GL_VERSION.minor,
            size.width,
            size.height,
            config.num_samples()
        );

        Ok(Self {
            surface,
            context,
            gl,
            window,
        })
    }

    /// Drawable size in physical pixels
    pub(crate) fn size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    /// Minimized windows report zero and keep the old surface
    pub(crate) fn resize(&self, width: u32, height: u32) {
        if let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
            self.surface.resize(&self.context, w, h);
        }
    }

    pub(crate) fn present(&self) -> Result<(), RuntimeError> {
        self.surface
            .swap_buffers(&self.context)
            .map_err(RuntimeError::surface)
    }

    /// Lock and hide the cursor, or give it back
    pub(crate) fn set_cursor_grabbed(&self, grabbed: bool) {
        self.window.set_cursor_visible(!grabbed);
        let result = if grabbed {
            // Wayland and macOS lock; X11 and Windows only confine
            self.window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            self.window.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(e) = result {
            warn!("Cursor grab not supported: {}", e);
        }
    }
}

/// Prefer multisampled configs; an empty list is a display error
fn pick_config(display: &Display) -> Result<Config, RuntimeError> {
    let template = ConfigTemplateBuilder::new()
        .with_alpha_size(8)
        .with_transparency(false)
        .build();
    let configs = unsafe { display.find_configs(template) }.map_err(RuntimeError::display)?;
    most_samples(configs, |config| config.num_samples())
        .ok_or_else(|| RuntimeError::Display("no GL config matches the template".to_string()))
}

/// First entry with the highest sample count
fn most_samples<C>(configs: impl Iterator<Item = C>, samples: impl Fn(&C) -> u8) -> Option<C> {
    configs.reduce(|best, config| {
        if samples(&config) > samples(&best) {
            config
        } else {
            best
        }
    })
}

#[cfg(target_os = "linux")]
fn api_preference() -> DisplayApiPreference {
    DisplayApiPreference::GlxThenEgl(Box::new(winit::platform::x11::register_xlib_error_hook))
}

#[cfg(target_os = "macos")]
fn api_preference() -> DisplayApiPreference {
    DisplayApiPreference::Cgl
}

#[cfg(target_os = "windows")]
fn api_preference() -> DisplayApiPreference {
    DisplayApiPreference::WglThenEgl(None)
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn api_preference() -> DisplayApiPreference {
    DisplayApiPreference::Egl
}
