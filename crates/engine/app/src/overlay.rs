//! egui drawn over the app's frame

use std::sync::Arc;

use glow::{Context, HasContext};
use winit::event::WindowEvent;
use winit::window::Window;

use crate::error::RuntimeError;

pub(crate) struct UiOverlay {
    ctx: egui::Context,
    state: egui_winit::State,
    painter: egui_glow::Painter,
}

impl UiOverlay {
    /// # Safety
    /// The GL context behind `gl` must be current.
    pub(crate) unsafe fn new(window: &Window, gl: Arc<Context>) -> Result<Self, RuntimeError> {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let painter = egui_glow::Painter::new(gl, "", None, false)
            .map_err(|e| RuntimeError::Egui(e.to_string()))?;
        Ok(Self {
            ctx,
            state,
            painter,
        })
    }

    /// Feed an event to egui; true when a widget claimed it
    pub(crate) fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Build and paint one overlay frame on top of the current framebuffer
    ///
    /// Depth testing is off while painting and back on afterwards, which is
    /// the state the app's next frame starts from.
    pub(crate) fn paint(
        &mut self,
        window: &Window,
        gl: &Context,
        size: (u32, u32),
        build: impl FnMut(&egui::Context),
    ) {
        let raw_input = self.state.take_egui_input(window);
        let output = self.ctx.run(raw_input, build);
        self.state
            .handle_platform_output(window, output.platform_output);

        let primitives = self.ctx.tessellate(output.shapes, output.pixels_per_point);

        unsafe {
            gl.disable(glow::DEPTH_TEST);
            gl.enable(glow::BLEND);
            gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        }
        self.painter.paint_and_update_textures(
            [size.0, size.1],
            output.pixels_per_point,
            &primitives,
            &output.textures_delta,
        );
        unsafe {
            gl.disable(glow::BLEND);
            gl.enable(glow::DEPTH_TEST);
        }
    }
}

impl Drop for UiOverlay {
    fn drop(&mut self) {
        self.painter.destroy();
    }
}
