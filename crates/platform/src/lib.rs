//! Platform layer: windowing & event loop.
//!
//! Owns the window and forwards exactly two things to the renderer: resize
//! notifications and per-frame redraw requests. Decides what a failed frame
//! means (skip, reconfigure or shut down).

use std::sync::Arc;

use anyhow::{Context, Result};
use corelib::clock::DEFAULT_TARGET_FPS;
use corelib::{FrameErrorAction, TimeStep};
use renderer::{FrameOutcome, FrameRenderer, RendererConfig};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

/// Window and renderer configuration assembled by the binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Overrides the monitor refresh rate for the fixed time step.
    pub target_fps: Option<u32>,
    /// Use measured wall-clock deltas instead of a fixed step.
    pub measured_time: bool,
    pub renderer: RendererConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "spinmesh".to_string(),
            width: 1280,
            height: 720,
            target_fps: None,
            measured_time: false,
            renderer: RendererConfig::default(),
        }
    }
}

/// Picks the time step: measured, or fixed at the requested rate, else the
/// monitor's refresh rate, else 60 Hz.
pub fn resolve_time_step(
    measured: bool,
    target_fps: Option<u32>,
    monitor_millihertz: Option<u32>,
) -> TimeStep {
    if measured {
        return TimeStep::Measured;
    }
    let fps = target_fps
        .or_else(|| monitor_millihertz.map(|mhz| (mhz + 500) / 1000))
        .filter(|&fps| fps > 0)
        .unwrap_or(DEFAULT_TARGET_FPS);
    TimeStep::Fixed { fps }
}

/// Run the window until it is closed or a fatal error occurs.
pub fn run(config: AppConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    let mut app = App::new(config);

    event_loop
        .run_app(&mut app)
        .context("winit event loop terminated with error")?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct App {
    config: AppConfig,
    window: Option<Arc<Window>>,
    renderer: Option<FrameRenderer>,
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(config: AppConfig) -> Self {
        Self {
            config,
            window: None,
            renderer: None,
            fatal: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.width.max(1),
                self.config.height.max(1),
            ));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );
        log::info!(
            "Window created: {}x{}",
            window.inner_size().width,
            window.inner_size().height
        );

        let monitor_mhz = window
            .current_monitor()
            .and_then(|m| m.refresh_rate_millihertz());
        let mut renderer_config = self.config.renderer.clone();
        renderer_config.time_step = resolve_time_step(
            self.config.measured_time,
            self.config.target_fps,
            monitor_mhz,
        );

        let renderer = pollster::block_on(FrameRenderer::new(window.clone(), &renderer_config))?;
        window.request_redraw();

        self.window = Some(window);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.teardown();
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.fatal = Some(err);
        self.shutdown();
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e.context("renderer setup failed"));
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                renderer.teardown();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                log::info!("Resized: {}x{}", new_size.width, new_size.height);
                renderer.on_viewport_resized(new_size.width, new_size.height);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                // A Resized event with the new physical size follows.
                log::info!("Scale factor changed: {:.3}", scale_factor);
            }
            WindowEvent::RedrawRequested => match renderer.on_frame_tick() {
                Ok(FrameOutcome::Presented { .. }) | Ok(FrameOutcome::Skipped) => {}
                Err(err) => {
                    if renderer.handle_frame_error(&err) == FrameErrorAction::Fatal {
                        let err = anyhow::Error::new(err).context("rendering failed");
                        self.fail(event_loop, err);
                    }
                }
            },
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);
        // Continuous redraw; presentation (vsync) paces the loop.
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_fps_wins_over_monitor() {
        assert_eq!(
            resolve_time_step(false, Some(30), Some(144_000)),
            TimeStep::Fixed { fps: 30 }
        );
    }

    #[test]
    fn monitor_rate_is_rounded_to_hz() {
        assert_eq!(
            resolve_time_step(false, None, Some(59_940)),
            TimeStep::Fixed { fps: 60 }
        );
    }

    #[test]
    fn falls_back_to_sixty() {
        assert_eq!(
            resolve_time_step(false, None, None),
            TimeStep::Fixed { fps: 60 }
        );
        assert_eq!(
            resolve_time_step(false, Some(0), None),
            TimeStep::Fixed { fps: 60 }
        );
    }

    #[test]
    fn measured_ignores_rates() {
        assert_eq!(
            resolve_time_step(true, Some(30), Some(60_000)),
            TimeStep::Measured
        );
    }
}
