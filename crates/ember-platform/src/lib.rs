// SPDX-License-Identifier: CEPL-1.0
//! Native window for the render loop.
//!
//! The loop is driven from the caller's side (`poll_events` / `wait_events`)
//! instead of handing control to `EventLoop::run_app`, so the renderer can
//! block on platform events while the window is minimized.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use ember_render::{RenderSize, SurfaceProvider};
use raw_window_handle::{
    DisplayHandle, HandleError, HasDisplayHandle, HasWindowHandle, WindowHandle,
};
use tracing::{debug, info};

pub use winit;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window, WindowId},
};

#[derive(Clone, Debug)]
pub struct WindowDesc {
    pub title: String,
    pub size: RenderSize,
    pub resizable: bool,
}

impl Default for WindowDesc {
    fn default() -> Self {
        Self {
            title: "ember".to_owned(),
            size: RenderSize::new(800, 600),
            resizable: true,
        }
    }
}

/// Everything the winit callbacks mutate. Lives next to the event loop inside
/// [`PlatformWindow`], so callbacks never outlive the window they report on.
struct WindowState {
    desc: WindowDesc,
    window: Option<Window>,
    extent: RenderSize,
    resized: bool,
    close_requested: bool,
    create_error: Option<String>,
}

impl WindowState {
    fn new(desc: WindowDesc) -> Self {
        Self {
            extent: desc.size,
            desc,
            window: None,
            resized: false,
            close_requested: false,
            create_error: None,
        }
    }

    fn apply_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("CloseRequested");
                self.close_requested = true;
            }
            WindowEvent::Resized(size) => {
                let next = RenderSize::new(size.width, size.height);
                if next != self.extent {
                    debug!("Resized → {}x{}", next.width, next.height);
                    self.extent = next;
                    self.resized = true;
                }
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for WindowState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title(self.desc.title.clone())
            .with_inner_size(PhysicalSize::new(self.desc.size.width, self.desc.size.height))
            .with_resizable(self.desc.resizable);
        match event_loop.create_window(attrs) {
            Ok(window) => {
                let size = window.inner_size();
                self.extent = RenderSize::new(size.width, size.height);
                info!("window ready ({}x{})", size.width, size.height);
                self.window = Some(window);
            }
            Err(e) => self.create_error = Some(e.to_string()),
        }
        event_loop.set_control_flow(ControlFlow::Wait);
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if let Some(window) = &self.window {
            if window_id != window.id() {
                return;
            }
        }
        self.apply_event(&event);
    }
}

pub struct PlatformWindow {
    // Field order is drop order: the native window goes before its event loop.
    state: WindowState,
    event_loop: EventLoop<()>,
}

impl PlatformWindow {
    pub fn new(desc: WindowDesc) -> Result<Self> {
        let event_loop = EventLoop::new().context("EventLoop::new")?;
        let mut this = Self {
            state: WindowState::new(desc),
            event_loop,
        };

        // The window is created from the first `resumed` callback.
        while this.state.window.is_none() {
            if let Some(e) = this.state.create_error.take() {
                return Err(anyhow!("create_window: {e}"));
            }
            if this.pump(Some(Duration::ZERO)) {
                return Err(anyhow!("event loop exited before the window was created"));
            }
        }
        Ok(this)
    }

    pub fn window(&self) -> Option<&Window> {
        self.state.window.as_ref()
    }

    pub fn request_close(&mut self) {
        self.state.close_requested = true;
    }

    /// Returns true when the event loop asked to exit.
    fn pump(&mut self, timeout: Option<Duration>) -> bool {
        match self.event_loop.pump_app_events(timeout, &mut self.state) {
            PumpStatus::Continue => false,
            PumpStatus::Exit(code) => {
                info!("event loop exit ({code})");
                self.state.close_requested = true;
                true
            }
        }
    }
}

impl SurfaceProvider for PlatformWindow {
    fn extent(&self) -> RenderSize {
        self.state.extent
    }

    fn should_close(&self) -> bool {
        self.state.close_requested
    }

    fn was_resized(&self) -> bool {
        self.state.resized
    }

    fn reset_resized_flag(&mut self) {
        self.state.resized = false;
    }

    fn poll_events(&mut self) {
        self.pump(Some(Duration::ZERO));
    }

    fn wait_events(&mut self) {
        self.pump(None);
    }
}

impl HasWindowHandle for PlatformWindow {
    fn window_handle(&self) -> Result<WindowHandle<'_>, HandleError> {
        match &self.state.window {
            Some(w) => w.window_handle(),
            None => Err(HandleError::Unavailable),
        }
    }
}

impl HasDisplayHandle for PlatformWindow {
    fn display_handle(&self) -> Result<DisplayHandle<'_>, HandleError> {
        self.event_loop.display_handle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> WindowState {
        WindowState::new(WindowDesc::default())
    }

    #[test]
    fn resize_raises_one_shot_flag() {
        let mut s = state();
        assert!(!s.resized);
        s.apply_event(&WindowEvent::Resized(PhysicalSize::new(400, 300)));
        assert!(s.resized);
        assert_eq!(s.extent, RenderSize::new(400, 300));
    }

    #[test]
    fn same_size_resize_is_ignored() {
        let mut s = state();
        s.apply_event(&WindowEvent::Resized(PhysicalSize::new(800, 600)));
        assert!(!s.resized);
    }

    #[test]
    fn minimize_reports_zero_extent() {
        let mut s = state();
        s.apply_event(&WindowEvent::Resized(PhysicalSize::new(0, 0)));
        assert!(s.extent.is_zero());
        assert!(s.resized);
    }

    #[test]
    fn close_request_is_sticky() {
        let mut s = state();
        s.apply_event(&WindowEvent::CloseRequested);
        s.apply_event(&WindowEvent::Resized(PhysicalSize::new(10, 10)));
        assert!(s.close_requested);
    }
}
