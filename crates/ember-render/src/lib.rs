// SPDX-License-Identifier: CEPL-1.0
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

/// Surface extent in physical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderSize {
    pub width: u32,
    pub height: u32,
}

impl RenderSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero (minimized window).
    pub const fn is_zero(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }
}

/// How well the current presentable chain still matches the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceStatus {
    Optimal,
    /// Still presentable, but the chain should be rebuilt soon.
    Suboptimal,
    /// The chain can no longer be used; rebuild before the next frame.
    OutOfDate,
}

impl SurfaceStatus {
    pub fn needs_recreation(self) -> bool {
        !matches!(self, SurfaceStatus::Optimal)
    }
}

/// The window side of presentation: size, close and resize notifications.
pub trait SurfaceProvider {
    fn extent(&self) -> RenderSize;
    fn should_close(&self) -> bool;
    /// One-shot flag raised by the platform on resize; cleared only by
    /// [`SurfaceProvider::reset_resized_flag`].
    fn was_resized(&self) -> bool;
    fn reset_resized_flag(&mut self);
    /// Processes pending platform events without blocking.
    fn poll_events(&mut self);
    /// Blocks until at least one platform event arrived, then processes it.
    fn wait_events(&mut self);
}

/// A [`SurfaceProvider`] that can also hand out native handles for
/// presentable-surface creation.
pub trait WindowSurface: SurfaceProvider + HasWindowHandle + HasDisplayHandle {}

impl<T> WindowSurface for T where T: SurfaceProvider + HasWindowHandle + HasDisplayHandle {}
