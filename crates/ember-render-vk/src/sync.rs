use anyhow::{Context, Result};
use ash::vk;

use crate::gpu::GpuDevice;

/// Frames the CPU may have queued ahead of the GPU unless configured otherwise.
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

/// Synchronization for one frame-in-flight slot.
#[derive(Clone, Copy, Debug)]
pub struct FrameSync {
    /// Signaled by the presentation engine once the acquired image is free.
    pub image_available: vk::Semaphore,
    /// Signaled by the graphics queue; presentation waits on it.
    pub render_finished: vk::Semaphore,
    /// Signaled when the slot's last submission retired. Starts signaled so
    /// the first wait on a fresh slot returns at once.
    pub in_flight: vk::Fence,
}

impl FrameSync {
    pub fn create<D: GpuDevice + ?Sized>(device: &D) -> Result<Self> {
        let image_available = device
            .create_semaphore()
            .context("create_semaphore(image_available)")?;
        let render_finished = device
            .create_semaphore()
            .context("create_semaphore(render_finished)")?;
        let in_flight = device
            .create_fence(true)
            .context("create_fence(in_flight)")?;
        Ok(Self {
            image_available,
            render_finished,
            in_flight,
        })
    }

    pub fn destroy<D: GpuDevice + ?Sized>(&self, device: &D) {
        device.destroy_fence(self.in_flight);
        device.destroy_semaphore(self.render_finished);
        device.destroy_semaphore(self.image_available);
    }
}

/// Round-robin cursor over frame-in-flight slots.
///
/// Advances once per acquired image and never looks at the image index: with
/// N images and F slots the two sequences are unrelated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameCounter {
    current: usize,
    count: usize,
}

impl FrameCounter {
    pub fn new(count: usize) -> Self {
        Self {
            current: 0,
            count: count.max(1),
        }
    }

    #[inline]
    pub fn current(&self) -> usize {
        self.current
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Moves to the next slot and returns the slot that was current.
    pub fn advance(&mut self) -> usize {
        let used = self.current;
        self.current = (self.current + 1) % self.count;
        used
    }
}
