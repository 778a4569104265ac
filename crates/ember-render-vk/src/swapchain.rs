//! The chain of presentable images and everything sized to it.

use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use ash::vk;
use ember_render::{RenderSize, SurfaceStatus};
use tracing::{debug, info};

use crate::error::RenderError;
use crate::gpu::{GpuDevice, ImageAcquire};
use crate::sync::{FrameCounter, FrameSync, MAX_FRAMES_IN_FLIGHT};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapchainOptions {
    /// Requested frames in flight; clamped to `1..=image_count`.
    pub frames_in_flight: usize,
    /// Upper bound for every CPU wait on a fence or on image acquisition.
    pub fence_timeout: Duration,
}

impl Default for SwapchainOptions {
    fn default() -> Self {
        Self {
            frames_in_flight: MAX_FRAMES_IN_FLIGHT,
            fence_timeout: Duration::from_secs(1),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct DepthTarget {
    image: vk::Image,
    memory: vk::DeviceMemory,
    view: vk::ImageView,
}

/// Presentable images with their views, depth targets, render pass,
/// framebuffers and frame-in-flight synchronization.
///
/// Dropping a chain destroys all of it immediately; the caller drains the
/// device first.
pub struct Swapchain<D: GpuDevice> {
    device: Rc<D>,
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    views: Vec<vk::ImageView>,
    depth: Vec<DepthTarget>,
    render_pass: vk::RenderPass,
    framebuffers: Vec<vk::Framebuffer>,
    sync: Vec<FrameSync>,
    /// Image index -> fence of the frame slot that last rendered to it.
    images_in_flight: Vec<vk::Fence>,
    frame: FrameCounter,
    /// Slot consumed by the acquisition that has not been submitted yet.
    pending_slot: Option<usize>,
    image_format: vk::Format,
    depth_format: vk::Format,
    extent: vk::Extent2D,
    present_mode: vk::PresentModeKHR,
    generation: u64,
    fence_timeout: Duration,
}

impl<D: GpuDevice> Swapchain<D> {
    /// Builds a chain for `extent`. When `previous` is given its handle is
    /// passed on to the presentation engine; `previous` stays valid and is
    /// dropped by the caller once this returns.
    pub fn new(
        device: Rc<D>,
        extent: RenderSize,
        previous: Option<&Swapchain<D>>,
        options: SwapchainOptions,
    ) -> Result<Self> {
        let old = previous.map_or(vk::SwapchainKHR::null(), |p| p.swapchain);
        let generation = previous.map_or(0, |p| p.generation + 1);

        let created = device
            .create_swapchain(extent, old)
            .context("create_swapchain")?;
        let depth_format = match device.depth_format() {
            Ok(f) => f,
            Err(e) => {
                device.destroy_swapchain(created.swapchain);
                return Err(e.context("depth_format"));
            }
        };

        let image_count = created.images.len();
        let frames = options.frames_in_flight.clamp(1, image_count.max(1));

        // From here on Drop cleans up whatever has been created so far.
        let mut chain = Self {
            device,
            swapchain: created.swapchain,
            images: created.images,
            views: Vec::with_capacity(image_count),
            depth: Vec::with_capacity(image_count),
            render_pass: vk::RenderPass::null(),
            framebuffers: Vec::with_capacity(image_count),
            sync: Vec::with_capacity(frames),
            images_in_flight: vec![vk::Fence::null(); image_count],
            frame: FrameCounter::new(frames),
            pending_slot: None,
            image_format: created.format,
            depth_format,
            extent: created.extent,
            present_mode: created.present_mode,
            generation,
            fence_timeout: options.fence_timeout,
        };
        chain.create_image_views()?;
        chain.create_depth_targets()?;
        chain.create_render_pass()?;
        chain.create_framebuffers()?;
        chain.create_sync_objects()?;

        info!(
            "swapchain #{}: {}x{}, {:?}, depth {:?}, {:?}, {} images, {} frames in flight",
            chain.generation,
            chain.extent.width,
            chain.extent.height,
            chain.image_format,
            chain.depth_format,
            chain.present_mode,
            image_count,
            frames
        );
        Ok(chain)
    }

    fn create_image_views(&mut self) -> Result<()> {
        for &image in &self.images {
            let view = self
                .device
                .create_image_view(image, self.image_format, vk::ImageAspectFlags::COLOR)
                .context("create_image_view(color)")?;
            self.views.push(view);
        }
        Ok(())
    }

    fn create_depth_targets(&mut self) -> Result<()> {
        for _ in 0..self.images.len() {
            let (image, memory) = self
                .device
                .create_attachment_image(
                    self.extent,
                    self.depth_format,
                    vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
                )
                .context("create_image(depth)")?;
            let view = match self.device.create_image_view(
                image,
                self.depth_format,
                vk::ImageAspectFlags::DEPTH,
            ) {
                Ok(v) => v,
                Err(e) => {
                    self.device.destroy_image(image, memory);
                    return Err(e.context("create_image_view(depth)"));
                }
            };
            self.depth.push(DepthTarget {
                image,
                memory,
                view,
            });
        }
        Ok(())
    }

    fn create_render_pass(&mut self) -> Result<()> {
        self.render_pass = self
            .device
            .create_render_pass(self.image_format, self.depth_format)
            .context("create_render_pass")?;
        Ok(())
    }

    fn create_framebuffers(&mut self) -> Result<()> {
        for (view, depth) in self.views.iter().zip(&self.depth) {
            let fb = self
                .device
                .create_framebuffer(self.render_pass, &[*view, depth.view], self.extent)
                .context("create_framebuffer")?;
            self.framebuffers.push(fb);
        }
        Ok(())
    }

    fn create_sync_objects(&mut self) -> Result<()> {
        for _ in 0..self.frame.count() {
            let sync = FrameSync::create(&*self.device)?;
            self.sync.push(sync);
        }
        Ok(())
    }

    /// Waits for the current slot to retire, then asks for the next image.
    ///
    /// On `Ready` the slot is consumed and the frame index advances; the image's
    /// own previous fence has also been waited, so its command buffer may be
    /// re-recorded. On `OutOfDate` nothing changes.
    pub fn acquire_next_image(&mut self) -> Result<ImageAcquire> {
        let slot = self.frame.current();
        let sync = self.sync[slot];

        self.device
            .wait_for_fence(sync.in_flight, self.fence_timeout)
            .context("wait_for_fences(in_flight)")?;

        let acquired = self
            .device
            .acquire_next_image(self.swapchain, sync.image_available, self.fence_timeout)
            .context("acquire_next_image")?;

        if let ImageAcquire::Ready { image_index, suboptimal } = acquired {
            self.check_image_index(image_index)?;
            self.wait_image_in_flight(image_index)?;
            self.pending_slot = Some(self.frame.advance());
            if suboptimal {
                debug!(image_index, "acquired image from a suboptimal swapchain");
            }
        }
        Ok(acquired)
    }

    /// Submits `cmd` for `image_index` and presents it.
    ///
    /// Requires a preceding successful [`Swapchain::acquire_next_image`].
    pub fn submit(&mut self, cmd: vk::CommandBuffer, image_index: u32) -> Result<SurfaceStatus> {
        self.check_image_index(image_index)?;
        let slot = self
            .pending_slot
            .take()
            .ok_or_else(|| RenderError::NoFrameInProgress("submit").report())?;
        let sync = self.sync[slot];

        self.wait_image_in_flight(image_index)?;
        self.images_in_flight[image_index as usize] = sync.in_flight;

        self.device
            .reset_fence(sync.in_flight)
            .context("reset_fences(in_flight)")?;
        self.device
            .submit(cmd, sync.image_available, sync.render_finished, sync.in_flight)
            .context("queue_submit")?;

        self.device
            .present(self.swapchain, image_index, sync.render_finished)
            .context("queue_present")
    }

    fn wait_image_in_flight(&self, image_index: u32) -> Result<()> {
        let fence = self.images_in_flight[image_index as usize];
        if fence != vk::Fence::null() {
            self.device
                .wait_for_fence(fence, self.fence_timeout)
                .context("wait_for_fences(image_in_flight)")?;
        }
        Ok(())
    }

    fn check_image_index(&self, image_index: u32) -> Result<()> {
        if image_index as usize >= self.images.len() {
            return Err(RenderError::ImageIndexOutOfRange {
                index: image_index,
                count: self.images.len(),
            }
            .report());
        }
        Ok(())
    }

    #[inline]
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    #[inline]
    pub fn render_pass(&self) -> vk::RenderPass {
        self.render_pass
    }

    pub fn framebuffer(&self, index: usize) -> Option<vk::Framebuffer> {
        self.framebuffers.get(index).copied()
    }

    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    pub fn size(&self) -> RenderSize {
        RenderSize::new(self.extent.width, self.extent.height)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.size().aspect_ratio()
    }

    #[inline]
    pub fn image_format(&self) -> vk::Format {
        self.image_format
    }

    #[inline]
    pub fn depth_format(&self) -> vk::Format {
        self.depth_format
    }

    #[inline]
    pub fn present_mode(&self) -> vk::PresentModeKHR {
        self.present_mode
    }

    /// Frame-in-flight slot the next acquisition will use.
    #[inline]
    pub fn current_frame(&self) -> usize {
        self.frame.current()
    }

    #[inline]
    pub fn frames_in_flight(&self) -> usize {
        self.frame.count()
    }

    /// Number of chains built before this one in the same lineage.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True when both chains render to the same color and depth formats, so
    /// render passes built for one are compatible with the other.
    pub fn compare_formats(&self, other: &Swapchain<D>) -> bool {
        self.image_format == other.image_format && self.depth_format == other.depth_format
    }
}

// STRICT TEARDOWN ORDER:
// - Frame sync objects (no submission may reference them any more)
// - Framebuffers BEFORE the render pass and the views they bind
// - Render pass
// - Depth views BEFORE depth images and their memory
// - Color views BEFORE the swapchain that owns the images
// - Swapchain last
impl<D: GpuDevice> Drop for Swapchain<D> {
    fn drop(&mut self) {
        let d = &*self.device;

        for sync in self.sync.drain(..) {
            sync.destroy(d);
        }
        for fb in self.framebuffers.drain(..) {
            d.destroy_framebuffer(fb);
        }
        if self.render_pass != vk::RenderPass::null() {
            d.destroy_render_pass(self.render_pass);
        }
        for t in self.depth.drain(..) {
            d.destroy_image_view(t.view);
            d.destroy_image(t.image, t.memory);
        }
        for view in self.views.drain(..) {
            d.destroy_image_view(view);
        }
        d.destroy_swapchain(self.swapchain);
    }
}
