//! Per-frame state machine on top of [`Swapchain`].
//!
//! ```text
//! Idle --begin_frame--> FrameInProgress --begin_pass--> InPass
//!   ^                        |   ^                        |
//!   +-------end_frame--------+   +--------end_pass--------+
//! ```
//!
//! Stale-surface signals never escape as errors: the chain is rebuilt and the
//! caller simply sees a skipped frame.

use std::mem;
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use ash::vk;
use ember_render::{RenderSize, SurfaceProvider};
use tracing::{debug, info, warn};

use crate::error::RenderError;
use crate::gpu::{GpuDevice, ImageAcquire};
use crate::swapchain::{Swapchain, SwapchainOptions};

pub const DEFAULT_CLEAR_COLOR: [f32; 4] = [0.01, 0.01, 0.01, 1.0];

pub struct FrameOrchestrator<D: GpuDevice> {
    device: Rc<D>,
    swapchain: Swapchain<D>,
    /// One per swapchain image, indexed by image index.
    command_buffers: Vec<vk::CommandBuffer>,
    options: SwapchainOptions,
    clear: [vk::ClearValue; 2],
    current_image: u32,
    frame_started: bool,
    pass_open: bool,
    /// Set by a suboptimal acquire; the chain is rebuilt after the present.
    recreate_pending: bool,
}

impl<D: GpuDevice> FrameOrchestrator<D> {
    /// Builds the first chain. Blocks while the surface has a zero extent.
    pub fn new<S>(device: Rc<D>, surface: &mut S, options: SwapchainOptions) -> Result<Self>
    where
        S: SurfaceProvider + ?Sized,
    {
        let extent = wait_for_extent(surface);
        if extent.is_zero() {
            return Err(anyhow!("surface closed before it had a usable size"));
        }
        let swapchain = Swapchain::new(device.clone(), extent, None, options)?;
        let command_buffers = device
            .allocate_command_buffers(swapchain.image_count())
            .context("allocate_command_buffers")?;

        let mut orchestrator = Self {
            device,
            swapchain,
            command_buffers,
            options,
            clear: [vk::ClearValue::default(); 2],
            current_image: 0,
            frame_started: false,
            pass_open: false,
            recreate_pending: false,
        };
        orchestrator.set_clear_color(DEFAULT_CLEAR_COLOR);
        Ok(orchestrator)
    }

    pub fn set_clear_color(&mut self, rgba: [f32; 4]) {
        self.clear = [
            vk::ClearValue {
                color: vk::ClearColorValue { float32: rgba },
            },
            vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue {
                    depth: 1.0,
                    stencil: 0,
                },
            },
        ];
    }

    /// Acquires the next image and begins recording its command buffer.
    ///
    /// `Ok(None)` means the chain was stale and has been rebuilt; skip this
    /// iteration and try again.
    pub fn begin_frame<S>(&mut self, surface: &mut S) -> Result<Option<vk::CommandBuffer>>
    where
        S: SurfaceProvider + ?Sized,
    {
        if self.frame_started {
            return Err(RenderError::FrameAlreadyInProgress.report());
        }
        if self.command_buffers.len() != self.swapchain.image_count() {
            // A previous rebuild could not reallocate; retry before acquiring.
            self.device.wait_idle().context("device_wait_idle")?;
            self.realloc_command_buffers()?;
        }

        let image_index = match self.swapchain.acquire_next_image()? {
            ImageAcquire::OutOfDate => {
                debug!("acquire reported out-of-date swapchain");
                self.recreate(surface)?;
                return Ok(None);
            }
            ImageAcquire::Ready {
                image_index,
                suboptimal,
            } => {
                self.recreate_pending |= suboptimal;
                image_index
            }
        };

        let cmd = self.command_buffer(image_index)?;
        self.device
            .begin_command_buffer(cmd)
            .context("begin_command_buffer")?;
        self.current_image = image_index;
        self.frame_started = true;
        Ok(Some(cmd))
    }

    /// Finishes recording, submits and presents. Rebuilds the chain when the
    /// presentation engine or the surface asks for it.
    pub fn end_frame<S>(&mut self, surface: &mut S) -> Result<()>
    where
        S: SurfaceProvider + ?Sized,
    {
        if !self.frame_started {
            return Err(RenderError::NoFrameInProgress("end_frame").report());
        }
        if self.pass_open {
            return Err(RenderError::PassStillOpen.report());
        }

        let cmd = self.command_buffer(self.current_image)?;
        self.device
            .end_command_buffer(cmd)
            .context("end_command_buffer")?;

        let submitted = self.swapchain.submit(cmd, self.current_image);
        self.frame_started = false;
        let status = submitted?;

        let resized = surface.was_resized();
        if status.needs_recreation() || resized || self.recreate_pending {
            debug!(
                ?status,
                resized,
                acquire_suboptimal = self.recreate_pending,
                "swapchain needs rebuilding"
            );
            surface.reset_resized_flag();
            self.recreate(surface)?;
        }
        Ok(())
    }

    /// Begins the swapchain render pass on `cmd` and sets viewport and
    /// scissor to the full extent.
    pub fn begin_pass(&mut self, cmd: vk::CommandBuffer) -> Result<()> {
        self.check_owner("begin_pass", cmd)?;
        if self.pass_open {
            return Err(RenderError::PassAlreadyOpen.report());
        }

        let index = self.current_image as usize;
        let framebuffer = self
            .swapchain
            .framebuffer(index)
            .ok_or_else(|| {
                RenderError::ImageIndexOutOfRange {
                    index: self.current_image,
                    count: self.swapchain.image_count(),
                }
                .report()
            })?;
        let extent = self.swapchain.extent();
        self.device.cmd_begin_render_pass(
            cmd,
            self.swapchain.render_pass(),
            framebuffer,
            extent,
            &self.clear,
        );
        self.device.cmd_set_viewport_scissor(cmd, extent);
        self.pass_open = true;
        Ok(())
    }

    pub fn end_pass(&mut self, cmd: vk::CommandBuffer) -> Result<()> {
        self.check_owner("end_pass", cmd)?;
        if !self.pass_open {
            return Err(RenderError::NoPassOpen.report());
        }
        self.device.cmd_end_render_pass(cmd);
        self.pass_open = false;
        Ok(())
    }

    fn check_owner(&self, call: &'static str, cmd: vk::CommandBuffer) -> Result<()> {
        if !self.frame_started {
            return Err(RenderError::NoFrameInProgress(call).report());
        }
        let expected = self.command_buffer(self.current_image)?;
        if cmd != expected {
            return Err(RenderError::ForeignCommandBuffer {
                expected,
                found: cmd,
            }
            .report());
        }
        Ok(())
    }

    /// Replaces the swapchain with one sized to the surface's current extent.
    ///
    /// Blocks on platform events while the extent is zero. Returns without
    /// rebuilding if the surface is closed during that wait.
    pub fn recreate<S>(&mut self, surface: &mut S) -> Result<()>
    where
        S: SurfaceProvider + ?Sized,
    {
        if self.frame_started {
            return Err(RenderError::FrameAlreadyInProgress.report());
        }

        let extent = wait_for_extent(surface);
        if extent.is_zero() {
            debug!("surface closed while minimized, keeping the old swapchain");
            return Ok(());
        }

        // STRICT ORDER:
        // 1) Drain the GPU: nothing may still reference the old chain
        // 2) Build the new chain from the old handle
        // 3) Drop the old chain
        // 4) Command buffers follow the image count
        self.device.wait_idle().context("device_wait_idle")?;

        let next = Swapchain::new(self.device.clone(), extent, Some(&self.swapchain), self.options)?;
        if !next.compare_formats(&self.swapchain) {
            warn!(
                "swapchain formats changed across recreation: color {:?} -> {:?}, depth {:?} -> {:?}",
                self.swapchain.image_format(),
                next.image_format(),
                self.swapchain.depth_format(),
                next.depth_format()
            );
        }
        drop(mem::replace(&mut self.swapchain, next));
        self.recreate_pending = false;

        if self.command_buffers.len() != self.swapchain.image_count() {
            self.realloc_command_buffers()?;
        }

        info!(
            "swapchain recreated at {}x{} (generation {})",
            extent.width,
            extent.height,
            self.swapchain.generation()
        );
        Ok(())
    }

    /// Swaps in one command buffer per swapchain image. The old set is kept
    /// if allocation fails. The device must be idle.
    fn realloc_command_buffers(&mut self) -> Result<()> {
        let fresh = self
            .device
            .allocate_command_buffers(self.swapchain.image_count())
            .context("allocate_command_buffers")?;
        let old = mem::replace(&mut self.command_buffers, fresh);
        self.device.free_command_buffers(&old);
        Ok(())
    }

    fn command_buffer(&self, image_index: u32) -> Result<vk::CommandBuffer> {
        self.command_buffers
            .get(image_index as usize)
            .copied()
            .ok_or_else(|| {
                RenderError::ImageIndexOutOfRange {
                    index: image_index,
                    count: self.command_buffers.len(),
                }
                .report()
            })
    }

    #[inline]
    pub fn is_frame_in_progress(&self) -> bool {
        self.frame_started
    }

    #[inline]
    pub fn is_pass_open(&self) -> bool {
        self.pass_open
    }

    pub fn current_command_buffer(&self) -> Result<vk::CommandBuffer> {
        if !self.frame_started {
            return Err(RenderError::NoFrameInProgress("current_command_buffer").report());
        }
        self.command_buffer(self.current_image)
    }

    pub fn current_image_index(&self) -> Result<u32> {
        if !self.frame_started {
            return Err(RenderError::NoFrameInProgress("current_image_index").report());
        }
        Ok(self.current_image)
    }

    /// Frame-in-flight slot the next frame will use.
    #[inline]
    pub fn frame_index(&self) -> usize {
        self.swapchain.current_frame()
    }

    #[inline]
    pub fn render_pass(&self) -> vk::RenderPass {
        self.swapchain.render_pass()
    }

    #[inline]
    pub fn swapchain_generation(&self) -> u64 {
        self.swapchain.generation()
    }

    #[inline]
    pub fn swapchain(&self) -> &Swapchain<D> {
        &self.swapchain
    }

    pub fn extent(&self) -> RenderSize {
        self.swapchain.size()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.swapchain.aspect_ratio()
    }

    pub fn wait_idle(&self) -> Result<()> {
        self.device.wait_idle().context("device_wait_idle")
    }
}

impl<D: GpuDevice> Drop for FrameOrchestrator<D> {
    fn drop(&mut self) {
        // The swapchain field drops after this; drain first.
        if let Err(e) = self.device.wait_idle() {
            warn!("device_wait_idle failed during teardown: {e:#}");
        }
        if !self.command_buffers.is_empty() {
            self.device.free_command_buffers(&self.command_buffers);
            self.command_buffers.clear();
        }
    }
}

/// Waits until the surface has a non-zero extent or is closed.
fn wait_for_extent<S: SurfaceProvider + ?Sized>(surface: &mut S) -> RenderSize {
    let mut extent = surface.extent();
    if extent.is_zero() {
        debug!("surface extent is zero, waiting for events");
    }
    while extent.is_zero() && !surface.should_close() {
        surface.wait_events();
        extent = surface.extent();
    }
    extent
}
