//! The device-side surface the frame core is written against.
//!
//! [`crate::VulkanContext`] implements [`GpuDevice`] on top of `ash`; tests use
//! a mock that fabricates handles and models fence state. Every handle passed
//! in must have been created by the same implementation.

use std::time::Duration;

use anyhow::Result;
use ash::vk;
use ember_render::{RenderSize, SurfaceStatus};

use crate::pipeline::PipelineConfig;

/// Images handed back by the presentation engine for a new chain.
#[derive(Clone, Debug)]
pub struct SwapchainImages {
    pub swapchain: vk::SwapchainKHR,
    pub images: Vec<vk::Image>,
    pub format: vk::Format,
    pub extent: vk::Extent2D,
    pub present_mode: vk::PresentModeKHR,
}

/// Result of asking the presentation engine for the next image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageAcquire {
    Ready { image_index: u32, suboptimal: bool },
    /// The chain no longer matches the surface; nothing was acquired.
    OutOfDate,
}

/// Everything needed to link one graphics pipeline.
pub struct GraphicsPipelineDesc<'a> {
    pub vertex_module: vk::ShaderModule,
    pub fragment_module: vk::ShaderModule,
    pub bindings: &'a [vk::VertexInputBindingDescription],
    pub attributes: &'a [vk::VertexInputAttributeDescription],
    pub config: &'a PipelineConfig,
    pub render_pass: vk::RenderPass,
    pub layout: vk::PipelineLayout,
}

pub trait GpuDevice {
    /// Blocks until every queue of the device is idle.
    fn wait_idle(&self) -> Result<()>;

    // --- synchronization -------------------------------------------------
    fn create_semaphore(&self) -> Result<vk::Semaphore>;
    fn destroy_semaphore(&self, semaphore: vk::Semaphore);
    fn create_fence(&self, signaled: bool) -> Result<vk::Fence>;
    fn destroy_fence(&self, fence: vk::Fence);
    /// Errors with [`crate::RenderError::FenceTimeout`] when `timeout` expires.
    fn wait_for_fence(&self, fence: vk::Fence, timeout: Duration) -> Result<()>;
    fn reset_fence(&self, fence: vk::Fence) -> Result<()>;

    // --- presentation engine ---------------------------------------------
    fn create_swapchain(&self, extent: RenderSize, old: vk::SwapchainKHR) -> Result<SwapchainImages>;
    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR);
    fn acquire_next_image(
        &self,
        swapchain: vk::SwapchainKHR,
        signal: vk::Semaphore,
        timeout: Duration,
    ) -> Result<ImageAcquire>;
    /// Submits one command buffer to the graphics queue. `wait` is waited at
    /// the color-attachment-output stage.
    fn submit(
        &self,
        cmd: vk::CommandBuffer,
        wait: vk::Semaphore,
        signal: vk::Semaphore,
        fence: vk::Fence,
    ) -> Result<()>;
    fn present(
        &self,
        swapchain: vk::SwapchainKHR,
        image_index: u32,
        wait: vk::Semaphore,
    ) -> Result<SurfaceStatus>;

    // --- attachments -----------------------------------------------------
    fn depth_format(&self) -> Result<vk::Format>;
    fn create_image_view(
        &self,
        image: vk::Image,
        format: vk::Format,
        aspect: vk::ImageAspectFlags,
    ) -> Result<vk::ImageView>;
    fn destroy_image_view(&self, view: vk::ImageView);
    fn create_attachment_image(
        &self,
        extent: vk::Extent2D,
        format: vk::Format,
        usage: vk::ImageUsageFlags,
    ) -> Result<(vk::Image, vk::DeviceMemory)>;
    fn destroy_image(&self, image: vk::Image, memory: vk::DeviceMemory);
    fn create_render_pass(&self, color: vk::Format, depth: vk::Format) -> Result<vk::RenderPass>;
    fn destroy_render_pass(&self, render_pass: vk::RenderPass);
    fn create_framebuffer(
        &self,
        render_pass: vk::RenderPass,
        attachments: &[vk::ImageView],
        extent: vk::Extent2D,
    ) -> Result<vk::Framebuffer>;
    fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer);

    // --- command buffers -------------------------------------------------
    fn allocate_command_buffers(&self, count: usize) -> Result<Vec<vk::CommandBuffer>>;
    fn free_command_buffers(&self, buffers: &[vk::CommandBuffer]);
    /// Implicitly resets the buffer.
    fn begin_command_buffer(&self, cmd: vk::CommandBuffer) -> Result<()>;
    fn end_command_buffer(&self, cmd: vk::CommandBuffer) -> Result<()>;
    fn cmd_begin_render_pass(
        &self,
        cmd: vk::CommandBuffer,
        render_pass: vk::RenderPass,
        framebuffer: vk::Framebuffer,
        extent: vk::Extent2D,
        clear: &[vk::ClearValue],
    );
    fn cmd_end_render_pass(&self, cmd: vk::CommandBuffer);
    fn cmd_set_viewport_scissor(&self, cmd: vk::CommandBuffer, extent: vk::Extent2D);

    // --- pipelines -------------------------------------------------------
    fn create_shader_module(&self, code: &[u32]) -> Result<vk::ShaderModule>;
    fn destroy_shader_module(&self, module: vk::ShaderModule);
    fn create_pipeline_layout(
        &self,
        set_layouts: &[vk::DescriptorSetLayout],
        push_constants: &[vk::PushConstantRange],
    ) -> Result<vk::PipelineLayout>;
    fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout);
    fn create_graphics_pipeline(&self, desc: &GraphicsPipelineDesc<'_>) -> Result<vk::Pipeline>;
    fn destroy_pipeline(&self, pipeline: vk::Pipeline);
    fn cmd_bind_pipeline(&self, cmd: vk::CommandBuffer, pipeline: vk::Pipeline);
    fn cmd_push_constants(
        &self,
        cmd: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        stages: vk::ShaderStageFlags,
        offset: u32,
        data: &[u8],
    );

    // --- buffers ---------------------------------------------------------
    fn create_buffer(
        &self,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        properties: vk::MemoryPropertyFlags,
    ) -> Result<(vk::Buffer, vk::DeviceMemory)>;
    /// Maps host-visible `memory`, copies `data` to offset 0, unmaps.
    fn write_memory(&self, memory: vk::DeviceMemory, data: &[u8]) -> Result<()>;
    fn destroy_buffer(&self, buffer: vk::Buffer, memory: vk::DeviceMemory);
    fn cmd_bind_vertex_buffer(&self, cmd: vk::CommandBuffer, buffer: vk::Buffer);
    fn cmd_bind_index_buffer(&self, cmd: vk::CommandBuffer, buffer: vk::Buffer);
    fn cmd_draw(&self, cmd: vk::CommandBuffer, vertex_count: u32);
    fn cmd_draw_indexed(&self, cmd: vk::CommandBuffer, index_count: u32);
}

/// `RenderSize` and `vk::Extent2D` live in different crates; this is the one
/// conversion point.
#[inline]
pub fn extent2d(size: RenderSize) -> vk::Extent2D {
    vk::Extent2D {
        width: size.width,
        height: size.height,
    }
}
