//! In-memory [`GpuDevice`] and [`SurfaceProvider`] for tests.
//!
//! `MockGpu` fabricates handles, keeps a call log and models the GPU timeline
//! as lazily as possible: a submitted fence stays pending until someone waits
//! on it (or drains the device). Misuse that a real driver would punish is
//! collected in `violations()` instead of panicking, so tests can assert on it.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::mem::{discriminant, Discriminant};
use std::rc::Rc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use ash::vk::{self, Handle};
use ember_render::{RenderSize, SurfaceProvider, SurfaceStatus};

use crate::error::RenderError;
use crate::gpu::{extent2d, GpuDevice, GraphicsPipelineDesc, ImageAcquire, SwapchainImages};

/// Smallest byte string `read_spv` accepts: the magic word plus one word.
pub const FAKE_SPV: &[u8] = &[0x03, 0x02, 0x23, 0x07, 0x00, 0x00, 0x01, 0x00];

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    WaitIdle,
    CreateSemaphore,
    DestroySemaphore,
    CreateFence,
    DestroyFence,
    WaitFence(vk::Fence),
    ResetFence(vk::Fence),
    CreateSwapchain {
        extent: vk::Extent2D,
        old: vk::SwapchainKHR,
    },
    DestroySwapchain,
    Acquire,
    Submit {
        cmd: vk::CommandBuffer,
        fence: vk::Fence,
    },
    Present(u32),
    CreateImageView,
    DestroyImageView,
    CreateImage,
    DestroyImage,
    CreateRenderPass,
    DestroyRenderPass,
    CreateFramebuffer,
    DestroyFramebuffer,
    AllocateCommandBuffers(usize),
    FreeCommandBuffers(usize),
    BeginCommandBuffer(vk::CommandBuffer),
    EndCommandBuffer(vk::CommandBuffer),
    BeginRenderPass {
        extent: vk::Extent2D,
    },
    EndRenderPass,
    SetViewportScissor,
    CreateShaderModule,
    DestroyShaderModule,
    CreatePipelineLayout {
        push_constant_bytes: u32,
    },
    DestroyPipelineLayout,
    CreatePipeline(vk::RenderPass),
    DestroyPipeline,
    BindPipeline(vk::Pipeline),
    PushConstants(usize),
    CreateBuffer,
    WriteMemory(usize),
    DestroyBuffer,
    BindVertexBuffer,
    BindIndexBuffer,
    Draw(u32),
    DrawIndexed(u32),
    /// Logged by [`MockSurface`] when attached with `logging_to`.
    WaitEvents,
}

impl Call {
    pub fn is_creation(&self) -> bool {
        matches!(
            self,
            Call::CreateSemaphore
                | Call::CreateFence
                | Call::CreateSwapchain { .. }
                | Call::CreateImageView
                | Call::CreateImage
                | Call::CreateRenderPass
                | Call::CreateFramebuffer
                | Call::AllocateCommandBuffers(_)
                | Call::CreateShaderModule
                | Call::CreatePipelineLayout { .. }
                | Call::CreatePipeline(_)
                | Call::CreateBuffer
        )
    }

    pub fn is_sync(&self) -> bool {
        matches!(
            self,
            Call::WaitIdle
                | Call::CreateSemaphore
                | Call::DestroySemaphore
                | Call::CreateFence
                | Call::DestroyFence
                | Call::WaitFence(_)
                | Call::ResetFence(_)
                | Call::Acquire
                | Call::Submit { .. }
                | Call::Present(_)
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FenceState {
    Signaled,
    Unsignaled,
    /// Submitted; completes on the next wait or device drain.
    Pending,
}

struct State {
    next_handle: u64,
    calls: Vec<Call>,
    violations: Vec<String>,
    live: HashSet<u64>,
    fences: HashMap<u64, FenceState>,
    signaled_semaphores: HashSet<u64>,
    /// Command buffer -> fence of its last submission.
    cmd_fences: HashMap<u64, u64>,
    /// Image index -> fence of its last submission, for the current chain.
    image_fences: HashMap<u32, u64>,
    last_acquired: Option<u32>,
    last_submitted: Option<vk::Fence>,
    image_count: usize,
    chain_images: usize,
    next_image: u32,
    acquire_script: VecDeque<ImageAcquire>,
    present_script: VecDeque<SurfaceStatus>,
    present_results: Vec<SurfaceStatus>,
    fail_next: Option<Discriminant<Call>>,
    hung: bool,
}

pub struct MockGpu {
    state: RefCell<State>,
}

impl Default for MockGpu {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGpu {
    pub fn new() -> Self {
        Self::with_images(3)
    }

    /// Every swapchain created from now on has `count` images.
    pub fn with_images(count: usize) -> Self {
        Self {
            state: RefCell::new(State {
                next_handle: 0x1000,
                calls: Vec::new(),
                violations: Vec::new(),
                live: HashSet::new(),
                fences: HashMap::new(),
                signaled_semaphores: HashSet::new(),
                cmd_fences: HashMap::new(),
                image_fences: HashMap::new(),
                last_acquired: None,
                last_submitted: None,
                image_count: count,
                chain_images: 0,
                next_image: 0,
                acquire_script: VecDeque::new(),
                present_script: VecDeque::new(),
                present_results: Vec::new(),
                fail_next: None,
                hung: false,
            }),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn violations(&self) -> Vec<String> {
        self.state.borrow().violations.clone()
    }

    /// Handles created and not yet destroyed.
    pub fn live_objects(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn present_results(&self) -> Vec<SurfaceStatus> {
        self.state.borrow().present_results.clone()
    }

    pub fn last_submitted_fence(&self) -> Option<vk::Fence> {
        self.state.borrow().last_submitted
    }

    /// Queues the outcome of a future acquisition. Unscripted acquisitions
    /// hand out images round-robin.
    pub fn script_acquire(&self, outcome: ImageAcquire) {
        self.state.borrow_mut().acquire_script.push_back(outcome);
    }

    /// Queues the outcome of a future present. Unscripted presents are optimal.
    pub fn script_present(&self, status: SurfaceStatus) {
        self.state.borrow_mut().present_script.push_back(status);
    }

    pub fn set_image_count(&self, count: usize) {
        self.state.borrow_mut().image_count = count;
    }

    /// While hung, pending fences never complete and waits time out.
    pub fn set_hung(&self, hung: bool) {
        self.state.borrow_mut().hung = hung;
    }

    /// Makes the next call of the same kind as `call` fail.
    pub fn fail_next(&self, call: Call) {
        self.state.borrow_mut().fail_next = Some(discriminant(&call));
    }

    pub(crate) fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }

    /// Records `call` and applies any injected failure for its kind.
    fn op(&self, call: Call) -> Result<()> {
        let mut guard = self.state.borrow_mut();
        let s = &mut *guard;
        let kind = discriminant(&call);
        s.calls.push(call);
        if s.fail_next == Some(kind) {
            s.fail_next = None;
            return Err(anyhow!("injected failure"));
        }
        Ok(())
    }

    fn create<H: Handle>(&self) -> H {
        let mut s = self.state.borrow_mut();
        let raw = s.next_handle;
        s.next_handle += 1;
        s.live.insert(raw);
        H::from_raw(raw)
    }

    /// Fabricates a handle the mock does not own (swapchain images).
    fn borrowed<H: Handle>(&self) -> H {
        let mut s = self.state.borrow_mut();
        let raw = s.next_handle;
        s.next_handle += 1;
        H::from_raw(raw)
    }

    fn release<H: Handle>(&self, handle: H, what: &str) {
        let raw = handle.as_raw();
        if raw == 0 {
            return;
        }
        let mut guard = self.state.borrow_mut();
        let s = &mut *guard;
        if !s.live.remove(&raw) {
            s.violations
                .push(format!("destroyed {what} {raw:#x} that is not alive"));
        }
    }

    fn violation(&self, msg: String) {
        self.state.borrow_mut().violations.push(msg);
    }

    fn is_live<H: Handle>(&self, handle: H) -> bool {
        self.state.borrow().live.contains(&handle.as_raw())
    }
}

impl GpuDevice for MockGpu {
    fn wait_idle(&self) -> Result<()> {
        self.op(Call::WaitIdle)?;
        let mut s = self.state.borrow_mut();
        for state in s.fences.values_mut() {
            if *state == FenceState::Pending {
                *state = FenceState::Signaled;
            }
        }
        Ok(())
    }

    fn create_semaphore(&self) -> Result<vk::Semaphore> {
        self.op(Call::CreateSemaphore)?;
        Ok(self.create())
    }

    fn destroy_semaphore(&self, semaphore: vk::Semaphore) {
        self.record(Call::DestroySemaphore);
        self.state
            .borrow_mut()
            .signaled_semaphores
            .remove(&semaphore.as_raw());
        self.release(semaphore, "semaphore");
    }

    fn create_fence(&self, signaled: bool) -> Result<vk::Fence> {
        self.op(Call::CreateFence)?;
        let fence: vk::Fence = self.create();
        let state = if signaled {
            FenceState::Signaled
        } else {
            FenceState::Unsignaled
        };
        self.state.borrow_mut().fences.insert(fence.as_raw(), state);
        Ok(fence)
    }

    fn destroy_fence(&self, fence: vk::Fence) {
        self.record(Call::DestroyFence);
        let pending = self.state.borrow_mut().fences.remove(&fence.as_raw());
        if pending == Some(FenceState::Pending) {
            self.violation(format!("destroyed fence {:#x} while pending", fence.as_raw()));
        }
        self.release(fence, "fence");
    }

    fn wait_for_fence(&self, fence: vk::Fence, timeout: Duration) -> Result<()> {
        self.op(Call::WaitFence(fence))?;
        let mut guard = self.state.borrow_mut();
        let s = &mut *guard;
        let raw = fence.as_raw();
        match s.fences.get(&raw).copied() {
            Some(FenceState::Signaled) => Ok(()),
            Some(FenceState::Pending) if s.hung => Err(RenderError::FenceTimeout(timeout).into()),
            Some(FenceState::Pending) => {
                s.fences.insert(raw, FenceState::Signaled);
                Ok(())
            }
            Some(FenceState::Unsignaled) => {
                s.violations
                    .push(format!("waited on fence {raw:#x} that was never submitted"));
                Err(RenderError::FenceTimeout(timeout).into())
            }
            None => {
                s.violations.push(format!("waited on unknown fence {raw:#x}"));
                Err(anyhow!("unknown fence"))
            }
        }
    }

    fn reset_fence(&self, fence: vk::Fence) -> Result<()> {
        self.op(Call::ResetFence(fence))?;
        let mut guard = self.state.borrow_mut();
        let s = &mut *guard;
        let raw = fence.as_raw();
        match s.fences.get(&raw).copied() {
            Some(FenceState::Pending) => {
                s.violations.push(format!("reset fence {raw:#x} while pending"));
                s.fences.insert(raw, FenceState::Unsignaled);
            }
            Some(_) => {
                s.fences.insert(raw, FenceState::Unsignaled);
            }
            None => s.violations.push(format!("reset unknown fence {raw:#x}")),
        }
        Ok(())
    }

    fn create_swapchain(
        &self,
        extent: RenderSize,
        old: vk::SwapchainKHR,
    ) -> Result<SwapchainImages> {
        self.op(Call::CreateSwapchain {
            extent: extent2d(extent),
            old,
        })?;
        if extent.is_zero() {
            self.violation("swapchain requested with a zero extent".to_string());
            return Err(anyhow!("zero extent"));
        }
        if old != vk::SwapchainKHR::null() && !self.is_live(old) {
            self.violation("old swapchain destroyed before its replacement was built".to_string());
        }

        let swapchain: vk::SwapchainKHR = self.create();
        let count = self.state.borrow().image_count;
        let images: Vec<vk::Image> = (0..count).map(|_| self.borrowed()).collect();
        {
            let mut s = self.state.borrow_mut();
            s.chain_images = count;
            s.next_image = 0;
            s.image_fences.clear();
            s.last_acquired = None;
        }
        Ok(SwapchainImages {
            swapchain,
            images,
            format: vk::Format::B8G8R8A8_SRGB,
            extent: extent2d(extent),
            present_mode: vk::PresentModeKHR::FIFO,
        })
    }

    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR) {
        self.record(Call::DestroySwapchain);
        self.release(swapchain, "swapchain");
    }

    fn acquire_next_image(
        &self,
        swapchain: vk::SwapchainKHR,
        signal: vk::Semaphore,
        _timeout: Duration,
    ) -> Result<ImageAcquire> {
        self.op(Call::Acquire)?;
        if !self.is_live(swapchain) {
            self.violation("acquire from a dead swapchain".to_string());
        }
        let mut guard = self.state.borrow_mut();
        let s = &mut *guard;
        let outcome = match s.acquire_script.pop_front() {
            Some(o) => o,
            None => {
                let image_index = s.next_image;
                s.next_image = (s.next_image + 1) % s.chain_images.max(1) as u32;
                ImageAcquire::Ready {
                    image_index,
                    suboptimal: false,
                }
            }
        };
        if let ImageAcquire::Ready { image_index, .. } = outcome {
            if !s.signaled_semaphores.insert(signal.as_raw()) {
                s.violations
                    .push("acquire signaled a semaphore that was already signaled".to_string());
            }
            s.last_acquired = Some(image_index);
        }
        Ok(outcome)
    }

    fn submit(
        &self,
        cmd: vk::CommandBuffer,
        wait: vk::Semaphore,
        signal: vk::Semaphore,
        fence: vk::Fence,
    ) -> Result<()> {
        self.op(Call::Submit { cmd, fence })?;
        let mut guard = self.state.borrow_mut();
        let s = &mut *guard;

        if !s.signaled_semaphores.remove(&wait.as_raw()) {
            s.violations
                .push("submit waits on a semaphore nothing signaled".to_string());
        }
        if !s.signaled_semaphores.insert(signal.as_raw()) {
            s.violations
                .push("submit signals a semaphore that is already signaled".to_string());
        }

        match s.fences.get(&fence.as_raw()).copied() {
            Some(FenceState::Unsignaled) => {}
            other => s
                .violations
                .push(format!("submit with fence in state {other:?}, expected unsignaled")),
        }

        if let Some(image) = s.last_acquired {
            if let Some(prev) = s.image_fences.get(&image).copied() {
                if s.fences.get(&prev) == Some(&FenceState::Pending) {
                    s.violations.push(format!(
                        "image {image} submitted while its previous fence is pending"
                    ));
                }
            }
            s.image_fences.insert(image, fence.as_raw());
        }

        s.fences.insert(fence.as_raw(), FenceState::Pending);
        s.cmd_fences.insert(cmd.as_raw(), fence.as_raw());
        s.last_submitted = Some(fence);
        Ok(())
    }

    fn present(
        &self,
        _swapchain: vk::SwapchainKHR,
        image_index: u32,
        wait: vk::Semaphore,
    ) -> Result<SurfaceStatus> {
        self.op(Call::Present(image_index))?;
        let mut guard = self.state.borrow_mut();
        let s = &mut *guard;
        if !s.signaled_semaphores.remove(&wait.as_raw()) {
            s.violations
                .push("present waits on a semaphore nothing signaled".to_string());
        }
        let status = s.present_script.pop_front().unwrap_or(SurfaceStatus::Optimal);
        s.present_results.push(status);
        Ok(status)
    }

    fn depth_format(&self) -> Result<vk::Format> {
        Ok(vk::Format::D32_SFLOAT)
    }

    fn create_image_view(
        &self,
        _image: vk::Image,
        _format: vk::Format,
        _aspect: vk::ImageAspectFlags,
    ) -> Result<vk::ImageView> {
        self.op(Call::CreateImageView)?;
        Ok(self.create())
    }

    fn destroy_image_view(&self, view: vk::ImageView) {
        self.record(Call::DestroyImageView);
        self.release(view, "image view");
    }

    fn create_attachment_image(
        &self,
        _extent: vk::Extent2D,
        _format: vk::Format,
        _usage: vk::ImageUsageFlags,
    ) -> Result<(vk::Image, vk::DeviceMemory)> {
        self.op(Call::CreateImage)?;
        Ok((self.create(), self.create()))
    }

    fn destroy_image(&self, image: vk::Image, memory: vk::DeviceMemory) {
        self.record(Call::DestroyImage);
        self.release(image, "image");
        self.release(memory, "memory");
    }

    fn create_render_pass(&self, _color: vk::Format, _depth: vk::Format) -> Result<vk::RenderPass> {
        self.op(Call::CreateRenderPass)?;
        Ok(self.create())
    }

    fn destroy_render_pass(&self, render_pass: vk::RenderPass) {
        self.record(Call::DestroyRenderPass);
        self.release(render_pass, "render pass");
    }

    fn create_framebuffer(
        &self,
        render_pass: vk::RenderPass,
        attachments: &[vk::ImageView],
        _extent: vk::Extent2D,
    ) -> Result<vk::Framebuffer> {
        self.op(Call::CreateFramebuffer)?;
        if !self.is_live(render_pass) || !attachments.iter().all(|&a| self.is_live(a)) {
            self.violation("framebuffer built from dead handles".to_string());
        }
        Ok(self.create())
    }

    fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer) {
        self.record(Call::DestroyFramebuffer);
        self.release(framebuffer, "framebuffer");
    }

    fn allocate_command_buffers(&self, count: usize) -> Result<Vec<vk::CommandBuffer>> {
        self.op(Call::AllocateCommandBuffers(count))?;
        Ok((0..count).map(|_| self.create()).collect())
    }

    fn free_command_buffers(&self, buffers: &[vk::CommandBuffer]) {
        self.record(Call::FreeCommandBuffers(buffers.len()));
        for &cmd in buffers {
            let fence = self.state.borrow_mut().cmd_fences.remove(&cmd.as_raw());
            if let Some(f) = fence {
                if self.state.borrow().fences.get(&f) == Some(&FenceState::Pending) {
                    self.violation("freed a command buffer that is still in flight".to_string());
                }
            }
            self.release(cmd, "command buffer");
        }
    }

    fn begin_command_buffer(&self, cmd: vk::CommandBuffer) -> Result<()> {
        self.op(Call::BeginCommandBuffer(cmd))?;
        let s = self.state.borrow();
        let in_flight = s
            .cmd_fences
            .get(&cmd.as_raw())
            .and_then(|f| s.fences.get(f))
            == Some(&FenceState::Pending);
        drop(s);
        if in_flight {
            self.violation(format!(
                "re-recording command buffer {:#x} while the GPU may still read it",
                cmd.as_raw()
            ));
        }
        Ok(())
    }

    fn end_command_buffer(&self, cmd: vk::CommandBuffer) -> Result<()> {
        self.op(Call::EndCommandBuffer(cmd))
    }

    fn cmd_begin_render_pass(
        &self,
        _cmd: vk::CommandBuffer,
        render_pass: vk::RenderPass,
        framebuffer: vk::Framebuffer,
        extent: vk::Extent2D,
        _clear: &[vk::ClearValue],
    ) {
        self.record(Call::BeginRenderPass { extent });
        if !self.is_live(render_pass) || !self.is_live(framebuffer) {
            self.violation("render pass begun with dead handles".to_string());
        }
    }

    fn cmd_end_render_pass(&self, _cmd: vk::CommandBuffer) {
        self.record(Call::EndRenderPass);
    }

    fn cmd_set_viewport_scissor(&self, _cmd: vk::CommandBuffer, _extent: vk::Extent2D) {
        self.record(Call::SetViewportScissor);
    }

    fn create_shader_module(&self, _code: &[u32]) -> Result<vk::ShaderModule> {
        self.op(Call::CreateShaderModule)?;
        Ok(self.create())
    }

    fn destroy_shader_module(&self, module: vk::ShaderModule) {
        self.record(Call::DestroyShaderModule);
        self.release(module, "shader module");
    }

    fn create_pipeline_layout(
        &self,
        _set_layouts: &[vk::DescriptorSetLayout],
        push_constants: &[vk::PushConstantRange],
    ) -> Result<vk::PipelineLayout> {
        self.op(Call::CreatePipelineLayout {
            push_constant_bytes: push_constants.iter().map(|r| r.size).sum(),
        })?;
        Ok(self.create())
    }

    fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout) {
        self.record(Call::DestroyPipelineLayout);
        self.release(layout, "pipeline layout");
    }

    fn create_graphics_pipeline(&self, desc: &GraphicsPipelineDesc<'_>) -> Result<vk::Pipeline> {
        self.op(Call::CreatePipeline(desc.render_pass))?;
        if !self.is_live(desc.vertex_module) || !self.is_live(desc.fragment_module) {
            self.violation("pipeline linked from dead shader modules".to_string());
        }
        Ok(self.create())
    }

    fn destroy_pipeline(&self, pipeline: vk::Pipeline) {
        self.record(Call::DestroyPipeline);
        self.release(pipeline, "pipeline");
    }

    fn cmd_bind_pipeline(&self, _cmd: vk::CommandBuffer, pipeline: vk::Pipeline) {
        self.record(Call::BindPipeline(pipeline));
    }

    fn cmd_push_constants(
        &self,
        _cmd: vk::CommandBuffer,
        _layout: vk::PipelineLayout,
        _stages: vk::ShaderStageFlags,
        _offset: u32,
        data: &[u8],
    ) {
        self.record(Call::PushConstants(data.len()));
    }

    fn create_buffer(
        &self,
        _size: vk::DeviceSize,
        _usage: vk::BufferUsageFlags,
        _properties: vk::MemoryPropertyFlags,
    ) -> Result<(vk::Buffer, vk::DeviceMemory)> {
        self.op(Call::CreateBuffer)?;
        Ok((self.create(), self.create()))
    }

    fn write_memory(&self, memory: vk::DeviceMemory, data: &[u8]) -> Result<()> {
        self.op(Call::WriteMemory(data.len()))?;
        if !self.is_live(memory) {
            self.violation("wrote to memory that is not alive".to_string());
        }
        Ok(())
    }

    fn destroy_buffer(&self, buffer: vk::Buffer, memory: vk::DeviceMemory) {
        self.record(Call::DestroyBuffer);
        self.release(buffer, "buffer");
        self.release(memory, "memory");
    }

    fn cmd_bind_vertex_buffer(&self, _cmd: vk::CommandBuffer, _buffer: vk::Buffer) {
        self.record(Call::BindVertexBuffer);
    }

    fn cmd_bind_index_buffer(&self, _cmd: vk::CommandBuffer, _buffer: vk::Buffer) {
        self.record(Call::BindIndexBuffer);
    }

    fn cmd_draw(&self, _cmd: vk::CommandBuffer, vertex_count: u32) {
        self.record(Call::Draw(vertex_count));
    }

    fn cmd_draw_indexed(&self, _cmd: vk::CommandBuffer, index_count: u32) {
        self.record(Call::DrawIndexed(index_count));
    }
}

/// Scriptable window stand-in.
pub struct MockSurface {
    extent: RenderSize,
    resized: bool,
    closed: bool,
    close_on_wait: bool,
    after_wait: VecDeque<RenderSize>,
    log: Option<Rc<MockGpu>>,
}

impl MockSurface {
    pub fn new(extent: RenderSize) -> Self {
        Self {
            extent,
            resized: false,
            closed: false,
            close_on_wait: false,
            after_wait: VecDeque::new(),
            log: None,
        }
    }

    /// Interleaves `WaitEvents` into `gpu`'s call log.
    pub fn logging_to(mut self, gpu: &Rc<MockGpu>) -> Self {
        self.log = Some(gpu.clone());
        self
    }

    /// What the platform does on a resize: new extent plus the flag.
    pub fn trigger_resize(&mut self, extent: RenderSize) {
        self.extent = extent;
        self.resized = true;
    }

    /// Extents the surface reports after each successive `wait_events`.
    pub fn extents_after_wait(&mut self, extents: impl IntoIterator<Item = RenderSize>) {
        self.after_wait.extend(extents);
    }

    pub fn close_on_wait(&mut self) {
        self.close_on_wait = true;
    }
}

impl SurfaceProvider for MockSurface {
    fn extent(&self) -> RenderSize {
        self.extent
    }

    fn should_close(&self) -> bool {
        self.closed
    }

    fn was_resized(&self) -> bool {
        self.resized
    }

    fn reset_resized_flag(&mut self) {
        self.resized = false;
    }

    fn poll_events(&mut self) {}

    fn wait_events(&mut self) {
        if let Some(gpu) = &self.log {
            gpu.record(Call::WaitEvents);
        }
        if self.close_on_wait {
            self.closed = true;
        }
        match self.after_wait.pop_front() {
            Some(extent) => self.extent = extent,
            None if self.extent.is_zero() && !self.closed => {
                panic!("wait_events would block forever on a zero extent")
            }
            None => {}
        }
    }
}
