//! Vulkan backend: presentable image chain, per-frame orchestration and a
//! push-constant driven 2D render system.

mod context;
mod error;
mod frame;
mod gpu;
mod mesh;
mod pipeline;
mod render_system;
mod scene;
mod swapchain;
mod sync;

#[cfg(test)]
mod mock;

pub use context::{create_surface, VsyncMode, VulkanConfig, VulkanContext};
pub use error::RenderError;
pub use frame::{FrameOrchestrator, DEFAULT_CLEAR_COLOR};
pub use gpu::{extent2d, GpuDevice, GraphicsPipelineDesc, ImageAcquire, SwapchainImages};
pub use mesh::{Mesh, Vertex};
pub use pipeline::{
    load_shader, push_constant_range, GraphicsPipeline, PipelineConfig, MAX_PUSH_CONSTANT_SIZE,
};
pub use render_system::{SimplePushConstants, SimpleRenderSystem, DEFAULT_SPIN_PER_FRAME};
pub use scene::{ObjectId, SceneObject};
pub use swapchain::{Swapchain, SwapchainOptions};
pub use sync::{FrameCounter, FrameSync, MAX_FRAMES_IN_FLIGHT};

pub use ash::vk;

#[cfg(feature = "embed-shaders")]
pub const SIMPLE_VERT_SPV: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/simple.vert.spv"));
#[cfg(feature = "embed-shaders")]
pub const SIMPLE_FRAG_SPV: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/simple.frag.spv"));
