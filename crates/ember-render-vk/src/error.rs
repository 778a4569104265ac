use std::path::PathBuf;
use std::time::Duration;

use ash::vk;
use thiserror::Error;

/// Named failures of the render core.
///
/// Contract violations (calls in the wrong frame state, foreign command
/// buffers, incomplete pipeline configs) indicate a bug in the calling layer.
/// The remaining variants are fatal runtime conditions. Both travel inside
/// `anyhow::Error`; match them with `downcast_ref::<RenderError>()`.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("begin_frame called while a frame is already in progress")]
    FrameAlreadyInProgress,

    #[error("{0} called with no frame in progress")]
    NoFrameInProgress(&'static str),

    #[error("command buffer {found:?} does not belong to the current frame ({expected:?})")]
    ForeignCommandBuffer {
        expected: vk::CommandBuffer,
        found: vk::CommandBuffer,
    },

    #[error("begin_pass called while a render pass is already open")]
    PassAlreadyOpen,

    #[error("end_pass called with no render pass open")]
    NoPassOpen,

    #[error("end_frame called while the render pass is still open")]
    PassStillOpen,

    #[error("pipeline config has no render pass")]
    MissingRenderPass,

    #[error("pipeline config has no pipeline layout")]
    MissingLayout,

    #[error("render_objects called before prepare built a pipeline")]
    PipelineNotPrepared,

    #[error("push constant block is {size} bytes, limit is {max}")]
    PushConstantsTooLarge { size: usize, max: usize },

    #[error("push constant block size {0} is not a multiple of 4")]
    PushConstantsMisaligned(usize),

    #[error("mesh needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("image index {index} out of range for a chain of {count} images")]
    ImageIndexOutOfRange { index: u32, count: usize },

    #[error("fence not signaled within {0:?}")]
    FenceTimeout(Duration),

    #[error("failed to read shader {path}")]
    ShaderRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    /// True for errors raised by calling the API in the wrong order or with
    /// incomplete inputs, as opposed to runtime failures.
    pub fn is_contract_violation(&self) -> bool {
        !matches!(
            self,
            RenderError::FenceTimeout(_) | RenderError::ShaderRead { .. }
        )
    }

    /// Logs at `error` and converts for propagation.
    pub(crate) fn report(self) -> anyhow::Error {
        tracing::error!("{self}");
        self.into()
    }
}
