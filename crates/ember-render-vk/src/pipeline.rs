use std::io::Cursor;
use std::mem::size_of;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use ash::{util::read_spv, vk};
use tracing::debug;

use crate::error::RenderError;
use crate::gpu::{GpuDevice, GraphicsPipelineDesc};
use crate::mesh::Vertex;

/// Vulkan guarantees at least this many bytes of push constants on every device.
pub const MAX_PUSH_CONSTANT_SIZE: usize = 128;

/// Fixed-function state for one graphics pipeline.
///
/// `render_pass` and `layout` have no sensible default and must be filled in by
/// the caller; [`GraphicsPipeline::new`] refuses a config without them.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub topology: vk::PrimitiveTopology,
    pub primitive_restart: bool,
    pub polygon_mode: vk::PolygonMode,
    pub cull_mode: vk::CullModeFlags,
    pub front_face: vk::FrontFace,
    pub line_width: f32,
    pub samples: vk::SampleCountFlags,
    pub blend_enable: bool,
    pub depth_test: bool,
    pub depth_write: bool,
    pub depth_compare: vk::CompareOp,
    pub dynamic_states: Vec<vk::DynamicState>,
    pub render_pass: Option<vk::RenderPass>,
    pub layout: Option<vk::PipelineLayout>,
    pub subpass: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            topology: vk::PrimitiveTopology::TRIANGLE_LIST,
            primitive_restart: false,
            polygon_mode: vk::PolygonMode::FILL,
            cull_mode: vk::CullModeFlags::NONE,
            front_face: vk::FrontFace::COUNTER_CLOCKWISE,
            line_width: 1.0,
            samples: vk::SampleCountFlags::TYPE_1,
            blend_enable: false,
            depth_test: true,
            depth_write: true,
            depth_compare: vk::CompareOp::LESS,
            dynamic_states: vec![vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR],
            render_pass: None,
            layout: None,
            subpass: 0,
        }
    }
}

impl PipelineConfig {
    /// Returns the render pass and layout, or the first one missing.
    pub fn targets(&self) -> Result<(vk::RenderPass, vk::PipelineLayout), RenderError> {
        let render_pass = self.render_pass.ok_or(RenderError::MissingRenderPass)?;
        let layout = self.layout.ok_or(RenderError::MissingLayout)?;
        Ok((render_pass, layout))
    }
}

/// Checks a push-constant block against the portable limits and describes it
/// as a range starting at offset 0.
pub fn push_constant_range<T>(stages: vk::ShaderStageFlags) -> Result<vk::PushConstantRange> {
    let size = size_of::<T>();
    if size > MAX_PUSH_CONSTANT_SIZE {
        return Err(RenderError::PushConstantsTooLarge {
            size,
            max: MAX_PUSH_CONSTANT_SIZE,
        }
        .report());
    }
    if size == 0 || size % 4 != 0 {
        return Err(RenderError::PushConstantsMisaligned(size).report());
    }
    Ok(vk::PushConstantRange {
        stage_flags: stages,
        offset: 0,
        size: size as u32,
    })
}

/// Reads a SPIR-V file from disk. A missing file is fatal for the caller.
pub fn load_shader(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| {
        RenderError::ShaderRead {
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}

/// An immutable graphics pipeline plus the shader modules it was linked from.
pub struct GraphicsPipeline<D: GpuDevice> {
    device: Rc<D>,
    pipeline: vk::Pipeline,
    vertex_module: vk::ShaderModule,
    fragment_module: vk::ShaderModule,
    render_pass: vk::RenderPass,
}

impl<D: GpuDevice> GraphicsPipeline<D> {
    pub fn new(
        device: Rc<D>,
        vertex_spv: &[u8],
        fragment_spv: &[u8],
        config: &PipelineConfig,
    ) -> Result<Self> {
        let (render_pass, layout) = config.targets().map_err(RenderError::report)?;

        let vs_code = read_spv(&mut Cursor::new(vertex_spv)).context("read_spv(vertex)")?;
        let fs_code = read_spv(&mut Cursor::new(fragment_spv)).context("read_spv(fragment)")?;

        let vertex_module = device
            .create_shader_module(&vs_code)
            .context("create_shader_module(vertex)")?;
        let fragment_module = match device.create_shader_module(&fs_code) {
            Ok(m) => m,
            Err(e) => {
                device.destroy_shader_module(vertex_module);
                return Err(e.context("create_shader_module(fragment)"));
            }
        };

        let bindings = Vertex::binding_descriptions();
        let attributes = Vertex::attribute_descriptions();
        let desc = GraphicsPipelineDesc {
            vertex_module,
            fragment_module,
            bindings: &bindings,
            attributes: &attributes,
            config,
            render_pass,
            layout,
        };
        let pipeline = match device.create_graphics_pipeline(&desc) {
            Ok(p) => p,
            Err(e) => {
                device.destroy_shader_module(fragment_module);
                device.destroy_shader_module(vertex_module);
                return Err(e.context("create_graphics_pipelines"));
            }
        };
        debug!(?render_pass, "graphics pipeline linked");

        Ok(Self {
            device,
            pipeline,
            vertex_module,
            fragment_module,
            render_pass,
        })
    }

    pub fn bind(&self, cmd: vk::CommandBuffer) {
        self.device.cmd_bind_pipeline(cmd, self.pipeline);
    }

    #[inline]
    pub fn handle(&self) -> vk::Pipeline {
        self.pipeline
    }

    /// The render pass this pipeline is compatible with.
    #[inline]
    pub fn render_pass(&self) -> vk::RenderPass {
        self.render_pass
    }
}

impl<D: GpuDevice> Drop for GraphicsPipeline<D> {
    fn drop(&mut self) {
        self.device.destroy_pipeline(self.pipeline);
        self.device.destroy_shader_module(self.fragment_module);
        self.device.destroy_shader_module(self.vertex_module);
    }
}
