use std::mem::{offset_of, size_of};
use std::rc::Rc;

use anyhow::{Context, Result};
use ash::vk;
use bytemuck::{Pod, Zeroable};
use ember_math::{Transform2d, Vec3};
use tracing::debug;

use crate::error::RenderError;
use crate::gpu::GpuDevice;
use crate::pipeline::{push_constant_range, GraphicsPipeline, PipelineConfig, MAX_PUSH_CONSTANT_SIZE};
use crate::scene::SceneObject;

/// Default rotation added to every object per rendered frame, in radians.
pub const DEFAULT_SPIN_PER_FRAME: f32 = 0.01;

/// Per-object constants, laid out as the std430 block in `simple.vert`:
///
/// ```glsl
/// layout(push_constant) uniform Push { mat2 transform; vec2 offset; vec3 color; } push;
/// ```
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SimplePushConstants {
    /// Column-major `mat2`.
    pub transform: [f32; 4],
    pub offset: [f32; 2],
    _pad0: [f32; 2],
    pub color: [f32; 3],
    _pad1: f32,
}

const _: () = assert!(size_of::<SimplePushConstants>() == 48);
const _: () = assert!(size_of::<SimplePushConstants>() <= MAX_PUSH_CONSTANT_SIZE);
const _: () = assert!(offset_of!(SimplePushConstants, offset) == 16);
const _: () = assert!(offset_of!(SimplePushConstants, color) % 16 == 0);

impl SimplePushConstants {
    pub fn new(transform: &Transform2d, color: Vec3) -> Self {
        Self {
            transform: transform.mat2().to_cols_array(),
            offset: transform.translation.to_array(),
            _pad0: [0.0; 2],
            color: color.to_array(),
            _pad1: 0.0,
        }
    }
}

/// Draws [`SceneObject`]s with flat per-object color and a 2D transform.
pub struct SimpleRenderSystem<D: GpuDevice> {
    device: Rc<D>,
    layout: vk::PipelineLayout,
    pipeline: Option<GraphicsPipeline<D>>,
    built_for: Option<u64>,
    vertex_spv: Vec<u8>,
    fragment_spv: Vec<u8>,
    spin_per_frame: f32,
}

impl<D: GpuDevice> SimpleRenderSystem<D> {
    const STAGES: vk::ShaderStageFlags = vk::ShaderStageFlags::from_raw(
        vk::ShaderStageFlags::VERTEX.as_raw() | vk::ShaderStageFlags::FRAGMENT.as_raw(),
    );

    pub fn new(device: Rc<D>, vertex_spv: Vec<u8>, fragment_spv: Vec<u8>) -> Result<Self> {
        let range = push_constant_range::<SimplePushConstants>(Self::STAGES)?;
        let layout = device
            .create_pipeline_layout(&[], &[range])
            .context("create_pipeline_layout")?;
        Ok(Self {
            device,
            layout,
            pipeline: None,
            built_for: None,
            vertex_spv,
            fragment_spv,
            spin_per_frame: DEFAULT_SPIN_PER_FRAME,
        })
    }

    /// Rotation added per frame. Zero leaves transforms to the caller.
    pub fn with_spin(mut self, radians_per_frame: f32) -> Self {
        self.spin_per_frame = radians_per_frame;
        self
    }

    /// Makes sure a pipeline compatible with `render_pass` exists. A new
    /// swapchain generation always means a new render pass, so the pipeline
    /// is rebuilt then even if the handle value happens to repeat.
    pub fn prepare(&mut self, render_pass: vk::RenderPass, generation: u64) -> Result<()> {
        if self.pipeline.is_some() && self.built_for == Some(generation) {
            return Ok(());
        }
        // The old pipeline references a destroyed render pass; release it first.
        self.pipeline = None;

        let config = PipelineConfig {
            render_pass: Some(render_pass),
            layout: Some(self.layout),
            ..PipelineConfig::default()
        };
        let pipeline = GraphicsPipeline::new(
            self.device.clone(),
            &self.vertex_spv,
            &self.fragment_spv,
            &config,
        )?;
        debug!(generation, "simple render system pipeline built");
        self.pipeline = Some(pipeline);
        self.built_for = Some(generation);
        Ok(())
    }

    /// Records one draw per object into `cmd`, advancing each object's
    /// rotation first.
    pub fn render_objects(
        &self,
        cmd: vk::CommandBuffer,
        objects: &mut [SceneObject<D>],
    ) -> Result<()> {
        let pipeline = self
            .pipeline
            .as_ref()
            .ok_or_else(|| RenderError::PipelineNotPrepared.report())?;
        pipeline.bind(cmd);

        for obj in objects.iter_mut() {
            obj.transform.rotate_wrapped(self.spin_per_frame);
            let push = SimplePushConstants::new(&obj.transform, obj.color);
            self.device
                .cmd_push_constants(cmd, self.layout, Self::STAGES, 0, bytemuck::bytes_of(&push));
            obj.mesh.bind(cmd);
            obj.mesh.draw(cmd);
        }
        Ok(())
    }

    #[inline]
    pub fn layout(&self) -> vk::PipelineLayout {
        self.layout
    }

    pub fn pipeline(&self) -> Option<&GraphicsPipeline<D>> {
        self.pipeline.as_ref()
    }
}

impl<D: GpuDevice> Drop for SimpleRenderSystem<D> {
    fn drop(&mut self) {
        self.pipeline = None;
        self.device.destroy_pipeline_layout(self.layout);
    }
}
