use std::mem::{offset_of, size_of};
use std::rc::Rc;

use anyhow::{Context, Result};
use ash::vk;
use bytemuck::{Pod, Zeroable};

use crate::error::RenderError;
use crate::gpu::GpuDevice;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 3],
}

impl Vertex {
    pub const fn new(position: [f32; 2], color: [f32; 3]) -> Self {
        Self { position, color }
    }

    pub fn binding_descriptions() -> Vec<vk::VertexInputBindingDescription> {
        vec![vk::VertexInputBindingDescription {
            binding: 0,
            stride: size_of::<Vertex>() as u32,
            input_rate: vk::VertexInputRate::VERTEX,
        }]
    }

    pub fn attribute_descriptions() -> Vec<vk::VertexInputAttributeDescription> {
        vec![
            vk::VertexInputAttributeDescription {
                location: 0,
                binding: 0,
                format: vk::Format::R32G32_SFLOAT,
                offset: offset_of!(Vertex, position) as u32,
            },
            vk::VertexInputAttributeDescription {
                location: 1,
                binding: 0,
                format: vk::Format::R32G32B32_SFLOAT,
                offset: offset_of!(Vertex, color) as u32,
            },
        ]
    }
}

/// Geometry in host-visible buffers, written once at creation.
pub struct Mesh<D: GpuDevice> {
    device: Rc<D>,
    vertex_buffer: vk::Buffer,
    vertex_memory: vk::DeviceMemory,
    vertex_count: u32,
    index: Option<(vk::Buffer, vk::DeviceMemory, u32)>,
}

impl<D: GpuDevice> Mesh<D> {
    pub fn new(device: Rc<D>, vertices: &[Vertex], indices: Option<&[u32]>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(RenderError::TooFewVertices(vertices.len()).into());
        }

        let (vertex_buffer, vertex_memory) =
            upload(&*device, bytemuck::cast_slice(vertices), vk::BufferUsageFlags::VERTEX_BUFFER)
                .context("vertex buffer")?;

        let index = match indices {
            Some(idx) if !idx.is_empty() => {
                match upload(&*device, bytemuck::cast_slice(idx), vk::BufferUsageFlags::INDEX_BUFFER) {
                    Ok((buf, mem)) => Some((buf, mem, idx.len() as u32)),
                    Err(e) => {
                        device.destroy_buffer(vertex_buffer, vertex_memory);
                        return Err(e.context("index buffer"));
                    }
                }
            }
            _ => None,
        };

        Ok(Self {
            device,
            vertex_buffer,
            vertex_memory,
            vertex_count: vertices.len() as u32,
            index,
        })
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[inline]
    pub fn has_index_buffer(&self) -> bool {
        self.index.is_some()
    }

    pub fn bind(&self, cmd: vk::CommandBuffer) {
        self.device.cmd_bind_vertex_buffer(cmd, self.vertex_buffer);
        if let Some((buf, _, _)) = self.index {
            self.device.cmd_bind_index_buffer(cmd, buf);
        }
    }

    pub fn draw(&self, cmd: vk::CommandBuffer) {
        match self.index {
            Some((_, _, count)) => self.device.cmd_draw_indexed(cmd, count),
            None => self.device.cmd_draw(cmd, self.vertex_count),
        }
    }
}

impl<D: GpuDevice> Drop for Mesh<D> {
    fn drop(&mut self) {
        if let Some((buf, mem, _)) = self.index.take() {
            self.device.destroy_buffer(buf, mem);
        }
        self.device
            .destroy_buffer(self.vertex_buffer, self.vertex_memory);
    }
}

fn upload<D: GpuDevice + ?Sized>(
    device: &D,
    bytes: &[u8],
    usage: vk::BufferUsageFlags,
) -> Result<(vk::Buffer, vk::DeviceMemory)> {
    let (buf, mem) = device.create_buffer(
        bytes.len() as vk::DeviceSize,
        usage,
        vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
    )?;
    if let Err(e) = device.write_memory(mem, bytes) {
        device.destroy_buffer(buf, mem);
        return Err(e);
    }
    Ok((buf, mem))
}
