use std::mem::offset_of;

use id_arena::Id;
use wgpu::util::DeviceExt;

use crate::mesh::{Mesh, Topology, Vertex};
use crate::rendering::instance::InstanceBuffer;

pub type RenderMeshId = Id<RenderMesh>;

pub struct RenderMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
    pub topology: Topology,
    pub instance_buffer: InstanceBuffer,
}

impl RenderMesh {
    pub fn from_mesh(device: &wgpu::Device, mesh: &Mesh) -> Self {
        let vertex_buffer_name = format!("Vertex buffer ({})", mesh.name);
        let index_buffer_name = format!("Index buffer ({})", mesh.name);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&vertex_buffer_name),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&index_buffer_name),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_buffer = InstanceBuffer::new(device, mesh.name.clone());

        Self {
            vertex_buffer,
            index_buffer,
            num_indices: mesh.indices.len() as u32,
            topology: mesh.topology,
            instance_buffer,
        }
    }
}

/// Draws every gathered instance of a mesh in one call. The instance buffer
/// must have been written for this frame already.
pub fn draw_mesh_instances(
    render_pass: &mut wgpu::RenderPass<'_>,
    render_mesh: &RenderMesh,
    instance_count: u32,
) {
    render_pass.set_vertex_buffer(0, render_mesh.vertex_buffer.slice(..));
    render_mesh.instance_buffer.bind(render_pass);
    render_pass.set_index_buffer(render_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    render_pass.draw_indexed(0..render_mesh.num_indices, 0, 0..instance_count);
}

pub const RENDER_MESH_VBL: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, position) as wgpu::BufferAddress,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, normal) as wgpu::BufferAddress,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        },
    ],
};

pub const MESH_PRIMITIVE_STATE: wgpu::PrimitiveState = wgpu::PrimitiveState {
    topology: wgpu::PrimitiveTopology::TriangleList,
    strip_index_format: None,
    front_face: wgpu::FrontFace::Ccw,
    // The floor is visible from both sides
    cull_mode: None,
    unclipped_depth: false,
    polygon_mode: wgpu::PolygonMode::Fill,
    conservative: false,
};

pub const LINE_PRIMITIVE_STATE: wgpu::PrimitiveState = wgpu::PrimitiveState {
    topology: wgpu::PrimitiveTopology::LineList,
    strip_index_format: None,
    front_face: wgpu::FrontFace::Ccw,
    cull_mode: None,
    unclipped_depth: false,
    polygon_mode: wgpu::PolygonMode::Fill,
    conservative: false,
};
