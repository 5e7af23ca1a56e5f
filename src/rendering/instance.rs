use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use wgpu::BufferUsages;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Instance {
    pub model: Mat4,
    pub color: Vec4,
}

impl Instance {
    pub fn descriptor() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Instance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

pub struct Instances {
    instances: Vec<Instance>,
}

impl Instances {
    pub fn new() -> Self {
        Self {
            instances: Vec::new(),
        }
    }

    pub fn add(&mut self, instance: Instance) {
        self.instances.push(instance);
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn write_to_buffer(&self, queue: &wgpu::Queue, instance_buffer: &InstanceBuffer) {
        queue.write_buffer(
            instance_buffer.buffer(),
            0,
            bytemuck::cast_slice(&self.instances),
        );
    }

    pub fn should_render(&self) -> bool {
        !self.instances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }
}

pub struct InstanceBuffer(wgpu::Buffer);

impl InstanceBuffer {
    const MAX_INSTANCES: u64 = 128;

    pub fn new(device: &wgpu::Device, name: impl Into<String>) -> Self {
        let name: String = name.into();

        let descriptor = Self::descriptor(&name);
        let buffer = device.create_buffer(&descriptor);

        Self(buffer)
    }

    fn descriptor(name: &str) -> wgpu::BufferDescriptor<'static> {
        // The label has to outlive the descriptor; a leak per mesh is fine
        let label = format!("Instance buffer ({})", name);
        let label = label.into_boxed_str();
        let label = Box::leak(label);

        wgpu::BufferDescriptor {
            label: Some(label),
            size: size_of::<Instance>() as u64 * Self::MAX_INSTANCES,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }

    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(1, self.buffer().slice(..));
    }
}
