use glam::{Mat4, Vec2};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::camera::Camera;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Default)]
pub struct CameraUniform {
    view_proj: Mat4,
}

impl CameraUniform {
    pub fn update(&mut self, resolution: PhysicalSize<u32>, camera: &Camera) {
        self.view_proj =
            camera.get_vp_matrix(Vec2::new(resolution.width as f32, resolution.height as f32));
    }

    pub fn create_buffer(&self, device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Uniform Buffer"),
            contents: bytemuck::cast_slice(&[*self]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    pub fn update_buffer(&self, queue: &wgpu::Queue, buffer: &wgpu::Buffer) {
        queue.write_buffer(buffer, 0, bytemuck::cast_slice(&[*self]));
    }
}

/// GPU-side view of the demo camera; tracks the output resolution so the
/// projection aspect follows window resizes.
pub struct RenderCamera {
    camera: Camera,
    uniform: CameraUniform,
    pub uniform_buffer: wgpu::Buffer,
    size: PhysicalSize<u32>,
}

impl RenderCamera {
    pub fn new(device: &wgpu::Device, camera: Camera, size: PhysicalSize<u32>) -> Self {
        let mut uniform = CameraUniform::default();
        uniform.update(size, &camera);
        let uniform_buffer = uniform.create_buffer(device);

        Self {
            camera,
            uniform,
            uniform_buffer,
            size,
        }
    }

    pub fn update_camera(&mut self, camera: &Camera) {
        self.camera = camera.clone();
    }

    pub fn update_resolution(&mut self, size: PhysicalSize<u32>) {
        self.size = size;
    }

    pub fn update_uniform_buffer(&mut self, queue: &wgpu::Queue) {
        self.uniform.update(self.size, &self.camera);
        self.uniform.update_buffer(queue, &self.uniform_buffer);
    }
}
