use winit::dpi::PhysicalSize;

pub struct DepthTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    label: String,
}

impl DepthTexture {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(device: &wgpu::Device, size: PhysicalSize<u32>, label: impl Into<String>) -> Self {
        let label: String = label.into();
        let texture = Self::create_wgpu_texture(device, size, &label);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        DepthTexture {
            _texture: texture,
            view,
            label,
        }
    }

    fn create_wgpu_texture(
        device: &wgpu::Device,
        size: PhysicalSize<u32>,
        label: &str,
    ) -> wgpu::Texture {
        let size = wgpu::Extent3d {
            width: size.width,
            height: size.height,
            depth_or_array_layers: 1,
        };

        let descriptor = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        };

        device.create_texture(&descriptor)
    }

    pub fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) {
        let texture = Self::create_wgpu_texture(device, size, &self.label);
        self.view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self._texture = texture;
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}
