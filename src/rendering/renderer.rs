use std::sync::Arc;

use anyhow::Context;
use id_arena::Arena;
use wgpu::CommandEncoderDescriptor;
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    demo::DemoState,
    mesh::Topology,
    rendering::{
        global_uniform::GlobalUniformState,
        instance::Instance,
        passes::scene_pass::{ScenePass, ScenePassTextureViews},
        render_camera::RenderCamera,
        render_common::RenderCommon,
        render_mesh::{draw_mesh_instances, RenderMesh},
        shader_loader::{PipelineCacheBuilder, ShaderLoader},
        texture::DepthTexture,
    },
    scene_graph::Scene,
};

pub struct Renderer {
    pub window: Arc<Window>,
    pub size: PhysicalSize<u32>,

    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,

    common: Arc<RenderCommon>,
    depth_texture: DepthTexture,
    render_meshes: Arena<RenderMesh>,

    camera: RenderCamera,

    shader_loader: ShaderLoader,

    scene_pass: ScenePass,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, demo_state: &DemoState) -> anyhow::Result<Renderer> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to acquire device")?;

        let camera = RenderCamera::new(&device, demo_state.camera.clone(), size);

        let common = RenderCommon::new(
            &device,
            &adapter,
            &surface,
            size,
            camera.uniform_buffer.clone(),
            GlobalUniformState::new(
                size,
                0.0,
                demo_state.light.direction,
                demo_state.light.intensity,
            ),
        );
        let common = Arc::new(common);

        let depth_texture = DepthTexture::new(&device, size, "Depth Texture");

        let mut cache_builder = PipelineCacheBuilder::new();

        let scene_pass = ScenePass::create(&device, common.clone(), &mut cache_builder)?;

        let shader_loader = ShaderLoader::new(device.clone(), cache_builder)?;

        let render_meshes = Arena::new();

        Ok(Self {
            window: window.clone(),
            size,
            surface,
            device,
            queue,
            common,
            depth_texture,
            render_meshes,
            camera,
            shader_loader,
            scene_pass,
        })
    }

    pub fn upload_meshes(&mut self, demo_state: &mut DemoState) {
        for (_id, scene_mesh) in demo_state.scene.meshes.iter_mut() {
            let render_mesh = RenderMesh::from_mesh(&self.device, &scene_mesh.mesh);
            let render_mesh_id = self.render_meshes.alloc(render_mesh);
            scene_mesh.render_mesh = Some(render_mesh_id);
            log::info!(
                "Uploaded mesh {} ({} indices)",
                scene_mesh.name,
                scene_mesh.mesh.indices.len()
            );
        }
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let common = self.common.as_ref();
        let mut config = common.output_surface_config.write().unwrap();

        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            config.width = new_size.width;
            config.height = new_size.height;
            self.depth_texture.resize(&self.device, new_size);
            self.surface.configure(&self.device, &config);
            self.camera.update_resolution(new_size);
        }
    }

    pub fn render(&mut self, demo_state: &mut DemoState) -> Result<(), wgpu::SurfaceError> {
        self.shader_loader.load_pending_shaders();

        self.camera.update_camera(&demo_state.camera);
        self.camera.update_uniform_buffer(&self.queue);
        self.common.global_uniform.update(
            &self.queue,
            GlobalUniformState::new(
                self.size,
                demo_state.start_time.elapsed().as_secs_f32(),
                demo_state.light.direction,
                demo_state.light.intensity,
            ),
        );

        gather_instances(&mut demo_state.scene);

        for (_id, scene_mesh) in demo_state.scene.meshes.iter() {
            if let Some(render_mesh_id) = scene_mesh.render_mesh {
                scene_mesh
                    .instances()
                    .write_to_buffer(&self.queue, &self.render_meshes[render_mesh_id].instance_buffer);
            }
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let texture_views = ScenePassTextureViews {
            color: view,
            depth: self.depth_texture.view().clone(),
        };

        let scene = &demo_state.scene;
        let render_meshes = &self.render_meshes;

        self.scene_pass.render(
            &texture_views,
            &mut encoder,
            &self.shader_loader.cache,
            &self.common,
            |render_pass| draw_topology(render_pass, scene, render_meshes, Topology::Triangles),
            |render_pass| draw_topology(render_pass, scene, render_meshes, Topology::Lines),
        );

        let command_buffer = encoder.finish();

        self.queue.submit([command_buffer]);

        output.present();

        Ok(())
    }
}

fn draw_topology(
    render_pass: &mut wgpu::RenderPass<'_>,
    scene: &Scene,
    render_meshes: &Arena<RenderMesh>,
    topology: Topology,
) {
    for (_id, scene_mesh) in scene.meshes.iter() {
        let Some(render_mesh_id) = scene_mesh.render_mesh else {
            continue;
        };
        let render_mesh = &render_meshes[render_mesh_id];

        if render_mesh.topology != topology || !scene_mesh.instances().should_render() {
            continue;
        }

        draw_mesh_instances(render_pass, render_mesh, scene_mesh.instances().len() as u32);
    }
}

/// Rebuilds every mesh's instance list from the objects referencing it, using
/// the world matrices produced by this frame's transform propagation.
fn gather_instances(scene: &mut Scene) {
    let Scene { objects, meshes } = scene;

    for (_id, scene_mesh) in meshes.iter_mut() {
        scene_mesh.clear_instances();
    }

    for (_id, object) in objects.iter() {
        let Some(mesh_id) = object.mesh_id else {
            continue;
        };

        if let Some(scene_mesh) = meshes.get_mut(mesh_id) {
            scene_mesh.add_instance(Instance {
                model: *object.transform.get_world_matrix(),
                color: object.color,
            });
        }
    }
}
