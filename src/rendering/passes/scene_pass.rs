use std::sync::Arc;

use wgpu::{
    DepthBiasState, Device, MultisampleState, PipelineCompilationOptions, RenderPassDescriptor,
    ShaderSource, StencilState,
};

use crate::rendering::{
    instance::Instance,
    render_common::RenderCommon,
    render_mesh::{LINE_PRIMITIVE_STATE, MESH_PRIMITIVE_STATE, RENDER_MESH_VBL},
    shader_loader::{PipelineCache, PipelineCacheBuilder, RenderPipelineId, ShaderDefinition},
    texture::DepthTexture,
};

// Room backdrop, 0x505050 in linear space
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.078,
    g: 0.078,
    b: 0.078,
    a: 1.0,
};

const MESH_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Mesh Shader",
    path: "mesh.wgsl",
};

const LINE_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Line Shader",
    path: "line.wgsl",
};

/// The single forward pass of the demo: lit triangle meshes first, then the
/// room lattice and controller pointers as unlit lines.
pub struct ScenePass {
    mesh_pipeline_id: RenderPipelineId,
    line_pipeline_id: RenderPipelineId,
    camera_bind_group: wgpu::BindGroup,
}

pub struct ScenePassTextureViews {
    pub color: wgpu::TextureView,
    pub depth: wgpu::TextureView,
}

impl ScenePass {
    pub fn create(
        device: &wgpu::Device,
        common: Arc<RenderCommon>,
        cache_builder: &mut PipelineCacheBuilder,
    ) -> anyhow::Result<Self> {
        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("camera_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: common.camera_uniform_buffer.as_entire_binding(),
            }],
        });

        let render_pipeline_layout = Arc::new(device.create_pipeline_layout(
            &wgpu::PipelineLayoutDescriptor {
                label: Some("Scene pass pipeline layout"),
                bind_group_layouts: &[
                    &camera_bind_group_layout,
                    &common.global_uniform.bind_group_layout,
                ],
                push_constant_ranges: &[],
            },
        ));

        let surface_format = common.output_surface_config.read().unwrap().format;

        let mesh_pipeline_layout = render_pipeline_layout.clone();
        let mesh_pipeline_id = cache_builder.add_shader(
            MESH_SHADER,
            Box::new(
                move |device: &Device, definition: &ShaderDefinition, source: &str| {
                    build_pipeline(
                        device,
                        definition,
                        source,
                        &mesh_pipeline_layout,
                        surface_format,
                        MESH_PRIMITIVE_STATE,
                    )
                },
            ),
        );

        let line_pipeline_layout = render_pipeline_layout;
        let line_pipeline_id = cache_builder.add_shader(
            LINE_SHADER,
            Box::new(
                move |device: &Device, definition: &ShaderDefinition, source: &str| {
                    build_pipeline(
                        device,
                        definition,
                        source,
                        &line_pipeline_layout,
                        surface_format,
                        LINE_PRIMITIVE_STATE,
                    )
                },
            ),
        );

        Ok(ScenePass {
            mesh_pipeline_id,
            line_pipeline_id,
            camera_bind_group,
        })
    }

    pub fn render<FMeshes, FLines>(
        &self,
        texture_views: &ScenePassTextureViews,
        encoder: &mut wgpu::CommandEncoder,
        pipeline_cache: &PipelineCache,
        common: &RenderCommon,
        mut draw_meshes: FMeshes,
        mut draw_lines: FLines,
    ) where
        FMeshes: FnMut(&mut wgpu::RenderPass<'_>),
        FLines: FnMut(&mut wgpu::RenderPass<'_>),
    {
        let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &texture_views.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &texture_views.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_bind_group(1, &common.global_uniform.bind_group, &[]);

        render_pass.set_pipeline(pipeline_cache.get(self.mesh_pipeline_id));
        draw_meshes(&mut render_pass);

        render_pass.set_pipeline(pipeline_cache.get(self.line_pipeline_id));
        draw_lines(&mut render_pass);
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    definition: &ShaderDefinition,
    source: &str,
    layout: &wgpu::PipelineLayout,
    surface_format: wgpu::TextureFormat,
    primitive: wgpu::PrimitiveState,
) -> anyhow::Result<wgpu::RenderPipeline> {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(definition.name),
        source: ShaderSource::Wgsl(source.into()),
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(definition.name),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[RENDER_MESH_VBL, Instance::descriptor()],
            compilation_options: PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: PipelineCompilationOptions::default(),
        }),
        primitive,
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthTexture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    Ok(pipeline)
}
