use std::{
    path::Path,
    sync::{
        mpsc::{channel, Receiver},
        Arc,
    },
    time::Duration,
};

use anyhow::Context;
use notify_debouncer_mini::{
    new_debouncer_opt,
    notify::{RecommendedWatcher, RecursiveMode, Watcher},
    DebounceEventResult, DebouncedEventKind, Debouncer,
};
use pollster::block_on;
use wgpu::PollType;

const SHADER_FOLDER: &str = "src/shaders";

#[derive(Debug, Clone, Copy)]
pub struct ShaderDefinition {
    pub name: &'static str,
    pub path: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderPipelineId(usize);

pub type PipelineBuilder =
    Box<dyn Fn(&wgpu::Device, &ShaderDefinition, &str) -> anyhow::Result<wgpu::RenderPipeline> + Send + Sync>;

/// Render passes register their shaders here; the loader compiles everything
/// up front and owns the rebuild recipe for hot reloads.
pub struct PipelineCacheBuilder {
    shaders: Vec<(ShaderDefinition, PipelineBuilder)>,
}

impl PipelineCacheBuilder {
    pub fn new() -> Self {
        Self {
            shaders: Vec::new(),
        }
    }

    pub fn add_shader(
        &mut self,
        definition: ShaderDefinition,
        builder: PipelineBuilder,
    ) -> RenderPipelineId {
        self.shaders.push((definition, builder));
        RenderPipelineId(self.shaders.len() - 1)
    }
}

pub struct PipelineCache {
    pipelines: Vec<wgpu::RenderPipeline>,
}

impl PipelineCache {
    pub fn get(&self, id: RenderPipelineId) -> &wgpu::RenderPipeline {
        &self.pipelines[id.0]
    }
}

// Compiles shaders from disk and recompiles them when the files change.
// Rebuilt pipelines arrive over a channel and are swapped in between frames.
pub struct ShaderLoader {
    pub cache: PipelineCache,
    receiver: Receiver<(RenderPipelineId, wgpu::RenderPipeline)>,
    _debouncer: Debouncer<RecommendedWatcher>,
}

impl ShaderLoader {
    pub fn new(device: wgpu::Device, builder: PipelineCacheBuilder) -> anyhow::Result<Self> {
        let shaders = Arc::new(builder.shaders);

        let (send_changed_shaders, recv_changed_shaders) = channel();

        let watcher_shaders = shaders.clone();
        let watcher_device = device.clone();

        let mut debouncer = new_debouncer_opt(
            notify_debouncer_mini::Config::default().with_timeout(Duration::from_millis(100)),
            move |res: DebounceEventResult| match res {
                Ok(events) => {
                    for event in events {
                        if event.kind != DebouncedEventKind::Any {
                            continue;
                        }

                        for (index, (definition, pipeline_builder)) in
                            watcher_shaders.iter().enumerate()
                        {
                            if !event.path.ends_with(definition.path) {
                                continue;
                            }

                            log::info!("Reloading shader: {}", definition.name);
                            match compile_file(&watcher_device, definition, pipeline_builder) {
                                Ok(pipeline) => {
                                    // A dropped receiver just means the renderer is gone
                                    let _ = send_changed_shaders
                                        .send((RenderPipelineId(index), pipeline));
                                }
                                Err(e) => log::error!("Failed to reload shader: {}", e),
                            }
                        }
                    }
                }
                Err(e) => log::error!("Error debouncing shader changes: {}", e),
            },
        )
        .context("Failed to create shader watcher")?;

        let absolute_shader_folder = Path::new(SHADER_FOLDER)
            .canonicalize()
            .context("Failed to resolve the shader folder")?;

        debouncer
            .watcher()
            .watch(&absolute_shader_folder, RecursiveMode::Recursive)
            .context("Failed to watch the shader folder")?;

        let mut pipelines = Vec::with_capacity(shaders.len());
        for (definition, pipeline_builder) in shaders.iter() {
            pipelines.push(compile_file(&device, definition, pipeline_builder)?);
        }

        Ok(Self {
            cache: PipelineCache { pipelines },
            receiver: recv_changed_shaders,
            _debouncer: debouncer,
        })
    }

    pub fn load_pending_shaders(&mut self) {
        while let Ok((id, pipeline)) = self.receiver.try_recv() {
            self.cache.pipelines[id.0] = pipeline;
        }
    }
}

fn compile_file(
    device: &wgpu::Device,
    definition: &ShaderDefinition,
    builder: &PipelineBuilder,
) -> anyhow::Result<wgpu::RenderPipeline> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let path = Path::new(SHADER_FOLDER).join(definition.path);
    let shader_code = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read shader file {}: {}", path.display(), e))?;
    let pipeline = builder(device, definition, &shader_code);

    device
        .poll(PollType::Wait)
        .context("Failed to poll device after shader compilation.")?;

    let error = block_on(device.pop_error_scope());

    if let Some(error) = error {
        return Err(anyhow::anyhow!(
            "Shader compilation failed for {}: {}",
            definition.name,
            error
        ));
    };

    pipeline
}
