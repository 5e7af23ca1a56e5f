use anyhow::Result;

mod camera;
mod demo;
mod engine;
mod interaction;
mod math;
mod mesh;
mod rendering;
mod scene_graph;
mod tween;
mod window;

fn main() -> Result<()> {
    pretty_env_logger::init();

    pollster::block_on(window::run())?;

    Ok(())
}
