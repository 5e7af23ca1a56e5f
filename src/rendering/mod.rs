pub mod global_uniform;
pub mod instance;
pub mod passes;
pub mod render_camera;
pub mod render_common;
pub mod render_mesh;
pub mod renderer;
pub mod shader_loader;
pub mod texture;
