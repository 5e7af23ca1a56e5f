pub mod object3d;
pub mod scene;
pub mod scene_mesh;
pub mod transform;

// Re-export main types for convenience
pub use object3d::{Object3D, ObjectId};
pub use scene::{RayHit, Scene};
pub use scene_mesh::{SceneMesh, SceneMeshId};
pub use transform::Transform;
