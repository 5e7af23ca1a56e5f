use glam::{Vec3, Vec4};
use id_arena::Id;

use crate::scene_graph::scene_mesh::SceneMeshId;
use crate::scene_graph::transform::Transform;

pub type ObjectId = Id<Object3D>;

pub struct Object3D {
    pub name: String,
    pub transform: Transform,
    pub mesh_id: Option<SceneMeshId>,
    pub color: Vec4,
    pub parent_id: Option<ObjectId>,
    pub child_ids: Vec<ObjectId>,
}

impl Object3D {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_mesh(name: impl Into<String>, mesh_id: SceneMeshId, color: Vec4) -> Self {
        Self {
            name: name.into(),
            mesh_id: Some(mesh_id),
            color,
            ..Default::default()
        }
    }
}

impl Default for Object3D {
    fn default() -> Self {
        Self {
            name: String::new(),
            transform: Transform::from_translation(Vec3::ZERO),
            mesh_id: None,
            color: Vec4::ONE,
            parent_id: None,
            child_ids: Vec::new(),
        }
    }
}
