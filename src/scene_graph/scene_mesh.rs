use id_arena::Id;

use crate::mesh::Mesh;
use crate::rendering::instance::{Instance, Instances};
use crate::rendering::render_mesh::RenderMeshId;

pub type SceneMeshId = Id<SceneMesh>;

/// Geometry shared by any number of scene objects. The GPU-side handle is
/// filled in once the renderer has uploaded the mesh; the instance list is
/// rebuilt every frame from the objects referencing it.
pub struct SceneMesh {
    pub name: String,
    pub mesh: Mesh,
    pub render_mesh: Option<RenderMeshId>,
    instances: Instances,
}

impl SceneMesh {
    pub fn new(mesh: Mesh) -> Self {
        Self {
            name: mesh.name.clone(),
            mesh,
            render_mesh: None,
            instances: Instances::new(),
        }
    }

    pub fn instances(&self) -> &Instances {
        &self.instances
    }

    pub fn add_instance(&mut self, instance: Instance) {
        self.instances.add(instance);
    }

    pub fn clear_instances(&mut self) {
        self.instances.clear();
    }
}
