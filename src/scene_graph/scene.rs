use glam::{Mat4, Quat, Vec3};
use id_arena::Arena;

use crate::math::ray::Ray;
use crate::mesh::Mesh;
use crate::scene_graph::object3d::{Object3D, ObjectId};
use crate::scene_graph::scene_mesh::{SceneMesh, SceneMeshId};

pub struct Scene {
    pub objects: Arena<Object3D>,
    pub meshes: Arena<SceneMesh>,
}

#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub object: ObjectId,
    pub distance: f32,
    pub point: Vec3,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Arena::new(),
            meshes: Arena::new(),
        }
    }

    pub fn add_object(&mut self, object: Object3D) -> ObjectId {
        self.objects.alloc(object)
    }

    /// Adds an object directly under an existing parent.
    pub fn add_child(&mut self, parent_id: ObjectId, object: Object3D) -> ObjectId {
        let object_id = self.add_object(object);
        self.set_object_parent(object_id, Some(parent_id));
        object_id
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    pub fn get_object_mut(&mut self, id: ObjectId) -> Option<&mut Object3D> {
        self.objects.get_mut(id)
    }

    #[allow(dead_code)]
    pub fn get_object_by_name(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|(_, object)| object.name == name)
            .map(|(id, _)| id)
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> SceneMeshId {
        self.meshes.alloc(SceneMesh::new(mesh))
    }

    /// Sets the parent of an object and updates child relationships
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) {
        // Remove from old parent's children list
        if let Some(child) = self.objects.get(child_id) {
            if let Some(old_parent_id) = child.parent_id {
                if let Some(old_parent) = self.objects.get_mut(old_parent_id) {
                    old_parent.child_ids.retain(|&id| id != child_id);
                }
            }
        }

        // Set new parent and add to new parent's children list
        if let Some(child) = self.objects.get_mut(child_id) {
            child.parent_id = new_parent_id;

            if let Some(new_parent_id) = new_parent_id {
                if let Some(new_parent) = self.objects.get_mut(new_parent_id) {
                    new_parent.child_ids.push(child_id);
                }
            }
        }

        // Invalidate world transforms for the moved object and its descendants
        self.invalidate_object_hierarchy(child_id);
    }

    /// Re-parents an object while preserving its world transform: the local
    /// TRS is recomputed against the new parent so the rendered pose is
    /// unchanged at the instant of transfer.
    pub fn attach(&mut self, child_id: ObjectId, new_parent_id: ObjectId) {
        let child_world = self.world_matrix_of(child_id);
        let parent_world = self.world_matrix_of(new_parent_id);
        let local = parent_world.inverse() * child_world;
        let (scale, rotation, translation) = local.to_scale_rotation_translation();

        if let Some(child) = self.objects.get_mut(child_id) {
            // Uniform-scale scene graph; the decomposed axes are all equal
            child.transform.set_transform(translation, rotation, scale.x);
        }

        self.set_object_parent(child_id, Some(new_parent_id));
    }

    /// World matrix computed on demand from the local transform chain, valid
    /// even before this frame's transform propagation has run.
    pub fn world_matrix_of(&self, id: ObjectId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(id);

        while let Some(object) = current.and_then(|id| self.objects.get(id)) {
            matrix = *object.transform.get_local_matrix() * matrix;
            current = object.parent_id;
        }

        matrix
    }

    /// Tests the ray against every descendant of `root` that carries a mesh,
    /// nearest hit first. `root` itself is not tested.
    pub fn raycast(&self, ray: &Ray, root: ObjectId) -> Vec<RayHit> {
        let mut hits = Vec::new();

        if let Some(root_object) = self.objects.get(root) {
            for &child_id in &root_object.child_ids {
                self.raycast_recursive(ray, child_id, &mut hits);
            }
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn raycast_recursive(&self, ray: &Ray, id: ObjectId, hits: &mut Vec<RayHit>) {
        let Some(object) = self.objects.get(id) else {
            return;
        };

        if let Some(scene_mesh) = object.mesh_id.and_then(|mesh_id| self.meshes.get(mesh_id)) {
            let bounds = scene_mesh.mesh.bounds.transform(&self.world_matrix_of(id));
            if let Some(distance) = ray.intersect_sphere(&bounds) {
                hits.push(RayHit {
                    object: id,
                    distance,
                    point: ray.at(distance),
                });
            }
        }

        for &child_id in &object.child_ids {
            self.raycast_recursive(ray, child_id, hits);
        }
    }

    pub fn set_object_transform(
        &mut self,
        object_id: ObjectId,
        translation: Vec3,
        rotation: Quat,
        scale: f32,
    ) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_transform(translation, rotation, scale);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn set_object_scale(&mut self, object_id: ObjectId, scale: f32) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_scale(scale);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    /// Invalidates world transforms for an object and all its descendants
    fn invalidate_object_hierarchy(&self, object_id: ObjectId) {
        if let Some(object) = self.objects.get(object_id) {
            object.transform.invalidate_world();

            for &child_id in &object.child_ids {
                self.invalidate_object_hierarchy(child_id);
            }
        }
    }

    pub fn late_update(&mut self) {
        self.update_transforms();
    }

    /// Updates all object transforms in hierarchical order
    fn update_transforms(&self) {
        let root_objects = self.objects.iter().filter_map(|(id, object)| {
            if object.parent_id.is_none() {
                Some(id)
            } else {
                None
            }
        });

        for root_id in root_objects {
            self.update_object_transform_recursive(root_id, Mat4::IDENTITY);
        }
    }

    fn update_object_transform_recursive(&self, object_id: ObjectId, parent_world_matrix: Mat4) {
        if let Some(object) = self.objects.get(object_id) {
            if object.transform.is_world_dirty() {
                let local_matrix = *object.transform.get_local_matrix();
                let world_matrix = parent_world_matrix * local_matrix;
                object.transform.set_world_matrix(world_matrix);
            }

            let world_matrix = *object.transform.get_world_matrix();
            for &child_id in &object.child_ids {
                self.update_object_transform_recursive(child_id, world_matrix);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh;

    fn transform_object(name: &str, translation: Vec3, rotation: Quat) -> Object3D {
        let mut object = Object3D::named(name);
        object.transform.set_transform(translation, rotation, 1.0);
        object
    }

    #[test]
    fn reparenting_keeps_a_single_parent() {
        let mut scene = Scene::new();
        let parent_a = scene.add_object(Object3D::named("A"));
        let parent_b = scene.add_object(Object3D::named("B"));
        let child = scene.add_child(parent_a, Object3D::named("Child"));

        scene.set_object_parent(child, Some(parent_b));

        assert_eq!(scene.get_object(child).unwrap().parent_id, Some(parent_b));
        assert!(!scene.get_object(parent_a).unwrap().child_ids.contains(&child));
        assert!(scene.get_object(parent_b).unwrap().child_ids.contains(&child));
    }

    #[test]
    fn attach_preserves_world_transform() {
        let mut scene = Scene::new();
        let world = scene.add_object(Object3D::named("World"));
        let group = scene.add_child(
            world,
            transform_object(
                "Group",
                Vec3::new(0.3, 1.5, -1.0),
                Quat::from_rotation_y(0.7),
            ),
        );
        let controller = scene.add_object(transform_object(
            "Controller",
            Vec3::new(0.1, 1.4, 0.2),
            Quat::from_rotation_x(-0.4),
        ));

        let before = scene.world_matrix_of(group);
        scene.attach(group, controller);
        let after = scene.world_matrix_of(group);

        assert_eq!(scene.get_object(group).unwrap().parent_id, Some(controller));
        assert!(before.abs_diff_eq(after, 1e-4));

        // Round trip back to the world frame
        scene.attach(group, world);
        let restored = scene.world_matrix_of(group);

        assert_eq!(scene.get_object(group).unwrap().parent_id, Some(world));
        assert!(before.abs_diff_eq(restored, 1e-4));
    }

    #[test]
    fn group_scale_propagates_to_children() {
        let mut scene = Scene::new();
        let group = scene.add_object(Object3D::named("Group"));
        let child = scene.add_child(group, transform_object("Child", Vec3::X, Quat::IDENTITY));

        scene.set_object_scale(group, 2.0);
        scene.late_update();

        let world = *scene.get_object(child).unwrap().transform.get_world_matrix();
        let (scale, _, translation) = world.to_scale_rotation_translation();

        assert!((scale - Vec3::splat(2.0)).length() < 1e-5);
        assert!((translation - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn raycast_orders_hits_by_distance() {
        let mut scene = Scene::new();
        let sphere_mesh = scene.add_mesh(mesh::uv_sphere("Sphere", 0.5, 8, 12));

        let world = scene.add_object(Object3D::named("World"));
        let near = scene.add_child(world, {
            let mut object = Object3D::with_mesh("Near", sphere_mesh, glam::Vec4::ONE);
            object.transform.set_translation(Vec3::new(0.0, 0.0, -2.0));
            object
        });
        let far = scene.add_child(world, {
            let mut object = Object3D::with_mesh("Far", sphere_mesh, glam::Vec4::ONE);
            object.transform.set_translation(Vec3::new(0.0, 0.0, -5.0));
            object
        });

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let hits = scene.raycast(&ray, world);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].object, near);
        assert_eq!(hits[1].object, far);
        assert!(hits[0].distance < hits[1].distance);
    }

    #[test]
    fn raycast_miss_is_empty() {
        let mut scene = Scene::new();
        let sphere_mesh = scene.add_mesh(mesh::uv_sphere("Sphere", 0.5, 8, 12));

        let world = scene.add_object(Object3D::named("World"));
        scene.add_child(world, {
            let mut object = Object3D::with_mesh("Sphere", sphere_mesh, glam::Vec4::ONE);
            object.transform.set_translation(Vec3::new(0.0, 5.0, -2.0));
            object
        });

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(scene.raycast(&ray, world).is_empty());
    }

    #[test]
    fn objects_found_by_name() {
        let mut scene = Scene::new();
        let id = scene.add_object(Object3D::named("Oxygen"));

        assert_eq!(scene.get_object_by_name("Oxygen"), Some(id));
        assert_eq!(scene.get_object_by_name("Carbon"), None);
    }
}
