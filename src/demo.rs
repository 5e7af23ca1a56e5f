use std::f32::consts::FRAC_PI_2;
use std::time::Instant;

use glam::{EulerRot, Quat, Vec2, Vec3, Vec4};

use crate::camera::Camera;
use crate::interaction::{Interaction, SelectEvent};
use crate::math::bounds::Aabb;
use crate::mesh;
use crate::scene_graph::{Object3D, ObjectId, Scene, SceneMeshId};
use crate::tween::{Channel, Easing};

pub const BASE_SCALE: f32 = 1.0;
pub const ENLARGED_SCALE: f32 = 10.0;
const SCALE_TWEEN_SECONDS: f32 = 1.0;

const HYDROGEN_RADIUS: f32 = 0.1;
const OXYGEN_RADIUS: f32 = 0.125;
const BOND_RADIUS: f32 = 0.02;
const BOND_LENGTH: f32 = 0.35;

const ROOM_SIZE: f32 = 6.0;
const ROOM_SEGMENTS: u32 = 30;

pub struct DirectionalLight {
    pub direction: Vec3,
    pub intensity: f32,
}

pub struct DemoState {
    pub camera: Camera,
    pub start_time: Instant,
    pub scene: Scene,
    pub light: DirectionalLight,
    pub interaction: Interaction,
    world_group: ObjectId,
    molecule_group: ObjectId,
    scale: Channel,
}

impl DemoState {
    pub fn new() -> Self {
        let camera = Camera {
            eye: Vec3::new(0.0, 1.6, -1.0),
            target: Vec3::new(0.0, 1.6, 0.0),
            up: Vec3::Y,
            fov_y_degrees: 50.0,
            z_near: 0.1,
            z_far: 10.0,
        };

        // Shining straight down from above the room
        let light = DirectionalLight {
            direction: Vec3::NEG_Y,
            intensity: 3.0,
        };

        let mut scene = Scene::new();

        // Room lattice
        let room_mesh = scene.add_mesh(mesh::box_line_grid(
            "Room",
            ROOM_SIZE,
            ROOM_SIZE,
            ROOM_SIZE,
            ROOM_SEGMENTS,
        ));
        let mut room = Object3D::with_mesh("Room", room_mesh, srgb(0xbc, 0xbc, 0xbc));
        room.transform.set_translation(Vec3::new(0.0, 2.0, 0.0));
        scene.add_object(room);

        // Floor
        let floor_mesh = scene.add_mesh(mesh::plane("Floor", ROOM_SIZE, ROOM_SIZE));
        let mut floor = Object3D::with_mesh("Floor", floor_mesh, srgb(0x80, 0x80, 0x80));
        floor.transform.set_translation(Vec3::new(0.0, 0.1, 0.0));
        scene.add_object(floor);

        // Grabbable content lives under the world group
        let world_group = scene.add_object(Object3D::named("World"));
        let molecule_group = scene.add_child(world_group, Object3D::named("Molecules"));

        let hydrogen_mesh =
            scene.add_mesh(mesh::uv_sphere("Hydrogen", HYDROGEN_RADIUS, 16, 24));
        let oxygen_mesh = scene.add_mesh(mesh::uv_sphere("Oxygen", OXYGEN_RADIUS, 16, 24));
        let bond_mesh = scene.add_mesh(mesh::cylinder("Bond", BOND_RADIUS, BOND_LENGTH, 16));

        let molecule1 = scene.add_child(molecule_group, {
            let mut molecule = Object3D::named("Molecule 1");
            molecule.transform.set_transform(
                Vec3::new(-0.2, 1.5, -1.0),
                Quat::from_rotation_y(FRAC_PI_2),
                1.0,
            );
            molecule
        });
        spawn_water(&mut scene, molecule1, hydrogen_mesh, oxygen_mesh);

        let mut bond = Object3D::with_mesh("Bond", bond_mesh, srgb(0x00, 0xff, 0xff));
        bond.transform.set_transform(
            Vec3::new(0.0, 0.075, 0.3),
            Quat::from_rotation_x(FRAC_PI_2),
            1.0,
        );
        scene.add_child(molecule1, bond);

        let molecule2 = scene.add_child(molecule_group, {
            let mut molecule = Object3D::named("Molecule 2");
            molecule.transform.set_transform(
                Vec3::new(0.2, 1.5, -1.0),
                Quat::from_euler(EulerRot::XYZ, FRAC_PI_2, FRAC_PI_2, 0.0),
                1.0,
            );
            molecule
        });
        spawn_water(&mut scene, molecule2, hydrogen_mesh, oxygen_mesh);

        // Put the group origin at its visual center so grabbing and scaling
        // pivot around the molecules instead of the world origin
        center_group_children(&mut scene, molecule_group);

        // Controllers, with a short pointer ray each
        let pointer_mesh =
            scene.add_mesh(mesh::line_segment("Pointer", Vec3::ZERO, Vec3::NEG_Z * 0.5));
        let left = scene.add_object(Object3D::with_mesh("Left Controller", pointer_mesh, Vec4::ONE));
        let right =
            scene.add_object(Object3D::with_mesh("Right Controller", pointer_mesh, Vec4::ONE));

        Self {
            camera,
            start_time: Instant::now(),
            scene,
            light,
            interaction: Interaction::new(left, right),
            world_group,
            molecule_group,
            scale: Channel::new(BASE_SCALE),
        }
    }

    /// Points both controller nodes along the cursor ray. Stands in for the
    /// per-frame controller poses an XR session would provide.
    pub fn aim_controllers(&mut self, cursor: Vec2, resolution: Vec2) {
        if resolution.x <= 0.0 || resolution.y <= 0.0 {
            return;
        }

        let ray = self.camera.screen_ray(cursor, resolution);
        let rotation = Quat::from_rotation_arc(Vec3::NEG_Z, ray.direction);

        for controller in self.interaction.controllers() {
            self.scene
                .set_object_transform(controller.object, ray.origin, rotation, 1.0);
        }
    }

    pub fn select_start(&mut self, event: SelectEvent) {
        let elapsed = self.start_time.elapsed().as_secs_f32();
        self.interaction.on_select_start(
            &mut self.scene,
            self.world_group,
            self.molecule_group,
            elapsed,
            event,
        );
    }

    pub fn select_end(&mut self, event: SelectEvent) {
        self.interaction
            .on_select_end(&mut self.scene, self.world_group, self.molecule_group, event);
    }

    pub fn update(&mut self, dt: f32) {
        // The double-click trigger fires at most once per frame
        if self.interaction.take_double_click() {
            let target = if self.interaction.enlarged() {
                ENLARGED_SCALE
            } else {
                BASE_SCALE
            };
            self.scale.tween_to(target, SCALE_TWEEN_SECONDS, Easing::BounceOut);
        }

        self.scale.tick(dt);
        self.scene
            .set_object_scale(self.molecule_group, self.scale.value());
    }
}

fn spawn_water(
    scene: &mut Scene,
    molecule: ObjectId,
    hydrogen_mesh: SceneMeshId,
    oxygen_mesh: SceneMeshId,
) {
    let white = srgb(0xff, 0xff, 0xff);
    let red = srgb(0xff, 0x00, 0x00);

    for (name, position) in [
        ("Hydrogen A", Vec3::new(-0.066, 0.0, 0.0)),
        ("Hydrogen B", Vec3::new(0.066, 0.0, 0.0)),
    ] {
        let mut hydrogen = Object3D::with_mesh(name, hydrogen_mesh, white);
        hydrogen.transform.set_translation(position);
        scene.add_child(molecule, hydrogen);
    }

    let mut oxygen = Object3D::with_mesh("Oxygen", oxygen_mesh, red);
    oxygen.transform.set_translation(Vec3::new(0.0, 0.075, 0.0));
    scene.add_child(molecule, oxygen);
}

/// Re-centers a group's children about their combined bounds and shifts the
/// group by the same amount, leaving every world pose unchanged.
fn center_group_children(scene: &mut Scene, group: ObjectId) {
    let mut bounds: Option<Aabb> = None;
    let child_ids = scene
        .get_object(group)
        .map(|object| object.child_ids.clone())
        .unwrap_or_default();

    for &child_id in &child_ids {
        collect_bounds(scene, child_id, &mut bounds);
    }

    let Some(bounds) = bounds else {
        return;
    };
    let center = bounds.center();

    for child_id in child_ids {
        if let Some((translation, rotation, scale)) = transform_parts(scene, child_id) {
            scene.set_object_transform(child_id, translation - center, rotation, scale);
        }
    }

    if let Some((translation, rotation, scale)) = transform_parts(scene, group) {
        scene.set_object_transform(group, translation + center, rotation, scale);
    }
}

fn transform_parts(scene: &Scene, id: ObjectId) -> Option<(Vec3, Quat, f32)> {
    scene.get_object(id).map(|object| {
        let transform = &object.transform;
        (transform.translation(), transform.rotation(), transform.scale())
    })
}

fn collect_bounds(scene: &Scene, id: ObjectId, bounds: &mut Option<Aabb>) {
    let Some(object) = scene.get_object(id) else {
        return;
    };

    if let Some(scene_mesh) = object.mesh_id.and_then(|mesh_id| scene.meshes.get(mesh_id)) {
        let sphere = scene_mesh.mesh.bounds.transform(&scene.world_matrix_of(id));
        let aabb = sphere.aabb();
        *bounds = Some(match bounds {
            Some(existing) => existing.union(&aabb),
            None => aabb,
        });
    }

    for &child_id in &object.child_ids {
        collect_bounds(scene, child_id, bounds);
    }
}

fn srgb(r: u8, g: u8, b: u8) -> Vec4 {
    fn channel(value: u8) -> f32 {
        (value as f32 / 255.0).powf(2.2)
    }

    Vec4::new(channel(r), channel(g), channel(b), 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{Hand, TargetRayMode};

    #[test]
    fn molecule_group_is_centered_after_setup() {
        let state = DemoState::new();

        let mut bounds = None;
        let group = state.scene.get_object(state.molecule_group).unwrap();
        for &child_id in &group.child_ids {
            collect_bounds(&state.scene, child_id, &mut bounds);
        }

        // In the group's local frame the content now straddles the origin
        let world = state.scene.world_matrix_of(state.molecule_group);
        let center_world = bounds.unwrap().center();
        let center_local = world.inverse().transform_point3(center_world);

        assert!(center_local.length() < 1e-3);
    }

    #[test]
    fn double_click_tweens_the_group_scale() {
        let mut state = DemoState::new();

        // Aim the left controller at the molecules, then click twice
        let left = state.interaction.controller(Hand::Left).object;
        state
            .scene
            .set_object_transform(left, Vec3::new(0.0, 1.5, 0.0), Quat::IDENTITY, 1.0);

        let event = SelectEvent {
            hand: Hand::Left,
            target_ray_mode: TargetRayMode::TrackedPointer,
        };

        state.select_start(event);
        state.select_end(event);
        state.select_start(event);
        assert!(state.interaction.enlarged());

        // Run the tween to completion
        for _ in 0..10 {
            state.update(0.2);
        }

        let group = state.scene.get_object(state.molecule_group).unwrap();
        assert_eq!(group.transform.scale(), ENLARGED_SCALE);
    }
}
