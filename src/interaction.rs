use crate::math::ray::Ray;
use crate::scene_graph::{ObjectId, Scene};

/// Two select-start events closer together than this count as a double click.
pub const DOUBLE_CLICK_WINDOW: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    fn index(self) -> usize {
        match self {
            Hand::Left => 0,
            Hand::Right => 1,
        }
    }
}

/// How the platform derived the select ray, as reported by the XR input
/// source. Recorded per controller but not otherwise interpreted.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRayMode {
    Gaze,
    TrackedPointer,
    Screen,
}

#[derive(Debug, Clone, Copy)]
pub struct SelectEvent {
    pub hand: Hand,
    pub target_ray_mode: TargetRayMode,
}

pub struct Controller {
    /// Scene node the controller pose drives; grabbed objects attach under it.
    pub object: ObjectId,
    pub held: Option<ObjectId>,
    pub target_ray_mode: Option<TargetRayMode>,
}

impl Controller {
    fn new(object: ObjectId) -> Controller {
        Controller {
            object,
            held: None,
            target_ray_mode: None,
        }
    }
}

/// Grab-and-scale input state. Select events move the grab target between the
/// world frame and a controller frame; quick successive selects arm a
/// single-shot double-click trigger that the per-frame update consumes.
pub struct Interaction {
    controllers: [Controller; 2],
    click_time: Option<f32>,
    double_click: bool,
    enlarged: bool,
}

impl Interaction {
    pub fn new(left_object: ObjectId, right_object: ObjectId) -> Interaction {
        Interaction {
            controllers: [Controller::new(left_object), Controller::new(right_object)],
            click_time: None,
            double_click: false,
            enlarged: false,
        }
    }

    pub fn controllers(&self) -> &[Controller; 2] {
        &self.controllers
    }

    pub fn controller(&self, hand: Hand) -> &Controller {
        &self.controllers[hand.index()]
    }

    fn controller_mut(&mut self, hand: Hand) -> &mut Controller {
        &mut self.controllers[hand.index()]
    }

    /// Select-start: update the double-click window, then try to grab. A ray
    /// is cast from the controller's pose along its forward axis against the
    /// world group's descendants; on a hit the whole grab target group (not
    /// the hit sub-mesh) moves under the controller, keeping its world pose.
    pub fn on_select_start(
        &mut self,
        scene: &mut Scene,
        world_group: ObjectId,
        grab_target: ObjectId,
        elapsed: f32,
        event: SelectEvent,
    ) {
        let click_delta = self
            .click_time
            .map_or(f32::INFINITY, |previous| elapsed - previous);
        self.double_click = click_delta < DOUBLE_CLICK_WINDOW;
        self.click_time = Some(elapsed);

        let controller_object = self.controller(event.hand).object;
        let ray = Ray::from_pointer(&scene.world_matrix_of(controller_object));
        let hits = scene.raycast(&ray, world_group);

        if let Some(hit) = hits.first() {
            log::debug!(
                "{:?} grabbed {:?} at {:.3} ({:?})",
                event.hand,
                hit.object,
                hit.distance,
                hit.point
            );

            scene.attach(grab_target, controller_object);

            if self.double_click {
                self.enlarged = !self.enlarged;
            }

            self.controller_mut(event.hand).held = Some(hit.object);
        }

        self.controller_mut(event.hand).target_ray_mode = Some(event.target_ray_mode);
    }

    /// Select-end: a controller holding a reference hands the grab target
    /// back to the world frame, keeping its world pose.
    pub fn on_select_end(
        &mut self,
        scene: &mut Scene,
        world_group: ObjectId,
        grab_target: ObjectId,
        event: SelectEvent,
    ) {
        let controller = self.controller_mut(event.hand);

        if controller.held.take().is_some() {
            scene.attach(grab_target, world_group);
        }
    }

    /// Single-shot edge trigger: true at most once per armed double click.
    pub fn take_double_click(&mut self) -> bool {
        std::mem::replace(&mut self.double_click, false)
    }

    pub fn enlarged(&self) -> bool {
        self.enlarged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh;
    use crate::scene_graph::Object3D;
    use glam::{Quat, Vec3, Vec4};

    struct Rig {
        scene: Scene,
        interaction: Interaction,
        world_group: ObjectId,
        molecule_group: ObjectId,
        sphere: ObjectId,
    }

    /// World group with a grabbable sphere two meters down the left
    /// controller's forward axis; the right controller points into empty
    /// space.
    fn rig() -> Rig {
        let mut scene = Scene::new();

        let world_group = scene.add_object(Object3D::named("World"));
        let molecule_group = scene.add_child(world_group, Object3D::named("Molecules"));

        let sphere_mesh = scene.add_mesh(mesh::uv_sphere("Sphere", 0.5, 8, 12));
        let sphere = scene.add_child(molecule_group, {
            let mut object = Object3D::with_mesh("Sphere", sphere_mesh, Vec4::ONE);
            object.transform.set_translation(Vec3::new(0.0, 0.0, -2.0));
            object
        });

        let left = scene.add_object(Object3D::named("Left Controller"));
        let right = scene.add_object({
            let mut object = Object3D::named("Right Controller");
            object
                .transform
                .set_transform(Vec3::new(50.0, 0.0, 0.0), Quat::IDENTITY, 1.0);
            object
        });

        Rig {
            scene,
            interaction: Interaction::new(left, right),
            world_group,
            molecule_group,
            sphere,
        }
    }

    fn select(rig: &mut Rig, hand: Hand, elapsed: f32) {
        let event = SelectEvent {
            hand,
            target_ray_mode: TargetRayMode::Screen,
        };
        rig.interaction.on_select_start(
            &mut rig.scene,
            rig.world_group,
            rig.molecule_group,
            elapsed,
            event,
        );
    }

    fn release(rig: &mut Rig, hand: Hand) {
        let event = SelectEvent {
            hand,
            target_ray_mode: TargetRayMode::Screen,
        };
        rig.interaction
            .on_select_end(&mut rig.scene, rig.world_group, rig.molecule_group, event);
    }

    #[test]
    fn grab_on_hit_reparents_group_under_controller() {
        let mut rig = rig();
        let before = rig.scene.world_matrix_of(rig.molecule_group);

        select(&mut rig, Hand::Left, 1.0);

        let controller_object = rig.interaction.controller(Hand::Left).object;
        let group = rig.scene.get_object(rig.molecule_group).unwrap();
        assert_eq!(group.parent_id, Some(controller_object));
        assert_eq!(rig.interaction.controller(Hand::Left).held, Some(rig.sphere));

        let after = rig.scene.world_matrix_of(rig.molecule_group);
        assert!(before.abs_diff_eq(after, 1e-4));
    }

    #[test]
    fn miss_leaves_everything_alone() {
        let mut rig = rig();

        select(&mut rig, Hand::Right, 1.0);

        let group = rig.scene.get_object(rig.molecule_group).unwrap();
        assert_eq!(group.parent_id, Some(rig.world_group));
        assert_eq!(rig.interaction.controller(Hand::Right).held, None);
    }

    #[test]
    fn release_returns_group_to_world() {
        let mut rig = rig();

        select(&mut rig, Hand::Left, 1.0);
        let held = rig.scene.world_matrix_of(rig.molecule_group);

        release(&mut rig, Hand::Left);

        let group = rig.scene.get_object(rig.molecule_group).unwrap();
        assert_eq!(group.parent_id, Some(rig.world_group));
        assert_eq!(rig.interaction.controller(Hand::Left).held, None);
        assert!(held.abs_diff_eq(rig.scene.world_matrix_of(rig.molecule_group), 1e-4));
    }

    #[test]
    fn release_without_grab_is_a_noop() {
        let mut rig = rig();
        release(&mut rig, Hand::Left);

        let group = rig.scene.get_object(rig.molecule_group).unwrap();
        assert_eq!(group.parent_id, Some(rig.world_group));
    }

    #[test]
    fn double_click_requires_a_short_delta() {
        let mut rig = rig();

        select(&mut rig, Hand::Left, 1.0);
        assert!(!rig.interaction.take_double_click());

        select(&mut rig, Hand::Left, 1.3);
        assert!(rig.interaction.take_double_click());
        // Consumed: the trigger is single-shot
        assert!(!rig.interaction.take_double_click());
    }

    #[test]
    fn delta_of_exactly_the_window_is_not_a_double_click() {
        let mut rig = rig();

        select(&mut rig, Hand::Left, 2.0);
        rig.interaction.take_double_click();

        select(&mut rig, Hand::Left, 2.0 + DOUBLE_CLICK_WINDOW);
        assert!(!rig.interaction.take_double_click());
    }

    #[test]
    fn enlarged_toggles_only_when_something_was_hit() {
        let mut rig = rig();

        // Double click into empty space: the trigger arms, the mode holds
        select(&mut rig, Hand::Right, 1.0);
        select(&mut rig, Hand::Right, 1.2);
        assert!(rig.interaction.take_double_click());
        assert!(!rig.interaction.enlarged());

        // Click, release, click on the sphere toggles
        select(&mut rig, Hand::Left, 2.0);
        release(&mut rig, Hand::Left);
        select(&mut rig, Hand::Left, 2.2);
        assert!(rig.interaction.enlarged());

        select(&mut rig, Hand::Left, 3.0);
        release(&mut rig, Hand::Left);
        select(&mut rig, Hand::Left, 3.2);
        assert!(!rig.interaction.enlarged());
    }

    #[test]
    fn held_group_is_out_of_reach_for_the_other_controller() {
        let mut rig = rig();

        select(&mut rig, Hand::Left, 1.0);

        // Aim the right controller straight at the sphere too: the group has
        // left the world frame, so the cast finds nothing to grab
        let left_object = rig.interaction.controller(Hand::Left).object;
        let right_object = rig.interaction.controller(Hand::Right).object;
        rig.scene
            .set_object_transform(right_object, Vec3::new(0.1, 0.0, 0.0), Quat::IDENTITY, 1.0);
        select(&mut rig, Hand::Right, 5.0);

        let group = rig.scene.get_object(rig.molecule_group).unwrap();
        assert_eq!(group.parent_id, Some(left_object));
        assert_eq!(rig.interaction.controller(Hand::Right).held, None);
    }

    #[test]
    fn target_ray_mode_is_recorded_even_on_a_miss() {
        let mut rig = rig();

        assert_eq!(rig.interaction.controller(Hand::Right).target_ray_mode, None);
        select(&mut rig, Hand::Right, 1.0);
        assert_eq!(
            rig.interaction.controller(Hand::Right).target_ray_mode,
            Some(TargetRayMode::Screen)
        );
    }
}
