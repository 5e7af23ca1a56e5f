use glam::{Mat4, Quat, Vec3};
use std::cell::{Cell, Ref, RefCell};

/// Local TRS with lazily cached local and world matrices. Scale is uniform;
/// nothing in the scene ever stretches along a single axis.
#[derive(Debug, Clone)]
pub struct Transform {
    translation: Vec3,
    rotation: Quat,
    scale: f32,

    local_matrix: RefCell<Mat4>,
    world_matrix: RefCell<Mat4>,
    local_dirty: Cell<bool>,
    world_dirty: Cell<bool>,
}

impl Transform {
    pub fn new(translation: Vec3, rotation: Quat, scale: f32) -> Self {
        Self {
            translation,
            rotation,
            scale,
            local_matrix: RefCell::new(Mat4::IDENTITY),
            world_matrix: RefCell::new(Mat4::IDENTITY),
            local_dirty: Cell::new(true),
            world_dirty: Cell::new(true),
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY, 1.0)
    }

    pub fn get_local_matrix(&self) -> Ref<Mat4> {
        if self.local_dirty.get() {
            let matrix = Mat4::from_scale_rotation_translation(
                Vec3::splat(self.scale),
                self.rotation,
                self.translation,
            );

            self.local_matrix.replace(matrix);
            self.local_dirty.set(false);
            // A stale local matrix implies a stale world matrix
            self.invalidate_world();
        }

        self.local_matrix.borrow()
    }

    /// Only valid after the scene has propagated transforms for this frame.
    pub fn get_world_matrix(&self) -> Ref<Mat4> {
        self.world_matrix.borrow()
    }

    pub fn set_world_matrix(&self, world_matrix: Mat4) {
        self.world_matrix.replace(world_matrix);
        self.world_dirty.set(false);
    }

    pub fn invalidate_local(&self) {
        self.local_dirty.set(true);
        self.world_dirty.set(true);
    }

    pub fn invalidate_world(&self) {
        self.world_dirty.set(true);
    }

    pub fn is_world_dirty(&self) -> bool {
        self.world_dirty.get()
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
        self.invalidate_local();
    }

    #[allow(dead_code)]
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.invalidate_local();
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
        self.invalidate_local();
    }

    pub fn set_transform(&mut self, translation: Vec3, rotation: Quat, scale: f32) {
        self.translation = translation;
        self.rotation = rotation;
        self.scale = scale;
        self.invalidate_local();
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn local_matrix_composes_trs() {
        let mut transform = Transform::from_translation(Vec3::new(1.0, 2.0, 3.0));
        transform.set_rotation(Quat::from_rotation_y(FRAC_PI_2));
        transform.set_scale(2.0);

        let matrix = *transform.get_local_matrix();
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();

        assert!((scale - Vec3::splat(2.0)).length() < 1e-5);
        assert!((translation - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-5);
        assert!(rotation.angle_between(Quat::from_rotation_y(FRAC_PI_2)) < 1e-4);
    }

    #[test]
    fn local_matrix_tracks_mutation() {
        let mut transform = Transform::from_translation(Vec3::ZERO);
        assert!((*transform.get_local_matrix() - Mat4::IDENTITY).abs_diff_eq(Mat4::ZERO, 1e-6));

        transform.set_translation(Vec3::X);
        let translation = transform.get_local_matrix().to_scale_rotation_translation().2;
        assert!((translation - Vec3::X).length() < 1e-6);
    }
}
