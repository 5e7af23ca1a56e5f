use glam::{Mat4, Vec3};

use crate::math::bounds::BoundingSphere;

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Ray {
        Ray {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Ray along the forward (-Z) axis of a pointer's world matrix.
    pub fn from_pointer(world: &Mat4) -> Ray {
        let origin = world.transform_point3(Vec3::ZERO);
        let direction = world.transform_vector3(Vec3::NEG_Z);
        Ray::new(origin, direction)
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the sphere surface, if the ray hits it.
    /// A ray starting inside the sphere hits the exit point.
    pub fn intersect_sphere(&self, sphere: &BoundingSphere) -> Option<f32> {
        let to_center = sphere.center - self.origin;
        let projection = to_center.dot(self.direction);
        let closest_sq = to_center.length_squared() - projection * projection;
        let radius_sq = sphere.radius * sphere.radius;

        if closest_sq > radius_sq {
            return None;
        }

        let half_chord = (radius_sq - closest_sq).sqrt();
        let near = projection - half_chord;
        let far = projection + half_chord;

        if near >= 0.0 {
            Some(near)
        } else if far >= 0.0 {
            Some(far)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_sphere_ahead_of_origin() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let sphere = BoundingSphere {
            center: Vec3::new(0.0, 0.0, -5.0),
            radius: 1.0,
        };

        let t = ray.intersect_sphere(&sphere).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
        assert!((ray.at(t) - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-5);
    }

    #[test]
    fn misses_offset_sphere() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let sphere = BoundingSphere {
            center: Vec3::new(3.0, 0.0, -5.0),
            radius: 1.0,
        };

        assert!(ray.intersect_sphere(&sphere).is_none());
    }

    #[test]
    fn ignores_sphere_behind_origin() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let sphere = BoundingSphere {
            center: Vec3::new(0.0, 0.0, 5.0),
            radius: 1.0,
        };

        assert!(ray.intersect_sphere(&sphere).is_none());
    }

    #[test]
    fn origin_inside_sphere_hits_exit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let sphere = BoundingSphere {
            center: Vec3::ZERO,
            radius: 2.0,
        };

        let t = ray.intersect_sphere(&sphere).unwrap();
        assert!((t - 2.0).abs() < 1e-5);
    }
}
