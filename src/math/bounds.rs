use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    /// Sphere around the extents of a point cloud. Not the minimal enclosing
    /// sphere, but tight enough for picking.
    pub fn from_points(points: impl Iterator<Item = Vec3>) -> BoundingSphere {
        let points = points.collect::<Vec<_>>();

        let Some(&first) = points.first() else {
            return BoundingSphere {
                center: Vec3::ZERO,
                radius: 0.0,
            };
        };

        let mut aabb = Aabb::new(first, first);
        for &point in &points {
            aabb = aabb.union(&Aabb::new(point, point));
        }

        let center = aabb.center();
        let radius = points
            .iter()
            .map(|point| (*point - center).length())
            .fold(0.0, f32::max);

        BoundingSphere { center, radius }
    }

    pub fn transform(&self, matrix: &Mat4) -> BoundingSphere {
        let center = matrix.transform_point3(self.center);
        let scale = matrix.to_scale_rotation_translation().0;
        let radius = self.radius * scale.max_element();
        BoundingSphere { center, radius }
    }

    #[allow(dead_code)]
    pub fn contains_point(&self, point: Vec3) -> bool {
        (point - self.center).length_squared() <= self.radius * self.radius
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(
            self.center - Vec3::splat(self.radius),
            self.center + Vec3::splat(self.radius),
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(point1: Vec3, point2: Vec3) -> Aabb {
        let min = point1.min(point2);
        let max = point1.max(point2);
        Aabb { min, max }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_from_points_encloses_them() {
        let points = [
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(1.0, 2.0, 0.0),
        ];
        let sphere = BoundingSphere::from_points(points.iter().copied());

        assert!((sphere.center - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6);
        for point in points {
            assert!(sphere.contains_point(point));
        }
    }

    #[test]
    fn sphere_transform_scales_radius() {
        let sphere = BoundingSphere {
            center: Vec3::ZERO,
            radius: 1.0,
        };
        let matrix =
            Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)) * Mat4::from_scale(Vec3::splat(3.0));
        let transformed = sphere.transform(&matrix);

        assert!((transformed.center - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-5);
        assert!((transformed.radius - 3.0).abs() < 1e-5);
    }

    #[test]
    fn aabb_union_and_center() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::new(2.0, -1.0, 0.0), Vec3::new(3.0, 0.0, 1.0));
        let union = a.union(&b);

        assert_eq!(union.min, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(union.max, Vec3::new(3.0, 1.0, 1.0));
        assert!((union.center() - Vec3::new(1.5, 0.0, 0.5)).length() < 1e-6);
    }
}
