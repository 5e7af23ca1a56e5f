use glam::{Mat4, Vec2, Vec3};

use crate::math::ray::Ray;

#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn get_vp_matrix(&self, resolution: Vec2) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        let projection = Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            resolution.x / resolution.y,
            self.z_near,
            self.z_far,
        );
        projection * view
    }

    /// Unprojects a cursor position (in pixels) into a world-space ray.
    pub fn screen_ray(&self, cursor: Vec2, resolution: Vec2) -> Ray {
        let ndc = Vec2::new(
            cursor.x / resolution.x * 2.0 - 1.0,
            1.0 - cursor.y / resolution.y * 2.0,
        );

        let inverse_vp = self.get_vp_matrix(resolution).inverse();
        let near = inverse_vp.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let far = inverse_vp.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));

        Ray::new(near, far - near)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_camera() -> Camera {
        Camera {
            eye: Vec3::new(0.0, 1.6, -1.0),
            target: Vec3::new(0.0, 1.6, 0.0),
            up: Vec3::Y,
            fov_y_degrees: 50.0,
            z_near: 0.1,
            z_far: 10.0,
        }
    }

    #[test]
    fn center_ray_points_at_target() {
        let camera = demo_camera();
        let resolution = Vec2::new(1280.0, 720.0);

        let ray = camera.screen_ray(resolution * 0.5, resolution);
        let toward_target = (camera.target - camera.eye).normalize();

        assert!(ray.direction.dot(toward_target) > 0.999);
        assert!((ray.origin - camera.eye).length() < camera.z_near * 2.0);
    }

    #[test]
    fn corner_rays_diverge() {
        let camera = demo_camera();
        let resolution = Vec2::new(1280.0, 720.0);

        let left = camera.screen_ray(Vec2::new(0.0, 360.0), resolution);
        let right = camera.screen_ray(Vec2::new(1280.0, 360.0), resolution);

        assert!(left.direction.dot(right.direction) < 0.999);
        // The camera faces +Z, so screen left is world +X
        assert!(left.direction.x > right.direction.x);
    }
}
