use glam::{Mat4, Vec2, Vec3};

use crate::picking::Ray;

/// A perspective camera used to turn cursor positions into picking rays.
///
/// The renderer owns the real camera; the scene only needs its pose and
/// projection parameters to cast rays and orient drag planes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub fov: f32, // radians, vertical
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, -10.0, 4.0),
            forward: Vec3::new(0.0, 1.0, -0.4).normalize(),
            up: Vec3::Z,
            fov: std::f32::consts::FRAC_PI_4,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 500.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn looking_at(mut self, target: Vec3) -> Self {
        self.forward = (target - self.position).normalize_or(self.forward);
        self
    }

    pub fn with_up(mut self, up: Vec3) -> Self {
        self.up = up;
        self
    }

    pub fn with_fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees.to_radians();
        self
    }

    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }

    /// Compute the right vector from forward and up.
    pub fn right(&self) -> Vec3 {
        self.forward.cross(self.up).normalize_or(Vec3::X)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Ray from the eye through a cursor given in normalized device coordinates.
    pub fn picking_ray(&self, cursor_ndc: Vec2) -> Ray {
        Ray::from_ndc(cursor_ndc, self.view_matrix(), self.projection_matrix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_ray_points_forward() {
        let camera = Camera::new()
            .at(Vec3::new(0.0, -5.0, 0.0))
            .looking_at(Vec3::ZERO);
        let ray = camera.picking_ray(Vec2::ZERO);
        assert!(ray.direction.abs_diff_eq(Vec3::Y, 1e-4));
    }

    #[test]
    fn right_is_orthogonal_to_forward_and_up() {
        let camera = Camera::new();
        assert!(camera.right().dot(camera.forward).abs() < 1e-6);
        assert!(camera.right().dot(camera.up).abs() < 1e-6);
    }

    #[test]
    fn offset_cursor_tilts_the_ray() {
        let camera = Camera::new()
            .at(Vec3::new(0.0, -5.0, 0.0))
            .looking_at(Vec3::ZERO);
        let ray = camera.picking_ray(Vec2::new(0.5, 0.0));
        assert!(ray.direction.x > 0.0);
        assert!(ray.direction.y > 0.0);
    }
}
