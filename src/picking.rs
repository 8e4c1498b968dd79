//! Ray casting used to select and drag keyframe control points.
//!
//! This module provides:
//!
//! - [`Ray`] - a 3D ray with origin and normalized direction
//! - [`ray_intersect_sphere`] / [`ray_intersect_plane`] - the two primitive tests
//! - [`pick_nearest_sphere`] - nearest-hit selection among many spheres
//!
//! # Example
//!
//! ```
//! use marionette::{Ray, Vec3, pick_nearest_sphere};
//!
//! let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
//! let centers = [Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 3.0)];
//!
//! // The sphere closer to the ray origin wins, whatever its index.
//! let (index, hit) = pick_nearest_sphere(&ray, centers, 0.5).unwrap();
//! assert_eq!(index, 1);
//! assert!((hit.point - Vec3::new(0.0, 0.0, 3.5)).length() < 1e-6);
//! ```

use glam::{Mat4, Vec2, Vec3};

use crate::transform::normalize_or_default;

/// Below this `|direction · normal|` a ray is treated as parallel to a plane.
pub const PARALLEL_EPSILON: f32 = 1e-6;

/// A ray in 3D space, used for picking.
///
/// A ray has an origin point and a normalized direction. It represents
/// a half-line starting at the origin and extending in the direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// The starting point of the ray.
    pub origin: Vec3,
    /// The normalized direction of the ray.
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray with the given origin and direction.
    ///
    /// The direction is normalized; a zero direction falls back to the
    /// default axis.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: normalize_or_default(direction),
        }
    }

    /// Create a ray from normalized device coordinates (`[-1, 1]` on both axes, +Y up).
    ///
    /// The ray starts on the near plane and points through the far plane,
    /// using a depth range of `[0, 1]`.
    pub fn from_ndc(ndc: Vec2, view_matrix: Mat4, projection_matrix: Mat4) -> Self {
        let near_clip = glam::Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
        let far_clip = glam::Vec4::new(ndc.x, ndc.y, 1.0, 1.0);

        // Inverse view-projection to get world coordinates
        let inv_view_proj = (projection_matrix * view_matrix).inverse();

        let near_world = inv_view_proj * near_clip;
        let far_world = inv_view_proj * far_clip;

        // Perspective divide
        let near_point = near_world.truncate() / near_world.w;
        let far_point = far_world.truncate() / far_world.w;

        Self::new(near_point, far_point - near_point)
    }

    /// Create a ray from a cursor position in window pixels (origin top-left).
    pub fn from_screen(
        screen: Vec2,
        screen_size: Vec2,
        view_matrix: Mat4,
        projection_matrix: Mat4,
    ) -> Self {
        Self::from_ndc(
            screen_to_ndc(screen, screen_size),
            view_matrix,
            projection_matrix,
        )
    }

    /// Get a point along the ray at the given distance from the origin.
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Converts window pixels (origin top-left, +Y down) to normalized device coordinates.
pub fn screen_to_ndc(screen: Vec2, screen_size: Vec2) -> Vec2 {
    Vec2::new(
        2.0 * screen.x / screen_size.x - 1.0,
        1.0 - 2.0 * screen.y / screen_size.y,
    )
}

/// Where a ray met a primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickingInfo {
    /// World-space intersection point.
    pub point: Vec3,
    /// Surface normal at the intersection.
    pub normal: Vec3,
    /// Distance from the ray origin to `point`.
    pub distance: f32,
}

/// Intersects a ray with a sphere.
///
/// Takes the nearer root when it lies in front of the origin, otherwise the
/// farther one (origin inside the sphere). `None` if the ray misses or the
/// sphere is entirely behind the origin.
pub fn ray_intersect_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<PickingInfo> {
    let d = ray.origin - center;
    let b = ray.direction.dot(d);
    let c = d.dot(d) - radius * radius;

    let delta = b * b - c;
    if delta < 0.0 {
        return None;
    }

    let sqrt_delta = delta.sqrt();
    let t0 = -b - sqrt_delta;
    let t1 = -b + sqrt_delta;
    let t = if t0 > 0.0 { t0 } else { t1 };
    // A non-finite ray yields a NaN root, which is no hit.
    if t.is_nan() || t <= 0.0 {
        return None;
    }

    let point = ray.point_at(t);
    Some(PickingInfo {
        point,
        normal: normalize_or_default(point - center),
        distance: t,
    })
}

/// Intersects a ray with the plane through `point_on_plane` with normal `normal`.
///
/// A ray (nearly) parallel to the plane, or a plane behind the origin, gives `None`.
pub fn ray_intersect_plane(ray: &Ray, normal: Vec3, point_on_plane: Vec3) -> Option<PickingInfo> {
    let denominator = ray.direction.dot(normal);
    if denominator.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = -(ray.origin - point_on_plane).dot(normal) / denominator;
    if t.is_nan() || t <= 0.0 {
        return None;
    }

    Some(PickingInfo {
        point: ray.point_at(t),
        normal,
        distance: t,
    })
}

/// Casts `ray` against equal-radius spheres and returns the nearest hit with its index.
pub fn pick_nearest_sphere(
    ray: &Ray,
    centers: impl IntoIterator<Item = Vec3>,
    radius: f32,
) -> Option<(usize, PickingInfo)> {
    centers
        .into_iter()
        .enumerate()
        .filter_map(|(index, center)| {
            ray_intersect_sphere(ray, center, radius).map(|hit| (index, hit))
        })
        .min_by(|(_, a), (_, b)| a.distance.total_cmp(&b.distance))
}
