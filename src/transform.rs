//! Affine transforms and the rotation helpers used to orient rig parts.
//!
//! [`AffineTransform`] is the value every hierarchy node carries twice: once
//! relative to its parent (local) and once resolved in world space (global).
//! It stores translation, a 3×3 rotation, an isotropic scaling factor and a
//! per-axis scaling multiplier, and maps a point `p` to
//!
//! ```text
//! p' = scaling * scaling_axis ⊙ (rotation * p) + translation
//! ```
//!
//! # Example
//!
//! ```
//! use marionette::{AffineTransform, Vec3, rotation_from_axis_angle};
//!
//! let parent = AffineTransform::new().with_translation(Vec3::new(0.0, 0.0, 1.0));
//! let child = AffineTransform::new()
//!     .with_translation(Vec3::new(1.0, 0.0, 0.0))
//!     .with_rotation(rotation_from_axis_angle(Vec3::Z, 0.5));
//!
//! // Parent first, then child.
//! let global = parent * child;
//! assert!((global.translation - Vec3::new(1.0, 0.0, 1.0)).length() < 1e-6);
//! ```

use std::ops::Mul;

use glam::{Mat3, Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Axis returned when a direction cannot be normalized.
pub const DEFAULT_AXIS: Vec3 = Vec3::Z;

const ALIGNMENT_EPSILON: f32 = 1e-4;

/// Translation, rotation and scaling composed into a single operator.
///
/// The rotation is expected to stay orthonormal; mirrored rigs also store
/// reflections here (determinant −1), which compose the same way. Nothing
/// re-orthonormalizes the matrix, so long chains of compositions are the
/// caller's concern.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    /// Translation (x, y, z).
    pub translation: Vec3,
    /// 3×3 rotation matrix.
    pub rotation: Mat3,
    /// Isotropic scaling.
    pub scaling: f32,
    /// Per-axis scaling multiplier (sx, sy, sz).
    pub scaling_axis: Vec3,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AffineTransform {
    /// The transform that leaves every point in place.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Mat3::IDENTITY,
        scaling: 1.0,
        scaling_axis: Vec3::ONE,
    };

    /// Creates an identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pure translation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Creates a pure rotation.
    pub fn from_rotation(rotation: Mat3) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    /// Sets the translation component.
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    /// Sets the rotation component.
    pub fn with_rotation(mut self, rotation: Mat3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets the isotropic scaling factor.
    pub fn with_scaling(mut self, scaling: f32) -> Self {
        self.scaling = scaling;
        self
    }

    /// Sets the per-axis scaling multiplier.
    pub fn with_scaling_axis(mut self, scaling_axis: Vec3) -> Self {
        self.scaling_axis = scaling_axis;
        self
    }

    /// Diagonal scaling matrix `scaling * diag(scaling_axis)`.
    fn scale_matrix(&self) -> Mat3 {
        Mat3::from_diagonal(self.scaling * self.scaling_axis)
    }

    /// Returns `outer ∘ inner`: the transform that applies `inner` first, then `outer`.
    ///
    /// Scalings multiply, rotations multiply, and the inner translation is
    /// carried into the outer frame. This matches the product of the 4×4
    /// matrices whenever `inner.scaling_axis` is uniform.
    pub fn compose(outer: &Self, inner: &Self) -> Self {
        Self {
            translation: outer.scale_matrix() * outer.rotation * inner.translation
                + outer.translation,
            rotation: outer.rotation * inner.rotation,
            scaling: outer.scaling * inner.scaling,
            scaling_axis: outer.scaling_axis * inner.scaling_axis,
        }
    }

    /// Applies the transform to a point.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.scaling * self.scaling_axis * (self.rotation * point) + self.translation
    }

    /// Applies the linear part of the transform to a direction.
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.scaling * self.scaling_axis * (self.rotation * vector)
    }

    /// Homogeneous 4×4 matrix equivalent to [`transform_point`](Self::transform_point).
    pub fn to_matrix(&self) -> Mat4 {
        let linear = self.scale_matrix() * self.rotation;
        Mat4::from_cols(
            linear.x_axis.extend(0.0),
            linear.y_axis.extend(0.0),
            linear.z_axis.extend(0.0),
            self.translation.extend(1.0),
        )
    }

    /// Component-wise comparison within `max_abs_diff`.
    pub fn abs_diff_eq(&self, other: &Self, max_abs_diff: f32) -> bool {
        self.translation
            .abs_diff_eq(other.translation, max_abs_diff)
            && self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
            && (self.scaling - other.scaling).abs() <= max_abs_diff
            && self
                .scaling_axis
                .abs_diff_eq(other.scaling_axis, max_abs_diff)
    }
}

impl Mul for AffineTransform {
    type Output = AffineTransform;

    fn mul(self, inner: AffineTransform) -> AffineTransform {
        AffineTransform::compose(&self, &inner)
    }
}

impl Mul<&AffineTransform> for &AffineTransform {
    type Output = AffineTransform;

    fn mul(self, inner: &AffineTransform) -> AffineTransform {
        AffineTransform::compose(self, inner)
    }
}

/// Normalizes `v`, falling back to [`DEFAULT_AXIS`] for zero or non-finite input.
pub fn normalize_or_default(v: Vec3) -> Vec3 {
    v.try_normalize().unwrap_or(DEFAULT_AXIS)
}

/// Rotation of `angle` radians around `axis` (right-handed).
///
/// The axis is normalized here; a zero axis rotates around [`DEFAULT_AXIS`].
pub fn rotation_from_axis_angle(axis: Vec3, angle: f32) -> Mat3 {
    Mat3::from_axis_angle(normalize_or_default(axis), angle)
}

/// A rotation `R` such that `R * â = b̂`.
///
/// Both vectors are normalized first. Aligned vectors give the identity,
/// opposite vectors a half turn around some axis orthogonal to `a`; otherwise
/// the rotation is around `a × b`. The result is one of many valid rotations.
pub fn rotation_between_vectors(a: Vec3, b: Vec3) -> Mat3 {
    let u0 = normalize_or_default(a);
    let u1 = normalize_or_default(b);

    if (u0 - u1).length() < ALIGNMENT_EPSILON {
        return Mat3::IDENTITY;
    }
    if (u0 + u1).length() < ALIGNMENT_EPSILON {
        return Mat3::from_axis_angle(u0.any_orthonormal_vector(), std::f32::consts::PI);
    }

    let angle = u0.dot(u1).clamp(-1.0, 1.0).acos();
    let axis = normalize_or_default(u0.cross(u1));
    Mat3::from_axis_angle(axis, angle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arbitrary_transform() -> impl Strategy<Value = AffineTransform> {
        (
            prop::array::uniform3(-5.0f32..5.0),
            prop::array::uniform3(-1.0f32..1.0),
            -3.0f32..3.0,
            0.5f32..2.0,
        )
            .prop_map(|(t, axis, angle, scaling)| {
                AffineTransform::new()
                    .with_translation(Vec3::from(t))
                    .with_rotation(rotation_from_axis_angle(Vec3::from(axis), angle))
                    .with_scaling(scaling)
            })
    }

    #[test]
    fn identity_composition_is_neutral() {
        let t = AffineTransform::new()
            .with_translation(Vec3::new(1.0, 2.0, 3.0))
            .with_rotation(rotation_from_axis_angle(Vec3::Y, 0.3))
            .with_scaling(2.0);

        assert!((AffineTransform::IDENTITY * t).abs_diff_eq(&t, 1e-6));
        assert!((t * AffineTransform::IDENTITY).abs_diff_eq(&t, 1e-6));
    }

    #[test]
    fn composition_order_matters() {
        let rotate = AffineTransform::from_rotation(rotation_from_axis_angle(Vec3::Z, 1.0));
        let shift = AffineTransform::from_translation(Vec3::X);

        let a = rotate * shift;
        let b = shift * rotate;
        assert!(!a.translation.abs_diff_eq(b.translation, 1e-3));
    }

    #[test]
    fn compose_translation_uses_outer_scale_and_rotation() {
        let outer = AffineTransform::new()
            .with_translation(Vec3::new(0.0, 0.0, 1.0))
            .with_rotation(rotation_from_axis_angle(Vec3::Z, std::f32::consts::FRAC_PI_2))
            .with_scaling(2.0);
        let inner = AffineTransform::from_translation(Vec3::X);

        let composed = outer * inner;
        assert!(
            composed
                .translation
                .abs_diff_eq(Vec3::new(0.0, 2.0, 1.0), 1e-5)
        );
        assert_eq!(composed.scaling, 2.0);
    }

    #[test]
    fn matrix_agrees_with_point_transform() {
        let t = AffineTransform::new()
            .with_translation(Vec3::new(-1.0, 0.5, 2.0))
            .with_rotation(rotation_from_axis_angle(Vec3::new(1.0, 1.0, 0.0), 0.7))
            .with_scaling(1.5)
            .with_scaling_axis(Vec3::new(1.0, 2.0, 0.5));
        let p = Vec3::new(0.3, -0.2, 0.9);

        let by_matrix = t.to_matrix().transform_point3(p);
        assert!(by_matrix.abs_diff_eq(t.transform_point(p), 1e-5));
    }

    #[test]
    fn rotation_between_maps_source_onto_target() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 2.0, 2.0);
        let r = rotation_between_vectors(a, b);
        assert!((r * a).abs_diff_eq(b.normalize(), 1e-5));
    }

    #[test]
    fn rotation_between_handles_degenerate_cases() {
        assert_eq!(rotation_between_vectors(Vec3::X, Vec3::X * 3.0), Mat3::IDENTITY);

        let flip = rotation_between_vectors(Vec3::X, -Vec3::X);
        assert!((flip * Vec3::X).abs_diff_eq(-Vec3::X, 1e-5));
        assert!((flip.determinant() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn zero_vector_normalizes_to_default_axis() {
        assert_eq!(normalize_or_default(Vec3::ZERO), DEFAULT_AXIS);
        assert_eq!(normalize_or_default(Vec3::splat(f32::NAN)), DEFAULT_AXIS);
    }

    proptest! {
        #[test]
        fn composition_is_associative(
            a in arbitrary_transform(),
            b in arbitrary_transform(),
            c in arbitrary_transform(),
        ) {
            let left = (a * b) * c;
            let right = a * (b * c);
            prop_assert!(left.abs_diff_eq(&right, 1e-3));
        }
    }
}
