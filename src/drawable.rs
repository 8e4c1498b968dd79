//! What a rig node hands to the renderer.
//!
//! The crate never touches the GPU. Each node of a rig carries a [`Drawable`]
//! describing the part (a shape descriptor, a colour, the part's own model
//! offset and an optional shader handle). After propagation,
//! [`Hierarchy::instances`] flattens the rig into [`NodeInstance`] records
//! that can be uploaded as-is.

use glam::{Mat4, Vec3};

use crate::hierarchy::Hierarchy;
use crate::transform::AffineTransform;

/// Type-safe handle to a shader owned by the renderer.
///
/// This newtype wrapper prevents passing arbitrary integers where a shader
/// program is expected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

/// Geometry a renderer should build for a part, in the part's own frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    Ellipsoid { radii: Vec3 },
    /// Cylinder along +Z starting at the origin.
    Cylinder { radius: f32, height: f32 },
    /// Cone along +Z with its base at the origin.
    Cone { radius: f32, height: f32 },
    /// Axis-aligned box centred at the origin.
    Cuboid { size: Vec3 },
    /// Flat triangle in the XY plane, used for wings and fins.
    Triangle { a: Vec3, b: Vec3, c: Vec3 },
}

/// Payload stored in each node of a rig.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Drawable {
    /// Geometry descriptor.
    pub shape: Shape,
    /// RGB colour.
    pub color: Vec3,
    /// Placement of the geometry inside the node frame.
    pub offset: AffineTransform,
    /// Shader override. `None` lets the renderer pick its default.
    pub shader: Option<ShaderId>,
}

impl Drawable {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            color: Vec3::ONE,
            offset: AffineTransform::IDENTITY,
            shader: None,
        }
    }

    pub fn color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.color = Vec3::new(r, g, b);
        self
    }

    pub fn offset(mut self, offset: AffineTransform) -> Self {
        self.offset = offset;
        self
    }
}

/// Per-node data ready for a uniform or instance buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NodeInstance {
    /// Model matrix (part space to world space).
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of the model matrix, for normals.
    pub normal_matrix: [[f32; 4]; 4],
    /// RGBA colour.
    pub color: [f32; 4],
}

impl NodeInstance {
    pub fn new(model: Mat4, color: Vec3) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            color: color.extend(1.0).to_array(),
        }
    }
}

impl Hierarchy<Drawable> {
    /// Forces the same shader on every part of the rig.
    pub fn set_shader_for_all(&mut self, shader: ShaderId) {
        for drawable in self.payloads_mut() {
            drawable.shader = Some(shader);
        }
    }

    /// One instance per node, in storage order, from the current global transforms.
    pub fn instances(&self) -> Vec<NodeInstance> {
        self.iter()
            .map(|node| {
                let world = *node.global_transform() * node.payload.offset;
                NodeInstance::new(world.to_matrix(), node.payload.color)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::GLOBAL_FRAME;

    fn two_parts() -> Hierarchy<Drawable> {
        let mut h = Hierarchy::new();
        h.add_at(
            Drawable::new(Shape::Sphere { radius: 0.5 }).color(1.0, 0.0, 0.0),
            "body",
            GLOBAL_FRAME,
            Vec3::new(0.0, 0.0, 2.0),
        )
        .unwrap();
        h.add_at(
            Drawable::new(Shape::Cylinder {
                radius: 0.1,
                height: 0.4,
            })
            .offset(AffineTransform::from_translation(Vec3::new(0.0, 0.0, 0.1))),
            "neck",
            "body",
            Vec3::new(0.0, 0.0, 0.5),
        )
        .unwrap();
        h
    }

    #[test]
    fn shader_is_applied_to_every_part() {
        let mut h = two_parts();
        h.set_shader_for_all(ShaderId(7));
        assert!(h.iter().all(|node| node.payload.shader == Some(ShaderId(7))));
    }

    #[test]
    fn instances_include_part_offsets() {
        let mut h = two_parts();
        h.update_local_to_global_coordinates();
        let instances = h.instances();

        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].model[3], [0.0, 0.0, 2.0, 1.0]);
        assert_eq!(instances[0].color, [1.0, 0.0, 0.0, 1.0]);

        let neck = instances[1].model[3];
        assert!((neck[2] - 2.6).abs() < 1e-6);
    }

    #[test]
    fn instances_are_plain_bytes() {
        let mut h = two_parts();
        h.update_local_to_global_coordinates();
        let instances = h.instances();
        let bytes: &[u8] = bytemuck::cast_slice(&instances);
        assert_eq!(bytes.len(), 2 * std::mem::size_of::<NodeInstance>());
        assert_eq!(std::mem::size_of::<NodeInstance>(), 144);
    }
}
