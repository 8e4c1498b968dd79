//! The two characters of the scene.
//!
//! Both models face +Y with +Z up in their rest pose.
//!
//! The creature's right side is authored once in the frame of its top-level
//! mirrored joint. Wings use [`MIRROR_SAGITTAL`], so their children are
//! written exactly like the left ones. Legs use [`MIRROR_LEG`], which also
//! flips Z, so every offset below the right hip is `MIRROR_LEG * left_offset`;
//! as a side effect the right leg swings in opposition to the left one.

use glam::Vec3;

use crate::animation::{JointDrive, MIRROR_LEG, MIRROR_SAGITTAL, Mirror, Rig};
use crate::drawable::{Drawable, Shape};
use crate::error::Result;
use crate::hierarchy::{GLOBAL_FRAME, Hierarchy};
use crate::transform::{AffineTransform, rotation_from_axis_angle};

/// Tilt applied to the creature's root on top of the path alignment.
///
/// Hand-tuned so the body reads well along the default path; it has no
/// geometric derivation.
pub const CREATURE_CORRECTION_ANGLE: f32 = 1.0;

pub const SHOULDER_PHASE: f32 = 0.4;
pub const ARM_PHASE: f32 = 0.6;
pub const HIP_PHASE: f32 = 0.4;
pub const KNEE_PHASE: f32 = 0.7;
pub const ANKLE_PHASE: f32 = 1.0;

/// Propeller speed in radians per unit of animation time.
pub const PROPELLER_SPIN_RATE: f32 = 40.0;

const SKIN: (f32, f32, f32) = (0.55, 0.75, 0.45);
const WING: (f32, f32, f32) = (0.35, 0.55, 0.3);
const EYE: (f32, f32, f32) = (0.05, 0.05, 0.05);

fn part(shape: Shape, (r, g, b): (f32, f32, f32)) -> Drawable {
    Drawable::new(shape).color(r, g, b)
}

fn shifted(shape: Shape, color: (f32, f32, f32), offset: Vec3) -> Drawable {
    part(shape, color).offset(AffineTransform::from_translation(offset))
}

/// Winged creature: body, head with eyes, two wings and two three-joint legs.
pub fn build_creature() -> Result<Rig> {
    let mut h = Hierarchy::new();

    h.add_at(
        part(
            Shape::Ellipsoid {
                radii: Vec3::new(0.25, 0.4, 0.2),
            },
            SKIN,
        ),
        "body",
        GLOBAL_FRAME,
        Vec3::ZERO,
    )?;
    h.add_at(
        part(Shape::Sphere { radius: 0.15 }, SKIN),
        "head",
        "body",
        Vec3::new(0.0, 0.45, 0.1),
    )?;
    h.add_at(
        part(Shape::Sphere { radius: 0.04 }, EYE),
        "eye_left",
        "head",
        Vec3::new(0.06, 0.12, 0.05),
    )?;
    h.add_at(
        part(Shape::Sphere { radius: 0.04 }, EYE),
        "eye_right",
        "head",
        Vec3::new(-0.06, 0.12, 0.05),
    )?;

    let wing = Shape::Cuboid {
        size: Vec3::new(0.4, 0.25, 0.02),
    };
    let wing_tip = Shape::Cuboid {
        size: Vec3::new(0.3, 0.2, 0.02),
    };
    for (side, x, rotation) in [
        ("left", 0.25, glam::Mat3::IDENTITY),
        ("right", -0.25, MIRROR_SAGITTAL),
    ] {
        let shoulder = format!("shoulder_{side}");
        h.add(
            shifted(wing, WING, Vec3::new(0.2, 0.0, 0.0)),
            shoulder.as_str(),
            "body",
            AffineTransform::new()
                .with_translation(Vec3::new(x, 0.05, 0.05))
                .with_rotation(rotation),
        )?;
        h.add_at(
            shifted(wing_tip, WING, Vec3::new(0.15, 0.0, 0.0)),
            format!("arm_{side}"),
            shoulder,
            Vec3::new(0.4, 0.0, 0.0),
        )?;
    }

    let thigh = Shape::Cuboid {
        size: Vec3::new(0.06, 0.06, 0.25),
    };
    let shin = Shape::Cuboid {
        size: Vec3::new(0.05, 0.05, 0.22),
    };
    let foot = Shape::Cuboid {
        size: Vec3::new(0.08, 0.15, 0.03),
    };
    for (side, x, frame) in [
        ("left", 0.12, glam::Mat3::IDENTITY),
        ("right", -0.12, MIRROR_LEG),
    ] {
        let hip = format!("hip_{side}");
        let knee = format!("knee_{side}");
        h.add(
            shifted(thigh, SKIN, frame * Vec3::new(0.0, 0.0, -0.125)),
            hip.as_str(),
            "body",
            AffineTransform::new()
                .with_translation(Vec3::new(x, -0.1, -0.15))
                .with_rotation(frame),
        )?;
        h.add_at(
            shifted(shin, SKIN, frame * Vec3::new(0.0, 0.0, -0.11)),
            knee.as_str(),
            hip,
            frame * Vec3::new(0.0, 0.0, -0.25),
        )?;
        h.add_at(
            shifted(foot, SKIN, frame * Vec3::new(0.0, 0.05, 0.0)),
            format!("ankle_{side}"),
            knee,
            frame * Vec3::new(0.0, 0.0, -0.22),
        )?;
    }

    let joints = vec![
        JointDrive::oscillate("shoulder_left", Vec3::Y, SHOULDER_PHASE),
        JointDrive::oscillate("arm_left", Vec3::Y, ARM_PHASE),
        JointDrive::oscillate("shoulder_right", Vec3::Y, SHOULDER_PHASE)
            .mirrored(Mirror::before(MIRROR_SAGITTAL)),
        JointDrive::oscillate("arm_right", Vec3::Y, ARM_PHASE),
        JointDrive::oscillate("hip_left", Vec3::X, HIP_PHASE),
        JointDrive::oscillate("knee_left", Vec3::X, KNEE_PHASE),
        JointDrive::oscillate("ankle_left", Vec3::X, ANKLE_PHASE),
        JointDrive::oscillate("hip_right", Vec3::X, HIP_PHASE)
            .mirrored(Mirror::before(MIRROR_LEG)),
        JointDrive::oscillate("knee_right", Vec3::X, KNEE_PHASE),
        JointDrive::oscillate("ankle_right", Vec3::X, ANKLE_PHASE),
    ];

    Ok(Rig {
        hierarchy: h,
        root: "body".to_string(),
        joints,
    })
}

/// Small propeller plane: fuselage, two wings, a tail fin and a spinning propeller.
pub fn build_plane() -> Result<Rig> {
    const HULL: (f32, f32, f32) = (0.8, 0.8, 0.85);
    const TRIM: (f32, f32, f32) = (0.8, 0.2, 0.2);

    let mut h = Hierarchy::new();
    h.add_at(
        part(
            Shape::Ellipsoid {
                radii: Vec3::new(0.12, 0.6, 0.12),
            },
            HULL,
        ),
        "fuselage",
        GLOBAL_FRAME,
        Vec3::ZERO,
    )?;
    h.add_at(
        part(
            Shape::Triangle {
                a: Vec3::new(0.0, 0.2, 0.0),
                b: Vec3::new(0.0, -0.15, 0.0),
                c: Vec3::new(0.9, -0.1, 0.0),
            },
            TRIM,
        ),
        "wing_left",
        "fuselage",
        Vec3::new(0.1, 0.05, 0.0),
    )?;
    h.add_at(
        part(
            Shape::Triangle {
                a: Vec3::new(0.0, 0.2, 0.0),
                b: Vec3::new(0.0, -0.15, 0.0),
                c: Vec3::new(-0.9, -0.1, 0.0),
            },
            TRIM,
        ),
        "wing_right",
        "fuselage",
        Vec3::new(-0.1, 0.05, 0.0),
    )?;
    // Fin stands upright in the YZ plane.
    h.add(
        part(
            Shape::Triangle {
                a: Vec3::new(0.0, 0.15, 0.0),
                b: Vec3::new(0.0, -0.1, 0.0),
                c: Vec3::new(0.3, -0.15, 0.0),
            },
            TRIM,
        ),
        "tail",
        "fuselage",
        AffineTransform::new()
            .with_translation(Vec3::new(0.0, -0.5, 0.05))
            .with_rotation(rotation_from_axis_angle(Vec3::Y, -std::f32::consts::FRAC_PI_2)),
    )?;
    // Cone axis turned from +Z to the flight direction +Y.
    h.add(
        part(
            Shape::Cone {
                radius: 0.09,
                height: 0.15,
            },
            TRIM,
        ),
        "nose",
        "fuselage",
        AffineTransform::new()
            .with_translation(Vec3::new(0.0, 0.5, 0.0))
            .with_rotation(rotation_from_axis_angle(Vec3::X, -std::f32::consts::FRAC_PI_2)),
    )?;
    h.add_at(
        part(
            Shape::Cuboid {
                size: Vec3::new(0.5, 0.02, 0.05),
            },
            (0.2, 0.2, 0.2),
        ),
        "propeller",
        "fuselage",
        Vec3::new(0.0, 0.66, 0.0),
    )?;

    Ok(Rig {
        hierarchy: h,
        root: "fuselage".to_string(),
        joints: vec![JointDrive::spin("propeller", Vec3::Y, PROPELLER_SPIN_RATE)],
    })
}
