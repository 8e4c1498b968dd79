//! # Marionette
//!
//! **Keyframed, articulated characters for real-time 3D scenes.**
//!
//! Build a rig as a named hierarchy of rigid parts, move its root along a
//! cardinal spline through keyframes, swing its joints, and read back world
//! transforms ready for any renderer. Keyframes can be picked and dragged with
//! the mouse, and a small ballistic particle system comes along for the ride.
//!
//! ## Quick Start
//!
//! ```
//! use marionette::*;
//!
//! let mut scene = Scene::new(&SceneConfig::default()).unwrap();
//!
//! for frame in 0..120 {
//!     let now = frame as f32 / 60.0;
//!     scene.frame(now, &PickInput::default());
//! }
//!
//! let draw = scene.draw_list();
//! assert_eq!(draw.keyframes.len(), 12);
//! assert!(!draw.instances.is_empty());
//! ```
//!
//! ## Pieces
//!
//! - **[`AffineTransform`]**: translation, rotation, uniform and per-axis scaling.
//! - **[`Hierarchy`]**: parents-first node arena with single-pass propagation.
//! - **[`KeyframeTrack`]**: validated keyframes sampled as a cardinal spline.
//! - **[`CharacterAnimator`]**: ties a track, a timer and a rig together.
//! - **[`KeyframeEditor`]**: shift+click to select, shift+drag to move.
//! - **[`ParticleSystem`]**: projectiles under gravity, stored in a `hecs` world.
//!
//! The crate never talks to the GPU. [`Hierarchy::instances`] hands out
//! `bytemuck`-ready per-node data and the host draws it however it likes.

mod animation;
mod camera;
mod config;
mod drawable;
mod editor;
mod error;
mod hierarchy;
mod input;
mod particles;
mod picking;
pub mod rigs;
mod scene;
mod spline;
mod timer;
mod trajectory;
mod transform;

pub use animation::{
    CharacterAnimator, JointDrive, JointMotion, MIRROR_LEG, MIRROR_SAGITTAL, Mirror,
    MirrorPlacement, Rig, RootOrientation, pose_joints,
};
pub use camera::Camera;
pub use config::{CharacterConfig, ParticleConfig, PickingConfig, SceneConfig};
pub use drawable::{Drawable, NodeInstance, ShaderId, Shape};
pub use editor::KeyframeEditor;
pub use error::{Result, RigError};
pub use hierarchy::{GLOBAL_FRAME, Hierarchy, HierarchyNode};
pub use input::{Input, PickInput};
pub use particles::{Particle, ParticleSystem};
pub use picking::{
    PARALLEL_EPSILON, PickingInfo, Ray, pick_nearest_sphere, ray_intersect_plane,
    ray_intersect_sphere, screen_to_ndc,
};
pub use scene::{DrawList, Scene};
pub use spline::{
    DEFAULT_TENSION, Keyframe, KeyframeTrack, MIN_TRACK_KEYFRAMES, SegmentSupport, SplineSample,
    cardinal_spline, cardinal_spline_derivative, find_segment_index,
};
pub use timer::{BasicTimer, EventTimer, IntervalTimer, ReversingTimer};
pub use trajectory::{DEFAULT_TRAJECTORY_CAPACITY, Trajectory};
pub use transform::{
    AffineTransform, DEFAULT_AXIS, normalize_or_default, rotation_between_vectors,
    rotation_from_axis_angle,
};

// Re-export glam math types for convenience
pub use glam::{Mat3, Mat4, Vec2, Vec3};

// Particles are hecs entities
pub use hecs::Entity;
