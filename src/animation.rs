//! Drives a rig along a keyframe track.
//!
//! A [`CharacterAnimator`] owns everything one character needs per frame:
//! the keyframe track, a looping [`IntervalTimer`] over the track's usable
//! window, the rig hierarchy and a table of [`JointDrive`]s. Each frame it
//!
//! 1. advances the timer,
//! 2. samples the spline (position and derivative),
//! 3. places the root at the position and turns it to face along the derivative,
//! 4. poses every driven joint,
//! 5. propagates the hierarchy.
//!
//! # Mirrored joints
//!
//! Left/right limbs share one authoring. The right-hand top-level joint
//! carries a fixed [`Mirror`] matrix combined with its oscillation; joints
//! below it never repeat the mirror because the hierarchy already carries it
//! down to them.

use std::f32::consts::TAU;

use glam::{Mat3, Vec3};
use tracing::{debug, info, warn};

use crate::drawable::Drawable;
use crate::error::{Result, RigError};
use crate::hierarchy::Hierarchy;
use crate::spline::{DEFAULT_TENSION, KeyframeTrack, SplineSample};
use crate::timer::IntervalTimer;
use crate::trajectory::Trajectory;
use crate::transform::{rotation_between_vectors, rotation_from_axis_angle};

/// Reflection through the sagittal (YZ) plane.
pub const MIRROR_SAGITTAL: Mat3 = Mat3::from_cols(Vec3::NEG_X, Vec3::Y, Vec3::Z);

/// `diag(-1, 1, -1)`, used for the right leg.
pub const MIRROR_LEG: Mat3 = Mat3::from_cols(Vec3::NEG_X, Vec3::Y, Vec3::NEG_Z);

/// Which side of the joint rotation the mirror matrix goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MirrorPlacement {
    /// `mirror * rotation`
    Before,
    /// `rotation * mirror`
    After,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mirror {
    pub matrix: Mat3,
    pub placement: MirrorPlacement,
}

impl Mirror {
    pub fn before(matrix: Mat3) -> Self {
        Self {
            matrix,
            placement: MirrorPlacement::Before,
        }
    }

    pub fn after(matrix: Mat3) -> Self {
        Self {
            matrix,
            placement: MirrorPlacement::After,
        }
    }

    pub fn apply(&self, rotation: Mat3) -> Mat3 {
        match self.placement {
            MirrorPlacement::Before => self.matrix * rotation,
            MirrorPlacement::After => rotation * self.matrix,
        }
    }
}

/// How a joint's angle evolves with animation time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum JointMotion {
    /// `sin(2π (t - phase))`
    Oscillate { phase: f32 },
    /// `rate * t`, in radians per unit of animation time.
    Spin { rate: f32 },
}

impl JointMotion {
    pub fn angle_at(&self, t: f32) -> f32 {
        match *self {
            JointMotion::Oscillate { phase } => (TAU * (t - phase)).sin(),
            JointMotion::Spin { rate } => rate * t,
        }
    }
}

/// One row of a rig's joint table.
#[derive(Clone, Debug, PartialEq)]
pub struct JointDrive {
    pub joint: String,
    pub axis: Vec3,
    pub motion: JointMotion,
    pub mirror: Option<Mirror>,
}

impl JointDrive {
    pub fn oscillate(joint: impl Into<String>, axis: Vec3, phase: f32) -> Self {
        Self {
            joint: joint.into(),
            axis,
            motion: JointMotion::Oscillate { phase },
            mirror: None,
        }
    }

    pub fn spin(joint: impl Into<String>, axis: Vec3, rate: f32) -> Self {
        Self {
            joint: joint.into(),
            axis,
            motion: JointMotion::Spin { rate },
            mirror: None,
        }
    }

    pub fn mirrored(mut self, mirror: Mirror) -> Self {
        self.mirror = Some(mirror);
        self
    }

    /// Local rotation of the joint at time `t`.
    pub fn rotation_at(&self, t: f32) -> Mat3 {
        let rotation = rotation_from_axis_angle(self.axis, self.motion.angle_at(t));
        match &self.mirror {
            Some(mirror) => mirror.apply(rotation),
            None => rotation,
        }
    }
}

/// Writes the rotation of every driven joint, leaving translations untouched.
pub fn pose_joints<P>(rig: &mut Hierarchy<P>, joints: &[JointDrive], t: f32) -> Result<()> {
    for drive in joints {
        rig.get_mut(&drive.joint)?.transform.rotation = drive.rotation_at(t);
    }
    Ok(())
}

/// How the root turns to follow the path.
///
/// The root rotation is `rotation_between_vectors(forward, velocity) * correction`:
/// `correction` is applied first, in the model's own frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootOrientation {
    /// Axis the model faces in its rest pose.
    pub forward: Vec3,
    pub correction: Mat3,
}

impl Default for RootOrientation {
    fn default() -> Self {
        Self {
            forward: Vec3::Y,
            correction: Mat3::IDENTITY,
        }
    }
}

impl RootOrientation {
    pub fn new(forward: Vec3) -> Self {
        Self {
            forward,
            ..Self::default()
        }
    }

    pub fn with_correction(mut self, axis: Vec3, angle: f32) -> Self {
        self.correction = rotation_from_axis_angle(axis, angle);
        self
    }

    pub fn rotation_for(&self, velocity: Vec3) -> Mat3 {
        rotation_between_vectors(self.forward, velocity) * self.correction
    }
}

/// An articulated model ready to be animated.
#[derive(Clone, Debug)]
pub struct Rig {
    pub hierarchy: Hierarchy<Drawable>,
    /// Node that follows the spline.
    pub root: String,
    pub joints: Vec<JointDrive>,
}

/// Moves one rig along one keyframe track.
pub struct CharacterAnimator {
    name: String,
    track: KeyframeTrack,
    timer: IntervalTimer,
    rig: Rig,
    orientation: RootOrientation,
    tension: f32,
    trajectory: Trajectory,
    faulted: bool,
    last_sample: Option<SplineSample>,
}

impl CharacterAnimator {
    /// Fails if the rig's root or any driven joint is not a node of its hierarchy.
    pub fn new(name: impl Into<String>, rig: Rig, track: KeyframeTrack) -> Result<Self> {
        rig.hierarchy.get(&rig.root)?;
        for drive in &rig.joints {
            rig.hierarchy.get(&drive.joint)?;
        }

        let (t_min, t_max) = track.time_window();
        let timer = IntervalTimer::new(t_min, t_max)?;
        let name = name.into();
        debug!(
            character = %name,
            nodes = rig.hierarchy.len(),
            joints = rig.joints.len(),
            t_min,
            t_max,
            "created character animator"
        );

        Ok(Self {
            name,
            track,
            timer,
            rig,
            orientation: RootOrientation::default(),
            tension: DEFAULT_TENSION,
            trajectory: Trajectory::new(),
            faulted: false,
            last_sample: None,
        })
    }

    pub fn with_orientation(mut self, orientation: RootOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_tension(mut self, tension: f32) -> Self {
        self.tension = tension;
        self
    }

    /// Sets the playback speed. Fails unless `scale` is finite and positive.
    pub fn with_timer_scale(mut self, scale: f32) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(RigError::InvalidTimerScale(scale));
        }
        self.timer = self.timer.with_scale(scale);
        Ok(self)
    }

    /// Advances the timer to `now` and animates at the resulting time.
    ///
    /// A failure is logged the first time it happens and the frame is skipped;
    /// later failures stay silent until a frame succeeds again.
    pub fn update(&mut self, now: f32) -> Option<SplineSample> {
        self.timer.update(now);
        match self.animate_at(self.timer.t()) {
            Ok(sample) => {
                if self.faulted {
                    info!(character = %self.name, "animation recovered");
                    self.faulted = false;
                }
                Some(sample)
            }
            Err(err) => {
                if !self.faulted {
                    warn!(character = %self.name, error = %err, "skipping animation");
                    self.faulted = true;
                }
                None
            }
        }
    }

    /// Poses the rig for animation time `t` and propagates it.
    pub fn animate_at(&mut self, t: f32) -> Result<SplineSample> {
        let sample = self.track.sample(t, self.tension)?;

        let root = self.rig.hierarchy.get_mut(&self.rig.root)?;
        root.transform.translation = sample.position;
        root.transform.rotation = self.orientation.rotation_for(sample.derivative);

        pose_joints(&mut self.rig.hierarchy, &self.rig.joints, t)?;
        self.rig.hierarchy.update_local_to_global_coordinates();

        self.trajectory.push(sample.position);
        self.last_sample = Some(sample);
        Ok(sample)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rig(&self) -> &Hierarchy<Drawable> {
        &self.rig.hierarchy
    }

    pub fn rig_mut(&mut self) -> &mut Hierarchy<Drawable> {
        &mut self.rig.hierarchy
    }

    pub fn joints(&self) -> &[JointDrive] {
        &self.rig.joints
    }

    pub fn track(&self) -> &KeyframeTrack {
        &self.track
    }

    /// Keyframe positions may be edited in place; times are fixed.
    pub fn track_mut(&mut self) -> &mut KeyframeTrack {
        &mut self.track
    }

    pub fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Sample of the last frame that succeeded.
    pub fn last_sample(&self) -> Option<SplineSample> {
        self.last_sample
    }

    /// Whether the most recent update failed.
    pub fn is_faulted(&self) -> bool {
        self.faulted
    }
}
