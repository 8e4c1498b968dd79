//! Error types shared by every module of the crate.

use thiserror::Error;

/// Everything that can go wrong while building or animating a rig.
///
/// Most variants are precondition violations: the caller handed in data that
/// breaks an ordering or uniqueness rule. They are reported eagerly at the API
/// boundary (`Hierarchy::add`, `find_segment_index`, `Hierarchy::get`) so numeric
/// code never has to deal with them.
#[derive(Error, Debug)]
pub enum RigError {
    /// A keyframe track needs a tangent anchor on each side of its usable window.
    #[error("keyframe track needs at least {required} keyframes, got {count}")]
    TooFewKeyframes { count: usize, required: usize },

    /// Keyframe times must be strictly increasing.
    #[error("keyframe {index} has time {time} which does not follow {previous}")]
    UnsortedKeyframes {
        index: usize,
        time: f32,
        previous: f32,
    },

    /// The query time lies outside the interval covered by the keyframes.
    #[error("time {time} is outside the keyframe window [{min}, {max})")]
    TimeOutOfRange { time: f32, min: f32, max: f32 },

    /// A keyframe index does not exist in the track.
    #[error("keyframe index {index} out of range (track has {len} keyframes)")]
    KeyframeIndex { index: usize, len: usize },

    /// Node names must be unique inside a hierarchy.
    #[error("node [{0}] already exists in the hierarchy")]
    DuplicateNode(String),

    /// A node references a parent that was not inserted before it.
    #[error("node [{node}] at index {index} has parent [{parent}] used before being defined")]
    ParentNotDefined {
        node: String,
        parent: String,
        index: usize,
    },

    /// The root's parent name must stay outside the hierarchy.
    #[error("root parent name [{0}] cannot be an element of the hierarchy")]
    RootParentInHierarchy(String),

    /// The name index and the node storage disagree.
    #[error("hierarchy index is incoherent: {0}")]
    IncoherentIndex(String),

    /// Lookup of a name that is not part of the hierarchy.
    #[error("cannot find node [{name}] in hierarchy; available: {available:?}")]
    NodeNotFound {
        name: String,
        available: Vec<String>,
    },

    /// Timer bounds must describe a non-empty interval.
    #[error("invalid timer interval [{min}, {max})")]
    InvalidInterval { min: f32, max: f32 },

    /// Animation clocks only run forward at a finite speed.
    #[error("timer scale must be finite and positive, got {0}")]
    InvalidTimerScale(f32),

    /// Reading a configuration file failed.
    #[error("failed to read scene configuration: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file could not be parsed.
    #[error("failed to parse scene configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A configuration could not be serialized.
    #[error("failed to serialize scene configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, RigError>;
