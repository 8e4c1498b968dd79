//! Scene configuration (`scene.toml`).
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! stock scene. Keyframes are plain data here; they are validated when the
//! scene turns them into tracks.
//!
//! ```toml
//! [creature]
//! timer_scale = 0.5
//!
//! [particles]
//! spawn_period = 0.25
//! ```

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::animation::RootOrientation;
use crate::error::Result;
use crate::rigs::CREATURE_CORRECTION_ANGLE;
use crate::spline::{DEFAULT_TENSION, Keyframe, KeyframeTrack};

/// Top-level scene configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "CharacterConfig::creature")]
    pub creature: CharacterConfig,
    #[serde(default = "CharacterConfig::plane")]
    pub plane: CharacterConfig,
    #[serde(default)]
    pub particles: ParticleConfig,
    #[serde(default)]
    pub picking: PickingConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            creature: CharacterConfig::creature(),
            plane: CharacterConfig::plane(),
            particles: ParticleConfig::default(),
            picking: PickingConfig::default(),
        }
    }
}

impl SceneConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "loaded scene configuration");
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file gives the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "no scene configuration found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// One animated character.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CharacterConfig {
    #[serde(default = "default_tension")]
    pub tension: f32,
    /// Animation seconds per wall-clock second.
    #[serde(default = "default_timer_scale")]
    pub timer_scale: f32,
    /// Axis the model faces in its rest pose.
    #[serde(default = "default_forward")]
    pub forward: Vec3,
    #[serde(default = "default_correction_axis")]
    pub correction_axis: Vec3,
    /// Extra rotation (radians) about `correction_axis`, applied before path alignment.
    #[serde(default)]
    pub correction_angle: f32,
    /// At least four keyframes with strictly increasing times. The first and
    /// last only shape the tangents.
    pub keyframes: Vec<Keyframe>,
}

fn default_tension() -> f32 {
    DEFAULT_TENSION
}

fn default_timer_scale() -> f32 {
    1.0
}

fn default_forward() -> Vec3 {
    Vec3::Y
}

fn default_correction_axis() -> Vec3 {
    Vec3::X
}

impl CharacterConfig {
    fn with_keyframes(keyframes: &[([f32; 3], f32)]) -> Self {
        Self {
            tension: default_tension(),
            timer_scale: default_timer_scale(),
            forward: default_forward(),
            correction_axis: default_correction_axis(),
            correction_angle: 0.0,
            keyframes: keyframes
                .iter()
                .map(|&(position, time)| Keyframe::new(Vec3::from_array(position), time))
                .collect(),
        }
    }

    /// The creature's path through the valley.
    pub fn creature() -> Self {
        Self {
            correction_angle: CREATURE_CORRECTION_ANGLE,
            ..Self::with_keyframes(&[
                ([-1.0, 1.0, 0.0], 0.0),
                ([0.0, 1.0, 0.0], 1.0),
                ([1.0, 1.0, 0.0], 2.0),
                ([1.0, 2.0, 0.0], 2.5),
                ([2.0, 2.0, 0.0], 3.0),
                ([2.0, 2.0, 1.0], 3.5),
                ([2.0, 0.0, 1.5], 3.75),
                ([1.5, -1.0, 1.0], 4.5),
                ([1.5, -1.0, 0.0], 5.0),
                ([1.0, -1.0, 0.0], 6.0),
                ([0.0, -0.5, 0.0], 7.0),
                ([-1.0, -0.5, 0.0], 8.0),
            ])
        }
    }

    /// A closed loop: the last three keyframes repeat the first three, so the
    /// curve and its tangent match where the timer wraps.
    pub fn plane() -> Self {
        Self::with_keyframes(&[
            ([3.0, 0.0, 2.5], 0.0),
            ([1.87, 2.345, 2.792], 1.0),
            ([-0.668, 2.925, 2.37], 2.0),
            ([-2.703, 1.302, 2.265], 3.0),
            ([-2.703, -1.302, 2.735], 4.0),
            ([-0.668, -2.925, 2.63], 5.0),
            ([1.87, -2.345, 2.208], 6.0),
            ([3.0, 0.0, 2.5], 7.0),
            ([1.87, 2.345, 2.792], 8.0),
            ([-0.668, 2.925, 2.37], 9.0),
        ])
    }

    pub fn track(&self) -> Result<KeyframeTrack> {
        KeyframeTrack::new(self.keyframes.clone())
    }

    pub fn orientation(&self) -> RootOrientation {
        RootOrientation::new(self.forward).with_correction(self.correction_axis, self.correction_angle)
    }
}

/// Missiles fired by the plane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub gravity: Vec3,
    /// Particles below this height are removed.
    pub floor_z: f32,
    /// Seconds between two launches.
    pub spawn_period: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, 0.0, -9.81),
            floor_z: -1.0,
            spawn_period: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickingConfig {
    /// Radius of the sphere drawn (and picked) around each keyframe.
    pub keyframe_radius: f32,
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self {
            keyframe_radius: 0.05,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RigError;

    #[test]
    fn default_tracks_are_valid() {
        let config = SceneConfig::default();
        let creature = config.creature.track().unwrap();
        assert_eq!(creature.len(), 12);
        assert_eq!(creature.time_window(), (1.0, 7.0));

        let plane = config.plane.track().unwrap();
        let keys = plane.keyframes();
        for k in 0..3 {
            assert_eq!(keys[k].position, keys[k + 7].position);
        }
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = SceneConfig::from_toml_str("").unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_what_it_names() {
        let config = SceneConfig::from_toml_str(
            r#"
            [particles]
            spawn_period = 0.25

            [plane]
            timer_scale = 2.0
            keyframes = [
                { position = [0.0, 0.0, 0.0], time = 0.0 },
                { position = [1.0, 0.0, 0.0], time = 1.0 },
                { position = [1.0, 1.0, 0.0], time = 2.0 },
                { position = [0.0, 1.0, 0.0], time = 3.0 },
            ]
            "#,
        )
        .unwrap();

        assert_eq!(config.particles.spawn_period, 0.25);
        assert_eq!(config.particles.floor_z, -1.0);
        assert_eq!(config.plane.timer_scale, 2.0);
        assert_eq!(config.plane.tension, 1.0);
        assert_eq!(config.plane.keyframes.len(), 4);
        assert_eq!(config.creature, CharacterConfig::creature());
    }

    #[test]
    fn toml_round_trip() {
        let config = SceneConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(SceneConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let err = SceneConfig::from_toml_str("[particles]\nfloor_z = \"low\"").unwrap_err();
        assert!(matches!(err, RigError::ConfigParse(_)));
    }

    #[test]
    fn unsorted_keyframes_fail_at_track_creation() {
        let mut config = CharacterConfig::plane();
        config.keyframes.swap(2, 3);
        assert!(matches!(
            config.track(),
            Err(RigError::UnsortedKeyframes { index: 3, .. })
        ));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = SceneConfig::load_or_default("definitely/not/here/scene.toml").unwrap();
        assert_eq!(config, SceneConfig::default());
    }
}
