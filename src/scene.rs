//! The whole animated scene behind one explicit context.
//!
//! [`Scene`] owns both characters, the plane's missiles, the keyframe editor
//! and the camera used for picking. The host calls [`Scene::frame`] once per
//! rendered frame with the clock value and sampled input, then hands
//! [`Scene::draw_list`] to its renderer.
//!
//! A frame always runs in the same order:
//!
//! 1. keyframe editing from input,
//! 2. character animation, each ending with hierarchy propagation,
//! 3. particle integration and missile launches.

use glam::Vec3;
use tracing::{debug, warn};

use crate::animation::{CharacterAnimator, Rig};
use crate::camera::Camera;
use crate::config::{CharacterConfig, SceneConfig};
use crate::drawable::NodeInstance;
use crate::editor::KeyframeEditor;
use crate::error::Result;
use crate::input::PickInput;
use crate::particles::ParticleSystem;
use crate::rigs::{build_creature, build_plane};
use crate::timer::{BasicTimer, EventTimer};

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug, Default)]
pub struct DrawList {
    /// One per node of every rig.
    pub instances: Vec<NodeInstance>,
    /// Creature bones as world-space segments.
    pub skeleton: Vec<(Vec3, Vec3)>,
    /// Editable keyframe positions of the creature's path.
    pub keyframes: Vec<Vec3>,
    pub selected_keyframe: Option<usize>,
    pub keyframe_radius: f32,
    /// Recent creature positions, oldest first.
    pub trajectory: Vec<Vec3>,
    pub particles: Vec<Vec3>,
}

pub struct Scene {
    /// Camera the host renders with; picking rays are cast from it.
    pub camera: Camera,
    creature: CharacterAnimator,
    plane: CharacterAnimator,
    particles: ParticleSystem,
    missile_timer: EventTimer,
    clock: BasicTimer,
    editor: KeyframeEditor,
    frame_count: u64,
}

fn animator(name: &str, rig: Rig, config: &CharacterConfig) -> Result<CharacterAnimator> {
    CharacterAnimator::new(name, rig, config.track()?)?
        .with_orientation(config.orientation())
        .with_tension(config.tension)
        .with_timer_scale(config.timer_scale)
}

impl Scene {
    pub fn new(config: &SceneConfig) -> Result<Self> {
        let creature = animator("creature", build_creature()?, &config.creature)?;
        let plane = animator("plane", build_plane()?, &config.plane)?;

        debug!(
            creature_keyframes = creature.track().len(),
            plane_keyframes = plane.track().len(),
            "scene ready"
        );

        Ok(Self {
            camera: Camera::new(),
            creature,
            plane,
            particles: ParticleSystem::new(config.particles.gravity, config.particles.floor_z),
            missile_timer: EventTimer::new(config.particles.spawn_period),
            clock: BasicTimer::new(),
            editor: KeyframeEditor::new(config.picking.keyframe_radius),
            frame_count: 0,
        })
    }

    /// Advances the scene to clock time `now` (seconds since start).
    pub fn frame(&mut self, now: f32, input: &PickInput) {
        if let Err(err) = self
            .editor
            .update(input, &self.camera, self.creature.track_mut())
        {
            warn!(error = %err, "keyframe edit rejected");
        }

        self.creature.update(now);
        let plane = self.plane.update(now);

        let dt = self.clock.update(now);
        self.particles.step(dt);
        self.missile_timer.update(now);
        if self.missile_timer.fired() {
            if let Some(sample) = plane {
                self.particles.spawn(sample.position, sample.derivative);
                debug!(position = ?sample.position, "missile launched");
            }
        }

        self.frame_count += 1;
    }

    pub fn draw_list(&self) -> DrawList {
        let mut instances = self.creature.rig().instances();
        instances.extend(self.plane.rig().instances());

        DrawList {
            instances,
            skeleton: self.creature.rig().skeleton_segments(),
            keyframes: self
                .creature
                .track()
                .keyframes()
                .iter()
                .map(|keyframe| keyframe.position)
                .collect(),
            selected_keyframe: self.editor.selected(),
            keyframe_radius: self.editor.radius,
            trajectory: self.creature.trajectory().iter().copied().collect(),
            particles: self.particles.positions(),
        }
    }

    pub fn creature(&self) -> &CharacterAnimator {
        &self.creature
    }

    pub fn plane(&self) -> &CharacterAnimator {
        &self.plane
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn editor(&self) -> &KeyframeEditor {
        &self.editor
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
