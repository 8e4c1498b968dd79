//! Ballistic projectiles stored as `hecs` entities.
//!
//! Each projectile is an entity with a [`Particle`] component. Every step
//! integrates all of them under constant gravity with semi-implicit Euler and
//! despawns the ones that dropped below the floor height.
//!
//! # Example
//!
//! ```
//! use marionette::{ParticleSystem, Vec3};
//!
//! let mut particles = ParticleSystem::new(Vec3::new(0.0, 0.0, -9.81), -1.0);
//! particles.spawn(Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO);
//!
//! let mut frames = 0;
//! while !particles.is_empty() {
//!     particles.step(0.01);
//!     frames += 1;
//! }
//! assert_eq!(frames, 78);
//! ```

use glam::Vec3;
use hecs::{Entity, World};
use tracing::trace;

/// Position and velocity of one projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Owns every live projectile.
pub struct ParticleSystem {
    world: World,
    /// Constant acceleration applied to every particle.
    pub gravity: Vec3,
    /// Particles whose height drops below this value are removed.
    pub floor_z: f32,
}

impl ParticleSystem {
    pub fn new(gravity: Vec3, floor_z: f32) -> Self {
        Self {
            world: World::new(),
            gravity,
            floor_z,
        }
    }

    pub fn spawn(&mut self, position: Vec3, velocity: Vec3) -> Entity {
        self.world.spawn((Particle { position, velocity },))
    }

    /// Advances every particle by `dt` seconds, then removes fallen ones.
    ///
    /// Velocity is updated before position (semi-implicit Euler).
    pub fn step(&mut self, dt: f32) {
        for (_, particle) in self.world.query_mut::<&mut Particle>() {
            particle.velocity += self.gravity * dt;
            particle.position += particle.velocity * dt;
        }

        let fallen: Vec<Entity> = self
            .world
            .query::<&Particle>()
            .iter()
            .filter(|(_, particle)| particle.position.z < self.floor_z)
            .map(|(entity, _)| entity)
            .collect();

        for entity in fallen {
            if self.world.despawn(entity).is_ok() {
                trace!(?entity, "particle fell below the floor");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.world.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.world.len() == 0
    }

    pub fn get(&self, entity: Entity) -> Option<Particle> {
        self.world.get::<&Particle>(entity).ok().map(|p| *p)
    }

    /// Current position of every particle.
    pub fn positions(&self) -> Vec<Vec3> {
        self.world
            .query::<&Particle>()
            .iter()
            .map(|(_, particle)| particle.position)
            .collect()
    }

    pub fn clear(&mut self) {
        self.world.clear();
    }
}
