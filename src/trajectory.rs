use std::collections::VecDeque;

use glam::Vec3;

/// Number of positions a [`Trajectory`] keeps unless told otherwise.
pub const DEFAULT_TRAJECTORY_CAPACITY: usize = 100;

/// The most recent positions of a moving point, oldest first.
///
/// Once full, every push drops the oldest entry.
#[derive(Clone, Debug)]
pub struct Trajectory {
    positions: VecDeque<Vec3>,
    max_capacity: usize,
}

impl Default for Trajectory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_TRAJECTORY_CAPACITY)
    }
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A capacity of zero is raised to one.
    pub fn with_capacity(max_capacity: usize) -> Self {
        let max_capacity = max_capacity.max(1);
        Self {
            positions: VecDeque::with_capacity(max_capacity),
            max_capacity,
        }
    }

    pub fn push(&mut self, position: Vec3) {
        if self.positions.len() == self.max_capacity {
            self.positions.pop_front();
        }
        self.positions.push_back(position);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec3> {
        self.positions.iter()
    }

    pub fn last(&self) -> Option<Vec3> {
        self.positions.back().copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_capacity
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }
}
