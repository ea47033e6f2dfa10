//! Giblets: debris thrown out when a player dies
//!
//! Giblets are ordinary rigid bodies. They settle like players do and stop
//! simulating until a blast kicks them again. The pile is capped; the oldest
//! pieces go first.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;

use super::body::RigidBody;
use super::player::Bounds;
use crate::settings::Settings;

/// Scatter a batch of giblets over `bounds`
pub fn make_giblets<R: Rng>(bounds: &Bounds, settings: &Settings, rng: &mut R) -> Vec<RigidBody> {
    (0..settings.giblet_chunks)
        .map(|_| {
            let x = bounds.left + rng.random_range(0..bounds.width.max(1)) as i32;
            let y = bounds.top + rng.random_range(0..bounds.height.max(1)) as i32;
            RigidBody::new(Vec2::new(x as f32, y as f32), settings.gravity)
                .with_material(settings.giblet_elasticity, settings.giblet_friction)
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct GibletPile {
    bodies: VecDeque<RigidBody>,
    cap: usize,
}

impl GibletPile {
    pub fn new(cap: usize) -> Self {
        Self {
            bodies: VecDeque::new(),
            cap,
        }
    }

    pub fn add_batch(&mut self, batch: Vec<RigidBody>) {
        self.bodies.extend(batch);
        let excess = self.bodies.len().saturating_sub(self.cap);
        if excess > 0 {
            self.bodies.drain(..excess);
            log::debug!("Evicted {} old giblets", excess);
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RigidBody> {
        self.bodies.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RigidBody> {
        self.bodies.iter_mut()
    }

    /// Number still in flight
    pub fn in_flight(&self) -> usize {
        self.bodies.iter().filter(|g| g.physics_enabled()).count()
    }
}
