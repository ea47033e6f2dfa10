//! Grenade blasts: damage falloff and launch impulse
//!
//! Everything inside the kill radius takes the full hit. From there the
//! effect falls off linearly to nothing at the blast radius.

use glam::Vec2;
use rand::Rng;

use super::body::RigidBody;
use crate::settings::Settings;

#[derive(Debug, Clone, PartialEq)]
pub struct Blast {
    pub center: Vec2,
    pub radius: f32,
    pub kill_radius: f32,
    /// Launch speed at full scale
    pub power: f32,
    /// Extra launch speed, uniform in `[0, spread)`
    pub spread: u32,
    pub max_damage: u32,
    /// Forced physics ticks given to launched bodies
    pub settle_ticks: u32,
}

impl Blast {
    pub fn new(center: Vec2, settings: &Settings) -> Self {
        Self {
            center,
            radius: settings.blast_radius as f32,
            kill_radius: settings.kill_radius as f32,
            power: settings.blast_power,
            spread: settings.blast_spread,
            max_damage: settings.grenade_max_damage,
            settle_ticks: settings.blast_settle_ticks,
        }
    }

    /// Falloff at `pos` in [0, 1], or `None` outside the blast radius
    pub fn scale_at(&self, pos: Vec2) -> Option<f32> {
        let distance = self.center.distance(pos);
        if distance > self.radius {
            return None;
        }
        Some(((self.radius - distance) / (self.radius - self.kill_radius)).clamp(0.0, 1.0))
    }

    pub fn damage(&self, scale: f32) -> u32 {
        (scale * self.max_damage as f32) as u32
    }

    /// Launch velocity for a body at `pos`, pointing away from the center.
    ///
    /// A body sitting exactly on the center goes roughly straight up.
    pub fn impulse<R: Rng>(&self, pos: Vec2, scale: f32, rng: &mut R) -> Vec2 {
        let mut power = scale * self.power;
        if self.spread > 0 {
            power += rng.random_range(0..self.spread) as f32;
        }

        let mut direction = pos - self.center;
        if direction == Vec2::ZERO {
            direction = Vec2::new(rng.random_range(-50..50) as f32, -1.0);
        }
        direction.normalize_or_zero() * power
    }

    /// Launch `body` if it is within reach. Returns whether it was hit.
    pub fn propel<R: Rng>(&self, body: &mut RigidBody, rng: &mut R) -> bool {
        let Some(scale) = self.scale_at(body.pos) else {
            return false;
        };
        let vel = self.impulse(body.pos, scale, rng);
        body.launch(vel, self.settle_ticks);
        true
    }
}
