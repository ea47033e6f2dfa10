//! Players: a rigid body with health
//!
//! Dead players are inert scenery. The simulation skips them entirely.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::body::RigidBody;
use crate::consts::MAX_HEALTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerId {
    Red,
    Blue,
}

impl PlayerId {
    pub const ALL: [PlayerId; 2] = [PlayerId::Red, PlayerId::Blue];

    pub fn other(self) -> Self {
        match self {
            PlayerId::Red => PlayerId::Blue,
            PlayerId::Blue => PlayerId::Red,
        }
    }

    pub fn index(self) -> usize {
        match self {
            PlayerId::Red => 0,
            PlayerId::Blue => 1,
        }
    }
}

/// Sprite-sized box around a player's feet, in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    /// Box of the given size standing on `feet`, horizontally centered
    pub fn standing_at(feet: Vec2, width: u32, height: u32) -> Self {
        let half = (width / 2) as i32;
        Self {
            left: feet.x as i32 - half,
            top: feet.y as i32 - height as i32,
            width,
            height,
        }
    }

    pub fn contains(&self, p: IVec2) -> bool {
        p.x >= self.left
            && p.x < self.left + self.width as i32
            && p.y >= self.top
            && p.y < self.top + self.height as i32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub body: RigidBody,
    health: u32,
    /// Lags behind `health` for the health ring animation. Never read by
    /// gameplay code.
    displayed_health: u32,
    dead: bool,
}

impl Player {
    /// A grounded player at full health
    pub fn new(id: PlayerId, mut body: RigidBody) -> Self {
        body.set_physics(false);
        Self {
            id,
            body,
            health: MAX_HEALTH,
            displayed_health: MAX_HEALTH,
            dead: false,
        }
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn displayed_health(&self) -> u32 {
        self.displayed_health
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    /// Subtract `|amount|` from health, floored at zero.
    ///
    /// Returns `true` only on the call that kills the player. Damage to a
    /// dead player is ignored.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.dead {
            return false;
        }
        self.health = self.health.saturating_sub(amount.unsigned_abs());
        if self.health == 0 {
            self.dead = true;
            return true;
        }
        false
    }

    /// Ease the displayed health toward the real value (1% per frame)
    pub fn next_frame(&mut self) {
        let health = self.health as i64;
        let shown = self.displayed_health as i64;
        self.displayed_health = (health + (shown - health) * 99 / 100) as u32;
    }

    /// Health ring arc, in degrees
    pub fn ring_sweep(&self) -> f32 {
        360.0 * self.displayed_health as f32 / MAX_HEALTH as f32
    }

    pub fn bounds(&self, width: u32, height: u32) -> Bounds {
        Bounds::standing_at(self.body.pos, width, height)
    }
}

/// Fall damage for a landing at `speed` along the surface normal.
///
/// Zero up to `threshold`, rising linearly to `max_damage` at `cap`.
pub fn fall_damage(speed: f32, threshold: f32, cap: f32, max_damage: u32) -> u32 {
    let max = max_damage as f32;
    (max * (speed - threshold) / (cap - threshold)).clamp(0.0, max) as u32
}
