//! Point-mass rigid bodies
//!
//! Grenades, players and giblets all move the same way: explicit Euler
//! integration in screen space, snapped back out of the ground and bounced
//! off the local surface tangent when they end a step underground.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::terrain::Terrain;
use super::vector::clamp_unit;
use crate::error::TerrainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    /// Screen-space position (y grows downward)
    pub pos: Vec2,
    /// Velocity in pixels per second
    pub vel: Vec2,
    /// Added to `vel.y` once per step
    gravity: f32,
    /// Fraction of normal velocity kept (and reversed) by a bounce
    elasticity: f32,
    /// Fraction of tangential velocity kept by a bounce
    friction: f32,
    /// Whether the body is in flight
    physics: bool,
    /// Steps left before a body resting on the ground is grounded regardless
    /// of its speed
    physics_timer: u32,
}

impl RigidBody {
    /// A body in flight with perfectly bouncy, frictionless material
    pub fn new(pos: Vec2, gravity: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            gravity,
            elasticity: 1.0,
            friction: 1.0,
            physics: true,
            physics_timer: 0,
        }
    }

    pub fn with_material(mut self, elasticity: f32, friction: f32) -> Self {
        self.set_elasticity(elasticity);
        self.set_friction(friction);
        self
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn elasticity(&self) -> f32 {
        self.elasticity
    }

    pub fn set_elasticity(&mut self, elasticity: f32) {
        self.elasticity = clamp_unit(elasticity);
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }

    pub fn set_friction(&mut self, friction: f32) {
        self.friction = clamp_unit(friction);
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    pub fn physics_enabled(&self) -> bool {
        self.physics
    }

    pub fn set_physics(&mut self, enabled: bool) {
        self.physics = enabled;
    }

    pub fn physics_timer(&self) -> u32 {
        self.physics_timer
    }

    pub fn set_physics_timer(&mut self, ticks: u32) {
        self.physics_timer = ticks;
    }

    /// Throw the body: new velocity, physics on, settle timer reset
    pub fn launch(&mut self, vel: Vec2, settle_ticks: u32) {
        self.vel = vel;
        self.physics = true;
        self.physics_timer = settle_ticks;
    }

    pub fn distance(&self, other: &RigidBody) -> f32 {
        self.pos.distance(other.pos)
    }

    /// True when the body is above the top of the field (drawn as an arrow)
    pub fn above_field(&self) -> bool {
        self.pos.y < 0.0
    }

    /// One Euler step. Gravity is a flat per-step increment, not scaled by `dt`.
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.vel.y += self.gravity;
    }

    /// Reflect velocity off a surface with the given tangent.
    ///
    /// The normal component is reversed and scaled by elasticity, the
    /// tangential component scaled by friction. No-op for grounded bodies
    /// and degenerate tangents.
    pub fn bounce(&mut self, tangent: Vec2) {
        if !self.physics {
            return;
        }
        let t = tangent.normalize_or_zero();
        if t == Vec2::ZERO {
            return;
        }
        let n = Vec2::new(t.y, -t.x);

        let nv = -self.elasticity * n.dot(self.vel);
        let tv = self.friction * t.dot(self.vel);

        self.vel = n * nv + t * tv;
    }

    /// Advance one tick against the terrain.
    ///
    /// Returns `true` if the body hit the ground and bounced.
    pub fn step(&mut self, terrain: &Terrain, dt: f32) -> Result<bool, TerrainError> {
        if !self.physics {
            return Ok(false);
        }

        self.physics_timer = self.physics_timer.saturating_sub(1);
        self.integrate(dt);

        if !terrain.is_illegal_at(self.pos) {
            return Ok(false);
        }

        let hit = IVec2::new(self.pos.x as i32, self.pos.y as i32);
        let warp = terrain.warp_point(hit);
        log::trace!("Warped ({}, {}) to ({}, {})", hit.x, hit.y, warp.x, warp.y);
        self.pos = warp.as_vec2();
        self.bounce(terrain.contact_tangent(warp)?);
        Ok(true)
    }

    /// Ground the body if it has come to rest on the surface.
    ///
    /// A body sitting exactly on its column's surface stops once its
    /// horizontal speed drops under `settle_speed`, or once its physics
    /// timer has run out.
    pub fn try_settle(&mut self, terrain: &Terrain, settle_speed: f32) -> Result<bool, TerrainError> {
        if !self.physics {
            return Ok(false);
        }

        let x = self.pos.x as i32;
        let y = self.pos.y as i32;
        let slow = self.vel.x.abs() < settle_speed;

        if (slow || self.physics_timer == 0) && y == terrain.surface_y(x)? {
            self.physics = false;
            self.pos = IVec2::new(x, y).as_vec2();
            self.vel = Vec2::ZERO;
            return Ok(true);
        }
        Ok(false)
    }

    /// Keep a grounded body on the surface of its column
    pub fn snap_to_surface(&mut self, terrain: &Terrain) -> Result<(), TerrainError> {
        let x = self.pos.x as i32;
        self.pos = Vec2::new(x as f32, terrain.surface_y(x)? as f32);
        Ok(())
    }
}
