//! Grenade Duel - a two-player artillery game on destructible terrain
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain, rigid bodies, blasts, turns)
//! - `renderer`: Read-only snapshots for an external renderer
//! - `platform`: Tick pacing and sensor helpers for the host
//! - `settings`: Data-driven game balance

pub mod error;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{InputError, SettingsError, TerrainError};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Nominal tick rate of the simulation
    pub const FRAMES_PER_SECOND: u32 = 30;
    /// Gravity, added to vertical velocity once per tick (not scaled by dt)
    pub const GRAVITY: f32 = 9.8;
    /// Standard gravity, used to normalize accelerometer readings
    pub const STANDARD_GRAVITY: f32 = 9.8;

    /// Playing field defaults (screen pixels)
    pub const FIELD_WIDTH: usize = 480;
    pub const FIELD_HEIGHT: i32 = 320;

    /// Terrain random walk slope bound
    pub const MAX_SLOPE: i32 = 5;

    /// Player health
    pub const MAX_HEALTH: u32 = 100;
    /// Player sprite box, used as the giblet spawn area
    pub const PLAYER_WIDTH: u32 = 16;
    pub const PLAYER_HEIGHT: u32 = 24;
    pub const PLAYER_ELASTICITY: f32 = 0.3;
    pub const PLAYER_FRICTION: f32 = 0.2;

    /// Outside this distance a grenade does nothing
    pub const BLAST_RADIUS: u32 = 55;
    /// Inside this distance a grenade does full damage and full push
    pub const KILL_RADIUS: u32 = 5;
    /// The maximum speed a blast launches a body at
    pub const BLAST_POWER: f32 = 865.0;
    /// Random extra launch speed, uniform in [0, BLAST_SPREAD)
    pub const BLAST_SPREAD: u32 = 90;
    pub const GRENADE_MAX_DMG: u32 = MAX_HEALTH / 2;
    /// Ticks of forced physics after a blast launch
    pub const BLAST_SETTLE_TICKS: u32 = 50;

    pub const MAX_FALL_DMG: u32 = MAX_HEALTH / 4;
    /// Landing speed (along the surface normal) where fall damage starts
    pub const FALL_THRESHOLD: f32 = 25.0;
    /// Landing speed where fall damage peaks
    pub const FALL_MAX: f32 = 50.0;

    /// The grenade blows up this many ticks after the pin is pulled
    pub const GRENADE_FUSE: u32 = 150;
    pub const GRENADE_ELASTICITY: f32 = 0.5;
    pub const GRENADE_FRICTION: f32 = 0.5;
    /// Grenades spawn this far above the thrower's feet
    pub const GRENADE_RELEASE_OFFSET: f32 = 10.0;
    /// Scales accelerometer excess over 1g into throw speed
    pub const THROW_FACTOR: f32 = 1000.0;

    pub const GIBLET_CHUNKS: usize = 12;
    pub const GIBLET_ELASTICITY: f32 = 0.3;
    pub const GIBLET_FRICTION: f32 = 0.3;
    /// Oldest giblets are evicted past this count
    pub const MAX_GIBLETS: usize = 16 * GIBLET_CHUNKS;

    /// Bodies resting on the ground slower than this (horizontally) stop simulating
    pub const SETTLE_SPEED: f32 = 2.0;

    /// Blast clouds start opaque and fade by this much per tick
    pub const CLOUD_ALPHA: u8 = 255;
    pub const CLOUD_FADE: u8 = 10;
}
