//! Error types
//!
//! Terrain errors are precondition violations (a column index the caller
//! should have validated). Input errors are intents rejected by the turn
//! state machine; the host can ignore them or surface them to the player.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TerrainError {
    #[error("terrain column {x} out of range (width {width})")]
    ColumnOutOfRange { x: i32, width: usize },

    #[error(
        "invalid terrain dimensions: width {width}, heights {min_height}..{max_height}"
    )]
    InvalidDimensions {
        width: usize,
        min_height: u32,
        max_height: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("a grenade is already in flight")]
    GrenadeActive,

    #[error("already throwing")]
    AlreadyThrowing,

    #[error("players are still moving")]
    BodiesInMotion,

    #[error("not in throw mode")]
    NotInThrowMode,

    #[error("the fuse has not been lit")]
    FuseNotLit,

    #[error("the throwing player is dead")]
    ThrowerDead,

    #[error("crosshair can only move while aiming")]
    CrosshairLocked,

    #[error("invalid throw: power {power}, direction ({x}, {y})")]
    InvalidThrow { power: f32, x: f32, y: f32 },
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("setting `{name}` = {value} is out of range (expected {expected})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },
}
