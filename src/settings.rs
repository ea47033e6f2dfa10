//! Game settings and balance tuning
//!
//! Every field defaults to the matching constant in [`crate::consts`].
//! Settings load from JSON; missing keys fall back to the defaults, so a
//! file can override just the values you care about.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;
use crate::sim::TerrainParams;

/// Runtime-tunable physics and gameplay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Field ===
    pub field_width: usize,
    pub field_height: i32,

    // === Timing ===
    /// Nominal tick rate; the tick duration is `1000 / frames_per_second` ms
    pub frames_per_second: u32,

    // === Physics ===
    pub gravity: f32,
    pub settle_speed: f32,
    pub blast_settle_ticks: u32,

    // === Grenade ===
    pub grenade_fuse: u32,
    pub grenade_elasticity: f32,
    pub grenade_friction: f32,
    pub grenade_release_offset: f32,

    // === Blast ===
    pub blast_radius: u32,
    pub kill_radius: u32,
    pub blast_power: f32,
    pub blast_spread: u32,
    pub grenade_max_damage: u32,

    // === Players ===
    pub player_width: u32,
    pub player_height: u32,
    pub player_elasticity: f32,
    pub player_friction: f32,
    pub max_fall_damage: u32,
    pub fall_threshold: f32,
    pub fall_max: f32,

    // === Debris ===
    pub giblet_chunks: usize,
    pub giblet_elasticity: f32,
    pub giblet_friction: f32,
    pub max_giblets: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,

            frames_per_second: FRAMES_PER_SECOND,

            gravity: GRAVITY,
            settle_speed: SETTLE_SPEED,
            blast_settle_ticks: BLAST_SETTLE_TICKS,

            grenade_fuse: GRENADE_FUSE,
            grenade_elasticity: GRENADE_ELASTICITY,
            grenade_friction: GRENADE_FRICTION,
            grenade_release_offset: GRENADE_RELEASE_OFFSET,

            blast_radius: BLAST_RADIUS,
            kill_radius: KILL_RADIUS,
            blast_power: BLAST_POWER,
            blast_spread: BLAST_SPREAD,
            grenade_max_damage: GRENADE_MAX_DMG,

            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            player_elasticity: PLAYER_ELASTICITY,
            player_friction: PLAYER_FRICTION,
            max_fall_damage: MAX_FALL_DMG,
            fall_threshold: FALL_THRESHOLD,
            fall_max: FALL_MAX,

            giblet_chunks: GIBLET_CHUNKS,
            giblet_elasticity: GIBLET_ELASTICITY,
            giblet_friction: GIBLET_FRICTION,
            max_giblets: MAX_GIBLETS,
        }
    }
}

impl Settings {
    /// Milliseconds per tick
    pub fn tick_ms(&self) -> u32 {
        1000 / self.frames_per_second.max(1)
    }

    /// Fixed simulation timestep in seconds
    pub fn dt(&self) -> f32 {
        self.tick_ms() as f32 / 1000.0
    }

    /// Terrain generation bounds for this field
    pub fn terrain_params(&self) -> TerrainParams {
        TerrainParams::for_field(self.field_width, self.field_height)
    }

    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would break the simulation's arithmetic
    pub fn validate(&self) -> Result<(), SettingsError> {
        fn out_of_range(
            name: &'static str,
            value: impl Into<f64>,
            expected: &'static str,
        ) -> Result<(), SettingsError> {
            Err(SettingsError::OutOfRange {
                name,
                value: value.into(),
                expected,
            })
        }

        if !(1..=1000).contains(&self.frames_per_second) {
            return out_of_range("frames_per_second", self.frames_per_second, "1..=1000");
        }
        if self.field_width < 2 {
            return out_of_range("field_width", self.field_width as f64, ">= 2");
        }
        if self.field_height < 4 {
            return out_of_range("field_height", self.field_height, ">= 4");
        }
        if self.kill_radius >= self.blast_radius {
            return out_of_range("kill_radius", self.kill_radius, "< blast_radius");
        }
        if !(self.fall_max > self.fall_threshold) {
            return out_of_range("fall_max", self.fall_max, "> fall_threshold");
        }
        if self.player_width == 0 {
            return out_of_range("player_width", self.player_width, ">= 1");
        }
        if self.player_height == 0 {
            return out_of_range("player_height", self.player_height, ">= 1");
        }
        for (name, value) in [
            ("gravity", self.gravity),
            ("blast_power", self.blast_power),
            ("settle_speed", self.settle_speed),
            ("grenade_release_offset", self.grenade_release_offset),
        ] {
            if !value.is_finite() {
                return out_of_range(name, value, "a finite number");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.tick_ms(), 33);
        assert!((settings.dt() - 0.033).abs() < 1e-6);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "gravity": 4.5, "blast_radius": 80 }"#).unwrap();
        assert_eq!(settings.gravity, 4.5);
        assert_eq!(settings.blast_radius, 80);
        assert_eq!(settings.grenade_fuse, GRENADE_FUSE);
        assert_eq!(settings.giblet_chunks, GIBLET_CHUNKS);
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings {
            frames_per_second: 60,
            ..Default::default()
        };
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_rejects_kill_radius_outside_blast() {
        let err = Settings::from_json(r#"{ "kill_radius": 60 }"#).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::OutOfRange { name: "kill_radius", .. }
        ));
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_zero_tick_rate() {
        let settings = Settings {
            frames_per_second: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
