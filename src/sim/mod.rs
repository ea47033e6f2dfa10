//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable update order (grenade, clouds, red, blue, giblets)
//! - No rendering or platform dependencies

pub mod blast;
pub mod body;
pub mod cloud;
pub mod giblets;
pub mod player;
pub mod state;
pub mod terrain;
pub mod tick;
pub mod vector;

pub use blast::Blast;
pub use body::RigidBody;
pub use cloud::Cloud;
pub use giblets::GibletPile;
pub use player::{Bounds, Player, PlayerId, fall_damage};
pub use state::{GameEvent, GameState, Grenade, MatchResult, TurnPhase};
pub use terrain::{Terrain, TerrainParams};
pub use tick::{Intent, apply_intent, tick};
