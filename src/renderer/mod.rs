//! Read-only render surface
//!
//! Drawing happens outside this crate. A renderer takes a [`RenderSnapshot`]
//! each frame and never touches the live [`GameState`]. Terrain is the one
//! expensive thing to redraw, so [`TerrainCache`] rebuilds its column spans
//! only when the terrain has actually changed.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::sim::{Cloud, GameState, PlayerId, Terrain, TurnPhase};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub health: u32,
    pub displayed_health: u32,
    /// Health ring arc, in degrees
    pub ring_sweep: f32,
    pub dead: bool,
    pub grounded: bool,
    /// Off the top of the screen; drawn as an arrow at the edge
    pub above_field: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrenadeView {
    pub pos: Vec2,
    pub fuse: u32,
    pub above_field: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseView {
    Aiming,
    ThrowMode,
    FuseLit,
    InFlight,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub tick: u64,
    pub heights: Vec<u32>,
    pub base: i32,
    pub terrain_generation: u64,
    pub players: Vec<PlayerView>,
    pub grenade: Option<GrenadeView>,
    pub giblets: Vec<Vec2>,
    /// Giblets still moving; the rest are resting on the ground
    pub giblets_in_flight: usize,
    pub clouds: Vec<Cloud>,
    pub crosshair: Vec2,
    pub phase: PhaseView,
    pub turn: PlayerId,
}

impl RenderSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let players = state
            .players
            .iter()
            .map(|p| PlayerView {
                id: p.id,
                pos: p.body.pos,
                vel: p.body.vel,
                health: p.health(),
                displayed_health: p.displayed_health(),
                ring_sweep: p.ring_sweep(),
                dead: p.is_dead(),
                grounded: !p.body.physics_enabled(),
                above_field: p.body.above_field(),
            })
            .collect();

        let grenade = state.grenade().map(|g| GrenadeView {
            pos: g.body.pos,
            fuse: g.fuse,
            above_field: g.body.above_field(),
        });

        let phase = match state.phase {
            TurnPhase::Aiming => PhaseView::Aiming,
            TurnPhase::ThrowMode => PhaseView::ThrowMode,
            TurnPhase::FuseLit { .. } => PhaseView::FuseLit,
            TurnPhase::InFlight(_) => PhaseView::InFlight,
        };

        Self {
            tick: state.time_ticks,
            heights: state.terrain.heights().to_vec(),
            base: state.terrain.base(),
            terrain_generation: state.terrain.generation(),
            players,
            grenade,
            giblets: state.giblets.iter().map(|g| g.pos).collect(),
            giblets_in_flight: state.giblets.in_flight(),
            clouds: state.clouds.clone(),
            crosshair: state.crosshair,
            phase,
            turn: state.turn,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Vertical ground span of one column, top (surface) to bottom (base)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpan {
    pub top: IVec2,
    pub bottom: IVec2,
}

/// Terrain column spans, rebuilt when the terrain generation moves on
#[derive(Debug, Clone, Default)]
pub struct TerrainCache {
    generation: Option<u64>,
    spans: Vec<ColumnSpan>,
    rebuilds: u64,
}

impl TerrainCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the cache up to date. Returns `true` if it was rebuilt.
    pub fn sync(&mut self, terrain: &Terrain) -> bool {
        if self.generation == Some(terrain.generation()) && self.spans.len() == terrain.width() {
            return false;
        }

        let base = terrain.base();
        self.spans = terrain
            .heights()
            .iter()
            .enumerate()
            .map(|(x, &h)| ColumnSpan {
                top: IVec2::new(x as i32, base - h as i32),
                bottom: IVec2::new(x as i32, base),
            })
            .collect();
        self.generation = Some(terrain.generation());
        self.rebuilds += 1;
        log::debug!("Terrain cache rebuilt at generation {}", terrain.generation());
        true
    }

    pub fn spans(&self) -> &[ColumnSpan] {
        &self.spans
    }

    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}
