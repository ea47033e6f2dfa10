//! Game state and the turn state machine
//!
//! Everything the simulation mutates lives here. The RNG is seeded once per
//! match and threaded through every random decision, so a seed plus a
//! sequence of intents reproduces a match exactly.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::RigidBody;
use super::cloud::Cloud;
use super::giblets::GibletPile;
use super::player::{Player, PlayerId};
use super::terrain::Terrain;
use crate::error::TerrainError;
use crate::settings::Settings;

/// A live grenade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grenade {
    pub body: RigidBody,
    /// Ticks until detonation
    pub fuse: u32,
}

/// Where the current turn is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Moving the crosshair, no grenade out
    Aiming,
    /// Throw screen up, waiting for the pin to be pulled
    ThrowMode,
    /// Pin pulled but grenade still in hand; the fuse is already burning
    FuseLit { fuse: u32 },
    /// Grenade thrown. Only one grenade can exist, and it lives here.
    InFlight(Grenade),
}

/// Things the host may want to play a sound or buzz for
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    FuseLit,
    GrenadeThrown { by: PlayerId },
    ExplosionOccurred { at: Vec2 },
    PlayerSplatted { player: PlayerId },
    TurnChanged { to: PlayerId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    Winner(PlayerId),
    Draw,
}

#[derive(Debug, Clone)]
pub struct GameState {
    /// Match seed for reproducibility
    pub seed: u64,
    pub settings: Settings,
    pub(crate) rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub terrain: Terrain,
    /// Indexed by [`PlayerId::index`]
    pub players: [Player; 2],
    pub giblets: GibletPile,
    pub clouds: Vec<Cloud>,
    pub crosshair: Vec2,
    pub phase: TurnPhase,
    /// Whose throw it is
    pub turn: PlayerId,
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    /// Start a match on freshly generated terrain.
    ///
    /// Red starts somewhere on the left half, Blue on the right half, and a
    /// coin flip decides who throws first.
    pub fn new(seed: u64, settings: Settings) -> Result<Self, TerrainError> {
        let mut rng = Pcg32::seed_from_u64(seed);
        let terrain = Terrain::generate(&settings.terrain_params(), &mut rng)?;

        let half = terrain.width() / 2;
        let red_x = rng.random_range(0..half) as i32;
        let blue_x = rng.random_range(half..terrain.width()) as i32;
        let turn = if rng.random_bool(0.5) {
            PlayerId::Red
        } else {
            PlayerId::Blue
        };

        let mut state = Self::assemble(seed, settings, rng, terrain, red_x, blue_x)?;
        state.turn = turn;
        log::info!(
            "Match started with seed {}: red at x={}, blue at x={}, {:?} throws first",
            seed,
            red_x,
            blue_x,
            turn
        );
        Ok(state)
    }

    /// Start a match on the given terrain with players at fixed columns.
    /// Red throws first.
    pub fn with_terrain(
        seed: u64,
        settings: Settings,
        terrain: Terrain,
        red_x: i32,
        blue_x: i32,
    ) -> Result<Self, TerrainError> {
        Self::assemble(seed, settings, Pcg32::seed_from_u64(seed), terrain, red_x, blue_x)
    }

    fn assemble(
        seed: u64,
        settings: Settings,
        rng: Pcg32,
        terrain: Terrain,
        red_x: i32,
        blue_x: i32,
    ) -> Result<Self, TerrainError> {
        let spawn = |id: PlayerId, x: i32| -> Result<Player, TerrainError> {
            let feet = Vec2::new(x as f32, terrain.surface_y(x)? as f32);
            let body = RigidBody::new(feet, settings.gravity)
                .with_material(settings.player_elasticity, settings.player_friction);
            Ok(Player::new(id, body))
        };
        let players = [spawn(PlayerId::Red, red_x)?, spawn(PlayerId::Blue, blue_x)?];
        let crosshair = Vec2::new(terrain.width() as f32 / 2.0, terrain.base() as f32 / 2.0);

        Ok(Self {
            seed,
            giblets: GibletPile::new(settings.max_giblets),
            settings,
            rng,
            time_ticks: 0,
            terrain,
            players,
            clouds: Vec::new(),
            crosshair,
            phase: TurnPhase::Aiming,
            turn: PlayerId::Red,
            events: Vec::new(),
        })
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.index()]
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id.index()]
    }

    /// The player whose turn it is
    pub fn thrower(&self) -> &Player {
        self.player(self.turn)
    }

    pub fn grenade(&self) -> Option<&Grenade> {
        match &self.phase {
            TurnPhase::InFlight(grenade) => Some(grenade),
            _ => None,
        }
    }

    /// Width and height of the playing field
    pub fn field_size(&self) -> Vec2 {
        Vec2::new(self.terrain.width() as f32, self.terrain.base() as f32)
    }

    /// True while any living player is still flying around
    pub fn bodies_in_motion(&self) -> bool {
        self.players
            .iter()
            .any(|p| p.is_alive() && p.body.physics_enabled())
    }

    /// Unit vector from the thrower to the crosshair
    pub fn aim_direction(&self) -> Option<Vec2> {
        (self.crosshair - self.thrower().body.pos).try_normalize()
    }

    pub fn match_result(&self) -> Option<MatchResult> {
        let mut alive = self.players.iter().filter(|p| p.is_alive());
        match (alive.next(), alive.next()) {
            (None, _) => Some(MatchResult::Draw),
            (Some(p), None) => Some(MatchResult::Winner(p.id)),
            _ => None,
        }
    }

    /// Events raised since the last drain
    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Hand the turn to the other player, unless they are dead
    pub(crate) fn pass_turn(&mut self) {
        let next = self.turn.other();
        if self.player(next).is_alive() {
            self.turn = next;
            self.events.push(GameEvent::TurnChanged { to: next });
            log::info!("{:?} to throw", next);
        }
    }
}
