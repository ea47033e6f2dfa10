//! Grenade Duel headless demo
//!
//! Plays a scripted, seeded match with no renderer attached and logs what
//! happens. Usage: `grenade-duel [seed] [settings.json]`

use std::time::Duration;

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use grenade_duel::consts::{STANDARD_GRAVITY, THROW_FACTOR};
use grenade_duel::platform::{TickClock, throw_power};
use grenade_duel::renderer::RenderSnapshot;
use grenade_duel::sim::{GameEvent, GameState, Intent, MatchResult, apply_intent, tick};
use grenade_duel::Settings;

/// Host frame spacing (60 Hz display)
const FRAME: Duration = Duration::from_micros(16_667);
const MAX_TURNS: u32 = 40;
/// Ticks the scripted thrower holds the grenade after pulling the pin
const HOLD_TICKS: u32 = 10;
/// Give up waiting for bodies to settle after this many ticks
const SETTLE_LIMIT: u32 = 3000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(s) => s.parse::<u64>()?,
        None => 1,
    };
    let settings = match args.next() {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let mut clock = TickClock::new(settings.tick_ms());
    let mut state = GameState::new(seed, settings)?;
    // Separate stream for the scripted players so their aim does not
    // perturb the match RNG
    let mut aim_rng = Pcg32::seed_from_u64(seed ^ 0x5eed);

    for turn in 1..=MAX_TURNS {
        run_until(&mut state, &mut clock, SETTLE_LIMIT, |s| !s.bodies_in_motion())?;
        if state.match_result().is_some() {
            break;
        }

        log::info!("Turn {}: {:?} to throw", turn, state.turn);
        take_turn(&mut state, &mut clock, &mut aim_rng)?;
        report(&mut state);
    }

    match state.match_result() {
        Some(MatchResult::Winner(id)) => log::info!("{:?} wins after {} ticks", id, state.time_ticks),
        Some(MatchResult::Draw) => log::info!("Draw after {} ticks", state.time_ticks),
        None => log::info!("No winner after {} turns", MAX_TURNS),
    }
    for p in &state.players {
        log::info!("{:?}: health {}", p.id, p.health());
    }
    log::debug!("Final frame: {}", RenderSnapshot::capture(&state).to_json()?);
    Ok(())
}

/// Aim at the opponent, light the fuse, hold, and throw at 45 degrees
fn take_turn(
    state: &mut GameState,
    clock: &mut TickClock,
    rng: &mut Pcg32,
) -> Result<(), Box<dyn std::error::Error>> {
    let from = state.thrower().body.pos;
    let target = state.player(state.turn.other()).body.pos;
    let dx = target.x - from.x;

    apply_intent(state, Intent::AimCrosshair(target - Vec2::new(0.0, 40.0)))?;
    apply_intent(state, Intent::EnterThrowMode)?;
    apply_intent(state, Intent::StartFuse)?;
    run_until(state, clock, HOLD_TICKS, |_| false)?;

    // Level-ground range at 45 degrees is v^2 / a, with a = gravity per tick / dt
    let accel = state.settings.gravity / state.settings.dt();
    let speed = (dx.abs() * accel).sqrt() * rng.random_range(0.85..1.15);
    // The scripted player flicks the phone just hard enough
    let reading = Vec3::new(0.0, 0.0, STANDARD_GRAVITY * (1.0 + speed / THROW_FACTOR));
    let power = throw_power(reading, THROW_FACTOR);

    let direction = Vec2::new(if dx < 0.0 { -1.0 } else { 1.0 }, -1.0);
    apply_intent(state, Intent::ReleaseThrow { direction, power })?;

    let limit = state.settings.grenade_fuse + 1;
    run_until(state, clock, limit, |s| s.grenade().is_none())?;
    Ok(())
}

/// Feed frames through the clock until `done` holds or `limit` ticks ran
fn run_until(
    state: &mut GameState,
    clock: &mut TickClock,
    limit: u32,
    done: impl Fn(&GameState) -> bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ran = 0;
    while ran < limit && !done(state) {
        for _ in 0..clock.advance(FRAME) {
            tick(state)?;
            ran += 1;
            if ran >= limit || done(state) {
                break;
            }
        }
    }
    Ok(())
}

fn report(state: &mut GameState) {
    for event in state.drain_events() {
        match event {
            GameEvent::ExplosionOccurred { at } => {
                log::info!("  boom at ({:.0}, {:.0})", at.x, at.y);
            }
            GameEvent::PlayerSplatted { player } => log::info!("  {:?} is down", player),
            other => log::debug!("  {:?}", other),
        }
    }
    for p in &state.players {
        log::info!("  {:?}: health {}", p.id, p.health());
    }
}
