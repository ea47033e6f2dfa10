//! Fixed timestep simulation tick
//!
//! One call advances everything by one frame, in a fixed order: the grenade
//! and its fuse, blast clouds, both players, then the giblets. Player input
//! arrives separately as [`Intent`]s, validated against the turn state.

use glam::{IVec2, Vec2};

use super::blast::Blast;
use super::body::RigidBody;
use super::cloud::{Cloud, age_clouds};
use super::giblets::make_giblets;
use super::player::{PlayerId, fall_damage};
use super::state::{GameEvent, GameState, Grenade, TurnPhase};
use super::vector::unit_normal;
use crate::error::{InputError, TerrainError};

/// A player action, applied between ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Move the crosshair (clamped to the field)
    AimCrosshair(Vec2),
    /// Bring up the throw screen
    EnterThrowMode,
    /// Pull the pin; the fuse starts burning
    StartFuse,
    /// Let go of the grenade
    ReleaseThrow { direction: Vec2, power: f32 },
}

/// Apply an intent for the player whose turn it is
pub fn apply_intent(state: &mut GameState, intent: Intent) -> Result<(), InputError> {
    match intent {
        Intent::AimCrosshair(target) => {
            if state.phase != TurnPhase::Aiming || state.bodies_in_motion() {
                return Err(InputError::CrosshairLocked);
            }
            state.crosshair = target.clamp(Vec2::ZERO, state.field_size());
        }
        Intent::EnterThrowMode => {
            match state.phase {
                TurnPhase::Aiming => {}
                TurnPhase::InFlight(_) => return Err(InputError::GrenadeActive),
                TurnPhase::ThrowMode | TurnPhase::FuseLit { .. } => {
                    return Err(InputError::AlreadyThrowing);
                }
            }
            if state.bodies_in_motion() {
                return Err(InputError::BodiesInMotion);
            }
            if state.thrower().is_dead() {
                return Err(InputError::ThrowerDead);
            }
            state.phase = TurnPhase::ThrowMode;
        }
        Intent::StartFuse => {
            if state.phase != TurnPhase::ThrowMode {
                return Err(InputError::NotInThrowMode);
            }
            state.phase = TurnPhase::FuseLit {
                fuse: state.settings.grenade_fuse,
            };
            state.events.push(GameEvent::FuseLit);
        }
        Intent::ReleaseThrow { direction, power } => {
            let TurnPhase::FuseLit { fuse } = state.phase else {
                return Err(InputError::FuseNotLit);
            };
            let unit = direction.normalize_or_zero();
            if unit == Vec2::ZERO || !power.is_finite() || power < 0.0 {
                return Err(InputError::InvalidThrow {
                    power,
                    x: direction.x,
                    y: direction.y,
                });
            }
            throw_grenade(state, unit * power, fuse);
        }
    }
    Ok(())
}

fn throw_grenade(state: &mut GameState, vel: Vec2, fuse: u32) {
    let settings = &state.settings;
    let start = state.thrower().body.pos - Vec2::new(0.0, settings.grenade_release_offset);
    let body = RigidBody::new(start, settings.gravity)
        .with_material(settings.grenade_elasticity, settings.grenade_friction)
        .with_velocity(vel);

    log::info!(
        "{:?} threw at ({:.1}, {:.1}) with {} ticks left",
        state.turn,
        vel.x,
        vel.y,
        fuse
    );
    state.phase = TurnPhase::InFlight(Grenade { body, fuse });
    state.events.push(GameEvent::GrenadeThrown { by: state.turn });
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState) -> Result<(), TerrainError> {
    state.time_ticks += 1;
    let dt = state.settings.dt();

    update_grenade(state, dt)?;
    age_clouds(&mut state.clouds);
    for id in PlayerId::ALL {
        update_player(state, id, dt)?;
    }
    update_giblets(state, dt)
}

/// Burn the fuse (in hand or in flight) and move a thrown grenade
fn update_grenade(state: &mut GameState, dt: f32) -> Result<(), TerrainError> {
    let detonation = match &mut state.phase {
        TurnPhase::FuseLit { fuse } => {
            *fuse = fuse.saturating_sub(1);
            None
        }
        TurnPhase::InFlight(grenade) => {
            grenade.fuse = grenade.fuse.saturating_sub(1);
            grenade.body.step(&state.terrain, dt)?;
            (grenade.fuse == 0).then_some(grenade.body.pos)
        }
        TurnPhase::Aiming | TurnPhase::ThrowMode => None,
    };

    if let Some(center) = detonation {
        detonate(state, center);
    }
    Ok(())
}

/// Blow up the grenade at `center` and end the turn
pub(crate) fn detonate(state: &mut GameState, center: Vec2) {
    let blast = Blast::new(center, &state.settings);
    let at = IVec2::new(center.x as i32, center.y as i32);

    state.terrain.carve_crater(at, state.settings.blast_radius as i32);
    state.clouds.push(Cloud::new(at));
    state.events.push(GameEvent::ExplosionOccurred { at: center });
    log::info!("Explosion at ({}, {})", at.x, at.y);

    for giblet in state.giblets.iter_mut() {
        blast.propel(giblet, &mut state.rng);
    }
    for id in PlayerId::ALL {
        blast_player(state, &blast, id);
    }

    state.phase = TurnPhase::Aiming;
    state.pass_turn();
}

fn blast_player(state: &mut GameState, blast: &Blast, id: PlayerId) {
    let settings = &state.settings;
    let player = &mut state.players[id.index()];
    if player.is_dead() {
        return;
    }
    let Some(scale) = blast.scale_at(player.body.pos) else {
        return;
    };

    if player.take_damage(blast.damage(scale) as i32) {
        let bounds = player.bounds(settings.player_width, settings.player_height);
        let mut batch = make_giblets(&bounds, settings, &mut state.rng);
        for giblet in &mut batch {
            blast.propel(giblet, &mut state.rng);
        }
        state.giblets.add_batch(batch);
        state.events.push(GameEvent::PlayerSplatted { player: id });
        log::info!("{:?} was blown apart", id);
    } else {
        blast.propel(&mut player.body, &mut state.rng);
        log::debug!("{:?} hit for {} damage", id, blast.damage(scale));
    }
}

fn update_player(state: &mut GameState, id: PlayerId, dt: f32) -> Result<(), TerrainError> {
    let settings = &state.settings;
    let player = &mut state.players[id.index()];
    if player.is_dead() {
        return Ok(());
    }

    if player.body.step(&state.terrain, dt)? {
        let x = player.body.pos.x as i32;
        let normal = unit_normal(state.terrain.slope_at(x)?);
        let speed = normal.dot(player.body.vel).abs();
        let damage = fall_damage(
            speed,
            settings.fall_threshold,
            settings.fall_max,
            settings.max_fall_damage,
        );

        if player.take_damage(damage as i32) {
            let bounds = player.bounds(settings.player_width, settings.player_height);
            let mut batch = make_giblets(&bounds, settings, &mut state.rng);
            for giblet in &mut batch {
                giblet.vel = player.body.vel;
            }
            state.giblets.add_batch(batch);
            state.events.push(GameEvent::PlayerSplatted { player: id });
            log::info!("{:?} splatted on landing", id);
            return Ok(());
        }
        if damage > 0 {
            log::debug!("{:?} took {} fall damage", id, damage);
        }
    }

    player.body.try_settle(&state.terrain, settings.settle_speed)?;
    if !player.body.physics_enabled() {
        player.body.snap_to_surface(&state.terrain)?;
    }
    player.next_frame();
    Ok(())
}

fn update_giblets(state: &mut GameState, dt: f32) -> Result<(), TerrainError> {
    let settle_speed = state.settings.settle_speed;
    for giblet in state.giblets.iter_mut() {
        if giblet.physics_enabled() {
            giblet.step(&state.terrain, dt)?;
            giblet.try_settle(&state.terrain, settle_speed)?;
        } else {
            giblet.snap_to_surface(&state.terrain)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::player::Bounds;
    use crate::sim::state::MatchResult;
    use crate::sim::terrain::Terrain;

    /// Flat field, surface at screen y 290. Red at x=20, Blue at x=180.
    fn duel() -> GameState {
        let terrain = Terrain::flat(200, 10, 300).unwrap();
        GameState::with_terrain(42, Settings::default(), terrain, 20, 180).unwrap()
    }

    fn throw(state: &mut GameState, direction: Vec2, power: f32) {
        apply_intent(state, Intent::EnterThrowMode).unwrap();
        apply_intent(state, Intent::StartFuse).unwrap();
        apply_intent(state, Intent::ReleaseThrow { direction, power }).unwrap();
    }

    #[test]
    fn test_throw_sequence() {
        let mut state = duel();
        apply_intent(&mut state, Intent::AimCrosshair(Vec2::new(100.0, 100.0))).unwrap();
        apply_intent(&mut state, Intent::EnterThrowMode).unwrap();
        assert_eq!(
            apply_intent(&mut state, Intent::EnterThrowMode),
            Err(InputError::AlreadyThrowing)
        );
        assert_eq!(
            apply_intent(&mut state, Intent::AimCrosshair(Vec2::ZERO)),
            Err(InputError::CrosshairLocked)
        );
        apply_intent(&mut state, Intent::StartFuse).unwrap();
        assert_eq!(state.phase, TurnPhase::FuseLit { fuse: 150 });

        let direction = state.aim_direction().unwrap();
        apply_intent(&mut state, Intent::ReleaseThrow { direction, power: 300.0 }).unwrap();

        let grenade = state.grenade().unwrap();
        assert_eq!(grenade.body.pos, Vec2::new(20.0, 280.0));
        assert!((grenade.body.vel.length() - 300.0).abs() < 1e-3);
        assert_eq!(grenade.fuse, 150);
        assert_eq!(
            apply_intent(&mut state, Intent::EnterThrowMode),
            Err(InputError::GrenadeActive)
        );
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::FuseLit, GameEvent::GrenadeThrown { by: PlayerId::Red }]
        );
    }

    #[test]
    fn test_out_of_order_intents_rejected() {
        let mut state = duel();
        assert_eq!(apply_intent(&mut state, Intent::StartFuse), Err(InputError::NotInThrowMode));
        let release = Intent::ReleaseThrow {
            direction: Vec2::X,
            power: 10.0,
        };
        assert_eq!(apply_intent(&mut state, release), Err(InputError::FuseNotLit));

        apply_intent(&mut state, Intent::EnterThrowMode).unwrap();
        apply_intent(&mut state, Intent::StartFuse).unwrap();
        for bad in [
            Intent::ReleaseThrow { direction: Vec2::ZERO, power: 10.0 },
            Intent::ReleaseThrow { direction: Vec2::X, power: f32::NAN },
            Intent::ReleaseThrow { direction: Vec2::X, power: -1.0 },
        ] {
            assert!(matches!(
                apply_intent(&mut state, bad),
                Err(InputError::InvalidThrow { .. })
            ));
        }
        assert!(state.grenade().is_none());
    }

    #[test]
    fn test_no_throw_while_players_move() {
        let mut state = duel();
        state.player_mut(PlayerId::Blue).body.launch(Vec2::new(0.0, -100.0), 50);
        assert_eq!(
            apply_intent(&mut state, Intent::EnterThrowMode),
            Err(InputError::BodiesInMotion)
        );
        assert_eq!(
            apply_intent(&mut state, Intent::AimCrosshair(Vec2::ZERO)),
            Err(InputError::CrosshairLocked)
        );
    }

    #[test]
    fn test_crosshair_clamped_to_field() {
        let mut state = duel();
        apply_intent(&mut state, Intent::AimCrosshair(Vec2::new(-40.0, 900.0))).unwrap();
        assert_eq!(state.crosshair, Vec2::new(0.0, 300.0));
    }

    #[test]
    fn test_grenade_detonates_and_turn_passes() {
        let mut state = duel();
        throw(&mut state, Vec2::new(1.0, -2.0), 300.0);
        state.drain_events();

        for _ in 0..149 {
            tick(&mut state).unwrap();
            assert!(state.grenade().is_some());
        }
        tick(&mut state).unwrap();

        assert!(state.grenade().is_none());
        assert_eq!(state.phase, TurnPhase::Aiming);
        assert_eq!(state.turn, PlayerId::Blue);
        assert_eq!(state.clouds.len(), 1);
        let events = state.drain_events();
        assert!(matches!(events[0], GameEvent::ExplosionOccurred { .. }));
        assert_eq!(events.last(), Some(&GameEvent::TurnChanged { to: PlayerId::Blue }));
    }

    #[test]
    fn test_fuse_burns_in_hand() {
        let mut state = duel();
        apply_intent(&mut state, Intent::EnterThrowMode).unwrap();
        apply_intent(&mut state, Intent::StartFuse).unwrap();
        for _ in 0..200 {
            tick(&mut state).unwrap();
        }
        assert_eq!(state.phase, TurnPhase::FuseLit { fuse: 0 });

        let release = Intent::ReleaseThrow {
            direction: Vec2::new(0.0, -1.0),
            power: 50.0,
        };
        apply_intent(&mut state, release).unwrap();
        tick(&mut state).unwrap();
        assert!(state.grenade().is_none());
        assert!(
            state
                .pending_events()
                .iter()
                .any(|e| matches!(e, GameEvent::ExplosionOccurred { .. }))
        );
    }

    #[test]
    fn test_huge_throw_survives_full_fuse() {
        // Powerful enough to fling the grenade past i32 range in a single tick
        for direction in [
            Vec2::new(0.0, -1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(-1.0, 0.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(-1.0, 1.0),
        ] {
            let mut state = GameState::new(7, Settings::default()).unwrap();
            throw(&mut state, direction, 1e12);
            state.drain_events();

            for _ in 0..state.settings.grenade_fuse {
                tick(&mut state).unwrap();
            }
            assert!(state.grenade().is_none(), "{direction:?}");
            assert!(matches!(
                state.drain_events().first(),
                Some(GameEvent::ExplosionOccurred { .. })
            ));
        }
    }

    #[test]
    fn test_mid_air_detonation() {
        let settings = Settings::default();
        let dt = settings.dt();
        let start = Vec2::new(200.0, 1000.0);
        let launch = Vec2::new(0.0, -400.0);

        // Where the grenade ends up after a full fuse of free flight
        let mut probe = RigidBody::new(start, settings.gravity).with_velocity(launch);
        for _ in 0..settings.grenade_fuse {
            probe.integrate(dt);
        }
        let end = probe.pos;

        // Ground 20px under the detonation point
        let base = end.y as i32 + 120;
        let terrain = Terrain::flat(400, 100, base).unwrap();
        let mut state = GameState::with_terrain(5, settings.clone(), terrain, 10, 390).unwrap();
        let body = RigidBody::new(start, settings.gravity)
            .with_material(settings.grenade_elasticity, settings.grenade_friction)
            .with_velocity(launch);
        state.phase = TurnPhase::InFlight(Grenade { body, fuse: settings.grenade_fuse });

        for _ in 1..settings.grenade_fuse {
            tick(&mut state).unwrap();
        }
        assert!(state.grenade().is_some());
        tick(&mut state).unwrap();
        assert!(state.grenade().is_none());

        let events = state.drain_events();
        assert_eq!(events[0], GameEvent::ExplosionOccurred { at: end });
        // The crater bottoms out 55px below the blast; ground was 20px below it
        assert_eq!(state.terrain.height_at(200).unwrap(), 65);
        for x in (0..145).chain(256..400) {
            assert_eq!(state.terrain.height_at(x).unwrap(), 100);
        }
        assert_eq!(state.player(PlayerId::Red).health(), 100);
        assert_eq!(state.player(PlayerId::Blue).health(), 100);
    }

    #[test]
    fn test_direct_hit_kills() {
        let settings = Settings {
            grenade_max_damage: 100,
            ..Default::default()
        };
        let terrain = Terrain::flat(200, 10, 300).unwrap();
        let mut state = GameState::with_terrain(9, settings, terrain, 20, 180).unwrap();
        let feet = state.player(PlayerId::Red).body.pos;
        let bounds = Bounds::standing_at(feet, 16, 24);

        detonate(&mut state, feet);

        let red = state.player(PlayerId::Red);
        assert!(red.is_dead());
        assert_eq!(red.health(), 0);
        assert_eq!(state.giblets.len(), 12);
        for giblet in state.giblets.iter() {
            assert!(bounds.contains(IVec2::new(giblet.pos.x as i32, giblet.pos.y as i32)));
            assert!(giblet.physics_enabled());
            assert!(giblet.vel.length() > 0.0);
        }
        assert!(state.pending_events().contains(&GameEvent::PlayerSplatted { player: PlayerId::Red }));
        assert_eq!(state.match_result(), Some(MatchResult::Winner(PlayerId::Blue)));
        assert_eq!(state.turn, PlayerId::Blue);
    }

    #[test]
    fn test_distant_blast_is_harmless() {
        let mut state = duel();
        let feet = state.player(PlayerId::Red).body.pos;
        detonate(&mut state, feet + Vec2::new(56.0, 0.0));

        let red = state.player(PlayerId::Red);
        assert_eq!(red.health(), 100);
        assert!(!red.body.physics_enabled());
        assert_eq!(red.body.vel, Vec2::ZERO);
        assert!(state.giblets.is_empty());
    }

    #[test]
    fn test_blast_wounds_and_launches() {
        let mut state = duel();
        let feet = state.player(PlayerId::Red).body.pos;
        // Halfway through the falloff band
        detonate(&mut state, feet + Vec2::new(30.0, 0.0));

        let red = state.player(PlayerId::Red);
        assert_eq!(red.health(), 75);
        assert!(red.body.physics_enabled());
        assert!(red.body.vel.x < 0.0);
        assert!(state.bodies_in_motion());
    }

    #[test]
    fn test_hard_landing_hurts() {
        let mut state = duel();
        let red = state.player_mut(PlayerId::Red);
        red.body.pos = Vec2::new(20.0, 289.0);
        red.body.launch(Vec2::new(0.0, 1500.0), 0);

        tick(&mut state).unwrap();

        let red = state.player(PlayerId::Red);
        assert_eq!(red.health(), 75);
        assert!(!red.body.physics_enabled());
        assert_eq!(red.body.pos, Vec2::new(20.0, 290.0));
    }

    #[test]
    fn test_fatal_landing_spawns_giblets_with_momentum() {
        let mut state = duel();
        let red = state.player_mut(PlayerId::Red);
        red.take_damage(80);
        red.body.pos = Vec2::new(20.0, 289.0);
        red.body.launch(Vec2::new(0.0, 1500.0), 0);

        tick(&mut state).unwrap();

        assert!(state.player(PlayerId::Red).is_dead());
        let rebound = state.player(PlayerId::Red).body.vel;
        assert!(rebound.y < 0.0);
        assert_eq!(state.giblets.len(), 12);
        for giblet in state.giblets.iter() {
            // Rebound velocity plus one step of gravity
            assert_eq!(giblet.vel.x, rebound.x);
            assert!((giblet.vel.y - (rebound.y + 9.8)).abs() < 1e-3);
        }
        assert_eq!(state.pending_events(), &[GameEvent::PlayerSplatted { player: PlayerId::Red }]);
    }

    #[test]
    fn test_settled_giblets_follow_the_ground() {
        let mut state = duel();
        let mut giblet = RigidBody::new(Vec2::new(100.0, 290.0), 9.8);
        giblet.set_physics(false);
        state.giblets.add_batch(vec![giblet]);

        state.terrain.offset(100, -4).unwrap();
        tick(&mut state).unwrap();
        assert_eq!(state.giblets.iter().next().unwrap().pos, Vec2::new(100.0, 294.0));
    }

    #[test]
    fn test_clouds_fade_away() {
        let mut state = duel();
        state.clouds.push(Cloud::new(IVec2::new(50, 50)));
        for _ in 0..25 {
            tick(&mut state).unwrap();
        }
        assert_eq!(state.clouds.len(), 1);
        tick(&mut state).unwrap();
        assert!(state.clouds.is_empty());
    }

    #[test]
    fn test_replay_is_deterministic() {
        let run = || {
            let mut state = GameState::new(2024, Settings::default()).unwrap();
            for round in 0..4 {
                let direction = if round % 2 == 0 {
                    Vec2::new(1.0, -1.0)
                } else {
                    Vec2::new(-1.0, -1.0)
                };
                // Wait for the field to come to rest
                for _ in 0..2000 {
                    if !state.bodies_in_motion() {
                        break;
                    }
                    tick(&mut state).unwrap();
                }
                if state.match_result().is_some() {
                    break;
                }
                throw(&mut state, direction, 250.0);
                for _ in 0..160 {
                    tick(&mut state).unwrap();
                }
            }
            state
        };

        let a = run();
        let b = run();
        assert_eq!(a.terrain, b.terrain);
        assert_eq!(a.turn, b.turn);
        assert_eq!(a.time_ticks, b.time_ticks);
        for id in PlayerId::ALL {
            assert_eq!(a.player(id).body, b.player(id).body);
            assert_eq!(a.player(id).health(), b.player(id).health());
        }
        let pile = |s: &GameState| s.giblets.iter().cloned().collect::<Vec<_>>();
        assert_eq!(pile(&a), pile(&b));
    }
}
