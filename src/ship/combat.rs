//! Firing, projectile lifetime, power-up activation, the highlight glow and
//! respawn.
//!
//! ## Cannon rotation
//!
//! Every call to [`fire`] takes the cannon from [`CannonCycle::advance`], so
//! consecutive shots leave from Right, Left, Top, Right, …  The cycle moves on
//! even when no projectile could be spawned (no projectile type configured,
//! or the cannon socket is missing from the mesh).
//!
//! ## Projectile collision groups
//!
//! | Entity        | Group   | Collides with |
//! |---------------|---------|---------------|
//! | Hazards       | GROUP_1 | 2, 3          |
//! | Ship capsule  | GROUP_2 | 1, 4          |
//! | Projectiles   | GROUP_3 | 1             |
//! | Fuel capsules | GROUP_4 | 2             |

use super::state::{
    socket_world_transform, Cannon, CannonCycle, HighlightGlow, MeshSockets, PlayerProjectile,
    PlayerShip, ShipFireCooldown, ShipIntent, ShipParts,
};
use super::spawn_player_ship;
use crate::audio::{play_cue, ShipSounds};
use crate::config::{ParticleTemplate, ShipConfig};
use crate::particles::spawn_burst;
use crate::player_state::PlayerState;
use crate::stage::{Hazard, StageEntity};
use bevy::prelude::*;
use bevy_rapier2d::geometry::Group;
use bevy_rapier2d::prelude::*;
use std::collections::HashSet;

/// Result of one [`fire`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    /// Cannon this call used.
    pub cannon: Cannon,
    /// The spawned projectile, if any.
    pub projectile: Option<Entity>,
}

// ── Firing ────────────────────────────────────────────────────────────────────

/// Fire one round from the next cannon in the cycle.
///
/// The projectile spawns at the cannon socket's world transform and flies
/// along the socket's +X.  The fire sound plays whenever a sound is
/// configured, independent of whether a projectile spawned.
pub fn fire(
    commands: &mut Commands,
    cycle: &mut CannonCycle,
    ship: &Transform,
    sockets: &MeshSockets,
    config: &ShipConfig,
    sounds: &ShipSounds,
) -> Shot {
    let cannon = cycle.advance();

    let projectile = config.projectile.as_ref().and_then(|spec| {
        let spawn = socket_world_transform(ship, sockets, cannon.socket_name(config))?;
        let direction = spawn.rotation.mul_vec3(Vec3::X).truncate();
        let entity = commands
            .spawn((
                PlayerProjectile {
                    age: 0.0,
                    lifetime: spec.lifetime,
                    cannon,
                    spent: false,
                },
                StageEntity,
                spawn,
                Visibility::default(),
                RigidBody::KinematicVelocityBased,
                Velocity {
                    linvel: direction * spec.speed,
                    angvel: 0.0,
                },
                Collider::ball(spec.collider_radius),
                Sensor,
                Ccd { enabled: true },
                CollisionGroups::new(Group::GROUP_3, Group::GROUP_1),
                ActiveCollisionTypes::all(),
                ActiveEvents::COLLISION_EVENTS,
            ))
            .id();
        Some(entity)
    });

    play_cue(commands, sounds.fire.as_ref());
    Shot { cannon, projectile }
}

/// Fire while the intent asks for it, at most once per `fire_cooldown`.
#[allow(clippy::too_many_arguments)]
pub fn ship_fire_system(
    mut commands: Commands,
    mut q_ship: Query<(&Transform, &mut CannonCycle, &ShipParts), With<PlayerShip>>,
    q_sockets: Query<&MeshSockets>,
    intent: Res<ShipIntent>,
    mut cooldown: ResMut<ShipFireCooldown>,
    config: Res<ShipConfig>,
    sounds: Res<ShipSounds>,
    time: Res<Time>,
) {
    cooldown.timer = (cooldown.timer - time.delta_secs()).max(0.0);

    let Ok((transform, mut cycle, parts)) = q_ship.single_mut() else {
        return;
    };
    if !intent.fire || cooldown.timer > 0.0 {
        return;
    }
    cooldown.timer = config.fire_cooldown;

    let empty = MeshSockets::default();
    let sockets = q_sockets.get(parts.mesh).unwrap_or(&empty);
    let shot = fire(&mut commands, &mut cycle, transform, sockets, &config, &sounds);
    if shot.projectile.is_none() {
        debug!("{:?} cannon fired without a projectile", shot.cannon);
    }
}

// ── Projectile lifetime ───────────────────────────────────────────────────────

/// Age projectiles and despawn them once expired or spent.
pub fn projectile_lifetime_system(
    mut commands: Commands,
    mut q: Query<(Entity, &mut PlayerProjectile)>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();
    for (entity, mut projectile) in q.iter_mut() {
        projectile.age += dt;
        if projectile.age >= projectile.lifetime || projectile.spent {
            commands.entity(entity).despawn();
        }
    }
}

/// Destroy hazards hit by player projectiles and award the score.
///
/// Each projectile and each hazard is processed at most once per frame.
pub fn projectile_hazard_hit_system(
    mut commands: Commands,
    mut collision_events: MessageReader<CollisionEvent>,
    mut q_proj: Query<&mut PlayerProjectile>,
    q_hazards: Query<&Transform, With<Hazard>>,
    mut player: ResMut<PlayerState>,
    config: Res<ShipConfig>,
) {
    let mut processed_hazards: HashSet<Entity> = HashSet::new();
    let mut processed_projectiles: HashSet<Entity> = HashSet::new();

    for event in collision_events.read() {
        let (e1, e2) = match event {
            CollisionEvent::Started(e1, e2, _) => (*e1, *e2),
            CollisionEvent::Stopped(..) => continue,
        };

        let (proj_entity, hazard_entity) = if q_proj.contains(e1) && q_hazards.contains(e2) {
            (e1, e2)
        } else if q_proj.contains(e2) && q_hazards.contains(e1) {
            (e2, e1)
        } else {
            continue;
        };

        if processed_projectiles.contains(&proj_entity)
            || processed_hazards.contains(&hazard_entity)
        {
            continue;
        }
        let Ok(mut projectile) = q_proj.get_mut(proj_entity) else {
            continue;
        };
        if projectile.spent {
            continue;
        }
        let Ok(hazard_transform) = q_hazards.get(hazard_entity) else {
            continue;
        };

        processed_projectiles.insert(proj_entity);
        processed_hazards.insert(hazard_entity);
        projectile.spent = true;

        if let Some(template) = config.explosion.as_ref() {
            let debris = ParticleTemplate {
                count: (template.count / 3).max(1),
                ..template.clone()
            };
            spawn_burst(
                &mut commands,
                hazard_transform.translation.truncate(),
                0.0,
                &debris,
            );
        }
        commands.entity(hazard_entity).despawn();
        player.score += config.hazard_score;
    }
}

// ── Power-ups ─────────────────────────────────────────────────────────────────

/// Activate the selected power-up on request, or run the window down.
///
/// Activation needs a live ship and an open window.  A window that runs out
/// closes silently.
pub fn power_up_activation_system(
    mut commands: Commands,
    q_ship: Query<(), With<PlayerShip>>,
    intent: Res<ShipIntent>,
    mut player: ResMut<PlayerState>,
    sounds: Res<ShipSounds>,
    time: Res<Time>,
) {
    if intent.activate_power_up && q_ship.single().is_ok() {
        if let Some(power_up) = player.activate_power_up() {
            play_cue(&mut commands, sounds.activate_power_up.as_ref());
            info!(
                "Activated {} (level {})",
                power_up.label(),
                player.power_up_level(power_up)
            );
            return;
        }
    }
    if player.tick_activation_window(time.delta_secs()) {
        debug!("Power-up activation window closed");
    }
}

/// Oscillate the ship's glow while the activation mode is open; back to Idle
/// otherwise.
pub fn highlight_glow_system(
    mut q: Query<&mut HighlightGlow, With<PlayerShip>>,
    player: Res<PlayerState>,
    time: Res<Time>,
) {
    let active = player.power_up_mode_active();
    let dt = time.delta_secs();
    for mut glow in q.iter_mut() {
        if active {
            glow.advance(dt);
        } else if glow.value != glow.min || glow.direction != 1.0 {
            glow.reset();
        }
    }
}

// ── Respawn ───────────────────────────────────────────────────────────────────

/// Count down a pending respawn while no ship exists, then spawn a fresh one
/// at the start position.
pub fn player_respawn_system(
    mut commands: Commands,
    q_ship: Query<(), With<PlayerShip>>,
    mut player: ResMut<PlayerState>,
    config: Res<ShipConfig>,
    time: Res<Time>,
) {
    if !q_ship.is_empty() {
        return;
    }
    if !player.tick_respawn(time.delta_secs()) {
        return;
    }
    spawn_player_ship(&mut commands, &config, config.start_position());
    info!("Ship respawned, {} lives left", player.lives);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoundCue;
    use crate::player_state::PowerUp;
    use bevy::ecs::system::RunSystemOnce;
    use bevy::time::TimeUpdateStrategy;
    use std::time::Duration;

    fn ship_transform() -> Transform {
        Transform::from_xyz(-100.0, 40.0, 0.0)
    }

    fn fire_n(app: &mut App, config: ShipConfig, n: usize) -> (Vec<Shot>, CannonCycle) {
        let sockets = MeshSockets::from_config(&config);
        app.world_mut()
            .run_system_once(move |mut commands: Commands| {
                let mut cycle = CannonCycle::default();
                let sounds = ShipSounds::default();
                let shots: Vec<Shot> = (0..n)
                    .map(|_| {
                        fire(
                            &mut commands,
                            &mut cycle,
                            &ship_transform(),
                            &sockets,
                            &config,
                            &sounds,
                        )
                    })
                    .collect();
                (shots, cycle)
            })
            .unwrap()
    }

    #[test]
    fn shots_leave_from_each_cannon_socket_in_turn() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        let config = ShipConfig::default();
        let (shots, _) = fire_n(&mut app, config.clone(), 3);

        for shot in &shots {
            let entity = shot.projectile.expect("projectile spawned");
            let spawned = app.world().get::<Transform>(entity).unwrap();
            let socket = config.sockets[shot.cannon.socket_name(&config)];
            let expected = ship_transform().translation + Vec3::new(socket.x, socket.y, 0.0);
            assert!((spawned.translation - expected).length() < 1e-4);
        }
    }

    #[test]
    fn firing_without_projectile_type_still_advances() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        let config = ShipConfig {
            projectile: None,
            ..Default::default()
        };
        let (shots, cycle) = fire_n(&mut app, config, 2);

        assert!(shots.iter().all(|s| s.projectile.is_none()));
        assert_eq!(cycle.next, Cannon::Top);
        let count = app
            .world_mut()
            .query::<&PlayerProjectile>()
            .iter(app.world())
            .count();
        assert_eq!(count, 0);
    }

    #[test]
    fn missing_socket_skips_spawn_but_advances() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        let mut config = ShipConfig::default();
        let left = config.left_cannon_socket.clone();
        config.sockets.remove(&left);
        let (shots, _) = fire_n(&mut app, config, 3);

        assert_eq!(shots[0].cannon, Cannon::Right);
        assert!(shots[0].projectile.is_some());
        assert_eq!(shots[1].cannon, Cannon::Left);
        assert!(shots[1].projectile.is_none());
        assert_eq!(shots[2].cannon, Cannon::Top);
        assert!(shots[2].projectile.is_some());
    }

    #[test]
    fn projectile_despawns_after_lifetime() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_systems(Update, projectile_lifetime_system);
        let entity = app
            .world_mut()
            .spawn(PlayerProjectile {
                age: 2.0,
                lifetime: 1.0,
                cannon: Cannon::Right,
                spent: false,
            })
            .id();

        app.update();

        assert!(app.world().get_entity(entity).is_err());
    }

    #[test]
    fn glow_resets_when_mode_closes() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(PlayerState::default());
        app.add_systems(Update, highlight_glow_system);
        let ship = app
            .world_mut()
            .spawn((
                PlayerShip,
                HighlightGlow {
                    value: 0.6,
                    direction: -1.0,
                    ..HighlightGlow::from_config(&ShipConfig::default())
                },
            ))
            .id();

        app.update();

        let glow = app.world().get::<HighlightGlow>(ship).unwrap();
        assert_eq!(glow.value, glow.min);
        assert_eq!(glow.direction, 1.0);
    }

    // ── power-ups ─────────────────────────────────────────────────────────────

    fn activation_app(with_ship: bool) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        let mut player = PlayerState::default();
        player.credit_fuel(5.0);
        app.insert_resource(player);
        app.insert_resource(ShipSounds {
            activate_power_up: Some(Handle::default()),
            ..Default::default()
        });
        app.insert_resource(ShipIntent {
            activate_power_up: true,
            ..Default::default()
        });
        app.add_systems(Update, power_up_activation_system);
        if with_ship {
            app.world_mut().spawn(PlayerShip);
        }
        app
    }

    fn cue_count(app: &mut App) -> usize {
        app.world_mut()
            .query::<&SoundCue>()
            .iter(app.world())
            .count()
    }

    #[test]
    fn activation_plays_cue_and_closes_window() {
        let mut app = activation_app(true);
        app.update();

        let player = app.world().resource::<PlayerState>();
        assert!(!player.power_up_mode_active());
        assert_eq!(player.power_up_level(PowerUp::Speed), 1);
        assert_eq!(cue_count(&mut app), 1);
    }

    #[test]
    fn activation_needs_a_live_ship() {
        let mut app = activation_app(false);
        app.update();

        let player = app.world().resource::<PlayerState>();
        assert!(player.power_up_mode_active());
        assert_eq!(player.power_up_level(PowerUp::Speed), 0);
        assert_eq!(cue_count(&mut app), 0);
    }

    // ── glow ──────────────────────────────────────────────────────────────────

    #[test]
    fn glow_advances_while_mode_is_open() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)));
        let mut player = PlayerState::default();
        player.credit_fuel(5.0);
        app.insert_resource(player);
        app.add_systems(Update, highlight_glow_system);
        let ship = app
            .world_mut()
            .spawn((
                PlayerShip,
                HighlightGlow::from_config(&ShipConfig::default()),
            ))
            .id();

        app.update(); // first frame has no delta
        app.update();

        let glow = app.world().get::<HighlightGlow>(ship).unwrap();
        assert!(glow.value > glow.min && glow.value < glow.max);
        assert_eq!(glow.direction, 1.0);
    }

    // ── respawn ───────────────────────────────────────────────────────────────

    #[test]
    fn respawn_spawns_one_ship_when_due() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(ShipConfig::default());
        let mut player = PlayerState::default();
        player.respawn_timer = Some(0.0);
        app.insert_resource(player);
        app.add_systems(Update, player_respawn_system);

        app.update();
        app.update();

        let ships = app
            .world_mut()
            .query_filtered::<Entity, With<PlayerShip>>()
            .iter(app.world())
            .count();
        assert_eq!(ships, 1);
        assert_eq!(app.world().resource::<PlayerState>().respawn_timer, None);
    }
}
