//! Player ship module: composition, input relay, combat, event dispatch and
//! rendering.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`state`] | Components (`PlayerShip`, `ShipParts`, `CannonCycle`, `HighlightGlow`, `PlayerProjectile`) and resources (`ShipIntent`, `ShipFireCooldown`, `PreferredGamepad`) |
//! | [`control`] | Keyboard / gamepad intent, the four-axis movement relay |
//! | [`combat`] | Cannon rotation and firing, projectile lifetime and hits, power-up activation, glow, respawn |
//! | [`events`] | Hit / overlap dispatch through `ShipEvents`, fuel pickup, destruction |
//! | [`rendering`] | Hull, projectile, hazard and fuel meshes; glow tint |
//!
//! ## Entity layout
//!
//! ```text
//! PlayerShip root   Transform, KinematicPositionBased, Fly2DMovement,
//! │                 CannonCycle, HighlightGlow, ShipParts
//! ├── ShipCapsule   Collider::capsule_x, collision events
//! ├── ShipMesh      hull outline, MeshSockets
//! └── EngineThrust  ParticleEmitter at the engine socket (optional)
//! ```
//!
//! Every child carries `ChildOf(root)`; despawning the root removes the lot.

pub mod combat;
pub mod control;
pub mod events;
pub mod rendering;
pub mod state;

pub use combat::{
    fire, highlight_glow_system, player_respawn_system, power_up_activation_system,
    projectile_hazard_hit_system, projectile_lifetime_system, ship_fire_system, Shot,
};
pub use control::{
    apply_ship_intent_system, gamepad_connection_system, gamepad_to_intent_system,
    keyboard_to_intent_system, move_down, move_left, move_right, move_up,
    ship_intent_clear_system,
};
pub use events::{
    fuel_capsule_collected, player_ship_destroyed, ship_collision_dispatch_system, ContactKind,
    DefaultShipEvents, ShipContact, ShipEventHandler, ShipEvents, ShipFeedback, ShipReaction,
};
pub use rendering::ShipRenderPlugin;
pub use state::{
    socket_world_transform, Cannon, CannonCycle, EngineThrust, HighlightGlow, MeshSockets,
    PlayerProjectile, PlayerShip, PreferredGamepad, ShipCapsule, ShipFireCooldown, ShipIntent,
    ShipMesh, ShipParts,
};

use crate::config::{ParticleTemplate, ShipConfig};
use crate::game_state::GameState;
use crate::movement::{fly2d_movement_system, Fly2DMovement};
use crate::particles::ParticleEmitter;
use crate::player_state::PlayerState;
use bevy::prelude::*;
use bevy_rapier2d::geometry::Group;
use bevy_rapier2d::prelude::*;

// ── Scheduling ────────────────────────────────────────────────────────────────

/// Per-frame ship phases, chained in this order.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShipSystems {
    /// Reset `ShipIntent`.
    ClearIntent,
    /// Input devices write `ShipIntent`.
    ReadInput,
    /// Relay, move, fire, power-ups, glow.
    Act,
}

/// Ship gameplay: everything except input devices and rendering.
///
/// Runs headless, so tests drive it by writing `ShipIntent` and
/// `CollisionEvent` messages directly.
pub struct ShipPlugin;

impl Plugin for ShipPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ShipConfig>()
            .init_resource::<PlayerState>()
            .init_resource::<ShipIntent>()
            .init_resource::<ShipFireCooldown>()
            .init_resource::<PreferredGamepad>()
            .init_resource::<ShipEvents>()
            .init_resource::<crate::audio::ShipSounds>()
            .configure_sets(
                Update,
                (
                    ShipSystems::ClearIntent,
                    ShipSystems::ReadInput,
                    ShipSystems::Act,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                (
                    ship_intent_clear_system.in_set(ShipSystems::ClearIntent),
                    (
                        apply_ship_intent_system,
                        fly2d_movement_system,
                        ship_fire_system,
                        power_up_activation_system,
                        highlight_glow_system,
                    )
                        .chain()
                        .in_set(ShipSystems::Act),
                    (
                        projectile_lifetime_system,
                        projectile_hazard_hit_system,
                        player_respawn_system,
                    )
                        .after(ShipSystems::Act)
                        .run_if(in_state(GameState::Playing)),
                ),
            )
            .add_systems(
                PostUpdate,
                ship_collision_dispatch_system
                    .after(PhysicsSet::Writeback)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// Keyboard and gamepad input for the ship.
pub struct ShipInputPlugin;

impl Plugin for ShipInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                gamepad_connection_system,
                (keyboard_to_intent_system, gamepad_to_intent_system)
                    .chain()
                    .in_set(ShipSystems::ReadInput),
            ),
        );
    }
}

// ── Composition ───────────────────────────────────────────────────────────────

/// Assemble a ship at `position` and return its root entity.
pub fn spawn_player_ship(commands: &mut Commands, config: &ShipConfig, position: Vec2) -> Entity {
    let root = commands
        .spawn((
            PlayerShip,
            Transform::from_translation(position.extend(0.0)),
            Visibility::default(),
            RigidBody::KinematicPositionBased,
            create_movement_component(config),
            CannonCycle::default(),
            HighlightGlow::from_config(config),
        ))
        .id();

    let sockets = MeshSockets::from_config(config);
    let capsule = create_capsule_component(commands, root, config);
    let engine_thrust = create_engine_thrust_emitter(commands, root, config, &sockets);
    let mesh = create_mesh_component(commands, root, config, sockets);

    commands.entity(root).insert(ShipParts {
        capsule,
        mesh,
        engine_thrust,
    });
    debug!("Spawned player ship at {position}");
    root
}

/// The collision capsule, lying along the ship's X axis.
pub fn create_capsule_component(
    commands: &mut Commands,
    parent: Entity,
    config: &ShipConfig,
) -> Entity {
    commands
        .spawn((
            ShipCapsule,
            Transform::default(),
            Collider::capsule_x(config.capsule_half_length, config.capsule_radius),
            CollisionGroups::new(Group::GROUP_2, Group::GROUP_1 | Group::GROUP_4),
            ActiveCollisionTypes::all(),
            ActiveEvents::COLLISION_EVENTS,
            ChildOf(parent),
        ))
        .id()
}

/// The hull mesh child holding the socket layout.
pub fn create_mesh_component(
    commands: &mut Commands,
    parent: Entity,
    config: &ShipConfig,
    sockets: MeshSockets,
) -> Entity {
    let hull = config.hull.iter().map(|&[x, y]| Vec2::new(x, y)).collect();
    commands
        .spawn((
            ShipMesh { hull },
            sockets,
            Transform::default(),
            Visibility::default(),
            ChildOf(parent),
        ))
        .id()
}

/// Engine exhaust emitter at the engine socket.
///
/// Returns `None` without spawning anything when the socket or the thrust
/// template is missing.
pub fn create_engine_thrust_emitter(
    commands: &mut Commands,
    parent: Entity,
    config: &ShipConfig,
    sockets: &MeshSockets,
) -> Option<Entity> {
    let template = config.engine_thrust.clone()?;
    let Some(local) = sockets.get(&config.engine_thrust_socket) else {
        warn!(
            "Engine thrust socket {:?} not found; ship has no exhaust",
            config.engine_thrust_socket
        );
        return None;
    };
    let entity = commands
        .spawn((
            EngineThrust,
            ParticleEmitter::new(template),
            local,
            ChildOf(parent),
        ))
        .id();
    Some(entity)
}

pub fn create_movement_component(config: &ShipConfig) -> Fly2DMovement {
    Fly2DMovement::new(config.max_speed, config.playfield())
}

/// The burst spawned when the ship is destroyed, if one is configured.
pub fn create_explosion_template(config: &ShipConfig) -> Option<ParticleTemplate> {
    config.explosion.clone()
}

/// Startup system: place the first ship at the configured start position.
pub fn spawn_ship_at_start(mut commands: Commands, config: Res<ShipConfig>) {
    spawn_player_ship(&mut commands, &config, config.start_position());
}
