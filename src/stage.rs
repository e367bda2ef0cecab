//! The scrolling stage: drifting hazards and fuel capsules.
//!
//! Both enter from the right edge of the playfield and drift left at a
//! constant velocity.  [`stage_cull_system`] removes any [`StageEntity`] that
//! has left the playfield by more than [`CULL_MARGIN`] on either side.
//!
//! | Entity       | Body                     | Collider        | Group   | Collides with |
//! |--------------|--------------------------|-----------------|---------|---------------|
//! | Hazard       | `KinematicVelocityBased` | ball, solid     | GROUP_1 | 2, 3          |
//! | Fuel capsule | `KinematicVelocityBased` | ball, `Sensor`  | GROUP_4 | 2             |
//!
//! A solid hazard reaches the ship as a *hit*; the sensor capsule as an
//! *overlap*.

use crate::config::ShipConfig;
use crate::game_state::GameState;
use bevy::prelude::*;
use bevy_rapier2d::geometry::Group;
use bevy_rapier2d::prelude::*;
use rand::Rng;

/// Distance beyond the playfield edge at which stage entities are culled.
pub const CULL_MARGIN: f32 = 80.0;

/// Marker for everything that belongs to the running stage and is cleared on restart.
#[derive(Component)]
pub struct StageEntity;

/// Anything whose contact destroys the ship.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Hazard {
    pub radius: f32,
}

/// A pickup worth `fuel`.  Yields its fuel once.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct FuelCapsule {
    pub fuel: f32,
    consumed: bool,
}

impl FuelCapsule {
    pub fn new(fuel: f32) -> Self {
        Self {
            fuel,
            consumed: false,
        }
    }

    /// Take the capsule's fuel.  Returns `None` once it has been taken.
    pub fn consume(&mut self) -> Option<f32> {
        if self.consumed {
            return None;
        }
        self.consumed = true;
        Some(self.fuel)
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }
}

/// Spawn clocks for hazards and fuel capsules.
#[derive(Resource, Debug, Default, Clone)]
pub struct StageSpawner {
    pub hazard_elapsed: f32,
    pub fuel_elapsed: f32,
}

impl StageSpawner {
    /// Advance both clocks and return how many hazards and capsules are due.
    pub fn tick(&mut self, dt: f32, hazard_interval: f32, fuel_interval: f32) -> (u32, u32) {
        fn due(elapsed: &mut f32, dt: f32, interval: f32) -> u32 {
            if interval <= 0.0 {
                return 0;
            }
            *elapsed += dt;
            let n = (*elapsed / interval).floor();
            *elapsed -= n * interval;
            n as u32
        }
        (
            due(&mut self.hazard_elapsed, dt, hazard_interval),
            due(&mut self.fuel_elapsed, dt, fuel_interval),
        )
    }
}

pub struct StagePlugin;

impl Plugin for StagePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StageSpawner>().add_systems(
            Update,
            (stage_spawner_system, stage_cull_system)
                .chain()
                .run_if(in_state(GameState::Playing)),
        );
    }
}

// ── Spawn helpers ─────────────────────────────────────────────────────────────

/// Spawn a hazard drifting left at `speed`.
pub fn spawn_hazard(commands: &mut Commands, position: Vec2, radius: f32, speed: f32) -> Entity {
    commands
        .spawn((
            Hazard { radius },
            StageEntity,
            Transform::from_translation(position.extend(0.0)),
            Visibility::default(),
            RigidBody::KinematicVelocityBased,
            Velocity {
                linvel: Vec2::new(-speed, 0.0),
                angvel: 0.0,
            },
            Collider::ball(radius),
            CollisionGroups::new(Group::GROUP_1, Group::GROUP_2 | Group::GROUP_3),
            ActiveCollisionTypes::all(),
            ActiveEvents::COLLISION_EVENTS,
        ))
        .id()
}

/// Spawn a fuel capsule worth `config.fuel_capsule_value`.
pub fn spawn_fuel_capsule(commands: &mut Commands, position: Vec2, config: &ShipConfig) -> Entity {
    commands
        .spawn((
            FuelCapsule::new(config.fuel_capsule_value),
            StageEntity,
            Transform::from_translation(position.extend(0.0)),
            Visibility::default(),
            RigidBody::KinematicVelocityBased,
            Velocity {
                linvel: Vec2::new(-config.fuel_capsule_speed, 0.0),
                angvel: 0.0,
            },
            Collider::ball(config.fuel_capsule_radius),
            Sensor,
            CollisionGroups::new(Group::GROUP_4, Group::GROUP_2),
            ActiveCollisionTypes::all(),
            ActiveEvents::COLLISION_EVENTS,
        ))
        .id()
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Spawn due hazards and capsules just past the right edge at random heights.
pub fn stage_spawner_system(
    mut commands: Commands,
    mut spawner: ResMut<StageSpawner>,
    config: Res<ShipConfig>,
    time: Res<Time>,
) {
    let (hazards, capsules) = spawner.tick(
        time.delta_secs(),
        config.hazard_spawn_interval,
        config.fuel_spawn_interval,
    );
    if hazards == 0 && capsules == 0 {
        return;
    }

    let mut rng = rand::thread_rng();
    let half_h = config.playfield_half_height;

    for _ in 0..hazards {
        let radius = rng.gen_range(config.hazard_radius_min..=config.hazard_radius_max);
        let speed = rng.gen_range(config.hazard_speed_min..=config.hazard_speed_max);
        let y = rng.gen_range(-half_h..=half_h);
        let x = config.playfield_half_width + radius;
        spawn_hazard(&mut commands, Vec2::new(x, y), radius, speed);
    }
    for _ in 0..capsules {
        let y = rng.gen_range(-half_h..=half_h);
        let x = config.playfield_half_width + config.fuel_capsule_radius;
        spawn_fuel_capsule(&mut commands, Vec2::new(x, y), &config);
    }
}

/// Despawn stage entities that drifted out of the playfield.
pub fn stage_cull_system(
    mut commands: Commands,
    query: Query<(Entity, &Transform), With<StageEntity>>,
    config: Res<ShipConfig>,
) {
    let limit = config.playfield_half_width + CULL_MARGIN;
    for (entity, transform) in query.iter() {
        if transform.translation.x.abs() > limit {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capsule_yields_fuel_once() {
        let mut capsule = FuelCapsule::new(4.0);
        assert_eq!(capsule.consume(), Some(4.0));
        assert!(capsule.is_consumed());
        assert_eq!(capsule.consume(), None);
    }

    #[test]
    fn spawner_counts_due_entities_and_keeps_remainder() {
        let mut spawner = StageSpawner::default();
        assert_eq!(spawner.tick(0.5, 1.0, 4.0), (0, 0));
        assert_eq!(spawner.tick(2.0, 1.0, 4.0), (2, 0));
        assert!((spawner.hazard_elapsed - 0.5).abs() < 1e-5);
        assert_eq!(spawner.tick(1.6, 1.0, 4.0), (2, 1));
    }

    #[test]
    fn zero_interval_spawns_nothing() {
        let mut spawner = StageSpawner::default();
        assert_eq!(spawner.tick(10.0, 0.0, 0.0), (0, 0));
    }

    #[test]
    fn entities_past_the_edge_are_culled() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(ShipConfig::default());
        app.add_systems(Update, stage_cull_system);

        let half_w = ShipConfig::default().playfield_half_width;
        let gone = app
            .world_mut()
            .spawn((StageEntity, Transform::from_xyz(-half_w - CULL_MARGIN - 1.0, 0.0, 0.0)))
            .id();
        let kept = app
            .world_mut()
            .spawn((StageEntity, Transform::from_xyz(half_w + 10.0, 0.0, 0.0)))
            .id();

        app.update();

        assert!(app.world().get_entity(gone).is_err());
        assert!(app.world().get_entity(kept).is_ok());
    }
}
