//! Hit and overlap dispatch for the player ship.
//!
//! Rapier reports contacts as [`CollisionEvent`]s between collider entities.
//! [`ship_collision_dispatch_system`] keeps the ones that involve a
//! [`ShipCapsule`], classifies the other entity, and asks the installed
//! [`ShipEventHandler`] what to do:
//!
//! | Rapier event            | Hook              |
//! |-------------------------|-------------------|
//! | `Started` + `SENSOR`    | `begin_overlap`   |
//! | `Stopped` + `SENSOR`    | `end_overlap`     |
//! | `Started`, solid        | `hit`             |
//!
//! The hook answers with a [`ShipReaction`].  The two native reactions are
//! [`fuel_capsule_collected`] and [`player_ship_destroyed`].  Replace the
//! [`ShipEvents`] resource to change the policy; the default handler
//! collects fuel capsules and blows up on hazards.

use super::state::{PlayerShip, ShipCapsule};
use crate::audio::{play_cue, ShipSounds};
use crate::camera_shake::{start_camera_shake, CameraShake};
use crate::config::ShipConfig;
use crate::game_state::GameState;
use crate::particles::spawn_burst;
use crate::player_state::{DestructionOutcome, FuelCredit, PlayerState};
use crate::stage::{FuelCapsule, Hazard};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use bevy_rapier2d::rapier::geometry::CollisionEventFlags;
use std::collections::HashSet;

// ── Hook interface ────────────────────────────────────────────────────────────

/// What the ship touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    FuelCapsule,
    Hazard,
    Other,
}

/// One hit or overlap seen from the ship's side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipContact {
    /// Ship root entity.
    pub ship: Entity,
    /// The ship collider involved (the capsule).
    pub hit_component: Entity,
    /// The other collider.
    pub other: Entity,
    pub other_kind: ContactKind,
    /// Ship position when the event was handled.
    pub position: Vec2,
}

/// Reaction requested by a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipReaction {
    None,
    /// Run [`fuel_capsule_collected`] on `contact.other`.
    CollectFuel,
    /// Run [`player_ship_destroyed`].
    Destroy,
}

/// Overridable ship event hooks.  Every method has a default.
pub trait ShipEventHandler: Send + Sync + 'static {
    /// The ship collided with a solid collider.
    fn hit(&self, contact: &ShipContact) -> ShipReaction {
        match contact.other_kind {
            ContactKind::Hazard => ShipReaction::Destroy,
            _ => ShipReaction::None,
        }
    }

    /// The ship started overlapping a sensor.
    fn begin_overlap(&self, contact: &ShipContact) -> ShipReaction {
        match contact.other_kind {
            ContactKind::FuelCapsule => ShipReaction::CollectFuel,
            ContactKind::Hazard => ShipReaction::Destroy,
            ContactKind::Other => ShipReaction::None,
        }
    }

    /// The ship stopped overlapping a sensor.
    fn end_overlap(&self, _contact: &ShipContact) -> ShipReaction {
        ShipReaction::None
    }
}

/// The stock handler: all hooks use their defaults.
pub struct DefaultShipEvents;

impl ShipEventHandler for DefaultShipEvents {}

/// The installed hook implementation.
#[derive(Resource)]
pub struct ShipEvents(pub Box<dyn ShipEventHandler>);

impl Default for ShipEvents {
    fn default() -> Self {
        Self(Box::new(DefaultShipEvents))
    }
}

impl ShipEvents {
    pub fn new(handler: impl ShipEventHandler) -> Self {
        Self(Box::new(handler))
    }
}

// ── Cosmetic feedback bundle ──────────────────────────────────────────────────

/// Everything a ship reaction needs to play its feedback.
#[derive(SystemParam)]
pub struct ShipFeedback<'w, 's> {
    pub commands: Commands<'w, 's>,
    pub sounds: Res<'w, ShipSounds>,
    pub config: Res<'w, ShipConfig>,
    pub cameras: Query<'w, 's, &'static mut CameraShake>,
}

// ── Native reactions ──────────────────────────────────────────────────────────

/// Credit `capsule`'s fuel to the player.
///
/// The capsule yields its fuel once; a consumed capsule credits nothing.
/// Despawning the capsule entity is left to the caller.
pub fn fuel_capsule_collected(
    player: &mut PlayerState,
    capsule: &mut FuelCapsule,
) -> Option<FuelCredit> {
    let fuel = capsule.consume()?;
    Some(player.credit_fuel(fuel))
}

/// Blow up the ship at `position` and hand the loss to the player state.
///
/// Spawns the explosion, plays the explosion sound, shakes the camera and
/// despawns the ship with all its parts.  Each effect is skipped when it is
/// not configured.
pub fn player_ship_destroyed(
    feedback: &mut ShipFeedback,
    player: &mut PlayerState,
    ship: Entity,
    position: Vec2,
) -> DestructionOutcome {
    if let Some(template) = feedback.config.explosion.as_ref() {
        spawn_burst(&mut feedback.commands, position, 0.0, template);
    }
    play_cue(&mut feedback.commands, feedback.sounds.explosion.as_ref());
    start_camera_shake(&mut feedback.cameras, feedback.config.camera_shake.as_ref());
    feedback.commands.entity(ship).despawn();
    player.record_destruction()
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

enum HookKind {
    Hit,
    BeginOverlap,
    EndOverlap,
}

/// Route Rapier collision events involving the ship through [`ShipEvents`].
///
/// Each ship is destroyed at most once per frame and each fuel capsule is
/// consumed at most once, however many events reference them.
#[allow(clippy::too_many_arguments)]
pub fn ship_collision_dispatch_system(
    mut collision_events: MessageReader<CollisionEvent>,
    hooks: Res<ShipEvents>,
    q_capsules: Query<&ChildOf, With<ShipCapsule>>,
    q_ships: Query<&Transform, With<PlayerShip>>,
    mut q_fuel: Query<&mut FuelCapsule>,
    q_hazards: Query<(), With<Hazard>>,
    mut player: ResMut<PlayerState>,
    mut feedback: ShipFeedback,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let mut destroyed: HashSet<Entity> = HashSet::new();

    for event in collision_events.read() {
        let (e1, e2, flags, started) = match event {
            CollisionEvent::Started(e1, e2, flags) => (*e1, *e2, *flags, true),
            CollisionEvent::Stopped(e1, e2, flags) => (*e1, *e2, *flags, false),
        };

        let (capsule, other) = if q_capsules.contains(e1) {
            (e1, e2)
        } else if q_capsules.contains(e2) {
            (e2, e1)
        } else {
            continue;
        };

        let hook = match (started, flags.contains(CollisionEventFlags::SENSOR)) {
            (true, true) => HookKind::BeginOverlap,
            (false, true) => HookKind::EndOverlap,
            (true, false) => HookKind::Hit,
            (false, false) => continue,
        };

        let Ok(child_of) = q_capsules.get(capsule) else {
            continue;
        };
        let ship = child_of.parent();
        if destroyed.contains(&ship) {
            continue;
        }
        let Ok(ship_transform) = q_ships.get(ship) else {
            continue;
        };

        let other_kind = if q_fuel.contains(other) {
            ContactKind::FuelCapsule
        } else if q_hazards.contains(other) {
            ContactKind::Hazard
        } else {
            ContactKind::Other
        };
        let contact = ShipContact {
            ship,
            hit_component: capsule,
            other,
            other_kind,
            position: ship_transform.translation.truncate(),
        };

        let reaction = match hook {
            HookKind::Hit => hooks.0.hit(&contact),
            HookKind::BeginOverlap => hooks.0.begin_overlap(&contact),
            HookKind::EndOverlap => hooks.0.end_overlap(&contact),
        };

        match reaction {
            ShipReaction::None => {}
            ShipReaction::CollectFuel => {
                let Ok(mut fuel) = q_fuel.get_mut(other) else {
                    continue;
                };
                let Some(credit) = fuel_capsule_collected(&mut player, &mut fuel) else {
                    continue;
                };
                feedback.commands.entity(other).despawn();
                if credit.shifted_to.is_some() {
                    play_cue(&mut feedback.commands, feedback.sounds.shift_power_up.as_ref());
                }
                debug!(
                    "Collected {:.1} fuel, power-up selection now {:?}",
                    credit.amount, credit.shifted_to
                );
            }
            ShipReaction::Destroy => {
                destroyed.insert(ship);
                let outcome =
                    player_ship_destroyed(&mut feedback, &mut player, ship, contact.position);
                match outcome {
                    DestructionOutcome::GameOver => {
                        info!("Ship destroyed, no lives left");
                        next_state.set(GameState::GameOver);
                    }
                    DestructionOutcome::Respawn => {
                        info!(
                            "Ship destroyed! Lives remaining: {}  Respawning in {:.1}s",
                            player.lives, feedback.config.respawn_delay_secs
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(kind: ContactKind) -> ShipContact {
        ShipContact {
            ship: Entity::PLACEHOLDER,
            hit_component: Entity::PLACEHOLDER,
            other: Entity::PLACEHOLDER,
            other_kind: kind,
            position: Vec2::ZERO,
        }
    }

    #[test]
    fn default_hooks_collect_fuel_and_die_on_hazards() {
        let hooks = DefaultShipEvents;
        assert_eq!(
            hooks.begin_overlap(&contact(ContactKind::FuelCapsule)),
            ShipReaction::CollectFuel
        );
        assert_eq!(
            hooks.hit(&contact(ContactKind::Hazard)),
            ShipReaction::Destroy
        );
        assert_eq!(hooks.hit(&contact(ContactKind::Other)), ShipReaction::None);
        assert_eq!(
            hooks.end_overlap(&contact(ContactKind::FuelCapsule)),
            ShipReaction::None
        );
    }

    #[test]
    fn fuel_is_credited_once_per_capsule() {
        let mut player = PlayerState::default();
        let mut capsule = FuelCapsule::new(7.5);

        let first = fuel_capsule_collected(&mut player, &mut capsule);
        assert_eq!(first.map(|c| c.amount), Some(7.5));
        assert!(fuel_capsule_collected(&mut player, &mut capsule).is_none());
        assert_eq!(player.fuel, 7.5);
    }

    struct Invulnerable;

    impl ShipEventHandler for Invulnerable {
        fn hit(&self, _contact: &ShipContact) -> ShipReaction {
            ShipReaction::None
        }
    }

    #[test]
    fn custom_handler_overrides_only_what_it_implements() {
        let hooks = ShipEvents::new(Invulnerable);
        assert_eq!(
            hooks.0.hit(&contact(ContactKind::Hazard)),
            ShipReaction::None
        );
        assert_eq!(
            hooks.0.begin_overlap(&contact(ContactKind::FuelCapsule)),
            ShipReaction::CollectFuel
        );
    }
}
