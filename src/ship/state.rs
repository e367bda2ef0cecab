//! Ship components and resources.
//!
//! Systems that mutate this state live in the sibling modules:
//! - [`super::control`]: input relay to the movement component
//! - [`super::combat`]: firing, projectiles, power-up activation, glow, respawn
//! - [`super::events`]: hit / overlap dispatch and the two native reactions
//! - [`super::rendering`]: meshes and the glow tint

use crate::config::ShipConfig;
use crate::constants::{CANNON_COUNT, LEFT_CANNON, RIGHT_CANNON, TOP_CANNON};
use bevy::prelude::*;
use std::collections::HashMap;

// ── Ship composition ──────────────────────────────────────────────────────────

/// Marker for the ship root entity.
#[derive(Component)]
pub struct PlayerShip;

/// The child entities owned by a ship root.
///
/// All of them carry `ChildOf(root)`, so despawning the root takes them along.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ShipParts {
    pub capsule: Entity,
    pub mesh: Entity,
    /// `None` when the engine socket or the thrust template is missing.
    pub engine_thrust: Option<Entity>,
}

/// Marker for the ship's collision capsule; the "hit component" of every
/// collision event involving the ship.
#[derive(Component)]
pub struct ShipCapsule;

/// The ship hull mesh: outline in local space.  Sockets are on the same entity.
#[derive(Component, Debug, Clone)]
pub struct ShipMesh {
    pub hull: Vec<Vec2>,
}

/// Named attachment points on a mesh, in the mesh's local space.
#[derive(Component, Debug, Clone, Default)]
pub struct MeshSockets(pub HashMap<String, Transform>);

impl MeshSockets {
    pub fn from_config(config: &ShipConfig) -> Self {
        Self(
            config
                .sockets
                .iter()
                .map(|(name, spec)| (name.clone(), spec.to_transform()))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<Transform> {
        self.0.get(name).copied()
    }
}

/// World transform of socket `name` for a ship whose root sits at `ship`.
///
/// The mesh child is attached at the root's origin, so a socket's world
/// transform is the root transform composed with the socket's local one.
pub fn socket_world_transform(
    ship: &Transform,
    sockets: &MeshSockets,
    name: &str,
) -> Option<Transform> {
    sockets.get(name).map(|local| ship.mul_transform(local))
}

/// Marker for the engine thrust particle emitter child.
#[derive(Component)]
pub struct EngineThrust;

// ── Cannons ───────────────────────────────────────────────────────────────────

/// One of the three cannon mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Cannon {
    Right = RIGHT_CANNON,
    Left = LEFT_CANNON,
    Top = TOP_CANNON,
}

impl Cannon {
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Cannon {
        match index % CANNON_COUNT {
            RIGHT_CANNON => Cannon::Right,
            LEFT_CANNON => Cannon::Left,
            _ => Cannon::Top,
        }
    }

    pub fn next(self) -> Cannon {
        Cannon::from_index(self.index() + 1)
    }

    /// Socket name of this cannon in `config`.
    pub fn socket_name(self, config: &ShipConfig) -> &str {
        match self {
            Cannon::Right => &config.right_cannon_socket,
            Cannon::Left => &config.left_cannon_socket,
            Cannon::Top => &config.top_cannon_socket,
        }
    }
}

/// Which cannon fires next.  Starts at [`Cannon::Right`].
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CannonCycle {
    pub next: Cannon,
}

impl Default for CannonCycle {
    fn default() -> Self {
        Self {
            next: Cannon::Right,
        }
    }
}

impl CannonCycle {
    /// Return the cannon to fire now and move the cycle on by one.
    pub fn advance(&mut self) -> Cannon {
        let current = self.next;
        self.next = current.next();
        current
    }
}

// ── Highlight glow ────────────────────────────────────────────────────────────

/// Ping-pong glow value shown while the power-up activation mode is open.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct HighlightGlow {
    pub value: f32,
    /// +1.0 while rising, −1.0 while falling.
    pub direction: f32,
    pub min: f32,
    pub max: f32,
    /// Range units per second.
    pub speed: f32,
}

impl HighlightGlow {
    pub fn from_config(config: &ShipConfig) -> Self {
        Self {
            value: config.glow_min,
            direction: 1.0,
            min: config.glow_min,
            max: config.glow_max,
            speed: config.highlight_glow_speed,
        }
    }

    /// Move by `speed * dt * direction`, reflecting off either bound.
    ///
    /// Reaching a bound lands exactly on it and flips the direction; leftover
    /// travel continues the other way.
    pub fn advance(&mut self, dt: f32) {
        let span = self.max - self.min;
        if span <= 0.0 {
            self.value = self.min;
            return;
        }
        self.value = self.value.clamp(self.min, self.max);

        // A full period returns to the same value and direction.
        let mut travel = (self.speed * dt).abs() % (2.0 * span);
        while travel > 0.0 {
            let room = if self.direction > 0.0 {
                self.max - self.value
            } else {
                self.value - self.min
            };
            if travel < room {
                self.value += travel * self.direction;
                break;
            }
            travel -= room;
            self.value = if self.direction > 0.0 { self.max } else { self.min };
            self.direction = -self.direction;
        }
    }

    /// Back to Idle: lowest glow, rising.
    pub fn reset(&mut self) {
        self.value = self.min;
        self.direction = 1.0;
    }

    /// Glow as a fraction of its range, for tinting.
    pub fn normalized(&self) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((self.value - self.min) / span).clamp(0.0, 1.0)
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

/// Per-projectile state attached to each fired round.
#[derive(Component, Debug, Clone)]
pub struct PlayerProjectile {
    pub age: f32,
    pub lifetime: f32,
    /// Cannon this round left from.
    pub cannon: Cannon,
    /// Set once the round has hit something so it is counted only once.
    pub spent: bool,
}

// ── Resources ─────────────────────────────────────────────────────────────────

/// Enforces a minimum interval between consecutive `Fire` calls.
#[derive(Resource, Default)]
pub struct ShipFireCooldown {
    /// Remaining cooldown in seconds; decremented each frame, clamped to 0.
    pub timer: f32,
}

/// Tracks the most recently connected gamepad.
#[derive(Resource, Default)]
pub struct PreferredGamepad(pub Option<Entity>);

/// Aggregated player intent for the current frame.
///
/// Input systems write to this resource each frame after it is cleared;
/// [`super::control::apply_ship_intent_system`] and
/// [`super::combat::ship_fire_system`] read it.  Tests populate it directly
/// to drive the ship without an input device.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq)]
pub struct ShipIntent {
    pub up: f32,
    pub down: f32,
    pub left: f32,
    pub right: f32,
    pub fire: bool,
    pub activate_power_up: bool,
}
