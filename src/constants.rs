//! Centralised gameplay constants.
//!
//! Every value here is the compiled default for the matching field of
//! [`crate::config::ShipConfig`].  Override them in `assets/zynaps.toml`
//! rather than editing this file when tuning.

// ── Playfield ─────────────────────────────────────────────────────────────────

/// Half-width of the playfield the ship is confined to (world units).
pub const PLAYFIELD_HALF_WIDTH: f32 = 600.0;

/// Half-height of the playfield the ship is confined to (world units).
pub const PLAYFIELD_HALF_HEIGHT: f32 = 330.0;

/// Where the ship spawns and respawns.  Left third of the screen, vertically centred.
pub const SHIP_START_X: f32 = -420.0;
pub const SHIP_START_Y: f32 = 0.0;

// ── Ship: Collision capsule ───────────────────────────────────────────────────

/// Half the length of the capsule's straight segment (along local X).
pub const CAPSULE_HALF_LENGTH: f32 = 14.0;

/// Capsule radius.
pub const CAPSULE_RADIUS: f32 = 9.0;

// ── Ship: Cannons ─────────────────────────────────────────────────────────────

/// Cannon identifiers; [`crate::ship::Cannon`] maps onto these indices.
pub const RIGHT_CANNON: u8 = 0;
pub const LEFT_CANNON: u8 = 1;
pub const TOP_CANNON: u8 = 2;

/// Number of cannon mounts in the firing cycle.
pub const CANNON_COUNT: u8 = 3;

/// Default socket names on the ship mesh.
pub const RIGHT_CANNON_SOCKET: &str = "cannon_right";
pub const LEFT_CANNON_SOCKET: &str = "cannon_left";
pub const TOP_CANNON_SOCKET: &str = "cannon_top";
pub const ENGINE_THRUST_SOCKET: &str = "engine_thrust";

/// Seconds between two consecutive `Fire` calls while the fire input is held.
pub const FIRE_COOLDOWN: f32 = 0.12;

// ── Ship: Movement ────────────────────────────────────────────────────────────

/// Top speed of the ship at full axis deflection (u/s).
pub const SHIP_MAX_SPEED: f32 = 320.0;

/// Extra max speed granted by each activated `Speed` power-up (u/s).
pub const SPEED_POWER_UP_BONUS: f32 = 80.0;

/// Left-stick magnitude below which gamepad input is ignored.
pub const GAMEPAD_DEADZONE: f32 = 0.2;

// ── Ship: Highlight glow ──────────────────────────────────────────────────────

/// Speed of the highlight glow while in power-up activation mode (range units/s).
pub const HIGHLIGHT_GLOW_SPEED: f32 = 1.0;

/// Lower and upper bound of the glow oscillation.
pub const GLOW_MIN: f32 = 0.0;
pub const GLOW_MAX: f32 = 1.0;

// ── Projectiles ───────────────────────────────────────────────────────────────

pub const PROJECTILE_SPEED: f32 = 900.0;
pub const PROJECTILE_LIFETIME: f32 = 1.2;
pub const PROJECTILE_COLLIDER_RADIUS: f32 = 3.0;

// ── Player state ──────────────────────────────────────────────────────────────

/// Lives at the start of a game, including the current one.
pub const PLAYER_LIVES: i32 = 3;

/// Delay between ship destruction and respawn (s).
pub const RESPAWN_DELAY_SECS: f32 = 2.0;

/// How long the power-up activation window stays open after a shift (s).
pub const POWER_UP_WINDOW_SECS: f32 = 3.0;

/// Fuel granted by a capsule unless the spawner says otherwise.
pub const FUEL_CAPSULE_VALUE: f32 = 10.0;

// ── Stage ─────────────────────────────────────────────────────────────────────

/// Seconds between hazard spawns.
pub const HAZARD_SPAWN_INTERVAL: f32 = 1.1;

/// Seconds between fuel capsule spawns.
pub const FUEL_SPAWN_INTERVAL: f32 = 4.5;

/// Leftward drift speed range of hazards (u/s).
pub const HAZARD_SPEED_MIN: f32 = 120.0;
pub const HAZARD_SPEED_MAX: f32 = 260.0;

/// Hazard collider radius range.
pub const HAZARD_RADIUS_MIN: f32 = 10.0;
pub const HAZARD_RADIUS_MAX: f32 = 26.0;

/// Drift speed of fuel capsules (u/s).
pub const FUEL_CAPSULE_SPEED: f32 = 140.0;

pub const FUEL_CAPSULE_RADIUS: f32 = 8.0;

/// Score for each hazard destroyed by a projectile.
pub const HAZARD_SCORE: u32 = 100;

// ── HUD ───────────────────────────────────────────────────────────────────────

pub const HUD_FONT_SIZE: f32 = 18.0;
