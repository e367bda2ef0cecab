//! Runtime ship configuration loaded from `assets/zynaps.toml`.
//!
//! [`ShipConfig`] is a Bevy [`Resource`] holding every tunable property of the
//! player ship: socket layout, sound cues, particle templates, the projectile
//! type, camera shake, glow range, and a handful of stage parameters.  At
//! startup, [`load_ship_config`] reads `assets/zynaps.toml` and replaces the
//! defaults with any values present in the file.  Missing keys fall back to
//! the compile-time defaults in [`crate::constants`].
//!
//! ## Optional references
//!
//! The projectile type, explosion template, engine thrust template and camera
//! shake are `Option`s.  Leaving one out of a hand-built config (tests do
//! this) disables that effect; every system treats `None` as "skip".
//!
//! ## Tuning workflow
//!
//! 1. Edit `assets/zynaps.toml`.
//! 2. Restart the game; no recompilation required.

use crate::constants::*;
use crate::error::{
    validate_inclusive_range, validate_positive, validate_range, ZynapsError, ZynapsResult,
};
use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;

/// A named attachment point on the ship mesh, in mesh-local space.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SocketSpec {
    pub x: f32,
    pub y: f32,
    /// Counter-clockwise rotation; 0 points along local +X.
    pub rotation_deg: f32,
}

impl Default for SocketSpec {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation_deg: 0.0,
        }
    }
}

impl SocketSpec {
    pub fn new(x: f32, y: f32, rotation_deg: f32) -> Self {
        Self { x, y, rotation_deg }
    }

    pub fn to_transform(self) -> Transform {
        Transform::from_xyz(self.x, self.y, 0.0)
            .with_rotation(Quat::from_rotation_z(self.rotation_deg.to_radians()))
    }
}

/// What the ship spawns when it fires (the "projectile class").
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectileSpec {
    pub speed: f32,
    pub lifetime: f32,
    pub collider_radius: f32,
    pub color: [f32; 3],
}

impl Default for ProjectileSpec {
    fn default() -> Self {
        Self {
            speed: PROJECTILE_SPEED,
            lifetime: PROJECTILE_LIFETIME,
            collider_radius: PROJECTILE_COLLIDER_RADIUS,
            color: [1.0, 0.85, 0.35],
        }
    }
}

/// Parameters of a particle effect: a one-shot burst (`rate == 0`) or a
/// continuous emitter (`rate > 0` particles per second).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParticleTemplate {
    /// Particles per burst.
    pub count: u32,
    /// Particles per second for continuous emitters; 0 for bursts.
    pub rate: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    pub lifetime: f32,
    pub size: f32,
    /// Half-angle of the emission cone around the emitter's +X; 180 = all directions.
    pub spread_deg: f32,
    pub color: [f32; 3],
}

impl Default for ParticleTemplate {
    fn default() -> Self {
        Self::explosion()
    }
}

impl ParticleTemplate {
    /// Omnidirectional orange burst used when the ship blows up.
    pub fn explosion() -> Self {
        Self {
            count: 48,
            rate: 0.0,
            speed_min: 60.0,
            speed_max: 260.0,
            lifetime: 0.9,
            size: 2.5,
            spread_deg: 180.0,
            color: [1.0, 0.55, 0.15],
        }
    }

    /// Narrow blue exhaust stream pointing backwards out of the engine socket.
    pub fn engine_thrust() -> Self {
        Self {
            count: 1,
            rate: 60.0,
            speed_min: 80.0,
            speed_max: 140.0,
            lifetime: 0.25,
            size: 1.5,
            spread_deg: 12.0,
            color: [0.45, 0.75, 1.0],
        }
    }
}

/// Camera shake played when the ship is destroyed (the "camera shake class").
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraShakeSpec {
    pub duration: f32,
    /// Peak offset in world units at the start of the shake.
    pub amplitude: f32,
}

impl Default for CameraShakeSpec {
    fn default() -> Self {
        Self {
            duration: 0.5,
            amplitude: 12.0,
        }
    }
}

/// Asset paths of the ship's sound cues, relative to `assets/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SoundPaths {
    pub fire: Option<String>,
    pub explosion: Option<String>,
    pub shift_power_up: Option<String>,
    pub activate_power_up: Option<String>,
}

impl Default for SoundPaths {
    fn default() -> Self {
        Self {
            fire: Some("sounds/fire.ogg".into()),
            explosion: Some("sounds/explosion.ogg".into()),
            shift_power_up: Some("sounds/shift_power_up.ogg".into()),
            activate_power_up: Some("sounds/activate_power_up.ogg".into()),
        }
    }
}

/// Runtime-tunable ship and stage configuration.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShipConfig {
    // ── Playfield ─────────────────────────────────────────────────────────────
    pub playfield_half_width: f32,
    pub playfield_half_height: f32,
    pub start_x: f32,
    pub start_y: f32,

    // ── Collision capsule ─────────────────────────────────────────────────────
    pub capsule_half_length: f32,
    pub capsule_radius: f32,

    // ── Mesh ──────────────────────────────────────────────────────────────────
    /// Convex hull of the ship in mesh-local space; the nose points along +X.
    pub hull: Vec<[f32; 2]>,
    pub base_color: [f32; 3],
    /// Colour the ship is tinted toward at full glow.
    pub glow_color: [f32; 3],
    pub sockets: HashMap<String, SocketSpec>,
    pub right_cannon_socket: String,
    pub left_cannon_socket: String,
    pub top_cannon_socket: String,
    pub engine_thrust_socket: String,

    // ── Movement ──────────────────────────────────────────────────────────────
    pub max_speed: f32,
    pub speed_power_up_bonus: f32,

    // ── Firing ────────────────────────────────────────────────────────────────
    pub fire_cooldown: f32,
    pub projectile: Option<ProjectileSpec>,

    // ── Effects ───────────────────────────────────────────────────────────────
    pub explosion: Option<ParticleTemplate>,
    pub engine_thrust: Option<ParticleTemplate>,
    pub camera_shake: Option<CameraShakeSpec>,
    pub sounds: SoundPaths,

    // ── Highlight glow ────────────────────────────────────────────────────────
    pub glow_min: f32,
    pub glow_max: f32,
    pub highlight_glow_speed: f32,

    // ── Player state ──────────────────────────────────────────────────────────
    pub player_lives: i32,
    pub respawn_delay_secs: f32,
    pub power_up_window_secs: f32,

    // ── Stage ─────────────────────────────────────────────────────────────────
    pub hazard_spawn_interval: f32,
    pub fuel_spawn_interval: f32,
    pub hazard_speed_min: f32,
    pub hazard_speed_max: f32,
    pub hazard_radius_min: f32,
    pub hazard_radius_max: f32,
    pub hazard_score: u32,
    pub fuel_capsule_value: f32,
    pub fuel_capsule_speed: f32,
    pub fuel_capsule_radius: f32,

    // ── HUD ───────────────────────────────────────────────────────────────────
    pub hud_font_size: f32,
}

/// Default ship outline: a swept arrowhead pointing right.
fn default_hull() -> Vec<[f32; 2]> {
    vec![
        [22.0, 0.0],
        [4.0, 10.0],
        [-14.0, 14.0],
        [-18.0, 0.0],
        [-14.0, -14.0],
        [4.0, -10.0],
    ]
}

fn default_sockets() -> HashMap<String, SocketSpec> {
    HashMap::from([
        (RIGHT_CANNON_SOCKET.to_string(), SocketSpec::new(8.0, -11.0, 0.0)),
        (LEFT_CANNON_SOCKET.to_string(), SocketSpec::new(8.0, 11.0, 0.0)),
        (TOP_CANNON_SOCKET.to_string(), SocketSpec::new(22.0, 0.0, 0.0)),
        (ENGINE_THRUST_SOCKET.to_string(), SocketSpec::new(-18.0, 0.0, 180.0)),
    ])
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            // Playfield
            playfield_half_width: PLAYFIELD_HALF_WIDTH,
            playfield_half_height: PLAYFIELD_HALF_HEIGHT,
            start_x: SHIP_START_X,
            start_y: SHIP_START_Y,
            // Capsule
            capsule_half_length: CAPSULE_HALF_LENGTH,
            capsule_radius: CAPSULE_RADIUS,
            // Mesh
            hull: default_hull(),
            base_color: [0.20, 0.62, 0.70],
            glow_color: [1.0, 0.95, 0.55],
            sockets: default_sockets(),
            right_cannon_socket: RIGHT_CANNON_SOCKET.to_string(),
            left_cannon_socket: LEFT_CANNON_SOCKET.to_string(),
            top_cannon_socket: TOP_CANNON_SOCKET.to_string(),
            engine_thrust_socket: ENGINE_THRUST_SOCKET.to_string(),
            // Movement
            max_speed: SHIP_MAX_SPEED,
            speed_power_up_bonus: SPEED_POWER_UP_BONUS,
            // Firing
            fire_cooldown: FIRE_COOLDOWN,
            projectile: Some(ProjectileSpec::default()),
            // Effects
            explosion: Some(ParticleTemplate::explosion()),
            engine_thrust: Some(ParticleTemplate::engine_thrust()),
            camera_shake: Some(CameraShakeSpec::default()),
            sounds: SoundPaths::default(),
            // Glow
            glow_min: GLOW_MIN,
            glow_max: GLOW_MAX,
            highlight_glow_speed: HIGHLIGHT_GLOW_SPEED,
            // Player state
            player_lives: PLAYER_LIVES,
            respawn_delay_secs: RESPAWN_DELAY_SECS,
            power_up_window_secs: POWER_UP_WINDOW_SECS,
            // Stage
            hazard_spawn_interval: HAZARD_SPAWN_INTERVAL,
            fuel_spawn_interval: FUEL_SPAWN_INTERVAL,
            hazard_speed_min: HAZARD_SPEED_MIN,
            hazard_speed_max: HAZARD_SPEED_MAX,
            hazard_radius_min: HAZARD_RADIUS_MIN,
            hazard_radius_max: HAZARD_RADIUS_MAX,
            hazard_score: HAZARD_SCORE,
            fuel_capsule_value: FUEL_CAPSULE_VALUE,
            fuel_capsule_speed: FUEL_CAPSULE_SPEED,
            fuel_capsule_radius: FUEL_CAPSULE_RADIUS,
            // HUD
            hud_font_size: HUD_FONT_SIZE,
        }
    }
}

impl ShipConfig {
    /// Parse a TOML document and validate the result.
    pub fn from_toml_str(contents: &str) -> ZynapsResult<Self> {
        let config: ShipConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the ship systems rely on.
    pub fn validate(&self) -> ZynapsResult<()> {
        if self.hull.len() < 3 {
            return Err(ZynapsError::DegenerateHull {
                got: self.hull.len(),
            });
        }
        validate_positive("capsule_radius", self.capsule_radius)?;
        validate_positive("capsule_half_length", self.capsule_half_length)?;
        validate_positive("max_speed", self.max_speed)?;
        validate_positive("playfield_half_width", self.playfield_half_width)?;
        validate_positive("playfield_half_height", self.playfield_half_height)?;
        validate_range("glow", self.glow_min, self.glow_max)?;
        validate_inclusive_range("hazard_speed", self.hazard_speed_min, self.hazard_speed_max)?;
        validate_inclusive_range("hazard_radius", self.hazard_radius_min, self.hazard_radius_max)?;
        validate_positive("hazard_radius_min", self.hazard_radius_min)?;
        validate_positive("fuel_capsule_radius", self.fuel_capsule_radius)?;

        if let Some(projectile) = &self.projectile {
            validate_positive("projectile.lifetime", projectile.lifetime)?;
            validate_positive("projectile.collider_radius", projectile.collider_radius)?;
        }
        if let Some(explosion) = &self.explosion {
            validate_positive("explosion.lifetime", explosion.lifetime)?;
        }
        if let Some(thrust) = &self.engine_thrust {
            validate_positive("engine_thrust.lifetime", thrust.lifetime)?;
        }

        for (role, name) in [
            ("right_cannon_socket", &self.right_cannon_socket),
            ("left_cannon_socket", &self.left_cannon_socket),
            ("top_cannon_socket", &self.top_cannon_socket),
            ("engine_thrust_socket", &self.engine_thrust_socket),
        ] {
            if !self.sockets.contains_key(name) {
                return Err(ZynapsError::UnknownSocket {
                    role,
                    name: name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn base_color(&self) -> Color {
        let [r, g, b] = self.base_color;
        Color::srgb(r, g, b)
    }

    pub fn glow_color(&self) -> Color {
        let [r, g, b] = self.glow_color;
        Color::srgb(r, g, b)
    }

    pub fn start_position(&self) -> Vec2 {
        Vec2::new(self.start_x, self.start_y)
    }

    /// The rectangle the ship centre is confined to.
    pub fn playfield(&self) -> Rect {
        Rect::new(
            -self.playfield_half_width,
            -self.playfield_half_height,
            self.playfield_half_width,
            self.playfield_half_height,
        )
    }
}

/// Startup system: attempt to load `assets/zynaps.toml` and overwrite the
/// `ShipConfig` resource with its contents.
///
/// Missing keys retain their compiled defaults.  Parse and validation errors
/// are logged but do not abort the game.  A missing file is not an error.
pub fn load_ship_config(mut config: ResMut<ShipConfig>) {
    let path = "assets/zynaps.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match ShipConfig::from_toml_str(&contents) {
            Ok(loaded) => {
                *config = loaded;
                info!("Loaded ship config from {path}");
            }
            Err(e) => {
                warn!("Rejected {path}: {e}; using defaults");
            }
        },
        Err(_) => {
            info!("No {path} found; using compiled defaults");
        }
    }
}
