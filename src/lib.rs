//! Zynaps: the player ship of a side-scrolling arcade shooter.
//!
//! The ship flies inside a fixed playfield, fires from three cannons in
//! rotation, collects fuel capsules that shift the power-up selection, and
//! explodes on contact with hazards.  Gameplay plugins run headless; the
//! render and input plugins are added by the binary.

pub mod audio;
pub mod camera_shake;
pub mod config;
pub mod constants;
pub mod error;
pub mod game_state;
pub mod hud;
pub mod movement;
pub mod particles;
pub mod player_state;
pub mod ship;
pub mod stage;
