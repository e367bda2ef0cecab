use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier2d::prelude::*;

use zynaps::audio::load_ship_sounds;
use zynaps::config::{load_ship_config, ShipConfig};
use zynaps::game_state::GameStatePlugin;
use zynaps::hud::HudPlugin;
use zynaps::particles::{ParticleRenderPlugin, ParticlesPlugin};
use zynaps::player_state::init_player_state;
use zynaps::ship::{spawn_ship_at_start, ShipInputPlugin, ShipPlugin, ShipRenderPlugin};
use zynaps::stage::StagePlugin;

/// Configure Rapier: no gravity in space.
fn setup_physics_config(mut config: Query<&mut RapierConfiguration>) {
    for mut cfg in config.iter_mut() {
        cfg.gravity = Vec2::ZERO;
    }
}

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Zynaps".into(),
                resolution: WindowResolution::new(1200, 680),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::BLACK))
        // Compiled defaults; load_ship_config overwrites them from
        // assets/zynaps.toml (if present) in the Startup schedule.
        .insert_resource(ShipConfig::default())
        // World units are pixels.
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0))
        .add_plugins(GameStatePlugin)
        .add_plugins((ShipPlugin, ShipInputPlugin, ShipRenderPlugin))
        .add_plugins((ParticlesPlugin, ParticleRenderPlugin))
        .add_plugins((StagePlugin, HudPlugin))
        .add_systems(
            Startup,
            (
                // Load config first so every other startup system sees the final values.
                load_ship_config,
                (init_player_state, load_ship_sounds, spawn_ship_at_start),
            )
                .chain(),
        )
        .add_systems(Startup, setup_physics_config)
        .run();
}
