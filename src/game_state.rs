//! Top-level `GameState` and the pause / game-over flow.
//!
//! ## States
//!
//! | State      | Description                                      |
//! |------------|--------------------------------------------------|
//! | `Playing`  | Initial state; all gameplay systems active       |
//! | `Paused`   | Simulation frozen, Rapier pipeline disabled      |
//! | `GameOver` | Last life lost; Enter restarts                   |

use crate::player_state::PlayerState;
use crate::stage::StageEntity;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Top-level application state machine.
#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    #[default]
    Playing,
    Paused,
    GameOver,
}

/// Registers `GameState` and the pause / restart input handling.
///
/// Must be added before any plugin whose systems use
/// `.run_if(in_state(GameState::Playing))`.
pub struct GameStatePlugin;

impl Plugin for GameStatePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_systems(OnEnter(GameState::Paused), pause_physics)
            .add_systems(OnExit(GameState::Paused), resume_physics)
            .add_systems(
                Update,
                (
                    toggle_pause_system.run_if(in_state(GameState::Playing)),
                    pause_resume_input_system.run_if(in_state(GameState::Paused)),
                    restart_input_system.run_if(in_state(GameState::GameOver)),
                ),
            );
    }
}

/// Disable the Rapier physics pipeline so nothing moves while paused.
pub fn pause_physics(mut config: Query<&mut RapierConfiguration>) {
    for mut cfg in config.iter_mut() {
        cfg.physics_pipeline_active = false;
    }
}

/// Re-enable the Rapier physics pipeline when the player resumes.
pub fn resume_physics(mut config: Query<&mut RapierConfiguration>) {
    for mut cfg in config.iter_mut() {
        cfg.physics_pipeline_active = true;
    }
}

/// ESC while in `Playing` → `Paused`.
pub fn toggle_pause_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if keys.just_pressed(KeyCode::Escape) {
        next_state.set(GameState::Paused);
    }
}

/// ESC while in `Paused` → back to `Playing`.
pub fn pause_resume_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if keys.just_pressed(KeyCode::Escape) {
        next_state.set(GameState::Playing);
    }
}

/// Enter while in `GameOver` → clear the stage, reset the player and play again.
///
/// The respawn timer is set to zero so the respawn system brings the ship
/// back on the first `Playing` frame.
pub fn restart_input_system(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    stage_entities: Query<Entity, With<StageEntity>>,
    mut player: ResMut<PlayerState>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !keys.just_pressed(KeyCode::Enter) {
        return;
    }
    for entity in stage_entities.iter() {
        commands.entity(entity).despawn();
    }
    player.reset();
    player.respawn_timer = Some(0.0);
    next_state.set(GameState::Playing);
    info!("Restarting with {} lives", player.lives);
}
