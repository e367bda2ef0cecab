//! Camera, HUD and the pause / game-over banner.
//!
//! | System                  | Schedule | Purpose                                  |
//! |-------------------------|----------|------------------------------------------|
//! | `setup_camera`          | Startup  | `Camera2d` carrying a `CameraShake`      |
//! | `setup_hud`             | Startup  | Status line and banner nodes             |
//! | `hud_status_system`     | Update   | Lives, fuel, score, power-up selection   |
//! | `hud_banner_system`     | Update   | "PAUSED" / "GAME OVER" text              |
//! | `camera_shake_system`   | Update   | Apply and decay the shake offset         |

use crate::camera_shake::{camera_shake_system, CameraShake};
use crate::config::{load_ship_config, ShipConfig};
use crate::game_state::GameState;
use crate::player_state::PlayerState;
use bevy::prelude::*;

/// Marker for the status line text.
#[derive(Component)]
pub struct HudStatus;

/// Marker for the centred state banner text.
#[derive(Component)]
pub struct HudBanner;

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (setup_camera, setup_hud.after(load_ship_config)))
            .add_systems(
                Update,
                (hud_status_system, hud_banner_system, camera_shake_system),
            );
    }
}

pub fn setup_camera(mut commands: Commands) {
    commands.spawn((Camera2d, CameraShake::default()));
}

pub fn setup_hud(mut commands: Commands, config: Res<ShipConfig>) {
    commands.spawn((
        Text::new(status_line(&PlayerState::from_config(&config))),
        TextFont {
            font_size: config.hud_font_size,
            ..default()
        },
        TextColor(Color::srgb(0.95, 0.88, 0.45)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            top: Val::Px(10.0),
            ..default()
        },
        HudStatus,
    ));

    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: config.hud_font_size * 2.5,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            top: Val::Percent(42.0),
            justify_content: JustifyContent::Center,
            ..default()
        },
        HudBanner,
    ));
}

/// One-line summary of the player's state.
pub fn status_line(player: &PlayerState) -> String {
    let selection = match (player.selected_power_up, player.activation_window) {
        (Some(p), Some(t)) => format!("{} [{:.1}s]", p.label(), t.max(0.0)),
        (Some(p), None) => p.label().to_string(),
        (None, _) => "-".to_string(),
    };
    format!(
        "Lives: {}   Fuel: {:.0}   Score: {}   Power-up: {}",
        player.lives, player.fuel, player.score, selection
    )
}

pub fn hud_status_system(
    player: Res<PlayerState>,
    mut query: Query<&mut Text, With<HudStatus>>,
) {
    if !player.is_changed() {
        return;
    }
    for mut text in query.iter_mut() {
        *text = Text::new(status_line(&player));
    }
}

pub fn hud_banner_system(
    state: Res<State<GameState>>,
    mut query: Query<&mut Text, With<HudBanner>>,
) {
    if !state.is_changed() {
        return;
    }
    let banner = match state.get() {
        GameState::Playing => "",
        GameState::Paused => "PAUSED  (Esc to resume)",
        GameState::GameOver => "GAME OVER  (Enter to play again)",
    };
    for mut text in query.iter_mut() {
        *text = Text::new(banner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_shows_open_window() {
        let mut player = PlayerState::default();
        assert!(status_line(&player).ends_with("Power-up: -"));

        player.credit_fuel(10.0);
        let line = status_line(&player);
        assert!(line.contains("Fuel: 10"));
        assert!(line.contains("Power-up: Speed ["));
    }
}
