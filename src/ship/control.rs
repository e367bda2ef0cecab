//! Ship input systems and the movement relay.
//!
//! ## Pipeline (runs in order every `Update` frame)
//!
//! 1. [`ship_intent_clear_system`]: resets `ShipIntent` to zero.
//! 2. [`keyboard_to_intent_system`]: WASD / arrows, Space, Shift.
//! 3. [`gamepad_to_intent_system`]: left stick, South and West buttons.
//! 4. [`apply_ship_intent_system`]: relays the four axes to `Fly2DMovement`.
//!
//! The ship performs no movement math of its own.  Each relay function writes
//! one magnitude to the matching axis of the movement component and
//! [`crate::movement::fly2d_movement_system`] does the rest.

use super::state::{PlayerShip, PreferredGamepad, ShipIntent};
use crate::config::ShipConfig;
use crate::constants::GAMEPAD_DEADZONE;
use crate::movement::Fly2DMovement;
use crate::player_state::{PlayerState, PowerUp};
use bevy::input::gamepad::{GamepadAxis, GamepadButton, GamepadConnection, GamepadConnectionEvent};
use bevy::prelude::*;

// ── Movement relay ────────────────────────────────────────────────────────────

pub fn move_up(movement: &mut Fly2DMovement, val: f32) {
    movement.move_up(val);
}

pub fn move_down(movement: &mut Fly2DMovement, val: f32) {
    movement.move_down(val);
}

pub fn move_left(movement: &mut Fly2DMovement, val: f32) {
    movement.move_left(val);
}

pub fn move_right(movement: &mut Fly2DMovement, val: f32) {
    movement.move_right(val);
}

// ── Step 1: Clear ─────────────────────────────────────────────────────────────

pub fn ship_intent_clear_system(mut intent: ResMut<ShipIntent>) {
    *intent = ShipIntent::default();
}

// ── Step 2a: Keyboard → Intent ────────────────────────────────────────────────

/// Translate keys into [`ShipIntent`].
///
/// - **W / ↑**, **S / ↓**, **A / ←**, **D / →** → the four axes at full deflection
/// - **Space** → `fire` (held)
/// - **Left / Right Shift** → `activate_power_up` (on press)
pub fn keyboard_to_intent_system(keys: Res<ButtonInput<KeyCode>>, mut intent: ResMut<ShipIntent>) {
    if keys.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]) {
        intent.up = 1.0;
    }
    if keys.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]) {
        intent.down = 1.0;
    }
    if keys.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        intent.left = 1.0;
    }
    if keys.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        intent.right = 1.0;
    }
    if keys.pressed(KeyCode::Space) {
        intent.fire = true;
    }
    if keys.any_just_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) {
        intent.activate_power_up = true;
    }
}

// ── Step 2b: Gamepad connection ────────────────────────────────────────────────

/// Track gamepad connect / disconnect events and update [`PreferredGamepad`].
///
/// The most-recently-connected gamepad is preferred.
pub fn gamepad_connection_system(
    mut events: MessageReader<GamepadConnectionEvent>,
    mut preferred: ResMut<PreferredGamepad>,
) {
    for event in events.read() {
        match &event.connection {
            GamepadConnection::Connected { .. } => {
                preferred.0 = Some(event.gamepad);
                info!(
                    "[gamepad] Gamepad {:?} connected (now preferred)",
                    event.gamepad
                );
            }
            GamepadConnection::Disconnected => {
                info!("[gamepad] Gamepad {:?} disconnected", event.gamepad);
                if preferred.0 == Some(event.gamepad) {
                    preferred.0 = None;
                }
            }
        }
    }
}

// ── Step 2c: Gamepad → Intent ─────────────────────────────────────────────────

/// Translate the left stick and face buttons into [`ShipIntent`].
///
/// Each stick half drives one axis, so a diagonal sets two of them.  **South**
/// fires and **West** activates the selected power-up.  Keyboard values that
/// are already set win over a smaller stick deflection.
pub fn gamepad_to_intent_system(
    preferred: Res<PreferredGamepad>,
    gamepads: Query<&Gamepad>,
    mut intent: ResMut<ShipIntent>,
) {
    let Some(gamepad_entity) = preferred.0 else {
        return;
    };
    let Ok(gamepad) = gamepads.get(gamepad_entity) else {
        return;
    };

    if gamepad.pressed(GamepadButton::South) {
        intent.fire = true;
    }
    if gamepad.just_pressed(GamepadButton::West) {
        intent.activate_power_up = true;
    }

    let lx = gamepad.get(GamepadAxis::LeftStickX).unwrap_or(0.0);
    let ly = gamepad.get(GamepadAxis::LeftStickY).unwrap_or(0.0);
    let stick = Vec2::new(lx, ly);
    if stick.length() < GAMEPAD_DEADZONE {
        return;
    }
    let stick = stick.clamp_length_max(1.0);

    intent.right = intent.right.max(stick.x.max(0.0));
    intent.left = intent.left.max((-stick.x).max(0.0));
    intent.up = intent.up.max(stick.y.max(0.0));
    intent.down = intent.down.max((-stick.y).max(0.0));
}

// ── Step 3: Apply intent → movement ──────────────────────────────────────────

/// Relay [`ShipIntent`] to the ship's [`Fly2DMovement`].
///
/// Also keeps the movement's speed bonus in step with the stacked `Speed`
/// power-up level.
pub fn apply_ship_intent_system(
    mut q: Query<&mut Fly2DMovement, With<PlayerShip>>,
    intent: Res<ShipIntent>,
    player: Res<PlayerState>,
    config: Res<ShipConfig>,
) {
    let Ok(mut movement) = q.single_mut() else {
        return;
    };

    move_up(&mut movement, intent.up);
    move_down(&mut movement, intent.down);
    move_left(&mut movement, intent.left);
    move_right(&mut movement, intent.right);

    movement.speed_bonus =
        player.power_up_level(PowerUp::Speed) as f32 * config.speed_power_up_bonus;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SPEED_POWER_UP_BONUS;

    // ── helpers ───────────────────────────────────────────────────────────────

    fn build_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(ShipIntent::default());
        app.insert_resource(ShipConfig::default());
        app.insert_resource(PlayerState::default());
        app
    }

    fn spawn_test_ship(app: &mut App) -> Entity {
        app.world_mut()
            .spawn((
                PlayerShip,
                Transform::default(),
                Fly2DMovement::new(100.0, Rect::new(-500.0, -500.0, 500.0, 500.0)),
            ))
            .id()
    }

    fn run_apply(app: &mut App, intent: ShipIntent) {
        app.insert_resource(intent);
        app.add_systems(Update, apply_ship_intent_system);
        app.update();
    }

    // ── relay ─────────────────────────────────────────────────────────────────

    #[test]
    fn relay_forwards_each_magnitude_unchanged() {
        let mut movement = Fly2DMovement::new(100.0, Rect::new(-1.0, -1.0, 1.0, 1.0));
        move_up(&mut movement, 0.25);
        move_down(&mut movement, -0.5);
        move_left(&mut movement, 0.75);
        move_right(&mut movement, 1.0);
        assert_eq!(movement.up, 0.25);
        assert_eq!(movement.down, -0.5);
        assert_eq!(movement.left, 0.75);
        assert_eq!(movement.right, 1.0);
    }

    #[test]
    fn apply_writes_intent_into_movement() {
        let mut app = build_test_app();
        let ship = spawn_test_ship(&mut app);

        run_apply(
            &mut app,
            ShipIntent {
                up: 0.4,
                right: 0.9,
                ..Default::default()
            },
        );

        let movement = app.world().get::<Fly2DMovement>(ship).unwrap();
        assert_eq!(movement.up, 0.4);
        assert_eq!(movement.right, 0.9);
        assert_eq!(movement.down, 0.0);
        assert_eq!(movement.left, 0.0);
    }

    #[test]
    fn apply_without_ship_is_a_no_op() {
        let mut app = build_test_app();
        run_apply(
            &mut app,
            ShipIntent {
                up: 1.0,
                ..Default::default()
            },
        );
    }

    #[test]
    fn speed_power_up_raises_bonus() {
        let mut app = build_test_app();
        let ship = spawn_test_ship(&mut app);
        {
            let mut player = app.world_mut().resource_mut::<PlayerState>();
            player.credit_fuel(1.0);
            player.activate_power_up();
        }

        run_apply(&mut app, ShipIntent::default());

        let movement = app.world().get::<Fly2DMovement>(ship).unwrap();
        assert_eq!(movement.speed_bonus, SPEED_POWER_UP_BONUS);
    }

    // ── clear ─────────────────────────────────────────────────────────────────

    #[test]
    fn clear_resets_intent() {
        let mut app = build_test_app();
        app.insert_resource(ShipIntent {
            up: 1.0,
            fire: true,
            activate_power_up: true,
            ..Default::default()
        });
        app.add_systems(Update, ship_intent_clear_system);
        app.update();

        assert_eq!(*app.world().resource::<ShipIntent>(), ShipIntent::default());
    }

    // ── keyboard ──────────────────────────────────────────────────────────────

    #[test]
    fn keyboard_maps_arrows_and_fire() {
        let mut app = build_test_app();
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::ArrowUp);
        keys.press(KeyCode::KeyA);
        keys.press(KeyCode::Space);
        app.insert_resource(keys);
        app.add_systems(Update, keyboard_to_intent_system);
        app.update();

        let intent = *app.world().resource::<ShipIntent>();
        assert_eq!(intent.up, 1.0);
        assert_eq!(intent.left, 1.0);
        assert_eq!(intent.right, 0.0);
        assert!(intent.fire);
        assert!(!intent.activate_power_up);
    }
}
