//! Authoritative per-player state: fuel, lives, score and power-ups.
//!
//! The ship never decides policy on its own.  It credits fuel, reports its
//! destruction and asks for power-up activation through the methods here, and
//! reacts to what they return (which sound to play, whether the game is over).

use crate::config::ShipConfig;
use bevy::prelude::*;

/// Power-ups in the order the selection cycles through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUp {
    Speed,
    Laser,
    PlasmaBombs,
    HomingMissiles,
    SeekerMissiles,
}

impl PowerUp {
    pub const ALL: [PowerUp; 5] = [
        PowerUp::Speed,
        PowerUp::Laser,
        PowerUp::PlasmaBombs,
        PowerUp::HomingMissiles,
        PowerUp::SeekerMissiles,
    ];

    /// The power-up after this one, wrapping back to `Speed`.
    pub fn next(self) -> PowerUp {
        let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            PowerUp::Speed => "Speed",
            PowerUp::Laser => "Laser",
            PowerUp::PlasmaBombs => "Plasma Bombs",
            PowerUp::HomingMissiles => "Homing Missiles",
            PowerUp::SeekerMissiles => "Seeker Missiles",
        }
    }
}

/// Result of crediting fuel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelCredit {
    /// Fuel added by this credit.
    pub amount: f32,
    /// The selection moved to this power-up and the activation window opened.
    pub shifted_to: Option<PowerUp>,
}

/// What happens after the ship is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestructionOutcome {
    /// Lives remain; the ship comes back after the respawn delay.
    Respawn,
    /// That was the last life.
    GameOver,
}

#[derive(Resource, Debug, Clone)]
pub struct PlayerState {
    pub fuel: f32,
    /// Lives left, including the current one.
    pub lives: i32,
    pub score: u32,
    /// `Some(t)` while the ship is waiting `t` seconds to respawn.
    pub respawn_timer: Option<f32>,
    /// Power-up that would be activated right now; `None` until the first fuel capsule.
    pub selected_power_up: Option<PowerUp>,
    /// Seconds left in the activation window; `None` while the mode is closed.
    pub activation_window: Option<f32>,
    /// Activated power-ups with their stacked level.
    pub active_power_ups: Vec<(PowerUp, u32)>,
    window_secs: f32,
    respawn_delay: f32,
    starting_lives: i32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::from_config(&ShipConfig::default())
    }
}

impl PlayerState {
    pub fn from_config(config: &ShipConfig) -> Self {
        Self {
            fuel: 0.0,
            lives: config.player_lives,
            score: 0,
            respawn_timer: None,
            selected_power_up: None,
            activation_window: None,
            active_power_ups: Vec::new(),
            window_secs: config.power_up_window_secs,
            respawn_delay: config.respawn_delay_secs,
            starting_lives: config.player_lives,
        }
    }

    /// Add fuel from a collected capsule and shift the power-up selection.
    pub fn credit_fuel(&mut self, amount: f32) -> FuelCredit {
        self.fuel += amount;
        let next = match self.selected_power_up {
            Some(current) => current.next(),
            None => PowerUp::Speed,
        };
        self.selected_power_up = Some(next);
        self.activation_window = Some(self.window_secs);
        FuelCredit {
            amount,
            shifted_to: Some(next),
        }
    }

    /// True while the power-up activation window is open.
    pub fn power_up_mode_active(&self) -> bool {
        self.activation_window.is_some()
    }

    /// Activate the selected power-up if the window is open.
    ///
    /// Closes the window and resets the selection on success.
    pub fn activate_power_up(&mut self) -> Option<PowerUp> {
        self.activation_window?;
        let power_up = self.selected_power_up.take()?;
        self.activation_window = None;
        match self.active_power_ups.iter_mut().find(|(p, _)| *p == power_up) {
            Some((_, level)) => *level += 1,
            None => self.active_power_ups.push((power_up, 1)),
        }
        Some(power_up)
    }

    /// Count down the activation window; returns `true` on the frame it closes.
    pub fn tick_activation_window(&mut self, dt: f32) -> bool {
        let Some(remaining) = self.activation_window.as_mut() else {
            return false;
        };
        *remaining -= dt;
        if *remaining <= 0.0 {
            self.activation_window = None;
            return true;
        }
        false
    }

    /// Stacked level of an activated power-up; 0 when never activated.
    pub fn power_up_level(&self, power_up: PowerUp) -> u32 {
        self.active_power_ups
            .iter()
            .find(|(p, _)| *p == power_up)
            .map_or(0, |(_, level)| *level)
    }

    /// Record the loss of the ship.
    ///
    /// Consumes a life, drops activated power-ups and the selection, and
    /// schedules a respawn unless no lives remain.
    pub fn record_destruction(&mut self) -> DestructionOutcome {
        self.lives -= 1;
        self.active_power_ups.clear();
        self.selected_power_up = None;
        self.activation_window = None;
        if self.lives <= 0 {
            self.lives = 0;
            self.respawn_timer = None;
            DestructionOutcome::GameOver
        } else {
            self.respawn_timer = Some(self.respawn_delay);
            DestructionOutcome::Respawn
        }
    }

    /// Count down a pending respawn; returns `true` once it is due.
    ///
    /// Clears the timer when it fires so the respawn happens once.
    pub fn tick_respawn(&mut self, dt: f32) -> bool {
        let Some(timer) = self.respawn_timer.as_mut() else {
            return false;
        };
        *timer -= dt;
        if *timer > 0.0 {
            return false;
        }
        self.respawn_timer = None;
        true
    }

    /// Reset to a fresh game (used on restart from game over).
    pub fn reset(&mut self) {
        self.fuel = 0.0;
        self.lives = self.starting_lives;
        self.score = 0;
        self.respawn_timer = None;
        self.selected_power_up = None;
        self.activation_window = None;
        self.active_power_ups.clear();
    }
}

/// Startup system: rebuild the player state from the loaded config.
pub fn init_player_state(mut player: ResMut<PlayerState>, config: Res<ShipConfig>) {
    *player = PlayerState::from_config(&config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuel_credit_shifts_selection_through_the_cycle() {
        let mut state = PlayerState::default();
        let first = state.credit_fuel(10.0);
        assert_eq!(first.shifted_to, Some(PowerUp::Speed));
        let second = state.credit_fuel(5.0);
        assert_eq!(second.shifted_to, Some(PowerUp::Laser));
        assert_eq!(state.fuel, 15.0);
        assert!(state.power_up_mode_active());
    }

    #[test]
    fn selection_wraps_after_last_power_up() {
        assert_eq!(PowerUp::SeekerMissiles.next(), PowerUp::Speed);
    }

    #[test]
    fn activation_requires_open_window() {
        let mut state = PlayerState::default();
        assert_eq!(state.activate_power_up(), None);

        state.credit_fuel(10.0);
        assert_eq!(state.activate_power_up(), Some(PowerUp::Speed));
        assert!(!state.power_up_mode_active());
        assert_eq!(state.power_up_level(PowerUp::Speed), 1);
        // Window is closed now, a second request does nothing.
        assert_eq!(state.activate_power_up(), None);
    }

    #[test]
    fn repeated_activation_stacks_levels() {
        let mut state = PlayerState::default();
        for _ in 0..2 {
            state.credit_fuel(1.0);
            state.activate_power_up();
        }
        assert_eq!(state.power_up_level(PowerUp::Speed), 2);
    }

    #[test]
    fn activation_window_expires() {
        let config = ShipConfig {
            power_up_window_secs: 1.0,
            ..Default::default()
        };
        let mut state = PlayerState::from_config(&config);
        state.credit_fuel(1.0);
        assert!(!state.tick_activation_window(0.6));
        assert!(state.tick_activation_window(0.6));
        assert!(!state.power_up_mode_active());
        assert!(!state.tick_activation_window(0.6));
    }

    #[test]
    fn destruction_consumes_lives_until_game_over() {
        let config = ShipConfig {
            player_lives: 2,
            respawn_delay_secs: 1.5,
            ..Default::default()
        };
        let mut state = PlayerState::from_config(&config);

        assert_eq!(state.record_destruction(), DestructionOutcome::Respawn);
        assert_eq!(state.lives, 1);
        assert_eq!(state.respawn_timer, Some(1.5));

        assert_eq!(state.record_destruction(), DestructionOutcome::GameOver);
        assert_eq!(state.lives, 0);
        assert_eq!(state.respawn_timer, None);
    }

    #[test]
    fn respawn_fires_once() {
        let mut state = PlayerState::default();
        state.respawn_timer = Some(1.0);
        assert!(!state.tick_respawn(0.5));
        assert!(state.tick_respawn(0.5));
        assert!(!state.tick_respawn(0.5));
    }

    #[test]
    fn destruction_drops_power_ups() {
        let mut state = PlayerState::default();
        state.credit_fuel(1.0);
        state.activate_power_up();
        state.credit_fuel(1.0);
        state.record_destruction();
        assert_eq!(state.power_up_level(PowerUp::Speed), 0);
        assert_eq!(state.selected_power_up, None);
        assert!(!state.power_up_mode_active());
    }
}
