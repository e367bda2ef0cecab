//! Two-axis flight movement for the player ship.
//!
//! [`Fly2DMovement`] collects four directional magnitudes per frame and turns
//! them into a velocity in [`fly2d_movement_system`].  The ship only relays
//! its input here.  Velocity integration and the playfield clamp live in
//! this module.

use bevy::prelude::*;

/// Movement component carried by the ship root.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Fly2DMovement {
    /// Pending magnitudes for this frame; consumed by the movement system.
    pub up: f32,
    pub down: f32,
    pub left: f32,
    pub right: f32,
    /// Speed at full deflection before power-up bonuses (u/s).
    pub max_speed: f32,
    /// Added to `max_speed`, e.g. by `Speed` power-ups.
    pub speed_bonus: f32,
    /// Region the owner's translation is clamped to.
    pub bounds: Rect,
    /// Velocity applied on the last tick.
    pub velocity: Vec2,
}

impl Fly2DMovement {
    pub fn new(max_speed: f32, bounds: Rect) -> Self {
        Self {
            up: 0.0,
            down: 0.0,
            left: 0.0,
            right: 0.0,
            max_speed,
            speed_bonus: 0.0,
            bounds,
            velocity: Vec2::ZERO,
        }
    }

    pub fn move_up(&mut self, val: f32) {
        self.up = val;
    }

    pub fn move_down(&mut self, val: f32) {
        self.down = val;
    }

    pub fn move_left(&mut self, val: f32) {
        self.left = val;
    }

    pub fn move_right(&mut self, val: f32) {
        self.right = val;
    }

    /// Net direction from the pending inputs, clamped to unit length.
    pub fn axis(&self) -> Vec2 {
        Vec2::new(self.right - self.left, self.up - self.down).clamp_length_max(1.0)
    }

    /// Advance `translation` by one tick and consume the pending inputs.
    pub fn step(&mut self, translation: &mut Vec3, dt: f32) {
        self.velocity = self.axis() * (self.max_speed + self.speed_bonus);
        let next = translation.truncate() + self.velocity * dt;
        let clamped = next.clamp(self.bounds.min, self.bounds.max);
        translation.x = clamped.x;
        translation.y = clamped.y;
        self.up = 0.0;
        self.down = 0.0;
        self.left = 0.0;
        self.right = 0.0;
    }
}

/// Integrate every [`Fly2DMovement`] for this frame.
pub fn fly2d_movement_system(
    mut query: Query<(&mut Transform, &mut Fly2DMovement)>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();
    for (mut transform, mut movement) in query.iter_mut() {
        movement.step(&mut transform.translation, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movement() -> Fly2DMovement {
        Fly2DMovement::new(100.0, Rect::new(-50.0, -50.0, 50.0, 50.0))
    }

    #[test]
    fn opposite_inputs_cancel() {
        let mut m = movement();
        m.move_up(1.0);
        m.move_down(1.0);
        assert_eq!(m.axis(), Vec2::ZERO);
    }

    #[test]
    fn diagonal_is_not_faster_than_straight() {
        let mut m = movement();
        m.move_up(1.0);
        m.move_right(1.0);
        assert!((m.axis().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn step_moves_and_consumes_inputs() {
        let mut m = movement();
        let mut pos = Vec3::ZERO;
        m.move_right(0.5);
        m.step(&mut pos, 0.1);
        assert!((pos.x - 5.0).abs() < 1e-5);
        assert_eq!(m.right, 0.0);

        m.step(&mut pos, 0.1);
        assert!((pos.x - 5.0).abs() < 1e-5, "no input, no motion");
    }

    #[test]
    fn step_clamps_to_bounds() {
        let mut m = movement();
        let mut pos = Vec3::new(45.0, 0.0, 3.0);
        m.move_right(1.0);
        m.step(&mut pos, 1.0);
        assert_eq!(pos.x, 50.0);
        assert_eq!(pos.z, 3.0, "depth is untouched");
    }

    #[test]
    fn speed_bonus_adds_to_max_speed() {
        let mut m = movement();
        m.speed_bonus = 100.0;
        let mut pos = Vec3::ZERO;
        m.move_up(1.0);
        m.step(&mut pos, 0.1);
        assert!((pos.y - 20.0).abs() < 1e-5);
    }
}
