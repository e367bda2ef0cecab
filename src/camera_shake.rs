//! Trauma-style camera shake.
//!
//! The camera carries a [`CameraShake`] component.  Starting a shake sets its
//! duration and amplitude; [`camera_shake_system`] removes last frame's offset,
//! decays the shake and applies a fresh random offset scaled by the square of
//! the remaining intensity.

use crate::config::CameraShakeSpec;
use bevy::prelude::*;
use rand::Rng;

#[derive(Component, Debug, Default, Clone)]
pub struct CameraShake {
    /// Seconds left in the current shake.
    pub remaining: f32,
    pub duration: f32,
    pub amplitude: f32,
    /// Offset currently applied to the camera translation.
    pub offset: Vec2,
}

impl CameraShake {
    /// Begin a shake.  A weaker request never cuts a stronger one short.
    pub fn start(&mut self, spec: &CameraShakeSpec) {
        if spec.duration <= 0.0 {
            return;
        }
        if self.intensity() * self.amplitude > spec.amplitude {
            return;
        }
        self.remaining = spec.duration;
        self.duration = spec.duration;
        self.amplitude = spec.amplitude;
    }

    /// 1.0 at the start of a shake, 0.0 when idle.
    pub fn intensity(&self) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (self.remaining / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }
}

/// Start `spec` on every shake-capable camera.  Returns `false` when no shake
/// is configured.
pub fn start_camera_shake(
    cameras: &mut Query<&mut CameraShake>,
    spec: Option<&CameraShakeSpec>,
) -> bool {
    let Some(spec) = spec else {
        return false;
    };
    for mut shake in cameras.iter_mut() {
        shake.start(spec);
    }
    true
}

pub fn camera_shake_system(mut query: Query<(&mut Transform, &mut CameraShake)>, time: Res<Time>) {
    let dt = time.delta_secs();
    let mut rng = rand::thread_rng();
    for (mut transform, mut shake) in query.iter_mut() {
        transform.translation.x -= shake.offset.x;
        transform.translation.y -= shake.offset.y;
        shake.offset = Vec2::ZERO;

        if !shake.is_active() {
            continue;
        }
        shake.remaining = (shake.remaining - dt).max(0.0);

        let strength = shake.amplitude * shake.intensity().powi(2);
        let offset = Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0)) * strength;
        transform.translation.x += offset.x;
        transform.translation.y += offset.y;
        shake.offset = offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_sets_full_intensity() {
        let mut shake = CameraShake::default();
        shake.start(&CameraShakeSpec {
            duration: 0.5,
            amplitude: 10.0,
        });
        assert!(shake.is_active());
        assert_eq!(shake.intensity(), 1.0);
    }

    #[test]
    fn weaker_shake_does_not_override_stronger() {
        let mut shake = CameraShake::default();
        shake.start(&CameraShakeSpec {
            duration: 1.0,
            amplitude: 20.0,
        });
        shake.start(&CameraShakeSpec {
            duration: 0.2,
            amplitude: 2.0,
        });
        assert_eq!(shake.amplitude, 20.0);
        assert_eq!(shake.duration, 1.0);
    }

    #[test]
    fn offset_is_removed_once_shake_ends() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_systems(Update, camera_shake_system);
        let camera = app
            .world_mut()
            .spawn((
                Transform::from_xyz(5.0, 5.0, 0.0),
                CameraShake {
                    remaining: 0.0,
                    duration: 1.0,
                    amplitude: 10.0,
                    offset: Vec2::new(2.0, -1.0),
                },
            ))
            .id();

        app.update();

        let transform = app.world().get::<Transform>(camera).unwrap();
        assert_eq!(transform.translation.truncate(), Vec2::new(3.0, 6.0));
        assert_eq!(app.world().get::<CameraShake>(camera).unwrap().offset, Vec2::ZERO);
    }
}
