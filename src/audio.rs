//! Ship sound cues.
//!
//! Handles are resolved once at startup from [`ShipConfig::sounds`].  A cue
//! without a configured path stays `None` and [`play_cue`] skips it.

use crate::config::ShipConfig;
use bevy::prelude::*;

/// Audio handles for the four ship cues.
#[derive(Resource, Default, Clone)]
pub struct ShipSounds {
    pub fire: Option<Handle<AudioSource>>,
    pub explosion: Option<Handle<AudioSource>>,
    pub shift_power_up: Option<Handle<AudioSource>>,
    pub activate_power_up: Option<Handle<AudioSource>>,
}

/// Marker on one-shot sound entities spawned by [`play_cue`].
#[derive(Component)]
pub struct SoundCue;

/// Startup system: resolve the configured sound paths through the asset server.
pub fn load_ship_sounds(
    mut sounds: ResMut<ShipSounds>,
    asset_server: Res<AssetServer>,
    config: Res<ShipConfig>,
) {
    let load = |path: &Option<String>| path.as_ref().map(|p| asset_server.load(p.clone()));
    *sounds = ShipSounds {
        fire: load(&config.sounds.fire),
        explosion: load(&config.sounds.explosion),
        shift_power_up: load(&config.sounds.shift_power_up),
        activate_power_up: load(&config.sounds.activate_power_up),
    };
}

/// Spawn a self-despawning audio player for `cue`.  Returns `false` when no
/// cue is configured.
pub fn play_cue(commands: &mut Commands, cue: Option<&Handle<AudioSource>>) -> bool {
    let Some(handle) = cue else {
        return false;
    };
    commands.spawn((
        AudioPlayer::new(handle.clone()),
        PlaybackSettings::DESPAWN,
        SoundCue,
    ));
    true
}
