use bevy::audio::Volume;
use bevy::prelude::*;

use crate::settings::GameSettings;
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// SFX PATH MAPPING
// ═══════════════════════════════════════════════════════════════════════

/// Maps SFX IDs (sent by other domains) to audio file paths.
fn sfx_path(sfx_id: &str) -> Option<&'static str> {
    match sfx_id {
        "chop" => Some("audio/sfx/chop.ogg"),
        "ignite" => Some("audio/sfx/ignite.ogg"),
        "swap" => Some("audio/sfx/swap.ogg"),
        "wind" => Some("audio/sfx/wind.ogg"),
        "ice_crack" => Some("audio/sfx/ice_crack.ogg"),
        "beacon" => Some("audio/sfx/beacon.ogg"),
        _ => None,
    }
}

/// Final playback volume, or `None` when muted.
fn sfx_volume(settings: &GameSettings) -> Option<f32> {
    let audio = &settings.audio;
    if audio.muted {
        return None;
    }
    let volume = (audio.master_volume * audio.sfx_volume).clamp(0.0, 1.0);
    (volume > 0.0).then_some(volume)
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// Listen for PlaySfxEvent and spawn one-shot audio sources that auto-despawn.
pub fn handle_play_sfx(
    mut events: EventReader<PlaySfxEvent>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<GameSettings>,
) {
    let volume = sfx_volume(&settings);
    for event in events.read() {
        let Some(volume) = volume else {
            continue;
        };
        match sfx_path(&event.sfx_id) {
            Some(path) => {
                commands.spawn((
                    AudioPlayer::new(asset_server.load(path)),
                    PlaybackSettings::DESPAWN.with_volume(Volume::new(volume)),
                ));
            }
            None => debug!("[Audio] No sound for '{}'", event.sfx_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_game_sound_has_a_file() {
        for id in ["chop", "ignite", "swap", "wind", "ice_crack", "beacon"] {
            assert!(sfx_path(id).is_some(), "{id}");
        }
        assert!(sfx_path("fanfare").is_none());
    }

    #[test]
    fn muted_or_silent_settings_skip_playback() {
        let mut settings = GameSettings::default();
        assert_eq!(sfx_volume(&settings), Some(1.0));
        settings.audio.master_volume = 0.5;
        settings.audio.sfx_volume = 0.5;
        assert_eq!(sfx_volume(&settings), Some(0.25));
        settings.audio.sfx_volume = 0.0;
        assert_eq!(sfx_volume(&settings), None);
        settings.audio.sfx_volume = 1.0;
        settings.audio.muted = true;
        assert_eq!(sfx_volume(&settings), None);
    }
}
