//! Gameplay tunables, loaded from `settings.ron` at startup.
//!
//! A missing or malformed file is not an error for the player: the game
//! falls back to built-in defaults and logs a warning.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::*;

pub const SETTINGS_PATH: &str = "settings.ron";

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GameSettings {
    pub survival: SurvivalSettings,
    pub hazard: HazardSettings,
    pub world: WorldSettings,
    pub audio: AudioSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurvivalSettings {
    /// Seconds between survival ticks.
    pub tick_interval: f32,
    /// Seconds between held-action resolutions.
    pub action_interval: f32,
    /// Upper bound on a single frame's delta, to bound catch-up.
    pub max_frame_delta: f32,
}

impl Default for SurvivalSettings {
    fn default() -> Self {
        Self {
            tick_interval: 1.2,
            action_interval: 0.6,
            max_frame_delta: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardSettings {
    pub chance_per_tick: f64,
    pub grace_period: f32,
    pub warning_duration: f32,
    pub active_duration: f32,
    pub onset_penalty: f32,
    pub multiplier: f32,
}

impl Default for HazardSettings {
    fn default() -> Self {
        Self {
            chance_per_tick: 0.01,
            grace_period: 60.0,
            warning_duration: 12.0,
            active_duration: 24.0,
            onset_penalty: 5.0,
            multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// Base seed for resource placement. Each zone derives its own layout from it.
    pub seed: u64,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self { seed: 0x00F1_2E5A }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub master_volume: f32,
    pub music_volume: f32,
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            music_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl GameSettings {
    pub fn from_ron(text: &str) -> Result<Self, String> {
        let settings: GameSettings =
            ron::from_str(text).map_err(|e| format!("Failed to parse settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), String> {
        if self.survival.tick_interval <= 0.0 || self.survival.action_interval <= 0.0 {
            return Err("tick intervals must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.hazard.chance_per_tick) {
            return Err(format!(
                "hazard chance {} is not a probability",
                self.hazard.chance_per_tick
            ));
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn read_settings_file(path: &str) -> Result<Option<String>, String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(format!("Failed to read {}: {}", path, e)),
    }
}

#[cfg(target_arch = "wasm32")]
fn read_settings_file(_path: &str) -> Result<Option<String>, String> {
    Ok(None)
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct SettingsPlugin;

impl Plugin for SettingsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameSettings>()
            .add_systems(Startup, load_settings)
            .add_systems(Update, finish_loading.run_if(in_state(GameState::Loading)));
    }
}

fn load_settings(mut settings: ResMut<GameSettings>, mut rng: ResMut<SimRng>) {
    match read_settings_file(SETTINGS_PATH) {
        Ok(Some(text)) => match GameSettings::from_ron(&text) {
            Ok(loaded) => {
                info!("[Settings] Loaded {}", SETTINGS_PATH);
                *settings = loaded;
            }
            Err(e) => warn!("[Settings] {}; using defaults", e),
        },
        Ok(None) => info!("[Settings] No {} found; using defaults", SETTINGS_PATH),
        Err(e) => warn!("[Settings] {}; using defaults", e),
    }
    *rng = SimRng::seeded(settings.world.seed);
}

fn finish_loading(mut next_state: ResMut<NextState<GameState>>) {
    next_state.set(GameState::Playing);
}
