use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

use crate::environment::EnvironmentState;
use crate::hazard::{EventManager, RedemptionSequence};
use crate::interaction::ActionTicker;
use crate::npcs::dialogue::DialogueState;
use crate::npcs::NpcRoster;
use crate::shared::*;
use crate::survival::TickScheduler;
use crate::zones::ZoneRegistry;

// ═══════════════════════════════════════════════════════════════════════
// PUBLIC TYPES
// ═══════════════════════════════════════════════════════════════════════

pub const SAVE_VERSION: u32 = 1;
pub const SAVE_FILE_NAME: &str = "fire_watchers.json";
#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "fire_watchers_save";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HubSave {
    pub fire_fuel: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSave {
    pub pos_x: f32,
    pub pos_y: f32,
}

impl Default for PlayerSave {
    fn default() -> Self {
        Self {
            pos_x: PLAYER_SPAWN.x,
            pos_y: PLAYER_SPAWN.y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WorldSave {
    pub stabilized_zones: Vec<ZoneId>,
}

/// On-disk layout. Every section falls back to defaults when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveFile {
    pub version: u32,
    pub run_state: RunState,
    pub zone_2_hub: HubSave,
    pub player: PlayerSave,
    pub world: WorldSave,
}

impl Default for SaveFile {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            run_state: RunState::default(),
            zone_2_hub: HubSave::default(),
            player: PlayerSave::default(),
            world: WorldSave::default(),
        }
    }
}

impl SaveFile {
    /// Snapshot of the live run. While the player is in the Wind Gap the hub
    /// fuel comes from the burning fire rather than the last exit.
    pub fn capture(
        run: &RunState,
        player: &PlayerState,
        zones: &ZoneRegistry,
        env: &EnvironmentState,
    ) -> Self {
        let mut run_state = run.clone();
        if run.current_zone_id == WIND_GAP {
            if let Some(fire) = env.linked_fire() {
                run_state.zone2_hub_fire_fuel = fire.fuel;
            }
        }
        Self {
            version: SAVE_VERSION,
            zone_2_hub: HubSave {
                fire_fuel: run_state.zone2_hub_fire_fuel,
            },
            run_state,
            player: PlayerSave {
                pos_x: player.pos.x,
                pos_y: player.pos.y,
            },
            world: WorldSave {
                stabilized_zones: zones.stabilized_zones(),
            },
        }
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("Serialization failed: {}", e))
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        let file: SaveFile =
            serde_json::from_str(json).map_err(|e| format!("Deserialization failed: {}", e))?;
        if file.version != SAVE_VERSION {
            warn!(
                "[Save] File has version {} but current version is {}. Attempting to load anyway.",
                file.version, SAVE_VERSION
            );
        }
        Ok(file)
    }

    fn zone_is_known(&self) -> bool {
        self.run_state.current_zone_id <= BUILDERS_RIDGE
    }

    /// The run record with the hub section folded back in. Out-of-range
    /// values from a hand-edited file are pulled back into bounds.
    pub fn restored_run(&self) -> RunState {
        let mut run = self.run_state.clone();
        run.zone2_hub_fire_fuel = self.zone_2_hub.fire_fuel;
        run.body_temperature = run.body_temperature.clamp(MIN_BODY_TEMP, MAX_BODY_TEMP);
        if !self.zone_is_known() {
            warn!(
                "[Save] Unknown zone {} in save; starting from the homestead",
                run.current_zone_id
            );
            run.current_zone_id = HOMESTEAD;
        }
        run
    }

    /// Falls back to the spawn point when the saved zone is unknown.
    pub fn player_pos(&self) -> Vec2 {
        if !self.zone_is_known() {
            return PLAYER_SPAWN;
        }
        Vec2::new(self.player.pos_x, self.player.pos_y)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone)]
pub struct SaveRequestEvent;

#[derive(Event, Debug, Clone)]
pub struct LoadRequestEvent;

/// Resets the whole run to a fresh start.
#[derive(Event, Debug, Clone)]
pub struct NewGameEvent;

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SaveRequestEvent>()
            .add_event::<LoadRequestEvent>()
            .add_event::<NewGameEvent>()
            .add_systems(
                Update,
                (
                    save_keybinds,
                    handle_save_request.run_if(
                        in_state(GameState::Playing).or(in_state(GameState::Paused)),
                    ),
                    handle_load_request,
                    handle_new_game,
                )
                    .chain()
                    .run_if(not(in_state(GameState::Loading))),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// STORAGE
// ═══════════════════════════════════════════════════════════════════════

#[cfg(not(target_arch = "wasm32"))]
fn save_path() -> PathBuf {
    PathBuf::from("saves").join(SAVE_FILE_NAME)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn write_save(file: &SaveFile) -> Result<(), String> {
    let json = file.to_json()?;
    let path = save_path();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| format!("Could not create saves directory: {}", e))?;
    }
    // Write to a temp file first, then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &json)
        .map_err(|e| format!("Write failed for {}: {}", tmp_path.display(), e))?;
    fs::rename(&tmp_path, &path).map_err(|e| format!("Rename failed: {}", e))?;
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn read_save() -> Result<SaveFile, String> {
    let path = save_path();
    if !path.exists() {
        return Err("No save file found".to_string());
    }
    let json = fs::read_to_string(&path)
        .map_err(|e| format!("Read failed for {}: {}", path.display(), e))?;
    SaveFile::from_json(&json)
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, String> {
    web_sys::window()
        .ok_or_else(|| "No browser window".to_string())?
        .local_storage()
        .map_err(|_| "localStorage is not accessible".to_string())?
        .ok_or_else(|| "localStorage is not available".to_string())
}

#[cfg(target_arch = "wasm32")]
pub fn write_save(file: &SaveFile) -> Result<(), String> {
    let json = file.to_json()?;
    local_storage()?
        .set_item(STORAGE_KEY, &json)
        .map_err(|_| "localStorage write failed".to_string())
}

#[cfg(target_arch = "wasm32")]
pub fn read_save() -> Result<SaveFile, String> {
    let json = local_storage()?
        .get_item(STORAGE_KEY)
        .map_err(|_| "localStorage read failed".to_string())?
        .ok_or_else(|| "No save file found".to_string())?;
    SaveFile::from_json(&json)
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// Everything a load or a new game replaces wholesale.
#[derive(SystemParam)]
pub struct RunSession<'w> {
    pub run: ResMut<'w, RunState>,
    pub player: ResMut<'w, PlayerState>,
    pub zones: ResMut<'w, ZoneRegistry>,
    pub env: ResMut<'w, EnvironmentState>,
    pub roster: ResMut<'w, NpcRoster>,
    pub hazard: ResMut<'w, EventManager>,
    pub redemption: ResMut<'w, RedemptionSequence>,
    pub dialogue: ResMut<'w, DialogueState>,
    pub shop: ResMut<'w, ShopState>,
    pub scheduler: ResMut<'w, TickScheduler>,
    pub ticker: ResMut<'w, ActionTicker>,
}

impl RunSession<'_> {
    /// Installs `run` and clears all transient state. The environment is
    /// marked unloaded so the zone loader rebuilds it on the next frame.
    fn install(&mut self, run: RunState, player_pos: Vec2, stabilized: &[ZoneId]) {
        *self.run = run;
        *self.player = PlayerState {
            pos: player_pos,
            ..Default::default()
        };
        self.zones.load_stabilized(stabilized);
        *self.env = EnvironmentState::default();
        self.roster.clear();
        self.hazard.reset();
        *self.redemption = RedemptionSequence::default();
        self.dialogue.close();
        self.shop.open = false;
        self.scheduler.step.reset();
        self.ticker.step.reset();
    }
}

/// F5 = save, F9 = load, N = new game (from the pause and end screens).
fn save_keybinds(
    input: Res<PlayerInput>,
    mut save_writer: EventWriter<SaveRequestEvent>,
    mut load_writer: EventWriter<LoadRequestEvent>,
    mut new_game_writer: EventWriter<NewGameEvent>,
) {
    if input.quicksave {
        save_writer.send(SaveRequestEvent);
    }
    if input.quickload {
        load_writer.send(LoadRequestEvent);
    }
    if input.new_game {
        new_game_writer.send(NewGameEvent);
    }
}

fn handle_save_request(
    mut events: EventReader<SaveRequestEvent>,
    run: Res<RunState>,
    player: Res<PlayerState>,
    zones: Res<ZoneRegistry>,
    env: Res<EnvironmentState>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    if events.read().count() == 0 {
        return;
    }
    let file = SaveFile::capture(&run, &player, &zones, &env);
    match write_save(&file) {
        Ok(()) => {
            info!("[Save] Saved at tick {}", run.tick_count);
            toast_writer.send(ToastEvent::new("GAME SAVED", 2.0, ToastSeverity::Success));
        }
        Err(e) => {
            warn!("[Save] Save FAILED: {}", e);
            toast_writer.send(ToastEvent::new(
                format!("SAVE FAILED: {}", e),
                3.0,
                ToastSeverity::Danger,
            ));
        }
    }
}

fn handle_load_request(
    mut events: EventReader<LoadRequestEvent>,
    mut session: RunSession,
    mut next_state: ResMut<NextState<GameState>>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    if events.read().count() == 0 {
        return;
    }
    match read_save() {
        Ok(file) => {
            let run = file.restored_run();
            info!(
                "[Save] Loaded zone {} at tick {}",
                run.current_zone_id, run.tick_count
            );
            session.install(run, file.player_pos(), &file.world.stabilized_zones);
            next_state.set(GameState::Playing);
            toast_writer.send(ToastEvent::new("GAME LOADED", 2.0, ToastSeverity::Success));
        }
        Err(e) => {
            warn!("[Save] Load FAILED: {}", e);
            toast_writer.send(ToastEvent::new(
                format!("LOAD FAILED: {}", e),
                3.0,
                ToastSeverity::Danger,
            ));
        }
    }
}

fn handle_new_game(
    mut events: EventReader<NewGameEvent>,
    mut session: RunSession,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if events.read().count() == 0 {
        return;
    }
    session.install(RunState::default(), PLAYER_SPAWN, &[]);
    next_state.set(GameState::Playing);
    info!("[Save] New game started");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{Campfire, ConstructionSite};

    #[test]
    fn round_trip_preserves_run() {
        let mut run = RunState {
            current_zone_id: QUIET_WOODS,
            body_temperature: 21.5,
            log_stash: 12,
            zone1_stabilized: true,
            logs_deposited_zone1: 20,
            deep_pockets: true,
            ..Default::default()
        };
        run.inventory.logs = 4;
        run.shack_progress.add_log();
        let player = PlayerState {
            pos: Vec2::new(123.0, 456.0),
            ..Default::default()
        };
        let mut zones = ZoneRegistry::default();
        zones.stabilize(QUIET_WOODS);

        let file = SaveFile::capture(&run, &player, &zones, &EnvironmentState::default());
        let json = file.to_json().unwrap();
        let back = SaveFile::from_json(&json).unwrap();
        assert_eq!(back, file);
        assert_eq!(back.restored_run(), run);
        assert_eq!(back.player_pos(), Vec2::new(123.0, 456.0));
        assert_eq!(back.world.stabilized_zones, vec![HOMESTEAD, QUIET_WOODS]);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let json = r#"{ "version": 1, "run_state": { "log_stash": 9 } }"#;
        let file = SaveFile::from_json(json).unwrap();
        let run = file.restored_run();
        assert_eq!(run.log_stash, 9);
        assert!((run.body_temperature - MAX_BODY_TEMP).abs() < f32::EPSILON);
        assert!(run.is_alive);
        assert_eq!(run.builder_location, QUIET_WOODS);
        assert_eq!(file.player_pos(), PLAYER_SPAWN);
    }

    #[test]
    fn version_mismatch_still_loads() {
        let json = r#"{ "version": 99, "run_state": { "tick_count": 5 } }"#;
        let file = SaveFile::from_json(json).unwrap();
        assert_eq!(file.run_state.tick_count, 5);
    }

    #[test]
    fn out_of_range_values_are_pulled_back() {
        let json = r#"{
            "version": 1,
            "run_state": { "body_temperature": 500.0, "current_zone_id": 9 },
            "player": { "pos_x": 40.0, "pos_y": 50.0 }
        }"#;
        let file = SaveFile::from_json(json).unwrap();
        let run = file.restored_run();
        assert!((run.body_temperature - MAX_BODY_TEMP).abs() < f32::EPSILON);
        assert_eq!(run.current_zone_id, HOMESTEAD);
        assert_eq!(file.player_pos(), PLAYER_SPAWN);

        let json = r#"{ "version": 1, "run_state": { "body_temperature": -90.0 } }"#;
        let run = SaveFile::from_json(json).unwrap().restored_run();
        assert!((run.body_temperature - MIN_BODY_TEMP).abs() < f32::EPSILON);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        assert!(SaveFile::from_json("{ not json").is_err());
    }

    #[test]
    fn capture_in_wind_gap_reads_live_hub() {
        let run = RunState {
            current_zone_id: WIND_GAP,
            zone2_hub_fire_fuel: 10.0,
            ..Default::default()
        };
        let mut env = EnvironmentState::default();
        env.campfires.push(Campfire {
            fuel: 64.0,
            ..Campfire::new(Vec2::new(640.0, 360.0))
        });
        env.construction_site = Some(ConstructionSite {
            pos: Vec2::new(640.0, 240.0),
            linked_fire: Some(0),
        });
        let file = SaveFile::capture(&run, &PlayerState::default(), &ZoneRegistry::default(), &env);
        assert!((file.zone_2_hub.fire_fuel - 64.0).abs() < f32::EPSILON);
    }
}
