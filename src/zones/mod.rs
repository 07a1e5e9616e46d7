//! Zone table, stabilized-zone bookkeeping and zone loading.

use std::collections::BTreeSet;

use bevy::prelude::*;

use crate::environment::placement::load_zone;
use crate::environment::EnvironmentState;
use crate::hazard::EventManager;
use crate::npcs::NpcRoster;
use crate::settings::GameSettings;
use crate::shared::*;

pub mod transitions;

// ═══════════════════════════════════════════════════════════════════════
// ZONE DATA
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneGoal {
    Tutorial,
    Stabilize { deposits: u32 },
    BuildShelter { deposits: u32 },
    LightBeacon { deposits: u32 },
}

/// Immutable per-zone parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneData {
    pub id: ZoneId,
    pub name: &'static str,
    /// Degrees lost per tick while exposed.
    pub decay_rate: f32,
    /// Extra degrees lost per tick unless sheltered behind a wind break.
    pub wind_chill: f32,
    /// Minimum tree count after placement.
    pub resource_count: usize,
    pub goal: ZoneGoal,
}

const ZONE_TABLE: [ZoneData; 4] = [
    ZoneData {
        id: HOMESTEAD,
        name: "The Homestead",
        decay_rate: 0.0,
        wind_chill: 0.0,
        resource_count: 5,
        goal: ZoneGoal::Tutorial,
    },
    ZoneData {
        id: QUIET_WOODS,
        name: "The Quiet Woods",
        decay_rate: 1.0,
        wind_chill: 0.0,
        resource_count: 15,
        goal: ZoneGoal::Stabilize {
            deposits: ZONE1_STABILIZE_DEPOSITS,
        },
    },
    ZoneData {
        id: WIND_GAP,
        name: "The Wind Gap",
        decay_rate: 3.0,
        wind_chill: 1.0,
        resource_count: 5,
        goal: ZoneGoal::BuildShelter {
            deposits: ZONE2_REDEMPTION_DEPOSITS,
        },
    },
    ZoneData {
        id: BUILDERS_RIDGE,
        name: "Builder's Ridge",
        decay_rate: 2.0,
        wind_chill: 1.0,
        resource_count: 10,
        goal: ZoneGoal::LightBeacon {
            deposits: ZONE3_BEACON_DEPOSITS,
        },
    },
];

/// Zone lookup plus the set of zones the player has made permanent havens.
#[derive(Resource, Debug, Clone)]
pub struct ZoneRegistry {
    zones: Vec<ZoneData>,
    stabilized: BTreeSet<ZoneId>,
}

impl Default for ZoneRegistry {
    fn default() -> Self {
        let mut stabilized = BTreeSet::new();
        stabilized.insert(HOMESTEAD);
        Self {
            zones: ZONE_TABLE.to_vec(),
            stabilized,
        }
    }
}

impl ZoneRegistry {
    pub fn get(&self, id: ZoneId) -> Option<&ZoneData> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn is_stabilized(&self, id: ZoneId) -> bool {
        self.stabilized.contains(&id)
    }

    /// Returns true if the zone was newly added.
    pub fn stabilize(&mut self, id: ZoneId) -> bool {
        self.stabilized.insert(id)
    }

    pub fn stabilized_zones(&self) -> Vec<ZoneId> {
        self.stabilized.iter().copied().collect()
    }

    /// Replaces the stabilized set from a save. The homestead is always safe.
    pub fn load_stabilized(&mut self, ids: &[ZoneId]) {
        self.stabilized = ids.iter().copied().filter(|id| self.get(*id).is_some()).collect();
        self.stabilized.insert(HOMESTEAD);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ═══════════════════════════════════════════════════════════════════════
// WEATHER
// ═══════════════════════════════════════════════════════════════════════

/// Snowfall parameters for the presentation layer.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct WeatherPreset {
    pub drift_x: f32,
    pub fall_speed: f32,
    pub spawn_rate: u32,
}

impl Default for WeatherPreset {
    fn default() -> Self {
        Self::for_zone(HOMESTEAD)
    }
}

impl WeatherPreset {
    pub fn for_zone(zone: ZoneId) -> Self {
        match zone {
            WIND_GAP => Self {
                drift_x: -3.0,
                fall_speed: 4.0,
                spawn_rate: 6,
            },
            _ => Self {
                drift_x: 0.0,
                fall_speed: 2.0,
                spawn_rate: 3,
            },
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ZONE LOADING
// ═══════════════════════════════════════════════════════════════════════

/// Everything a zone (re)load touches.
pub struct ZoneLoad<'a> {
    pub run: &'a mut RunState,
    pub env: &'a mut EnvironmentState,
    pub zones: &'a ZoneRegistry,
    pub hazard: &'a mut EventManager,
    pub roster: &'a mut NpcRoster,
    pub weather: &'a mut WeatherPreset,
    pub settings: &'a GameSettings,
    pub rng: &'a mut SimRng,
}

/// Rebuilds the current zone from scratch: environment, haven fixtures,
/// weather, NPCs and the Wind Gap hub fire. Returns false for an unknown zone.
pub fn rebuild_current_zone(load: ZoneLoad<'_>, safe_pos: Vec2) -> bool {
    let zone_id = load.run.current_zone_id;
    let Some(zone) = load.zones.get(zone_id) else {
        error!("[Zones] Cannot load unknown zone {}", zone_id);
        return false;
    };

    load.hazard.reset();
    *load.env = load_zone(zone, safe_pos, load.settings.world.seed);

    if zone_id == QUIET_WOODS && load.run.zone1_stabilized {
        load.env.setup_haven();
    }

    *load.weather = WeatherPreset::for_zone(zone_id);
    load.roster.respawn_for_zone(zone_id, load.run, &mut load.rng.0);

    if zone_id == WIND_GAP {
        let fuel = load.run.zone2_hub_fire_fuel;
        if let Some(fire) = load.env.linked_fire_mut() {
            fire.fuel = fuel.clamp(0.0, fire.max_fuel);
        }
    }

    info!(
        "[Zones] Loaded zone {} ({}): {} trees, {} fires",
        zone.id,
        zone.name,
        load.env.trees.len(),
        load.env.campfires.len()
    );
    true
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct ZonePlugin;

impl Plugin for ZonePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ZoneRegistry>()
            .init_resource::<WeatherPreset>()
            .add_systems(OnEnter(GameState::Playing), ensure_zone_loaded)
            .add_systems(
                Update,
                (handle_zone_stabilized, handle_beacon_lit).in_set(SimSet::World),
            )
            .add_systems(
                Update,
                (transitions::check_zone_transition, ensure_zone_loaded)
                    .chain()
                    .in_set(SimSet::Transition),
            );
    }
}

/// Builds the environment whenever it does not match the current zone
/// (fresh boot, a load, a new game) without disturbing a zone that is live.
pub fn ensure_zone_loaded(
    mut run: ResMut<RunState>,
    mut env: ResMut<EnvironmentState>,
    zones: Res<ZoneRegistry>,
    mut hazard: ResMut<EventManager>,
    mut roster: ResMut<NpcRoster>,
    mut weather: ResMut<WeatherPreset>,
    settings: Res<GameSettings>,
    mut rng: ResMut<SimRng>,
    player: Res<PlayerState>,
) {
    if env.zone == Some(run.current_zone_id) {
        return;
    }
    rebuild_current_zone(
        ZoneLoad {
            run: &mut run,
            env: &mut env,
            zones: &zones,
            hazard: &mut hazard,
            roster: &mut roster,
            weather: &mut weather,
            settings: &settings,
            rng: &mut rng,
        },
        player.pos,
    );
}

/// Registers stabilized zones and turns the Quiet Woods into a haven the
/// moment its quota is met.
pub fn handle_zone_stabilized(
    mut events: EventReader<ZoneStabilizedEvent>,
    mut zones: ResMut<ZoneRegistry>,
    mut run: ResMut<RunState>,
    mut env: ResMut<EnvironmentState>,
    mut roster: ResMut<NpcRoster>,
    mut rng: ResMut<SimRng>,
    mut toast_writer: EventWriter<ToastEvent>,
    mut sfx_writer: EventWriter<PlaySfxEvent>,
) {
    for ev in events.read() {
        if !zones.stabilize(ev.zone) {
            continue;
        }
        info!("[Zones] Zone {} stabilized", ev.zone);
        sfx_writer.send(PlaySfxEvent::new("ice_crack"));

        match ev.zone {
            QUIET_WOODS => {
                if run.current_zone_id == QUIET_WOODS {
                    env.setup_haven();
                    roster.respawn_for_zone(QUIET_WOODS, &run, &mut rng.0);
                }
                if run.builder_location == QUIET_WOODS {
                    run.builder_location = WIND_GAP;
                    info!("[Zones] Builder moved on to the Wind Gap");
                }
                toast_writer.send(ToastEvent::new(
                    "ZONE 1 STABILIZED - PATH TO THE WIND GAP OPEN",
                    5.0,
                    ToastSeverity::Success,
                ));
            }
            WIND_GAP => {
                toast_writer.send(ToastEvent::new(
                    "THE WIND GAP IS STABILIZED",
                    4.0,
                    ToastSeverity::Success,
                ));
            }
            _ => {}
        }
    }
}

/// The lit beacon ends the run in victory.
pub fn handle_beacon_lit(
    mut events: EventReader<BeaconLitEvent>,
    mut zones: ResMut<ZoneRegistry>,
    run: Res<RunState>,
    mut next_state: ResMut<NextState<GameState>>,
    mut toast_writer: EventWriter<ToastEvent>,
    mut sfx_writer: EventWriter<PlaySfxEvent>,
) {
    if events.read().count() == 0 {
        return;
    }
    zones.stabilize(BUILDERS_RIDGE);
    info!(
        "[Zones] Beacon lit at tick {} with {} logs gathered",
        run.tick_count, run.total_logs_gathered
    );
    sfx_writer.send(PlaySfxEvent::new("beacon"));
    toast_writer.send(ToastEvent::new(
        "THE BEACON BURNS. THE VALLEY WILL SEE IT.",
        6.0,
        ToastSeverity::Success,
    ));
    next_state.set(GameState::Victory);
}
