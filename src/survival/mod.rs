//! The survival heartbeat.
//!
//! Every `tick_interval` seconds of unpaused play: hazard roll, fuel burn,
//! regrowth, then body temperature. Several ticks may land in one frame
//! after a hitch; they run in order.

use bevy::prelude::*;
use rand::Rng;

use crate::environment::EnvironmentState;
use crate::hazard::EventManager;
use crate::npcs::dialogue::DialogueState;
use crate::settings::GameSettings;
use crate::shared::*;
use crate::zones::ZoneRegistry;

pub const WARMING_PER_TICK: f32 = 2.0;
pub const FUR_LINING_FACTOR: f32 = 0.8;

#[derive(Resource, Debug, Clone, Default)]
pub struct TickScheduler {
    pub step: FixedStep,
}

/// What one tick did to the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemperatureChange {
    Haven(f32),
    Warmed(f32),
    Exposed { loss: f32, sheltered: bool },
}

/// Everything a survival tick reads or writes.
pub struct TickWorld<'a, R: Rng> {
    pub run: &'a mut RunState,
    pub env: &'a mut EnvironmentState,
    pub hazard: &'a mut EventManager,
    pub zones: &'a ZoneRegistry,
    pub settings: &'a GameSettings,
    pub player_pos: Vec2,
    pub rng: &'a mut R,
}

/// Runs one tick. Returns true if the hazard started its warning this tick.
pub fn process_tick<R: Rng>(world: &mut TickWorld<'_, R>) -> bool {
    world.run.tick_count += 1;

    let warned = world
        .hazard
        .check_trigger(world.run, &world.settings.hazard, &mut *world.rng);

    let multiplier = world.hazard.multiplier(&world.settings.hazard);
    if world.run.in_haven() {
        world.env.pin_fuel_to_max();
    } else {
        world
            .env
            .burn_fuel(world.settings.survival.tick_interval * multiplier);
    }

    world.env.advance_regrowth(&mut *world.rng);

    let change = apply_temperature(world.run, world.env, world.zones, world.player_pos, multiplier);
    debug!(
        "[Survival] Tick #{}: {:?}, body {:.1}",
        world.run.tick_count, change, world.run.body_temperature
    );
    debug_assert!(
        (MIN_BODY_TEMP..=MAX_BODY_TEMP).contains(&world.run.body_temperature),
        "body temperature left its bounds"
    );
    warned
}

/// First matching rule wins: haven, near a lit fire, or exposed.
pub fn apply_temperature(
    run: &mut RunState,
    env: &EnvironmentState,
    zones: &ZoneRegistry,
    player_pos: Vec2,
    multiplier: f32,
) -> TemperatureChange {
    run.is_sheltered = false;
    if run.in_haven() {
        run.apply_temperature_delta(WARMING_PER_TICK);
        return TemperatureChange::Haven(WARMING_PER_TICK);
    }
    if env.is_warmed(player_pos) {
        run.apply_temperature_delta(WARMING_PER_TICK);
        return TemperatureChange::Warmed(WARMING_PER_TICK);
    }

    let Some(zone) = zones.get(run.current_zone_id) else {
        error!("[Survival] Unknown zone {}; skipping decay", run.current_zone_id);
        return TemperatureChange::Exposed {
            loss: 0.0,
            sheltered: false,
        };
    };
    let sheltered = env.is_sheltered(player_pos);
    run.is_sheltered = sheltered;
    let wind = if sheltered { 0.0 } else { zone.wind_chill };
    let mut loss = (zone.decay_rate + wind) * multiplier;
    if run.fur_lining {
        loss *= FUR_LINING_FACTOR;
    }
    run.apply_temperature_delta(-loss);
    TemperatureChange::Exposed { loss, sheltered }
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct SurvivalPlugin;

impl Plugin for SurvivalPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TickScheduler>()
            .add_systems(
                Update,
                (run_survival_ticks, check_player_death)
                    .chain()
                    .in_set(SimSet::Survival),
            )
            .add_systems(OnEnter(GameState::GameOver), announce_death);
    }
}

pub fn run_survival_ticks(
    time: Res<Time>,
    settings: Res<GameSettings>,
    dialogue: Res<DialogueState>,
    shop: Res<ShopState>,
    zones: Res<ZoneRegistry>,
    player: Res<PlayerState>,
    mut scheduler: ResMut<TickScheduler>,
    mut run: ResMut<RunState>,
    mut env: ResMut<EnvironmentState>,
    mut hazard: ResMut<EventManager>,
    mut rng: ResMut<SimRng>,
    mut sfx_writer: EventWriter<PlaySfxEvent>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    if dialogue.is_open() || shop.open || !run.is_alive {
        return;
    }
    let dt = time.delta_secs().min(settings.survival.max_frame_delta);
    let due = scheduler
        .step
        .accumulate(dt, settings.survival.tick_interval);

    for _ in 0..due {
        if !run.is_alive {
            break;
        }
        let mut world = TickWorld {
            run: &mut run,
            env: &mut env,
            hazard: &mut hazard,
            zones: &zones,
            settings: &settings,
            player_pos: player.pos,
            rng: &mut rng.0,
        };
        if process_tick(&mut world) {
            sfx_writer.send(PlaySfxEvent::new("wind"));
            toast_writer.send(ToastEvent::new(
                "THE WIND IS PICKING UP...",
                3.0,
                ToastSeverity::Warning,
            ));
        }
    }
}

/// Ends the run once body temperature has hit zero, from a tick or a
/// Cold Snap onset.
pub fn check_player_death(
    run: Res<RunState>,
    mut died_writer: EventWriter<PlayerDiedEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if run.is_alive {
        return;
    }
    died_writer.send(PlayerDiedEvent {
        tick: run.tick_count,
    });
    next_state.set(GameState::GameOver);
}

fn announce_death(run: Res<RunState>, mut toast_writer: EventWriter<ToastEvent>) {
    info!(
        "[Survival] Player froze at tick {} in zone {}",
        run.tick_count, run.current_zone_id
    );
    toast_writer.send(ToastEvent::new(
        "YOU FROZE. PRESS N FOR A NEW GAME",
        10.0,
        ToastSeverity::Danger,
    ));
}
