//! Cold Snap hazard cycle: Idle → Warning → Active → Idle.
//!
//! Eligibility is rolled once per survival tick; the countdowns run on
//! frame time. The Redemption cutscene lives in [`redemption`].

use bevy::prelude::*;
use rand::Rng;

use crate::settings::{GameSettings, HazardSettings};
use crate::shared::*;

pub mod redemption;

pub use redemption::{RedemptionSequence, RedemptionStage};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum HazardPhase {
    #[default]
    Idle,
    Warning {
        remaining: f32,
    },
    Active {
        remaining: f32,
    },
}

/// What a frame update changed, for the caller to announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardUpdate {
    Unchanged,
    ColdSnapStarted { killed: bool },
    ColdSnapEnded,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct EventManager {
    pub phase: HazardPhase,
}

impl EventManager {
    pub fn is_cold_snap_active(&self) -> bool {
        matches!(self.phase, HazardPhase::Active { .. })
    }

    /// Decay and fuel-burn multiplier for the current phase.
    pub fn multiplier(&self, cfg: &HazardSettings) -> f32 {
        if self.is_cold_snap_active() {
            cfg.multiplier
        } else {
            1.0
        }
    }

    /// Once-per-tick roll. Returns true if a warning has just begun.
    pub fn check_trigger(&mut self, run: &RunState, cfg: &HazardSettings, rng: &mut impl Rng) -> bool {
        if self.phase != HazardPhase::Idle {
            return false;
        }
        if run.current_zone_id == HOMESTEAD || run.time_in_current_zone < cfg.grace_period {
            return false;
        }
        if !rng.gen_bool(cfg.chance_per_tick) {
            return false;
        }
        self.phase = HazardPhase::Warning {
            remaining: cfg.warning_duration,
        };
        info!("[Hazard] Cold Snap warning ({:.0}s)", cfg.warning_duration);
        true
    }

    /// Frame update: grace-period clock and both countdowns.
    pub fn update(&mut self, dt: f32, run: &mut RunState, cfg: &HazardSettings) -> HazardUpdate {
        run.time_in_current_zone += dt;

        match self.phase {
            HazardPhase::Idle => HazardUpdate::Unchanged,
            HazardPhase::Warning { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.phase = HazardPhase::Warning { remaining };
                    return HazardUpdate::Unchanged;
                }
                self.phase = HazardPhase::Active {
                    remaining: cfg.active_duration,
                };
                let killed = run.apply_temperature_delta(-cfg.onset_penalty);
                info!(
                    "[Hazard] Cold Snap! -{:.1} to {:.1}",
                    cfg.onset_penalty, run.body_temperature
                );
                HazardUpdate::ColdSnapStarted { killed }
            }
            HazardPhase::Active { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.phase = HazardPhase::Active { remaining };
                    return HazardUpdate::Unchanged;
                }
                self.phase = HazardPhase::Idle;
                info!("[Hazard] Cold Snap has passed");
                HazardUpdate::ColdSnapEnded
            }
        }
    }

    pub fn reset(&mut self) {
        self.phase = HazardPhase::Idle;
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct HazardPlugin;

impl Plugin for HazardPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EventManager>()
            .init_resource::<RedemptionSequence>()
            .add_systems(
                Update,
                (
                    update_hazard,
                    redemption::start_redemption,
                    redemption::drive_redemption,
                )
                    .chain()
                    .in_set(SimSet::Hazard),
            );
    }
}

/// Advances the hazard countdowns while the world is not paused for dialogue.
pub fn update_hazard(
    time: Res<Time>,
    settings: Res<GameSettings>,
    dialogue: Res<crate::npcs::dialogue::DialogueState>,
    shop: Res<ShopState>,
    mut hazard: ResMut<EventManager>,
    mut run: ResMut<RunState>,
    mut cold_snap_writer: EventWriter<ColdSnapEvent>,
    mut toast_writer: EventWriter<ToastEvent>,
    mut sfx_writer: EventWriter<PlaySfxEvent>,
    mut died_writer: EventWriter<PlayerDiedEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if dialogue.is_open() || shop.open || !run.is_alive {
        return;
    }
    let dt = time.delta_secs().min(settings.survival.max_frame_delta);

    match hazard.update(dt, &mut run, &settings.hazard) {
        HazardUpdate::ColdSnapStarted { killed } => {
            cold_snap_writer.send(ColdSnapEvent);
            sfx_writer.send(PlaySfxEvent::new("wind"));
            toast_writer.send(ToastEvent::new("COLD SNAP!", 3.0, ToastSeverity::Danger));
            // The survival death check has already run this frame.
            if killed {
                died_writer.send(PlayerDiedEvent {
                    tick: run.tick_count,
                });
                next_state.set(GameState::GameOver);
            }
        }
        HazardUpdate::ColdSnapEnded => {
            toast_writer.send(ToastEvent::new("THE COLD SNAP PASSES", 3.0, ToastSeverity::Info));
        }
        HazardUpdate::Unchanged => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn certain() -> HazardSettings {
        HazardSettings {
            chance_per_tick: 1.0,
            ..Default::default()
        }
    }

    fn run_in(zone: ZoneId, time_in_zone: f32) -> RunState {
        RunState {
            current_zone_id: zone,
            time_in_current_zone: time_in_zone,
            ..Default::default()
        }
    }

    #[test]
    fn no_trigger_in_homestead_or_grace_period() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut hazard = EventManager::default();
        assert!(!hazard.check_trigger(&run_in(HOMESTEAD, 500.0), &certain(), &mut rng));
        assert!(!hazard.check_trigger(&run_in(WIND_GAP, 59.9), &certain(), &mut rng));
        assert!(hazard.check_trigger(&run_in(WIND_GAP, 60.0), &certain(), &mut rng));
        assert!(
            !hazard.check_trigger(&run_in(WIND_GAP, 60.0), &certain(), &mut rng),
            "no new roll while a warning is pending"
        );
    }

    #[test]
    fn zero_chance_never_triggers() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut hazard = EventManager::default();
        let cfg = HazardSettings {
            chance_per_tick: 0.0,
            ..Default::default()
        };
        for _ in 0..1000 {
            assert!(!hazard.check_trigger(&run_in(QUIET_WOODS, 100.0), &cfg, &mut rng));
        }
    }

    #[test]
    fn warning_becomes_active_then_idle() {
        let cfg = HazardSettings::default();
        let mut run = run_in(QUIET_WOODS, 0.0);
        let mut hazard = EventManager {
            phase: HazardPhase::Warning {
                remaining: cfg.warning_duration,
            },
        };

        for _ in 0..119 {
            assert_eq!(hazard.update(0.1, &mut run, &cfg), HazardUpdate::Unchanged);
        }
        assert!((hazard.multiplier(&cfg) - 1.0).abs() < f32::EPSILON);
        assert_eq!(
            hazard.update(0.11, &mut run, &cfg),
            HazardUpdate::ColdSnapStarted { killed: false }
        );
        assert!((run.body_temperature - 32.0).abs() < 1e-4, "onset costs 5 degrees");
        assert!((hazard.multiplier(&cfg) - 2.0).abs() < f32::EPSILON);

        let mut ended = false;
        for _ in 0..250 {
            if hazard.update(0.1, &mut run, &cfg) == HazardUpdate::ColdSnapEnded {
                ended = true;
                break;
            }
        }
        assert!(ended, "active window should close after 24s");
        assert_eq!(hazard.phase, HazardPhase::Idle);
        assert!(run.time_in_current_zone > 36.0);
    }

    #[test]
    fn onset_can_kill() {
        let cfg = HazardSettings::default();
        let mut run = run_in(WIND_GAP, 0.0);
        run.body_temperature = 3.0;
        let mut hazard = EventManager {
            phase: HazardPhase::Warning { remaining: 0.05 },
        };
        assert_eq!(
            hazard.update(0.1, &mut run, &cfg),
            HazardUpdate::ColdSnapStarted { killed: true }
        );
        assert!(!run.is_alive);
    }
}
