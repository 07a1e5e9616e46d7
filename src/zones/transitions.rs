//! Edge crossings between zones.
//!
//! `decide_transition` is pure: it only reads the run and says where the
//! player goes (or why they may not). `check_zone_transition` applies the
//! decision and rebuilds the zone.

use bevy::prelude::*;

use super::{rebuild_current_zone, WeatherPreset, ZoneLoad, ZoneRegistry};
use crate::environment::EnvironmentState;
use crate::hazard::EventManager;
use crate::npcs::NpcRoster;
use crate::settings::GameSettings;
use crate::shared::*;

pub const RIGHT_EDGE: f32 = LOGICAL_WIDTH - 20.0;
pub const LEFT_EDGE: f32 = -60.0;
const RIGHT_CLAMP: f32 = LOGICAL_WIDTH - 30.0;
const ENTRY_FROM_LEFT_X: f32 = 20.0;
const ENTRY_FROM_RIGHT_X: f32 = 1130.0;
const RIDGE_ENTRY: Vec2 = Vec2::new(640.0, 660.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
}

pub fn edge_reached(x: f32) -> Option<Edge> {
    if x >= RIGHT_EDGE {
        Some(Edge::Right)
    } else if x <= LEFT_EDGE {
        Some(Edge::Left)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransitionDecision {
    Enter {
        to: ZoneId,
        spawn_x: f32,
        /// `None` keeps the player's current height.
        spawn_y: Option<f32>,
    },
    Refuse {
        clamp_x: f32,
        notice: Option<&'static str>,
    },
}

/// Where the player goes when they reach `edge` of the current zone.
pub fn decide_transition(
    run: &RunState,
    edge: Edge,
    cold_snap_active: bool,
) -> Result<TransitionDecision, String> {
    use TransitionDecision::*;

    let decision = match (run.current_zone_id, edge) {
        (HOMESTEAD, Edge::Right) if run.tutorial_step >= 3 => Enter {
            to: QUIET_WOODS,
            spawn_x: ENTRY_FROM_LEFT_X,
            spawn_y: None,
        },
        (HOMESTEAD, Edge::Right) => Refuse {
            clamp_x: RIGHT_CLAMP,
            notice: None,
        },
        (QUIET_WOODS, Edge::Right) if run.zone1_stabilized => Enter {
            to: WIND_GAP,
            spawn_x: ENTRY_FROM_LEFT_X,
            spawn_y: None,
        },
        (QUIET_WOODS, Edge::Right) => Refuse {
            clamp_x: RIGHT_CLAMP,
            notice: None,
        },
        (WIND_GAP, Edge::Right) if run.logs_deposited_zone2 >= ZONE2_REDEMPTION_DEPOSITS => Enter {
            to: BUILDERS_RIDGE,
            spawn_x: RIDGE_ENTRY.x,
            spawn_y: Some(RIDGE_ENTRY.y),
        },
        (WIND_GAP, Edge::Right) => Refuse {
            clamp_x: RIGHT_CLAMP,
            notice: Some("FINISH THE SHELTER FIRST!"),
        },
        (WIND_GAP, Edge::Left) if cold_snap_active => Refuse {
            clamp_x: -50.0,
            notice: Some("THE WIND IS TOO STRONG TO RETREAT!"),
        },
        (WIND_GAP, Edge::Left) => Enter {
            to: QUIET_WOODS,
            spawn_x: ENTRY_FROM_RIGHT_X,
            spawn_y: None,
        },
        (BUILDERS_RIDGE, Edge::Right) => Refuse {
            clamp_x: RIGHT_EDGE,
            notice: None,
        },
        (BUILDERS_RIDGE, Edge::Left) => Enter {
            to: WIND_GAP,
            spawn_x: ENTRY_FROM_RIGHT_X,
            spawn_y: None,
        },
        (HOMESTEAD | QUIET_WOODS, Edge::Left) => Refuse {
            clamp_x: LEFT_EDGE,
            notice: None,
        },
        (other, _) => return Err(format!("no transitions defined for zone {}", other)),
    };
    Ok(decision)
}

/// Bookkeeping for leaving the current zone toward `to`.
pub fn apply_exit_effects(run: &mut RunState, env: &EnvironmentState, to: ZoneId) {
    match run.current_zone_id {
        HOMESTEAD => run.tutorial_completed = true,
        QUIET_WOODS if to == WIND_GAP => {
            if run.logs_full() {
                run.zone1_resources_depleted = true;
            }
            run.builder_location = WIND_GAP;
        }
        WIND_GAP => {
            if let Some(fire) = env.linked_fire() {
                run.zone2_hub_fire_fuel = fire.fuel;
            }
        }
        _ => {}
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEM
// ═══════════════════════════════════════════════════════════════════════

pub fn check_zone_transition(
    mut player: ResMut<PlayerState>,
    mut run: ResMut<RunState>,
    mut env: ResMut<EnvironmentState>,
    zones: Res<ZoneRegistry>,
    mut hazard: ResMut<EventManager>,
    mut roster: ResMut<NpcRoster>,
    mut weather: ResMut<WeatherPreset>,
    settings: Res<GameSettings>,
    mut rng: ResMut<SimRng>,
    mut changed_writer: EventWriter<ZoneChangedEvent>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    if !run.is_alive {
        return;
    }
    let Some(edge) = edge_reached(player.pos.x) else {
        return;
    };

    let decision = match decide_transition(&run, edge, hazard.is_cold_snap_active()) {
        Ok(decision) => decision,
        Err(e) => {
            error!("[Zones] {}", e);
            return;
        }
    };

    match decision {
        TransitionDecision::Refuse { clamp_x, notice } => {
            player.pos.x = clamp_x;
            if let Some(text) = notice {
                toast_writer.send(ToastEvent::new(text, 2.0, ToastSeverity::Warning));
            }
        }
        TransitionDecision::Enter { to, spawn_x, spawn_y } => {
            let from = run.current_zone_id;
            apply_exit_effects(&mut run, &env, to);

            run.current_zone_id = to;
            run.time_in_current_zone = 0.0;
            player.pos.x = spawn_x;
            if let Some(y) = spawn_y {
                player.pos.y = y;
            }
            player.ignite_progress = 0;

            let loaded = rebuild_current_zone(
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
            if !loaded {
                return;
            }

            info!("[Zones] Transition {} -> {}", from, to);
            changed_writer.send(ZoneChangedEvent { from, to });
            if let Some(zone) = zones.get(to) {
                toast_writer.send(ToastEvent::new(
                    zone.name.to_uppercase(),
                    3.0,
                    ToastSeverity::Info,
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Campfire;

    fn run_in(zone: ZoneId) -> RunState {
        RunState {
            current_zone_id: zone,
            ..Default::default()
        }
    }

    #[test]
    fn edges() {
        assert_eq!(edge_reached(1260.0), Some(Edge::Right));
        assert_eq!(edge_reached(1259.0), None);
        assert_eq!(edge_reached(-60.0), Some(Edge::Left));
        assert_eq!(edge_reached(-59.0), None);
    }

    #[test]
    fn homestead_exit_needs_tutorial_progress() {
        let mut run = run_in(HOMESTEAD);
        run.tutorial_step = 2;
        assert!(matches!(
            decide_transition(&run, Edge::Right, false),
            Ok(TransitionDecision::Refuse { clamp_x, .. }) if clamp_x == 1250.0
        ));
        run.tutorial_step = 3;
        assert_eq!(
            decide_transition(&run, Edge::Right, false),
            Ok(TransitionDecision::Enter {
                to: QUIET_WOODS,
                spawn_x: 20.0,
                spawn_y: None
            })
        );
    }

    #[test]
    fn wind_gap_gates() {
        let mut run = run_in(WIND_GAP);
        assert_eq!(
            decide_transition(&run, Edge::Right, false),
            Ok(TransitionDecision::Refuse {
                clamp_x: 1250.0,
                notice: Some("FINISH THE SHELTER FIRST!")
            })
        );
        run.logs_deposited_zone2 = 30;
        assert_eq!(
            decide_transition(&run, Edge::Right, false),
            Ok(TransitionDecision::Enter {
                to: BUILDERS_RIDGE,
                spawn_x: 640.0,
                spawn_y: Some(660.0)
            })
        );
    }

    #[test]
    fn cold_snap_blocks_retreat() {
        let run = run_in(WIND_GAP);
        assert_eq!(
            decide_transition(&run, Edge::Left, true),
            Ok(TransitionDecision::Refuse {
                clamp_x: -50.0,
                notice: Some("THE WIND IS TOO STRONG TO RETREAT!")
            })
        );
        assert!(matches!(
            decide_transition(&run, Edge::Left, false),
            Ok(TransitionDecision::Enter { to: QUIET_WOODS, .. })
        ));
    }

    #[test]
    fn unknown_zone_is_an_error() {
        assert!(decide_transition(&run_in(9), Edge::Right, false).is_err());
    }

    #[test]
    fn leaving_woods_with_full_pack_depletes_it() {
        let mut run = run_in(QUIET_WOODS);
        run.inventory.logs = MAX_LOG_SLOTS;
        apply_exit_effects(&mut run, &EnvironmentState::default(), WIND_GAP);
        assert!(run.zone1_resources_depleted);
        assert_eq!(run.builder_location, WIND_GAP);
    }

    #[test]
    fn leaving_gap_remembers_hub_fuel() {
        let mut env = EnvironmentState::default();
        let hub = env.spawn_campfire(Vec2::new(640.0, 360.0));
        env.campfires[hub] = Campfire {
            fuel: 77.0,
            ..env.campfires[hub].clone()
        };
        env.construction_site = Some(crate::environment::ConstructionSite {
            pos: Vec2::new(640.0, 240.0),
            linked_fire: Some(hub),
        });
        let mut run = run_in(WIND_GAP);
        apply_exit_effects(&mut run, &env, QUIET_WOODS);
        assert!((run.zone2_hub_fire_fuel - 77.0).abs() < f32::EPSILON);
    }
}
