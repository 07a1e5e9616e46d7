//! Headless integration tests for Fire Watchers.
//!
//! These tests drive the full simulation through `GameCorePlugin` without a
//! window or GPU. Time advances by a fixed 100 ms per `app.update()`, so a
//! survival tick (1.2 s) lands roughly every twelve frames.
//!
//! Run with: `cargo test --test headless`

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use fire_watchers::environment::{
    Campfire, EnvironmentState, Stockpile, Tree, TreeState, HAVEN_FIRE_POS,
};
use fire_watchers::hazard::{EventManager, HazardPhase, RedemptionSequence};
use fire_watchers::interaction::ActionTicker;
use fire_watchers::npcs::dialogue::DialogueState;
use fire_watchers::npcs::{NpcRole, NpcRoster, ELDER_HOMESTEAD_LINES};
use fire_watchers::save::NewGameEvent;
use fire_watchers::settings::GameSettings;
use fire_watchers::shared::*;
use fire_watchers::zones::ZoneRegistry;
use fire_watchers::GameCorePlugin;

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

const FRAME: Duration = Duration::from_millis(100);

/// Builds the simulation on top of `MinimalPlugins` with manual time.
fn build_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));
    app.add_plugins(GameCorePlugin);
    app
}

/// Boots into Playing with the homestead loaded and Cold Snaps disabled.
fn enter_playing_state(app: &mut App) {
    app.update(); // Startup: settings, Loading
    app.update(); // Loading → Playing, zone load
    app.world_mut()
        .resource_mut::<GameSettings>()
        .hazard
        .chance_per_tick = 0.0;
    assert_eq!(current_state(app), GameState::Playing);
}

fn current_state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

/// Moves the run to `zone` and lets the zone loader rebuild it.
fn warp_to(app: &mut App, zone: ZoneId) {
    app.world_mut().resource_mut::<RunState>().current_zone_id = zone;
    app.update();
    assert_eq!(app.world().resource::<EnvironmentState>().zone, Some(zone));
}

// ─────────────────────────────────────────────────────────────────────────────
// Boot
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_boot_reaches_playing_with_homestead_loaded() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);

    let env = app.world().resource::<EnvironmentState>();
    assert_eq!(env.zone, Some(HOMESTEAD));
    assert!(!env.trees.is_empty(), "homestead should have trees to chop");
    assert!(
        env.campfires.iter().any(|f| f.is_tutorial_fire),
        "homestead should have its everlasting fire"
    );

    let roster = app.world().resource::<NpcRoster>();
    assert!(roster.npcs.iter().any(|n| n.role == NpcRole::Elder));
}

// ─────────────────────────────────────────────────────────────────────────────
// Survival
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_survival_ticks_advance_while_playing() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);
    let start = app.world().resource::<RunState>().tick_count;

    run_frames(&mut app, 40);

    let ticks = app.world().resource::<RunState>().tick_count - start;
    assert!((2..=4).contains(&ticks), "expected ~3 ticks in 4 s, got {ticks}");
}

#[test]
fn test_pause_freezes_the_simulation() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Paused);
    app.update();
    let frozen_at = app.world().resource::<RunState>().tick_count;

    run_frames(&mut app, 40);

    assert_eq!(current_state(&app), GameState::Paused);
    assert_eq!(app.world().resource::<RunState>().tick_count, frozen_at);
}

#[test]
fn test_exposure_in_the_wind_gap_ends_the_run() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);
    warp_to(&mut app, WIND_GAP);

    {
        let mut run = app.world_mut().resource_mut::<RunState>();
        run.body_temperature = 5.0;
    }
    // Far corner: out of reach of the (unlit) hub fire.
    app.world_mut().resource_mut::<PlayerState>().pos = Vec2::new(10.0, 10.0);

    run_frames(&mut app, 60);

    let run = app.world().resource::<RunState>();
    assert!(!run.is_alive);
    assert!(run.body_temperature <= 0.0);
    assert_eq!(current_state(&app), GameState::GameOver);
}

#[test]
fn test_stabilized_woods_are_a_haven() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);
    {
        let mut run = app.world_mut().resource_mut::<RunState>();
        run.zone1_stabilized = true;
        run.body_temperature = 20.0;
    }
    warp_to(&mut app, QUIET_WOODS);
    app.world_mut().resource_mut::<PlayerState>().pos = Vec2::new(900.0, 600.0);

    run_frames(&mut app, 40);

    let run = app.world().resource::<RunState>();
    assert!(run.body_temperature > 20.0, "haven should warm the player");
    let env = app.world().resource::<EnvironmentState>();
    assert!(env.stockpile.is_some());
    assert!(env.campfires.iter().all(|f| (f.fuel - f.max_fuel).abs() < f32::EPSILON));
}

#[test]
fn test_cold_snap_onset_death_is_caught_the_same_frame() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);

    let fire_pos = app
        .world()
        .resource::<EnvironmentState>()
        .campfires
        .iter()
        .find(|f| f.is_tutorial_fire)
        .map(|f| f.pos)
        .unwrap();
    app.world_mut().resource_mut::<PlayerState>().pos = fire_pos;
    app.world_mut().resource_mut::<RunState>().body_temperature = 3.0;
    app.world_mut().resource_mut::<EventManager>().phase = HazardPhase::Warning { remaining: 0.05 };

    app.update();

    assert!(!app.world().resource::<RunState>().is_alive);
    assert!(
        !app.world().resource::<Events<PlayerDiedEvent>>().is_empty(),
        "death should be reported on the onset frame"
    );
    assert!(matches!(
        app.world().resource::<NextState<GameState>>(),
        NextState::Pending(GameState::GameOver)
    ));

    app.update();
    assert_eq!(current_state(&app), GameState::GameOver);
}

// ─────────────────────────────────────────────────────────────────────────────
// Interaction
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_axe_fells_a_tree_on_the_third_action_tick() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);

    let tree = Tree::new(Vec2::new(700.0, 300.0));
    let trunk = tree.trunk_rect().center();
    app.world_mut().resource_mut::<EnvironmentState>().trees = vec![tree];
    {
        let mut player = app.world_mut().resource_mut::<PlayerState>();
        player.active_tool = Tool::Axe;
        let reach = player.target_hitbox().center() - player.pos;
        player.pos = trunk - reach;
    }
    app.world_mut().resource_mut::<ActionTicker>().step.reset();
    app.world_mut().resource_mut::<PlayerInput>().action_held = true;

    // An open dialogue holds the action clock.
    app.world_mut()
        .resource_mut::<DialogueState>()
        .start(ELDER_HOMESTEAD_LINES);
    run_frames(&mut app, 18);
    {
        let env = app.world().resource::<EnvironmentState>();
        assert_eq!(env.trees[0].health, 3);
        assert_eq!(app.world().resource::<RunState>().inventory.logs, 0);
    }
    app.world_mut().resource_mut::<DialogueState>().close();

    // 1.3 s: two swings.
    run_frames(&mut app, 13);
    let logs_before_fell = {
        let env = app.world().resource::<EnvironmentState>();
        assert_eq!(env.trees[0].state, TreeState::Full);
        assert_eq!(env.trees[0].health, 1);
        app.world().resource::<RunState>().inventory.logs
    };

    // 1.9 s: the third swing fells it.
    run_frames(&mut app, 6);
    let env = app.world().resource::<EnvironmentState>();
    assert_eq!(env.trees[0].state, TreeState::Stump);
    let logs = app.world().resource::<RunState>().inventory.logs;
    assert_eq!(logs - logs_before_fell, 3);
}

#[test]
fn test_twentieth_woods_refuel_builds_the_haven_once() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);
    warp_to(&mut app, QUIET_WOODS);

    let pos = Vec2::new(600.0, 400.0);
    {
        let mut env = app.world_mut().resource_mut::<EnvironmentState>();
        let fire_pos = pos - Vec2::new(61.0, 8.0);
        env.campfires = vec![Campfire::new(fire_pos)];
        assert!(env.campfires[0].refuel_box().center().distance(pos) < 65.0);
    }
    {
        let mut run = app.world_mut().resource_mut::<RunState>();
        run.logs_deposited_zone1 = 18;
        run.inventory.logs = 5;
    }
    {
        let mut player = app.world_mut().resource_mut::<PlayerState>();
        player.pos = pos;
        player.active_tool = Tool::Torch;
    }
    app.world_mut().resource_mut::<PlayerInput>().action_held = true;

    for _ in 0..40 {
        app.update();
        if app.world().resource::<RunState>().zone1_stabilized {
            break;
        }
    }
    app.world_mut().resource_mut::<PlayerInput>().action_held = false;

    let run = app.world().resource::<RunState>();
    assert!(run.zone1_stabilized);
    assert_eq!(run.logs_deposited_zone1, 20);
    assert_eq!(run.builder_location, WIND_GAP);
    assert!(app.world().resource::<ZoneRegistry>().is_stabilized(QUIET_WOODS));
    let env = app.world().resource::<EnvironmentState>();
    assert_eq!(env.campfires.len(), 1);
    assert_eq!(env.campfires[0].pos, HAVEN_FIRE_POS);
    assert!(env.stockpile.is_some());
    let roster = app.world().resource::<NpcRoster>();
    assert!(roster.npcs.iter().any(|n| n.role == NpcRole::Elder));
    assert!(!roster.npcs.iter().any(|n| n.role == NpcRole::Drifter));

    // A repeated signal must not rebuild the haven.
    let marker = Vec2::new(150.0, 500.0);
    {
        let mut env = app.world_mut().resource_mut::<EnvironmentState>();
        env.campfires.push(Campfire::new(Vec2::new(900.0, 500.0)));
        env.stockpile = Some(Stockpile { pos: marker });
    }
    app.world_mut()
        .send_event(ZoneStabilizedEvent { zone: QUIET_WOODS });
    app.update();
    app.update();

    let env = app.world().resource::<EnvironmentState>();
    assert_eq!(env.campfires.len(), 2);
    assert_eq!(env.stockpile.map(|s| s.pos), Some(marker));
}

// ─────────────────────────────────────────────────────────────────────────────
// Zones
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_right_edge_leaves_the_homestead_after_tutorial() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);

    app.world_mut().resource_mut::<PlayerState>().pos.x = 1270.0;
    app.update();
    assert_eq!(
        app.world().resource::<RunState>().current_zone_id,
        HOMESTEAD,
        "the tutorial must be finished first"
    );
    assert!(app.world().resource::<PlayerState>().pos.x < 1260.0);

    app.world_mut().resource_mut::<RunState>().tutorial_step = 3;
    app.world_mut().resource_mut::<PlayerState>().pos.x = 1270.0;
    app.update();

    let run = app.world().resource::<RunState>();
    assert_eq!(run.current_zone_id, QUIET_WOODS);
    assert!(run.tutorial_completed);
    assert!((app.world().resource::<PlayerState>().pos.x - 20.0).abs() < f32::EPSILON);
    assert_eq!(
        app.world().resource::<EnvironmentState>().zone,
        Some(QUIET_WOODS)
    );
}

#[test]
fn test_beacon_lit_wins_the_run() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);

    app.world_mut().send_event(BeaconLitEvent);
    app.update();
    app.update();

    assert_eq!(current_state(&app), GameState::Victory);
    assert!(app
        .world()
        .resource::<ZoneRegistry>()
        .is_stabilized(BUILDERS_RIDGE));
}

// ─────────────────────────────────────────────────────────────────────────────
// Redemption
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_redemption_walks_in_talks_and_stabilizes_the_gap() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);
    warp_to(&mut app, WIND_GAP);

    app.world_mut().send_event(RedemptionStartEvent);
    let mut talked = false;
    for _ in 0..400 {
        app.world_mut().resource_mut::<RunState>().body_temperature = MAX_BODY_TEMP;
        app.update();
        {
            let mut dialogue = app.world_mut().resource_mut::<DialogueState>();
            if dialogue.is_open() {
                talked = true;
                dialogue.close();
            }
        }
        if app.world().resource::<RunState>().zone2_redeemed {
            break;
        }
    }
    app.update();

    assert!(talked, "the drifter should have spoken");
    assert!(app.world().resource::<RunState>().zone2_redeemed);
    assert!(!app.world().resource::<RedemptionSequence>().is_running());
    assert!(app.world().resource::<ZoneRegistry>().is_stabilized(WIND_GAP));
    assert!(!app
        .world()
        .resource::<NpcRoster>()
        .npcs
        .iter()
        .any(|n| n.role == NpcRole::Drifter));
}

#[test]
fn test_redemption_approach_respects_the_frame_delta_cap() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);
    warp_to(&mut app, WIND_GAP);
    app.world_mut()
        .resource_mut::<GameSettings>()
        .survival
        .max_frame_delta = 0.05;

    app.world_mut().send_event(RedemptionStartEvent);
    app.update();

    let drifter = app
        .world()
        .resource::<NpcRoster>()
        .npcs
        .iter()
        .find(|n| n.role == NpcRole::Drifter)
        .map(|n| n.pos)
        .unwrap();
    let spawn = Vec2::new(LOGICAL_WIDTH - 100.0, LOGICAL_HEIGHT / 2.0);
    // 80 u/s for a capped 50 ms step.
    assert!((drifter.distance(spawn) - 4.0).abs() < 1e-3);
}

// ─────────────────────────────────────────────────────────────────────────────
// Save
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_new_game_resets_the_run() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);
    {
        let mut run = app.world_mut().resource_mut::<RunState>();
        run.log_stash = 40;
        run.zone1_stabilized = true;
        run.inventory.logs = 6;
    }
    warp_to(&mut app, QUIET_WOODS);

    app.world_mut().send_event(NewGameEvent);
    app.update();
    app.update();

    let run = app.world().resource::<RunState>();
    assert_eq!(run.current_zone_id, HOMESTEAD);
    assert_eq!(run.log_stash, 0);
    assert_eq!(run.inventory.logs, 0);
    assert!(!run.zone1_stabilized);
    assert_eq!(
        app.world().resource::<ZoneRegistry>().stabilized_zones(),
        vec![HOMESTEAD]
    );
    assert_eq!(
        app.world().resource::<EnvironmentState>().zone,
        Some(HOMESTEAD)
    );
}
