//! Held actions (chop, kindle, refuel), automatic pickups and the
//! interact key.
//!
//! Held actions resolve only on action-tick boundaries. The action clock
//! runs continuously, so tapping the button between ticks does nothing.

use bevy::prelude::*;
use rand::Rng;

use crate::environment::{EnvironmentState, TreeState};
use crate::hazard::RedemptionSequence;
use crate::npcs::dialogue::DialogueState;
use crate::npcs::{NpcRole, NpcRoster};
use crate::settings::GameSettings;
use crate::shared::*;

pub mod construction;
pub mod shop;

use construction::{deposit_at_site, BuildOutcome};
use shop::{purchase, PurchaseOutcome};

pub const STOCKPILE_REACH: f32 = 80.0;
pub const REFUEL_REACH: f32 = 65.0;
pub const STICK_PICKUP_REACH: f32 = 30.0;
pub const DEADFALL_REACH: f32 = 50.0;
pub const SITE_REACH: f32 = 100.0;

pub const LOG_FUEL: f32 = 30.0;
pub const STICK_FUEL: f32 = 5.0;
pub const IGNITE_LOGS: u32 = 3;
pub const IGNITE_TICKS: u8 = 3;
pub const CHOP_BONUS_CHANCE: f64 = 0.2;

// ═══════════════════════════════════════════════════════════════════════
// OUTCOMES
// ═══════════════════════════════════════════════════════════════════════

/// Progress milestones a log refuel can complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    Zone1Stabilized,
    RedemptionReady,
    BeaconLit,
    TutorialStoked,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TorchOutcome {
    Stashed(u32),
    Withdrew,
    RefueledWithLog { milestone: Option<Milestone> },
    RefueledWithStick,
    NoFuel,
    Kindling { progress: u8 },
    FireLit,
    FireAlreadyExists,
    NeedMoreLogs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChopOutcome {
    NoTarget,
    Exhausted,
    Hit { logs: u32, full: bool },
    Felled { logs: u32, full: bool },
}

impl TorchOutcome {
    pub fn notice(&self) -> Option<(&'static str, ToastSeverity)> {
        match self {
            TorchOutcome::Withdrew => Some(("WITHDREW 1 LOG", ToastSeverity::Info)),
            TorchOutcome::RefueledWithLog { .. } => Some(("FIRE RESTORED", ToastSeverity::Success)),
            TorchOutcome::RefueledWithStick => Some(("+5 FUEL", ToastSeverity::Info)),
            TorchOutcome::NoFuel => Some(("NO LOGS OR STICKS", ToastSeverity::Warning)),
            TorchOutcome::FireLit => Some(("FIRE LIT!", ToastSeverity::Success)),
            TorchOutcome::FireAlreadyExists => {
                Some(("A FIRE ALREADY BURNS HERE", ToastSeverity::Warning))
            }
            TorchOutcome::NeedMoreLogs => Some(("Need 3 logs", ToastSeverity::Warning)),
            TorchOutcome::Stashed(_) | TorchOutcome::Kindling { .. } => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// RESOLVERS
// ═══════════════════════════════════════════════════════════════════════

/// One action tick of the torch: stockpile, then refuel, then kindle.
pub fn resolve_torch(
    run: &mut RunState,
    env: &mut EnvironmentState,
    player: &mut PlayerState,
) -> TorchOutcome {
    let pos = player.pos;

    if let Some(stockpile) = env.stockpile {
        if stockpile.rect().center().distance(pos) < STOCKPILE_REACH {
            if run.inventory.logs > 0 {
                let count = run.inventory.logs;
                run.log_stash += count;
                run.inventory.logs = 0;
                return TorchOutcome::Stashed(count);
            }
            if run.log_stash > 0 && !run.logs_full() {
                run.log_stash -= 1;
                run.inventory.logs += 1;
                return TorchOutcome::Withdrew;
            }
        }
    }

    let zone = run.current_zone_id;
    if let Some(fire) = env
        .campfires
        .iter_mut()
        .find(|f| f.refuel_box().center().distance(pos) < REFUEL_REACH)
    {
        if run.remove_logs(1) {
            fire.add_fuel(LOG_FUEL);
            let milestone = match zone {
                QUIET_WOODS => run.deposit_log_zone_1().then_some(Milestone::Zone1Stabilized),
                WIND_GAP => run.deposit_log_zone_2().then_some(Milestone::RedemptionReady),
                BUILDERS_RIDGE => run.deposit_log_zone_3().then_some(Milestone::BeaconLit),
                HOMESTEAD if run.tutorial_step == 4 => {
                    run.tutorial_step = 5;
                    Some(Milestone::TutorialStoked)
                }
                _ => None,
            };
            return TorchOutcome::RefueledWithLog { milestone };
        }
        if run.inventory.sticks > 0 {
            run.inventory.sticks -= 1;
            fire.add_fuel(STICK_FUEL);
            return TorchOutcome::RefueledWithStick;
        }
        return TorchOutcome::NoFuel;
    }

    if !env.campfires.is_empty() {
        return TorchOutcome::FireAlreadyExists;
    }
    if run.inventory.logs < IGNITE_LOGS {
        return TorchOutcome::NeedMoreLogs;
    }
    player.ignite_progress += 1;
    if player.ignite_progress < IGNITE_TICKS {
        return TorchOutcome::Kindling {
            progress: player.ignite_progress,
        };
    }
    run.remove_logs(IGNITE_LOGS);
    player.ignite_progress = 0;
    let at = player.target_hitbox().center() - Vec2::splat(16.0);
    env.spawn_campfire(at);
    info!("[Interaction] Fire lit at ({:.0}, {:.0})", at.x, at.y);
    TorchOutcome::FireLit
}

/// One axe swing against the first standing tree under the hitbox.
/// `bonus` is the 20% roll for a log on a non-felling hit.
pub fn resolve_chop(run: &mut RunState, env: &mut EnvironmentState, hitbox: Rect, bonus: bool) -> ChopOutcome {
    let Some(tree) = env
        .trees
        .iter_mut()
        .find(|t| t.state == TreeState::Full && rects_overlap(t.trunk_rect(), hitbox))
    else {
        return ChopOutcome::NoTarget;
    };

    if run.current_zone_id == QUIET_WOODS && run.zone1_resources_depleted {
        return ChopOutcome::Exhausted;
    }

    let felled = tree.take_damage();
    if felled > 0 {
        let yield_logs = felled + u32::from(run.axe_upgrade);
        let logs = run.add_logs(yield_logs);
        return ChopOutcome::Felled {
            logs,
            full: logs < yield_logs,
        };
    }
    if !bonus {
        return ChopOutcome::Hit { logs: 0, full: false };
    }
    let wanted = if run.axe_upgrade { 2 } else { 1 };
    let logs = run.add_logs(wanted);
    ChopOutcome::Hit {
        logs,
        full: logs < wanted,
    }
}

/// Walk-over stick collection. Returns how many were picked up.
pub fn collect_sticks(run: &mut RunState, env: &mut EnvironmentState, pos: Vec2) -> u32 {
    let mut collected = 0;
    env.sticks.retain(|stick| {
        if stick.pos.distance(pos) >= STICK_PICKUP_REACH || run.inventory.sticks >= MAX_STICKS {
            return true;
        }
        run.inventory.sticks += 1;
        collected += 1;
        false
    });
    collected
}

/// Pulls one stick from the first nearby deadfall pile that has any.
pub fn gather_deadfall(run: &mut RunState, env: &mut EnvironmentState, pos: Vec2) -> bool {
    if run.inventory.sticks >= MAX_STICKS {
        return false;
    }
    let Some(pile) = env
        .deadfalls
        .iter_mut()
        .find(|p| p.sticks > 0 && p.pos.distance(pos) < DEADFALL_REACH)
    else {
        return false;
    };
    pile.take_stick() && run.add_stick()
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, Default)]
pub struct ActionTicker {
    pub step: FixedStep,
}

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActionTicker>().add_systems(
            Update,
            (handle_interact_key, handle_shop_choice, resolve_held_actions)
                .chain()
                .in_set(SimSet::Interaction),
        );
    }
}

fn announce_milestone(
    milestone: Milestone,
    stabilized_writer: &mut EventWriter<ZoneStabilizedEvent>,
    redemption_writer: &mut EventWriter<RedemptionStartEvent>,
    beacon_writer: &mut EventWriter<BeaconLitEvent>,
    toast_writer: &mut EventWriter<ToastEvent>,
) {
    match milestone {
        Milestone::Zone1Stabilized => {
            stabilized_writer.send(ZoneStabilizedEvent { zone: QUIET_WOODS });
        }
        Milestone::RedemptionReady => {
            redemption_writer.send(RedemptionStartEvent);
        }
        Milestone::BeaconLit => {
            beacon_writer.send(BeaconLitEvent);
        }
        Milestone::TutorialStoked => {
            toast_writer.send(ToastEvent::new("THE ELDER SPEAKS", 3.0, ToastSeverity::Success));
        }
    }
}

pub fn resolve_held_actions(
    time: Res<Time>,
    settings: Res<GameSettings>,
    input: Res<PlayerInput>,
    dialogue: Res<DialogueState>,
    shop_state: Res<ShopState>,
    redemption: Res<RedemptionSequence>,
    mut ticker: ResMut<ActionTicker>,
    mut player: ResMut<PlayerState>,
    mut run: ResMut<RunState>,
    mut env: ResMut<EnvironmentState>,
    mut rng: ResMut<SimRng>,
    mut toast_writer: EventWriter<ToastEvent>,
    mut sfx_writer: EventWriter<PlaySfxEvent>,
    mut stabilized_writer: EventWriter<ZoneStabilizedEvent>,
    mut redemption_writer: EventWriter<RedemptionStartEvent>,
    mut beacon_writer: EventWriter<BeaconLitEvent>,
) {
    if !run.is_alive || dialogue.is_open() || shop_state.open || redemption.is_running() {
        return;
    }
    let dt = time.delta_secs().min(settings.survival.max_frame_delta);
    let due = ticker.step.accumulate(dt, settings.survival.action_interval);

    let pos = player.pos;
    if collect_sticks(&mut run, &mut env, pos) > 0 {
        toast_writer.send(ToastEvent::new("+STICK", 1.0, ToastSeverity::Info));
    }

    let holding_torch = input.action_held && player.active_tool == Tool::Torch;
    if !holding_torch {
        player.ignite_progress = 0;
    }

    for _ in 0..due {
        if gather_deadfall(&mut run, &mut env, pos) {
            toast_writer.send(ToastEvent::new("+STICK", 1.0, ToastSeverity::Info));
        }
        if !input.action_held {
            continue;
        }

        match player.active_tool {
            Tool::Torch => {
                let outcome = resolve_torch(&mut run, &mut env, &mut player);
                debug!("[Interaction] Torch: {:?}", outcome);
                match outcome {
                    TorchOutcome::Stashed(count) => {
                        toast_writer.send(ToastEvent::new(
                            format!("STASHED {} LOGS", count),
                            2.0,
                            ToastSeverity::Info,
                        ));
                    }
                    TorchOutcome::RefueledWithLog { milestone } => {
                        sfx_writer.send(PlaySfxEvent::new("chop"));
                        if let Some(m) = milestone {
                            announce_milestone(
                                m,
                                &mut stabilized_writer,
                                &mut redemption_writer,
                                &mut beacon_writer,
                                &mut toast_writer,
                            );
                        }
                    }
                    TorchOutcome::FireLit => {
                        sfx_writer.send(PlaySfxEvent::new("ignite"));
                    }
                    _ => {}
                }
                if let Some((text, severity)) = outcome.notice() {
                    toast_writer.send(ToastEvent::new(text, 1.5, severity));
                }
            }
            Tool::Axe => {
                let bonus = rng.0.gen_bool(CHOP_BONUS_CHANCE);
                let hitbox = player.target_hitbox();
                let outcome = resolve_chop(&mut run, &mut env, hitbox, bonus);
                debug!("[Interaction] Chop: {:?}", outcome);
                if outcome != ChopOutcome::NoTarget {
                    sfx_writer.send(PlaySfxEvent::new("chop"));
                }
                match outcome {
                    ChopOutcome::Exhausted => {
                        toast_writer.send(ToastEvent::new("EXHAUSTED", 1.5, ToastSeverity::Warning));
                    }
                    ChopOutcome::Felled { logs, full } | ChopOutcome::Hit { logs, full } => {
                        if logs > 0 {
                            toast_writer.send(ToastEvent::new(
                                format!("+{} LOGS", logs),
                                1.5,
                                ToastSeverity::Info,
                            ));
                        }
                        if full {
                            toast_writer.send(ToastEvent::new("FULL", 1.5, ToastSeverity::Warning));
                        }
                    }
                    ChopOutcome::NoTarget => {}
                }
            }
        }
    }
}

/// E key: dialogue, shop, NPC talk, or a shelter deposit, in that order.
pub fn handle_interact_key(
    input: Res<PlayerInput>,
    player: Res<PlayerState>,
    redemption: Res<RedemptionSequence>,
    roster: Res<NpcRoster>,
    mut dialogue: ResMut<DialogueState>,
    mut shop_state: ResMut<ShopState>,
    mut run: ResMut<RunState>,
    env: Res<EnvironmentState>,
    mut toast_writer: EventWriter<ToastEvent>,
    mut sfx_writer: EventWriter<PlaySfxEvent>,
) {
    if !input.interact || !run.is_alive {
        return;
    }
    if dialogue.is_open() {
        if dialogue.advance() {
            dialogue.close();
        }
        return;
    }
    if shop_state.open {
        shop_state.open = false;
        return;
    }
    if redemption.is_running() {
        return;
    }

    let pos = player.pos;
    if let Some(npc) = roster.nearest_talkable(pos) {
        if run.current_zone_id == BUILDERS_RIDGE
            && npc.role == NpcRole::Builder
            && run.shack_progress.is_complete()
        {
            shop_state.open = true;
            info!("[Interaction] Shop opened");
        } else {
            dialogue.start(npc.dialogue);
        }
        return;
    }

    let near_site = env
        .construction_site
        .as_ref()
        .is_some_and(|site| site.rect().center().distance(pos) < SITE_REACH);
    if !near_site {
        return;
    }
    let outcome = deposit_at_site(&mut run, &env);
    debug!("[Interaction] Build: {:?}", outcome);
    if let BuildOutcome::Deposited { completed: true, .. } = outcome {
        sfx_writer.send(PlaySfxEvent::new("ice_crack"));
    }
    if let Some((text, severity)) = outcome.notice() {
        toast_writer.send(ToastEvent::new(text, 2.0, severity));
    }
}

pub fn handle_shop_choice(
    input: Res<PlayerInput>,
    shop_state: Res<ShopState>,
    mut run: ResMut<RunState>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    if !shop_state.open {
        return;
    }
    let Some(item) = input.shop_choice else {
        return;
    };
    let outcome = purchase(&mut run, item);
    info!("[Interaction] {} -> {:?}", item.label(), outcome);
    let (text, severity) = match outcome {
        PurchaseOutcome::Purchased => ("PURCHASED UPGRADE!", ToastSeverity::Success),
        PurchaseOutcome::AlreadyOwned => ("ALREADY OWNED", ToastSeverity::Info),
        PurchaseOutcome::NotEnoughLogs => ("NOT ENOUGH LOGS IN STASH", ToastSeverity::Warning),
    };
    toast_writer.send(ToastEvent::new(text, 2.0, severity));
}
