//! The Wind Gap redemption cutscene.
//!
//! Once the hub quota is met, the local drifter walks up to the player,
//! says its piece, and leaves. The zone is then stabilized for good.

use bevy::prelude::*;

use crate::npcs::dialogue::DialogueState;
use crate::npcs::{NpcId, NpcRole, NpcRoster};
use crate::settings::GameSettings;
use crate::shared::*;

pub const APPROACH_SPEED: f32 = 80.0;
const ARRIVAL_RADIUS: f32 = 5.0;

pub const REDEMPTION_LINES: &[&str] = &[
    "...I've been taking from your fires.",
    "I was cold. I didn't think anyone would notice.",
    "You kept feeding them anyway.",
    "I'll carry wood for the shelter now. I'm sorry.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedemptionStage {
    #[default]
    Idle,
    Approach,
    StartDialogue,
    AwaitDialogue,
    Resolve,
}

/// What the driving system must do after one `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionStep {
    Waiting,
    OpenDialogue(&'static [&'static str]),
    Resolved,
    Aborted,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct RedemptionSequence {
    pub stage: RedemptionStage,
    pub npc: Option<NpcId>,
}

impl RedemptionSequence {
    /// Begins the sequence. Ignored unless idle.
    pub fn start(&mut self, npc: NpcId) -> bool {
        if self.stage != RedemptionStage::Idle {
            return false;
        }
        self.stage = RedemptionStage::Approach;
        self.npc = Some(npc);
        true
    }

    pub fn is_running(&self) -> bool {
        self.stage != RedemptionStage::Idle
    }

    fn finish(&mut self) {
        self.stage = RedemptionStage::Idle;
        self.npc = None;
    }

    /// Advances one frame. `npc_pos` is `None` when the actor has vanished.
    pub fn advance(
        &mut self,
        dt: f32,
        npc_pos: Option<&mut Vec2>,
        player_pos: Vec2,
        dialogue_open: bool,
    ) -> RedemptionStep {
        if self.stage == RedemptionStage::Idle {
            return RedemptionStep::Waiting;
        }
        let Some(npc_pos) = npc_pos else {
            warn!(
                "[Hazard] Redemption actor {:?} disappeared during {:?}; aborting",
                self.npc, self.stage
            );
            self.finish();
            return RedemptionStep::Aborted;
        };

        match self.stage {
            RedemptionStage::Idle => RedemptionStep::Waiting,
            RedemptionStage::Approach => {
                let target = player_pos + Vec2::new(0.0, 60.0);
                let remaining = crate::npcs::step_toward(npc_pos, target, APPROACH_SPEED, dt);
                if remaining < ARRIVAL_RADIUS {
                    self.stage = RedemptionStage::StartDialogue;
                }
                RedemptionStep::Waiting
            }
            RedemptionStage::StartDialogue => {
                self.stage = RedemptionStage::AwaitDialogue;
                RedemptionStep::OpenDialogue(REDEMPTION_LINES)
            }
            RedemptionStage::AwaitDialogue => {
                if !dialogue_open {
                    self.stage = RedemptionStage::Resolve;
                }
                RedemptionStep::Waiting
            }
            RedemptionStage::Resolve => {
                self.finish();
                RedemptionStep::Resolved
            }
        }
    }
}

/// Picks (or brings in) the actor when the Wind Gap quota is met.
pub fn start_redemption(
    mut events: EventReader<RedemptionStartEvent>,
    run: Res<RunState>,
    mut roster: ResMut<NpcRoster>,
    mut sequence: ResMut<RedemptionSequence>,
) {
    for _ in events.read() {
        if run.zone2_redeemed || sequence.is_running() {
            continue;
        }
        let actor = roster
            .npcs
            .iter()
            .find(|n| n.role == NpcRole::Drifter)
            .map(|n| n.id);
        let actor = match actor {
            Some(id) => id,
            None => roster.spawn(
                NpcRole::Drifter,
                Vec2::new(LOGICAL_WIDTH - 100.0, LOGICAL_HEIGHT / 2.0),
            ),
        };
        if sequence.start(actor) {
            info!("[Hazard] Redemption begins with npc {:?}", actor);
        }
    }
}

pub fn drive_redemption(
    time: Res<Time>,
    settings: Res<GameSettings>,
    player: Res<PlayerState>,
    mut run: ResMut<RunState>,
    mut roster: ResMut<NpcRoster>,
    mut dialogue: ResMut<DialogueState>,
    mut sequence: ResMut<RedemptionSequence>,
    mut stabilized_writer: EventWriter<ZoneStabilizedEvent>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    if !sequence.is_running() {
        return;
    }
    let dt = time.delta_secs().min(settings.survival.max_frame_delta);
    let dialogue_open = dialogue.is_open();
    let npc_id = sequence.npc;
    let npc_pos = npc_id.and_then(|id| roster.get_mut(id)).map(|n| &mut n.pos);

    match sequence.advance(dt, npc_pos, player.pos, dialogue_open) {
        RedemptionStep::Waiting | RedemptionStep::Aborted => {}
        RedemptionStep::OpenDialogue(lines) => dialogue.start(lines),
        RedemptionStep::Resolved => {
            run.zone2_redeemed = true;
            if let Some(id) = npc_id {
                roster.remove(id);
            }
            stabilized_writer.send(ZoneStabilizedEvent { zone: WIND_GAP });
            toast_writer.send(ToastEvent::new(
                "THE DRIFTER HAS LEFT THE GAP",
                3.0,
                ToastSeverity::Success,
            ));
            info!("[Hazard] Redemption resolved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_talks_and_resolves() {
        let mut seq = RedemptionSequence::default();
        assert!(seq.start(NpcId(1)));
        assert!(!seq.start(NpcId(2)), "only starts from idle");

        let player = Vec2::new(100.0, 100.0);
        let mut npc = Vec2::new(100.0, 400.0);
        let mut steps = 0;
        while seq.stage == RedemptionStage::Approach {
            seq.advance(0.1, Some(&mut npc), player, false);
            steps += 1;
            assert!(steps < 100, "approach should finish");
        }
        assert!(npc.distance(player + Vec2::new(0.0, 60.0)) < ARRIVAL_RADIUS);

        assert_eq!(
            seq.advance(0.1, Some(&mut npc), player, false),
            RedemptionStep::OpenDialogue(REDEMPTION_LINES)
        );
        assert_eq!(seq.advance(0.1, Some(&mut npc), player, true), RedemptionStep::Waiting);
        assert_eq!(seq.stage, RedemptionStage::AwaitDialogue);
        seq.advance(0.1, Some(&mut npc), player, false);
        assert_eq!(seq.stage, RedemptionStage::Resolve);
        assert_eq!(
            seq.advance(0.1, Some(&mut npc), player, false),
            RedemptionStep::Resolved
        );
        assert!(!seq.is_running());
    }

    #[test]
    fn missing_actor_aborts_to_idle() {
        let mut seq = RedemptionSequence::default();
        seq.start(NpcId(7));
        seq.stage = RedemptionStage::AwaitDialogue;
        assert_eq!(
            seq.advance(0.1, None, Vec2::ZERO, false),
            RedemptionStep::Aborted
        );
        assert_eq!(seq.stage, RedemptionStage::Idle);
        assert!(seq.npc.is_none());
    }
}
