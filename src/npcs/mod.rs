//! NPC domain plugin.
//!
//! Zone NPCs are plain data in an `NpcRoster` resource, respawned whenever
//! the zone is rebuilt. Behaviour runs once per frame against the current
//! `EnvironmentState`.

use bevy::prelude::*;
use rand::Rng;

use crate::environment::EnvironmentState;
use crate::hazard::RedemptionSequence;
use crate::settings::GameSettings;
use crate::shared::*;

pub mod dialogue;

use dialogue::DialogueState;

// ═══════════════════════════════════════════════════════════════════════
// TYPES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NpcId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NpcRole {
    Elder,
    Builder,
    Drifter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpcBehaviour {
    /// Tops up fires that are running low.
    Keeper,
    /// Raids lit fires for fuel.
    Saboteur,
    /// Potters around the shelter site while it is being built.
    Builder,
}

#[derive(Debug, Clone)]
pub struct Npc {
    pub id: NpcId,
    pub role: NpcRole,
    pub behaviour: NpcBehaviour,
    pub pos: Vec2,
    pub dialogue: &'static [&'static str],
    pub target_fire: Option<usize>,
    pub walk_target: Option<Vec2>,
    pub cooldown: f32,
    pub wander_dir: Vec2,
    pub wander_timer: f32,
}

impl Npc {
    fn new(id: NpcId, role: NpcRole, pos: Vec2) -> Self {
        let (behaviour, dialogue) = match role {
            NpcRole::Elder => (NpcBehaviour::Keeper, ELDER_HOMESTEAD_LINES),
            NpcRole::Builder => (NpcBehaviour::Builder, BUILDER_GAP_LINES),
            NpcRole::Drifter => (NpcBehaviour::Saboteur, &[][..]),
        };
        Self {
            id,
            role,
            behaviour,
            pos,
            dialogue,
            target_fire: None,
            walk_target: None,
            cooldown: 0.0,
            wander_dir: Vec2::ZERO,
            wander_timer: 0.0,
        }
    }
}

pub const NPC_SPEED: f32 = 60.0;
pub const TALK_RADIUS: f32 = 80.0;
const SABOTEUR_REACH: f32 = 40.0;
const KEEPER_REACH: f32 = 60.0;
const SABOTEUR_THEFT: f32 = 10.0;
const SABOTEUR_COOLDOWN: f32 = 2.0;
const KEEPER_REFILL: f32 = 20.0;
const KEEPER_LOW_FUEL: f32 = 50.0;
const KEEPER_CAP: f32 = 100.0;
const KEEPER_COOLDOWN: f32 = 3.0;

pub const ELDER_HOMESTEAD_LINES: &[&str] = &[
    "Welcome, traveler.",
    "The cold is coming. You must learn to survive.",
    "Gather wood. Keep the fire burning.",
];

pub const ELDER_HAVEN_LINES: &[&str] = &[
    "The wind is worse in the Gap.",
    "Stockpile here. I will keep the fire.",
];

pub const BUILDER_GAP_LINES: &[&str] = &[
    "I made it ahead of you.",
    "It's brutal out here.",
    "Help me get these walls up, and we'll have a warm place to trade.",
];

pub const BUILDER_RIDGE_LINES: &[&str] = &[
    "Finish the shelter down in the Gap.",
    "Then we can talk trade.",
];

// ═══════════════════════════════════════════════════════════════════════
// ROSTER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, Default)]
pub struct NpcRoster {
    pub npcs: Vec<Npc>,
    next_id: u32,
}

impl NpcRoster {
    pub fn clear(&mut self) {
        self.npcs.clear();
    }

    pub fn spawn(&mut self, role: NpcRole, pos: Vec2) -> NpcId {
        let id = NpcId(self.next_id);
        self.next_id += 1;
        self.npcs.push(Npc::new(id, role, pos));
        id
    }

    pub fn get(&self, id: NpcId) -> Option<&Npc> {
        self.npcs.iter().find(|n| n.id == id)
    }

    pub fn get_mut(&mut self, id: NpcId) -> Option<&mut Npc> {
        self.npcs.iter_mut().find(|n| n.id == id)
    }

    pub fn remove(&mut self, id: NpcId) -> bool {
        let before = self.npcs.len();
        self.npcs.retain(|n| n.id != id);
        self.npcs.len() != before
    }

    /// Closest NPC with something to say within talking range of `point`.
    pub fn nearest_talkable(&self, point: Vec2) -> Option<&Npc> {
        self.npcs
            .iter()
            .filter(|n| !n.dialogue.is_empty() && n.pos.distance(point) < TALK_RADIUS)
            .min_by(|a, b| a.pos.distance(point).total_cmp(&b.pos.distance(point)))
    }

    /// Replaces the roster with the cast for `zone`.
    pub fn respawn_for_zone(&mut self, zone: ZoneId, run: &RunState, rng: &mut impl Rng) {
        self.clear();
        for (role, pos) in spawn_for_zone(zone, run, rng) {
            let id = self.spawn(role, pos);
            if let Some(npc) = self.get_mut(id) {
                npc.dialogue = dialogue_for(role, zone);
            }
        }
        debug!("[Npcs] Zone {} cast: {} npc(s)", zone, self.npcs.len());
    }
}

fn dialogue_for(role: NpcRole, zone: ZoneId) -> &'static [&'static str] {
    match (role, zone) {
        (NpcRole::Elder, HOMESTEAD) => ELDER_HOMESTEAD_LINES,
        (NpcRole::Elder, _) => ELDER_HAVEN_LINES,
        (NpcRole::Builder, BUILDERS_RIDGE) => BUILDER_RIDGE_LINES,
        (NpcRole::Builder, _) => BUILDER_GAP_LINES,
        (NpcRole::Drifter, _) => &[],
    }
}

/// Who appears in `zone` given the run's story progress.
pub fn spawn_for_zone(zone: ZoneId, run: &RunState, rng: &mut impl Rng) -> Vec<(NpcRole, Vec2)> {
    match zone {
        HOMESTEAD => vec![(NpcRole::Elder, Vec2::new(600.0, 300.0))],
        QUIET_WOODS if run.zone1_stabilized => vec![(NpcRole::Elder, Vec2::new(460.0, 310.0))],
        QUIET_WOODS => vec![(NpcRole::Drifter, random_edge_point(rng))],
        WIND_GAP if run.builder_location == WIND_GAP => {
            vec![(NpcRole::Builder, Vec2::new(150.0, 300.0))]
        }
        BUILDERS_RIDGE => vec![(NpcRole::Builder, Vec2::new(260.0, 250.0))],
        _ => Vec::new(),
    }
}

pub fn random_edge_point(rng: &mut impl Rng) -> Vec2 {
    let (w, h) = (LOGICAL_WIDTH as i32, LOGICAL_HEIGHT as i32);
    let (x, y) = match rng.gen_range(0..4) {
        0 => (rng.gen_range(100..=w - 100), 50),
        1 => (rng.gen_range(100..=w - 100), h - 100),
        2 => (50, rng.gen_range(100..=h - 100)),
        _ => (w - 100, rng.gen_range(100..=h - 100)),
    };
    Vec2::new(x as f32, y as f32)
}

// ═══════════════════════════════════════════════════════════════════════
// BEHAVIOUR
// ═══════════════════════════════════════════════════════════════════════

/// Steps `pos` toward `target` at `speed`. Returns the remaining distance.
pub fn step_toward(pos: &mut Vec2, target: Vec2, speed: f32, dt: f32) -> f32 {
    let diff = target - *pos;
    let dist = diff.length();
    if dist <= f32::EPSILON {
        return 0.0;
    }
    let step = (speed * dt).min(dist);
    *pos += diff / dist * step;
    dist - step
}

pub fn update_npc(
    npc: &mut Npc,
    dt: f32,
    env: &mut EnvironmentState,
    shack: &ShackProgress,
    rng: &mut impl Rng,
) {
    npc.cooldown -= dt;
    match npc.behaviour {
        NpcBehaviour::Saboteur => saboteur_behaviour(npc, dt, env, rng),
        NpcBehaviour::Keeper => keeper_behaviour(npc, dt, env, rng),
        NpcBehaviour::Builder => builder_behaviour(npc, dt, env, shack, rng),
    }
    npc.pos.x = npc.pos.x.clamp(50.0, 1200.0);
    npc.pos.y = npc.pos.y.clamp(50.0, 650.0);
}

fn saboteur_behaviour(npc: &mut Npc, dt: f32, env: &mut EnvironmentState, rng: &mut impl Rng) {
    let target_still_lit = npc
        .target_fire
        .and_then(|i| env.campfires.get(i))
        .is_some_and(|f| f.is_lit());
    if !target_still_lit {
        npc.target_fire = env
            .campfires
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_lit())
            .min_by(|(_, a), (_, b)| {
                a.center().distance(npc.pos).total_cmp(&b.center().distance(npc.pos))
            })
            .map(|(i, _)| i);
    }

    let Some(fire) = npc.target_fire.and_then(|i| env.campfires.get_mut(i)) else {
        wander(npc, dt, rng);
        return;
    };

    if fire.center().distance(npc.pos) > SABOTEUR_REACH {
        step_toward(&mut npc.pos, fire.center(), NPC_SPEED, dt);
    } else if npc.cooldown <= 0.0 {
        let stolen = SABOTEUR_THEFT.min(fire.fuel);
        fire.fuel -= stolen;
        debug!("[Npcs] Saboteur stole {:.1} fuel", stolen);
        npc.cooldown = SABOTEUR_COOLDOWN;
        npc.target_fire = None;
    }
}

fn keeper_behaviour(npc: &mut Npc, dt: f32, env: &mut EnvironmentState, rng: &mut impl Rng) {
    if npc.target_fire.and_then(|i| env.campfires.get(i)).is_none() {
        npc.target_fire = env.campfires.iter().position(|f| f.fuel < KEEPER_LOW_FUEL);
    }

    let Some(index) = npc.target_fire else {
        wander(npc, dt, rng);
        return;
    };
    let Some(fire) = env.campfires.get_mut(index) else {
        npc.target_fire = None;
        return;
    };

    if fire.center().distance(npc.pos) > KEEPER_REACH {
        step_toward(&mut npc.pos, fire.center(), NPC_SPEED, dt);
        return;
    }
    if npc.cooldown <= 0.0 && fire.fuel < KEEPER_LOW_FUEL {
        fire.fuel = (fire.fuel + KEEPER_REFILL).min(KEEPER_CAP);
        debug!("[Npcs] Keeper fed the fire to {:.1}", fire.fuel);
        npc.cooldown = KEEPER_COOLDOWN;
    }
    if fire.fuel >= KEEPER_LOW_FUEL {
        npc.target_fire = None;
    }
}

fn builder_behaviour(
    npc: &mut Npc,
    dt: f32,
    env: &EnvironmentState,
    shack: &ShackProgress,
    rng: &mut impl Rng,
) {
    let Some(site) = env.construction_site.as_ref() else {
        return;
    };
    if shack.logs == 0 || shack.is_complete() {
        npc.walk_target = None;
        return;
    }
    if npc.cooldown <= 0.0 {
        let r = site.rect();
        if rng.gen_bool(0.6) {
            npc.walk_target = Some(Vec2::new(
                rng.gen_range(r.min.x..=r.max.x),
                rng.gen_range(r.min.y..=r.max.y),
            ));
            npc.cooldown = 2.0;
        } else {
            npc.walk_target = None;
            npc.cooldown = 3.0;
        }
    }
    if let Some(target) = npc.walk_target {
        if step_toward(&mut npc.pos, target, NPC_SPEED, dt) < 5.0 {
            npc.walk_target = None;
        }
    }
}

fn wander(npc: &mut Npc, dt: f32, rng: &mut impl Rng) {
    npc.wander_timer -= dt;
    if npc.wander_timer <= 0.0 {
        let dir = Vec2::new(rng.gen_range(-1..=1) as f32, rng.gen_range(-1..=1) as f32);
        npc.wander_dir = dir.normalize_or_zero();
        npc.wander_timer = rng.gen_range(1.0..3.0);
    }
    npc.pos += npc.wander_dir * NPC_SPEED * 0.5 * dt;
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct NpcPlugin;

impl Plugin for NpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NpcRoster>()
            .init_resource::<DialogueState>()
            .add_systems(Update, update_npcs.in_set(SimSet::World));
    }
}

/// Normal NPC behaviour; suspended while the world is paused or a cutscene
/// has taken over the cast.
pub fn update_npcs(
    time: Res<Time>,
    settings: Res<GameSettings>,
    dialogue: Res<DialogueState>,
    shop: Res<ShopState>,
    redemption: Res<RedemptionSequence>,
    run: Res<RunState>,
    mut roster: ResMut<NpcRoster>,
    mut env: ResMut<EnvironmentState>,
    mut rng: ResMut<SimRng>,
) {
    if dialogue.is_open() || shop.open || redemption.is_running() {
        return;
    }
    let dt = time.delta_secs().min(settings.survival.max_frame_delta);
    let shack = run.shack_progress;
    for npc in roster.npcs.iter_mut() {
        update_npc(npc, dt, &mut env, &shack, &mut rng.0);
    }
}
