//! Shared type contract for Fire Watchers.
//!
//! Every domain plugin imports from here. Types that more than one domain
//! reads or writes live in this module; domain-private state stays in the
//! owning plugin.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE
// ═══════════════════════════════════════════════════════════════════════

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    Paused,
    GameOver,
    Victory,
}

/// Frame phases of the simulation, run in this order while Playing.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    /// Movement and tool swap.
    Controls,
    /// Held actions, pickups, the interact key.
    Interaction,
    /// Survival ticks, then the death check.
    Survival,
    /// Cold Snap countdowns and the Redemption cutscene.
    Hazard,
    /// NPC behaviour, tutorial, stabilization.
    World,
    /// Edge crossings and zone reloads.
    Transition,
}

// ═══════════════════════════════════════════════════════════════════════
// ZONES
// ═══════════════════════════════════════════════════════════════════════

pub type ZoneId = u8;

pub const HOMESTEAD: ZoneId = 0;
pub const QUIET_WOODS: ZoneId = 1;
pub const WIND_GAP: ZoneId = 2;
pub const BUILDERS_RIDGE: ZoneId = 3;

// ═══════════════════════════════════════════════════════════════════════
// PLAYER
// ═══════════════════════════════════════════════════════════════════════

/// World coordinates are screen-like: +x right, +y down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    pub fn from_motion(motion: Vec2) -> Option<Self> {
        if motion == Vec2::ZERO {
            return None;
        }
        if motion.y.abs() > motion.x.abs() {
            Some(if motion.y > 0.0 { Facing::Down } else { Facing::Up })
        } else {
            Some(if motion.x > 0.0 { Facing::Right } else { Facing::Left })
        }
    }

    pub fn offset(self) -> Vec2 {
        match self {
            Facing::Up => Vec2::new(0.0, -1.0),
            Facing::Down => Vec2::new(0.0, 1.0),
            Facing::Left => Vec2::new(-1.0, 0.0),
            Facing::Right => Vec2::new(1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Tool {
    #[default]
    Torch,
    Axe,
}

impl Tool {
    pub fn swapped(self) -> Self {
        match self {
            Tool::Torch => Tool::Axe,
            Tool::Axe => Tool::Torch,
        }
    }
}

/// Avatar state that is not part of the persisted run record
/// (position is persisted separately by the save module).
#[derive(Resource, Debug, Clone)]
pub struct PlayerState {
    /// Top-left of the 72×96 avatar sprite.
    pub pos: Vec2,
    pub facing: Facing,
    pub active_tool: Tool,
    pub is_moving: bool,
    /// Consecutive action ticks spent kindling a new fire.
    pub ignite_progress: u8,
    pub tool_cooldown: f32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            pos: PLAYER_SPAWN,
            facing: Facing::Down,
            active_tool: Tool::Torch,
            is_moving: false,
            ignite_progress: 0,
            tool_cooldown: 0.0,
        }
    }
}

impl PlayerState {
    /// Centre of the avatar's body, used for distance checks against props.
    pub fn body_center(&self) -> Vec2 {
        self.pos + Vec2::new(36.0, 48.0)
    }

    /// 32×32 interaction square projected 16px in front of the body centre.
    pub fn target_hitbox(&self) -> Rect {
        let center = self.body_center();
        let reach = INTERACT_DISTANCE + INTERACT_SIZE / 2.0;
        let box_center = center + self.facing.offset() * reach;
        Rect::from_center_size(box_center, Vec2::splat(INTERACT_SIZE))
    }

    /// Collision footprint at the avatar's feet.
    pub fn feet_rect(&self) -> Rect {
        Self::feet_rect_at(self.pos)
    }

    pub fn feet_rect_at(pos: Vec2) -> Rect {
        rect_at(pos.x + 20.0, pos.y + 70.0, 32.0, 16.0)
    }
}

/// Per-frame gameplay intents produced by the input module.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerInput {
    pub move_axis: Vec2,
    /// Chop / kindle / refuel. Held, not edge-triggered.
    pub action_held: bool,
    pub interact: bool,
    pub swap_tool: bool,
    pub shop_choice: Option<ShopItem>,
    pub pause: bool,
    pub quicksave: bool,
    pub quickload: bool,
    pub new_game: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// RUN STATE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Inventory {
    pub logs: u32,
    pub sticks: u32,
}

/// Shelter build progress in the Wind Gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ShackProgress {
    pub logs: u32,
    pub sticks: u32,
    /// 0 = not started, 1 = foundation, 2 = framing, 3 = complete.
    pub state: u8,
}

impl ShackProgress {
    pub fn state_for_logs(logs: u32) -> u8 {
        if logs < SHACK_FRAMING_LOGS {
            1
        } else if logs < SHACK_COMPLETE_LOGS {
            2
        } else {
            3
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state >= 3
    }

    pub fn add_log(&mut self) {
        self.logs += 1;
        self.state = Self::state_for_logs(self.logs);
    }
}

/// The persisted progress record for one run.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunState {
    pub body_temperature: f32,
    pub inventory: Inventory,
    pub tick_count: u64,
    pub current_zone_id: ZoneId,
    pub is_alive: bool,
    pub is_sheltered: bool,
    pub total_logs_gathered: u64,

    pub logs_deposited_zone1: u32,
    pub logs_deposited_zone2: u32,
    pub logs_deposited_zone3: u32,

    pub zone1_stabilized: bool,
    pub zone1_resources_depleted: bool,
    pub zone2_redeemed: bool,
    pub beacon_lit: bool,

    pub shack_progress: ShackProgress,
    pub log_stash: u32,
    pub zone2_hub_fire_fuel: f32,
    pub builder_location: ZoneId,

    pub axe_upgrade: bool,
    pub fur_lining: bool,
    pub deep_pockets: bool,

    pub time_in_current_zone: f32,
    pub tutorial_step: u8,
    pub tutorial_completed: bool,
    pub distance_moved: f32,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            body_temperature: MAX_BODY_TEMP,
            inventory: Inventory::default(),
            tick_count: 0,
            current_zone_id: HOMESTEAD,
            is_alive: true,
            is_sheltered: false,
            total_logs_gathered: 0,
            logs_deposited_zone1: 0,
            logs_deposited_zone2: 0,
            logs_deposited_zone3: 0,
            zone1_stabilized: false,
            zone1_resources_depleted: false,
            zone2_redeemed: false,
            beacon_lit: false,
            shack_progress: ShackProgress::default(),
            log_stash: 0,
            zone2_hub_fire_fuel: 0.0,
            builder_location: QUIET_WOODS,
            axe_upgrade: false,
            fur_lining: false,
            deep_pockets: false,
            time_in_current_zone: 0.0,
            tutorial_step: 0,
            tutorial_completed: false,
            distance_moved: 0.0,
        }
    }
}

impl RunState {
    pub fn log_capacity(&self) -> u32 {
        MAX_LOG_SLOTS + if self.deep_pockets { DEEP_POCKETS_BONUS } else { 0 }
    }

    /// The stabilized Quiet Woods never gets cold and its fires never go out.
    pub fn in_haven(&self) -> bool {
        self.current_zone_id == QUIET_WOODS && self.zone1_stabilized
    }

    pub fn logs_full(&self) -> bool {
        self.inventory.logs >= self.log_capacity()
    }

    /// Adds up to `count` logs, clamped to capacity. Returns how many fit.
    pub fn add_logs(&mut self, count: u32) -> u32 {
        let room = self.log_capacity().saturating_sub(self.inventory.logs);
        let added = count.min(room);
        self.inventory.logs += added;
        self.total_logs_gathered += u64::from(added);
        added
    }

    pub fn remove_logs(&mut self, count: u32) -> bool {
        if self.inventory.logs >= count {
            self.inventory.logs -= count;
            true
        } else {
            false
        }
    }

    pub fn add_stick(&mut self) -> bool {
        if self.inventory.sticks >= MAX_STICKS {
            return false;
        }
        self.inventory.sticks += 1;
        true
    }

    /// Counts a Quiet Woods refuel. True only on the deposit that stabilizes the zone.
    pub fn deposit_log_zone_1(&mut self) -> bool {
        self.logs_deposited_zone1 += 1;
        if self.logs_deposited_zone1 >= ZONE1_STABILIZE_DEPOSITS && !self.zone1_stabilized {
            self.zone1_stabilized = true;
            return true;
        }
        false
    }

    /// Counts a Wind Gap refuel. True whenever the redemption could begin.
    pub fn deposit_log_zone_2(&mut self) -> bool {
        self.logs_deposited_zone2 += 1;
        self.logs_deposited_zone2 >= ZONE2_REDEMPTION_DEPOSITS && !self.zone2_redeemed
    }

    /// Counts a beacon refuel. True only on the deposit that lights the beacon.
    pub fn deposit_log_zone_3(&mut self) -> bool {
        self.logs_deposited_zone3 += 1;
        if self.logs_deposited_zone3 >= ZONE3_BEACON_DEPOSITS && !self.beacon_lit {
            self.beacon_lit = true;
            return true;
        }
        false
    }

    /// Applies a temperature change inside the documented bounds.
    /// Returns true if this change killed the player.
    pub fn apply_temperature_delta(&mut self, delta: f32) -> bool {
        self.body_temperature = (self.body_temperature + delta).clamp(MIN_BODY_TEMP, MAX_BODY_TEMP);
        if self.body_temperature <= 0.0 && self.is_alive {
            self.is_alive = false;
            return true;
        }
        false
    }
}

/// Seeded RNG for tick rolls, NPC spawns and loot chances.
#[derive(Resource)]
pub struct SimRng(pub StdRng);

impl Default for SimRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TIMING
// ═══════════════════════════════════════════════════════════════════════

/// Fixed-interval accumulator. Consumes whole intervals and keeps the
/// remainder so cadence survives uneven frame times.
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    pub elapsed: f32,
}

impl FixedStep {
    /// Adds `delta` seconds and returns how many intervals are now due.
    pub fn accumulate(&mut self, delta: f32, interval: f32) -> u32 {
        self.elapsed += delta;
        let mut due = 0;
        while self.elapsed >= interval {
            self.elapsed -= interval;
            due += 1;
        }
        due
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SHOP
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShopItem {
    SharpAxe,
    FurLining,
    DeepPockets,
}

impl ShopItem {
    pub const ALL: [ShopItem; 3] = [ShopItem::SharpAxe, ShopItem::FurLining, ShopItem::DeepPockets];

    pub fn cost(self) -> u32 {
        match self {
            ShopItem::SharpAxe => 50,
            ShopItem::FurLining => 30,
            ShopItem::DeepPockets => 40,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShopItem::SharpAxe => "Sharp Axe",
            ShopItem::FurLining => "Fur Lining",
            ShopItem::DeepPockets => "Deep Pockets",
        }
    }
}

/// Whether the Builder's trade window is open.
#[derive(Resource, Debug, Clone, Default)]
pub struct ShopState {
    pub open: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastSeverity {
    #[default]
    Info,
    Success,
    Warning,
    Danger,
}

/// Notification sink consumed by the UI.
#[derive(Event, Debug, Clone)]
pub struct ToastEvent {
    pub message: String,
    pub duration_secs: f32,
    pub severity: ToastSeverity,
}

impl ToastEvent {
    pub fn new(message: impl Into<String>, duration_secs: f32, severity: ToastSeverity) -> Self {
        Self {
            message: message.into(),
            duration_secs,
            severity,
        }
    }
}

/// Named sound-effect trigger for the audio collaborator.
#[derive(Event, Debug, Clone)]
pub struct PlaySfxEvent {
    pub sfx_id: String,
}

impl PlaySfxEvent {
    pub fn new(sfx_id: &str) -> Self {
        Self {
            sfx_id: sfx_id.to_string(),
        }
    }
}

/// Fired after a zone has been entered and its environment rebuilt.
#[derive(Event, Debug, Clone)]
pub struct ZoneChangedEvent {
    pub from: ZoneId,
    pub to: ZoneId,
}

/// Fired once per zone when it becomes a permanent haven.
#[derive(Event, Debug, Clone)]
pub struct ZoneStabilizedEvent {
    pub zone: ZoneId,
}

/// Raised by the interaction resolver when the Wind Gap quota is met.
#[derive(Event, Debug, Clone)]
pub struct RedemptionStartEvent;

/// Cold Snap onset (the warning has elapsed).
#[derive(Event, Debug, Clone)]
pub struct ColdSnapEvent;

#[derive(Event, Debug, Clone)]
pub struct PlayerDiedEvent {
    pub tick: u64,
}

/// The beacon on Builder's Ridge has been lit; the run is won.
#[derive(Event, Debug, Clone)]
pub struct BeaconLitEvent;

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const LOGICAL_WIDTH: f32 = 1280.0;
pub const LOGICAL_HEIGHT: f32 = 720.0;

pub const PLAYER_SPAWN: Vec2 = Vec2::new(400.0, 300.0);
pub const PLAYER_SPEED: f32 = 180.0;
pub const PLAYER_WIDTH: f32 = 72.0;
pub const PLAYER_HEIGHT: f32 = 96.0;
pub const INTERACT_SIZE: f32 = 32.0;
pub const INTERACT_DISTANCE: f32 = 16.0;
pub const TOOL_SWAP_COOLDOWN: f32 = 0.4;

pub const MAX_BODY_TEMP: f32 = 37.0;
pub const MIN_BODY_TEMP: f32 = -32.0;

pub const MAX_LOG_SLOTS: u32 = 10;
pub const MAX_STICKS: u32 = 10;
pub const DEEP_POCKETS_BONUS: u32 = 2;

pub const ZONE1_STABILIZE_DEPOSITS: u32 = 20;
pub const ZONE2_REDEMPTION_DEPOSITS: u32 = 30;
pub const ZONE3_BEACON_DEPOSITS: u32 = 50;

pub const SHACK_FRAMING_LOGS: u32 = 10;
pub const SHACK_COMPLETE_LOGS: u32 = 30;

pub fn rect_at(x: f32, y: f32, w: f32, h: f32) -> Rect {
    Rect::new(x, y, x + w, y + h)
}

/// Strict overlap: rectangles that only share an edge do not collide.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    !a.intersect(b).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shack_state_thresholds() {
        assert_eq!(ShackProgress::state_for_logs(0), 1);
        assert_eq!(ShackProgress::state_for_logs(9), 1);
        assert_eq!(ShackProgress::state_for_logs(10), 2);
        assert_eq!(ShackProgress::state_for_logs(29), 2);
        assert_eq!(ShackProgress::state_for_logs(30), 3);
    }

    #[test]
    fn add_logs_respects_deep_pockets() {
        let mut run = RunState::default();
        assert_eq!(run.add_logs(15), MAX_LOG_SLOTS);
        run.deep_pockets = true;
        assert_eq!(run.add_logs(5), DEEP_POCKETS_BONUS);
        assert_eq!(run.inventory.logs, MAX_LOG_SLOTS + DEEP_POCKETS_BONUS);
        assert_eq!(run.total_logs_gathered, u64::from(MAX_LOG_SLOTS + DEEP_POCKETS_BONUS));
    }

    #[test]
    fn zone1_stabilizes_exactly_once() {
        let mut run = RunState::default();
        run.logs_deposited_zone1 = 19;
        assert!(run.deposit_log_zone_1(), "20th deposit should stabilize");
        assert!(run.zone1_stabilized);
        assert!(!run.deposit_log_zone_1(), "later deposits never re-trigger");
        assert_eq!(run.logs_deposited_zone1, 21);
    }

    #[test]
    fn temperature_clamps_and_kills_once() {
        let mut run = RunState::default();
        assert!(!run.apply_temperature_delta(10.0));
        assert!((run.body_temperature - MAX_BODY_TEMP).abs() < f32::EPSILON);
        assert!(run.apply_temperature_delta(-40.0));
        assert!(!run.is_alive);
        assert!(!run.apply_temperature_delta(-40.0), "death fires only once");
        assert!((run.body_temperature - MIN_BODY_TEMP).abs() < f32::EPSILON);
    }

    #[test]
    fn fixed_step_keeps_remainder() {
        let mut step = FixedStep::default();
        assert_eq!(step.accumulate(1.0, 1.2), 0);
        assert_eq!(step.accumulate(0.5, 1.2), 1);
        assert!((step.elapsed - 0.3).abs() < 1e-5);
        assert_eq!(step.accumulate(2.5, 1.2), 2, "catch-up consumes every whole interval");
    }

    #[test]
    fn hitbox_sits_in_front_of_player() {
        let mut player = PlayerState::default();
        player.facing = Facing::Down;
        let hit = player.target_hitbox();
        let center = player.body_center();
        assert!((hit.min.y - (center.y + INTERACT_DISTANCE)).abs() < f32::EPSILON);
        assert!((hit.width() - INTERACT_SIZE).abs() < f32::EPSILON);

        player.facing = Facing::Left;
        let hit = player.target_hitbox();
        assert!((hit.max.x - (center.x - INTERACT_DISTANCE)).abs() < f32::EPSILON);
    }
}
