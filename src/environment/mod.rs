//! Interactable props of the current zone: trees, fires, deadfall, sticks,
//! wind breaks, the shelter site and the haven stockpile.
//!
//! The whole `EnvironmentState` is rebuilt on every zone load; nothing here
//! survives a transition except what the zone loader copies into `RunState`.

use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;

pub mod placement;

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const TREE_HEALTH: u8 = 3;
pub const TREE_FELL_LOGS: u32 = 3;
pub const STUMP_TO_SAPLING_TICKS: u32 = 50;
pub const SAPLING_TO_FULL_TICKS: u32 = 100;
pub const STICK_DROP_CHANCE: f64 = 0.10;
/// Windfall stops once this many loose sticks per tree lie in the zone.
pub const LOOSE_STICKS_PER_TREE: usize = 3;

pub const DEADFALL_MAX_STICKS: u32 = 5;
pub const DEADFALL_REGROW_TICKS: u32 = 120;

pub const CAMPFIRE_START_FUEL: f32 = 30.0;
pub const CAMPFIRE_MAX_FUEL: f32 = 120.0;
pub const TUTORIAL_FIRE_FUEL: f32 = 100.0;
pub const HAVEN_FIRE_POS: Vec2 = Vec2::new(400.0, 350.0);

/// Distance from a fire's centre inside which the player warms up.
pub const FIRE_WARM_RADIUS: f32 = 200.0;
/// Horizontal reach of a wind break's lee side.
pub const SHELTER_DEPTH: f32 = 100.0;
pub const SHELTER_HALF_HEIGHT: f32 = 50.0;

// ═══════════════════════════════════════════════════════════════════════
// TREES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeState {
    Full,
    Stump,
    Sapling,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    /// Top-left of the 40×80 sprite.
    pub pos: Vec2,
    pub state: TreeState,
    pub health: u8,
    pub regrow_timer: u32,
}

impl Tree {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            state: TreeState::Full,
            health: TREE_HEALTH,
            regrow_timer: 0,
        }
    }

    pub fn rect(&self) -> Rect {
        rect_at(self.pos.x, self.pos.y, 40.0, 80.0)
    }

    /// Trunk area an axe swing must overlap.
    pub fn trunk_rect(&self) -> Rect {
        rect_at(self.pos.x + 10.0, self.pos.y + 40.0, 20.0, 40.0)
    }

    /// Base that blocks walking while the tree is standing.
    pub fn footprint(&self) -> Rect {
        rect_at(self.pos.x + 12.0, self.pos.y + 68.0, 16.0, 12.0)
    }

    pub fn blocks_movement(&self) -> bool {
        self.state != TreeState::Stump
    }

    /// One axe hit. Returns the base log drop (non-zero only when felled).
    pub fn take_damage(&mut self) -> u32 {
        if self.state != TreeState::Full {
            return 0;
        }
        self.health = self.health.saturating_sub(1);
        if self.health == 0 {
            self.state = TreeState::Stump;
            self.regrow_timer = 0;
            return TREE_FELL_LOGS;
        }
        0
    }

    /// One survival tick of regrowth: stump → sapling → full.
    pub fn advance_regrowth(&mut self) {
        match self.state {
            TreeState::Stump => {
                self.regrow_timer += 1;
                if self.regrow_timer >= STUMP_TO_SAPLING_TICKS {
                    self.state = TreeState::Sapling;
                    self.regrow_timer = 0;
                }
            }
            TreeState::Sapling => {
                self.regrow_timer += 1;
                if self.regrow_timer >= SAPLING_TO_FULL_TICKS {
                    self.state = TreeState::Full;
                    self.regrow_timer = 0;
                    self.health = TREE_HEALTH;
                }
            }
            TreeState::Full => {}
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FIRES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Campfire {
    /// Top-left of the 32×32 fire.
    pub pos: Vec2,
    pub fuel: f32,
    pub max_fuel: f32,
    /// The homestead fire never burns down.
    pub is_tutorial_fire: bool,
    /// The beacon on Builder's Ridge.
    pub is_signal_fire: bool,
}

impl Campfire {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            fuel: CAMPFIRE_START_FUEL,
            max_fuel: CAMPFIRE_MAX_FUEL,
            is_tutorial_fire: false,
            is_signal_fire: false,
        }
    }

    pub fn tutorial(pos: Vec2) -> Self {
        Self {
            fuel: TUTORIAL_FIRE_FUEL,
            is_tutorial_fire: true,
            ..Self::new(pos)
        }
    }

    pub fn signal(pos: Vec2) -> Self {
        Self {
            fuel: 0.0,
            is_signal_fire: true,
            ..Self::new(pos)
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(16.0)
    }

    /// Log box beside the fire; refuelling is measured from its centre.
    pub fn refuel_box(&self) -> Rect {
        rect_at(self.pos.x + 40.0, self.pos.y - 10.0, 42.0, 36.0)
    }

    pub fn is_lit(&self) -> bool {
        self.fuel > 0.0
    }

    pub fn add_fuel(&mut self, amount: f32) {
        self.fuel = (self.fuel + amount).min(self.max_fuel);
    }

    pub fn burn(&mut self, amount: f32) {
        if self.is_tutorial_fire {
            self.fuel = TUTORIAL_FIRE_FUEL;
            return;
        }
        self.fuel = (self.fuel - amount).max(0.0);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// OTHER PROPS
// ═══════════════════════════════════════════════════════════════════════

/// Shelter foundation in the Wind Gap, tied to the hub fire.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructionSite {
    pub pos: Vec2,
    /// Index into `EnvironmentState::campfires`.
    pub linked_fire: Option<usize>,
}

impl ConstructionSite {
    pub fn rect(&self) -> Rect {
        rect_at(self.pos.x, self.pos.y, 120.0, 80.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeadfallPile {
    /// Centre of the pile.
    pub pos: Vec2,
    pub sticks: u32,
    pub regrow_timer: u32,
}

impl DeadfallPile {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            sticks: DEADFALL_MAX_STICKS,
            regrow_timer: 0,
        }
    }

    pub fn take_stick(&mut self) -> bool {
        if self.sticks == 0 {
            return false;
        }
        self.sticks -= 1;
        true
    }

    pub fn advance_regrowth(&mut self) {
        if self.sticks >= DEADFALL_MAX_STICKS {
            return;
        }
        self.regrow_timer += 1;
        if self.regrow_timer >= DEADFALL_REGROW_TICKS {
            self.sticks += 1;
            self.regrow_timer = 0;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stick {
    pub pos: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindBreakRock {
    pub pos: Vec2,
}

impl WindBreakRock {
    pub fn rect(&self) -> Rect {
        rect_at(self.pos.x, self.pos.y, 80.0, 60.0)
    }

    /// Wind blows from the west, so the lee is a strip east of the rock's centre.
    pub fn shelters(&self, point: Vec2) -> bool {
        let c = self.rect().center();
        point.x > c.x && point.x < c.x + SHELTER_DEPTH && (point.y - c.y).abs() < SHELTER_HALF_HEIGHT
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stockpile {
    pub pos: Vec2,
}

impl Stockpile {
    pub fn rect(&self) -> Rect {
        rect_at(self.pos.x, self.pos.y, 64.0, 48.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ENVIRONMENT STATE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, Default)]
pub struct EnvironmentState {
    /// Zone this environment was built for; `None` before the first load.
    pub zone: Option<ZoneId>,
    pub trees: Vec<Tree>,
    pub campfires: Vec<Campfire>,
    pub construction_site: Option<ConstructionSite>,
    pub deadfalls: Vec<DeadfallPile>,
    pub sticks: Vec<Stick>,
    pub rocks: Vec<WindBreakRock>,
    pub stockpile: Option<Stockpile>,
}

impl EnvironmentState {
    pub fn spawn_campfire(&mut self, pos: Vec2) -> usize {
        self.campfires.push(Campfire::new(pos));
        self.campfires.len() - 1
    }

    pub fn linked_fire(&self) -> Option<&Campfire> {
        let index = self.construction_site.as_ref()?.linked_fire?;
        self.campfires.get(index)
    }

    pub fn linked_fire_mut(&mut self) -> Option<&mut Campfire> {
        let index = self.construction_site.as_ref()?.linked_fire?;
        self.campfires.get_mut(index)
    }

    /// True if some lit fire is close enough to warm `point`.
    pub fn is_warmed(&self, point: Vec2) -> bool {
        self.campfires
            .iter()
            .any(|fire| fire.is_lit() && fire.center().distance(point) < FIRE_WARM_RADIUS)
    }

    pub fn is_sheltered(&self, point: Vec2) -> bool {
        self.rocks.iter().any(|rock| rock.shelters(point))
    }

    /// Turns the Quiet Woods into a haven: one fixed, full fire and a stockpile.
    pub fn setup_haven(&mut self) {
        let mut fire = Campfire::new(HAVEN_FIRE_POS);
        fire.fuel = TUTORIAL_FIRE_FUEL;
        self.campfires = vec![fire];
        if let Some(site) = self.construction_site.as_mut() {
            site.linked_fire = None;
        }
        self.stockpile = Some(Stockpile {
            pos: HAVEN_FIRE_POS + Vec2::new(-100.0, 20.0),
        });
        info!("[Environment] Haven established at {:?}", HAVEN_FIRE_POS);
    }

    pub fn pin_fuel_to_max(&mut self) {
        for fire in &mut self.campfires {
            fire.fuel = fire.max_fuel;
        }
    }

    pub fn burn_fuel(&mut self, amount: f32) {
        for fire in &mut self.campfires {
            fire.burn(amount);
        }
    }

    /// One tick of regrowth for trees and deadfall, plus windfall sticks
    /// under standing trees.
    pub fn advance_regrowth(&mut self, rng: &mut impl Rng) {
        let room = (self.trees.len() * LOOSE_STICKS_PER_TREE).saturating_sub(self.sticks.len());
        let mut dropped = Vec::new();
        for tree in &mut self.trees {
            tree.advance_regrowth();
            if tree.state == TreeState::Full
                && rng.gen_bool(STICK_DROP_CHANCE)
                && dropped.len() < room
            {
                let rect = tree.rect();
                dropped.push(Stick {
                    pos: Vec2::new(
                        rect.center().x + rng.gen_range(-40..=40) as f32,
                        rect.max.y + rng.gen_range(5..=25) as f32,
                    ),
                });
            }
        }
        self.sticks.extend(dropped);

        for pile in &mut self.deadfalls {
            pile.advance_regrowth();
        }
    }
}
