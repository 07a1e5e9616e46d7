//! Deterministic prop placement for each zone.
//!
//! Layouts derive from the world seed and the zone id, so revisiting a zone
//! produces the same woods. Guaranteed fixtures (tutorial fire, wind breaks,
//! the Wind Gap hub, the beacon) are placed first; random trees then top the
//! zone up to its resource count.

use bevy::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;

use super::*;
use crate::zones::ZoneData;

/// Rejection-sampling budget per tree.
const MAX_PLACEMENT_ATTEMPTS: usize = 200;

pub const TUTORIAL_FIRE_POS: Vec2 = Vec2::new(550.0, 320.0);
pub const BEACON_POS: Vec2 = Vec2::new(LOGICAL_WIDTH / 2.0, 120.0);
pub const HUB_FIRE_POS: Vec2 = Vec2::new(LOGICAL_WIDTH / 2.0, LOGICAL_HEIGHT / 2.0);

const WIND_GAP_ROCKS: [(f32, f32); 5] = [
    (300.0, 150.0),
    (600.0, 150.0),
    (900.0, 150.0),
    (600.0, 500.0),
    (900.0, 500.0),
];

pub fn zone_seed(world_seed: u64, zone: ZoneId) -> u64 {
    world_seed.wrapping_add(zone as u64 * 7919 + 42)
}

/// Builds a fresh environment for `zone`. `safe_pos` is kept clear of trees
/// so the player never spawns inside a trunk.
pub fn load_zone(zone: &ZoneData, safe_pos: Vec2, world_seed: u64) -> EnvironmentState {
    let mut rng = StdRng::seed_from_u64(zone_seed(world_seed, zone.id));
    let mut env = EnvironmentState {
        zone: Some(zone.id),
        ..Default::default()
    };

    match zone.id {
        HOMESTEAD => {
            for _ in 0..5 {
                place_tree(&mut env, &mut rng, |rng| {
                    let p = Vec2::new(rng.gen_range(200..=500) as f32, rng.gen_range(150..=450) as f32);
                    (p.distance(safe_pos) > 100.0).then_some(p)
                });
            }
            env.campfires.push(Campfire::tutorial(TUTORIAL_FIRE_POS));
        }
        QUIET_WOODS => {
            let grove = Vec2::new(400.0, 300.0);
            for _ in 0..15 {
                place_tree(&mut env, &mut rng, |rng| {
                    let p = Vec2::new(
                        rng.gen_range(100..=(LOGICAL_WIDTH as i32 - 200)) as f32,
                        rng.gen_range(100..=(LOGICAL_HEIGHT as i32 - 200)) as f32,
                    );
                    let from_grove = p.distance(grove);
                    (from_grove > 120.0 && from_grove < 450.0 && p.distance(safe_pos) > 100.0)
                        .then_some(p)
                });
            }
        }
        WIND_GAP => {
            for _ in 0..12 {
                let p = random_field_point(&mut rng);
                env.trees.push(Tree::new(p));
            }
            for _ in 0..5 {
                let p = Vec2::new(
                    rng.gen_range(100..=300) as f32,
                    rng.gen_range(100..=(LOGICAL_HEIGHT as i32 - 100)) as f32,
                );
                env.deadfalls.push(DeadfallPile::new(p));
            }
            env.rocks = WIND_GAP_ROCKS
                .iter()
                .map(|&(x, y)| WindBreakRock { pos: Vec2::new(x, y) })
                .collect();

            let hub = env.spawn_campfire(HUB_FIRE_POS);
            env.construction_site = Some(ConstructionSite {
                pos: HUB_FIRE_POS - Vec2::new(0.0, 120.0),
                linked_fire: Some(hub),
            });
        }
        BUILDERS_RIDGE => {
            let workshop = Vec2::new(200.0, 250.0);
            for _ in 0..8 {
                let p = random_field_point(&mut rng);
                if p.distance(workshop) > 120.0 {
                    env.trees.push(Tree::new(p));
                }
            }
            env.campfires.push(Campfire::signal(BEACON_POS));
        }
        other => {
            warn!("[Environment] No fixtures defined for zone {}", other);
        }
    }

    let clearing = Vec2::new(400.0, 300.0);
    while env.trees.len() < zone.resource_count {
        let placed = place_tree(&mut env, &mut rng, |rng| {
            let p = random_field_point(rng);
            let clear_of_center = (p.x - clearing.x).abs() > 80.0 && (p.y - clearing.y).abs() > 80.0;
            (clear_of_center && p.distance(safe_pos) > 80.0).then_some(p)
        });
        if !placed {
            warn!(
                "[Environment] Gave up topping up zone {} at {} trees",
                zone.id,
                env.trees.len()
            );
            break;
        }
    }

    env
}

fn random_field_point(rng: &mut StdRng) -> Vec2 {
    Vec2::new(
        rng.gen_range(50..=(LOGICAL_WIDTH as i32 - 100)) as f32,
        rng.gen_range(50..=(LOGICAL_HEIGHT as i32 - 100)) as f32,
    )
}

/// Samples candidates until `accept` yields a position or the budget runs out.
fn place_tree(
    env: &mut EnvironmentState,
    rng: &mut StdRng,
    mut accept: impl FnMut(&mut StdRng) -> Option<Vec2>,
) -> bool {
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        if let Some(pos) = accept(rng) {
            env.trees.push(Tree::new(pos));
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zones::ZoneRegistry;

    fn zone(id: ZoneId) -> ZoneData {
        ZoneRegistry::default().get(id).cloned().unwrap()
    }

    #[test]
    fn same_seed_same_layout() {
        let a = load_zone(&zone(QUIET_WOODS), PLAYER_SPAWN, 99);
        let b = load_zone(&zone(QUIET_WOODS), PLAYER_SPAWN, 99);
        assert_eq!(a.trees, b.trees);
        let c = load_zone(&zone(QUIET_WOODS), PLAYER_SPAWN, 100);
        assert_ne!(a.trees, c.trees, "a different world seed reshuffles the woods");
    }

    #[test]
    fn every_zone_reaches_its_resource_count() {
        for id in 0..4 {
            let data = zone(id);
            let env = load_zone(&data, PLAYER_SPAWN, 1);
            assert!(env.trees.len() >= data.resource_count, "zone {} is short of trees", id);
            assert_eq!(env.zone, Some(id));
        }
    }

    #[test]
    fn homestead_has_one_permanent_fire() {
        let env = load_zone(&zone(HOMESTEAD), PLAYER_SPAWN, 1);
        assert_eq!(env.campfires.len(), 1);
        assert!(env.campfires[0].is_tutorial_fire);
        for tree in env.trees.iter().take(5) {
            assert!(tree.pos.distance(PLAYER_SPAWN) > 100.0);
        }
    }

    #[test]
    fn wind_gap_hub_is_linked() {
        let env = load_zone(&zone(WIND_GAP), Vec2::new(20.0, 300.0), 1);
        assert_eq!(env.rocks.len(), 5);
        assert_eq!(env.deadfalls.len(), 5);
        let site = env.construction_site.as_ref().expect("hub site");
        assert_eq!(site.linked_fire, Some(0));
        let fire = env.linked_fire().expect("linked fire");
        assert_eq!(fire.pos, HUB_FIRE_POS);
        assert!((site.pos.y - (HUB_FIRE_POS.y - 120.0)).abs() < f32::EPSILON);
    }

    #[test]
    fn ridge_hosts_an_unlit_beacon() {
        let env = load_zone(&zone(BUILDERS_RIDGE), Vec2::new(640.0, 660.0), 1);
        assert_eq!(env.campfires.len(), 1);
        assert!(env.campfires[0].is_signal_fire);
        assert!(!env.campfires[0].is_lit());
    }
}
