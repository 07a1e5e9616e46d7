use bevy::prelude::*;

use crate::environment::Tree;
use crate::shared::*;

/// Result of one movement step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub pos: Vec2,
    pub moved: f32,
}

/// Moves from `pos` by `delta`, one axis at a time, so the player slides
/// along a trunk instead of sticking to it.
pub fn step_with_collision(pos: Vec2, delta: Vec2, trees: &[Tree]) -> Step {
    let blocked = |candidate: Vec2| {
        let feet = PlayerState::feet_rect_at(candidate);
        trees
            .iter()
            .any(|tree| tree.blocks_movement() && rects_overlap(tree.footprint(), feet))
    };

    let mut next = pos;
    let try_x = Vec2::new(next.x + delta.x, next.y);
    if !blocked(try_x) {
        next = try_x;
    }
    let try_y = Vec2::new(next.x, next.y + delta.y);
    if !blocked(try_y) {
        next = try_y;
    }
    Step {
        pos: next,
        moved: next.distance(pos),
    }
}

/// Horizontal range the player may occupy in the current zone.
pub fn horizontal_bounds(run: &RunState) -> (f32, f32) {
    if run.current_zone_id == QUIET_WOODS && !run.zone1_stabilized {
        (0.0, 1128.0)
    } else {
        (-80.0, LOGICAL_WIDTH + 80.0)
    }
}

pub fn clamp_to_zone(pos: Vec2, run: &RunState) -> Vec2 {
    let (min_x, max_x) = horizontal_bounds(run);
    Vec2::new(
        pos.x.clamp(min_x, max_x),
        pos.y.clamp(0.0, LOGICAL_HEIGHT - PLAYER_HEIGHT),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slides_along_a_trunk() {
        let tree = Tree::new(Vec2::new(100.0, 100.0));
        // Footprint spans x 112..128, y 168..180. Feet are pos + (20, 70).
        let start = Vec2::new(58.0, 100.0);
        let step = step_with_collision(start, Vec2::new(10.0, 5.0), &[tree]);
        assert!((step.pos.x - 58.0).abs() < f32::EPSILON, "x is blocked");
        assert!((step.pos.y - 105.0).abs() < f32::EPSILON, "y still moves");
    }

    #[test]
    fn stumps_do_not_block() {
        let mut tree = Tree::new(Vec2::new(100.0, 100.0));
        tree.state = crate::environment::TreeState::Stump;
        let step = step_with_collision(Vec2::new(58.0, 100.0), Vec2::new(10.0, 0.0), &[tree]);
        assert!((step.moved - 10.0).abs() < 1e-4);
    }

    #[test]
    fn unstabilized_woods_hold_the_player_in() {
        let mut run = RunState {
            current_zone_id: QUIET_WOODS,
            ..Default::default()
        };
        assert_eq!(clamp_to_zone(Vec2::new(1300.0, -5.0), &run), Vec2::new(1128.0, 0.0));
        run.zone1_stabilized = true;
        assert_eq!(clamp_to_zone(Vec2::new(1300.0, 700.0), &run), Vec2::new(1300.0, 624.0));
    }
}
