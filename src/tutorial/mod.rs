//! Homestead tutorial: move, equip the axe, chop, equip the torch, stoke
//! the fire, leave. The stoke step is advanced by the refuel resolver.

use bevy::prelude::*;

use crate::shared::*;

pub const TUTORIAL_WALK_DISTANCE: f32 = 100.0;

pub struct TutorialPlugin;

impl Plugin for TutorialPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, advance_tutorial.in_set(SimSet::World));
    }
}

/// On-screen prompt for the step the player is on.
pub fn prompt(step: u8) -> &'static str {
    match step {
        0 => "Use WASD to move.",
        1 => "Press TAB to equip the axe.",
        2 => "Hold SPACE at a tree to chop.",
        3 => "Press TAB to equip the torch.",
        4 => "Hold SPACE at the fire to stoke it.",
        _ => "Walk to the right edge to leave.",
    }
}

/// Checks the condition for the current step. Returns the new step if it
/// advanced.
pub fn check_step(run: &mut RunState, player: &PlayerState) -> Option<u8> {
    if run.tutorial_completed || run.current_zone_id != HOMESTEAD {
        return None;
    }
    let done = match run.tutorial_step {
        0 => run.distance_moved >= TUTORIAL_WALK_DISTANCE,
        1 => player.active_tool == Tool::Axe,
        2 => run.inventory.logs >= 1,
        3 => player.active_tool == Tool::Torch,
        _ => false,
    };
    if !done {
        return None;
    }
    run.tutorial_step += 1;
    Some(run.tutorial_step)
}

pub fn advance_tutorial(
    player: Res<PlayerState>,
    mut run: ResMut<RunState>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    if let Some(step) = check_step(&mut run, &player) {
        info!("[Tutorial] Step {}", step);
        toast_writer.send(ToastEvent::new(prompt(step), 4.0, ToastSeverity::Info));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_follow_in_order() {
        let mut run = RunState::default();
        let mut player = PlayerState::default();
        assert_eq!(check_step(&mut run, &player), None);

        run.distance_moved = 100.0;
        assert_eq!(check_step(&mut run, &player), Some(1));
        player.active_tool = Tool::Axe;
        assert_eq!(check_step(&mut run, &player), Some(2));
        assert_eq!(check_step(&mut run, &player), None, "needs a log first");
        run.inventory.logs = 1;
        assert_eq!(check_step(&mut run, &player), Some(3));
        player.active_tool = Tool::Torch;
        assert_eq!(check_step(&mut run, &player), Some(4));
        assert_eq!(check_step(&mut run, &player), None, "stoking is handled elsewhere");
    }

    #[test]
    fn only_runs_in_the_homestead() {
        let mut run = RunState {
            current_zone_id: QUIET_WOODS,
            distance_moved: 500.0,
            ..Default::default()
        };
        assert_eq!(check_step(&mut run, &PlayerState::default()), None);
        assert_eq!(run.tutorial_step, 0);
    }
}
