mod movement;

pub use movement::{clamp_to_zone, horizontal_bounds, step_with_collision, Step};

use bevy::prelude::*;

use crate::environment::EnvironmentState;
use crate::hazard::RedemptionSequence;
use crate::npcs::dialogue::DialogueState;
use crate::settings::GameSettings;
use crate::shared::*;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (swap_tool, player_movement).chain().in_set(SimSet::Controls),
        );
    }
}

/// Tab swaps torch and axe, with a short cooldown against key repeat.
pub fn swap_tool(
    time: Res<Time>,
    input: Res<PlayerInput>,
    mut player: ResMut<PlayerState>,
    mut sfx_writer: EventWriter<PlaySfxEvent>,
) {
    if player.tool_cooldown > 0.0 {
        player.tool_cooldown -= time.delta_secs();
    }
    if !input.swap_tool || player.tool_cooldown > 0.0 {
        return;
    }
    player.active_tool = player.active_tool.swapped();
    player.tool_cooldown = TOOL_SWAP_COOLDOWN;
    player.ignite_progress = 0;
    sfx_writer.send(PlaySfxEvent::new("swap"));
    debug!("[Player] Switched to {:?}", player.active_tool);
}

/// Walks the avatar, blocked by standing trees and held inside the zone.
/// Holding an action roots the player in place.
pub fn player_movement(
    time: Res<Time>,
    settings: Res<GameSettings>,
    input: Res<PlayerInput>,
    dialogue: Res<DialogueState>,
    shop: Res<ShopState>,
    redemption: Res<RedemptionSequence>,
    env: Res<EnvironmentState>,
    mut run: ResMut<RunState>,
    mut player: ResMut<PlayerState>,
) {
    player.is_moving = false;
    let frozen = !run.is_alive || dialogue.is_open() || shop.open || redemption.is_running();
    if frozen || input.action_held || input.move_axis == Vec2::ZERO {
        return;
    }

    let dt = time.delta_secs().min(settings.survival.max_frame_delta);
    let delta = input.move_axis.normalize_or_zero() * PLAYER_SPEED * dt;
    let step = step_with_collision(player.pos, delta, &env.trees);

    if let Some(facing) = Facing::from_motion(delta) {
        player.facing = facing;
    }
    player.pos = clamp_to_zone(step.pos, &run);
    player.is_moving = step.moved > 0.0;
    run.distance_moved += step.moved;
}
