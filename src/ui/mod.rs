mod audio;
mod hud;
mod render;
mod toast;

pub use hud::{goal_text, hazard_text, shop_text, status_text};
pub use render::world_to_screen;

use bevy::prelude::*;
use crate::shared::*;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        // ─── CAMERA + WORLD SPRITES ───
        app.add_systems(Startup, render::setup_camera);
        app.add_systems(
            Update,
            (
                render::sync_prop_sprites,
                render::sync_actor_sprites,
                render::update_snowfall,
            )
                .chain()
                .run_if(not(in_state(GameState::Loading))),
        );

        // ─── HUD (spawned once) ───
        app.add_systems(Startup, hud::spawn_hud);
        app.add_systems(
            Update,
            (
                hud::update_status_text,
                hud::update_goal_text,
                hud::update_hazard_text,
                hud::update_dialogue_panel,
                hud::update_shop_panel,
                hud::update_overlay,
            )
                .run_if(not(in_state(GameState::Loading))),
        );

        // ─── PAUSE ───
        app.add_systems(
            Update,
            toggle_pause.run_if(in_state(GameState::Playing).or(in_state(GameState::Paused))),
        );

        // ─── TOASTS ───
        app.add_systems(Startup, toast::spawn_toast_container);
        app.add_systems(Update, (toast::handle_toast_events, toast::update_toasts).chain());

        // ─── AUDIO ───
        app.add_systems(Update, audio::handle_play_sfx);
    }
}

/// Escape toggles between Playing and Paused.
fn toggle_pause(
    input: Res<PlayerInput>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !input.pause {
        return;
    }
    match state.get() {
        GameState::Playing => next_state.set(GameState::Paused),
        GameState::Paused => next_state.set(GameState::Playing),
        _ => {}
    }
}
