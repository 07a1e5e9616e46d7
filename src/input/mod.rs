use bevy::prelude::*;

use crate::npcs::dialogue::DialogueState;
use crate::shared::*;

/// Rebindable keys. Arrow keys always move as well.
#[derive(Resource, Debug, Clone)]
pub struct KeyBindings {
    pub move_up: KeyCode,
    pub move_down: KeyCode,
    pub move_left: KeyCode,
    pub move_right: KeyCode,
    pub action: KeyCode,
    pub interact: KeyCode,
    pub swap_tool: KeyCode,
    pub pause: KeyCode,
    pub new_game: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_up: KeyCode::KeyW,
            move_down: KeyCode::KeyS,
            move_left: KeyCode::KeyA,
            move_right: KeyCode::KeyD,
            action: KeyCode::Space,
            interact: KeyCode::KeyE,
            swap_tool: KeyCode::Tab,
            pause: KeyCode::Escape,
            new_game: KeyCode::KeyN,
        }
    }
}

/// Which set of actions the keyboard currently drives.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputContext {
    #[default]
    Disabled,
    Gameplay,
    Dialogue,
    Shop,
    Paused,
    RunOver,
}

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<KeyBindings>()
            .init_resource::<InputContext>()
            .add_systems(
                PreUpdate,
                (manage_input_context, reset_and_read_input).chain(),
            );
    }
}

/// The single point where hardware input becomes game actions.
fn reset_and_read_input(
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    bindings: Res<KeyBindings>,
    context: Res<InputContext>,
    mut input: ResMut<PlayerInput>,
) {
    *input = PlayerInput::default();

    match *context {
        InputContext::Disabled => {}

        InputContext::Gameplay => {
            let mut axis = Vec2::ZERO;
            if keys.pressed(bindings.move_up) || keys.pressed(KeyCode::ArrowUp) {
                axis.y -= 1.0;
            }
            if keys.pressed(bindings.move_down) || keys.pressed(KeyCode::ArrowDown) {
                axis.y += 1.0;
            }
            if keys.pressed(bindings.move_left) || keys.pressed(KeyCode::ArrowLeft) {
                axis.x -= 1.0;
            }
            if keys.pressed(bindings.move_right) || keys.pressed(KeyCode::ArrowRight) {
                axis.x += 1.0;
            }
            input.move_axis = axis.normalize_or_zero();

            input.action_held = keys.pressed(bindings.action) || mouse.pressed(MouseButton::Left);
            input.interact = keys.just_pressed(bindings.interact);
            input.swap_tool = keys.just_pressed(bindings.swap_tool);
            input.pause = keys.just_pressed(bindings.pause);

            input.quicksave = keys.just_pressed(KeyCode::F5);
            input.quickload = keys.just_pressed(KeyCode::F9);
        }

        InputContext::Dialogue => {
            input.interact =
                keys.just_pressed(bindings.interact) || keys.just_pressed(KeyCode::Space);
        }

        InputContext::Shop => {
            for (key, item) in [KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3]
                .into_iter()
                .zip(ShopItem::ALL)
            {
                if keys.just_pressed(key) {
                    input.shop_choice = Some(item);
                    break;
                }
            }
            input.interact =
                keys.just_pressed(bindings.interact) || keys.just_pressed(bindings.pause);
        }

        InputContext::Paused => {
            input.pause = keys.just_pressed(bindings.pause);
            input.quicksave = keys.just_pressed(KeyCode::F5);
            input.quickload = keys.just_pressed(KeyCode::F9);
            input.new_game = keys.just_pressed(bindings.new_game);
        }

        InputContext::RunOver => {
            input.quickload = keys.just_pressed(KeyCode::F9);
            input.new_game = keys.just_pressed(bindings.new_game);
        }
    }
}

/// Derives the input context from the game state and open overlays.
fn manage_input_context(
    game_state: Res<State<GameState>>,
    dialogue: Res<DialogueState>,
    shop: Res<ShopState>,
    mut context: ResMut<InputContext>,
) {
    *context = match *game_state.get() {
        GameState::Loading => InputContext::Disabled,
        GameState::Playing if dialogue.is_open() => InputContext::Dialogue,
        GameState::Playing if shop.open => InputContext::Shop,
        GameState::Playing => InputContext::Gameplay,
        GameState::Paused => InputContext::Paused,
        GameState::GameOver | GameState::Victory => InputContext::RunOver,
    };
}
