//! Fire Watchers library crate: the whole simulation as plugins.
//!
//! The binary crate (`main.rs`) adds windowing, input and presentation on
//! top of [`GameCorePlugin`]. Integration tests in `tests/` drive the core
//! headlessly without a window or GPU.

pub mod shared;
pub mod settings;
pub mod environment;
pub mod zones;
pub mod hazard;
pub mod npcs;
pub mod survival;
pub mod interaction;
pub mod player;
pub mod tutorial;
pub mod save;
pub mod input;
pub mod ui;

use bevy::prelude::*;

use shared::*;

/// Game state, shared resources and events, the frame phase order, and
/// every simulation plugin. Needs only `MinimalPlugins` + `StatesPlugin`.
pub struct GameCorePlugin;

impl Plugin for GameCorePlugin {
    fn build(&self, app: &mut App) {
        app
            // Game state
            .init_state::<GameState>()
            // Shared resources
            .init_resource::<PlayerState>()
            .init_resource::<PlayerInput>()
            .init_resource::<RunState>()
            .init_resource::<ShopState>()
            .init_resource::<SimRng>()
            .init_resource::<environment::EnvironmentState>()
            // Events
            .add_event::<ToastEvent>()
            .add_event::<PlaySfxEvent>()
            .add_event::<ZoneChangedEvent>()
            .add_event::<ZoneStabilizedEvent>()
            .add_event::<RedemptionStartEvent>()
            .add_event::<ColdSnapEvent>()
            .add_event::<PlayerDiedEvent>()
            .add_event::<BeaconLitEvent>()
            // Frame phases
            .configure_sets(
                Update,
                (
                    SimSet::Controls,
                    SimSet::Interaction,
                    SimSet::Survival,
                    SimSet::Hazard,
                    SimSet::World,
                    SimSet::Transition,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            // Domain plugins
            .add_plugins(settings::SettingsPlugin)
            .add_plugins(zones::ZonePlugin)
            .add_plugins(hazard::HazardPlugin)
            .add_plugins(npcs::NpcPlugin)
            .add_plugins(survival::SurvivalPlugin)
            .add_plugins(interaction::InteractionPlugin)
            .add_plugins(player::PlayerPlugin)
            .add_plugins(tutorial::TutorialPlugin)
            .add_plugins(save::SavePlugin);
    }
}
