use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use fire_watchers::shared::{LOGICAL_HEIGHT, LOGICAL_WIDTH};
use fire_watchers::{input, ui, GameCorePlugin};

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Fire Watchers".into(),
                        resolution: WindowResolution::new(LOGICAL_WIDTH, LOGICAL_HEIGHT),
                        present_mode: PresentMode::AutoVsync,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        .add_plugins(GameCorePlugin)
        .add_plugins(input::InputPlugin)
        .add_plugins(ui::UiPlugin)
        .run();
}
