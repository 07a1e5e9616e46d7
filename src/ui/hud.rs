use bevy::prelude::*;

use crate::hazard::{EventManager, HazardPhase};
use crate::interaction::shop::owned;
use crate::npcs::dialogue::DialogueState;
use crate::shared::*;
use crate::tutorial;
use crate::zones::{ZoneGoal, ZoneRegistry};

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
pub struct HudRoot;

/// Temperature, inventory and tool, top-left.
#[derive(Component)]
pub struct HudStatusText;

/// Zone name and goal progress, top-right.
#[derive(Component)]
pub struct HudGoalText;

/// Cold Snap countdown, or the tutorial prompt when calm.
#[derive(Component)]
pub struct HudHintText;

#[derive(Component)]
pub struct DialoguePanel;

#[derive(Component)]
pub struct DialogueText;

#[derive(Component)]
pub struct ShopPanel;

#[derive(Component)]
pub struct ShopText;

/// Full-screen banner for pause and end of run.
#[derive(Component)]
pub struct OverlayPanel;

#[derive(Component)]
pub struct OverlayText;

// ═══════════════════════════════════════════════════════════════════════
// TEXT BUILDERS
// ═══════════════════════════════════════════════════════════════════════

pub fn status_text(run: &RunState, player: &PlayerState) -> String {
    let tool = match player.active_tool {
        Tool::Torch => "TORCH",
        Tool::Axe => "AXE",
    };
    let mut text = format!(
        "TEMP {:.1}  LOGS {}/{}  STICKS {}/{}  {}",
        run.body_temperature,
        run.inventory.logs,
        run.log_capacity(),
        run.inventory.sticks,
        MAX_STICKS,
        tool
    );
    if run.log_stash > 0 || run.in_haven() {
        text.push_str(&format!("  STASH {}", run.log_stash));
    }
    text
}

pub fn goal_text(run: &RunState, zones: &ZoneRegistry) -> String {
    let Some(zone) = zones.get(run.current_zone_id) else {
        return String::new();
    };
    let progress = match zone.goal {
        ZoneGoal::Tutorial => None,
        ZoneGoal::Stabilize { .. } if run.zone1_stabilized => Some("HAVEN".to_string()),
        ZoneGoal::Stabilize { deposits } => {
            Some(format!("FIRE {}/{}", run.logs_deposited_zone1, deposits))
        }
        ZoneGoal::BuildShelter { .. } if run.zone2_redeemed => Some("STABILIZED".to_string()),
        ZoneGoal::BuildShelter { deposits } => Some(format!(
            "SHELTER {}/{}  FIRE {}/{}",
            run.shack_progress.logs.min(SHACK_COMPLETE_LOGS),
            SHACK_COMPLETE_LOGS,
            run.logs_deposited_zone2.min(deposits),
            deposits
        )),
        ZoneGoal::LightBeacon { .. } if run.beacon_lit => Some("BEACON LIT".to_string()),
        ZoneGoal::LightBeacon { deposits } => {
            Some(format!("BEACON {}/{}", run.logs_deposited_zone3, deposits))
        }
    };
    match progress {
        Some(progress) => format!("{}  {}", zone.name.to_uppercase(), progress),
        None => zone.name.to_uppercase(),
    }
}

pub fn hazard_text(hazard: &EventManager) -> Option<String> {
    match hazard.phase {
        HazardPhase::Idle => None,
        HazardPhase::Warning { remaining } => {
            Some(format!("THE WIND IS RISING ({:.0}s)", remaining.max(0.0)))
        }
        HazardPhase::Active { remaining } => Some(format!("COLD SNAP ({:.0}s)", remaining.max(0.0))),
    }
}

pub fn shop_text(run: &RunState) -> String {
    let mut lines = vec![format!("THE BUILDER'S TRADE  (stash: {} logs)", run.log_stash)];
    for (i, item) in ShopItem::ALL.iter().enumerate() {
        let status = if owned(run, *item) { "  [OWNED]" } else { "" };
        lines.push(format!("{}. {} - {} logs{}", i + 1, item.label(), item.cost(), status));
    }
    lines.push("E to leave".to_string());
    lines.join("\n")
}

fn overlay_text(state: GameState, run: &RunState) -> Option<String> {
    match state {
        GameState::Paused => Some("PAUSED\n\nESC resume   F5 save   F9 load   N new game".to_string()),
        GameState::GameOver => Some(format!(
            "YOU FROZE\n\n{} ticks survived, {} logs gathered\n\nN new game   F9 load",
            run.tick_count, run.total_logs_gathered
        )),
        GameState::Victory => Some(format!(
            "THE BEACON IS LIT\n\n{} ticks, {} logs gathered\n\nN new game",
            run.tick_count, run.total_logs_gathered
        )),
        GameState::Loading | GameState::Playing => None,
    }
}

fn temperature_color(temperature: f32) -> Color {
    if temperature < 10.0 {
        Color::srgb(1.0, 0.35, 0.3)
    } else if temperature < 25.0 {
        Color::srgb(1.0, 0.75, 0.35)
    } else {
        Color::WHITE
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SPAWN HUD
// ═══════════════════════════════════════════════════════════════════════

fn label(text: &str, size: f32) -> (Text, TextFont, TextColor, PickingBehavior) {
    (
        Text::new(text),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(Color::WHITE),
        PickingBehavior::IGNORE,
    )
}

pub fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            HudRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::SpaceBetween,
                ..default()
            },
            PickingBehavior::IGNORE,
        ))
        .with_children(|parent| {
            // ─── TOP BAR ───
            parent
                .spawn((
                    Node {
                        width: Val::Percent(100.0),
                        flex_direction: FlexDirection::Column,
                        padding: UiRect::axes(Val::Px(12.0), Val::Px(6.0)),
                        row_gap: Val::Px(4.0),
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
                    PickingBehavior::IGNORE,
                ))
                .with_children(|top| {
                    top.spawn((
                        Node {
                            flex_direction: FlexDirection::Row,
                            justify_content: JustifyContent::SpaceBetween,
                            ..default()
                        },
                        PickingBehavior::IGNORE,
                    ))
                    .with_children(|row| {
                        row.spawn((HudStatusText, label("", 18.0)));
                        row.spawn((HudGoalText, label("", 18.0)));
                    });
                    top.spawn((HudHintText, label("", 16.0)));
                });

            // ─── BOTTOM PANELS ───
            parent
                .spawn((
                    Node {
                        width: Val::Percent(100.0),
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        padding: UiRect::all(Val::Px(16.0)),
                        row_gap: Val::Px(8.0),
                        ..default()
                    },
                    PickingBehavior::IGNORE,
                ))
                .with_children(|bottom| {
                    bottom
                        .spawn((
                            ShopPanel,
                            Node {
                                padding: UiRect::all(Val::Px(12.0)),
                                border: UiRect::all(Val::Px(2.0)),
                                ..default()
                            },
                            BackgroundColor(Color::srgba(0.08, 0.06, 0.04, 0.9)),
                            BorderColor(Color::srgb(0.6, 0.45, 0.25)),
                            Visibility::Hidden,
                        ))
                        .with_children(|panel| {
                            panel.spawn((ShopText, label("", 18.0)));
                        });
                    bottom
                        .spawn((
                            DialoguePanel,
                            Node {
                                width: Val::Px(760.0),
                                padding: UiRect::all(Val::Px(14.0)),
                                border: UiRect::all(Val::Px(2.0)),
                                ..default()
                            },
                            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.85)),
                            BorderColor(Color::srgb(0.8, 0.8, 0.8)),
                            Visibility::Hidden,
                        ))
                        .with_children(|panel| {
                            panel.spawn((DialogueText, label("", 20.0)));
                        });
                });
        });

    // ─── OVERLAY ───
    commands
        .spawn((
            OverlayPanel,
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
            Visibility::Hidden,
            PickingBehavior::IGNORE,
        ))
        .with_children(|parent| {
            parent.spawn((
                OverlayText,
                label("", 28.0),
                TextLayout::new_with_justify(JustifyText::Center),
            ));
        });
}

// ═══════════════════════════════════════════════════════════════════════
// UPDATE SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub fn update_status_text(
    run: Res<RunState>,
    player: Res<PlayerState>,
    mut query: Query<(&mut Text, &mut TextColor), With<HudStatusText>>,
) {
    for (mut text, mut color) in &mut query {
        text.0 = status_text(&run, &player);
        color.0 = temperature_color(run.body_temperature);
    }
}

pub fn update_goal_text(
    run: Res<RunState>,
    zones: Res<ZoneRegistry>,
    mut query: Query<&mut Text, With<HudGoalText>>,
) {
    for mut text in &mut query {
        text.0 = goal_text(&run, &zones);
    }
}

pub fn update_hazard_text(
    run: Res<RunState>,
    hazard: Res<EventManager>,
    mut query: Query<(&mut Text, &mut TextColor), With<HudHintText>>,
) {
    let (hint, color) = match hazard_text(&hazard) {
        Some(text) => (text, Color::srgb(0.6, 0.8, 1.0)),
        None if run.current_zone_id == HOMESTEAD && !run.tutorial_completed => (
            tutorial::prompt(run.tutorial_step).to_string(),
            Color::srgb(0.9, 0.9, 0.7),
        ),
        None => (String::new(), Color::WHITE),
    };
    for (mut text, mut text_color) in &mut query {
        text.0 = hint.clone();
        text_color.0 = color;
    }
}

pub fn update_dialogue_panel(
    dialogue: Res<DialogueState>,
    mut panels: Query<&mut Visibility, With<DialoguePanel>>,
    mut texts: Query<&mut Text, With<DialogueText>>,
) {
    let line = dialogue.current_line();
    for mut visibility in &mut panels {
        *visibility = if line.is_some() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
    if let Some(line) = line {
        for mut text in &mut texts {
            text.0 = format!("{}\n\n[E] continue", line);
        }
    }
}

pub fn update_shop_panel(
    run: Res<RunState>,
    shop: Res<ShopState>,
    mut panels: Query<&mut Visibility, With<ShopPanel>>,
    mut texts: Query<&mut Text, With<ShopText>>,
) {
    for mut visibility in &mut panels {
        *visibility = if shop.open {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
    if shop.open {
        for mut text in &mut texts {
            text.0 = shop_text(&run);
        }
    }
}

pub fn update_overlay(
    state: Res<State<GameState>>,
    run: Res<RunState>,
    mut panels: Query<&mut Visibility, With<OverlayPanel>>,
    mut texts: Query<&mut Text, With<OverlayText>>,
) {
    let banner = overlay_text(*state.get(), &run);
    for mut visibility in &mut panels {
        *visibility = if banner.is_some() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
    if let Some(banner) = banner {
        for mut text in &mut texts {
            text.0 = banner.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_shows_capacity_and_stash_in_haven() {
        let mut run = RunState {
            deep_pockets: true,
            ..Default::default()
        };
        run.inventory.logs = 3;
        let player = PlayerState::default();
        let text = status_text(&run, &player);
        assert!(text.contains("LOGS 3/12"), "{text}");
        assert!(!text.contains("STASH"));

        run.current_zone_id = QUIET_WOODS;
        run.zone1_stabilized = true;
        assert!(status_text(&run, &player).contains("STASH 0"));
    }

    #[test]
    fn goal_tracks_zone_progress() {
        let zones = ZoneRegistry::default();
        let mut run = RunState {
            current_zone_id: QUIET_WOODS,
            logs_deposited_zone1: 7,
            ..Default::default()
        };
        assert_eq!(goal_text(&run, &zones), "THE QUIET WOODS  FIRE 7/20");
        run.zone1_stabilized = true;
        assert_eq!(goal_text(&run, &zones), "THE QUIET WOODS  HAVEN");
        run.current_zone_id = HOMESTEAD;
        assert_eq!(goal_text(&run, &zones), "THE HOMESTEAD");
        run.current_zone_id = 9;
        assert_eq!(goal_text(&run, &zones), "");
    }

    #[test]
    fn hazard_line_follows_phase() {
        let mut hazard = EventManager::default();
        assert_eq!(hazard_text(&hazard), None);
        hazard.phase = HazardPhase::Active { remaining: 11.6 };
        assert_eq!(hazard_text(&hazard).as_deref(), Some("COLD SNAP (12s)"));
    }

    #[test]
    fn shop_marks_owned_items() {
        let run = RunState {
            fur_lining: true,
            log_stash: 45,
            ..Default::default()
        };
        let text = shop_text(&run);
        assert!(text.contains("stash: 45 logs"));
        assert!(text.contains("2. Fur Lining - 30 logs  [OWNED]"));
        assert!(text.contains("1. Sharp Axe - 50 logs\n"));
    }

    #[test]
    fn overlay_only_off_the_playing_field() {
        let run = RunState::default();
        assert!(overlay_text(GameState::Playing, &run).is_none());
        assert!(overlay_text(GameState::GameOver, &run)
            .is_some_and(|t| t.starts_with("YOU FROZE")));
        assert!(overlay_text(GameState::Paused, &run).is_some());
    }
}
