use bevy::prelude::*;
use crate::shared::*;

const MAX_TOASTS: usize = 3;
const FADE_SECS: f32 = 0.5;

// ═══════════════════════════════════════════════════════════════════════
// COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

/// Marker for the toast container node (top-center of screen).
#[derive(Component)]
pub struct ToastContainer;

/// One visible toast.
#[derive(Component)]
pub struct ToastItem {
    pub message: String,
    pub timer: Timer,
    pub fade_timer: Option<Timer>,
}

pub fn severity_color(severity: ToastSeverity) -> Color {
    match severity {
        ToastSeverity::Info => Color::srgb(0.92, 0.92, 0.92),
        ToastSeverity::Success => Color::srgb(0.55, 0.9, 0.55),
        ToastSeverity::Warning => Color::srgb(1.0, 0.82, 0.35),
        ToastSeverity::Danger => Color::srgb(1.0, 0.4, 0.35),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SPAWN CONTAINER
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_toast_container(mut commands: Commands) {
    commands.spawn((
        ToastContainer,
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(60.0),
            left: Val::Percent(50.0),
            width: Val::Px(480.0),
            margin: UiRect {
                left: Val::Px(-240.0),
                ..default()
            },
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(6.0),
            align_items: AlignItems::Center,
            ..default()
        },
        PickingBehavior::IGNORE,
    ));
}

// ═══════════════════════════════════════════════════════════════════════
// HANDLE TOAST EVENTS: one child node per distinct message
// ═══════════════════════════════════════════════════════════════════════

pub fn handle_toast_events(
    mut commands: Commands,
    mut events: EventReader<ToastEvent>,
    container_query: Query<Entity, With<ToastContainer>>,
    mut existing: Query<(Entity, &mut ToastItem)>,
) {
    let Ok(container) = container_query.get_single() else {
        events.clear();
        return;
    };

    let mut spawned: Vec<String> = Vec::new();
    for event in events.read() {
        // A repeated message refreshes the visible toast instead of stacking.
        if let Some((_, mut toast)) = existing.iter_mut().find(|(_, t)| t.message == event.message) {
            toast.timer = Timer::from_seconds(event.duration_secs, TimerMode::Once);
            toast.fade_timer = None;
            continue;
        }
        if spawned.contains(&event.message) {
            continue;
        }

        let visible = existing.iter().count() + spawned.len();
        if visible >= MAX_TOASTS {
            if let Some((oldest, _)) = existing.iter().next() {
                commands.entity(oldest).despawn_recursive();
            }
        }

        let toast_entity = commands
            .spawn((
                ToastItem {
                    message: event.message.clone(),
                    timer: Timer::from_seconds(event.duration_secs, TimerMode::Once),
                    fade_timer: None,
                },
                Node {
                    padding: UiRect::axes(Val::Px(12.0), Val::Px(5.0)),
                    border: UiRect::all(Val::Px(1.0)),
                    ..default()
                },
                BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.75)),
                BorderColor(severity_color(event.severity).with_alpha(0.6)),
                PickingBehavior::IGNORE,
            ))
            .with_children(|parent| {
                parent.spawn((
                    Text::new(event.message.clone()),
                    TextFont {
                        font_size: 16.0,
                        ..default()
                    },
                    TextColor(severity_color(event.severity)),
                    PickingBehavior::IGNORE,
                ));
            })
            .id();

        commands.entity(container).add_child(toast_entity);
        spawned.push(event.message.clone());
    }
}

// ═══════════════════════════════════════════════════════════════════════
// UPDATE TOASTS
// ═══════════════════════════════════════════════════════════════════════

pub fn update_toasts(
    mut commands: Commands,
    time: Res<Time>,
    mut toast_query: Query<(Entity, &mut ToastItem, &mut BackgroundColor, &Children)>,
    mut text_color_query: Query<&mut TextColor>,
) {
    for (entity, mut toast, mut bg_color, children) in &mut toast_query {
        let Some(fade) = toast.fade_timer.as_mut() else {
            toast.timer.tick(time.delta());
            if toast.timer.just_finished() {
                toast.fade_timer = Some(Timer::from_seconds(FADE_SECS, TimerMode::Once));
            }
            continue;
        };

        fade.tick(time.delta());
        if fade.finished() {
            commands.entity(entity).despawn_recursive();
            continue;
        }
        let alpha = 1.0 - fade.fraction();
        bg_color.0 = bg_color.0.with_alpha(0.75 * alpha);
        for &child in children.iter() {
            if let Ok(mut text_color) = text_color_query.get_mut(child) {
                text_color.0 = text_color.0.with_alpha(alpha);
            }
        }
    }
}
