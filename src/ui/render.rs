//! Flat-colour presentation of the simulation. Sprites are rebuilt from the
//! plain-data world state; nothing here feeds back into gameplay.

use bevy::prelude::*;
use rand::Rng;

use crate::environment::{EnvironmentState, TreeState};
use crate::npcs::{NpcRole, NpcRoster};
use crate::shared::*;
use crate::zones::WeatherPreset;

const NPC_SIZE: Vec2 = Vec2::new(48.0, 72.0);
const MAX_SNOWFLAKES: usize = 400;
/// Weather presets are tuned in pixels per 60 Hz frame.
const PRESET_FRAME_RATE: f32 = 60.0;

#[derive(Component)]
pub struct PropSprite;

#[derive(Component)]
pub struct ActorSprite;

#[derive(Component)]
pub struct Snowflake {
    pub velocity: Vec2,
}

/// Converts a top-left position in screen-like world coordinates (+y down)
/// to the centre of a Bevy sprite (+y up, origin at screen centre).
pub fn world_to_screen(top_left: Vec2, size: Vec2) -> Vec2 {
    let center = top_left + size / 2.0;
    Vec2::new(center.x - LOGICAL_WIDTH / 2.0, LOGICAL_HEIGHT / 2.0 - center.y)
}

fn rect_sprite(rect: Rect, color: Color, z: f32) -> (Sprite, Transform) {
    let size = rect.size();
    (
        Sprite::from_color(color, size),
        Transform::from_translation(world_to_screen(rect.min, size).extend(z)),
    )
}

/// Deeper props are drawn in front, so trunks overlap the player correctly.
fn depth(bottom_y: f32) -> f32 {
    1.0 + bottom_y / LOGICAL_HEIGHT
}

fn background(zone: Option<ZoneId>) -> Color {
    match zone {
        Some(QUIET_WOODS) => Color::srgb(0.82, 0.86, 0.9),
        Some(WIND_GAP) => Color::srgb(0.7, 0.76, 0.84),
        Some(BUILDERS_RIDGE) => Color::srgb(0.74, 0.74, 0.8),
        _ => Color::srgb(0.88, 0.9, 0.93),
    }
}

pub fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Respawns the zone's props whenever the environment changes.
pub fn sync_prop_sprites(
    mut commands: Commands,
    env: Res<EnvironmentState>,
    run: Res<RunState>,
    mut clear_color: ResMut<ClearColor>,
    existing: Query<Entity, With<PropSprite>>,
) {
    if !env.is_changed() {
        return;
    }
    for entity in &existing {
        commands.entity(entity).despawn();
    }
    clear_color.0 = background(env.zone);

    for tree in &env.trees {
        let rect = tree.rect();
        let (rect, color) = match tree.state {
            TreeState::Full => (rect, Color::srgb(0.16, 0.36, 0.2)),
            TreeState::Sapling => (
                rect_at(rect.min.x + 10.0, rect.max.y - 40.0, 20.0, 40.0),
                Color::srgb(0.35, 0.55, 0.3),
            ),
            TreeState::Stump => (
                rect_at(rect.min.x + 8.0, rect.max.y - 16.0, 24.0, 16.0),
                Color::srgb(0.42, 0.3, 0.18),
            ),
        };
        commands.spawn((PropSprite, rect_sprite(rect, color, depth(rect.max.y))));
    }

    for fire in &env.campfires {
        let heat = (fire.fuel / fire.max_fuel).clamp(0.0, 1.0);
        let color = if fire.is_signal_fire && !fire.is_lit() {
            Color::srgb(0.3, 0.3, 0.32)
        } else if fire.is_lit() {
            Color::srgb(1.0, 0.35 + 0.45 * heat, 0.1)
        } else {
            Color::srgb(0.25, 0.22, 0.2)
        };
        let rect = rect_at(fire.pos.x, fire.pos.y, 32.0, 32.0);
        commands.spawn((PropSprite, rect_sprite(rect, color, depth(rect.max.y))));
        let log_box = fire.refuel_box();
        commands.spawn((
            PropSprite,
            rect_sprite(log_box, Color::srgba(0.45, 0.3, 0.15, 0.6), depth(log_box.max.y)),
        ));
    }

    if let Some(site) = &env.construction_site {
        let shade = 0.25 + 0.15 * f32::from(run.shack_progress.state);
        let rect = site.rect();
        commands.spawn((
            PropSprite,
            rect_sprite(rect, Color::srgb(shade, shade * 0.8, shade * 0.6), 0.5),
        ));
    }

    for pile in env.deadfalls.iter().filter(|p| p.sticks > 0) {
        let rect = Rect::from_center_size(pile.pos, Vec2::new(30.0, 16.0));
        commands.spawn((
            PropSprite,
            rect_sprite(rect, Color::srgb(0.5, 0.38, 0.25), depth(rect.max.y)),
        ));
    }

    for stick in &env.sticks {
        let rect = rect_at(stick.pos.x, stick.pos.y, 12.0, 4.0);
        commands.spawn((
            PropSprite,
            rect_sprite(rect, Color::srgb(0.45, 0.32, 0.2), depth(rect.max.y)),
        ));
    }

    for rock in &env.rocks {
        let rect = rock.rect();
        commands.spawn((
            PropSprite,
            rect_sprite(rect, Color::srgb(0.45, 0.47, 0.5), depth(rect.max.y)),
        ));
    }

    if let Some(stockpile) = &env.stockpile {
        let rect = stockpile.rect();
        commands.spawn((
            PropSprite,
            rect_sprite(rect, Color::srgb(0.55, 0.4, 0.22), depth(rect.max.y)),
        ));
    }
}

/// Player and NPC sprites, refreshed every frame.
pub fn sync_actor_sprites(
    mut commands: Commands,
    player: Res<PlayerState>,
    roster: Res<NpcRoster>,
    existing: Query<Entity, With<ActorSprite>>,
) {
    for entity in &existing {
        commands.entity(entity).despawn();
    }

    let body = rect_at(player.pos.x, player.pos.y, PLAYER_WIDTH, PLAYER_HEIGHT);
    let player_color = match player.active_tool {
        Tool::Torch => Color::srgb(0.75, 0.25, 0.2),
        Tool::Axe => Color::srgb(0.25, 0.35, 0.7),
    };
    commands.spawn((ActorSprite, rect_sprite(body, player_color, depth(body.max.y))));

    for npc in &roster.npcs {
        let rect = rect_at(npc.pos.x, npc.pos.y, NPC_SIZE.x, NPC_SIZE.y);
        let color = match npc.role {
            NpcRole::Elder => Color::srgb(0.6, 0.55, 0.45),
            NpcRole::Builder => Color::srgb(0.7, 0.5, 0.2),
            NpcRole::Drifter => Color::srgb(0.3, 0.3, 0.35),
        };
        commands.spawn((ActorSprite, rect_sprite(rect, color, depth(rect.max.y))));
    }
}

/// Cosmetic snowfall driven by the zone's weather preset.
pub fn update_snowfall(
    mut commands: Commands,
    time: Res<Time>,
    weather: Res<WeatherPreset>,
    mut flakes: Query<(Entity, &Snowflake, &mut Transform)>,
) {
    let dt = time.delta_secs();
    let half = Vec2::new(LOGICAL_WIDTH, LOGICAL_HEIGHT) / 2.0;
    let mut alive = 0;
    for (entity, flake, mut transform) in &mut flakes {
        transform.translation += (flake.velocity * dt).extend(0.0);
        let p = transform.translation.truncate();
        if p.y < -half.y || p.x < -half.x - 20.0 || p.x > half.x + 20.0 {
            commands.entity(entity).despawn();
        } else {
            alive += 1;
        }
    }

    let mut rng = rand::thread_rng();
    let room = MAX_SNOWFLAKES.saturating_sub(alive);
    for _ in 0..(weather.spawn_rate as usize).min(room) {
        let size = rng.gen_range(2.0..4.0);
        let velocity = Vec2::new(
            weather.drift_x + rng.gen_range(-0.5..0.5),
            -weather.fall_speed * rng.gen_range(0.7..1.3),
        ) * PRESET_FRAME_RATE;
        let x = rng.gen_range(-half.x..half.x + 100.0);
        commands.spawn((
            Snowflake { velocity },
            Sprite::from_color(Color::srgba(1.0, 1.0, 1.0, 0.8), Vec2::splat(size)),
            Transform::from_xyz(x, half.y, 5.0),
        ));
    }
}
