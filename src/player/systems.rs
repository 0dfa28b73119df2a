//! Player camera spawning and collision-resolved movement.

use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::input::mouse::MouseMotion;
use bevy::post_process::bloom::{Bloom, BloomCompositeMode};
use bevy::prelude::*;
use bevy::render::view::Hdr;
use bevy::window::{CursorGrabMode, CursorOptions, WindowFocused};

use super::PlayerConfig;
use super::entities::{CursorRecentered, Player};
use crate::collision;
use crate::dungeon::entities::DungeonMap;
use crate::hex;

/// Spawns the player camera at the dungeon spawn point, or teleports the
/// existing one there after a regeneration.
pub fn spawn_or_respawn_player(
    mut commands: Commands,
    map: Option<Res<DungeonMap>>,
    cfg: Res<PlayerConfig>,
    mut existing: Query<&mut Transform, With<Player>>,
) {
    let Some(map) = map else { return };
    if !map.is_changed() {
        return;
    }
    let spawn = map.layout.spawn_point();
    let position = spawn.position + Vec3::Y * spawn.height;

    if let Ok(mut transform) = existing.single_mut() {
        transform.translation = position;
        return;
    }

    commands.spawn((
        Name::new("Player"),
        Camera3d::default(),
        Hdr,
        Tonemapping::TonyMcMapface,
        Bloom {
            intensity: cfg.bloom_intensity,
            composite_mode: BloomCompositeMode::Additive,
            ..Bloom::NATURAL
        },
        Transform::from_translation(position).looking_at(position + Vec3::Z, Vec3::Y),
        Player,
    ));
}

/// WASD + mouse look; the intended move is resolved against nearby walls
/// before it is applied.
pub fn walk(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    recentered: Res<CursorRecentered>,
    cfg: Res<PlayerConfig>,
    map: Option<Res<DungeonMap>>,
    mut query: Query<&mut Transform, With<Player>>,
) {
    let Some(map) = map else { return };
    let Ok(mut transform) = query.single_mut() else {
        return;
    };

    // Mouse look: yaw (horizontal) + pitch (vertical)
    let mut yaw = 0.0;
    let mut pitch = 0.0;
    if recentered.0 {
        for _ in mouse_motion.read() {}
    } else {
        for ev in mouse_motion.read() {
            yaw -= ev.delta.x * cfg.mouse_sensitivity_x;
            pitch -= ev.delta.y * cfg.mouse_sensitivity_y;
        }
    }
    if yaw != 0.0 {
        transform.rotate_y(yaw);
    }
    if pitch != 0.0 {
        let (_, current_pitch, _) = transform.rotation.to_euler(EulerRot::YXZ);
        let limit = std::f32::consts::FRAC_PI_2 - cfg.pitch_margin;
        let clamped = (current_pitch + pitch).clamp(-limit, limit);
        transform.rotate_local_x(clamped - current_pitch);
    }

    // WASD movement in the camera's forward/right plane (XZ only)
    let forward = transform.forward();
    let forward_xz = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
    let right = transform.right();
    let right_xz = Vec3::new(right.x, 0.0, right.z).normalize_or_zero();

    let mut direction = Vec3::ZERO;
    if keys.pressed(KeyCode::KeyW) {
        direction += forward_xz;
    }
    if keys.pressed(KeyCode::KeyS) {
        direction -= forward_xz;
    }
    if keys.pressed(KeyCode::KeyD) {
        direction += right_xz;
    }
    if keys.pressed(KeyCode::KeyA) {
        direction -= right_xz;
    }
    if direction == Vec3::ZERO {
        return;
    }

    let current = transform.translation;
    let intended = current + direction.normalize() * cfg.move_speed * time.delta_secs();
    let result = collision::check_wall_collision(current, intended, &map.layout);
    if result.collision {
        trace!("wall contact: {intended} corrected to {}", result.corrected);
    }
    transform.translation = result.corrected;
}

/// Debug overlay: draws the collision boxes of the player's tile and its
/// neighbors, the same candidate set movement resolution tests against.
pub fn debug_collision_boxes(
    map: Option<Res<DungeonMap>>,
    query: Query<&Transform, With<Player>>,
    mut gizmos: Gizmos,
) {
    let (Some(map), Ok(transform)) = (map, query.single()) else {
        return;
    };
    let center = hex::position_to_hex(transform.translation);
    for tile in map.layout.iter() {
        if tile.coord.distance(center) > 1 {
            continue;
        }
        for b in collision::collision_boxes_for_hex(tile, &map.layout) {
            let t = Transform::from_translation(b.center + Vec3::Y * (b.height / 2.0))
                .with_rotation(Quat::from_rotation_y(b.rotation))
                .with_scale(Vec3::new(b.width, b.height, b.depth));
            gizmos.cube(t, Color::srgb(1.0, 0.3, 0.2));
        }
    }
}

pub fn hide_cursor(mut q: Query<(&mut CursorOptions, &mut Window)>) {
    for (mut opts, mut window) in &mut q {
        opts.visible = false;
        opts.grab_mode = CursorGrabMode::Confined;
        let center = Vec2::new(window.width() / 2.0, window.height() / 2.0);
        window.set_cursor_position(Some(center));
    }
}

/// Warps cursor back to center when it drifts near a window edge or when
/// the window regains focus.
pub fn recenter_cursor(
    mut windows: Query<&mut Window>,
    mut focus_events: MessageReader<WindowFocused>,
    mut recentered: ResMut<CursorRecentered>,
    cfg: Res<PlayerConfig>,
) {
    recentered.0 = false;

    let gained_focus = focus_events.read().any(|ev| ev.focused);

    for mut window in &mut windows {
        let w = window.width();
        let h = window.height();
        let center = Vec2::new(w / 2.0, h / 2.0);

        if gained_focus {
            window.set_cursor_position(Some(center));
            recentered.0 = true;
            continue;
        }

        if let Some(pos) = window.cursor_position()
            && (pos.x < cfg.edge_margin
                || pos.x > w - cfg.edge_margin
                || pos.y < cfg.edge_margin
                || pos.y > h - cfg.edge_margin)
        {
            window.set_cursor_position(Some(center));
            recentered.0 = true;
        }
    }
}
