//! Spawns cuboid meshes for wall and doorway segments.

use bevy::prelude::*;

use super::{SegmentKind, WallCache, WallMesh, WallSegment, build_wall_segments};
use crate::collision::{DOORWAY_POST_OFFSET, DOORWAY_POST_WIDTH};
use crate::dungeon::entities::{DungeonMap, DungeonMaterials};
use crate::hex::HEX_SIZE;

/// Render thickness of wall cuboids.
const WALL_THICKNESS: f32 = 1.0;

/// Rebuilds the segment cache and respawns wall meshes when the dungeon
/// version changes.
pub fn sync_wall_meshes(
    mut commands: Commands,
    map: Option<Res<DungeonMap>>,
    materials: Option<Res<DungeonMaterials>>,
    cache: Option<Res<WallCache>>,
    mut meshes: ResMut<Assets<Mesh>>,
    old_walls: Query<(Entity, &WallMesh)>,
) {
    let (Some(map), Some(materials)) = (map, materials) else {
        return;
    };
    let version = map.layout.version();
    if cache.is_some_and(|c| c.version == version) {
        return;
    }

    for (entity, old) in &old_walls {
        trace!("despawning stale segment {}", old.segment_id);
        commands.entity(entity).despawn();
    }

    let geometry = build_wall_segments(&map.layout);
    for segment in &geometry.walls {
        spawn_wall_cuboid(
            &mut commands,
            &mut meshes,
            segment,
            segment.position,
            segment.width,
            materials.wall.clone(),
        );
    }
    for segment in &geometry.doorways {
        // Two framed posts; the central 40% of the edge stays open.
        let axis = Quat::from_rotation_y(segment.rotation) * Vec3::X;
        let along = axis * (HEX_SIZE * DOORWAY_POST_OFFSET);
        for post_center in [segment.position - along, segment.position + along] {
            spawn_wall_cuboid(
                &mut commands,
                &mut meshes,
                segment,
                post_center,
                HEX_SIZE * DOORWAY_POST_WIDTH,
                materials.doorway.clone(),
            );
        }
    }

    commands.insert_resource(WallCache { version, geometry });
}

/// Debug overlay: draws each cached segment's edge span above its meshes.
/// Interior edges (two owning tiles) draw cyan, dungeon-rim edges magenta.
pub fn draw_segment_spans(cache: Option<Res<WallCache>>, mut gizmos: Gizmos) {
    let Some(cache) = cache else { return };
    let all = cache.geometry.walls.iter().chain(&cache.geometry.doorways);
    for segment in all {
        let lift = Vec3::Y * segment.height;
        let color = if segment.hex_ids.len() == 2 {
            Color::srgb(0.2, 0.9, 1.0)
        } else {
            Color::srgb(1.0, 0.2, 0.9)
        };
        gizmos.line(segment.start + lift, segment.end + lift, color);
    }
}

fn spawn_wall_cuboid(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    segment: &WallSegment,
    center: Vec3,
    width: f32,
    material: Handle<StandardMaterial>,
) {
    let mesh = meshes.add(Cuboid::new(width, segment.height, WALL_THICKNESS));
    let kind = match segment.kind {
        SegmentKind::Wall => "wall",
        SegmentKind::Doorway => "doorway",
    };
    commands.spawn((
        Name::new(format!("{kind} {} {}", segment.id, segment.direction.label())),
        WallMesh {
            segment_id: segment.id.clone(),
        },
        Mesh3d(mesh),
        MeshMaterial3d(material),
        Transform::from_translation(center + Vec3::Y * (segment.height / 2.0))
            .with_rotation(Quat::from_rotation_y(segment.rotation)),
    ));
}
