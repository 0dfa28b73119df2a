//! Dungeon loading, tile mesh spawning, and debug overlays.

use bevy::app::AppExit;
use bevy::asset::RenderAssetUsages;
use bevy::mesh::Indices;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;

use super::dungeon_layout::DungeonLayout;
use super::entities::{DungeonMap, DungeonMaterials, FloorTile, SolidBlock};
use super::{DungeonConfig, MapSource};
use crate::hex::{self, HEX_HEIGHT_SCALE, HEX_SIZE, HexDirection};

/// Creates the shared dungeon materials.
pub fn setup_materials(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let floor = materials.add(StandardMaterial {
        base_color: Color::srgb(0.12, 0.12, 0.16),
        perceptual_roughness: 0.9,
        ..default()
    });
    let glowing_floor = materials.add(StandardMaterial {
        base_color: Color::srgb(0.12, 0.12, 0.16),
        emissive: LinearRgba::rgb(0.0, 0.9, 1.1),
        perceptual_roughness: 0.9,
        ..default()
    });
    let solid = materials.add(StandardMaterial {
        base_color: Color::srgb(0.05, 0.05, 0.08),
        perceptual_roughness: 1.0,
        ..default()
    });
    let wall = materials.add(StandardMaterial {
        base_color: Color::srgb(0.1, 0.08, 0.14),
        emissive: LinearRgba::rgb(0.25, 0.05, 0.6),
        ..default()
    });
    let doorway = materials.add(StandardMaterial {
        base_color: Color::srgb(0.08, 0.12, 0.1),
        emissive: LinearRgba::rgb(0.1, 1.0, 0.5),
        ..default()
    });
    commands.insert_resource(DungeonMaterials {
        floor,
        glowing_floor,
        solid,
        wall,
        doorway,
    });
}

/// Loads the configured map source and builds the first snapshot.
///
/// This is the crate's one failing boundary: an unreachable source or an
/// empty dataset logs the error and exits instead of presenting a dungeon
/// with nowhere to stand.
pub fn load_dungeon(
    mut commands: Commands,
    cfg: Res<DungeonConfig>,
    mut exit: MessageWriter<AppExit>,
) {
    match build_layout(&cfg.source, 0) {
        Ok(layout) => {
            let spawn = layout.spawn_point();
            info!(
                "dungeon ready: {} tiles, spawn at {} (height {:.1})",
                layout.len(),
                spawn.coord,
                spawn.height
            );
            commands.insert_resource(DungeonMap { layout });
        }
        Err(err) => {
            error!("failed to load dungeon map: {err}");
            exit.write(AppExit::error());
        }
    }
}

/// `R` replaces the snapshot wholesale (new seed for generated maps, a
/// reload otherwise). Derived geometry keyed on the version follows along.
pub fn regenerate_dungeon(
    keys: Res<ButtonInput<KeyCode>>,
    mut cfg: ResMut<DungeonConfig>,
    map: Option<ResMut<DungeonMap>>,
) {
    if !keys.just_pressed(KeyCode::KeyR) {
        return;
    }
    let Some(mut map) = map else { return };

    if let MapSource::Generated { seed, .. } = &mut cfg.source {
        *seed = seed.wrapping_add(1);
    }
    let next_version = map.layout.version() + 1;
    match build_layout(&cfg.source, next_version) {
        Ok(layout) => {
            info!("dungeon regenerated: {} tiles (version {next_version})", layout.len());
            map.layout = layout;
        }
        // Keep the previous consistent snapshot on failure.
        Err(err) => warn!("regeneration failed, keeping current dungeon: {err}"),
    }
}

fn build_layout(source: &MapSource, version: u64) -> Result<DungeonLayout, super::MapError> {
    let response = source.load()?;
    let meta = &response.metadata;
    info!(
        "map response: {} hexagons (reported {}), seed {:?}, dimensions {:?}, generated in {:.3}s",
        response.hexagons.len(),
        meta.total_hexagons,
        meta.seed,
        meta.dimensions,
        meta.generation_time
    );
    DungeonLayout::from_records(&response.hexagons, version)
}

/// (Re)spawns tile meshes whenever the snapshot changes.
pub fn spawn_tiles(
    mut commands: Commands,
    map: Option<Res<DungeonMap>>,
    materials: Option<Res<DungeonMaterials>>,
    mut meshes: ResMut<Assets<Mesh>>,
    old_tiles: Query<Entity, Or<(With<FloorTile>, With<SolidBlock>)>>,
) {
    let (Some(map), Some(materials)) = (map, materials) else {
        return;
    };
    if !map.is_changed() || map.layout.is_empty() {
        return;
    }
    for entity in &old_tiles {
        commands.entity(entity).despawn();
    }

    let floor_mesh = meshes.add(hex_floor_mesh());
    let prism_mesh = meshes.add(hex_prism_mesh());

    for tile in map.layout.iter() {
        if tile.walkable {
            let material = if tile.light_intensity > 0.0 {
                materials.glowing_floor.clone()
            } else {
                materials.floor.clone()
            };
            commands.spawn((
                Name::new(format!("floor {}", tile.coord)),
                FloorTile { coord: tile.coord },
                Mesh3d(floor_mesh.clone()),
                MeshMaterial3d(material),
                Transform::from_translation(tile.position),
            ));
        } else {
            commands.spawn((
                Name::new(format!("block {}", tile.coord)),
                SolidBlock,
                Mesh3d(prism_mesh.clone()),
                MeshMaterial3d(materials.solid.clone()),
                Transform::from_translation(tile.position)
                    .with_scale(Vec3::new(1.0, tile.height * HEX_HEIGHT_SCALE, 1.0)),
            ));
        }
    }
}

/// Corner positions of a flat-top tile at `y = 0`.
fn hex_corners() -> [Vec3; 6] {
    std::array::from_fn(|i| {
        let angle = std::f32::consts::FRAC_PI_3 * i as f32;
        Vec3::new(HEX_SIZE * angle.cos(), 0.0, HEX_SIZE * angle.sin())
    })
}

/// Flat hexagon fan for walkable floors.
fn hex_floor_mesh() -> Mesh {
    let corners = hex_corners();
    let mut positions = vec![[0.0, 0.0, 0.0]];
    positions.extend(corners.iter().map(|c| c.to_array()));
    let normals = vec![[0.0, 1.0, 0.0]; 7];
    let mut uvs = vec![[0.5, 0.5]];
    uvs.extend(corners.iter().map(|c| {
        [
            0.5 + c.x / (2.0 * HEX_SIZE),
            0.5 + c.z / (2.0 * HEX_SIZE),
        ]
    }));

    let mut indices: Vec<u16> = Vec::with_capacity(18);
    for i in 0..6u16 {
        let next = (i + 1) % 6;
        // Wound for a +y normal.
        indices.extend([0, next + 1, i + 1]);
    }

    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
    .with_inserted_indices(Indices::U16(indices))
}

/// Unit-height hexagonal prism for solid blocks; Y-scaled per tile.
fn hex_prism_mesh() -> Mesh {
    let corners = hex_corners();
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut uvs: Vec<[f32; 2]> = Vec::new();
    let mut indices: Vec<u16> = Vec::new();

    // Top cap at y = 1.
    let top_base = positions.len() as u16;
    positions.push([0.0, 1.0, 0.0]);
    normals.push([0.0, 1.0, 0.0]);
    uvs.push([0.5, 0.5]);
    for c in &corners {
        positions.push([c.x, 1.0, c.z]);
        normals.push([0.0, 1.0, 0.0]);
        uvs.push([0.5 + c.x / (2.0 * HEX_SIZE), 0.5 + c.z / (2.0 * HEX_SIZE)]);
    }
    for i in 0..6u16 {
        let next = (i + 1) % 6;
        indices.extend([top_base, top_base + next + 1, top_base + i + 1]);
    }

    // Side quads with flat outward normals.
    for i in 0..6 {
        let a = corners[i];
        let b = corners[(i + 1) % 6];
        let outward = (a + b).normalize_or_zero();
        let normal = [outward.x, 0.0, outward.z];

        let base = positions.len() as u16;
        for (corner, y) in [(a, 0.0), (b, 0.0), (b, 1.0), (a, 1.0)] {
            positions.push([corner.x, y, corner.z]);
            normals.push(normal);
            uvs.push([if corner == a { 0.0 } else { 1.0 }, y]);
        }
        // a-bottom, b-top, b-bottom / a-bottom, a-top, b-top: outward faces.
        indices.extend([base, base + 2, base + 1, base, base + 3, base + 2]);
    }

    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
    .with_inserted_indices(Indices::U16(indices))
}

/// Debug overlay: draws the cached per-tile wall hints as gizmo lines.
///
/// The hint uses the coarse height-step rule, so comparing these lines with
/// the spawned wall meshes visualizes where the two rules disagree.
pub fn draw_wall_hints(
    map: Option<Res<DungeonMap>>,
    floors: Query<&FloorTile>,
    mut gizmos: Gizmos,
) {
    let Some(map) = map else { return };
    for marker in &floors {
        let Some(tile) = map.layout.get(marker.coord) else {
            continue;
        };
        for dir in HexDirection::ALL {
            if !tile.has_walls[dir.index()] {
                continue;
            }
            let frame = hex::edge_frame(dir);
            let center = tile.position + frame.offset + Vec3::Y * 0.5;
            let half_span = frame.axis() * (HEX_SIZE / 2.0);
            gizmos.line(
                center - half_span,
                center + half_span,
                Color::srgb(1.0, 0.6, 0.1),
            );
        }
    }
}
