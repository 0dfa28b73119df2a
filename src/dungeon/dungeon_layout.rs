//! Immutable dungeon snapshot built from one external map response.
//!
//! A [`DungeonLayout`] is rebuilt wholesale on every (re)generation and never
//! mutated in place, so per-frame readers always see a consistent dataset.
//! Everything derived (wall segments, collision boxes) is a pure function of
//! the snapshot, keyed by its [`version`](DungeonLayout::version).

use bevy::platform::collections::HashMap;
use bevy::prelude::Vec3;

use super::map_source::{MapError, RawHex};
use crate::hex::{self, HexCoord, HexDirection};

/// Tiles outside the `(0, WALKABLE_MAX_HEIGHT)` band are solid blocks.
pub const WALKABLE_MAX_HEIGHT: f32 = 10.0;

/// Height step above which the cached `has_walls` hint reports a wall.
const WALL_HEIGHT_STEP: f32 = 2.0;

/// Tile classification driving doorway vs. open boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HexType {
    /// Part of a room interior.
    Room,
    /// Connecting passage; entering one from a room passes a doorway frame.
    #[default]
    Corridor,
}

/// One dungeon tile.
#[derive(Debug, Clone)]
pub struct DungeonHex {
    /// Stable identity, supplied by the map generator.
    pub id: String,
    /// Cube coordinate; immutable after creation.
    pub coord: HexCoord,
    /// World-space center, computed once from `coord`.
    pub position: Vec3,
    /// Clamped tile height, always >= 0.1.
    pub height: f32,
    /// Whether the player can stand here (`0 < height < 10`).
    pub walkable: bool,
    /// Room or corridor.
    pub kind: HexType,
    /// Ids of tiles this one has an open passage to. Declared per side; map
    /// generators populate both sides for symmetric doorways.
    pub connections: Vec<String>,
    /// Display-only glow intensity (tall tiles emit light).
    pub light_intensity: f32,
    /// Cached per-direction wall hint, indexed by [`HexDirection::index`].
    ///
    /// Uses a coarser rule than boundary classification (missing or solid
    /// neighbor, or height step > 2) and is not authoritative; rendering and
    /// collision re-derive topology from connections instead.
    pub has_walls: [bool; 6],
}

impl DungeonHex {
    /// Builds a tile from raw map data, applying the ingest rules:
    /// non-finite height defaults to 1 and clamps to >= 0.1, walkability is
    /// the `0 < h < 10` band, lighting derives from height.
    pub fn new(
        id: String,
        coord: HexCoord,
        height: f64,
        kind: HexType,
        connections: Vec<String>,
    ) -> Self {
        let height = if height.is_finite() { height as f32 } else { 1.0 };
        let height = height.max(0.1);
        let walkable = height > 0.0 && height < WALKABLE_MAX_HEIGHT;
        Self {
            id,
            coord,
            position: hex::hex_to_position(coord),
            height,
            walkable,
            kind,
            connections,
            light_intensity: if height > 5.0 { 0.5 } else { 0.0 },
            has_walls: [false; 6],
        }
    }

    /// Whether this tile declares an open passage to `other`.
    pub fn connects_to(&self, other: &DungeonHex) -> bool {
        self.connections.iter().any(|id| *id == other.id)
    }
}

/// Where the player enters the dungeon.
#[derive(Debug, Clone, Copy)]
pub struct SpawnPoint {
    /// The walkable tile nearest the world origin.
    pub coord: HexCoord,
    /// World-space tile center.
    pub position: Vec3,
    /// Camera height above the tile: `max(h * 0.5 + 2, 3)`.
    pub height: f32,
}

/// Immutable tile set for one generated dungeon.
#[derive(Debug)]
pub struct DungeonLayout {
    hexes: HashMap<HexCoord, DungeonHex>,
    spawn: SpawnPoint,
    version: u64,
}

impl DungeonLayout {
    /// Builds a snapshot from raw map records.
    ///
    /// This is the crate's single hard error boundary: an empty record list,
    /// or one with no walkable tile to spawn on, refuses to build rather than
    /// producing a degenerate dungeon.
    pub fn from_records(records: &[RawHex], version: u64) -> Result<Self, MapError> {
        if records.is_empty() {
            return Err(MapError::EmptyDataset);
        }

        let mut hexes = HashMap::with_capacity(records.len());
        for raw in records {
            let coord = raw.coord();
            let hex = DungeonHex::new(
                raw.id.clone().unwrap_or_else(|| coord.key()),
                coord,
                raw.height.unwrap_or(1.0),
                raw.hex_type(),
                raw.connections.clone().unwrap_or_default(),
            );
            hexes.insert(coord, hex);
        }

        // Second pass: the wall-hint cache needs the full map.
        let walls: Vec<(HexCoord, [bool; 6])> = hexes
            .values()
            .map(|hex| (hex.coord, determine_walls(hex, &hexes)))
            .collect();
        for (coord, mask) in walls {
            if let Some(hex) = hexes.get_mut(&coord) {
                hex.has_walls = mask;
            }
        }

        let spawn = find_spawn_point(&hexes).ok_or(MapError::NoSpawnPoint)?;

        Ok(Self {
            hexes,
            spawn,
            version,
        })
    }

    /// Snapshot constructor for tests: tiles are taken as-is, then the wall
    /// hint and spawn point are derived normally.
    #[cfg(test)]
    pub fn from_hexes(tiles: Vec<DungeonHex>) -> Self {
        let mut hexes = HashMap::with_capacity(tiles.len());
        for hex in tiles {
            hexes.insert(hex.coord, hex);
        }
        let walls: Vec<(HexCoord, [bool; 6])> = hexes
            .values()
            .map(|hex| (hex.coord, determine_walls(hex, &hexes)))
            .collect();
        for (coord, mask) in walls {
            if let Some(hex) = hexes.get_mut(&coord) {
                hex.has_walls = mask;
            }
        }
        let spawn = find_spawn_point(&hexes).unwrap_or(SpawnPoint {
            coord: HexCoord::ZERO,
            position: Vec3::ZERO,
            height: 3.0,
        });
        Self {
            hexes,
            spawn,
            version: 0,
        }
    }

    // ── Tile access ────────────────────────────────────────────────

    /// Tile at a coordinate, if present.
    pub fn get(&self, coord: HexCoord) -> Option<&DungeonHex> {
        self.hexes.get(&coord)
    }

    /// All tiles, in map order.
    pub fn iter(&self) -> impl Iterator<Item = &DungeonHex> {
        self.hexes.values()
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.hexes.len()
    }

    /// True when the snapshot holds no tiles (cannot happen via
    /// [`Self::from_records`]).
    pub fn is_empty(&self) -> bool {
        self.hexes.is_empty()
    }

    /// Player entry point.
    pub fn spawn_point(&self) -> SpawnPoint {
        self.spawn
    }

    /// Regeneration counter identifying this snapshot. Derived-geometry
    /// caches compare against it instead of re-deriving every frame.
    pub fn version(&self) -> u64 {
        self.version
    }
}

/// Coarse per-direction wall hint: missing neighbor, solid neighbor, or a
/// height step above 2 counts as a wall. Distinct from boundary
/// classification on purpose; see [`DungeonHex::has_walls`].
fn determine_walls(hex: &DungeonHex, hexes: &HashMap<HexCoord, DungeonHex>) -> [bool; 6] {
    HexDirection::ALL.map(|dir| match hexes.get(&hex.coord.neighbor(dir)) {
        None => true,
        Some(neighbor) => {
            !neighbor.walkable || (hex.height - neighbor.height).abs() > WALL_HEIGHT_STEP
        }
    })
}

/// Walkable tile whose center is nearest the world origin.
fn find_spawn_point(hexes: &HashMap<HexCoord, DungeonHex>) -> Option<SpawnPoint> {
    hexes
        .values()
        .filter(|hex| hex.walkable)
        .min_by(|a, b| {
            a.position
                .length_squared()
                .total_cmp(&b.position.length_squared())
        })
        .map(|hex| SpawnPoint {
            coord: hex.coord,
            position: hex.position,
            height: (hex.height * 0.5 + 2.0).max(3.0),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::map_source::RawHex;

    fn raw(q: i32, r: i32, height: f64) -> RawHex {
        RawHex {
            id: None,
            q: q as f64,
            r: r as f64,
            s: (-q - r) as f64,
            height: Some(height),
            kind: None,
            connections: None,
        }
    }

    #[test]
    fn negative_height_clamps_to_walkable_minimum() {
        let hex = DungeonHex::new("a".into(), HexCoord::ZERO, -5.0, HexType::Corridor, vec![]);
        assert_eq!(hex.height, 0.1);
        assert!(hex.walkable, "0 < 0.1 < 10 is inside the walkable band");
    }

    #[test]
    fn tall_tile_is_solid() {
        let hex = DungeonHex::new("a".into(), HexCoord::ZERO, 15.0, HexType::Corridor, vec![]);
        assert_eq!(hex.height, 15.0);
        assert!(!hex.walkable);
    }

    #[test]
    fn non_finite_height_defaults_to_one() {
        let hex = DungeonHex::new(
            "a".into(),
            HexCoord::ZERO,
            f64::NAN,
            HexType::Corridor,
            vec![],
        );
        assert_eq!(hex.height, 1.0);
        assert!(hex.walkable);
    }

    #[test]
    fn lighting_derives_from_height() {
        let tall = DungeonHex::new("a".into(), HexCoord::ZERO, 6.0, HexType::Room, vec![]);
        let low = DungeonHex::new("b".into(), HexCoord::new(1, 0), 2.0, HexType::Room, vec![]);
        assert_eq!(tall.light_intensity, 0.5);
        assert_eq!(low.light_intensity, 0.0);
    }

    #[test]
    fn empty_records_are_a_hard_failure() {
        let err = DungeonLayout::from_records(&[], 0).unwrap_err();
        assert!(matches!(err, MapError::EmptyDataset));
    }

    #[test]
    fn all_solid_records_have_no_spawn() {
        let records = vec![raw(0, 0, 12.0), raw(1, 0, 15.0)];
        let err = DungeonLayout::from_records(&records, 0).unwrap_err();
        assert!(matches!(err, MapError::NoSpawnPoint));
    }

    #[test]
    fn missing_fields_default_to_corridor_without_connections() {
        let records = vec![raw(0, 0, 1.0)];
        let layout = DungeonLayout::from_records(&records, 0).unwrap();
        let hex = layout.get(HexCoord::ZERO).unwrap();
        assert_eq!(hex.kind, HexType::Corridor);
        assert!(hex.connections.is_empty());
        assert_eq!(hex.id, "0,0", "missing id falls back to the coordinate key");
    }

    #[test]
    fn spawn_point_is_walkable_tile_nearest_origin() {
        // Origin tile is solid; nearest walkable is (1, 0).
        let records = vec![raw(0, 0, 12.0), raw(1, 0, 4.0), raw(3, 0, 1.0)];
        let layout = DungeonLayout::from_records(&records, 0).unwrap();
        let spawn = layout.spawn_point();
        assert_eq!(spawn.coord, HexCoord::new(1, 0));
        assert_eq!(spawn.height, 4.0_f32 * 0.5 + 2.0);
    }

    #[test]
    fn spawn_height_has_floor_of_three() {
        let records = vec![raw(0, 0, 0.5)];
        let layout = DungeonLayout::from_records(&records, 0).unwrap();
        assert_eq!(layout.spawn_point().height, 3.0);
    }

    #[test]
    fn wall_hint_marks_missing_and_solid_neighbors() {
        // (0,0) walkable; East neighbor solid; all other neighbors missing.
        let records = vec![raw(0, 0, 1.0), raw(1, 0, 12.0)];
        let layout = DungeonLayout::from_records(&records, 0).unwrap();
        let hex = layout.get(HexCoord::ZERO).unwrap();
        assert_eq!(hex.has_walls, [true; 6]);
    }

    #[test]
    fn wall_hint_clears_for_level_walkable_neighbor() {
        let records = vec![raw(0, 0, 1.0), raw(1, 0, 1.5)];
        let layout = DungeonLayout::from_records(&records, 0).unwrap();
        let hex = layout.get(HexCoord::ZERO).unwrap();
        assert!(!hex.has_walls[HexDirection::East.index()]);
        assert!(hex.has_walls[HexDirection::West.index()]);
    }

    #[test]
    fn wall_hint_marks_large_height_steps() {
        let records = vec![raw(0, 0, 1.0), raw(1, 0, 4.0)];
        let layout = DungeonLayout::from_records(&records, 0).unwrap();
        let hex = layout.get(HexCoord::ZERO).unwrap();
        assert!(hex.has_walls[HexDirection::East.index()], "3.0 step > 2.0");
    }
}
