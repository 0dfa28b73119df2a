//! Canonical wall/doorway segments, one per shared tile edge.
//!
//! Both tiles bordering an edge would otherwise emit geometry for it; the
//! builder keys every edge by its sorted coordinate pair so each boundary is
//! represented exactly once no matter which side is visited first.

use bevy::platform::collections::HashSet;
use bevy::prelude::Vec3;

use crate::dungeon::{DungeonHex, DungeonLayout};
use crate::hex::{self, HEX_HEIGHT_SCALE, HEX_SIZE, HexCoord, HexDirection};
use crate::topology::{self, Boundary};

/// Whether a segment is solid or a framed opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Full-width solid wall.
    Wall,
    /// Two framed posts with an open center, rendered as one record carrying
    /// the full edge span.
    Doorway,
}

/// One boundary segment on a shared tile edge.
#[derive(Debug, Clone)]
pub struct WallSegment {
    /// Canonical per-edge id; identical from both bordering tiles.
    pub id: String,
    /// Solid wall or doorway.
    pub kind: SegmentKind,
    /// Direction of the edge as seen from the emitting tile.
    pub direction: HexDirection,
    /// Edge midpoint in world space (`y = 0`).
    pub position: Vec3,
    /// Y-axis rotation.
    pub rotation: f32,
    /// Span along the edge, always `HEX_SIZE`.
    pub width: f32,
    /// Wall height in world units.
    pub height: f32,
    /// One end of the span.
    pub start: Vec3,
    /// The other end of the span.
    pub end: Vec3,
    /// Ids of the tile(s) bordering this edge (owner first).
    pub hex_ids: Vec<String>,
}

/// All boundary segments of a dungeon, deduplicated.
#[derive(Default)]
pub struct WallGeometry {
    /// Solid wall segments.
    pub walls: Vec<WallSegment>,
    /// Doorway segments.
    pub doorways: Vec<WallSegment>,
}

/// Canonical edge id: the two bordering coordinates sorted lexicographically
/// by `(q, r, s)`, so both sides compute the same id.
fn edge_id(a: HexCoord, b: HexCoord) -> String {
    let (lo, hi) = if (a.q, a.r, a.s) <= (b.q, b.r, b.s) {
        (a, b)
    } else {
        (b, a)
    };
    format!("{},{},{}|{},{},{}", lo.q, lo.r, lo.s, hi.q, hi.r, hi.s)
}

/// Walks every walkable tile and emits one segment per walled or doorway
/// edge.
///
/// An edge enters the seen-set only when a segment is emitted: a room's
/// doorway onto a corridor must not be suppressed just because the corridor
/// side (which classifies as open and emits nothing) was visited first. Runs
/// in O(tiles): six id computations and one map lookup per tile-direction.
pub fn build_wall_segments(layout: &DungeonLayout) -> WallGeometry {
    let mut seen: HashSet<String> = HashSet::new();
    let mut geometry = WallGeometry::default();

    for hex in layout.iter() {
        if !hex.walkable {
            continue;
        }
        for dir in HexDirection::ALL {
            let neighbor_coord = hex.coord.neighbor(dir);
            let id = edge_id(hex.coord, neighbor_coord);
            if seen.contains(&id) {
                continue;
            }
            let kind = match topology::classify(hex, dir, layout) {
                Boundary::Open => continue,
                Boundary::Wall => SegmentKind::Wall,
                Boundary::Doorway => SegmentKind::Doorway,
            };
            seen.insert(id.clone());
            let segment = make_segment(id, kind, hex, dir, layout);
            match kind {
                SegmentKind::Wall => geometry.walls.push(segment),
                SegmentKind::Doorway => geometry.doorways.push(segment),
            }
        }
    }
    geometry
}

fn make_segment(
    id: String,
    kind: SegmentKind,
    hex: &DungeonHex,
    dir: HexDirection,
    layout: &DungeonLayout,
) -> WallSegment {
    let frame = hex::edge_frame(dir);
    let position = hex.position + frame.offset;
    let half_span = frame.axis() * (HEX_SIZE / 2.0);

    let mut hex_ids = vec![hex.id.clone()];
    if let Some(neighbor) = layout.get(hex.coord.neighbor(dir)) {
        hex_ids.push(neighbor.id.clone());
    }

    WallSegment {
        id,
        kind,
        direction: dir,
        position,
        rotation: frame.rotation,
        width: HEX_SIZE,
        height: (hex.height * HEX_HEIGHT_SCALE).max(0.1),
        start: position - half_span,
        end: position + half_span,
        hex_ids,
    }
}
