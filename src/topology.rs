//! Boundary classification between adjacent tiles.
//!
//! Decides, per tile per direction, whether the shared edge is a solid wall,
//! a framed doorway, or fully open. Wall generation and collision both derive
//! from this one rule set, so the two can never disagree.

use crate::dungeon::{DungeonHex, DungeonLayout, HexType};
use crate::hex::HexDirection;

/// What sits on the edge between a tile and its neighbor in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Solid wall: no neighbor, or an unconnected one.
    Wall,
    /// Partial opening with framed posts: connected corridor neighbor.
    Doorway,
    /// No boundary geometry at all: connected room neighbor.
    Open,
}

/// Classifies the boundary of `hex` in `direction`.
///
/// Adjacency without an explicit connection is always solid. The rule is
/// evaluated from `hex`'s side only; generators declare connections from both
/// sides to get symmetric doorways.
pub fn classify(hex: &DungeonHex, direction: HexDirection, layout: &DungeonLayout) -> Boundary {
    let Some(neighbor) = layout.get(hex.coord.neighbor(direction)) else {
        return Boundary::Wall;
    };
    if !hex.connects_to(neighbor) {
        return Boundary::Wall;
    }
    match neighbor.kind {
        HexType::Corridor => Boundary::Doorway,
        HexType::Room => Boundary::Open,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::DungeonLayout;
    use crate::hex::HexCoord;

    fn tile(id: &str, q: i32, r: i32, kind: HexType, connections: &[&str]) -> DungeonHex {
        DungeonHex::new(
            id.into(),
            HexCoord::new(q, r),
            1.0,
            kind,
            connections.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn missing_neighbor_is_a_wall() {
        let layout = DungeonLayout::from_hexes(vec![tile("a", 0, 0, HexType::Room, &[])]);
        let hex = layout.get(HexCoord::ZERO).unwrap();
        for dir in HexDirection::ALL {
            assert_eq!(classify(hex, dir, &layout), Boundary::Wall);
        }
    }

    #[test]
    fn unconnected_neighbor_is_a_wall() {
        let layout = DungeonLayout::from_hexes(vec![
            tile("a", 0, 0, HexType::Room, &[]),
            tile("b", 1, 0, HexType::Room, &[]),
        ]);
        let hex = layout.get(HexCoord::ZERO).unwrap();
        assert_eq!(classify(hex, HexDirection::East, &layout), Boundary::Wall);
    }

    #[test]
    fn connected_corridor_is_a_doorway() {
        let layout = DungeonLayout::from_hexes(vec![
            tile("a", 0, 0, HexType::Room, &["b"]),
            tile("b", 1, 0, HexType::Corridor, &["a"]),
        ]);
        let hex = layout.get(HexCoord::ZERO).unwrap();
        assert_eq!(classify(hex, HexDirection::East, &layout), Boundary::Doorway);
    }

    #[test]
    fn connected_room_is_open() {
        let layout = DungeonLayout::from_hexes(vec![
            tile("a", 0, 0, HexType::Corridor, &["b"]),
            tile("b", 1, 0, HexType::Room, &["a"]),
        ]);
        let hex = layout.get(HexCoord::ZERO).unwrap();
        assert_eq!(classify(hex, HexDirection::East, &layout), Boundary::Open);
    }

    #[test]
    fn classification_is_per_side() {
        // Only `a` declares the connection; `b` still sees a wall.
        let layout = DungeonLayout::from_hexes(vec![
            tile("a", 0, 0, HexType::Room, &["b"]),
            tile("b", 1, 0, HexType::Corridor, &[]),
        ]);
        let a = layout.get(HexCoord::ZERO).unwrap();
        let b = layout.get(HexCoord::new(1, 0)).unwrap();
        assert_eq!(classify(a, HexDirection::East, &layout), Boundary::Doorway);
        assert_eq!(classify(b, HexDirection::West, &layout), Boundary::Wall);
    }
}
