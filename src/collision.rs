//! Circle-vs-wall collision for first-person movement.
//!
//! Walls are oriented boxes in the XZ plane, derived per tile from the same
//! boundary classification the renderer uses. The player is a circle; overlap
//! resolution pushes out along the penetration vector and slides along walls
//! instead of stopping dead. Everything here is pure and ECS-free so a frame
//! of movement can be unit-tested without a render context.

use bevy::prelude::{Quat, Vec2, Vec3};

use crate::dungeon::{DungeonHex, DungeonLayout};
use crate::hex::{self, HEX_HEIGHT_SCALE, HEX_SIZE, HexDirection};
use crate::topology::{self, Boundary};

/// Player collision circle radius.
pub const PLAYER_RADIUS: f32 = 1.5;

/// Thickness of wall collision boxes.
const WALL_DEPTH: f32 = 1.0;

/// Doorway posts cover this fraction of the full wall width each.
pub const DOORWAY_POST_WIDTH: f32 = 0.3;

/// Doorway posts sit this fraction of the wall width out from the edge
/// midpoint, leaving the central 40% open.
pub const DOORWAY_POST_OFFSET: f32 = 0.35;

/// Below this distance the circle center counts as inside the box footprint
/// and the closest-point push direction is undefined.
const DEGENERATE_DISTANCE: f32 = 0.001;

/// Damping applied to the summed push vector to avoid jitter.
const PUSH_DAMPING: f32 = 0.8;

/// Corrected displacement may exceed the intended one by at most this factor.
const MAX_CORRECTION_FACTOR: f32 = 1.1;

/// An oriented rectangular obstacle in the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionBox {
    /// Box center (`y = 0`; collision is horizontal only).
    pub center: Vec3,
    /// Extent along the local X axis.
    pub width: f32,
    /// Extent along the local Z axis.
    pub depth: f32,
    /// Wall height; metadata for consumers, ignored by the circle test.
    pub height: f32,
    /// Y-axis rotation.
    pub rotation: f32,
}

/// Collision boxes for one tile: one full-width box per walled direction,
/// two posts per doorway, nothing for open edges.
///
/// Non-walkable tiles return no boxes regardless of their connections; they
/// are solid blocks, not walled rooms.
pub fn collision_boxes_for_hex(hex: &DungeonHex, layout: &DungeonLayout) -> Vec<CollisionBox> {
    if !hex.walkable {
        return Vec::new();
    }
    let height = (hex.height * HEX_HEIGHT_SCALE).max(0.1);
    let mut boxes = Vec::new();

    for dir in HexDirection::ALL {
        let frame = hex::edge_frame(dir);
        let center = hex.position + frame.offset;
        match topology::classify(hex, dir, layout) {
            Boundary::Open => {}
            Boundary::Wall => boxes.push(CollisionBox {
                center,
                width: HEX_SIZE,
                depth: WALL_DEPTH,
                height,
                rotation: frame.rotation,
            }),
            Boundary::Doorway => {
                let along = frame.axis() * (HEX_SIZE * DOORWAY_POST_OFFSET);
                for post_center in [center - along, center + along] {
                    boxes.push(CollisionBox {
                        center: post_center,
                        width: HEX_SIZE * DOORWAY_POST_WIDTH,
                        depth: WALL_DEPTH,
                        height,
                        rotation: frame.rotation,
                    });
                }
            }
        }
    }
    boxes
}

/// Push vector separating a circle from a box, or `None` when they don't
/// overlap.
///
/// The circle center is transformed into the box frame and clamped to the
/// half-extents to find the closest point. When the center falls inside the
/// footprint the closest point degenerates, so the push goes toward the
/// nearest of the four local edges instead, by the remaining edge distance
/// plus the radius; that guarantees escape even when fully embedded.
pub fn circle_box_push(circle: Vec3, radius: f32, b: &CollisionBox) -> Option<Vec3> {
    let rot = Quat::from_rotation_y(b.rotation);
    let mut rel = circle - b.center;
    rel.y = 0.0;
    let local = rot.inverse() * rel;

    let half_w = b.width / 2.0;
    let half_d = b.depth / 2.0;
    let closest_x = local.x.clamp(-half_w, half_w);
    let closest_z = local.z.clamp(-half_d, half_d);

    let dx = local.x - closest_x;
    let dz = local.z - closest_z;
    let dist_sq = dx * dx + dz * dz;
    if dist_sq >= radius * radius {
        return None;
    }

    let dist = dist_sq.sqrt();
    let push_local = if dist >= DEGENERATE_DISTANCE {
        let penetration = radius - dist;
        Vec3::new(dx / dist * penetration, 0.0, dz / dist * penetration)
    } else {
        let to_right = half_w - local.x;
        let to_left = local.x + half_w;
        let to_back = half_d - local.z;
        let to_front = local.z + half_d;

        let nearest = to_right.min(to_left).min(to_back).min(to_front);
        if nearest == to_right {
            Vec3::new(to_right + radius, 0.0, 0.0)
        } else if nearest == to_left {
            Vec3::new(-(to_left + radius), 0.0, 0.0)
        } else if nearest == to_back {
            Vec3::new(0.0, 0.0, to_back + radius)
        } else {
            Vec3::new(0.0, 0.0, -(to_front + radius))
        }
    };

    Some(rot * push_local)
}

/// Outcome of resolving one frame of movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Whether any wall was hit.
    pub collision: bool,
    /// Position to move to; equals the intended position when nothing was
    /// hit, otherwise the slid/pushed position. Always finite.
    pub corrected: Vec3,
}

/// Resolves an intended move from `current` to `new_pos` against nearby
/// walls.
///
/// Candidate tiles are prefiltered to the target's own tile and its ring-1
/// neighbors, then by XZ distance, so per-frame cost tracks local density,
/// not dungeon size. On contact the summed push is damped,
/// then the movement component opposing it is cancelled (wall sliding); a
/// move already heading away just takes the damped push. The final
/// displacement is clamped to 1.1x the intended distance so accumulated
/// pushes can never fling the player.
pub fn check_wall_collision(
    current: Vec3,
    new_pos: Vec3,
    layout: &DungeonLayout,
) -> CollisionResult {
    let range = HEX_SIZE + 2.0 * PLAYER_RADIUS;
    let range_sq = range * range;
    let target_xz = Vec2::new(new_pos.x, new_pos.z);
    let target_hex = hex::position_to_hex(new_pos);

    let mut push = Vec3::ZERO;
    let mut collision = false;
    for hex in layout.iter() {
        // Any tile whose center is within `range` of the target is at most
        // one hex step away.
        if hex.coord.distance(target_hex) > 1 {
            continue;
        }
        let center_xz = Vec2::new(hex.position.x, hex.position.z);
        if center_xz.distance_squared(target_xz) > range_sq {
            continue;
        }
        for b in collision_boxes_for_hex(hex, layout) {
            if let Some(p) = circle_box_push(new_pos, PLAYER_RADIUS, &b) {
                push += p;
                collision = true;
            }
        }
    }

    if !collision {
        return CollisionResult {
            collision: false,
            corrected: new_pos,
        };
    }

    let push = push * PUSH_DAMPING;
    let movement = new_pos - current;
    let normal = push.normalize_or_zero();
    let into_wall = movement.dot(normal);

    let corrected = if into_wall < 0.0 {
        // Sliding: drop only the component driving into the wall.
        current + (movement - normal * into_wall)
    } else {
        new_pos + push
    };

    let max_displacement = movement.length() * MAX_CORRECTION_FACTOR;
    let displacement = corrected - current;
    let corrected = if displacement.length() > max_displacement {
        current + displacement.normalize_or_zero() * max_displacement
    } else {
        corrected
    };

    CollisionResult {
        collision: true,
        corrected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{DungeonHex, HexType};
    use crate::hex::HexCoord;

    fn isolated_hex(height: f64) -> DungeonLayout {
        DungeonLayout::from_hexes(vec![DungeonHex::new(
            "a".into(),
            HexCoord::ZERO,
            height,
            HexType::Room,
            vec![],
        )])
    }

    // ── box generation ──────────────────────────────────────────────

    #[test]
    fn solid_tile_has_no_boxes_even_with_connections() {
        let layout = DungeonLayout::from_hexes(vec![
            DungeonHex::new(
                "a".into(),
                HexCoord::ZERO,
                15.0,
                HexType::Room,
                vec!["b".into()],
            ),
            DungeonHex::new(
                "b".into(),
                HexCoord::new(1, 0),
                1.0,
                HexType::Room,
                vec!["a".into()],
            ),
        ]);
        let solid = layout.get(HexCoord::ZERO).unwrap();
        assert!(collision_boxes_for_hex(solid, &layout).is_empty());
    }

    #[test]
    fn isolated_tile_gets_six_full_walls() {
        let layout = isolated_hex(1.0);
        let hex = layout.get(HexCoord::ZERO).unwrap();
        let boxes = collision_boxes_for_hex(hex, &layout);
        assert_eq!(boxes.len(), 6);
        for b in &boxes {
            assert_eq!(b.width, HEX_SIZE);
            assert_eq!(b.height, HEX_HEIGHT_SCALE);
        }
    }

    #[test]
    fn doorway_produces_two_posts_with_center_gap() {
        let layout = DungeonLayout::from_hexes(vec![
            DungeonHex::new(
                "a".into(),
                HexCoord::ZERO,
                1.0,
                HexType::Room,
                vec!["b".into()],
            ),
            DungeonHex::new(
                "b".into(),
                HexCoord::new(1, 0),
                1.0,
                HexType::Corridor,
                vec!["a".into()],
            ),
        ]);
        let hex = layout.get(HexCoord::ZERO).unwrap();
        let boxes = collision_boxes_for_hex(hex, &layout);
        // 5 solid walls + 2 doorway posts.
        assert_eq!(boxes.len(), 7);
        let posts: Vec<_> = boxes
            .iter()
            .filter(|b| b.width < HEX_SIZE)
            .collect();
        assert_eq!(posts.len(), 2);
        for post in &posts {
            assert_eq!(post.width, HEX_SIZE * 0.3);
        }
        let gap = posts[0].center.distance(posts[1].center);
        assert!(
            (gap - HEX_SIZE * 0.7).abs() < 1e-3,
            "posts should straddle the midpoint at +-35% width, got gap {gap}"
        );
    }

    #[test]
    fn open_room_edge_has_no_box() {
        let layout = DungeonLayout::from_hexes(vec![
            DungeonHex::new(
                "a".into(),
                HexCoord::ZERO,
                1.0,
                HexType::Room,
                vec!["b".into()],
            ),
            DungeonHex::new(
                "b".into(),
                HexCoord::new(1, 0),
                1.0,
                HexType::Room,
                vec!["a".into()],
            ),
        ]);
        let hex = layout.get(HexCoord::ZERO).unwrap();
        assert_eq!(collision_boxes_for_hex(hex, &layout).len(), 5);
    }

    // ── circle vs box ───────────────────────────────────────────────

    fn axis_box() -> CollisionBox {
        CollisionBox {
            center: Vec3::ZERO,
            width: 10.0,
            depth: 1.0,
            height: 12.0,
            rotation: 0.0,
        }
    }

    #[test]
    fn distant_circle_does_not_overlap() {
        assert!(circle_box_push(Vec3::new(0.0, 0.0, 5.0), 1.5, &axis_box()).is_none());
    }

    #[test]
    fn touching_circle_pushes_out_by_penetration() {
        // Circle center 1.0 from the +z face, radius 1.5: penetration 0.5.
        let push = circle_box_push(Vec3::new(0.0, 0.0, 1.5), 1.5, &axis_box()).unwrap();
        assert!(push.x.abs() < 1e-5);
        assert!((push.z - 0.5).abs() < 1e-5, "push should be +z 0.5, got {push}");
    }

    #[test]
    fn embedded_circle_escapes_toward_nearest_edge() {
        // Dead center of the box footprint: nearest edges are +-z (half depth
        // 0.5 < half width 5.0).
        let push = circle_box_push(Vec3::ZERO, 1.5, &axis_box()).unwrap();
        assert!(push.is_finite());
        assert!(push.x.abs() < 1e-5);
        assert!(
            (push.z.abs() - 2.0).abs() < 1e-5,
            "escape should be edge distance 0.5 + radius 1.5, got {push}"
        );
    }

    #[test]
    fn rotated_box_pushes_along_rotated_normal() {
        let b = CollisionBox {
            rotation: std::f32::consts::FRAC_PI_2,
            ..axis_box()
        };
        // Local +z now points along world -x.
        let push = circle_box_push(Vec3::new(-1.5, 0.0, 0.0), 1.5, &b).unwrap();
        assert!((push.x + 0.5).abs() < 1e-4, "expected -x push, got {push}");
        assert!(push.z.abs() < 1e-4);
    }

    // ── movement resolution ─────────────────────────────────────────

    #[test]
    fn free_movement_returns_intended_position_exactly() {
        let layout = isolated_hex(1.0);
        let current = Vec3::new(0.0, 2.0, 0.0);
        let new_pos = Vec3::new(3.0, 2.0, 0.0);
        let result = check_wall_collision(current, new_pos, &layout);
        assert!(!result.collision);
        assert_eq!(result.corrected, new_pos);
    }

    #[test]
    fn walking_into_a_wall_collides_and_corrects() {
        let layout = isolated_hex(1.0);
        // Head for the east edge midpoint; stop 1 unit short of its center
        // line, inside the radius.
        let wall_center = crate::hex::edge_frame(HexDirection::East).offset;
        let inward = -wall_center.normalize();
        let new_pos = wall_center + inward * 1.0;
        let current = wall_center + inward * 6.0;

        let result = check_wall_collision(current, new_pos, &layout);
        assert!(result.collision);
        assert_ne!(result.corrected, new_pos);
        assert!(result.corrected.is_finite());

        let intended = (new_pos - current).length();
        let actual = (result.corrected - current).length();
        assert!(
            actual <= intended * 1.1 + 1e-4,
            "correction {actual} exceeds 1.1x intended {intended}"
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let layout = isolated_hex(1.0);
        let wall_center = crate::hex::edge_frame(HexDirection::North).offset;
        let inward = -wall_center.normalize();
        let new_pos = wall_center + inward * 1.0;
        let current = wall_center + inward * 4.0;

        let a = check_wall_collision(current, new_pos, &layout);
        let b = check_wall_collision(current, new_pos, &layout);
        assert_eq!(a, b);
    }

    #[test]
    fn sliding_preserves_lateral_movement() {
        let layout = isolated_hex(1.0);
        let frame = crate::hex::edge_frame(HexDirection::North);
        let inward = -frame.offset.normalize();
        let along = frame.axis();

        // Start pressed near the north wall, moving diagonally into it.
        let current = frame.offset + inward * 2.0;
        let new_pos = current + along * 2.0 - inward * 1.5;
        let result = check_wall_collision(current, new_pos, &layout);
        assert!(result.collision);

        let lateral = (result.corrected - current).dot(along);
        assert!(
            lateral > 1.0,
            "sliding should keep most lateral progress, got {lateral}"
        );
    }

    #[test]
    fn zero_movement_under_collision_stays_put() {
        let layout = isolated_hex(1.0);
        let spot = crate::hex::edge_frame(HexDirection::South).offset * 0.98;
        let result = check_wall_collision(spot, spot, &layout);
        if result.collision {
            assert_eq!(result.corrected, spot, "no input movement, no correction");
        }
    }
}
