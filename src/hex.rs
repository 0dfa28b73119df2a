//! Cube-coordinate hex math for the flat-top dungeon grid.
//!
//! All functions in this module are free of Bevy ECS dependencies and operate
//! on plain coordinates / `Vec3` inputs, making them straightforward to
//! unit-test. World positions put `+x` east and `+z` south; tile geometry
//! always sits at `y = 0` (heights are a separate scalar).

use std::fmt;
use std::ops::{Add, Neg, Sub};

use bevy::prelude::{Reflect, Vec3};

/// Circumradius of a tile in world units. Also the length of one hex edge.
pub const HEX_SIZE: f32 = 25.0;

/// Multiplier from a tile's stored height to its wall height in world units.
pub const HEX_HEIGHT_SCALE: f32 = 12.0;

/// A tile position in cube coordinates.
///
/// Invariant: `q + r + s == 0`. Constructors derive `s`, so the invariant
/// holds by construction; `q` and `r` alone identify a tile (see [`Self::key`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub struct HexCoord {
    /// First cube axis.
    pub q: i32,
    /// Second cube axis.
    pub r: i32,
    /// Third cube axis, always `-q - r`.
    pub s: i32,
}

impl HexCoord {
    /// Origin tile.
    pub const ZERO: Self = Self { q: 0, r: 0, s: 0 };

    /// Creates a coordinate from the two free axes.
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r, s: -q - r }
    }

    /// Canonical `"q,r"` lookup key.
    ///
    /// `s` is intentionally excluded: it is derived, and every adjacency map
    /// and edge id in the crate uses this two-axis convention.
    pub fn key(&self) -> String {
        format!("{},{}", self.q, self.r)
    }

    /// Cube distance to another tile: `(|Δq| + |Δq + Δr| + |Δr|) / 2`.
    pub fn distance(&self, other: Self) -> i32 {
        let dq = self.q - other.q;
        let dr = self.r - other.r;
        (dq.abs() + (dq + dr).abs() + dr.abs()) / 2
    }

    /// The six adjacent tiles, ordered by [`HexDirection::ALL`].
    pub fn neighbors(&self) -> [Self; 6] {
        HexDirection::ALL.map(|d| *self + d.delta())
    }

    /// The adjacent tile in one direction.
    pub fn neighbor(&self, dir: HexDirection) -> Self {
        *self + dir.delta()
    }
}

impl Add for HexCoord {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            q: self.q + other.q,
            r: self.r + other.r,
            s: self.s + other.s,
        }
    }
}

impl Sub for HexCoord {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            q: self.q - other.q,
            r: self.r - other.r,
            s: self.s - other.s,
        }
    }
}

impl Neg for HexCoord {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            q: -self.q,
            r: -self.r,
            s: -self.s,
        }
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.q, self.r, self.s)
    }
}

/// The six boundary directions of a flat-top tile.
///
/// Each variant carries both its cube delta and its visual compass label, so
/// the two can never drift apart. The declaration order is fixed: every
/// direction-indexed table in the crate (wall frames, `has_walls` cache)
/// indexes by [`Self::index`] in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HexDirection {
    /// Cube `+q`; points visually southeast.
    East,
    /// Cube `+q, -r`; points visually northeast.
    NorthEast,
    /// Cube `-r`; points visually north.
    North,
    /// Cube `-q`; points visually northwest.
    West,
    /// Cube `-q, +r`; points visually southwest.
    SouthWest,
    /// Cube `+r`; points visually south.
    South,
}

impl HexDirection {
    /// All six directions in canonical order.
    pub const ALL: [Self; 6] = [
        Self::East,
        Self::NorthEast,
        Self::North,
        Self::West,
        Self::SouthWest,
        Self::South,
    ];

    /// Position of this direction in [`Self::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::East => 0,
            Self::NorthEast => 1,
            Self::North => 2,
            Self::West => 3,
            Self::SouthWest => 4,
            Self::South => 5,
        }
    }

    /// Cube-coordinate offset to the neighbor in this direction.
    pub const fn delta(self) -> HexCoord {
        match self {
            Self::East => HexCoord::new(1, 0),
            Self::NorthEast => HexCoord::new(1, -1),
            Self::North => HexCoord::new(0, -1),
            Self::West => HexCoord::new(-1, 0),
            Self::SouthWest => HexCoord::new(-1, 1),
            Self::South => HexCoord::new(0, 1),
        }
    }

    /// Visual compass label (the direction the wall faces on screen).
    pub const fn label(self) -> &'static str {
        match self {
            Self::East => "southeast",
            Self::NorthEast => "northeast",
            Self::North => "north",
            Self::West => "northwest",
            Self::SouthWest => "southwest",
            Self::South => "south",
        }
    }
}

/// Local placement of one tile edge: the wall/doorway frame every consumer
/// (segment generation, collision boxes) positions geometry with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeFrame {
    /// Edge midpoint relative to the tile center (`y = 0`).
    pub offset: Vec3,
    /// Y rotation aligning the frame's local X axis with the edge.
    pub rotation: f32,
}

impl EdgeFrame {
    /// World-space direction of the frame's local X axis (the edge tangent).
    pub fn axis(&self) -> Vec3 {
        Vec3::new(self.rotation.cos(), 0.0, -self.rotation.sin())
    }
}

/// Edge frame for one direction of a flat-top tile.
///
/// Opposite edges are parallel, so only three rotations occur. The offset is
/// half the neighbor offset, putting the frame on the shared edge midpoint at
/// apothem distance (`√3/2 * HEX_SIZE`) from the center.
pub fn edge_frame(dir: HexDirection) -> EdgeFrame {
    use std::f32::consts::FRAC_PI_3;
    const ROTATIONS: [f32; 6] = [
        FRAC_PI_3,
        2.0 * FRAC_PI_3,
        0.0,
        FRAC_PI_3,
        2.0 * FRAC_PI_3,
        0.0,
    ];
    EdgeFrame {
        offset: hex_to_position(dir.delta()) * 0.5,
        rotation: ROTATIONS[dir.index()],
    }
}

/// World-space center of a tile.
///
/// Flat-top projection: `x = HEX_SIZE * 1.5 * q`,
/// `z = HEX_SIZE * (√3/2 * q + √3 * r)`, `y = 0`.
pub fn hex_to_position(coord: HexCoord) -> Vec3 {
    let q = coord.q as f32;
    let r = coord.r as f32;
    let sqrt3 = 3.0_f32.sqrt();
    Vec3::new(
        HEX_SIZE * 1.5 * q,
        0.0,
        HEX_SIZE * (sqrt3 / 2.0 * q + sqrt3 * r),
    )
}

/// Tile containing a world-space position; inverse of [`hex_to_position`].
///
/// Non-finite inputs are treated as 0 so untrusted positions can never
/// produce a NaN coordinate.
pub fn position_to_hex(pos: Vec3) -> HexCoord {
    let x = if pos.x.is_finite() { pos.x } else { 0.0 };
    let z = if pos.z.is_finite() { pos.z } else { 0.0 };
    let sqrt3 = 3.0_f32.sqrt();

    let q = x / (HEX_SIZE * 1.5);
    let r = z / (HEX_SIZE * sqrt3) - q / 2.0;
    cube_round(q, r)
}

/// Rounds fractional axial coordinates to the nearest tile.
///
/// Standard cube rounding: round all three axes, then recompute the axis with
/// the largest rounding error so `q + r + s == 0` holds.
fn cube_round(q: f32, r: f32) -> HexCoord {
    let s = -q - r;
    let mut rq = q.round();
    let mut rr = r.round();
    let rs = s.round();

    let dq = (rq - q).abs();
    let dr = (rr - r).abs();
    let ds = (rs - s).abs();

    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    }
    HexCoord::new(rq as i32, rr as i32)
}

/// Tiles at exactly `radius` steps from `center`, in traversal order.
///
/// `radius == 0` yields just the center. Built by stepping to the ring start
/// and walking each of the six edge directions `radius` times.
pub fn hex_ring(center: HexCoord, radius: u32) -> Vec<HexCoord> {
    if radius == 0 {
        return vec![center];
    }
    let radius = radius as i32;
    let mut out = Vec::with_capacity(6 * radius as usize);

    let mut cursor = center;
    for _ in 0..radius {
        cursor = cursor.neighbor(HexDirection::SouthWest);
    }
    for dir in HexDirection::ALL {
        for _ in 0..radius {
            out.push(cursor);
            cursor = cursor.neighbor(dir);
        }
    }
    out
}

/// Filled disc of tiles out to `radius`, center first, ring by ring.
pub fn hex_spiral(center: HexCoord, radius: u32) -> Vec<HexCoord> {
    let mut out = vec![center];
    for ring in 1..=radius {
        out.extend(hex_ring(center, ring));
    }
    out
}
