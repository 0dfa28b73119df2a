//! Inbound map-data contract and the sources that produce it.
//!
//! The dungeon shape comes from an external procedural generator. This module
//! models its response, fetches it from a URL or file, and carries a built-in
//! noise-backed generator emitting the same record shape for offline runs.

use std::time::Instant;

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::Deserialize;
use thiserror::Error;

use crate::hex::{self, HexCoord};

use super::dungeon_layout::{HexType, WALKABLE_MAX_HEIGHT};

/// Failure at the map ingest boundary.
///
/// The only place the crate raises errors: geometry and collision code
/// defaults malformed numbers instead. Callers present these as a terminal,
/// restart-prompting state.
#[derive(Debug, Error)]
pub enum MapError {
    /// The generator responded with no tiles.
    #[error("API returned empty or invalid data")]
    EmptyDataset,
    /// Every tile is solid, leaving nowhere to spawn the player.
    #[error("map contains no walkable tile to spawn on")]
    NoSpawnPoint,
    /// Network fetch failed.
    #[error("failed to fetch map data: {0}")]
    Fetch(String),
    /// Local file read failed.
    #[error("failed to read map file {path}: {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Response body was not a valid map response.
    #[error("failed to parse map response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One raw tile record as the generator emits it.
///
/// Coordinates arrive as JSON numbers; non-finite or missing values default
/// to 0 rather than failing, since this data is untrusted.
#[derive(Debug, Clone, Deserialize)]
pub struct RawHex {
    /// Stable tile id. Defaults to the `"q,r"` key when absent.
    #[serde(default)]
    pub id: Option<String>,
    /// First cube axis.
    #[serde(default)]
    pub q: f64,
    /// Second cube axis.
    #[serde(default)]
    pub r: f64,
    /// Third cube axis; redundant (derived from `q` and `r`) but part of the
    /// wire contract.
    #[serde(default)]
    #[expect(dead_code, reason = "wire contract field; s is derived from q and r")]
    pub s: f64,
    /// Tile height; missing or non-numeric values default to 1 at ingest.
    #[serde(default)]
    pub height: Option<f64>,
    /// `"room"` or `"corridor"`; anything else is a corridor.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Ids of tiles this record declares passages to.
    #[serde(default)]
    pub connections: Option<Vec<String>>,
}

impl RawHex {
    /// Cube coordinate, clamping non-finite axes to 0. `s` is recomputed
    /// from `q` and `r` so the cube invariant always holds.
    pub fn coord(&self) -> HexCoord {
        let q = if self.q.is_finite() { self.q } else { 0.0 };
        let r = if self.r.is_finite() { self.r } else { 0.0 };
        HexCoord::new(q.round() as i32, r.round() as i32)
    }

    /// Declared tile type, defaulting to corridor.
    pub fn hex_type(&self) -> HexType {
        match self.kind.as_deref() {
            Some(kind) if kind.eq_ignore_ascii_case("room") => HexType::Room,
            _ => HexType::Corridor,
        }
    }
}

/// Response metadata reported by the generator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapMetadata {
    /// Number of tiles in the response.
    #[serde(default, alias = "totalHexagons")]
    pub total_hexagons: usize,
    /// Generator seed, when the source reports one.
    #[serde(default)]
    pub seed: Option<u32>,
    /// Free-form dimension report; logged, never interpreted.
    #[serde(default)]
    pub dimensions: Option<serde_json::Value>,
    /// Server-side generation time in seconds.
    #[serde(default, alias = "generationTime")]
    pub generation_time: f64,
}

/// Full map-generation response.
#[derive(Debug, Clone, Deserialize)]
pub struct MapResponse {
    /// Raw tile records.
    #[serde(default)]
    pub hexagons: Vec<RawHex>,
    /// Response metadata.
    #[serde(default)]
    pub metadata: MapMetadata,
}

/// Where map data comes from.
#[derive(Debug, Clone)]
pub enum MapSource {
    /// Remote generator endpoint (native builds only).
    Url(String),
    /// Previously saved response on disk.
    File(String),
    /// Built-in noise generator.
    Generated {
        /// Noise seed; regeneration bumps it.
        seed: u32,
        /// Disc radius in tiles.
        radius: u32,
    },
}

impl MapSource {
    /// Loads or generates one map response.
    pub fn load(&self) -> Result<MapResponse, MapError> {
        match self {
            Self::Generated { seed, radius } => Ok(generate_map(*seed, *radius)),
            Self::File(path) => {
                let body = std::fs::read_to_string(path).map_err(|source| MapError::Io {
                    path: path.clone(),
                    source,
                })?;
                Ok(serde_json::from_str(&body)?)
            }
            #[cfg(feature = "native")]
            Self::Url(url) => {
                let body = ureq::get(url)
                    .call()
                    .map_err(|e| MapError::Fetch(e.to_string()))?
                    .into_string()
                    .map_err(|e| MapError::Fetch(e.to_string()))?;
                Ok(serde_json::from_str(&body)?)
            }
            #[cfg(not(feature = "native"))]
            Self::Url(_) => Err(MapError::Fetch(
                "URL sources require the native feature".into(),
            )),
        }
    }
}

/// Maps a noise value from the standard `[-1, 1]` range into `[min, max]`.
fn map_noise_to_range(noise_val: f64, min: f32, max: f32) -> f32 {
    min + ((noise_val as f32 + 1.0) / 2.0) * (max - min)
}

const HEIGHT_NOISE_SCALE: f64 = 130.0;
const ROOM_NOISE_SCALE: f64 = 90.0;
/// Noise above this marks a tile as a room instead of a corridor.
const ROOM_THRESHOLD: f64 = 0.12;
/// Adjacent walkable tiles connect when their height step is at most this.
const CONNECT_HEIGHT_STEP: f32 = 2.0;
/// Ceiling of generated heights; above `WALKABLE_MAX_HEIGHT` becomes solid.
const MAX_GENERATED_HEIGHT: f32 = 13.0;

/// Builds a dungeon disc offline, in the same shape a remote response has.
///
/// Heights come from fractal noise; the tall band becomes solid blocks that
/// carve the dungeon. Walkable neighbors on comparable heights are connected
/// from both sides, so room/corridor boundaries produce doorways.
pub fn generate_map(seed: u32, radius: u32) -> MapResponse {
    let started = Instant::now();
    let height_fbm: Fbm<Perlin> = Fbm::new(seed).set_octaves(4);
    let room_fbm: Fbm<Perlin> = Fbm::new(seed.wrapping_add(1)).set_octaves(3);

    let coords = hex::hex_spiral(HexCoord::ZERO, radius);
    let mut records: Vec<RawHex> = Vec::with_capacity(coords.len());

    for coord in &coords {
        let pos = hex::hex_to_position(*coord);
        let height_noise = height_fbm.get([
            pos.x as f64 / HEIGHT_NOISE_SCALE,
            pos.z as f64 / HEIGHT_NOISE_SCALE,
        ]);
        let height = map_noise_to_range(height_noise, 0.5, MAX_GENERATED_HEIGHT);

        let room_noise = room_fbm.get([
            pos.x as f64 / ROOM_NOISE_SCALE,
            pos.z as f64 / ROOM_NOISE_SCALE,
        ]);
        let kind = if room_noise > ROOM_THRESHOLD {
            "room"
        } else {
            "corridor"
        };

        records.push(RawHex {
            id: Some(coord.key()),
            q: coord.q as f64,
            r: coord.r as f64,
            s: coord.s as f64,
            height: Some(height as f64),
            kind: Some(kind.to_string()),
            connections: Some(Vec::new()),
        });
    }

    // Connect walkable neighbors on comparable heights, from both sides.
    let heights: Vec<f32> = records
        .iter()
        .map(|rec| rec.height.unwrap_or(1.0) as f32)
        .collect();
    let index_of = |coord: HexCoord| coords.iter().position(|c| *c == coord);
    let mut connections: Vec<Vec<String>> = vec![Vec::new(); records.len()];
    for (i, coord) in coords.iter().enumerate() {
        if heights[i] >= WALKABLE_MAX_HEIGHT {
            continue;
        }
        for neighbor in coord.neighbors() {
            let Some(j) = index_of(neighbor) else { continue };
            if heights[j] < WALKABLE_MAX_HEIGHT
                && (heights[i] - heights[j]).abs() <= CONNECT_HEIGHT_STEP
            {
                connections[i].push(neighbor.key());
            }
        }
    }
    for (rec, conns) in records.iter_mut().zip(connections) {
        rec.connections = Some(conns);
    }

    let total = records.len();
    MapResponse {
        hexagons: records,
        metadata: MapMetadata {
            total_hexagons: total,
            seed: Some(seed),
            dimensions: None,
            generation_time: started.elapsed().as_secs_f64(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_hex_defaults_cover_missing_fields() {
        let raw: RawHex = serde_json::from_str(r#"{"q": 2, "r": -1}"#).unwrap();
        assert_eq!(raw.coord(), HexCoord::new(2, -1));
        assert_eq!(raw.hex_type(), HexType::Corridor);
        assert!(raw.height.is_none());
        assert!(raw.connections.is_none());
    }

    #[test]
    fn room_type_is_case_insensitive() {
        let raw: RawHex = serde_json::from_str(r#"{"q": 0, "r": 0, "type": "ROOM"}"#).unwrap();
        assert_eq!(raw.hex_type(), HexType::Room);
    }

    #[test]
    fn unknown_type_falls_back_to_corridor() {
        let raw: RawHex = serde_json::from_str(r#"{"q": 0, "r": 0, "type": "lava"}"#).unwrap();
        assert_eq!(raw.hex_type(), HexType::Corridor);
    }

    #[test]
    fn fractional_coordinates_round_to_nearest_tile() {
        let raw: RawHex = serde_json::from_str(r#"{"q": 1.2, "r": -0.8}"#).unwrap();
        assert_eq!(raw.coord(), HexCoord::new(1, -1));
    }

    #[test]
    fn response_parses_full_contract() {
        let body = r#"{
            "hexagons": [
                {"id": "h1", "q": 0, "r": 0, "s": 0, "height": 2.5,
                 "type": "room", "connections": ["h2"]},
                {"id": "h2", "q": 1, "r": 0, "s": -1, "height": 1.0,
                 "type": "corridor", "connections": ["h1"]}
            ],
            "metadata": {"totalHexagons": 2, "seed": 7, "generation_time": 0.25}
        }"#;
        let resp: MapResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.hexagons.len(), 2);
        assert_eq!(resp.metadata.total_hexagons, 2);
        assert_eq!(resp.metadata.seed, Some(7));
    }

    #[test]
    fn generated_map_is_deterministic_per_seed() {
        let a = generate_map(42, 4);
        let b = generate_map(42, 4);
        assert_eq!(a.hexagons.len(), b.hexagons.len());
        for (ra, rb) in a.hexagons.iter().zip(&b.hexagons) {
            assert_eq!(ra.id, rb.id);
            assert_eq!(ra.height, rb.height);
            assert_eq!(ra.connections, rb.connections);
        }
    }

    #[test]
    fn generated_connections_are_bidirectional() {
        let map = generate_map(7, 5);
        let find = |id: &str| map.hexagons.iter().find(|rec| rec.id.as_deref() == Some(id));
        for rec in &map.hexagons {
            let my_id = rec.id.as_deref().unwrap();
            for other_id in rec.connections.as_deref().unwrap_or_default() {
                let other = find(other_id).expect("connection points at existing tile");
                assert!(
                    other
                        .connections
                        .as_deref()
                        .unwrap_or_default()
                        .iter()
                        .any(|c| c == my_id),
                    "connection {my_id} -> {other_id} not declared back"
                );
            }
        }
    }

    #[test]
    fn generated_map_has_walkable_tiles() {
        let map = generate_map(42, 6);
        let walkable = map
            .hexagons
            .iter()
            .filter(|rec| (rec.height.unwrap_or(1.0) as f32) < WALKABLE_MAX_HEIGHT)
            .count();
        assert!(walkable > 0, "a generated dungeon must have somewhere to stand");
    }
}
