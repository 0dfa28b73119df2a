//! Wall rendering: canonical segments cached per dungeon version.
//!
//! [`segments`] holds the pure deduplicated segment builder; the systems here
//! rebuild the cache and respawn wall meshes only when the dungeon snapshot's
//! version changes.

pub mod segments;
mod systems;

pub use segments::{SegmentKind, WallGeometry, WallSegment, build_wall_segments};

use bevy::prelude::*;

use crate::GameState;

/// Cached derived geometry for one dungeon version.
///
/// Keyed by [`crate::dungeon::DungeonLayout::version`]: recomputed only when
/// the snapshot is replaced, never per frame.
#[derive(Resource)]
pub struct WallCache {
    /// Version of the snapshot this geometry was derived from.
    pub version: u64,
    /// Deduplicated wall and doorway segments.
    pub geometry: WallGeometry,
}

/// Marker on spawned wall segment meshes.
#[derive(Component, Reflect)]
pub struct WallMesh {
    /// Canonical edge id of the segment this mesh renders.
    pub segment_id: String,
}

/// Wall plugin: version-keyed segment cache plus mesh spawning.
pub struct WallsPlugin;

impl Plugin for WallsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<WallMesh>()
            .add_systems(Update, systems::sync_wall_meshes)
            .add_systems(
                Update,
                systems::draw_segment_spans.run_if(in_state(GameState::Debugging)),
            );
    }
}
