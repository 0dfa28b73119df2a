//! ECS surface of the dungeon module.

use bevy::prelude::*;

use super::dungeon_layout::DungeonLayout;
use crate::hex::HexCoord;

/// The current dungeon snapshot.
///
/// Replaced wholesale on regeneration; consumers watching
/// [`DungeonLayout::version`] rebuild their derived data then.
#[derive(Resource)]
pub struct DungeonMap {
    /// Immutable tile set.
    pub layout: DungeonLayout,
}

/// Marker on walkable floor tile entities.
#[derive(Component, Reflect)]
pub struct FloorTile {
    /// The tile this mesh renders.
    pub coord: HexCoord,
}

/// Marker on solid (non-walkable) block entities.
#[derive(Component, Reflect)]
pub struct SolidBlock;

/// Shared material handles for the dungeon's neon look.
#[derive(Resource)]
pub struct DungeonMaterials {
    /// Plain walkable floor.
    pub floor: Handle<StandardMaterial>,
    /// Floor of tall tiles that emit light.
    pub glowing_floor: Handle<StandardMaterial>,
    /// Solid rock blocks.
    pub solid: Handle<StandardMaterial>,
    /// Solid wall segments.
    pub wall: Handle<StandardMaterial>,
    /// Doorway frame posts.
    pub doorway: Handle<StandardMaterial>,
}
