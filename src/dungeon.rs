//! Dungeon data: map ingest, the immutable tile snapshot, and tile meshes.
//!
//! Loads one map response at startup (remote, file, or built-in generator),
//! builds the [`DungeonLayout`] snapshot everything else derives from, and
//! spawns floor/solid-block meshes. `R` regenerates the dungeon wholesale.

mod dungeon_layout;
pub mod entities;
pub mod map_source;
mod systems;

pub use dungeon_layout::{DungeonHex, DungeonLayout, HexType};
pub use map_source::{MapError, MapSource};

use bevy::prelude::*;

use crate::GameState;

/// Configuration for dungeon loading.
#[derive(Resource, Clone, Debug)]
pub struct DungeonConfig {
    /// Where map data comes from.
    pub source: MapSource,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            source: MapSource::Generated {
                seed: 42,
                radius: 12,
            },
        }
    }
}

/// Dungeon plugin: map load at startup, tile meshes, regeneration.
pub struct DungeonPlugin(pub DungeonConfig);

impl Plugin for DungeonPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<entities::FloorTile>()
            .register_type::<entities::SolidBlock>()
            .insert_resource(self.0.clone())
            .insert_resource(ClearColor(Color::srgb(0.01, 0.01, 0.02)))
            .add_systems(
                Startup,
                (systems::setup_materials, systems::load_dungeon).chain(),
            )
            .add_systems(
                Update,
                systems::regenerate_dungeon.run_if(in_state(GameState::Running)),
            )
            .add_systems(
                Update,
                systems::spawn_tiles.after(systems::regenerate_dungeon),
            )
            .add_systems(
                Update,
                systems::draw_wall_hints.run_if(in_state(GameState::Debugging)),
            );
    }
}
