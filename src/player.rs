//! First-person player controller.
//!
//! WASD + mouse look. Intended XZ displacement is resolved through
//! [`crate::collision::check_wall_collision`] every frame, so walls push back
//! and glancing contact slides instead of stopping. Spawns the Camera3d with
//! HDR and bloom.

mod entities;
mod systems;

pub use entities::Player;

use bevy::prelude::*;

use crate::GameState;

/// Per-plugin configuration for the player controller.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct PlayerConfig {
    /// WASD movement speed in world-units per second.
    pub move_speed: f32,
    /// Horizontal mouse sensitivity (radians per pixel).
    pub mouse_sensitivity_x: f32,
    /// Vertical mouse sensitivity (radians per pixel).
    pub mouse_sensitivity_y: f32,
    /// Margin from vertical to prevent camera flip (radians).
    pub pitch_margin: f32,
    /// Pixel margin from window edge that triggers cursor recentering.
    pub edge_margin: f32,
    /// Bloom post-processing intensity.
    pub bloom_intensity: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 30.0,
            mouse_sensitivity_x: 0.003,
            mouse_sensitivity_y: 0.002,
            pitch_margin: 0.05,
            edge_margin: 100.0,
            bloom_intensity: 0.3,
        }
    }
}

/// First-person controller with wall collision and sliding.
pub struct PlayerPlugin(pub PlayerConfig);

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Player>()
            .register_type::<PlayerConfig>()
            .insert_resource(self.0.clone())
            .init_resource::<entities::CursorRecentered>()
            .add_systems(Startup, systems::hide_cursor)
            .add_systems(Update, systems::spawn_or_respawn_player)
            .add_systems(
                Update,
                systems::recenter_cursor.run_if(in_state(GameState::Running)),
            )
            .add_systems(
                Update,
                systems::walk
                    .after(systems::spawn_or_respawn_player)
                    .after(systems::recenter_cursor)
                    .run_if(in_state(GameState::Running)),
            )
            .add_systems(
                Update,
                systems::debug_collision_boxes.run_if(in_state(GameState::Debugging)),
            );
    }
}
