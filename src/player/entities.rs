//! ECS surface of the player module.

use bevy::prelude::*;

/// Marker on the player camera entity.
#[derive(Component, Reflect)]
pub struct Player;

/// Set on frames where the cursor was warped back to the window center, so
/// the resulting synthetic mouse delta is ignored.
#[derive(Resource, Default)]
pub struct CursorRecentered(pub bool);
