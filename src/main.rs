#![warn(missing_docs)]
//! First-person hexagonal dungeon explorer.
//!
//! Consumes a procedurally generated map (remote API, saved file, or the
//! built-in noise generator), derives wall/doorway geometry per shared tile
//! edge, and moves a colliding first-person camera through it.

mod collision;
mod dungeon;
pub mod hex;
mod player;
mod topology;
mod walls;

use bevy::app::AppExit;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions};
use bevy_inspector_egui::quick::WorldInspectorPlugin;

use dungeon::DungeonConfig;

/// Application-wide game state, used for system scheduling.
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash, Reflect)]
pub enum GameState {
    /// Normal gameplay — movement, collision, regeneration.
    #[default]
    Running,
    /// Debug overlay active (Tab to toggle).
    Debugging,
}

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Hex Dungeon".into(),
            ..default()
        }),
        ..default()
    }))
    .register_type::<GameState>()
    .init_state::<GameState>()
    .insert_resource(GlobalAmbientLight {
        color: Color::WHITE,
        brightness: 120.0,
        ..default()
    })
    .add_plugins(bevy_egui::EguiPlugin::default())
    .add_plugins(dungeon::DungeonPlugin(dungeon_config()))
    .add_plugins(walls::WallsPlugin)
    .add_plugins(player::PlayerPlugin(player::PlayerConfig::default()))
    .add_systems(Update, exit_on_esc)
    .add_systems(Update, toggle_inspector)
    .add_plugins(WorldInspectorPlugin::new().run_if(in_state(GameState::Debugging)));

    app.run();
}

/// Map-source selection from the command line (native builds).
#[cfg(feature = "native")]
#[derive(clap::Parser)]
struct Args {
    /// Remote map-generator endpoint returning the hexagon response.
    #[arg(long)]
    map_url: Option<String>,
    /// Previously saved map response (JSON file).
    #[arg(long)]
    map_file: Option<String>,
    /// Seed for the built-in generator.
    #[arg(long, default_value_t = 42)]
    seed: u32,
    /// Disc radius in tiles for the built-in generator.
    #[arg(long, default_value_t = 12)]
    radius: u32,
}

#[cfg(feature = "native")]
fn dungeon_config() -> DungeonConfig {
    use clap::Parser;

    use dungeon::MapSource;

    let args = Args::parse();
    let source = if let Some(url) = args.map_url {
        MapSource::Url(url)
    } else if let Some(path) = args.map_file {
        MapSource::File(path)
    } else {
        MapSource::Generated {
            seed: args.seed,
            radius: args.radius,
        }
    };
    DungeonConfig { source }
}

#[cfg(not(feature = "native"))]
fn dungeon_config() -> DungeonConfig {
    DungeonConfig::default()
}

fn toggle_inspector(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next: ResMut<NextState<GameState>>,
    mut windows: Query<(&mut CursorOptions, &mut Window)>,
) {
    if keys.just_pressed(KeyCode::Tab) {
        let new_state = match state.get() {
            GameState::Running => GameState::Debugging,
            GameState::Debugging => GameState::Running,
        };
        let entering_debug = new_state == GameState::Debugging;
        next.set(new_state);
        for (mut opts, mut window) in &mut windows {
            if entering_debug {
                opts.visible = true;
                opts.grab_mode = CursorGrabMode::None;
            } else {
                opts.visible = false;
                opts.grab_mode = CursorGrabMode::Confined;
                let center = Vec2::new(window.width() / 2.0, window.height() / 2.0);
                window.set_cursor_position(Some(center));
            }
        }
    }
}

fn exit_on_esc(keys: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
