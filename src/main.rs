//! Standalone fireworks demo.

use bevy::log::LogPlugin;
use bevy::prelude::*;
use firework_sky::FireworkSkyPlugin;

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Firework Sky".to_string(),
                        ..default()
                    }),
                    ..default()
                })
                .set(LogPlugin {
                    filter: "wgpu=error,naga=warn".to_string(),
                    ..default()
                }),
        )
        .add_plugins(FireworkSkyPlugin)
        .run();
}
