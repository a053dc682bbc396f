//! # Firework Sky
//!
//! Firework bursts over a procedural Preetham daylight sky, with an orbit
//! camera and a debug panel for tuning both.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bevy::prelude::*;
//! use firework_sky::FireworkSkyPlugin;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(FireworkSkyPlugin)
//!         .run();
//! }
//! ```
//!
//! ## Controls
//!
//! - **Left drag**: orbit around the target
//! - **Right / middle drag**: pan
//! - **Wheel**: zoom
//! - **Click** (without dragging) or **Space**: launch a random burst
//! - **H**: show or hide the debug panel
//!
//! Settings saved from the panel are stored as RON in the user config
//! directory and loaded on the next start.

pub mod camera;
pub mod launcher;
pub mod settings;
pub mod ui;

pub use camera::{CameraSettings, OrbitCamera, OrbitCameraPlugin};
pub use launcher::{LauncherPlugin, LauncherSettings};
pub use settings::{Settings, SettingsPlugin};

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_firework::FireworkPlugin;
use bevy_preetham_sky::SkyPlugin;

use crate::ui::UiPlugin;

/// Main plugin that bundles the whole demo
pub struct FireworkSkyPlugin;

impl Plugin for FireworkSkyPlugin {
    fn build(&self, app: &mut App) {
        app
            // Third-party plugins
            .add_plugins(EguiPlugin::default())
            // Rendering
            .add_plugins(SkyPlugin)
            .add_plugins(FireworkPlugin)
            // Persisted values override the plugin defaults
            .add_plugins(SettingsPlugin)
            // Interaction
            .add_plugins(OrbitCameraPlugin)
            .add_plugins(LauncherPlugin)
            // UI
            .add_plugins(UiPlugin);
    }
}
