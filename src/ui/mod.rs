pub mod debug_panel;
pub mod theme;

pub use debug_panel::{DebugPanelPlugin, DebugPanelState};
pub use theme::ThemePlugin;

use bevy::prelude::*;

/// Bundles all UI-related plugins
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(ThemePlugin).add_plugins(DebugPanelPlugin);
    }
}
