use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

/// Whether the panel style has been installed
#[derive(Resource, Default)]
pub struct ThemeApplied(pub bool);

pub struct ThemePlugin;

impl Plugin for ThemePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ThemeApplied>()
            .add_systems(Update, apply_panel_theme);
    }
}

/// Muted palette that reads well over a bright or a night sky
pub mod colors {
    use bevy_egui::egui::Color32;

    pub const BG_DARKEST: Color32 = Color32::from_rgb(14, 14, 18);
    // Translucent so the sky stays visible behind the panel
    pub const PANEL_BG: Color32 = Color32::from_rgba_premultiplied(18, 18, 22, 225);
    pub const SECTION_BG: Color32 = Color32::from_rgb(34, 34, 40);

    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(225, 225, 230);
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(150, 150, 160);

    pub const ACCENT_GOLD: Color32 = Color32::from_rgb(235, 190, 90);

    pub const WIDGET_BG: Color32 = Color32::from_rgb(44, 44, 52);
    pub const WIDGET_BG_HOVER: Color32 = Color32::from_rgb(56, 56, 66);
    pub const WIDGET_BG_ACTIVE: Color32 = Color32::from_rgb(68, 68, 80);
    pub const WIDGET_BORDER: Color32 = Color32::from_rgb(70, 70, 82);

    pub const STATUS_SUCCESS: Color32 = Color32::from_rgb(80, 200, 120);
    pub const STATUS_ERROR: Color32 = Color32::from_rgb(230, 90, 90);
}

/// Install the panel style once egui is up
fn apply_panel_theme(mut contexts: EguiContexts, mut theme_applied: ResMut<ThemeApplied>) {
    if theme_applied.0 {
        return;
    }

    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let mut style = (*ctx.style()).clone();

    style.spacing.item_spacing = egui::vec2(8.0, 4.0);
    style.spacing.window_margin = egui::Margin::same(10);
    style.spacing.slider_width = 150.0;

    style.visuals.window_corner_radius = egui::CornerRadius::same(6);
    style.visuals.widgets.inactive.corner_radius = egui::CornerRadius::same(3);
    style.visuals.widgets.hovered.corner_radius = egui::CornerRadius::same(3);
    style.visuals.widgets.active.corner_radius = egui::CornerRadius::same(3);

    style.visuals.window_fill = colors::PANEL_BG;
    style.visuals.window_stroke = egui::Stroke::new(1.0, colors::WIDGET_BORDER);
    style.visuals.panel_fill = colors::PANEL_BG;

    style.visuals.widgets.noninteractive.fg_stroke =
        egui::Stroke::new(1.0, colors::TEXT_SECONDARY);
    // Separators
    style.visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, colors::SECTION_BG);

    style.visuals.widgets.inactive.bg_fill = colors::WIDGET_BG;
    style.visuals.widgets.inactive.weak_bg_fill = colors::WIDGET_BG;
    style.visuals.widgets.inactive.fg_stroke = egui::Stroke::new(1.0, colors::TEXT_PRIMARY);

    style.visuals.widgets.hovered.bg_fill = colors::WIDGET_BG_HOVER;
    style.visuals.widgets.hovered.weak_bg_fill = colors::WIDGET_BG_HOVER;
    style.visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, colors::ACCENT_GOLD);

    style.visuals.widgets.active.bg_fill = colors::WIDGET_BG_ACTIVE;
    style.visuals.widgets.active.weak_bg_fill = colors::WIDGET_BG_ACTIVE;
    style.visuals.widgets.active.bg_stroke = egui::Stroke::new(1.0, colors::ACCENT_GOLD);

    // Slider fill and checkbox ticks
    style.visuals.selection.bg_fill = colors::ACCENT_GOLD.gamma_multiply(0.6);
    style.visuals.selection.stroke = egui::Stroke::new(1.0, colors::ACCENT_GOLD);

    style.visuals.extreme_bg_color = colors::BG_DARKEST;
    style.visuals.override_text_color = Some(colors::TEXT_PRIMARY);

    ctx.set_style(style);
    theme_applied.0 = true;

    debug!("Applied debug panel theme");
}
