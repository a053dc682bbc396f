use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use bevy_firework::{
    BurstSettings, FireworkBurst, FireworkRng, FireworkSprites, LaunchFirework, SpriteSources,
};
use bevy_preetham_sky::{ParamRange, SkyParams};

use super::theme::colors;
use crate::camera::CameraSettings;
use crate::launcher::{random_launch, LauncherSettings};
use crate::settings::Settings;

const PANEL_WIDTH: f32 = 340.0;

/// Visibility of the debug panel and the outcome of the last save.
#[derive(Resource, Debug)]
pub struct DebugPanelState {
    pub visible: bool,
    /// Message and whether it reports success
    pub status: Option<(String, bool)>,
}

impl Default for DebugPanelState {
    fn default() -> Self {
        Self {
            visible: true,
            status: None,
        }
    }
}

pub struct DebugPanelPlugin;

impl Plugin for DebugPanelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugPanelState>()
            .add_systems(Update, toggle_panel)
            .add_systems(EguiPrimaryContextPass, draw_debug_panel);
    }
}

/// H shows and hides the panel
fn toggle_panel(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut contexts: EguiContexts,
    mut state: ResMut<DebugPanelState>,
) {
    if !keyboard.just_pressed(KeyCode::KeyH) {
        return;
    }
    if contexts.ctx_mut().is_ok_and(|ctx| ctx.wants_keyboard_input()) {
        return;
    }
    state.visible = !state.visible;
}

/// Labelled slider bound to one of the sky parameter ranges.
fn param_slider(ui: &mut egui::Ui, label: &str, value: &mut f32, range: ParamRange) {
    ui.label(label);
    ui.add(egui::Slider::new(value, range.min..=range.max).step_by(range.step as f64));
    ui.end_row();
}

fn draw_debug_panel(
    mut contexts: EguiContexts,
    mut state: ResMut<DebugPanelState>,
    mut sky: ResMut<SkyParams>,
    mut launcher: ResMut<LauncherSettings>,
    mut burst_settings: ResMut<BurstSettings>,
    mut camera: ResMut<CameraSettings>,
    sprite_sources: Res<SpriteSources>,
    sprites: Res<FireworkSprites>,
    mut rng: ResMut<FireworkRng>,
    bursts: Query<&FireworkBurst>,
    mut launches: MessageWriter<LaunchFirework>,
) -> Result {
    if !state.visible {
        return Ok(());
    }

    let ctx = contexts.ctx_mut()?;

    // Edit copies so untouched resources don't register as changed
    let mut sky_edit = *sky;
    let mut launcher_edit = launcher.clone();
    let mut duration = burst_settings.duration;
    let mut camera_edit = camera.clone();

    let (live_bursts, live_particles) = bursts
        .iter()
        .fold((0usize, 0usize), |(b, p), burst| (b + 1, p + burst.particle_count));

    let mut launch_clicked = false;
    let mut save_clicked = false;
    let mut reset_clicked = false;
    let mut open = state.visible;

    egui::Window::new("Debug")
        .open(&mut open)
        .default_width(PANEL_WIDTH)
        .resizable(false)
        .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
        .show(ctx, |ui| {
            ui.heading("Sky");
            egui::Grid::new("debug_sky_grid")
                .num_columns(2)
                .spacing([10.0, 6.0])
                .show(ui, |ui| {
                    param_slider(ui, "Turbidity", &mut sky_edit.turbidity, SkyParams::TURBIDITY);
                    param_slider(ui, "Rayleigh", &mut sky_edit.rayleigh, SkyParams::RAYLEIGH);
                    param_slider(
                        ui,
                        "Mie coefficient",
                        &mut sky_edit.mie_coefficient,
                        SkyParams::MIE_COEFFICIENT,
                    );
                    param_slider(
                        ui,
                        "Mie directional G",
                        &mut sky_edit.mie_directional_g,
                        SkyParams::MIE_DIRECTIONAL_G,
                    );
                    param_slider(ui, "Elevation", &mut sky_edit.elevation, SkyParams::ELEVATION);
                    param_slider(ui, "Azimuth", &mut sky_edit.azimuth, SkyParams::AZIMUTH);
                    param_slider(ui, "Exposure", &mut sky_edit.exposure, SkyParams::EXPOSURE);
                });

            ui.add_space(8.0);
            ui.separator();
            ui.add_space(4.0);

            ui.heading("Fireworks");
            egui::Grid::new("debug_fireworks_grid")
                .num_columns(2)
                .spacing([10.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Auto launch");
                    ui.checkbox(&mut launcher_edit.auto_launch, "");
                    ui.end_row();

                    ui.label("Interval");
                    ui.add_enabled(
                        launcher_edit.auto_launch,
                        egui::Slider::new(
                            &mut launcher_edit.interval,
                            LauncherSettings::INTERVAL_MIN..=LauncherSettings::INTERVAL_MAX,
                        )
                            .step_by(0.1)
                            .suffix(" s"),
                    );
                    ui.end_row();

                    ui.label("Duration");
                    ui.add(
                        egui::Slider::new(&mut duration, 0.5..=10.0)
                            .step_by(0.1)
                            .suffix(" s"),
                    );
                    ui.end_row();
                });

            ui.horizontal(|ui| {
                if ui.button("Launch").clicked() {
                    launch_clicked = true;
                }
                ui.label(
                    egui::RichText::new(format!(
                        "{} bursts, {} particles",
                        live_bursts, live_particles
                    ))
                    .color(colors::TEXT_SECONDARY),
                );
            });

            ui.add_space(8.0);
            ui.separator();
            ui.add_space(4.0);

            ui.heading("Camera");
            egui::Grid::new("debug_camera_grid")
                .num_columns(2)
                .spacing([10.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Damping");
                    ui.add(egui::Slider::new(&mut camera_edit.damping, 0.0..=0.3).step_by(0.005));
                    ui.end_row();

                    ui.label("Bloom");
                    ui.checkbox(&mut camera_edit.bloom, "");
                    ui.end_row();
                });

            ui.add_space(8.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                if ui.button("Save settings").clicked() {
                    save_clicked = true;
                }
                if ui.button("Reset").clicked() {
                    reset_clicked = true;
                }
            });

            if let Some((message, ok)) = &state.status {
                let color = if *ok {
                    colors::STATUS_SUCCESS
                } else {
                    colors::STATUS_ERROR
                };
                ui.label(egui::RichText::new(message).small().color(color));
            }

            ui.label(
                egui::RichText::new("Click or Space to launch · H hides this panel")
                    .small()
                    .color(colors::TEXT_SECONDARY),
            );
        });

    state.visible = open;

    if reset_clicked {
        sky_edit = SkyParams::default();
        launcher_edit = LauncherSettings::default();
        duration = BurstSettings::default().duration;
        camera_edit = CameraSettings::default();
        state.status = None;
        info!("Debug settings reset to defaults");
    }

    if sky_edit != *sky {
        *sky = sky_edit.clamped();
    }
    if launcher_edit != *launcher {
        *launcher = launcher_edit.clamped();
    }
    if duration != burst_settings.duration {
        burst_settings.duration = duration;
    }
    if camera_edit != *camera {
        *camera = camera_edit;
    }

    if launch_clicked {
        launches.write(random_launch(&mut rng, &launcher, &sprites));
    }

    if save_clicked {
        let settings =
            Settings::capture(&sky, &launcher, &burst_settings, &camera, &sprite_sources);
        state.status = Some(match settings.save() {
            Ok(path) => (format!("Saved to {}", path.display()), true),
            Err(e) => (e, false),
        });
    }

    Ok(())
}
