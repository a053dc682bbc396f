use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;
use bevy_firework::{BurstRanges, BurstSpec, FireworkRng, FireworkSprites, LaunchFirework};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cursor travel in pixels beyond which a press counts as a drag
const CLICK_SLOP: f32 = 4.0;
/// Shortest timer period; also the fallback for intervals a `Duration` can't hold
const MIN_TIMER_SECS: f32 = 0.05;

/// When and where random bursts are launched.
#[derive(Resource, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct LauncherSettings {
    /// Launch bursts on a timer without user input
    pub auto_launch: bool,
    /// Seconds between automatic launches
    pub interval: f32,
    /// Center of the launch box
    pub origin: Vec3,
    pub ranges: BurstRanges,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            auto_launch: false,
            interval: 1.5,
            origin: Vec3::ZERO,
            ranges: BurstRanges::default(),
        }
    }
}

impl LauncherSettings {
    /// Auto-launch interval bounds, in seconds
    pub const INTERVAL_MIN: f32 = 0.1;
    pub const INTERVAL_MAX: f32 = 5.0;

    /// Copy with the interval inside its bounds, a finite origin and usable
    /// burst ranges.
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        Self {
            auto_launch: self.auto_launch,
            interval: if self.interval.is_nan() {
                defaults.interval
            } else {
                self.interval.clamp(Self::INTERVAL_MIN, Self::INTERVAL_MAX)
            },
            origin: if self.origin.is_finite() {
                self.origin
            } else {
                defaults.origin
            },
            ranges: self.ranges.clamped(),
        }
    }
}

/// Timer period for `interval` seconds.
fn timer_period(interval: f32) -> Duration {
    Duration::try_from_secs_f32(interval.max(MIN_TIMER_SECS))
        .unwrap_or(Duration::from_secs_f32(LauncherSettings::INTERVAL_MAX))
}

/// Repeating timer behind automatic launches.
#[derive(Resource, Debug)]
pub struct AutoLauncher {
    timer: Timer,
}

impl Default for AutoLauncher {
    fn default() -> Self {
        Self::new(LauncherSettings::default().interval)
    }
}

impl AutoLauncher {
    pub fn new(interval: f32) -> Self {
        Self {
            timer: Timer::new(timer_period(interval), TimerMode::Repeating),
        }
    }

    /// Number of launches due after `delta` has passed.
    pub fn tick(&mut self, delta: Duration, interval: f32) -> u32 {
        let period = timer_period(interval);
        if self.timer.duration() != period {
            self.timer.set_duration(period);
        }
        self.timer.tick(delta);
        self.timer.times_finished_this_tick()
    }

    pub fn reset(&mut self) {
        self.timer.reset();
    }
}

/// Cursor position when the left button went down outside the UI.
#[derive(Resource, Default, Debug)]
struct PendingClick(Option<Vec2>);

/// True when the press and release are close enough to count as a click.
pub fn is_click(pressed_at: Vec2, released_at: Vec2) -> bool {
    pressed_at.distance(released_at) <= CLICK_SLOP
}

/// Roll a random burst with the current launcher settings.
pub fn random_launch(
    rng: &mut FireworkRng,
    settings: &LauncherSettings,
    sprites: &FireworkSprites,
) -> LaunchFirework {
    LaunchFirework(BurstSpec::random(
        &mut rng.0,
        &settings.ranges,
        settings.origin,
        sprites.len(),
    ))
}

pub struct LauncherPlugin;

impl Plugin for LauncherPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LauncherSettings>()
            .init_resource::<AutoLauncher>()
            .init_resource::<PendingClick>()
            .add_systems(Startup, launch_initial_burst)
            .add_systems(Update, (launch_on_click, launch_on_key, auto_launch));
    }
}

/// A small default burst so the scene is never empty on start.
fn launch_initial_burst(mut launches: MessageWriter<LaunchFirework>) {
    launches.write(LaunchFirework(BurstSpec::default()));
    info!("Initial firework launched");
}

/// Launch where the user clicks without dragging, outside the debug panel.
fn launch_on_click(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut pending: ResMut<PendingClick>,
    mut contexts: EguiContexts,
    mut rng: ResMut<FireworkRng>,
    settings: Res<LauncherSettings>,
    sprites: Res<FireworkSprites>,
    mut launches: MessageWriter<LaunchFirework>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let cursor = window.cursor_position();

    if mouse_buttons.just_pressed(MouseButton::Left) {
        let over_ui = contexts
            .ctx_mut()
            .is_ok_and(|ctx| ctx.wants_pointer_input() || ctx.is_pointer_over_area());
        pending.0 = if over_ui { None } else { cursor };
    }

    if mouse_buttons.just_released(MouseButton::Left) {
        let pressed_at = pending.0.take();
        if let (Some(pressed_at), Some(released_at)) = (pressed_at, cursor) {
            if is_click(pressed_at, released_at) {
                launches.write(random_launch(&mut rng, &settings, &sprites));
            }
        }
    }
}

fn launch_on_key(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut contexts: EguiContexts,
    mut rng: ResMut<FireworkRng>,
    settings: Res<LauncherSettings>,
    sprites: Res<FireworkSprites>,
    mut launches: MessageWriter<LaunchFirework>,
) {
    if !keyboard.just_pressed(KeyCode::Space) {
        return;
    }
    // Space belongs to focused text fields
    if contexts.ctx_mut().is_ok_and(|ctx| ctx.wants_keyboard_input()) {
        return;
    }
    launches.write(random_launch(&mut rng, &settings, &sprites));
}

fn auto_launch(
    time: Res<Time>,
    settings: Res<LauncherSettings>,
    mut launcher: ResMut<AutoLauncher>,
    mut rng: ResMut<FireworkRng>,
    sprites: Res<FireworkSprites>,
    mut launches: MessageWriter<LaunchFirework>,
) {
    if !settings.auto_launch {
        launcher.reset();
        return;
    }

    for _ in 0..launcher.tick(time.delta(), settings.interval) {
        launches.write(random_launch(&mut rng, &settings, &sprites));
    }
}
