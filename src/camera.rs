use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit};
use bevy::post_process::bloom::Bloom;
use bevy::prelude::*;
use bevy::render::view::Hdr;
use bevy_egui::EguiContexts;
use bevy_preetham_sky::SkyCamera;
use serde::{Deserialize, Serialize};

/// Where the camera starts, looking at the origin
const START_POSITION: Vec3 = Vec3::new(1.5, 0.0, 6.0);
/// Vertical field of view in degrees
const FOV_DEGREES: f32 = 25.0;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 100.0;
/// Keeps the camera off the poles so `looking_at` stays well defined
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
/// Pixels of scroll that count as one wheel line
const PIXELS_PER_LINE: f32 = 100.0;

/// Tunable orbit control behavior.
#[derive(Resource, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CameraSettings {
    /// Fraction of the remaining motion applied each frame (0 = no damping)
    pub damping: f32,
    /// Radians per pixel of drag
    pub rotate_speed: f32,
    /// Pan distance per pixel, relative to the orbit distance
    pub pan_speed: f32,
    /// Log-distance change per wheel line
    pub zoom_speed: f32,
    pub bloom: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            damping: 0.05,
            rotate_speed: 0.005,
            pan_speed: 0.001,
            zoom_speed: 0.1,
            bloom: false,
        }
    }
}

/// Orbit state: spherical coordinates around `target` plus pending motion.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    /// Angle around +Y, 0 looking down -Z
    pub yaw: f32,
    /// Angle above the horizontal plane
    pub pitch: f32,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub yaw_velocity: f32,
    pub pitch_velocity: f32,
    /// Pending change of `ln(distance)`
    pub zoom_velocity: f32,
    pub pan_velocity: Vec3,
}

impl OrbitCamera {
    /// Orbit that places the camera at `position` looking at `target`.
    pub fn from_position(position: Vec3, target: Vec3) -> Self {
        let offset = position - target;
        let distance = offset.length().max(f32::EPSILON);
        Self {
            target,
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / distance).clamp(-1.0, 1.0).asin(),
            distance,
            min_distance: 0.5,
            max_distance: 50.0,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            zoom_velocity: 0.0,
            pan_velocity: Vec3::ZERO,
        }
    }

    pub fn position(&self) -> Vec3 {
        let (yaw_sin, yaw_cos) = self.yaw.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.sin_cos();
        self.target + Vec3::new(yaw_sin * pitch_cos, pitch_sin, yaw_cos * pitch_cos) * self.distance
    }

    /// Apply a `damping` fraction of the pending motion and decay the rest.
    ///
    /// With `damping == 0` all pending motion is applied at once.
    pub fn step(&mut self, damping: f32) {
        let damping = damping.clamp(0.0, 1.0);
        let (apply, keep) = if damping > 0.0 {
            (damping, 1.0 - damping)
        } else {
            (1.0, 0.0)
        };

        self.yaw += self.yaw_velocity * apply;
        self.pitch = (self.pitch + self.pitch_velocity * apply).clamp(-MAX_PITCH, MAX_PITCH);
        self.distance = (self.distance * (self.zoom_velocity * apply).exp())
            .clamp(self.min_distance, self.max_distance);
        self.target += self.pan_velocity * apply;

        self.yaw_velocity *= keep;
        self.pitch_velocity *= keep;
        self.zoom_velocity *= keep;
        self.pan_velocity *= keep;
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position()).looking_at(self.target, Vec3::Y)
    }
}

pub struct OrbitCameraPlugin;

impl Plugin for OrbitCameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraSettings>()
            .add_systems(Startup, spawn_camera)
            .add_systems(Update, (orbit_input, apply_orbit).chain())
            .add_systems(Update, sync_bloom.run_if(resource_changed::<CameraSettings>));
    }
}

fn projection() -> Projection {
    Projection::Perspective(PerspectiveProjection {
        fov: FOV_DEGREES.to_radians(),
        near: NEAR_PLANE,
        far: FAR_PLANE,
        ..default()
    })
}

fn spawn_camera(mut commands: Commands) {
    let orbit = OrbitCamera::from_position(START_POSITION, Vec3::ZERO);

    commands.spawn((
        Name::new("Camera"),
        Camera3d::default(),
        Hdr,
        Tonemapping::AcesFitted,
        projection(),
        orbit.transform(),
        orbit,
        SkyCamera,
    ));
}

/// Rotate with left drag, pan with right or middle drag, zoom with the wheel.
fn orbit_input(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    settings: Res<CameraSettings>,
    mut cameras: Query<(&mut OrbitCamera, &Transform)>,
    mut contexts: EguiContexts,
) {
    // Don't steal input from the debug panel
    if let Ok(ctx) = contexts.ctx_mut() {
        if ctx.wants_pointer_input() || ctx.is_pointer_over_area() {
            return;
        }
    }

    let drag = mouse_motion.delta;
    let scroll = match mouse_scroll.unit {
        MouseScrollUnit::Line => mouse_scroll.delta.y,
        MouseScrollUnit::Pixel => mouse_scroll.delta.y / PIXELS_PER_LINE,
    };

    for (mut orbit, transform) in &mut cameras {
        if drag != Vec2::ZERO {
            if mouse_buttons.pressed(MouseButton::Left) {
                orbit.yaw_velocity -= drag.x * settings.rotate_speed;
                orbit.pitch_velocity += drag.y * settings.rotate_speed;
            } else if mouse_buttons.any_pressed([MouseButton::Right, MouseButton::Middle]) {
                let pan = (-transform.right() * drag.x + transform.up() * drag.y)
                    * settings.pan_speed
                    * orbit.distance;
                orbit.pan_velocity += pan;
            }
        }

        if scroll != 0.0 {
            orbit.zoom_velocity -= scroll * settings.zoom_speed;
        }
    }
}

fn apply_orbit(
    settings: Res<CameraSettings>,
    mut cameras: Query<(&mut OrbitCamera, &mut Transform)>,
) {
    for (mut orbit, mut transform) in &mut cameras {
        orbit.step(settings.damping);
        *transform = orbit.transform();
    }
}

fn sync_bloom(
    mut commands: Commands,
    settings: Res<CameraSettings>,
    cameras: Query<Entity, With<OrbitCamera>>,
) {
    for entity in &cameras {
        if settings.bloom {
            commands.entity(entity).insert(Bloom::NATURAL);
        } else {
            commands.entity(entity).remove::<Bloom>();
        }
    }
}
