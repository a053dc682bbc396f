//! # bevy_firework
//!
//! Firework bursts for Bevy: a shell of point sprites that explodes outward,
//! droops, twinkles and fades, driven by one tweened progress value per burst.
//!
//! Particle positions, sizes and speed multipliers are generated once on the
//! CPU. All animation happens in the vertex shader; the CPU only advances the
//! progress uniform and releases the burst's mesh and material when it ends.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_firework::{BurstSpec, FireworkPlugin, LaunchFirework};
//!
//! fn main() {
//!     App::new()
//!         .add_plugins((DefaultPlugins, FireworkPlugin))
//!         .add_systems(Startup, launch)
//!         .run();
//! }
//!
//! fn launch(mut commands: Commands, mut launches: MessageWriter<LaunchFirework>) {
//!     commands.spawn((Camera3d::default(), Transform::from_xyz(0.0, 0.0, 6.0)));
//!     launches.write(LaunchFirework(BurstSpec::default()));
//! }
//! ```

pub mod burst;
mod material;
pub mod sampling;
pub mod sprites;
pub mod tween;

pub use burst::{
    BurstGeometry, BurstRanges, BurstSpec, FireworkBurst, MAX_BURST_PARTICLES, ScalarRange,
};
pub use material::{FireworkMaterial, FireworkMaterialPlugin, FireworkUniform};
pub use sprites::{FireworkSprites, SpriteShape, SpriteSources};
pub use tween::Tween;

use bevy::camera::visibility::NoFrustumCulling;
use bevy::light::NotShadowCaster;
use bevy::math::curve::EaseFunction;
use bevy::prelude::*;

/// Request to spawn one burst.
#[derive(Message, Debug, Clone)]
pub struct LaunchFirework(pub BurstSpec);

/// Random source shared by every burst.
#[derive(Resource)]
pub struct FireworkRng(pub fastrand::Rng);

impl Default for FireworkRng {
    fn default() -> Self {
        Self(fastrand::Rng::new())
    }
}

/// How long bursts live and how their progress is eased.
#[derive(Resource, Debug, Clone)]
pub struct BurstSettings {
    /// Seconds from launch until the burst is released.
    pub duration: f32,
    pub ease: EaseFunction,
}

impl Default for BurstSettings {
    fn default() -> Self {
        Self {
            duration: 3.0,
            ease: EaseFunction::Linear,
        }
    }
}

/// Registers the firework material, the sprite table and the burst lifecycle.
pub struct FireworkPlugin;

impl Plugin for FireworkPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(FireworkMaterialPlugin)
            .add_message::<LaunchFirework>()
            .init_resource::<FireworkRng>()
            .init_resource::<BurstSettings>()
            .init_resource::<SpriteSources>()
            .init_resource::<FireworkSprites>()
            .add_systems(Startup, sprites::build_sprite_table)
            .add_systems(
                Update,
                (
                    sprites::track_sprite_loads,
                    spawn_requested_bursts,
                    advance_bursts,
                )
                    .chain(),
            );
    }
}

/// Build mesh and material for every requested burst and spawn it.
fn spawn_requested_bursts(
    mut commands: Commands,
    mut requests: MessageReader<LaunchFirework>,
    mut rng: ResMut<FireworkRng>,
    settings: Res<BurstSettings>,
    sprites: Res<FireworkSprites>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<FireworkMaterial>>,
) {
    for LaunchFirework(spec) in requests.read() {
        if spec.count == 0 {
            debug!("Skipping empty firework at {:?}", spec.position);
            continue;
        }

        let geometry = BurstGeometry::generate(&mut rng.0, spec.count, spec.radius);
        let mesh = meshes.add(geometry.to_mesh());
        let material = materials.add(FireworkMaterial::new(
            spec.color,
            spec.size,
            sprites.get(spec.sprite),
        ));

        commands.spawn((
            Name::new("Firework"),
            FireworkBurst {
                particle_count: spec.count,
            },
            Tween::new(0.0, 1.0, settings.duration, settings.ease),
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::from_translation(spec.position),
            NotShadowCaster,
            // Particles are displaced in the vertex shader
            NoFrustumCulling,
        ));

        debug!(
            "Launched firework: {} particles at {:?}, radius {:.2}",
            spec.count, spec.position, spec.radius
        );
    }
}

/// Advance every burst's progress and release finished bursts.
fn advance_bursts(
    mut commands: Commands,
    time: Res<Time>,
    mut bursts: Query<
        (
            Entity,
            &mut Tween,
            &Mesh3d,
            &MeshMaterial3d<FireworkMaterial>,
        ),
        With<FireworkBurst>,
    >,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<FireworkMaterial>>,
) {
    let dt = time.delta_secs();

    for (entity, mut tween, mesh, material) in &mut bursts {
        let progress = tween.advance(dt);
        if let Some(mat) = materials.get_mut(&material.0) {
            mat.uniform.progress = progress;
        }

        if tween.is_finished() {
            commands.entity(entity).despawn();
            meshes.remove(&mesh.0);
            materials.remove(&material.0);
            debug!("Released firework {:?}", entity);
        }
    }
}
