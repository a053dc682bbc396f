//! # bevy_preetham_sky
//!
//! The Preetham analytic daylight model as a Bevy material, rendered on an
//! inward-facing box that follows the camera and sits at the far plane.
//!
//! Parameters live in the [`SkyParams`] resource. Changing it updates the sky
//! material and the exposure of every camera tagged with [`SkyCamera`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy::render::view::Hdr;
//! use bevy_preetham_sky::{SkyCamera, SkyParams, SkyPlugin};
//!
//! fn main() {
//!     App::new()
//!         .add_plugins((DefaultPlugins, SkyPlugin))
//!         .insert_resource(SkyParams {
//!             elevation: 12.0,
//!             ..default()
//!         })
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(mut commands: Commands) {
//!     commands.spawn((Camera3d::default(), Hdr, SkyCamera));
//! }
//! ```

mod dome;
mod material;
pub mod params;

pub use dome::sky_box_mesh;
pub use material::{SkyMaterial, SkyMaterialPlugin, SkyUniform};
pub use params::{ParamRange, Scattering, SkyParams};

use bevy::camera::Exposure;
use bevy::camera::visibility::NoFrustumCulling;
use bevy::light::NotShadowCaster;
use bevy::prelude::*;
use bevy::transform::TransformSystems;

/// Marker for the sky box entity.
#[derive(Component)]
pub struct Sky;

/// Cameras the sky follows and whose exposure it drives.
#[derive(Component, Default)]
pub struct SkyCamera;

/// Registers the sky material and keeps it in sync with [`SkyParams`].
pub struct SkyPlugin;

impl Plugin for SkyPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(SkyMaterialPlugin)
            .register_type::<SkyParams>()
            .init_resource::<SkyParams>()
            .add_systems(Startup, spawn_sky)
            .add_systems(
                PostUpdate,
                (
                    sync_sky_material.run_if(resource_changed::<SkyParams>),
                    apply_exposure,
                    follow_camera.before(TransformSystems::Propagate),
                ),
            );
    }
}

fn spawn_sky(
    mut commands: Commands,
    params: Res<SkyParams>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<SkyMaterial>>,
) {
    commands.spawn((
        Name::new("Sky"),
        Sky,
        Mesh3d(meshes.add(sky_box_mesh())),
        MeshMaterial3d(materials.add(SkyMaterial::new(&params))),
        Transform::default(),
        NotShadowCaster,
        NoFrustumCulling,
    ));

    info!(
        "Sky ready: elevation {:.2}°, azimuth {:.1}°",
        params.elevation, params.azimuth
    );
}

/// Push changed parameters into every sky material.
fn sync_sky_material(
    params: Res<SkyParams>,
    skies: Query<&MeshMaterial3d<SkyMaterial>, With<Sky>>,
    mut materials: ResMut<Assets<SkyMaterial>>,
) {
    let uniform = SkyUniform::from(&*params);
    for handle in &skies {
        if let Some(material) = materials.get_mut(&handle.0) {
            material.uniform = uniform;
        }
    }
}

/// Drive camera exposure from the sky parameters.
fn apply_exposure(
    mut commands: Commands,
    params: Res<SkyParams>,
    cameras: Query<(Entity, Ref<SkyCamera>)>,
) {
    let ev100 = params.clamped().ev100();
    for (entity, camera) in &cameras {
        if params.is_changed() || camera.is_added() {
            commands.entity(entity).insert(Exposure { ev100 });
        }
    }
}

/// Keep the sky box centered on the camera.
fn follow_camera(
    cameras: Query<&Transform, (With<SkyCamera>, Without<Sky>)>,
    mut skies: Query<&mut Transform, (With<Sky>, Without<SkyCamera>)>,
) {
    let Some(camera) = cameras.iter().next() else {
        return;
    };
    for mut transform in &mut skies {
        if transform.translation != camera.translation {
            transform.translation = camera.translation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        let mut app = App::new();
        app.init_resource::<SkyParams>()
            .init_resource::<Assets<SkyMaterial>>()
            .add_systems(
                Update,
                (
                    sync_sky_material.run_if(resource_changed::<SkyParams>),
                    apply_exposure,
                    follow_camera,
                ),
            );
        app
    }

    #[test]
    fn exposure_follows_params() {
        let mut app = test_app();
        let camera = app.world_mut().spawn(SkyCamera).id();
        app.update();

        let expected = SkyParams::default().ev100();
        let ev100 = app.world().get::<Exposure>(camera).map(|e| e.ev100);
        assert_eq!(ev100, Some(expected));

        app.world_mut().resource_mut::<SkyParams>().exposure = 0.25;
        app.update();
        let exposure = app.world().get::<Exposure>(camera).map(|e| e.exposure());
        assert!((exposure.unwrap_or_default() - 0.25).abs() < 1e-4);
    }

    #[test]
    fn material_tracks_sun_position() {
        let mut app = test_app();
        let handle = app
            .world_mut()
            .resource_mut::<Assets<SkyMaterial>>()
            .add(SkyMaterial::default());
        app.world_mut().spawn((Sky, MeshMaterial3d(handle.clone())));
        app.update();

        app.world_mut().resource_mut::<SkyParams>().elevation = 90.0;
        app.update();

        let materials = app.world().resource::<Assets<SkyMaterial>>();
        let sun = materials.get(&handle).map(|m| m.uniform.sun_direction);
        assert!((sun.unwrap_or_default() - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn sky_box_stays_on_camera() {
        let mut app = test_app();
        app.world_mut()
            .spawn((SkyCamera, Transform::from_xyz(1.5, 0.0, 6.0)));
        let sky = app.world_mut().spawn((Sky, Transform::default())).id();
        app.update();

        let translation = app.world().get::<Transform>(sky).map(|t| t.translation);
        assert_eq!(translation, Some(Vec3::new(1.5, 0.0, 6.0)));
    }
}
