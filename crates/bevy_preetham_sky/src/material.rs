use bevy::{
    asset::embedded_asset,
    pbr::{Material, MaterialPlugin},
    prelude::*,
    render::render_resource::{AsBindGroup, ShaderType},
    shader::ShaderRef,
};

use crate::params::SkyParams;

/// Plugin that registers the [`SkyMaterial`] with Bevy's rendering system.
pub struct SkyMaterialPlugin;

impl Plugin for SkyMaterialPlugin {
    fn build(&self, app: &mut App) {
        embedded_asset!(app, "sky.wgsl");
        app.add_plugins(MaterialPlugin::<SkyMaterial>::default());
    }
}

/// Uniform data sent to the GPU for the sky shader.
#[derive(Clone, Copy, ShaderType, Debug, PartialEq)]
pub struct SkyUniform {
    /// Unit vector towards the sun
    pub sun_direction: Vec3,
    /// Solar intensity after the horizon cutoff
    pub sun_intensity: f32,
    /// Rayleigh scattering coefficients
    pub beta_rayleigh: Vec3,
    /// 0 when the sun is far below the horizon, 1 above it
    pub sun_fade: f32,
    /// Mie scattering coefficients
    pub beta_mie: Vec3,
    pub mie_directional_g: f32,
    /// World up
    pub up: Vec3,
    pub _padding: f32,
}

impl From<&SkyParams> for SkyUniform {
    fn from(params: &SkyParams) -> Self {
        let params = params.clamped();
        let scattering = params.scattering();
        Self {
            sun_direction: scattering.sun_direction,
            sun_intensity: scattering.sun_intensity,
            beta_rayleigh: scattering.beta_rayleigh,
            sun_fade: scattering.sun_fade,
            beta_mie: scattering.beta_mie,
            mie_directional_g: params.mie_directional_g,
            up: Vec3::Y,
            _padding: 0.0,
        }
    }
}

/// Preetham analytic daylight sky, drawn at the far plane.
#[derive(Asset, AsBindGroup, TypePath, Debug, Clone)]
pub struct SkyMaterial {
    #[uniform(0)]
    pub uniform: SkyUniform,
}

impl SkyMaterial {
    pub fn new(params: &SkyParams) -> Self {
        Self {
            uniform: params.into(),
        }
    }
}

impl Default for SkyMaterial {
    fn default() -> Self {
        Self::new(&SkyParams::default())
    }
}

impl Material for SkyMaterial {
    fn vertex_shader() -> ShaderRef {
        "embedded://bevy_preetham_sky/sky.wgsl".into()
    }

    fn fragment_shader() -> ShaderRef {
        "embedded://bevy_preetham_sky/sky.wgsl".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_uses_clamped_params() {
        let params = SkyParams {
            mie_directional_g: 4.0,
            ..default()
        };
        let uniform = SkyUniform::from(&params);
        assert_eq!(uniform.mie_directional_g, 1.0);
        assert_eq!(uniform.up, Vec3::Y);
        assert!((uniform.sun_direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn default_material_matches_default_params() {
        assert_eq!(
            SkyMaterial::default().uniform,
            SkyUniform::from(&SkyParams::default())
        );
    }
}
