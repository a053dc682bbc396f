use bevy::{
    asset::embedded_asset,
    pbr::{Material, MaterialPlugin},
    prelude::*,
    render::render_resource::{AsBindGroup, ShaderType},
    shader::ShaderRef,
};

/// Plugin that registers the [`FireworkMaterial`] with Bevy's rendering system.
pub struct FireworkMaterialPlugin;

impl Plugin for FireworkMaterialPlugin {
    fn build(&self, app: &mut App) {
        embedded_asset!(app, "firework.wgsl");
        app.add_plugins(MaterialPlugin::<FireworkMaterial>::default());
    }
}

/// Uniform data sent to the GPU for the firework shader.
#[derive(Clone, Copy, ShaderType, Debug)]
pub struct FireworkUniform {
    /// Tint of every particle in the burst
    pub color: LinearRgba,
    /// Base point size, scaled by the viewport height and divided by view depth
    pub size: f32,
    /// Burst progress, 0 at launch and 1 when the burst has faded
    pub progress: f32,
    pub _padding: Vec2,
}

/// Billboarded point sprites animated by a single progress value.
///
/// Expects meshes built by [`crate::BurstGeometry::to_mesh`]: particle center in
/// `ATTRIBUTE_POSITION`, quad corner in `ATTRIBUTE_UV_0` and
/// `[size, time_multiplier]` in `ATTRIBUTE_UV_1`.
#[derive(Asset, AsBindGroup, TypePath, Debug, Clone)]
pub struct FireworkMaterial {
    #[uniform(0)]
    pub uniform: FireworkUniform,
    /// Grayscale sprite; the red channel is used as alpha.
    #[texture(1)]
    #[sampler(2)]
    pub sprite: Handle<Image>,
}

impl FireworkMaterial {
    pub fn new(color: impl Into<LinearRgba>, size: f32, sprite: Handle<Image>) -> Self {
        Self {
            uniform: FireworkUniform {
                color: color.into(),
                size,
                progress: 0.0,
                _padding: Vec2::ZERO,
            },
            sprite,
        }
    }
}

impl Material for FireworkMaterial {
    fn vertex_shader() -> ShaderRef {
        "embedded://bevy_firework/firework.wgsl".into()
    }

    fn fragment_shader() -> ShaderRef {
        "embedded://bevy_firework/firework.wgsl".into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Add
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_material_starts_at_zero_progress() {
        let material = FireworkMaterial::new(Color::WHITE, 0.3, Handle::default());
        assert_eq!(material.uniform.progress, 0.0);
        assert_eq!(material.uniform.size, 0.3);
        assert_eq!(material.uniform.color, LinearRgba::WHITE);
    }

    #[test]
    fn additive_blending() {
        let material = FireworkMaterial::new(Color::WHITE, 0.3, Handle::default());
        assert!(matches!(material.alpha_mode(), AlphaMode::Add));
    }
}
