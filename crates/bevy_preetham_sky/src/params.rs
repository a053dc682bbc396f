//! Sky parameters and the CPU side of the Preetham scattering model.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Rayleigh scattering coefficients for the primary wavelengths.
const TOTAL_RAYLEIGH: Vec3 = Vec3::new(
    5.804542996261093e-6,
    1.3562911419845635e-5,
    3.0265902468824876e-5,
);

/// Wavelength-dependent Mie constant.
const MIE_CONST: Vec3 = Vec3::new(
    1.8399918514433978e14,
    2.7798023919660528e14,
    4.0790479543861094e14,
);

/// Solar irradiance scale.
const SUN_IRRADIANCE: f32 = 1000.0;
/// Zenith angle (radians) past which the sun contributes nothing.
const CUTOFF_ANGLE: f32 = 1.6110731556870734;
const STEEPNESS: f32 = 1.5;
/// Distance the sun fade is normalized against.
const SUN_FADE_DISTANCE: f32 = 450_000.0;
/// Smallest linear exposure passed to the camera.
pub const MIN_EXPOSURE: f32 = 1e-4;

/// Slider bounds for one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl ParamRange {
    const fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

/// Tunable inputs of the sky model. Angles are in degrees.
#[derive(Resource, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Reflect)]
#[reflect(Resource)]
#[serde(default)]
pub struct SkyParams {
    /// Haze in the atmosphere
    pub turbidity: f32,
    /// Rayleigh (small particle) scattering strength
    pub rayleigh: f32,
    /// Mie (aerosol) scattering strength
    pub mie_coefficient: f32,
    /// Forward bias of Mie scattering (Henyey-Greenstein g)
    pub mie_directional_g: f32,
    /// Sun height above the horizon
    pub elevation: f32,
    /// Sun heading around the vertical axis
    pub azimuth: f32,
    /// Linear exposure multiplier applied to the whole frame
    pub exposure: f32,
}

impl Default for SkyParams {
    fn default() -> Self {
        Self {
            turbidity: 10.0,
            rayleigh: 3.0,
            mie_coefficient: 0.005,
            mie_directional_g: 0.95,
            elevation: -2.2,
            azimuth: 180.0,
            exposure: 0.5,
        }
    }
}

impl SkyParams {
    pub const TURBIDITY: ParamRange = ParamRange::new(0.0, 20.0, 0.1);
    pub const RAYLEIGH: ParamRange = ParamRange::new(0.0, 4.0, 0.1);
    pub const MIE_COEFFICIENT: ParamRange = ParamRange::new(0.0, 0.1, 0.001);
    pub const MIE_DIRECTIONAL_G: ParamRange = ParamRange::new(0.0, 1.0, 0.001);
    pub const ELEVATION: ParamRange = ParamRange::new(-3.0, 90.0, 0.01);
    pub const AZIMUTH: ParamRange = ParamRange::new(-180.0, 180.0, 0.1);
    pub const EXPOSURE: ParamRange = ParamRange::new(0.0, 1.0, 0.0001);

    /// Copy with every field inside its slider range.
    pub fn clamped(&self) -> Self {
        Self {
            turbidity: Self::TURBIDITY.clamp(self.turbidity),
            rayleigh: Self::RAYLEIGH.clamp(self.rayleigh),
            mie_coefficient: Self::MIE_COEFFICIENT.clamp(self.mie_coefficient),
            mie_directional_g: Self::MIE_DIRECTIONAL_G.clamp(self.mie_directional_g),
            elevation: Self::ELEVATION.clamp(self.elevation),
            azimuth: Self::AZIMUTH.clamp(self.azimuth),
            exposure: Self::EXPOSURE.clamp(self.exposure),
        }
    }

    /// Unit vector pointing at the sun.
    pub fn sun_direction(&self) -> Vec3 {
        let phi = (90.0 - self.elevation).to_radians();
        let theta = self.azimuth.to_radians();
        Vec3::new(phi.sin() * theta.sin(), phi.cos(), phi.sin() * theta.cos())
    }

    /// Per-frame constants of the scattering model.
    pub fn scattering(&self) -> Scattering {
        let sun_direction = self.sun_direction();
        let sun_fade = 1.0 - (1.0 - (sun_direction.y / SUN_FADE_DISTANCE).exp()).clamp(0.0, 1.0);
        let rayleigh_coefficient = self.rayleigh - (1.0 - sun_fade);

        Scattering {
            sun_direction,
            sun_intensity: sun_intensity(sun_direction.dot(Vec3::Y)),
            sun_fade,
            beta_rayleigh: TOTAL_RAYLEIGH * rayleigh_coefficient,
            beta_mie: total_mie(self.turbidity) * self.mie_coefficient,
        }
    }

    /// EV100 for which Bevy's camera exposure equals [`Self::exposure`].
    pub fn ev100(&self) -> f32 {
        linear_exposure_to_ev100(self.exposure)
    }
}

/// Values handed to the sky shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scattering {
    pub sun_direction: Vec3,
    pub sun_intensity: f32,
    pub sun_fade: f32,
    pub beta_rayleigh: Vec3,
    pub beta_mie: Vec3,
}

/// Solar intensity reaching the ground for a given cosine of the zenith angle.
pub fn sun_intensity(zenith_angle_cos: f32) -> f32 {
    let zenith_angle = zenith_angle_cos.clamp(-1.0, 1.0).acos();
    SUN_IRRADIANCE * (1.0 - (-(CUTOFF_ANGLE - zenith_angle) / STEEPNESS).exp()).max(0.0)
}

/// Mie scattering coefficients for a given turbidity.
pub fn total_mie(turbidity: f32) -> Vec3 {
    let concentration = 0.2 * turbidity * 10e-18;
    MIE_CONST * (0.434 * concentration)
}

/// Invert Bevy's `exposure = 1 / (1.2 * 2^ev100)`.
pub fn linear_exposure_to_ev100(exposure: f32) -> f32 {
    (1.0 / (1.2 * exposure.max(MIN_EXPOSURE))).log2()
}
