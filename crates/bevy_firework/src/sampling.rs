//! Random point generation for burst particles.

use bevy::prelude::*;
use std::f32::consts::{PI, TAU};

/// Inner edge of the explosion shell, as a fraction of the burst radius.
pub const SHELL_INNER_FRACTION: f32 = 0.75;

/// Convert spherical coordinates to a Y-up cartesian point.
///
/// `phi` is the polar angle measured from +Y, `theta` the azimuth measured
/// from +Z towards +X.
pub fn spherical_to_cartesian(radius: f32, phi: f32, theta: f32) -> Vec3 {
    let ring = phi.sin() * radius;
    Vec3::new(ring * theta.sin(), phi.cos() * radius, ring * theta.cos())
}

/// Sample one point in the shell between `SHELL_INNER_FRACTION * radius` and `radius`.
pub fn sample_shell_point(rng: &mut fastrand::Rng, radius: f32) -> Vec3 {
    let r = radius * (SHELL_INNER_FRACTION + rng.f32() * (1.0 - SHELL_INNER_FRACTION));
    let phi = rng.f32() * PI;
    let theta = rng.f32() * TAU;
    spherical_to_cartesian(r, phi, theta)
}
