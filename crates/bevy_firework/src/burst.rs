//! Burst descriptions and the flat per-particle buffers behind them.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::sampling::sample_shell_point;

/// Quad corners in texture space (v pointing down), ordered counter-clockwise
/// once the shader maps them to view-space offsets.
const QUAD_CORNERS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

/// Index pattern for the two triangles of one particle quad.
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

// ---------------------------------------------------------------------------
// Scalar ranges
// ---------------------------------------------------------------------------

/// A scalar value that can be constant or a random range.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Reflect)]
pub enum ScalarRange {
    Constant(f32),
    Random(f32, f32),
}

impl Default for ScalarRange {
    fn default() -> Self {
        Self::Constant(1.0)
    }
}

/// Largest particle count a single burst may request.
pub const MAX_BURST_PARTICLES: usize = 20_000;

/// `value` forced into `[min, max]`; NaN becomes `fallback`.
fn bounded(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

impl ScalarRange {
    /// Same range with both ends forced into `[min, max]`.
    pub fn clamped(&self, min: f32, max: f32) -> Self {
        match *self {
            Self::Constant(v) => Self::Constant(bounded(v, min, max, min)),
            Self::Random(a, b) => {
                Self::Random(bounded(a, min, max, min), bounded(b, min, max, min))
            }
        }
    }

    /// Sample a value from this range.
    pub fn sample(&self, rng: &mut fastrand::Rng) -> f32 {
        match self {
            Self::Constant(v) => *v,
            Self::Random(a, b) => *a + (*b - *a) * rng.f32(),
        }
    }
}

// ---------------------------------------------------------------------------
// Burst spec
// ---------------------------------------------------------------------------

/// Everything needed to build one firework burst.
#[derive(Clone, Debug, PartialEq)]
pub struct BurstSpec {
    /// Number of particles.
    pub count: usize,
    /// World-space center of the explosion.
    pub position: Vec3,
    /// Base point size, in world units at unit depth.
    pub size: f32,
    /// Outer radius of the explosion shell.
    pub radius: f32,
    /// Tint applied to the sprite.
    pub color: Color,
    /// Index into the sprite table.
    pub sprite: usize,
}

impl Default for BurstSpec {
    fn default() -> Self {
        Self {
            count: 100,
            position: Vec3::ZERO,
            size: 0.5,
            radius: 1.0,
            color: Color::srgb_u8(0x8a, 0xff, 0xff),
            sprite: 7,
        }
    }
}

/// Ranges used to roll random bursts.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Reflect)]
#[serde(default)]
pub struct BurstRanges {
    pub count: ScalarRange,
    pub size: ScalarRange,
    pub radius: ScalarRange,
    /// Lower corner of the launch box, relative to the launch origin.
    pub spread_min: Vec3,
    /// Upper corner of the launch box, relative to the launch origin.
    pub spread_max: Vec3,
    pub saturation: f32,
    pub lightness: f32,
}

impl Default for BurstRanges {
    fn default() -> Self {
        Self {
            count: ScalarRange::Random(400.0, 1400.0),
            size: ScalarRange::Random(0.1, 0.2),
            radius: ScalarRange::Random(0.5, 1.5),
            spread_min: Vec3::new(-1.0, 0.0, -1.0),
            spread_max: Vec3::new(1.0, 1.0, 1.0),
            saturation: 1.0,
            lightness: 0.7,
        }
    }
}

impl BurstRanges {
    /// Largest size and radius accepted from configuration.
    const MAX_EXTENT: f32 = 100.0;

    /// Copy with every value usable for rolling bursts. Counts are capped at
    /// [`MAX_BURST_PARTICLES`] and non-finite launch corners fall back to the
    /// defaults.
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        let corner = |v: Vec3, fallback: Vec3| {
            if v.is_finite() {
                v.clamp(Vec3::splat(-Self::MAX_EXTENT), Vec3::splat(Self::MAX_EXTENT))
            } else {
                fallback
            }
        };
        Self {
            count: self.count.clamped(0.0, MAX_BURST_PARTICLES as f32),
            size: self.size.clamped(0.0, Self::MAX_EXTENT),
            radius: self.radius.clamped(0.0, Self::MAX_EXTENT),
            spread_min: corner(self.spread_min, defaults.spread_min),
            spread_max: corner(self.spread_max, defaults.spread_max),
            saturation: bounded(self.saturation, 0.0, 1.0, defaults.saturation),
            lightness: bounded(self.lightness, 0.0, 1.0, defaults.lightness),
        }
    }
}

impl BurstSpec {
    /// Roll a random burst around `origin`, picking one of `sprite_count` sprites.
    pub fn random(
        rng: &mut fastrand::Rng,
        ranges: &BurstRanges,
        origin: Vec3,
        sprite_count: usize,
    ) -> Self {
        let count = ranges.count.sample(rng).round().max(0.0) as usize;
        let count = count.min(MAX_BURST_PARTICLES);
        let unit = Vec3::new(rng.f32(), rng.f32(), rng.f32());
        let offset = ranges.spread_min + unit * (ranges.spread_max - ranges.spread_min);
        let size = ranges.size.sample(rng);
        let sprite = if sprite_count == 0 {
            0
        } else {
            ((rng.f32() * sprite_count as f32) as usize).min(sprite_count - 1)
        };
        let radius = ranges.radius.sample(rng);
        let color = Color::hsl(rng.f32() * 360.0, ranges.saturation, ranges.lightness);

        Self {
            count,
            position: origin + offset,
            size,
            radius,
            color,
            sprite,
        }
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Per-particle buffers of one burst. All three vectors have the same length.
#[derive(Clone, Debug, Default)]
pub struct BurstGeometry {
    /// Final particle offsets from the burst center.
    pub positions: Vec<Vec3>,
    /// Size factor in `[0, 1)`.
    pub sizes: Vec<f32>,
    /// Progress speed multiplier in `[1, 2)`.
    pub time_multipliers: Vec<f32>,
}

impl BurstGeometry {
    /// Fill the buffers for `count` particles in a shell of `radius`.
    pub fn generate(rng: &mut fastrand::Rng, count: usize, radius: f32) -> Self {
        let mut geometry = Self {
            positions: Vec::with_capacity(count),
            sizes: Vec::with_capacity(count),
            time_multipliers: Vec::with_capacity(count),
        };

        for _ in 0..count {
            geometry.positions.push(sample_shell_point(rng, radius));
            geometry.sizes.push(rng.f32());
            geometry.time_multipliers.push(1.0 + rng.f32());
        }

        geometry
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Expand every particle into a quad the firework shader billboards.
    ///
    /// The four vertices of a particle share its position in
    /// `ATTRIBUTE_POSITION`, carry their corner in `ATTRIBUTE_UV_0` and
    /// `[size, time_multiplier]` in `ATTRIBUTE_UV_1`.
    pub fn to_mesh(&self) -> Mesh {
        let vertex_count = self.len() * QUAD_CORNERS.len();
        let mut positions: Vec<[f32; 3]> = Vec::with_capacity(vertex_count);
        let mut corners: Vec<[f32; 2]> = Vec::with_capacity(vertex_count);
        let mut params: Vec<[f32; 2]> = Vec::with_capacity(vertex_count);
        let mut indices: Vec<u32> = Vec::with_capacity(self.len() * QUAD_INDICES.len());

        for (i, position) in self.positions.iter().enumerate() {
            let base = positions.len() as u32;
            let param = [self.sizes[i], self.time_multipliers[i]];
            for corner in QUAD_CORNERS {
                positions.push(position.to_array());
                corners.push(corner);
                params.push(param);
            }
            indices.extend(QUAD_INDICES.iter().map(|index| base + index));
        }

        Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
            .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
            .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, corners)
            .with_inserted_attribute(Mesh::ATTRIBUTE_UV_1, params)
            .with_inserted_indices(Indices::U32(indices))
    }
}

/// Marker for a live burst entity.
#[derive(Component, Debug, Clone, Copy)]
pub struct FireworkBurst {
    pub particle_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::mesh::VertexAttributeValues;

    #[test]
    fn buffers_match_count() {
        let mut rng = fastrand::Rng::with_seed(1);
        let geometry = BurstGeometry::generate(&mut rng, 321, 1.0);
        assert_eq!(geometry.positions.len(), 321);
        assert_eq!(geometry.sizes.len(), 321);
        assert_eq!(geometry.time_multipliers.len(), 321);
    }

    #[test]
    fn per_particle_values_in_range() {
        let mut rng = fastrand::Rng::with_seed(2);
        let geometry = BurstGeometry::generate(&mut rng, 1000, 2.0);
        assert!(geometry.sizes.iter().all(|s| (0.0..1.0).contains(s)));
        assert!(geometry.time_multipliers.iter().all(|t| (1.0..2.0).contains(t)));
        assert!(
            geometry
                .positions
                .iter()
                .all(|p| p.length() >= 1.5 - 1e-4 && p.length() <= 2.0 + 1e-4)
        );
    }

    #[test]
    fn mesh_has_one_quad_per_particle() {
        let mut rng = fastrand::Rng::with_seed(3);
        let geometry = BurstGeometry::generate(&mut rng, 10, 1.0);
        let mesh = geometry.to_mesh();

        assert_eq!(mesh.count_vertices(), 40);
        let Some(Indices::U32(indices)) = mesh.indices() else {
            panic!("expected u32 indices");
        };
        assert_eq!(indices.len(), 60);
        assert_eq!(&indices[6..12], &[4, 5, 6, 4, 6, 7]);

        let Some(VertexAttributeValues::Float32x2(params)) = mesh.attribute(Mesh::ATTRIBUTE_UV_1)
        else {
            panic!("expected particle params in UV_1");
        };
        for quad in params.chunks(4) {
            assert!(quad.iter().all(|p| *p == quad[0]));
        }
    }

    #[test]
    fn quad_winds_counter_clockwise_in_view_space() {
        // Same mapping as the vertex shader: x = u * 2 - 1, y = 1 - v * 2.
        let offsets: Vec<Vec2> = QUAD_CORNERS
            .iter()
            .map(|[u, v]| Vec2::new(u * 2.0 - 1.0, 1.0 - v * 2.0))
            .collect();
        for tri in QUAD_INDICES.chunks(3) {
            let a = offsets[tri[0] as usize];
            let b = offsets[tri[1] as usize];
            let c = offsets[tri[2] as usize];
            assert!((b - a).perp_dot(c - a) > 0.0);
        }
    }

    #[test]
    fn empty_burst_is_not_an_error() {
        let mut rng = fastrand::Rng::with_seed(4);
        let geometry = BurstGeometry::generate(&mut rng, 0, 1.0);
        assert!(geometry.is_empty());
        assert_eq!(geometry.to_mesh().count_vertices(), 0);
    }

    #[test]
    fn random_bursts_respect_ranges() {
        let mut rng = fastrand::Rng::with_seed(5);
        let ranges = BurstRanges::default();
        let origin = Vec3::new(0.0, 2.0, 0.0);
        for _ in 0..200 {
            let spec = BurstSpec::random(&mut rng, &ranges, origin, 8);
            assert!((400..=1400).contains(&spec.count));
            assert!((0.1..0.2).contains(&spec.size));
            assert!((0.5..1.5).contains(&spec.radius));
            assert!(spec.sprite < 8);
            let offset = spec.position - origin;
            assert!(offset.x >= -1.0 && offset.x < 1.0);
            assert!(offset.y >= 0.0 && offset.y < 1.0);
            let rgba = spec.color.to_srgba();
            for channel in [rgba.red, rgba.green, rgba.blue] {
                assert!((0.0..=1.0 + 1e-5).contains(&channel));
            }
        }
    }

    #[test]
    fn random_burst_without_sprites_uses_slot_zero() {
        let mut rng = fastrand::Rng::with_seed(6);
        let spec = BurstSpec::random(&mut rng, &BurstRanges::default(), Vec3::ZERO, 0);
        assert_eq!(spec.sprite, 0);
    }

    #[test]
    fn oversized_ranges_are_bounded() {
        let ranges = BurstRanges {
            count: ScalarRange::Constant(1e12),
            size: ScalarRange::Random(f32::NAN, f32::INFINITY),
            spread_max: Vec3::new(f32::INFINITY, 1.0, 1.0),
            lightness: 4.0,
            ..default()
        }
        .clamped();

        assert_eq!(ranges.count, ScalarRange::Constant(MAX_BURST_PARTICLES as f32));
        assert_eq!(ranges.size, ScalarRange::Random(0.0, 100.0));
        assert_eq!(ranges.spread_max, BurstRanges::default().spread_max);
        assert_eq!(ranges.lightness, 1.0);

        let mut rng = fastrand::Rng::with_seed(7);
        let spec = BurstSpec::random(&mut rng, &ranges, Vec3::ZERO, 8);
        assert_eq!(spec.count, MAX_BURST_PARTICLES);
    }

    #[test]
    fn default_ranges_are_already_bounded() {
        assert_eq!(BurstRanges::default().clamped(), BurstRanges::default());
    }

    #[test]
    fn ranges_round_trip_through_ron() {
        let ranges = BurstRanges {
            count: ScalarRange::Constant(50.0),
            ..default()
        };
        let text = ron::to_string(&ranges).unwrap();
        let parsed: BurstRanges = ron::from_str(&text).unwrap();
        assert_eq!(parsed, ranges);
    }
}
