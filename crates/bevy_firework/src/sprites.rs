//! Particle sprite table.
//!
//! Every slot holds a procedurally drawn grayscale sprite. When image paths are
//! configured through [`SpriteSources`], slots are loaded from the asset server
//! instead. Until a path finishes loading its slot hands out the procedural
//! sprite, and a failed load keeps that sprite for good.

use bevy::asset::{LoadState, RenderAssetUsages};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

/// Edge length of generated sprites, in pixels.
pub const SPRITE_SIZE: u32 = 64;

/// Shapes drawn for the procedural sprite table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteShape {
    SoftDisc,
    HardDisc,
    Ring,
    FourPointStar,
    SixPointStar,
    Cross,
    Spark,
    Halo,
}

impl SpriteShape {
    pub const ALL: [SpriteShape; 8] = [
        SpriteShape::SoftDisc,
        SpriteShape::HardDisc,
        SpriteShape::Ring,
        SpriteShape::FourPointStar,
        SpriteShape::SixPointStar,
        SpriteShape::Cross,
        SpriteShape::Spark,
        SpriteShape::Halo,
    ];

    /// Intensity at `(x, y)` in `[-1, 1]²`, before the edge mask.
    fn intensity(self, x: f32, y: f32) -> f32 {
        let r = (x * x + y * y).sqrt();
        match self {
            SpriteShape::SoftDisc => (1.0 - r).max(0.0).powi(2),
            SpriteShape::HardDisc => 1.0 - smoothstep(0.7, 0.8, r),
            SpriteShape::Ring => (-((r - 0.6) / 0.12).powi(2)).exp(),
            SpriteShape::FourPointStar => {
                let rays = (-x.abs() * 14.0).exp().max((-y.abs() * 14.0).exp());
                glow(r, 10.0).max(rays * (1.0 - r).max(0.0))
            }
            SpriteShape::SixPointStar => {
                let angle = y.atan2(x);
                let rays = (angle * 3.0).cos().abs().powi(24);
                glow(r, 10.0).max(rays * (1.0 - r).max(0.0))
            }
            SpriteShape::Cross => {
                let diagonal = (x - y).abs().min((x + y).abs()) / std::f32::consts::SQRT_2;
                (-diagonal * 18.0).exp() * (1.0 - r).max(0.0)
            }
            SpriteShape::Spark => {
                let streak = (-y.abs() * 30.0).exp() * (1.0 - x.abs()).max(0.0);
                (1.0 - r).max(0.0).powi(6).max(streak * 0.8)
            }
            SpriteShape::Halo => glow(r, 6.0) * 0.6 + (1.0 - smoothstep(0.0, 0.15, r)) * 0.4,
        }
    }
}

fn glow(r: f32, falloff: f32) -> f32 {
    (-r * r * falloff).exp()
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Draw one sprite as a square RGBA image with the intensity in every channel.
pub fn generate_sprite(shape: SpriteShape, size: u32) -> Image {
    let size = size.max(2);
    let mut data = Vec::with_capacity((size * size * 4) as usize);
    let scale = 2.0 / (size - 1) as f32;

    for py in 0..size {
        for px in 0..size {
            let x = px as f32 * scale - 1.0;
            let y = py as f32 * scale - 1.0;
            let r = (x * x + y * y).sqrt();
            // Fade everything to zero before the inscribed circle's edge
            let mask = ((1.0 - r) * 8.0).clamp(0.0, 1.0);
            let value = (shape.intensity(x, y) * mask).clamp(0.0, 1.0);
            let byte = (value * 255.0).round() as u8;
            data.extend_from_slice(&[byte, byte, byte, byte]);
        }
    }

    Image::new(
        Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8Unorm,
        RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
    )
}

/// Optional sprite image paths, loaded through the asset server at startup.
#[derive(Resource, Default, Debug, Clone)]
pub struct SpriteSources(pub Vec<String>);

/// One entry of the sprite table.
#[derive(Debug, Clone)]
pub struct SpriteSlot {
    pub handle: Handle<Image>,
    /// Procedural sprite used if `handle` fails to load.
    pub fallback: Handle<Image>,
    /// Path the handle was loaded from, if any.
    pub path: Option<String>,
    /// False while `handle` is still loading from `path`.
    pub ready: bool,
}

/// Sprite textures bursts pick from.
#[derive(Resource, Default, Debug)]
pub struct FireworkSprites {
    pub slots: Vec<SpriteSlot>,
}

impl FireworkSprites {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Handle for `index`, wrapping around the table. Slots still loading
    /// hand out their fallback; an empty table yields the default (white)
    /// image.
    pub fn get(&self, index: usize) -> Handle<Image> {
        if self.slots.is_empty() {
            return Handle::default();
        }
        let slot = &self.slots[index % self.slots.len()];
        if slot.ready {
            slot.handle.clone()
        } else {
            slot.fallback.clone()
        }
    }
}

/// Fill [`FireworkSprites`] from the procedural shapes and configured paths.
pub fn build_sprite_table(
    sources: Res<SpriteSources>,
    asset_server: Res<AssetServer>,
    mut images: ResMut<Assets<Image>>,
    mut sprites: ResMut<FireworkSprites>,
) {
    let procedural: Vec<Handle<Image>> = SpriteShape::ALL
        .iter()
        .map(|shape| images.add(generate_sprite(*shape, SPRITE_SIZE)))
        .collect();

    sprites.slots = if sources.0.is_empty() {
        procedural
            .iter()
            .map(|handle| SpriteSlot {
                handle: handle.clone(),
                fallback: handle.clone(),
                path: None,
                ready: true,
            })
            .collect()
    } else {
        sources
            .0
            .iter()
            .enumerate()
            .map(|(i, path)| SpriteSlot {
                handle: asset_server.load(path.clone()),
                fallback: procedural[i % procedural.len()].clone(),
                path: Some(path.clone()),
                ready: false,
            })
            .collect()
    };

    info!("Firework sprite table ready: {} sprites", sprites.len());
}

/// Mark loaded sprites ready and swap failed ones for their procedural
/// fallback.
pub fn track_sprite_loads(
    asset_server: Res<AssetServer>,
    mut sprites: ResMut<FireworkSprites>,
) {
    for slot in sprites.slots.iter_mut().filter(|slot| !slot.ready) {
        match asset_server.load_state(slot.handle.id()) {
            LoadState::Loaded => slot.ready = true,
            LoadState::Failed(err) => {
                let path = slot.path.take().unwrap_or_default();
                warn!("Failed to load firework sprite {}: {}", path, err);
                slot.handle = slot.fallback.clone();
                slot.ready = true;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::asset::AssetPlugin;

    fn texel(image: &Image, x: u32, y: u32) -> u8 {
        let size = image.width();
        let data = image.data.as_ref().expect("sprite has CPU data");
        data[((y * size + x) * 4) as usize]
    }

    #[test]
    fn sprites_have_requested_size() {
        for shape in SpriteShape::ALL {
            let image = generate_sprite(shape, 32);
            assert_eq!(image.width(), 32);
            assert_eq!(image.height(), 32);
        }
    }

    #[test]
    fn corners_are_transparent() {
        for shape in SpriteShape::ALL {
            let image = generate_sprite(shape, SPRITE_SIZE);
            let last = SPRITE_SIZE - 1;
            for (x, y) in [(0, 0), (last, 0), (0, last), (last, last)] {
                assert_eq!(texel(&image, x, y), 0, "{shape:?} corner ({x}, {y})");
            }
        }
    }

    #[test]
    fn centers_are_lit() {
        for shape in SpriteShape::ALL {
            if shape == SpriteShape::Ring {
                continue;
            }
            let image = generate_sprite(shape, 65);
            assert!(texel(&image, 32, 32) > 100, "{shape:?} center is dark");
        }
    }

    #[test]
    fn ring_is_hollow() {
        let image = generate_sprite(SpriteShape::Ring, 65);
        assert!(texel(&image, 32, 32) < 10);
        // r = 0.6 along the x axis
        assert!(texel(&image, 51, 32) > 200);
    }

    fn sprite_app(paths: &[&str]) -> App {
        let mut app = App::new();
        app.add_plugins((
            MinimalPlugins,
            AssetPlugin {
                watch_for_changes_override: Some(false),
                ..default()
            },
        ))
        .init_asset::<Image>()
        .insert_resource(SpriteSources(paths.iter().map(|p| p.to_string()).collect()))
        .init_resource::<FireworkSprites>()
        .add_systems(Startup, build_sprite_table)
        .add_systems(Update, track_sprite_loads);
        app
    }

    #[test]
    fn procedural_table_is_ready_immediately() {
        let mut app = sprite_app(&[]);
        app.update();

        let sprites = app.world().resource::<FireworkSprites>();
        assert_eq!(sprites.len(), SpriteShape::ALL.len());
        assert!(sprites.slots.iter().all(|slot| slot.ready));
        assert_eq!(sprites.get(9), sprites.slots[1].handle);
    }

    #[test]
    fn missing_sprite_is_replaced_by_fallback() {
        let mut app = sprite_app(&["sprites/does_not_exist.png"]);
        app.update();

        // Bursts launched while the path is pending get the fallback
        {
            let sprites = app.world().resource::<FireworkSprites>();
            let slot = &sprites.slots[0];
            if !slot.ready {
                assert_eq!(sprites.get(0), slot.fallback);
            }
        }

        for _ in 0..500 {
            if app.world().resource::<FireworkSprites>().slots[0].ready {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(2));
            app.update();
        }

        let sprites = app.world().resource::<FireworkSprites>();
        let slot = &sprites.slots[0];
        assert!(slot.ready);
        assert!(slot.path.is_none());
        assert_eq!(slot.handle, slot.fallback);
        assert_eq!(sprites.get(0), slot.fallback);
    }

    #[test]
    fn empty_table_falls_back_to_default_image() {
        let sprites = FireworkSprites::default();
        assert_eq!(sprites.get(3), Handle::<Image>::default());
    }
}
