use bevy::prelude::*;
use bevy_firework::{BurstSettings, SpriteSources};
use bevy_preetham_sky::SkyParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::camera::CameraSettings;
use crate::launcher::LauncherSettings;

/// Everything the demo persists between runs
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub sky: SkyParams,
    pub launcher: LauncherSettings,
    /// Seconds each burst lives
    pub burst_duration: f32,
    pub camera: CameraSettings,
    /// Sprite images to load instead of the generated ones
    pub sprite_paths: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sky: SkyParams::default(),
            launcher: LauncherSettings::default(),
            burst_duration: BurstSettings::default().duration,
            camera: CameraSettings::default(),
            sprite_paths: Vec::new(),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("firework_sky");
            p.push("settings.ron");
            p
        })
    }

    /// Load settings from disk, or return defaults if missing or invalid
    pub fn load() -> Self {
        let Some(path) = Self::file_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => {
                info!("Settings loaded from: {:?}", path);
                settings
            }
            Err(e) => {
                warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        ron::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
    }

    /// Save settings to the config directory
    pub fn save(&self) -> Result<PathBuf, String> {
        self.save_at(Self::file_path())
    }

    /// Save to `path`, logging the outcome either way.
    fn save_at(&self, path: Option<PathBuf>) -> Result<PathBuf, String> {
        let Some(path) = path else {
            let e = "Could not determine config directory".to_string();
            error!("{}", e);
            return Err(e);
        };
        match self.save_to(&path) {
            Ok(()) => {
                info!("Settings saved to: {:?}", path);
                Ok(path)
            }
            Err(e) => {
                error!("{}", e);
                Err(e)
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;
        fs::write(path, content).map_err(|e| format!("Failed to save settings: {}", e))
    }

    /// Snapshot the live resources.
    pub fn capture(
        sky: &SkyParams,
        launcher: &LauncherSettings,
        bursts: &BurstSettings,
        camera: &CameraSettings,
        sprites: &SpriteSources,
    ) -> Self {
        Self {
            sky: *sky,
            launcher: launcher.clone(),
            burst_duration: bursts.duration,
            camera: camera.clone(),
            sprite_paths: sprites.0.clone(),
        }
    }

    /// Overwrite the live resources with these settings.
    pub fn apply(self, world: &mut World) {
        world.insert_resource(self.sky.clamped());
        world.insert_resource(self.launcher.clamped());
        world.insert_resource(BurstSettings {
            duration: self.burst_duration.max(0.0),
            ..BurstSettings::default()
        });
        world.insert_resource(self.camera);
        world.insert_resource(SpriteSources(self.sprite_paths));
    }
}

/// Loads persisted settings into the live resources before startup.
pub struct SettingsPlugin;

impl Plugin for SettingsPlugin {
    fn build(&self, app: &mut App) {
        Settings::load().apply(app.world_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::AutoLauncher;
    use bevy_firework::{MAX_BURST_PARTICLES, ScalarRange};
    use std::time::Duration;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("firework_sky_test_{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn save_then_load_round_trips() {
        let path = temp_path("round_trip.ron");
        let settings = Settings {
            sky: SkyParams {
                elevation: 12.0,
                ..default()
            },
            burst_duration: 4.5,
            sprite_paths: vec!["sprites/star.png".into()],
            ..default()
        };

        settings.save_to(&path).unwrap();
        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let parsed: Settings = ron::from_str("(burst_duration: 2.0)").unwrap();
        assert_eq!(parsed.burst_duration, 2.0);
        assert_eq!(parsed.sky, SkyParams::default());
        assert_eq!(parsed.camera, CameraSettings::default());
    }

    #[test]
    fn invalid_file_is_an_error() {
        let path = temp_path("invalid.ron");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "(burst_duration: \"soon\")").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(err.starts_with("Failed to parse"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Settings::load_from(&temp_path("missing.ron")).unwrap_err();
        assert!(err.starts_with("Failed to read"));
    }

    #[test]
    fn save_without_config_dir_is_an_error() {
        let err = Settings::default().save_at(None).unwrap_err();
        assert_eq!(err, "Could not determine config directory");
    }

    #[test]
    fn save_reports_the_written_path() {
        let path = temp_path("save_at.ron");
        let saved = Settings::default().save_at(Some(path.clone())).unwrap();
        assert_eq!(saved, path);
        assert_eq!(Settings::load_from(&path).unwrap(), Settings::default());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn apply_populates_live_resources() {
        let mut world = World::new();
        let settings = Settings {
            sky: SkyParams {
                mie_directional_g: 3.0,
                ..default()
            },
            burst_duration: 5.0,
            sprite_paths: vec!["a.png".into()],
            ..default()
        };
        settings.apply(&mut world);

        assert_eq!(world.resource::<SkyParams>().mie_directional_g, 1.0);
        assert_eq!(world.resource::<BurstSettings>().duration, 5.0);
        assert_eq!(world.resource::<SpriteSources>().0, vec!["a.png".to_string()]);
        assert!(!world.resource::<LauncherSettings>().auto_launch);
    }

    #[test]
    fn oversized_launcher_values_are_bounded_on_load() {
        let path = temp_path("oversized.ron");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            "(launcher: (auto_launch: true, interval: 1e20, ranges: (count: Constant(1e12))))",
        )
        .unwrap();

        let mut world = World::new();
        Settings::load_from(&path).unwrap().apply(&mut world);

        let launcher = world.resource::<LauncherSettings>();
        assert!(launcher.auto_launch);
        assert_eq!(launcher.interval, LauncherSettings::INTERVAL_MAX);
        assert_eq!(
            launcher.ranges.count,
            ScalarRange::Constant(MAX_BURST_PARTICLES as f32)
        );

        // The first auto-launch tick must not panic on the stored interval
        let mut timer = AutoLauncher::new(launcher.interval);
        assert_eq!(timer.tick(Duration::from_secs(6), launcher.interval), 1);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn capture_reads_live_values() {
        let sky = SkyParams {
            turbidity: 4.0,
            ..default()
        };
        let launcher = LauncherSettings {
            auto_launch: true,
            ..default()
        };
        let bursts = BurstSettings {
            duration: 2.0,
            ..default()
        };
        let captured = Settings::capture(
            &sky,
            &launcher,
            &bursts,
            &CameraSettings::default(),
            &SpriteSources::default(),
        );
        assert_eq!(captured.sky.turbidity, 4.0);
        assert!(captured.launcher.auto_launch);
        assert_eq!(captured.burst_duration, 2.0);
    }
}
