//! Sandbox settings with persistence
//!
//! Settings are read from `~/.config/glsim/settings.toml` unless a path is given.

use std::fs;
use std::path::{Path, PathBuf};

use glsim_core::TimeConfig;
use glsim_physics::PhysicsConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All sandbox settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub simulation: SimulationSettings,
    pub time: TimeConfig,
    pub physics: PhysicsConfig,
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("glsim"))
    }

    /// Get the default settings file path
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from the default location, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            warn!("Could not determine config directory, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load settings from `path`, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings file at {}, using defaults", path.display());
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to `path`, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!("Saved settings to {}", path.display());
        Ok(())
    }
}

/// Simulation loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Frames to run before shutting down
    pub frames: u32,
    /// Falling bodies spawned at startup
    pub bodies: u32,
    /// Delta time used when the wall clock is not consulted
    pub default_dt: f32,
    /// Pace frames to the fixed timestep instead of running flat out
    pub realtime: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            frames: 120,
            bodies: 16,
            default_dt: glsim_ecs::DEFAULT_DT,
            realtime: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [simulation]
            frames = 10

            [physics]
            substeps = 4
            "#,
        )
        .unwrap();
        assert_eq!(settings.simulation.frames, 10);
        assert_eq!(settings.simulation.bodies, 16);
        assert_eq!(settings.physics.substeps, 4);
        assert_eq!(settings.time.max_delta_time, 0.25);
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = std::env::temp_dir().join(format!("glsim-settings-{}", std::process::id()));
        let path = dir.join("settings.toml");

        let mut settings = Settings::default();
        settings.simulation.frames = 3;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.simulation.frames, 3);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_uses_defaults() {
        let loaded = Settings::load_from(Path::new("/nonexistent/glsim/settings.toml"));
        assert_eq!(loaded.simulation.frames, 120);
    }
}
