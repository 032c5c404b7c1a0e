//! Physics configuration. Loaded from physics.ron at startup.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Simulation settings shared by the world and the tick scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// World gravity in m/s².
    #[serde(default = "default_gravity")]
    pub gravity: [f32; 3],
    /// Fixed simulation rate in Hz.
    #[serde(default = "default_tick_rate")]
    pub tick_rate_hz: f64,
    /// Cap on fixed steps per rendered frame; extra backlog is dropped.
    #[serde(default = "default_max_steps")]
    pub max_steps_per_frame: u32,
}

fn default_gravity() -> [f32; 3] {
    [0.0, -9.81, 0.0]
}
fn default_tick_rate() -> f64 {
    60.0
}
fn default_max_steps() -> u32 {
    8
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            tick_rate_hz: default_tick_rate(),
            max_steps_per_frame: default_max_steps(),
        }
    }
}

impl PhysicsConfig {
    /// Load config from `physics.ron` in the current directory. Falls back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    /// Load config from an explicit path. If the file is missing or invalid, returns default config.
    pub fn load_from(path: &Path) -> Self {
        if let Ok(data) = std::fs::read_to_string(path) {
            match ron::from_str::<Self>(&data) {
                Ok(c) => return c.sanitized(),
                Err(e) => log::warn!("Invalid physics config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    /// World gravity as a vector.
    pub fn gravity(&self) -> Vec3 {
        Vec3::from_array(self.gravity)
    }

    fn sanitized(mut self) -> Self {
        if !(self.tick_rate_hz.is_finite() && self.tick_rate_hz > 0.0) {
            log::warn!("tick_rate_hz {} out of range, using {}", self.tick_rate_hz, default_tick_rate());
            self.tick_rate_hz = default_tick_rate();
        }
        self.max_steps_per_frame = self.max_steps_per_frame.max(1);
        self
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("physics.ron")
}
