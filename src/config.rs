//! Swarm configuration.
//!
//! Every field has a default matching the round 360x360 device the swarm was
//! designed for, so an empty JSON object is a valid config file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::photon::Arena;

/// Largest drawing surface side, wgpu's default `max_texture_dimension_2d`.
pub const MAX_SURFACE_SIDE: u32 = 8192;

/// Largest photon pool a config may ask for.
pub const MAX_CAPACITY: usize = 100_000;

/// Tunables for the simulation, its renderer and the signal cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// Radius of the round display in display units.
    pub boundary_radius: f32,
    /// Each velocity axis is drawn from `[-max_velocity / 2, max_velocity / 2)`.
    pub max_velocity: f32,
    /// Photons per unit of sensor reading.
    pub photons_ratio: f32,
    /// Largest reading the sensor can report.
    pub max_signal_strength: f32,
    /// Period of the signal cadence in milliseconds.
    pub signal_interval_ms: u64,
    /// Alpha of the black fill laid over each frame.
    pub fade_alpha: f32,
    pub photon_radius: f32,
    pub hit_radius: f32,
    /// RNG seed for the initial population. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            boundary_radius: 180.0,
            max_velocity: 4.0,
            photons_ratio: 0.002,
            max_signal_strength: 65535.0,
            signal_interval_ms: 1000,
            fade_alpha: 0.1,
            photon_radius: 2.0,
            hit_radius: 12.0,
            seed: None,
        }
    }
}

impl SwarmConfig {
    /// Load a config from a JSON file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SwarmConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive: [(&'static str, f32); 6] = [
            ("boundary_radius", self.boundary_radius),
            ("max_velocity", self.max_velocity),
            ("photons_ratio", self.photons_ratio),
            ("max_signal_strength", self.max_signal_strength),
            ("photon_radius", self.photon_radius),
            ("hit_radius", self.hit_radius),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be a positive number",
                });
            }
        }
        if self.surface_side() > MAX_SURFACE_SIDE {
            return Err(ConfigError::Invalid {
                field: "boundary_radius",
                reason: "surface side must not exceed 8192 pixels",
            });
        }
        if self.capacity() > MAX_CAPACITY {
            return Err(ConfigError::Invalid {
                field: "photons_ratio",
                reason: "max_signal_strength * photons_ratio must not exceed 100000 photons",
            });
        }
        if self.signal_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "signal_interval_ms",
                reason: "must be at least 1",
            });
        }
        if !(0.0..=1.0).contains(&self.fade_alpha) {
            return Err(ConfigError::Invalid {
                field: "fade_alpha",
                reason: "must be within [0, 1]",
            });
        }
        Ok(())
    }

    /// Number of photons allocated up front: the count the largest possible
    /// reading maps to.
    pub fn capacity(&self) -> usize {
        self.population().round().max(0.0) as usize
    }

    /// Unrounded pool size, `max_signal_strength * photons_ratio`.
    #[inline]
    pub fn population(&self) -> f32 {
        self.max_signal_strength * self.photons_ratio
    }

    #[inline]
    pub fn signal_interval(&self) -> Duration {
        Duration::from_millis(self.signal_interval_ms)
    }

    /// Side of the square drawing surface.
    pub fn surface_side(&self) -> u32 {
        (self.boundary_radius * 2.0).ceil() as u32
    }

    pub fn arena(&self) -> Arena {
        Arena {
            radius: self.boundary_radius,
            photon_radius: self.photon_radius,
            hit_radius: self.hit_radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SwarmConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.capacity(), 131);
        assert!((config.population() - 131.07).abs() < 1e-3);
        assert_eq!(config.surface_side(), 360);
        assert_eq!(config.signal_interval(), Duration::from_millis(1000));
        assert_eq!(config.arena(), Arena::default());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SwarmConfig =
            serde_json::from_str(r#"{ "boundary_radius": 100.0, "seed": 9 }"#).unwrap();
        assert_eq!(config.boundary_radius, 100.0);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.photons_ratio, 0.002);
        assert_eq!(config.surface_side(), 200);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases = [
            SwarmConfig {
                boundary_radius: 0.0,
                ..Default::default()
            },
            SwarmConfig {
                photons_ratio: f32::NAN,
                ..Default::default()
            },
            SwarmConfig {
                signal_interval_ms: 0,
                ..Default::default()
            },
            SwarmConfig {
                fade_alpha: 1.5,
                ..Default::default()
            },
            SwarmConfig {
                boundary_radius: 1.0e6,
                ..Default::default()
            },
            SwarmConfig {
                boundary_radius: 4096.5,
                ..Default::default()
            },
            SwarmConfig {
                photons_ratio: 2.0,
                ..Default::default()
            },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid { .. })),
                "{config:?}"
            );
        }
    }

    #[test]
    fn test_validate_accepts_largest_surface() {
        let config = SwarmConfig {
            boundary_radius: 4096.0,
            ..Default::default()
        };
        assert_eq!(config.surface_side(), MAX_SURFACE_SIDE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let err = SwarmConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_roundtrip_file() {
        let dir = std::env::temp_dir().join(format!("photon-swarm-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("swarm.json");

        std::fs::write(&path, r#"{ "fade_alpha": 0.25, "signal_interval_ms": 250 }"#).unwrap();
        let config = SwarmConfig::load(&path).unwrap();
        assert_eq!(config.fade_alpha, 0.25);
        assert_eq!(config.signal_interval_ms, 250);

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            SwarmConfig::load(&path).unwrap_err(),
            ConfigError::Parse { .. }
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
