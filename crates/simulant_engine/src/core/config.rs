//! # World Configuration
//!
//! Consolidates the tunables of every subsystem into one serializable
//! structure that can be loaded from TOML or RON.
//!
//! ```toml
//! overlay_file = "overlays.ron"
//!
//! [spatial]
//! max_elements_per_node = 8
//! max_depth = 8
//! min_node_size = 1.0
//!
//! [events]
//! tracing = false
//! trace_capacity = 1024
//! default_sort = "ByHierarchy"
//!
//! [transition]
//! incoming_lifetime = 30
//! outgoing_lifetime = 30
//! ```

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};
use crate::events::SortStrategy;
use crate::spatial::QuadtreeConfig;

/// Event system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Record every publish call for diagnostics
    pub tracing: bool,
    /// Maximum number of trace records kept before the oldest are dropped
    pub trace_capacity: usize,
    /// Sort strategy used by `publish` when none is given explicitly
    pub default_sort: SortStrategy,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            tracing: false,
            trace_capacity: 1024,
            default_sort: SortStrategy::ByHierarchy,
        }
    }
}

/// Default screen transition lifetimes, in ticks
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Ticks spent in the Incoming state
    pub incoming_lifetime: u64,
    /// Ticks spent in the Outgoing state
    pub outgoing_lifetime: u64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            incoming_lifetime: 30,
            outgoing_lifetime: 30,
        }
    }
}

/// World-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Spatial index parameters used for every screen
    pub spatial: QuadtreeConfig,
    /// Event system parameters
    pub events: EventConfig,
    /// Screen transition defaults
    pub transition: TransitionConfig,
    /// Optional RON overlay file loaded at world creation
    pub overlay_file: Option<String>,
}

impl Config for WorldConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_config_toml_round_trip() {
        let path = std::env::temp_dir().join(format!("world_config_{}.toml", std::process::id()));
        let mut config = WorldConfig::default();
        config.events.tracing = true;
        config.transition.incoming_lifetime = 5;
        config.overlay_file = Some("overlays.ron".to_string());
        config.save_to_file(&path).expect("save config");

        let loaded = WorldConfig::load_from_file(&path).expect("load config");
        assert!(loaded.events.tracing);
        assert_eq!(loaded.transition.incoming_lifetime, 5);
        assert_eq!(loaded.overlay_file.as_deref(), Some("overlays.ron"));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: WorldConfig = toml::from_str("[events]\ntracing = true\n").expect("parse");
        assert!(config.events.tracing);
        assert_eq!(config.events.trace_capacity, 1024);
        assert_eq!(config.transition.outgoing_lifetime, 30);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = WorldConfig::load_from_file("world.json");
        assert!(matches!(result, Err(ConfigError::Io(_)) | Err(ConfigError::UnsupportedFormat(_))));
    }
}
