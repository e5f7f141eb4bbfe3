//! # Core Engine Module
//!
//! Shared configuration for the simulation-state core.
//!
//! ## Organization
//!
//! - **Config**: world-level configuration covering the spatial index, the
//!   event system, screen transitions and overlay loading

pub mod config;

pub use crate::foundation;

pub use config::{
    WorldConfig,
    EventConfig,
    TransitionConfig,
    Config,
    ConfigError,
};
