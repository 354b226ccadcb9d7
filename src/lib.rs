//! Simulated aquarium
//!
//! A concurrent world model of fish, sinking food and round obstacles, plus
//! the steering kernel fish use to find food and stay clear of obstacles and
//! walls.
//!
//! # Modules
//!
//! - `world` - shared aquarium state, perception and the background systems
//!   (world clock, swimmer driver, steering)
//! - `setup` - world sizing and random population
//! - `config` - environment-driven simulation settings
//! - `metrics` - atomic counters with Prometheus-style rendering

pub mod config;
pub mod metrics;
pub mod setup;
pub mod util;
pub mod world;
