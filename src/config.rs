use std::time::Duration;

use crate::setup::Amount;
use crate::world::constants::clock;

/// Timer settings for the world clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockConfig {
    /// Delay before the first food drop
    pub first_drop: Duration,
    /// Period between later drops
    pub drop_interval: Duration,
    /// Period between sink passes
    pub sink_interval: Duration,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            first_drop: Duration::from_millis(clock::FIRST_DROP_MS),
            drop_interval: Duration::from_millis(clock::DROP_INTERVAL_MS),
            sink_interval: Duration::from_millis(clock::SINK_INTERVAL_MS),
        }
    }
}

/// Simulation configuration
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Aquarium width in world units
    pub width: f64,
    /// Aquarium height in world units
    pub height: f64,
    /// Fish spawned at startup
    pub fish_count: usize,
    /// Food items per drop
    pub food: Amount,
    /// Obstacle density
    pub obstacles: Amount,
    /// Fixed RNG seed; random when unset
    pub seed: Option<u64>,
    /// Stop after this many seconds; run until Ctrl+C when unset
    pub run_secs: Option<u64>,
    /// Swimmer decision period
    pub tick: Duration,
    pub clock: ClockConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            fish_count: 8,
            food: Amount::Normal,
            obstacles: Amount::Normal,
            seed: None,
            run_secs: None,
            tick: Duration::from_millis(50),
            clock: ClockConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unset keys keep their
    /// default; unparsable or out-of-range values log a warning and do too.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(width) = lookup("AQUARIUM_WIDTH") {
            match width.parse::<f64>() {
                Ok(parsed) if parsed.is_finite() && parsed > 0.0 => config.width = parsed,
                Ok(_) => tracing::warn!("AQUARIUM_WIDTH must be > 0, using default"),
                Err(_) => tracing::warn!("Invalid AQUARIUM_WIDTH '{}', using default", width),
            }
        }

        if let Some(height) = lookup("AQUARIUM_HEIGHT") {
            match height.parse::<f64>() {
                Ok(parsed) if parsed.is_finite() && parsed > 0.0 => config.height = parsed,
                Ok(_) => tracing::warn!("AQUARIUM_HEIGHT must be > 0, using default"),
                Err(_) => tracing::warn!("Invalid AQUARIUM_HEIGHT '{}', using default", height),
            }
        }

        if let Some(fish) = lookup("AQUARIUM_FISH") {
            match fish.parse::<usize>() {
                Ok(parsed) if (1..=1000).contains(&parsed) => config.fish_count = parsed,
                Ok(_) => tracing::warn!("AQUARIUM_FISH must be 1-1000, using default"),
                Err(_) => tracing::warn!("Invalid AQUARIUM_FISH '{}', using default", fish),
            }
        }

        if let Some(food) = lookup("AQUARIUM_FOOD") {
            match food.parse::<Amount>() {
                Ok(parsed) => config.food = parsed,
                Err(_) => tracing::warn!("Invalid AQUARIUM_FOOD '{}', using default", food),
            }
        }

        if let Some(obstacles) = lookup("AQUARIUM_OBSTACLES") {
            match obstacles.parse::<Amount>() {
                Ok(parsed) => config.obstacles = parsed,
                Err(_) => {
                    tracing::warn!("Invalid AQUARIUM_OBSTACLES '{}', using default", obstacles)
                }
            }
        }

        if let Some(seed) = lookup("AQUARIUM_SEED") {
            match seed.parse::<u64>() {
                Ok(parsed) => config.seed = Some(parsed),
                Err(_) => tracing::warn!("Invalid AQUARIUM_SEED '{}', using random seed", seed),
            }
        }

        if let Some(secs) = lookup("AQUARIUM_RUN_SECS") {
            match secs.parse::<u64>() {
                Ok(0) => tracing::warn!("AQUARIUM_RUN_SECS must be > 0, running until Ctrl+C"),
                Ok(parsed) => config.run_secs = Some(parsed),
                Err(_) => tracing::warn!("Invalid AQUARIUM_RUN_SECS '{}', running until Ctrl+C", secs),
            }
        }

        if let Some(tick) = lookup("AQUARIUM_TICK_MS") {
            match tick.parse::<u64>() {
                Ok(parsed) if (1..=10_000).contains(&parsed) => {
                    config.tick = Duration::from_millis(parsed)
                }
                Ok(_) => tracing::warn!("AQUARIUM_TICK_MS must be 1-10000, using default"),
                Err(_) => tracing::warn!("Invalid AQUARIUM_TICK_MS '{}', using default", tick),
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err("width must be > 0".to_string());
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err("height must be > 0".to_string());
        }
        if self.fish_count == 0 {
            return Err("fish_count must be at least 1".to_string());
        }
        if self.tick.is_zero() {
            return Err("tick cannot be 0".to_string());
        }
        if self.clock.sink_interval.is_zero() || self.clock.drop_interval.is_zero() {
            return Err("clock intervals cannot be 0".to_string());
        }
        Ok(())
    }
}
