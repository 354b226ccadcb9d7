//! Simulation metrics
//!
//! Lock-free counters updated by the world clock and the swimmer tasks.
//! `render()` produces Prometheus text exposition, `summary()` a serializable
//! snapshot for logs and the final report.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::Serialize;

const TICK_HISTORY: usize = 1000;

/// Metrics registry for one simulation run
#[derive(Debug)]
pub struct Metrics {
    // Fish
    pub fish_live: AtomicU64,
    pub fish_stopped: AtomicU64,

    // Food
    pub food_spawned: AtomicU64,
    pub food_eaten: AtomicU64,
    pub sink_passes: AtomicU64,

    // Commands
    pub moves: AtomicU64,
    pub eat_attempts: AtomicU64,
    pub eat_failures: AtomicU64,

    // Steering
    pub avoidance_passes: AtomicU64,
    pub avoidance_exhausted: AtomicU64,

    // Swimmer decision time (microseconds)
    pub decision_time_us: AtomicU64,
    pub decision_time_p95_us: AtomicU64,
    pub decision_time_max_us: AtomicU64,
    pub decisions: AtomicU64,

    start_time: Instant,

    decision_history: RwLock<VecDeque<u64>>,
}

/// Point-in-time copy of every counter
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct MetricsSummary {
    pub fish_live: u64,
    pub fish_stopped: u64,
    pub food_spawned: u64,
    pub food_eaten: u64,
    pub sink_passes: u64,
    pub moves: u64,
    pub eat_attempts: u64,
    pub eat_failures: u64,
    pub avoidance_passes: u64,
    pub avoidance_exhausted: u64,
    pub decisions: u64,
    pub decision_time_p95_us: u64,
    pub decision_time_max_us: u64,
    pub uptime_seconds: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            fish_live: AtomicU64::new(0),
            fish_stopped: AtomicU64::new(0),
            food_spawned: AtomicU64::new(0),
            food_eaten: AtomicU64::new(0),
            sink_passes: AtomicU64::new(0),
            moves: AtomicU64::new(0),
            eat_attempts: AtomicU64::new(0),
            eat_failures: AtomicU64::new(0),
            avoidance_passes: AtomicU64::new(0),
            avoidance_exhausted: AtomicU64::new(0),
            decision_time_us: AtomicU64::new(0),
            decision_time_p95_us: AtomicU64::new(0),
            decision_time_max_us: AtomicU64::new(0),
            decisions: AtomicU64::new(0),
            start_time: Instant::now(),
            decision_history: RwLock::new(VecDeque::with_capacity(TICK_HISTORY)),
        }
    }

    #[inline]
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// A fish left the live set
    pub fn record_fish_stopped(&self) {
        // saturating: a fish stopped twice must not wrap the gauge
        let _ = self
            .fish_live
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| Some(v.saturating_sub(1)));
        self.fish_stopped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one swimmer decision and refresh the rolling p95/max
    pub fn record_decision_time(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.decision_time_us.store(us, Ordering::Relaxed);
        self.decisions.fetch_add(1, Ordering::Relaxed);

        let mut history = self.decision_history.write();
        history.push_back(us);
        while history.len() > TICK_HISTORY {
            history.pop_front();
        }

        if history.len() >= 10 {
            let mut sorted: Vec<u64> = history.iter().copied().collect();
            sorted.sort_unstable();
            let p95_idx = (sorted.len() as f64 * 0.95) as usize;
            self.decision_time_p95_us
                .store(sorted[p95_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.decision_time_max_us
                .store(sorted.last().copied().unwrap_or(0), Ordering::Relaxed);
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            fish_live: self.fish_live.load(Ordering::Relaxed),
            fish_stopped: self.fish_stopped.load(Ordering::Relaxed),
            food_spawned: self.food_spawned.load(Ordering::Relaxed),
            food_eaten: self.food_eaten.load(Ordering::Relaxed),
            sink_passes: self.sink_passes.load(Ordering::Relaxed),
            moves: self.moves.load(Ordering::Relaxed),
            eat_attempts: self.eat_attempts.load(Ordering::Relaxed),
            eat_failures: self.eat_failures.load(Ordering::Relaxed),
            avoidance_passes: self.avoidance_passes.load(Ordering::Relaxed),
            avoidance_exhausted: self.avoidance_exhausted.load(Ordering::Relaxed),
            decisions: self.decisions.load(Ordering::Relaxed),
            decision_time_p95_us: self.decision_time_p95_us.load(Ordering::Relaxed),
            decision_time_max_us: self.decision_time_max_us.load(Ordering::Relaxed),
            uptime_seconds: self.uptime_seconds(),
        }
    }

    /// Prometheus text exposition format
    pub fn render(&self) -> String {
        let s = self.summary();
        let mut output = String::with_capacity(2048);

        macro_rules! metric {
            ($name:expr, $help:expr, $type:expr, $value:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} {}\n{} {}\n",
                    $name, $help, $name, $type, $name, $value
                ));
            };
        }

        metric!("aquarium_fish_live", "Number of live fish", "gauge", s.fish_live);
        metric!("aquarium_fish_stopped_total", "Fish removed from the simulation", "counter",
            s.fish_stopped);

        metric!("aquarium_food_spawned_total", "Food items dropped", "counter", s.food_spawned);
        metric!("aquarium_food_eaten_total", "Food items eaten", "counter", s.food_eaten);
        metric!("aquarium_sink_passes_total", "Sink passes over all food", "counter",
            s.sink_passes);

        metric!("aquarium_moves_total", "Move commands applied", "counter", s.moves);
        metric!("aquarium_eat_attempts_total", "Eat commands issued", "counter", s.eat_attempts);
        metric!("aquarium_eat_failures_total", "Eat commands that lost or missed", "counter",
            s.eat_failures);

        metric!("aquarium_avoidance_passes_total", "Obstacle avoidance scan passes", "counter",
            s.avoidance_passes);
        metric!("aquarium_avoidance_exhausted_total", "Avoidance calls that hit the pass cap",
            "counter", s.avoidance_exhausted);

        metric!("aquarium_decisions_total", "Swimmer decisions taken", "counter", s.decisions);
        metric!("aquarium_decision_time_p95_microseconds", "95th percentile decision time",
            "gauge", s.decision_time_p95_us);
        metric!("aquarium_decision_time_max_microseconds", "Maximum decision time", "gauge",
            s.decision_time_max_us);

        metric!("aquarium_uptime_seconds", "Simulation uptime in seconds", "counter",
            s.uptime_seconds);

        output
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
