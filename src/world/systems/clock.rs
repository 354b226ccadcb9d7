//! World clock
//!
//! Background task that sinks food on a fixed period and drops a fresh batch
//! of food from the surface on a slower one.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::ClockConfig;
use crate::metrics::Metrics;
use crate::util::position::Position;
use crate::world::aquarium::{Aquarium, AquariumError};
use crate::world::constants::food;
use crate::world::state::FoodId;

pub struct WorldClock {
    world: Arc<Aquarium>,
    metrics: Arc<Metrics>,
    config: ClockConfig,
    rng: StdRng,
}

impl WorldClock {
    pub fn new(world: Arc<Aquarium>, metrics: Arc<Metrics>, config: ClockConfig, seed: u64) -> Self {
        Self {
            world,
            metrics,
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Drop `food_quantity` items along the surface, away from the side walls
    pub fn drop_food(&mut self) -> Result<Vec<FoodId>, AquariumError> {
        let dims = self
            .world
            .dimensions()
            .ok_or(AquariumError::DimensionsNotSet)?;
        let quantity = self.world.food_quantity();

        let mut dropped = Vec::with_capacity(quantity);
        for _ in 0..quantity {
            let x = self
                .rng
                .gen_range(food::DROP_MIN_X * dims.width..food::DROP_MAX_X * dims.width);
            let id = self.world.add_food(Position::new(x, 0.0), &mut self.rng)?;
            Metrics::incr(&self.metrics.food_spawned);
            dropped.push(id);
        }
        Ok(dropped)
    }

    /// One sink pass over all food
    pub fn sink(&self) -> usize {
        let advanced = self.world.sink_step();
        Metrics::incr(&self.metrics.sink_passes);
        advanced
    }

    /// Run until `shutdown` flips to true or its sender is dropped
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut sink_ticker = interval(self.config.sink_interval);
        sink_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut drop_ticker = interval_at(
            Instant::now() + self.config.first_drop,
            self.config.drop_interval,
        );
        drop_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "World clock started (sink every {:?}, first drop after {:?}, then every {:?})",
            self.config.sink_interval, self.config.first_drop, self.config.drop_interval
        );

        loop {
            tokio::select! {
                _ = sink_ticker.tick() => {
                    self.sink();
                }
                _ = drop_ticker.tick() => {
                    match self.drop_food() {
                        Ok(ids) => debug!("Dropped {} food item(s)", ids.len()),
                        Err(e) => warn!("Food drop failed: {}", e),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("World clock stopped");
    }
}

/// Spawn the clock onto the current runtime
pub fn start_world_clock(clock: WorldClock, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
    tokio::spawn(clock.run(shutdown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn world(quantity: usize) -> Arc<Aquarium> {
        let world = Aquarium::new();
        world.set_dimensions(100.0, 100.0).unwrap();
        world.set_food_quantity(quantity);
        Arc::new(world)
    }

    fn clock(world: &Arc<Aquarium>) -> WorldClock {
        WorldClock::new(
            world.clone(),
            Arc::new(Metrics::new()),
            ClockConfig::default(),
            17,
        )
    }

    #[test]
    fn test_drop_food_on_surface() {
        let world = world(5);
        let mut clock = clock(&world);
        let ids = clock.drop_food().unwrap();
        assert_eq!(ids.len(), 5);
        assert_eq!(world.food_count(), 5);
        for item in world.all_food() {
            assert_eq!(item.position.y, 0.0);
            assert!(item.position.x >= 10.0 && item.position.x < 90.0);
        }
        assert_eq!(clock.metrics.summary().food_spawned, 5);
    }

    #[test]
    fn test_drop_food_without_dimensions() {
        let world = Arc::new(Aquarium::new());
        let mut clock = clock(&world);
        assert_eq!(clock.drop_food(), Err(AquariumError::DimensionsNotSet));
    }

    #[test]
    fn test_sink_pass() {
        let world = world(2);
        let mut clock = clock(&world);
        clock.drop_food().unwrap();
        assert_eq!(clock.sink(), 2);
        for item in world.all_food() {
            assert!(item.position.y >= 2.0 && item.position.y < 3.0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_drops_after_delay_and_sinks() {
        let world = world(3);
        let (tx, rx) = watch::channel(false);
        let handle = start_world_clock(clock(&world), rx);

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(world.food_count(), 0);

        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(world.food_count(), 3);
        assert!(world.all_food().iter().all(|f| f.position.y > 0.0));

        // second drop lands 10s after the first
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(world.food_count(), 6);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_stops_when_sender_dropped() {
        let world = world(1);
        let (tx, rx) = watch::channel(false);
        let handle = start_world_clock(clock(&world), rx);
        drop(tx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("clock did not stop")
            .unwrap();
    }

    #[test]
    fn test_clock_exits_on_early_shutdown() {
        let world = world(1);
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        tokio_test::block_on(clock(&world).run(rx));
        assert_eq!(world.food_count(), 0);
    }
}
