//! Swimmer driver
//!
//! A deliberately simple decision client used by the binary and the tests:
//! each tick it observes, picks the nearest food as target, seeks it (or
//! wanders), runs obstacle and border avoidance, moves, and eats whatever
//! the world advertises as eatable. A fish with no energy left is removed.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::metrics::Metrics;
use crate::util::vec2::Vec2;
use crate::world::aquarium::{Aquarium, AquariumError};
use crate::world::perception::Perception;
use crate::world::state::{AgentId, FoodId, Speed};
use crate::world::systems::steering::{self, AvoidanceStatus};

/// What a single tick did
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Moved along `heading`
    Moved { heading: Vec2 },
    Ate(FoodId),
    /// Ran out of energy and was removed
    Starved,
    /// Already removed by someone else
    Stopped,
}

pub struct Swimmer {
    id: AgentId,
    world: Arc<Aquarium>,
    metrics: Arc<Metrics>,
    speed: Speed,
    rng: StdRng,
    /// Replaces the world's default heading on the first move
    start_heading: Option<Vec2>,
}

impl Swimmer {
    pub fn new(
        id: impl Into<AgentId>,
        world: Arc<Aquarium>,
        metrics: Arc<Metrics>,
        speed: Speed,
        seed: u64,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let start_heading = Some(steering::random_heading(&mut rng));
        Self {
            id: id.into(),
            world,
            metrics,
            speed,
            rng,
            start_heading,
        }
    }

    /// Start along `heading` instead of a random direction
    pub fn facing(mut self, heading: Vec2) -> Self {
        self.start_heading = Some(heading);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn starve(&self) -> Result<StepOutcome, AquariumError> {
        self.world.remove_agent(&self.id)?;
        self.metrics.record_fish_stopped();
        Ok(StepOutcome::Starved)
    }

    /// Run one observe-decide-act cycle
    pub fn step(&mut self) -> Result<StepOutcome, AquariumError> {
        let Some(view) = Perception::observe(&self.world, &self.id)? else {
            return Ok(StepOutcome::Stopped);
        };

        if view.energy <= 0.0 {
            return self.starve();
        }

        if let Some(food) = &view.closest_eatable {
            Metrics::incr(&self.metrics.eat_attempts);
            if self.world.eat(&self.id, food)? {
                Metrics::incr(&self.metrics.food_eaten);
                return Ok(StepOutcome::Ate(food.clone()));
            }
            Metrics::incr(&self.metrics.eat_failures);
        }

        let current = self.start_heading.take().unwrap_or(view.heading);
        let target = steering::nearest_food(&view.food).map(|f| f.offset);
        let heading = match target {
            Some(offset) => steering::seek(current, offset, view.weight),
            None => steering::wander(current, &mut self.rng),
        };

        let avoidance = steering::avoid_obstacles(heading, view.half_size, &view.obstacles, target);
        self.metrics
            .avoidance_passes
            .fetch_add(avoidance.passes as u64, Ordering::Relaxed);
        if avoidance.status == AvoidanceStatus::Exhausted {
            Metrics::incr(&self.metrics.avoidance_exhausted);
            debug!("Fish {} boxed in by obstacles", self.id);
        }

        let heading = steering::avoid_borders(avoidance.heading, view.half_size, &view.borders, target);
        let step = heading * (view.base_speed * self.speed.multiplier());
        self.world.move_towards(&self.id, step.x, step.y, self.speed)?;
        Metrics::incr(&self.metrics.moves);

        if self.world.get_agent(&self.id)?.energy() <= 0.0 {
            return self.starve();
        }
        Ok(StepOutcome::Moved { heading })
    }

    /// Step every `tick` until the fish is gone or `shutdown` fires
    pub async fn run(mut self, tick: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let started = Instant::now();
                    let outcome = self.step();
                    self.metrics.record_decision_time(started.elapsed());
                    match outcome {
                        Ok(StepOutcome::Starved) => {
                            info!("Fish {} starved", self.id);
                            break;
                        }
                        Ok(StepOutcome::Stopped) => break,
                        Ok(_) => {}
                        Err(e) => {
                            warn!("Swimmer {} failed: {}", self.id, e);
                            break;
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }
}

pub fn start_swimmer(
    swimmer: Swimmer,
    tick: Duration,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(swimmer.run(tick, shutdown))
}
