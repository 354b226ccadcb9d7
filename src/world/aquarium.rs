//! Shared aquarium model
//!
//! Registry of every fish, food particle and obstacle, safe to use from any
//! number of threads at once. Each entity class sits behind its own lock so
//! food traffic never waits on fish movement and the other way round.
//!
//! Lock order (never acquire against it):
//! `agents` -> one fish -> `food` -> `recent_eaters`.
//! No method holds two fish locks at the same time and `obstacles` is only
//! ever taken on its own.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::OnceLock;

use hashbrown::{HashMap, HashSet};
use parking_lot::{Mutex, RwLock};
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::util::position::Position;
use crate::world::constants::food as food_consts;
use crate::world::state::{AgentId, Direction, Fish, Food, FoodId, Obstacle, Speed};

/// Errors raised by the aquarium model.
///
/// `UnknownAgent` is always a caller logic error and is never retried here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AquariumError {
    #[error("No such agent: {0}")]
    UnknownAgent(AgentId),
    #[error("Agent already exists: {0}")]
    AgentAlreadyExists(AgentId),
    #[error("No such food: {0}")]
    UnknownFood(FoodId),
    #[error("Invalid aquarium dimensions: {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },
    #[error("Aquarium dimensions already set")]
    DimensionsAlreadySet,
    #[error("Aquarium dimensions not set")]
    DimensionsNotSet,
    #[error("Fairness index undefined with {live} live agent(s)")]
    FairnessUndefined { live: usize },
}

/// Aquarium size, fixed once after construction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

/// Owned copy of the whole world, for reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AquariumSnapshot {
    pub dimensions: Option<Dimensions>,
    pub fish: Vec<Fish>,
    pub stopped: Vec<AgentId>,
    pub food: Vec<Food>,
    pub obstacles: Vec<Obstacle>,
    pub total_food_eaten: u64,
    pub food_quantity: usize,
}

#[derive(Default)]
struct AgentTable {
    live: HashMap<AgentId, Mutex<Fish>>,
    /// Ids that were live once. Late queries against them are inert.
    stopped: HashSet<AgentId>,
}

#[derive(Default)]
struct FoodTable {
    items: HashMap<FoodId, Food>,
    next_id: u64,
}

impl FoodTable {
    fn alloc_id(&mut self) -> FoodId {
        let id = format!("{}{}", food_consts::ID_PREFIX, self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }
}

/// The concurrent world model
#[derive(Default)]
pub struct Aquarium {
    agents: RwLock<AgentTable>,
    food: RwLock<FoodTable>,
    obstacles: RwLock<Vec<Obstacle>>,
    /// Eaters ordered from least to most recent
    recent_eaters: Mutex<VecDeque<AgentId>>,
    dimensions: OnceLock<Dimensions>,
    total_eaten: AtomicU64,
    food_quantity: AtomicUsize,
}

impl Aquarium {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_dimensions(&self, width: f64, height: f64) -> Result<(), AquariumError> {
        if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
            return Err(AquariumError::InvalidDimensions { width, height });
        }
        self.dimensions
            .set(Dimensions { width, height })
            .map_err(|_| AquariumError::DimensionsAlreadySet)?;
        info!("Aquarium dimensions set to {}x{}", width, height);
        Ok(())
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        self.dimensions.get().copied()
    }

    fn require_dimensions(&self) -> Result<Dimensions, AquariumError> {
        self.dimensions().ok_or(AquariumError::DimensionsNotSet)
    }

    /// True when (x, y) lies in `[0, width) x [0, height)`
    pub fn is_position_inside(&self, x: f64, y: f64) -> bool {
        match self.dimensions() {
            Some(d) => x >= 0.0 && x < d.width && y >= 0.0 && y < d.height,
            None => false,
        }
    }

    /// Target number of food items per drop
    pub fn food_quantity(&self) -> usize {
        self.food_quantity.load(Ordering::Relaxed)
    }

    pub fn set_food_quantity(&self, amount: usize) {
        self.food_quantity.store(amount, Ordering::Relaxed);
    }

    pub fn total_food_eaten(&self) -> u64 {
        self.total_eaten.load(Ordering::SeqCst)
    }

    pub fn contains_agent(&self, id: &str) -> bool {
        self.agents.read().live.contains_key(id)
    }

    /// Insert a new live fish. Re-using a stopped id revives it.
    pub fn add_fish(
        &self,
        id: &str,
        weight: f64,
        energy: f64,
        max_energy: f64,
        position: Position,
    ) -> Result<(), AquariumError> {
        let mut agents = self.agents.write();
        if agents.live.contains_key(id) {
            return Err(AquariumError::AgentAlreadyExists(id.to_string()));
        }
        let revived = agents.stopped.remove(id);
        let fish = Fish::new(id.to_string(), weight, energy, max_energy, position);
        info!(
            "Fish {} {} (weight {:.1}, energy {:.1}/{:.1}) at ({:.1}, {:.1})",
            id,
            if revived { "revived" } else { "added" },
            fish.weight(),
            fish.energy(),
            fish.max_energy(),
            position.x,
            position.y
        );
        agents.live.insert(id.to_string(), Mutex::new(fish));
        Ok(())
    }

    /// Move a live fish to the stopped set
    pub fn remove_agent(&self, id: &str) -> Result<(), AquariumError> {
        let mut agents = self.agents.write();
        if agents.live.remove(id).is_none() {
            return Err(AquariumError::UnknownAgent(id.to_string()));
        }
        agents.stopped.insert(id.to_string());
        self.recent_eaters.lock().retain(|eater| eater != id);
        info!("Fish {} stopped", id);
        Ok(())
    }

    pub fn is_agent_stopped(&self, id: &str) -> bool {
        self.agents.read().stopped.contains(id)
    }

    pub fn live_count(&self) -> usize {
        self.agents.read().live.len()
    }

    /// Run `f` against one live fish while holding only that fish's lock
    fn with_fish<T>(&self, id: &str, f: impl FnOnce(&Fish) -> T) -> Result<T, AquariumError> {
        let agents = self.agents.read();
        let cell = agents
            .live
            .get(id)
            .ok_or_else(|| AquariumError::UnknownAgent(id.to_string()))?;
        let fish = cell.lock();
        Ok(f(&fish))
    }

    fn with_fish_mut<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Fish) -> T,
    ) -> Result<T, AquariumError> {
        let agents = self.agents.read();
        let cell = agents
            .live
            .get(id)
            .ok_or_else(|| AquariumError::UnknownAgent(id.to_string()))?;
        let mut fish = cell.lock();
        Ok(f(&mut fish))
    }

    /// Owned snapshot of a live fish
    pub fn get_agent(&self, id: &str) -> Result<Fish, AquariumError> {
        self.with_fish(id, Fish::clone)
    }

    pub fn all_agents(&self) -> Vec<Fish> {
        let agents = self.agents.read();
        agents.live.values().map(|cell| cell.lock().clone()).collect()
    }

    pub fn stopped_agents(&self) -> Vec<AgentId> {
        self.agents.read().stopped.iter().cloned().collect()
    }

    /// Create a food item. Its floor sits just above the aquarium bottom.
    pub fn add_food<R: Rng + ?Sized>(
        &self,
        position: Position,
        rng: &mut R,
    ) -> Result<FoodId, AquariumError> {
        let dims = self.require_dimensions()?;
        let jitter = rng.gen_range(0.0..food_consts::SINK_JITTER);
        let mut food = self.food.write();
        let id = food.alloc_id();
        let item = Food::new(
            id.clone(),
            position,
            dims.height - food_consts::FLOOR_OFFSET,
            jitter,
        );
        food.items.insert(id.clone(), item);
        debug!("Food {} dropped at ({:.1}, {:.1})", id, position.x, position.y);
        Ok(id)
    }

    pub fn add_obstacle(&self, position: Position, radius: f64) {
        self.obstacles.write().push(Obstacle::new(position, radius));
    }

    pub fn all_food(&self) -> Vec<Food> {
        self.food.read().items.values().cloned().collect()
    }

    pub fn all_obstacles(&self) -> Vec<Obstacle> {
        self.obstacles.read().clone()
    }

    pub fn food_count(&self) -> usize {
        self.food.read().items.len()
    }

    pub fn get_food(&self, id: &str) -> Option<Food> {
        self.food.read().items.get(id).cloned()
    }

    /// Food item sitting exactly at (x, y), if any
    pub fn food_by_position(&self, x: f64, y: f64) -> Option<Food> {
        self.food
            .read()
            .items
            .values()
            .find(|f| f.position.x == x && f.position.y == y)
            .cloned()
    }

    fn food_position(&self, id: &str) -> Option<Position> {
        self.food.read().items.get(id).map(|f| f.position)
    }

    /// Sink a single food item
    pub fn sink(&self, id: &str) -> Result<(), AquariumError> {
        let mut food = self.food.write();
        let item = food
            .items
            .get_mut(id)
            .ok_or_else(|| AquariumError::UnknownFood(id.to_string()))?;
        item.sink();
        Ok(())
    }

    /// Sink every food item once. Returns how many items were advanced.
    pub fn sink_step(&self) -> usize {
        let mut food = self.food.write();
        food.items.values_mut().for_each(Food::sink);
        food.items.len()
    }

    /// Food within the fish's sensing range. Missing food is `false`.
    pub fn is_agent_close_to_food(&self, agent: &str, food: &str) -> Result<bool, AquariumError> {
        let fish = self.get_agent(agent)?;
        Ok(self
            .food_position(food)
            .map(|pos| fish.senses(&pos))
            .unwrap_or(false))
    }

    /// Food trapped inside some obstacle
    pub fn is_food_within_obstacle(&self, food: &str) -> bool {
        match self.food_position(food) {
            Some(pos) => self.obstacles.read().iter().any(|o| o.traps(&pos)),
            None => false,
        }
    }

    pub fn is_agent_close_to_obstacle(
        &self,
        agent: &str,
        obstacle: &Obstacle,
    ) -> Result<bool, AquariumError> {
        self.with_fish(agent, |fish| fish.is_near_obstacle(obstacle))
    }

    pub fn is_agent_close_to_other_agent(
        &self,
        agent: &str,
        other: &str,
    ) -> Result<bool, AquariumError> {
        let fish = self.get_agent(agent)?;
        let other_fish = self.get_agent(other)?;
        Ok(fish.is_near_fish(&other_fish))
    }

    pub fn is_agent_close_to_border(
        &self,
        agent: &str,
        direction: Direction,
    ) -> Result<bool, AquariumError> {
        let fish = self.get_agent(agent)?;
        let dims = self.require_dimensions()?;
        Ok(fish.is_near_border(direction, dims.width, dims.height))
    }

    /// Tight "advertise as eatable" test
    pub fn can_agent_eat_food(&self, agent: &str, food: &str) -> Result<bool, AquariumError> {
        let fish = self.get_agent(agent)?;
        Ok(self
            .food_position(food)
            .map(|pos| fish.can_eat_at(&pos))
            .unwrap_or(false))
    }

    /// Sensed food, excluding items trapped in obstacles
    pub fn nearby_food(&self, agent: &str) -> Result<Vec<Food>, AquariumError> {
        let fish = self.get_agent(agent)?;
        let food = self.all_food();
        let obstacles = self.all_obstacles();
        Ok(food
            .into_iter()
            .filter(|f| fish.senses(&f.position))
            .filter(|f| !obstacles.iter().any(|o| o.traps(&f.position)))
            .collect())
    }

    pub fn nearby_obstacles(&self, agent: &str) -> Result<Vec<Obstacle>, AquariumError> {
        let fish = self.get_agent(agent)?;
        Ok(self
            .all_obstacles()
            .into_iter()
            .filter(|o| fish.is_near_obstacle(o))
            .collect())
    }

    /// Other live fish close to `agent` (never includes `agent` itself)
    pub fn nearby_fish(&self, agent: &str) -> Result<Vec<Fish>, AquariumError> {
        let fish = self.get_agent(agent)?;
        Ok(self
            .all_agents()
            .into_iter()
            .filter(|other| other.id() != fish.id() && fish.is_near_fish(other))
            .collect())
    }

    pub fn nearby_borders(
        &self,
        agent: &str,
    ) -> Result<SmallVec<[Direction; 4]>, AquariumError> {
        let fish = self.get_agent(agent)?;
        let dims = self.require_dimensions()?;
        Ok(Direction::ALL
            .into_iter()
            .filter(|d| fish.is_near_border(*d, dims.width, dims.height))
            .collect())
    }

    /// Nearest food that is both nearby and eatable
    pub fn closest_eatable_food(&self, agent: &str) -> Result<Option<Food>, AquariumError> {
        let fish = self.get_agent(agent)?;
        let here = fish.position();
        Ok(self
            .nearby_food(agent)?
            .into_iter()
            .filter(|f| fish.can_eat_at(&f.position))
            .min_by(|a, b| {
                here.distance_to(&a.position)
                    .total_cmp(&here.distance_to(&b.position))
            }))
    }

    /// Translate a fish by the raw offset (dx, dy), recompute its heading
    /// and charge the movement cost, all under the fish's own lock.
    pub fn move_towards(
        &self,
        agent: &str,
        dx: f64,
        dy: f64,
        speed: Speed,
    ) -> Result<(), AquariumError> {
        self.with_fish_mut(agent, |fish| fish.apply_move(dx, dy, speed))
    }

    /// Try to eat a food item.
    ///
    /// Gated by the sensing-range test (not the tighter eating range).
    /// Existence check, proximity check and removal happen under one food
    /// write lock, so among simultaneous attempts on the same id exactly one
    /// returns `Ok(true)`.
    pub fn eat(&self, agent: &str, food: &str) -> Result<bool, AquariumError> {
        let agents = self.agents.read();
        let cell = agents
            .live
            .get(agent)
            .ok_or_else(|| AquariumError::UnknownAgent(agent.to_string()))?;
        let mut fish = cell.lock();

        {
            let mut table = self.food.write();
            let Some(item) = table.items.get(food) else {
                return Ok(false);
            };
            if !fish.senses(&item.position) {
                return Ok(false);
            }
            table.items.remove(food);
        }

        fish.record_meal(food_consts::ENERGY);
        self.total_eaten.fetch_add(1, Ordering::SeqCst);
        self.touch_recent_eater(agent);
        debug!(
            "Fish {} ate {} (energy {:.1}, eaten {})",
            agent,
            food,
            fish.energy(),
            fish.food_eaten()
        );
        Ok(true)
    }

    /// Move `agent` to the most-recent end of the eaters list
    fn touch_recent_eater(&self, agent: &str) {
        let mut eaters = self.recent_eaters.lock();
        if let Some(idx) = eaters.iter().position(|id| id == agent) {
            eaters.remove(idx);
        }
        eaters.push_back(agent.to_string());
    }

    /// Eaters from least to most recent
    pub fn recent_eaters(&self) -> Vec<AgentId> {
        self.recent_eaters.lock().iter().cloned().collect()
    }

    /// `exp(-variance / 3)` of per-fish eaten counts around
    /// `total_eaten / live`. Needs at least two live fish.
    pub fn fairness_index(&self) -> Result<f64, AquariumError> {
        let agents = self.agents.read();
        let live = agents.live.len();
        if live <= 1 {
            return Err(AquariumError::FairnessUndefined { live });
        }
        let mean = self.total_food_eaten() as f64 / live as f64;
        let sum_sq: f64 = agents
            .live
            .values()
            .map(|cell| {
                let diff = cell.lock().food_eaten() as f64 - mean;
                diff * diff
            })
            .sum();
        let variance = sum_sq / (live - 1) as f64;
        Ok((-variance / 3.0).exp())
    }

    pub fn snapshot(&self) -> AquariumSnapshot {
        AquariumSnapshot {
            dimensions: self.dimensions(),
            fish: self.all_agents(),
            stopped: self.stopped_agents(),
            food: self.all_food(),
            obstacles: self.all_obstacles(),
            total_food_eaten: self.total_food_eaten(),
            food_quantity: self.food_quantity(),
        }
    }
}
