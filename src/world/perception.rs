//! Agent-relative view of the aquarium
//!
//! Turns the world model's absolute query results into the facts a decision
//! client works with: offsets from the fish (fish at the local origin),
//! obstacle radii and wall distances. Everything here is an owned copy so it
//! can be handed to the steering kernel without holding any lock.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::util::vec2::Vec2;
use crate::world::aquarium::{Aquarium, AquariumError};
use crate::world::state::{AgentId, Direction, FoodId};

/// Food item seen from the fish
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodSighting {
    pub id: FoodId,
    pub offset: Vec2,
}

/// Obstacle seen from the fish
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ObstacleSighting {
    pub offset: Vec2,
    pub radius: f64,
}

/// Nearby wall and how far away it is
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BorderSighting {
    pub direction: Direction,
    pub distance: f64,
}

/// Everything one fish perceives in a single tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Perception {
    pub agent: AgentId,
    pub heading: Vec2,
    pub weight: f64,
    pub half_size: f64,
    pub energy: f64,
    pub max_energy: f64,
    pub base_speed: f64,
    pub food: Vec<FoodSighting>,
    /// Nearest food that is close enough to eat, if any
    pub closest_eatable: Option<FoodId>,
    /// Sorted nearest first
    pub obstacles: Vec<ObstacleSighting>,
    pub borders: SmallVec<[BorderSighting; 4]>,
    pub neighbours: Vec<AgentId>,
}

impl Perception {
    /// Observe the world on behalf of `agent`.
    ///
    /// A stopped agent perceives nothing (`Ok(None)`), including one removed
    /// halfway through the observation; an id that was never live is an
    /// `UnknownAgent` error.
    pub fn observe(world: &Aquarium, agent: &str) -> Result<Option<Self>, AquariumError> {
        match Self::observe_live(world, agent) {
            Ok(view) => Ok(Some(view)),
            Err(AquariumError::UnknownAgent(_)) if world.is_agent_stopped(agent) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn observe_live(world: &Aquarium, agent: &str) -> Result<Self, AquariumError> {
        let fish = world.get_agent(agent)?;
        let here = fish.position();

        let food = world
            .nearby_food(agent)?
            .into_iter()
            .map(|f| FoodSighting {
                offset: Vec2::between(&here, &f.position),
                id: f.id,
            })
            .collect();

        let closest_eatable = world.closest_eatable_food(agent)?.map(|f| f.id);

        let mut obstacles: Vec<ObstacleSighting> = world
            .nearby_obstacles(agent)?
            .into_iter()
            .map(|o| ObstacleSighting {
                offset: Vec2::between(&here, &o.position),
                radius: o.radius,
            })
            .collect();
        obstacles.sort_by(|a, b| a.offset.length_sq().total_cmp(&b.offset.length_sq()));

        let borders = match world.dimensions() {
            Some(dims) => world
                .nearby_borders(agent)?
                .into_iter()
                .map(|direction| BorderSighting {
                    direction,
                    distance: direction.distance_from(&here, dims.width, dims.height),
                })
                .collect(),
            None => SmallVec::new(),
        };

        let neighbours = world
            .nearby_fish(agent)?
            .into_iter()
            .map(|f| f.id().to_string())
            .collect();

        Ok(Self {
            agent: agent.to_string(),
            heading: fish.heading(),
            weight: fish.weight(),
            half_size: fish.half_size(),
            energy: fish.energy(),
            max_energy: fish.max_energy(),
            base_speed: fish.base_speed(),
            food,
            closest_eatable,
            obstacles,
            borders,
            neighbours,
        })
    }

    pub fn food_offset(&self, id: &str) -> Option<Vec2> {
        self.food.iter().find(|f| f.id == id).map(|f| f.offset)
    }
}
