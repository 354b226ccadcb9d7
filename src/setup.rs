//! World setup
//!
//! Sizes the aquarium, scatters obstacles and spawns fish at random.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SimulationConfig;
use crate::util::position::Position;
use crate::world::aquarium::{Aquarium, AquariumError};
use crate::world::constants::{self, fish, obstacle};
use crate::world::state::AgentId;

/// Coarse quantity setting for food drops and obstacle density
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Amount {
    Little,
    Normal,
    Many,
}

impl Amount {
    /// Food items per drop
    pub fn food_quantity(&self) -> usize {
        match self {
            Amount::Little => 3,
            Amount::Normal => 5,
            Amount::Many => 10,
        }
    }

    pub fn obstacle_count(&self) -> usize {
        match self {
            Amount::Little => 5,
            Amount::Normal => 10,
            Amount::Many => 20,
        }
    }
}

impl FromStr for Amount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "little" => Ok(Amount::Little),
            "normal" => Ok(Amount::Normal),
            "many" => Ok(Amount::Many),
            _ => Err(format!("unknown amount '{}'", s)),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Amount::Little => "LITTLE",
            Amount::Normal => "NORMAL",
            Amount::Many => "MANY",
        };
        f.write_str(name)
    }
}

/// Random point in `[0, width) x [0, height)`
pub fn random_position<R: Rng + ?Sized>(rng: &mut R, width: f64, height: f64) -> Position {
    Position::new(rng.gen_range(0.0..width), rng.gen_range(0.0..height))
}

/// Obstacle radius scaled to the aquarium height
pub fn random_obstacle_radius<R: Rng + ?Sized>(rng: &mut R, height: f64) -> f64 {
    (rng.gen::<f64>() * obstacle::RADIUS_SPREAD + obstacle::RADIUS_BASE) * height
}

/// Size the aquarium, store the food quantity and place the obstacles.
/// Fish are spawned separately.
pub fn populate<R: Rng + ?Sized>(
    world: &Aquarium,
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<(), AquariumError> {
    world.set_dimensions(config.width, config.height)?;
    world.set_food_quantity(config.food.food_quantity());

    let count = config.obstacles.obstacle_count();
    for _ in 0..count {
        let position = random_position(rng, config.width, config.height);
        let radius = random_obstacle_radius(rng, config.height);
        world.add_obstacle(position, radius);
    }

    info!(
        "Aquarium {}x{} ready: {} obstacles, {} food per drop",
        config.width,
        config.height,
        count,
        config.food.food_quantity()
    );
    Ok(())
}

/// Add a fish with a random position and weight and full, weight-scaled energy
pub fn spawn_fish<R: Rng + ?Sized>(
    world: &Aquarium,
    id: &str,
    rng: &mut R,
) -> Result<AgentId, AquariumError> {
    let dims = world
        .dimensions()
        .ok_or(AquariumError::DimensionsNotSet)?;
    let position = random_position(rng, dims.width, dims.height);
    let weight = rng.gen_range(fish::MIN_WEIGHT..fish::MAX_WEIGHT);
    let energy = constants::initial_energy(weight);
    world.add_fish(id, weight, energy, energy, position)?;
    Ok(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::state::Speed;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config() -> SimulationConfig {
        SimulationConfig {
            width: 200.0,
            height: 100.0,
            food: Amount::Little,
            obstacles: Amount::Many,
            ..Default::default()
        }
    }

    #[test]
    fn test_amount_quantities() {
        assert_eq!(Amount::Little.food_quantity(), 3);
        assert_eq!(Amount::Normal.food_quantity(), 5);
        assert_eq!(Amount::Many.food_quantity(), 10);
        assert_eq!(Amount::Little.obstacle_count(), 5);
        assert_eq!(Amount::Normal.obstacle_count(), 10);
        assert_eq!(Amount::Many.obstacle_count(), 20);
    }

    #[test]
    fn test_amount_parse_case_insensitive() {
        assert_eq!("Many".parse::<Amount>(), Ok(Amount::Many));
        assert_eq!("LITTLE".parse::<Amount>(), Ok(Amount::Little));
        assert_eq!(" normal ".parse::<Amount>(), Ok(Amount::Normal));
        assert!("lots".parse::<Amount>().is_err());
        assert_eq!(Amount::Many.to_string(), "MANY");
    }

    #[test]
    fn test_populate() {
        let world = Aquarium::new();
        let mut rng = StdRng::seed_from_u64(1);
        populate(&world, &config(), &mut rng).unwrap();

        let dims = world.dimensions().unwrap();
        assert_eq!(dims.width, 200.0);
        assert_eq!(dims.height, 100.0);
        assert_eq!(world.food_quantity(), 3);

        let obstacles = world.all_obstacles();
        assert_eq!(obstacles.len(), 20);
        for o in &obstacles {
            assert!(world.is_position_inside(o.position.x, o.position.y));
            assert!(o.radius >= 2.0 && o.radius < 12.0, "radius {}", o.radius);
        }
    }

    #[test]
    fn test_populate_twice_fails() {
        let world = Aquarium::new();
        let mut rng = StdRng::seed_from_u64(1);
        populate(&world, &config(), &mut rng).unwrap();
        assert_eq!(
            populate(&world, &config(), &mut rng),
            Err(AquariumError::DimensionsAlreadySet)
        );
    }

    #[test]
    fn test_spawn_fish() {
        let world = Aquarium::new();
        let mut rng = StdRng::seed_from_u64(2);
        populate(&world, &config(), &mut rng).unwrap();

        for i in 0..20 {
            spawn_fish(&world, &format!("fish{}", i), &mut rng).unwrap();
        }
        assert_eq!(world.live_count(), 20);
        for fish in world.all_agents() {
            assert!(fish.weight() >= fish::MIN_WEIGHT && fish.weight() < fish::MAX_WEIGHT);
            assert_eq!(fish.energy(), fish.weight() * fish::ENERGY_PER_GRAM);
            assert_eq!(fish.max_energy(), fish.energy());
            let p = fish.position();
            assert!(world.is_position_inside(p.x, p.y));
        }
    }

    #[test]
    fn test_starvation_time_independent_of_weight() {
        let world = Aquarium::new();
        world.set_dimensions(100.0, 100.0).unwrap();

        let moves_until_starved = |id: &str, weight: f64| {
            let energy = constants::initial_energy(weight);
            world
                .add_fish(id, weight, energy, energy, Position::new(50.0, 50.0))
                .unwrap();
            let mut moves = 0u32;
            while world.get_agent(id).unwrap().energy() > 0.0 {
                world.move_towards(id, 0.0, 0.0, Speed::Normal).unwrap();
                moves += 1;
            }
            moves
        };

        let light = moves_until_starved("light", fish::MIN_WEIGHT);
        let heavy = moves_until_starved("heavy", fish::MAX_WEIGHT);
        assert!((999..=1001).contains(&light), "light starved after {}", light);
        assert!(light.abs_diff(heavy) <= 1, "light {} vs heavy {}", light, heavy);
    }

    #[test]
    fn test_spawn_fish_needs_dimensions() {
        let world = Aquarium::new();
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(
            spawn_fish(&world, "fish0", &mut rng),
            Err(AquariumError::DimensionsNotSet)
        );
    }

    #[test]
    fn test_spawn_duplicate_fish_fails() {
        let world = Aquarium::new();
        let mut rng = StdRng::seed_from_u64(2);
        populate(&world, &config(), &mut rng).unwrap();
        spawn_fish(&world, "fish0", &mut rng).unwrap();
        assert_eq!(
            spawn_fish(&world, "fish0", &mut rng),
            Err(AquariumError::AgentAlreadyExists("fish0".into()))
        );
    }
}
