//! Entity definitions: fish, food, obstacles and the small closed enums
//! (speed levels, border directions) the world model speaks in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::util::position::Position;
use crate::util::vec2::Vec2;
use crate::world::constants::{self, fish, food};

/// Unique fish identifier, chosen by the decision client
pub type AgentId = String;

/// Generated food identifier (`food0`, `food1`, ...)
pub type FoodId = String;

/// Movement speed level chosen by a decision client
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Speed {
    Slow,
    Normal,
    Fast,
    Faster,
}

impl Speed {
    pub const ALL: [Speed; 4] = [Speed::Slow, Speed::Normal, Speed::Fast, Speed::Faster];

    /// Scales both distance travelled and energy spent
    pub fn multiplier(&self) -> f64 {
        match self {
            Speed::Slow => 0.5,
            Speed::Normal => 1.0,
            Speed::Fast => 1.5,
            Speed::Faster => 2.0,
        }
    }
}

impl FromStr for Speed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slow" => Ok(Speed::Slow),
            "normal" => Ok(Speed::Normal),
            "fast" => Ok(Speed::Fast),
            "faster" => Ok(Speed::Faster),
            _ => Err(format!("unknown speed '{}'", s)),
        }
    }
}

/// Axis a border direction lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// One of the four aquarium walls. Screen coordinates: y grows downwards,
/// so `Top` is y = 0 and `Bottom` is y = height.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Direction {
    Top,
    Left,
    Bottom,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Left,
        Direction::Bottom,
        Direction::Right,
    ];

    pub fn axis(&self) -> Axis {
        match self {
            Direction::Left | Direction::Right => Axis::X,
            Direction::Top | Direction::Bottom => Axis::Y,
        }
    }

    /// +1.0 when the wall lies towards growing coordinates
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Right | Direction::Bottom => 1.0,
            Direction::Left | Direction::Top => -1.0,
        }
    }

    /// Distance from `position` to this wall of a `width` x `height` tank
    pub fn distance_from(&self, position: &Position, width: f64, height: f64) -> f64 {
        match self {
            Direction::Top => position.y,
            Direction::Bottom => height - position.y,
            Direction::Left => position.x,
            Direction::Right => width - position.x,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Top => "top",
            Direction::Left => "left",
            Direction::Bottom => "bottom",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

/// Fish state.
///
/// Weight is fixed at creation and drives every range. Energy always stays
/// within `[0, max_energy]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fish {
    position: Position,
    heading: Vec2,
    energy: f64,
    food_eaten: u64,
    weight: f64,
    max_energy: f64,
    id: AgentId,
}

impl Fish {
    pub fn new(id: AgentId, weight: f64, energy: f64, max_energy: f64, position: Position) -> Self {
        let max_energy = max_energy.max(0.0);
        Self {
            position,
            heading: Vec2::RIGHT,
            energy: energy.clamp(0.0, max_energy),
            food_eaten: 0,
            weight: weight.clamp(fish::MIN_WEIGHT, fish::MAX_WEIGHT),
            max_energy,
            id,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn max_energy(&self) -> f64 {
        self.max_energy
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn heading(&self) -> Vec2 {
        self.heading
    }

    pub fn food_eaten(&self) -> u64 {
        self.food_eaten
    }

    pub fn sensing_range(&self) -> f64 {
        constants::sensing_range(self.weight)
    }

    pub fn obstacle_range(&self) -> f64 {
        constants::obstacle_range(self.weight)
    }

    pub fn eating_range(&self) -> f64 {
        constants::eating_range(self.weight)
    }

    pub fn size(&self) -> f64 {
        constants::body_size(self.weight)
    }

    pub fn half_size(&self) -> f64 {
        self.size() / 2.0
    }

    pub fn base_speed(&self) -> f64 {
        constants::base_speed(self.weight)
    }

    /// Add energy, capped at `max_energy`
    pub fn add_energy(&mut self, amount: f64) {
        self.energy = self.max_energy.min(self.energy + amount);
    }

    /// Remove energy, floored at zero
    pub fn decrease_energy(&mut self, amount: f64) {
        self.energy = (self.energy - amount).max(0.0);
    }

    /// Translate by the raw offset (dx, dy), then point the heading from the
    /// old position to the new one and pay the movement cost.
    /// A zero offset keeps the previous heading.
    pub(crate) fn apply_move(&mut self, dx: f64, dy: f64, speed: Speed) {
        let old = self.position;
        self.position.translate(dx, dy);
        let heading = Vec2::between(&old, &self.position).normalize();
        if heading != Vec2::ZERO {
            self.heading = heading;
        }
        self.decrease_energy(speed.multiplier() * fish::MOVEMENT_COST * self.weight);
    }

    pub(crate) fn record_meal(&mut self, energy: f64) {
        self.add_energy(energy);
        self.food_eaten += 1;
    }

    /// Within sensing range of a point
    pub fn senses(&self, target: &Position) -> bool {
        self.position.distance_to(target) <= self.sensing_range()
    }

    /// Close enough to advertise a point as eatable
    pub fn can_eat_at(&self, target: &Position) -> bool {
        self.position.distance_to(target) <= self.eating_range() + self.half_size()
    }

    pub fn is_near_obstacle(&self, obstacle: &Obstacle) -> bool {
        self.position.distance_to(&obstacle.position) <= self.obstacle_range() + obstacle.radius
    }

    /// Half sizes of both bodies plus this fish's obstacle range.
    /// The same id short-circuits to true.
    pub fn is_near_fish(&self, other: &Fish) -> bool {
        if self.id == other.id {
            return true;
        }
        self.position.distance_to(&other.position)
            <= self.half_size() + self.obstacle_range() + other.half_size()
    }

    pub fn is_near_border(&self, direction: Direction, width: f64, height: f64) -> bool {
        direction.distance_from(&self.position, width, height)
            <= self.obstacle_range() + self.half_size()
    }
}

/// Sinking food particle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Food {
    pub id: FoodId,
    pub position: Position,
    /// Distance sunk per step, fixed at creation
    pub sink_speed: f64,
    /// Largest y the particle can reach
    pub floor: f64,
}

impl Food {
    /// `jitter` is added to the base sink step; callers draw it from
    /// `[0, food::SINK_JITTER)`.
    pub fn new(id: FoodId, position: Position, floor: f64, jitter: f64) -> Self {
        Self {
            id,
            position,
            sink_speed: food::SINK_STEP + jitter,
            floor,
        }
    }

    /// Advance downwards, clamped to `[0, floor]`
    pub fn sink(&mut self) {
        self.position.y = (self.position.y + self.sink_speed).min(self.floor).max(0.0);
    }

    pub fn has_settled(&self) -> bool {
        self.position.y >= self.floor
    }
}

/// Static circular obstacle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Obstacle {
    pub position: Position,
    pub radius: f64,
}

impl Obstacle {
    pub fn new(position: Position, radius: f64) -> Self {
        Self { position, radius }
    }

    /// True when `point` lies strictly inside the obstacle
    pub fn traps(&self, point: &Position) -> bool {
        self.position.distance_to(point) < self.radius
    }
}
