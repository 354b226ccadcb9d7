/// Fish body constants. Every range is a function of weight.
pub mod fish {
    /// Lightest fish the aquarium accepts (grams)
    pub const MIN_WEIGHT: f64 = 30.0;
    /// Heaviest fish the aquarium accepts (grams)
    pub const MAX_WEIGHT: f64 = 120.0;
    /// Floor for body size, cap for obstacle and eating range
    pub const MIN_RANGE: f64 = 10.0;
    /// Sensing range grows by this much per gram
    pub const RANGE_PER_GRAM: f64 = 2.0;
    /// Obstacle range = sensing range / this, capped at MIN_RANGE
    pub const OBSTACLE_RANGE_DIVISOR: f64 = 10.0;
    /// Eating range = sensing range / this, capped at MIN_RANGE
    pub const EATING_RANGE_DIVISOR: f64 = 15.0;
    /// Body size = weight / this, floored at MIN_RANGE
    pub const SIZE_DIVISOR: f64 = 4.0;
    /// Base speed = SPEED_FACTOR / weight
    pub const SPEED_FACTOR: f64 = 300.0;
    /// Energy cost per gram per unit of speed multiplier
    pub const MOVEMENT_COST: f64 = 1.0 / 200.0;
    /// Starting (and maximum) energy per gram, so every weight gets the
    /// same number of moves at a given speed
    pub const ENERGY_PER_GRAM: f64 = 5.0;
}

/// Food constants
pub mod food {
    /// Energy gained by the fish that eats one item
    pub const ENERGY: f64 = 30.0;
    /// Floor sits this far above the aquarium bottom
    pub const FLOOR_OFFSET: f64 = 7.0;
    /// Base distance sunk per sink step
    pub const SINK_STEP: f64 = 2.0;
    /// Upper bound (exclusive) of the per-item sink jitter
    pub const SINK_JITTER: f64 = 1.0;
    /// Id prefix for generated food ids
    pub const ID_PREFIX: &str = "food";
    /// Drops land between these fractions of the aquarium width
    pub const DROP_MIN_X: f64 = 0.1;
    pub const DROP_MAX_X: f64 = 0.9;
}

/// Obstacle generation constants
pub mod obstacle {
    /// Radius = (U[0,1) * RADIUS_SPREAD + RADIUS_BASE) * height
    pub const RADIUS_SPREAD: f64 = 0.1;
    pub const RADIUS_BASE: f64 = 0.02;
}

/// Steering kernel constants
pub mod steering {
    use std::f64::consts::PI;

    /// Rotation added per repeated encounter with the same obstacle
    pub const AVOIDANCE_STEP: f64 = 3.0 * PI / 180.0;
    /// Upper bound on scan-and-rotate passes per avoidance call
    pub const MAX_AVOIDANCE_PASSES: usize = 50;
    /// Wall distance (before half body size) at which headings bounce
    pub const BORDER_BUFFER: f64 = 25.0;
    /// Turn rate (degrees per tick) for the lightest fish
    pub const LIGHT_TURN_DEG: f64 = 30.0;
    /// Turn rate (degrees per tick) for the heaviest fish
    pub const HEAVY_TURN_DEG: f64 = 10.0;
    /// Random perturbation stays within +/- this angle
    pub const WANDER_ANGLE: f64 = PI / 4.0;
    /// Slack when comparing an angle against the turn limit
    pub const ANGLE_EPSILON: f64 = 1e-9;
}

/// Clock cadence constants
pub mod clock {
    /// Delay before the first food drop (ms)
    pub const FIRST_DROP_MS: u64 = 5_000;
    /// Delay between food drops (ms)
    pub const DROP_INTERVAL_MS: u64 = 10_000;
    /// Delay between sink passes (ms)
    pub const SINK_INTERVAL_MS: u64 = 200;
}

/// Linear range mapping: sends `weight1 -> angle1` and `weight2 -> angle2`
#[inline]
pub fn map_range(weight: f64, weight1: f64, weight2: f64, angle1: f64, angle2: f64) -> f64 {
    (angle2 - angle1) / (weight2 - weight1) * (weight - weight1) + angle1
}

/// Sensing range for a fish of the given weight
#[inline]
pub fn sensing_range(weight: f64) -> f64 {
    fish::MIN_RANGE + weight * fish::RANGE_PER_GRAM
}

/// Obstacle detection range (capped, heavier fish do not get larger margins)
#[inline]
pub fn obstacle_range(weight: f64) -> f64 {
    fish::MIN_RANGE.min(sensing_range(weight) / fish::OBSTACLE_RANGE_DIVISOR)
}

/// Eating range (capped low)
#[inline]
pub fn eating_range(weight: f64) -> f64 {
    fish::MIN_RANGE.min(sensing_range(weight) / fish::EATING_RANGE_DIVISOR)
}

/// Body size (diameter)
#[inline]
pub fn body_size(weight: f64) -> f64 {
    fish::MIN_RANGE.max(weight / fish::SIZE_DIVISOR)
}

/// Starting and maximum energy of a freshly spawned fish
#[inline]
pub fn initial_energy(weight: f64) -> f64 {
    weight * fish::ENERGY_PER_GRAM
}

/// Distance covered per move at speed multiplier 1.0
#[inline]
pub fn base_speed(weight: f64) -> f64 {
    fish::SPEED_FACTOR / weight
}

/// Per-tick turn limit in radians; heavier bodies turn more sluggishly
#[inline]
pub fn max_turn_rate(weight: f64) -> f64 {
    map_range(
        weight,
        fish::MIN_WEIGHT,
        fish::MAX_WEIGHT,
        steering::LIGHT_TURN_DEG,
        steering::HEAVY_TURN_DEG,
    )
    .to_radians()
}
