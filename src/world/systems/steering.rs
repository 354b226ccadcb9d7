//! Steering kernel
//!
//! Pure heading computations over agent-relative facts (the fish sits at
//! the origin). Nothing here touches the world model or takes a lock; callers
//! hand in snapshots from [`Perception`](crate::world::perception::Perception).

use std::f64::consts::{FRAC_PI_2, TAU};

use rand::Rng;
use rustc_hash::FxHashMap;

use crate::util::vec2::Vec2;
use crate::world::constants::{self, steering::*};
use crate::world::perception::{BorderSighting, FoodSighting, ObstacleSighting};
use crate::world::state::Axis;

/// How an obstacle-avoidance call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvoidanceStatus {
    /// No obstacle left on the path
    Clear,
    /// The fish was inside an obstacle and turned straight away from it
    Reversed,
    /// The nearest blocking obstacle sits behind the seek target
    TargetInFront,
    /// Pass cap reached with an obstacle still on the path
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Avoidance {
    pub heading: Vec2,
    /// Scan passes performed
    pub passes: usize,
    pub status: AvoidanceStatus,
}

#[inline]
fn is_inside(obstacle: &ObstacleSighting) -> bool {
    obstacle.offset.length() < obstacle.radius
}

/// Obstacle ahead of `heading` (less than 90 degrees off) and either
/// overlapping the fish or within `radius + half_size` of the heading ray.
pub fn is_obstacle_on_path(heading: Vec2, half_size: f64, obstacle: &ObstacleSighting) -> bool {
    let to_obstacle = obstacle.offset;
    if heading.angle_to(to_obstacle).abs() >= FRAC_PI_2 {
        return false;
    }
    if is_inside(obstacle) {
        return true;
    }
    let projection = to_obstacle.project_onto(heading);
    (to_obstacle - projection).length() <= obstacle.radius + half_size
}

/// Target closer than the obstacle and not shadowed by it
pub fn is_target_in_front(target: Vec2, obstacle: &ObstacleSighting) -> bool {
    target.length() < obstacle.offset.length()
        && (obstacle.offset - target).length() >= obstacle.radius
}

fn encounter_key(offset: Vec2) -> (u64, u64) {
    (offset.x.to_bits(), offset.y.to_bits())
}

fn nearest_on_path<'a>(
    heading: Vec2,
    half_size: f64,
    obstacles: &'a [ObstacleSighting],
) -> Option<&'a ObstacleSighting> {
    nearest(
        obstacles
            .iter()
            .filter(|o| is_obstacle_on_path(heading, half_size, o)),
        |o| o.offset,
    )
}

/// Rotate `heading` away from obstacles until the path is clear.
///
/// Each pass picks the nearest obstacle on the path and turns away from it
/// by `AVOIDANCE_STEP` times the number of times that same obstacle has
/// been hit during this call. Obstacles to the left (positive signed angle)
/// push the heading right and vice versa. At most `MAX_AVOIDANCE_PASSES`
/// passes run.
pub fn avoid_obstacles(
    heading: Vec2,
    half_size: f64,
    obstacles: &[ObstacleSighting],
    target: Option<Vec2>,
) -> Avoidance {
    let mut heading = heading.normalize();
    if heading == Vec2::ZERO {
        return Avoidance {
            heading,
            passes: 0,
            status: AvoidanceStatus::Clear,
        };
    }

    let mut encounters: FxHashMap<(u64, u64), u32> = FxHashMap::default();
    let mut passes = 0;

    while passes < MAX_AVOIDANCE_PASSES {
        passes += 1;

        let Some(obstacle) = nearest_on_path(heading, half_size, obstacles) else {
            return Avoidance {
                heading,
                passes,
                status: AvoidanceStatus::Clear,
            };
        };

        if is_inside(obstacle) {
            let away = (-obstacle.offset).normalize();
            let heading = if away == Vec2::ZERO { -heading } else { away };
            return Avoidance {
                heading,
                passes,
                status: AvoidanceStatus::Reversed,
            };
        }

        if let Some(target) = target {
            if is_target_in_front(target, obstacle) {
                return Avoidance {
                    heading,
                    passes,
                    status: AvoidanceStatus::TargetInFront,
                };
            }
        }

        let count = encounters
            .entry(encounter_key(obstacle.offset))
            .and_modify(|c| *c += 1)
            .or_insert(1);
        let angle = AVOIDANCE_STEP * f64::from(*count);

        heading = if heading.angle_to(obstacle.offset) >= 0.0 {
            heading.rotate(-angle)
        } else {
            heading.rotate(angle)
        };
    }

    let status = if nearest_on_path(heading, half_size, obstacles).is_some() {
        AvoidanceStatus::Exhausted
    } else {
        AvoidanceStatus::Clear
    };
    Avoidance {
        heading,
        passes,
        status,
    }
}

/// Bounce off walls the heading is pressing towards.
///
/// A wall counts when it is within `BORDER_BUFFER + half_size`. With a seek
/// target, the bounce only happens when the target lies at or beyond that
/// wall on its axis. Axes are independent.
pub fn avoid_borders(
    heading: Vec2,
    half_size: f64,
    borders: &[BorderSighting],
    target: Option<Vec2>,
) -> Vec2 {
    let mut heading = heading;
    for border in borders {
        if border.distance > BORDER_BUFFER + half_size {
            continue;
        }
        let sign = border.direction.sign();
        let axis = border.direction.axis();
        let component = |v: Vec2| match axis {
            Axis::X => v.x,
            Axis::Y => v.y,
        };

        if component(heading) * sign <= 0.0 {
            continue;
        }
        if let Some(target) = target {
            if component(target) * sign < border.distance {
                continue;
            }
        }

        heading = match axis {
            Axis::X => heading.flip_x(),
            Axis::Y => heading.flip_y(),
        };
    }
    heading
}

/// Turn towards `target` by at most the weight-dependent turn rate.
/// Within the limit the heading snaps onto the target direction.
pub fn seek(heading: Vec2, target: Vec2, weight: f64) -> Vec2 {
    let desired = target.normalize();
    if desired == Vec2::ZERO {
        return heading;
    }
    let heading = heading.normalize();
    let max_turn = constants::max_turn_rate(weight);
    let angle = heading.angle_to(desired);
    if angle.abs() <= max_turn + ANGLE_EPSILON {
        desired
    } else {
        heading.rotate(max_turn * angle.signum())
    }
}

/// Rotate by a uniform random angle within +/- `WANDER_ANGLE`
pub fn wander<R: Rng + ?Sized>(heading: Vec2, rng: &mut R) -> Vec2 {
    heading.rotate(rng.gen_range(-WANDER_ANGLE..=WANDER_ANGLE))
}

/// Unit vector at a uniform random angle
pub fn random_heading<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    Vec2::from_angle(rng.gen_range(0.0..TAU))
}

/// Item whose offset from the origin is shortest. Ties keep the first.
pub fn nearest<T>(items: impl IntoIterator<Item = T>, offset: impl Fn(&T) -> Vec2) -> Option<T> {
    items
        .into_iter()
        .fold(None, |best: Option<(T, f64)>, item| {
            let d = offset(&item).length_sq();
            match best {
                Some((_, best_d)) if best_d <= d => best,
                _ => Some((item, d)),
            }
        })
        .map(|(item, _)| item)
}

/// Nearest sighted food, the usual seek target
pub fn nearest_food(food: &[FoodSighting]) -> Option<&FoodSighting> {
    nearest(food.iter(), |f| f.offset)
}
