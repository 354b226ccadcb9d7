use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use crate::util::position::Position;

/// Immutable 2D vector used for headings and offsets.
///
/// Every operation returns a new value. Angles follow `atan2(y, x)` and
/// rotations are counter-clockwise for positive radians.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const RIGHT: Vec2 = Vec2 { x: 1.0, y: 0.0 };

    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians
    #[inline]
    pub fn from_angle(angle: f64) -> Self {
        Self {
            x: angle.cos(),
            y: angle.sin(),
        }
    }

    /// Offset that leads from `from` to `to`
    #[inline]
    pub fn between(from: &Position, to: &Position) -> Self {
        Self {
            x: to.x - from.x,
            y: to.y - from.y,
        }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length_sq().sqrt()
    }

    #[inline]
    pub fn length_sq(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Unit vector with the same direction. A zero vector stays zero.
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        } else {
            Self::ZERO
        }
    }

    #[inline]
    pub fn dot(&self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (returns scalar z-component)
    #[inline]
    pub fn cross(&self, other: Vec2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn rotate(&self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    /// Reflects vector off surface with given normal
    pub fn reflect(&self, normal: Vec2) -> Self {
        *self - normal * (2.0 * self.dot(normal))
    }

    /// Same vector with the x component negated (bounce off a side wall)
    #[inline]
    pub fn flip_x(&self) -> Self {
        Self {
            x: -self.x,
            y: self.y,
        }
    }

    /// Same vector with the y component negated (bounce off top or bottom)
    #[inline]
    pub fn flip_y(&self) -> Self {
        Self {
            x: self.x,
            y: -self.y,
        }
    }

    /// Vector projection of `self` onto `axis`.
    /// Projecting onto a zero axis yields the zero vector.
    pub fn project_onto(&self, axis: Vec2) -> Self {
        let denom = axis.dot(axis);
        if denom > 0.0 {
            axis * (self.dot(axis) / denom)
        } else {
            Self::ZERO
        }
    }

    /// Returns angle in radians
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Signed angle that rotates `self` onto `other`, in (-π, π]
    pub fn angle_to(&self, other: Vec2) -> f64 {
        self.cross(other).atan2(self.dot(other))
    }

    /// Check if vector is approximately zero
    pub fn is_zero(&self, epsilon: f64) -> bool {
        self.x.abs() < epsilon && self.y.abs() < epsilon
    }

    /// Check if vector is approximately equal to another
    pub fn approx_eq(&self, other: Vec2, epsilon: f64) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl Mul<Vec2> for f64 {
    type Output = Vec2;
    fn mul(self, rhs: Vec2) -> Vec2 {
        Vec2 {
            x: self * rhs.x,
            y: self * rhs.y,
        }
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_length() {
        let v = Vec2::new(3.0, 4.0);
        assert!(approx_eq(v.length(), 5.0));
        assert!(approx_eq(v.length_sq(), 25.0));
        assert!(approx_eq(Vec2::ZERO.length(), 0.0));
    }

    #[test]
    fn test_normalize() {
        let n = Vec2::new(3.0, 4.0).normalize();
        assert!(approx_eq(n.length(), 1.0));
        assert!(approx_eq(n.x, 0.6));
        assert!(approx_eq(n.y, 0.8));
    }

    #[test]
    fn test_normalize_zero_stays_zero() {
        let n = Vec2::ZERO.normalize();
        assert_eq!(n, Vec2::ZERO);
        assert!(!n.x.is_nan());
    }

    #[test]
    fn test_operations_do_not_mutate() {
        let v = Vec2::new(1.0, 2.0);
        let _ = v.rotate(1.0);
        let _ = v.normalize();
        let _ = v.flip_x();
        assert_eq!(v, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_rotate_counter_clockwise() {
        let r = Vec2::RIGHT.rotate(PI / 2.0);
        assert!(r.approx_eq(Vec2::new(0.0, 1.0), EPSILON));

        let r = Vec2::RIGHT.rotate(PI);
        assert!(r.approx_eq(Vec2::new(-1.0, 0.0), EPSILON));
    }

    #[test]
    fn test_from_angle() {
        assert!(Vec2::from_angle(0.0).approx_eq(Vec2::RIGHT, EPSILON));
        assert!(Vec2::from_angle(PI / 2.0).approx_eq(Vec2::new(0.0, 1.0), EPSILON));
    }

    #[test]
    fn test_angle() {
        assert!(approx_eq(Vec2::new(1.0, 0.0).angle(), 0.0));
        assert!(approx_eq(Vec2::new(0.0, 1.0).angle(), PI / 2.0));
        assert!(approx_eq(Vec2::new(-1.0, 0.0).angle(), PI));
    }

    #[test]
    fn test_angle_to_is_signed() {
        let a = Vec2::RIGHT;
        assert!(approx_eq(a.angle_to(Vec2::new(0.0, 1.0)), PI / 2.0));
        assert!(approx_eq(a.angle_to(Vec2::new(0.0, -1.0)), -PI / 2.0));
        assert!(approx_eq(a.angle_to(a), 0.0));
    }

    #[test]
    fn test_dot_and_cross() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, 4.0);
        assert!(approx_eq(a.dot(b), 11.0));
        assert!(approx_eq(Vec2::RIGHT.cross(Vec2::new(0.0, 1.0)), 1.0));
    }

    #[test]
    fn test_reflect() {
        let v = Vec2::new(1.0, -1.0).normalize();
        let reflected = v.reflect(Vec2::new(0.0, 1.0));
        assert!(approx_eq(reflected.x, v.x));
        assert!(approx_eq(reflected.y, -v.y));
    }

    #[test]
    fn test_flips() {
        let v = Vec2::new(0.6, -0.8);
        assert_eq!(v.flip_x(), Vec2::new(-0.6, -0.8));
        assert_eq!(v.flip_y(), Vec2::new(0.6, 0.8));
    }

    #[test]
    fn test_project_onto() {
        let p = Vec2::new(3.0, 4.0).project_onto(Vec2::new(2.0, 0.0));
        assert!(p.approx_eq(Vec2::new(3.0, 0.0), EPSILON));
        assert_eq!(Vec2::new(3.0, 4.0).project_onto(Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_between_positions() {
        let from = Position::new(1.0, 1.0);
        let to = Position::new(4.0, 5.0);
        assert_eq!(Vec2::between(&from, &to), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_arithmetic() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, 4.0);
        assert_eq!(a + b, Vec2::new(4.0, 6.0));
        assert_eq!(b - a, Vec2::new(2.0, 2.0));
        assert_eq!(a * 2.0, Vec2::new(2.0, 4.0));
        assert_eq!(2.0 * a, Vec2::new(2.0, 4.0));
        assert_eq!(-a, Vec2::new(-1.0, -2.0));
    }

    #[test]
    fn test_serde_json() {
        let v = Vec2::new(1.5, 2.5);
        let encoded = serde_json::to_string(&v).unwrap();
        let decoded: Vec2 = serde_json::from_str(&encoded).unwrap();
        assert_eq!(v, decoded);
    }
}
