//! Minimal generic 2D vector.
//!
//! Deliberately small: the simulations only need component arithmetic, dot
//! products, norms, and an epsilon-regularized direction.

use crate::Scalar;
use std::ops::{Add, Neg, Sub};

/// A 2D vector over any [`Scalar`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2<T> {
    pub x: T,
    pub y: T,
}

impl<T: Scalar> Vec2<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    /// Lift a pair of constants into the scalar domain.
    pub fn constant(x: f64, y: f64) -> Self {
        Self::new(T::constant(x), T::constant(y))
    }

    pub fn zero() -> Self {
        Self::constant(0.0, 0.0)
    }

    pub fn scale(self, s: T) -> Self {
        Self::new(s * self.x, s * self.y)
    }

    pub fn dot(self, rhs: Self) -> T {
        self.x * rhs.x + self.y * rhs.y
    }

    pub fn norm(self) -> T {
        self.dot(self).sqrt()
    }

    /// Direction of `self`, regularized by an additive epsilon so the
    /// zero-length case stays finite (and differentiable).
    pub fn normalized(self, eps: f64) -> Self {
        self.scale(T::one() / (T::constant(eps) + self.norm()))
    }

    /// Component-wise branch-free conditional.
    pub fn select(cond: T::Cond, on_true: Self, on_false: Self) -> Self {
        Self::new(
            T::select(cond, on_true.x, on_false.x),
            T::select(cond, on_true.y, on_false.y),
        )
    }
}

impl Vec2<f64> {
    /// View as an `[x, y]` pair, the layout the visualization boundary uses.
    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl<T: Scalar> Add for Vec2<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<T: Scalar> Sub for Vec2<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<T: Scalar> Neg for Vec2<T> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn norm_and_dot() {
        let v = Vec2::new(3.0, 4.0);
        assert_relative_eq!(v.norm(), 5.0);
        assert_relative_eq!(v.dot(Vec2::new(1.0, 0.0)), 3.0);
    }

    #[test]
    fn normalized_handles_zero_length() {
        let v: Vec2<f64> = Vec2::zero();
        let d = v.normalized(1e-6);
        assert_eq!(d, Vec2::zero());
    }

    #[test]
    fn normalized_is_unit_for_long_vectors() {
        let d = Vec2::new(3.0, -4.0).normalized(1e-6);
        assert_relative_eq!(d.norm(), 1.0, epsilon = 1e-6);
    }
}
