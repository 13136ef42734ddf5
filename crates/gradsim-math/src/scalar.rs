//! Scalar abstraction shared by concrete and traced simulation code.

use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A scalar that simulation code can be written against once and executed
/// either directly (`f64`) or under an expression trace.
///
/// Conditionals are expressed through [`Scalar::select`] over two
/// fully-computed branches rather than control flow, so every step of a
/// rollout stays a pure data-flow expression that the differentiation
/// boundary can sweep.
pub trait Scalar:
    Copy
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Condition value produced by comparisons and consumed by `select`.
    type Cond: Copy;

    /// Lift a constant into the scalar domain.
    fn constant(value: f64) -> Self;

    fn sqrt(self) -> Self;
    fn exp(self) -> Self;
    fn tanh(self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;

    /// Strict less-than comparison.
    fn lt(self, rhs: Self) -> Self::Cond;

    /// Conjunction of two conditions.
    fn and(a: Self::Cond, b: Self::Cond) -> Self::Cond;

    /// Branch-free conditional: both sides are evaluated, the condition
    /// routes the value (and, under a trace, the gradient).
    fn select(cond: Self::Cond, on_true: Self, on_false: Self) -> Self;

    fn zero() -> Self {
        Self::constant(0.0)
    }

    fn one() -> Self {
        Self::constant(1.0)
    }

    fn min(self, rhs: Self) -> Self {
        Self::select(self.lt(rhs), self, rhs)
    }
}

impl Scalar for f64 {
    type Cond = bool;

    #[inline]
    fn constant(value: f64) -> Self {
        value
    }

    #[inline]
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }

    #[inline]
    fn exp(self) -> Self {
        f64::exp(self)
    }

    #[inline]
    fn tanh(self) -> Self {
        f64::tanh(self)
    }

    #[inline]
    fn sin(self) -> Self {
        f64::sin(self)
    }

    #[inline]
    fn cos(self) -> Self {
        f64::cos(self)
    }

    #[inline]
    fn lt(self, rhs: Self) -> bool {
        self < rhs
    }

    #[inline]
    fn and(a: bool, b: bool) -> bool {
        a && b
    }

    #[inline]
    fn select(cond: bool, on_true: Self, on_false: Self) -> Self {
        if cond { on_true } else { on_false }
    }
}
