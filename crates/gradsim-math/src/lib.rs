//! Math primitives for the gradsim physics crates.
//!
//! Provides the [`Scalar`] abstraction that lets simulation code run both on
//! plain `f64` and on traced expression scalars, a minimal generic 2D vector,
//! and an integer-power routine.

pub mod scalar;
pub mod vec2;

pub use scalar::Scalar;
pub use vec2::Vec2;

use nalgebra as na;
use thiserror::Error;

/// Dynamic vector of `f64`, used for flat parameter/gradient storage.
pub type DVec = na::DVector<f64>;
/// Dynamic matrix of `f64`.
pub type DMat = na::DMatrix<f64>;

#[derive(Debug, Error, PartialEq)]
pub enum MathError {
    #[error("exponent is not an integer: {0}")]
    NonIntegerExponent(f64),
}

/// Raise `base` to an integer power via exponentiation by squaring.
///
/// The exponent arrives as `f64` because it is user configuration (e.g. a
/// loss exponent); anything with a fractional part is rejected rather than
/// truncated.
pub fn ipow<T: Scalar>(base: T, exponent: f64) -> Result<T, MathError> {
    if !exponent.is_finite() || exponent.fract() != 0.0 {
        return Err(MathError::NonIntegerExponent(exponent));
    }
    Ok(ipow_int(base, exponent as i64))
}

fn ipow_int<T: Scalar>(x: T, n: i64) -> T {
    if n < 0 {
        ipow_int(T::one() / x, -n)
    } else if n == 0 {
        T::one()
    } else if n == 1 {
        x
    } else if n % 2 == 0 {
        ipow_int(x * x, n / 2)
    } else {
        x * ipow_int(x * x, (n - 1) / 2)
    }
}
