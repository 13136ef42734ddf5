//! Expression tracing and differentiation for gradsim.
//!
//! Simulation code written against `gradsim_math::Scalar` is traced once into
//! an [`ExprGraph`] by running it with [`ExprId`] as the scalar type, then
//! evaluated many times through shape-checked compiled evaluators:
//!
//! - [`CompiledRollout`] — forward evaluation of a declared output set.
//! - [`CompiledLoss`] — loss value plus reverse-mode gradient (VJP with seed
//!   1) with respect to a declared subset of inputs, in one call.
//!
//! Conditional physics stays differentiable because comparisons, conjunction
//! and selection are graph nodes: a select routes the adjoint to the branch
//! that was actually taken, and contributes exactly zero to the other.

pub mod compiled;
pub mod error;
pub mod graph;
pub mod primitive;

pub use compiled::{CompiledLoss, CompiledRollout, LossAndGradient};
pub use error::{ExprError, Result};
pub use graph::{trace, ExprGraph, ExprId};
pub use primitive::{lookup, Primitive, PRIMITIVES};
