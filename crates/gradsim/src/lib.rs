//! gradsim — differentiable 2D toy physics.
//!
//! This is the umbrella crate re-exporting the pipeline pieces:
//!
//! - [`gradsim_math`] — scalar abstraction and 2D vectors.
//! - [`gradsim_expr`] — expression tracing and compiled evaluators (the
//!   differentiation boundary).
//! - [`gradsim_model`] — robot topologies, controller tensors, trajectories.
//! - [`gradsim_billiards`] — circle collisions with TOI correction and cue
//!   optimization.
//! - [`gradsim_spring`] — mass-spring locomotion and controller training.
//! - [`gradsim_opt`] — the fixed-iteration gradient-descent driver.

pub use gradsim_billiards::{self, optimize_cue, BilliardsScenario, CueSolution};
pub use gradsim_expr::{self, CompiledLoss, CompiledRollout, ExprGraph, ExprId};
pub use gradsim_math::{self, ipow, DVec, Scalar, Vec2};
pub use gradsim_model::{self, crawler, walker, Controller, Robot, Spring, Trajectory};
pub use gradsim_opt::{self, minimize, GradientDescentConfig, OptimizationResult};
pub use gradsim_spring::{self, train, ContactModel, SpringScenario};
