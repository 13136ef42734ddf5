//! Differentiable mass-spring locomotion.
//!
//! A spring-network robot above a flat ground plane, driven by a small
//! feed-forward controller evaluated once per step. Like the billiards
//! pipeline, every step is written over `gradsim_math::Scalar` so one code
//! path serves concrete simulation and expression tracing; training descends
//! the controller tensors through the traced rollout.

pub mod compile;
pub mod contact;
pub mod controller;
pub mod force;
pub mod rollout;
pub mod scenario;
pub mod train;

pub use compile::{compile_loss, compile_rollout, decode_rollout};
pub use contact::{advance_projection, advance_toi};
pub use controller::{centroid, controller_output};
pub use force::accumulate_spring_impulses;
pub use rollout::{head_loss, rollout, simulate, step, RolloutRecord};
pub use scenario::{ContactModel, SpringScenario};
pub use train::{train, training_config};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpringError {
    #[error(transparent)]
    Expr(#[from] gradsim_expr::ExprError),
}

pub type Result<T> = std::result::Result<T, SpringError>;
