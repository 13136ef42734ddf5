//! Differentiable billiards.
//!
//! A cue ball and a triangular rack of identical circles on a unit table,
//! advanced with a pairwise impulse model and continuous time-of-impact
//! position correction. The rollout is written once over
//! `gradsim_math::Scalar`, so the same code runs concretely and under an
//! expression trace for gradient-based cue optimization.

pub mod collision;
pub mod compile;
pub mod optimize;
pub mod scenario;
pub mod sim;

pub use collision::{collide_pair, PairContribution};
pub use compile::{compile_loss, compile_rollout, decode_rollout, pack_inputs};
pub use optimize::{descent_config, optimize_cue, CueSolution};
pub use scenario::BilliardsScenario;
pub use sim::{rollout, simulate, step, target_loss};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BilliardsError {
    #[error(transparent)]
    Math(#[from] gradsim_math::MathError),

    #[error(transparent)]
    Expr(#[from] gradsim_expr::ExprError),
}

pub type Result<T> = std::result::Result<T, BilliardsError>;
