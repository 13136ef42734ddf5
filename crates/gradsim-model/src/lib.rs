//! Scenario-independent data for gradsim.
//!
//! `Robot` is the static description of a mass-spring body (objects plus
//! spring topology), built once by procedural generators and never mutated
//! during simulation. `Controller` holds the learnable network tensors.
//! `Trajectory` is the recorded output of a rollout.

pub mod controller;
pub mod robot;
pub mod trajectory;

pub use controller::Controller;
pub use robot::{crawler, walker, Robot, Spring};
pub use trajectory::Trajectory;
