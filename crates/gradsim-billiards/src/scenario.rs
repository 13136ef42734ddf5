//! Billiards scenario configuration and initial state.

use gradsim_math::Vec2;

/// Static description of a billiards problem.
///
/// Read-only to the simulation after setup. The ensemble is the cue ball at
/// index 0 followed by a triangular rack of `layers` rows; that ordering is
/// the indexing contract for the loss and the renderer.
#[derive(Debug, Clone)]
pub struct BilliardsScenario {
    /// Rows in the triangular rack.
    pub layers: usize,
    /// Shared ball radius.
    pub radius: f64,
    /// Shared restitution coefficient: 0 = perfectly inelastic, 1 = elastic.
    pub elasticity: f64,
    /// Timestep.
    pub dt: f64,
    /// Rollout horizon.
    pub steps: usize,
    /// Cue ball initial position (the optimizer's starting point).
    pub cue_position: Vec2<f64>,
    /// Cue ball initial velocity (the optimizer's starting point).
    pub cue_velocity: Vec2<f64>,
    /// Where the target ball should end up.
    pub goal: Vec2<f64>,
    /// Which ball the loss measures.
    pub target_ball: usize,
    /// Exponent of the distance loss; must be an integer value.
    pub loss_exponent: f64,
}

fn ball_count(layers: usize) -> usize {
    1 + layers * (layers + 1) / 2
}

impl Default for BilliardsScenario {
    fn default() -> Self {
        let layers = 4;
        Self {
            layers,
            radius: 0.03,
            elasticity: 0.8,
            dt: 0.003,
            steps: 1024,
            cue_position: Vec2::new(0.1, 0.5),
            cue_velocity: Vec2::new(0.3, 0.0),
            goal: Vec2::new(0.9, 0.75),
            target_ball: ball_count(layers) - 1,
            loss_exponent: 2.0,
        }
    }
}

impl BilliardsScenario {
    /// Total number of balls, cue included.
    pub fn ball_count(&self) -> usize {
        ball_count(self.layers)
    }

    /// Initial positions and velocities: cue first, then the rack rows
    /// left-to-right, racked around `(0.5, 0.5)`.
    pub fn initial_state(&self) -> (Vec<Vec2<f64>>, Vec<Vec2<f64>>) {
        let mut x = Vec::with_capacity(self.ball_count());
        let mut v = Vec::with_capacity(self.ball_count());
        x.push(self.cue_position);
        v.push(self.cue_velocity);
        for i in 0..self.layers {
            for j in 0..=i {
                x.push(Vec2::new(
                    i as f64 * 2.0 * self.radius + 0.5,
                    j as f64 * 2.0 * self.radius + 0.5 - i as f64 * self.radius * 0.7,
                ));
                v.push(Vec2::zero());
            }
        }
        (x, v)
    }
}
