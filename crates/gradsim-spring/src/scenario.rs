//! Mass-spring scenario configuration.

use gradsim_math::Vec2;
use gradsim_model::Robot;

/// Ground contact policy, selected per scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactModel {
    /// Zero the velocity for a step while below ground and moving down.
    Projection,
    /// Resolve the exact sub-step instant of ground contact.
    ContinuousToi,
}

/// Static description of a locomotion problem.
///
/// Read-only to the simulation after setup; the robot topology fixes the
/// object and spring indexing for the whole scenario lifetime.
#[derive(Debug, Clone)]
pub struct SpringScenario {
    pub robot: Robot,
    pub contact: ContactModel,
    /// Height of the ground plane.
    pub ground_height: f64,
    /// Vertical gravity (negative is down).
    pub gravity: f64,
    /// Velocity damping rate; each step scales velocity by `exp(-dt·damping)`.
    pub damping: f64,
    pub dt: f64,
    /// Rollout horizon.
    pub steps: usize,
    /// Oscillator frequency feeding the controller's sine features.
    pub spring_omega: f64,
    /// Number of sine features.
    pub n_sin_waves: usize,
    /// Hidden layer width.
    pub n_hidden: usize,
    /// Target point; reaches behavior only through the controller inputs.
    pub goal: Vec2<f64>,
    /// Object whose forward progress the loss rewards.
    pub head: usize,
}

impl SpringScenario {
    pub fn new(robot: Robot) -> Self {
        Self {
            robot,
            contact: ContactModel::ContinuousToi,
            ground_height: 0.1,
            gravity: -4.8,
            damping: 15.0,
            dt: 0.004,
            steps: 2048 / 3 * 2,
            spring_omega: 10.0,
            n_sin_waves: 10,
            n_hidden: 32,
            goal: Vec2::new(0.9, 0.2),
            head: 0,
        }
    }

    pub fn with_contact(mut self, contact: ContactModel) -> Self {
        self.contact = contact;
        self
    }

    pub fn n_objects(&self) -> usize {
        self.robot.n_objects()
    }

    pub fn n_springs(&self) -> usize {
        self.robot.n_springs()
    }

    /// Controller input width: sine features, 4 state features per object,
    /// and the goal offset.
    pub fn n_input(&self) -> usize {
        self.n_sin_waves + 4 * self.n_objects() + 2
    }

    /// Objects at their authored positions, at rest.
    pub fn initial_state(&self) -> (Vec<Vec2<f64>>, Vec<Vec2<f64>>) {
        let x = self.robot.objects.clone();
        let v = vec![Vec2::zero(); x.len()];
        (x, v)
    }
}
