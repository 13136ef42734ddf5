//! Mass-spring rollout and loss.

use crate::contact::{advance_projection, advance_toi};
use crate::controller::{centroid, controller_output};
use crate::force::accumulate_spring_impulses;
use crate::scenario::{ContactModel, SpringScenario};
use gradsim_math::{Scalar, Vec2};
use gradsim_model::{Controller, Trajectory};

/// Recorded rollout: per-step positions and actuation signals, indexed like
/// the robot topology.
#[derive(Debug, Clone)]
pub struct RolloutRecord<T> {
    pub positions: Vec<Vec<Vec2<T>>>,
    pub actuations: Vec<Vec<T>>,
}

/// One step: centroid → controller → spring forces → contact/integration.
pub fn step<T: Scalar>(
    scenario: &SpringScenario,
    t: usize,
    x: &[Vec2<T>],
    v: &[Vec2<T>],
    params: &Controller<T>,
) -> (Vec<Vec2<T>>, Vec<Vec2<T>>, Vec<T>) {
    let center = centroid(x);
    let act = controller_output(scenario, t, x, v, center, params);
    let v_inc = accumulate_spring_impulses(scenario, x, &act);
    let (next_x, next_v) = match scenario.contact {
        ContactModel::Projection => advance_projection(scenario, x, v, &v_inc),
        ContactModel::ContinuousToi => advance_toi(scenario, x, v, &v_inc),
    };
    (next_x, next_v, act)
}

/// Roll the robot forward over the scenario horizon, recording every step.
pub fn rollout<T: Scalar>(
    scenario: &SpringScenario,
    init_x: &[Vec2<T>],
    init_v: &[Vec2<T>],
    params: &Controller<T>,
) -> RolloutRecord<T> {
    let mut record = RolloutRecord {
        positions: Vec::with_capacity(scenario.steps),
        actuations: Vec::with_capacity(scenario.steps),
    };
    let mut x = init_x.to_vec();
    let mut v = init_v.to_vec();
    for t in 0..scenario.steps {
        let (nx, nv, act) = step(scenario, t, &x, &v, params);
        x = nx;
        v = nv;
        record.positions.push(x.clone());
        record.actuations.push(act);
    }
    record
}

/// Loss: negative final horizontal position of the head object, i.e. reward
/// forward displacement. The goal vector never appears here — it steers the
/// gait only through the controller's input features.
pub fn head_loss<T: Scalar>(scenario: &SpringScenario, final_positions: &[Vec2<T>]) -> T {
    -final_positions[scenario.head].x
}

/// Concrete rollout from the scenario's initial state, recorded as a
/// trajectory for the visualization boundary.
pub fn simulate(scenario: &SpringScenario, params: &Controller<f64>) -> Trajectory {
    let (x0, v0) = scenario.initial_state();
    let record = rollout(scenario, &x0, &v0, params);
    let mut trajectory = Trajectory::new();
    for (step_x, act) in record.positions.iter().zip(&record.actuations) {
        trajectory.push_step(step_x.iter().map(|p| p.to_array()).collect(), act.clone());
    }
    trajectory
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradsim_model::walker;

    fn short_scenario() -> SpringScenario {
        let mut scenario = SpringScenario::new(walker());
        scenario.steps = 50;
        scenario
    }

    fn controller(scenario: &SpringScenario) -> Controller<f64> {
        Controller::init(
            11,
            scenario.n_input(),
            scenario.n_hidden,
            scenario.n_springs(),
        )
    }

    #[test]
    fn rollout_records_every_step() {
        let scenario = short_scenario();
        let params = controller(&scenario);
        let (x0, v0) = scenario.initial_state();
        let record = rollout(&scenario, &x0, &v0, &params);
        assert_eq!(record.positions.len(), 50);
        assert_eq!(record.actuations.len(), 50);
        assert_eq!(record.positions[0].len(), scenario.n_objects());
        assert_eq!(record.actuations[0].len(), scenario.n_springs());
    }

    #[test]
    fn rollout_is_bit_deterministic() {
        let scenario = short_scenario();
        let params = controller(&scenario);
        let (x0, v0) = scenario.initial_state();
        let a = rollout(&scenario, &x0, &v0, &params);
        let b = rollout(&scenario, &x0, &v0, &params);
        assert_eq!(a.positions, b.positions);
        assert_eq!(a.actuations, b.actuations);
    }

    #[test]
    fn both_contact_models_keep_the_robot_finite_and_grounded() {
        for contact in [ContactModel::Projection, ContactModel::ContinuousToi] {
            let scenario = short_scenario().with_contact(contact);
            let params = controller(&scenario);
            let (x0, v0) = scenario.initial_state();
            let record = rollout(&scenario, &x0, &v0, &params);
            for step_x in &record.positions {
                for p in step_x {
                    assert!(p.x.is_finite() && p.y.is_finite());
                }
            }
        }
    }

    #[test]
    fn head_loss_rewards_forward_motion() {
        let scenario = short_scenario();
        let further = vec![Vec2::new(0.9, 0.1); scenario.n_objects()];
        let nearer = vec![Vec2::new(0.2, 0.1); scenario.n_objects()];
        assert!(head_loss(&scenario, &further) < head_loss(&scenario, &nearer));
    }

    #[test]
    fn trajectory_indexing_matches_topology() {
        let scenario = short_scenario();
        let params = controller(&scenario);
        let trajectory = simulate(&scenario, &params);
        assert_eq!(trajectory.len(), scenario.steps);
        assert_eq!(trajectory.positions[0].len(), scenario.n_objects());
        assert_eq!(trajectory.actuations[0].len(), scenario.n_springs());
    }
}
