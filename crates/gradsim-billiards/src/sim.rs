//! Billiards integrator, rollout, and loss.

use crate::collision::collide_pair;
use crate::scenario::BilliardsScenario;
use gradsim_math::{ipow, MathError, Scalar, Vec2};
use gradsim_model::Trajectory;

/// Advance the ensemble by one timestep.
///
/// All pair contributions are computed from the start-of-step state, then
/// summed per ball; the impulse updates the velocity first and the position
/// update uses the updated velocity plus the accumulated TOI correction.
/// That ordering is load-bearing for both realism and gradient magnitude.
pub fn step<T: Scalar>(
    scenario: &BilliardsScenario,
    x: &[Vec2<T>],
    v: &[Vec2<T>],
) -> (Vec<Vec2<T>>, Vec<Vec2<T>>) {
    let n = x.len();
    let mut shift = vec![Vec2::zero(); n];
    let mut impulse = vec![Vec2::zero(); n];
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let c = collide_pair(scenario, x[i], x[j], v[i], v[j]);
            shift[i] = shift[i] + c.shift;
            impulse[i] = impulse[i] + c.impulse;
        }
    }

    let dt = T::constant(scenario.dt);
    let mut next_x = Vec::with_capacity(n);
    let mut next_v = Vec::with_capacity(n);
    for i in 0..n {
        let vi = v[i] + impulse[i];
        next_x.push(x[i] + shift[i] + vi.scale(dt));
        next_v.push(vi);
    }
    (next_x, next_v)
}

/// Roll the ensemble forward over the scenario horizon, recording every
/// step's positions.
///
/// Pure: two calls from identical initial states produce bit-identical
/// results.
pub fn rollout<T: Scalar>(
    scenario: &BilliardsScenario,
    init_x: &[Vec2<T>],
    init_v: &[Vec2<T>],
) -> Vec<Vec<Vec2<T>>> {
    let mut positions = Vec::with_capacity(scenario.steps);
    let mut x = init_x.to_vec();
    let mut v = init_v.to_vec();
    for _ in 0..scenario.steps {
        let (nx, nv) = step(scenario, &x, &v);
        x = nx;
        v = nv;
        positions.push(x.clone());
    }
    positions
}

/// Squared-distance loss between the target ball's final position and the
/// goal, realized through the integer-power routine so a fractional
/// configured exponent fails loudly.
pub fn target_loss<T: Scalar>(
    scenario: &BilliardsScenario,
    final_positions: &[Vec2<T>],
    goal: Vec2<T>,
) -> Result<T, MathError> {
    let diff = final_positions[scenario.target_ball] - goal;
    Ok(ipow(diff.x, scenario.loss_exponent)? + ipow(diff.y, scenario.loss_exponent)?)
}

/// Concrete rollout from the scenario's initial state, recorded as a
/// trajectory for the visualization boundary.
pub fn simulate(scenario: &BilliardsScenario) -> Trajectory {
    let (x0, v0) = scenario.initial_state();
    let mut trajectory = Trajectory::new();
    for step_x in rollout(scenario, &x0, &v0) {
        trajectory.push_step(step_x.iter().map(|p| p.to_array()).collect(), Vec::new());
    }
    trajectory
}
