//! Ground contact and integration, in two select-based variants.

use crate::scenario::SpringScenario;
use gradsim_math::{Scalar, Vec2};

/// Downward-speed floor below which the TOI variant treats an object as
/// resting rather than impacting.
const TOI_SPEED_FLOOR: f64 = -1e-4;

fn damped_velocity<T: Scalar>(
    scenario: &SpringScenario,
    v: Vec2<T>,
    v_inc: Vec2<T>,
) -> Vec2<T> {
    // exp(-dt·damping) and dt·gravity are scenario constants; fold them.
    let decay = T::constant((-scenario.dt * scenario.damping).exp());
    v.scale(decay) + Vec2::constant(0.0, scenario.dt * scenario.gravity) + v_inc
}

/// Projection variant: damping + gravity + spring increments, then zero the
/// velocity for this step if the object is below ground and still moving
/// down, then integrate the position.
pub fn advance_projection<T: Scalar>(
    scenario: &SpringScenario,
    x: &[Vec2<T>],
    v: &[Vec2<T>],
    v_inc: &[Vec2<T>],
) -> (Vec<Vec2<T>>, Vec<Vec2<T>>) {
    let dt = T::constant(scenario.dt);
    let ground = T::constant(scenario.ground_height);
    let mut next_x = Vec::with_capacity(x.len());
    let mut next_v = Vec::with_capacity(x.len());
    for i in 0..x.len() {
        let old_v = damped_velocity(scenario, v[i], v_inc[i]);
        let depth = x[i].y - ground;
        let grounded = T::and(depth.lt(T::zero()), old_v.y.lt(T::zero()));
        let new_v = Vec2::select(grounded, Vec2::zero(), old_v);
        next_x.push(x[i] + new_v.scale(dt));
        next_v.push(new_v);
    }
    (next_x, next_v)
}

/// Continuous time-of-impact variant: if the predicted position would cross
/// the ground while moving down, zero the velocity at the exact sub-step
/// contact instant and integrate the remainder at rest, landing exactly on
/// the ground plane.
pub fn advance_toi<T: Scalar>(
    scenario: &SpringScenario,
    x: &[Vec2<T>],
    v: &[Vec2<T>],
    v_inc: &[Vec2<T>],
) -> (Vec<Vec2<T>>, Vec<Vec2<T>>) {
    let dt = T::constant(scenario.dt);
    let ground = T::constant(scenario.ground_height);
    let mut next_x = Vec::with_capacity(x.len());
    let mut next_v = Vec::with_capacity(x.len());
    for i in 0..x.len() {
        let old_v = damped_velocity(scenario, v[i], v_inc[i]);
        let predicted = x[i] + old_v.scale(dt);
        let impacting = T::and(
            predicted.y.lt(ground),
            old_v.y.lt(T::constant(TOI_SPEED_FLOOR)),
        );
        let toi = T::select(
            impacting,
            -(x[i].y - ground) / old_v.y,
            T::zero(),
        );
        let new_v = Vec2::select(impacting, Vec2::zero(), old_v);
        next_x.push(x[i] + old_v.scale(toi) + new_v.scale(dt - toi));
        next_v.push(new_v);
    }
    (next_x, next_v)
}
