//! Spring force accumulation.

use crate::scenario::SpringScenario;
use gradsim_math::{Scalar, Vec2};

/// Epsilon keeping a zero-length spring's direction finite.
const LENGTH_EPS: f64 = 1e-4;

/// Accumulate per-object velocity increments from every spring.
///
/// Each spring pulls its endpoints toward a target length of
/// `rest · (1 + act · actuation)`; a structural spring (actuation 0) ignores
/// the controller entirely. Equal and opposite increments keep momentum
/// balanced across the pair.
pub fn accumulate_spring_impulses<T: Scalar>(
    scenario: &SpringScenario,
    x: &[Vec2<T>],
    act: &[T],
) -> Vec<Vec2<T>> {
    let dt = scenario.dt;
    let mut v_inc = vec![Vec2::zero(); x.len()];
    for (spring, &signal) in scenario.robot.springs.iter().zip(act) {
        let (a, b) = (spring.object1, spring.object2);
        let dist = x[a] - x[b];
        let length = dist.norm() + T::constant(LENGTH_EPS);
        let target_length = T::constant(spring.rest_length)
            * (T::one() + signal * T::constant(spring.actuation));
        let impulse = dist.scale(
            T::constant(dt * spring.stiffness) * (length - target_length) / length,
        );
        v_inc[a] = v_inc[a] - impulse;
        v_inc[b] = v_inc[b] + impulse;
    }
    v_inc
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use gradsim_model::Robot;

    fn one_spring_scenario(actuation: f64) -> SpringScenario {
        let mut robot = Robot::new();
        robot.add_object(0.0, 0.5);
        robot.add_object(0.1, 0.5);
        robot.add_spring(0, 1, 100.0, actuation);
        SpringScenario::new(robot)
    }

    #[test]
    fn stretched_spring_pulls_endpoints_together() {
        let mut scenario = one_spring_scenario(0.0);
        scenario.robot.springs[0].rest_length = 0.05; // stretched at 0.1
        let (x, _) = scenario.initial_state();
        let v_inc = accumulate_spring_impulses(&scenario, &x, &[0.0]);

        assert!(v_inc[0].x > 0.0, "left endpoint should be pulled right");
        assert!(v_inc[1].x < 0.0, "right endpoint should be pulled left");
        assert_relative_eq!(v_inc[0].x, -v_inc[1].x, epsilon = 1e-12);
        assert_relative_eq!(v_inc[0].y, 0.0);
    }

    #[test]
    fn spring_at_rest_length_is_nearly_force_free() {
        let scenario = one_spring_scenario(0.0);
        let (x, _) = scenario.initial_state();
        let v_inc = accumulate_spring_impulses(&scenario, &x, &[0.0]);
        // Only the length epsilon perturbs the balance.
        assert!(v_inc[0].norm() < 1e-3);
    }

    #[test]
    fn structural_spring_ignores_actuation() {
        let scenario = one_spring_scenario(0.0);
        let (x, _) = scenario.initial_state();
        let idle = accumulate_spring_impulses(&scenario, &x, &[0.0]);
        let driven = accumulate_spring_impulses(&scenario, &x, &[1.0]);
        assert_eq!(idle, driven);
    }

    #[test]
    fn actuated_spring_contracts_on_positive_signal() {
        let scenario = one_spring_scenario(0.3);
        let (x, _) = scenario.initial_state();
        // act = 1 lengthens the target, so the spring pulls inward less /
        // pushes outward; act = -1 shortens the target and pulls inward.
        let contract = accumulate_spring_impulses(&scenario, &x, &[-1.0]);
        assert!(contract[0].x > 0.0);
        assert!(contract[1].x < 0.0);
        let expand = accumulate_spring_impulses(&scenario, &x, &[1.0]);
        assert!(expand[0].x < 0.0);
        assert!(expand[1].x > 0.0);
    }
}
