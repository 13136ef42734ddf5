//! Tracing the mass-spring rollout into compiled evaluators.
//!
//! Input variables are the four controller tensors in the flat layout of
//! `Controller::to_flat` (`[weights1 rows, bias1, weights2 rows, bias2]`).
//! The initial state and goal are scenario constants baked at trace time —
//! they never vary across training iterations.

use crate::rollout::{head_loss, rollout};
use crate::scenario::SpringScenario;
use crate::Result;
use gradsim_expr::{trace, CompiledLoss, CompiledRollout, ExprId};
use gradsim_math::Vec2;
use gradsim_model::{Controller, Trajectory};

fn check(scenario: &SpringScenario) {
    assert!(scenario.steps > 0, "rollout horizon must be positive");
    assert!(
        scenario.head < scenario.n_objects(),
        "head object {} out of range ({} objects)",
        scenario.head,
        scenario.n_objects()
    );
}

fn lift_initial_state(scenario: &SpringScenario) -> (Vec<Vec2<ExprId>>, Vec<Vec2<ExprId>>) {
    let (x0, v0) = scenario.initial_state();
    let x = x0.iter().map(|p| Vec2::constant(p.x, p.y)).collect();
    let v = v0.iter().map(|u| Vec2::constant(u.x, u.y)).collect();
    (x, v)
}

fn n_params(scenario: &SpringScenario) -> usize {
    Controller::<f64>::n_params_for(scenario.n_input(), scenario.n_hidden, scenario.n_springs())
}

/// Forward evaluator: per-step positions, then per-step actuations, then the
/// loss.
pub fn compile_rollout(scenario: &SpringScenario) -> Result<CompiledRollout> {
    check(scenario);
    let (n, ns) = (scenario.n_objects(), scenario.n_springs());
    let (graph, outputs) = trace(n_params(scenario), |vars| {
        let params = Controller::from_flat_slice(
            vars,
            scenario.n_input(),
            scenario.n_hidden,
            ns,
        );
        let (x0, v0) = lift_initial_state(scenario);
        let record = rollout(scenario, &x0, &v0, &params);
        let mut outs = Vec::with_capacity(scenario.steps * (n * 2 + ns) + 1);
        for step_x in &record.positions {
            for p in step_x {
                outs.push(p.x);
                outs.push(p.y);
            }
        }
        for act in &record.actuations {
            outs.extend_from_slice(act);
        }
        outs.push(head_loss(
            scenario,
            record.positions.last().expect("positive horizon"),
        ));
        outs
    });
    Ok(CompiledRollout::new(graph, outputs)?)
}

/// Gradient evaluator: loss plus d(loss)/d(all controller tensors).
pub fn compile_loss(scenario: &SpringScenario) -> Result<CompiledLoss> {
    check(scenario);
    let total = n_params(scenario);
    let (graph, loss) = trace(total, |vars| {
        let params = Controller::from_flat_slice(
            vars,
            scenario.n_input(),
            scenario.n_hidden,
            scenario.n_springs(),
        );
        let (x0, v0) = lift_initial_state(scenario);
        let record = rollout(scenario, &x0, &v0, &params);
        head_loss(scenario, record.positions.last().expect("positive horizon"))
    });
    let wrt = (0..total as u32).collect();
    Ok(CompiledLoss::new(graph, loss, wrt)?)
}

/// Split a forward evaluation back into a trajectory and the loss.
pub fn decode_rollout(scenario: &SpringScenario, outputs: &[f64]) -> (Trajectory, f64) {
    let (n, ns) = (scenario.n_objects(), scenario.n_springs());
    assert_eq!(outputs.len(), scenario.steps * (n * 2 + ns) + 1);
    let acts_base = scenario.steps * n * 2;
    let mut trajectory = Trajectory::new();
    for step in 0..scenario.steps {
        let base = step * n * 2;
        let positions = (0..n)
            .map(|i| [outputs[base + 2 * i], outputs[base + 2 * i + 1]])
            .collect();
        let actuations = outputs[acts_base + step * ns..acts_base + (step + 1) * ns].to_vec();
        trajectory.push_step(positions, actuations);
    }
    (trajectory, outputs[outputs.len() - 1])
}
