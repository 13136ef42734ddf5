//! Tracing the billiards rollout into compiled evaluators.
//!
//! Input variable layout (shapes fixed at build time):
//! `[x0.x, x0.y, …, x(n-1).y, v0.x, …, v(n-1).y, goal.x, goal.y]`.
//! One compiled object serves any initial rack and goal of the same shape;
//! the gradient evaluator declares the four cue slots.

use crate::scenario::BilliardsScenario;
use crate::sim::{rollout, target_loss};
use crate::Result;
use gradsim_expr::{trace, CompiledLoss, CompiledRollout, ExprId};
use gradsim_math::Vec2;
use gradsim_model::Trajectory;

fn unpack(vars: &[ExprId], n: usize) -> (Vec<Vec2<ExprId>>, Vec<Vec2<ExprId>>, Vec2<ExprId>) {
    let x = (0..n).map(|i| Vec2::new(vars[2 * i], vars[2 * i + 1])).collect();
    let v = (0..n)
        .map(|i| Vec2::new(vars[2 * n + 2 * i], vars[2 * n + 2 * i + 1]))
        .collect();
    let goal = Vec2::new(vars[4 * n], vars[4 * n + 1]);
    (x, v, goal)
}

fn check(scenario: &BilliardsScenario) {
    assert!(scenario.steps > 0, "rollout horizon must be positive");
    assert!(
        scenario.target_ball < scenario.ball_count(),
        "target ball {} out of range ({} balls)",
        scenario.target_ball,
        scenario.ball_count()
    );
}

/// Pack concrete initial state and the scenario goal into the input layout.
pub fn pack_inputs(
    scenario: &BilliardsScenario,
    x: &[Vec2<f64>],
    v: &[Vec2<f64>],
) -> Vec<f64> {
    let mut inputs = Vec::with_capacity(4 * x.len() + 2);
    for p in x {
        inputs.extend_from_slice(&[p.x, p.y]);
    }
    for u in v {
        inputs.extend_from_slice(&[u.x, u.y]);
    }
    inputs.extend_from_slice(&[scenario.goal.x, scenario.goal.y]);
    inputs
}

/// Forward evaluator: outputs every step's positions followed by the loss.
pub fn compile_rollout(scenario: &BilliardsScenario) -> Result<CompiledRollout> {
    check(scenario);
    let n = scenario.ball_count();
    let (graph, outputs) = trace(4 * n + 2, |vars| {
        let (x, v, goal) = unpack(vars, n);
        let positions = rollout(scenario, &x, &v);
        let mut outs = Vec::with_capacity(scenario.steps * n * 2 + 1);
        for step_x in &positions {
            for p in step_x {
                outs.push(p.x);
                outs.push(p.y);
            }
        }
        let loss = target_loss(scenario, positions.last().expect("positive horizon"), goal)?;
        outs.push(loss);
        Ok::<_, gradsim_math::MathError>(outs)
    });
    Ok(CompiledRollout::new(graph, outputs?)?)
}

/// Gradient evaluator: loss plus d(loss)/d(cue position, cue velocity).
pub fn compile_loss(scenario: &BilliardsScenario) -> Result<CompiledLoss> {
    check(scenario);
    let n = scenario.ball_count();
    let (graph, loss) = trace(4 * n + 2, |vars| {
        let (x, v, goal) = unpack(vars, n);
        let positions = rollout(scenario, &x, &v);
        target_loss(scenario, positions.last().expect("positive horizon"), goal)
    });
    let cue_slots = vec![0, 1, 2 * n as u32, 2 * n as u32 + 1];
    Ok(CompiledLoss::new(graph, loss?, cue_slots)?)
}

/// Split a forward evaluation back into a trajectory and the loss.
pub fn decode_rollout(scenario: &BilliardsScenario, outputs: &[f64]) -> (Trajectory, f64) {
    let n = scenario.ball_count();
    assert_eq!(outputs.len(), scenario.steps * n * 2 + 1);
    let mut trajectory = Trajectory::new();
    for step in 0..scenario.steps {
        let base = step * n * 2;
        let positions = (0..n)
            .map(|i| [outputs[base + 2 * i], outputs[base + 2 * i + 1]])
            .collect();
        trajectory.push_step(positions, Vec::new());
    }
    (trajectory, outputs[outputs.len() - 1])
}
