//! Cue optimization by gradient descent.

use crate::compile::{compile_loss, pack_inputs};
use crate::scenario::BilliardsScenario;
use crate::Result;
use gradsim_math::{DVec, Vec2};
use gradsim_opt::{minimize, GradientDescentConfig, OptimizationResult};

/// Optimized cue state and the run that produced it.
#[derive(Debug, Clone)]
pub struct CueSolution {
    pub position: Vec2<f64>,
    pub velocity: Vec2<f64>,
    pub result: OptimizationResult,
}

/// Default descent configuration for the billiards problem.
pub fn descent_config() -> GradientDescentConfig {
    GradientDescentConfig {
        iterations: 200,
        learning_rate: 0.01,
        gradient_clip: None,
        print_every: 10,
    }
}

/// Descend the loss with respect to the cue's initial position and velocity.
///
/// All other balls stay fixed at the scenario rack. The compiled gradient is
/// built once and reused for every iteration.
pub fn optimize_cue(
    scenario: &BilliardsScenario,
    config: &GradientDescentConfig,
) -> Result<CueSolution> {
    let compiled = compile_loss(scenario)?;
    let n = scenario.ball_count();
    let (x0, v0) = scenario.initial_state();
    let mut inputs = pack_inputs(scenario, &x0, &v0);

    let mut params = DVec::from_vec(vec![
        scenario.cue_position.x,
        scenario.cue_position.y,
        scenario.cue_velocity.x,
        scenario.cue_velocity.y,
    ]);

    let result = minimize(config, &mut params, |p| {
        inputs[0] = p[0];
        inputs[1] = p[1];
        inputs[2 * n] = p[2];
        inputs[2 * n + 1] = p[3];
        let eval = compiled
            .eval(inputs.as_slice())
            .map_err(crate::BilliardsError::from)?;
        Ok::<_, crate::BilliardsError>((eval.loss, DVec::from_vec(eval.gradient)))
    })?;

    Ok(CueSolution {
        position: Vec2::new(params[0], params[1]),
        velocity: Vec2::new(params[2], params[3]),
        result,
    })
}
