//! Controller training by clipped gradient descent.

use crate::compile::compile_loss;
use crate::scenario::SpringScenario;
use crate::Result;
use gradsim_math::DVec;
use gradsim_model::Controller;
use gradsim_opt::{minimize, GradientDescentConfig, OptimizationResult};

/// Default training configuration for the locomotion problem: a large
/// learning rate tamed by clip-to-norm.
pub fn training_config() -> GradientDescentConfig {
    GradientDescentConfig {
        iterations: 100,
        learning_rate: 25.0,
        gradient_clip: Some(0.2),
        print_every: 1,
    }
}

/// Descend the loss with respect to all four controller tensors, in place.
///
/// The compiled gradient is built once; every iteration evaluates loss and
/// gradient in one call, clips the combined gradient norm, and updates the
/// flat parameter vector.
pub fn train(
    scenario: &SpringScenario,
    controller: &mut Controller<f64>,
    config: &GradientDescentConfig,
) -> Result<OptimizationResult> {
    let compiled = compile_loss(scenario)?;
    let mut params = controller.to_flat();
    let result = minimize(config, &mut params, |p| {
        let eval = compiled
            .eval(p.as_slice())
            .map_err(crate::SpringError::from)?;
        Ok::<_, crate::SpringError>((eval.loss, DVec::from_vec(eval.gradient)))
    })?;
    controller.assign_flat(&params);
    Ok(result)
}
