//! Gradient-descent driver for gradsim scenarios.
//!
//! The loop is deliberately plain: a fixed iteration count (no convergence
//! check — each scenario's horizon and learning rate are tuned together),
//! optional clip-to-norm, and component-wise descent. Gradients come from a
//! caller-supplied evaluator, typically a compiled loss from `gradsim-expr`.

use gradsim_math::DVec;

/// Epsilon added to the gradient norm before clipping, so a zero gradient
/// never divides by zero.
pub const CLIP_EPSILON: f64 = 1e-6;

/// Configuration for the descent loop.
#[derive(Debug, Clone)]
pub struct GradientDescentConfig {
    /// Number of iterations; the loop always runs exactly this many.
    pub iterations: usize,
    /// Learning rate.
    pub learning_rate: f64,
    /// If set, rescale each gradient so its Euclidean norm does not exceed
    /// this value.
    pub gradient_clip: Option<f64>,
    /// Print progress every N iterations (0 disables printing).
    pub print_every: usize,
}

impl Default for GradientDescentConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            learning_rate: 0.01,
            gradient_clip: None,
            print_every: 10,
        }
    }
}

/// Result of an optimization run.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Loss at the last evaluated iteration.
    pub final_loss: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Loss at every iteration, in order.
    pub loss_history: Vec<f64>,
}

/// Rescale `gradient` so its norm does not exceed `max_norm`.
///
/// Gradients already below the threshold are left untouched. Returns the
/// unclipped norm.
pub fn clip_to_norm(gradient: &mut DVec, max_norm: f64) -> f64 {
    let norm = gradient.norm();
    let scale = (max_norm / (norm + CLIP_EPSILON)).min(1.0);
    if scale < 1.0 {
        *gradient *= scale;
    }
    norm
}

/// Run fixed-iteration gradient descent on `params`.
///
/// `eval` returns the loss and its gradient with respect to `params` in one
/// call; its error type propagates out unchanged. The loop runs to
/// completion once started — there is no cancellation channel.
pub fn minimize<E>(
    config: &GradientDescentConfig,
    params: &mut DVec,
    mut eval: impl FnMut(&DVec) -> Result<(f64, DVec), E>,
) -> Result<OptimizationResult, E> {
    let mut loss_history = Vec::with_capacity(config.iterations);
    let mut final_loss = f64::INFINITY;

    for iter in 0..config.iterations {
        let (loss, mut gradient) = eval(params)?;
        loss_history.push(loss);
        final_loss = loss;

        if config.print_every != 0 && iter % config.print_every == 0 {
            println!("Iteration {}: loss = {:.6e}", iter, loss);
        }

        if let Some(max_norm) = config.gradient_clip {
            clip_to_norm(&mut gradient, max_norm);
        }
        params.axpy(-config.learning_rate, &gradient, 1.0);
    }

    Ok(OptimizationResult {
        final_loss,
        iterations: config.iterations,
        loss_history,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::convert::Infallible;

    #[test]
    fn minimizes_a_quadratic_bowl() {
        // loss = |p - target|²; gradient = 2 (p - target).
        let target = DVec::from_vec(vec![1.0, -2.0]);
        let config = GradientDescentConfig {
            iterations: 200,
            learning_rate: 0.1,
            gradient_clip: None,
            print_every: 0,
        };
        let mut params = DVec::zeros(2);
        let result = minimize(&config, &mut params, |p| {
            let diff = p - &target;
            Ok::<_, Infallible>((diff.norm_squared(), 2.0 * diff))
        })
        .unwrap();

        assert_eq!(result.iterations, 200);
        assert_eq!(result.loss_history.len(), 200);
        assert!(result.final_loss < 1e-8);
        assert_relative_eq!(params[0], 1.0, epsilon = 1e-4);
        assert_relative_eq!(params[1], -2.0, epsilon = 1e-4);
    }

    #[test]
    fn runs_exactly_the_configured_iterations() {
        // No convergence check: a flat loss still runs the full count.
        let config = GradientDescentConfig {
            iterations: 17,
            learning_rate: 1.0,
            gradient_clip: None,
            print_every: 0,
        };
        let mut calls = 0;
        let mut params = DVec::zeros(1);
        minimize(&config, &mut params, |_| {
            calls += 1;
            Ok::<_, Infallible>((0.0, DVec::zeros(1)))
        })
        .unwrap();
        assert_eq!(calls, 17);
    }

    #[test]
    fn clip_rescales_large_gradients_to_the_threshold() {
        let mut gradient = DVec::from_vec(vec![3.0, 4.0]); // norm 5
        let unclipped = clip_to_norm(&mut gradient, 1.0);
        assert_relative_eq!(unclipped, 5.0);
        assert_relative_eq!(gradient.norm(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn clip_leaves_small_gradients_unscaled() {
        let mut gradient = DVec::from_vec(vec![0.3, 0.4]); // norm 0.5
        clip_to_norm(&mut gradient, 1.0);
        assert_eq!(gradient, DVec::from_vec(vec![0.3, 0.4]));
    }

    #[test]
    fn clip_survives_a_zero_gradient() {
        let mut gradient = DVec::zeros(3);
        let norm = clip_to_norm(&mut gradient, 1.0);
        assert_eq!(norm, 0.0);
        assert!(gradient.iter().all(|g| g.is_finite()));
    }

    #[test]
    fn errors_from_the_evaluator_propagate() {
        let config = GradientDescentConfig::default();
        let mut params = DVec::zeros(1);
        let result = minimize(&config, &mut params, |_| Err::<(f64, DVec), _>("boom"));
        assert_eq!(result.unwrap_err(), "boom");
    }
}
