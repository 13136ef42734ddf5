//! Per-step controller network evaluation.
//!
//! Stateless across steps: the actuation vector is recomputed each step from
//! sinusoidal time-phase features, the objects' offsets from the ensemble
//! centroid, their velocities, and the centroid's offset from the goal.

use crate::scenario::SpringScenario;
use gradsim_math::{Scalar, Vec2};
use gradsim_model::Controller;

/// Weight applied to the per-object state features.
const STATE_FEATURE_SCALE: f64 = 0.05;

/// Arithmetic mean of all object positions, recomputed every step.
pub fn centroid<T: Scalar>(x: &[Vec2<T>]) -> Vec2<T> {
    let mut sum = Vec2::zero();
    for &p in x {
        sum = sum + p;
    }
    sum.scale(T::one() / T::constant(x.len() as f64))
}

/// Evaluate both layers for step `t`, yielding one actuation per spring in
/// `[-1, 1]`.
pub fn controller_output<T: Scalar>(
    scenario: &SpringScenario,
    t: usize,
    x: &[Vec2<T>],
    v: &[Vec2<T>],
    center: Vec2<T>,
    params: &Controller<T>,
) -> Vec<T> {
    let n_objects = scenario.n_objects();
    let n_sin = scenario.n_sin_waves;
    let feature_scale = T::constant(STATE_FEATURE_SCALE);

    // Time-phase features are pure scenario constants for a given step.
    let phases: Vec<f64> = (0..n_sin)
        .map(|j| {
            (t as f64 * scenario.spring_omega * scenario.dt
                + 2.0 * std::f64::consts::PI * j as f64 / n_sin as f64)
                .sin()
        })
        .collect();

    let hidden: Vec<T> = (0..scenario.n_hidden)
        .map(|i| {
            let weights = &params.weights1[i];
            let mut acc = T::zero();
            for (j, &phase) in phases.iter().enumerate() {
                acc = acc + weights[j] * T::constant(phase);
            }
            for j in 0..n_objects {
                let base = n_sin + 4 * j;
                let offset = x[j] - center;
                acc = acc + weights[base] * offset.x * feature_scale;
                acc = acc + weights[base + 1] * offset.y * feature_scale;
                acc = acc + weights[base + 2] * v[j].x * feature_scale;
                acc = acc + weights[base + 3] * v[j].y * feature_scale;
            }
            let goal_base = n_sin + 4 * n_objects;
            acc = acc + weights[goal_base] * (T::constant(scenario.goal.x) - center.x);
            acc = acc + weights[goal_base + 1] * (T::constant(scenario.goal.y) - center.y);
            (acc + params.bias1[i]).tanh()
        })
        .collect();

    (0..scenario.n_springs())
        .map(|i| {
            let weights = &params.weights2[i];
            let mut acc = T::zero();
            for (j, &h) in hidden.iter().enumerate() {
                acc = acc + weights[j] * h;
            }
            (acc + params.bias2[i]).tanh()
        })
        .collect()
}
