//! Controller parameters for the mass-spring robot.
//!
//! Two weight matrices and two bias vectors, generic over the scalar type so
//! the same layout serves concrete `f64` parameters and traced variables.

use gradsim_math::DVec;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Two-layer controller tensors.
///
/// Layer 1 maps the per-step input features to `n_hidden` activations;
/// layer 2 maps activations to one actuation signal per spring.
#[derive(Debug, Clone)]
pub struct Controller<T = f64> {
    /// `n_hidden × n_input`.
    pub weights1: Vec<Vec<T>>,
    /// `n_hidden`.
    pub bias1: Vec<T>,
    /// `n_springs × n_hidden`.
    pub weights2: Vec<Vec<T>>,
    /// `n_springs`.
    pub bias2: Vec<T>,
}

impl<T: Copy> Controller<T> {
    /// Total parameter count for the given layer sizes.
    pub fn n_params_for(n_input: usize, n_hidden: usize, n_springs: usize) -> usize {
        n_hidden * n_input + n_hidden + n_springs * n_hidden + n_springs
    }

    pub fn n_params(&self) -> usize {
        let n_hidden = self.bias1.len();
        let n_springs = self.bias2.len();
        let n_input = self.weights1.first().map_or(0, Vec::len);
        Self::n_params_for(n_input, n_hidden, n_springs)
    }

    /// Rebuild tensors from the flat layout `[weights1 rows, bias1,
    /// weights2 rows, bias2]`. This is the layout contract shared with
    /// [`Controller::to_flat`] and the traced variable ordering.
    pub fn from_flat_slice(flat: &[T], n_input: usize, n_hidden: usize, n_springs: usize) -> Self {
        assert_eq!(
            flat.len(),
            Self::n_params_for(n_input, n_hidden, n_springs),
            "flat parameter slice has the wrong length"
        );
        let mut it = flat.iter().copied();
        let mut take = |n: usize| -> Vec<T> { it.by_ref().take(n).collect() };

        let weights1 = (0..n_hidden).map(|_| take(n_input)).collect();
        let bias1 = take(n_hidden);
        let weights2 = (0..n_springs).map(|_| take(n_hidden)).collect();
        let bias2 = take(n_springs);
        Self {
            weights1,
            bias1,
            weights2,
            bias2,
        }
    }
}

impl Controller<f64> {
    /// Seeded Gaussian initialization.
    ///
    /// Weights are drawn from `N(0, 1)` and scaled by
    /// `sqrt(2 / (fan_in + fan_out))` times a per-layer gain (2 for the
    /// hidden layer, 3 for the actuation layer); biases start at zero.
    pub fn init(seed: u64, n_input: usize, n_hidden: usize, n_springs: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let scale1 = (2.0 / (n_hidden + n_input) as f64).sqrt() * 2.0;
        let scale2 = (2.0 / (n_hidden + n_springs) as f64).sqrt() * 3.0;

        let weights1 = (0..n_hidden)
            .map(|_| (0..n_input).map(|_| randn(&mut rng) * scale1).collect())
            .collect();
        let weights2 = (0..n_springs)
            .map(|_| (0..n_hidden).map(|_| randn(&mut rng) * scale2).collect())
            .collect();

        Self {
            weights1,
            bias1: vec![0.0; n_hidden],
            weights2,
            bias2: vec![0.0; n_springs],
        }
    }

    /// Flatten into the shared parameter layout.
    pub fn to_flat(&self) -> DVec {
        let mut flat = Vec::with_capacity(self.n_params());
        for row in &self.weights1 {
            flat.extend_from_slice(row);
        }
        flat.extend_from_slice(&self.bias1);
        for row in &self.weights2 {
            flat.extend_from_slice(row);
        }
        flat.extend_from_slice(&self.bias2);
        DVec::from_vec(flat)
    }

    /// Overwrite the tensors from the flat layout.
    pub fn assign_flat(&mut self, flat: &DVec) {
        let n_hidden = self.bias1.len();
        let n_springs = self.bias2.len();
        let n_input = self.weights1.first().map_or(0, Vec::len);
        *self = Self::from_flat_slice(flat.as_slice(), n_input, n_hidden, n_springs);
    }
}

/// Standard normal sample via the Box–Muller transform.
fn randn(rng: &mut StdRng) -> f64 {
    let mut u = 0.0;
    let mut v = 0.0;
    while u == 0.0 {
        u = rng.gen::<f64>();
    }
    while v == 0.0 {
        v = rng.gen::<f64>();
    }
    (-2.0 * u.ln()).sqrt() * (2.0 * std::f64::consts::PI * v).cos()
}
