//! Shape-checked evaluators built from a traced graph.
//!
//! Shapes (input count, output set, gradient subset) are fixed when the
//! evaluator is constructed; a call with mismatched input length is a
//! configuration error, never coerced.

use crate::error::{ExprError, Result};
use crate::graph::{ExprGraph, ExprId};

/// Forward evaluator: fixed-shape inputs in, declared outputs out.
///
/// Deterministic and pure; repeated calls with identical inputs produce
/// bit-identical outputs.
pub struct CompiledRollout {
    graph: ExprGraph,
    outputs: Vec<ExprId>,
}

impl CompiledRollout {
    pub fn new(graph: ExprGraph, outputs: Vec<ExprId>) -> Result<Self> {
        for &id in &outputs {
            graph.check_expr(id)?;
        }
        Ok(Self { graph, outputs })
    }

    pub fn n_inputs(&self) -> usize {
        self.graph.n_vars()
    }

    pub fn n_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Evaluate the declared outputs for one input vector.
    pub fn eval(&self, inputs: &[f64]) -> Result<Vec<f64>> {
        let mut values = Vec::new();
        self.graph.eval_into(inputs, &mut values)?;
        Ok(self
            .outputs
            .iter()
            .map(|id| values[id.0 as usize])
            .collect())
    }
}

/// Loss value and the gradient for the declared variable subset.
#[derive(Debug, Clone)]
pub struct LossAndGradient {
    pub loss: f64,
    pub gradient: Vec<f64>,
}

/// Gradient evaluator: one call returns the scalar loss and its reverse-mode
/// gradient (seed 1) with respect to the variables declared at build time.
#[derive(Debug)]
pub struct CompiledLoss {
    graph: ExprGraph,
    loss: ExprId,
    wrt: Vec<u32>,
}

impl CompiledLoss {
    /// `wrt` lists input-variable indices the gradient is taken against.
    pub fn new(graph: ExprGraph, loss: ExprId, wrt: Vec<u32>) -> Result<Self> {
        graph.check_expr(loss)?;
        for &var in &wrt {
            if var as usize >= graph.n_vars() {
                return Err(ExprError::UnknownVariable {
                    var,
                    n_vars: graph.n_vars(),
                });
            }
        }
        Ok(Self { graph, loss, wrt })
    }

    pub fn n_inputs(&self) -> usize {
        self.graph.n_vars()
    }

    pub fn n_gradients(&self) -> usize {
        self.wrt.len()
    }

    pub fn eval(&self, inputs: &[f64]) -> Result<LossAndGradient> {
        let mut values = Vec::new();
        self.graph.eval_into(inputs, &mut values)?;
        let mut adjoints = Vec::new();
        self.graph.backward_into(&values, self.loss, &mut adjoints);
        // Variables are the first `n_vars` nodes, so a variable's adjoint
        // lives at its own index.
        let gradient = self
            .wrt
            .iter()
            .map(|&var| adjoints[var as usize])
            .collect();
        Ok(LossAndGradient {
            loss: values[self.loss.0 as usize],
            gradient,
        })
    }
}
