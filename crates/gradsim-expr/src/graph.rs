//! Expression graph, thread-local tracing, and the two evaluation sweeps.

use crate::error::{ExprError, Result};
use crate::primitive::{self, PRIMITIVES};
use gradsim_math::Scalar;
use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Handle to a node in an expression graph.
///
/// `ExprId` implements [`Scalar`], so simulation code generic over `Scalar`
/// records itself into the active graph simply by running. Arithmetic on an
/// `ExprId` outside [`trace`] is a programming error and panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExprId(pub(crate) u32);

#[derive(Debug, Clone, Copy)]
pub(crate) enum Node {
    Var(u32),
    Const(f64),
    Bin(BinOp, ExprId, ExprId),
    Prim(u16, ExprId),
    Less(ExprId, ExprId),
    And(ExprId, ExprId),
    Select(ExprId, ExprId, ExprId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// A pure computation recorded as a flat, topologically-ordered node list.
#[derive(Debug)]
pub struct ExprGraph {
    nodes: Vec<Node>,
    n_vars: usize,
    // Constants are interned by bit pattern; long rollouts re-lift the same
    // dt/radius/one-half constants millions of times otherwise.
    const_cache: HashMap<u64, ExprId>,
}

impl ExprGraph {
    fn with_vars(n_vars: usize) -> Self {
        let mut graph = Self {
            nodes: Vec::new(),
            n_vars,
            const_cache: HashMap::new(),
        };
        for i in 0..n_vars {
            graph.push(Node::Var(i as u32));
        }
        graph
    }

    fn push(&mut self, node: Node) -> ExprId {
        let id = u32::try_from(self.nodes.len()).expect("expression graph exceeds u32 nodes");
        self.nodes.push(node);
        ExprId(id)
    }

    fn push_const(&mut self, value: f64) -> ExprId {
        if let Some(&id) = self.const_cache.get(&value.to_bits()) {
            return id;
        }
        let id = self.push(Node::Const(value));
        self.const_cache.insert(value.to_bits(), id);
        id
    }

    /// Number of nodes, variables included.
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of declared input variables.
    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    pub(crate) fn check_expr(&self, id: ExprId) -> Result<()> {
        if (id.0 as usize) < self.nodes.len() {
            Ok(())
        } else {
            Err(ExprError::UnknownExpr(id.0))
        }
    }

    /// Forward sweep: evaluate every node, in order, into `values`.
    pub(crate) fn eval_into(&self, inputs: &[f64], values: &mut Vec<f64>) -> Result<()> {
        if inputs.len() != self.n_vars {
            return Err(ExprError::ShapeMismatch {
                expected: self.n_vars,
                got: inputs.len(),
            });
        }
        values.clear();
        values.reserve(self.nodes.len());
        for node in &self.nodes {
            let value = match *node {
                Node::Var(i) => inputs[i as usize],
                Node::Const(c) => c,
                Node::Bin(op, a, b) => {
                    let (x, y) = (values[a.0 as usize], values[b.0 as usize]);
                    match op {
                        BinOp::Add => x + y,
                        BinOp::Sub => x - y,
                        BinOp::Mul => x * y,
                        BinOp::Div => x / y,
                    }
                }
                Node::Prim(p, a) => (PRIMITIVES[p as usize].eval)(values[a.0 as usize]),
                Node::Less(a, b) => {
                    if values[a.0 as usize] < values[b.0 as usize] {
                        1.0
                    } else {
                        0.0
                    }
                }
                Node::And(a, b) => {
                    if values[a.0 as usize] != 0.0 && values[b.0 as usize] != 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                }
                Node::Select(c, t, f) => {
                    if values[c.0 as usize] != 0.0 {
                        values[t.0 as usize]
                    } else {
                        values[f.0 as usize]
                    }
                }
            };
            values.push(value);
        }
        Ok(())
    }

    /// Reverse sweep: accumulate adjoints of `output` (seeded with 1) into
    /// every node. Comparisons and conjunctions carry no gradient; a select
    /// routes its adjoint to the branch that was taken.
    pub(crate) fn backward_into(&self, values: &[f64], output: ExprId, adjoints: &mut Vec<f64>) {
        adjoints.clear();
        adjoints.resize(self.nodes.len(), 0.0);
        adjoints[output.0 as usize] = 1.0;
        for idx in (0..self.nodes.len()).rev() {
            let adj = adjoints[idx];
            if adj == 0.0 {
                continue;
            }
            match self.nodes[idx] {
                Node::Var(_) | Node::Const(_) | Node::Less(..) | Node::And(..) => {}
                Node::Bin(op, a, b) => {
                    let (ai, bi) = (a.0 as usize, b.0 as usize);
                    match op {
                        BinOp::Add => {
                            adjoints[ai] += adj;
                            adjoints[bi] += adj;
                        }
                        BinOp::Sub => {
                            adjoints[ai] += adj;
                            adjoints[bi] -= adj;
                        }
                        BinOp::Mul => {
                            adjoints[ai] += adj * values[bi];
                            adjoints[bi] += adj * values[ai];
                        }
                        BinOp::Div => {
                            let vb = values[bi];
                            adjoints[ai] += adj / vb;
                            adjoints[bi] -= adj * values[ai] / (vb * vb);
                        }
                    }
                }
                Node::Prim(p, a) => {
                    let ai = a.0 as usize;
                    adjoints[ai] += adj * (PRIMITIVES[p as usize].partial)(values[ai], values[idx]);
                }
                Node::Select(c, t, f) => {
                    let taken = if values[c.0 as usize] != 0.0 { t } else { f };
                    adjoints[taken.0 as usize] += adj;
                }
            }
        }
    }
}

thread_local! {
    static ACTIVE: RefCell<Option<ExprGraph>> = const { RefCell::new(None) };
}

fn with_active<R>(f: impl FnOnce(&mut ExprGraph) -> R) -> R {
    ACTIVE.with(|slot| {
        let mut slot = slot.borrow_mut();
        let graph = slot
            .as_mut()
            .expect("ExprId arithmetic requires an active trace");
        f(graph)
    })
}

/// Record a pure computation over `n_inputs` variables as an expression
/// graph.
///
/// The closure receives one [`ExprId`] per input and returns whatever
/// outputs it likes (typically `ExprId`s or collections of them). Traces do
/// not nest.
pub fn trace<O>(n_inputs: usize, build: impl FnOnce(&[ExprId]) -> O) -> (ExprGraph, O) {
    ACTIVE.with(|slot| {
        let mut slot = slot.borrow_mut();
        assert!(slot.is_none(), "expression traces cannot be nested");
        *slot = Some(ExprGraph::with_vars(n_inputs));
    });
    let vars: Vec<ExprId> = (0..n_inputs).map(|i| ExprId(i as u32)).collect();
    let outputs = build(&vars);
    let graph = ACTIVE.with(|slot| slot.borrow_mut().take().expect("trace graph disappeared"));
    (graph, outputs)
}

impl ExprId {
    /// Lift a constant into the active trace.
    pub fn from_f64(value: f64) -> Self {
        with_active(|g| g.push_const(value))
    }
}

impl Add for ExprId {
    type Output = ExprId;

    fn add(self, rhs: ExprId) -> ExprId {
        with_active(|g| g.push(Node::Bin(BinOp::Add, self, rhs)))
    }
}

impl Sub for ExprId {
    type Output = ExprId;

    fn sub(self, rhs: ExprId) -> ExprId {
        with_active(|g| g.push(Node::Bin(BinOp::Sub, self, rhs)))
    }
}

impl Mul for ExprId {
    type Output = ExprId;

    fn mul(self, rhs: ExprId) -> ExprId {
        with_active(|g| g.push(Node::Bin(BinOp::Mul, self, rhs)))
    }
}

impl Div for ExprId {
    type Output = ExprId;

    fn div(self, rhs: ExprId) -> ExprId {
        with_active(|g| g.push(Node::Bin(BinOp::Div, self, rhs)))
    }
}

impl Neg for ExprId {
    type Output = ExprId;

    fn neg(self) -> ExprId {
        with_active(|g| {
            let zero = g.push_const(0.0);
            g.push(Node::Bin(BinOp::Sub, zero, self))
        })
    }
}

impl Scalar for ExprId {
    type Cond = ExprId;

    fn constant(value: f64) -> Self {
        ExprId::from_f64(value)
    }

    fn sqrt(self) -> Self {
        with_active(|g| g.push(Node::Prim(primitive::SQRT, self)))
    }

    fn exp(self) -> Self {
        with_active(|g| g.push(Node::Prim(primitive::EXP, self)))
    }

    fn tanh(self) -> Self {
        with_active(|g| g.push(Node::Prim(primitive::TANH, self)))
    }

    fn sin(self) -> Self {
        with_active(|g| g.push(Node::Prim(primitive::SIN, self)))
    }

    fn cos(self) -> Self {
        with_active(|g| g.push(Node::Prim(primitive::COS, self)))
    }

    fn lt(self, rhs: Self) -> Self {
        with_active(|g| g.push(Node::Less(self, rhs)))
    }

    fn and(a: Self, b: Self) -> Self {
        with_active(|g| g.push(Node::And(a, b)))
    }

    fn select(cond: Self, on_true: Self, on_false: Self) -> Self {
        with_active(|g| g.push(Node::Select(cond, on_true, on_false)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_records_and_interns_constants() {
        let (graph, out) = trace(1, |vars| {
            let two_a = ExprId::from_f64(2.0);
            let two_b = ExprId::from_f64(2.0);
            assert_eq!(two_a, two_b);
            vars[0] * two_a
        });
        let mut values = Vec::new();
        graph.eval_into(&[3.0], &mut values).unwrap();
        assert_eq!(values[out.0 as usize], 6.0);
    }

    #[test]
    fn eval_rejects_wrong_input_count() {
        let (graph, _) = trace(2, |vars| vars[0] + vars[1]);
        let mut values = Vec::new();
        let err = graph.eval_into(&[1.0], &mut values).unwrap_err();
        assert_eq!(
            err,
            ExprError::ShapeMismatch {
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn backward_product_rule() {
        // f(x, y) = x * y + sin(x): df/dx = y + cos(x), df/dy = x
        let (graph, out) = trace(2, |vars| vars[0] * vars[1] + vars[0].sin());
        let (x, y) = (0.7, -1.3);
        let mut values = Vec::new();
        graph.eval_into(&[x, y], &mut values).unwrap();
        let mut adjoints = Vec::new();
        graph.backward_into(&values, out, &mut adjoints);
        assert!((adjoints[0] - (y + x.cos())).abs() < 1e-12);
        assert!((adjoints[1] - x).abs() < 1e-12);
    }

    #[test]
    fn select_routes_gradient_to_taken_branch_only() {
        // f = select(x < 1, 3x, x²); at x = 0.5 the linear branch is taken.
        let build = |vars: &[ExprId]| {
            let x = vars[0];
            let cond = x.lt(ExprId::from_f64(1.0));
            ExprId::select(cond, ExprId::from_f64(3.0) * x, x * x)
        };
        let (graph, out) = trace(1, build);

        let mut values = Vec::new();
        let mut adjoints = Vec::new();

        graph.eval_into(&[0.5], &mut values).unwrap();
        graph.backward_into(&values, out, &mut adjoints);
        assert_eq!(adjoints[0], 3.0);

        graph.eval_into(&[2.0], &mut values).unwrap();
        graph.backward_into(&values, out, &mut adjoints);
        assert_eq!(adjoints[0], 4.0);
    }
}
