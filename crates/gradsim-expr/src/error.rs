//! Error types for gradsim-expr.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ExprError {
    #[error("input shape mismatch: evaluator declared {expected} inputs, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("expression {0} does not belong to this graph")]
    UnknownExpr(u32),

    #[error("gradient requested for variable {var}, but only {n_vars} inputs are declared")]
    UnknownVariable { var: u32, n_vars: usize },
}

pub type Result<T> = std::result::Result<T, ExprError>;
