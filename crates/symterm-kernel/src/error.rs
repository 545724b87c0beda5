//! Host-level errors: failures in the Rust API surface itself (a malformed
//! call into the registry, a config value out of range). These are
//! distinct from [`crate::expr::Expr::Error`], which is an in-language
//! value that flows through normal evaluation and never unwinds.

use std::fmt;

/// Something went wrong calling into the kernel from host Rust code, as
/// opposed to a failure produced *by* evaluating an expression.
#[derive(Debug)]
pub enum KernelError {
    /// A pattern passed to `RegisterPattern` was not itself a `Compound` or
    /// a bare `Symbol`, so there is no head to register it under.
    InvalidPattern(String),
    /// `max_stack_depth` or another `EvaluatorConfig` field was out of the
    /// range the evaluator can honor.
    InvalidConfig(String),
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::InvalidPattern(msg) => write!(f, "invalid pattern: {msg}"),
            KernelError::InvalidConfig(msg) => write!(f, "invalid evaluator config: {msg}"),
        }
    }
}

impl std::error::Error for KernelError {}
