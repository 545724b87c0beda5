//! The Kernel: a term-rewriting engine for symbolic computation
//!
//! Everything is an [`Expr`]: a number, a string, a symbol, or a compound
//! term `Head(arg1, arg2, ...)`. Evaluation is rewriting — an expression is
//! repeatedly transformed by pattern-matching rules registered against its
//! head symbol, until it stops changing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Evaluator                             │
//! │  evaluate, step  — the fixed-point rewriting loop            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!               ┌──────────────┴──────────────┐
//!               ▼                             ▼
//! ┌─────────────────────────┐   ┌─────────────────────────────┐
//! │    Special forms        │   │        Attributes           │
//! │  If, Set, Replace, ...  │   │  Listable, Flat, Orderless  │
//! └─────────────────────────┘   └─────────────────────────────┘
//!                                             │
//!               ┌─────────────┬───────────────┼───────────────┐
//!               ▼             ▼               ▼               ▼
//! ┌───────────────┐ ┌───────────────┐ ┌───────────────┐ ┌───────────┐
//! │    Pattern    │ │    Registry   │ │    Context    │ │   Slice   │
//! │  match, rank  │ │  rule lookup  │ │  vars, rules  │ │ Part, Take│
//! └───────────────┘ └───────────────┘ └───────────────┘ └───────────┘
//! ```
//!
//! # Public API
//!
//! ## Core Types
//! - [`Expr`] — the expression tree every other type in this crate operates on
//! - [`Context`] — variable bindings and rule registrations, scoped and shareable
//! - [`Evaluator`] — one independently-running evaluation session
//! - [`KernelError`] — host-level construction failures (never produced mid-evaluation)
//!
//! ## Evaluation
//! - [`Evaluator::evaluate`] — rewrite an expression to a fixed point
//! - [`Evaluator::register_pattern`] — teach the kernel a native rule (the
//!   extension point `symterm-stdlib` and a parser's `Set`/`SetDelayed` both use)
//!
//! ## Pattern Matching
//! - [`pattern::match_top`] — match a pattern against a value
//! - [`pattern::specificity`] — rank competing patterns for dispatch order
//!
//! # Boundary
//!
//! This crate has no lexer, no parser, and no standard-library function
//! bodies. Surface syntax lives in `symterm-syntax`; arithmetic, string,
//! list and association primitives live in `symterm-stdlib`. Both reach the
//! kernel through the single [`Evaluator::register_pattern`] extension
//! point — the kernel never depends on either.

pub mod context;
pub mod error;
pub mod eval;
pub mod expr;
pub mod input_form;
pub mod pattern;
pub mod registry;
mod slice;
pub mod symtab;

pub use context::Context;
pub use error::KernelError;
pub use eval::{EvalStack, Evaluator, EvaluatorConfig, Frame};
pub use expr::{canonical_string, Association, CompoundData, Expr, ErrorData, ErrorKind, ObjectData, ObjectPayload, StrData};
pub use pattern::{match_top, specificity, Bindings};
pub use registry::{Handler, NativeFn, RuleRegistry};
pub use symtab::{Attribute, AttributeSet, SymbolTable};
