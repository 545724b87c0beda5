//! Pattern matching: typed blanks, variadic sequence patterns, and the
//! specificity order the rule registry dispatches by.

pub mod matcher;
pub mod specificity;

pub use matcher::{match_top, Bindings};
pub use specificity::specificity;
