//! Surface syntax for symterm: turns source text into the [`Expr`] trees
//! [`symterm_kernel::eval::Evaluator`] evaluates, and renders them back via
//! [`symterm_kernel::input_form`]. The grammar is spec §6's: a Mathematica-
//! flavored infix/postfix language with `_`/`__`/`___` pattern blanks,
//! bracketed indexing and slicing, and list/association literals.

pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use error::ParseError;
pub use lexer::Lexer;
pub use parser::{parse, Parser};
pub use token::Token;

pub use symterm_kernel::expr::Expr;
