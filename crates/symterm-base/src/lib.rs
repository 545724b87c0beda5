//! Process-wide symbol interning shared by every `symterm-*` crate.
//!
//! Kept deliberately tiny: this crate has exactly one job (hand out stable
//! integer handles for strings) so that `symterm-kernel`'s expression model,
//! symbol table, and rule registry can all key on `Symbol` instead of
//! `String` without needing to agree on *which* interner instance to share.

mod intern;

pub use intern::{intern, lookup, resolve, Symbol, SymbolEq};
