//! The rule registry: for each head symbol, a specificity-ordered list of
//! `(pattern, handler)` entries. Dispatch scans the list for the head in
//! order and fires the first entry whose pattern matches.
//!
//! Mirrors the teacher's `constructor_order` trick of tracking insertion
//! order alongside a primary sort key: specificity decides the scan order,
//! and insertion order (not re-insertion order — replacing an existing
//! pattern keeps its original tie-break slot) breaks ties between two
//! patterns of equal specificity so dispatch is deterministic.

use std::collections::HashMap;

use symterm_base::Symbol;

use crate::expr::Expr;
use crate::pattern::{match_top, specificity, Bindings};
use crate::symtab::SymbolTable;

/// What a matched rule does once the pattern binds.
#[derive(Clone)]
pub enum Handler {
    /// A built-in implemented in Rust. Receives the normalized, already
    /// evaluated argument list (not the raw bindings — native handlers are
    /// free to re-derive whatever they need from the arguments directly).
    Native(NativeFn),
    /// A user-defined rule registered by `Set`/`SetDelayed`.
    User {
        body: Expr,
        /// `false` for `Set` (the body was evaluated once at registration
        /// time and is returned verbatim), `true` for `SetDelayed` (the
        /// body is substituted with the match's bindings and evaluated
        /// fresh on every dispatch).
        delayed: bool,
    },
}

pub type NativeFn = fn(&[Expr]) -> Expr;

struct RuleEntry {
    pattern: Expr,
    specificity: u64,
    order: u64,
    handler: Handler,
}

/// A `Symbol -> Vec<RuleEntry>` table, one entry list per head.
#[derive(Default)]
pub struct RuleRegistry {
    rules: HashMap<Symbol, Vec<RuleEntry>>,
    next_order: u64,
}

impl RuleRegistry {
    pub fn new() -> Self {
        RuleRegistry { rules: HashMap::new(), next_order: 0 }
    }

    /// Registers `pattern` (a full compound, e.g. `f(x_Integer)`, whose
    /// head is `head`) under `head`'s rule list. Replaces any existing
    /// entry whose pattern is structurally identical, keeping that entry's
    /// original tie-break order so re-registering a pattern in place
    /// (common when iterating on a definition) doesn't silently reorder it
    /// relative to siblings of equal specificity.
    pub fn register(&mut self, head: Symbol, pattern: Expr, handler: Handler) {
        let spec = specificity(&pattern);
        let entries = self.rules.entry(head).or_default();
        let order = match entries.iter().position(|e| e.pattern == pattern) {
            Some(pos) => entries.remove(pos).order,
            None => {
                let o = self.next_order;
                self.next_order += 1;
                o
            }
        };
        entries.push(RuleEntry { pattern, specificity: spec, order, handler });
        entries.sort_by(|a, b| b.specificity.cmp(&a.specificity).then(a.order.cmp(&b.order)));
    }

    /// Removes the entry whose pattern is structurally identical to
    /// `pattern`, if any. Used by `Unset`.
    pub fn unset(&mut self, head: Symbol, pattern: &Expr) {
        if let Some(entries) = self.rules.get_mut(&head) {
            entries.retain(|e| &e.pattern != pattern);
        }
    }

    /// Scans `head`'s entries in specificity order and returns the first
    /// one whose pattern matches `synthetic` (the fully normalized call
    /// `head(args...)`), along with the bindings produced.
    pub fn find_matching(
        &self,
        head: Symbol,
        synthetic: &Expr,
        symtab: &SymbolTable,
    ) -> Option<(Handler, Bindings)> {
        let entries = self.rules.get(&head)?;
        for entry in entries {
            if let Some(bindings) = match_top(&entry.pattern, synthetic, symtab) {
                return Some((entry.handler.clone(), bindings));
            }
        }
        None
    }

    pub fn patterns_for(&self, head: Symbol) -> Vec<Expr> {
        self.rules.get(&head).map(|v| v.iter().map(|e| e.pattern.clone()).collect()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.values().all(|v| v.is_empty())
    }
}
