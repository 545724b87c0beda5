//! The context tree: variable bindings and rule registrations, scoped.
//!
//! A [`Context`] may have a parent. Its symbol table (attributes) is
//! shared with every context in the same tree — attributes are a global
//! property of a symbol name, not something lexical scoping should shadow.
//! Variable bindings and rule registrations are *not* shared: each context
//! owns its own, and a lookup that misses locally walks up to the parent.
//! This is what gives `ReplaceAll` with a `RuleDelayed` its lexical
//! scoping: the replacement's child context binds only the pattern
//! variables, and free symbols inside the replacement body still resolve
//! through the parent link to whatever the enclosing context had.
//!
//! A freshly constructed [`crate::eval::Evaluator`] gets a brand-new
//! symbol table with no parent, so two top-level evaluators are fully
//! isolated from each other even if they happen to register symbols with
//! the same name.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use symterm_base::Symbol;

use crate::expr::Expr;
use crate::pattern::Bindings;
use crate::registry::{Handler, RuleRegistry};
use crate::symtab::SymbolTable;

pub struct Context {
    parent: Option<Arc<Context>>,
    symtab: SymbolTable,
    vars: RefCell<HashMap<Symbol, Expr>>,
    registry: RefCell<RuleRegistry>,
}

impl Context {
    /// A new root context with its own, empty symbol table.
    pub fn root() -> Arc<Context> {
        Arc::new(Context {
            parent: None,
            symtab: SymbolTable::new(),
            vars: RefCell::new(HashMap::new()),
            registry: RefCell::new(RuleRegistry::new()),
        })
    }

    /// A child context sharing `parent`'s symbol table but starting with
    /// empty variable bindings and an empty rule registry of its own.
    pub fn new_child(parent: &Arc<Context>) -> Arc<Context> {
        Arc::new(Context {
            parent: Some(Arc::clone(parent)),
            symtab: parent.symtab.clone(),
            vars: RefCell::new(HashMap::new()),
            registry: RefCell::new(RuleRegistry::new()),
        })
    }

    /// A child context pre-populated with exactly `bindings` as its
    /// variable map, used to evaluate a `RuleDelayed` replacement body
    /// under the bindings a match produced.
    pub fn child_with_bindings(parent: &Arc<Context>, bindings: Bindings) -> Arc<Context> {
        Arc::new(Context {
            parent: Some(Arc::clone(parent)),
            symtab: parent.symtab.clone(),
            vars: RefCell::new(bindings),
            registry: RefCell::new(RuleRegistry::new()),
        })
    }

    pub fn symtab(&self) -> &SymbolTable {
        &self.symtab
    }

    pub fn get_var(&self, sym: Symbol) -> Option<Expr> {
        if let Some(v) = self.vars.borrow().get(&sym) {
            return Some(v.clone());
        }
        self.parent.as_ref().and_then(|p| p.get_var(sym))
    }

    pub fn set_var(&self, sym: Symbol, value: Expr) {
        self.vars.borrow_mut().insert(sym, value);
    }

    pub fn unset_var(&self, sym: Symbol) {
        self.vars.borrow_mut().remove(&sym);
    }

    pub fn register_rule(&self, head: Symbol, pattern: Expr, handler: Handler) {
        self.registry.borrow_mut().register(head, pattern, handler);
    }

    pub fn unset_rule(&self, head: Symbol, pattern: &Expr) {
        self.registry.borrow_mut().unset(head, pattern);
    }

    /// Finds a matching rule for `head(args...)`, checking this context's
    /// own registry first and then walking up to the parent if nothing
    /// matches locally. Clones the handler and pattern out so the borrow
    /// on this context's registry doesn't outlive the call — rule bodies
    /// frequently trigger further registry reads (recursive calls) while
    /// being evaluated.
    pub fn find_rule(&self, head: Symbol, synthetic: &Expr) -> Option<(Handler, Bindings)> {
        if let Some(found) = self.registry.borrow().find_matching(head, synthetic, &self.symtab) {
            return Some(found);
        }
        self.parent.as_ref().and_then(|p| p.find_rule(head, synthetic))
    }
}
