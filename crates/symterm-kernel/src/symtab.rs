//! Symbol attributes: the bitset the evaluator consults to decide how a
//! symbol's arguments should be held, flattened, reordered, or threaded.
//!
//! Attributes live in a table shared between a context and every context
//! descended from it (the sharing is the point: `SetAttributes` at the top
//! of a session must be visible to nested contexts created later for
//! lexical scoping), guarded by a `RwLock` so concurrent readers can query
//! attributes while evaluation proceeds on multiple contexts at once and
//! writers serialize against each other.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use symterm_base::Symbol;

macro_rules! attribute_bits {
    ($($name:ident => $bit:expr),* $(,)?) => {
        /// A single symbol attribute, e.g. `Flat` or `HoldAll`.
        #[derive(Clone, Copy, PartialEq, Eq, Debug)]
        pub enum Attribute {
            $($name,)*
        }

        impl Attribute {
            fn bit(self) -> u16 {
                match self {
                    $(Attribute::$name => 1 << $bit,)*
                }
            }
        }
    };
}

attribute_bits! {
    HoldAll => 0,
    HoldFirst => 1,
    HoldRest => 2,
    Flat => 3,
    Orderless => 4,
    OneIdentity => 5,
    Listable => 6,
    Constant => 7,
    NumericFunction => 8,
    Protected => 9,
    ReadProtected => 10,
    Locked => 11,
    Temporary => 12,
}

/// A compact set of [`Attribute`]s for a single symbol.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct AttributeSet(u16);

impl AttributeSet {
    pub fn empty() -> Self {
        AttributeSet(0)
    }

    pub fn has(self, attr: Attribute) -> bool {
        self.0 & attr.bit() != 0
    }

    pub fn with(mut self, attr: Attribute) -> Self {
        self.0 |= attr.bit();
        self
    }

    pub fn without(mut self, attr: Attribute) -> Self {
        self.0 &= !attr.bit();
        self
    }

    pub fn hold_all(self) -> bool {
        self.has(Attribute::HoldAll)
    }
    pub fn hold_first(self) -> bool {
        self.has(Attribute::HoldFirst)
    }
    pub fn hold_rest(self) -> bool {
        self.has(Attribute::HoldRest)
    }
    pub fn flat(self) -> bool {
        self.has(Attribute::Flat)
    }
    pub fn orderless(self) -> bool {
        self.has(Attribute::Orderless)
    }
    pub fn one_identity(self) -> bool {
        self.has(Attribute::OneIdentity)
    }
    pub fn listable(self) -> bool {
        self.has(Attribute::Listable)
    }
    pub fn protected(self) -> bool {
        self.has(Attribute::Protected)
    }
    pub fn locked(self) -> bool {
        self.has(Attribute::Locked)
    }
}

/// A shared, thread-safe `Symbol -> AttributeSet` table.
///
/// Cloning a `SymbolTable` clones the `Arc`: every clone observes the same
/// underlying map. A fresh top-level [`crate::eval::Evaluator`] gets a
/// brand-new table (so independent evaluators cannot see each other's
/// `SetAttributes` calls); a context created for lexical scoping inside one
/// evaluator clones the table it descends from.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    inner: Arc<RwLock<HashMap<Symbol, AttributeSet>>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable { inner: Arc::new(RwLock::new(HashMap::new())) }
    }

    pub fn get(&self, sym: Symbol) -> AttributeSet {
        self.inner.read().expect("symbol table poisoned").get(&sym).copied().unwrap_or_default()
    }

    pub fn set(&self, sym: Symbol, attrs: AttributeSet) {
        self.inner.write().expect("symbol table poisoned").insert(sym, attrs);
    }

    pub fn add(&self, sym: Symbol, attr: Attribute) {
        let mut guard = self.inner.write().expect("symbol table poisoned");
        let entry = guard.entry(sym).or_insert_with(AttributeSet::empty);
        *entry = entry.with(attr);
    }

    pub fn remove(&self, sym: Symbol, attr: Attribute) {
        let mut guard = self.inner.write().expect("symbol table poisoned");
        if let Some(entry) = guard.get_mut(&sym) {
            *entry = entry.without(attr);
        }
    }

    pub fn clear(&self, sym: Symbol) {
        self.inner.write().expect("symbol table poisoned").remove(&sym);
    }

    pub fn list_all(&self) -> Vec<Symbol> {
        self.inner.read().expect("symbol table poisoned").keys().copied().collect()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symterm_base::intern;

    #[test]
    fn set_and_get_round_trip() {
        let table = SymbolTable::new();
        let plus = intern("symtab_test_Plus");
        table.add(plus, Attribute::Flat);
        table.add(plus, Attribute::Orderless);
        let attrs = table.get(plus);
        assert!(attrs.flat());
        assert!(attrs.orderless());
        assert!(!attrs.hold_all());
    }

    #[test]
    fn clones_share_the_same_table() {
        let table = SymbolTable::new();
        let clone = table.clone();
        let sym = intern("symtab_test_shared_sym");
        table.add(sym, Attribute::HoldAll);
        assert!(clone.get(sym).hold_all());
    }

    #[test]
    fn remove_clears_a_single_attribute() {
        let table = SymbolTable::new();
        let sym = intern("symtab_test_remove_sym");
        table.add(sym, Attribute::Flat);
        table.add(sym, Attribute::Orderless);
        table.remove(sym, Attribute::Flat);
        assert!(!table.get(sym).flat());
        assert!(table.get(sym).orderless());
    }

    #[test]
    fn unknown_symbol_has_no_attributes() {
        let table = SymbolTable::new();
        let sym = intern("symtab_test_unknown_sym");
        assert_eq!(table.get(sym), AttributeSet::empty());
    }
}
