//! The expression tree: the one data type every other module in this crate
//! operates on.
//!
//! An [`Expr`] is one of seven variants. Three are true atoms (`Integer`,
//! `Real`, `Str`), `Sym` is an atom that additionally carries an identity
//! usable as a rule-dispatch key, `Compound` is the only recursive variant
//! (an ordered, non-empty sequence of sub-expressions, element zero being
//! the head), `Object` carries an opaque extension payload (associations,
//! byte arrays), and `Error` is a first-class failure value that propagates
//! like data rather than unwinding.
//!
//! Expressions are immutable once built and `Clone` is an `Arc` bump for
//! every non-trivial variant, so sharing a sub-tree between two different
//! parent expressions, or between expressions owned by independently
//! running evaluators on different threads, never copies.

use std::fmt;
use std::sync::Arc;

use symterm_base::{intern, resolve, Symbol, SymbolEq};

/// A node in the expression tree.
///
/// See the module documentation for the shape of each variant.
#[derive(Clone, Debug)]
pub enum Expr {
    Integer(i64),
    Real(f64),
    Str(StrData),
    Sym(Symbol),
    Compound(Arc<CompoundData>),
    Object(Arc<ObjectData>),
    Error(Arc<ErrorData>),
}

/// A string value together with its character count, so `Length` on a
/// string is O(1) rather than re-scanning the UTF-8 bytes every time.
#[derive(Clone, Debug)]
pub struct StrData {
    text: Arc<str>,
    chars: usize,
}

impl StrData {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        let text = text.into();
        let chars = text.chars().count();
        StrData { text, chars }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn char_count(&self) -> usize {
        self.chars
    }
}

impl PartialEq for StrData {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

/// The backing storage for [`Expr::Compound`].
///
/// `elements[0]` is the head; `elements[1..]` are the arguments. A compound
/// is never empty: constructing one always supplies a head, even if there
/// are zero arguments (e.g. `Foo()` has one element and `Length` zero).
#[derive(Clone, Debug)]
pub struct CompoundData {
    pub elements: Vec<Expr>,
}

/// The payload carried by an [`Expr::Object`]. Closed for now to the two
/// extension types the kernel itself needs to reason about structurally;
/// additional native types can still flow through as opaque `Compound`
/// values dispatched by head symbol.
#[derive(Clone, Debug)]
pub enum ObjectPayload {
    Association(Association),
    ByteArray(Arc<[u8]>),
}

#[derive(Clone, Debug)]
pub struct ObjectData {
    pub type_name: Symbol,
    pub payload: ObjectPayload,
}

impl PartialEq for ObjectData {
    fn eq(&self, other: &Self) -> bool {
        if self.type_name != other.type_name {
            return false;
        }
        match (&self.payload, &other.payload) {
            (ObjectPayload::Association(a), ObjectPayload::Association(b)) => a == b,
            (ObjectPayload::ByteArray(a), ObjectPayload::ByteArray(b)) => a == b,
            _ => false,
        }
    }
}

/// An insertion-ordered key-to-value map, keyed by the canonical string of
/// the key expression so that e.g. two structurally-equal compound keys
/// hash to the same slot. Equality between two associations ignores
/// insertion order (it is a map, not a sequence) but `iter` walks entries
/// in the order they were inserted, which is what rendering and `Keys`/
/// `Values` observe.
#[derive(Clone, Debug, Default)]
pub struct Association {
    entries: indexmap::IndexMap<String, (Expr, Expr)>,
}

impl Association {
    pub fn new() -> Self {
        Association { entries: indexmap::IndexMap::new() }
    }

    pub fn insert(&mut self, key: Expr, value: Expr) {
        self.entries.insert(canonical_string(&key), (key, value));
    }

    pub fn get(&self, key: &Expr) -> Option<&Expr> {
        self.entries.get(&canonical_string(key)).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Expr, &Expr)> {
        self.entries.values().map(|(k, v)| (k, v))
    }
}

impl PartialEq for Association {
    fn eq(&self, other: &Self) -> bool {
        if self.entries.len() != other.entries.len() {
            return false;
        }
        self.entries.iter().all(|(k, (_, v))| other.entries.get(k).is_some_and(|(_, v2)| v == v2))
    }
}

/// The severity/category of a kernel-produced failure value. See
/// [`crate::error`] for how these are attached to stack frames.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    ArgumentError,
    TypeError,
    ValueError,
    DivisionByZero,
    OverflowError,
    IndexError,
    ParseError,
    RecursionError,
    ThreadMismatch,
    Cancelled,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::ArgumentError => "ArgumentError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::ValueError => "ValueError",
            ErrorKind::DivisionByZero => "DivisionByZero",
            ErrorKind::OverflowError => "OverflowError",
            ErrorKind::IndexError => "IndexError",
            ErrorKind::ParseError => "ParseError",
            ErrorKind::RecursionError => "RecursionError",
            ErrorKind::ThreadMismatch => "ThreadMismatch",
            ErrorKind::Cancelled => "Cancelled",
        }
    }
}

/// One entry in an `Error` value's attached call-stack trail.
#[derive(Clone, PartialEq, Debug)]
pub struct Frame {
    pub function: Symbol,
    pub short_form: String,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ErrorData {
    pub kind: ErrorKind,
    pub message: String,
    pub args: Vec<Expr>,
    pub frames: Vec<Frame>,
}

impl Expr {
    pub fn integer(v: i64) -> Expr {
        Expr::Integer(v)
    }

    pub fn real(v: f64) -> Expr {
        Expr::Real(v)
    }

    pub fn string(s: impl Into<Arc<str>>) -> Expr {
        Expr::Str(StrData::new(s))
    }

    pub fn symbol(name: &str) -> Expr {
        Expr::Sym(intern(name))
    }

    pub fn from_symbol(sym: Symbol) -> Expr {
        Expr::Sym(sym)
    }

    /// Builds a compound with the given head and arguments. `Head()` is a
    /// valid zero-argument compound: `args` may be empty.
    pub fn compound(head: Expr, args: Vec<Expr>) -> Expr {
        let mut elements = Vec::with_capacity(args.len() + 1);
        elements.push(head);
        elements.extend(args);
        Expr::Compound(Arc::new(CompoundData { elements }))
    }

    /// Builds a compound from a named head, interning the name. Convenience
    /// for the very common case of a literal symbol head.
    pub fn call(head_name: &str, args: Vec<Expr>) -> Expr {
        Expr::compound(Expr::symbol(head_name), args)
    }

    pub fn list(items: Vec<Expr>) -> Expr {
        Expr::call("List", items)
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Error(Arc::new(ErrorData { kind, message: message.into(), args, frames: Vec::new() }))
    }

    pub fn object(type_name: Symbol, payload: ObjectPayload) -> Expr {
        Expr::Object(Arc::new(ObjectData { type_name, payload }))
    }

    /// The head of this expression. Atoms other than `Compound` report the
    /// symbol naming their own type (`Integer`, `Real`, `String`, `Symbol`);
    /// by convention `Error` reports the symbol `Error`, since an error
    /// value behaves like an atom for dispatch purposes even though it
    /// carries structured data.
    pub fn head(&self) -> Expr {
        match self {
            Expr::Integer(_) => Expr::symbol("Integer"),
            Expr::Real(_) => Expr::symbol("Real"),
            Expr::Str(_) => Expr::symbol("String"),
            Expr::Sym(_) => Expr::symbol("Symbol"),
            Expr::Compound(c) => c.elements[0].clone(),
            Expr::Object(o) => Expr::Sym(o.type_name),
            Expr::Error(_) => Expr::symbol("Error"),
        }
    }

    /// The number of arguments: zero for every atom (including `Error`),
    /// `elements.len() - 1` for a compound.
    pub fn length(&self) -> usize {
        match self {
            Expr::Compound(c) => c.elements.len() - 1,
            _ => 0,
        }
    }

    pub fn args(&self) -> &[Expr] {
        match self {
            Expr::Compound(c) => &c.elements[1..],
            _ => &[],
        }
    }

    pub fn as_symbol(&self) -> Option<Symbol> {
        match self {
            Expr::Sym(s) => Some(*s),
            _ => None,
        }
    }

    pub fn is_symbol_named(&self, name: &str) -> bool {
        matches!(self, Expr::Sym(s) if s.is(name))
    }

    pub fn as_compound(&self) -> Option<&CompoundData> {
        match self {
            Expr::Compound(c) => Some(c),
            _ => None,
        }
    }

    /// True if this is a compound whose head is the symbol `head_name`.
    pub fn is_call(&self, head_name: &str) -> bool {
        matches!(self, Expr::Compound(c) if c.elements[0].is_symbol_named(head_name))
    }

    pub fn is_list(&self) -> bool {
        self.is_call("List")
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Expr::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Widens an `Integer` or `Real` to `f64`; `None` for anything else.
    /// Used by native numeric handlers that need both operands on a common
    /// footing (e.g. `Divide`, `Power`) without losing track of which
    /// input was which — callers that need to preserve "stays an Integer
    /// unless a Real is present" still match on `Expr::Integer`/`Expr::Real`
    /// directly rather than calling this.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Expr::Integer(v) => Some(*v as f64),
            Expr::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Arc<ObjectData>> {
        match self {
            Expr::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&Arc<ErrorData>> {
        match self {
            Expr::Error(e) => Some(e),
            _ => None,
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expr::Integer(a), Expr::Integer(b)) => a == b,
            // Bitwise-identical doubles: -0.0 != 0.0, and NaN is never equal
            // to itself even when the bit patterns match, per IEEE 754.
            (Expr::Real(a), Expr::Real(b)) => {
                if a.is_nan() || b.is_nan() {
                    false
                } else {
                    a.to_bits() == b.to_bits()
                }
            }
            (Expr::Str(a), Expr::Str(b)) => a == b,
            (Expr::Sym(a), Expr::Sym(b)) => a == b,
            (Expr::Compound(a), Expr::Compound(b)) => {
                Arc::ptr_eq(a, b) || a.elements == b.elements
            }
            (Expr::Object(a), Expr::Object(b)) => Arc::ptr_eq(a, b) || **a == **b,
            (Expr::Error(a), Expr::Error(b)) => Arc::ptr_eq(a, b) || **a == **b,
            _ => false,
        }
    }
}

/// Renders an expression in the same surface syntax it could have been
/// parsed from (`Expr::compound` nests as `Head(a, b, c)`, strings are
/// quoted, etc). Used both for `InputForm`/display and as the canonical
/// string that backs `Orderless` sort order and association key hashing.
pub fn canonical_string(e: &Expr) -> String {
    let mut out = String::new();
    write_canonical(e, &mut out);
    out
}

fn write_canonical(e: &Expr, out: &mut String) {
    use std::fmt::Write;
    match e {
        Expr::Integer(v) => {
            let _ = write!(out, "{v}");
        }
        Expr::Real(v) => {
            let _ = write!(out, "{v:?}");
        }
        Expr::Str(s) => {
            out.push('"');
            for c in s.as_str().chars() {
                match c {
                    '"' => out.push_str("\\\""),
                    '\\' => out.push_str("\\\\"),
                    _ => out.push(c),
                }
            }
            out.push('"');
        }
        Expr::Sym(s) => out.push_str(&resolve(*s)),
        Expr::Compound(c) => {
            write_canonical(&c.elements[0], out);
            out.push('(');
            for (i, a) in c.elements[1..].iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_canonical(a, out);
            }
            out.push(')');
        }
        Expr::Object(o) => {
            let _ = write!(out, "{}<object>", resolve(o.type_name));
        }
        Expr::Error(err) => {
            out.push_str("$Failed(");
            out.push_str(err.kind.name());
            out.push_str(", \"");
            out.push_str(&err.message);
            out.push_str("\")");
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&canonical_string(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_and_length_of_atoms() {
        assert_eq!(Expr::integer(5).head(), Expr::symbol("Integer"));
        assert_eq!(Expr::integer(5).length(), 0);
        assert_eq!(Expr::string("hi").head(), Expr::symbol("String"));
    }

    #[test]
    fn head_and_length_of_compound() {
        let e = Expr::call("f", vec![Expr::integer(1), Expr::integer(2)]);
        assert_eq!(e.head(), Expr::symbol("f"));
        assert_eq!(e.length(), 2);
    }

    #[test]
    fn zero_arg_compound_has_length_zero() {
        let e = Expr::call("Foo", vec![]);
        assert_eq!(e.length(), 0);
        assert_eq!(e.head(), Expr::symbol("Foo"));
    }

    #[test]
    fn integer_and_real_are_never_equal() {
        assert_ne!(Expr::integer(1), Expr::real(1.0));
    }

    #[test]
    fn real_equality_is_bitwise() {
        assert_ne!(Expr::real(0.0), Expr::real(-0.0));
        assert_eq!(Expr::real(1.5), Expr::real(1.5));
    }

    #[test]
    fn nan_is_never_equal_to_itself() {
        let nan = Expr::real(f64::NAN);
        assert_ne!(nan.clone(), nan);
    }

    #[test]
    fn compound_equality_is_structural() {
        let a = Expr::call("f", vec![Expr::integer(1)]);
        let b = Expr::call("f", vec![Expr::integer(1)]);
        assert_eq!(a, b);
        let c = Expr::call("f", vec![Expr::integer(2)]);
        assert_ne!(a, c);
    }

    #[test]
    fn association_equality_ignores_insertion_order() {
        let mut a = Association::new();
        a.insert(Expr::string("x"), Expr::integer(1));
        a.insert(Expr::string("y"), Expr::integer(2));
        let mut b = Association::new();
        b.insert(Expr::string("y"), Expr::integer(2));
        b.insert(Expr::string("x"), Expr::integer(1));
        assert_eq!(a, b);
    }

    #[test]
    fn canonical_string_round_trips_shape() {
        let e = Expr::call("f", vec![Expr::integer(1), Expr::string("a")]);
        assert_eq!(canonical_string(&e), "f(1, \"a\")");
    }
}
