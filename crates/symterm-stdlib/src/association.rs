//! `Keys`/`Values`/`HasKey`: read-only accessors over `Association`
//! objects. Insertion and lookup themselves are handled by
//! `symterm-kernel::slice`'s `Part`/`PartSet` (an `Association` is just
//! another `Part`-able container); these three round out the type so it can
//! be introspected without indexing one key at a time.

use symterm_base::intern;
use symterm_kernel::eval::Evaluator;
use symterm_kernel::expr::{Expr, ObjectPayload, ErrorKind};

pub(crate) fn register(evaluator: &Evaluator) {
    register_one(evaluator, "Keys", keys_native);
    register_one(evaluator, "Values", values_native);
    register_has_key(evaluator);
}

fn association_blank() -> Expr {
    Expr::call("Blank", vec![Expr::symbol("Association")])
}

fn register_one(evaluator: &Evaluator, name: &str, f: symterm_kernel::registry::NativeFn) {
    let pattern = Expr::call(name, vec![association_blank()]);
    evaluator.register_pattern(pattern, f).expect("association patterns are always well-formed");
}

fn register_has_key(evaluator: &Evaluator) {
    let pattern = Expr::call("HasKey", vec![association_blank(), Expr::call("Blank", vec![])]);
    evaluator.register_pattern(pattern, has_key_native).expect("association patterns are always well-formed");
}

fn as_association(e: &Expr) -> Option<&symterm_kernel::expr::Association> {
    match e.as_object().map(|o| &o.payload) {
        Some(ObjectPayload::Association(a)) => Some(a),
        _ => None,
    }
}

fn keys_native(args: &[Expr]) -> Expr {
    let Some(assoc) = as_association(&args[0]) else {
        return Expr::error(ErrorKind::TypeError, "Keys requires an Association", vec![args[0].clone()]);
    };
    Expr::list(assoc.iter().map(|(k, _)| k.clone()).collect())
}

fn values_native(args: &[Expr]) -> Expr {
    let Some(assoc) = as_association(&args[0]) else {
        return Expr::error(ErrorKind::TypeError, "Values requires an Association", vec![args[0].clone()]);
    };
    Expr::list(assoc.iter().map(|(_, v)| v.clone()).collect())
}

fn has_key_native(args: &[Expr]) -> Expr {
    let Some(assoc) = as_association(&args[0]) else {
        return Expr::error(ErrorKind::TypeError, "HasKey requires an Association", vec![args[0].clone()]);
    };
    let found = assoc.get(&args[1]).is_some();
    Expr::from_symbol(intern(if found { "True" } else { "False" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use symterm_kernel::expr::Association;

    fn sample() -> Expr {
        let mut a = Association::new();
        a.insert(Expr::string("a"), Expr::integer(1));
        a.insert(Expr::string("b"), Expr::integer(2));
        Expr::object(intern("Association"), ObjectPayload::Association(a))
    }

    fn ev() -> Evaluator {
        let e = Evaluator::new();
        register(&e);
        e
    }

    #[test]
    fn keys_preserves_insertion_order() {
        let mut e = ev();
        let result = e.evaluate(&Expr::call("Keys", vec![sample()]));
        assert_eq!(result, Expr::list(vec![Expr::string("a"), Expr::string("b")]));
    }

    #[test]
    fn values_matches_keys_order() {
        let mut e = ev();
        let result = e.evaluate(&Expr::call("Values", vec![sample()]));
        assert_eq!(result, Expr::list(vec![Expr::integer(1), Expr::integer(2)]));
    }

    #[test]
    fn has_key_reports_missing_keys() {
        let mut e = ev();
        let result = e.evaluate(&Expr::call("HasKey", vec![sample(), Expr::string("missing")]));
        assert_eq!(result, Expr::symbol("False"));
    }
}
