//! The four structural normalization passes the evaluator runs over a
//! compound's already-evaluated arguments, in a fixed order: `Listable`,
//! then `Flat`, then `Orderless`, then `OneIdentity`. Each pass is
//! idempotent on its own (flattening is fully recursive so one pass
//! exhausts it, sorting by canonical string is a stable total order, and
//! `OneIdentity` either fires once or not at all), so running the four in
//! sequence exactly once reaches the fixed point the evaluator's
//! documentation describes as "applied until it no longer changes."

use symterm_base::{Symbol, SymbolEq};

use crate::expr::{Expr, ErrorKind};

/// Threads a `Listable` head pointwise over any `List`-valued arguments,
/// broadcasting non-list arguments across every position. All `List`
/// arguments must share the same length; mismatched lengths produce a
/// `ThreadMismatch` error instead of a result.
pub fn thread_listable(head: &Expr, args: &[Expr]) -> Result<Expr, Expr> {
    let lengths: Vec<usize> = args.iter().filter_map(|a| a.is_list().then(|| a.length())).collect();
    let Some(&n) = lengths.first() else {
        // No argument is actually a list; nothing to thread.
        return Ok(Expr::compound(head.clone(), args.to_vec()));
    };
    if lengths.iter().any(|&len| len != n) {
        return Err(Expr::error(
            ErrorKind::ThreadMismatch,
            "Listable heads require all list arguments to share a common length",
            args.to_vec(),
        ));
    }
    let mut rows = Vec::with_capacity(n);
    for i in 0..n {
        let row_args: Vec<Expr> = args
            .iter()
            .map(|a| if a.is_list() { a.args()[i].clone() } else { a.clone() })
            .collect();
        rows.push(Expr::compound(head.clone(), row_args));
    }
    Ok(Expr::list(rows))
}

/// Splices any argument whose head is `head` into the argument list,
/// recursively, so nested same-head calls never survive normalization
/// (`Plus(1, Plus(2, 3))` becomes `Plus(1, 2, 3)` before dispatch).
pub fn flatten_args(head: Symbol, args: Vec<Expr>) -> Vec<Expr> {
    let mut out = Vec::with_capacity(args.len());
    for a in args {
        if let Expr::Compound(c) = &a {
            if c.elements[0].as_symbol() == Some(head) {
                out.extend(flatten_args(head, c.elements[1..].to_vec()));
                continue;
            }
        }
        out.push(a);
    }
    out
}

/// Sorts arguments into the head's canonical `Orderless` order: ascending
/// by canonical string form. Stable, so equal-rendering arguments keep
/// their relative order.
pub fn sort_orderless(args: &mut [Expr]) {
    args.sort_by(|a, b| crate::expr::canonical_string(a).cmp(&crate::expr::canonical_string(b)));
}

/// `OneIdentity`: a single-argument call collapses to that argument.
/// Callers check `args.len() == 1` themselves since the collapse replaces
/// the whole compound, not just its argument list.
pub fn one_identity_collapse(args: Vec<Expr>) -> Option<Expr> {
    if args.len() == 1 {
        args.into_iter().next()
    } else {
        None
    }
}

pub fn is_true(e: &Expr) -> bool {
    e.is_symbol_named("True")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threads_listable_pointwise_over_matching_lists() {
        let head = Expr::symbol("f");
        let args = vec![Expr::list(vec![Expr::integer(1), Expr::integer(2)]), Expr::integer(10)];
        let result = thread_listable(&head, &args).unwrap();
        assert_eq!(
            result,
            Expr::list(vec![
                Expr::call("f", vec![Expr::integer(1), Expr::integer(10)]),
                Expr::call("f", vec![Expr::integer(2), Expr::integer(10)]),
            ])
        );
    }

    #[test]
    fn mismatched_list_lengths_produce_thread_mismatch() {
        let head = Expr::symbol("f");
        let args = vec![
            Expr::list(vec![Expr::integer(1), Expr::integer(2)]),
            Expr::list(vec![Expr::integer(1)]),
        ];
        let err = thread_listable(&head, &args).unwrap_err();
        assert_eq!(err.as_error().unwrap().kind, ErrorKind::ThreadMismatch);
    }

    #[test]
    fn flatten_splices_nested_calls_recursively() {
        let plus = symterm_base::intern("attr_test_Plus");
        let nested = Expr::compound(
            Expr::Sym(plus),
            vec![Expr::integer(3), Expr::compound(Expr::Sym(plus), vec![Expr::integer(4)])],
        );
        let flattened = flatten_args(plus, vec![Expr::integer(1), Expr::integer(2), nested]);
        assert_eq!(flattened, vec![Expr::integer(1), Expr::integer(2), Expr::integer(3), Expr::integer(4)]);
    }

    #[test]
    fn one_identity_collapses_single_argument() {
        assert_eq!(one_identity_collapse(vec![Expr::integer(5)]), Some(Expr::integer(5)));
        assert_eq!(one_identity_collapse(vec![Expr::integer(5), Expr::integer(6)]), None);
    }
}
