//! Native `RegisterPattern` handlers for symterm: the external standard-
//! library functions spec §1 explicitly places out of the kernel's scope.
//! Every handler here is a plain `fn(&[Expr]) -> Expr` — [`NativeFn`][nf] is
//! a function-pointer type, not a boxed closure, so none of these capture
//! state; all of it lives in the `Evaluator`'s own context.
//!
//! [nf]: symterm_kernel::registry::NativeFn

pub mod arithmetic;
pub mod association;
pub mod byte_array;
pub mod list;
pub mod logic;

use symterm_kernel::eval::Evaluator;

/// Registers every native handler this crate provides against `evaluator`'s
/// root context. Idempotent only in the sense `RegisterPattern` itself is:
/// calling it twice on the same evaluator re-registers identical patterns,
/// which the registry's register-replaces-on-identical-pattern rule already
/// makes a harmless no-op.
pub fn register_all(evaluator: &Evaluator) {
    arithmetic::register(evaluator);
    logic::register(evaluator);
    list::register(evaluator);
    association::register(evaluator);
    byte_array::register(evaluator);
}

#[cfg(test)]
mod tests {
    use super::*;
    use symterm_kernel::expr::Expr;

    #[test]
    fn factorial_via_set_delayed_and_times() {
        let mut e = Evaluator::new();
        register_all(&e);
        let n_pat = Expr::call("Pattern", vec![Expr::symbol("n"), Expr::call("Blank", vec![])]);
        e.evaluate(&Expr::call(
            "SetDelayed",
            vec![Expr::call("factorial", vec![Expr::integer(0)]), Expr::integer(1)],
        ));
        e.evaluate(&Expr::call(
            "SetDelayed",
            vec![
                Expr::call("factorial", vec![n_pat]),
                Expr::call(
                    "Times",
                    vec![Expr::symbol("n"), Expr::call("factorial", vec![Expr::call("Subtract", vec![Expr::symbol("n"), Expr::integer(1)])])],
                ),
            ],
        ));
        let result = e.evaluate(&Expr::call("factorial", vec![Expr::integer(5)]));
        assert_eq!(result, Expr::integer(120));
    }

    #[test]
    fn if_picks_the_matching_branch() {
        let mut e = Evaluator::new();
        register_all(&e);
        let plus = |a, b| Expr::call("Plus", vec![a, b]);
        let times = |a, b| Expr::call("Times", vec![a, b]);
        let cond = Expr::call("If", vec![Expr::symbol("True"), plus(Expr::integer(1), Expr::integer(2)), times(Expr::integer(3), Expr::integer(4))]);
        assert_eq!(e.evaluate(&cond), Expr::integer(3));
    }
}
