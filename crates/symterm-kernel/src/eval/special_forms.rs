//! Forms the evaluator recognizes itself instead of dispatching through the
//! rule registry: `If`, `Evaluate`, `Set`/`SetDelayed`/`Unset`,
//! `CompoundStatement`, and `Replace`/`ReplaceAll`. Each needs scheduling
//! the attribute pipeline can't express — `If` holds exactly one of two
//! branches depending on a runtime value, `Set` needs its left-hand side
//! entirely unevaluated even though it has no attribute of its own, and
//! `Replace`/`ReplaceAll` build a child context on the fly from a match's
//! bindings. `Hold` needs none of this: it is seeded with the plain
//! `HoldAll` attribute in [`super::Evaluator::seed_builtin_symbols`] and
//! falls out of the ordinary no-rule-matched path.

use std::sync::Arc;

use symterm_base::{Symbol, SymbolEq};

use crate::context::Context;
use crate::expr::{CompoundData, Expr, ErrorKind};
use crate::pattern::{match_top, Bindings};
use crate::registry::Handler;

use super::{substitute, Evaluator};

impl Evaluator {
    /// Checked immediately after the head of a compound is resolved, before
    /// any hold/attribute/dispatch machinery runs. Returns `None` for any
    /// symbol that isn't one of the recognized special forms, in which case
    /// `step_compound` falls through to its normal pipeline.
    pub(super) fn try_special_form(&mut self, head: Symbol, raw_args: &[Expr]) -> Option<Expr> {
        if head.is("If") {
            return Some(self.if_form(raw_args));
        }
        if head.is("Evaluate") {
            return Some(self.eval_sequence("Evaluate", raw_args));
        }
        if head.is("CompoundStatement") {
            return Some(self.eval_sequence("CompoundStatement", raw_args));
        }
        if head.is("Set") {
            return Some(self.set_form(raw_args, false));
        }
        if head.is("SetDelayed") {
            return Some(self.set_form(raw_args, true));
        }
        if head.is("Unset") {
            return Some(self.unset_form(raw_args));
        }
        if head.is("Replace") {
            return Some(self.replace_form(raw_args, false));
        }
        if head.is("ReplaceAll") {
            return Some(self.replace_form(raw_args, true));
        }
        None
    }

    fn if_form(&mut self, args: &[Expr]) -> Expr {
        if args.len() != 2 && args.len() != 3 {
            return Expr::error(
                ErrorKind::ArgumentError,
                "If expects 2 or 3 arguments (cond, then, [else])",
                args.to_vec(),
            );
        }
        let cond = self.step(&args[0]);
        if let Some(err) = cond.as_error() {
            return self.attach_current_frame(Expr::Error(err.clone()));
        }
        if super::attributes::is_true(&cond) {
            self.step(&args[1])
        } else if cond.is_symbol_named("False") {
            match args.get(2) {
                Some(else_branch) => self.step(else_branch),
                None => Expr::symbol("Null"),
            }
        } else {
            // The condition hasn't settled to True/False yet; return a new
            // `If` with the partially-reduced condition so the next
            // fixed-point iteration can keep narrowing it down.
            let mut rest = vec![cond];
            rest.extend(args[1..].iter().cloned());
            Expr::call("If", rest)
        }
    }

    /// Shared body for `Evaluate` (force-evaluates every argument in turn)
    /// and `CompoundStatement` (evaluates every argument for effect, only
    /// the last one's value matters) — both are "evaluate each of these in
    /// order, return the last" with an empty-arglist fallback of `Null`.
    fn eval_sequence(&mut self, _name: &str, args: &[Expr]) -> Expr {
        let mut last = Expr::symbol("Null");
        for a in args {
            last = self.step(a);
            if last.as_error().is_some() {
                return self.attach_current_frame(last);
            }
        }
        last
    }

    fn set_form(&mut self, args: &[Expr], delayed: bool) -> Expr {
        if args.len() != 2 {
            let name = if delayed { "SetDelayed" } else { "Set" };
            return Expr::error(ErrorKind::ArgumentError, format!("{name} expects exactly 2 arguments"), args.to_vec());
        }
        let lhs = &args[0];
        let rhs = &args[1];
        match lhs {
            Expr::Sym(s) => {
                let value = if delayed { rhs.clone() } else { self.evaluate(rhs) };
                if value.as_error().is_some() {
                    return value;
                }
                self.ctx.set_var(*s, value.clone());
                if delayed {
                    Expr::symbol("Null")
                } else {
                    value
                }
            }
            Expr::Compound(c) => {
                let Some(head) = c.elements[0].as_symbol() else {
                    return Expr::error(
                        ErrorKind::TypeError,
                        "the left-hand side of Set/SetDelayed must have a symbol head",
                        vec![lhs.clone()],
                    );
                };
                let body = if delayed { rhs.clone() } else { self.evaluate(rhs) };
                if body.as_error().is_some() {
                    return body;
                }
                self.ctx.register_rule(head, lhs.clone(), Handler::User { body: body.clone(), delayed });
                if delayed {
                    Expr::symbol("Null")
                } else {
                    body
                }
            }
            _ => Expr::error(
                ErrorKind::ArgumentError,
                "the left-hand side of Set/SetDelayed must be a symbol or a compound pattern",
                vec![lhs.clone()],
            ),
        }
    }

    fn unset_form(&mut self, args: &[Expr]) -> Expr {
        if args.len() != 1 {
            return Expr::error(ErrorKind::ArgumentError, "Unset expects exactly 1 argument", args.to_vec());
        }
        match &args[0] {
            Expr::Sym(s) => {
                self.ctx.unset_var(*s);
                Expr::symbol("Null")
            }
            Expr::Compound(c) => {
                if let Some(head) = c.elements[0].as_symbol() {
                    self.ctx.unset_rule(head, &args[0]);
                }
                Expr::symbol("Null")
            }
            other => Expr::error(ErrorKind::ArgumentError, "Unset expects a symbol or a pattern", vec![other.clone()]),
        }
    }

    fn replace_form(&mut self, args: &[Expr], recursive: bool) -> Expr {
        let name = if recursive { "ReplaceAll" } else { "Replace" };
        if args.len() != 2 {
            return Expr::error(ErrorKind::ArgumentError, format!("{name} expects exactly 2 arguments"), args.to_vec());
        }
        let subject = self.evaluate(&args[0]);
        if subject.as_error().is_some() {
            return subject;
        }
        let Some((lhs, rhs, delayed)) = extract_rule(&args[1]) else {
            return Expr::error(
                ErrorKind::TypeError,
                format!("{name}'s second argument must be a Rule or RuleDelayed"),
                vec![args[1].clone()],
            );
        };
        if recursive {
            self.replace_all_recurse(&subject, &lhs, &rhs, delayed)
        } else {
            match match_top(&lhs, &subject, self.ctx.symtab()) {
                Some(bindings) => self.apply_rule_body(&rhs, bindings, delayed),
                None => subject,
            }
        }
    }

    fn replace_all_recurse(&mut self, e: &Expr, lhs: &Expr, rhs: &Expr, delayed: bool) -> Expr {
        if let Some(bindings) = match_top(lhs, e, self.ctx.symtab()) {
            return self.apply_rule_body(rhs, bindings, delayed);
        }
        if let Expr::Compound(c) = e {
            let elements: Vec<Expr> =
                c.elements.iter().map(|el| self.replace_all_recurse(el, lhs, rhs, delayed)).collect();
            Expr::Compound(Arc::new(CompoundData { elements }))
        } else {
            e.clone()
        }
    }

    /// Instantiates a matched rule's replacement body per spec §4.6.f:
    /// `Rule` substitutes the bindings into `rhs` and evaluates the result
    /// under the *current* context (free symbols resolve normally);
    /// `RuleDelayed` instead evaluates `rhs` as-is under a child context
    /// whose only bindings are the pattern variables, so they shadow
    /// same-named globals for exactly the duration of this replacement.
    fn apply_rule_body(&mut self, rhs: &Expr, bindings: Bindings, delayed: bool) -> Expr {
        if delayed {
            let child = Context::child_with_bindings(&self.ctx, bindings);
            self.with_context(child, |ev| ev.evaluate(rhs))
        } else {
            let substituted = substitute(rhs, &bindings);
            self.evaluate(&substituted)
        }
    }
}

/// Recognizes `Rule(lhs, rhs)` / `RuleDelayed(lhs, rhs)` and returns
/// `(lhs, rhs, is_delayed)`, or `None` if `e` is neither.
fn extract_rule(e: &Expr) -> Option<(Expr, Expr, bool)> {
    let c = e.as_compound()?;
    if c.elements.len() != 3 {
        return None;
    }
    let name = c.elements[0].as_symbol()?;
    if name.is("Rule") {
        Some((c.elements[1].clone(), c.elements[2].clone(), false))
    } else if name.is("RuleDelayed") {
        Some((c.elements[1].clone(), c.elements[2].clone(), true))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::super::Evaluator;
    use crate::expr::Expr;

    #[test]
    fn if_true_evaluates_only_then_branch() {
        let mut ev = Evaluator::new();
        let result = ev.evaluate(&Expr::call(
            "If",
            vec![Expr::symbol("True"), Expr::integer(1), Expr::integer(2)],
        ));
        assert_eq!(result, Expr::integer(1));
    }

    #[test]
    fn if_false_evaluates_only_else_branch() {
        let mut ev = Evaluator::new();
        let result = ev.evaluate(&Expr::call(
            "If",
            vec![Expr::symbol("False"), Expr::integer(1), Expr::integer(2)],
        ));
        assert_eq!(result, Expr::integer(2));
    }

    #[test]
    fn if_false_with_no_else_returns_null() {
        let mut ev = Evaluator::new();
        let result =
            ev.evaluate(&Expr::call("If", vec![Expr::symbol("False"), Expr::integer(1)]));
        assert_eq!(result, Expr::symbol("Null"));
    }

    #[test]
    fn compound_statement_discards_all_but_last() {
        let mut ev = Evaluator::new();
        let x = symterm_base::intern("special_forms_test_x");
        let result = ev.evaluate(&Expr::call(
            "CompoundStatement",
            vec![
                Expr::call("Set", vec![Expr::Sym(x), Expr::integer(5)]),
                Expr::integer(99),
            ],
        ));
        assert_eq!(result, Expr::integer(99));
        assert_eq!(ev.context().get_var(x), Some(Expr::integer(5)));
    }

    #[test]
    fn set_binds_symbol_and_returns_the_value() {
        let mut ev = Evaluator::new();
        let x = symterm_base::intern("special_forms_test_set_x");
        let result = ev.evaluate(&Expr::call("Set", vec![Expr::Sym(x), Expr::integer(7)]));
        assert_eq!(result, Expr::integer(7));
        assert_eq!(ev.context().get_var(x), Some(Expr::integer(7)));
    }

    #[test]
    fn set_delayed_returns_null_not_the_body() {
        let mut ev = Evaluator::new();
        let x = symterm_base::intern("special_forms_test_setdelayed_x");
        let result = ev.evaluate(&Expr::call("SetDelayed", vec![Expr::Sym(x), Expr::integer(7)]));
        assert_eq!(result, Expr::symbol("Null"));
        assert_eq!(ev.context().get_var(x), Some(Expr::integer(7)));
    }

    #[test]
    fn unset_removes_a_symbol_binding() {
        let mut ev = Evaluator::new();
        let x = symterm_base::intern("special_forms_test_unset_x");
        ev.evaluate(&Expr::call("Set", vec![Expr::Sym(x), Expr::integer(1)]));
        ev.evaluate(&Expr::call("Unset", vec![Expr::Sym(x)]));
        assert_eq!(ev.context().get_var(x), None);
    }

    #[test]
    fn factorial_via_set_delayed_recursion() {
        let mut ev = Evaluator::new();
        let factorial = symterm_base::intern("special_forms_test_factorial");
        let times = symterm_base::intern("special_forms_test_times");
        let minus = symterm_base::intern("special_forms_test_minus");
        ev.set_attribute(times, crate::symtab::Attribute::Flat);
        ev.register_pattern(
            Expr::compound(Expr::Sym(times), vec![Expr::call("Blank", vec![]), Expr::call("Blank", vec![])]),
            |args| match (args[0].as_integer(), args[1].as_integer()) {
                (Some(a), Some(b)) => Expr::integer(a * b),
                _ => Expr::compound(Expr::symbol("special_forms_test_times"), args.to_vec()),
            },
        )
        .unwrap();
        ev.register_pattern(
            Expr::compound(Expr::Sym(minus), vec![Expr::call("Blank", vec![]), Expr::call("Blank", vec![])]),
            |args| match (args[0].as_integer(), args[1].as_integer()) {
                (Some(a), Some(b)) => Expr::integer(a - b),
                _ => Expr::compound(Expr::symbol("special_forms_test_minus"), args.to_vec()),
            },
        )
        .unwrap();

        // factorial(0) := 1
        let zero_pat = Expr::compound(Expr::Sym(factorial), vec![Expr::integer(0)]);
        ev.evaluate(&Expr::call("SetDelayed", vec![zero_pat, Expr::integer(1)]));

        // factorial(n_) := n * factorial(n - 1)
        let n_pat = Expr::call("Pattern", vec![Expr::symbol("n"), Expr::call("Blank", vec![])]);
        let lhs = Expr::compound(Expr::Sym(factorial), vec![n_pat]);
        let rhs = Expr::compound(
            Expr::Sym(times),
            vec![
                Expr::symbol("n"),
                Expr::compound(
                    Expr::Sym(factorial),
                    vec![Expr::compound(Expr::Sym(minus), vec![Expr::symbol("n"), Expr::integer(1)])],
                ),
            ],
        );
        ev.evaluate(&Expr::call("SetDelayed", vec![lhs, rhs]));

        let call = Expr::compound(Expr::Sym(factorial), vec![Expr::integer(5)]);
        assert_eq!(ev.evaluate(&call), Expr::integer(120));
    }

    #[test]
    fn replace_matches_top_level_only() {
        let mut ev = Evaluator::new();
        let rule = Expr::call("Rule", vec![Expr::integer(1), Expr::integer(99)]);
        let subject = Expr::call("f", vec![Expr::integer(1)]);
        let result = ev.evaluate(&Expr::call("Replace", vec![subject.clone(), rule]));
        // 1 only appears nested inside f(1), not at the top level, so Replace
        // (one level only) leaves the expression untouched.
        assert_eq!(result, subject);
    }

    #[test]
    fn replace_all_rewrites_nested_occurrences() {
        let mut ev = Evaluator::new();
        let rule = Expr::call("Rule", vec![Expr::integer(1), Expr::integer(99)]);
        let subject = Expr::call("f", vec![Expr::integer(1), Expr::integer(2)]);
        let result = ev.evaluate(&Expr::call("ReplaceAll", vec![subject, rule]));
        assert_eq!(result, Expr::call("f", vec![Expr::integer(99), Expr::integer(2)]));
    }

    #[test]
    fn rule_delayed_replacement_is_lexically_scoped() {
        let mut ev = Evaluator::new();
        let y = symterm_base::intern("special_forms_test_y");
        ev.evaluate(&Expr::call("Set", vec![Expr::Sym(y), Expr::integer(999)]));
        let y_pat = Expr::call("Pattern", vec![Expr::Sym(y), Expr::call("Blank", vec![])]);
        let rule = Expr::call(
            "RuleDelayed",
            vec![y_pat, Expr::call("special_forms_test_plus", vec![Expr::Sym(y), Expr::integer(1)])],
        );
        let plus = symterm_base::intern("special_forms_test_plus");
        ev.register_pattern(
            Expr::compound(Expr::Sym(plus), vec![Expr::call("Blank", vec![]), Expr::call("Blank", vec![])]),
            |args| match (args[0].as_integer(), args[1].as_integer()) {
                (Some(a), Some(b)) => Expr::integer(a + b),
                _ => Expr::compound(Expr::symbol("special_forms_test_plus"), args.to_vec()),
            },
        )
        .unwrap();
        let result = ev.evaluate(&Expr::call("Replace", vec![Expr::integer(5), rule]));
        assert_eq!(result, Expr::integer(6));
        // The global y = 999 binding is untouched by the replacement's
        // lexically-scoped shadow.
        assert_eq!(ev.context().get_var(y), Some(Expr::integer(999)));
    }
}
