//! Drives the concrete end-to-end scenarios against hand-built `Expr` trees
//! plus `symterm-stdlib`'s native handlers, exercising the kernel's contract
//! the way a real embedder (one that supplies its own stdlib) would.

use symterm_kernel::eval::Evaluator;
use symterm_kernel::expr::{Expr, ErrorKind, ObjectPayload, Association};

fn evaluator() -> Evaluator {
    let e = Evaluator::new();
    symterm_stdlib::register_all(&e);
    e
}

#[test]
fn plus_flattens_orderless_and_collapses_to_an_integer() {
    let mut e = evaluator();
    let nested = Expr::call("Plus", vec![Expr::integer(1), Expr::call("Plus", vec![Expr::integer(2), Expr::integer(3)])]);
    assert_eq!(e.evaluate(&nested), Expr::integer(6));
}

#[test]
fn plus_sorts_symbolic_arguments_into_canonical_order() {
    let mut e = evaluator();
    let expr = Expr::call("Plus", vec![Expr::symbol("c"), Expr::symbol("a"), Expr::symbol("b")]);
    assert_eq!(e.evaluate(&expr), Expr::call("Plus", vec![Expr::symbol("a"), Expr::symbol("b"), Expr::symbol("c")]));
}

#[test]
fn user_function_dispatch_via_set_delayed() {
    let mut e = evaluator();
    let x_pat = Expr::call("Pattern", vec![Expr::symbol("x"), Expr::call("Blank", vec![])]);
    e.evaluate(&Expr::call(
        "SetDelayed",
        vec![
            Expr::compound(Expr::symbol("f"), vec![x_pat]),
            Expr::call("Plus", vec![Expr::symbol("x"), Expr::integer(1)]),
        ],
    ));
    assert_eq!(e.evaluate(&Expr::call("f", vec![Expr::integer(5)])), Expr::integer(6));
}

#[test]
fn factorial_recurses_to_a_fixed_point() {
    let mut e = evaluator();
    let n_pat = Expr::call("Pattern", vec![Expr::symbol("n"), Expr::call("Blank", vec![])]);
    e.evaluate(&Expr::call("SetDelayed", vec![Expr::call("factorial", vec![Expr::integer(0)]), Expr::integer(1)]));
    e.evaluate(&Expr::call(
        "SetDelayed",
        vec![
            Expr::call("factorial", vec![n_pat]),
            Expr::call(
                "Times",
                vec![
                    Expr::symbol("n"),
                    Expr::call("factorial", vec![Expr::call("Subtract", vec![Expr::symbol("n"), Expr::integer(1)])]),
                ],
            ),
        ],
    ));
    assert_eq!(e.evaluate(&Expr::call("factorial", vec![Expr::integer(5)])), Expr::integer(120));
}

#[test]
fn replace_delayed_rule_uses_lexical_scoping_not_global_y() {
    let mut e = evaluator();
    e.evaluate(&Expr::call("Set", vec![Expr::symbol("y"), Expr::integer(999)]));
    let rule = Expr::call(
        "RuleDelayed",
        vec![
            Expr::call("Pattern", vec![Expr::symbol("y"), Expr::call("Blank", vec![])]),
            Expr::call("Plus", vec![Expr::symbol("y"), Expr::integer(1)]),
        ],
    );
    let result = e.evaluate(&Expr::call("Replace", vec![Expr::integer(5), rule]));
    assert_eq!(result, Expr::integer(6));
}

#[test]
fn if_evaluates_only_the_chosen_branch() {
    let mut e = evaluator();
    let plus = Expr::call("Plus", vec![Expr::integer(1), Expr::integer(2)]);
    let times = Expr::call("Times", vec![Expr::integer(3), Expr::integer(4)]);
    assert_eq!(e.evaluate(&Expr::call("If", vec![Expr::symbol("True"), plus.clone(), times.clone()])), Expr::integer(3));
    assert_eq!(e.evaluate(&Expr::call("If", vec![Expr::symbol("False"), plus, times])), Expr::integer(12));
}

#[test]
fn association_indexing_via_part() {
    let mut e = evaluator();
    let mut assoc = Association::new();
    assoc.insert(Expr::string("a"), Expr::integer(1));
    assoc.insert(Expr::string("b"), Expr::integer(2));
    let obj = Expr::object(symterm_base::intern("Association"), ObjectPayload::Association(assoc));
    assert_eq!(e.evaluate(&Expr::call("Part", vec![obj, Expr::string("a")])), Expr::integer(1));

    let empty = Expr::object(symterm_base::intern("Association"), ObjectPayload::Association(Association::new()));
    let result = e.evaluate(&Expr::call("Part", vec![empty, Expr::string("missing")]));
    assert_eq!(result.as_error().unwrap().kind, ErrorKind::IndexError);
}

#[test]
fn division_by_zero_attaches_a_divide_frame() {
    let mut e = evaluator();
    let result = e.evaluate(&Expr::call("Divide", vec![Expr::integer(1), Expr::integer(0)]));
    let err = result.as_error().unwrap();
    assert_eq!(err.kind, ErrorKind::DivisionByZero);
    assert!(err.frames.iter().any(|f| symterm_base::resolve(f.function).as_ref() == "Divide"));
}

#[test]
fn slice_range_and_negative_index_into_a_list() {
    let mut e = evaluator();
    let list = Expr::list((1..=5).map(Expr::integer).collect());
    let sliced = e.evaluate(&Expr::call("SliceRange", vec![list.clone(), Expr::integer(2), Expr::integer(4)]));
    assert_eq!(sliced, Expr::list(vec![Expr::integer(2), Expr::integer(3), Expr::integer(4)]));
    assert_eq!(e.evaluate(&Expr::call("Part", vec![list, Expr::integer(-1)])), Expr::integer(5));
}

#[test]
fn rotate_left_and_rotate_right() {
    let mut e = evaluator();
    let list = Expr::list((1..=5).map(Expr::integer).collect());
    let rotated = e.evaluate(&Expr::call("RotateLeft", vec![list, Expr::integer(2)]));
    assert_eq!(rotated, Expr::list(vec![Expr::integer(3), Expr::integer(4), Expr::integer(5), Expr::integer(1), Expr::integer(2)]));
    let rotated_str = e.evaluate(&Expr::call("RotateRight", vec![Expr::string("hello"), Expr::integer(1)]));
    assert_eq!(rotated_str, Expr::string("ohell"));
}

#[test]
fn evaluation_stack_returns_to_zero_depth_after_recursion() {
    let mut e = evaluator();
    let n_pat = Expr::call("Pattern", vec![Expr::symbol("n"), Expr::call("Blank", vec![])]);
    e.evaluate(&Expr::call("SetDelayed", vec![Expr::call("countdown", vec![Expr::integer(0)]), Expr::integer(0)]));
    e.evaluate(&Expr::call(
        "SetDelayed",
        vec![
            Expr::call("countdown", vec![n_pat]),
            Expr::call("countdown", vec![Expr::call("Subtract", vec![Expr::symbol("n"), Expr::integer(1)])]),
        ],
    ));
    assert_eq!(e.evaluate(&Expr::call("countdown", vec![Expr::integer(50)])), Expr::integer(0));
}

#[test]
fn two_independent_evaluators_cannot_see_each_others_bindings() {
    let mut a = evaluator();
    let b = evaluator();
    a.evaluate(&Expr::call("Set", vec![Expr::symbol("isolated_x"), Expr::integer(1)]));
    assert_eq!(b.context().get_var(symterm_base::intern("isolated_x")), None);
}
