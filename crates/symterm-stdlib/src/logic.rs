//! `Not`/`And`/`Or` and the comparison family (`Equal`, `Unequal`, `SameQ`,
//! `UnsameQ`, `Less`, `Greater`, `LessEqual`, `GreaterEqual`).
//!
//! `Equal` and `SameQ` are implemented identically: `Expr`'s structural
//! equality already is the strict notion spec §9 asks for (`Integer` and
//! `Real` are never equal, `Real` compares bitwise), so there is no looser
//! cross-type numeric `Equal` to fall back to — see `DESIGN.md`.

use symterm_base::intern;
use symterm_kernel::eval::Evaluator;
use symterm_kernel::expr::Expr;
use symterm_kernel::symtab::Attribute;

pub(crate) fn register(evaluator: &Evaluator) {
    register_variadic_bool(evaluator, "And", and_native);
    register_variadic_bool(evaluator, "Or", or_native);
    register_unary_bool(evaluator, "Not", not_native);

    register_binary_any(evaluator, "Equal", equal_native);
    register_binary_any(evaluator, "Unequal", unequal_native);
    register_binary_any(evaluator, "SameQ", equal_native);
    register_binary_any(evaluator, "UnsameQ", unequal_native);

    register_binary_number(evaluator, "Less", less_native);
    register_binary_number(evaluator, "Greater", greater_native);
    register_binary_number(evaluator, "LessEqual", less_equal_native);
    register_binary_number(evaluator, "GreaterEqual", greater_equal_native);
}

fn boolean(b: bool) -> Expr {
    Expr::symbol(if b { "True" } else { "False" })
}

fn is_true(e: &Expr) -> bool {
    e.is_symbol_named("True")
}

fn register_variadic_bool(evaluator: &Evaluator, name: &str, f: symterm_kernel::registry::NativeFn) {
    let sym = intern(name);
    evaluator.set_attribute(sym, Attribute::Flat);
    evaluator.set_attribute(sym, Attribute::Orderless);
    evaluator.set_attribute(sym, Attribute::OneIdentity);
    let pattern = Expr::compound(
        Expr::from_symbol(sym),
        vec![Expr::call("BlankSequence", vec![Expr::symbol("Boolean")])],
    );
    evaluator.register_pattern(pattern, f).expect("logic patterns are always well-formed");
}

fn register_unary_bool(evaluator: &Evaluator, name: &str, f: symterm_kernel::registry::NativeFn) {
    let pattern = Expr::call(name, vec![Expr::call("Blank", vec![Expr::symbol("Boolean")])]);
    evaluator.register_pattern(pattern, f).expect("logic patterns are always well-formed");
}

fn register_binary_any(evaluator: &Evaluator, name: &str, f: symterm_kernel::registry::NativeFn) {
    let pattern = Expr::call(name, vec![Expr::call("Blank", vec![]), Expr::call("Blank", vec![])]);
    evaluator.register_pattern(pattern, f).expect("logic patterns are always well-formed");
}

fn register_binary_number(evaluator: &Evaluator, name: &str, f: symterm_kernel::registry::NativeFn) {
    let number = || Expr::call("Blank", vec![Expr::symbol("Number")]);
    evaluator.register_pattern(Expr::call(name, vec![number(), number()]), f).expect("logic patterns are always well-formed");
}

fn and_native(args: &[Expr]) -> Expr {
    boolean(args.iter().all(is_true))
}

fn or_native(args: &[Expr]) -> Expr {
    boolean(args.iter().any(is_true))
}

fn not_native(args: &[Expr]) -> Expr {
    boolean(!is_true(&args[0]))
}

fn equal_native(args: &[Expr]) -> Expr {
    boolean(args[0] == args[1])
}

fn unequal_native(args: &[Expr]) -> Expr {
    boolean(args[0] != args[1])
}

fn less_native(args: &[Expr]) -> Expr {
    boolean(args[0].as_real().unwrap() < args[1].as_real().unwrap())
}

fn greater_native(args: &[Expr]) -> Expr {
    boolean(args[0].as_real().unwrap() > args[1].as_real().unwrap())
}

fn less_equal_native(args: &[Expr]) -> Expr {
    boolean(args[0].as_real().unwrap() <= args[1].as_real().unwrap())
}

fn greater_equal_native(args: &[Expr]) -> Expr {
    boolean(args[0].as_real().unwrap() >= args[1].as_real().unwrap())
}
