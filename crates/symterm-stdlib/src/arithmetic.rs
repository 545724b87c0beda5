//! `Plus`, `Subtract`, `Times`, `Divide`, `Power`, `Minus`: the numeric
//! primitives the surface syntax's arithmetic operators fold into (spec §6).
//! `Plus`/`Times` are variadic and registered with `Flat`/`Orderless`/
//! `OneIdentity` so the evaluator itself flattens and sorts nested calls
//! before a single native handler ever runs; the handler only has to decide
//! whether every argument is numeric, never how to re-associate them.

use symterm_base::{intern, SymbolEq};
use symterm_kernel::eval::Evaluator;
use symterm_kernel::expr::{Expr, ErrorKind};
use symterm_kernel::symtab::Attribute;

pub(crate) fn register(evaluator: &Evaluator) {
    register_variadic(evaluator, "Plus", plus_native, &[Attribute::Flat, Attribute::Orderless, Attribute::OneIdentity]);
    register_variadic(evaluator, "Times", times_native, &[Attribute::Flat, Attribute::Orderless, Attribute::OneIdentity]);
    register_binary(evaluator, "Subtract", subtract_native);
    register_binary(evaluator, "Divide", divide_native);
    register_binary(evaluator, "Power", power_native);
    register_unary(evaluator, "Minus", minus_native);
}

fn number_blank() -> Expr {
    Expr::call("Blank", vec![Expr::symbol("Number")])
}

fn register_variadic(evaluator: &Evaluator, name: &str, f: symterm_kernel::registry::NativeFn, attrs: &[Attribute]) {
    let sym = intern(name);
    for attr in attrs {
        evaluator.set_attribute(sym, *attr);
    }
    let pattern = Expr::compound(Expr::from_symbol(sym), vec![Expr::call("BlankSequence", vec![Expr::symbol("Number")])]);
    evaluator.register_pattern(pattern, f).expect("arithmetic patterns are always well-formed");
}

fn register_binary(evaluator: &Evaluator, name: &str, f: symterm_kernel::registry::NativeFn) {
    let pattern = Expr::call(name, vec![number_blank(), number_blank()]);
    evaluator.register_pattern(pattern, f).expect("arithmetic patterns are always well-formed");
}

fn register_unary(evaluator: &Evaluator, name: &str, f: symterm_kernel::registry::NativeFn) {
    let pattern = Expr::call(name, vec![number_blank()]);
    evaluator.register_pattern(pattern, f).expect("arithmetic patterns are always well-formed");
}

/// Folds a run of numeric arguments per the spec's contract: stays
/// `Integer` unless a `Real` is present, in which case the whole sum/product
/// is a `Real`.
fn fold_numeric(args: &[Expr], identity: i64, op_i: fn(i64, i64) -> i64, op_f: fn(f64, f64) -> f64) -> Expr {
    let any_real = args.iter().any(|a| matches!(a, Expr::Real(_)));
    if any_real {
        let total = args.iter().filter_map(Expr::as_real).fold(identity as f64, op_f);
        Expr::real(total)
    } else {
        let total = args.iter().filter_map(Expr::as_integer).fold(identity, op_i);
        Expr::integer(total)
    }
}

fn plus_native(args: &[Expr]) -> Expr {
    fold_numeric(args, 0, |a, b| a + b, |a, b| a + b)
}

fn times_native(args: &[Expr]) -> Expr {
    fold_numeric(args, 1, |a, b| a * b, |a, b| a * b)
}

fn subtract_native(args: &[Expr]) -> Expr {
    match (&args[0], &args[1]) {
        (Expr::Integer(a), Expr::Integer(b)) => Expr::integer(a - b),
        _ => Expr::real(args[0].as_real().unwrap() - args[1].as_real().unwrap()),
    }
}

fn divide_native(args: &[Expr]) -> Expr {
    let divisor = args[1].as_real().unwrap();
    if divisor == 0.0 {
        return Expr::error(ErrorKind::DivisionByZero, "division by zero", vec![args[0].clone(), args[1].clone()]);
    }
    match (&args[0], &args[1]) {
        (Expr::Integer(a), Expr::Integer(b)) if a % b == 0 => Expr::integer(a / b),
        _ => Expr::real(args[0].as_real().unwrap() / divisor),
    }
}

/// `^` always returns `Real`, per spec §9's resolved open question.
fn power_native(args: &[Expr]) -> Expr {
    Expr::real(args[0].as_real().unwrap().powf(args[1].as_real().unwrap()))
}

fn minus_native(args: &[Expr]) -> Expr {
    match &args[0] {
        Expr::Integer(v) => Expr::integer(-v),
        _ => Expr::real(-args[0].as_real().unwrap()),
    }
}
