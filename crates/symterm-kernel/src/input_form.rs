//! `InputForm`: the pretty, round-trippable renderer (distinct from
//! [`crate::expr::canonical_string`], which is stable/injective but not
//! meant to be re-parsed). `render` special-cases `List`, `Association`
//! `Rule` pairs, and the infix arithmetic/comparison/logical operators from
//! spec §6 so that `symterm-syntax::parse(&input_form::render(&e)) == e` for
//! every `e` that doesn't contain a `Real` NaN (per spec §8 property 7).
//!
//! Precedence and associativity mirror spec §6's table, low to high: `;`,
//! `:`, `||`, `&&`, `==`/`!=`/`===`/`=!=`, `<`/`>`/`<=`/`>=`, `+`/`-`,
//! `*`/`/`, unary `+`/`-`/`!`, `^` (right-associative). A child expression is
//! wrapped in parentheses whenever its own precedence would otherwise bind
//! more loosely than the slot it's rendered into — the same ad-hoc,
//! hand-written parenthesization `term.rs`'s `Display` impl uses for `Pi`
//! vs. arrow types, generalized to a numeric precedence table instead of a
//! single special case.

use symterm_base::{resolve, SymbolEq};

use crate::expr::{Expr, ObjectPayload};

/// Renders `e` in round-trippable surface syntax.
pub fn render(e: &Expr) -> String {
    let mut out = String::new();
    write_expr(e, 0, &mut out);
    out
}

/// Binary infix operators, in ascending precedence. `(symbol, token,
/// precedence, right_associative)`.
fn infix_op(name: &str) -> Option<(&'static str, u8, bool)> {
    Some(match name {
        "Rule" => (":", 2, false),
        "Or" => ("||", 3, false),
        "And" => ("&&", 4, false),
        "Equal" => ("==", 5, false),
        "Unequal" => ("!=", 5, false),
        "SameQ" => ("===", 5, false),
        "UnsameQ" => ("=!=", 5, false),
        "Less" => ("<", 6, false),
        "Greater" => (">", 6, false),
        "LessEqual" => ("<=", 6, false),
        "GreaterEqual" => (">=", 6, false),
        "Plus" => ("+", 7, false),
        "Subtract" => ("-", 7, false),
        "Times" => ("*", 8, false),
        "Divide" => ("/", 8, false),
        "Power" => ("^", 10, true),
        _ => return None,
    })
}

const UNARY_PRECEDENCE: u8 = 9;

fn write_expr(e: &Expr, min_precedence: u8, out: &mut String) {
    match e {
        Expr::Integer(_) | Expr::Real(_) | Expr::Str(_) | Expr::Sym(_) => write_atom(e, out),
        Expr::Object(o) => write_object(o, out),
        Expr::Error(err) => write_error(err, out),
        Expr::Compound(c) => write_compound(&c.elements, min_precedence, out),
    }
}

fn write_atom(e: &Expr, out: &mut String) {
    use std::fmt::Write;
    match e {
        Expr::Integer(v) => {
            let _ = write!(out, "{v}");
        }
        Expr::Real(v) => {
            if *v == v.trunc() && v.is_finite() {
                let _ = write!(out, "{v:.1}");
            } else {
                let _ = write!(out, "{v}");
            }
        }
        Expr::Str(s) => {
            out.push('"');
            for c in s.as_str().chars() {
                match c {
                    '"' => out.push_str("\\\""),
                    '\\' => out.push_str("\\\\"),
                    '\n' => out.push_str("\\n"),
                    '\t' => out.push_str("\\t"),
                    '\r' => out.push_str("\\r"),
                    _ => out.push(c),
                }
            }
            out.push('"');
        }
        Expr::Sym(s) => out.push_str(&resolve(*s)),
        _ => unreachable!("write_atom only called for atom variants"),
    }
}

fn write_object(o: &crate::expr::ObjectData, out: &mut String) {
    match &o.payload {
        ObjectPayload::Association(assoc) => {
            out.push('{');
            for (i, (k, v)) in assoc.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(k, 0, out);
                out.push_str(": ");
                write_expr(v, 0, out);
            }
            out.push('}');
        }
        ObjectPayload::ByteArray(bytes) => {
            out.push_str("ByteArray(");
            for (i, b) in bytes.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&b.to_string());
            }
            out.push(')');
        }
    }
}

fn write_error(err: &crate::expr::ErrorData, out: &mut String) {
    out.push_str("$Failed(");
    out.push_str(err.kind.name());
    out.push_str(", \"");
    out.push_str(&err.message);
    out.push('"');
    for a in &err.args {
        out.push_str(", ");
        write_expr(a, 0, out);
    }
    out.push(')');
}

fn write_compound(elements: &[Expr], min_precedence: u8, out: &mut String) {
    let head = &elements[0];
    let args = &elements[1..];

    if let Some(name) = head.as_symbol() {
        let name_str = resolve(name);

        if name.is("List") {
            out.push('[');
            for (i, a) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(a, 0, out);
            }
            out.push(']');
            return;
        }

        if name.is("Minus") && args.len() == 1 {
            let needs_parens = min_precedence > UNARY_PRECEDENCE;
            if needs_parens {
                out.push('(');
            }
            out.push('-');
            write_expr(&args[0], UNARY_PRECEDENCE, out);
            if needs_parens {
                out.push(')');
            }
            return;
        }
        if name.is("Not") && args.len() == 1 {
            let needs_parens = min_precedence > UNARY_PRECEDENCE;
            if needs_parens {
                out.push('(');
            }
            out.push('!');
            write_expr(&args[0], UNARY_PRECEDENCE, out);
            if needs_parens {
                out.push(')');
            }
            return;
        }

        if args.len() == 2 {
            if let Some((token, prec, right_assoc)) = infix_op(&name_str) {
                let needs_parens = prec < min_precedence;
                if needs_parens {
                    out.push('(');
                }
                let (left_min, right_min) =
                    if right_assoc { (prec + 1, prec) } else { (prec, prec + 1) };
                write_expr(&args[0], left_min, out);
                out.push(' ');
                out.push_str(token);
                out.push(' ');
                write_expr(&args[1], right_min, out);
                if needs_parens {
                    out.push(')');
                }
                return;
            }
        }
    }

    // General call form: Head(a, b, ...).
    write_expr(head, UNARY_PRECEDENCE + 1, out);
    out.push('(');
    for (i, a) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_expr(a, 0, out);
    }
    out.push(')');
}
