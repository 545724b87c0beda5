//! A pure function from pattern shape to a specificity score, used to sort
//! competing rules for the same head so the registry always tries the most
//! specific match first. The absolute numbers mean nothing; only the
//! relative order matters, and it is fixed forever by this function alone
//! (no tie-break against the runtime value being matched).
//!
//! Ranking, most to least specific:
//!   1. a literal atom or literal compound shape
//!   2. a typed `Blank` (`x_Integer`)
//!   3. an untyped `Blank` (`x_`)
//!   4. a typed `BlankSequence` (`x__Integer`)
//!   5. an untyped `BlankSequence` (`x__`)
//!   6. a typed `BlankNullSequence` (`x___Integer`)
//!   7. an untyped `BlankNullSequence` (`x___`)
//! A `Pattern(name, sub)` wrapper (the named-capture form `x_Integer`
//! desugars to) takes its sub-pattern's score unchanged: naming a capture
//! doesn't make it more or less specific. A compound pattern's score is the
//! sum of its elements' scores (head included) plus a bonus proportional to
//! its argument count, so `f(1, 2)` outranks `f(x_, y_)` which outranks
//! `f(x_, y_, z_)`'s less-constrained sibling patterns of lower arity.

use symterm_base::SymbolEq;

use crate::expr::Expr;

const LITERAL: u64 = 1_000_000;
const BLANK_TYPED: u64 = 700_000;
const BLANK_UNTYPED: u64 = 600_000;
const BLANK_SEQ_TYPED: u64 = 500_000;
const BLANK_SEQ_UNTYPED: u64 = 400_000;
const BLANK_NULL_TYPED: u64 = 300_000;
const BLANK_NULL_UNTYPED: u64 = 200_000;
const COMPOUND_BASE: u64 = 800_000;
const ARG_COUNT_BONUS: u64 = 1_000;

/// Scores a pattern expression. See the module documentation for the order
/// this induces.
pub fn specificity(pattern: &Expr) -> u64 {
    match pattern {
        Expr::Integer(_) | Expr::Real(_) | Expr::Str(_) => LITERAL,
        Expr::Sym(_) => LITERAL,
        Expr::Object(_) | Expr::Error(_) => LITERAL,
        Expr::Compound(c) => {
            let head = &c.elements[0];
            let args = &c.elements[1..];
            if let Some(name) = head.as_symbol() {
                if name.is("Blank") {
                    return blank_score(args);
                }
                if name.is("BlankSequence") {
                    return blank_sequence_score(args);
                }
                if name.is("BlankNullSequence") {
                    return blank_null_sequence_score(args);
                }
                if name.is("Pattern") && args.len() == 2 {
                    return specificity(&args[1]);
                }
            }
            // Average rather than sum the sub-pattern scores: summing would
            // make every additional loosely-typed argument (each worth
            // hundreds of thousands on its own) outweigh the arity bonus
            // below, so a longer, equally-unconstrained pattern would always
            // outrank a shorter one. Averaging keeps the score anchored to
            // "how constrained is a typical argument here" and lets
            // `ARG_COUNT_BONUS` do the (comparatively small) work of
            // breaking ties by arity among similarly-constrained patterns.
            let sum: u64 = c.elements.iter().map(specificity).sum();
            let avg = sum / c.elements.len() as u64;
            COMPOUND_BASE + avg + (args.len() as u64) * ARG_COUNT_BONUS
        }
    }
}

fn blank_score(args: &[Expr]) -> u64 {
    if args.is_empty() {
        BLANK_UNTYPED
    } else {
        BLANK_TYPED
    }
}

fn blank_sequence_score(args: &[Expr]) -> u64 {
    if args.is_empty() {
        BLANK_SEQ_UNTYPED
    } else {
        BLANK_SEQ_TYPED
    }
}

fn blank_null_sequence_score(args: &[Expr]) -> u64 {
    if args.is_empty() {
        BLANK_NULL_UNTYPED
    } else {
        BLANK_NULL_TYPED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> Expr {
        Expr::call("Blank", vec![])
    }
    fn typed_blank(t: &str) -> Expr {
        Expr::call("Blank", vec![Expr::symbol(t)])
    }
    fn blank_seq() -> Expr {
        Expr::call("BlankSequence", vec![])
    }
    fn blank_null_seq() -> Expr {
        Expr::call("BlankNullSequence", vec![])
    }
    fn named(name: &str, p: Expr) -> Expr {
        Expr::call("Pattern", vec![Expr::symbol(name), p])
    }

    #[test]
    fn literal_beats_typed_blank() {
        assert!(specificity(&Expr::integer(5)) > specificity(&typed_blank("Integer")));
    }

    #[test]
    fn typed_blank_beats_untyped_blank() {
        assert!(specificity(&typed_blank("Integer")) > specificity(&blank()));
    }

    #[test]
    fn blank_beats_blank_sequence_beats_blank_null_sequence() {
        assert!(specificity(&blank()) > specificity(&blank_seq()));
        assert!(specificity(&blank_seq()) > specificity(&blank_null_seq()));
    }

    #[test]
    fn naming_a_pattern_does_not_change_its_score() {
        assert_eq!(specificity(&named("x", blank())), specificity(&blank()));
        assert_eq!(specificity(&named("x", typed_blank("Integer"))), specificity(&typed_blank("Integer")));
    }

    #[test]
    fn more_literal_arguments_outrank_fewer() {
        let two_literal = Expr::call("f", vec![Expr::integer(1), Expr::integer(2)]);
        let two_blanks = Expr::call("f", vec![named("x", blank()), named("y", blank())]);
        let three_blanks =
            Expr::call("f", vec![named("x", blank()), named("y", blank()), named("z", blank())]);
        assert!(specificity(&two_literal) > specificity(&two_blanks));
        assert!(specificity(&two_blanks) > specificity(&three_blanks));
    }
}
