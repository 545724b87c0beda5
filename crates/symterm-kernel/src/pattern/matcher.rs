//! The matcher: walks a pattern and a value in lockstep, backtracking over
//! where a sequence pattern's greedy span ends, and over argument order
//! when the dispatched head is `Orderless`.
//!
//! Matching never mutates the expressions it walks; a successful match
//! produces a fresh [`Bindings`] map from pattern-variable symbol to the
//! sub-expression it captured (sequence variables bind to a `List` of
//! whatever they spanned).

use std::collections::HashMap;

use symterm_base::{Symbol, SymbolEq};

use crate::expr::Expr;
use crate::symtab::SymbolTable;

/// Pattern-variable bindings produced by a successful match.
pub type Bindings = HashMap<Symbol, Expr>;

/// Attempts to match `pattern` against `value` with no pre-existing
/// bindings. Returns the captured bindings on success.
pub fn match_top(pattern: &Expr, value: &Expr, symtab: &SymbolTable) -> Option<Bindings> {
    match_pattern(pattern, value, &Bindings::new(), symtab)
}

/// Attempts to match `pattern` against `value`, extending `bindings`.
/// Returns a new, extended map on success; `bindings` itself is untouched
/// so callers can retry sibling alternatives from the same starting point.
pub fn match_pattern(
    pattern: &Expr,
    value: &Expr,
    bindings: &Bindings,
    symtab: &SymbolTable,
) -> Option<Bindings> {
    if let Expr::Compound(c) = pattern {
        let head = &c.elements[0];
        let args = &c.elements[1..];
        if let Some(name) = head.as_symbol() {
            if name.is("Pattern") && args.len() == 2 {
                return match_named(&args[0], &args[1], value, bindings, symtab);
            }
            if name.is("Blank") {
                return match_blank(args, value, bindings);
            }
            if name.is("BlankSequence") || name.is("BlankNullSequence") {
                // A sequence blank outside of a compound's argument list
                // matches only as a single-value capture of itself.
                return match_blank(args, value, bindings);
            }
        }
        return match_compound(c, value, bindings, symtab);
    }
    // Atom pattern: literal structural equality.
    if pattern == value {
        Some(bindings.clone())
    } else {
        None
    }
}

fn match_named(
    name_expr: &Expr,
    sub_pattern: &Expr,
    value: &Expr,
    bindings: &Bindings,
    symtab: &SymbolTable,
) -> Option<Bindings> {
    let name = name_expr.as_symbol()?;
    let mut extended = match_pattern(sub_pattern, value, bindings, symtab)?;
    if let Some(existing) = bindings.get(&name) {
        if existing != value {
            return None;
        }
    }
    extended.insert(name, value.clone());
    Some(extended)
}

fn match_blank(type_args: &[Expr], value: &Expr, bindings: &Bindings) -> Option<Bindings> {
    match type_args {
        [] => Some(bindings.clone()),
        [ty] => {
            let name = ty.as_symbol()?;
            if type_matches(&symterm_base::resolve(name), value) {
                Some(bindings.clone())
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Built-in type names recognized by typed blanks (`x_Integer`, `x_List`,
/// ...). Any other name is treated as a user head: `x_Point` matches any
/// compound whose head is the symbol `Point`.
fn type_matches(type_name: &str, value: &Expr) -> bool {
    match type_name {
        "Integer" => matches!(value, Expr::Integer(_)),
        "Real" => matches!(value, Expr::Real(_)),
        "Number" => matches!(value, Expr::Integer(_) | Expr::Real(_)),
        "String" => matches!(value, Expr::Str(_)),
        "Symbol" => matches!(value, Expr::Sym(_)),
        "Boolean" => matches!(value, Expr::Sym(s) if s.is("True") || s.is("False")),
        "List" => value.is_call("List"),
        "Rule" => value.is_call("Rule") || value.is_call("RuleDelayed"),
        "Association" => matches!(value, Expr::Object(o) if o.type_name.is("Association")),
        "ByteArray" => matches!(value, Expr::Object(o) if o.type_name.is("ByteArray")),
        "Atom" => !matches!(value, Expr::Compound(_)),
        other => value.is_call(other),
    }
}

fn match_compound(
    pattern: &crate::expr::CompoundData,
    value: &Expr,
    bindings: &Bindings,
    symtab: &SymbolTable,
) -> Option<Bindings> {
    let Expr::Compound(vdata) = value else { return None };

    let pat_head = &pattern.elements[0];
    let bindings = match_pattern(pat_head, &vdata.elements[0], bindings, symtab)?;

    let head_sym = pat_head.as_symbol();
    let attrs = head_sym.map(|s| symtab.get(s)).unwrap_or_default();

    let mut value_args: Vec<Expr> = vdata.elements[1..].to_vec();
    if attrs.flat() {
        if let Some(s) = head_sym {
            value_args = flatten_same_head(s, value_args);
        }
    }

    let pat_args = &pattern.elements[1..];

    if attrs.orderless() {
        match_orderless(pat_args, &value_args, &bindings, symtab)
    } else {
        match_sequence(pat_args, &value_args, &bindings, symtab)
    }
}

fn flatten_same_head(head: Symbol, args: Vec<Expr>) -> Vec<Expr> {
    let mut out = Vec::with_capacity(args.len());
    for a in args {
        if a.is_call(&symterm_base::resolve(head)) {
            out.extend(flatten_same_head(head, a.args().to_vec()));
        } else {
            out.push(a);
        }
    }
    out
}

/// What kind of sequence a sub-pattern is, if any, and the name it should
/// bind under (sequence blanks may themselves be wrapped in `Pattern`).
enum SeqKind {
    One,
    AtLeastOne,
    ZeroOrMore,
}

fn seq_kind(pat: &Expr) -> (SeqKind, Option<Symbol>, Expr) {
    if let Expr::Compound(c) = pat {
        let head = &c.elements[0];
        if let Some(name) = head.as_symbol() {
            if name.is("Pattern") && c.elements.len() == 3 {
                let (kind, _, inner) = seq_kind(&c.elements[2]);
                return (kind, c.elements[1].as_symbol(), inner);
            }
            if name.is("BlankSequence") {
                return (SeqKind::AtLeastOne, None, pat.clone());
            }
            if name.is("BlankNullSequence") {
                return (SeqKind::ZeroOrMore, None, pat.clone());
            }
        }
    }
    (SeqKind::One, None, pat.clone())
}

/// Matches an ordered list of sub-patterns against an ordered list of
/// values, greedily assigning the longest possible span to each sequence
/// pattern first and backtracking to shorter spans on downstream failure.
fn match_sequence(
    pats: &[Expr],
    vals: &[Expr],
    bindings: &Bindings,
    symtab: &SymbolTable,
) -> Option<Bindings> {
    let Some((p0, rest_pats)) = pats.split_first() else {
        return if vals.is_empty() { Some(bindings.clone()) } else { None };
    };

    let (kind, seq_name, inner) = seq_kind(p0);
    match kind {
        SeqKind::One => {
            let (v0, rest_vals) = vals.split_first()?;
            let extended = match_pattern(p0, v0, bindings, symtab)?;
            match_sequence(rest_pats, rest_vals, &extended, symtab)
        }
        SeqKind::AtLeastOne | SeqKind::ZeroOrMore => {
            let min_take = if matches!(kind, SeqKind::AtLeastOne) { 1 } else { 0 };
            for take in (min_take..=vals.len()).rev() {
                let (chunk, remaining) = vals.split_at(take);
                if !chunk.iter().all(|v| element_matches_sequence_type(&inner, v)) {
                    continue;
                }
                let mut candidate = bindings.clone();
                if let Some(name) = seq_name {
                    let captured = Expr::list(chunk.to_vec());
                    if let Some(existing) = bindings.get(&name) {
                        if existing != &captured {
                            continue;
                        }
                    }
                    candidate.insert(name, captured);
                }
                if let Some(result) = match_sequence(rest_pats, remaining, &candidate, symtab) {
                    return Some(result);
                }
            }
            None
        }
    }
}

fn element_matches_sequence_type(inner: &Expr, value: &Expr) -> bool {
    if let Expr::Compound(c) = inner {
        if let Some(name) = c.elements[0].as_symbol() {
            if (name.is("BlankSequence") || name.is("BlankNullSequence")) && c.elements.len() == 2
            {
                if let Some(ty) = c.elements[1].as_symbol() {
                    return type_matches(&symterm_base::resolve(ty), value);
                }
            }
        }
    }
    true
}

/// Orderless matching: try the value arguments in every permutation,
/// stopping at the first one for which the ordinary sequence matcher
/// succeeds. Permutations are generated in lexicographic order of index so
/// the result is deterministic for a given input.
fn match_orderless(
    pats: &[Expr],
    vals: &[Expr],
    bindings: &Bindings,
    symtab: &SymbolTable,
) -> Option<Bindings> {
    let mut indices: Vec<usize> = (0..vals.len()).collect();
    loop {
        let permuted: Vec<Expr> = indices.iter().map(|&i| vals[i].clone()).collect();
        if let Some(result) = match_sequence(pats, &permuted, bindings, symtab) {
            return Some(result);
        }
        if !next_permutation(&mut indices) {
            return None;
        }
    }
}

/// Standard in-place next-permutation (lexicographic successor), `false`
/// once the sequence is back at its fully-descending (final) arrangement.
fn next_permutation(indices: &mut [usize]) -> bool {
    if indices.len() < 2 {
        return false;
    }
    let mut i = indices.len() - 1;
    while i > 0 && indices[i - 1] >= indices[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let pivot = i - 1;
    let mut j = indices.len() - 1;
    while indices[j] <= indices[pivot] {
        j -= 1;
    }
    indices.swap(pivot, j);
    indices[pivot + 1..].reverse();
    true
}
