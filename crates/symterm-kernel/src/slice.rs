//! Slice assignment lowering (spec §4.8): the kernel operations the surface
//! syntax's `x[i]`, `x[a:b]`, `x[:n]`, `x[a:]` and their `=`-assigned forms
//! lower to. Implemented here (not in `symterm-stdlib`) because the parser
//! names them directly as part of its own contract with the core, so the
//! kernel registers them as ordinary native rules the moment an `Evaluator`
//! is constructed, the same way `Hold`'s attribute is seeded rather than
//! left for a collaborator crate to supply.
//!
//! Every operation is an immutable transform: none of them mutate `List` or
//! `String` in place, all of them return a fresh container. Indices are
//! 1-based; a negative index counts from the end (`-1` is the last
//! element), which is also exactly what makes the parser's "to end" `-1`
//! sentinel for `SliceSet`'s open-ended `x[a:] = v` lowering fall out for
//! free — it is just an ordinary negative index into the same container.

use crate::error::KernelError;
use crate::expr::{Expr, ErrorKind, ObjectPayload};
use crate::eval::Evaluator;

/// Registers `Part`/`SliceRange`/`Take`/`TakeFrom`/`PartSet`/`SliceSet`
/// against `evaluator`'s root context. Called once from
/// [`Evaluator::new`]/[`Evaluator::with_config`].
pub(crate) fn register(evaluator: &Evaluator) -> Result<(), KernelError> {
    register_one(evaluator, "Part", 2, part_native)?;
    register_one(evaluator, "SliceRange", 3, slice_range_native)?;
    register_one(evaluator, "Take", 2, take_native)?;
    register_one(evaluator, "TakeFrom", 2, take_from_native)?;
    register_one(evaluator, "PartSet", 3, part_set_native)?;
    register_one(evaluator, "SliceSet", 4, slice_set_native)?;
    Ok(())
}

fn register_one(evaluator: &Evaluator, name: &str, arity: usize, f: crate::registry::NativeFn) -> Result<(), KernelError> {
    let args: Vec<Expr> = (0..arity).map(|_| Expr::call("Blank", vec![])).collect();
    let pattern = Expr::compound(Expr::symbol(name), args);
    evaluator.register_pattern(pattern, f)
}

fn type_error(msg: &str, args: Vec<Expr>) -> Expr {
    Expr::error(ErrorKind::TypeError, msg, args)
}

fn index_error(msg: &str, args: Vec<Expr>) -> Expr {
    Expr::error(ErrorKind::IndexError, msg, args)
}

/// Reads `e` as a sequence of elements: a `List`'s arguments, or a
/// `String`'s characters (each re-wrapped as a one-character `String` so
/// callers can treat both container kinds uniformly).
fn elements_of(e: &Expr) -> Option<Vec<Expr>> {
    if e.is_list() {
        Some(e.args().to_vec())
    } else if let Expr::Str(s) = e {
        Some(s.as_str().chars().map(|c| Expr::string(c.to_string())).collect())
    } else {
        None
    }
}

/// Rebuilds a container of the same kind as `like` from `elements`: a
/// `List` if `like` was a `List`, or the concatenation of `elements`'
/// one-character strings if `like` was a `String`.
fn rebuild_like(like: &Expr, elements: Vec<Expr>) -> Expr {
    if like.is_list() {
        Expr::list(elements)
    } else {
        let mut s = String::new();
        for e in &elements {
            if let Expr::Str(sd) = e {
                s.push_str(sd.as_str());
            }
        }
        Expr::string(s)
    }
}

/// 1-based, end-relative index resolution: `1` is the first element, `-1`
/// the last. Returns `None` (to be reported as `IndexError`) for `0` or any
/// index outside `[1, len]` / `[-len, -1]`.
fn resolve_index(len: usize, idx: i64) -> Option<usize> {
    if idx == 0 {
        return None;
    }
    let len_i = len as i64;
    let pos = if idx > 0 { idx - 1 } else { len_i + idx };
    if pos < 0 || pos >= len_i {
        None
    } else {
        Some(pos as usize)
    }
}

pub fn part(container: &Expr, index: &Expr) -> Expr {
    if let Expr::Object(o) = container {
        if let ObjectPayload::Association(assoc) = &o.payload {
            return match assoc.get(index) {
                Some(v) => v.clone(),
                None => index_error("key not found in Association", vec![container.clone(), index.clone()]),
            };
        }
    }
    let Some(idx) = index.as_integer() else {
        return type_error("Part's index must be an Integer", vec![index.clone()]);
    };
    let Some(elems) = elements_of(container) else {
        return type_error("Part requires a List, String, or Association", vec![container.clone()]);
    };
    match resolve_index(elems.len(), idx) {
        Some(i) => elems[i].clone(),
        None => index_error("Part index out of range", vec![container.clone(), index.clone()]),
    }
}

fn part_native(args: &[Expr]) -> Expr {
    part(&args[0], &args[1])
}

pub fn slice_range(container: &Expr, a: &Expr, b: &Expr) -> Expr {
    let (Some(a), Some(b)) = (a.as_integer(), b.as_integer()) else {
        return type_error("SliceRange's bounds must be Integers", vec![a.clone(), b.clone()]);
    };
    let Some(elems) = elements_of(container) else {
        return type_error("SliceRange requires a List or String", vec![container.clone()]);
    };
    let (Some(ia), Some(ib)) = (resolve_index(elems.len(), a), resolve_index(elems.len(), b)) else {
        return index_error("SliceRange bound out of range", vec![container.clone()]);
    };
    if ia > ib {
        return index_error("SliceRange start must not exceed end", vec![container.clone()]);
    }
    rebuild_like(container, elems[ia..=ib].to_vec())
}

fn slice_range_native(args: &[Expr]) -> Expr {
    slice_range(&args[0], &args[1], &args[2])
}

pub fn take(container: &Expr, n: &Expr) -> Expr {
    let Some(n) = n.as_integer() else {
        return type_error("Take's count must be an Integer", vec![n.clone()]);
    };
    let Some(elems) = elements_of(container) else {
        return type_error("Take requires a List or String", vec![container.clone()]);
    };
    let len = elems.len() as i64;
    if n.unsigned_abs() as i64 > len {
        return index_error("Take count exceeds container length", vec![container.clone()]);
    }
    let slice = if n >= 0 { &elems[..n as usize] } else { &elems[(len + n) as usize..] };
    rebuild_like(container, slice.to_vec())
}

fn take_native(args: &[Expr]) -> Expr {
    take(&args[0], &args[1])
}

pub fn take_from(container: &Expr, a: &Expr) -> Expr {
    let Some(a) = a.as_integer() else {
        return type_error("TakeFrom's start must be an Integer", vec![a.clone()]);
    };
    let Some(elems) = elements_of(container) else {
        return type_error("TakeFrom requires a List or String", vec![container.clone()]);
    };
    let Some(ia) = resolve_index(elems.len(), a) else {
        return index_error("TakeFrom start out of range", vec![container.clone()]);
    };
    rebuild_like(container, elems[ia..].to_vec())
}

fn take_from_native(args: &[Expr]) -> Expr {
    take_from(&args[0], &args[1])
}

pub fn part_set(container: &Expr, index: &Expr, value: &Expr) -> Expr {
    let Some(idx) = index.as_integer() else {
        return type_error("PartSet's index must be an Integer", vec![index.clone()]);
    };
    let Some(mut elems) = elements_of(container) else {
        return type_error("PartSet requires a List or String", vec![container.clone()]);
    };
    let Some(pos) = resolve_index(elems.len(), idx) else {
        return index_error("PartSet index out of range", vec![container.clone(), index.clone()]);
    };
    if matches!(container, Expr::Str(_)) {
        let Expr::Str(s) = value else {
            return type_error("assigning into a String requires a one-character String", vec![value.clone()]);
        };
        if s.char_count() != 1 {
            return type_error("assigning into a String requires a one-character String", vec![value.clone()]);
        }
    }
    elems[pos] = value.clone();
    rebuild_like(container, elems)
}

fn part_set_native(args: &[Expr]) -> Expr {
    part_set(&args[0], &args[1], &args[2])
}

pub fn slice_set(container: &Expr, a: &Expr, b: &Expr, value: &Expr) -> Expr {
    let (Some(a), Some(b)) = (a.as_integer(), b.as_integer()) else {
        return type_error("SliceSet's bounds must be Integers", vec![a.clone(), b.clone()]);
    };
    let Some(elems) = elements_of(container) else {
        return type_error("SliceSet requires a List or String", vec![container.clone()]);
    };
    let Some(replacement) = elements_of(value) else {
        return type_error("SliceSet's replacement must be a List or String", vec![value.clone()]);
    };
    let (Some(ia), Some(ib)) = (resolve_index(elems.len(), a), resolve_index(elems.len(), b)) else {
        return index_error("SliceSet bound out of range", vec![container.clone()]);
    };
    if ia > ib {
        return index_error("SliceSet start must not exceed end", vec![container.clone()]);
    }
    if replacement.len() != ib - ia + 1 {
        return Expr::error(
            ErrorKind::ArgumentError,
            "SliceSet's replacement must have the same length as the span it replaces",
            vec![container.clone(), value.clone()],
        );
    }
    let mut new_elems = elems;
    new_elems.splice(ia..=ib, replacement);
    rebuild_like(container, new_elems)
}

fn slice_set_native(args: &[Expr]) -> Expr {
    slice_set(&args[0], &args[1], &args[2], &args[3])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_is_one_based() {
        let list = Expr::list(vec![Expr::integer(10), Expr::integer(20), Expr::integer(30)]);
        assert_eq!(part(&list, &Expr::integer(1)), Expr::integer(10));
        assert_eq!(part(&list, &Expr::integer(3)), Expr::integer(30));
    }

    #[test]
    fn negative_part_counts_from_the_end() {
        let list = Expr::list(vec![Expr::integer(1), Expr::integer(2), Expr::integer(3), Expr::integer(4), Expr::integer(5)]);
        assert_eq!(part(&list, &Expr::integer(-1)), Expr::integer(5));
    }

    #[test]
    fn part_out_of_range_is_index_error() {
        let list = Expr::list(vec![Expr::integer(1)]);
        let result = part(&list, &Expr::integer(5));
        assert_eq!(result.as_error().unwrap().kind, ErrorKind::IndexError);
    }

    #[test]
    fn slice_range_is_inclusive() {
        let list = Expr::list((1..=5).map(Expr::integer).collect());
        let result = slice_range(&list, &Expr::integer(2), &Expr::integer(4));
        assert_eq!(result, Expr::list(vec![Expr::integer(2), Expr::integer(3), Expr::integer(4)]));
    }

    #[test]
    fn slice_range_start_after_end_is_index_error() {
        let list = Expr::list((1..=5).map(Expr::integer).collect());
        let result = slice_range(&list, &Expr::integer(4), &Expr::integer(2));
        assert_eq!(result.as_error().unwrap().kind, ErrorKind::IndexError);
    }

    #[test]
    fn take_takes_a_prefix() {
        let list = Expr::list((1..=5).map(Expr::integer).collect());
        let result = take(&list, &Expr::integer(2));
        assert_eq!(result, Expr::list(vec![Expr::integer(1), Expr::integer(2)]));
    }

    #[test]
    fn negative_take_takes_a_suffix() {
        let list = Expr::list((1..=5).map(Expr::integer).collect());
        let result = take(&list, &Expr::integer(-2));
        assert_eq!(result, Expr::list(vec![Expr::integer(4), Expr::integer(5)]));
    }

    #[test]
    fn take_from_takes_the_rest() {
        let list = Expr::list((1..=5).map(Expr::integer).collect());
        let result = take_from(&list, &Expr::integer(3));
        assert_eq!(result, Expr::list(vec![Expr::integer(3), Expr::integer(4), Expr::integer(5)]));
    }

    #[test]
    fn part_set_replaces_one_element_immutably() {
        let list = Expr::list(vec![Expr::integer(1), Expr::integer(2), Expr::integer(3)]);
        let result = part_set(&list, &Expr::integer(2), &Expr::integer(99));
        assert_eq!(result, Expr::list(vec![Expr::integer(1), Expr::integer(99), Expr::integer(3)]));
        // The original is untouched.
        assert_eq!(list, Expr::list(vec![Expr::integer(1), Expr::integer(2), Expr::integer(3)]));
    }

    #[test]
    fn slice_set_with_negative_end_reaches_the_end() {
        let list = Expr::list((1..=5).map(Expr::integer).collect());
        let replacement = Expr::list(vec![Expr::integer(0), Expr::integer(0), Expr::integer(0)]);
        let result = slice_set(&list, &Expr::integer(3), &Expr::integer(-1), &replacement);
        assert_eq!(
            result,
            Expr::list(vec![Expr::integer(1), Expr::integer(2), Expr::integer(0), Expr::integer(0), Expr::integer(0)])
        );
    }

    #[test]
    fn operations_round_trip_through_strings() {
        let s = Expr::string("hello");
        assert_eq!(part(&s, &Expr::integer(1)), Expr::string("h"));
        assert_eq!(slice_range(&s, &Expr::integer(2), &Expr::integer(4)), Expr::string("ell"));
        assert_eq!(part_set(&s, &Expr::integer(1), &Expr::string("H")), Expr::string("Hello"));
    }

    #[test]
    fn slice_set_rejects_mismatched_replacement_length() {
        let list = Expr::list((1..=5).map(Expr::integer).collect());
        let replacement = Expr::list(vec![Expr::integer(0)]);
        let result = slice_set(&list, &Expr::integer(1), &Expr::integer(3), &replacement);
        assert_eq!(result.as_error().unwrap().kind, ErrorKind::ArgumentError);
    }

    #[test]
    fn part_looks_up_association_keys() {
        let mut assoc = crate::expr::Association::new();
        assoc.insert(Expr::string("a"), Expr::integer(1));
        assoc.insert(Expr::string("b"), Expr::integer(2));
        let obj = Expr::object(symterm_base::intern("Association"), ObjectPayload::Association(assoc));
        assert_eq!(part(&obj, &Expr::string("a")), Expr::integer(1));
    }

    #[test]
    fn part_on_missing_association_key_is_index_error() {
        let obj = Expr::object(symterm_base::intern("Association"), ObjectPayload::Association(crate::expr::Association::new()));
        let result = part(&obj, &Expr::string("missing"));
        assert_eq!(result.as_error().unwrap().kind, ErrorKind::IndexError);
    }
}
