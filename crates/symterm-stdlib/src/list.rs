//! `RotateLeft`/`RotateRight` and `Append`: list/string primitives that
//! round out the `symterm-kernel::slice` module's `Part`/`Take` family.
//! Rotation works uniformly over `List` and `String` containers, the same
//! dual treatment `slice.rs` gives `Part`/`SliceRange`.

use symterm_kernel::eval::Evaluator;
use symterm_kernel::expr::{Expr, ErrorKind};

pub(crate) fn register(evaluator: &Evaluator) {
    register_rotate(evaluator, "RotateLeft", rotate_left_native);
    register_rotate(evaluator, "RotateRight", rotate_right_native);
    register_append(evaluator);
}

fn register_rotate(evaluator: &Evaluator, name: &str, f: symterm_kernel::registry::NativeFn) {
    let pattern = Expr::call(name, vec![Expr::call("Blank", vec![]), Expr::call("Blank", vec![Expr::symbol("Integer")])]);
    evaluator.register_pattern(pattern, f).expect("list patterns are always well-formed");
}

fn register_append(evaluator: &Evaluator) {
    let pattern = Expr::call("Append", vec![Expr::call("Blank", vec![Expr::symbol("List")]), Expr::call("Blank", vec![])]);
    evaluator.register_pattern(pattern, append_native).expect("list patterns are always well-formed");
}

fn elements_of(e: &Expr) -> Option<Vec<Expr>> {
    if e.is_list() {
        Some(e.args().to_vec())
    } else if let Expr::Str(s) = e {
        Some(s.as_str().chars().map(|c| Expr::string(c.to_string())).collect())
    } else {
        None
    }
}

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

fn rotate(container: &Expr, n: &Expr, left: bool) -> Expr {
    let Some(mut elems) = elements_of(container) else {
        return Expr::error(ErrorKind::TypeError, "rotation requires a List or String", vec![container.clone()]);
    };
    if elems.is_empty() {
        return container.clone();
    }
    let len = elems.len() as i64;
    let n = n.as_integer().unwrap_or(0).rem_euclid(len) as usize;
    let n = if left { n } else { elems.len() - n };
    elems.rotate_left(n);
    rebuild_like(container, elems)
}

fn rotate_left_native(args: &[Expr]) -> Expr {
    rotate(&args[0], &args[1], true)
}

fn rotate_right_native(args: &[Expr]) -> Expr {
    rotate(&args[0], &args[1], false)
}

fn append_native(args: &[Expr]) -> Expr {
    let mut elements = args[0].args().to_vec();
    elements.push(args[1].clone());
    Expr::list(elements)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev() -> Evaluator {
        let e = Evaluator::new();
        register(&e);
        e
    }

    #[test]
    fn rotate_left_on_a_list() {
        let mut e = ev();
        let list = Expr::list((1..=5).map(Expr::integer).collect());
        let result = e.evaluate(&Expr::call("RotateLeft", vec![list, Expr::integer(2)]));
        assert_eq!(result, Expr::list(vec![Expr::integer(3), Expr::integer(4), Expr::integer(5), Expr::integer(1), Expr::integer(2)]));
    }

    #[test]
    fn rotate_right_on_a_string() {
        let mut e = ev();
        let result = e.evaluate(&Expr::call("RotateRight", vec![Expr::string("hello"), Expr::integer(1)]));
        assert_eq!(result, Expr::string("ohell"));
    }

    #[test]
    fn append_grows_a_list_immutably() {
        let mut e = ev();
        let list = Expr::list(vec![Expr::integer(1), Expr::integer(2)]);
        let result = e.evaluate(&Expr::call("Append", vec![list.clone(), Expr::integer(3)]));
        assert_eq!(result, Expr::list(vec![Expr::integer(1), Expr::integer(2), Expr::integer(3)]));
        assert_eq!(list, Expr::list(vec![Expr::integer(1), Expr::integer(2)]));
    }
}
