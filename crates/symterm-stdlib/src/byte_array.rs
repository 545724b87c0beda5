//! `ByteArrayFromList`/`ByteArrayToList`: conversions between `List`s of
//! small integers and the opaque `ByteArray` object payload, the last of the
//! "string, list, association, byte-array" groups spec §1's workspace table
//! names as external collaborator concerns.

use symterm_base::intern;
use symterm_kernel::eval::Evaluator;
use symterm_kernel::expr::{Expr, ObjectPayload, ErrorKind};

pub(crate) fn register(evaluator: &Evaluator) {
    let from_list = Expr::call("ByteArrayFromList", vec![Expr::call("Blank", vec![Expr::symbol("List")])]);
    evaluator.register_pattern(from_list, from_list_native).expect("byte array patterns are always well-formed");

    let to_list = Expr::call("ByteArrayToList", vec![Expr::call("Blank", vec![Expr::symbol("ByteArray")])]);
    evaluator.register_pattern(to_list, to_list_native).expect("byte array patterns are always well-formed");
}

fn from_list_native(args: &[Expr]) -> Expr {
    let mut bytes = Vec::with_capacity(args[0].length());
    for elem in args[0].args() {
        let Some(v) = elem.as_integer().filter(|v| (0..=255).contains(v)) else {
            return Expr::error(ErrorKind::ValueError, "ByteArray elements must be Integers in 0..=255", vec![elem.clone()]);
        };
        bytes.push(v as u8);
    }
    Expr::object(intern("ByteArray"), ObjectPayload::ByteArray(bytes.into()))
}

fn to_list_native(args: &[Expr]) -> Expr {
    match args[0].as_object().map(|o| &o.payload) {
        Some(ObjectPayload::ByteArray(bytes)) => Expr::list(bytes.iter().map(|b| Expr::integer(*b as i64)).collect()),
        _ => Expr::error(ErrorKind::TypeError, "ByteArrayToList requires a ByteArray", vec![args[0].clone()]),
    }
}
