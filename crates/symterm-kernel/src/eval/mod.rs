//! The evaluator: the fixed-point driver that ties the expression model,
//! pattern matcher, and rule registry together.
//!
//! `Evaluator::evaluate` repeatedly applies a single normalization step
//! (evaluate the head, decide which arguments to hold, normalize the
//! survivors' attributes, dispatch a rule) until the result stops
//! changing. Because each step already recurses into every sub-expression
//! it touches, one call to `step` typically reaches the fixed point on its
//! own; the outer loop exists to make that guarantee explicit rather than
//! assumed, and to bound runaway rewriting with the same fuel-style
//! mechanism a reduction engine uses to avoid spinning forever on a buggy
//! rule set.

mod attributes;
mod special_forms;
mod stack;

pub use stack::{EvalStack, Frame};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use symterm_base::{Symbol, SymbolEq};

use crate::context::Context;
use crate::error::KernelError;
use crate::expr::{Expr, ErrorKind};
use crate::registry::{Handler, NativeFn};
use crate::symtab::Attribute;

use attributes::{flatten_args, one_identity_collapse, sort_orderless, thread_listable};

/// Tunable limits for a single [`Evaluator`].
#[derive(Clone)]
pub struct EvaluatorConfig {
    /// Upper bound on simultaneous nested compound evaluations before a
    /// call is rejected with a `RecursionError` rather than overflowing
    /// the host stack.
    pub max_stack_depth: usize,
    /// Checked before each top-level rewrite step; when set and flagged,
    /// evaluation stops early with a `Cancelled` error instead of running
    /// to completion. Shared across threads so a supervisor can cancel a
    /// long-running evaluation from elsewhere.
    pub cancellation: Option<Arc<AtomicBool>>,
    /// Fuel for the outer fixed-point loop: how many times `step` may be
    /// re-applied to the same top-level expression before giving up. Not a
    /// per-call recursion bound (that's `max_stack_depth`) — a safety net
    /// against a rule set that rewrites forever without ever recursing
    /// deeply.
    pub max_fixed_point_iterations: usize,
}

impl EvaluatorConfig {
    fn validate(&self) -> Result<(), KernelError> {
        if self.max_stack_depth == 0 {
            return Err(KernelError::InvalidConfig("max_stack_depth must be at least 1".to_string()));
        }
        if self.max_fixed_point_iterations == 0 {
            return Err(KernelError::InvalidConfig(
                "max_fixed_point_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        EvaluatorConfig { max_stack_depth: 1000, cancellation: None, max_fixed_point_iterations: 10_000 }
    }
}

/// One independently-running evaluation session: its own context tree, its
/// own symbol table, its own rule registry, its own evaluation stack.
/// Nothing here is shared with any other `Evaluator` unless explicitly
/// handed a context descended from one (which this crate never does on
/// its own — isolation between top-level evaluators is the default).
pub struct Evaluator {
    ctx: Arc<Context>,
    stack: std::cell::RefCell<EvalStack>,
    config: EvaluatorConfig,
}

struct StackGuard<'a> {
    stack: &'a std::cell::RefCell<EvalStack>,
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        self.stack.borrow_mut().pop();
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_config(EvaluatorConfig::default()).expect("default evaluator config is always valid")
    }

    pub fn with_config(config: EvaluatorConfig) -> Result<Self, KernelError> {
        config.validate()?;
        let ctx = Context::root();
        let evaluator = Evaluator { ctx, stack: std::cell::RefCell::new(EvalStack::new(config.max_stack_depth)), config };
        evaluator.seed_builtin_symbols();
        crate::slice::register(&evaluator).expect("kernel's own slice patterns are always well-formed");
        Ok(evaluator)
    }

    fn seed_builtin_symbols(&self) {
        let symtab = self.ctx.symtab();
        for name in ["True", "False", "Null"] {
            let sym = symterm_base::intern(name);
            symtab.add(sym, Attribute::Constant);
            symtab.add(sym, Attribute::Protected);
        }
        // `Hold` needs no special-form handling: it is exactly a `HoldAll`
        // symbol with no registered rules, so the ordinary no-rule-matched
        // path already returns its arguments untouched.
        let hold = symterm_base::intern("Hold");
        symtab.add(hold, Attribute::HoldAll);
        symtab.add(hold, Attribute::Protected);
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.ctx
    }

    /// Registers a native or user rule under `head`'s dispatch list at the
    /// evaluator's current (root) context. This is the one extension point
    /// external crates (a parser feeding in user definitions, a stdlib
    /// crate registering built-ins) use to teach the kernel new behavior.
    pub fn register_pattern(&self, pattern: Expr, handler: NativeFn) -> Result<(), KernelError> {
        let Some(head) = pattern.head().as_symbol() else {
            return Err(KernelError::InvalidPattern(format!(
                "pattern {} has no symbol head to register under",
                crate::expr::canonical_string(&pattern)
            )));
        };
        self.ctx.register_rule(head, pattern, Handler::Native(handler));
        Ok(())
    }

    pub fn set_attribute(&self, sym: Symbol, attr: Attribute) {
        self.ctx.symtab().add(sym, attr);
    }

    /// Evaluates `e` to a fixed point: applies the single-step transform
    /// repeatedly until it stops changing the result, a cancellation flag
    /// is observed, or the fuel bound is exhausted (which itself yields a
    /// `RecursionError` rather than silently truncating).
    pub fn evaluate(&mut self, e: &Expr) -> Expr {
        let mut current = e.clone();
        for _ in 0..self.config.max_fixed_point_iterations {
            if let Some(flag) = &self.config.cancellation {
                if flag.load(Ordering::SeqCst) {
                    return Expr::error(ErrorKind::Cancelled, "evaluation was cancelled", vec![]);
                }
            }
            let next = self.step(&current);
            if next == current {
                return next;
            }
            current = next;
        }
        let frames = current
            .as_compound()
            .and_then(|_| current.head().as_symbol())
            .map(|s| Frame { function: s, short_form: short_form_of(&current.head(), current.args().len()) })
            .into_iter()
            .collect();
        make_error_with_frames(
            ErrorKind::RecursionError,
            "maximum fixed-point iterations exceeded without converging",
            vec![],
            frames,
        )
    }

    fn step(&mut self, e: &Expr) -> Expr {
        match e {
            Expr::Error(_) => e.clone(),
            Expr::Sym(s) => self.ctx.get_var(*s).unwrap_or_else(|| e.clone()),
            Expr::Integer(_) | Expr::Real(_) | Expr::Str(_) | Expr::Object(_) => e.clone(),
            Expr::Compound(_) => self.step_compound(e),
        }
    }

    fn step_compound(&mut self, e: &Expr) -> Expr {
        let data = e.as_compound().expect("step_compound called on a non-compound");
        let head_raw = &data.elements[0];
        let raw_args = &data.elements[1..];

        let h_prime = self.step(head_raw);
        let s_opt = h_prime.as_symbol();

        if let Some(s) = s_opt {
            if let Some(result) = self.try_special_form(s, raw_args) {
                return result;
            }
        }

        let short_form = short_form_of(&h_prime, raw_args.len());
        if self.stack.borrow_mut().push(s_opt.unwrap_or_default(), short_form).is_err() {
            let frames = self.stack.borrow().snapshot();
            return make_error_with_frames(
                ErrorKind::RecursionError,
                "maximum evaluation stack depth exceeded",
                vec![],
                frames,
            );
        }
        let _guard = StackGuard { stack: &self.stack };

        let attrs = s_opt.map(|s| self.ctx.symtab().get(s)).unwrap_or_default();
        // `HoldFirst` and `HoldRest` together hold every argument, same as
        // `HoldAll` — a symbol with no unheld position left to single out.
        let hold_all = attrs.hold_all() || (attrs.hold_first() && attrs.hold_rest());
        let mut args = Vec::with_capacity(raw_args.len());
        for (i, raw_arg) in raw_args.iter().enumerate() {
            let position = i + 1;
            let should_eval = if hold_all {
                false
            } else if attrs.hold_first() {
                position != 1
            } else if attrs.hold_rest() {
                position == 1
            } else {
                true
            };
            // `Evaluate(...)` forces its argument through the normal
            // pipeline even positionally held, unless the enclosing head is
            // the literal `Hold` (an unconditional quote with no escape).
            let forced = raw_arg.is_call("Evaluate") && !s_opt.map(|s| s.is("Hold")).unwrap_or(false);
            let value = if should_eval || forced { self.step(raw_arg) } else { raw_arg.clone() };
            if value.as_error().is_some() {
                return self.attach_current_frame(value);
            }
            args.push(value);
        }

        if let Some(s) = s_opt {
            if attrs.listable() && args.iter().any(|a| a.is_list()) {
                return match thread_listable(&h_prime, &args) {
                    Ok(listed) => self.step(&listed),
                    Err(err) => self.attach_current_frame(err),
                };
            }
            if attrs.flat() {
                args = flatten_args(s, args);
            }
            if attrs.orderless() {
                sort_orderless(&mut args);
            }
            if attrs.one_identity() {
                if let Some(collapsed) = one_identity_collapse(args.clone()) {
                    return collapsed;
                }
            }
        }

        let synthetic = Expr::compound(h_prime.clone(), args.clone());

        if let Some(s) = s_opt {
            if let Some((handler, bindings)) = self.ctx.find_rule(s, &synthetic) {
                return self.apply_handler(handler, &args, bindings);
            }
        }

        synthetic
    }

    fn apply_handler(&mut self, handler: Handler, args: &[Expr], bindings: crate::pattern::Bindings) -> Expr {
        match handler {
            Handler::Native(f) => {
                let result = f(args);
                if result.as_error().is_some() {
                    self.attach_current_frame(result)
                } else {
                    result
                }
            }
            Handler::User { body, delayed: false } => body,
            Handler::User { body, delayed: true } => {
                let substituted = substitute(&body, &bindings);
                let child = Context::child_with_bindings(&self.ctx, bindings);
                let previous = std::mem::replace(&mut self.ctx, child);
                let result = self.step(&substituted);
                self.ctx = previous;
                result
            }
        }
    }

    fn attach_current_frame(&self, err: Expr) -> Expr {
        let Some(frame) = self.stack.borrow().current().cloned() else { return err };
        match &err {
            Expr::Error(data) => {
                let mut data = (**data).clone();
                data.frames.push(crate::expr::Frame { function: frame.function, short_form: frame.short_form });
                Expr::Error(Arc::new(data))
            }
            _ => err,
        }
    }

    /// Swaps in `new_ctx` for the duration of `f`, restoring the previous
    /// context afterward even if `f` returns early. Used by
    /// `Replace`/`ReplaceAll` to evaluate a `RuleDelayed` body under a
    /// lexically-scoped child context without permanently changing the
    /// evaluator's notion of "current context."
    pub(crate) fn with_context<R>(&mut self, new_ctx: Arc<Context>, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = std::mem::replace(&mut self.ctx, new_ctx);
        let result = f(self);
        self.ctx = previous;
        result
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

fn make_error_with_frames(
    kind: ErrorKind,
    message: &str,
    args: Vec<Expr>,
    frames: Vec<Frame>,
) -> Expr {
    let mut e = Expr::error(kind, message, args);
    if let Expr::Error(data) = &mut e {
        let mut data_mut = (**data).clone();
        data_mut.frames = frames
            .into_iter()
            .map(|f| crate::expr::Frame { function: f.function, short_form: f.short_form })
            .collect();
        e = Expr::Error(Arc::new(data_mut));
    }
    e
}

fn short_form_of(head: &Expr, arity: usize) -> String {
    format!("{}/{}", crate::expr::canonical_string(head), arity)
}

/// Substitutes every pattern-variable symbol in `body` with its bound
/// value. Used for `SetDelayed` rule bodies, which are re-evaluated fresh
/// on every dispatch rather than cached from registration time.
pub(crate) fn substitute(body: &Expr, bindings: &crate::pattern::Bindings) -> Expr {
    match body {
        Expr::Sym(s) => bindings.get(s).cloned().unwrap_or_else(|| body.clone()),
        Expr::Compound(c) => {
            let elements: Vec<Expr> = c.elements.iter().map(|e| substitute(e, bindings)).collect();
            Expr::Compound(Arc::new(crate::expr::CompoundData { elements }))
        }
        _ => body.clone(),
    }
}
