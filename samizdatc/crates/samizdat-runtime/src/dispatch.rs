//! Call dispatch (spec 4.2).
//!
//! Two entry points: [`call`] (the general "invoke this value as a
//! callee" path a `@call` executable node uses) and [`method_call`] (the
//! direct, selector-indexed path a `.selector(...)` use reaches for, and
//! that every class-method-table lookup ultimately bottoms out in).
//! [`apply`] is `@apply`'s trailing-list-spread sibling of `call`.

use samizdat_util::SymbolIndex;

use crate::error::{EvalResult, Flow, RuntimeError};
use crate::interp;
use crate::runtime::Runtime;
use crate::types::{builtin, class, jump, symbol};
use crate::value::Value;

/// `call(callee, args)` (spec 4.2): Builtin, Jump, Symbol, and Closure
/// are callable directly; anything else is redirected to
/// `methodCall(callee, 'call', args)`, which — since `method_call`
/// always prepends the receiver as the method's first actual argument —
/// already produces exactly the spec's "prepend the callee as the first
/// argument and invoke the `call` symbol on it" without a second,
/// separate prepend here.
pub fn call(rt: &Runtime, callee: Value, args: &[Value]) -> EvalResult {
    match callee {
        Value::Builtin(b) => {
            if !builtin::in_arity(b, args.len()) {
                return Err(Flow::Error(RuntimeError::Arity {
                    name: b.name.to_string(),
                    min: b.min_args,
                    max: b.max_args,
                    got: args.len(),
                }));
            }
            (b.func)(rt, builtin::state(b), args)
        }
        Value::Jump(j) => jump::call(j, args),
        Value::Symbol(s) => symbol_call(rt, s, args),
        Value::Closure(c) => interp::call_closure(rt, c, args),
        other => method_call(rt, other, rt.call_selector(), args),
    }
}

/// `symbolCall` (spec 4.3): `args[0]` is the receiver, `self` is the
/// selector, the rest of `args` is the method's actual argument list.
fn symbol_call(rt: &Runtime, selector: samizdat_gc::Gc<crate::types::symbol::SymbolData>, args: &[Value]) -> EvalResult {
    let Some((receiver, rest)) = args.split_first() else {
        return Err(Flow::Error(RuntimeError::bad_operation(symbol::requires_receiver())));
    };
    let idx = SymbolIndex(selector.raw.index());
    method_call(rt, *receiver, idx, rest)
}

/// `methodCall(receiver, selector, args)` (spec 4.2): resolves `selector`
/// by walking `receiver`'s class upward from its own class (parent walk,
/// not a static copy — `class.rs`'s method tables are per-class-own-only
/// by design), then invokes the resolved method with `receiver`
/// prepended as its first actual argument.
pub fn method_call(rt: &Runtime, receiver: Value, selector: SymbolIndex, args: &[Value]) -> EvalResult {
    let class = rt.class_of(receiver.class_id());
    let method = resolve_instance_method(class, selector).ok_or_else(|| {
        Flow::Error(RuntimeError::UnresolvedMethod {
            class: crate::types::symbol::name(rt.interner(), class.name).to_string(),
            selector: format!("#{}", selector.0),
        })
    })?;

    let mut full_args = Vec::with_capacity(args.len() + 1);
    full_args.push(receiver);
    full_args.extend_from_slice(args);
    invoke_method_value(rt, method, &full_args)
}

/// `classMethodCall` — resolves `selector` against a class's *class*
/// method table (the table bound via `bindClassMethod`, spec 6), used
/// for class-level operations like constructors. Does not prepend a
/// receiver: a class method's first formal is whatever the binder chose.
pub fn class_method_call(
    rt: &Runtime,
    class: samizdat_gc::Gc<crate::types::class::ClassData>,
    selector: SymbolIndex,
    args: &[Value],
) -> EvalResult {
    let method = resolve_class_method(class, selector).ok_or_else(|| {
        Flow::Error(RuntimeError::UnresolvedMethod {
            class: crate::types::symbol::name(rt.interner(), class.name).to_string(),
            selector: format!("#{}", selector.0),
        })
    })?;
    invoke_method_value(rt, method, args)
}

fn invoke_method_value(rt: &Runtime, method: Value, args: &[Value]) -> EvalResult {
    // A bound method is itself just a callable value (Builtin or
    // Closure almost always); route it back through `call` rather than
    // duplicating the Builtin/Closure dispatch here.
    call(rt, method, args)
}

fn resolve_instance_method(
    mut class: samizdat_gc::Gc<crate::types::class::ClassData>,
    selector: SymbolIndex,
) -> Option<Value> {
    loop {
        if let Some(m) = class::own_instance_method(class, selector) {
            return Some(m);
        }
        class = class.parent?;
    }
}

fn resolve_class_method(
    mut class: samizdat_gc::Gc<crate::types::class::ClassData>,
    selector: SymbolIndex,
) -> Option<Value> {
    loop {
        if let Some(m) = class::own_class_method(class, selector) {
            return Some(m);
        }
        class = class.parent?;
    }
}

/// `@apply` (spec 4.6.5): like `call`, but the final actual is a list
/// whose elements spread as trailing positional arguments.
pub fn apply(rt: &Runtime, callee: Value, leading: &[Value], trailing: Value) -> EvalResult {
    let Some(list) = trailing.as_list() else {
        return Err(Flow::Error(RuntimeError::bad_value("apply's spread argument must be a List")));
    };
    let spread = crate::types::list::array_of(list);
    let mut args = Vec::with_capacity(leading.len() + spread.len());
    args.extend_from_slice(leading);
    args.extend(spread);
    call(rt, callee, &args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::int;

    fn noop_builtin(rt: &Runtime, args_min: usize, args_max: Option<usize>) -> Value {
        fn f(_rt: &Runtime, _state: Option<Value>, args: &[Value]) -> EvalResult {
            Ok(args.first().copied())
        }
        Value::Builtin(builtin::make(rt.heap(), rt.classes().builtin, args_min, args_max, "noop", f, None))
    }

    #[test]
    fn calling_a_builtin_checks_arity() {
        let rt = Runtime::new();
        let b = noop_builtin(&rt, 1, Some(1));
        let err = call(&rt, b, &[]).unwrap_err();
        assert!(matches!(err, Flow::Error(RuntimeError::Arity { .. })));
    }

    #[test]
    fn calling_a_builtin_within_arity_invokes_it() {
        let rt = Runtime::new();
        let b = noop_builtin(&rt, 1, Some(1));
        let n = Value::Int(int::alloc(rt.heap(), rt.classes().int, 9));
        let result = call(&rt, b, &[n]).unwrap();
        assert!(result.unwrap().is_same(&n));
    }

    #[test]
    fn method_call_walks_up_to_parent_binding() {
        let rt = Runtime::new();
        let selector = SymbolIndex(rt.interner().intern("greet").index());
        let method = noop_builtin(&rt, 1, Some(1));
        class::bind_instance_method(rt.class_of(rt.classes().data), selector, method);

        let receiver = Value::Int(int::alloc(rt.heap(), rt.classes().int, 1));
        let result = method_call(&rt, receiver, selector, &[]).unwrap();
        assert!(result.unwrap().is_same(&receiver));
    }

    #[test]
    fn unresolved_method_is_an_error() {
        let rt = Runtime::new();
        let selector = SymbolIndex(rt.interner().intern("nope").index());
        let receiver = Value::Int(int::alloc(rt.heap(), rt.classes().int, 1));
        let err = method_call(&rt, receiver, selector, &[]).unwrap_err();
        assert!(matches!(err, Flow::Error(RuntimeError::UnresolvedMethod { .. })));
    }
}
