//! Translation of source nodes into executable nodes, and execution of
//! the latter (spec 4.6).
//!
//! Source nodes arrive as ordinary `Record` values (tagged with a
//! `@nodeKind` name symbol); [`translate`] walks that tree once into an
//! [`ExecNode`] tree that [`eval`] then runs directly, with no further
//! per-call re-decoding of the Record shape — mirroring the reference's
//! split between a one-time "compile" pass and repeated execution.

use std::rc::Rc;

use samizdat_util::symbol::Symbol;
use samizdat_util::SymbolIndex;

use crate::error::{EvalResult, Flow, Result, RuntimeError};
use crate::frame::{self, FrameData};
use crate::runtime::Runtime;
use crate::types::{boxed, class, closure, jump, record, symbol};
use crate::value::Value;
use crate::{formals, types};
use samizdat_gc::Gc;

/// Which of the four box flavors a `@varDef` node constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarDefBoxKind {
    Cell,
    Promise,
    Result,
    /// Not a distinct box shape in this implementation (spec 3.4 lists
    /// only `cell`/`promise`/`result`) — a `lazy` definition is
    /// evaluated eagerly and stored exactly like `result` (frozen,
    /// single write at definition time). True laziness would need a
    /// thunk-carrying value this runtime doesn't have; see DESIGN.md.
    Lazy,
}

pub enum ExecNode {
    Literal(Value),
    VarRef(Symbol),
    Fetch(Box<ExecNode>),
    Store(Box<ExecNode>, Box<ExecNode>),
    Call { target: Box<ExecNode>, selector: Option<Symbol>, values: Vec<ExecNode> },
    /// The last entry of `values` spreads as trailing positional args
    /// (spec 4.6.5's `@apply`).
    Apply { target: Box<ExecNode>, selector: Option<Symbol>, values: Vec<ExecNode> },
    Maybe(Box<ExecNode>),
    NoYield(Box<ExecNode>),
    Closure(Rc<closure::ClosureTemplate>),
    VarDef { kind: VarDefBoxKind, name: Symbol, value: Box<ExecNode> },
    ImportModule(String),
    Void,
}

fn field(rt: &Runtime, name: &str) -> Value {
    Value::Symbol(symbol::alloc(rt.heap(), rt.classes().symbol, rt.interner().intern(name)))
}

fn expect_field(rt: &Runtime, rec: Gc<types::record::RecordData>, name: &str) -> Result<Value> {
    record::get(rec, field(rt, name)).ok_or_else(|| RuntimeError::bad_value(format!("node is missing field '{name}'")))
}

fn expect_symbol(v: Value, what: &str) -> Result<Symbol> {
    v.as_symbol().map(|s| s.raw).ok_or_else(|| RuntimeError::bad_value(format!("{what} must be a Symbol")))
}

fn expect_list(v: Value, what: &str) -> Result<Vec<Value>> {
    v.as_list().map(types::list::array_of).ok_or_else(|| RuntimeError::bad_value(format!("{what} must be a List")))
}

fn expect_record(v: Value, what: &str) -> Result<Gc<types::record::RecordData>> {
    v.as_record().ok_or_else(|| RuntimeError::bad_value(format!("{what} must be a source node (Record)")))
}

/// Translates one source node (spec 4.6.1). Recurses into every nested
/// source-node field.
pub fn translate(rt: &Runtime, source: Value) -> Result<ExecNode> {
    let rec = expect_record(source, "source node")?;
    let kind = symbol::name(rt.interner(), rec.name);

    match kind {
        "@literal" => Ok(ExecNode::Literal(expect_field(rt, rec, "value")?)),

        "@varRef" => {
            let name = expect_symbol(expect_field(rt, rec, "name")?, "@varRef's name")?;
            Ok(ExecNode::VarRef(name))
        }

        "@fetch" => {
            let target = translate(rt, expect_field(rt, rec, "target")?)?;
            Ok(ExecNode::Fetch(Box::new(target)))
        }

        "@store" => {
            let target = translate(rt, expect_field(rt, rec, "target")?)?;
            let value = translate(rt, expect_field(rt, rec, "value")?)?;
            Ok(ExecNode::Store(Box::new(target), Box::new(value)))
        }

        "@maybe" => Ok(ExecNode::Maybe(Box::new(translate(rt, expect_field(rt, rec, "target")?)?))),

        "@noYield" => Ok(ExecNode::NoYield(Box::new(translate(rt, expect_field(rt, rec, "target")?)?))),

        "@void" => Ok(ExecNode::Void),

        "@importModule" => {
            let name_val = expect_field(rt, rec, "name")?;
            let name = match name_val.as_str() {
                Some(s) => types::string::utf8_of(s),
                None => symbol::name(rt.interner(), expect_symbol(name_val, "@importModule's name")?).to_string(),
            };
            Ok(ExecNode::ImportModule(name))
        }

        "@varDef" => {
            let kind_sym = symbol::name(rt.interner(), expect_symbol(expect_field(rt, rec, "box")?, "@varDef's box")?);
            let kind = match kind_sym {
                "cell" => VarDefBoxKind::Cell,
                "promise" => VarDefBoxKind::Promise,
                "result" => VarDefBoxKind::Result,
                "lazy" => VarDefBoxKind::Lazy,
                other => return Err(RuntimeError::bad_value(format!("unknown box kind '{other}'"))),
            };
            let name = expect_symbol(expect_field(rt, rec, "name")?, "@varDef's name")?;
            let value = translate(rt, expect_field(rt, rec, "value")?)?;
            Ok(ExecNode::VarDef { kind, name, value: Box::new(value) })
        }

        "@call" | "@apply" => {
            let target = translate(rt, expect_field(rt, rec, "target")?)?;
            let selector = match record::get(rec, field(rt, "selector")) {
                Some(v) => Some(expect_symbol(v, "selector")?),
                None => None,
            };
            let values = expect_list(expect_field(rt, rec, "values")?, "values")?
                .into_iter()
                .map(|v| translate(rt, v))
                .collect::<Result<Vec<_>>>()?;
            if kind == "@call" {
                Ok(ExecNode::Call { target: Box::new(target), selector, values })
            } else {
                if values.is_empty() {
                    return Err(RuntimeError::bad_value("@apply requires at least the spread argument"));
                }
                Ok(ExecNode::Apply { target: Box::new(target), selector, values })
            }
        }

        "@closure" => Ok(ExecNode::Closure(Rc::new(translate_closure(rt, rec)?))),

        other => Err(RuntimeError::bad_value(format!("unknown source node kind '{other}'"))),
    }
}

fn translate_closure(rt: &Runtime, rec: Gc<types::record::RecordData>) -> Result<closure::ClosureTemplate> {
    let formals_list = expect_list(expect_field(rt, rec, "formals")?, "formals")?;
    let formals = formals_list.into_iter().map(|f| translate_formal(rt, f)).collect::<Result<Vec<_>>>()?;

    let statements = expect_list(expect_field(rt, rec, "statements")?, "statements")?
        .into_iter()
        .map(|s| translate(rt, s))
        .collect::<Result<Vec<_>>>()?;

    let yield_expr = match record::get(rec, field(rt, "yieldExpr")) {
        Some(v) => Some(translate(rt, v)?),
        None => None,
    };

    let yield_def = match record::get(rec, field(rt, "yieldDef")) {
        Some(v) => Some(expect_symbol(v, "yieldDef")?),
        None => None,
    };

    let debug_name = match record::get(rec, field(rt, "name")) {
        Some(v) => v.as_symbol().map(|s| symbol::name(rt.interner(), s).to_string()),
        None => None,
    };

    Ok(closure::ClosureTemplate { formals, statements, yield_expr, yield_def, debug_name })
}

/// Each formal is itself a small Record: `{name: symbol|void, repeat:
/// symbol}`, `repeat` one of `normal`/`optional`/`star`/`plus`. A
/// `name` of void marks an ignored positional argument (spec 4.6.2).
fn translate_formal(rt: &Runtime, v: Value) -> Result<formals::Formal> {
    let rec = expect_record(v, "formal")?;
    let name = match record::get(rec, field(rt, "name")) {
        Some(n) => Some(expect_symbol(n, "formal's name")?),
        None => None,
    };
    let repeat_sym = symbol::name(rt.interner(), expect_symbol(expect_field(rt, rec, "repeat")?, "formal's repeat")?);
    let repeat = match repeat_sym {
        "normal" => formals::Repeat::Normal,
        "optional" => formals::Repeat::Optional,
        "star" => formals::Repeat::Star,
        "plus" => formals::Repeat::Plus,
        other => return Err(RuntimeError::bad_value(format!("unknown formal repeat kind '{other}'"))),
    };
    Ok(formals::Formal { name, repeat })
}

/// Runs one executable node against a live frame (spec 4.6.5's statement
/// shapes double as expression shapes — there is no separate expression
/// grammar).
pub fn eval(rt: &Runtime, frame: Gc<FrameData>, node: &ExecNode) -> EvalResult {
    match node {
        ExecNode::Literal(v) => Ok(Some(*v)),

        ExecNode::VarRef(name) => {
            let b = frame::lookup(frame, *name)
                .ok_or_else(|| RuntimeError::bad_operation("reference to an undefined variable"))?;
            Ok(boxed::fetch(b))
        }

        ExecNode::Fetch(target) => {
            let b = eval_box(rt, frame, target)?;
            Ok(boxed::fetch(b))
        }

        ExecNode::Store(target, value) => {
            let b = eval_box(rt, frame, target)?;
            let v = eval(rt, frame, value)?.ok_or_else(|| RuntimeError::bad_value("cannot store a void value"))?;
            boxed::store(b, v)?;
            Ok(Some(v))
        }

        ExecNode::Call { target, selector, values } => {
            let callee = eval(rt, frame, target)?.ok_or_else(|| RuntimeError::bad_value("call target is void"))?;
            let args = eval_all(rt, frame, values)?;
            match selector {
                Some(sym) => crate::dispatch::method_call(rt, callee, SymbolIndex(sym.index()), &args),
                None => crate::dispatch::call(rt, callee, &args),
            }
        }

        ExecNode::Apply { target, selector, values } => {
            let callee = eval(rt, frame, target)?.ok_or_else(|| RuntimeError::bad_value("apply target is void"))?;
            let (leading_nodes, spread_node) = values.split_at(values.len() - 1);
            let leading = eval_all(rt, frame, leading_nodes)?;
            let spread = eval(rt, frame, &spread_node[0])?.ok_or_else(|| RuntimeError::bad_value("apply's spread argument is void"))?;
            match selector {
                None => crate::dispatch::apply(rt, callee, &leading, spread),
                Some(sym) => {
                    let list = spread.as_list().ok_or_else(|| RuntimeError::bad_value("apply's spread argument must be a List"))?;
                    let mut args = leading;
                    args.extend(types::list::array_of(list));
                    crate::dispatch::method_call(rt, callee, SymbolIndex(sym.index()), &args)
                }
            }
        }

        ExecNode::Maybe(inner) => eval(rt, frame, inner),

        ExecNode::NoYield(inner) => {
            eval(rt, frame, inner)?;
            Ok(None)
        }

        ExecNode::Closure(template) => {
            let c = closure::make(rt.heap(), rt.classes().closure, Some(frame), template.clone());
            Ok(Some(Value::Closure(c)))
        }

        ExecNode::VarDef { kind, name, value } => {
            let v = eval(rt, frame, value)?;
            let heap = rt.heap();
            let box_class = rt.classes().box_;
            let b = match kind {
                VarDefBoxKind::Cell => boxed::make_cell(heap, box_class, v),
                VarDefBoxKind::Promise => {
                    let b = boxed::make_promise(heap, box_class);
                    if let Some(val) = v {
                        boxed::store(b, val)?;
                    }
                    b
                }
                VarDefBoxKind::Result | VarDefBoxKind::Lazy => {
                    let val = v.ok_or_else(|| RuntimeError::bad_value("result/lazy definition requires a value"))?;
                    boxed::make_result(heap, box_class, val)
                }
            };
            frame::define(frame, *name, b)?;
            Ok(Some(Value::Boxed(b)))
        }

        ExecNode::ImportModule(name) => rt
            .resolve_module(name)
            .map(Some)
            .ok_or_else(|| RuntimeError::bad_operation(format!("module '{name}' is not registered")).into()),

        ExecNode::Void => Ok(None),
    }
}

/// Evaluates `node` for its *box*, not the value stored in it — what
/// `@fetch`/`@store`'s target sub-expression need. A bare `@varRef` names
/// the box directly (matching `frameGet()`, which never auto-derefs); any
/// other expression must itself evaluate to a `Value::Boxed`.
fn eval_box(rt: &Runtime, frame: Gc<FrameData>, node: &ExecNode) -> std::result::Result<Gc<boxed::BoxData>, Flow> {
    if let ExecNode::VarRef(name) = node {
        return frame::lookup(frame, *name)
            .ok_or_else(|| RuntimeError::bad_operation("reference to an undefined variable").into());
    }
    let v = eval(rt, frame, node)?.ok_or_else(|| RuntimeError::bad_value("fetch/store target is void"))?;
    v.as_boxed().ok_or_else(|| RuntimeError::bad_value("fetch/store target is not a Box").into())
}

fn eval_all(rt: &Runtime, frame: Gc<FrameData>, nodes: &[ExecNode]) -> std::result::Result<Vec<Value>, Flow> {
    nodes
        .iter()
        .map(|n| eval(rt, frame, n)?.ok_or_else(|| RuntimeError::bad_value("argument is void").into()))
        .collect()
}

/// Constructs and runs a closure call (spec 4.6.3): fresh frame, bind
/// formals, arm the `yieldDef` jump if declared, run statements, yield
/// the final expression (or void), and on a matching nonlocal jump,
/// unwind straight to that value instead.
pub fn call_closure(rt: &Runtime, c: Gc<closure::ClosureData>, args: &[Value]) -> EvalResult {
    let heap = rt.heap();
    let template = c.template.clone();
    let parent = closure::captured_frame(c);
    let frame = frame::new_frame(heap, rt.classes().frame, parent, Some(c));

    let name = template.debug_name.as_deref().unwrap_or("closure");
    let bound = formals::bind(heap, rt.classes().list, &template.formals, args, name)?;
    for (name_opt, value) in bound {
        if let Some(formal_name) = name_opt {
            let b = boxed::make_cell(heap, rt.classes().box_, Some(value));
            frame::define(frame, formal_name, b)?;
        }
    }

    let armed = match template.yield_def {
        Some(yield_name) => {
            let jump_id = rt.next_jump_id();
            let j = jump::arm(heap, rt.classes().jump, jump_id);
            let b = boxed::make_cell(heap, rt.classes().box_, Some(Value::Jump(j)));
            frame::define(frame, yield_name, b)?;
            Some((jump_id, j))
        }
        None => None,
    };

    let result = run_body(rt, frame, &template);

    if let Some((jump_id, j)) = armed {
        jump::retire(j);
        if let Err(Flow::Jump(ref unwind)) = result {
            if unwind.jump_id == jump_id {
                return Ok(unwind.value);
            }
        }
    }
    result
}

fn run_body(rt: &Runtime, frame: Gc<FrameData>, template: &closure::ClosureTemplate) -> EvalResult {
    for stmt in &template.statements {
        eval(rt, frame, stmt)?;
    }
    match &template.yield_expr {
        Some(y) => eval(rt, frame, y),
        None => Ok(None),
    }
}

/// Two-pass mutual-recursion construction for a batch of sibling
/// function definitions (spec 9's supplemented `execFnDefs`): every
/// closure is built first against an unset frame so its name can be
/// bound into the shared frame before any of them actually captures it,
/// then each is re-pointed at the now-fully-populated frame via
/// [`closure::recapture`] — letting `f` and `g` in `fn f() = g() fn g()
/// = f()` resolve each other regardless of definition order.
pub fn exec_fn_defs(
    rt: &Runtime,
    frame: Gc<FrameData>,
    defs: &[(Symbol, Rc<closure::ClosureTemplate>)],
) -> Result<Vec<Value>> {
    let heap = rt.heap();
    let mut closures = Vec::with_capacity(defs.len());
    for (_, template) in defs {
        closures.push(closure::make(heap, rt.classes().closure, None, template.clone()));
    }
    for ((name, _), c) in defs.iter().zip(&closures) {
        let b = boxed::make_cell(heap, rt.classes().box_, Some(Value::Closure(*c)));
        frame::define(frame, *name, b)?;
    }
    for c in &closures {
        closure::recapture(*c, frame);
    }
    Ok(closures.into_iter().map(Value::Closure).collect())
}
