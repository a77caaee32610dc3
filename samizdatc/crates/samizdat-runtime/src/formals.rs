//! Formal-argument shapes and arity (spec 4.6.2).

use samizdat_gc::{Gc, Heap};
use samizdat_util::ClassId;

use crate::error::{Result, RuntimeError};
use crate::types::list;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Normal,
    /// `?` — zero or one actual.
    Optional,
    /// `*` — zero or more.
    Star,
    /// `+` — one or more.
    Plus,
}

#[derive(Debug, Clone)]
pub struct Formal {
    /// `None` means "ignore this argument" (spec 4.6.2).
    pub name: Option<samizdat_util::symbol::Symbol>,
    pub repeat: Repeat,
}

/// `(minArgs, maxArgs)`; `maxArgs == None` means unbounded (spec 4.2,
/// 4.6.2: "max = infinity if any star/plus present").
pub fn arity(formals: &[Formal]) -> (usize, Option<usize>) {
    let min = formals
        .iter()
        .filter(|f| matches!(f.repeat, Repeat::Normal | Repeat::Plus))
        .count();
    let unbounded = formals.iter().any(|f| matches!(f.repeat, Repeat::Star | Repeat::Plus));
    if unbounded {
        (min, None)
    } else {
        let max = formals
            .iter()
            .filter(|f| matches!(f.repeat, Repeat::Normal | Repeat::Optional))
            .count();
        (min, Some(max))
    }
}

/// Binds `actuals` against `formals`, left to right. `?` always produces
/// a list of zero or one elements (spec 9's Open Question #1, resolved
/// per `closure.c`'s actual behavior rather than the spec's hedge — see
/// DESIGN.md). `*`/`+` collect the remaining actuals into a list; `+`
/// additionally requires at least one element once its turn comes (this
/// is already guaranteed by the arity check the caller performs before
/// binding).
///
/// Returns `(name, value)` pairs in formal order; a formal with
/// `name == None` is bound but the caller should not insert it into the
/// frame.
pub fn bind(
    heap: &Heap,
    list_class: ClassId,
    formals: &[Formal],
    actuals: &[Value],
    name: &str,
) -> Result<Vec<(Option<samizdat_util::symbol::Symbol>, Value)>> {
    let (min, max) = arity(formals);
    if actuals.len() < min || max.is_some_and(|m| actuals.len() > m) {
        return Err(RuntimeError::Arity {
            name: name.to_string(),
            min,
            max,
            got: actuals.len(),
        });
    }

    let mut out = Vec::with_capacity(formals.len());
    let mut cursor = 0usize;
    // Number of actuals that must be reserved for formals still to come
    // after a `*`/`+` collector, so the collector doesn't over-consume.
    let trailing_fixed = |from: usize| -> usize {
        formals[from..]
            .iter()
            .filter(|f| matches!(f.repeat, Repeat::Normal | Repeat::Plus | Repeat::Optional))
            .count()
    };

    for (i, formal) in formals.iter().enumerate() {
        match formal.repeat {
            Repeat::Normal => {
                out.push((formal.name, actuals[cursor]));
                cursor += 1;
            }
            Repeat::Optional => {
                let remaining_after = trailing_fixed(i + 1);
                let has_value = actuals.len() - cursor > remaining_after;
                let value = if has_value {
                    let v = actuals[cursor];
                    cursor += 1;
                    Some(v)
                } else {
                    None
                };
                let items: Vec<Value> = value.into_iter().collect();
                out.push((formal.name, Value::List(list::from_array(heap, list_class, items))));
            }
            Repeat::Star | Repeat::Plus => {
                let remaining_after = trailing_fixed(i + 1);
                let take = actuals.len() - cursor - remaining_after;
                let items = actuals[cursor..cursor + take].to_vec();
                cursor += take;
                out.push((formal.name, Value::List(list::from_array(heap, list_class, items))));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal(sym: Option<samizdat_util::symbol::Symbol>) -> Formal {
        Formal { name: sym, repeat: Repeat::Normal }
    }

    #[test]
    fn arity_with_rest_is_unbounded() {
        let formals = vec![Formal { name: None, repeat: Repeat::Star }];
        assert_eq!(arity(&formals), (0, None));
    }

    #[test]
    fn arity_all_normal() {
        let formals = vec![normal(None), normal(None)];
        assert_eq!(arity(&formals), (2, Some(2)));
    }

    #[test]
    fn bind_rest_collects_tail() {
        let heap = Heap::new();
        let formals = vec![Formal { name: None, repeat: Repeat::Star }];
        let actuals = vec![
            Value::Int(crate::types::int::alloc(&heap, ClassId(0), 1)),
            Value::Int(crate::types::int::alloc(&heap, ClassId(0), 2)),
            Value::Int(crate::types::int::alloc(&heap, ClassId(0), 3)),
        ];
        let bound = bind(&heap, ClassId(1), &formals, &actuals, "test").unwrap();
        assert_eq!(bound.len(), 1);
        let Value::List(l) = bound[0].1 else { panic!("expected list") };
        assert_eq!(crate::types::list::size(l), 3);
    }

    #[test]
    fn bind_optional_produces_empty_list_when_absent() {
        let heap = Heap::new();
        let formals = vec![Formal { name: None, repeat: Repeat::Optional }];
        let bound = bind(&heap, ClassId(1), &formals, &[], "test").unwrap();
        let Value::List(l) = bound[0].1 else { panic!("expected list") };
        assert_eq!(crate::types::list::size(l), 0);
    }

    #[test]
    fn wrong_arity_is_an_error() {
        let heap = Heap::new();
        let formals = vec![normal(None), normal(None)];
        let actuals = vec![Value::Int(crate::types::int::alloc(&heap, ClassId(0), 1))];
        assert!(bind(&heap, ClassId(1), &formals, &actuals, "test").is_err());
    }
}
