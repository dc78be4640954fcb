//! List intrinsics: construction, mutation, queries, and the
//! higher-order trio (`map`, `filter`, `reduce`).
//!
//! Mutating functions operate through the shared list handle, so the
//! change is visible to every reference to the same list.

use kyaro_util::{KyaroError, Result};

use super::{check_arity, check_arity_range, integer, list, string, Registry};
use crate::interp::{compare_values, Interpreter};
use crate::value::Value;

pub(super) fn register(registry: &mut Registry) {
    registry.add("range", range);
    registry.add("append", |_, args| push_item("append", args));
    registry.add("push", |_, args| push_item("push", args));
    registry.add("pop", pop);
    registry.add("reverse", reverse);
    registry.add("sort", sort);
    registry.add("sorted", sorted);
    registry.add("all", |_, args| fold_truthy("all", args, true));
    registry.add("any", |_, args| fold_truthy("any", args, false));
    registry.add("count", count);
    registry.add("index", index_of);
    registry.add("insert", insert);
    registry.add("remove", remove);
    registry.add("clear", clear);
    registry.add("copy", copy);
    registry.add("extend", extend);
    registry.add("zip", zip);
    registry.add("enumerate", enumerate);
    registry.add("unique", unique);
    registry.add("flatten", flatten);
    registry.add("map", map);
    registry.add("filter", filter);
    registry.add("reduce", reduce);
}

/// `range(end)`, `range(start, end)`, or `range(start, end, step)`.
fn range(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity_range("range", &args, 1, 3)?;
    let (start, end) = match args.len() {
        1 => (0, integer("range", &args[0])?),
        _ => (integer("range", &args[0])?, integer("range", &args[1])?),
    };
    let step = match args.get(2) {
        Some(value) => integer("range", value)?,
        None => 1,
    };
    if step == 0 {
        return Err(KyaroError::runtime_plain("range() step must not be zero"));
    }

    let mut out = Vec::new();
    let mut i = start;
    while (step > 0 && i < end) || (step < 0 && i > end) {
        out.push(Value::Int(i));
        i += step;
    }
    Ok(Value::list(out))
}

/// Appends an item in place. `append` and `push` are aliases.
fn push_item(name: &str, args: Vec<Value>) -> Result<Value> {
    check_arity(name, &args, 2)?;
    let items = list(name, &args[0])?;
    items.borrow_mut().push(args[1].clone());
    Ok(Value::Null)
}

/// Removes and returns the element at `index` (default the last).
fn pop(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity_range("pop", &args, 1, 2)?;
    let items = list("pop", &args[0])?;
    let mut items = items.borrow_mut();
    if items.is_empty() {
        return Err(KyaroError::runtime_plain("pop from empty list"));
    }
    let idx = match args.get(1) {
        Some(value) => integer("pop", value)?,
        None => -1,
    };
    let len = items.len() as i64;
    let idx = if idx < 0 { idx + len } else { idx };
    if !(0..len).contains(&idx) {
        return Err(KyaroError::runtime_plain("pop index out of range"));
    }
    Ok(items.remove(idx as usize))
}

fn reverse(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("reverse", &args, 1)?;
    let items = list("reverse", &args[0])?;
    items.borrow_mut().reverse();
    Ok(Value::Null)
}

/// Sorts a copy of the elements, failing cleanly on unordered kinds.
fn sort_items(items: &[Value]) -> Result<Vec<Value>> {
    let mut sorted = items.to_vec();
    let mut error = None;
    sorted.sort_by(|a, b| match compare_values(a, b) {
        Ok(ord) => ord,
        Err(e) => {
            error.get_or_insert(e);
            std::cmp::Ordering::Equal
        }
    });
    match error {
        Some(e) => Err(e),
        None => Ok(sorted),
    }
}

/// Sorts in place.
fn sort(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("sort", &args, 1)?;
    let items = list("sort", &args[0])?;
    let sorted = sort_items(&items.borrow())?;
    *items.borrow_mut() = sorted;
    Ok(Value::Null)
}

/// Returns a sorted copy.
fn sorted(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("sorted", &args, 1)?;
    let items = list("sorted", &args[0])?;
    let sorted = sort_items(&items.borrow())?;
    Ok(Value::list(sorted))
}

/// `all` (want_all = true) or `any` over element truthiness.
fn fold_truthy(name: &str, args: Vec<Value>, want_all: bool) -> Result<Value> {
    check_arity(name, &args, 1)?;
    let items = list(name, &args[0])?;
    let items = items.borrow();
    let result = if want_all {
        items.iter().all(Value::is_truthy)
    } else {
        items.iter().any(Value::is_truthy)
    };
    Ok(Value::Bool(result))
}

/// Occurrences of an element in a list, or of a substring in a string.
fn count(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("count", &args, 2)?;
    match &args[0] {
        Value::List(items) => {
            let n = items.borrow().iter().filter(|item| **item == args[1]).count();
            Ok(Value::Int(n as i64))
        }
        Value::Str(text) => {
            let needle = string("count", &args[1])?;
            Ok(Value::Int(text.matches(&*needle).count() as i64))
        }
        _ => Err(KyaroError::runtime_plain(
            "count() requires a list or string",
        )),
    }
}

/// Position of the first matching element or substring.
fn index_of(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("index", &args, 2)?;
    let found = match &args[0] {
        Value::List(items) => items.borrow().iter().position(|item| *item == args[1]),
        Value::Str(text) => {
            let needle = string("index", &args[1])?;
            text.find(&*needle)
                .map(|byte| text[..byte].chars().count())
        }
        _ => {
            return Err(KyaroError::runtime_plain(
                "index() requires a list or string",
            ))
        }
    };
    match found {
        Some(pos) => Ok(Value::Int(pos as i64)),
        None => Err(KyaroError::runtime_plain("index(): item not found")),
    }
}

/// Inserts before `index`, clamping like negative-index slicing does.
fn insert(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("insert", &args, 3)?;
    let items = list("insert", &args[0])?;
    let mut items = items.borrow_mut();
    let len = items.len() as i64;
    let idx = integer("insert", &args[1])?;
    let idx = if idx < 0 { idx + len } else { idx };
    let idx = idx.clamp(0, len) as usize;
    items.insert(idx, args[2].clone());
    Ok(Value::Null)
}

/// Removes the first element equal to the given item.
fn remove(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("remove", &args, 2)?;
    let items = list("remove", &args[0])?;
    let mut items = items.borrow_mut();
    match items.iter().position(|item| *item == args[1]) {
        Some(pos) => {
            items.remove(pos);
            Ok(Value::Null)
        }
        None => Err(KyaroError::runtime_plain("remove(): item not found")),
    }
}

fn clear(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("clear", &args, 1)?;
    let items = list("clear", &args[0])?;
    items.borrow_mut().clear();
    Ok(Value::Null)
}

/// A shallow copy with fresh identity.
fn copy(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("copy", &args, 1)?;
    let items = list("copy", &args[0])?;
    let copied = items.borrow().clone();
    Ok(Value::list(copied))
}

/// Appends all of the second list onto the first, in place.
fn extend(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("extend", &args, 2)?;
    let target = list("extend", &args[0])?;
    let source = list("extend", &args[1])?;
    let extra = source.borrow().clone();
    target.borrow_mut().extend(extra);
    Ok(Value::Null)
}

/// Transposes the argument lists into rows, stopping at the shortest.
fn zip(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    let mut columns = Vec::with_capacity(args.len());
    for arg in &args {
        columns.push(list("zip", arg)?.borrow().clone());
    }
    let rows = columns.iter().map(Vec::len).min().unwrap_or(0);

    let mut out = Vec::with_capacity(rows);
    for row in 0..rows {
        out.push(Value::list(
            columns.iter().map(|col| col[row].clone()).collect(),
        ));
    }
    Ok(Value::list(out))
}

/// Pairs each element with its index: `[[i, item], ...]`.
fn enumerate(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity_range("enumerate", &args, 1, 2)?;
    let items = list("enumerate", &args[0])?;
    let start = match args.get(1) {
        Some(value) => integer("enumerate", value)?,
        None => 0,
    };
    let out = items
        .borrow()
        .iter()
        .enumerate()
        .map(|(i, item)| Value::list(vec![Value::Int(start + i as i64), item.clone()]))
        .collect();
    Ok(Value::list(out))
}

/// First occurrences, in order.
fn unique(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("unique", &args, 1)?;
    let items = list("unique", &args[0])?;
    let items = items.borrow();
    let mut seen: Vec<Value> = Vec::new();
    for item in items.iter() {
        if !seen.contains(item) {
            seen.push(item.clone());
        }
    }
    Ok(Value::list(seen))
}

/// Recursively flattens nested lists.
fn flatten(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("flatten", &args, 1)?;
    let items = list("flatten", &args[0])?;
    let mut out = Vec::new();
    flatten_into(&items.borrow(), &mut out);
    Ok(Value::list(out))
}

fn flatten_into(items: &[Value], out: &mut Vec<Value>) {
    for item in items {
        match item {
            Value::List(nested) => flatten_into(&nested.borrow(), out),
            other => out.push(other.clone()),
        }
    }
}

/// Applies a callable to each element, collecting the results.
fn map(interp: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("map", &args, 2)?;
    let items = list("map", &args[1])?;
    let snapshot = items.borrow().clone();
    let mut out = Vec::with_capacity(snapshot.len());
    for item in snapshot {
        out.push(interp.call_value(args[0].clone(), vec![item])?);
    }
    Ok(Value::list(out))
}

/// Keeps the elements for which the callable returns a truthy value.
fn filter(interp: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("filter", &args, 2)?;
    let items = list("filter", &args[1])?;
    let snapshot = items.borrow().clone();
    let mut out = Vec::new();
    for item in snapshot {
        if interp
            .call_value(args[0].clone(), vec![item.clone()])?
            .is_truthy()
        {
            out.push(item);
        }
    }
    Ok(Value::list(out))
}

/// Folds the list with a two-argument callable, optionally seeded.
fn reduce(interp: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity_range("reduce", &args, 2, 3)?;
    let items = list("reduce", &args[1])?;
    let snapshot = items.borrow().clone();
    let mut iter = snapshot.into_iter();

    let mut acc = match args.get(2) {
        Some(initial) => initial.clone(),
        None => iter.next().ok_or_else(|| {
            KyaroError::runtime_plain("reduce() of empty list with no initial value")
        })?,
    };
    for item in iter {
        acc = interp.call_value(args[0].clone(), vec![acc, item])?;
    }
    Ok(acc)
}
