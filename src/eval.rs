//! Path-tracking evaluator: walks a document according to a compiled [`JsonPath`].

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::ast::{JsonPath, Selector, SortKey};
use crate::error::JsonPathError;
use crate::filter;
use crate::value::{Match, PathComponent};

/// Evaluate a compiled expression against a document, keeping both the matched value
/// and the path that reaches it.
pub(crate) fn eval_matches(path: &JsonPath, doc: &Value) -> Result<Vec<Match>, JsonPathError> {
    let mut working = vec![Match::new(doc.clone(), Vec::new())];
    for segment in &path.segments {
        let mut next = Vec::new();
        for m in &working {
            if segment.recursive {
                eval_recursive(&m.value, &segment.selectors, &m.path, &mut next, doc)?;
            } else {
                for selector in &segment.selectors {
                    eval_selector(&m.value, selector, &m.path, &mut next, doc)?;
                }
            }
        }
        working = next;
    }
    Ok(working)
}

/// Convenience wrapper over [`eval_matches`] for callers that only need values, such
/// as a filter's `@`/`$` sub-path evaluation.
pub(crate) fn eval_values(path: &JsonPath, doc: &Value) -> Result<Vec<Value>, JsonPathError> {
    Ok(eval_matches(path, doc)?.into_iter().map(|m| m.value).collect())
}

fn eval_recursive(
    value: &Value,
    selectors: &[Selector],
    current_path: &[PathComponent],
    out: &mut Vec<Match>,
    root: &Value,
) -> Result<(), JsonPathError> {
    for selector in selectors {
        eval_selector(value, selector, current_path, out, root)?;
    }
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                eval_recursive(child, selectors, &push(current_path, PathComponent::Key(key.clone())), out, root)?;
            }
        }
        Value::Array(arr) => {
            for (idx, child) in arr.iter().enumerate() {
                eval_recursive(child, selectors, &push(current_path, PathComponent::Index(idx)), out, root)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn eval_selector(
    value: &Value,
    selector: &Selector,
    current_path: &[PathComponent],
    out: &mut Vec<Match>,
    root: &Value,
) -> Result<(), JsonPathError> {
    match selector {
        Selector::Name(name) => {
            if let Value::Object(map) = value {
                if let Some(child) = map.get(name) {
                    out.push(Match::new(child.clone(), push(current_path, PathComponent::Key(name.clone()))));
                }
            }
        }
        Selector::Index(index) => {
            if let Value::Array(arr) = value {
                if let Some(idx) = normalize_index(*index, arr.len()) {
                    if let Some(child) = arr.get(idx) {
                        out.push(Match::new(child.clone(), push(current_path, PathComponent::Index(idx))));
                    }
                }
            }
        }
        Selector::Wildcard => match value {
            Value::Object(map) => {
                for (key, child) in map {
                    out.push(Match::new(child.clone(), push(current_path, PathComponent::Key(key.clone()))));
                }
            }
            Value::Array(arr) => {
                for (idx, child) in arr.iter().enumerate() {
                    out.push(Match::new(child.clone(), push(current_path, PathComponent::Index(idx))));
                }
            }
            _ => {}
        },
        Selector::Slice { start, end, step } => {
            if let Value::Array(arr) = value {
                for idx in slice_indices(arr.len(), *start, *end, *step) {
                    out.push(Match::new(arr[idx].clone(), push(current_path, PathComponent::Index(idx))));
                }
            }
        }
        Selector::Filter(expr) => match value {
            Value::Object(map) => {
                for (key, child) in map {
                    if filter::evaluate(expr, child, root)? {
                        out.push(Match::new(child.clone(), push(current_path, PathComponent::Key(key.clone()))));
                    }
                }
            }
            Value::Array(arr) => {
                for (idx, child) in arr.iter().enumerate() {
                    if filter::evaluate(expr, child, root)? {
                        out.push(Match::new(child.clone(), push(current_path, PathComponent::Index(idx))));
                    }
                }
            }
            _ => {}
        },
        Selector::Sort(keys) => {
            let items = sort_elements(value, keys)?;
            match items {
                Some(items) => {
                    for (idx, item) in items.into_iter().enumerate() {
                        out.push(Match::new(item, push(current_path, PathComponent::Index(idx))));
                    }
                }
                None => out.push(Match::new(value.clone(), current_path.to_vec())),
            }
        }
        Selector::Extract(keys) => match value {
            Value::Array(arr) => {
                for (idx, item) in arr.iter().enumerate() {
                    out.push(Match::new(
                        project_fields(item, keys),
                        push(current_path, PathComponent::Index(idx)),
                    ));
                }
            }
            other => out.push(Match::new(project_fields(other, keys), current_path.to_vec())),
        },
    }
    Ok(())
}

fn push(path: &[PathComponent], next: PathComponent) -> Vec<PathComponent> {
    let mut out = path.to_vec();
    out.push(next);
    out
}

fn normalize_index(index: isize, len: usize) -> Option<usize> {
    let resolved = if index < 0 { index + len as isize } else { index };
    usize::try_from(resolved).ok()
}

/// Python-style slice semantics: negative bounds count from the end, a negative step
/// walks backwards, and out-of-range bounds clamp rather than error.
fn slice_indices(len: usize, start: Option<isize>, end: Option<isize>, step: Option<isize>) -> Vec<usize> {
    let len_i = len as isize;
    let step = step.unwrap_or(1);
    if step == 0 {
        return Vec::new();
    }

    let clamp = |v: isize| -> isize {
        if v < 0 {
            (len_i + v).max(if step > 0 { 0 } else { -1 })
        } else {
            v.min(if step > 0 { len_i } else { len_i - 1 })
        }
    };

    let (default_start, default_end) = if step > 0 { (0, len_i) } else { (len_i - 1, -1) };
    let start = start.map(clamp).unwrap_or(default_start);
    let end = end.map(clamp).unwrap_or(default_end);

    let mut out = Vec::new();
    let mut i = start;
    if step > 0 {
        while i < end && i < len_i {
            if i >= 0 {
                out.push(i as usize);
            }
            i += step;
        }
    } else {
        while i > end && i >= 0 {
            if i < len_i {
                out.push(i as usize);
            }
            i += step;
        }
    }
    out
}

/// Sort the elements of an array or object's values, returning the resulting element
/// sequence so the caller can emit one `Match` per element. `None` means `value`
/// wasn't a sequence/mapping at all, so there's nothing to distribute over.
fn sort_elements(value: &Value, keys: &[SortKey]) -> Result<Option<Vec<Value>>, JsonPathError> {
    match value {
        Value::Array(arr) => {
            let mut items: Vec<Value> = arr.clone();
            sort_items(&mut items, keys)?;
            Ok(Some(items))
        }
        Value::Object(map) => {
            let mut items: Vec<Value> = map.values().cloned().collect();
            sort_items(&mut items, keys)?;
            Ok(Some(items))
        }
        _ => Ok(None),
    }
}

fn sort_items(items: &mut [Value], keys: &[SortKey]) -> Result<(), JsonPathError> {
    let mut error: Option<JsonPathError> = None;
    items.sort_by(|a, b| {
        if error.is_some() {
            return Ordering::Equal;
        }
        for key in keys {
            match compare_by_key(a, b, key) {
                Ok(Ordering::Equal) => continue,
                Ok(ord) => return ord,
                Err(e) => {
                    error = Some(e);
                    return Ordering::Equal;
                }
            }
        }
        Ordering::Equal
    });
    match error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn compare_by_key(a: &Value, b: &Value, key: &SortKey) -> Result<Ordering, JsonPathError> {
    let av = eval_values(&key.path, a)?.into_iter().next();
    let bv = eval_values(&key.path, b)?.into_iter().next();
    let ord = match (av, bv) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_scalar(&a, &b)?,
    };
    Ok(if key.descending { ord.reverse() } else { ord })
}

fn compare_scalar(a: &Value, b: &Value) -> Result<Ordering, JsonPathError> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x
                .partial_cmp(&y)
                .ok_or_else(|| JsonPathError::Type("cannot compare NaN sort values".into())),
            _ => Err(JsonPathError::Type("cannot compare non-finite sort values".into())),
        },
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Ok(x.cmp(y)),
        (Value::Null, Value::Null) => Ok(Ordering::Equal),
        _ => Err(JsonPathError::Type(format!(
            "cannot compare sort values of different types: {a} vs {b}"
        ))),
    }
}

/// Project a single element down to the named fields. Applied per-element by the
/// `Extract` selector arm, not to a whole array at once, so the projection of one
/// element never swallows the others into a nested array.
fn project_fields(value: &Value, keys: &[String]) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::new();
            for key in keys {
                if let Some(v) = map.get(key) {
                    out.insert(key.clone(), v.clone());
                }
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}
