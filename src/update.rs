//! Updater: mutate a document in place at every location a compiled expression
//! matches. The teacher crate has no equivalent — matches are re-derived from
//! [`crate::eval::eval_matches`] and replayed as a parent-locator walk over
//! `&mut Value`, the same way `eval.rs` walks an immutable one.

use crate::ast::JsonPath;
use crate::codegen::Replacement;
use crate::error::JsonPathError;
use crate::eval;
use crate::value::{PathComponent, Value};

pub(crate) fn apply<'d>(
    compiled: &JsonPath,
    document: &'d mut Value,
    replacement: Replacement,
) -> Result<&'d mut Value, JsonPathError> {
    let matches = eval::eval_matches(compiled, document)?;
    for m in matches {
        apply_one(document, &m.path, &replacement);
    }
    Ok(document)
}

fn apply_one(document: &mut Value, path: &[PathComponent], replacement: &Replacement) {
    let Some((last, ancestors)) = path.split_last() else {
        let old = std::mem::take(document);
        *document = replacement.apply(old);
        return;
    };

    let mut current = document;
    for component in ancestors {
        current = match (component, &mut *current) {
            (PathComponent::Key(key), Value::Object(map)) => match map.get_mut(key) {
                Some(v) => v,
                None => return, // an earlier update reshaped this parent; skip silently
            },
            (PathComponent::Index(idx), Value::Array(arr)) => match arr.get_mut(*idx) {
                Some(v) => v,
                None => return,
            },
            _ => return,
        };
    }

    match (last, current) {
        (PathComponent::Key(key), Value::Object(map)) => {
            if let Some(slot) = map.get_mut(key) {
                let old = std::mem::take(slot);
                *slot = replacement.apply(old);
            }
        }
        (PathComponent::Index(idx), Value::Array(arr)) => {
            if let Some(slot) = arr.get_mut(*idx) {
                let old = std::mem::take(slot);
                *slot = replacement.apply(old);
            }
        }
        _ => {}
    }
}
