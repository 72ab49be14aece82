//! Public facade: compile-once, evaluate-many entry points.

use crate::ast::JsonPath;
use crate::error::JsonPathError;
use crate::eval;
use crate::parser;
use crate::path::canonical_path;
use crate::update;
use crate::value::Value;

/// Output mode for [`parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Value,
    Path,
}

/// One projected result of [`parse`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutput {
    Value(Value),
    Path(String),
}

/// A replacement to apply with [`update`]: either a literal value, or a transform
/// that is handed the old value and returns its replacement.
pub enum Replacement {
    Value(Value),
    Transform(Box<dyn Fn(Value) -> Value>),
}

impl Replacement {
    pub fn value(v: impl Into<Value>) -> Self {
        Self::Value(v.into())
    }

    pub fn transform(f: impl Fn(Value) -> Value + 'static) -> Self {
        Self::Transform(Box::new(f))
    }

    pub(crate) fn apply(&self, old: Value) -> Value {
        match self {
            Self::Value(v) => v.clone(),
            Self::Transform(f) => f(old),
        }
    }
}

/// Compile a JSONPath expression string into a reusable, immutable [`JsonPath`].
pub fn compile(expression: &str) -> Result<JsonPath, JsonPathError> {
    parser::compile(expression)
}

/// Evaluate a compiled expression, projecting results per `mode`.
pub fn parse(compiled: &JsonPath, document: &Value, mode: Mode) -> Result<Vec<ParseOutput>, JsonPathError> {
    let matches = eval::eval_matches(compiled, document)?;
    Ok(match mode {
        Mode::Value => matches.into_iter().map(|m| ParseOutput::Value(m.value)).collect(),
        Mode::Path => matches
            .into_iter()
            .map(|m| ParseOutput::Path(canonical_path(&m.path)))
            .collect(),
    })
}

/// Convenience equivalent of `parse(compiled, document, Mode::Value)`, unwrapped to
/// bare values.
pub fn search(compiled: &JsonPath, document: &Value) -> Result<Vec<Value>, JsonPathError> {
    eval::eval_values(compiled, document)
}

/// Mutate `document` in place at every location `compiled` matches, then return it.
pub fn update<'d>(
    compiled: &JsonPath,
    document: &'d mut Value,
    replacement: Replacement,
) -> Result<&'d mut Value, JsonPathError> {
    update::apply(compiled, document, replacement)
}

/// Compile-once, run-many wrapper for callers that would rather hold one handle than
/// thread a separate `JsonPath` through their own code.
pub struct JsonPathExpr {
    compiled: JsonPath,
}

impl JsonPathExpr {
    pub fn new(expression: &str) -> Result<Self, JsonPathError> {
        Ok(Self {
            compiled: compile(expression)?,
        })
    }

    pub fn search(&self, document: &Value) -> Result<Vec<Value>, JsonPathError> {
        search(&self.compiled, document)
    }

    pub fn parse(&self, document: &Value, mode: Mode) -> Result<Vec<ParseOutput>, JsonPathError> {
        parse(&self.compiled, document, mode)
    }

    pub fn update(&self, document: &mut Value, replacement: Replacement) -> Result<&mut Value, JsonPathError> {
        update(&self.compiled, document, replacement)
    }

    pub fn as_compiled(&self) -> &JsonPath {
        &self.compiled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_and_path_mode_agree_on_match_count() {
        let compiled = compile("$.books[*].title").unwrap();
        let doc = json!({"books": [{"title": "A"}, {"title": "B"}]});
        let values = search(&compiled, &doc).unwrap();
        let paths = parse(&compiled, &doc, Mode::Path).unwrap();
        assert_eq!(values.len(), paths.len());
        assert_eq!(values, vec![json!("A"), json!("B")]);
        assert_eq!(
            paths,
            vec![
                ParseOutput::Path("$['books'][0]['title']".to_string()),
                ParseOutput::Path("$['books'][1]['title']".to_string()),
            ]
        );
    }

    #[test]
    fn json_path_expr_compiles_once_and_reuses() {
        let expr = JsonPathExpr::new("$.a").unwrap();
        assert_eq!(expr.search(&json!({"a": 1})).unwrap(), vec![json!(1)]);
        assert_eq!(expr.search(&json!({"a": 2})).unwrap(), vec![json!(2)]);
    }
}
