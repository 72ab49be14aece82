//! Compiled JSONPath AST.
//!
//! A [`JsonPath`] is the immutable "compiled form" produced by [`crate::compile`]: a
//! sequence of [`PathSegment`]s, each a union of one or more [`Selector`]s, optionally
//! applied under recursive descent.

use regex::Regex;
use serde_json::Value;

/// A fully parsed JSONPath expression, ready to evaluate against any document.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    pub segments: Vec<PathSegment>,
}

impl JsonPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

/// One navigation step: a union of selectors, optionally fused with recursive descent.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub selectors: Vec<Selector>,
    pub recursive: bool,
}

impl PathSegment {
    pub fn new(selectors: Vec<Selector>, recursive: bool) -> Self {
        Self {
            selectors,
            recursive,
        }
    }
}

/// A single selector within a segment's union.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Name(String),
    Index(isize),
    Wildcard,
    Slice {
        start: Option<isize>,
        end: Option<isize>,
        step: Option<isize>,
    },
    Filter(FilterExpression),
    /// `[/(key1, ~key2, ...)]` — sort the matched sequence/mapping by one or more keys.
    Sort(Vec<SortKey>),
    /// `[(key1, key2, ...)]` — project the matched object/array down to named fields.
    Extract(Vec<String>),
}

/// One key of a `[/(...)]` sorter: a relative sub-path plus direction.
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub path: JsonPath,
    pub descending: bool,
}

/// The boolean expression tree inside a `[?(...)]` filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    Comparison {
        operator: ComparisonOperator,
        left: ValueExpression,
        right: ValueExpression,
    },
    Logical {
        operator: LogicalOperator,
        left: Box<FilterExpression>,
        right: Box<FilterExpression>,
    },
    /// A bare value reference used as a truthiness/existence test, e.g. `@.discount`.
    Existence(ValueExpression),
    Negation(Box<FilterExpression>),
    Paren(Box<FilterExpression>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    In,
    NotIn,
    RegexMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

/// An atom on either side of a filter comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueExpression {
    /// `@` or `@.sub.path` — a relative re-entry into the element under test.
    Current(JsonPath),
    /// `$` or `$.sub.path` — a relative re-entry into the whole document root.
    Root(JsonPath),
    Literal(Value),
    Regex(RegexLiteral),
}

/// A compiled `/pattern/flags` regex literal, compiled once at parse time.
#[derive(Debug, Clone)]
pub struct RegexLiteral {
    pub pattern: String,
    pub regex: Regex,
}

impl PartialEq for RegexLiteral {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segments_carry_recursive_flag() {
        let path = JsonPath::new(vec![
            PathSegment::new(vec![Selector::Name("store".into())], false),
            PathSegment::new(vec![Selector::Name("books".into())], false),
            PathSegment::new(vec![Selector::Wildcard], false),
        ]);

        assert_eq!(path.segments.len(), 3);
        assert!(!path.segments[0].recursive);
        assert!(!path.is_root());
        assert!(JsonPath::new(Vec::new()).is_root());
    }

    #[test]
    fn regex_literal_equality_is_by_pattern() {
        let a = RegexLiteral {
            pattern: "^a+$".to_string(),
            regex: Regex::new("^a+$").unwrap(),
        };
        let b = RegexLiteral {
            pattern: "^a+$".to_string(),
            regex: Regex::new("^a+$").unwrap(),
        };
        assert_eq!(a, b);
    }
}
