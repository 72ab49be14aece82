//! A pragmatic JSONPath query engine: parse, evaluate, sort/extract, and update JSON
//! documents.
//!
//! This crate does not parse JSON text itself — it operates on an already-decoded
//! [`serde_json::Value`] tree. Its job starts at the JSONPath expression:
//!
//! ```
//! use jsonpath_engine::{compile, search};
//! use serde_json::json;
//!
//! let expr = compile("$.store.books[*].author").unwrap();
//! let doc = json!({
//!     "store": {
//!         "books": [
//!             {"author": "Nigel Rees", "title": "Sayings of the Century"},
//!             {"author": "Evelyn Waugh", "title": "Sword of Honour"}
//!         ]
//!     }
//! });
//!
//! let authors = search(&expr, &doc).unwrap();
//! assert_eq!(authors, vec![json!("Nigel Rees"), json!("Evelyn Waugh")]);
//! ```

mod ast;
mod codegen;
mod error;
mod eval;
mod filter;
mod parser;
mod path;
mod tokenizer;
mod update;
mod value;

pub use ast::{
    ComparisonOperator, FilterExpression, JsonPath, LogicalOperator, PathSegment, RegexLiteral, Selector, SortKey,
    ValueExpression,
};
pub use codegen::{compile, parse, search, update, JsonPathExpr, Mode, ParseOutput, Replacement};
pub use error::JsonPathError;
pub use path::canonical_path;
pub use value::{Match, PathComponent, Value};
