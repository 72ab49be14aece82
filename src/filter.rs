//! Filter sub-language: parser and evaluator for `[?(...)]` predicates.

use std::cmp::Ordering;

use regex::RegexBuilder;
use serde_json::{Number, Value};

use crate::ast::{ComparisonOperator, FilterExpression, JsonPath, LogicalOperator, RegexLiteral, ValueExpression};
use crate::error::JsonPathError;
use crate::eval;
use crate::parser;
use crate::tokenizer::Cursor;

/// Parse the interior of a `[?(...)]` filter (everything between the parens).
pub(crate) fn parse(input: &str) -> Result<FilterExpression, JsonPathError> {
    let mut cursor = Cursor::new(input);
    let expr = parse_or(&mut cursor)?;
    cursor.skip_ws();
    if !cursor.is_at_end() {
        return Err(JsonPathError::syntax(
            format!("unexpected trailing input in filter: '{}'", cursor.rest()),
            cursor.offset(),
        ));
    }
    Ok(expr)
}

/// The precedence ladder runs `atom → not → comparison → and → or`, and each level
/// accepts both the keyword spelling (`and`/`or`/`not`, per the upstream sean2077
/// grammar) and the symbolic one (`&&`/`||`/`!`) as an alias.
fn parse_or(cursor: &mut Cursor) -> Result<FilterExpression, JsonPathError> {
    let mut left = parse_and(cursor)?;
    loop {
        cursor.skip_ws();
        if consume_operator(cursor, "||", "or") {
            cursor.skip_ws();
            let right = parse_and(cursor)?;
            left = FilterExpression::Logical {
                operator: LogicalOperator::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        } else {
            break;
        }
    }
    Ok(left)
}

fn parse_and(cursor: &mut Cursor) -> Result<FilterExpression, JsonPathError> {
    let mut left = parse_unary(cursor)?;
    loop {
        cursor.skip_ws();
        if consume_operator(cursor, "&&", "and") {
            cursor.skip_ws();
            let right = parse_unary(cursor)?;
            left = FilterExpression::Logical {
                operator: LogicalOperator::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        } else {
            break;
        }
    }
    Ok(left)
}

fn parse_unary(cursor: &mut Cursor) -> Result<FilterExpression, JsonPathError> {
    cursor.skip_ws();
    if cursor.peek() == Some('!') {
        cursor.advance();
        cursor.skip_ws();
        let inner = parse_unary(cursor)?;
        return Ok(FilterExpression::Negation(Box::new(inner)));
    }
    if cursor.starts_with("not") && word_boundary(&cursor.rest()["not".len()..]) {
        cursor.advance_by(3);
        cursor.skip_ws();
        let inner = parse_unary(cursor)?;
        return Ok(FilterExpression::Negation(Box::new(inner)));
    }
    if cursor.peek() == Some('(') {
        cursor.advance();
        cursor.skip_ws();
        let inner = parse_or(cursor)?;
        cursor.skip_ws();
        cursor.expect(')')?;
        return Ok(FilterExpression::Paren(Box::new(inner)));
    }
    parse_comparison(cursor)
}

/// Consume `symbol` or `keyword` (whichever is present at the cursor), requiring a
/// word boundary after the keyword spelling so e.g. `android` doesn't match `and`.
fn consume_operator(cursor: &mut Cursor, symbol: &str, keyword: &str) -> bool {
    if cursor.starts_with(symbol) {
        cursor.advance_by(symbol.chars().count());
        return true;
    }
    if cursor.starts_with(keyword) && word_boundary(&cursor.rest()[keyword.len()..]) {
        cursor.advance_by(keyword.chars().count());
        return true;
    }
    false
}

fn parse_comparison(cursor: &mut Cursor) -> Result<FilterExpression, JsonPathError> {
    let left = parse_value(cursor)?;
    cursor.skip_ws();

    if let Some((operator, len)) = peek_operator(cursor) {
        cursor.advance_by(len);
        cursor.skip_ws();
        if operator == ComparisonOperator::RegexMatch {
            let regex = parse_regex_literal(cursor)?;
            return Ok(FilterExpression::Comparison {
                operator,
                left,
                right: ValueExpression::Regex(regex),
            });
        }
        let right = parse_value(cursor)?;
        return Ok(FilterExpression::Comparison { operator, left, right });
    }

    Ok(FilterExpression::Existence(left))
}

fn peek_operator(cursor: &Cursor) -> Option<(ComparisonOperator, usize)> {
    let rest = cursor.rest();
    if rest.starts_with("==") {
        return Some((ComparisonOperator::Equal, 2));
    }
    if rest.starts_with("!=") {
        return Some((ComparisonOperator::NotEqual, 2));
    }
    if rest.starts_with("<=") {
        return Some((ComparisonOperator::LessEqual, 2));
    }
    if rest.starts_with(">=") {
        return Some((ComparisonOperator::GreaterEqual, 2));
    }
    if rest.starts_with("=~") {
        return Some((ComparisonOperator::RegexMatch, 2));
    }
    if rest.starts_with('<') {
        return Some((ComparisonOperator::Less, 1));
    }
    if rest.starts_with('>') {
        return Some((ComparisonOperator::Greater, 1));
    }
    if let Some(stripped) = rest.strip_prefix("not in") {
        if word_boundary(stripped) {
            return Some((ComparisonOperator::NotIn, "not in".len()));
        }
    }
    if let Some(stripped) = rest.strip_prefix("in") {
        if word_boundary(stripped) {
            return Some((ComparisonOperator::In, "in".len()));
        }
    }
    None
}

fn word_boundary(rest: &str) -> bool {
    match rest.chars().next() {
        None => true,
        Some(c) => !(c.is_alphanumeric() || c == '_'),
    }
}

fn parse_value(cursor: &mut Cursor) -> Result<ValueExpression, JsonPathError> {
    cursor.skip_ws();
    match cursor.peek() {
        Some('@') => {
            cursor.advance();
            let start = cursor.offset();
            let segments = parse_relative_segments(cursor)?;
            parser::reject_wildcard(&segments, start)?;
            Ok(ValueExpression::Current(JsonPath::new(segments)))
        }
        Some('$') => {
            cursor.advance();
            let start = cursor.offset();
            let segments = parser::parse_segments(cursor)?;
            parser::reject_wildcard(&segments, start)?;
            Ok(ValueExpression::Root(JsonPath::new(segments)))
        }
        Some('\'') | Some('"') => {
            let s = parser::parse_quoted_string(cursor)?;
            Ok(ValueExpression::Literal(Value::String(s)))
        }
        Some('/') => Ok(ValueExpression::Regex(parse_regex_literal(cursor)?)),
        Some('[') => Ok(ValueExpression::Literal(parse_array_literal(cursor)?)),
        Some(c) if c.is_ascii_digit() || c == '-' => Ok(ValueExpression::Literal(parse_number_literal(cursor)?)),
        _ if cursor.starts_with("true") && word_boundary(&cursor.rest()[4..]) => {
            cursor.advance_by(4);
            Ok(ValueExpression::Literal(Value::Bool(true)))
        }
        _ if cursor.starts_with("false") && word_boundary(&cursor.rest()[5..]) => {
            cursor.advance_by(5);
            Ok(ValueExpression::Literal(Value::Bool(false)))
        }
        _ if cursor.starts_with("null") && word_boundary(&cursor.rest()[4..]) => {
            cursor.advance_by(4);
            Ok(ValueExpression::Literal(Value::Null))
        }
        _ => Err(JsonPathError::syntax("expected a value", cursor.offset())),
    }
}

fn parse_relative_segments(cursor: &mut Cursor) -> Result<Vec<crate::ast::PathSegment>, JsonPathError> {
    if matches!(cursor.peek(), Some('.') | Some('[')) {
        parser::parse_segments(cursor)
    } else {
        Ok(Vec::new())
    }
}

fn parse_regex_literal(cursor: &mut Cursor) -> Result<RegexLiteral, JsonPathError> {
    let start = cursor.offset();
    cursor.expect('/')?;
    let mut pattern = String::new();
    loop {
        match cursor.peek() {
            None => return Err(JsonPathError::syntax("unterminated regex literal", start)),
            Some('\\') => {
                pattern.push('\\');
                cursor.advance();
                if let Some(c) = cursor.advance() {
                    pattern.push(c);
                }
            }
            Some('/') => {
                cursor.advance();
                break;
            }
            Some(c) => {
                pattern.push(c);
                cursor.advance();
            }
        }
    }

    let mut case_insensitive = false;
    let mut multi_line = false;
    let mut dot_matches_new_line = false;
    while let Some(c) = cursor.peek() {
        match c {
            'i' => {
                case_insensitive = true;
                cursor.advance();
            }
            'm' => {
                multi_line = true;
                cursor.advance();
            }
            's' => {
                dot_matches_new_line = true;
                cursor.advance();
            }
            c if c.is_ascii_alphabetic() => {
                return Err(JsonPathError::syntax(format!("unknown regex flag '{c}'"), start));
            }
            _ => break,
        }
    }

    let regex = RegexBuilder::new(&pattern)
        .case_insensitive(case_insensitive)
        .multi_line(multi_line)
        .dot_matches_new_line(dot_matches_new_line)
        .build()
        .map_err(|e| JsonPathError::syntax(format!("invalid regex: {e}"), start))?;
    Ok(RegexLiteral { pattern, regex })
}

/// Parse a `[lit, lit, ...]` literal array, used on the right of `in`/`not in`.
fn parse_array_literal(cursor: &mut Cursor) -> Result<Value, JsonPathError> {
    let start = cursor.offset();
    cursor.expect('[')?;
    cursor.skip_ws();
    let mut items = Vec::new();
    if cursor.peek() == Some(']') {
        cursor.advance();
        return Ok(Value::Array(items));
    }
    loop {
        cursor.skip_ws();
        let value = match parse_value(cursor)? {
            ValueExpression::Literal(v) => v,
            _ => return Err(JsonPathError::syntax("array literal elements must be literals", start)),
        };
        items.push(value);
        cursor.skip_ws();
        match cursor.peek() {
            Some(',') => {
                cursor.advance();
            }
            Some(']') => {
                cursor.advance();
                break;
            }
            _ => return Err(JsonPathError::syntax("unterminated array literal", start)),
        }
    }
    Ok(Value::Array(items))
}

fn parse_number_literal(cursor: &mut Cursor) -> Result<Value, JsonPathError> {
    let start = cursor.offset();
    let text_start = cursor.offset();
    if cursor.peek() == Some('-') {
        cursor.advance();
    }
    if !matches!(cursor.peek(), Some(c) if c.is_ascii_digit()) {
        return Err(JsonPathError::syntax("invalid number", start));
    }
    while matches!(cursor.peek(), Some(c) if c.is_ascii_digit()) {
        cursor.advance();
    }
    let mut is_float = false;
    if cursor.peek() == Some('.') {
        is_float = true;
        cursor.advance();
        if !matches!(cursor.peek(), Some(c) if c.is_ascii_digit()) {
            return Err(JsonPathError::syntax("invalid number", start));
        }
        while matches!(cursor.peek(), Some(c) if c.is_ascii_digit()) {
            cursor.advance();
        }
    }
    if matches!(cursor.peek(), Some('e') | Some('E')) {
        is_float = true;
        cursor.advance();
        if matches!(cursor.peek(), Some('+') | Some('-')) {
            cursor.advance();
        }
        if !matches!(cursor.peek(), Some(c) if c.is_ascii_digit()) {
            return Err(JsonPathError::syntax("invalid number", start));
        }
        while matches!(cursor.peek(), Some(c) if c.is_ascii_digit()) {
            cursor.advance();
        }
    }
    let text = cursor.slice(text_start, cursor.offset());
    if is_float {
        let f: f64 = text
            .parse()
            .map_err(|_| JsonPathError::syntax("invalid number", start))?;
        Ok(Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null))
    } else {
        let i: i64 = text
            .parse()
            .map_err(|_| JsonPathError::syntax("invalid number", start))?;
        Ok(Value::Number(Number::from(i)))
    }
}

/// Evaluate a compiled filter against the element under test (`current`) and the
/// document root (`root`, needed for `$`-rooted sub-paths inside the predicate).
pub(crate) fn evaluate(expr: &FilterExpression, current: &Value, root: &Value) -> Result<bool, JsonPathError> {
    Ok(match expr {
        FilterExpression::Existence(value_expr) => !eval_value_multi(value_expr, current, root)?.is_empty(),
        FilterExpression::Comparison { operator, left, right } => compare(operator, left, right, current, root)?,
        FilterExpression::Logical { operator, left, right } => match operator {
            LogicalOperator::And => evaluate(left, current, root)? && evaluate(right, current, root)?,
            LogicalOperator::Or => evaluate(left, current, root)? || evaluate(right, current, root)?,
        },
        FilterExpression::Negation(inner) => !evaluate(inner, current, root)?,
        FilterExpression::Paren(inner) => evaluate(inner, current, root)?,
    })
}

fn eval_value_multi(expr: &ValueExpression, current: &Value, root: &Value) -> Result<Vec<Value>, JsonPathError> {
    match expr {
        ValueExpression::Current(path) => eval::eval_values(path, current),
        ValueExpression::Root(path) => eval::eval_values(path, root),
        ValueExpression::Literal(v) => Ok(vec![v.clone()]),
        ValueExpression::Regex(_) => Ok(Vec::new()),
    }
}

fn eval_value_single(expr: &ValueExpression, current: &Value, root: &Value) -> Result<Option<Value>, JsonPathError> {
    Ok(eval_value_multi(expr, current, root)?.into_iter().next())
}

fn compare(
    operator: &ComparisonOperator,
    left: &ValueExpression,
    right: &ValueExpression,
    current: &Value,
    root: &Value,
) -> Result<bool, JsonPathError> {
    if *operator == ComparisonOperator::RegexMatch {
        let left_val = eval_value_single(left, current, root)?;
        let regex = match right {
            ValueExpression::Regex(r) => r,
            _ => unreachable!("the parser only ever puts a regex literal on the right of '=~'"),
        };
        return Ok(matches!(left_val, Some(Value::String(ref s)) if regex.regex.is_match(s)));
    }

    if matches!(operator, ComparisonOperator::In | ComparisonOperator::NotIn) {
        let left_val = eval_value_single(left, current, root)?;
        let right_val = eval_value_single(right, current, root)?;
        let is_in = match (&left_val, &right_val) {
            (Some(l), Some(Value::Array(arr))) => arr.contains(l),
            (Some(Value::String(s)), Some(Value::Object(map))) => map.contains_key(s),
            (Some(Value::String(s)), Some(Value::String(hay))) => hay.contains(s.as_str()),
            _ => false,
        };
        return Ok(if *operator == ComparisonOperator::In { is_in } else { !is_in });
    }

    let left_val = eval_value_single(left, current, root)?;
    let right_val = eval_value_single(right, current, root)?;

    Ok(match (&left_val, &right_val) {
        (None, None) => *operator == ComparisonOperator::Equal,
        (None, Some(_)) | (Some(_), None) => *operator == ComparisonOperator::NotEqual,
        (Some(l), Some(r)) => {
            let ord = compare_loose(l, r);
            match operator {
                ComparisonOperator::Equal => structural_eq(l, r),
                ComparisonOperator::NotEqual => !structural_eq(l, r),
                ComparisonOperator::Less => ord == Some(Ordering::Less),
                ComparisonOperator::LessEqual => matches!(ord, Some(Ordering::Less) | Some(Ordering::Equal)),
                ComparisonOperator::Greater => ord == Some(Ordering::Greater),
                ComparisonOperator::GreaterEqual => matches!(ord, Some(Ordering::Greater) | Some(Ordering::Equal)),
                ComparisonOperator::In | ComparisonOperator::NotIn | ComparisonOperator::RegexMatch => {
                    unreachable!("handled above")
                }
            }
        }
    })
}

fn structural_eq(a: &Value, b: &Value) -> bool {
    if let (Value::Number(x), Value::Number(y)) = (a, b) {
        return match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        };
    }
    a == b
}

fn compare_loose(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64().zip(y.as_f64()).and_then(|(x, y)| x.partial_cmp(&y)),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
