//! Recursive-descent parser: turns an expression string into a [`JsonPath`].
//!
//! Segment classification happens inline, dispatching on the leading character of
//! each bracketed group: `?(` is a filter, `/(` is a sorter, a bare `(` is an
//! extractor, `*` is a wildcard, and anything else is split on top-level commas into
//! a mix of names, indices, and slices (a single bracket may legally mix all three,
//! e.g. `[0:2, 5, 'key']`).

use crate::ast::{JsonPath, PathSegment, Selector, SortKey};
use crate::error::JsonPathError;
use crate::filter;
use crate::tokenizer::Cursor;

/// Compile a JSONPath expression string.
pub fn compile(input: &str) -> Result<JsonPath, JsonPathError> {
    let mut cursor = Cursor::new(input);
    if cursor.peek() != Some('$') {
        return Err(JsonPathError::syntax(
            "expression must start with '$'",
            cursor.offset(),
        ));
    }
    cursor.advance();
    let segments = parse_segments(&mut cursor)?;
    if !cursor.is_at_end() {
        return Err(JsonPathError::syntax(
            format!("unexpected character '{}'", cursor.peek().unwrap_or('\0')),
            cursor.offset(),
        ));
    }
    Ok(JsonPath::new(segments))
}

/// Parse a run of segments. Used for the root expression and, via `filter.rs`, for
/// relative `@`/`$` sub-paths inside filters.
pub(crate) fn parse_segments(cursor: &mut Cursor) -> Result<Vec<PathSegment>, JsonPathError> {
    let mut segments = Vec::new();
    loop {
        match cursor.peek() {
            Some('.') => {
                let start = cursor.offset();
                cursor.advance();
                if cursor.peek() == Some('.') {
                    cursor.advance();
                    let selectors = parse_recursive_target(cursor, start)?;
                    segments.push(PathSegment::new(selectors, true));
                } else if cursor.peek() == Some('*') {
                    cursor.advance();
                    segments.push(PathSegment::new(vec![Selector::Wildcard], false));
                } else {
                    let name = parse_dot_name(cursor)?;
                    segments.push(PathSegment::new(vec![Selector::Name(name)], false));
                }
            }
            Some('[') => {
                let selectors = parse_bracket(cursor)?;
                segments.push(PathSegment::new(selectors, false));
            }
            _ => break,
        }
    }
    Ok(segments)
}

fn parse_recursive_target(cursor: &mut Cursor, start: usize) -> Result<Vec<Selector>, JsonPathError> {
    match cursor.peek() {
        Some('*') => {
            cursor.advance();
            Ok(vec![Selector::Wildcard])
        }
        Some('[') => parse_bracket(cursor),
        Some(c) if c.is_alphanumeric() || c == '_' || c == '\'' || c == '"' => {
            Ok(vec![Selector::Name(parse_dot_name(cursor)?)])
        }
        _ => Err(JsonPathError::syntax(
            "'..' must be followed by a name, '*', or a bracket selector",
            start,
        )),
    }
}

fn parse_dot_name(cursor: &mut Cursor) -> Result<String, JsonPathError> {
    match cursor.peek() {
        Some('\'') | Some('"') => parse_quoted_string(cursor),
        _ => parse_bare_identifier(cursor),
    }
}

fn parse_bare_identifier(cursor: &mut Cursor) -> Result<String, JsonPathError> {
    let start = cursor.offset();
    let rest = cursor.rest();
    let mut end = 0;
    for c in rest.chars() {
        if c.is_alphanumeric() || c == '_' || c == '-' {
            end += c.len_utf8();
        } else {
            break;
        }
    }
    if end == 0 {
        return Err(JsonPathError::syntax("expected an identifier", start));
    }
    let name = rest[..end].to_string();
    cursor.advance_by(name.chars().count());
    Ok(name)
}

/// Parse a `'...'` or `"..."` quoted string with `\n`/`\t`/`\r`/`\\`/`\'`/`\"` escapes.
pub(crate) fn parse_quoted_string(cursor: &mut Cursor) -> Result<String, JsonPathError> {
    let start = cursor.offset();
    let quote = cursor.advance().expect("caller checked a quote is present");
    let mut out = String::new();
    loop {
        match cursor.peek() {
            None => return Err(JsonPathError::syntax("unterminated quoted string", start)),
            Some(c) if c == quote => {
                cursor.advance();
                break;
            }
            Some('\\') => {
                cursor.advance();
                match cursor.advance() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('\\') => out.push('\\'),
                    Some('\'') => out.push('\''),
                    Some('"') => out.push('"'),
                    Some(other) => {
                        return Err(JsonPathError::syntax(
                            format!("invalid escape '\\{other}'"),
                            start,
                        ))
                    }
                    None => return Err(JsonPathError::syntax("unterminated quoted string", start)),
                }
            }
            Some(c) => {
                out.push(c);
                cursor.advance();
            }
        }
    }
    Ok(out)
}

fn parse_bracket(cursor: &mut Cursor) -> Result<Vec<Selector>, JsonPathError> {
    let start = cursor.offset();
    cursor.expect('[')?;
    cursor.skip_ws();

    if cursor.peek() == Some('?') && cursor.peek2() == Some('(') {
        cursor.advance_by(2);
        let expr_text = read_balanced_parens(cursor, start)?;
        cursor.skip_ws();
        cursor.expect(']')?;
        return Ok(vec![Selector::Filter(filter::parse(&expr_text)?)]);
    }

    if cursor.peek() == Some('/') && cursor.peek2() == Some('(') {
        cursor.advance_by(2);
        let inner = read_balanced_parens(cursor, start)?;
        cursor.skip_ws();
        cursor.expect(']')?;
        return Ok(vec![Selector::Sort(parse_sort_keys(&inner, start)?)]);
    }

    if cursor.peek() == Some('(') {
        cursor.advance();
        let inner = read_balanced_parens(cursor, start)?;
        cursor.skip_ws();
        cursor.expect(']')?;
        return Ok(vec![Selector::Extract(parse_extract_keys(&inner, start)?)]);
    }

    if cursor.peek() == Some('*') {
        cursor.advance();
        cursor.skip_ws();
        cursor.expect(']')?;
        return Ok(vec![Selector::Wildcard]);
    }

    parse_bracket_list(cursor, start)
}

/// Consume up to (and including) the `)` that balances the one already consumed by
/// the caller, skipping over quoted strings and `/regex/` literals so stray `(`/`)`
/// inside them don't confuse the depth count.
fn read_balanced_parens(cursor: &mut Cursor, start: usize) -> Result<String, JsonPathError> {
    let mut depth = 1usize;
    let content_start = cursor.offset();
    loop {
        match cursor.peek() {
            None => return Err(JsonPathError::syntax("unbalanced '(' in expression", start)),
            Some('(') => {
                depth += 1;
                cursor.advance();
            }
            Some(')') => {
                depth -= 1;
                if depth == 0 {
                    let text = cursor.slice(content_start, cursor.offset()).to_string();
                    cursor.advance();
                    return Ok(text);
                }
                cursor.advance();
            }
            Some('\'') | Some('"') => {
                parse_quoted_string(cursor)?;
            }
            Some('/') => {
                skip_regex_literal(cursor);
            }
            Some(_) => {
                cursor.advance();
            }
        }
    }
}

/// Skip a `/pattern/flags` run wholesale. `/` has no other meaning in this grammar, so
/// any `/` seen while balancing parens is treated as the start of a regex literal.
fn skip_regex_literal(cursor: &mut Cursor) {
    cursor.advance();
    loop {
        match cursor.peek() {
            None => return,
            Some('\\') => {
                cursor.advance();
                cursor.advance();
            }
            Some('/') => {
                cursor.advance();
                break;
            }
            Some(_) => {
                cursor.advance();
            }
        }
    }
    while matches!(cursor.peek(), Some(c) if c.is_ascii_alphabetic()) {
        cursor.advance();
    }
}

fn read_balanced_bracket_body(cursor: &mut Cursor, start: usize) -> Result<String, JsonPathError> {
    let mut depth = 1usize;
    let content_start = cursor.offset();
    loop {
        match cursor.peek() {
            None => return Err(JsonPathError::syntax("unbalanced '[' in expression", start)),
            Some('[') => {
                depth += 1;
                cursor.advance();
            }
            Some(']') => {
                depth -= 1;
                if depth == 0 {
                    let text = cursor.slice(content_start, cursor.offset()).to_string();
                    cursor.advance();
                    return Ok(text);
                }
                cursor.advance();
            }
            Some('\'') | Some('"') => {
                parse_quoted_string(cursor)?;
            }
            Some(_) => {
                cursor.advance();
            }
        }
    }
}

fn parse_bracket_list(cursor: &mut Cursor, start: usize) -> Result<Vec<Selector>, JsonPathError> {
    let body = read_balanced_bracket_body(cursor, start)?;
    let members = split_top_level_commas(&body);
    if members.iter().all(|m| m.trim().is_empty()) {
        return Err(JsonPathError::syntax("empty selector list", start));
    }

    let mut selectors = Vec::with_capacity(members.len());
    for raw in &members {
        let member = raw.trim();
        if member.is_empty() {
            return Err(JsonPathError::syntax("empty selector in list", start));
        }
        selectors.push(parse_list_member(member, start)?);
    }
    Ok(selectors)
}

fn parse_list_member(member: &str, start: usize) -> Result<Selector, JsonPathError> {
    if member == "*" {
        return Ok(Selector::Wildcard);
    }
    if member.contains(':') && strip_quotes(member).is_none() {
        return parse_slice_selector(member, start);
    }
    if is_integer_literal(member) {
        return member
            .parse::<isize>()
            .map(Selector::Index)
            .map_err(|_| JsonPathError::syntax(format!("invalid index '{member}'"), start));
    }
    if let Some(unquoted) = strip_quotes(member) {
        return Ok(Selector::Name(unquoted));
    }
    if is_identifier(member) {
        return Ok(Selector::Name(member.to_string()));
    }
    Err(JsonPathError::syntax(
        format!("invalid selector '{member}'"),
        start,
    ))
}

fn parse_slice_selector(member: &str, start: usize) -> Result<Selector, JsonPathError> {
    let parts: Vec<&str> = member.split(':').collect();
    if parts.len() > 3 {
        return Err(JsonPathError::syntax("slice takes at most 3 parts", start));
    }
    let parse_part = |p: &str| -> Result<Option<isize>, JsonPathError> {
        let p = p.trim();
        if p.is_empty() {
            Ok(None)
        } else {
            p.parse::<isize>()
                .map(Some)
                .map_err(|_| JsonPathError::syntax(format!("invalid slice bound '{p}'"), start))
        }
    };
    let start_bound = parse_part(parts.first().copied().unwrap_or(""))?;
    let end_bound = match parts.get(1) {
        Some(p) => parse_part(p)?,
        None => None,
    };
    let step = match parts.get(2) {
        Some(p) => parse_part(p)?,
        None => None,
    };
    if step == Some(0) {
        return Err(JsonPathError::syntax("slice step cannot be 0", start));
    }
    Ok(Selector::Slice {
        start: start_bound,
        end: end_bound,
        step,
    })
}

/// Parse a relative `a.b['c']`-style sub-path with no leading `$`/`@` — used for sort
/// and extractor keys.
fn parse_relative_subpath(text: &str, start: usize) -> Result<JsonPath, JsonPathError> {
    let mut cursor = Cursor::new(text);
    if cursor.is_at_end() {
        return Err(JsonPathError::syntax("empty key", start));
    }
    let mut segments = Vec::new();
    if cursor.peek() == Some('[') {
        segments.push(PathSegment::new(parse_bracket(&mut cursor)?, false));
    } else {
        let name = parse_dot_name(&mut cursor)?;
        segments.push(PathSegment::new(vec![Selector::Name(name)], false));
    }
    segments.extend(parse_segments(&mut cursor)?);
    if !cursor.is_at_end() {
        return Err(JsonPathError::syntax(format!("invalid key '{text}'"), start));
    }
    Ok(JsonPath::new(segments))
}

fn parse_sort_keys(inner: &str, start: usize) -> Result<Vec<SortKey>, JsonPathError> {
    let members = split_top_level_commas(inner);
    let mut keys = Vec::new();
    for raw in members {
        let mut member = raw.trim();
        if member.is_empty() {
            return Err(JsonPathError::syntax("empty sort key", start));
        }
        let descending = if let Some(rest) = member.strip_prefix('~') {
            member = rest.trim();
            true
        } else {
            false
        };
        if member.is_empty() {
            return Err(JsonPathError::syntax("empty sort key", start));
        }
        keys.push(SortKey {
            path: parse_relative_subpath(member, start)?,
            descending,
        });
    }
    if keys.is_empty() {
        return Err(JsonPathError::syntax("sort requires at least one key", start));
    }
    Ok(keys)
}

fn parse_extract_keys(inner: &str, start: usize) -> Result<Vec<String>, JsonPathError> {
    let members = split_top_level_commas(inner);
    let mut keys = Vec::new();
    for raw in members {
        let member = raw.trim();
        if member.is_empty() {
            return Err(JsonPathError::syntax("empty extractor key", start));
        }
        let key = if let Some(s) = strip_quotes(member) {
            s
        } else if is_identifier(member) {
            member.to_string()
        } else {
            return Err(JsonPathError::syntax(
                format!("invalid extractor key '{member}'"),
                start,
            ));
        };
        keys.push(key);
    }
    if keys.is_empty() {
        return Err(JsonPathError::syntax(
            "extractor requires at least one key",
            start,
        ));
    }
    Ok(keys)
}

/// Reject `*` anywhere in a filter sub-path — see SPEC_FULL.md's open question on this.
pub(crate) fn reject_wildcard(segments: &[PathSegment], start: usize) -> Result<(), JsonPathError> {
    for segment in segments {
        for selector in &segment.selectors {
            if matches!(selector, Selector::Wildcard) {
                return Err(JsonPathError::syntax(
                    "wildcard is not permitted inside a filter sub-path",
                    start,
                ));
            }
        }
    }
    Ok(())
}

fn split_top_level_commas(body: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    let mut chars = body.chars().peekable();
    let mut in_quote: Option<char> = None;
    while let Some(c) = chars.next() {
        match in_quote {
            Some(q) => {
                current.push(c);
                if c == '\\' {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                } else if c == q {
                    in_quote = None;
                }
            }
            None => match c {
                '\'' | '"' => {
                    in_quote = Some(c);
                    current.push(c);
                }
                '[' | '(' => {
                    depth += 1;
                    current.push(c);
                }
                ']' | ')' => {
                    depth -= 1;
                    current.push(c);
                }
                ',' if depth == 0 => out.push(std::mem::take(&mut current)),
                _ => current.push(c),
            },
        }
    }
    out.push(current);
    out
}

fn strip_quotes(s: &str) -> Option<String> {
    let first = s.chars().next()?;
    let last = s.chars().last()?;
    if s.chars().count() >= 2 && (first == '\'' || first == '"') && first == last {
        let inner = &s[first.len_utf8()..s.len() - last.len_utf8()];
        Some(unescape(inner))
    } else {
        None
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}
