//! Evaluation of `+{ expr }+` placeholders.
//!
//! An expression is a name followed by zero or more index operations:
//!
//! ```text
//! mapper['key']
//! mapper[!{ selector }]
//! queries.by_region["{{ region }}"][0]
//! ```
//!
//! Nested static, dynamic and expression placeholders inside the body are
//! substituted first. The remaining text is parsed as an index chain whose
//! head is looked up in call-time arguments, then in the static
//! configuration. When the result is itself a string carrying placeholder
//! syntax, it is rendered again.
//!
//! Each nested expression and each re-rendered result goes one level deeper.
//! Nesting past [`MAX_EXPRESSION_ROUNDS`] levels, or a body needing more
//! substitution passes than that, fails with
//! [`CraftlineError::ExpressionResolution`] instead of looping. Sibling
//! placeholders of the same field do not share this budget.
//!
//! Indexing a key that maps to `null` yields `null`. Indexing into `null`
//! also yields `null`, and so does an index key whose nested placeholder
//! resolves to `null`. The consumer decides whether absence is fatal.

use serde_json::Value;

use super::parser::{self, PlaceholderKind, Segment, has_placeholders};
use super::resolvers::resolve_dynamic;
use super::{RenderMode, Scope, render_text};
use crate::core::{CraftlineError, Result, lookup_path, stringify};

/// Upper bound on nesting depth and on substitution passes of one expression.
pub const MAX_EXPRESSION_ROUNDS: usize = 8;

/// Evaluate a top-level expression body.
pub fn evaluate(body: &str, scope: &Scope<'_>) -> Result<Value> {
    evaluate_at(body, scope, 0)
}

/// Evaluate `body` nested `depth` levels below a top-level placeholder.
pub(crate) fn evaluate_at(body: &str, scope: &Scope<'_>, depth: usize) -> Result<Value> {
    if depth >= MAX_EXPRESSION_ROUNDS {
        return Err(rounds_exhausted(body));
    }

    let mut text = body.to_string();
    let mut passes = 0;

    loop {
        let segments = parser::parse(&text)?;
        if segments.iter().all(|s| s.as_placeholder().is_none()) {
            break;
        }
        passes += 1;
        if passes > MAX_EXPRESSION_ROUNDS {
            return Err(rounds_exhausted(body));
        }

        let mut next = String::with_capacity(text.len());
        for segment in &segments {
            match segment {
                Segment::Literal(literal) => next.push_str(literal),
                Segment::Placeholder(p) => {
                    let value = match p.kind {
                        PlaceholderKind::Static => scope.config.resolve(&p.body, scope.artifact)?,
                        PlaceholderKind::Dynamic => {
                            resolve_dynamic(scope.args, &p.body, scope.artifact)?
                        }
                        PlaceholderKind::Expression => evaluate_at(&p.body, scope, depth + 1)?,
                    };
                    // An absent index key makes the whole lookup absent
                    if value.is_null() && next.contains('[') {
                        tracing::trace!("expression '{}' indexes with an absent key", body);
                        return Ok(Value::Null);
                    }
                    next.push_str(&stringify(&value));
                }
            }
        }

        if next == text {
            return Err(resolution_error(body, "placeholders resolve to themselves"));
        }
        tracing::trace!("expression '{}' substituted to '{}'", body, next);
        text = next;
    }

    let mut value = apply_chain(text.trim(), scope, body)?;

    let mut passes = 0;
    while let Value::String(s) = &value {
        if !has_placeholders(s) {
            break;
        }
        passes += 1;
        if passes > MAX_EXPRESSION_ROUNDS {
            return Err(rounds_exhausted(body));
        }
        let rendered = render_text(s, scope, RenderMode::Call { expressions: true }, depth + 1)?;
        if rendered == value {
            return Err(resolution_error(body, "placeholders resolve to themselves"));
        }
        value = rendered;
    }

    Ok(value)
}

fn rounds_exhausted(expression: &str) -> CraftlineError {
    resolution_error(
        expression,
        &format!("no fixed point reached after {MAX_EXPRESSION_ROUNDS} rounds"),
    )
}

fn resolution_error(expression: &str, reason: &str) -> CraftlineError {
    CraftlineError::ExpressionResolution {
        expression: expression.to_string(),
        reason: reason.to_string(),
    }
}

/// One `[...]` operation.
#[derive(Debug, PartialEq)]
enum Index {
    /// Quoted key, always a mapping key
    Key(String),
    /// Unquoted key, a list position when it parses as an integer
    Bare(String),
}

/// Split `head[...][...]` into the head name and its index operations.
fn parse_chain(text: &str, expression: &str) -> Result<(String, Vec<Index>)> {
    let head_end = text.find('[').unwrap_or(text.len());
    let head = text[..head_end].trim();
    if head.is_empty()
        || !head.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(resolution_error(expression, &format!("'{text}' is not a lookup expression")));
    }

    let mut indices = Vec::new();
    let mut rest = text[head_end..].trim_start();
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return Err(resolution_error(expression, &format!("unexpected text '{rest}'")));
        };
        let inner = inner.trim_start();
        let (index, after) = match inner.chars().next() {
            Some(quote @ ('\'' | '"')) => {
                let closing = inner[1..]
                    .find(quote)
                    .ok_or_else(|| resolution_error(expression, "unterminated quoted key"))?;
                let key = inner[1..=closing].to_string();
                let after = inner[closing + 2..].trim_start();
                let after = after
                    .strip_prefix(']')
                    .ok_or_else(|| resolution_error(expression, "expected ']' after quoted key"))?;
                (Index::Key(key), after)
            }
            _ => {
                let closing = inner
                    .find(']')
                    .ok_or_else(|| resolution_error(expression, "unclosed '['"))?;
                let key = inner[..closing].trim();
                if key.is_empty() {
                    return Err(resolution_error(expression, "empty index"));
                }
                (Index::Bare(key.to_string()), &inner[closing + 1..])
            }
        };
        indices.push(index);
        rest = after.trim_start();
    }

    Ok((head.to_string(), indices))
}

fn apply_chain(text: &str, scope: &Scope<'_>, expression: &str) -> Result<Value> {
    let (head, indices) = parse_chain(text, expression)?;

    let mut current = lookup_path(scope.args, &head)
        .or_else(|| scope.config.get(&head))
        .cloned()
        .ok_or_else(|| resolution_error(expression, &format!("'{head}' is not defined")))?;

    for index in indices {
        current = match (current, index) {
            (Value::Null, _) => Value::Null,
            (Value::Object(mut map), Index::Key(key) | Index::Bare(key)) => {
                map.remove(&key).ok_or_else(|| {
                    resolution_error(expression, &format!("key '{key}' not found in '{head}'"))
                })?
            }
            (Value::Array(mut items), Index::Bare(key)) => {
                let position = key.parse::<usize>().map_err(|_| {
                    resolution_error(expression, &format!("'{key}' is not a list position"))
                })?;
                if position >= items.len() {
                    return Err(resolution_error(
                        expression,
                        &format!("position {position} is out of range in '{head}'"),
                    ));
                }
                items.swap_remove(position)
            }
            (other, _) => {
                return Err(resolution_error(
                    expression,
                    &format!("cannot index into {}", type_name(&other)),
                ));
            }
        };
    }

    Ok(current)
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
