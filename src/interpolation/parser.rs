//! Lexical scanner for placeholder syntax.
//!
//! Splits a string into literal runs and typed placeholder spans:
//!
//! | Syntax        | Kind                         |
//! |---------------|------------------------------|
//! | `{{ path }}`  | [`PlaceholderKind::Static`]     |
//! | `!{ name }`   | [`PlaceholderKind::Dynamic`]    |
//! | `+{ expr }+`  | [`PlaceholderKind::Expression`] |
//!
//! Expression bodies may contain any of the three forms, including further
//! expressions. Scanning is purely lexical, nothing is evaluated here.
//! A lone `{` or `}` outside a placeholder is literal text.

use crate::core::{CraftlineError, Result};

const STATIC_OPEN: &str = "{{";
const STATIC_CLOSE: &str = "}}";
const DYNAMIC_OPEN: &str = "!{";
const DYNAMIC_CLOSE: &str = "}";
const EXPRESSION_OPEN: &str = "+{";
const EXPRESSION_CLOSE: &str = "}+";

/// The three placeholder kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// Resolved from layered configuration
    Static,
    /// Resolved from call-time arguments
    Dynamic,
    /// Evaluated as a lookup expression
    Expression,
}

/// A placeholder span found in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    /// The inner text with surrounding whitespace trimmed.
    pub body: String,
    /// The exact source text including delimiters.
    pub raw: String,
    /// Byte offset of the opening delimiter.
    pub position: usize,
}

/// One piece of a parsed string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

impl Segment {
    /// The source text this segment was parsed from.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Literal(text) => text,
            Self::Placeholder(p) => &p.raw,
        }
    }

    #[must_use]
    pub const fn as_placeholder(&self) -> Option<&Placeholder> {
        match self {
            Self::Literal(_) => None,
            Self::Placeholder(p) => Some(p),
        }
    }
}

/// Parse `input` into an ordered list of segments.
///
/// A string without placeholders yields a single literal segment (or none
/// for the empty string). Unbalanced delimiters and empty bodies are
/// reported as [`CraftlineError::Syntax`] with the opener's byte offset.
pub fn parse(input: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut pos = 0;

    while pos < input.len() {
        let rest = &input[pos..];
        let (kind, open, end) = if rest.starts_with(STATIC_OPEN) {
            (PlaceholderKind::Static, STATIC_OPEN, find_static_end(input, pos)?)
        } else if rest.starts_with(DYNAMIC_OPEN) {
            (PlaceholderKind::Dynamic, DYNAMIC_OPEN, find_dynamic_end(input, pos)?)
        } else if rest.starts_with(EXPRESSION_OPEN) {
            (PlaceholderKind::Expression, EXPRESSION_OPEN, find_expression_end(input, pos)?)
        } else {
            let ch = rest.chars().next().unwrap_or_default();
            literal.push(ch);
            pos += ch.len_utf8().max(1);
            continue;
        };

        let close_len = match kind {
            PlaceholderKind::Static => STATIC_CLOSE.len(),
            PlaceholderKind::Dynamic => DYNAMIC_CLOSE.len(),
            PlaceholderKind::Expression => EXPRESSION_CLOSE.len(),
        };
        let body = input[pos + open.len()..end - close_len].trim();
        if body.is_empty() {
            return Err(syntax_error(input, pos, "placeholder body is empty"));
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Placeholder(Placeholder {
            kind,
            body: body.to_string(),
            raw: input[pos..end].to_string(),
            position: pos,
        }));
        pos = end;
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Whether `input` contains at least one well-formed placeholder.
///
/// Malformed input counts as containing placeholders so callers surface the
/// syntax error instead of treating the text as final.
#[must_use]
pub fn has_placeholders(input: &str) -> bool {
    parse(input).map_or(true, |segments| segments.iter().any(|s| s.as_placeholder().is_some()))
}

// Each finder returns the byte offset just past the closing delimiter.

fn find_static_end(input: &str, start: usize) -> Result<usize> {
    let from = start + STATIC_OPEN.len();
    input[from..]
        .find(STATIC_CLOSE)
        .map(|i| from + i + STATIC_CLOSE.len())
        .ok_or_else(|| syntax_error(input, start, "unclosed '{{'"))
}

fn find_dynamic_end(input: &str, start: usize) -> Result<usize> {
    let from = start + DYNAMIC_OPEN.len();
    input[from..]
        .find(DYNAMIC_CLOSE)
        .map(|i| from + i + DYNAMIC_CLOSE.len())
        .ok_or_else(|| syntax_error(input, start, "unclosed '!{'"))
}

fn find_expression_end(input: &str, start: usize) -> Result<usize> {
    let mut pos = start + EXPRESSION_OPEN.len();
    let mut depth = 1usize;

    while pos < input.len() {
        let rest = &input[pos..];
        if rest.starts_with(STATIC_OPEN) {
            pos = find_static_end(input, pos)?;
        } else if rest.starts_with(DYNAMIC_OPEN) {
            pos = find_dynamic_end(input, pos)?;
        } else if rest.starts_with(EXPRESSION_OPEN) {
            depth += 1;
            pos += EXPRESSION_OPEN.len();
        } else if rest.starts_with(EXPRESSION_CLOSE) {
            depth -= 1;
            pos += EXPRESSION_CLOSE.len();
            if depth == 0 {
                return Ok(pos);
            }
        } else {
            pos += rest.chars().next().map_or(1, char::len_utf8);
        }
    }

    Err(syntax_error(input, start, "unclosed '+{'"))
}

fn syntax_error(input: &str, position: usize, reason: &str) -> CraftlineError {
    CraftlineError::Syntax {
        input: input.to_string(),
        position,
        reason: reason.to_string(),
    }
}
