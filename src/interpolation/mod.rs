//! Placeholder interpolation engine
//!
//! Catalog entries embed placeholders in their string values. Each kind is
//! bound at a different time and from a different scope:
//!
//! - **Static** `{{ path.to.value }}` is bound once, when the catalog is
//!   loaded, from the layered project configuration ([`StaticConfig`]).
//! - **Dynamic** `!{ name }` is bound at every catalog operation from the
//!   caller's arguments.
//! - **Expression** `+{ expr }+` is a lookup such as `mapper[!{ sel }]`,
//!   evaluated at call time for fields flagged as expression-bearing.
//!
//! # Rendering rules
//!
//! A field made of exactly one placeholder takes the resolved value as-is,
//! so `{{ limits }}` can yield a mapping or a number. Otherwise every
//! resolved value is stringified and concatenated with the literal text.
//! Strings without placeholders are returned unchanged.
//!
//! # Examples
//!
//! ```rust,no_run
//! use craftline::core::Params;
//! use craftline::interpolation::{Scope, StaticConfig, render};
//! use serde_json::json;
//!
//! # fn example() -> craftline::core::Result<()> {
//! let base = json!({"root": "/data"}).as_object().cloned().unwrap_or_default();
//! let config = StaticConfig::new(base, Params::new());
//! let args = json!({"date": "2024-01-01"}).as_object().cloned().unwrap_or_default();
//!
//! let scope = Scope::new(&config, &args, "sales");
//! let path = render("{{ root }}/sales_!{ date }.csv", &scope, false)?;
//! assert_eq!(path, json!("/data/sales_2024-01-01.csv"));
//! # Ok(())
//! # }
//! ```

pub mod expression;
pub mod parser;
pub mod resolvers;

pub use expression::{MAX_EXPRESSION_ROUNDS, evaluate};
pub use parser::{Placeholder, PlaceholderKind, Segment, has_placeholders, parse};
pub use resolvers::{StaticConfig, resolve_dynamic};

use serde_json::Value;

use crate::core::{Params, Result, stringify};

/// Everything needed to resolve placeholders for one artifact.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    /// Layered static configuration
    pub config: &'a StaticConfig,
    /// Call-time arguments, the dynamic namespace
    pub args: &'a Params,
    /// The artifact being resolved, used in error messages
    pub artifact: &'a str,
}

impl<'a> Scope<'a> {
    #[must_use]
    pub const fn new(config: &'a StaticConfig, args: &'a Params, artifact: &'a str) -> Self {
        Self {
            config,
            args,
            artifact,
        }
    }
}

/// Which placeholder kinds a rendering pass binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Load time: bind static placeholders, keep the others verbatim
    StaticOnly,
    /// Call time: bind static and dynamic placeholders, and expressions when enabled
    Call {
        /// Evaluate `+{ }+` spans instead of keeping them verbatim
        expressions: bool,
    },
}

/// Render `text` at catalog-load time.
///
/// Only static placeholders are bound. Dynamic and expression spans are
/// kept verbatim so they can be bound at call time.
pub fn render_static(text: &str, config: &StaticConfig, artifact: &str) -> Result<Value> {
    let args = Params::new();
    let scope = Scope::new(config, &args, artifact);
    render_text(text, &scope, RenderMode::StaticOnly, 0)
}

/// Render `text` at call time.
///
/// Expression spans are evaluated only when `expressions` is set, and are
/// otherwise left verbatim.
pub fn render(text: &str, scope: &Scope<'_>, expressions: bool) -> Result<Value> {
    render_text(text, scope, RenderMode::Call { expressions }, 0)
}

/// Render every string found inside `value`, descending into mappings and lists.
pub fn render_value(value: &Value, scope: &Scope<'_>, mode: RenderMode) -> Result<Value> {
    match value {
        Value::String(text) => render_text(text, scope, mode, 0),
        Value::Array(items) => items
            .iter()
            .map(|item| render_value(item, scope, mode))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut rendered = Params::new();
            for (key, item) in map {
                rendered.insert(key.clone(), render_value(item, scope, mode)?);
            }
            Ok(Value::Object(rendered))
        }
        other => Ok(other.clone()),
    }
}

/// `depth` is the expression nesting level `text` is rendered at.
pub(crate) fn render_text(
    text: &str,
    scope: &Scope<'_>,
    mode: RenderMode,
    depth: usize,
) -> Result<Value> {
    let segments = parse(text)?;

    if let [Segment::Placeholder(placeholder)] = segments.as_slice() {
        return Ok(resolve_placeholder(placeholder, scope, mode, depth)?
            .unwrap_or_else(|| Value::String(text.to_string())));
    }

    let mut out = String::with_capacity(text.len());
    for segment in &segments {
        match segment {
            Segment::Literal(literal) => out.push_str(literal),
            Segment::Placeholder(placeholder) => {
                match resolve_placeholder(placeholder, scope, mode, depth)? {
                    Some(value) => out.push_str(&stringify(&value)),
                    None => out.push_str(&placeholder.raw),
                }
            }
        }
    }
    Ok(Value::String(out))
}

/// `None` means the placeholder is not bound in this mode and stays verbatim.
fn resolve_placeholder(
    placeholder: &Placeholder,
    scope: &Scope<'_>,
    mode: RenderMode,
    depth: usize,
) -> Result<Option<Value>> {
    let value = match (placeholder.kind, mode) {
        (PlaceholderKind::Static, _) => scope.config.resolve(&placeholder.body, scope.artifact)?,
        (PlaceholderKind::Dynamic, RenderMode::Call { .. }) => {
            resolve_dynamic(scope.args, &placeholder.body, scope.artifact)?
        }
        (
            PlaceholderKind::Expression,
            RenderMode::Call {
                expressions: true,
            },
        ) => expression::evaluate_at(&placeholder.body, scope, depth)?,
        _ => return Ok(None),
    };
    tracing::trace!("resolved '{}' to {}", placeholder.raw, value);
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CraftlineError;
    use serde_json::json;

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_no_placeholders_unchanged() {
        let config = StaticConfig::default();
        let args = Params::new();
        let scope = Scope::new(&config, &args, "a");
        for text in ["", "plain", "with {braces}", "a } b"] {
            assert_eq!(render(text, &scope, true).unwrap(), json!(text));
        }
    }

    #[test]
    fn test_whole_field_keeps_type() {
        let config = StaticConfig::new(params(json!({"limits": {"rows": 10}})), Params::new());
        let args = params(json!({"n": 3}));
        let scope = Scope::new(&config, &args, "a");
        assert_eq!(render("{{ limits }}", &scope, false).unwrap(), json!({"rows": 10}));
        assert_eq!(render("!{ n }", &scope, false).unwrap(), json!(3));
        assert_eq!(render("n=!{ n }", &scope, false).unwrap(), json!("n=3"));
    }

    #[test]
    fn test_static_pass_keeps_dynamic_and_expression() {
        let config = StaticConfig::new(params(json!({"root": "/data"})), Params::new());
        let rendered =
            render_static("{{ root }}/!{ date }/+{ m['k'] }+", &config, "sales").unwrap();
        assert_eq!(rendered, json!("/data/!{ date }/+{ m['k'] }+"));

        let err = render_static("{{ missing }}", &config, "sales").unwrap_err();
        assert!(matches!(err, CraftlineError::UnresolvedStatic { .. }));
    }

    #[test]
    fn test_expressions_only_when_enabled() {
        let config = StaticConfig::new(params(json!({"m": {"k": "out"}})), Params::new());
        let args = Params::new();
        let scope = Scope::new(&config, &args, "a");
        assert_eq!(render("+{ m['k'] }+", &scope, false).unwrap(), json!("+{ m['k'] }+"));
        assert_eq!(render("+{ m['k'] }+", &scope, true).unwrap(), json!("out"));
    }

    #[test]
    fn test_sibling_expressions_do_not_share_depth() {
        let config = StaticConfig::new(
            params(json!({"m": {"k": "v", "a": "k"}, "m2": {"a": "k"}})),
            Params::new(),
        );
        let args = Params::new();
        let scope = Scope::new(&config, &args, "a");

        let many = vec!["+{ m['k'] }+"; MAX_EXPRESSION_ROUNDS + 4].join("/");
        let expected = vec!["v"; MAX_EXPRESSION_ROUNDS + 4].join("/");
        assert_eq!(render(&many, &scope, true).unwrap(), json!(expected));

        let nested = vec!["+{ m[+{ m2['a'] }+] }+"; 5].join("-");
        assert_eq!(render(&nested, &scope, true).unwrap(), json!("v-v-v-v-v"));
    }

    #[test]
    fn test_dynamic_missing_is_error() {
        let config = StaticConfig::default();
        let args = Params::new();
        let scope = Scope::new(&config, &args, "sales");
        let err = render("data_!{ x }.csv", &scope, false).unwrap_err();
        match err {
            CraftlineError::UnresolvedDynamic { name, artifact } => {
                assert_eq!(name, "x");
                assert_eq!(artifact, "sales");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_render_value_descends() {
        let config = StaticConfig::new(params(json!({"host": "db"})), Params::new());
        let args = params(json!({"t": "sales"}));
        let scope = Scope::new(&config, &args, "a");
        let value = json!({"conn": {"host": "{{ host }}"}, "tables": ["!{ t }", 1]});
        let rendered = render_value(&value, &scope, RenderMode::Call { expressions: false }).unwrap();
        assert_eq!(rendered, json!({"conn": {"host": "db"}, "tables": ["sales", 1]}));
    }
}
