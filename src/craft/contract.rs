//! The explicit input/output contract of a craft.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::core::Params;

/// How a required input is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// Loaded from the catalog
    Artifact,
    /// Taken from values produced earlier in the same run
    Volatile,
    /// Taken from call arguments
    Param,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Artifact => write!(f, "artifact"),
            Self::Volatile => write!(f, "volatile"),
            Self::Param => write!(f, "param"),
        }
    }
}

/// How a produced output is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Persisted through the catalog
    Artifact,
    /// Kept in memory for later crafts of the same run
    Volatile,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Requirement {
    pub name: String,
    pub kind: InputKind,
    /// Fallback for params, and for artifacts that fail to load
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Production {
    pub name: String,
    pub kind: OutputKind,
}

/// Ordered requirements and productions of a craft.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CraftContract {
    pub required: Vec<Requirement>,
    pub produced: Vec<Production>,
}

impl CraftContract {
    /// Requirements satisfied by another craft's output (artifacts and volatiles).
    pub fn dependencies(&self) -> impl Iterator<Item = &Requirement> {
        self.required.iter().filter(|r| r.kind != InputKind::Param)
    }

    pub fn requirements_of(&self, kind: InputKind) -> impl Iterator<Item = &Requirement> {
        self.required.iter().filter(move |r| r.kind == kind)
    }

    pub fn productions_of(&self, kind: OutputKind) -> impl Iterator<Item = &Production> {
        self.produced.iter().filter(move |p| p.kind == kind)
    }

    #[must_use]
    pub fn produces(&self, name: &str) -> bool {
        self.produced.iter().any(|p| p.name == name)
    }

    /// Defaults of plain params, the lowest tier of a craft's argument namespace.
    #[must_use]
    pub fn param_defaults(&self) -> Params {
        self.requirements_of(InputKind::Param)
            .filter_map(|r| r.default.clone().map(|value| (r.name.clone(), value)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contract() -> CraftContract {
        CraftContract {
            required: vec![
                Requirement {
                    name: "data".into(),
                    kind: InputKind::Artifact,
                    default: None,
                },
                Requirement {
                    name: "model".into(),
                    kind: InputKind::Volatile,
                    default: None,
                },
                Requirement {
                    name: "n".into(),
                    kind: InputKind::Param,
                    default: Some(json!(500)),
                },
                Requirement {
                    name: "seed".into(),
                    kind: InputKind::Param,
                    default: None,
                },
            ],
            produced: vec![Production {
                name: "scores".into(),
                kind: OutputKind::Volatile,
            }],
        }
    }

    #[test]
    fn test_dependencies_skip_params() {
        let names: Vec<_> = contract().dependencies().map(|r| r.name.clone()).collect();
        assert_eq!(names, vec!["data", "model"]);
    }

    #[test]
    fn test_param_defaults() {
        let defaults = contract().param_defaults();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults["n"], json!(500));
    }

    #[test]
    fn test_produces() {
        assert!(contract().produces("scores"));
        assert!(!contract().produces("data"));
    }
}
