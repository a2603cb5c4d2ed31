//! Helpers shared by the CLI commands

use anyhow::{Result, bail};
use serde_json::Value;
use std::path::PathBuf;

use crate::config::find_manifest_with_optional;
use crate::core::{Params, parse_loose};
use crate::session::Session;

/// Load the session for `manifest_path`, or for the manifest found above
/// the working directory.
pub fn load_session(manifest_path: Option<PathBuf>) -> Result<Session> {
    let manifest_path = find_manifest_with_optional(manifest_path)?;
    Session::from_manifest_path(&manifest_path)
}

/// Turn `key=value` assignments into call arguments.
///
/// Values are parsed loosely as JSON. `craft.key=value` nests the value
/// under `craft`.
pub fn parse_assignments(raw: &[String]) -> Result<Params> {
    let mut params = Params::new();
    for assignment in raw {
        let Some((key, value)) = assignment.split_once('=') else {
            bail!("Invalid argument '{assignment}': expected key=value");
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("Invalid argument '{assignment}': empty key");
        }
        let value = parse_loose(value);

        match key.split_once('.') {
            Some((craft, name)) if !craft.is_empty() && !name.is_empty() => {
                let entry = params
                    .entry(craft.to_string())
                    .or_insert_with(|| Value::Object(Params::new()));
                let Value::Object(scoped) = entry else {
                    bail!("Argument '{craft}' is set both as a value and as a craft namespace");
                };
                scoped.insert(name.to_string(), value);
            }
            _ => {
                if params.get(key).is_some_and(Value::is_object) && !value.is_object() {
                    bail!("Argument '{key}' is set both as a value and as a craft namespace");
                }
                params.insert(key.to_string(), value);
            }
        }
    }
    Ok(params)
}
