//! Generic configuration file parsing.
//!
//! [`parse_config`] reads a file and deserializes it into any
//! `DeserializeOwned` type, choosing the format from the extension:
//! `.toml` files go through `toml`, `.yaml`/`.yml` files through
//! `serde_yaml`. Errors carry the file path.
//!
//! Example error output:
//! ```text
//! Failed to parse config file: /project/lib/catalog/raw.yaml
//! Caused by:
//!     mapping values are not allowed in this context at line 3 column 9
//! ```

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::path::Path;

use crate::core::Params;

pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        _ => toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
    };

    Ok(config)
}

/// Parse a YAML file whose top level is a mapping. An empty file is an empty mapping.
pub fn parse_mapping(path: &Path) -> Result<Params> {
    match parse_config::<Value>(path)? {
        Value::Null => Ok(Params::new()),
        Value::Object(map) => Ok(map),
        _ => bail!("Top level of {} must be a mapping", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_parse_toml_and_yaml() {
        let temp = TempDir::new().unwrap();
        let toml_path = temp.path().join("c.toml");
        fs::write(&toml_path, "name = \"a\"\ncount = 2\n").unwrap();
        let yaml_path = temp.path().join("c.yaml");
        fs::write(&yaml_path, "name: a\ncount: 2\n").unwrap();

        let expected = Sample {
            name: "a".into(),
            count: 2,
        };
        assert_eq!(parse_config::<Sample>(&toml_path).unwrap(), expected);
        assert_eq!(parse_config::<Sample>(&yaml_path).unwrap(), expected);
    }

    #[test]
    fn test_errors_name_the_file() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.toml");
        let err = parse_config::<Sample>(&missing).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));

        let broken = temp.path().join("broken.yaml");
        fs::write(&broken, "name: [unclosed\n").unwrap();
        let err = parse_config::<Sample>(&broken).unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn test_parse_mapping() {
        let temp = TempDir::new().unwrap();
        let empty = temp.path().join("empty.yaml");
        fs::write(&empty, "").unwrap();
        assert!(parse_mapping(&empty).unwrap().is_empty());

        let list = temp.path().join("list.yaml");
        fs::write(&list, "- 1\n- 2\n").unwrap();
        assert!(parse_mapping(&list).is_err());
    }
}
