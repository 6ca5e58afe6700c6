//! Text formats a file source understands, flattened to dotted keys.
//!
//! - Nested tables/objects become `a.b.c`
//! - Arrays of scalars are comma-joined into one value
//! - Arrays containing tables/objects get index segments (`servers.0.host`)
//! - JSON `null` entries are skipped

use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{join_key, PropertySet};

/// Supported file formats, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
    Properties,
}

impl Format {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "toml" => Some(Format::Toml),
            "json" => Some(Format::Json),
            "properties" => Some(Format::Properties),
            _ => None,
        }
    }

    /// Parse `text` into a flat property set.
    pub fn parse(self, text: &str) -> ConfigResult<PropertySet> {
        let mut props = PropertySet::new();
        match self {
            Format::Toml => {
                let table: toml::Table = text
                    .parse()
                    .map_err(|e: toml::de::Error| ConfigError::Malformed(e.to_string()))?;
                for (key, value) in table {
                    flatten_toml(&key, &value, &mut props);
                }
            }
            Format::Json => {
                let value: serde_json::Value = serde_json::from_str(text)
                    .map_err(|e| ConfigError::Malformed(e.to_string()))?;
                if !value.is_object() {
                    return Err(ConfigError::Malformed(
                        "top-level JSON value must be an object".into(),
                    ));
                }
                flatten_json("", &value, &mut props);
            }
            Format::Properties => parse_properties(text, &mut props)?,
        }
        Ok(props)
    }
}

fn flatten_toml(key: &str, value: &toml::Value, out: &mut PropertySet) {
    match value {
        toml::Value::Table(table) => {
            for (child, value) in table {
                flatten_toml(&join_key(key, child), value, out);
            }
        }
        toml::Value::Array(items) if items.iter().any(|v| v.is_table() || v.is_array()) => {
            for (i, item) in items.iter().enumerate() {
                flatten_toml(&join_key(key, &i.to_string()), item, out);
            }
        }
        toml::Value::Array(items) => {
            let joined: Vec<String> = items.iter().map(toml_scalar).collect();
            out.insert(key, joined.join(","));
        }
        scalar => {
            out.insert(key, toml_scalar(scalar));
        }
    }
}

fn toml_scalar(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn flatten_json(key: &str, value: &serde_json::Value, out: &mut PropertySet) {
    use serde_json::Value;

    match value {
        Value::Object(map) => {
            for (child, value) in map {
                flatten_json(&join_key(key, child), value, out);
            }
        }
        Value::Array(items) if items.iter().any(|v| v.is_object() || v.is_array()) => {
            for (i, item) in items.iter().enumerate() {
                flatten_json(&join_key(key, &i.to_string()), item, out);
            }
        }
        Value::Array(items) => {
            let joined: Vec<String> = items.iter().filter_map(json_scalar).collect();
            out.insert(key, joined.join(","));
        }
        scalar => {
            if let Some(text) = json_scalar(scalar) {
                out.insert(key, text);
            }
        }
    }
}

fn json_scalar(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Minimal `.properties` reader: `key=value` or `key: value`, `#`/`!` comments,
/// trailing backslash continues a line.
fn parse_properties(text: &str, out: &mut PropertySet) -> ConfigResult<()> {
    let mut pending = String::new();
    for (number, raw) in text.lines().enumerate() {
        let line = raw.trim_start();
        let comment = line.starts_with('#') || line.starts_with('!');
        if pending.is_empty() && (line.is_empty() || comment) {
            continue;
        }
        if let Some(continued) = line.strip_suffix('\\') {
            pending.push_str(continued);
            continue;
        }
        pending.push_str(line);

        let entry = std::mem::take(&mut pending);
        let split = entry.find(['=', ':']).ok_or_else(|| {
            ConfigError::Malformed(format!("line {}: expected key=value", number + 1))
        })?;
        let key = entry[..split].trim();
        if key.is_empty() {
            return Err(ConfigError::Malformed(format!("line {}: empty key", number + 1)));
        }
        out.insert(key, entry[split + 1..].trim());
    }
    if !pending.is_empty() {
        return Err(ConfigError::Malformed("dangling line continuation at end of input".into()));
    }
    Ok(())
}
