//! Environment variable source.
//!
//! Snapshots the process environment at construction and exposes variables
//! matching `{PREFIX}__*` under lowercased keys. Double underscore `__`
//! separates nesting levels; single `_` within a segment is literal (part of
//! the field name):
//!
//! | Env var | Key |
//! |---------|-----|
//! | `MYAPP__HOST` | `host` |
//! | `MYAPP__DATABASE__URL` | `database.url` |
//! | `MYAPP__POOL_SIZE` | `pool_size` |
//!
//! Values stay raw strings — casting them is the field binder's job.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::ConfigError;
use crate::flatten;
use crate::key::Key;
use crate::source::Source;
use crate::value::Value;

/// Segment separator for environment variable names.
pub const ENV_DELIMITER: &str = "__";

/// An eager snapshot of environment variables under a prefix.
#[derive(Debug)]
pub struct EnvSource {
    prefix: String,
    entries: HashMap<Key, Value>,
}

impl EnvSource {
    /// Snapshot `std::env::vars()` for variables matching `{prefix}__*`.
    pub fn new(prefix: &str) -> Self {
        Self::with_vars(prefix, std::env::vars())
    }

    /// Build from an explicit iterator of pairs, so tests can pass synthetic
    /// data instead of the process environment.
    pub fn with_vars(prefix: &str, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let needle = format!("{prefix}{ENV_DELIMITER}");
        let mut entries = HashMap::new();

        for (name, value) in vars {
            let Some(rest) = name.strip_prefix(&needle) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            let key = Key::new(rest.split(ENV_DELIMITER).map(str::to_lowercase));
            entries.insert(key, Value::Str(value));
        }

        Self {
            prefix: prefix.to_string(),
            entries,
        }
    }

    /// Add embedded defaults from any `Serialize` value. Defaults only fill
    /// keys the environment did not provide.
    pub fn with_defaults<S: Serialize>(mut self, defaults: &S) -> Result<Self, ConfigError> {
        for (key, value) in flatten::from_serialize(defaults)? {
            self.entries.entry(key).or_insert(value);
        }
        Ok(self)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Source for EnvSource {
    fn get(&self, key: &Key) -> Option<Value> {
        self.entries.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn simple_key() {
        let source = EnvSource::with_vars("MYAPP", vars(&[("MYAPP__HOST", "0.0.0.0")]));
        assert_eq!(
            source.get(&Key::from("host")),
            Some(Value::Str("0.0.0.0".into()))
        );
    }

    #[test]
    fn nested_key() {
        let source = EnvSource::with_vars(
            "MYAPP",
            vars(&[("MYAPP__DATABASE__URL", "postgres://db")]),
        );
        assert_eq!(
            source.get(&Key::from("database.url")),
            Some(Value::Str("postgres://db".into()))
        );
    }

    #[test]
    fn single_underscore_preserved() {
        let source = EnvSource::with_vars("MYAPP", vars(&[("MYAPP__POOL_SIZE", "10")]));
        assert_eq!(
            source.get(&Key::from("pool_size")),
            Some(Value::Str("10".into()))
        );
    }

    #[test]
    fn segments_are_lowercased() {
        let source = EnvSource::with_vars("APP", vars(&[("APP__DATABASE__POOL_SIZE", "20")]));
        assert_eq!(
            source.get(&Key::from("database.pool_size")),
            Some(Value::Str("20".into()))
        );
    }

    #[test]
    fn values_stay_raw_strings() {
        let source = EnvSource::with_vars("APP", vars(&[("APP__PORT", "8080")]));
        assert_eq!(
            source.get(&Key::from("port")),
            Some(Value::Str("8080".into()))
        );
    }

    #[test]
    fn no_matching_prefix_ignored() {
        let source = EnvSource::with_vars("MYAPP", vars(&[("OTHER__HOST", "x")]));
        assert_eq!(source.get(&Key::from("host")), None);
    }

    #[test]
    fn bare_prefix_ignored() {
        let source = EnvSource::with_vars("MYAPP", vars(&[("MYAPP", "x")]));
        assert_eq!(source.get(&Key::root()), None);
    }

    #[test]
    fn prefix_with_single_underscore_not_matched() {
        let source = EnvSource::with_vars("MYAPP", vars(&[("MYAPP_HOST", "x")]));
        assert_eq!(source.get(&Key::from("host")), None);
    }

    #[test]
    fn defaults_lose_to_loaded_values() {
        use std::collections::BTreeMap;
        let mut defaults = BTreeMap::new();
        defaults.insert("port", "9000");
        defaults.insert("host", "localhost");
        let source = EnvSource::with_vars("APP", vars(&[("APP__PORT", "8080")]))
            .with_defaults(&defaults)
            .unwrap();
        // Loaded value wins over the default at the same key.
        assert_eq!(
            source.get(&Key::from("port")),
            Some(Value::Str("8080".into()))
        );
        // Default fills the gap.
        assert_eq!(
            source.get(&Key::from("host")),
            Some(Value::Str("localhost".into()))
        );
    }
}
