use std::path::PathBuf;

use thiserror::Error;

use crate::key::Key;

/// All failure modes of schema definition, source loading, and value
/// resolution.
///
/// Every resolution-time variant names the fully-qualified key so the origin
/// is unambiguous in deeply nested schemas; source-loading variants name the
/// file path instead.
#[derive(Debug, Error)]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
pub enum ConfigError {
    /// A required key is absent from every source and the field declares no
    /// default.
    #[error("Key '{key}' not found in any source and no default is set")]
    KeyNotFound { key: Key },

    /// A raw value could not be cast to the field's kind, or failed its
    /// secondary validation (range, membership, filesystem check).
    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: Key, reason: String },

    /// A null value reached a field that does not accept one.
    #[error("Null value for non-nullable key '{key}'")]
    NotNullable { key: Key },

    /// The schema declaration itself is broken: a bare type with no
    /// registered field mapping, or a duplicate attribute name. Raised by
    /// `SchemaBuilder::build`, before any config instance exists.
    #[error("Schema error for attribute '{attribute}': {reason}")]
    SchemaError { attribute: String, reason: String },

    /// An access path names no declared attribute.
    #[error("Unknown config attribute '{0}'")]
    UnknownAttribute(String),

    /// A serializable value could not be flattened into key-value pairs.
    #[error("Failed to flatten source data: {reason}")]
    Flatten { reason: String },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_not_found_names_full_key() {
        let err = ConfigError::KeyNotFound {
            key: Key::new(["db", "port"]),
        };
        assert!(err.to_string().contains("db.port"));
    }

    #[test]
    fn invalid_value_formats() {
        let err = ConfigError::InvalidValue {
            key: Key::new(["app", "port"]),
            reason: "cannot cast 'x' to integer".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("app.port"));
        assert!(msg.contains("cannot cast"));
    }

    #[test]
    fn not_nullable_formats() {
        let err = ConfigError::NotNullable {
            key: Key::new(["host"]),
        };
        assert!(err.to_string().contains("host"));
    }

    #[test]
    fn schema_error_names_attribute() {
        let err = ConfigError::SchemaError {
            attribute: "timeout".into(),
            reason: "no field mapping registered for type std::time::Duration".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("timeout"));
        assert!(msg.contains("Duration"));
    }

    #[test]
    fn parse_error_names_path() {
        let err = ConfigError::ParseError {
            path: "/etc/app/config.yaml".into(),
            reason: "bad indentation".into(),
        };
        assert!(err.to_string().contains("config.yaml"));
    }
}
