//! File-backed storage sources.
//!
//! Each source parses its format eagerly at construction and flattens the
//! document into `Key → Value` entries; no I/O happens after `load` returns.
//! Every source comes in two flavors:
//!
//! - `load(path)` — the file must exist; a missing file is an
//!   [`IoError`](crate::ConfigError::IoError) naming the path.
//! - `load_optional(path)` — a missing file yields an empty source. Listing
//!   an optional file is a suggestion, not a requirement.
//!
//! All sources support embedded defaults via `with_defaults`, filled in only
//! where the file did not provide a value.
//!
//! Values in the line-oriented formats (`.env`, INI) stay raw strings —
//! casting is the field binder's job. The document formats (JSON, YAML,
//! TOML) keep their parsed scalar types.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ConfigError;
use crate::flatten;
use crate::key::Key;
use crate::source::Source;
use crate::value::Value;

fn read_file(path: &Path, missing_ok: bool) -> Result<Option<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && missing_ok => Ok(None),
        Err(e) => Err(ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn parse_error(path: &Path, reason: impl ToString) -> ConfigError {
    ConfigError::ParseError {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Generates the shared plumbing of a file source: constructors, defaults,
/// path accessor, and the `Source` impl. Each format supplies only its
/// `parse` function.
macro_rules! file_source {
    ($ty:ident, $parse:path) => {
        impl $ty {
            /// Load and flatten the file. A missing file is an error.
            pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
                Self::read(path.into(), false)
            }

            /// Load and flatten the file; a missing file yields an empty
            /// source.
            pub fn load_optional(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
                Self::read(path.into(), true)
            }

            fn read(path: PathBuf, missing_ok: bool) -> Result<Self, ConfigError> {
                let entries = match read_file(&path, missing_ok)? {
                    Some(content) => $parse(&content, &path)?,
                    None => HashMap::new(),
                };
                Ok(Self { path, entries })
            }

            /// Add embedded defaults from any `Serialize` value. Defaults
            /// only fill keys the file did not provide.
            pub fn with_defaults<S: Serialize>(
                mut self,
                defaults: &S,
            ) -> Result<Self, ConfigError> {
                for (key, value) in flatten::from_serialize(defaults)? {
                    self.entries.entry(key).or_insert(value);
                }
                Ok(self)
            }

            pub fn path(&self) -> &Path {
                &self.path
            }

            pub fn len(&self) -> usize {
                self.entries.len()
            }

            pub fn is_empty(&self) -> bool {
                self.entries.is_empty()
            }
        }

        impl Source for $ty {
            fn get(&self, key: &Key) -> Option<Value> {
                self.entries.get(key).cloned()
            }
        }
    };
}

// --- TOML --------------------------------------------------------------------

/// TOML file source. Nested tables extend the key path.
#[derive(Debug)]
pub struct Toml {
    path: PathBuf,
    entries: HashMap<Key, Value>,
}

fn parse_toml(content: &str, path: &Path) -> Result<HashMap<Key, Value>, ConfigError> {
    let table: toml::Table = toml::from_str(content).map_err(|e| parse_error(path, e))?;
    let pairs = flatten::flatten_toml(table).map_err(|reason| parse_error(path, reason))?;
    Ok(pairs.into_iter().collect())
}

file_source!(Toml, parse_toml);

// --- JSON --------------------------------------------------------------------

/// JSON file source. The root must be an object; `null` becomes
/// [`Value::Null`].
#[derive(Debug)]
pub struct Json {
    path: PathBuf,
    entries: HashMap<Key, Value>,
}

fn parse_json(content: &str, path: &Path) -> Result<HashMap<Key, Value>, ConfigError> {
    let doc: serde_json::Value =
        serde_json::from_str(content).map_err(|e| parse_error(path, e))?;
    let serde_json::Value::Object(map) = doc else {
        return Err(parse_error(path, "root must be a JSON object"));
    };
    let pairs = flatten::flatten_json(map).map_err(|reason| parse_error(path, reason))?;
    Ok(pairs.into_iter().collect())
}

file_source!(Json, parse_json);

// --- YAML --------------------------------------------------------------------

/// YAML file source. The root must be a mapping; an empty document yields an
/// empty source.
#[cfg(feature = "yaml")]
#[derive(Debug)]
pub struct Yaml {
    path: PathBuf,
    entries: HashMap<Key, Value>,
}

#[cfg(feature = "yaml")]
fn parse_yaml(content: &str, path: &Path) -> Result<HashMap<Key, Value>, ConfigError> {
    let doc: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| parse_error(path, e))?;
    let map = match doc {
        serde_yaml::Value::Mapping(map) => map,
        serde_yaml::Value::Null => return Ok(HashMap::new()),
        _ => return Err(parse_error(path, "root must be a YAML mapping")),
    };
    let pairs = flatten::flatten_yaml(map).map_err(|reason| parse_error(path, reason))?;
    Ok(pairs.into_iter().collect())
}

#[cfg(feature = "yaml")]
file_source!(Yaml, parse_yaml);

// --- .env --------------------------------------------------------------------

/// Classic `.env` file source: one `KEY=VALUE` per line.
///
/// Comment lines (`#` or `//`) and blank lines are skipped. Key names split
/// on `__` into lowercased segments, matching [`EnvSource`]'s convention
/// (`DB__HOST=h` → `db.host`); single `_` stays part of the segment. Values
/// are kept as raw trimmed strings.
///
/// [`EnvSource`]: crate::EnvSource
#[derive(Debug)]
pub struct DotEnv {
    path: PathBuf,
    entries: HashMap<Key, Value>,
}

fn parse_dotenv(content: &str, path: &Path) -> Result<HashMap<Key, Value>, ConfigError> {
    let mut entries = HashMap::new();
    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
            continue;
        }
        let Some((name, value)) = trimmed.split_once('=') else {
            return Err(parse_error(path, format!("line {}: missing '='", i + 1)));
        };
        let key = Key::new(
            name.trim()
                .split(crate::env::ENV_DELIMITER)
                .map(str::to_lowercase),
        );
        entries.insert(key, Value::Str(value.trim().to_string()));
    }
    Ok(entries)
}

file_source!(DotEnv, parse_dotenv);

impl DotEnv {
    /// Drop a leading `prefix` segment from every key, so a file written as
    /// `APP__DB__HOST=h` serves the key `db.host`. Keys without the prefix
    /// are left untouched.
    pub fn strip_prefix(mut self, prefix: &str) -> Self {
        let prefix = prefix.to_lowercase();
        self.entries = self
            .entries
            .into_iter()
            .map(|(key, value)| {
                let segments = key.segments();
                if segments.len() > 1 && segments[0] == prefix {
                    (Key::new(segments[1..].iter().cloned()), value)
                } else {
                    (key, value)
                }
            })
            .collect();
        self
    }
}

// --- INI ---------------------------------------------------------------------

/// INI file source.
///
/// `[section]` headers prefix the keys that follow; dotted section names
/// (`[db.primary]`) nest. Keys before any section are top-level. Both `=`
/// and `:` delimit keys from values; `#` and `;` start comment lines. Key
/// case is preserved as written.
#[derive(Debug)]
pub struct Ini {
    path: PathBuf,
    entries: HashMap<Key, Value>,
}

fn parse_ini(content: &str, path: &Path) -> Result<HashMap<Key, Value>, ConfigError> {
    let mut entries = HashMap::new();
    let mut section = Key::root();

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }
        if let Some(header) = trimmed.strip_prefix('[') {
            let Some(name) = header.strip_suffix(']') else {
                return Err(parse_error(
                    path,
                    format!("line {}: unterminated section header", i + 1),
                ));
            };
            section = Key::from(name.trim());
            continue;
        }
        let delimiter = trimmed
            .char_indices()
            .find(|(_, c)| *c == '=' || *c == ':')
            .map(|(idx, _)| idx);
        let Some(idx) = delimiter else {
            return Err(parse_error(
                path,
                format!("line {}: expected 'key = value' or 'key: value'", i + 1),
            ));
        };
        let (name, value) = trimmed.split_at(idx);
        entries.insert(
            section.child(name.trim()),
            Value::Str(value[1..].trim().to_string()),
        );
    }
    Ok(entries)
}

file_source!(Ini, parse_ini);

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn toml_nested_tables() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "app.toml", "host = \"h\"\n[database]\npool_size = 5\n");
        let source = Toml::load(path).unwrap();
        assert_eq!(
            source.get(&Key::from("host")),
            Some(Value::Str("h".into()))
        );
        assert_eq!(
            source.get(&Key::from("database.pool_size")),
            Some(Value::Int(5))
        );
    }

    #[test]
    fn toml_missing_file_errors_with_path() {
        let dir = TempDir::new().unwrap();
        let err = Toml::load(dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn toml_load_optional_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        let source = Toml::load_optional(dir.path().join("nope.toml")).unwrap();
        assert!(source.is_empty());
    }

    #[test]
    fn toml_parse_error_names_path() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.toml", "host = \n");
        let err = Toml::load(path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn json_null_and_nesting() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "app.json", r#"{"db": {"url": null, "port": 5432}}"#);
        let source = Json::load(path).unwrap();
        assert_eq!(source.get(&Key::from("db.url")), Some(Value::Null));
        assert_eq!(source.get(&Key::from("db.port")), Some(Value::Int(5432)));
    }

    #[test]
    fn json_non_object_root_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "app.json", "[1, 2]");
        let err = Json::load(path).unwrap_err();
        assert!(err.to_string().contains("object"));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn yaml_nesting() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "app.yaml", "db:\n  host: h\n  port: 5432\n");
        let source = Yaml::load(path).unwrap();
        assert_eq!(
            source.get(&Key::from("db.host")),
            Some(Value::Str("h".into()))
        );
        assert_eq!(source.get(&Key::from("db.port")), Some(Value::Int(5432)));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn yaml_empty_document_is_empty_source() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "empty.yaml", "");
        let source = Yaml::load(path).unwrap();
        assert!(source.is_empty());
    }

    #[test]
    fn dotenv_basic() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            ".env",
            "# comment\n// also a comment\nDB__HOST=localhost\nPOOL_SIZE = 10\n\n",
        );
        let source = DotEnv::load(path).unwrap();
        assert_eq!(
            source.get(&Key::from("db.host")),
            Some(Value::Str("localhost".into()))
        );
        assert_eq!(
            source.get(&Key::from("pool_size")),
            Some(Value::Str("10".into()))
        );
    }

    #[test]
    fn dotenv_strip_prefix() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, ".env", "APP__DB__HOST=h\nOTHER=x\n");
        let source = DotEnv::load(path).unwrap().strip_prefix("APP");
        assert_eq!(
            source.get(&Key::from("db.host")),
            Some(Value::Str("h".into()))
        );
        assert_eq!(
            source.get(&Key::from("other")),
            Some(Value::Str("x".into()))
        );
    }

    #[test]
    fn dotenv_line_without_equals_errors() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, ".env", "HOST=h\nBROKEN LINE\n");
        let err = DotEnv::load(path).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn ini_sections_and_delimiters() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "app.ini",
            "; comment\ntop = 1\n[database]\nhost = h\nport: 5432\n[db.primary]\nurl = pg://\n",
        );
        let source = Ini::load(path).unwrap();
        assert_eq!(source.get(&Key::from("top")), Some(Value::Str("1".into())));
        assert_eq!(
            source.get(&Key::from("database.host")),
            Some(Value::Str("h".into()))
        );
        assert_eq!(
            source.get(&Key::from("database.port")),
            Some(Value::Str("5432".into()))
        );
        assert_eq!(
            source.get(&Key::from("db.primary.url")),
            Some(Value::Str("pg://".into()))
        );
    }

    #[test]
    fn ini_preserves_key_case() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "app.ini", "[Section]\nCamelKey = v\n");
        let source = Ini::load(path).unwrap();
        assert_eq!(
            source.get(&Key::from("Section.CamelKey")),
            Some(Value::Str("v".into()))
        );
    }

    #[test]
    fn ini_unterminated_section_errors() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "app.ini", "[broken\n");
        assert!(Ini::load(path).is_err());
    }

    #[test]
    fn with_defaults_loses_to_file_values() {
        use std::collections::BTreeMap;
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "app.toml", "port = 8080\n");
        let mut defaults = BTreeMap::new();
        defaults.insert("port", 9000i64);
        defaults.insert("retries", 3i64);
        let source = Toml::load(path).unwrap().with_defaults(&defaults).unwrap();
        assert_eq!(source.get(&Key::from("port")), Some(Value::Int(8080)));
        assert_eq!(source.get(&Key::from("retries")), Some(Value::Int(3)));
    }
}
