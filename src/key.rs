//! Hierarchical keys addressing configuration values.
//!
//! A [`Key`] is an ordered sequence of string segments — `("database", "url")`
//! — and is the sole addressing mechanism shared by every storage source.
//! Keys display as dotted paths (`database.url`) and can be parsed back from
//! them, matching the notation used throughout the public API.

use std::fmt;

/// An ordered sequence of string segments locating a value in the
/// hierarchical configuration namespace.
///
/// Two keys are equal iff their segments are equal, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key {
    segments: Vec<String>,
}

impl Key {
    /// The empty key: the root of the namespace.
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Build a key from an ordered sequence of segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Return a new key with `segment` appended.
    pub fn child(&self, segment: &str) -> Key {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Key { segments }
    }

    /// Return a new key with all of `other`'s segments appended.
    pub fn join(&self, other: &Key) -> Key {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Key { segments }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Parse a dotted path: `"database.url"` → `("database", "url")`.
/// Empty segments are discarded, so `""` parses to the root key.
impl From<&str> for Key {
    fn from(dotted: &str) -> Self {
        Key {
            segments: dotted
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl From<&String> for Key {
    fn from(dotted: &String) -> Self {
        Key::from(dotted.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn equality_is_ordered() {
        assert_eq!(Key::new(["db", "host"]), Key::new(["db", "host"]));
        assert_ne!(Key::new(["db", "host"]), Key::new(["host", "db"]));
    }

    #[test]
    fn display_is_dotted() {
        assert_eq!(Key::new(["db", "host"]).to_string(), "db.host");
        assert_eq!(Key::new(["port"]).to_string(), "port");
        assert_eq!(Key::root().to_string(), "");
    }

    #[test]
    fn parse_dotted_path() {
        assert_eq!(Key::from("db.host"), Key::new(["db", "host"]));
        assert_eq!(Key::from("port"), Key::new(["port"]));
        assert_eq!(Key::from(""), Key::root());
    }

    #[test]
    fn child_appends_segment() {
        let key = Key::new(["app"]).child("port");
        assert_eq!(key, Key::new(["app", "port"]));
    }

    #[test]
    fn join_appends_all_segments() {
        let key = Key::new(["app"]).join(&Key::new(["db", "host"]));
        assert_eq!(key, Key::new(["app", "db", "host"]));
    }

    #[test]
    fn root_is_empty() {
        assert!(Key::root().is_root());
        assert!(!Key::new(["a"]).is_root());
    }

    #[test]
    fn usable_as_map_key() {
        let mut map = HashMap::new();
        map.insert(Key::new(["db", "host"]), 1);
        assert_eq!(map.get(&Key::from("db.host")), Some(&1));
    }
}
