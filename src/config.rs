//! Config instances: storage propagation, fail-fast validation, and value
//! resolution.
//!
//! A [`Config`] is built from a shared [`Schema`](crate::Schema) plus an
//! ordered list of sources (first = highest priority). Construction wires the
//! whole subtree in one pass — every nested config receives the combined
//! [`Chain`] and its root-path prefix before anything resolves — and, unless
//! fail-fast is disabled, walks every declared attribute once so the first
//! configuration error surfaces out of `build()` instead of deep inside the
//! application.
//!
//! Resolution pipeline per field: build the fully-qualified key
//! (`root_path + alias`), look it up through the chain, fall back to the
//! field's default, apply the nullability rule, cast, validate, cache.
//! Successful results are cached on the config instance keyed by the
//! fully-qualified key, so repeated reads are O(1) and stable even if a
//! shared source is mutated afterwards — except for fields declared
//! `no_cache`, which re-resolve on every access.
//!
//! The cache lives in a `RefCell`; a config instance is single-threaded by
//! construction and the compiler enforces it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::field::FieldSpec;
use crate::key::Key;
use crate::schema::{Schema, SchemaEntry, SchemaNode};
use crate::source::{Chain, Source};
use crate::value::{FromValue, Value};

/// A constructed configuration: a schema bound to a storage chain under a
/// root path.
#[derive(Debug)]
pub struct Config {
    schema: Arc<Schema>,
    chain: Chain,
    root_path: Key,
    children: HashMap<String, Config>,
    cache: RefCell<HashMap<Key, Value>>,
}

impl Config {
    /// Start building a config for `schema`.
    pub fn builder(schema: impl Into<Arc<Schema>>) -> ConfigBuilder {
        ConfigBuilder {
            schema: schema.into(),
            sources: Vec::new(),
            alias: String::new(),
            fail_fast: true,
        }
    }

    /// Recursively wire a subtree: every nested config gets the shared chain
    /// and its root path extended by its alias, before any resolution.
    fn instantiate(schema: Arc<Schema>, chain: &Chain, root_path: Key) -> Self {
        let mut children = HashMap::new();
        for entry in &schema.entries {
            if let SchemaNode::Nested {
                alias,
                schema: child_schema,
            } = &entry.node
            {
                let child = Config::instantiate(
                    child_schema.clone(),
                    chain,
                    root_path.child(alias),
                );
                children.insert(entry.name.clone(), child);
            }
        }
        Config {
            schema,
            chain: chain.clone(),
            root_path,
            children,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Key prefix this config resolves under.
    pub fn root_path(&self) -> &Key {
        &self.root_path
    }

    /// Force resolution of every declared field and nested config, in
    /// declaration order. The first error aborts the walk.
    pub fn check(&self) -> Result<(), ConfigError> {
        for entry in &self.schema.entries {
            match &entry.node {
                SchemaNode::Field(field) => {
                    let key = self.root_path.child(field.alias());
                    self.resolve_field(field.as_ref(), &key)?;
                }
                SchemaNode::Nested { .. } => {
                    if let Some(child) = self.children.get(&entry.name) {
                        child.check()?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Resolve an attribute by dotted path of declared names
    /// (`"database.pool_size"`).
    pub fn get(&self, path: &str) -> Result<Value, ConfigError> {
        self.get_entry(path).map(|(_, value)| value)
    }

    /// Resolve and extract as `T`.
    pub fn get_as<T: FromValue>(&self, path: &str) -> Result<T, ConfigError> {
        let (key, value) = self.get_entry(path)?;
        T::from_value(&value, &key)
    }

    /// Resolve a string-kinded attribute and parse it with `FromStr` — the
    /// extraction seam for user enums.
    pub fn get_parsed<T>(&self, path: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let (key, value) = self.get_entry(path)?;
        match &value {
            Value::Str(s) => s.parse::<T>().map_err(|e| ConfigError::InvalidValue {
                key,
                reason: e.to_string(),
            }),
            other => Err(ConfigError::InvalidValue {
                key,
                reason: format!("expected string, got {}", other.type_name()),
            }),
        }
    }

    /// Access a nested config by dotted path of declared names.
    pub fn section(&self, path: &str) -> Option<&Config> {
        let mut config = self;
        for segment in path.split('.') {
            config = config.children.get(segment)?;
        }
        Some(config)
    }

    /// Override an attribute at runtime.
    ///
    /// The value goes through the same cast + validate pipeline as a stored
    /// one and lands in the resolution cache; storage is not touched. This
    /// bypasses the source of truth, so it is logged as a warning. A
    /// `no_cache` field re-resolves from storage and will not observe the
    /// assignment.
    pub fn assign(&self, path: &str, value: impl Into<Value>) -> Result<(), ConfigError> {
        let (config, entry) = self.locate(path)?;
        let SchemaNode::Field(field) = &entry.node else {
            return Err(ConfigError::InvalidValue {
                key: config.root_path.child(&entry.name),
                reason: "is a nested config, not a value".into(),
            });
        };
        let key = config.root_path.child(field.alias());
        tracing::warn!(
            key = %key,
            "assigning configuration value at runtime, bypassing storage"
        );
        let value = config.cast_and_validate(field.as_ref(), &key, value.into())?;
        config.cache.borrow_mut().insert(key, value);
        Ok(())
    }

    fn get_entry(&self, path: &str) -> Result<(Key, Value), ConfigError> {
        let (config, entry) = self.locate(path)?;
        match &entry.node {
            SchemaNode::Field(field) => {
                let key = config.root_path.child(field.alias());
                let value = config.resolve_field(field.as_ref(), &key)?;
                Ok((key, value))
            }
            SchemaNode::Nested { alias, .. } => Err(ConfigError::InvalidValue {
                key: config.root_path.child(alias),
                reason: "is a nested config, not a value".into(),
            }),
        }
    }

    /// Walk a dotted path of declared names down the subtree, returning the
    /// config owning the final attribute and its schema entry.
    fn locate(&self, path: &str) -> Result<(&Config, &SchemaEntry), ConfigError> {
        let unknown = || ConfigError::UnknownAttribute(path.to_string());
        let mut config = self;
        let mut segments = path.split('.').peekable();
        loop {
            let segment = segments.next().ok_or_else(unknown)?;
            let entry = config.schema.entry(segment).ok_or_else(unknown)?;
            if segments.peek().is_none() {
                return Ok((config, entry));
            }
            match &entry.node {
                SchemaNode::Nested { .. } => {
                    config = config.children.get(segment).ok_or_else(unknown)?;
                }
                SchemaNode::Field(_) => return Err(unknown()),
            }
        }
    }

    fn resolve_field(&self, field: &dyn FieldSpec, key: &Key) -> Result<Value, ConfigError> {
        if field.cached()
            && let Some(cached) = self.cache.borrow().get(key)
        {
            return Ok(cached.clone());
        }

        let raw = match self.chain.resolve(key) {
            Some(value) => value,
            None => match field.default() {
                Some(default) => default.clone(),
                None => {
                    return Err(ConfigError::KeyNotFound { key: key.clone() });
                }
            },
        };

        let value = self.cast_and_validate(field, key, raw)?;
        if field.cached() {
            self.cache.borrow_mut().insert(key.clone(), value.clone());
        }
        Ok(value)
    }

    fn cast_and_validate(
        &self,
        field: &dyn FieldSpec,
        key: &Key,
        raw: Value,
    ) -> Result<Value, ConfigError> {
        if raw.is_null() {
            if !field.nullable() {
                return Err(ConfigError::NotNullable { key: key.clone() });
            }
            // Null passes through without invoking the kind cast.
            return Ok(Value::Null);
        }
        let value = field
            .cast(&raw)
            .map_err(|reason| ConfigError::InvalidValue {
                key: key.clone(),
                reason,
            })?;
        field
            .validate(&value)
            .map_err(|reason| ConfigError::InvalidValue {
                key: key.clone(),
                reason,
            })?;
        Ok(value)
    }
}

/// Builds a [`Config`] from sources in priority order.
///
/// The first `source` call has the highest priority; each later call adds a
/// lower-priority fallback. `fail_fast` (on by default) validates the whole
/// schema during [`build`](Self::build) — no partially-valid config escapes.
pub struct ConfigBuilder {
    schema: Arc<Schema>,
    sources: Vec<Arc<dyn Source>>,
    alias: String,
    fail_fast: bool,
}

impl ConfigBuilder {
    /// Add a source. Earlier sources take precedence over later ones.
    pub fn source(mut self, source: impl Source + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Add an already-shared source — the way tests hold on to a
    /// [`DictSource`](crate::DictSource) they mutate later.
    pub fn shared_source(mut self, source: Arc<dyn Source>) -> Self {
        self.sources.push(source);
        self
    }

    /// Set this config's own segment name. The root path becomes
    /// `(alias,)`, and every key resolves beneath it.
    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = alias.to_string();
        self
    }

    /// Toggle eager validation. With `false`, construction always succeeds
    /// and errors surface on first access of the offending attribute.
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        let chain = Chain::new(self.sources);
        let root_path = if self.alias.is_empty() {
            Key::root()
        } else {
            Key::root().child(&self.alias)
        };
        tracing::debug!(
            root = %root_path,
            sources = chain.len(),
            "constructing configuration"
        );
        let config = Config::instantiate(self.schema, &chain, root_path);
        if self.fail_fast {
            config.check()?;
        }
        Ok(config)
    }
}
