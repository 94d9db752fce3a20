//! Schema-driven, layered configuration binding. Declare a schema, stack
//! your sources, and read typed values.
//!
//! Bindfig binds a statically declared configuration schema to values drawn
//! from layered, heterogeneous sources — environment variables, `.env`, INI,
//! JSON, YAML, and TOML files, and in-memory maps — casting raw values to
//! typed fields, validating them, and composing nested sub-configurations
//! under a hierarchical key namespace.
//!
//! ```
//! use bindfig::{Config, DictSource, Int, Schema, Str};
//!
//! let schema = Schema::builder()
//!     .field("host", Str::new().default("localhost"))
//!     .field("port", Int::new())
//!     .build()?;
//!
//! let overrides = DictSource::new();
//! overrides.set("port", "8080");
//!
//! let config = Config::builder(schema)
//!     .source(overrides)
//!     .build()?;
//!
//! assert_eq!(config.get_as::<u16>("port")?, 8080);
//! assert_eq!(config.get_as::<String>("host")?, "localhost");
//! # Ok::<(), bindfig::ConfigError>(())
//! ```
//!
//! # Design: schema as source of truth
//!
//! The [`Schema`] is built once, before any config instance exists, and is
//! the single definition of which attributes exist, how they cast and
//! validate, what their defaults are, and how they nest. Attributes are
//! declared three ways:
//!
//! - **Explicit fields** — `.field("port", Int::new().default(8080))`. The
//!   full catalogue: [`Str`], [`Int`], [`Float`], [`Bool`], [`Bytes`],
//!   [`DecimalField`], [`PathField`], [`File`], [`Folder`], [`EnumField`],
//!   [`Choice`], [`LogLevel`].
//! - **Bare types** — `.typed::<u16>("port")`. The injected [`TypeMapper`]
//!   picks the field kind; an unmapped type fails at `build()`, a schema
//!   definition error rather than a runtime one.
//! - **Nested schemas** — `.nested("database", db_schema)`. The nested
//!   config inherits the storage chain and resolves under
//!   `parent_path + alias`.
//!
//! # Layer precedence
//!
//! ```text
//! First source        .source(..)   highest priority
//!       ↓ falls through to
//! Later sources       .source(..)
//!       ↓ falls through to
//! Field defaults      .default(..)  always lowest
//! ```
//!
//! Every source is **sparse**: it only needs the keys it wants to provide,
//! and lookup returns the value from the first source containing the
//! fully-qualified key. Precedence is per key — there is no deep merging of
//! partial structures, so a key present in a high-priority source never
//! drags its siblings along with it.
//!
//! # Sources
//!
//! All sources load eagerly at construction and are read-only afterwards;
//! no I/O ever happens during resolution.
//!
//! - [`EnvSource`] — process environment snapshot. `MYAPP__DATABASE__URL`
//!   maps to `database.url`: `__` separates segments, single `_` is literal,
//!   segments are lowercased.
//! - [`DotEnv`] — classic `KEY=VALUE` files with the same key convention.
//! - [`Toml`], [`Json`], `Yaml` — document formats, flattened recursively.
//!   JSON/YAML `null` becomes [`Value::Null`].
//! - [`Ini`] — `[section]` headers nest (dotted section names allowed).
//! - [`DictSource`] — in-memory map, buildable from any `serde::Serialize`
//!   value; also the explicit mutation source for tests.
//!
//! File sources come in `load` (missing file is an error) and
//! `load_optional` (missing file is empty) flavors, and all sources accept
//! embedded defaults that lose to loaded values.
//!
//! # Resolution, caching, and nullability
//!
//! Each field resolves at most once per config instance: full key →
//! chain lookup → default fallback → nullability rule → cast → validate →
//! cache. Values read from line-oriented sources are raw strings; the field
//! kind owns the cast (`"8080"` → `8080`, `"Y"` → `true`).
//!
//! A field is nullable if declared so or if its default is `Null`. A null
//! reaching a nullable field is returned as-is without casting; a null
//! reaching anything else is a [`ConfigError::NotNullable`].
//!
//! Cached values are stable for the lifetime of the instance even if a
//! shared source is mutated afterwards — a documented trade-off for O(1)
//! repeated reads. Opt out per field with `.no_cache()`, which re-resolves
//! on every access.
//!
//! # Fail-fast vs lazy
//!
//! By default, `build()` walks every declared attribute (nested configs
//! included, in declaration order) and surfaces the first error — no
//! partially-valid config object escapes. With `.fail_fast(false)` the same
//! errors surface individually on first access instead.
//!
//! # Runtime overrides
//!
//! [`Config::assign`] pushes a value through the same cast + validate
//! pipeline into the cache without touching storage. It bypasses the source
//! of truth, so it logs a `tracing` warning.
//!
//! # Threading
//!
//! A config instance and its sources are single-threaded by design; the
//! resolution cache and [`DictSource`] use interior mutability (`RefCell`),
//! so the compiler enforces the contract instead of documentation alone.
//!
//! # Errors
//!
//! All fallible operations return [`ConfigError`]. Resolution errors carry
//! the fully-qualified key (`Invalid value for 'app.database.pool_size':
//! ...`), loading errors carry the file path, and schema definition errors
//! name the offending attribute.
//!
//! # Cargo features
//!
//! - `yaml` (default) — the YAML file source, via `serde_yaml`.
//! - `rich-errors` — derives `miette::Diagnostic` on [`ConfigError`] for
//!   fancy terminal reports.

pub mod error;

mod config;
mod env;
mod field;
mod file;
mod flatten;
mod key;
mod mapper;
mod schema;
mod source;
mod value;

#[cfg(test)]
mod fixtures;

pub use config::{Config, ConfigBuilder};
pub use env::{ENV_DELIMITER, EnvSource};
pub use error::ConfigError;
pub use field::{
    Bool, Bytes, Choice, DecimalField, EnumField, FieldSpec, File, Float, Folder, Int, LogLevel,
    PathField, Str,
};
#[cfg(feature = "yaml")]
pub use file::Yaml;
pub use file::{DotEnv, Ini, Json, Toml};
pub use key::Key;
pub use mapper::{FieldFactory, TypeMapper};
pub use schema::{Schema, SchemaBuilder};
pub use source::{Chain, DictSource, Source};
pub use value::{FromValue, Value};

#[cfg(test)]
mod integration {
    //! End-to-end coverage across sources, schema, and config.

    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;
    use crate::fixtures::test::app_schema;

    #[test]
    fn file_env_and_assign_layering() {
        let dir = TempDir::new().unwrap();
        let toml_path = dir.path().join("app.toml");
        std::fs::write(
            &toml_path,
            "host = \"filehost\"\n[database]\npool_size = 20\n",
        )
        .unwrap();

        let env = EnvSource::with_vars(
            "APP",
            vec![("APP__PORT".to_string(), "4000".to_string())],
        );
        let file = Toml::load(&toml_path).unwrap();

        // Env outranks the file; both outrank field defaults.
        let config = Config::builder(app_schema())
            .source(env)
            .source(file)
            .build()
            .unwrap();

        assert_eq!(config.get_as::<String>("host").unwrap(), "filehost");
        assert_eq!(config.get_as::<u16>("port").unwrap(), 4000);
        assert!(!config.get_as::<bool>("debug").unwrap());
        assert_eq!(config.get_as::<i64>("database.pool_size").unwrap(), 20);

        config.assign("debug", "yes").unwrap();
        assert!(config.get_as::<bool>("debug").unwrap());
    }

    #[test]
    fn env_outranks_file_for_same_key() {
        let dir = TempDir::new().unwrap();
        let toml_path = dir.path().join("app.toml");
        std::fs::write(&toml_path, "port = 3000\n").unwrap();

        let env = EnvSource::with_vars(
            "APP",
            vec![("APP__PORT".to_string(), "5000".to_string())],
        );
        let config = Config::builder(app_schema())
            .source(env)
            .source(Toml::load(&toml_path).unwrap())
            .build()
            .unwrap();
        assert_eq!(config.get_as::<u16>("port").unwrap(), 5000);
    }

    #[test]
    fn whole_value_wins_per_key_across_sources() {
        let high = DictSource::new();
        high.set("database.pool_size", 50i64);
        let low = DictSource::new();
        low.set("database.pool_size", 5i64);
        low.set("database.url", "pg://low");

        let config = Config::builder(app_schema())
            .source(high)
            .source(low)
            .build()
            .unwrap();

        // pool_size from the high-priority source, url from the low one:
        // precedence is per fully-qualified key, never per subtree.
        assert_eq!(config.get_as::<i64>("database.pool_size").unwrap(), 50);
        assert_eq!(
            config.get_as::<Option<String>>("database.url").unwrap(),
            Some("pg://low".into())
        );
    }

    #[test]
    fn serialize_defaults_source() {
        use serde::Serialize;

        #[derive(Serialize)]
        struct Defaults {
            host: &'static str,
            port: u16,
        }

        let source = DictSource::from_serialize(&Defaults {
            host: "0.0.0.0",
            port: 9999,
        })
        .unwrap();
        let config = Config::builder(app_schema()).source(source).build().unwrap();
        assert_eq!(config.get_as::<String>("host").unwrap(), "0.0.0.0");
        assert_eq!(config.get_as::<u16>("port").unwrap(), 9999);
    }

    #[test]
    fn shared_chain_reaches_nested_configs() {
        let source = Arc::new(DictSource::new());
        source.set("database.pool_size", 11i64);
        let config = Config::builder(app_schema())
            .shared_source(source)
            .build()
            .unwrap();
        let database = config.section("database").unwrap();
        assert_eq!(database.get_as::<i64>("pool_size").unwrap(), 11);
    }
}
