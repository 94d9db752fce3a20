//! Typed field binders.
//!
//! A field is the binder attached to one declared schema attribute: it knows
//! the attribute's storage alias, default, nullability, and caching policy,
//! and implements the raw → typed cast plus any secondary validation for its
//! kind. Fields never read storage themselves — the owning
//! [`Config`](crate::Config) drives the resolution pipeline and owns the
//! cache.
//!
//! Every kind shares the same chainable builder methods:
//!
//! ```
//! use bindfig::{Int, Value};
//!
//! let port = Int::new().default(8080).alias("PORT_NUMBER");
//! let optional = Int::new().default(Value::Null); // null default → nullable
//! ```

use std::path::Path;

use crate::value::{Value, parse_log_level};

/// The binder contract every field kind implements.
///
/// `bind` is called exactly once, while the schema is built; everything else
/// is read-only afterwards. `cast` receives non-null raw values only — the
/// resolution pipeline short-circuits `Null` according to `nullable` before
/// casting, and wraps cast/validate failures into
/// [`InvalidValue`](crate::ConfigError::InvalidValue) with the
/// fully-qualified key.
pub trait FieldSpec: std::fmt::Debug {
    /// Fix the storage alias: keeps an explicitly declared alias, otherwise
    /// adopts the attribute's declared name.
    fn bind(&mut self, declared_name: &str);

    /// Storage segment name. Only meaningful after [`bind`](Self::bind).
    fn alias(&self) -> &str;

    /// Default raw value; `None` means the key is required.
    fn default(&self) -> Option<&Value>;

    fn nullable(&self) -> bool;

    /// Whether resolved values are cached by the owning config.
    fn cached(&self) -> bool;

    /// Cast a non-null raw value into this kind's canonical form.
    fn cast(&self, raw: &Value) -> Result<Value, String>;

    /// Secondary validation of the cast value.
    fn validate(&self, _value: &Value) -> Result<(), String> {
        Ok(())
    }
}

/// State shared by every field kind.
#[derive(Debug, Clone, Default)]
struct FieldBase {
    default: Option<Value>,
    alias: Option<String>,
    nullable: bool,
    no_cache: bool,
}

impl FieldBase {
    fn bind(&mut self, declared_name: &str) {
        if self.alias.is_none() {
            self.alias = Some(declared_name.to_string());
        }
    }

    fn alias(&self) -> &str {
        self.alias.as_deref().unwrap_or("")
    }

    fn set_default(&mut self, value: Value) {
        if value.is_null() {
            self.nullable = true;
        }
        self.default = Some(value);
    }
}

/// Generates the chainable builder methods shared by all field kinds.
macro_rules! field_builder {
    ($ty:ty) => {
        impl $ty {
            /// Default used when no source provides the key. A `Null`
            /// default also makes the field nullable.
            pub fn default(mut self, value: impl Into<Value>) -> Self {
                self.base.set_default(value.into());
                self
            }

            /// Storage segment name to use instead of the declared
            /// attribute name.
            pub fn alias(mut self, alias: &str) -> Self {
                self.base.alias = Some(alias.to_string());
                self
            }

            /// Accept `Null` as a resolved value.
            pub fn nullable(mut self) -> Self {
                self.base.nullable = true;
                self
            }

            /// Re-resolve from storage on every access instead of caching.
            pub fn no_cache(mut self) -> Self {
                self.base.no_cache = true;
                self
            }
        }
    };
}

/// Generates the [`FieldSpec`] impl, delegating `cast` (and optionally
/// `validate`) to the kind's inherent methods.
macro_rules! field_spec {
    ($ty:ty) => {
        impl FieldSpec for $ty {
            fn bind(&mut self, declared_name: &str) {
                self.base.bind(declared_name);
            }
            fn alias(&self) -> &str {
                self.base.alias()
            }
            fn default(&self) -> Option<&Value> {
                self.base.default.as_ref()
            }
            fn nullable(&self) -> bool {
                self.base.nullable
            }
            fn cached(&self) -> bool {
                !self.base.no_cache
            }
            fn cast(&self, raw: &Value) -> Result<Value, String> {
                self.cast_value(raw)
            }
        }
    };
    ($ty:ty, validate) => {
        impl FieldSpec for $ty {
            fn bind(&mut self, declared_name: &str) {
                self.base.bind(declared_name);
            }
            fn alias(&self) -> &str {
                self.base.alias()
            }
            fn default(&self) -> Option<&Value> {
                self.base.default.as_ref()
            }
            fn nullable(&self) -> bool {
                self.base.nullable
            }
            fn cached(&self) -> bool {
                !self.base.no_cache
            }
            fn cast(&self, raw: &Value) -> Result<Value, String> {
                self.cast_value(raw)
            }
            fn validate(&self, value: &Value) -> Result<(), String> {
                self.validate_value(value)
            }
        }
    };
}

// --- Str ---------------------------------------------------------------------

/// String field. Any scalar casts to its string rendering.
#[derive(Debug, Clone)]
pub struct Str {
    base: FieldBase,
}

impl Str {
    pub fn new() -> Self {
        Self {
            base: FieldBase::default(),
        }
    }

    fn cast_value(&self, raw: &Value) -> Result<Value, String> {
        match raw {
            Value::Str(s) => Ok(Value::Str(s.clone())),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) => Ok(Value::Str(raw.to_string())),
            other => Err(format!("cannot cast {} to string", other.type_name())),
        }
    }
}

field_builder!(Str);
field_spec!(Str);

// --- Int ---------------------------------------------------------------------

/// Integer field. Strings parse; floats truncate toward zero.
#[derive(Debug, Clone)]
pub struct Int {
    base: FieldBase,
}

impl Int {
    pub fn new() -> Self {
        Self {
            base: FieldBase::default(),
        }
    }

    fn cast_value(&self, raw: &Value) -> Result<Value, String> {
        match raw {
            Value::Int(i) => Ok(Value::Int(*i)),
            Value::Str(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| format!("cannot cast '{s}' to integer")),
            Value::Float(x) => Ok(Value::Int(x.trunc() as i64)),
            Value::Bool(b) => Ok(Value::Int(*b as i64)),
            other => Err(format!("cannot cast {} to integer", other.type_name())),
        }
    }
}

field_builder!(Int);
field_spec!(Int);

// --- Float -------------------------------------------------------------------

/// Floating point field.
#[derive(Debug, Clone)]
pub struct Float {
    base: FieldBase,
}

impl Float {
    pub fn new() -> Self {
        Self {
            base: FieldBase::default(),
        }
    }

    fn cast_value(&self, raw: &Value) -> Result<Value, String> {
        match raw {
            Value::Float(x) => Ok(Value::Float(*x)),
            Value::Int(i) => Ok(Value::Float(*i as f64)),
            Value::Str(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| format!("cannot cast '{s}' to float")),
            Value::Bool(b) => Ok(Value::Float(*b as i64 as f64)),
            other => Err(format!("cannot cast {} to float", other.type_name())),
        }
    }
}

field_builder!(Float);
field_spec!(Float);

// --- Bool --------------------------------------------------------------------

/// Boolean field with a permissive truthy grammar.
///
/// Case-insensitive members of `{"true", "yes", "y", "1", "+"}` are true;
/// any other string is false. This is deliberately not a strict two-token
/// parse. Integers go through their decimal rendering, so `1` is true and
/// everything else is false.
#[derive(Debug, Clone)]
pub struct Bool {
    base: FieldBase,
}

const TRUTHY: [&str; 5] = ["true", "yes", "y", "1", "+"];

impl Bool {
    pub fn new() -> Self {
        Self {
            base: FieldBase::default(),
        }
    }

    fn cast_value(&self, raw: &Value) -> Result<Value, String> {
        match raw {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::Int(i) => Ok(Value::Bool(TRUTHY.contains(&i.to_string().as_str()))),
            Value::Str(s) => Ok(Value::Bool(
                TRUTHY.contains(&s.to_lowercase().as_str()),
            )),
            other => Err(format!("cannot cast {} to bool", other.type_name())),
        }
    }
}

field_builder!(Bool);
field_spec!(Bool);

// --- Bytes -------------------------------------------------------------------

/// Byte sequence field. Stored as the raw string; extract with
/// `get_as::<Vec<u8>>`.
#[derive(Debug, Clone)]
pub struct Bytes {
    base: FieldBase,
}

impl Bytes {
    pub fn new() -> Self {
        Self {
            base: FieldBase::default(),
        }
    }

    fn cast_value(&self, raw: &Value) -> Result<Value, String> {
        match raw {
            Value::Str(s) => Ok(Value::Str(s.clone())),
            other => Err(format!("cannot cast {} to bytes", other.type_name())),
        }
    }
}

field_builder!(Bytes);
field_spec!(Bytes);

// --- Decimal -----------------------------------------------------------------

/// Exact decimal field backed by [`rust_decimal`].
///
/// The cast validates and canonicalizes (no float round-trip for string
/// input); extract with `get_as::<rust_decimal::Decimal>`.
#[derive(Debug, Clone)]
pub struct DecimalField {
    base: FieldBase,
}

impl DecimalField {
    pub fn new() -> Self {
        Self {
            base: FieldBase::default(),
        }
    }

    fn cast_value(&self, raw: &Value) -> Result<Value, String> {
        use std::str::FromStr;
        let decimal = match raw {
            Value::Str(s) => rust_decimal::Decimal::from_str(s.trim())
                .map_err(|e| format!("cannot cast '{s}' to decimal: {e}"))?,
            Value::Int(i) => rust_decimal::Decimal::from(*i),
            Value::Float(x) => rust_decimal::Decimal::try_from(*x)
                .map_err(|e| format!("cannot cast {x} to decimal: {e}"))?,
            other => return Err(format!("cannot cast {} to decimal", other.type_name())),
        };
        Ok(Value::Str(decimal.to_string()))
    }
}

field_builder!(DecimalField);
field_spec!(DecimalField);

// --- Paths -------------------------------------------------------------------

/// Filesystem path field. Validates that the path exists unless
/// `missing_ok` is set; extract with `get_as::<PathBuf>`.
#[derive(Debug, Clone)]
pub struct PathField {
    base: FieldBase,
    missing_ok: bool,
}

impl PathField {
    pub fn new() -> Self {
        Self {
            base: FieldBase::default(),
            missing_ok: false,
        }
    }

    /// Skip the existence check.
    pub fn missing_ok(mut self) -> Self {
        self.missing_ok = true;
        self
    }

    fn cast_value(&self, raw: &Value) -> Result<Value, String> {
        match raw {
            Value::Str(s) => Ok(Value::Str(s.clone())),
            other => Err(format!("cannot cast {} to path", other.type_name())),
        }
    }

    fn validate_value(&self, value: &Value) -> Result<(), String> {
        let path = Path::new(value.as_str().unwrap_or_default());
        if !path.exists() && !self.missing_ok {
            return Err(format!("path {} not found", path.display()));
        }
        Ok(())
    }
}

field_builder!(PathField);
field_spec!(PathField, validate);

/// Path field that must point to a regular file.
#[derive(Debug, Clone)]
pub struct File {
    base: FieldBase,
    missing_ok: bool,
}

impl File {
    pub fn new() -> Self {
        Self {
            base: FieldBase::default(),
            missing_ok: false,
        }
    }

    pub fn missing_ok(mut self) -> Self {
        self.missing_ok = true;
        self
    }

    fn cast_value(&self, raw: &Value) -> Result<Value, String> {
        match raw {
            Value::Str(s) => Ok(Value::Str(s.clone())),
            other => Err(format!("cannot cast {} to path", other.type_name())),
        }
    }

    fn validate_value(&self, value: &Value) -> Result<(), String> {
        let path = Path::new(value.as_str().unwrap_or_default());
        if (path.exists() && path.is_file()) || self.missing_ok {
            return Ok(());
        }
        Err(format!("{} is not a file", path.display()))
    }
}

field_builder!(File);
field_spec!(File, validate);

/// Path field that must point to a directory.
#[derive(Debug, Clone)]
pub struct Folder {
    base: FieldBase,
    missing_ok: bool,
}

impl Folder {
    pub fn new() -> Self {
        Self {
            base: FieldBase::default(),
            missing_ok: false,
        }
    }

    pub fn missing_ok(mut self) -> Self {
        self.missing_ok = true;
        self
    }

    fn cast_value(&self, raw: &Value) -> Result<Value, String> {
        match raw {
            Value::Str(s) => Ok(Value::Str(s.clone())),
            other => Err(format!("cannot cast {} to path", other.type_name())),
        }
    }

    fn validate_value(&self, value: &Value) -> Result<(), String> {
        let path = Path::new(value.as_str().unwrap_or_default());
        if (path.exists() && path.is_dir()) || self.missing_ok {
            return Ok(());
        }
        Err(format!("{} is not a directory", path.display()))
    }
}

field_builder!(Folder);
field_spec!(Folder, validate);

// --- Enum --------------------------------------------------------------------

/// Enumerated field: the raw string must equal one of the declared variant
/// names, case-sensitively.
///
/// Pair with [`Config::get_parsed`](crate::Config::get_parsed) to extract a
/// user enum that implements `FromStr`.
#[derive(Debug, Clone)]
pub struct EnumField {
    base: FieldBase,
    variants: Vec<String>,
}

impl EnumField {
    pub fn of<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base: FieldBase::default(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    fn cast_value(&self, raw: &Value) -> Result<Value, String> {
        let Value::Str(name) = raw else {
            return Err(format!("cannot cast {} to enum", raw.type_name()));
        };
        if self.variants.iter().any(|v| v == name) {
            Ok(Value::Str(name.clone()))
        } else {
            Err(format!(
                "'{name}' is not one of [{}]",
                self.variants.join(", ")
            ))
        }
    }
}

field_builder!(EnumField);
field_spec!(EnumField);

// --- Choice ------------------------------------------------------------------

/// Membership-validated field: the value (after an optional cast function)
/// must be one of the allowed choices.
#[derive(Debug, Clone)]
pub struct Choice {
    base: FieldBase,
    choices: Vec<Value>,
    cast_fn: Option<fn(&Value) -> Result<Value, String>>,
}

impl Choice {
    pub fn of<I, V>(choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            base: FieldBase::default(),
            choices: choices.into_iter().map(Into::into).collect(),
            cast_fn: None,
        }
    }

    /// Apply `cast` to the raw value before the membership check.
    pub fn cast_with(mut self, cast: fn(&Value) -> Result<Value, String>) -> Self {
        self.cast_fn = Some(cast);
        self
    }

    fn cast_value(&self, raw: &Value) -> Result<Value, String> {
        match self.cast_fn {
            Some(cast) => cast(raw),
            None => Ok(raw.clone()),
        }
    }

    fn validate_value(&self, value: &Value) -> Result<(), String> {
        if self.choices.contains(value) {
            Ok(())
        } else {
            let allowed: Vec<String> = self.choices.iter().map(ToString::to_string).collect();
            Err(format!("'{value}' is not in [{}]", allowed.join(", ")))
        }
    }
}

field_builder!(Choice);
field_spec!(Choice, validate);

// --- LogLevel ----------------------------------------------------------------

/// Logging severity field.
///
/// Accepts case-insensitive level names (`trace`, `debug`, `info`, `warn`,
/// `error` plus the `warning`/`critical` aliases) and stores the canonical
/// uppercase name. Extract with `get_as::<tracing::Level>`.
#[derive(Debug, Clone)]
pub struct LogLevel {
    base: FieldBase,
}

impl LogLevel {
    pub fn new() -> Self {
        Self {
            base: FieldBase::default(),
        }
    }

    fn cast_value(&self, raw: &Value) -> Result<Value, String> {
        let Value::Str(name) = raw else {
            return Err(format!("cannot cast {} to log level", raw.type_name()));
        };
        parse_log_level(name)
            .map(|level| Value::Str(level.to_string()))
            .ok_or_else(|| format!("'{name}' is not a log level"))
    }
}

field_builder!(LogLevel);
field_spec!(LogLevel);
