//! Flattening nested data into `(Key, Value)` pairs.
//!
//! Two producers feed the storage sources:
//!
//! - [`from_serialize`] runs a custom serde `Serializer` over any
//!   `Serialize` value, building key paths from struct fields and map keys.
//!   `Option::None` becomes [`Value::Null`] without requiring
//!   `#[serde(skip_serializing_if)]`.
//! - The `flatten_*` walkers recurse into parsed TOML/JSON/YAML documents.
//!
//! Only maps and structs contribute path segments; sequences become
//! [`Value::List`] leaves. A table inside an array is rejected — no field
//! kind consumes one.

use serde::ser::{self, Serialize};

use crate::error::ConfigError;
use crate::key::Key;
use crate::value::Value;

/// Flatten a `Serialize` value into key-value pairs.
///
/// `Outer { database: Inner { url: "pg://" } }` →
/// `[(database.url, Str("pg://"))]`.
pub fn from_serialize<S: Serialize>(source: &S) -> Result<Vec<(Key, Value)>, ConfigError> {
    let mut out = Vec::new();
    let serializer = FlattenSerializer {
        prefix: Key::root(),
        out: &mut out,
    };
    source
        .serialize(serializer)
        .map_err(|e| ConfigError::Flatten { reason: e.0 })?;
    Ok(out)
}

/// Flatten a parsed TOML table. Nested tables extend the key path.
pub(crate) fn flatten_toml(table: toml::Table) -> Result<Vec<(Key, Value)>, String> {
    let mut out = Vec::new();
    flatten_toml_into(table, &Key::root(), &mut out)?;
    Ok(out)
}

fn flatten_toml_into(
    table: toml::Table,
    prefix: &Key,
    out: &mut Vec<(Key, Value)>,
) -> Result<(), String> {
    for (name, value) in table {
        let key = prefix.child(&name);
        match value {
            toml::Value::Table(nested) => flatten_toml_into(nested, &key, out)?,
            other => out.push((key, toml_scalar(other)?)),
        }
    }
    Ok(())
}

fn toml_scalar(value: toml::Value) -> Result<Value, String> {
    match value {
        toml::Value::String(s) => Ok(Value::Str(s)),
        toml::Value::Integer(i) => Ok(Value::Int(i)),
        toml::Value::Float(x) => Ok(Value::Float(x)),
        toml::Value::Boolean(b) => Ok(Value::Bool(b)),
        toml::Value::Datetime(dt) => Ok(Value::Str(dt.to_string())),
        toml::Value::Array(items) => items
            .into_iter()
            .map(toml_scalar)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        toml::Value::Table(_) => Err("tables inside arrays are not supported".into()),
    }
}

/// Flatten a parsed JSON object. Nested objects extend the key path;
/// `null` becomes [`Value::Null`].
pub(crate) fn flatten_json(
    map: serde_json::Map<String, serde_json::Value>,
) -> Result<Vec<(Key, Value)>, String> {
    let mut out = Vec::new();
    flatten_json_into(map, &Key::root(), &mut out)?;
    Ok(out)
}

fn flatten_json_into(
    map: serde_json::Map<String, serde_json::Value>,
    prefix: &Key,
    out: &mut Vec<(Key, Value)>,
) -> Result<(), String> {
    for (name, value) in map {
        let key = prefix.child(&name);
        match value {
            serde_json::Value::Object(nested) => flatten_json_into(nested, &key, out)?,
            other => out.push((key, json_scalar(other)?)),
        }
    }
    Ok(())
}

fn json_scalar(value: serde_json::Value) -> Result<Value, String> {
    match value {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if let Some(x) = n.as_f64() {
                Ok(Value::Float(x))
            } else {
                Err(format!("number {n} does not fit a configuration value"))
            }
        }
        serde_json::Value::String(s) => Ok(Value::Str(s)),
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(json_scalar)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        serde_json::Value::Object(_) => Err("objects inside arrays are not supported".into()),
    }
}

/// Flatten a parsed YAML mapping. Keys must be strings.
#[cfg(feature = "yaml")]
pub(crate) fn flatten_yaml(map: serde_yaml::Mapping) -> Result<Vec<(Key, Value)>, String> {
    let mut out = Vec::new();
    flatten_yaml_into(map, &Key::root(), &mut out)?;
    Ok(out)
}

#[cfg(feature = "yaml")]
fn flatten_yaml_into(
    map: serde_yaml::Mapping,
    prefix: &Key,
    out: &mut Vec<(Key, Value)>,
) -> Result<(), String> {
    for (name, value) in map {
        let serde_yaml::Value::String(name) = name else {
            return Err("mapping keys must be strings".into());
        };
        let key = prefix.child(&name);
        match value {
            serde_yaml::Value::Mapping(nested) => flatten_yaml_into(nested, &key, out)?,
            other => out.push((key, yaml_scalar(other)?)),
        }
    }
    Ok(())
}

#[cfg(feature = "yaml")]
fn yaml_scalar(value: serde_yaml::Value) -> Result<Value, String> {
    match value {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if let Some(x) = n.as_f64() {
                Ok(Value::Float(x))
            } else {
                Err(format!("number {n:?} does not fit a configuration value"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::Str(s)),
        serde_yaml::Value::Sequence(items) => items
            .into_iter()
            .map(yaml_scalar)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        serde_yaml::Value::Tagged(tagged) => yaml_scalar(tagged.value),
        serde_yaml::Value::Mapping(_) => Err("mappings inside sequences are not supported".into()),
    }
}

// --- Serializer-driven flattening -------------------------------------------

#[derive(Debug)]
pub(crate) struct FlattenError(String);

impl std::fmt::Display for FlattenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "flatten error: {}", self.0)
    }
}

impl std::error::Error for FlattenError {}

impl ser::Error for FlattenError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        FlattenError(msg.to_string())
    }
}

struct FlattenSerializer<'a> {
    prefix: Key,
    out: &'a mut Vec<(Key, Value)>,
}

impl<'a> FlattenSerializer<'a> {
    fn emit(&mut self, value: Value) {
        self.out.push((self.prefix.clone(), value));
    }
}

macro_rules! emit_scalar {
    ($($method:ident($ty:ty) => $conv:expr),+ $(,)?) => {$(
        fn $method(mut self, v: $ty) -> Result<(), FlattenError> {
            let convert = $conv;
            self.emit(convert(v));
            Ok(())
        }
    )+};
}

impl<'a> ser::Serializer for FlattenSerializer<'a> {
    type Ok = ();
    type Error = FlattenError;
    type SerializeSeq = FlattenSeqSerializer<'a>;
    type SerializeTuple = FlattenSeqSerializer<'a>;
    type SerializeTupleStruct = FlattenSeqSerializer<'a>;
    type SerializeTupleVariant = FlattenSeqSerializer<'a>;
    type SerializeMap = FlattenMapSerializer<'a>;
    type SerializeStruct = FlattenStructSerializer<'a>;
    type SerializeStructVariant = FlattenStructSerializer<'a>;

    emit_scalar! {
        serialize_bool(bool) => Value::Bool,
        serialize_i8(i8) => |v: i8| Value::Int(v as i64),
        serialize_i16(i16) => |v: i16| Value::Int(v as i64),
        serialize_i32(i32) => |v: i32| Value::Int(v as i64),
        serialize_i64(i64) => Value::Int,
        serialize_u8(u8) => |v: u8| Value::Int(v as i64),
        serialize_u16(u16) => |v: u16| Value::Int(v as i64),
        serialize_u32(u32) => |v: u32| Value::Int(v as i64),
        serialize_f32(f32) => |v: f32| Value::Float(v as f64),
        serialize_f64(f64) => Value::Float,
    }

    fn serialize_u64(mut self, v: u64) -> Result<(), FlattenError> {
        let v = i64::try_from(v).map_err(|_| FlattenError(format!("{v} overflows i64")))?;
        self.emit(Value::Int(v));
        Ok(())
    }

    fn serialize_char(mut self, v: char) -> Result<(), FlattenError> {
        self.emit(Value::Str(v.to_string()));
        Ok(())
    }

    fn serialize_str(mut self, v: &str) -> Result<(), FlattenError> {
        self.emit(Value::Str(v.to_string()));
        Ok(())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), FlattenError> {
        Err(FlattenError("raw bytes are not supported".into()))
    }

    fn serialize_none(mut self) -> Result<(), FlattenError> {
        self.emit(Value::Null);
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), FlattenError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), FlattenError> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), FlattenError> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<(), FlattenError> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), FlattenError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<(), FlattenError> {
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, FlattenError> {
        Ok(FlattenSeqSerializer {
            prefix: self.prefix,
            out: self.out,
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, FlattenError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, FlattenError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, FlattenError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, FlattenError> {
        Ok(FlattenMapSerializer {
            prefix: self.prefix,
            out: self.out,
            current_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, FlattenError> {
        Ok(FlattenStructSerializer {
            prefix: self.prefix,
            out: self.out,
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, FlattenError> {
        Ok(FlattenStructSerializer {
            prefix: self.prefix,
            out: self.out,
        })
    }
}

struct FlattenStructSerializer<'a> {
    prefix: Key,
    out: &'a mut Vec<(Key, Value)>,
}

impl<'a> ser::SerializeStruct for FlattenStructSerializer<'a> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), FlattenError> {
        value.serialize(FlattenSerializer {
            prefix: self.prefix.child(key),
            out: self.out,
        })
    }

    fn end(self) -> Result<(), FlattenError> {
        Ok(())
    }
}

impl<'a> ser::SerializeStructVariant for FlattenStructSerializer<'a> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), FlattenError> {
        ser::SerializeStruct::serialize_field(self, key, value)
    }

    fn end(self) -> Result<(), FlattenError> {
        Ok(())
    }
}

struct FlattenMapSerializer<'a> {
    prefix: Key,
    out: &'a mut Vec<(Key, Value)>,
    current_key: Option<String>,
}

impl<'a> ser::SerializeMap for FlattenMapSerializer<'a> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), FlattenError> {
        self.current_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FlattenError> {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| FlattenError("serialize_value called without serialize_key".into()))?;
        value.serialize(FlattenSerializer {
            prefix: self.prefix.child(&key),
            out: self.out,
        })
    }

    fn end(self) -> Result<(), FlattenError> {
        Ok(())
    }
}

struct FlattenSeqSerializer<'a> {
    prefix: Key,
    out: &'a mut Vec<(Key, Value)>,
    items: Vec<Value>,
}

impl<'a> ser::SerializeSeq for FlattenSeqSerializer<'a> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FlattenError> {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<(), FlattenError> {
        self.out.push((self.prefix, Value::List(self.items)));
        Ok(())
    }
}

impl<'a> ser::SerializeTuple for FlattenSeqSerializer<'a> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FlattenError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<(), FlattenError> {
        ser::SerializeSeq::end(self)
    }
}

impl<'a> ser::SerializeTupleStruct for FlattenSeqSerializer<'a> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FlattenError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<(), FlattenError> {
        ser::SerializeSeq::end(self)
    }
}

impl<'a> ser::SerializeTupleVariant for FlattenSeqSerializer<'a> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FlattenError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<(), FlattenError> {
        ser::SerializeSeq::end(self)
    }
}

// --- Leaf value serializer (for sequence elements) --------------------------

struct ValueSerializer;

macro_rules! value_scalar {
    ($($method:ident($ty:ty) => $conv:expr),+ $(,)?) => {$(
        fn $method(self, v: $ty) -> Result<Value, FlattenError> {
            let convert = $conv;
            Ok(convert(v))
        }
    )+};
}

macro_rules! value_unsupported {
    ($($method:ident($($arg:ty),*) -> $ret:ty),+ $(,)?) => {$(
        fn $method(self, $(_: $arg),*) -> Result<$ret, FlattenError> {
            Err(FlattenError("only scalars are supported inside sequences".into()))
        }
    )+};
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = FlattenError;
    type SerializeSeq = ValueSeqSerializer;
    type SerializeTuple = ValueSeqSerializer;
    type SerializeTupleStruct = ValueSeqSerializer;
    type SerializeTupleVariant = ValueSeqSerializer;
    type SerializeMap = ser::Impossible<Value, FlattenError>;
    type SerializeStruct = ser::Impossible<Value, FlattenError>;
    type SerializeStructVariant = ser::Impossible<Value, FlattenError>;

    value_scalar! {
        serialize_bool(bool) => Value::Bool,
        serialize_i8(i8) => |v: i8| Value::Int(v as i64),
        serialize_i16(i16) => |v: i16| Value::Int(v as i64),
        serialize_i32(i32) => |v: i32| Value::Int(v as i64),
        serialize_i64(i64) => Value::Int,
        serialize_u8(u8) => |v: u8| Value::Int(v as i64),
        serialize_u16(u16) => |v: u16| Value::Int(v as i64),
        serialize_u32(u32) => |v: u32| Value::Int(v as i64),
        serialize_f32(f32) => |v: f32| Value::Float(v as f64),
        serialize_f64(f64) => Value::Float,
    }

    fn serialize_u64(self, v: u64) -> Result<Value, FlattenError> {
        i64::try_from(v)
            .map(Value::Int)
            .map_err(|_| FlattenError(format!("{v} overflows i64")))
    }

    fn serialize_char(self, v: char) -> Result<Value, FlattenError> {
        Ok(Value::Str(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, FlattenError> {
        Ok(Value::Str(v.to_string()))
    }

    fn serialize_none(self) -> Result<Value, FlattenError> {
        Ok(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, FlattenError> {
        value.serialize(self)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, FlattenError> {
        Ok(Value::Str(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, FlattenError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<Value, FlattenError> {
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<ValueSeqSerializer, FlattenError> {
        Ok(ValueSeqSerializer {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<ValueSeqSerializer, FlattenError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<ValueSeqSerializer, FlattenError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        len: usize,
    ) -> Result<ValueSeqSerializer, FlattenError> {
        self.serialize_seq(Some(len))
    }

    value_unsupported! {
        serialize_bytes(&[u8]) -> Value,
        serialize_unit() -> Value,
        serialize_unit_struct(&'static str) -> Value,
        serialize_map(Option<usize>) -> ser::Impossible<Value, FlattenError>,
        serialize_struct(&'static str, usize) -> ser::Impossible<Value, FlattenError>,
        serialize_struct_variant(&'static str, u32, &'static str, usize) -> ser::Impossible<Value, FlattenError>,
    }
}

struct ValueSeqSerializer {
    items: Vec<Value>,
}

impl ser::SerializeSeq for ValueSeqSerializer {
    type Ok = Value;
    type Error = FlattenError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FlattenError> {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, FlattenError> {
        Ok(Value::List(self.items))
    }
}

impl ser::SerializeTuple for ValueSeqSerializer {
    type Ok = Value;
    type Error = FlattenError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FlattenError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, FlattenError> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for ValueSeqSerializer {
    type Ok = Value;
    type Error = FlattenError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FlattenError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, FlattenError> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleVariant for ValueSeqSerializer {
    type Ok = Value;
    type Error = FlattenError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FlattenError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, FlattenError> {
        ser::SerializeSeq::end(self)
    }
}

// --- Map key serializer ------------------------------------------------------

struct KeySerializer;

macro_rules! key_unsupported {
    ($($method:ident($($arg:ty),*) -> $ret:ty),+ $(,)?) => {$(
        fn $method(self, $(_: $arg),*) -> Result<$ret, FlattenError> {
            Err(FlattenError("map keys must be strings".into()))
        }
    )+};
}

impl ser::Serializer for KeySerializer {
    type Ok = String;
    type Error = FlattenError;
    type SerializeSeq = ser::Impossible<String, FlattenError>;
    type SerializeTuple = ser::Impossible<String, FlattenError>;
    type SerializeTupleStruct = ser::Impossible<String, FlattenError>;
    type SerializeTupleVariant = ser::Impossible<String, FlattenError>;
    type SerializeMap = ser::Impossible<String, FlattenError>;
    type SerializeStruct = ser::Impossible<String, FlattenError>;
    type SerializeStructVariant = ser::Impossible<String, FlattenError>;

    fn serialize_str(self, v: &str) -> Result<String, FlattenError> {
        Ok(v.to_string())
    }

    fn serialize_char(self, v: char) -> Result<String, FlattenError> {
        Ok(v.to_string())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String, FlattenError> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String, FlattenError> {
        value.serialize(self)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _value: &T) -> Result<String, FlattenError> {
        Err(FlattenError("map keys must be strings".into()))
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String, FlattenError> {
        Err(FlattenError("map keys must be strings".into()))
    }

    key_unsupported! {
        serialize_bool(bool) -> String,
        serialize_i8(i8) -> String,
        serialize_i16(i16) -> String,
        serialize_i32(i32) -> String,
        serialize_i64(i64) -> String,
        serialize_u8(u8) -> String,
        serialize_u16(u16) -> String,
        serialize_u32(u32) -> String,
        serialize_u64(u64) -> String,
        serialize_f32(f32) -> String,
        serialize_f64(f64) -> String,
        serialize_bytes(&[u8]) -> String,
        serialize_none() -> String,
        serialize_unit() -> String,
        serialize_unit_struct(&'static str) -> String,
        serialize_seq(Option<usize>) -> ser::Impossible<String, FlattenError>,
        serialize_tuple(usize) -> ser::Impossible<String, FlattenError>,
        serialize_tuple_struct(&'static str, usize) -> ser::Impossible<String, FlattenError>,
        serialize_tuple_variant(&'static str, u32, &'static str, usize) -> ser::Impossible<String, FlattenError>,
        serialize_map(Option<usize>) -> ser::Impossible<String, FlattenError>,
        serialize_struct(&'static str, usize) -> ser::Impossible<String, FlattenError>,
        serialize_struct_variant(&'static str, u32, &'static str, usize) -> ser::Impossible<String, FlattenError>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[test]
    fn flat_struct() {
        #[derive(Serialize)]
        struct Args {
            host: String,
            port: u16,
        }
        let args = Args {
            host: "0.0.0.0".into(),
            port: 3000,
        };
        let pairs = from_serialize(&args).unwrap();
        assert_eq!(pairs.len(), 2);
        assert!(pairs.contains(&(Key::from("host"), Value::Str("0.0.0.0".into()))));
        assert!(pairs.contains(&(Key::from("port"), Value::Int(3000))));
    }

    #[test]
    fn option_none_becomes_null() {
        #[derive(Serialize)]
        struct Args {
            host: Option<String>,
        }
        let pairs = from_serialize(&Args { host: None }).unwrap();
        assert_eq!(pairs, vec![(Key::from("host"), Value::Null)]);
    }

    #[test]
    fn nested_struct_extends_path() {
        #[derive(Serialize)]
        struct Inner {
            url: String,
        }
        #[derive(Serialize)]
        struct Outer {
            database: Inner,
        }
        let outer = Outer {
            database: Inner {
                url: "pg://".into(),
            },
        };
        let pairs = from_serialize(&outer).unwrap();
        assert_eq!(
            pairs,
            vec![(Key::from("database.url"), Value::Str("pg://".into()))]
        );
    }

    #[test]
    fn map_input() {
        let mut map = BTreeMap::new();
        map.insert("host".to_string(), "0.0.0.0".to_string());
        let pairs = from_serialize(&map).unwrap();
        assert_eq!(
            pairs,
            vec![(Key::from("host"), Value::Str("0.0.0.0".into()))]
        );
    }

    #[test]
    fn vec_field_becomes_list() {
        #[derive(Serialize)]
        struct Args {
            tags: Vec<String>,
        }
        let args = Args {
            tags: vec!["a".into(), "b".into()],
        };
        let pairs = from_serialize(&args).unwrap();
        assert_eq!(
            pairs,
            vec![(
                Key::from("tags"),
                Value::List(vec![Value::Str("a".into()), Value::Str("b".into())])
            )]
        );
    }

    #[test]
    fn unit_variant_serializes_as_string() {
        #[derive(Serialize)]
        enum Mode {
            Fast,
        }
        #[derive(Serialize)]
        struct Args {
            mode: Mode,
        }
        let pairs = from_serialize(&Args { mode: Mode::Fast }).unwrap();
        assert_eq!(pairs, vec![(Key::from("mode"), Value::Str("Fast".into()))]);
    }

    #[test]
    fn deeply_nested() {
        #[derive(Serialize)]
        struct C {
            val: i32,
        }
        #[derive(Serialize)]
        struct B {
            c: C,
        }
        #[derive(Serialize)]
        struct A {
            b: B,
        }
        let a = A {
            b: B { c: C { val: 42 } },
        };
        let pairs = from_serialize(&a).unwrap();
        assert_eq!(pairs, vec![(Key::from("b.c.val"), Value::Int(42))]);
    }

    #[test]
    fn toml_nested_tables() {
        let table: toml::Table = r#"
            host = "localhost"
            [database]
            pool_size = 5
        "#
        .parse()
        .unwrap();
        let pairs = flatten_toml(table).unwrap();
        assert!(pairs.contains(&(Key::from("host"), Value::Str("localhost".into()))));
        assert!(pairs.contains(&(Key::from("database.pool_size"), Value::Int(5))));
    }

    #[test]
    fn toml_array_of_scalars() {
        let table: toml::Table = "ports = [1, 2]".parse().unwrap();
        let pairs = flatten_toml(table).unwrap();
        assert_eq!(
            pairs,
            vec![(
                Key::from("ports"),
                Value::List(vec![Value::Int(1), Value::Int(2)])
            )]
        );
    }

    #[test]
    fn toml_table_in_array_rejected() {
        let table: toml::Table = "[[entry]]\nx = 1\n".parse().unwrap();
        assert!(flatten_toml(table).is_err());
    }

    #[test]
    fn json_null_and_nesting() {
        let doc: serde_json::Value =
            serde_json::from_str(r#"{"db": {"url": null, "port": 5432}}"#).unwrap();
        let serde_json::Value::Object(map) = doc else {
            panic!("expected object");
        };
        let pairs = flatten_json(map).unwrap();
        assert!(pairs.contains(&(Key::from("db.url"), Value::Null)));
        assert!(pairs.contains(&(Key::from("db.port"), Value::Int(5432))));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn yaml_nesting_and_null() {
        let doc: serde_yaml::Value =
            serde_yaml::from_str("db:\n  url: null\n  host: h\n").unwrap();
        let serde_yaml::Value::Mapping(map) = doc else {
            panic!("expected mapping");
        };
        let pairs = flatten_yaml(map).unwrap();
        assert!(pairs.contains(&(Key::from("db.url"), Value::Null)));
        assert!(pairs.contains(&(Key::from("db.host"), Value::Str("h".into()))));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn yaml_non_string_key_rejected() {
        let doc: serde_yaml::Value = serde_yaml::from_str("1: x\n").unwrap();
        let serde_yaml::Value::Mapping(map) = doc else {
            panic!("expected mapping");
        };
        assert!(flatten_yaml(map).is_err());
    }
}
