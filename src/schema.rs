//! Static schema construction.
//!
//! A [`Schema`] is the fixed table of declared attributes — explicit fields,
//! bare-typed attributes materialized through the
//! [`TypeMapper`](crate::TypeMapper), and nested sub-schemas. It is built
//! once by [`SchemaBuilder::build`], which binds every field's alias and
//! surfaces definition errors (unmapped types, duplicate names) before any
//! [`Config`](crate::Config) instance exists. Built schemas are immutable
//! and shared between config instances via `Arc`.

use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::field::FieldSpec;
use crate::mapper::TypeMapper;

/// One declared attribute: a leaf field or a nested schema.
#[derive(Debug)]
pub(crate) enum SchemaNode {
    Field(Box<dyn FieldSpec>),
    Nested { alias: String, schema: Arc<Schema> },
}

#[derive(Debug)]
pub(crate) struct SchemaEntry {
    pub(crate) name: String,
    pub(crate) node: SchemaNode,
}

/// An immutable table of declared attributes, in declaration order.
#[derive(Debug)]
pub struct Schema {
    pub(crate) entries: Vec<SchemaEntry>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    pub(crate) fn entry(&self, name: &str) -> Option<&SchemaEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Declared attribute names, in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

enum Pending {
    Explicit(Box<dyn FieldSpec>),
    Typed {
        type_id: TypeId,
        type_name: &'static str,
    },
    Nested {
        alias: Option<String>,
        schema: Arc<Schema>,
    },
}

/// Declares attributes and produces a [`Schema`].
///
/// Declaration order is preserved — it is the order `check` walks the
/// attributes in. The builder owns the [`TypeMapper`] consulted for bare
/// type declarations; inject a custom one with
/// [`with_mapper`](Self::with_mapper) to override mappings for this schema
/// root only.
pub struct SchemaBuilder {
    mapper: TypeMapper,
    entries: Vec<(String, Pending)>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::with_mapper(TypeMapper::standard())
    }

    pub fn with_mapper(mapper: TypeMapper) -> Self {
        Self {
            mapper,
            entries: Vec::new(),
        }
    }

    /// Declare an attribute with an explicit field.
    pub fn field(mut self, name: &str, field: impl FieldSpec + 'static) -> Self {
        self.entries
            .push((name.to_string(), Pending::Explicit(Box::new(field))));
        self
    }

    /// Declare an attribute by bare Rust type. The type mapper picks the
    /// field kind at [`build`](Self::build) time; an unmapped type is a
    /// schema definition error, not a runtime one.
    pub fn typed<T: 'static>(mut self, name: &str) -> Self {
        self.entries.push((
            name.to_string(),
            Pending::Typed {
                type_id: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
            },
        ));
        self
    }

    /// Declare a nested configuration under `name`. The nested config's
    /// storage alias is the attribute name.
    pub fn nested(self, name: &str, schema: impl Into<Arc<Schema>>) -> Self {
        self.nested_entry(name, None, schema.into())
    }

    /// Declare a nested configuration whose storage alias differs from the
    /// attribute name.
    pub fn nested_as(self, name: &str, alias: &str, schema: impl Into<Arc<Schema>>) -> Self {
        self.nested_entry(name, Some(alias.to_string()), schema.into())
    }

    fn nested_entry(mut self, name: &str, alias: Option<String>, schema: Arc<Schema>) -> Self {
        self.entries
            .push((name.to_string(), Pending::Nested { alias, schema }));
        self
    }

    /// Process the declarations: consult the mapper for bare types, bind
    /// every field's alias, and reject duplicate attribute names.
    pub fn build(self) -> Result<Schema, ConfigError> {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(self.entries.len());

        for (name, pending) in self.entries {
            if !seen.insert(name.clone()) {
                return Err(ConfigError::SchemaError {
                    attribute: name,
                    reason: "duplicate attribute name".into(),
                });
            }
            let node = match pending {
                Pending::Explicit(mut field) => {
                    field.bind(&name);
                    SchemaNode::Field(field)
                }
                Pending::Typed { type_id, type_name } => {
                    let factory = self.mapper.descriptor_for(type_id).ok_or_else(|| {
                        ConfigError::SchemaError {
                            attribute: name.clone(),
                            reason: format!(
                                "no field mapping registered for type {type_name}"
                            ),
                        }
                    })?;
                    let mut field = factory();
                    field.bind(&name);
                    SchemaNode::Field(field)
                }
                Pending::Nested { alias, schema } => SchemaNode::Nested {
                    alias: alias.unwrap_or_else(|| name.clone()),
                    schema,
                },
            };
            entries.push(SchemaEntry { name, node });
        }

        Ok(Schema { entries })
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
