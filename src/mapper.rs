//! Automatic field materialization from declared Rust types.
//!
//! When a schema attribute is declared by bare type
//! ([`SchemaBuilder::typed`](crate::SchemaBuilder::typed)) instead of an
//! explicit field, the builder consults a [`TypeMapper`] for the field kind
//! to materialize. The mapper is injected per schema root — overriding a
//! mapping in one subtree never affects siblings built with their own
//! mapper.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::field::{
    Bool, Bytes, DecimalField, FieldSpec, Float, Int, PathField, Str,
};

/// Produces a fresh field for one declared type.
pub type FieldFactory = Arc<dyn Fn() -> Box<dyn FieldSpec>>;

/// Registry associating a declared Rust type with the field kind used to
/// materialize it.
#[derive(Clone, Default)]
pub struct TypeMapper {
    entries: HashMap<TypeId, FieldFactory>,
}

impl fmt::Debug for TypeMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMapper")
            .field("mappings", &self.entries.len())
            .finish()
    }
}

impl TypeMapper {
    /// A mapper with no registrations.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard registry: `bool`, the primitive integer types, `f32`/
    /// `f64`, `String`, `Vec<u8>`, [`Decimal`], and [`PathBuf`].
    pub fn standard() -> Self {
        let mut mapper = Self::empty();
        mapper.register::<bool>(|| Box::new(Bool::new()));
        mapper.register::<i8>(|| Box::new(Int::new()));
        mapper.register::<i16>(|| Box::new(Int::new()));
        mapper.register::<i32>(|| Box::new(Int::new()));
        mapper.register::<i64>(|| Box::new(Int::new()));
        mapper.register::<isize>(|| Box::new(Int::new()));
        mapper.register::<u8>(|| Box::new(Int::new()));
        mapper.register::<u16>(|| Box::new(Int::new()));
        mapper.register::<u32>(|| Box::new(Int::new()));
        mapper.register::<u64>(|| Box::new(Int::new()));
        mapper.register::<usize>(|| Box::new(Int::new()));
        mapper.register::<f32>(|| Box::new(Float::new()));
        mapper.register::<f64>(|| Box::new(Float::new()));
        mapper.register::<String>(|| Box::new(Str::new()));
        mapper.register::<Vec<u8>>(|| Box::new(Bytes::new()));
        mapper.register::<Decimal>(|| Box::new(DecimalField::new()));
        mapper.register::<PathBuf>(|| Box::new(PathField::new()));
        mapper
    }

    /// Register (or override) the factory for `T`.
    pub fn register<T: 'static>(&mut self, factory: impl Fn() -> Box<dyn FieldSpec> + 'static) {
        self.entries.insert(TypeId::of::<T>(), Arc::new(factory));
    }

    /// Chainable [`register`](Self::register).
    pub fn with<T: 'static>(
        mut self,
        factory: impl Fn() -> Box<dyn FieldSpec> + 'static,
    ) -> Self {
        self.register::<T>(factory);
        self
    }

    /// Look up the factory for a declared type, if one is registered.
    pub fn descriptor_for(&self, type_id: TypeId) -> Option<FieldFactory> {
        self.entries.get(&type_id).cloned()
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn standard_covers_builtin_types() {
        let mapper = TypeMapper::standard();
        assert!(mapper.contains::<bool>());
        assert!(mapper.contains::<u16>());
        assert!(mapper.contains::<f64>());
        assert!(mapper.contains::<String>());
        assert!(mapper.contains::<Vec<u8>>());
        assert!(mapper.contains::<Decimal>());
        assert!(mapper.contains::<PathBuf>());
    }

    #[test]
    fn unregistered_type_is_absent() {
        let mapper = TypeMapper::standard();
        assert!(mapper.descriptor_for(TypeId::of::<std::time::Duration>()).is_none());
    }

    #[test]
    fn factory_produces_working_field() {
        let mapper = TypeMapper::standard();
        let factory = mapper.descriptor_for(TypeId::of::<u16>()).unwrap();
        let field = factory();
        assert_eq!(
            field.cast(&Value::Str("8080".into())).unwrap(),
            Value::Int(8080)
        );
    }

    #[test]
    fn override_replaces_mapping() {
        // Map floats to the exact-decimal kind instead.
        let mapper = TypeMapper::standard().with::<f64>(|| Box::new(DecimalField::new()));
        let factory = mapper.descriptor_for(TypeId::of::<f64>()).unwrap();
        let field = factory();
        assert_eq!(
            field.cast(&Value::Str("0.1".into())).unwrap(),
            Value::Str("0.1".into())
        );
    }

    #[test]
    fn override_is_scoped_to_the_instance() {
        let custom = TypeMapper::standard().with::<f64>(|| Box::new(DecimalField::new()));
        let standard = TypeMapper::standard();

        let custom_field = custom.descriptor_for(TypeId::of::<f64>()).unwrap()();
        let standard_field = standard.descriptor_for(TypeId::of::<f64>()).unwrap()();

        assert_eq!(
            custom_field.cast(&Value::Str("0.5".into())).unwrap(),
            Value::Str("0.5".into())
        );
        assert_eq!(
            standard_field.cast(&Value::Str("0.5".into())).unwrap(),
            Value::Float(0.5)
        );
    }
}
