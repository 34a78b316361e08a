//! Per-type property tables
//!
//! A [`PropertyTable`] is built once per configuration type and is read-only
//! afterwards. Each [`Property`] carries a typed read/coerce/write triple
//! erased behind [`Value`], the declared type, and optional
//! [`DefaultMetadata`].
//!
//! ## Example
//!
//! ```rust,ignore
//! static TABLE: Lazy<PropertyTable<AudioConfig>> = Lazy::new(|| {
//!     PropertyTable::builder()
//!         .property("Volume", |c| &c.volume, |c| &mut c.volume)
//!         .default_value(50)
//!         .category("Audio")
//!         .property("Muted", |c| &c.muted, |c| &mut c.muted)
//!         .build()
//! });
//!
//! impl Configurable for AudioConfig {
//!     fn properties() -> &'static PropertyTable<Self> {
//!         &TABLE
//!     }
//! }
//! ```

use crate::error::{ConversionError, ReflectError, Result};
use crate::value::{ConfigValue, DeclaredType, Value, ValueKind};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// A configuration type with a static property table
pub trait Configurable: Send + Sync + Sized + 'static {
    /// The table describing this type's properties
    fn properties() -> &'static PropertyTable<Self>;
}

/// Declared default for one property
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultMetadata {
    /// Default value; `Null` means "declared without a value"
    pub value: Value,
    /// Category tag used by filtered resets
    pub category: Option<String>,
}

type Reader<C> = Arc<dyn Fn(&C) -> Value + Send + Sync>;
type Coercer = Arc<dyn Fn(Value) -> std::result::Result<Value, ConversionError> + Send + Sync>;
type Writer<C> = Arc<dyn Fn(&mut C, Value) -> std::result::Result<(), ConversionError> + Send + Sync>;

/// One named property of a configuration type
pub struct Property<C> {
    name: String,
    declared: DeclaredType,
    read: Reader<C>,
    coerce: Coercer,
    write: Option<Writer<C>>,
    default: Option<DefaultMetadata>,
}

impl<C> Property<C> {
    /// Property name, unique within its table
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type
    pub fn declared_type(&self) -> &DeclaredType {
        &self.declared
    }

    /// Default metadata, if the property is annotated
    pub fn default_metadata(&self) -> Option<&DefaultMetadata> {
        self.default.as_ref()
    }

    /// Whether the property can be written
    pub fn is_writable(&self) -> bool {
        self.write.is_some()
    }

    /// The value kind, or `UnsupportedKind`
    pub fn value_kind(&self) -> Result<ValueKind> {
        self.declared
            .value_kind()
            .ok_or_else(|| ReflectError::UnsupportedKind {
                property: self.name.clone(),
                declared: self.declared.to_string(),
            })
    }

    /// Read the current value from `config`
    pub fn read(&self, config: &C) -> Value {
        (self.read)(config)
    }

    /// Coerce `raw` to the declared type without writing it
    pub fn coerce(&self, raw: Value) -> Result<Value> {
        (self.coerce)(raw).map_err(|source| ReflectError::ConversionFailure {
            property: self.name.clone(),
            source,
        })
    }

    /// Coerce and write `value` into `config`
    pub fn write(&self, config: &mut C, value: Value) -> Result<()> {
        let write = self
            .write
            .as_ref()
            .ok_or_else(|| ReflectError::ReadOnly(self.name.clone()))?;
        write(config, value).map_err(|source| ReflectError::ConversionFailure {
            property: self.name.clone(),
            source,
        })
    }
}

impl<C> fmt::Debug for Property<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("declared", &self.declared)
            .field("writable", &self.write.is_some())
            .field("default", &self.default)
            .finish()
    }
}

/// Properties of one configuration type, in declared order
pub struct PropertyTable<C> {
    properties: Vec<Property<C>>,
    index: HashMap<String, usize>,
}

impl<C: 'static> PropertyTable<C> {
    /// Start building a table
    pub fn builder() -> PropertyTableBuilder<C> {
        PropertyTableBuilder {
            properties: Vec::new(),
        }
    }

    /// Look up a property by name
    pub fn get(&self, name: &str) -> Option<&Property<C>> {
        self.index.get(name).map(|&i| &self.properties[i])
    }

    /// Look up a property by name, or `PropertyNotFound`
    pub fn require(&self, name: &str) -> Result<&Property<C>> {
        self.get(name)
            .ok_or_else(|| ReflectError::PropertyNotFound(name.to_string()))
    }

    /// Properties in declared order
    pub fn iter(&self) -> impl Iterator<Item = &Property<C>> {
        self.properties.iter()
    }

    /// Property names in declared order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.name.as_str())
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the table has no properties
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub(crate) fn as_slice(&self) -> &[Property<C>] {
        &self.properties
    }
}

impl<C> fmt::Debug for PropertyTable<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.properties.iter()).finish()
    }
}

/// Builder for a [`PropertyTable`]
///
/// `default_value`, `default_null` and `category` annotate the property added
/// last.
pub struct PropertyTableBuilder<C> {
    properties: Vec<Property<C>>,
}

impl<C: 'static> PropertyTableBuilder<C> {
    /// Add a read/write property backed by a field of type `T`
    pub fn property<T: ConfigValue>(
        self,
        name: impl Into<String>,
        get: fn(&C) -> &T,
        get_mut: fn(&mut C) -> &mut T,
    ) -> Self {
        let write: Writer<C> = Arc::new(move |config: &mut C, value: Value| {
            *get_mut(config) = T::from_value(value)?;
            Ok(())
        });
        self.push::<T>(name.into(), get, Some(write))
    }

    /// Add a property that can be read and reset-listed but never written
    pub fn read_only<T: ConfigValue>(self, name: impl Into<String>, get: fn(&C) -> &T) -> Self {
        self.push::<T>(name.into(), get, None)
    }

    fn push<T: ConfigValue>(
        mut self,
        name: String,
        get: fn(&C) -> &T,
        write: Option<Writer<C>>,
    ) -> Self {
        let property = Property {
            name,
            declared: T::declared_type(),
            read: Arc::new(move |config: &C| get(config).to_value()),
            coerce: Arc::new(|value: Value| T::from_value(value).map(|v| v.to_value())),
            write,
            default: None,
        };

        match self.properties.iter().position(|p| p.name == property.name) {
            Some(existing) => {
                warn!(category = "reflect", property = %property.name, "duplicate property replaces earlier declaration");
                self.properties[existing] = property;
            }
            None => self.properties.push(property),
        }
        self
    }

    fn annotate(&mut self) -> Option<&mut DefaultMetadata> {
        let last = self.properties.last_mut()?;
        Some(last.default.get_or_insert_with(|| DefaultMetadata {
            value: Value::Null,
            category: None,
        }))
    }

    /// Declare a default value for the last property
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        if let Some(meta) = self.annotate() {
            meta.value = value.into();
        }
        self
    }

    /// Annotate the last property with a default but no value
    pub fn default_null(mut self) -> Self {
        if let Some(meta) = self.annotate() {
            meta.value = Value::Null;
        }
        self
    }

    /// Tag the last property's default with a category
    pub fn category(mut self, category: impl Into<String>) -> Self {
        if let Some(meta) = self.annotate() {
            meta.category = Some(category.into());
        }
        self
    }

    /// Freeze the table
    pub fn build(self) -> PropertyTable<C> {
        let index = self
            .properties
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();
        PropertyTable {
            properties: self.properties,
            index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keybind::KeybindList;

    #[derive(Default)]
    struct Sample {
        volume: i32,
        name: String,
        keys: KeybindList,
        tags: Vec<String>,
    }

    fn table() -> PropertyTable<Sample> {
        PropertyTable::builder()
            .property("Volume", |c: &Sample| &c.volume, |c: &mut Sample| &mut c.volume)
            .default_value(50)
            .category("Audio")
            .property("Name", |c: &Sample| &c.name, |c: &mut Sample| &mut c.name)
            .property("Keys", |c: &Sample| &c.keys, |c: &mut Sample| &mut c.keys)
            .default_null()
            .read_only("Tags", |c: &Sample| &c.tags)
            .build()
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    #[test]
    fn test_lookup_by_name_and_order() {
        let table = table();
        assert_eq!(table.len(), 4);
        assert_eq!(table.names().collect::<Vec<_>>(), ["Volume", "Name", "Keys", "Tags"]);
        assert!(table.get("Volume").is_some());
        assert_eq!(
            table.require("Missing").unwrap_err(),
            ReflectError::PropertyNotFound("Missing".into())
        );
    }

    #[test]
    fn test_annotations_attach_to_last_property() {
        let table = table();
        let volume = table.get("Volume").unwrap().default_metadata().unwrap();
        assert_eq!(volume.value, Value::Int(50));
        assert_eq!(volume.category.as_deref(), Some("Audio"));

        assert!(table.get("Name").unwrap().default_metadata().is_none());
        assert_eq!(
            table.get("Keys").unwrap().default_metadata().unwrap().value,
            Value::Null
        );
    }

    // ========================================================================
    // Access
    // ========================================================================

    #[test]
    fn test_read_write_through_property() {
        let table = table();
        let mut sample = Sample::default();
        let volume = table.get("Volume").unwrap();

        volume.write(&mut sample, Value::Float(7.6)).unwrap();
        assert_eq!(sample.volume, 8);
        assert_eq!(volume.read(&sample), Value::Int(8));

        let err = volume.write(&mut sample, Value::Text("loud".into())).unwrap_err();
        assert!(matches!(err, ReflectError::ConversionFailure { .. }));
        assert_eq!(sample.volume, 8);
    }

    #[test]
    fn test_read_only_and_unsupported() {
        let table = table();
        let mut sample = Sample::default();
        let tags = table.get("Tags").unwrap();

        assert!(!tags.is_writable());
        assert_eq!(
            tags.write(&mut sample, Value::List(vec![])).unwrap_err(),
            ReflectError::ReadOnly("Tags".into())
        );
        assert!(matches!(
            tags.value_kind(),
            Err(ReflectError::UnsupportedKind { .. })
        ));
    }

    #[test]
    fn test_duplicate_name_replaces() {
        let table = PropertyTable::builder()
            .property("Volume", |c: &Sample| &c.volume, |c: &mut Sample| &mut c.volume)
            .property("Volume", |c: &Sample| &c.name, |c: &mut Sample| &mut c.name)
            .build();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get("Volume").unwrap().declared_type(),
            &DeclaredType::Text
        );
    }
}
