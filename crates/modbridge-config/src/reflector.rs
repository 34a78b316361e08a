//! Configuration reflector
//!
//! The reflector treats a configuration instance as a mapping from property
//! name to [`Value`], using the type's static [`PropertyTable`]. Every write it
//! performs raises a [`ChangeEvent`] to its listeners *before* the new value
//! becomes observable.
//!
//! Accessors are bound to a specific instance, so one reflector can serve
//! any number of configuration instances.

use crate::error::{ReflectError, Result};
use crate::table::{Configurable, Property, PropertyTable};
use crate::value::{ConfigValue, DeclaredType, Value, ValueKind};
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// A configuration instance shared between the host and its bindings
pub type SharedConfig<C> = Arc<RwLock<C>>;

/// A property write performed through the reflector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    /// Property name
    pub property: String,
    /// Value before the write
    pub old_value: Value,
    /// Value being written
    pub new_value: Value,
}

type Listener = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// One entry of [`Reflector::default_metadata`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultEntry<'a> {
    /// Property name
    pub property: &'a str,
    /// Declared default (`Null` when annotated without a value)
    pub value: &'a Value,
    /// Category tag
    pub category: Option<&'a str>,
    /// The property's declared type
    pub declared: &'a DeclaredType,
}

/// Lazy, restartable sequence of annotated properties in declared order
///
/// Clone it (or ask the reflector again) to iterate from the start.
pub struct DefaultEntries<'a, C> {
    inner: std::slice::Iter<'a, Property<C>>,
}

impl<C> Clone for DefaultEntries<'_, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, C> Iterator for DefaultEntries<'a, C> {
    type Item = DefaultEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find_map(|property| {
            let meta = property.default_metadata()?;
            Some(DefaultEntry {
                property: property.name(),
                value: &meta.value,
                category: meta.category.as_deref(),
                declared: property.declared_type(),
            })
        })
    }
}

/// Outcome of [`Reflector::reset_to_defaults`]
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResetReport {
    /// Properties that were written, in order
    pub written: Vec<String>,
    /// Properties whose default could not be written
    pub failures: Vec<ReflectError>,
}

/// Reads, writes and resets properties of [`Configurable`] instances
///
/// Cloning a reflector shares its listeners.
#[derive(Clone, Default)]
pub struct Reflector {
    listeners: Arc<RwLock<Vec<Listener>>>,
}

impl Reflector {
    /// Create a reflector with no listeners
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a change listener; listeners run synchronously, in order
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.listeners.write().push(Arc::new(listener));
    }

    fn emit(&self, event: &ChangeEvent) {
        // Clone out of the lock so a listener may subscribe.
        let listeners = self.listeners.read().clone();
        for listener in &listeners {
            listener(event);
        }
        trace!(category = "reflect", property = %event.property, "change event emitted");
    }

    /// An accessor bound to `name` on this instance
    pub fn accessor<C: Configurable>(
        &self,
        config: &SharedConfig<C>,
        name: &str,
    ) -> Result<Accessor<C>> {
        let property = C::properties().require(name)?;
        Ok(Accessor {
            property,
            config: Arc::clone(config),
            reflector: self.clone(),
        })
    }

    /// The value kind of `name`
    pub fn value_kind<C: Configurable>(&self, _config: &SharedConfig<C>, name: &str) -> Result<ValueKind> {
        C::properties().require(name)?.value_kind()
    }

    /// Every annotated property, in declared order
    pub fn default_metadata<C: Configurable>(&self) -> DefaultEntries<'static, C> {
        DefaultEntries {
            inner: C::properties().as_slice().iter(),
        }
    }

    /// Current value of `name`
    pub fn get_property<C: Configurable>(&self, config: &SharedConfig<C>, name: &str) -> Result<Value> {
        let property = C::properties().require(name)?;
        Ok(property.read(&config.read()))
    }

    /// Coerce `raw` to the declared type of `name`, emit a change event, then
    /// write it
    ///
    /// On failure nothing is emitted and the stored value is unchanged.
    pub fn set_property<C: Configurable>(
        &self,
        config: &SharedConfig<C>,
        name: &str,
        raw: Value,
    ) -> Result<()> {
        let property = C::properties().require(name)?;
        self.assign(config, property, raw)
    }

    fn assign<C>(&self, config: &SharedConfig<C>, property: &Property<C>, raw: Value) -> Result<()> {
        if !property.is_writable() {
            return Err(ReflectError::ReadOnly(property.name().to_string()));
        }
        let new_value = property.coerce(raw)?;
        let old_value = property.read(&config.read());

        self.emit(&ChangeEvent {
            property: property.name().to_string(),
            old_value,
            new_value: new_value.clone(),
        });

        property.write(&mut config.write(), new_value)?;
        debug!(category = "reflect", property = %property.name(), "property written");
        Ok(())
    }

    /// Restore annotated defaults, optionally only those tagged `category`
    ///
    /// A single-button default on a keybind-list property is wrapped into a
    /// one-element list; a collection annotated without a value becomes
    /// empty; any other `Null` default is skipped. `save` runs exactly once,
    /// after every property has been processed.
    pub fn reset_to_defaults<C, F>(
        &self,
        config: &SharedConfig<C>,
        category: Option<&str>,
        save: F,
    ) -> ResetReport
    where
        C: Configurable,
        F: FnOnce(),
    {
        let table: &PropertyTable<C> = C::properties();
        let mut report = ResetReport::default();

        for entry in self.default_metadata::<C>() {
            if category.is_some() && entry.category != category {
                continue;
            }
            let Some(default) = effective_default(&entry) else {
                continue;
            };
            let Some(property) = table.get(entry.property) else {
                continue;
            };

            match self.assign(config, property, default) {
                Ok(()) => report.written.push(entry.property.to_string()),
                Err(err) => {
                    debug!(category = "reflect", error = %err, "default not applied");
                    report.failures.push(err);
                }
            }
        }

        save();
        debug!(
            category = "reflect",
            written = report.written.len(),
            failed = report.failures.len(),
            filter = category.unwrap_or("*"),
            "defaults restored"
        );
        report
    }
}

fn effective_default(entry: &DefaultEntry<'_>) -> Option<Value> {
    match (entry.declared, entry.value) {
        (DeclaredType::KeybindList, Value::Button(button)) => {
            Some(Value::KeybindList(button.clone().into()))
        }
        (declared, Value::Null) => declared.empty_collection(),
        (_, value) => Some(value.clone()),
    }
}

impl fmt::Debug for Reflector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reflector")
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}

/// A read/write pair bound to one property of one instance
pub struct Accessor<C: 'static> {
    property: &'static Property<C>,
    config: SharedConfig<C>,
    reflector: Reflector,
}

impl<C: Configurable> Accessor<C> {
    /// Property name
    pub fn name(&self) -> &str {
        self.property.name()
    }

    pub fn declared_type(&self) -> &DeclaredType {
        self.property.declared_type()
    }

    /// The property's value kind
    pub fn value_kind(&self) -> Result<ValueKind> {
        self.property.value_kind()
    }

    /// Current value
    pub fn read(&self) -> Value {
        self.property.read(&self.config.read())
    }

    /// Current value as `T`
    pub fn read_as<T: ConfigValue>(&self) -> Result<T> {
        T::from_value(self.read()).map_err(|source| ReflectError::ConversionFailure {
            property: self.name().to_string(),
            source,
        })
    }

    /// Write through [`Reflector::set_property`]
    pub fn write(&self, value: impl Into<Value>) -> Result<()> {
        self.reflector
            .assign(&self.config, self.property, value.into())
    }
}

impl<C: 'static> Clone for Accessor<C> {
    fn clone(&self) -> Self {
        Self {
            property: self.property,
            config: Arc::clone(&self.config),
            reflector: self.reflector.clone(),
        }
    }
}

impl<C: 'static> fmt::Debug for Accessor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("property", &self.property.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keybind::{Button, KeybindList};
    use once_cell::sync::Lazy;
    use parking_lot::Mutex;
    use tracing_test::traced_test;

    #[derive(Debug, Default)]
    struct Controls {
        speed: f32,
        open_menu: KeybindList,
        quick_keys: KeybindList,
        label: Option<String>,
        enabled: bool,
    }

    static CONTROLS: Lazy<PropertyTable<Controls>> = Lazy::new(|| {
        PropertyTable::builder()
            .property("Speed", |c: &Controls| &c.speed, |c: &mut Controls| &mut c.speed)
            .default_value(1.5f32)
            .category("Movement")
            .property("OpenMenu", |c: &Controls| &c.open_menu, |c: &mut Controls| &mut c.open_menu)
            .default_value(Button::new("F5").unwrap())
            .category("Input")
            .property("QuickKeys", |c: &Controls| &c.quick_keys, |c: &mut Controls| &mut c.quick_keys)
            .default_null()
            .category("Input")
            .property("Label", |c: &Controls| &c.label, |c: &mut Controls| &mut c.label)
            .default_null()
            .property("Enabled", |c: &Controls| &c.enabled, |c: &mut Controls| &mut c.enabled)
            .build()
    });

    impl Configurable for Controls {
        fn properties() -> &'static PropertyTable<Self> {
            &CONTROLS
        }
    }

    fn shared() -> SharedConfig<Controls> {
        let quick_keys = "A, B".parse().unwrap();
        Arc::new(RwLock::new(Controls {
            quick_keys,
            ..Controls::default()
        }))
    }

    fn recording(reflector: &Reflector) -> Arc<Mutex<Vec<ChangeEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        reflector.subscribe(move |event| sink.lock().push(event.clone()));
        events
    }

    // ========================================================================
    // Defaults
    // ========================================================================

    #[test]
    fn test_default_metadata_is_restartable() {
        let reflector = Reflector::new();
        let entries = reflector.default_metadata::<Controls>();
        let first: Vec<_> = entries.clone().map(|e| e.property).collect();
        let second: Vec<_> = entries.map(|e| e.property).collect();

        assert_eq!(first, ["Speed", "OpenMenu", "QuickKeys", "Label"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset_wraps_button_and_synthesizes_empty_list() {
        let reflector = Reflector::new();
        let events = recording(&reflector);
        let config = shared();
        let mut saves = 0;

        let report = reflector.reset_to_defaults(&config, None, || saves += 1);

        assert_eq!(saves, 1);
        assert_eq!(report.written, ["Speed", "OpenMenu", "QuickKeys"]);
        assert!(report.failures.is_empty());

        let state = config.read();
        assert_eq!(state.speed, 1.5);
        assert_eq!(state.open_menu.to_string(), "F5");
        assert!(state.quick_keys.is_empty());
        assert_eq!(state.label, None);

        let events = events.lock();
        assert_eq!(events.len(), 3);
        assert_eq!(events[2].old_value, Value::KeybindList("A, B".parse().unwrap()));
        assert_eq!(events[2].new_value, Value::KeybindList(KeybindList::default()));
    }

    #[test]
    fn test_reset_filters_by_category() {
        let reflector = Reflector::new();
        let config = shared();
        config.write().speed = 9.0;

        let mut saves = 0;
        let report = reflector.reset_to_defaults(&config, Some("Input"), || saves += 1);

        assert_eq!(saves, 1);
        assert_eq!(report.written, ["OpenMenu", "QuickKeys"]);
        assert_eq!(config.read().speed, 9.0);
    }

    #[test]
    fn test_reset_with_no_matches_still_saves() {
        let reflector = Reflector::new();
        let config = shared();
        let mut saves = 0;
        let report = reflector.reset_to_defaults(&config, Some("Nothing"), || saves += 1);
        assert_eq!(saves, 1);
        assert!(report.written.is_empty());
    }

    // ========================================================================
    // Writes
    // ========================================================================

    #[test]
    fn test_event_precedes_write() {
        let reflector = Reflector::new();
        let config = shared();
        let observed = Arc::new(Mutex::new(None));

        let reader = Arc::clone(&config);
        let slot = Arc::clone(&observed);
        reflector.subscribe(move |_| *slot.lock() = Some(reader.read().enabled));

        reflector.set_property(&config, "Enabled", Value::Bool(true)).unwrap();
        assert_eq!(*observed.lock(), Some(false));
        assert!(config.read().enabled);
    }

    #[test]
    fn test_failed_conversion_emits_nothing() {
        let reflector = Reflector::new();
        let events = recording(&reflector);
        let config = shared();

        let err = reflector
            .set_property(&config, "OpenMenu", Value::Text("F5".into()))
            .unwrap_err();
        assert!(matches!(err, ReflectError::ConversionFailure { .. }));
        assert!(events.lock().is_empty());
        assert!(config.read().open_menu.is_empty());
    }

    #[test]
    fn test_accessor_round_trip() {
        let reflector = Reflector::new();
        let config = shared();
        let speed = reflector.accessor(&config, "Speed").unwrap();

        speed.write(2).unwrap();
        assert_eq!(speed.read(), Value::Float(2.0));
        assert_eq!(speed.read_as::<f32>().unwrap(), 2.0);
        assert_eq!(speed.value_kind().unwrap(), ValueKind::Float);
        assert_eq!(speed.declared_type(), &DeclaredType::Float);

        assert_eq!(
            reflector.accessor(&config, "Nope").unwrap_err(),
            ReflectError::PropertyNotFound("Nope".into())
        );
    }

    #[traced_test]
    #[test]
    fn test_reset_logs_summary() {
        let reflector = Reflector::new();
        let config = shared();
        reflector.reset_to_defaults(&config, Some("Movement"), || {});
        assert!(logs_contain("defaults restored"));
    }
}
