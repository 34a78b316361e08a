//! Reflection over configuration objects
//!
//! A configuration type describes its properties once, in a static
//! [`PropertyTable`], and the [`Reflector`] uses that table to:
//!
//! - hand out [`Accessor`]s bound to a property of a specific instance
//! - report each property's [`ValueKind`]
//! - coerce and write values, raising a [`ChangeEvent`] before every write
//! - restore declared defaults, optionally by category
//!
//! ## Usage
//!
//! ```rust,ignore
//! use modbridge_config::*;
//!
//! let config: SharedConfig<AudioConfig> = Arc::new(RwLock::new(AudioConfig::default()));
//! let reflector = Reflector::new();
//! reflector.subscribe(|event| println!("{} -> {}", event.property, event.new_value));
//!
//! reflector.set_property(&config, "Volume", Value::Float(49.6))?;
//! assert_eq!(reflector.get_property(&config, "Volume")?, Value::Int(50));
//!
//! reflector.reset_to_defaults(&config, Some("Audio"), || store.save());
//! ```

mod error;
mod keybind;
mod reflector;
mod table;
mod value;

pub use error::{ConversionError, ReflectError, Result};
pub use keybind::{Button, Keybind, KeybindList, KeybindParseError};
pub use reflector::{
    Accessor, ChangeEvent, DefaultEntries, DefaultEntry, Reflector, ResetReport, SharedConfig,
};
pub use table::{Configurable, DefaultMetadata, Property, PropertyTable, PropertyTableBuilder};
pub use value::{ConfigValue, DeclaredType, Value, ValueKind};
