//! Settings menu surface and mod manifest

use crate::presentation::Point;
use modbridge_config::{Button, KeybindList, Value};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Lazily resolved display text
pub type TextProvider = Arc<dyn Fn() -> String + Send + Sync>;

/// Reads the current value of a bound property
pub type Getter<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Writes a new value to a bound property
pub type Setter<T> = Arc<dyn Fn(T) + Send + Sync>;

/// A parameterless menu callback (reset, save, lifecycle)
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// Menu field-changed notification: field id and new value
pub type FieldChanged = Arc<dyn Fn(&str, &Value) + Send + Sync>;

/// Draws a complex option onto the host surface
pub type DrawFn = Arc<dyn Fn(&dyn Any, Point) + Send + Sync>;

/// Identity of the mod registering options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub unique_id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
}

impl Manifest {
    pub fn new(unique_id: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// Translation namespace: the second dot-separated segment of the id
    ///
    /// `Author.AudioTweaks` has namespace `AudioTweaks`.
    pub fn namespace(&self) -> Option<&str> {
        self.unique_id
            .split('.')
            .nth(1)
            .filter(|segment| !segment.is_empty())
    }
}

/// A typed option registration
pub struct OptionSpec<T> {
    pub getter: Getter<T>,
    pub setter: Setter<T>,
    pub name: TextProvider,
    pub description: TextProvider,
    pub field_id: Option<String>,
}

impl<T> Clone for OptionSpec<T> {
    fn clone(&self) -> Self {
        Self {
            getter: Arc::clone(&self.getter),
            setter: Arc::clone(&self.setter),
            name: Arc::clone(&self.name),
            description: Arc::clone(&self.description),
            field_id: self.field_id.clone(),
        }
    }
}

impl<T> fmt::Debug for OptionSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSpec")
            .field("name", &(self.name)())
            .field("field_id", &self.field_id)
            .finish()
    }
}

/// A custom-drawn option
#[derive(Clone)]
pub struct ComplexOption {
    pub name: TextProvider,
    pub draw: DrawFn,
    pub height: Option<Arc<dyn Fn() -> f32 + Send + Sync>>,
    pub before_menu_opened: Option<Callback>,
    pub before_save: Option<Callback>,
    pub after_reset: Option<Callback>,
    pub field_id: Option<String>,
}

impl fmt::Debug for ComplexOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComplexOption")
            .field("field_id", &self.field_id)
            .field("has_height", &self.height.is_some())
            .field("has_after_reset", &self.after_reset.is_some())
            .finish()
    }
}

/// The external settings menu
///
/// Implemented by the host adapter for whatever menu system renders the
/// options; the bridge only registers with it.
pub trait ConfigMenu: Send + Sync {
    /// Register a mod with its reset and save callbacks
    fn register(&self, manifest: &Manifest, reset: Callback, save: Callback);

    fn add_bool_option(&self, manifest: &Manifest, option: OptionSpec<bool>);

    fn add_int_option(&self, manifest: &Manifest, option: OptionSpec<i32>);

    fn add_float_option(&self, manifest: &Manifest, option: OptionSpec<f32>);

    fn add_text_option(&self, manifest: &Manifest, option: OptionSpec<String>);

    fn add_keybind_option(&self, manifest: &Manifest, option: OptionSpec<Button>);

    fn add_keybind_list_option(&self, manifest: &Manifest, option: OptionSpec<KeybindList>);

    fn add_section_title(&self, manifest: &Manifest, text: TextProvider, tooltip: Option<TextProvider>);

    /// Link to the page with id `page_id`
    fn add_page_link(
        &self,
        manifest: &Manifest,
        page_id: &str,
        text: TextProvider,
        tooltip: Option<TextProvider>,
    );

    /// Start a new page; later options go onto it
    fn add_page(&self, manifest: &Manifest, page_id: &str, title: TextProvider);

    fn add_complex_option(&self, manifest: &Manifest, option: ComplexOption);

    /// Called when a field registered by this mod is edited in the menu
    fn on_field_changed(&self, manifest: &Manifest, callback: FieldChanged);
}
