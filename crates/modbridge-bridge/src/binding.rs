//! Binding metadata table: which settings control backs each value kind

use modbridge_config::ValueKind;
use serde::Serialize;
use std::fmt;

/// Settings control a property is registered as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ControlKind {
    Checkbox,
    IntegerField,
    FloatField,
    TextField,
    KeybindPicker,
    KeybindListPicker,
}

impl ControlKind {
    /// Stable name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checkbox => "checkbox",
            Self::IntegerField => "integer",
            Self::FloatField => "float",
            Self::TextField => "text",
            Self::KeybindPicker => "keybind",
            Self::KeybindListPicker => "keybind-list",
        }
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The control for a value kind
pub const fn control_for(kind: ValueKind) -> ControlKind {
    match kind {
        ValueKind::Boolean => ControlKind::Checkbox,
        ValueKind::Integer => ControlKind::IntegerField,
        ValueKind::Float => ControlKind::FloatField,
        ValueKind::String => ControlKind::TextField,
        ValueKind::SingleKeybind => ControlKind::KeybindPicker,
        ValueKind::KeybindList => ControlKind::KeybindListPicker,
    }
}

/// A property registered with the settings menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyBinding {
    /// Property name
    pub property: String,
    /// Value kind the accessors agree on
    pub kind: ValueKind,
    /// Control it was registered as
    pub control: ControlKind,
    /// Field id used to correlate menu notifications
    pub field_id: Option<String>,
}
