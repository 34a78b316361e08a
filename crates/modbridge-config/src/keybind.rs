//! Buttons, keybinds and keybind lists
//!
//! The textual form is the one players edit in config files:
//!
//! ```text
//! LeftShift + F5, F6
//! ```
//!
//! `+` joins buttons that must be held together into a [`Keybind`]; `,`
//! separates alternative keybinds in a [`KeybindList`]. An empty string is an
//! empty list (unbound).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Why a keybind string could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeybindParseError {
    /// A `+` or `,` with nothing on one side
    #[error("empty button name in `{0}`")]
    EmptyButton(String),

    /// A button name containing whitespace or separators
    #[error("invalid button name `{0}`")]
    InvalidButton(String),
}

/// A single input button, by name (`F5`, `LeftShift`, `MouseLeft`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Button(String);

impl Button {
    /// Validate and wrap a button name
    pub fn new(name: impl AsRef<str>) -> Result<Self, KeybindParseError> {
        name.as_ref().parse()
    }

    /// The button name
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for Button {
    /// The unbound button, `None`
    fn default() -> Self {
        Self("None".to_string())
    }
}

impl FromStr for Button {
    type Err = KeybindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err(KeybindParseError::EmptyButton(s.to_string()));
        }
        if name.chars().any(|c| c.is_whitespace() || c == '+' || c == ',') {
            return Err(KeybindParseError::InvalidButton(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Buttons that must be pressed together
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Keybind {
    buttons: Vec<Button>,
}

impl Keybind {
    /// A combination of buttons
    pub fn new(buttons: Vec<Button>) -> Self {
        Self { buttons }
    }

    /// The buttons in press order
    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    /// Whether no button is bound
    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }
}

impl From<Button> for Keybind {
    fn from(button: Button) -> Self {
        Self::new(vec![button])
    }
}

impl FromStr for Keybind {
    type Err = KeybindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let buttons = s
            .split('+')
            .map(|part| {
                if part.trim().is_empty() {
                    Err(KeybindParseError::EmptyButton(s.trim().to_string()))
                } else {
                    part.parse()
                }
            })
            .collect::<Result<Vec<Button>, _>>()?;
        Ok(Self::new(buttons))
    }
}

impl fmt::Display for Keybind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, button) in self.buttons.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            write!(f, "{}", button)?;
        }
        Ok(())
    }
}

/// Alternative keybinds; any one of them triggers the action
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeybindList {
    keybinds: Vec<Keybind>,
}

impl KeybindList {
    /// A list of alternatives
    pub fn new(keybinds: Vec<Keybind>) -> Self {
        Self { keybinds }
    }

    /// The alternatives, in declared order
    pub fn keybinds(&self) -> &[Keybind] {
        &self.keybinds
    }

    /// Number of alternatives
    pub fn len(&self) -> usize {
        self.keybinds.len()
    }

    /// Whether the list is unbound
    pub fn is_empty(&self) -> bool {
        self.keybinds.is_empty()
    }
}

impl From<Button> for KeybindList {
    fn from(button: Button) -> Self {
        Self::new(vec![Keybind::from(button)])
    }
}

impl From<Keybind> for KeybindList {
    fn from(keybind: Keybind) -> Self {
        Self::new(vec![keybind])
    }
}

impl FromStr for KeybindList {
    type Err = KeybindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        let keybinds = s
            .split(',')
            .map(str::parse)
            .collect::<Result<Vec<Keybind>, _>>()?;
        Ok(Self::new(keybinds))
    }
}

impl fmt::Display for KeybindList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, keybind) in self.keybinds.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", keybind)?;
        }
        Ok(())
    }
}

// Buttons and keybind lists are stored in their textual form.

impl Serialize for Button {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Button {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for KeybindList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeybindList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
