//! Error types for property reflection and value coercion

use thiserror::Error;

/// Result type alias for reflector operations
pub type Result<T> = std::result::Result<T, ReflectError>;

/// A value could not be coerced to a property's declared type
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot convert {from} to {to}{}", .reason.as_deref().map(|r| format!(": {}", r)).unwrap_or_default())]
pub struct ConversionError {
    /// Kind of the value that was supplied
    pub from: String,
    /// Declared type it had to become
    pub to: String,
    /// Extra detail, e.g. the parse failure
    pub reason: Option<String>,
}

impl ConversionError {
    pub(crate) fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            reason: None,
        }
    }

    pub(crate) fn because(mut self, reason: impl ToString) -> Self {
        self.reason = Some(reason.to_string());
        self
    }
}

/// Errors from the configuration reflector
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReflectError {
    /// No property by that name exists on the configuration type
    #[error("property `{0}` not found")]
    PropertyNotFound(String),

    /// The property's declared type has no value kind
    #[error("property `{property}` has unsupported type `{declared}`")]
    UnsupportedKind {
        /// Property name
        property: String,
        /// Declared type name
        declared: String,
    },

    /// A value could not be coerced to the property's declared type
    #[error("property `{property}`: {source}")]
    ConversionFailure {
        /// Property name
        property: String,
        /// The coercion failure
        #[source]
        source: ConversionError,
    },

    /// The property has no write accessor
    #[error("property `{0}` is read-only")]
    ReadOnly(String),
}

impl ReflectError {
    /// Name of the property the error is about
    pub fn property(&self) -> &str {
        match self {
            Self::PropertyNotFound(name) | Self::ReadOnly(name) => name,
            Self::UnsupportedKind { property, .. } | Self::ConversionFailure { property, .. } => {
                property
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_error_message_includes_reason() {
        let plain = ConversionError::new("text", "Int");
        assert_eq!(plain.to_string(), "cannot convert text to Int");

        let detailed = ConversionError::new("text", "Int").because("invalid digit");
        assert_eq!(detailed.to_string(), "cannot convert text to Int: invalid digit");
    }

    #[test]
    fn test_reflect_error_names_property() {
        let err = ReflectError::ConversionFailure {
            property: "Volume".into(),
            source: ConversionError::new("text", "Int"),
        };
        assert_eq!(err.property(), "Volume");
        assert_eq!(
            err.to_string(),
            "property `Volume`: cannot convert text to Int"
        );
        assert_eq!(ReflectError::PropertyNotFound("X".into()).property(), "X");
    }
}
