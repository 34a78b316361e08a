//! Error types for the configuration bridge

use crate::binding::ControlKind;
use modbridge_config::ReflectError;
use modbridge_intercept::InterceptError;
use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors surfaced by the bridge
///
/// Only initialization and explicit lookups return these; per-option
/// failures are logged and skipped.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A required initialization input is missing or malformed
    #[error("missing required input: {0}")]
    MissingInput(String),

    /// `initialize` was called on an initialized bridge
    #[error("bridge is already initialized")]
    AlreadyInitialized,

    /// A required capability is not provided by the host
    #[error("capability `{0}` is not available")]
    CapabilityAbsent(String),

    /// A capability exists but is not of the requested type
    #[error("capability `{id}` is not a {expected}")]
    CapabilityType {
        /// Capability id
        id: String,
        /// Requested type name
        expected: &'static str,
    },

    /// The property's Rust type differs from the type its control edits
    #[error("property `{property}` is declared {declared}, but a {control} edits {expected}")]
    ControlMismatch {
        /// Property name
        property: String,
        /// Declared type of the property
        declared: String,
        /// Control chosen for the value kind
        control: ControlKind,
        /// Declared type the control reads and writes
        expected: String,
    },

    /// No translator is attached
    #[error("translations are not initialized")]
    TranslationUnavailable,

    /// Bridge options could not be parsed
    #[error("invalid bridge options: {0}")]
    Options(#[from] toml::de::Error),

    #[error(transparent)]
    Reflect(#[from] ReflectError),

    #[error(transparent)]
    Intercept(#[from] InterceptError),
}
