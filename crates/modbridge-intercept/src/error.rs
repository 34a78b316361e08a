//! Error types for hook resolution and installation

use crate::hook::HookKind;
use crate::target::{ParamType, TargetDescriptor};
use std::fmt;
use thiserror::Error;

/// Result type alias for interception operations
pub type Result<T> = std::result::Result<T, InterceptError>;

/// What the caller tried to hook, carried by every resolution/installation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookAttempt {
    /// Qualified owner type name
    pub owner: String,
    /// Member name (`.ctor` for constructors)
    pub member: String,
    /// Requested signature, `(..)` when unpinned
    pub signature: String,
    /// Name of the hook being installed
    pub hook: String,
}

impl HookAttempt {
    pub(crate) fn new(target: &TargetDescriptor, hook: &str) -> Self {
        Self {
            owner: target.owner().to_string(),
            member: target.member().name().to_string(),
            signature: target.signature(),
            hook: hook.to_string(),
        }
    }
}

impl fmt::Display for HookAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}{} with hook `{}`",
            self.owner, self.member, self.signature, self.hook
        )
    }
}

/// Why a target could not be resolved
#[derive(Debug, Error)]
pub enum ResolveCause {
    /// No loaded code unit defines the owner type
    #[error("type `{0}` is not loaded")]
    TypeNotFound(String),

    /// The owner type has no member by that name
    #[error("type `{owner}` has no member `{member}`")]
    MemberNotFound {
        /// Owner type
        owner: String,
        /// Requested member
        member: String,
    },

    /// The member exists but no overload has the requested signature
    #[error("no overload matches; available: {}", .available.join(", "))]
    NoMatchingOverload {
        /// Signatures of the overloads that do exist
        available: Vec<String>,
    },

    /// More than one overload matches
    #[error("{count} overloads match; pin the parameter types")]
    Ambiguous {
        /// Number of matching overloads
        count: usize,
    },
}

/// Why a resolved target rejected a hook
#[derive(Debug, Error)]
pub enum InstallCause {
    /// The hook body is of a different kind than requested
    #[error("hook body is {provided} but was installed as {requested}")]
    KindMismatch {
        /// Kind passed to the install call
        requested: HookKind,
        /// Kind of the hook body
        provided: HookKind,
    },

    /// The hook binds a parameter the target does not declare
    #[error("target has no parameter `{name}: {ty}`")]
    UnboundParameter {
        /// Bound parameter name
        name: String,
        /// Bound parameter type
        ty: ParamType,
    },

    /// The same hook was already installed on this target
    #[error("hook is already installed on this target")]
    AlreadyInstalled,

    /// The host's hook backend refused the installation
    #[error("hook backend rejected installation: {0:#}")]
    Rejected(anyhow::Error),
}

/// Errors from the interception engine
#[derive(Debug, Error)]
pub enum InterceptError {
    /// An operation ran before `initialize`
    #[error("interception context used before initialize()")]
    UninitializedContext,

    /// `initialize` ran twice
    #[error("interception context is already initialized")]
    AlreadyInitialized,

    /// The named target could not be found
    #[error("could not resolve {attempt}: {cause}")]
    Resolution {
        /// What was requested
        attempt: HookAttempt,
        /// Why it failed
        #[source]
        cause: ResolveCause,
    },

    /// The target was found but the hook could not be installed
    #[error("could not install {attempt}: {cause}")]
    Install {
        /// What was requested
        attempt: HookAttempt,
        /// Why it failed
        #[source]
        cause: InstallCause,
    },
}

impl InterceptError {
    /// The attempted target, for resolution and installation failures
    pub fn attempt(&self) -> Option<&HookAttempt> {
        match self {
            Self::Resolution { attempt, .. } | Self::Install { attempt, .. } => Some(attempt),
            Self::UninitializedContext | Self::AlreadyInitialized => None,
        }
    }

    /// Whether this is a resolution failure
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution { .. })
    }

    /// Whether this is an installation failure
    pub fn is_install(&self) -> bool {
        matches!(self, Self::Install { .. })
    }
}
