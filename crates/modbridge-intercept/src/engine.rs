//! The interception engine
//!
//! Holds the single interception context for the process, resolves target
//! descriptors against it and installs hooks. Resolution is lazy: nothing is
//! looked up until an install call, so descriptors may name code units the
//! host has not loaded yet.
//!
//! ## Example
//!
//! ```rust,ignore
//! use modbridge_intercept::{HookImpl, HookKind, InProcessHost, InterceptionEngine, ParamType};
//!
//! let engine = InterceptionEngine::new();
//! engine.initialize(Arc::new(InProcessHost::new()))?;
//!
//! let hook = HookImpl::after("log_draw", |call, _ret| {
//!     tracing::debug!("draw called with {} args", call.len());
//! });
//! engine.install_method_hook("Menu", "draw", &[ParamType::new("Canvas")], HookKind::After, hook)?;
//! ```

use crate::error::{HookAttempt, InstallCause, InterceptError, ResolveCause, Result};
use crate::hook::{HookImpl, HookKind};
use crate::target::{MemberHandle, MemberInfo, ParamType, TargetDescriptor, TypeInfo};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Host adapter that knows how to find and hook host-owned members
///
/// The engine stays agnostic to how resolution and installation work; it
/// only relies on this contract.
pub trait InterceptContext: Send + Sync {
    /// Look up a type by qualified name across every loaded code unit
    fn find_type(&self, qualified_name: &str) -> Option<TypeInfo>;

    /// Install a hook on a resolved member
    fn attach(&self, member: &MemberInfo, kind: HookKind, hook: HookImpl) -> anyhow::Result<()>;
}

/// Resolves targets and installs hooks against one interception context
#[derive(Default)]
pub struct InterceptionEngine {
    context: OnceCell<Arc<dyn InterceptContext>>,
    installed: Mutex<HashSet<(MemberHandle, HookKind, String)>>,
}

impl InterceptionEngine {
    /// Create an engine with no context; call [`initialize`](Self::initialize) next
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine that is already initialized with `context`
    pub fn with_context(context: Arc<dyn InterceptContext>) -> Self {
        let engine = Self::new();
        // A fresh cell cannot already be set.
        let _ = engine.context.set(context);
        engine
    }

    /// Store the process-wide interception context
    pub fn initialize(&self, context: Arc<dyn InterceptContext>) -> Result<()> {
        self.context
            .set(context)
            .map_err(|_| InterceptError::AlreadyInitialized)?;
        debug!(category = "intercept", "interception context initialized");
        Ok(())
    }

    /// Whether [`initialize`](Self::initialize) has run
    pub fn is_initialized(&self) -> bool {
        self.context.get().is_some()
    }

    fn context(&self) -> Result<&Arc<dyn InterceptContext>> {
        self.context.get().ok_or(InterceptError::UninitializedContext)
    }

    /// Resolve a descriptor to the member it names
    pub fn resolve(&self, target: &TargetDescriptor) -> Result<MemberInfo> {
        let context = self.context()?;
        resolve_member(context.as_ref(), target).map_err(|cause| InterceptError::Resolution {
            attempt: HookAttempt::new(target, ""),
            cause,
        })
    }

    /// Hook the overload of `owner.method` whose parameters are exactly `params`
    pub fn install_method_hook(
        &self,
        owner: &str,
        method: &str,
        params: &[ParamType],
        kind: HookKind,
        hook: HookImpl,
    ) -> Result<MemberHandle> {
        let target = TargetDescriptor::method(owner, method).with_params(params.iter().cloned());
        self.install(&target, kind, hook)
    }

    /// Hook the constructor of `owner` whose parameters are exactly `params`
    pub fn install_constructor_hook(
        &self,
        owner: &str,
        params: &[ParamType],
        kind: HookKind,
        hook: HookImpl,
    ) -> Result<MemberHandle> {
        let target = TargetDescriptor::constructor(owner).with_params(params.iter().cloned());
        self.install(&target, kind, hook)
    }

    /// Resolve `target` and install `hook` on it as `kind`
    pub fn install(
        &self,
        target: &TargetDescriptor,
        kind: HookKind,
        hook: HookImpl,
    ) -> Result<MemberHandle> {
        let context = self.context()?;
        let hook_name = hook.name().to_string();
        let attempt = || HookAttempt::new(target, &hook_name);

        let member = resolve_member(context.as_ref(), target).map_err(|cause| {
            debug!(category = "intercept", target = %target, "resolution failed: {}", cause);
            InterceptError::Resolution {
                attempt: attempt(),
                cause,
            }
        })?;

        let install_error = |cause: InstallCause| InterceptError::Install {
            attempt: attempt(),
            cause,
        };

        if hook.kind() != kind {
            return Err(install_error(InstallCause::KindMismatch {
                requested: kind,
                provided: hook.kind(),
            }));
        }

        if let Some(unbound) = hook
            .binds()
            .iter()
            .find(|bound| member.parameter(&bound.name).map(|p| &p.ty) != Some(&bound.ty))
        {
            return Err(install_error(InstallCause::UnboundParameter {
                name: unbound.name.clone(),
                ty: unbound.ty.clone(),
            }));
        }

        // Reserve the key, then attach unlocked: the host may call back in.
        let key = (member.handle, kind, hook_name.clone());
        if !self.installed.lock().insert(key.clone()) {
            return Err(install_error(InstallCause::AlreadyInstalled));
        }

        if let Err(e) = context.attach(&member, kind, hook) {
            self.installed.lock().remove(&key);
            return Err(install_error(InstallCause::Rejected(e)));
        }

        info!(
            category = "intercept",
            "installed {} hook `{}` on {}", kind, hook_name, member
        );
        Ok(member.handle)
    }

    /// Number of hooks this engine has installed
    pub fn installed_count(&self) -> usize {
        self.installed.lock().len()
    }
}

fn resolve_member(
    context: &dyn InterceptContext,
    target: &TargetDescriptor,
) -> std::result::Result<MemberInfo, ResolveCause> {
    let ty = context
        .find_type(target.owner())
        .ok_or_else(|| ResolveCause::TypeNotFound(target.owner().to_string()))?;

    let candidates = ty.candidates(target.member());
    if candidates.is_empty() {
        return Err(ResolveCause::MemberNotFound {
            owner: target.owner().to_string(),
            member: target.member().name().to_string(),
        });
    }

    let matching: Vec<&MemberInfo> = match target.params() {
        Some(signature) => candidates
            .iter()
            .copied()
            .filter(|m| m.matches(signature))
            .collect(),
        None => candidates.clone(),
    };

    match matching.as_slice() {
        [only] => Ok((*only).clone()),
        [] => Err(ResolveCause::NoMatchingOverload {
            available: candidates.iter().map(|m| m.signature()).collect(),
        }),
        many => Err(ResolveCause::Ambiguous { count: many.len() }),
    }
}
