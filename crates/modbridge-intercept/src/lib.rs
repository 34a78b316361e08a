//! Method interception for code the caller does not own
//!
//! This crate locates methods and constructors by name and parameter
//! signature, in code that may not be loaded yet, and installs
//! before/after/rewrite hooks on them:
//!
//! - **Targets**: [`TargetDescriptor`] names a member; resolution is lazy
//! - **Hooks**: [`HookImpl`] carries a body and the target parameters it binds
//! - **Engine**: [`InterceptionEngine`] owns the single [`InterceptContext`],
//!   annotates every failure with the attempted owner/member/signature
//! - **Host**: [`InProcessHost`] is a dispatch-table context for hosts that
//!   route member calls through Rust
//!
//! ## Usage
//!
//! ```rust,ignore
//! use modbridge_intercept::*;
//!
//! let host = Arc::new(InProcessHost::new());
//! let engine = InterceptionEngine::with_context(host.clone());
//!
//! // Fails with a resolution error until the unit is loaded.
//! host.load(CodeUnit::new("menu").with_type(TypeDef::new("Menu").method(
//!     "draw",
//!     vec![Parameter::new("b", "Canvas")],
//!     |_| Ok(Box::new(()) as ReturnValue),
//! )));
//!
//! engine.install_method_hook(
//!     "Menu",
//!     "draw",
//!     &["Canvas".into()],
//!     HookKind::After,
//!     HookImpl::after("overlay", |_call, _ret| {}).binding("b", "Canvas"),
//! )?;
//! ```

mod dispatch;
mod engine;
mod error;
mod hook;
mod target;

pub use dispatch::{CodeUnit, InProcessHost, TypeDef};
pub use engine::{InterceptContext, InterceptionEngine};
pub use error::{HookAttempt, InstallCause, InterceptError, ResolveCause, Result};
pub use hook::{
    AfterFn, ArgValue, BeforeFn, CallFrame, HookBody, HookImpl, HookKind, MethodBody,
    ReturnValue, RewriteFn,
};
pub use target::{
    Member, MemberHandle, MemberInfo, ParamType, Parameter, TargetDescriptor, TypeInfo,
};
