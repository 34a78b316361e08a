//! Hook kinds, hook implementations and the call frame hooks observe

use crate::target::{MemberInfo, ParamType, Parameter};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// When a hook runs relative to the original body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// Runs before the original body
    Before,
    /// Runs after the original body returns normally; skipped if it fails
    After,
    /// Replaces the original body with a transformed one
    Rewrite,
}

impl HookKind {
    /// Lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
            Self::Rewrite => "rewrite",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Argument passed to a host member
pub type ArgValue = Box<dyn Any + Send + Sync>;

/// Value returned by a host member
pub type ReturnValue = Box<dyn Any + Send + Sync>;

/// An original or rewritten member body
pub type MethodBody = Arc<dyn Fn(&CallFrame<'_>) -> anyhow::Result<ReturnValue> + Send + Sync>;

/// Before-hook body
pub type BeforeFn = Arc<dyn Fn(&CallFrame<'_>) + Send + Sync>;

/// After-hook body; receives the value the original returned
pub type AfterFn = Arc<dyn Fn(&CallFrame<'_>, &(dyn Any + Send + Sync)) + Send + Sync>;

/// Rewrite-hook body; maps the current body to its replacement
pub type RewriteFn = Arc<dyn Fn(MethodBody) -> MethodBody + Send + Sync>;

/// The arguments of one invocation, addressable by position or by name
pub struct CallFrame<'a> {
    member: &'a MemberInfo,
    args: &'a [ArgValue],
}

impl<'a> CallFrame<'a> {
    /// Bind arguments to the member they were passed to
    pub fn new(member: &'a MemberInfo, args: &'a [ArgValue]) -> Self {
        Self { member, args }
    }

    /// The member being invoked
    pub fn member(&self) -> &MemberInfo {
        self.member
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Whether the call has no arguments
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Argument at `index`, if present and of type `T`
    pub fn arg_at<T: Any>(&self, index: usize) -> Option<&T> {
        let value: &(dyn Any + Send + Sync) = self.args.get(index)?.as_ref();
        value.downcast_ref::<T>()
    }

    /// Argument bound to the parameter named `name`, if present and of type `T`
    pub fn arg<T: Any>(&self, name: &str) -> Option<&T> {
        self.arg_at(self.member.position(name)?)
    }

    /// Argument bound to the parameter named `name`, untyped
    pub fn arg_any(&self, name: &str) -> Option<&(dyn Any + Send + Sync)> {
        let index = self.member.position(name)?;
        self.args.get(index).map(|value| value.as_ref())
    }
}

impl fmt::Debug for CallFrame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallFrame")
            .field("member", &self.member.to_string())
            .field("args", &self.args.len())
            .finish()
    }
}

/// The executable part of a hook
#[derive(Clone)]
pub enum HookBody {
    /// See [`HookKind::Before`]
    Before(BeforeFn),
    /// See [`HookKind::After`]
    After(AfterFn),
    /// See [`HookKind::Rewrite`]
    Rewrite(RewriteFn),
}

impl HookBody {
    /// The kind this body can be installed as
    pub fn kind(&self) -> HookKind {
        match self {
            Self::Before(_) => HookKind::Before,
            Self::After(_) => HookKind::After,
            Self::Rewrite(_) => HookKind::Rewrite,
        }
    }
}

/// A named hook implementation plus the target parameters it binds
///
/// Bindings are checked against the resolved target at install time; a hook
/// that binds `page: System.String` cannot be installed on a member without
/// such a parameter.
#[derive(Clone)]
pub struct HookImpl {
    name: String,
    binds: Vec<Parameter>,
    body: HookBody,
}

impl HookImpl {
    /// Create a before-hook
    pub fn before<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&CallFrame<'_>) + Send + Sync + 'static,
    {
        Self::from_body(name, HookBody::Before(Arc::new(body)))
    }

    /// Create an after-hook
    pub fn after<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&CallFrame<'_>, &(dyn Any + Send + Sync)) + Send + Sync + 'static,
    {
        Self::from_body(name, HookBody::After(Arc::new(body)))
    }

    /// Create a rewrite-hook
    pub fn rewrite<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(MethodBody) -> MethodBody + Send + Sync + 'static,
    {
        Self::from_body(name, HookBody::Rewrite(Arc::new(body)))
    }

    fn from_body(name: impl Into<String>, body: HookBody) -> Self {
        Self {
            name: name.into(),
            binds: Vec::new(),
            body,
        }
    }

    /// Declare a target parameter this hook reads
    pub fn binding(mut self, name: impl Into<String>, ty: impl Into<ParamType>) -> Self {
        self.binds.push(Parameter::new(name, ty));
        self
    }

    /// Hook name, unique per call site
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind of the body
    pub fn kind(&self) -> HookKind {
        self.body.kind()
    }

    /// Declared parameter bindings
    pub fn binds(&self) -> &[Parameter] {
        &self.binds
    }

    /// The executable body
    pub fn body(&self) -> &HookBody {
        &self.body
    }
}

impl fmt::Debug for HookImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookImpl")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("binds", &self.binds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{Member, MemberHandle};

    fn draw_member() -> MemberInfo {
        MemberInfo {
            handle: MemberHandle(7),
            owner: "Menu".into(),
            member: Member::Method("draw".into()),
            params: vec![
                Parameter::new("page", "System.String"),
                Parameter::new("scroll", "System.Int32"),
            ],
        }
    }

    #[test]
    fn test_call_frame_reads_args_by_name_and_type() {
        let member = draw_member();
        let args: Vec<ArgValue> = vec![Box::new("General".to_string()), Box::new(3i32)];
        let frame = CallFrame::new(&member, &args);

        assert_eq!(frame.arg::<String>("page").map(String::as_str), Some("General"));
        assert_eq!(frame.arg::<i32>("scroll"), Some(&3));
        assert!(frame.arg::<i32>("page").is_none());
        assert!(frame.arg::<i32>("missing").is_none());
        assert!(frame.arg_any("scroll").is_some());
    }

    #[test]
    fn test_hook_impl_kind_follows_body() {
        let before = HookImpl::before("b", |_| {});
        let after = HookImpl::after("a", |_, _| {}).binding("page", "System.String");
        let rewrite = HookImpl::rewrite("r", |body| body);

        assert_eq!(before.kind(), HookKind::Before);
        assert_eq!(after.kind(), HookKind::After);
        assert_eq!(after.binds().len(), 1);
        assert_eq!(rewrite.kind(), HookKind::Rewrite);
    }
}
