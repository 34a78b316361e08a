//! In-process hook host
//!
//! `InProcessHost` is an [`InterceptContext`] for hosts that route calls to
//! their members through a dispatch table instead of native code. Code units
//! can be loaded at any time; every call goes through [`InProcessHost::call`],
//! which runs before-hooks, the (possibly rewritten) body, and then
//! after-hooks only when the body succeeded.

use crate::engine::InterceptContext;
use crate::hook::{AfterFn, ArgValue, BeforeFn, CallFrame, HookBody, HookImpl, HookKind, MethodBody, ReturnValue};
use crate::target::{Member, MemberHandle, MemberInfo, Parameter, TypeInfo};
use anyhow::{anyhow, bail};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, trace};

struct MemberDef {
    member: Member,
    params: Vec<Parameter>,
    body: MethodBody,
}

/// A host type definition: named methods and constructors with their bodies
pub struct TypeDef {
    name: String,
    members: Vec<MemberDef>,
}

impl TypeDef {
    /// Start a type definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Add a method overload
    pub fn method<F>(mut self, name: impl Into<String>, params: Vec<Parameter>, body: F) -> Self
    where
        F: Fn(&CallFrame<'_>) -> anyhow::Result<ReturnValue> + Send + Sync + 'static,
    {
        self.members.push(MemberDef {
            member: Member::Method(name.into()),
            params,
            body: Arc::new(body),
        });
        self
    }

    /// Add a constructor overload
    pub fn constructor<F>(mut self, params: Vec<Parameter>, body: F) -> Self
    where
        F: Fn(&CallFrame<'_>) -> anyhow::Result<ReturnValue> + Send + Sync + 'static,
    {
        self.members.push(MemberDef {
            member: Member::Constructor,
            params,
            body: Arc::new(body),
        });
        self
    }
}

/// A named group of type definitions loaded together
pub struct CodeUnit {
    name: String,
    types: Vec<TypeDef>,
}

impl CodeUnit {
    /// Start a code unit
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
        }
    }

    /// Add a type to the unit
    pub fn with_type(mut self, ty: TypeDef) -> Self {
        self.types.push(ty);
        self
    }
}

struct Slot {
    info: MemberInfo,
    body: MethodBody,
    before: Vec<BeforeFn>,
    after: Vec<AfterFn>,
}

struct LoadedType {
    unit: String,
    name: String,
    members: Vec<MemberHandle>,
}

#[derive(Default)]
struct HostState {
    types: Vec<LoadedType>,
    slots: Vec<Slot>,
}

/// Dispatch-table host that implements [`InterceptContext`]
#[derive(Default)]
pub struct InProcessHost {
    state: RwLock<HostState>,
}

impl InProcessHost {
    /// Create an empty host with no code units loaded
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a code unit, making its types resolvable
    pub fn load(&self, unit: CodeUnit) {
        let mut state = self.state.write();
        for ty in unit.types {
            let mut members = Vec::with_capacity(ty.members.len());
            for def in ty.members {
                let handle = MemberHandle(state.slots.len() as u64);
                state.slots.push(Slot {
                    info: MemberInfo {
                        handle,
                        owner: ty.name.clone(),
                        member: def.member,
                        params: def.params,
                    },
                    body: def.body,
                    before: Vec::new(),
                    after: Vec::new(),
                });
                members.push(handle);
            }
            state.types.push(LoadedType {
                unit: unit.name.clone(),
                name: ty.name,
                members,
            });
        }
        debug!(category = "intercept", unit = %unit.name, "code unit loaded");
    }

    /// Find the overload of `member` on `owner` that takes `arity` arguments
    pub fn lookup(&self, owner: &str, member: &Member, arity: usize) -> Option<MemberHandle> {
        let state = self.state.read();
        let ty = state.types.iter().find(|t| t.name == owner)?;
        ty.members.iter().copied().find(|handle| {
            let info = &state.slots[handle.0 as usize].info;
            &info.member == member && info.params.len() == arity
        })
    }

    /// Invoke a method by name, picking the overload by argument count
    pub fn invoke(&self, owner: &str, method: &str, args: Vec<ArgValue>) -> anyhow::Result<ReturnValue> {
        let handle = self
            .lookup(owner, &Member::Method(method.to_string()), args.len())
            .ok_or_else(|| anyhow!("no overload {}:{} takes {} arguments", owner, method, args.len()))?;
        self.call(handle, args)
    }

    /// Invoke a constructor, picking the overload by argument count
    pub fn construct(&self, owner: &str, args: Vec<ArgValue>) -> anyhow::Result<ReturnValue> {
        let handle = self
            .lookup(owner, &Member::Constructor, args.len())
            .ok_or_else(|| anyhow!("no constructor of {} takes {} arguments", owner, args.len()))?;
        self.call(handle, args)
    }

    /// Invoke a member through its hooks
    ///
    /// After-hooks only run when the body returns `Ok`; an error from the
    /// body is returned as-is with no after-hook observing it.
    pub fn call(&self, handle: MemberHandle, args: Vec<ArgValue>) -> anyhow::Result<ReturnValue> {
        // Clone out of the lock so hooks may call back into the host.
        let (info, body, before, after) = {
            let state = self.state.read();
            let slot = state
                .slots
                .get(handle.0 as usize)
                .ok_or_else(|| anyhow!("unknown member handle {}", handle.0))?;
            (
                slot.info.clone(),
                slot.body.clone(),
                slot.before.clone(),
                slot.after.clone(),
            )
        };

        let frame = CallFrame::new(&info, &args);
        for hook in &before {
            hook(&frame);
        }

        let returned = body(&frame)?;

        for hook in &after {
            hook(&frame, returned.as_ref());
        }
        trace!(category = "intercept", member = %info, "dispatched");
        Ok(returned)
    }
}

impl InterceptContext for InProcessHost {
    fn find_type(&self, qualified_name: &str) -> Option<TypeInfo> {
        let state = self.state.read();
        let ty = state.types.iter().find(|t| t.name == qualified_name)?;

        let mut methods = Vec::new();
        let mut constructors = Vec::new();
        for handle in &ty.members {
            let info = state.slots[handle.0 as usize].info.clone();
            if matches!(info.member, Member::Constructor) {
                constructors.push(info);
            } else {
                methods.push(info);
            }
        }

        Some(TypeInfo {
            name: ty.name.clone(),
            unit: ty.unit.clone(),
            methods,
            constructors,
        })
    }

    fn attach(&self, member: &MemberInfo, kind: HookKind, hook: HookImpl) -> anyhow::Result<()> {
        if hook.kind() != kind {
            bail!("hook `{}` is {} but was attached as {}", hook.name(), hook.kind(), kind);
        }

        let mut state = self.state.write();
        let slot = state
            .slots
            .get_mut(member.handle.0 as usize)
            .ok_or_else(|| anyhow!("unknown member handle {}", member.handle.0))?;

        match hook.body() {
            HookBody::Before(body) => slot.before.push(body.clone()),
            HookBody::After(body) => slot.after.push(body.clone()),
            HookBody::Rewrite(rewrite) => slot.body = rewrite(slot.body.clone()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter_unit() -> CodeUnit {
        CodeUnit::new("counter.dll").with_type(
            TypeDef::new("Counter")
                .method("add", vec![Parameter::new("a", "i32"), Parameter::new("b", "i32")], |call| {
                    let a = call.arg::<i32>("a").copied().unwrap_or_default();
                    let b = call.arg::<i32>("b").copied().unwrap_or_default();
                    Ok(Box::new(a + b) as ReturnValue)
                })
                .method("fail", vec![], |_| Err(anyhow!("boom")))
                .constructor(vec![Parameter::new("seed", "i32")], |_| Ok(Box::new(()) as ReturnValue)),
        )
    }

    #[test]
    fn test_find_type_splits_methods_and_constructors() {
        let host = InProcessHost::new();
        assert!(host.find_type("Counter").is_none());

        host.load(counter_unit());
        let ty = host.find_type("Counter").unwrap();
        assert_eq!(ty.unit, "counter.dll");
        assert_eq!(ty.methods.len(), 2);
        assert_eq!(ty.constructors.len(), 1);
    }

    #[test]
    fn test_invoke_runs_body() {
        let host = InProcessHost::new();
        host.load(counter_unit());
        let out = host
            .invoke("Counter", "add", vec![Box::new(2i32), Box::new(3i32)])
            .unwrap();
        assert_eq!(out.downcast_ref::<i32>(), Some(&5));
    }

    #[test]
    fn test_rewrite_replaces_body() {
        let host = InProcessHost::new();
        host.load(counter_unit());
        let member = host
            .find_type("Counter")
            .unwrap()
            .methods
            .into_iter()
            .find(|m| m.member.name() == "add")
            .unwrap();

        let doubled = HookImpl::rewrite("double", |original: MethodBody| -> MethodBody {
            Arc::new(move |call: &CallFrame<'_>| -> anyhow::Result<ReturnValue> {
                let value = original(call)?;
                let sum = value.downcast_ref::<i32>().copied().unwrap_or_default();
                Ok(Box::new(sum * 2))
            })
        });
        host.attach(&member, HookKind::Rewrite, doubled).unwrap();

        let out = host
            .invoke("Counter", "add", vec![Box::new(2i32), Box::new(3i32)])
            .unwrap();
        assert_eq!(out.downcast_ref::<i32>(), Some(&10));
    }

    #[test]
    fn test_attach_rejects_kind_mismatch() {
        let host = InProcessHost::new();
        host.load(counter_unit());
        let member = host.find_type("Counter").unwrap().constructors.remove(0);
        let result = host.attach(&member, HookKind::After, HookImpl::before("b", |_| {}));
        assert!(result.is_err());
    }

    #[test]
    fn test_invoke_unknown_arity_fails() {
        let host = InProcessHost::new();
        host.load(counter_unit());
        assert!(host.invoke("Counter", "add", vec![]).is_err());
        assert!(host.construct("Counter", vec![Box::new(1i32)]).is_ok());
    }
}
