//! Target descriptors and the resolved member metadata a host reports back
//!
//! A [`TargetDescriptor`] names a method or constructor by owner type, member
//! name and (optionally) parameter signature. It carries no handle to the
//! code itself; resolution happens lazily through an
//! [`InterceptContext`](crate::InterceptContext) and may fail if the owning
//! code unit is not loaded yet.

use std::fmt;

/// A parameter type as the host names it (e.g. `System.String`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamType(String);

impl ParamType {
    /// Create a parameter type from its host-qualified name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The host-qualified type name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParamType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ParamType {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which member of the owner type a descriptor points at
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Member {
    /// A named method
    Method(String),
    /// An instance constructor
    Constructor,
}

impl Member {
    /// Display name of the member (`.ctor` for constructors)
    pub fn name(&self) -> &str {
        match self {
            Member::Method(name) => name,
            Member::Constructor => ".ctor",
        }
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name-based identification of a method or constructor owned by host code
///
/// Immutable once built. `params == None` means "any overload", which only
/// resolves when the member name is unique on the owner type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetDescriptor {
    owner: String,
    member: Member,
    params: Option<Vec<ParamType>>,
}

impl TargetDescriptor {
    /// Describe a named method on `owner`
    pub fn method(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            member: Member::Method(name.into()),
            params: None,
        }
    }

    /// Describe a constructor of `owner`
    pub fn constructor(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            member: Member::Constructor,
            params: None,
        }
    }

    /// Parse the `Owner.Type:member` shorthand
    ///
    /// The split happens on the last `:` so owners containing `::` still
    /// parse. Returns `None` when either side is empty.
    pub fn parse(qualified: &str) -> Option<Self> {
        let (owner, member) = qualified.rsplit_once(':')?;
        let owner = owner.trim_end_matches(':');
        if owner.is_empty() || member.is_empty() {
            return None;
        }
        Some(Self::method(owner, member))
    }

    /// Pin the descriptor to an exact parameter signature
    pub fn with_params<I, P>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ParamType>,
    {
        self.params = Some(params.into_iter().map(Into::into).collect());
        self
    }

    /// Qualified name of the owner type
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The member this descriptor points at
    pub fn member(&self) -> &Member {
        &self.member
    }

    /// Required parameter signature, if pinned
    pub fn params(&self) -> Option<&[ParamType]> {
        self.params.as_deref()
    }

    /// Render the signature as `(A, B)`, or `(..)` when unpinned
    pub fn signature(&self) -> String {
        match &self.params {
            Some(params) => format_signature(params.iter()),
            None => "(..)".to_string(),
        }
    }
}

impl fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}{}", self.owner, self.member, self.signature())
    }
}

pub(crate) fn format_signature<'a>(params: impl Iterator<Item = &'a ParamType>) -> String {
    let parts: Vec<&str> = params.map(ParamType::as_str).collect();
    format!("({})", parts.join(", "))
}

/// A named, typed parameter of a resolved member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name as declared by the host
    pub name: String,
    /// Parameter type
    pub ty: ParamType,
}

impl Parameter {
    /// Create a parameter
    pub fn new(name: impl Into<String>, ty: impl Into<ParamType>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}

/// Opaque handle to a resolved member, issued by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberHandle(pub u64);

/// A member the host resolved, with its full parameter list
#[derive(Debug, Clone)]
pub struct MemberInfo {
    /// Host handle used for installation
    pub handle: MemberHandle,
    /// Qualified owner type name
    pub owner: String,
    /// Method name or constructor marker
    pub member: Member,
    /// Declared parameters, in order
    pub params: Vec<Parameter>,
}

impl MemberInfo {
    /// Whether the parameter types equal `signature`, position by position
    pub fn matches(&self, signature: &[ParamType]) -> bool {
        self.params.len() == signature.len()
            && self
                .params
                .iter()
                .zip(signature)
                .all(|(param, ty)| &param.ty == ty)
    }

    /// Look up a parameter by name
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Position of a named parameter
    pub fn position(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    /// Signature rendered as `(A, B)`
    pub fn signature(&self) -> String {
        format_signature(self.params.iter().map(|p| &p.ty))
    }
}

impl fmt::Display for MemberInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}{}", self.owner, self.member, self.signature())
    }
}

/// Everything a host knows about one type in a loaded code unit
#[derive(Debug, Clone)]
pub struct TypeInfo {
    /// Qualified type name
    pub name: String,
    /// Name of the code unit that defines the type
    pub unit: String,
    /// Methods, all overloads included
    pub methods: Vec<MemberInfo>,
    /// Constructors
    pub constructors: Vec<MemberInfo>,
}

impl TypeInfo {
    /// All overloads matching `member`
    pub fn candidates(&self, member: &Member) -> Vec<&MemberInfo> {
        match member {
            Member::Constructor => self.constructors.iter().collect(),
            Member::Method(name) => self
                .methods
                .iter()
                .filter(|m| m.member.name() == name)
                .collect(),
        }
    }
}
