//! Descriptor model: the public shape of a value record
//!
//! A [`ValueRecordDescriptor`] is everything the generator needs to know about
//! a record. It is produced by [`crate::discover`] from Rust source, or by any
//! other tool able to serialize it (the model derives `serde` traits).
//!
//! Only the public surface is described: non-public fields and methods never
//! reach the generator.

use serde::{Deserialize, Serialize};

/// How far a record or scope is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    /// `pub`
    Public,

    /// `pub(crate)`, `pub(super)`, `pub(in path)`
    Internal,

    /// No visibility modifier, or `pub(self)`
    Private,
}

impl Accessibility {
    /// Read the accessibility of a syn visibility.
    pub fn of(vis: &syn::Visibility) -> Self {
        match vis {
            syn::Visibility::Public(_) => Accessibility::Public,
            syn::Visibility::Restricted(restricted) => {
                if restricted.path.is_ident("self") {
                    Accessibility::Private
                } else {
                    Accessibility::Internal
                }
            }
            syn::Visibility::Inherited => Accessibility::Private,
        }
    }

    /// Whether generated code living elsewhere can name the item.
    pub fn is_public(self) -> bool {
        self == Accessibility::Public
    }
}

/// An enclosing scope (a module) on the path to a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    /// Module name
    pub name: String,

    /// Visibility of the module
    pub accessibility: Accessibility,
}

impl Scope {
    /// Create a scope entry.
    pub fn new(name: impl Into<String>, accessibility: Accessibility) -> Self {
        Self {
            name: name.into(),
            accessibility,
        }
    }
}

/// Whether a member is a stored field or an accessor-backed property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    /// `pub name: Ty`, read as `record.name`
    Field,

    /// `fn name(&self) -> Ty` and/or `fn set_name(&mut self, Ty)`
    Property,
}

/// A public, non-static member of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    /// Member name
    pub name: String,

    /// Declared type, as Rust source
    pub ty: String,

    /// Field or property
    pub kind: MemberKind,

    /// Whether the member can be read
    pub readable: bool,

    /// Whether the member can be written
    pub writable: bool,
}

impl Member {
    /// A public field (always readable and writable).
    pub fn field(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            kind: MemberKind::Field,
            readable: true,
            writable: true,
        }
    }

    /// A property with the given accessors.
    pub fn property(
        name: impl Into<String>,
        ty: impl Into<String>,
        readable: bool,
        writable: bool,
    ) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            kind: MemberKind::Property,
            readable,
            writable,
        }
    }

    /// Name of the generated setter.
    pub fn setter_name(&self) -> String {
        format!("set_{}", self.name.trim_start_matches("r#"))
    }
}

/// A constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name
    pub name: String,

    /// Parameter type, as Rust source
    pub ty: String,
}

impl Param {
    /// Create a parameter.
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// A public constructor: an associated function returning the record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constructor {
    /// Function name (`new`, `with_capacity`, ...)
    pub name: String,

    /// Ordered parameters
    pub params: Vec<Param>,
}

impl Constructor {
    /// Create a constructor description.
    pub fn new(name: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

/// The public shape of one value record.
///
/// # Example
///
/// ```
/// use versioned_codegen::{Accessibility, Constructor, Member, Param, ValueRecordDescriptor};
///
/// let stock = ValueRecordDescriptor::new("Stock")
///     .with_namespace("crate::inventory")
///     .with_member(Member::field("quantity", "i32"))
///     .with_member(Member::property("total_weight", "i32", true, false))
///     .with_constructor(Constructor::new(
///         "new",
///         vec![Param::new("quantity", "i32"), Param::new("unit_weight", "i32")],
///     ));
///
/// assert_eq!(stock.accessibility, Accessibility::Public);
/// assert_eq!(stock.qualified_path(), "crate::inventory::Stock");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueRecordDescriptor {
    /// Record name
    pub name: String,

    /// Visibility of the record itself
    pub accessibility: Accessibility,

    /// Enclosing scopes, outermost first
    #[serde(default)]
    pub containing_scopes: Vec<Scope>,

    /// Path of the module holding the outermost scope (e.g. `crate::model`)
    #[serde(default)]
    pub namespace_path: Option<String>,

    /// Public members, in declaration order
    #[serde(default)]
    pub members: Vec<Member>,

    /// Public constructors, in declaration order
    #[serde(default)]
    pub constructors: Vec<Constructor>,
}

impl ValueRecordDescriptor {
    /// A public, top-level record with no members yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accessibility: Accessibility::Public,
            containing_scopes: Vec::new(),
            namespace_path: None,
            members: Vec::new(),
            constructors: Vec::new(),
        }
    }

    /// Set the record's accessibility.
    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    /// Append an enclosing scope (call outermost first).
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.containing_scopes.push(scope);
        self
    }

    /// Set the namespace path.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace_path = Some(namespace.into());
        self
    }

    /// Append a member.
    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Append a constructor.
    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Path segments of the module holding the record, outermost first.
    pub fn module_segments(&self) -> Vec<&str> {
        let mut segments: Vec<&str> = self
            .namespace_path
            .as_deref()
            .map(|ns| ns.split("::").filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        segments.extend(self.containing_scopes.iter().map(|s| s.name.as_str()));
        segments
    }

    /// Fully qualified path to the record: namespace, scopes, then name.
    pub fn qualified_path(&self) -> String {
        let mut segments = self.module_segments();
        segments.push(&self.name);
        segments.join("::")
    }

    /// The first scope (or the record) that is not public, if any.
    pub fn first_inaccessible(&self) -> Option<&str> {
        self.containing_scopes
            .iter()
            .find(|s| !s.accessibility.is_public())
            .map(|s| s.name.as_str())
            .or_else(|| (!self.accessibility.is_public()).then_some(self.name.as_str()))
    }
}
