//! Type and member signature shapes.
//!
//! Signatures describe the *shape* of a declaration independently of any
//! assembly: the parameter and return types of a method, the type of a field,
//! the indexer parameters of a property. They are plain owned values so that
//! identity keys can hash them and the rewriting passes can transform them
//! (redirecting named types, substituting generic parameters) without touching
//! the definitions they came from.
//!
//! # Key Components
//!
//! - [`Primitive`] - Built-in element types (`System.Int32`, `System.String`, ...)
//! - [`TypeRefPath`] - A resolution-scope-qualified type reference
//! - [`TypeSig`] - The recursive type-signature tree
//! - [`MethodSig`] / [`PropertySig`] - Member signature shapes
//! - [`MemberRef`] / [`MemberRefSig`] - References to members of other types

use std::fmt;

use crate::metadata::identity::AssemblyName;

/// Built-in element types with fixed encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Primitive {
    /// `System.Void`
    #[strum(serialize = "System.Void")]
    Void,
    /// `System.Boolean`
    #[strum(serialize = "System.Boolean")]
    Boolean,
    /// `System.Char`
    #[strum(serialize = "System.Char")]
    Char,
    /// `System.SByte`
    #[strum(serialize = "System.SByte")]
    I1,
    /// `System.Byte`
    #[strum(serialize = "System.Byte")]
    U1,
    /// `System.Int16`
    #[strum(serialize = "System.Int16")]
    I2,
    /// `System.UInt16`
    #[strum(serialize = "System.UInt16")]
    U2,
    /// `System.Int32`
    #[strum(serialize = "System.Int32")]
    I4,
    /// `System.UInt32`
    #[strum(serialize = "System.UInt32")]
    U4,
    /// `System.Int64`
    #[strum(serialize = "System.Int64")]
    I8,
    /// `System.UInt64`
    #[strum(serialize = "System.UInt64")]
    U8,
    /// `System.Single`
    #[strum(serialize = "System.Single")]
    R4,
    /// `System.Double`
    #[strum(serialize = "System.Double")]
    R8,
    /// `System.IntPtr`
    #[strum(serialize = "System.IntPtr")]
    IntPtr,
    /// `System.UIntPtr`
    #[strum(serialize = "System.UIntPtr")]
    UIntPtr,
    /// `System.String`
    #[strum(serialize = "System.String")]
    String,
    /// `System.Object`
    #[strum(serialize = "System.Object")]
    Object,
}

/// A reference to a named type: the assembly that declares it, its namespace
/// and name, and the declaring-type chain for nested types.
///
/// Nested type references carry an empty namespace and point at their
/// enclosing type through `declaring`, mirroring how `TypeRef` rows chain
/// through their resolution scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRefPath {
    /// The assembly the referenced type lives in
    pub assembly: AssemblyName,
    /// Namespace, empty for nested types
    pub namespace: String,
    /// Simple type name
    pub name: String,
    /// Enclosing type for nested references
    pub declaring: Option<Box<TypeRefPath>>,
}

impl TypeRefPath {
    /// Creates a top-level type reference.
    #[must_use]
    pub fn new(assembly: AssemblyName, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        TypeRefPath {
            assembly,
            namespace: namespace.into(),
            name: name.into(),
            declaring: None,
        }
    }

    /// Creates a reference to a type nested inside `self`.
    #[must_use]
    pub fn nested(&self, name: impl Into<String>) -> Self {
        TypeRefPath {
            assembly: self.assembly.clone(),
            namespace: String::new(),
            name: name.into(),
            declaring: Some(Box::new(self.clone())),
        }
    }

    /// The fully qualified name, nesting levels joined with `+`.
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.declaring {
            Some(parent) => format!("{}+{}", parent.full_name(), self.name),
            None if self.namespace.is_empty() => self.name.clone(),
            None => format!("{}.{}", self.namespace, self.name),
        }
    }

    /// Returns a copy with every assembly version erased.
    #[must_use]
    pub fn strip_versions(&self) -> Self {
        TypeRefPath {
            assembly: self.assembly.agnostic(),
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            declaring: self.declaring.as_ref().map(|d| Box::new(d.strip_versions())),
        }
    }
}

impl fmt::Display for TypeRefPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

/// A type signature: the recursive tree describing field types, parameter
/// types and generic arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSig {
    /// A built-in element type
    Primitive(Primitive),
    /// A named class or value type
    Named(TypeRefPath),
    /// A single-dimensional zero-based array
    SzArray(Box<TypeSig>),
    /// A managed by-reference
    ByRef(Box<TypeSig>),
    /// An unmanaged pointer
    Pointer(Box<TypeSig>),
    /// A generic instantiation of a named type
    GenericInst {
        /// The open generic type being instantiated
        base: TypeRefPath,
        /// The type arguments, in declaration order
        args: Vec<TypeSig>,
    },
    /// A generic parameter of the declaring type (`!n`)
    Var(u32),
    /// A generic parameter of the method (`!!n`)
    MVar(u32),
}

impl TypeSig {
    /// Convenience constructor for a named, non-generic type signature.
    #[must_use]
    pub fn named(path: TypeRefPath) -> Self {
        TypeSig::Named(path)
    }

    /// Returns a copy with every assembly version erased.
    #[must_use]
    pub fn strip_versions(&self) -> Self {
        self.map_paths(&|path| path.strip_versions())
    }

    /// Returns a copy with every named-type reference rewritten through `f`.
    ///
    /// Covers both plain named types and the open types of generic
    /// instantiations; generic parameters and primitives pass through.
    #[must_use]
    pub fn map_paths(&self, f: &impl Fn(&TypeRefPath) -> TypeRefPath) -> Self {
        match self {
            TypeSig::Primitive(p) => TypeSig::Primitive(*p),
            TypeSig::Named(path) => TypeSig::Named(f(path)),
            TypeSig::SzArray(inner) => TypeSig::SzArray(Box::new(inner.map_paths(f))),
            TypeSig::ByRef(inner) => TypeSig::ByRef(Box::new(inner.map_paths(f))),
            TypeSig::Pointer(inner) => TypeSig::Pointer(Box::new(inner.map_paths(f))),
            TypeSig::GenericInst { base, args } => TypeSig::GenericInst {
                base: f(base),
                args: args.iter().map(|a| a.map_paths(f)).collect(),
            },
            TypeSig::Var(i) => TypeSig::Var(*i),
            TypeSig::MVar(i) => TypeSig::MVar(*i),
        }
    }

    /// Returns a copy with every generic parameter rewritten through `f`.
    ///
    /// `f` receives `(is_method, index)` and produces the replacement
    /// signature. Used when hoisting instance extension methods onto static
    /// implementations, where `!n` becomes `!!n` shifted past the method's
    /// own generic parameters.
    #[must_use]
    pub fn map_vars(&self, f: &impl Fn(bool, u32) -> TypeSig) -> Self {
        match self {
            TypeSig::Primitive(p) => TypeSig::Primitive(*p),
            TypeSig::Named(path) => TypeSig::Named(path.clone()),
            TypeSig::SzArray(inner) => TypeSig::SzArray(Box::new(inner.map_vars(f))),
            TypeSig::ByRef(inner) => TypeSig::ByRef(Box::new(inner.map_vars(f))),
            TypeSig::Pointer(inner) => TypeSig::Pointer(Box::new(inner.map_vars(f))),
            TypeSig::GenericInst { base, args } => TypeSig::GenericInst {
                base: base.clone(),
                args: args.iter().map(|a| a.map_vars(f)).collect(),
            },
            TypeSig::Var(i) => f(false, *i),
            TypeSig::MVar(i) => f(true, *i),
        }
    }
}

impl fmt::Display for TypeSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSig::Primitive(p) => write!(f, "{p}"),
            TypeSig::Named(path) => write!(f, "{path}"),
            TypeSig::SzArray(inner) => write!(f, "{inner}[]"),
            TypeSig::ByRef(inner) => write!(f, "{inner}&"),
            TypeSig::Pointer(inner) => write!(f, "{inner}*"),
            TypeSig::GenericInst { base, args } => {
                write!(f, "{base}<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ">")
            }
            TypeSig::Var(i) => write!(f, "!{i}"),
            TypeSig::MVar(i) => write!(f, "!!{i}"),
        }
    }
}

/// A method signature: calling convention, generic arity, return type and
/// parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSig {
    /// Whether the method takes an implicit `this`
    pub has_this: bool,
    /// Number of generic parameters declared by the method
    pub generic_arity: u32,
    /// Return type
    pub return_type: TypeSig,
    /// Parameter types in declaration order
    pub params: Vec<TypeSig>,
}

impl MethodSig {
    /// Creates an instance-method signature.
    #[must_use]
    pub fn instance(return_type: TypeSig, params: Vec<TypeSig>) -> Self {
        MethodSig {
            has_this: true,
            generic_arity: 0,
            return_type,
            params,
        }
    }

    /// Creates a static-method signature.
    #[must_use]
    pub fn stat(return_type: TypeSig, params: Vec<TypeSig>) -> Self {
        MethodSig {
            has_this: false,
            generic_arity: 0,
            return_type,
            params,
        }
    }

    /// Returns a copy with every assembly version erased.
    #[must_use]
    pub fn strip_versions(&self) -> Self {
        self.map_types(&|sig| sig.strip_versions())
    }

    /// Returns a copy with every contained type signature rewritten through `f`.
    #[must_use]
    pub fn map_types(&self, f: &impl Fn(&TypeSig) -> TypeSig) -> Self {
        MethodSig {
            has_this: self.has_this,
            generic_arity: self.generic_arity,
            return_type: f(&self.return_type),
            params: self.params.iter().map(f).collect(),
        }
    }
}

impl fmt::Display for MethodSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ")")
    }
}

/// A property signature: the property type plus indexer parameters, if any.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertySig {
    /// Whether the accessors take an implicit `this`
    pub has_this: bool,
    /// The type of the property value
    pub property_type: TypeSig,
    /// Indexer parameter types, empty for plain properties
    pub params: Vec<TypeSig>,
}

impl PropertySig {
    /// Creates a plain (non-indexer) instance property signature.
    #[must_use]
    pub fn instance(property_type: TypeSig) -> Self {
        PropertySig {
            has_this: true,
            property_type,
            params: Vec::new(),
        }
    }

    /// Returns a copy with every assembly version erased.
    #[must_use]
    pub fn strip_versions(&self) -> Self {
        PropertySig {
            has_this: self.has_this,
            property_type: self.property_type.strip_versions(),
            params: self.params.iter().map(TypeSig::strip_versions).collect(),
        }
    }
}

/// The signature carried by a member reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberRefSig {
    /// A method reference signature
    Method(MethodSig),
    /// A field reference signature (the field type)
    Field(TypeSig),
}

impl MemberRefSig {
    /// Returns a copy with every assembly version erased.
    #[must_use]
    pub fn strip_versions(&self) -> Self {
        match self {
            MemberRefSig::Method(sig) => MemberRefSig::Method(sig.strip_versions()),
            MemberRefSig::Field(sig) => MemberRefSig::Field(sig.strip_versions()),
        }
    }
}

/// A reference to a member of some (possibly foreign) type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberRef {
    /// The type declaring the referenced member
    pub parent: TypeRefPath,
    /// Member name
    pub name: String,
    /// The reference signature
    pub signature: MemberRefSig,
}

impl MemberRef {
    /// Creates a method reference.
    #[must_use]
    pub fn method(parent: TypeRefPath, name: impl Into<String>, sig: MethodSig) -> Self {
        MemberRef {
            parent,
            name: name.into(),
            signature: MemberRefSig::Method(sig),
        }
    }

    /// Creates a field reference.
    #[must_use]
    pub fn field(parent: TypeRefPath, name: impl Into<String>, field_type: TypeSig) -> Self {
        MemberRef {
            parent,
            name: name.into(),
            signature: MemberRefSig::Field(field_type),
        }
    }

    /// Returns a copy with every assembly version erased.
    #[must_use]
    pub fn strip_versions(&self) -> Self {
        MemberRef {
            parent: self.parent.strip_versions(),
            name: self.name.clone(),
            signature: self.signature.strip_versions(),
        }
    }
}

impl fmt::Display for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.signature {
            MemberRefSig::Method(sig) => write!(f, "{}::{}{}", self.parent, self.name, sig),
            MemberRefSig::Field(_) => write!(f, "{}::{}", self.parent, self.name),
        }
    }
}
