//! Version-agnostic identity keys for assemblies, types and members.
//!
//! Mapping two versions of "the same" assembly requires an equality notion that
//! survives recompilation: fully-qualified names, declaring-type chains and
//! signature shapes must match while assembly version numbers are ignored.
//! The key types in this module are the normalized forms used wherever a
//! hash-map is keyed by declaration identity (element mappers, shim member
//! lookup, reference redirection).
//!
//! # Key Components
//!
//! - [`Version`] - Four-part assembly version number
//! - [`AssemblyName`] - Assembly identity (name plus optional version)
//! - [`TypeIdentity`] - Version-agnostic type key (namespace + nesting chain)
//! - [`MemberIdentity`] - Version-agnostic member key within a declaring type
//! - [`MemberKey`] - A member identity qualified by its declaring type

use std::fmt;

use crate::metadata::signatures::{MemberRef, MemberRefSig, MethodSig, PropertySig, TypeRefPath, TypeSig};
use crate::metadata::types::{AssemblySet, MemberId, TypeId};

/// A four-part assembly version number (`major.minor.build.revision`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Version {
    /// Major version component
    pub major: u16,
    /// Minor version component
    pub minor: u16,
    /// Build number component
    pub build: u16,
    /// Revision number component
    pub revision: u16,
}

impl Version {
    /// Creates a version from its four components.
    #[must_use]
    pub fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        Version {
            major,
            minor,
            build,
            revision,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// The identity of an assembly: a simple name plus an optional version.
///
/// Two assembly names compare version-agnostically through [`AssemblyName::agnostic`],
/// which erases the version component. References constructed as placeholders
/// (for example a fallback target-assembly reference) carry no version at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssemblyName {
    /// The simple name of the assembly (no extension)
    pub name: String,
    /// The declared version, if any
    pub version: Option<Version>,
}

impl AssemblyName {
    /// Creates an assembly name with a version.
    #[must_use]
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        AssemblyName {
            name: name.into(),
            version: Some(version),
        }
    }

    /// Creates an assembly name without a version (an unspecified-version placeholder).
    #[must_use]
    pub fn unversioned(name: impl Into<String>) -> Self {
        AssemblyName {
            name: name.into(),
            version: None,
        }
    }

    /// Returns a copy with the version erased, for version-agnostic keying.
    #[must_use]
    pub fn agnostic(&self) -> Self {
        AssemblyName {
            name: self.name.clone(),
            version: None,
        }
    }
}

impl fmt::Display for AssemblyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}, Version={}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A version-agnostic type key: the namespace of the outermost type plus the
/// chain of type names from outermost to innermost.
///
/// The assembly is deliberately not part of the key so that an exported-type
/// forwarder resolved into another assembly still pairs with a definition of
/// the same fully-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeIdentity {
    /// Namespace of the outermost type in the nesting chain
    pub namespace: String,
    /// Type names from outermost to innermost
    pub names: Vec<String>,
}

impl TypeIdentity {
    /// Computes the identity of a type definition.
    #[must_use]
    pub fn of_def(set: &AssemblySet, id: TypeId) -> Self {
        let mut names = Vec::new();
        let mut current = id;
        loop {
            let def = set.type_def(current);
            names.push(def.name.clone());
            match def.declaring_type {
                Some(parent) => current = parent,
                None => {
                    names.reverse();
                    return TypeIdentity {
                        namespace: def.namespace.clone(),
                        names,
                    };
                }
            }
        }
    }

    /// Computes the identity of a type reference.
    #[must_use]
    pub fn of_ref(path: &TypeRefPath) -> Self {
        let mut names = vec![path.name.clone()];
        let mut current = path.declaring.as_deref();
        let mut namespace = path.namespace.clone();
        while let Some(parent) = current {
            names.push(parent.name.clone());
            namespace = parent.namespace.clone();
            current = parent.declaring.as_deref();
        }
        names.reverse();
        TypeIdentity { namespace, names }
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.namespace.is_empty() {
            write!(f, "{}.", self.namespace)?;
        }
        write!(f, "{}", self.names.join("+"))
    }
}

/// A version-agnostic member key within the scope of a single declaring type.
///
/// Methods and fields are keyed by name and (version-stripped) signature;
/// properties include their parameter shape so that indexer overloads do not
/// collapse onto one key; events are keyed by name alone. Nested types are
/// keyed separately through [`TypeIdentity`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberIdentity {
    /// A method keyed by name and signature
    Method {
        /// Method name
        name: String,
        /// Version-stripped signature
        sig: MethodSig,
    },
    /// A field keyed by name and field type
    Field {
        /// Field name
        name: String,
        /// Version-stripped field type
        sig: TypeSig,
    },
    /// A property keyed by name and parameter shape
    Property {
        /// Property name
        name: String,
        /// Version-stripped property signature
        sig: PropertySig,
    },
    /// An event keyed by name
    Event {
        /// Event name
        name: String,
    },
}

impl MemberIdentity {
    /// Computes the identity of a member definition.
    ///
    /// # Panics
    /// Panics if called with a [`MemberId::Type`]; nested types are keyed by
    /// [`TypeIdentity`] instead.
    #[must_use]
    pub fn of_member(set: &AssemblySet, member: MemberId) -> Self {
        match member {
            MemberId::Method(id) => {
                let method = set.method_def(id);
                MemberIdentity::Method {
                    name: method.name.clone(),
                    sig: method.signature.strip_versions(),
                }
            }
            MemberId::Field(id) => {
                let field = set.field_def(id);
                MemberIdentity::Field {
                    name: field.name.clone(),
                    sig: field.signature.strip_versions(),
                }
            }
            MemberId::Property(id) => {
                let property = set.property_def(id);
                MemberIdentity::Property {
                    name: property.name.clone(),
                    sig: property.signature.strip_versions(),
                }
            }
            MemberId::Event(id) => MemberIdentity::Event {
                name: set.event_def(id).name.clone(),
            },
            MemberId::Type(_) => panic!("nested types are keyed by TypeIdentity"),
        }
    }

    /// Computes the identity of a member reference.
    #[must_use]
    pub fn of_ref(reference: &MemberRef) -> Self {
        match &reference.signature {
            MemberRefSig::Method(sig) => MemberIdentity::Method {
                name: reference.name.clone(),
                sig: sig.strip_versions(),
            },
            MemberRefSig::Field(sig) => MemberIdentity::Field {
                name: reference.name.clone(),
                sig: sig.strip_versions(),
            },
        }
    }
}

/// A member identity qualified by the identity of its declaring type.
///
/// Used when member lookups cross type boundaries, for example the consumer
/// processor's map from shimmed-surface references to shim member models.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberKey {
    /// Identity of the declaring type
    pub parent: TypeIdentity,
    /// Identity of the member within that type
    pub member: MemberIdentity,
}

impl MemberKey {
    /// Builds the key for a member definition.
    ///
    /// # Panics
    ///
    /// Panics for top-level types, which have no declaring type to key under.
    #[must_use]
    pub fn of_member(set: &AssemblySet, member: MemberId) -> Self {
        let declaring = set
            .declaring_type(member)
            .expect("member keys require a declaring type");
        MemberKey {
            parent: TypeIdentity::of_def(set, declaring),
            member: MemberIdentity::of_member(set, member),
        }
    }

    /// Builds the key for a member reference.
    #[must_use]
    pub fn of_ref(reference: &MemberRef) -> Self {
        MemberKey {
            parent: TypeIdentity::of_ref(&reference.parent),
            member: MemberIdentity::of_ref(reference),
        }
    }
}
