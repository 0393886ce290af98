//! Accessibility decoding and the visibility lattice.
//!
//! Raw flag words encode accessibility in three different shapes (type
//! visibility bits, method member-access bits, field access bits). This module
//! folds all of them into one [`Accessibility`] lattice so that rules can
//! compare visibility across member kinds, merge property and event accessor
//! pairs, and decide external visibility along nesting chains.

use crate::metadata::types::{
    AssemblySet, FieldFlags, MemberId, MethodFlags, TypeId, TypeVisibility,
};

/// Declaration accessibility, ordered from most to least restrictive.
///
/// `Protected` and `Internal` are not strictly comparable in the language;
/// the derived order places `Internal` below `Protected` and comparisons that
/// must be exact go through [`Accessibility::normalize`] first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
pub enum Accessibility {
    /// `private`
    #[strum(serialize = "private")]
    Private,
    /// `private protected`
    #[strum(serialize = "private protected")]
    ProtectedAndInternal,
    /// `internal`
    #[strum(serialize = "internal")]
    Internal,
    /// `protected`
    #[strum(serialize = "protected")]
    Protected,
    /// `protected internal`
    #[strum(serialize = "protected internal")]
    ProtectedOrInternal,
    /// `public`
    #[strum(serialize = "public")]
    Public,
}

impl Accessibility {
    /// Collapses the lattice onto what matters outside the assembly:
    /// `protected internal` degrades to `protected`, `internal` and
    /// `private protected` degrade to `private`.
    ///
    /// Visibility-reduction checks compare normalized values so that an
    /// `internal`-to-`private` change, invisible to external consumers, is
    /// not reported.
    #[must_use]
    pub fn normalize(self) -> Self {
        match self {
            Accessibility::ProtectedOrInternal => Accessibility::Protected,
            Accessibility::ProtectedAndInternal | Accessibility::Internal => Accessibility::Private,
            other => other,
        }
    }

    /// Merges two accessor accessibilities into the accessibility of the
    /// containing property or event.
    ///
    /// The merge is the maximum of the two, except that a `protected` accessor
    /// paired with an `internal` one yields `protected internal`.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Accessibility::Protected, Accessibility::Internal)
            | (Accessibility::Internal, Accessibility::Protected) => {
                Accessibility::ProtectedOrInternal
            }
            (a, b) => a.max(b),
        }
    }

    /// Whether a declaration with this accessibility can be seen from outside
    /// its assembly, assuming every enclosing scope is visible.
    ///
    /// For `protected` members this is an approximation; the full rule also
    /// considers whether the declaring type is effectively sealed, see
    /// [`is_member_visible_outside`].
    #[must_use]
    pub fn is_visible_outside(self) -> bool {
        matches!(
            self,
            Accessibility::Public | Accessibility::Protected | Accessibility::ProtectedOrInternal
        )
    }
}

impl From<TypeVisibility> for Accessibility {
    fn from(visibility: TypeVisibility) -> Self {
        match visibility {
            TypeVisibility::Public | TypeVisibility::NestedPublic => Accessibility::Public,
            TypeVisibility::NotPublic | TypeVisibility::NestedAssembly => Accessibility::Internal,
            TypeVisibility::NestedPrivate => Accessibility::Private,
            TypeVisibility::NestedFamily => Accessibility::Protected,
            TypeVisibility::NestedFamAndAssem => Accessibility::ProtectedAndInternal,
            TypeVisibility::NestedFamOrAssem => Accessibility::ProtectedOrInternal,
        }
    }
}

impl MethodFlags {
    /// Decodes the member-access bits.
    #[must_use]
    pub fn access(&self) -> Accessibility {
        match self.bits() & MethodFlags::MEMBER_ACCESS_MASK.bits() {
            0x2 => Accessibility::ProtectedAndInternal,
            0x3 => Accessibility::Internal,
            0x4 => Accessibility::Protected,
            0x5 => Accessibility::ProtectedOrInternal,
            0x6 => Accessibility::Public,
            _ => Accessibility::Private,
        }
    }
}

impl FieldFlags {
    /// Decodes the field-access bits.
    #[must_use]
    pub fn access(&self) -> Accessibility {
        match self.bits() & FieldFlags::FIELD_ACCESS_MASK.bits() {
            0x2 => Accessibility::ProtectedAndInternal,
            0x3 => Accessibility::Internal,
            0x4 => Accessibility::Protected,
            0x5 => Accessibility::ProtectedOrInternal,
            0x6 => Accessibility::Public,
            _ => Accessibility::Private,
        }
    }
}

/// Declared accessibility of a type, ignoring its nesting chain.
#[must_use]
pub fn type_access(set: &AssemblySet, id: TypeId) -> Accessibility {
    set.type_def(id).flags.visibility().into()
}

/// Declared accessibility of a member.
///
/// Properties and events take the merge of their accessor accessibilities;
/// absent accessors do not contribute.
#[must_use]
pub fn member_access(set: &AssemblySet, member: MemberId) -> Accessibility {
    match member {
        MemberId::Type(id) => type_access(set, id),
        MemberId::Method(id) => set.method_def(id).flags.access(),
        MemberId::Field(id) => set.field_def(id).flags.access(),
        MemberId::Property(id) => {
            let property = set.property_def(id);
            accessor_merge(set, property.getter, property.setter)
        }
        MemberId::Event(id) => {
            let event = set.event_def(id);
            accessor_merge(set, event.adder, event.remover)
        }
    }
}

/// Whether a type, sealed-or-not aside, can be subclassed by external code:
/// the sealed flag is absent and at least one instance constructor is
/// visible from outside the assembly.
///
/// A type with only internal constructors is as closed to external derivation
/// as a sealed one; several rules treat the two identically.
#[must_use]
pub fn is_effectively_sealed(set: &AssemblySet, id: TypeId) -> bool {
    let def = set.type_def(id);
    if def.flags.contains(crate::metadata::types::TypeFlags::SEALED) {
        return true;
    }
    !def.methods.iter().any(|&method| {
        let m = set.method_def(method);
        m.is_constructor()
            && !m.is_static()
            && member_visible(set, MemberId::Method(method), true)
    })
}

/// Whether a member is visible from outside its assembly.
///
/// `protected` and `protected internal` members only count as visible when
/// the declaring type is open to external derivation; everything else follows
/// the accessibility directly.
#[must_use]
pub fn is_member_visible_outside(set: &AssemblySet, member: MemberId) -> bool {
    member_visible(set, member, false)
}

fn member_visible(set: &AssemblySet, member: MemberId, include_effectively_private: bool) -> bool {
    let declaring_open = || {
        include_effectively_private
            || set
                .declaring_type(member)
                .map_or(true, |declaring| !is_effectively_sealed(set, declaring))
    };
    match member_access(set, member) {
        Accessibility::Public => true,
        Accessibility::Protected | Accessibility::ProtectedOrInternal => declaring_open(),
        Accessibility::Private
        | Accessibility::Internal
        | Accessibility::ProtectedAndInternal => false,
    }
}

/// Whether a type is visible from outside its assembly, walking the full
/// nesting chain.
#[must_use]
pub fn is_type_visible_outside(set: &AssemblySet, id: TypeId) -> bool {
    let mut current = Some(id);
    while let Some(type_id) = current {
        if !type_access(set, type_id).is_visible_outside() {
            return false;
        }
        current = set.type_def(type_id).declaring_type;
    }
    true
}

fn accessor_merge(
    set: &AssemblySet,
    first: Option<crate::metadata::types::MethodId>,
    second: Option<crate::metadata::types::MethodId>,
) -> Accessibility {
    let access = |id: crate::metadata::types::MethodId| set.method_def(id).flags.access();
    match (first, second) {
        (Some(a), Some(b)) => access(a).merge(access(b)),
        (Some(a), None) => access(a),
        (None, Some(b)) => access(b),
        (None, None) => Accessibility::Private,
    }
}
