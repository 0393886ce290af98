//! Source-level modifier semantics recovered from metadata flags.
//!
//! The raw flag words do not line up with what a C# author wrote: an override
//! is `virtual` in metadata, an explicit interface implementation is
//! `virtual final`, a sealed override is `virtual final` on a non-new slot.
//! The rules reason about source-level modifiers, so these predicates decode
//! the combinations the compiler actually emits.

use crate::metadata::signatures::TypeSig;
use crate::metadata::types::{
    AssemblySet, MemberId, MethodFlags, MethodId, MethodImpl, TypeFlags, TypeId,
};

/// Whether a method is the `Finalize` destructor: an instance `Finalize` on a
/// non-interface type with an override record for `System.Object::Finalize`.
#[must_use]
pub fn is_destructor(set: &AssemblySet, id: MethodId) -> bool {
    let method = set.method_def(id);
    let declaring = set.type_def(method.declaring_type);
    if declaring.is_interface() || method.is_static() || method.name != "Finalize" {
        return false;
    }
    declaring.method_impls.iter().any(|record| {
        impl_body_is(set, record, id)
            && record.declaration.name == "Finalize"
            && record.declaration.parent.namespace == "System"
            && record.declaration.parent.name == "Object"
    })
}

/// Whether a method is an explicit interface implementation: `virtual final`
/// with an override record naming it as the body.
#[must_use]
pub fn is_explicit_interface_implementation(set: &AssemblySet, id: MethodId) -> bool {
    let method = set.method_def(id);
    if !method.flags.contains(MethodFlags::VIRTUAL) || !method.flags.contains(MethodFlags::FINAL) {
        return false;
    }
    set.type_def(method.declaring_type)
        .method_impls
        .iter()
        .any(|record| impl_body_is(set, record, id))
}

/// Whether a method explicitly overrides a class (non-interface) slot through
/// an override record.
#[must_use]
pub fn is_explicit_class_override(set: &AssemblySet, id: MethodId) -> bool {
    let method = set.method_def(id);
    set.type_def(method.declaring_type)
        .method_impls
        .iter()
        .any(|record| {
            impl_body_is(set, record, id)
                && set
                    .try_resolve_type(&record.declaration.parent)
                    .map_or(false, |parent| !set.type_def(parent).is_interface())
        })
}

fn impl_body_is(set: &AssemblySet, record: &MethodImpl, id: MethodId) -> bool {
    matches!(set.resolve_member(&record.body), Ok(MemberId::Method(body)) if body == id)
}

fn is_method_override(set: &AssemblySet, id: MethodId) -> bool {
    let method = set.method_def(id);
    let declaring = set.type_def(method.declaring_type);
    if declaring.is_interface() || !method.flags.contains(MethodFlags::VIRTUAL) {
        return false;
    }
    if is_destructor(set, id) {
        return false;
    }
    (!method.flags.contains(MethodFlags::NEW_SLOT) && declaring.base_type.is_some())
        || is_explicit_class_override(set, id)
}

/// Whether a member is an override of an inherited slot.
#[must_use]
pub fn is_override(set: &AssemblySet, member: MemberId) -> bool {
    match member {
        MemberId::Type(_) | MemberId::Field(_) => false,
        MemberId::Method(id) => is_method_override(set, id),
        MemberId::Property(id) => {
            let property = set.property_def(id);
            accessor_any(property.getter, property.setter, |m| {
                is_method_override(set, m)
            })
        }
        MemberId::Event(id) => {
            let event = set.event_def(id);
            accessor_any(event.adder, event.remover, |m| is_method_override(set, m))
        }
    }
}

/// Whether a member is `abstract` in source terms.
#[must_use]
pub fn is_roslyn_abstract(set: &AssemblySet, member: MemberId) -> bool {
    match member {
        MemberId::Type(id) => {
            let flags = set.type_def(id).flags;
            flags.contains(TypeFlags::ABSTRACT) && !flags.contains(TypeFlags::SEALED)
        }
        MemberId::Method(id) => set.method_def(id).flags.contains(MethodFlags::ABSTRACT),
        MemberId::Field(_) => false,
        MemberId::Property(id) => {
            let property = set.property_def(id);
            accessor_any(property.getter, property.setter, |m| {
                set.method_def(m).flags.contains(MethodFlags::ABSTRACT)
            })
        }
        MemberId::Event(id) => {
            let event = set.event_def(id);
            accessor_any(event.adder, event.remover, |m| {
                set.method_def(m).flags.contains(MethodFlags::ABSTRACT)
            })
        }
    }
}

fn is_method_roslyn_virtual(set: &AssemblySet, id: MethodId) -> bool {
    let method = set.method_def(id);
    if !method.flags.contains(MethodFlags::VIRTUAL)
        || method.flags.contains(MethodFlags::FINAL)
        || method.flags.contains(MethodFlags::ABSTRACT)
        || is_destructor(set, id)
    {
        return false;
    }
    if set.type_def(method.declaring_type).is_interface() {
        method.is_static() || method.flags.contains(MethodFlags::NEW_SLOT)
    } else {
        !is_method_override(set, id)
    }
}

/// Whether a member is `virtual` in source terms: overridable, not an
/// override itself and not abstract.
#[must_use]
pub fn is_roslyn_virtual(set: &AssemblySet, member: MemberId) -> bool {
    match member {
        MemberId::Type(_) | MemberId::Field(_) => false,
        MemberId::Method(id) => is_method_roslyn_virtual(set, id),
        MemberId::Property(id) => {
            let property = set.property_def(id);
            !is_override(set, member)
                && !is_roslyn_abstract(set, member)
                && accessor_any(property.getter, property.setter, |m| {
                    is_method_roslyn_virtual(set, m)
                })
        }
        MemberId::Event(id) => {
            let event = set.event_def(id);
            !is_override(set, member)
                && !is_roslyn_abstract(set, member)
                && accessor_any(event.adder, event.remover, |m| {
                    is_method_roslyn_virtual(set, m)
                })
        }
    }
}

fn is_method_roslyn_sealed(set: &AssemblySet, id: MethodId) -> bool {
    let method = set.method_def(id);
    if !method.flags.contains(MethodFlags::FINAL) {
        return false;
    }
    if set.type_def(method.declaring_type).is_interface() {
        method.flags.contains(MethodFlags::ABSTRACT)
            && method.flags.contains(MethodFlags::VIRTUAL)
            && !method.flags.contains(MethodFlags::NEW_SLOT)
    } else {
        !method.flags.contains(MethodFlags::ABSTRACT) && is_method_override(set, id)
    }
}

/// Whether a member is `sealed` in source terms.
#[must_use]
pub fn is_roslyn_sealed(set: &AssemblySet, member: MemberId) -> bool {
    match member {
        MemberId::Type(id) => {
            let flags = set.type_def(id).flags;
            flags.contains(TypeFlags::SEALED) && !flags.contains(TypeFlags::ABSTRACT)
        }
        MemberId::Method(id) => is_method_roslyn_sealed(set, id),
        MemberId::Field(_) => false,
        MemberId::Property(id) => {
            // each accessor that exists must be sealed
            let property = set.property_def(id);
            property
                .getter
                .map_or(true, |m| is_method_roslyn_sealed(set, m))
                && property
                    .setter
                    .map_or(true, |m| is_method_roslyn_sealed(set, m))
        }
        MemberId::Event(id) => {
            let event = set.event_def(id);
            accessor_any(event.adder, event.remover, |m| {
                is_method_roslyn_sealed(set, m)
            })
        }
    }
}

/// Whether a method is a property or event accessor of its declaring type.
#[must_use]
pub fn is_accessor(set: &AssemblySet, id: MethodId) -> bool {
    let declaring = set.type_def(set.method_def(id).declaring_type);
    declaring.properties.iter().any(|&p| {
        let property = set.property_def(p);
        property.getter == Some(id) || property.setter == Some(id)
    }) || declaring.events.iter().any(|&e| {
        let event = set.event_def(e);
        event.adder == Some(id) || event.remover == Some(id)
    })
}

/// Whether an interface member carries a default implementation, making its
/// addition non-breaking for implementers.
#[must_use]
pub fn has_default_implementation(set: &AssemblySet, member: MemberId) -> bool {
    let has_body = |id: MethodId| {
        let method = set.method_def(id);
        !method.flags.contains(MethodFlags::ABSTRACT) && method.body.is_some()
    };
    match member {
        MemberId::Method(id) => has_body(id),
        MemberId::Property(id) => {
            let property = set.property_def(id);
            accessor_any(property.getter, property.setter, has_body)
        }
        MemberId::Event(id) => {
            let event = set.event_def(id);
            accessor_any(event.adder, event.remover, has_body)
        }
        MemberId::Type(_) | MemberId::Field(_) => false,
    }
}

/// Underlying primitive signature of an enum, read from its `value__` field.
#[must_use]
pub fn enum_underlying_type(set: &AssemblySet, id: TypeId) -> Option<TypeSig> {
    set.type_def(id)
        .fields
        .iter()
        .map(|&f| set.field_def(f))
        .find(|f| !f.is_static())
        .map(|f| f.signature.clone())
}

fn accessor_any(
    first: Option<MethodId>,
    second: Option<MethodId>,
    mut predicate: impl FnMut(MethodId) -> bool,
) -> bool {
    first.map_or(false, &mut predicate) || second.map_or(false, &mut predicate)
}
