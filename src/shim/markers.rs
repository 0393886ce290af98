//! Declarative shim marker attributes.
//!
//! A shim assembly describes itself through attributes under the reserved
//! `Unbreaker.Attributes` namespace. This module knows their full names and
//! extracts their typed payloads from decoded [`CustomAttribute`] values;
//! unexpected argument shapes surface as [`Error::MalformedMarker`].
//!
//! # Key Components
//!
//! - [`SHIM`] - Assembly-level target declaration, required exactly once
//! - [`REPLACE`] / [`EXTENSION`] / [`EXTENSIONS`] - Type-level kind markers
//! - [`FIELD`] / [`CONSTRUCTOR`] - Member-level redirection markers
//! - [`RENAME`] / [`RenameData`] - Repeatable assembly-level rename directives

use crate::metadata::attributes::{count_attributes, find_attribute, AttrValue, CustomAttribute};
use crate::metadata::signatures::TypeSig;
use crate::metadata::types::Assembly;
use crate::{Error, Result};

/// The reserved namespace all marker attributes live in.
pub const MARKER_NAMESPACE: &str = "Unbreaker.Attributes";

/// Assembly-level marker naming the target assembly. Required, exactly one.
pub const SHIM: &str = "Unbreaker.Attributes.ShimAttribute";
/// Type-level marker: this shim type replaces the target type of the same identity.
pub const REPLACE: &str = "Unbreaker.Attributes.ReplaceAttribute";
/// Type-level marker: this static type carries extension members for the given target type.
pub const EXTENSION: &str = "Unbreaker.Attributes.ExtensionAttribute";
/// Type-level marker: a purely organizational container whose nested types are
/// processed as top-level shim types.
pub const EXTENSIONS: &str = "Unbreaker.Attributes.ExtensionsAttribute";
/// Property-level marker: the property shims a field on the target type.
pub const FIELD: &str = "Unbreaker.Attributes.FieldAttribute";
/// Method-level marker: the static factory shims an instance constructor.
pub const CONSTRUCTOR: &str = "Unbreaker.Attributes.ConstructorAttribute";
/// Assembly-level, repeatable rename directive.
pub const RENAME: &str = "Unbreaker.Attributes.RenameAttribute";

/// A parsed rename directive, distinguished by the constructor argument shape
/// the attribute was applied with.
#[derive(Debug, Clone, PartialEq)]
pub enum RenameData {
    /// `Rename(namespace, newNamespace)` - every type in a namespace moves
    Namespace {
        /// The namespace being renamed
        namespace: String,
        /// Its new name
        new_namespace: String,
    },
    /// `Rename(type, newName)` - a single type is renamed
    Type {
        /// The type being renamed
        target: TypeSig,
        /// Its new simple name
        new_name: String,
    },
    /// `Rename(type, member, newMember)` - a member of a type is renamed
    Member {
        /// The type declaring the member
        target: TypeSig,
        /// The member's old name
        member: String,
        /// The member's new name
        new_member: String,
    },
}

/// Reads the required assembly-level shim marker and returns the declared
/// target assembly name.
///
/// # Errors
/// - [`Error::MissingShimMarker`] when the marker is absent
/// - [`Error::DuplicateShimMarker`] when it appears more than once
/// - [`Error::MalformedMarker`] when its argument is not a single string
pub fn shim_target(assembly: &Assembly) -> Result<String> {
    if count_attributes(&assembly.custom_attributes, SHIM) > 1 {
        return Err(Error::DuplicateShimMarker);
    }
    let attribute = find_attribute(&assembly.custom_attributes, SHIM)
        .ok_or(Error::MissingShimMarker)?;
    match attribute.fixed_args.as_slice() {
        [AttrValue::String(name)] => Ok(name.clone()),
        _ => Err(Error::MalformedMarker(SHIM.to_string())),
    }
}

/// Parses every assembly-level rename directive, in declaration order.
///
/// # Errors
/// Returns [`Error::MalformedMarker`] when a directive's argument list does
/// not match any of the known constructor shapes.
pub fn renames(assembly: &Assembly) -> Result<Vec<RenameData>> {
    assembly
        .custom_attributes
        .iter()
        .filter(|attr| attr.full_name() == RENAME)
        .map(|attr| match attr.fixed_args.as_slice() {
            [AttrValue::String(namespace), AttrValue::String(new_namespace)] => {
                Ok(RenameData::Namespace {
                    namespace: namespace.clone(),
                    new_namespace: new_namespace.clone(),
                })
            }
            [AttrValue::Type(target), AttrValue::String(new_name)] => Ok(RenameData::Type {
                target: target.clone(),
                new_name: new_name.clone(),
            }),
            [AttrValue::Type(target), AttrValue::String(member), AttrValue::String(new_member)] => {
                Ok(RenameData::Member {
                    target: target.clone(),
                    member: member.clone(),
                    new_member: new_member.clone(),
                })
            }
            _ => Err(Error::MalformedMarker(RENAME.to_string())),
        })
        .collect()
}

/// Whether an attribute list carries the marker with the given full name.
#[must_use]
pub fn has_marker(attributes: &[CustomAttribute], full_name: &str) -> bool {
    find_attribute(attributes, full_name).is_some()
}

/// Finds a marker that may appear at most once.
///
/// # Errors
/// Returns an error when the marker appears more than once.
pub fn try_find_single<'a>(
    attributes: &'a [CustomAttribute],
    full_name: &str,
) -> Result<Option<&'a CustomAttribute>> {
    match count_attributes(attributes, full_name) {
        0 => Ok(None),
        1 => Ok(find_attribute(attributes, full_name)),
        n => Err(invalid_error!("marker '{full_name}' applied {n} times, expected at most one")),
    }
}

/// Extracts the single `System.Type` argument of a type-targeting marker.
///
/// # Errors
/// Returns [`Error::MalformedMarker`] when the argument list is not a single
/// type value.
pub fn single_type_arg<'a>(attribute: &'a CustomAttribute, full_name: &str) -> Result<&'a TypeSig> {
    match attribute.fixed_args.as_slice() {
        [AttrValue::Type(sig)] => Ok(sig),
        _ => Err(Error::MalformedMarker(full_name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::identity::{AssemblyName, Version};
    use crate::metadata::signatures::TypeRefPath;

    fn marker_type(name: &str) -> TypeRefPath {
        TypeRefPath::new(AssemblyName::unversioned("Shim"), MARKER_NAMESPACE, name)
    }

    fn assembly_with(attributes: Vec<CustomAttribute>) -> Assembly {
        Assembly {
            name: AssemblyName::new("Shim", Version::new(1, 0, 0, 0)),
            types: Vec::new(),
            exported_types: Vec::new(),
            custom_attributes: attributes,
        }
    }

    #[test]
    fn test_shim_target_extraction() {
        let assembly = assembly_with(vec![CustomAttribute::new(
            marker_type("ShimAttribute"),
            vec![AttrValue::String("Contoso.Core".into())],
        )]);
        assert_eq!(shim_target(&assembly).unwrap(), "Contoso.Core");
    }

    #[test]
    fn test_shim_target_missing_and_duplicate() {
        let missing = assembly_with(Vec::new());
        assert!(matches!(
            shim_target(&missing),
            Err(Error::MissingShimMarker)
        ));

        let attr = CustomAttribute::new(
            marker_type("ShimAttribute"),
            vec![AttrValue::String("Contoso.Core".into())],
        );
        let duplicated = assembly_with(vec![attr.clone(), attr]);
        assert!(matches!(
            shim_target(&duplicated),
            Err(Error::DuplicateShimMarker)
        ));
    }

    #[test]
    fn test_rename_dispatch_by_argument_shape() {
        let target = TypeSig::Named(TypeRefPath::new(
            AssemblyName::unversioned("Contoso.Core"),
            "Contoso",
            "Widget",
        ));
        let assembly = assembly_with(vec![
            CustomAttribute::new(
                marker_type("RenameAttribute"),
                vec![
                    AttrValue::Type(target.clone()),
                    AttrValue::String("Gadget".into()),
                ],
            ),
            CustomAttribute::new(
                marker_type("RenameAttribute"),
                vec![
                    AttrValue::Type(target.clone()),
                    AttrValue::String("Frob".into()),
                    AttrValue::String("Frobnicate".into()),
                ],
            ),
        ]);

        let parsed = renames(&assembly).unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(matches!(&parsed[0], RenameData::Type { new_name, .. } if new_name == "Gadget"));
        assert!(matches!(
            &parsed[1],
            RenameData::Member { member, new_member, .. }
                if member == "Frob" && new_member == "Frobnicate"
        ));
    }

    #[test]
    fn test_rename_rejects_unknown_shape() {
        let assembly = assembly_with(vec![CustomAttribute::new(
            marker_type("RenameAttribute"),
            vec![AttrValue::I4(7)],
        )]);
        assert!(matches!(
            renames(&assembly),
            Err(Error::MalformedMarker(name)) if name == RENAME
        ));
    }
}
