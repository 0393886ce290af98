//! Redirect-aware reference importing.
//!
//! When shim declarations are materialized into the target assembly, every
//! reference they carry must be re-expressed in target terms: references into
//! the shim assembly move to the target assembly, and references to a
//! replaced shim type move to the type it replaces. [`RedirectImporter`] is a
//! pure value mapper over the signature shapes; it never mutates an
//! [`crate::metadata::types::AssemblySet`].

use std::collections::HashMap;

use crate::metadata::attributes::{AttrValue, CustomAttribute, NamedArg};
use crate::metadata::identity::{AssemblyName, TypeIdentity};
use crate::metadata::signatures::{MemberRef, MemberRefSig, MethodSig, PropertySig, TypeRefPath, TypeSig};
use crate::metadata::types::{GenericParam, MethodImpl};

/// Rewrites references through substitution maps.
///
/// Type redirects take precedence over assembly redirects: a reference that
/// matches a redirected type is replaced wholesale by its mapped reference,
/// everything else keeps its shape with the assembly swapped where mapped.
#[derive(Debug, Default)]
pub struct RedirectImporter {
    assemblies: HashMap<String, AssemblyName>,
    types: HashMap<(String, TypeIdentity), TypeRefPath>,
}

fn type_key(path: &TypeRefPath) -> (String, TypeIdentity) {
    let mut root = path;
    while let Some(parent) = root.declaring.as_deref() {
        root = parent;
    }
    (
        root.assembly.name.to_ascii_lowercase(),
        TypeIdentity::of_ref(path),
    )
}

impl RedirectImporter {
    /// Creates an importer with no redirects.
    #[must_use]
    pub fn new() -> Self {
        RedirectImporter::default()
    }

    /// Redirects every reference scoped to `from` (matched by simple name,
    /// case-insensitively) onto `to`.
    pub fn redirect_assembly(&mut self, from: &AssemblyName, to: AssemblyName) {
        self.assemblies.insert(from.name.to_ascii_lowercase(), to);
    }

    /// Redirects references to one specific type onto another reference.
    pub fn redirect_type(&mut self, from: &TypeRefPath, to: TypeRefPath) {
        self.types.insert(type_key(from), to);
    }

    /// Maps an assembly name through the assembly redirects.
    #[must_use]
    pub fn import_assembly(&self, name: &AssemblyName) -> AssemblyName {
        self.assemblies
            .get(&name.name.to_ascii_lowercase())
            .cloned()
            .unwrap_or_else(|| name.clone())
    }

    /// Maps a type reference: redirected types are replaced, everything else
    /// has its assembly mapped along the whole declaring chain.
    #[must_use]
    pub fn import_path(&self, path: &TypeRefPath) -> TypeRefPath {
        if let Some(redirected) = self.types.get(&type_key(path)) {
            return redirected.clone();
        }
        TypeRefPath {
            assembly: self.import_assembly(&path.assembly),
            namespace: path.namespace.clone(),
            name: path.name.clone(),
            declaring: path
                .declaring
                .as_ref()
                .map(|parent| Box::new(self.import_path(parent))),
        }
    }

    /// Maps every named reference inside a type signature.
    #[must_use]
    pub fn import_sig(&self, sig: &TypeSig) -> TypeSig {
        sig.map_paths(&|path| self.import_path(path))
    }

    /// Maps every type signature inside a method signature.
    #[must_use]
    pub fn import_method_sig(&self, sig: &MethodSig) -> MethodSig {
        sig.map_types(&|t| self.import_sig(t))
    }

    /// Maps every type signature inside a property signature.
    #[must_use]
    pub fn import_property_sig(&self, sig: &PropertySig) -> PropertySig {
        PropertySig {
            has_this: sig.has_this,
            property_type: self.import_sig(&sig.property_type),
            params: sig.params.iter().map(|p| self.import_sig(p)).collect(),
        }
    }

    /// Maps a member reference: parent type plus the reference signature.
    #[must_use]
    pub fn import_member_ref(&self, reference: &MemberRef) -> MemberRef {
        MemberRef {
            parent: self.import_path(&reference.parent),
            name: reference.name.clone(),
            signature: match &reference.signature {
                MemberRefSig::Method(sig) => MemberRefSig::Method(self.import_method_sig(sig)),
                MemberRefSig::Field(sig) => MemberRefSig::Field(self.import_sig(sig)),
            },
        }
    }

    /// Maps an override record.
    #[must_use]
    pub fn import_method_impl(&self, record: &MethodImpl) -> MethodImpl {
        MethodImpl {
            declaration: self.import_member_ref(&record.declaration),
            body: self.import_member_ref(&record.body),
        }
    }

    /// Maps a generic parameter's constraint list.
    #[must_use]
    pub fn import_generic_param(&self, param: &GenericParam) -> GenericParam {
        GenericParam {
            name: param.name.clone(),
            flags: param.flags,
            constraints: param.constraints.iter().map(|c| self.import_sig(c)).collect(),
        }
    }

    /// Maps a custom attribute: constructor reference and any type-valued
    /// arguments.
    #[must_use]
    pub fn import_attribute(&self, attribute: &CustomAttribute) -> CustomAttribute {
        CustomAttribute {
            ctor: self.import_member_ref(&attribute.ctor),
            fixed_args: attribute
                .fixed_args
                .iter()
                .map(|value| self.import_attr_value(value))
                .collect(),
            named_args: attribute
                .named_args
                .iter()
                .map(|arg| NamedArg {
                    name: arg.name.clone(),
                    is_field: arg.is_field,
                    value: self.import_attr_value(&arg.value),
                })
                .collect(),
        }
    }

    fn import_attr_value(&self, value: &AttrValue) -> AttrValue {
        match value {
            AttrValue::Type(sig) => AttrValue::Type(self.import_sig(sig)),
            AttrValue::Array(items) => {
                AttrValue::Array(items.iter().map(|item| self.import_attr_value(item)).collect())
            }
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::signatures::Primitive;

    fn path(assembly: &str, name: &str) -> TypeRefPath {
        TypeRefPath::new(AssemblyName::unversioned(assembly), "Contoso", name)
    }

    #[test]
    fn test_assembly_redirect_applies_along_nesting_chain() {
        let mut importer = RedirectImporter::new();
        importer.redirect_assembly(
            &AssemblyName::unversioned("Shim"),
            AssemblyName::unversioned("Contoso.Core"),
        );

        let nested = path("Shim", "Outer").nested("Inner");
        let imported = importer.import_path(&nested);

        assert_eq!(imported.assembly.name, "Contoso.Core");
        assert_eq!(imported.declaring.as_ref().unwrap().assembly.name, "Contoso.Core");
        assert_eq!(imported.full_name(), "Contoso.Outer+Inner");
    }

    #[test]
    fn test_type_redirect_wins_over_assembly_redirect() {
        let mut importer = RedirectImporter::new();
        importer.redirect_assembly(
            &AssemblyName::unversioned("Shim"),
            AssemblyName::unversioned("Contoso.Core"),
        );
        importer.redirect_type(&path("Shim", "WidgetShim"), path("Contoso.Core", "Widget"));

        let sig = TypeSig::SzArray(Box::new(TypeSig::Named(path("Shim", "WidgetShim"))));
        match importer.import_sig(&sig) {
            TypeSig::SzArray(inner) => match *inner {
                TypeSig::Named(p) => {
                    assert_eq!(p.name, "Widget");
                    assert_eq!(p.assembly.name, "Contoso.Core");
                }
                other => panic!("unexpected inner {other:?}"),
            },
            other => panic!("unexpected sig {other:?}"),
        }
    }

    #[test]
    fn test_member_ref_signature_is_mapped() {
        let mut importer = RedirectImporter::new();
        importer.redirect_assembly(
            &AssemblyName::unversioned("Shim"),
            AssemblyName::unversioned("Contoso.Core"),
        );

        let reference = MemberRef::method(
            path("Shim", "Widget"),
            "Frob",
            MethodSig::instance(
                TypeSig::Primitive(Primitive::Void),
                vec![TypeSig::Named(path("Shim", "Widget"))],
            ),
        );

        let imported = importer.import_member_ref(&reference);
        assert_eq!(imported.parent.assembly.name, "Contoso.Core");
        match &imported.signature {
            MemberRefSig::Method(sig) => match &sig.params[0] {
                TypeSig::Named(p) => assert_eq!(p.assembly.name, "Contoso.Core"),
                other => panic!("unexpected param {other:?}"),
            },
            other => panic!("unexpected signature {other:?}"),
        }
    }
}
