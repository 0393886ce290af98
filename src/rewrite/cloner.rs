//! Structural cloning of definitions across assemblies.
//!
//! [`MemberCloner`] deep-copies definition shells from one assembly into
//! another, re-importing every contained reference through a
//! [`RedirectImporter`] so that nothing in the clone aliases the source graph.
//! Bodies are not cloned; the reference processor installs throw stubs where
//! the source had a body.

use std::collections::HashMap;

use crate::metadata::attributes::SecurityDecl;
use crate::metadata::types::{
    AsmId, AssemblySet, EventDef, EventId, FieldDef, FieldId, MethodDef, MethodId, ParamDef,
    PropertyDef, PropertyId, TypeDef, TypeId,
};
use crate::rewrite::importer::RedirectImporter;

/// Clones definitions through a redirecting importer.
#[derive(Debug)]
pub struct MemberCloner<'a> {
    importer: &'a RedirectImporter,
}

impl<'a> MemberCloner<'a> {
    /// Creates a cloner over the given importer.
    #[must_use]
    pub fn new(importer: &'a RedirectImporter) -> Self {
        MemberCloner { importer }
    }

    /// Clones a type shell into `assembly`: flags, base type, interfaces,
    /// generic parameters, override records and attributes, but no members.
    ///
    /// The clone is not linked anywhere; the caller attaches it to its
    /// declaring type or the assembly's top-level list.
    pub fn clone_type_shell(
        &self,
        set: &mut AssemblySet,
        source: TypeId,
        assembly: AsmId,
    ) -> TypeId {
        let def = set.type_def(source);
        let cloned = TypeDef {
            assembly,
            namespace: def.namespace.clone(),
            name: def.name.clone(),
            flags: def.flags,
            base_type: def.base_type.as_ref().map(|b| self.importer.import_sig(b)),
            interfaces: def
                .interfaces
                .iter()
                .map(|i| self.importer.import_sig(i))
                .collect(),
            declaring_type: None,
            nested_types: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
            events: Vec::new(),
            generic_params: def
                .generic_params
                .iter()
                .map(|p| self.importer.import_generic_param(p))
                .collect(),
            method_impls: def
                .method_impls
                .iter()
                .map(|m| self.importer.import_method_impl(m))
                .collect(),
            custom_attributes: def
                .custom_attributes
                .iter()
                .map(|a| self.importer.import_attribute(a))
                .collect(),
            security_decls: self.clone_security(&def.security_decls),
        };
        set.push_type(cloned)
    }

    fn clone_security(&self, decls: &[SecurityDecl]) -> Vec<SecurityDecl> {
        decls
            .iter()
            .map(|decl| SecurityDecl {
                action: decl.action,
                permissions: decl
                    .permissions
                    .iter()
                    .map(|a| self.importer.import_attribute(a))
                    .collect(),
            })
            .collect()
    }

    /// Clones a method into `declaring`, without a body.
    pub fn clone_method(
        &self,
        set: &mut AssemblySet,
        source: MethodId,
        declaring: TypeId,
    ) -> MethodId {
        let def = set.method_def(source);
        let cloned = MethodDef {
            declaring_type: declaring,
            name: def.name.clone(),
            flags: def.flags,
            signature: self.importer.import_method_sig(&def.signature),
            params: def
                .params
                .iter()
                .map(|p| ParamDef {
                    name: p.name.clone(),
                    default: p.default.clone(),
                })
                .collect(),
            generic_params: def
                .generic_params
                .iter()
                .map(|p| self.importer.import_generic_param(p))
                .collect(),
            body: None,
            custom_attributes: def
                .custom_attributes
                .iter()
                .map(|a| self.importer.import_attribute(a))
                .collect(),
            security_decls: self.clone_security(&def.security_decls),
        };
        let id = set.push_method(cloned);
        set.type_def_mut(declaring).methods.push(id);
        id
    }

    /// Clones a field into `declaring`, constant included.
    pub fn clone_field(&self, set: &mut AssemblySet, source: FieldId, declaring: TypeId) -> FieldId {
        let def = set.field_def(source);
        let cloned = FieldDef {
            declaring_type: declaring,
            name: def.name.clone(),
            flags: def.flags,
            signature: self.importer.import_sig(&def.signature),
            constant: def.constant.clone(),
            custom_attributes: def
                .custom_attributes
                .iter()
                .map(|a| self.importer.import_attribute(a))
                .collect(),
        };
        let id = set.push_field(cloned);
        set.type_def_mut(declaring).fields.push(id);
        id
    }

    /// Clones a property into `declaring`, re-pointing its accessor links
    /// through `cloned_methods`. Accessors without a cloned counterpart are
    /// dropped from the clone.
    pub fn clone_property(
        &self,
        set: &mut AssemblySet,
        source: PropertyId,
        declaring: TypeId,
        cloned_methods: &HashMap<MethodId, MethodId>,
    ) -> PropertyId {
        let def = set.property_def(source);
        let cloned = PropertyDef {
            declaring_type: declaring,
            name: def.name.clone(),
            signature: self.importer.import_property_sig(&def.signature),
            getter: def.getter.and_then(|m| cloned_methods.get(&m).copied()),
            setter: def.setter.and_then(|m| cloned_methods.get(&m).copied()),
            custom_attributes: def
                .custom_attributes
                .iter()
                .map(|a| self.importer.import_attribute(a))
                .collect(),
        };
        let id = set.push_property(cloned);
        set.type_def_mut(declaring).properties.push(id);
        id
    }

    /// Clones an event into `declaring`, re-pointing its accessor links
    /// through `cloned_methods`.
    pub fn clone_event(
        &self,
        set: &mut AssemblySet,
        source: EventId,
        declaring: TypeId,
        cloned_methods: &HashMap<MethodId, MethodId>,
    ) -> EventId {
        let def = set.event_def(source);
        let cloned = EventDef {
            declaring_type: declaring,
            name: def.name.clone(),
            event_type: self.importer.import_sig(&def.event_type),
            adder: def.adder.and_then(|m| cloned_methods.get(&m).copied()),
            remover: def.remover.and_then(|m| cloned_methods.get(&m).copied()),
            custom_attributes: def
                .custom_attributes
                .iter()
                .map(|a| self.importer.import_attribute(a))
                .collect(),
        };
        let id = set.push_event(cloned);
        set.type_def_mut(declaring).events.push(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::builder::{AssemblyBuilder, MethodBuilder, TypeBuilder};
    use crate::metadata::identity::{AssemblyName, Version};
    use crate::metadata::signatures::{MethodSig, Primitive, TypeRefPath, TypeSig};

    #[test]
    fn test_clone_type_shell_reimports_references() {
        let mut set = AssemblySet::new();
        let shim = AssemblyBuilder::new("Shim", Version::new(1, 0, 0, 0)).build(&mut set);
        let target = AssemblyBuilder::new("Contoso.Core", Version::new(2, 0, 0, 0)).build(&mut set);

        let iface = TypeSig::Named(TypeRefPath::new(
            AssemblyName::unversioned("Shim"),
            "Contoso",
            "IWidget",
        ));
        let source = TypeBuilder::new(shim, "Contoso", "Widget")
            .implements(iface)
            .build(&mut set);

        let mut importer = RedirectImporter::new();
        importer.redirect_assembly(
            &AssemblyName::unversioned("Shim"),
            AssemblyName::unversioned("Contoso.Core"),
        );
        let cloner = MemberCloner::new(&importer);

        let cloned = cloner.clone_type_shell(&mut set, source, target);
        let def = set.type_def(cloned);
        assert_eq!(def.assembly, target);
        assert!(def.methods.is_empty());
        match &def.interfaces[0] {
            TypeSig::Named(path) => assert_eq!(path.assembly.name, "Contoso.Core"),
            other => panic!("unexpected interface {other:?}"),
        }
        // the clone is detached until the caller links it
        assert!(!set.assembly(target).types.contains(&cloned));
    }

    #[test]
    fn test_clone_method_copies_params_and_security() {
        use crate::metadata::attributes::{CustomAttribute, SecurityAction};
        use crate::metadata::types::{Constant, ParamDef};

        let mut set = AssemblySet::new();
        let shim = AssemblyBuilder::new("Shim", Version::new(1, 0, 0, 0)).build(&mut set);
        let target = AssemblyBuilder::new("Contoso.Core", Version::new(2, 0, 0, 0)).build(&mut set);
        let source_type = TypeBuilder::new(shim, "Contoso", "Widget").build(&mut set);
        let source = MethodBuilder::new(
            source_type,
            "Frob",
            MethodSig::instance(
                TypeSig::Primitive(Primitive::Void),
                vec![TypeSig::Primitive(Primitive::I4)],
            ),
        )
        .params(vec![ParamDef {
            name: "count".into(),
            default: Some(Constant::I4(7)),
        }])
        .build(&mut set);
        let permission = CustomAttribute::new(
            TypeRefPath::new(
                AssemblyName::unversioned("Shim"),
                "System.Security.Permissions",
                "SecurityPermissionAttribute",
            ),
            Vec::new(),
        );
        set.method_def_mut(source).security_decls.push(SecurityDecl {
            action: SecurityAction::LinkDemand,
            permissions: vec![permission],
        });
        let into = TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);

        let mut importer = RedirectImporter::new();
        importer.redirect_assembly(
            &AssemblyName::unversioned("Shim"),
            AssemblyName::unversioned("Contoso.Core"),
        );
        let cloned = MemberCloner::new(&importer).clone_method(&mut set, source, into);

        let def = set.method_def(cloned);
        assert_eq!(def.params[0].name, "count");
        assert_eq!(def.params[0].default, Some(Constant::I4(7)));
        assert_eq!(def.security_decls[0].action, SecurityAction::LinkDemand);
        // the permission's constructor reference is re-imported, not aliased
        assert_eq!(
            def.security_decls[0].permissions[0].ctor.parent.assembly.name,
            "Contoso.Core"
        );
    }

    #[test]
    fn test_clone_method_has_no_body() {
        let mut set = AssemblySet::new();
        let shim = AssemblyBuilder::new("Shim", Version::new(1, 0, 0, 0)).build(&mut set);
        let target = AssemblyBuilder::new("Contoso.Core", Version::new(2, 0, 0, 0)).build(&mut set);
        let source_type = TypeBuilder::new(shim, "Contoso", "Widget").build(&mut set);
        let source = MethodBuilder::new(
            source_type,
            "Frob",
            MethodSig::instance(TypeSig::Primitive(Primitive::Void), Vec::new()),
        )
        .build(&mut set);
        let into = TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);

        let importer = RedirectImporter::new();
        let cloned = MemberCloner::new(&importer).clone_method(&mut set, source, into);

        assert!(set.method_def(cloned).body.is_none());
        assert!(set.type_def(into).methods.contains(&cloned));
        assert_eq!(set.method_def(cloned).name, "Frob");
    }
}
