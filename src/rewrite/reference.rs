//! Reference-surface materialization.
//!
//! [`ReferenceProcessor`] rewrites the target assembly into the *reference
//! surface* consumers compile against: every shim declaration is cloned into
//! the target under its target identity, replaced types give way to their
//! shims, and every method body in the module is reduced to the canonical
//! throw stub. The result carries no executable code, only the declared
//! surface.

use std::collections::HashMap;

use crate::metadata::body::MethodBody;
use crate::metadata::signatures::MemberRefSig;
use crate::metadata::types::{AsmId, AssemblySet, FieldDef, FieldFlags, MethodFlags, TypeId};
use crate::metadata::visibility::is_type_visible_outside;
use crate::rewrite::cloner::MemberCloner;
use crate::rewrite::importer::RedirectImporter;
use crate::shim::{RenameData, ShimFieldSource, ShimModel, ShimTypeKind};
use crate::{Error, Result};

/// Materializes a shim model into the target assembly's reference surface.
#[derive(Debug)]
pub struct ReferenceProcessor;

impl ReferenceProcessor {
    /// Rewrites `reference` (the target assembly) in place.
    ///
    /// Shim declarations land under their target identities with their
    /// references redirected into the target assembly; `Replace` shims detach
    /// the existing definition first. Extension shims attach their members to
    /// the existing target type. Member renames are applied in reverse so the
    /// surface exposes the names the target had before the rename.
    ///
    /// # Errors
    /// - an internal error when `reference` is not the model's target assembly
    /// - [`Error::UnresolvedType`] / [`Error::UnresolvedMember`] /
    ///   [`Error::AmbiguousMember`] when a rename or nesting attachment cannot
    ///   be resolved
    pub fn process(set: &mut AssemblySet, model: &ShimModel, reference: AsmId) -> Result<()> {
        if model.target != reference {
            return Err(invalid_error!(
                "shim model targets assembly '{}', not '{}'",
                set.assembly(model.target).name,
                set.assembly(reference).name
            ));
        }

        let mut importer = RedirectImporter::new();
        importer.redirect_assembly(
            &set.assembly(model.shim).name.clone(),
            set.assembly(reference).name.clone(),
        );
        for type_model in &model.all_types {
            if type_model.kind == ShimTypeKind::Replace {
                importer.redirect_type(
                    &set.type_ref(type_model.definition),
                    type_model.target.clone(),
                );
            }
        }

        apply_renames_reversed(set, model)?;

        let cloner = MemberCloner::new(&importer);
        // shim model index to the shell materialized for it, for nesting
        let mut materialized: HashMap<usize, TypeId> = HashMap::new();

        for (index, type_model) in model.all_types.iter().enumerate() {
            let mut target_type = set
                .try_resolve_type(&type_model.target)
                .filter(|&id| is_type_visible_outside(set, id));

            if type_model.kind == ShimTypeKind::Replace {
                if let Some(existing) = target_type.take() {
                    detach_type(set, existing);
                }
            }

            let target_type = match target_type {
                Some(existing) => existing,
                None => {
                    let cloned = cloner.clone_type_shell(set, type_model.definition, reference);
                    {
                        let def = set.type_def_mut(cloned);
                        def.namespace = type_model.target.namespace.clone();
                        def.name = type_model.target.name.clone();
                    }
                    match &type_model.target.declaring {
                        Some(parent) => {
                            let declaring = match type_model
                                .declaring
                                .and_then(|d| materialized.get(&d).copied())
                            {
                                Some(shell) => shell,
                                None => set.resolve_type(parent)?,
                            };
                            set.type_def_mut(cloned).declaring_type = Some(declaring);
                            set.type_def_mut(declaring).nested_types.push(cloned);
                        }
                        None => set.assembly_mut(reference).types.push(cloned),
                    }
                    materialized.insert(index, cloned);
                    cloned
                }
            };

            let mut cloned_methods = HashMap::new();

            for method_model in type_model.methods() {
                let MemberRefSig::Method(target_sig) = &method_model.target.signature else {
                    unreachable!("method shim targets carry method signatures")
                };
                let signature = importer.import_method_sig(target_sig);
                let had_body = set.method_def(method_model.definition).body.is_some();

                let cloned = cloner.clone_method(set, method_model.definition, target_type);
                let def = set.method_def_mut(cloned);
                def.name = method_model.target.name.clone();
                if signature.has_this {
                    def.flags.remove(MethodFlags::STATIC);
                }
                def.signature = signature;
                if def.name == ".ctor" {
                    def.flags
                        .insert(MethodFlags::SPECIAL_NAME | MethodFlags::RT_SPECIAL_NAME);
                }
                if had_body {
                    def.body = Some(MethodBody::throw_stub());
                }
                cloned_methods.insert(method_model.definition, cloned);
            }

            for field_model in type_model.fields() {
                let MemberRefSig::Field(field_type) = &field_model.target.signature else {
                    unreachable!("field shim targets carry field signatures")
                };
                let signature = importer.import_sig(field_type);
                match field_model.source {
                    ShimFieldSource::Field(source) => {
                        let cloned = cloner.clone_field(set, source, target_type);
                        let def = set.field_def_mut(cloned);
                        def.name = field_model.target.name.clone();
                        def.signature = signature;
                    }
                    ShimFieldSource::Property(source) => {
                        let mut flags = FieldFlags::PUBLIC;
                        if set.property_def(source).setter.is_none() {
                            flags |= FieldFlags::INIT_ONLY;
                        }
                        let id = set.push_field(FieldDef {
                            declaring_type: target_type,
                            name: field_model.target.name.clone(),
                            flags,
                            signature,
                            constant: None,
                            custom_attributes: Vec::new(),
                        });
                        set.type_def_mut(target_type).fields.push(id);
                    }
                }
            }

            for property in type_model.properties() {
                cloner.clone_property(set, property, target_type, &cloned_methods);
            }
            for event in type_model.events() {
                cloner.clone_event(set, event, target_type, &cloned_methods);
            }
        }

        strip_bodies(set, reference);
        Ok(())
    }
}

/// Applies the model's member renames in reverse: a target method carrying the
/// new name gets its old name back, so the reference surface matches what
/// consumers were compiled against.
fn apply_renames_reversed(set: &mut AssemblySet, model: &ShimModel) -> Result<()> {
    for rename in &model.renames {
        let RenameData::Member {
            target,
            member,
            new_member,
        } = rename
        else {
            continue;
        };
        let type_id = set
            .try_resolve_sig(target)
            .ok_or_else(|| Error::UnresolvedType(target.to_string()))?;

        // TODO apply renames to fields and properties as well
        let matches: Vec<_> = set
            .type_def(type_id)
            .methods
            .iter()
            .copied()
            .filter(|&method| set.method_def(method).name == *new_member)
            .collect();
        match matches.as_slice() {
            [method] => set.method_def_mut(*method).name = member.clone(),
            [] => {
                return Err(Error::UnresolvedMember(format!(
                    "{}.{new_member}",
                    set.type_full_name(type_id)
                )))
            }
            _ => {
                return Err(Error::AmbiguousMember(format!(
                    "{}.{new_member}",
                    set.type_full_name(type_id)
                )))
            }
        }
    }
    Ok(())
}

/// Unlinks a type from its declaring type or the assembly's top-level list.
/// The definition stays in the arena; nothing resolves to it afterwards.
fn detach_type(set: &mut AssemblySet, id: TypeId) {
    match set.type_def(id).declaring_type {
        Some(parent) => set.type_def_mut(parent).nested_types.retain(|&t| t != id),
        None => {
            let assembly = set.type_def(id).assembly;
            set.assembly_mut(assembly).types.retain(|&t| t != id);
        }
    }
}

/// Replaces every method body in the assembly with the throw stub. Methods
/// without a body (abstract, external) are left alone.
fn strip_bodies(set: &mut AssemblySet, assembly: AsmId) {
    for type_id in set.all_types(assembly) {
        for method in set.type_def(type_id).methods.clone() {
            let def = set.method_def_mut(method);
            if def.body.is_some() {
                def.body = Some(MethodBody::throw_stub());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::attributes::AttrValue;
    use crate::metadata::body::OpCode;
    use crate::metadata::builder::{
        AssemblyBuilder, FieldBuilder, MethodBuilder, PropertyBuilder, TypeBuilder,
    };
    use crate::metadata::identity::Version;
    use crate::metadata::signatures::{
        MethodSig, Primitive, PropertySig, TypeRefPath, TypeSig,
    };
    use crate::metadata::visibility::Accessibility;
    use crate::test::{marker, shim_pair};

    fn widget_sig(set: &AssemblySet, target: AsmId) -> TypeSig {
        TypeSig::Named(TypeRefPath::new(
            set.assembly(target).name.clone(),
            "Contoso",
            "Widget",
        ))
    }

    #[test]
    fn test_replace_detaches_old_type_and_materializes_shim() {
        let mut set = AssemblySet::new();
        let (target, shim) = shim_pair(&mut set);
        let old = TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);
        let shim_widget = TypeBuilder::new(shim, "Contoso", "Widget")
            .attribute(marker(
                "ReplaceAttribute",
                vec![AttrValue::Type(widget_sig(&set, target))],
            ))
            .build(&mut set);
        MethodBuilder::new(
            shim_widget,
            "Frob",
            MethodSig::instance(TypeSig::Primitive(Primitive::I4), Vec::new()),
        )
        .body(MethodBody::default())
        .build(&mut set);

        let model = ShimModel::from_assembly(&set, shim).unwrap();
        ReferenceProcessor::process(&mut set, &model, target).unwrap();

        assert!(!set.assembly(target).types.contains(&old));
        assert_eq!(set.assembly(target).types.len(), 1);
        let new_widget = set.assembly(target).types[0];
        assert_eq!(set.type_full_name(new_widget), "Contoso.Widget");
        assert_eq!(set.type_def(new_widget).assembly, target);

        let frob = set.type_def(new_widget).methods[0];
        let def = set.method_def(frob);
        assert_eq!(def.name, "Frob");
        let body = def.body.as_ref().unwrap();
        assert_eq!(body.instructions[0].opcode, OpCode::Ldnull);
        assert_eq!(body.instructions[1].opcode, OpCode::Throw);
    }

    #[test]
    fn test_constructor_shim_becomes_runtime_special_ctor() {
        let mut set = AssemblySet::new();
        let (target, shim) = shim_pair(&mut set);
        TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);
        let shim_widget = TypeBuilder::new(shim, "Contoso", "Widget")
            .attribute(marker(
                "ReplaceAttribute",
                vec![AttrValue::Type(widget_sig(&set, target))],
            ))
            .build(&mut set);
        MethodBuilder::new(
            shim_widget,
            "Create",
            MethodSig::stat(
                widget_sig(&set, target),
                vec![TypeSig::Primitive(Primitive::I4)],
            ),
        )
        .attribute(marker("ConstructorAttribute", Vec::new()))
        .build(&mut set);

        let model = ShimModel::from_assembly(&set, shim).unwrap();
        ReferenceProcessor::process(&mut set, &model, target).unwrap();

        let widget = set.assembly(target).types[0];
        let ctor = set.type_def(widget).methods[0];
        let def = set.method_def(ctor);
        assert_eq!(def.name, ".ctor");
        assert!(def
            .flags
            .contains(MethodFlags::SPECIAL_NAME | MethodFlags::RT_SPECIAL_NAME));
        assert!(!def.is_static());
        assert!(def.signature.has_this);
        assert_eq!(def.signature.params, vec![TypeSig::Primitive(Primitive::I4)]);
    }

    #[test]
    fn test_field_shimmed_property_materializes_as_field() {
        let mut set = AssemblySet::new();
        let (target, shim) = shim_pair(&mut set);
        TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);
        let shim_widget = TypeBuilder::new(shim, "Contoso", "Widget")
            .attribute(marker(
                "ReplaceAttribute",
                vec![AttrValue::Type(widget_sig(&set, target))],
            ))
            .build(&mut set);
        PropertyBuilder::new(
            shim_widget,
            "Size",
            PropertySig::instance(TypeSig::Primitive(Primitive::I4)),
        )
        .getter(Accessibility::Public)
        .attribute(marker("FieldAttribute", Vec::new()))
        .build(&mut set);

        let model = ShimModel::from_assembly(&set, shim).unwrap();
        ReferenceProcessor::process(&mut set, &model, target).unwrap();

        let widget = set.assembly(target).types[0];
        let def = set.type_def(widget);
        assert_eq!(def.fields.len(), 1);
        let field = set.field_def(def.fields[0]);
        assert_eq!(field.name, "Size");
        // getter only, so the surface field is read-only
        assert!(field.flags.contains(FieldFlags::PUBLIC | FieldFlags::INIT_ONLY));
        // the consumed accessor is not materialized
        assert!(def.methods.is_empty());
    }

    #[test]
    fn test_extension_members_attach_to_existing_target() {
        let mut set = AssemblySet::new();
        let (target, shim) = shim_pair(&mut set);
        let widget = TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);
        let holder = TypeBuilder::new(shim, "Contoso", "WidgetExtensions")
            .static_type()
            .attribute(marker(
                "ExtensionAttribute",
                vec![AttrValue::Type(widget_sig(&set, target))],
            ))
            .build(&mut set);
        MethodBuilder::new(
            holder,
            "Frob",
            MethodSig::stat(
                TypeSig::Primitive(Primitive::I4),
                vec![widget_sig(&set, target)],
            ),
        )
        .build(&mut set);

        let model = ShimModel::from_assembly(&set, shim).unwrap();
        ReferenceProcessor::process(&mut set, &model, target).unwrap();

        // no shell was cloned; the member landed on the existing type
        assert_eq!(set.assembly(target).types, vec![widget]);
        assert_eq!(set.type_def(widget).methods.len(), 1);
        assert_eq!(set.method_def(set.type_def(widget).methods[0]).name, "Frob");
    }

    #[test]
    fn test_member_rename_reversed_on_reference_surface() {
        let mut set = AssemblySet::new();
        let (target, shim) = shim_pair(&mut set);
        let widget = TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);
        MethodBuilder::new(
            widget,
            "Frobnicate",
            MethodSig::instance(TypeSig::Primitive(Primitive::Void), Vec::new()),
        )
        .build(&mut set);
        let renamed = widget_sig(&set, target);
        set.assembly_mut(shim).custom_attributes.push(marker(
            "RenameAttribute",
            vec![
                AttrValue::Type(renamed),
                AttrValue::String("Frob".into()),
                AttrValue::String("Frobnicate".into()),
            ],
        ));

        let model = ShimModel::from_assembly(&set, shim).unwrap();
        ReferenceProcessor::process(&mut set, &model, target).unwrap();

        let method = set.type_def(widget).methods[0];
        assert_eq!(set.method_def(method).name, "Frob");
    }

    #[test]
    fn test_strip_replaces_every_remaining_body() {
        let mut set = AssemblySet::new();
        let (target, shim) = shim_pair(&mut set);
        let widget = TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);
        let untouched = MethodBuilder::new(
            widget,
            "Frob",
            MethodSig::instance(TypeSig::Primitive(Primitive::Void), Vec::new()),
        )
        .body(MethodBody::new(vec![]))
        .build(&mut set);
        let abstract_method = MethodBuilder::new(
            widget,
            "Quux",
            MethodSig::instance(TypeSig::Primitive(Primitive::Void), Vec::new()),
        )
        .abstract_method()
        .build(&mut set);

        let model = ShimModel::from_assembly(&set, shim).unwrap();
        ReferenceProcessor::process(&mut set, &model, target).unwrap();

        let body = set.method_def(untouched).body.as_ref().unwrap();
        assert_eq!(body.instructions[0].opcode, OpCode::Ldnull);
        assert_eq!(body.instructions[1].opcode, OpCode::Throw);
        assert!(set.method_def(abstract_method).body.is_none());
    }

    #[test]
    fn test_mismatched_reference_assembly_rejected() {
        let mut set = AssemblySet::new();
        let (target, shim) = shim_pair(&mut set);
        let other = AssemblyBuilder::new("Elsewhere", Version::new(1, 0, 0, 0)).build(&mut set);
        let _ = target;

        let model = ShimModel::from_assembly(&set, shim).unwrap();
        assert!(ReferenceProcessor::process(&mut set, &model, other).is_err());
    }
}
