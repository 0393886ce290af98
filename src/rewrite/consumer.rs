//! Consumer assembly rewriting.
//!
//! Consumers compile against the reference surface, so their metadata and IL
//! reference the target assembly's declared names. [`ConsumerProcessor`]
//! redirects every such reference onto the shim assembly's definitions: type
//! references move to shim types, member references to shim members, shimmed
//! field accesses become accessor calls, and renamed members get their
//! current names. Each consumer type is rewritten in two steps, a read-only
//! planning pass over the shared set followed by an apply pass that installs
//! the computed patch.

use std::collections::HashMap;

use crate::metadata::attributes::{CustomAttribute, SecurityDecl};
use crate::metadata::body::{Instruction, MethodBody, OpCode, Operand};
use crate::metadata::identity::{MemberKey, TypeIdentity};
use crate::metadata::resolver::sig_identity;
use crate::metadata::signatures::{MemberRef, MemberRefSig, MethodSig, PropertySig, TypeSig};
use crate::metadata::types::{
    AsmId, AssemblySet, EventId, FieldId, GenericParam, MemberId, MethodFlags, MethodId,
    MethodImpl, PropertyId, TypeId,
};
use crate::rewrite::importer::RedirectImporter;
use crate::shim::{RenameData, ShimFieldModel, ShimFieldSource, ShimMember, ShimModel, ShimTypeKind};
use crate::Result;

/// Rewrites consumer assemblies from the reference surface onto shim
/// definitions.
#[derive(Debug)]
pub struct ConsumerProcessor;

impl ConsumerProcessor {
    /// Rewrites every type of `consumer` in place.
    ///
    /// # Errors
    /// Returns an internal error when a shimmed field access needs an accessor
    /// the shim property does not declare.
    pub fn process(set: &mut AssemblySet, model: &ShimModel, consumer: AsmId) -> Result<()> {
        let shimmer = Shimmer::new(set, model);
        for type_id in set.all_types(consumer) {
            let patch = shimmer.plan_type(set, type_id)?;
            patch.apply(set);
        }
        Ok(())
    }
}

/// The reference-substitution state shared by all per-type passes.
struct Shimmer {
    importer: RedirectImporter,
    shim_methods: HashMap<MemberKey, MethodId>,
    shim_fields: HashMap<MemberKey, ShimFieldModel>,
    member_renames: HashMap<TypeIdentity, HashMap<String, String>>,
    extension_impls: HashMap<MethodId, MethodId>,
}

impl Shimmer {
    fn new(set: &AssemblySet, model: &ShimModel) -> Shimmer {
        let mut importer = RedirectImporter::new();
        let mut shim_methods = HashMap::new();
        let mut shim_fields = HashMap::new();
        let mut extension_impls = HashMap::new();

        for type_model in &model.all_types {
            if matches!(type_model.kind, ShimTypeKind::New | ShimTypeKind::Replace) {
                importer.redirect_type(&type_model.target, set.type_ref(type_model.definition));
            }
            for member in &type_model.members {
                match member {
                    ShimMember::Method(method_model) => {
                        shim_methods
                            .insert(MemberKey::of_ref(&method_model.target), method_model.definition);
                        let key =
                            MemberKey::of_member(set, MemberId::Method(method_model.definition));
                        if let Some(&implementation) = model.extension_implementations.get(&key) {
                            extension_impls.insert(method_model.definition, implementation);
                        }
                    }
                    ShimMember::Field(field_model) => {
                        shim_fields
                            .insert(MemberKey::of_ref(&field_model.target), field_model.clone());
                    }
                    ShimMember::Property(_) | ShimMember::Event(_) => {}
                }
            }
        }

        let mut member_renames: HashMap<TypeIdentity, HashMap<String, String>> = HashMap::new();
        for rename in &model.renames {
            if let RenameData::Member {
                target,
                member,
                new_member,
            } = rename
            {
                if let Some(identity) = sig_identity(target) {
                    member_renames
                        .entry(identity)
                        .or_default()
                        .insert(member.clone(), new_member.clone());
                }
            }
        }

        Shimmer {
            importer,
            shim_methods,
            shim_fields,
            member_renames,
            extension_impls,
        }
    }

    /// Computes the full rewrite of one consumer type against the shared set.
    fn plan_type(&self, set: &AssemblySet, type_id: TypeId) -> Result<TypePatch> {
        let def = set.type_def(type_id);
        Ok(TypePatch {
            type_id,
            base_type: def.base_type.as_ref().map(|b| self.importer.import_sig(b)),
            interfaces: def
                .interfaces
                .iter()
                .map(|i| self.importer.import_sig(i))
                .collect(),
            method_impls: def
                .method_impls
                .iter()
                .map(|record| MethodImpl {
                    declaration: self.import_method_ref(set, &record.declaration),
                    body: self.import_method_ref(set, &record.body),
                })
                .collect(),
            generic_params: def
                .generic_params
                .iter()
                .map(|p| self.importer.import_generic_param(p))
                .collect(),
            custom_attributes: def
                .custom_attributes
                .iter()
                .map(|a| self.importer.import_attribute(a))
                .collect(),
            security_decls: self.import_security(&def.security_decls),
            fields: def
                .fields
                .iter()
                .map(|&field| {
                    let f = set.field_def(field);
                    (
                        field,
                        self.importer.import_sig(&f.signature),
                        f.custom_attributes
                            .iter()
                            .map(|a| self.importer.import_attribute(a))
                            .collect(),
                    )
                })
                .collect(),
            properties: def
                .properties
                .iter()
                .map(|&property| {
                    (
                        property,
                        self.importer
                            .import_property_sig(&set.property_def(property).signature),
                    )
                })
                .collect(),
            events: def
                .events
                .iter()
                .map(|&event| (event, self.importer.import_sig(&set.event_def(event).event_type)))
                .collect(),
            methods: def
                .methods
                .iter()
                .map(|&method| self.plan_method(set, method))
                .collect::<Result<_>>()?,
        })
    }

    fn plan_method(&self, set: &AssemblySet, method: MethodId) -> Result<MethodPatch> {
        let def = set.method_def(method);

        // Overrides of a renamed virtual slot follow the rename, otherwise
        // they would stop overriding anything after the base moved.
        let mut name = def.name.clone();
        if def.flags.contains(MethodFlags::VIRTUAL) && !def.flags.contains(MethodFlags::NEW_SLOT) {
            for base in set.base_chain(def.declaring_type) {
                if let Some(renamed) = self
                    .member_renames
                    .get(&TypeIdentity::of_def(set, base))
                    .and_then(|renames| renames.get(&name))
                {
                    name = renamed.clone();
                }
            }
        }

        Ok(MethodPatch {
            method,
            name,
            signature: self.importer.import_method_sig(&def.signature),
            generic_params: def
                .generic_params
                .iter()
                .map(|p| self.importer.import_generic_param(p))
                .collect(),
            custom_attributes: def
                .custom_attributes
                .iter()
                .map(|a| self.importer.import_attribute(a))
                .collect(),
            security_decls: self.import_security(&def.security_decls),
            body: match &def.body {
                Some(body) => Some(self.rewrite_body(set, body)?),
                None => None,
            },
        })
    }

    fn import_security(&self, decls: &[SecurityDecl]) -> Vec<SecurityDecl> {
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

    fn rewrite_body(&self, set: &AssemblySet, body: &MethodBody) -> Result<MethodBody> {
        let mut body = body.clone();
        for local in &mut body.locals {
            *local = self.importer.import_sig(local);
        }
        for handler in &mut body.handlers {
            if let Some(catch_type) = &mut handler.catch_type {
                *catch_type = self.importer.import_sig(catch_type);
            }
        }
        let mut index = 0;
        while index < body.instructions.len() {
            index = self.rewrite_instruction(set, &mut body, index)?;
        }
        Ok(body)
    }

    /// Rewrites the instruction at `index` and returns the index to continue
    /// from. Spilled field-address loads advance past their inserted locals.
    fn rewrite_instruction(
        &self,
        set: &AssemblySet,
        body: &mut MethodBody,
        index: usize,
    ) -> Result<usize> {
        let opcode = body.instructions[index].opcode;
        match opcode {
            OpCode::Ldfld
            | OpCode::Ldsfld
            | OpCode::Stfld
            | OpCode::Stsfld
            | OpCode::Ldflda
            | OpCode::Ldsflda => {
                let Some(reference) = body.instructions[index].member_operand().cloned() else {
                    return Ok(index + 1);
                };
                if let Some(shim_field) = self.shim_fields.get(&MemberKey::of_ref(&reference)) {
                    return self.rewrite_field_access(set, body, index, &reference, shim_field);
                }
                body.instructions[index].operand =
                    Operand::Member(self.importer.import_member_ref(&reference));
            }
            OpCode::Call | OpCode::Callvirt | OpCode::Newobj => {
                let Some(reference) = body.instructions[index].member_operand().cloned() else {
                    return Ok(index + 1);
                };
                let redirected = self.import_method_ref(set, &reference);
                if redirected != reference {
                    let mut opcode = opcode;
                    let static_target = matches!(
                        &redirected.signature,
                        MemberRefSig::Method(sig) if !sig.has_this
                    );
                    if opcode == OpCode::Callvirt && static_target {
                        opcode = OpCode::Call;
                    }
                    if opcode == OpCode::Newobj && redirected.name != ".ctor" {
                        opcode = OpCode::Call;
                    }
                    body.instructions[index] = Instruction::member(opcode, redirected);
                }
            }
            OpCode::Box | OpCode::UnboxAny | OpCode::Castclass | OpCode::Isinst => {
                if let Operand::Type(sig) = &body.instructions[index].operand {
                    let imported = self.importer.import_sig(sig);
                    body.instructions[index].operand = Operand::Type(imported);
                }
            }
            OpCode::Ldtoken => match body.instructions[index].operand.clone() {
                Operand::Type(sig) => {
                    body.instructions[index].operand = Operand::Type(self.importer.import_sig(&sig));
                }
                Operand::Member(reference) => {
                    let imported = match &reference.signature {
                        MemberRefSig::Method(_) => self.import_method_ref(set, &reference),
                        MemberRefSig::Field(_) => self.importer.import_member_ref(&reference),
                    };
                    body.instructions[index].operand = Operand::Member(imported);
                }
                _ => {}
            },
            _ => {}
        }
        Ok(index + 1)
    }

    /// Redirects one field access onto its shim: plain field shims swap the
    /// operand, property-backed shims become accessor calls, and address
    /// loads spill the value through a fresh temporary local.
    fn rewrite_field_access(
        &self,
        set: &AssemblySet,
        body: &mut MethodBody,
        index: usize,
        reference: &MemberRef,
        shim_field: &ShimFieldModel,
    ) -> Result<usize> {
        let opcode = body.instructions[index].opcode;
        match shim_field.source {
            ShimFieldSource::Field(field) => {
                body.instructions[index].operand = Operand::Member(set.field_ref(field));
                Ok(index + 1)
            }
            ShimFieldSource::Property(property) => {
                let prop = set.property_def(property);
                let accessor = match opcode {
                    OpCode::Stfld | OpCode::Stsfld => prop.setter,
                    _ => prop.getter,
                }
                .ok_or_else(|| {
                    invalid_error!(
                        "shim property '{}' has no accessor for {opcode}",
                        set.member_display(MemberId::Property(property))
                    )
                })?;
                body.instructions[index] = Instruction::member(OpCode::Call, set.method_ref(accessor));

                if matches!(opcode, OpCode::Ldflda | OpCode::Ldsflda) {
                    let MemberRefSig::Field(field_type) = &reference.signature else {
                        unreachable!("field access operands carry field signatures")
                    };
                    let slot = body.add_local(self.importer.import_sig(field_type))?;
                    body.insert(
                        index + 1,
                        vec![
                            Instruction::local(OpCode::Stloc, slot),
                            Instruction::local(OpCode::Ldloca, slot),
                        ],
                    );
                    return Ok(index + 3);
                }
                Ok(index + 1)
            }
        }
    }

    /// Maps a method reference: shim members resolve to their definitions
    /// (extension shims to their recorded implementations), renamed members
    /// get their current names, everything else is imported as-is.
    fn import_method_ref(&self, set: &AssemblySet, reference: &MemberRef) -> MemberRef {
        if let Some(&definition) = self.shim_methods.get(&MemberKey::of_ref(reference)) {
            if let Some(&implementation) = self.extension_impls.get(&definition) {
                return set.method_ref(implementation);
            }
            return set.method_ref(definition);
        }

        let mut name = reference.name.clone();
        if let Some(renamed) = self
            .member_renames
            .get(&TypeIdentity::of_ref(&reference.parent))
            .and_then(|renames| renames.get(&name))
        {
            name = renamed.clone();
        }
        let MemberRefSig::Method(sig) = &reference.signature else {
            return self.importer.import_member_ref(reference);
        };
        MemberRef::method(
            self.importer.import_path(&reference.parent),
            name,
            self.importer.import_method_sig(sig),
        )
    }
}

/// The planned rewrite of one consumer type, applied in a second pass.
struct TypePatch {
    type_id: TypeId,
    base_type: Option<TypeSig>,
    interfaces: Vec<TypeSig>,
    method_impls: Vec<MethodImpl>,
    generic_params: Vec<GenericParam>,
    custom_attributes: Vec<CustomAttribute>,
    security_decls: Vec<SecurityDecl>,
    fields: Vec<(FieldId, TypeSig, Vec<CustomAttribute>)>,
    properties: Vec<(PropertyId, PropertySig)>,
    events: Vec<(EventId, TypeSig)>,
    methods: Vec<MethodPatch>,
}

struct MethodPatch {
    method: MethodId,
    name: String,
    signature: MethodSig,
    generic_params: Vec<GenericParam>,
    custom_attributes: Vec<CustomAttribute>,
    security_decls: Vec<SecurityDecl>,
    body: Option<MethodBody>,
}

impl TypePatch {
    fn apply(self, set: &mut AssemblySet) {
        let def = set.type_def_mut(self.type_id);
        def.base_type = self.base_type;
        def.interfaces = self.interfaces;
        def.method_impls = self.method_impls;
        def.generic_params = self.generic_params;
        def.custom_attributes = self.custom_attributes;
        def.security_decls = self.security_decls;

        for (field, signature, attributes) in self.fields {
            let def = set.field_def_mut(field);
            def.signature = signature;
            def.custom_attributes = attributes;
        }
        for (property, signature) in self.properties {
            set.property_def_mut(property).signature = signature;
        }
        for (event, event_type) in self.events {
            set.event_def_mut(event).event_type = event_type;
        }
        for patch in self.methods {
            let def = set.method_def_mut(patch.method);
            def.name = patch.name;
            def.signature = patch.signature;
            def.generic_params = patch.generic_params;
            def.custom_attributes = patch.custom_attributes;
            def.security_decls = patch.security_decls;
            def.body = patch.body;
        }
    }
}
