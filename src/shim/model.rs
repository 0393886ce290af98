//! Shim model construction.
//!
//! [`ShimModel::from_assembly`] scans a shim assembly's marker attributes and
//! produces one [`ShimTypeModel`] per shim type of interest, each relating a
//! shim declaration to a reference into the target assembly. The model is the
//! shared input of both rewriting processors and is never mutated after
//! construction.
//!
//! # Key Components
//!
//! - [`ShimModel`] - The complete scan result for one shim assembly
//! - [`ShimTypeModel`] / [`ShimTypeKind`] - Per-type relation to the target
//! - [`ShimMember`] - Member-level relations (methods, fields, properties, events)

use std::collections::{HashMap, HashSet, VecDeque};

use crate::metadata::identity::MemberKey;
use crate::metadata::signatures::{MemberRef, MethodSig, Primitive, TypeRefPath, TypeSig};
use crate::metadata::types::{
    AsmId, AssemblySet, EventId, FieldId, MemberId, MethodFlags, MethodId, PropertyId, TypeFlags,
    TypeId,
};
use crate::metadata::visibility::{is_member_visible_outside, is_type_visible_outside};
use crate::shim::markers::{self, RenameData};
use crate::{Error, Result};

/// Name of the compiler-synthesized method marking a native extension
/// container; its single parameter is the extended type.
pub const EXTENSION_MARKER_METHOD: &str = "<Extension>$";

/// How a shim type relates to the target assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ShimTypeKind {
    /// A type the target assembly never had; it is synthesized there
    New,
    /// Replaces the target type of the same identity
    Replace,
    /// A native (compiler-lowered) extension container for a target type
    NativeExtension,
    /// A static class marked as an extension holder for a target type
    UnbreakerExtension,
}

/// A method shim: the shim declaration plus the target member it stands for.
#[derive(Debug, Clone, PartialEq)]
pub struct ShimMethodModel {
    /// Reference to the member the shim maps onto in the target assembly
    pub target: MemberRef,
    /// Whether the shim is a static factory standing in for a constructor
    pub is_constructor_shim: bool,
    /// The shim method definition
    pub definition: MethodId,
}

/// The shim declaration a field shim was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShimFieldSource {
    /// An ordinary shim field
    Field(FieldId),
    /// A shim property standing in for a target field
    Property(PropertyId),
}

/// A field shim: either a plain field or a property marked as a field stand-in.
#[derive(Debug, Clone, PartialEq)]
pub struct ShimFieldModel {
    /// Reference to the target field
    pub target: MemberRef,
    /// The shim declaration this model was built from
    pub source: ShimFieldSource,
}

/// A member of a shim type.
#[derive(Debug, Clone, PartialEq)]
pub enum ShimMember {
    /// A method shim
    Method(ShimMethodModel),
    /// A field shim
    Field(ShimFieldModel),
    /// A property carried along for cloning; it has no independent target
    Property(PropertyId),
    /// An event carried along for cloning; it has no independent target
    Event(EventId),
}

/// One shim type and its relation to the target assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct ShimTypeModel {
    /// The relation kind
    pub kind: ShimTypeKind,
    /// Index of the declaring type's model in [`ShimModel::all_types`], for
    /// nested shim types
    pub declaring: Option<usize>,
    /// Reference to the type this shim targets (or synthesizes, for `New`)
    pub target: TypeRefPath,
    /// Member models, in scan order: field-shimmed properties and plain
    /// properties, events, methods, fields
    pub members: Vec<ShimMember>,
    /// The shim type definition
    pub definition: TypeId,
}

impl ShimTypeModel {
    /// Iterates the method shims of this type.
    pub fn methods(&self) -> impl Iterator<Item = &ShimMethodModel> {
        self.members.iter().filter_map(|member| match member {
            ShimMember::Method(model) => Some(model),
            _ => None,
        })
    }

    /// Iterates the field shims of this type.
    pub fn fields(&self) -> impl Iterator<Item = &ShimFieldModel> {
        self.members.iter().filter_map(|member| match member {
            ShimMember::Field(model) => Some(model),
            _ => None,
        })
    }

    /// Iterates the plain (non-field-shimmed) properties of this type.
    pub fn properties(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.members.iter().filter_map(|member| match member {
            ShimMember::Property(id) => Some(*id),
            _ => None,
        })
    }

    /// Iterates the events of this type.
    pub fn events(&self) -> impl Iterator<Item = EventId> + '_ {
        self.members.iter().filter_map(|member| match member {
            ShimMember::Event(id) => Some(*id),
            _ => None,
        })
    }
}

impl std::fmt::Display for ShimTypeModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} : {}", self.kind, self.target)
    }
}

/// The complete shim model for one shim assembly against one target assembly.
#[derive(Debug)]
pub struct ShimModel {
    /// The shim assembly the model was scanned from
    pub shim: AsmId,
    /// The resolved target assembly
    pub target: AsmId,
    /// Assembly-level rename directives, in declaration order
    pub renames: Vec<RenameData>,
    /// All shim type models, breadth-first; declaring types precede their
    /// nested types
    pub all_types: Vec<ShimTypeModel>,
    /// For native extension methods: shim method identity to the
    /// compiler-synthesized static implementation it lowers to
    pub extension_implementations: HashMap<MemberKey, MethodId>,
}

impl ShimModel {
    /// Scans a shim assembly and builds its model.
    ///
    /// Types marked as organizational extension containers are not modeled
    /// themselves; their nested types are processed as top-level shim types.
    /// Externally invisible types of kind `New` are skipped silently (nothing
    /// references them from outside); invisible types of any other kind are an
    /// error, as are cross-assembly targets, unresolvable non-`New` targets,
    /// `New` types colliding with an existing visible target type, and
    /// non-static extension holders.
    ///
    /// # Errors
    /// See the validation list above; all failures are immediate, no partial
    /// model is produced.
    pub fn from_assembly(set: &AssemblySet, shim: AsmId) -> Result<ShimModel> {
        let target_name = markers::shim_target(set.assembly(shim))?;
        let target = set
            .find_assembly(&target_name)
            .ok_or(Error::UnresolvedAssembly(target_name))?;
        let renames = markers::renames(set.assembly(shim))?;

        let mut builder = ModelBuilder {
            set,
            target,
            all_types: Vec::new(),
            extension_implementations: HashMap::new(),
        };

        let mut queue: VecDeque<(Option<usize>, TypeId)> = set
            .assembly(shim)
            .types
            .iter()
            .map(|&id| (None, id))
            .collect();

        while let Some((declaring, shim_type)) = queue.pop_front() {
            if markers::has_marker(&set.type_def(shim_type).custom_attributes, markers::EXTENSIONS)
            {
                for &nested in &set.type_def(shim_type).nested_types {
                    queue.push_back((None, nested));
                }
                continue;
            }

            let Some(index) = builder.scan_type(declaring, shim_type)? else {
                continue;
            };
            for &nested in &set.type_def(shim_type).nested_types {
                queue.push_back((Some(index), nested));
            }
        }

        Ok(ShimModel {
            shim,
            target,
            renames,
            all_types: builder.all_types,
            extension_implementations: builder.extension_implementations,
        })
    }
}

struct ModelBuilder<'a> {
    set: &'a AssemblySet,
    target: AsmId,
    all_types: Vec<ShimTypeModel>,
    extension_implementations: HashMap<MemberKey, MethodId>,
}

impl ModelBuilder<'_> {
    /// Scans one shim type; returns its index in `all_types`, or `None` when
    /// the type is skipped.
    fn scan_type(&mut self, declaring: Option<usize>, shim_type: TypeId) -> Result<Option<usize>> {
        let set = self.set;
        let def = set.type_def(shim_type);

        let mut extension_parameter = None;
        let (kind, target_ref) = if let Some(marker) = self.extension_marker_method(shim_type) {
            let parameter = single_parameter(set, marker)?;
            let target_ref = underlying_path(&parameter)?;
            extension_parameter = Some(parameter);
            (ShimTypeKind::NativeExtension, target_ref)
        } else if let Some(attr) =
            markers::try_find_single(&def.custom_attributes, markers::EXTENSION)?
        {
            let sig = markers::single_type_arg(attr, markers::EXTENSION)?;
            (ShimTypeKind::UnbreakerExtension, underlying_path(sig)?)
        } else if let Some(attr) =
            markers::try_find_single(&def.custom_attributes, markers::REPLACE)?
        {
            let sig = markers::single_type_arg(attr, markers::REPLACE)?;
            (ShimTypeKind::Replace, underlying_path(sig)?)
        } else {
            let target_ref = match declaring.map(|index| &self.all_types[index]) {
                Some(declaring_model) => declaring_model.target.nested(def.name.clone()),
                None => TypeRefPath::new(
                    set.assembly(self.target).name.clone(),
                    def.namespace.clone(),
                    def.name.clone(),
                ),
            };
            (ShimTypeKind::New, target_ref)
        };

        if !is_type_visible_outside(set, shim_type) {
            if kind == ShimTypeKind::New {
                return Ok(None);
            }
            return Err(Error::ShimTypeNotPublic(set.type_full_name(shim_type)));
        }

        if !scope_assembly(&target_ref)
            .name
            .eq_ignore_ascii_case(&set.assembly(self.target).name.name)
        {
            return Err(Error::ShimTargetOutsideAssembly(
                set.type_full_name(shim_type),
                target_ref.full_name(),
            ));
        }

        let target_type = set
            .try_resolve_type(&target_ref)
            .filter(|&id| is_type_visible_outside(set, id));

        if kind == ShimTypeKind::New && target_type.is_some() {
            return Err(Error::TypeCollision(set.type_full_name(shim_type)));
        }
        if kind != ShimTypeKind::New && target_type.is_none() {
            return Err(Error::UnresolvedType(target_ref.full_name()));
        }
        if kind == ShimTypeKind::UnbreakerExtension
            && !def.flags.contains(TypeFlags::ABSTRACT | TypeFlags::SEALED)
        {
            return Err(Error::ExtensionNotStatic(set.type_full_name(shim_type)));
        }

        let members =
            self.scan_members(shim_type, &target_ref, extension_parameter.as_ref())?;

        let index = self.all_types.len();
        self.all_types.push(ShimTypeModel {
            kind,
            declaring,
            target: target_ref,
            members,
            definition: shim_type,
        });
        Ok(Some(index))
    }

    fn scan_members(
        &mut self,
        shim_type: TypeId,
        target_ref: &TypeRefPath,
        extension_parameter: Option<&TypeSig>,
    ) -> Result<Vec<ShimMember>> {
        let set = self.set;
        let def = set.type_def(shim_type);
        let mut members = Vec::new();
        let mut ignored_methods: HashSet<MethodId> = HashSet::new();

        for &property in &def.properties {
            if !is_member_visible_outside(set, MemberId::Property(property)) {
                continue;
            }
            let prop = set.property_def(property);
            if markers::has_marker(&prop.custom_attributes, markers::FIELD) {
                members.push(ShimMember::Field(ShimFieldModel {
                    target: MemberRef::field(
                        target_ref.clone(),
                        prop.name.clone(),
                        prop.signature.property_type.clone(),
                    ),
                    source: ShimFieldSource::Property(property),
                }));
                ignored_methods.extend(prop.getter);
                ignored_methods.extend(prop.setter);
            } else {
                members.push(ShimMember::Property(property));
            }
        }

        for &event in &def.events {
            if is_member_visible_outside(set, MemberId::Event(event)) {
                members.push(ShimMember::Event(event));
            }
        }

        for &method in &def.methods {
            if !is_member_visible_outside(set, MemberId::Method(method)) {
                continue;
            }
            let m = set.method_def(method);
            if m.flags.contains(MethodFlags::SPECIAL_NAME) && m.name == EXTENSION_MARKER_METHOD {
                continue;
            }

            if let Some(parameter) = extension_parameter {
                let implementation = self
                    .find_extension_implementation(shim_type, method, parameter)
                    .ok_or_else(|| {
                        Error::ExtensionImplementationNotFound(
                            set.member_display(MemberId::Method(method)),
                        )
                    })?;
                self.extension_implementations.insert(
                    MemberKey::of_member(set, MemberId::Method(method)),
                    implementation,
                );
            }

            if ignored_methods.contains(&method) {
                continue;
            }

            let is_constructor_shim =
                markers::has_marker(&m.custom_attributes, markers::CONSTRUCTOR);
            let target = if is_constructor_shim {
                MemberRef::method(
                    target_ref.clone(),
                    ".ctor",
                    MethodSig::instance(
                        TypeSig::Primitive(Primitive::Void),
                        m.signature.params.clone(),
                    ),
                )
            } else {
                MemberRef::method(target_ref.clone(), m.name.clone(), m.signature.clone())
            };
            members.push(ShimMember::Method(ShimMethodModel {
                target,
                is_constructor_shim,
                definition: method,
            }));
        }

        for &field in &def.fields {
            if !is_member_visible_outside(set, MemberId::Field(field)) {
                continue;
            }
            let f = set.field_def(field);
            members.push(ShimMember::Field(ShimFieldModel {
                target: MemberRef::field(target_ref.clone(), f.name.clone(), f.signature.clone()),
                source: ShimFieldSource::Field(field),
            }));
        }

        Ok(members)
    }

    /// The compiler-synthesized extension marker method of a native extension
    /// container, if this type is one. Only valid when the declaring type is
    /// an organizational extension holder.
    fn extension_marker_method(&self, shim_type: TypeId) -> Option<MethodId> {
        let set = self.set;
        let def = set.type_def(shim_type);
        let declaring = def.declaring_type?;
        if !markers::has_marker(
            &set.type_def(declaring).custom_attributes,
            markers::EXTENSIONS,
        ) {
            return None;
        }
        def.methods.iter().copied().find(|&method| {
            let m = set.method_def(method);
            m.flags.contains(MethodFlags::SPECIAL_NAME) && m.name == EXTENSION_MARKER_METHOD
        })
    }

    /// Locates the static implementation method a native extension member
    /// lowers to: a method on the declaring container with the same name
    /// whose signature equals the shim method's with the container's generic
    /// parameters (and, for instance members, the extended type as a leading
    /// parameter) hoisted into method generics.
    fn find_extension_implementation(
        &self,
        shim_type: TypeId,
        method: MethodId,
        extension_parameter: &TypeSig,
    ) -> Option<MethodId> {
        let set = self.set;
        let container = set.type_def(shim_type);
        let declaring = container.declaring_type?;
        let container_arity = container.generic_params.len() as u32;
        let m = set.method_def(method);

        // !n of the container and !!n of the member both become method
        // generics of the implementation, container parameters first.
        let hoist = |is_method: bool, index: u32| {
            if is_method {
                TypeSig::MVar(container_arity + index)
            } else {
                TypeSig::MVar(index)
            }
        };

        let additional = usize::from(!m.is_static());
        let wanted_return = m.signature.return_type.map_vars(&hoist).strip_versions();
        let wanted_params: Vec<TypeSig> = m
            .signature
            .params
            .iter()
            .map(|p| p.map_vars(&hoist).strip_versions())
            .collect();
        let wanted_this = extension_parameter.map_vars(&hoist).strip_versions();

        set.type_def(declaring)
            .methods
            .iter()
            .copied()
            .find(|&candidate| {
                let c = set.method_def(candidate);
                if !c.is_static() || c.name != m.name {
                    return false;
                }
                if c.signature.generic_arity != container_arity + m.signature.generic_arity {
                    return false;
                }
                if c.signature.params.len() != additional + m.signature.params.len() {
                    return false;
                }
                if c.signature.return_type.strip_versions() != wanted_return {
                    return false;
                }
                if additional == 1 && c.signature.params[0].strip_versions() != wanted_this {
                    return false;
                }
                c.signature.params[additional..]
                    .iter()
                    .zip(&wanted_params)
                    .all(|(have, want)| have.strip_versions() == *want)
            })
    }
}

/// The assembly a type reference ultimately resolves through: the scope of the
/// outermost declaring type.
fn scope_assembly(path: &TypeRefPath) -> &crate::metadata::identity::AssemblyName {
    let mut current = path;
    while let Some(parent) = current.declaring.as_deref() {
        current = parent;
    }
    &current.assembly
}

/// The single parameter of an extension marker method: the extended type.
fn single_parameter(set: &AssemblySet, method: MethodId) -> Result<TypeSig> {
    match set.method_def(method).signature.params.as_slice() {
        [parameter] => Ok(parameter.clone()),
        params => Err(invalid_error!(
            "extension marker method takes {} parameters, expected exactly one",
            params.len()
        )),
    }
}

/// The named root of an extension target signature.
fn underlying_path(sig: &TypeSig) -> Result<TypeRefPath> {
    match sig {
        TypeSig::Named(path) | TypeSig::GenericInst { base: path, .. } => Ok(path.clone()),
        other => Err(invalid_error!(
            "extension target '{}' is not a named type",
            other
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::attributes::AttrValue;
    use crate::metadata::builder::{
        AssemblyBuilder, FieldBuilder, MethodBuilder, PropertyBuilder, TypeBuilder,
    };
    use crate::metadata::identity::{AssemblyName, Version};
    use crate::metadata::signatures::PropertySig;
    use crate::metadata::types::TypeVisibility;
    use crate::metadata::visibility::Accessibility;
    use crate::test::{marker, shim_pair};

    fn target_type_sig(set: &AssemblySet, target: AsmId, name: &str) -> TypeSig {
        TypeSig::Named(TypeRefPath::new(
            set.assembly(target).name.clone(),
            "Contoso",
            name,
        ))
    }

    #[test]
    fn test_new_type_synthesizes_target_reference() {
        let mut set = AssemblySet::new();
        let (target, shim) = shim_pair(&mut set);
        let _ = target;
        TypeBuilder::new(shim, "Contoso", "Widget").build(&mut set);

        let model = ShimModel::from_assembly(&set, shim).unwrap();
        assert_eq!(model.all_types.len(), 1);
        let widget = &model.all_types[0];
        assert_eq!(widget.kind, ShimTypeKind::New);
        assert_eq!(widget.target.full_name(), "Contoso.Widget");
        assert_eq!(widget.target.assembly.name, "Contoso.Core");
    }

    #[test]
    fn test_invisible_new_type_skipped_invisible_replace_errors() {
        let mut set = AssemblySet::new();
        let (target, shim) = shim_pair(&mut set);
        TypeBuilder::new(shim, "Contoso", "Hidden")
            .visibility(TypeVisibility::NotPublic)
            .build(&mut set);
        assert!(ShimModel::from_assembly(&set, shim)
            .unwrap()
            .all_types
            .is_empty());

        TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);
        TypeBuilder::new(shim, "Contoso", "Widget")
            .visibility(TypeVisibility::NotPublic)
            .attribute(marker(
                "ReplaceAttribute",
                vec![AttrValue::Type(target_type_sig(&set, target, "Widget"))],
            ))
            .build(&mut set);
        assert!(matches!(
            ShimModel::from_assembly(&set, shim),
            Err(Error::ShimTypeNotPublic(name)) if name == "Contoso.Widget"
        ));
    }

    #[test]
    fn test_new_type_colliding_with_target_errors() {
        let mut set = AssemblySet::new();
        let (target, shim) = shim_pair(&mut set);
        TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);
        TypeBuilder::new(shim, "Contoso", "Widget").build(&mut set);

        assert!(matches!(
            ShimModel::from_assembly(&set, shim),
            Err(Error::TypeCollision(name)) if name == "Contoso.Widget"
        ));
    }

    #[test]
    fn test_replace_requires_resolvable_target() {
        let mut set = AssemblySet::new();
        let (target, shim) = shim_pair(&mut set);
        TypeBuilder::new(shim, "Contoso", "Widget")
            .attribute(marker(
                "ReplaceAttribute",
                vec![AttrValue::Type(target_type_sig(&set, target, "Widget"))],
            ))
            .build(&mut set);

        assert!(matches!(
            ShimModel::from_assembly(&set, shim),
            Err(Error::UnresolvedType(_))
        ));
    }

    #[test]
    fn test_cross_assembly_target_errors() {
        let mut set = AssemblySet::new();
        let (_, shim) = shim_pair(&mut set);
        let elsewhere = AssemblyBuilder::new("Elsewhere", Version::new(1, 0, 0, 0)).build(&mut set);
        TypeBuilder::new(elsewhere, "Contoso", "Widget").build(&mut set);
        TypeBuilder::new(shim, "Contoso", "Widget")
            .attribute(marker(
                "ReplaceAttribute",
                vec![AttrValue::Type(TypeSig::Named(TypeRefPath::new(
                    AssemblyName::unversioned("Elsewhere"),
                    "Contoso",
                    "Widget",
                )))],
            ))
            .build(&mut set);

        assert!(matches!(
            ShimModel::from_assembly(&set, shim),
            Err(Error::ShimTargetOutsideAssembly(_, _))
        ));
    }

    #[test]
    fn test_non_named_extension_target_message_names_the_type() {
        let err = underlying_path(&TypeSig::Primitive(Primitive::I4)).unwrap_err();
        let message = err.to_string();
        assert!(message.contains(&TypeSig::Primitive(Primitive::I4).to_string()));
        assert!(!message.contains("{other}"));
    }

    #[test]
    fn test_extension_holder_must_be_static() {
        let mut set = AssemblySet::new();
        let (target, shim) = shim_pair(&mut set);
        TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);
        TypeBuilder::new(shim, "Contoso", "WidgetExtensions")
            .attribute(marker(
                "ExtensionAttribute",
                vec![AttrValue::Type(target_type_sig(&set, target, "Widget"))],
            ))
            .build(&mut set);

        assert!(matches!(
            ShimModel::from_assembly(&set, shim),
            Err(Error::ExtensionNotStatic(_))
        ));
    }

    #[test]
    fn test_field_shimmed_property_consumes_accessors() {
        let mut set = AssemblySet::new();
        let (target, shim) = shim_pair(&mut set);
        TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);
        let shim_widget = TypeBuilder::new(shim, "Contoso", "Widget")
            .attribute(marker(
                "ReplaceAttribute",
                vec![AttrValue::Type(target_type_sig(&set, target, "Widget"))],
            ))
            .build(&mut set);
        PropertyBuilder::new(
            shim_widget,
            "Size",
            PropertySig::instance(TypeSig::Primitive(Primitive::I4)),
        )
        .getter(Accessibility::Public)
        .setter(Accessibility::Public)
        .attribute(marker("FieldAttribute", Vec::new()))
        .build(&mut set);

        let model = ShimModel::from_assembly(&set, shim).unwrap();
        let widget = &model.all_types[0];
        assert_eq!(widget.kind, ShimTypeKind::Replace);

        let fields: Vec<_> = widget.fields().collect();
        assert_eq!(fields.len(), 1);
        assert!(matches!(fields[0].source, ShimFieldSource::Property(_)));
        assert_eq!(fields[0].target.name, "Size");
        // the accessors are consumed, not modeled as methods
        assert_eq!(widget.methods().count(), 0);
        assert_eq!(widget.properties().count(), 0);
    }

    #[test]
    fn test_constructor_shim_targets_instance_ctor() {
        let mut set = AssemblySet::new();
        let (target, shim) = shim_pair(&mut set);
        TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);
        let shim_widget = TypeBuilder::new(shim, "Contoso", "Widget")
            .attribute(marker(
                "ReplaceAttribute",
                vec![AttrValue::Type(target_type_sig(&set, target, "Widget"))],
            ))
            .build(&mut set);
        MethodBuilder::new(
            shim_widget,
            "Create",
            MethodSig::stat(
                target_type_sig(&set, target, "Widget"),
                vec![TypeSig::Primitive(Primitive::I4)],
            ),
        )
        .attribute(marker("ConstructorAttribute", Vec::new()))
        .build(&mut set);

        let model = ShimModel::from_assembly(&set, shim).unwrap();
        let methods: Vec<_> = model.all_types[0].methods().collect();
        assert_eq!(methods.len(), 1);
        assert!(methods[0].is_constructor_shim);
        assert_eq!(methods[0].target.name, ".ctor");
        match &methods[0].target.signature {
            crate::metadata::signatures::MemberRefSig::Method(sig) => {
                assert!(sig.has_this);
                assert_eq!(sig.return_type, TypeSig::Primitive(Primitive::Void));
                assert_eq!(sig.params, vec![TypeSig::Primitive(Primitive::I4)]);
            }
            other => panic!("unexpected signature {other:?}"),
        }
    }

    #[test]
    fn test_native_extension_implementation_lookup() {
        let mut set = AssemblySet::new();
        let (target, shim) = shim_pair(&mut set);
        TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);

        let widget_sig = target_type_sig(&set, target, "Widget");
        let holder = TypeBuilder::new(shim, "Contoso", "WidgetExtensions")
            .static_type()
            .attribute(marker("ExtensionsAttribute", Vec::new()))
            .build(&mut set);
        let container = TypeBuilder::new(shim, "", "<>E__0")
            .nested_in(holder)
            .build(&mut set);
        MethodBuilder::new(
            container,
            EXTENSION_MARKER_METHOD,
            MethodSig::stat(
                TypeSig::Primitive(Primitive::Void),
                vec![widget_sig.clone()],
            ),
        )
        .special_name()
        .build(&mut set);
        let shim_method = MethodBuilder::new(
            container,
            "Frob",
            MethodSig::instance(TypeSig::Primitive(Primitive::I4), Vec::new()),
        )
        .build(&mut set);
        // the compiler-style static implementation on the holder
        let implementation = MethodBuilder::new(
            holder,
            "Frob",
            MethodSig::stat(TypeSig::Primitive(Primitive::I4), vec![widget_sig]),
        )
        .build(&mut set);

        let model = ShimModel::from_assembly(&set, shim).unwrap();
        assert_eq!(model.all_types.len(), 1);
        assert_eq!(model.all_types[0].kind, ShimTypeKind::NativeExtension);
        assert_eq!(model.all_types[0].target.full_name(), "Contoso.Widget");

        let key = MemberKey::of_member(&set, MemberId::Method(shim_method));
        assert_eq!(model.extension_implementations.get(&key), Some(&implementation));
    }

    #[test]
    fn test_native_extension_without_implementation_errors() {
        let mut set = AssemblySet::new();
        let (target, shim) = shim_pair(&mut set);
        TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);

        let widget_sig = target_type_sig(&set, target, "Widget");
        let holder = TypeBuilder::new(shim, "Contoso", "WidgetExtensions")
            .static_type()
            .attribute(marker("ExtensionsAttribute", Vec::new()))
            .build(&mut set);
        let container = TypeBuilder::new(shim, "", "<>E__0")
            .nested_in(holder)
            .build(&mut set);
        MethodBuilder::new(
            container,
            EXTENSION_MARKER_METHOD,
            MethodSig::stat(TypeSig::Primitive(Primitive::Void), vec![widget_sig]),
        )
        .special_name()
        .build(&mut set);
        MethodBuilder::new(
            container,
            "Frob",
            MethodSig::instance(TypeSig::Primitive(Primitive::I4), Vec::new()),
        )
        .build(&mut set);

        assert!(matches!(
            ShimModel::from_assembly(&set, shim),
            Err(Error::ExtensionImplementationNotFound(_))
        ));
    }

    #[test]
    fn test_nested_new_type_targets_nested_reference() {
        let mut set = AssemblySet::new();
        let (_, shim) = shim_pair(&mut set);
        let outer = TypeBuilder::new(shim, "Contoso", "Widget").build(&mut set);
        TypeBuilder::new(shim, "", "Inner")
            .nested_in(outer)
            .build(&mut set);

        let model = ShimModel::from_assembly(&set, shim).unwrap();
        assert_eq!(model.all_types.len(), 2);
        assert_eq!(model.all_types[1].declaring, Some(0));
        assert_eq!(model.all_types[1].target.full_name(), "Contoso.Widget+Inner");
    }
}
