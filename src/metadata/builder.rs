//! Fluent construction of in-memory assemblies.
//!
//! Loaders, the member cloner and the test factories all create definitions
//! through these builders rather than pushing raw structs, so parent/child
//! links (assembly to type, type to member, property to accessor) stay
//! consistent by construction.

use crate::metadata::attributes::CustomAttribute;
use crate::metadata::body::MethodBody;
use crate::metadata::identity::{AssemblyName, Version};
use crate::metadata::signatures::{MethodSig, Primitive, PropertySig, TypeRefPath, TypeSig};
use crate::metadata::types::{
    AsmId, Assembly, AssemblySet, Constant, EventDef, EventId, ExportedType, FieldDef, FieldFlags,
    FieldId, GenericParam, GenericParamFlags, MethodDef, MethodFlags, MethodId, MethodImpl,
    ParamDef, PropertyDef, PropertyId, TypeDef, TypeFlags, TypeId, TypeVisibility,
};
use crate::metadata::visibility::Accessibility;

/// Reference to a type in the core library.
#[must_use]
pub fn system_ref(name: &str) -> TypeRefPath {
    TypeRefPath::new(AssemblyName::unversioned("System.Runtime"), "System", name)
}

/// The default base type for classes.
#[must_use]
pub fn object_base() -> TypeSig {
    TypeSig::Named(system_ref("Object"))
}

fn method_access_bits(access: Accessibility) -> MethodFlags {
    MethodFlags::from_bits_retain(match access {
        Accessibility::Private => 0x1,
        Accessibility::ProtectedAndInternal => 0x2,
        Accessibility::Internal => 0x3,
        Accessibility::Protected => 0x4,
        Accessibility::ProtectedOrInternal => 0x5,
        Accessibility::Public => 0x6,
    })
}

fn field_access_bits(access: Accessibility) -> FieldFlags {
    FieldFlags::from_bits_retain(match access {
        Accessibility::Private => 0x1,
        Accessibility::ProtectedAndInternal => 0x2,
        Accessibility::Internal => 0x3,
        Accessibility::Protected => 0x4,
        Accessibility::ProtectedOrInternal => 0x5,
        Accessibility::Public => 0x6,
    })
}

/// Builds an [`Assembly`] and registers it with a set.
#[derive(Debug)]
pub struct AssemblyBuilder {
    name: AssemblyName,
    exported_types: Vec<ExportedType>,
    custom_attributes: Vec<CustomAttribute>,
}

impl AssemblyBuilder {
    /// Starts an assembly with the given simple name and version.
    #[must_use]
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        AssemblyBuilder {
            name: AssemblyName::new(name, version),
            exported_types: Vec::new(),
            custom_attributes: Vec::new(),
        }
    }

    /// Adds an exported-type forwarder row.
    #[must_use]
    pub fn exported_type(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        forwarded_to: AssemblyName,
    ) -> Self {
        self.exported_types.push(ExportedType {
            namespace: namespace.into(),
            name: name.into(),
            forwarded_to,
        });
        self
    }

    /// Adds an assembly-level custom attribute.
    #[must_use]
    pub fn attribute(mut self, attribute: CustomAttribute) -> Self {
        self.custom_attributes.push(attribute);
        self
    }

    /// Registers the assembly and returns its id.
    pub fn build(self, set: &mut AssemblySet) -> AsmId {
        set.push_assembly(Assembly {
            name: self.name,
            types: Vec::new(),
            exported_types: self.exported_types,
            custom_attributes: self.custom_attributes,
        })
    }
}

/// Builds a [`TypeDef`] and links it into its assembly or enclosing type.
#[derive(Debug)]
pub struct TypeBuilder {
    assembly: AsmId,
    namespace: String,
    name: String,
    flags: TypeFlags,
    base_type: Option<TypeSig>,
    interfaces: Vec<TypeSig>,
    declaring_type: Option<TypeId>,
    generic_params: Vec<GenericParam>,
    method_impls: Vec<MethodImpl>,
    custom_attributes: Vec<CustomAttribute>,
}

impl TypeBuilder {
    /// Starts a public top-level class deriving from `System.Object`.
    #[must_use]
    pub fn new(assembly: AsmId, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        TypeBuilder {
            assembly,
            namespace: namespace.into(),
            name: name.into(),
            flags: TypeFlags::empty().with_visibility(TypeVisibility::Public),
            base_type: Some(object_base()),
            interfaces: Vec::new(),
            declaring_type: None,
            generic_params: Vec::new(),
            method_impls: Vec::new(),
            custom_attributes: Vec::new(),
        }
    }

    /// Starts a public enum with the given underlying primitive type.
    ///
    /// The `value__` instance field is added automatically.
    #[must_use]
    pub fn new_enum(
        assembly: AsmId,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let mut builder = TypeBuilder::new(assembly, namespace, name);
        builder.flags |= TypeFlags::SEALED;
        builder.base_type = Some(TypeSig::Named(system_ref("Enum")));
        builder
    }

    /// Marks the type as nested inside another type. The visibility bits are
    /// switched to their nested encoding.
    #[must_use]
    pub fn nested_in(mut self, declaring: TypeId) -> Self {
        self.declaring_type = Some(declaring);
        self.namespace = String::new();
        self.flags = match self.flags.visibility() {
            TypeVisibility::Public | TypeVisibility::NestedPublic => {
                self.flags.with_visibility(TypeVisibility::NestedPublic)
            }
            TypeVisibility::NotPublic | TypeVisibility::NestedAssembly => {
                self.flags.with_visibility(TypeVisibility::NestedAssembly)
            }
            other => self.flags.with_visibility(other),
        };
        self
    }

    /// Sets the visibility bits.
    #[must_use]
    pub fn visibility(mut self, visibility: TypeVisibility) -> Self {
        self.flags = self.flags.with_visibility(visibility);
        self
    }

    /// Marks the type sealed.
    #[must_use]
    pub fn sealed(mut self) -> Self {
        self.flags |= TypeFlags::SEALED;
        self
    }

    /// Marks the type abstract.
    #[must_use]
    pub fn abstract_type(mut self) -> Self {
        self.flags |= TypeFlags::ABSTRACT;
        self
    }

    /// Marks the type static (`abstract sealed` in metadata).
    #[must_use]
    pub fn static_type(mut self) -> Self {
        self.flags |= TypeFlags::ABSTRACT | TypeFlags::SEALED;
        self
    }

    /// Turns the type into an interface.
    #[must_use]
    pub fn interface(mut self) -> Self {
        self.flags |= TypeFlags::INTERFACE | TypeFlags::ABSTRACT;
        self.base_type = None;
        self
    }

    /// Replaces the base type.
    #[must_use]
    pub fn base(mut self, base: TypeSig) -> Self {
        self.base_type = Some(base);
        self
    }

    /// Adds an implemented interface.
    #[must_use]
    pub fn implements(mut self, interface: TypeSig) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Adds an unconstrained generic parameter.
    #[must_use]
    pub fn generic_param(mut self, name: impl Into<String>) -> Self {
        self.generic_params.push(GenericParam {
            name: name.into(),
            flags: GenericParamFlags::empty(),
            constraints: Vec::new(),
        });
        self
    }

    /// Adds a generic parameter with flags and constraints.
    #[must_use]
    pub fn constrained_generic_param(
        mut self,
        name: impl Into<String>,
        flags: GenericParamFlags,
        constraints: Vec<TypeSig>,
    ) -> Self {
        self.generic_params.push(GenericParam {
            name: name.into(),
            flags,
            constraints,
        });
        self
    }

    /// Adds an explicit override record.
    #[must_use]
    pub fn method_impl(mut self, record: MethodImpl) -> Self {
        self.method_impls.push(record);
        self
    }

    /// Adds a custom attribute.
    #[must_use]
    pub fn attribute(mut self, attribute: CustomAttribute) -> Self {
        self.custom_attributes.push(attribute);
        self
    }

    /// Registers the type, links it to its parent, and returns its id.
    pub fn build(self, set: &mut AssemblySet) -> TypeId {
        let is_enum = matches!(
            &self.base_type,
            Some(TypeSig::Named(path)) if path.namespace == "System" && path.name == "Enum"
        );
        let assembly = self.assembly;
        let declaring = self.declaring_type;
        let id = set.push_type(TypeDef {
            assembly,
            namespace: self.namespace,
            name: self.name,
            flags: self.flags,
            base_type: self.base_type,
            interfaces: self.interfaces,
            declaring_type: declaring,
            nested_types: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
            events: Vec::new(),
            generic_params: self.generic_params,
            method_impls: self.method_impls,
            custom_attributes: self.custom_attributes,
            security_decls: Vec::new(),
        });
        match declaring {
            Some(parent) => set.type_def_mut(parent).nested_types.push(id),
            None => set.assembly_mut(assembly).types.push(id),
        }
        if is_enum {
            FieldBuilder::new(id, "value__", TypeSig::Primitive(Primitive::I4))
                .special_name()
                .build(set);
        }
        id
    }
}

/// Builds a [`MethodDef`] and links it into its declaring type.
#[derive(Debug)]
pub struct MethodBuilder {
    declaring_type: TypeId,
    name: String,
    flags: MethodFlags,
    signature: MethodSig,
    params: Vec<ParamDef>,
    generic_params: Vec<GenericParam>,
    body: Option<MethodBody>,
    custom_attributes: Vec<CustomAttribute>,
}

impl MethodBuilder {
    /// Starts a public method with the given signature.
    #[must_use]
    pub fn new(declaring_type: TypeId, name: impl Into<String>, signature: MethodSig) -> Self {
        let mut flags = method_access_bits(Accessibility::Public) | MethodFlags::HIDE_BY_SIG;
        if !signature.has_this {
            flags |= MethodFlags::STATIC;
        }
        MethodBuilder {
            declaring_type,
            name: name.into(),
            flags,
            signature,
            params: Vec::new(),
            generic_params: Vec::new(),
            body: None,
            custom_attributes: Vec::new(),
        }
    }

    /// Starts a public instance constructor taking the given parameters.
    #[must_use]
    pub fn constructor(declaring_type: TypeId, params: Vec<TypeSig>) -> Self {
        let mut builder = MethodBuilder::new(
            declaring_type,
            ".ctor",
            MethodSig::instance(TypeSig::Primitive(Primitive::Void), params),
        );
        builder.flags |= MethodFlags::SPECIAL_NAME | MethodFlags::RT_SPECIAL_NAME;
        builder.body = Some(MethodBody::default());
        builder
    }

    /// Replaces the member-access bits.
    #[must_use]
    pub fn access(mut self, access: Accessibility) -> Self {
        self.flags = MethodFlags::from_bits_retain(
            self.flags.bits() & !MethodFlags::MEMBER_ACCESS_MASK.bits(),
        ) | method_access_bits(access);
        self
    }

    /// Marks the method virtual, taking a new vtable slot.
    #[must_use]
    pub fn virtual_method(mut self) -> Self {
        self.flags |= MethodFlags::VIRTUAL | MethodFlags::NEW_SLOT;
        self
    }

    /// Marks the method as overriding an inherited slot.
    #[must_use]
    pub fn override_method(mut self) -> Self {
        self.flags |= MethodFlags::VIRTUAL;
        self.flags &= !MethodFlags::NEW_SLOT;
        self
    }

    /// Marks the method abstract (implies virtual, no body).
    #[must_use]
    pub fn abstract_method(mut self) -> Self {
        self.flags |= MethodFlags::ABSTRACT | MethodFlags::VIRTUAL | MethodFlags::NEW_SLOT;
        self.body = None;
        self
    }

    /// Marks the method final.
    #[must_use]
    pub fn final_method(mut self) -> Self {
        self.flags |= MethodFlags::FINAL;
        self
    }

    /// Marks the name as tooling-special (accessors, operators).
    #[must_use]
    pub fn special_name(mut self) -> Self {
        self.flags |= MethodFlags::SPECIAL_NAME;
        self
    }

    /// Sets parameter names, with no defaults.
    #[must_use]
    pub fn param_names(mut self, names: Vec<String>) -> Self {
        self.params = names.iter().map(|n| ParamDef::named(n)).collect();
        self
    }

    /// Sets the full parameter definitions.
    #[must_use]
    pub fn params(mut self, params: Vec<ParamDef>) -> Self {
        self.params = params;
        self
    }

    /// Adds an unconstrained generic parameter.
    #[must_use]
    pub fn generic_param(mut self, name: impl Into<String>) -> Self {
        self.generic_params.push(GenericParam {
            name: name.into(),
            flags: GenericParamFlags::empty(),
            constraints: Vec::new(),
        });
        self
    }

    /// Sets the method body.
    #[must_use]
    pub fn body(mut self, body: MethodBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a custom attribute.
    #[must_use]
    pub fn attribute(mut self, attribute: CustomAttribute) -> Self {
        self.custom_attributes.push(attribute);
        self
    }

    /// Registers the method, links it to its type, and returns its id.
    pub fn build(mut self, set: &mut AssemblySet) -> MethodId {
        self.signature.generic_arity = self.generic_params.len() as u32;
        if self.body.is_none() && !self.flags.contains(MethodFlags::ABSTRACT) {
            self.body = Some(MethodBody::default());
        }
        let declaring = self.declaring_type;
        let id = set.push_method(MethodDef {
            declaring_type: declaring,
            name: self.name,
            flags: self.flags,
            signature: self.signature,
            params: self.params,
            generic_params: self.generic_params,
            body: self.body,
            custom_attributes: self.custom_attributes,
            security_decls: Vec::new(),
        });
        set.type_def_mut(declaring).methods.push(id);
        id
    }
}

/// Builds a [`FieldDef`] and links it into its declaring type.
#[derive(Debug)]
pub struct FieldBuilder {
    declaring_type: TypeId,
    name: String,
    flags: FieldFlags,
    signature: TypeSig,
    constant: Option<Constant>,
    custom_attributes: Vec<CustomAttribute>,
}

impl FieldBuilder {
    /// Starts a public instance field.
    #[must_use]
    pub fn new(declaring_type: TypeId, name: impl Into<String>, signature: TypeSig) -> Self {
        FieldBuilder {
            declaring_type,
            name: name.into(),
            flags: field_access_bits(Accessibility::Public),
            signature,
            constant: None,
            custom_attributes: Vec::new(),
        }
    }

    /// Replaces the field-access bits.
    #[must_use]
    pub fn access(mut self, access: Accessibility) -> Self {
        self.flags = FieldFlags::from_bits_retain(
            self.flags.bits() & !FieldFlags::FIELD_ACCESS_MASK.bits(),
        ) | field_access_bits(access);
        self
    }

    /// Marks the field static.
    #[must_use]
    pub fn static_field(mut self) -> Self {
        self.flags |= FieldFlags::STATIC;
        self
    }

    /// Marks the field read-only.
    #[must_use]
    pub fn init_only(mut self) -> Self {
        self.flags |= FieldFlags::INIT_ONLY;
        self
    }

    /// Marks the name as tooling-special.
    #[must_use]
    pub fn special_name(mut self) -> Self {
        self.flags |= FieldFlags::SPECIAL_NAME;
        self
    }

    /// Turns the field into a compile-time constant with the given value.
    /// Literal fields are implicitly static.
    #[must_use]
    pub fn literal(mut self, value: Constant) -> Self {
        self.flags |= FieldFlags::LITERAL | FieldFlags::STATIC;
        self.constant = Some(value);
        self
    }

    /// Adds a custom attribute.
    #[must_use]
    pub fn attribute(mut self, attribute: CustomAttribute) -> Self {
        self.custom_attributes.push(attribute);
        self
    }

    /// Registers the field, links it to its type, and returns its id.
    pub fn build(self, set: &mut AssemblySet) -> FieldId {
        let declaring = self.declaring_type;
        let id = set.push_field(FieldDef {
            declaring_type: declaring,
            name: self.name,
            flags: self.flags,
            signature: self.signature,
            constant: self.constant,
            custom_attributes: self.custom_attributes,
        });
        set.type_def_mut(declaring).fields.push(id);
        id
    }
}

/// Builds a [`PropertyDef`] with its accessor methods.
#[derive(Debug)]
pub struct PropertyBuilder {
    declaring_type: TypeId,
    name: String,
    signature: PropertySig,
    getter_access: Option<Accessibility>,
    setter_access: Option<Accessibility>,
    virtual_accessors: bool,
    custom_attributes: Vec<CustomAttribute>,
}

impl PropertyBuilder {
    /// Starts a property with the given signature and no accessors.
    #[must_use]
    pub fn new(declaring_type: TypeId, name: impl Into<String>, signature: PropertySig) -> Self {
        PropertyBuilder {
            declaring_type,
            name: name.into(),
            signature,
            getter_access: None,
            setter_access: None,
            virtual_accessors: false,
            custom_attributes: Vec::new(),
        }
    }

    /// Adds a `get_` accessor with the given accessibility.
    #[must_use]
    pub fn getter(mut self, access: Accessibility) -> Self {
        self.getter_access = Some(access);
        self
    }

    /// Adds a `set_` accessor with the given accessibility.
    #[must_use]
    pub fn setter(mut self, access: Accessibility) -> Self {
        self.setter_access = Some(access);
        self
    }

    /// Makes the accessors virtual new-slot methods.
    #[must_use]
    pub fn virtual_accessors(mut self) -> Self {
        self.virtual_accessors = true;
        self
    }

    /// Adds a custom attribute.
    #[must_use]
    pub fn attribute(mut self, attribute: CustomAttribute) -> Self {
        self.custom_attributes.push(attribute);
        self
    }

    /// Registers the property and its accessors, links them to the type, and
    /// returns the property id.
    pub fn build(self, set: &mut AssemblySet) -> PropertyId {
        let declaring = self.declaring_type;
        let has_this = self.signature.has_this;

        let getter = self.getter_access.map(|access| {
            let sig = MethodSig {
                has_this,
                generic_arity: 0,
                return_type: self.signature.property_type.clone(),
                params: self.signature.params.clone(),
            };
            let mut builder = MethodBuilder::new(declaring, format!("get_{}", self.name), sig)
                .access(access)
                .special_name();
            if self.virtual_accessors {
                builder = builder.virtual_method();
            }
            builder.build(set)
        });

        let setter = self.setter_access.map(|access| {
            let mut params = self.signature.params.clone();
            params.push(self.signature.property_type.clone());
            let sig = MethodSig {
                has_this,
                generic_arity: 0,
                return_type: TypeSig::Primitive(Primitive::Void),
                params,
            };
            let mut builder = MethodBuilder::new(declaring, format!("set_{}", self.name), sig)
                .access(access)
                .special_name();
            if self.virtual_accessors {
                builder = builder.virtual_method();
            }
            builder.build(set)
        });

        let id = set.push_property(PropertyDef {
            declaring_type: declaring,
            name: self.name,
            signature: self.signature,
            getter,
            setter,
            custom_attributes: self.custom_attributes,
        });
        set.type_def_mut(declaring).properties.push(id);
        id
    }
}

/// Builds an [`EventDef`] with its accessor methods.
#[derive(Debug)]
pub struct EventBuilder {
    declaring_type: TypeId,
    name: String,
    event_type: TypeSig,
    access: Accessibility,
    custom_attributes: Vec<CustomAttribute>,
}

impl EventBuilder {
    /// Starts a public event with `add_`/`remove_` accessors.
    #[must_use]
    pub fn new(declaring_type: TypeId, name: impl Into<String>, event_type: TypeSig) -> Self {
        EventBuilder {
            declaring_type,
            name: name.into(),
            event_type,
            access: Accessibility::Public,
            custom_attributes: Vec::new(),
        }
    }

    /// Replaces the accessor accessibility.
    #[must_use]
    pub fn access(mut self, access: Accessibility) -> Self {
        self.access = access;
        self
    }

    /// Adds a custom attribute.
    #[must_use]
    pub fn attribute(mut self, attribute: CustomAttribute) -> Self {
        self.custom_attributes.push(attribute);
        self
    }

    /// Registers the event and its accessors, links them to the type, and
    /// returns the event id.
    pub fn build(self, set: &mut AssemblySet) -> EventId {
        let declaring = self.declaring_type;
        let accessor_sig = MethodSig::instance(
            TypeSig::Primitive(Primitive::Void),
            vec![self.event_type.clone()],
        );
        let adder = MethodBuilder::new(declaring, format!("add_{}", self.name), accessor_sig.clone())
            .access(self.access)
            .special_name()
            .build(set);
        let remover = MethodBuilder::new(declaring, format!("remove_{}", self.name), accessor_sig)
            .access(self.access)
            .special_name()
            .build(set);

        let id = set.push_event(EventDef {
            declaring_type: declaring,
            name: self.name,
            event_type: self.event_type,
            adder: Some(adder),
            remover: Some(remover),
            custom_attributes: self.custom_attributes,
        });
        set.type_def_mut(declaring).events.push(id);
        id
    }
}
