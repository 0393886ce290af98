//! The in-memory assembly universe.
//!
//! Definitions live in flat arenas owned by an [`AssemblySet`] and refer to
//! each other through copyable typed ids ([`TypeId`], [`MethodId`], ...).
//! This keeps the graph cycle-free and borrow-friendly: analysis passes walk
//! it through `&AssemblySet`, rewriting passes mutate individual definitions
//! through `&mut AssemblySet` after planning against a shared borrow.
//!
//! Flag words mirror the ECMA-335 attribute encodings (`TypeAttributes`,
//! `MethodAttributes`, `FieldAttributes`) so that multi-bit accessibility
//! fields survive round-tripping; accessor methods decode the masks.

use std::fmt;

use bitflags::bitflags;

use crate::metadata::attributes::{CustomAttribute, SecurityDecl};
use crate::metadata::body::MethodBody;
use crate::metadata::identity::AssemblyName;
use crate::metadata::signatures::{MemberRef, MethodSig, PropertySig, TypeSig};

/// Identifies an assembly within an [`AssemblySet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AsmId(pub(crate) u32);

/// Identifies a type definition within an [`AssemblySet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub(crate) u32);

/// Identifies a method definition within an [`AssemblySet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId(pub(crate) u32);

/// Identifies a field definition within an [`AssemblySet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(pub(crate) u32);

/// Identifies a property definition within an [`AssemblySet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyId(pub(crate) u32);

/// Identifies an event definition within an [`AssemblySet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(pub(crate) u32);

/// Any member of a type, including nested types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberId {
    /// A nested type
    Type(TypeId),
    /// A method
    Method(MethodId),
    /// A field
    Field(FieldId),
    /// A property
    Property(PropertyId),
    /// An event
    Event(EventId),
}

bitflags! {
    /// ECMA-335 `TypeAttributes` flag word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TypeFlags: u32 {
        /// Mask for the visibility bits
        const VISIBILITY_MASK = 0x0000_0007;
        /// Type is visible outside the assembly
        const PUBLIC = 0x0000_0001;
        /// Nested type with public visibility
        const NESTED_PUBLIC = 0x0000_0002;
        /// Nested type with private visibility
        const NESTED_PRIVATE = 0x0000_0003;
        /// Nested type with family visibility
        const NESTED_FAMILY = 0x0000_0004;
        /// Nested type with assembly visibility
        const NESTED_ASSEMBLY = 0x0000_0005;
        /// Nested type with family-and-assembly visibility
        const NESTED_FAM_AND_ASSEM = 0x0000_0006;
        /// Nested type with family-or-assembly visibility
        const NESTED_FAM_OR_ASSEM = 0x0000_0007;
        /// Type is an interface
        const INTERFACE = 0x0000_0020;
        /// Type is abstract
        const ABSTRACT = 0x0000_0080;
        /// Type is sealed
        const SEALED = 0x0000_0100;
        /// Name is special, interpreted by tooling
        const SPECIAL_NAME = 0x0000_0400;
        /// Type is a before-field-init class
        const BEFORE_FIELD_INIT = 0x0010_0000;
    }
}

/// Decoded type visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeVisibility {
    /// Not visible outside the assembly
    NotPublic,
    /// Visible outside the assembly
    Public,
    /// Nested, visible wherever the enclosing type is
    NestedPublic,
    /// Nested, visible only to the enclosing type
    NestedPrivate,
    /// Nested, visible to derived types
    NestedFamily,
    /// Nested, visible within the assembly
    NestedAssembly,
    /// Nested, visible to derived types within the assembly
    NestedFamAndAssem,
    /// Nested, visible to derived types or within the assembly
    NestedFamOrAssem,
}

impl TypeFlags {
    /// Decodes the visibility bits.
    #[must_use]
    pub fn visibility(&self) -> TypeVisibility {
        match self.bits() & TypeFlags::VISIBILITY_MASK.bits() {
            0x0 => TypeVisibility::NotPublic,
            0x1 => TypeVisibility::Public,
            0x2 => TypeVisibility::NestedPublic,
            0x3 => TypeVisibility::NestedPrivate,
            0x4 => TypeVisibility::NestedFamily,
            0x5 => TypeVisibility::NestedAssembly,
            0x6 => TypeVisibility::NestedFamAndAssem,
            _ => TypeVisibility::NestedFamOrAssem,
        }
    }

    /// Replaces the visibility bits.
    #[must_use]
    pub fn with_visibility(self, visibility: TypeVisibility) -> Self {
        let bits = match visibility {
            TypeVisibility::NotPublic => 0x0,
            TypeVisibility::Public => 0x1,
            TypeVisibility::NestedPublic => 0x2,
            TypeVisibility::NestedPrivate => 0x3,
            TypeVisibility::NestedFamily => 0x4,
            TypeVisibility::NestedAssembly => 0x5,
            TypeVisibility::NestedFamAndAssem => 0x6,
            TypeVisibility::NestedFamOrAssem => 0x7,
        };
        TypeFlags::from_bits_retain((self.bits() & !TypeFlags::VISIBILITY_MASK.bits()) | bits)
    }
}

bitflags! {
    /// ECMA-335 `MethodAttributes` flag word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MethodFlags: u32 {
        /// Mask for the member-access bits
        const MEMBER_ACCESS_MASK = 0x0007;
        /// Accessible only to the declaring type
        const PRIVATE = 0x0001;
        /// Accessible to derived types within the assembly
        const FAM_AND_ASSEM = 0x0002;
        /// Accessible within the assembly
        const ASSEMBLY = 0x0003;
        /// Accessible to derived types
        const FAMILY = 0x0004;
        /// Accessible to derived types or within the assembly
        const FAM_OR_ASSEM = 0x0005;
        /// Accessible everywhere
        const PUBLIC = 0x0006;
        /// No instance required
        const STATIC = 0x0010;
        /// May not be overridden
        const FINAL = 0x0020;
        /// Dispatched through a vtable slot
        const VIRTUAL = 0x0040;
        /// Hides by name and signature
        const HIDE_BY_SIG = 0x0080;
        /// Gets a new vtable slot
        const NEW_SLOT = 0x0100;
        /// Has no implementation in this type
        const ABSTRACT = 0x0400;
        /// Name is special, interpreted by tooling
        const SPECIAL_NAME = 0x0800;
        /// Name is special, interpreted by the runtime
        const RT_SPECIAL_NAME = 0x1000;
    }
}

bitflags! {
    /// ECMA-335 `FieldAttributes` flag word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FieldFlags: u32 {
        /// Mask for the field-access bits
        const FIELD_ACCESS_MASK = 0x0007;
        /// Accessible only to the declaring type
        const PRIVATE = 0x0001;
        /// Accessible to derived types within the assembly
        const FAM_AND_ASSEM = 0x0002;
        /// Accessible within the assembly
        const ASSEMBLY = 0x0003;
        /// Accessible to derived types
        const FAMILY = 0x0004;
        /// Accessible to derived types or within the assembly
        const FAM_OR_ASSEM = 0x0005;
        /// Accessible everywhere
        const PUBLIC = 0x0006;
        /// No instance required
        const STATIC = 0x0010;
        /// May only be assigned in a constructor
        const INIT_ONLY = 0x0020;
        /// Compile-time constant, value in the constant table
        const LITERAL = 0x0040;
        /// Name is special, interpreted by tooling
        const SPECIAL_NAME = 0x0200;
        /// Name is special, interpreted by the runtime
        const RT_SPECIAL_NAME = 0x0400;
    }
}

bitflags! {
    /// ECMA-335 `GenericParamAttributes` flag word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GenericParamFlags: u16 {
        /// Mask for the variance bits
        const VARIANCE_MASK = 0x0003;
        /// Covariant parameter (`out`)
        const COVARIANT = 0x0001;
        /// Contravariant parameter (`in`)
        const CONTRAVARIANT = 0x0002;
        /// Must be a reference type (`class` constraint)
        const REFERENCE_TYPE = 0x0004;
        /// Must be a non-nullable value type (`struct` constraint)
        const NOT_NULLABLE_VALUE_TYPE = 0x0008;
        /// Must have a parameterless constructor (`new()` constraint)
        const DEFAULT_CONSTRUCTOR = 0x0010;
    }
}

/// A generic parameter declared by a type or method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericParam {
    /// Parameter name
    pub name: String,
    /// Special-constraint flags and variance
    pub flags: GenericParamFlags,
    /// Type constraints
    pub constraints: Vec<TypeSig>,
}

/// A compile-time constant value attached to a literal field.
///
/// Floats are compared by bit pattern so that `NaN` constants still compare
/// equal to themselves across assembly versions.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// Boolean constant
    Boolean(bool),
    /// UTF-16 code unit constant
    Char(u16),
    /// Signed 8-bit constant
    I1(i8),
    /// Unsigned 8-bit constant
    U1(u8),
    /// Signed 16-bit constant
    I2(i16),
    /// Unsigned 16-bit constant
    U2(u16),
    /// Signed 32-bit constant
    I4(i32),
    /// Unsigned 32-bit constant
    U4(u32),
    /// Signed 64-bit constant
    I8(i64),
    /// Unsigned 64-bit constant
    U8(u64),
    /// 32-bit float constant
    R4(f32),
    /// 64-bit float constant
    R8(f64),
    /// String constant, `None` for a null string
    String(Option<String>),
    /// Null reference constant
    Null,
}

impl Constant {
    /// Compares two constants for value equality, floats by bit pattern.
    #[must_use]
    pub fn matches(&self, other: &Constant) -> bool {
        match (self, other) {
            (Constant::R4(a), Constant::R4(b)) => a.to_bits() == b.to_bits(),
            (Constant::R8(a), Constant::R8(b)) => a.to_bits() == b.to_bits(),
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Boolean(v) => write!(f, "{v}"),
            Constant::Char(v) => write!(f, "'{}'", char::from_u32(u32::from(*v)).unwrap_or('?')),
            Constant::I1(v) => write!(f, "{v}"),
            Constant::U1(v) => write!(f, "{v}"),
            Constant::I2(v) => write!(f, "{v}"),
            Constant::U2(v) => write!(f, "{v}"),
            Constant::I4(v) => write!(f, "{v}"),
            Constant::U4(v) => write!(f, "{v}"),
            Constant::I8(v) => write!(f, "{v}"),
            Constant::U8(v) => write!(f, "{v}"),
            Constant::R4(v) => write!(f, "{v}"),
            Constant::R8(v) => write!(f, "{v}"),
            Constant::String(Some(v)) => write!(f, "\"{v}\""),
            Constant::String(None) | Constant::Null => write!(f, "null"),
        }
    }
}

/// An explicit interface or base override record (`MethodImpl`).
///
/// Both sides are kept as references rather than resolved ids so that cloned
/// shim types can carry override records pointing into the target assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodImpl {
    /// The slot being implemented
    pub declaration: MemberRef,
    /// The method providing the implementation
    pub body: MemberRef,
}

/// A type definition.
#[derive(Debug, Clone)]
pub struct TypeDef {
    /// Owning assembly
    pub assembly: AsmId,
    /// Namespace, empty for nested types
    pub namespace: String,
    /// Simple name, including any generic arity suffix
    pub name: String,
    /// Attribute flag word
    pub flags: TypeFlags,
    /// Base type, `None` for interfaces and `System.Object` itself
    pub base_type: Option<TypeSig>,
    /// Implemented interfaces
    pub interfaces: Vec<TypeSig>,
    /// Enclosing type for nested definitions
    pub declaring_type: Option<TypeId>,
    /// Nested type definitions
    pub nested_types: Vec<TypeId>,
    /// Declared methods
    pub methods: Vec<MethodId>,
    /// Declared fields
    pub fields: Vec<FieldId>,
    /// Declared properties
    pub properties: Vec<PropertyId>,
    /// Declared events
    pub events: Vec<EventId>,
    /// Generic parameters
    pub generic_params: Vec<GenericParam>,
    /// Explicit override records
    pub method_impls: Vec<MethodImpl>,
    /// Custom attributes
    pub custom_attributes: Vec<CustomAttribute>,
    /// Declarative security records
    pub security_decls: Vec<SecurityDecl>,
}

impl TypeDef {
    /// Whether the interface flag is set.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.flags.contains(TypeFlags::INTERFACE)
    }

    /// Whether the type is an enum, judged by its base type.
    #[must_use]
    pub fn is_enum(&self) -> bool {
        matches!(
            &self.base_type,
            Some(TypeSig::Named(path)) if path.namespace == "System" && path.name == "Enum"
        )
    }
}

/// A parameter definition. Sequence is its index in the owning method's
/// `params` vector, parallel to the signature's parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDef {
    /// Parameter name
    pub name: String,
    /// Default value for optional parameters
    pub default: Option<Constant>,
}

impl ParamDef {
    /// A named parameter without a default value.
    #[must_use]
    pub fn named(name: &str) -> Self {
        ParamDef {
            name: name.into(),
            default: None,
        }
    }
}

/// A method definition.
#[derive(Debug, Clone)]
pub struct MethodDef {
    /// Declaring type
    pub declaring_type: TypeId,
    /// Method name
    pub name: String,
    /// Attribute flag word
    pub flags: MethodFlags,
    /// Signature
    pub signature: MethodSig,
    /// Parameter definitions, parallel to the signature's parameter list
    pub params: Vec<ParamDef>,
    /// Generic parameters
    pub generic_params: Vec<GenericParam>,
    /// Method body, `None` for abstract and external methods
    pub body: Option<MethodBody>,
    /// Custom attributes
    pub custom_attributes: Vec<CustomAttribute>,
    /// Declarative security records
    pub security_decls: Vec<SecurityDecl>,
}

impl MethodDef {
    /// Whether the static flag is set.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.contains(MethodFlags::STATIC)
    }

    /// Whether this is an instance constructor.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == ".ctor" && self.flags.contains(MethodFlags::RT_SPECIAL_NAME)
    }
}

/// A field definition.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Declaring type
    pub declaring_type: TypeId,
    /// Field name
    pub name: String,
    /// Attribute flag word
    pub flags: FieldFlags,
    /// Field type
    pub signature: TypeSig,
    /// Constant value for literal fields
    pub constant: Option<Constant>,
    /// Custom attributes
    pub custom_attributes: Vec<CustomAttribute>,
}

impl FieldDef {
    /// Whether the static flag is set.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.contains(FieldFlags::STATIC)
    }
}

/// A property definition. Accessors are ordinary methods linked by id.
#[derive(Debug, Clone)]
pub struct PropertyDef {
    /// Declaring type
    pub declaring_type: TypeId,
    /// Property name
    pub name: String,
    /// Signature (property type plus indexer parameters)
    pub signature: PropertySig,
    /// Getter accessor
    pub getter: Option<MethodId>,
    /// Setter accessor
    pub setter: Option<MethodId>,
    /// Custom attributes
    pub custom_attributes: Vec<CustomAttribute>,
}

/// An event definition. Accessors are ordinary methods linked by id.
#[derive(Debug, Clone)]
pub struct EventDef {
    /// Declaring type
    pub declaring_type: TypeId,
    /// Event name
    pub name: String,
    /// Delegate type of the event
    pub event_type: TypeSig,
    /// Add accessor
    pub adder: Option<MethodId>,
    /// Remove accessor
    pub remover: Option<MethodId>,
    /// Custom attributes
    pub custom_attributes: Vec<CustomAttribute>,
}

/// An exported-type forwarder row: a type whose definition lives in another
/// assembly but which this assembly re-exports under its own surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedType {
    /// Namespace of the forwarded type
    pub namespace: String,
    /// Name of the forwarded type
    pub name: String,
    /// The assembly the definition was forwarded to
    pub forwarded_to: AssemblyName,
}

/// An assembly definition: identity, top-level types and forwarders.
#[derive(Debug, Clone)]
pub struct Assembly {
    /// Assembly identity
    pub name: AssemblyName,
    /// Top-level type definitions
    pub types: Vec<TypeId>,
    /// Exported-type forwarder rows
    pub exported_types: Vec<ExportedType>,
    /// Assembly-level custom attributes
    pub custom_attributes: Vec<CustomAttribute>,
}

/// The arena universe all analysis and rewriting passes operate on.
///
/// Definitions are appended once during construction (or cloning) and then
/// addressed by id; ids are never invalidated because nothing is removed from
/// the arenas, only detached from its parent's child lists.
#[derive(Debug, Default)]
pub struct AssemblySet {
    assemblies: Vec<Assembly>,
    types: Vec<TypeDef>,
    methods: Vec<MethodDef>,
    fields: Vec<FieldDef>,
    properties: Vec<PropertyDef>,
    events: Vec<EventDef>,
}

impl AssemblySet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        AssemblySet::default()
    }

    /// Appends an assembly and returns its id.
    pub fn push_assembly(&mut self, assembly: Assembly) -> AsmId {
        let id = AsmId(u32::try_from(self.assemblies.len()).unwrap_or(u32::MAX));
        self.assemblies.push(assembly);
        id
    }

    /// Appends a type definition and returns its id.
    pub fn push_type(&mut self, def: TypeDef) -> TypeId {
        let id = TypeId(u32::try_from(self.types.len()).unwrap_or(u32::MAX));
        self.types.push(def);
        id
    }

    /// Appends a method definition and returns its id.
    pub fn push_method(&mut self, def: MethodDef) -> MethodId {
        let id = MethodId(u32::try_from(self.methods.len()).unwrap_or(u32::MAX));
        self.methods.push(def);
        id
    }

    /// Appends a field definition and returns its id.
    pub fn push_field(&mut self, def: FieldDef) -> FieldId {
        let id = FieldId(u32::try_from(self.fields.len()).unwrap_or(u32::MAX));
        self.fields.push(def);
        id
    }

    /// Appends a property definition and returns its id.
    pub fn push_property(&mut self, def: PropertyDef) -> PropertyId {
        let id = PropertyId(u32::try_from(self.properties.len()).unwrap_or(u32::MAX));
        self.properties.push(def);
        id
    }

    /// Appends an event definition and returns its id.
    pub fn push_event(&mut self, def: EventDef) -> EventId {
        let id = EventId(u32::try_from(self.events.len()).unwrap_or(u32::MAX));
        self.events.push(def);
        id
    }

    /// Returns the assembly with the given id.
    #[must_use]
    pub fn assembly(&self, id: AsmId) -> &Assembly {
        &self.assemblies[id.0 as usize]
    }

    /// Returns the assembly with the given id, mutably.
    pub fn assembly_mut(&mut self, id: AsmId) -> &mut Assembly {
        &mut self.assemblies[id.0 as usize]
    }

    /// Returns the type definition with the given id.
    #[must_use]
    pub fn type_def(&self, id: TypeId) -> &TypeDef {
        &self.types[id.0 as usize]
    }

    /// Returns the type definition with the given id, mutably.
    pub fn type_def_mut(&mut self, id: TypeId) -> &mut TypeDef {
        &mut self.types[id.0 as usize]
    }

    /// Returns the method definition with the given id.
    #[must_use]
    pub fn method_def(&self, id: MethodId) -> &MethodDef {
        &self.methods[id.0 as usize]
    }

    /// Returns the method definition with the given id, mutably.
    pub fn method_def_mut(&mut self, id: MethodId) -> &mut MethodDef {
        &mut self.methods[id.0 as usize]
    }

    /// Returns the field definition with the given id.
    #[must_use]
    pub fn field_def(&self, id: FieldId) -> &FieldDef {
        &self.fields[id.0 as usize]
    }

    /// Returns the field definition with the given id, mutably.
    pub fn field_def_mut(&mut self, id: FieldId) -> &mut FieldDef {
        &mut self.fields[id.0 as usize]
    }

    /// Returns the property definition with the given id.
    #[must_use]
    pub fn property_def(&self, id: PropertyId) -> &PropertyDef {
        &self.properties[id.0 as usize]
    }

    /// Returns the property definition with the given id, mutably.
    pub fn property_def_mut(&mut self, id: PropertyId) -> &mut PropertyDef {
        &mut self.properties[id.0 as usize]
    }

    /// Returns the event definition with the given id.
    #[must_use]
    pub fn event_def(&self, id: EventId) -> &EventDef {
        &self.events[id.0 as usize]
    }

    /// Returns the event definition with the given id, mutably.
    pub fn event_def_mut(&mut self, id: EventId) -> &mut EventDef {
        &mut self.events[id.0 as usize]
    }

    /// Iterates over all assemblies with their ids.
    pub fn assemblies(&self) -> impl Iterator<Item = (AsmId, &Assembly)> {
        self.assemblies
            .iter()
            .enumerate()
            .map(|(i, a)| (AsmId(i as u32), a))
    }

    /// Finds an assembly by simple name, case-insensitively.
    #[must_use]
    pub fn find_assembly(&self, name: &str) -> Option<AsmId> {
        self.assemblies
            .iter()
            .position(|a| a.name.name.eq_ignore_ascii_case(name))
            .map(|i| AsmId(i as u32))
    }

    /// Returns the type declaring a member, `None` for assembly-level scopes.
    #[must_use]
    pub fn declaring_type(&self, member: MemberId) -> Option<TypeId> {
        match member {
            MemberId::Type(id) => self.type_def(id).declaring_type,
            MemberId::Method(id) => Some(self.method_def(id).declaring_type),
            MemberId::Field(id) => Some(self.field_def(id).declaring_type),
            MemberId::Property(id) => Some(self.property_def(id).declaring_type),
            MemberId::Event(id) => Some(self.event_def(id).declaring_type),
        }
    }

    /// Returns all type definitions of an assembly, top-level first, nested
    /// types in breadth-first order.
    #[must_use]
    pub fn all_types(&self, assembly: AsmId) -> Vec<TypeId> {
        let mut result = self.assembly(assembly).types.clone();
        let mut cursor = 0;
        while cursor < result.len() {
            let id = result[cursor];
            result.extend_from_slice(&self.type_def(id).nested_types);
            cursor += 1;
        }
        result
    }

    /// Fully qualified display name of a type definition.
    #[must_use]
    pub fn type_full_name(&self, id: TypeId) -> String {
        let def = self.type_def(id);
        match def.declaring_type {
            Some(parent) => format!("{}+{}", self.type_full_name(parent), def.name),
            None if def.namespace.is_empty() => def.name.clone(),
            None => format!("{}.{}", def.namespace, def.name),
        }
    }

    /// Human-readable display name for a member, used in difference messages.
    #[must_use]
    pub fn member_display(&self, member: MemberId) -> String {
        match member {
            MemberId::Type(id) => self.type_full_name(id),
            MemberId::Method(id) => {
                let method = self.method_def(id);
                format!(
                    "{}.{}{}",
                    self.type_full_name(method.declaring_type),
                    method.name,
                    method.signature
                )
            }
            MemberId::Field(id) => {
                let field = self.field_def(id);
                format!("{}.{}", self.type_full_name(field.declaring_type), field.name)
            }
            MemberId::Property(id) => {
                let property = self.property_def(id);
                format!(
                    "{}.{}",
                    self.type_full_name(property.declaring_type),
                    property.name
                )
            }
            MemberId::Event(id) => {
                let event = self.event_def(id);
                format!("{}.{}", self.type_full_name(event.declaring_type), event.name)
            }
        }
    }

    /// Enumerates the direct members of a type in a fixed order: fields,
    /// properties, events, methods. Nested types are not included; callers
    /// that want them walk [`TypeDef::nested_types`] separately.
    #[must_use]
    pub fn members_of(&self, id: TypeId) -> Vec<MemberId> {
        let def = self.type_def(id);
        let mut members = Vec::with_capacity(
            def.methods.len() + def.fields.len() + def.properties.len() + def.events.len(),
        );
        members.extend(def.fields.iter().map(|&f| MemberId::Field(f)));
        members.extend(def.properties.iter().map(|&p| MemberId::Property(p)));
        members.extend(def.events.iter().map(|&e| MemberId::Event(e)));
        members.extend(def.methods.iter().map(|&m| MemberId::Method(m)));
        members
    }
}
