//! Custom attribute model.
//!
//! Attributes are stored decoded: the constructor reference plus fixed and
//! named arguments as structured values. The shim marker scanner matches
//! attributes by the full name of their declaring type and reads arguments
//! positionally, so the model only needs the value kinds markers actually
//! use (booleans, integers, strings, types and arrays of those).

use crate::metadata::signatures::{
    MemberRef, MethodSig, Primitive, TypeRefPath, TypeSig,
};

/// A decoded custom attribute argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// A boolean argument
    Boolean(bool),
    /// A 32-bit integer argument
    I4(i32),
    /// A string argument
    String(String),
    /// A `System.Type` argument, stored as the referenced type signature
    Type(TypeSig),
    /// An array argument
    Array(Vec<AttrValue>),
}

impl AttrValue {
    /// Returns the string value, if this is a string argument.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the type value, if this is a `System.Type` argument.
    #[must_use]
    pub fn as_type(&self) -> Option<&TypeSig> {
        match self {
            AttrValue::Type(sig) => Some(sig),
            _ => None,
        }
    }

    /// The signature shape of this value, used to synthesize constructor
    /// references for attributes built in memory.
    #[must_use]
    pub fn sig_shape(&self) -> TypeSig {
        match self {
            AttrValue::Boolean(_) => TypeSig::Primitive(Primitive::Boolean),
            AttrValue::I4(_) => TypeSig::Primitive(Primitive::I4),
            AttrValue::String(_) => TypeSig::Primitive(Primitive::String),
            AttrValue::Type(_) => TypeSig::Primitive(Primitive::Object),
            AttrValue::Array(items) => TypeSig::SzArray(Box::new(
                items
                    .first()
                    .map_or(TypeSig::Primitive(Primitive::Object), AttrValue::sig_shape),
            )),
        }
    }
}

/// A named (property or field) custom attribute argument.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedArg {
    /// Property or field name
    pub name: String,
    /// Whether the target is a field rather than a property
    pub is_field: bool,
    /// Argument value
    pub value: AttrValue,
}

/// A custom attribute: constructor reference plus decoded arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomAttribute {
    /// The attribute constructor being invoked
    pub ctor: MemberRef,
    /// Positional constructor arguments
    pub fixed_args: Vec<AttrValue>,
    /// Named property/field arguments
    pub named_args: Vec<NamedArg>,
}

impl CustomAttribute {
    /// Creates an attribute instance for an attribute type and positional
    /// arguments, synthesizing the constructor reference from the argument
    /// shapes.
    #[must_use]
    pub fn new(attr_type: TypeRefPath, fixed_args: Vec<AttrValue>) -> Self {
        let params = fixed_args.iter().map(AttrValue::sig_shape).collect();
        let ctor = MemberRef::method(
            attr_type,
            ".ctor",
            MethodSig::instance(TypeSig::Primitive(Primitive::Void), params),
        );
        CustomAttribute {
            ctor,
            fixed_args,
            named_args: Vec::new(),
        }
    }

    /// The declaring type of the attribute.
    #[must_use]
    pub fn attr_type(&self) -> &TypeRefPath {
        &self.ctor.parent
    }

    /// The fully qualified name of the attribute type.
    #[must_use]
    pub fn full_name(&self) -> String {
        self.ctor.parent.full_name()
    }

    /// Looks up a named argument by name.
    #[must_use]
    pub fn named_arg(&self, name: &str) -> Option<&AttrValue> {
        self.named_args
            .iter()
            .find(|arg| arg.name == name)
            .map(|arg| &arg.value)
    }
}

/// A declarative security action, per ECMA-335 §II.22.11.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SecurityAction {
    /// Runtime demand against the full call stack
    Demand,
    /// Stack-walk assertion
    Assert,
    /// Link-time demand against the immediate caller
    LinkDemand,
    /// Inheritance-time demand against deriving types
    InheritanceDemand,
}

/// A declarative security record attached to a type or method.
///
/// Permissions are stored as decoded attributes, the same shape custom
/// attributes use, so cloning re-imports their constructor references
/// through the same path.
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityDecl {
    /// The action demanded
    pub action: SecurityAction,
    /// Permission attribute instances for this action
    pub permissions: Vec<CustomAttribute>,
}

/// Finds the first attribute with the given full type name.
#[must_use]
pub fn find_attribute<'a>(
    attributes: &'a [CustomAttribute],
    full_name: &str,
) -> Option<&'a CustomAttribute> {
    attributes.iter().find(|attr| attr.full_name() == full_name)
}

/// Counts the attributes with the given full type name.
#[must_use]
pub fn count_attributes(attributes: &[CustomAttribute], full_name: &str) -> usize {
    attributes
        .iter()
        .filter(|attr| attr.full_name() == full_name)
        .count()
}
