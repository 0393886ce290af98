//! Compatibility differences reported by the rules.
//!
//! Differences are plain data carrying the ids of the declarations involved;
//! rendering resolves them against the [`AssemblySet`] on demand, so a
//! difference stays cheap to construct and hash while its message still shows
//! full declaration names.

use std::fmt;

use crate::metadata::identity::TypeIdentity;
use crate::metadata::types::{AssemblySet, Constant, MemberId, TypeFlags, TypeId};
use crate::metadata::visibility::Accessibility;

/// Whether a difference is an addition on the right, a removal from the left,
/// or a change of an element present on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum DifferenceType {
    /// Present only on the right
    Added,
    /// Present only on the left
    Removed,
    /// Present on both sides with incompatible shape
    Changed,
}

/// A single binary-compatibility violation.
#[derive(Debug, Clone, PartialEq)]
pub enum CompatDifference {
    /// A left type has no counterpart on the right.
    TypeMustExist {
        /// The left type
        left: TypeId,
    },
    /// A left member has no counterpart on the right.
    MemberMustExist {
        /// The left member
        left: MemberId,
    },
    /// An abstract member was added to an unsealed type.
    CannotAddAbstractMember {
        /// The added right member
        right: MemberId,
    },
    /// A member without default implementation was added to an interface.
    CannotAddMemberToInterface {
        /// The added right member
        right: MemberId,
    },
    /// The sealed keyword was added to a default interface member.
    CannotAddSealedToInterfaceMember {
        /// The right member
        right: MemberId,
    },
    /// The virtual keyword was removed from an overridable member.
    CannotRemoveVirtualFromMember {
        /// The right member
        right: MemberId,
    },
    /// The right type no longer inherits the left's immediate base type.
    CannotRemoveBaseType {
        /// The left type
        left: TypeId,
        /// Display name of the missing base type
        base: String,
    },
    /// The right type no longer implements an interface the left does.
    CannotRemoveBaseInterface {
        /// The left type
        left: TypeId,
        /// Identity of the missing interface
        interface: TypeIdentity,
    },
    /// The right type became sealed (explicitly or effectively).
    CannotSealType {
        /// The right type
        right: TypeId,
    },
    /// The underlying type of an enum changed.
    EnumTypesMustMatch {
        /// The left enum
        left: TypeId,
        /// Display name of the left underlying type
        left_underlying: String,
        /// Display name of the right underlying type
        right_underlying: String,
    },
    /// The constant value of an enum field changed.
    EnumValuesMustMatch {
        /// The left enum
        left: TypeId,
        /// Name of the field whose value changed
        field: String,
        /// Left constant value
        left_value: Constant,
        /// Right constant value
        right_value: Constant,
    },
    /// The visibility of a declaration was reduced.
    CannotReduceVisibility {
        /// The left member
        left: MemberId,
        /// Left accessibility
        left_access: Accessibility,
        /// Right accessibility
        right_access: Accessibility,
    },
    /// A generic-parameter constraint was added or removed.
    CannotChangeGenericConstraint {
        /// Whether the constraint was added or removed
        change: DifferenceType,
        /// The left declaration owning the type parameter
        left: MemberId,
        /// Name of the type parameter
        param: String,
        /// Display name of the constraint
        constraint: String,
    },
}

impl CompatDifference {
    /// The short rule-style name of this difference kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            CompatDifference::TypeMustExist { .. } => "TypeMustExist",
            CompatDifference::MemberMustExist { .. } => "MemberMustExist",
            CompatDifference::CannotAddAbstractMember { .. } => "CannotAddAbstractMember",
            CompatDifference::CannotAddMemberToInterface { .. } => "CannotAddMemberToInterface",
            CompatDifference::CannotAddSealedToInterfaceMember { .. } => {
                "CannotAddSealedToInterfaceMember"
            }
            CompatDifference::CannotRemoveVirtualFromMember { .. } => {
                "CannotRemoveVirtualFromMember"
            }
            CompatDifference::CannotRemoveBaseType { .. } => "CannotRemoveBaseType",
            CompatDifference::CannotRemoveBaseInterface { .. } => "CannotRemoveBaseInterface",
            CompatDifference::CannotSealType { .. } => "CannotSealType",
            CompatDifference::EnumTypesMustMatch { .. } => "EnumTypesMustMatch",
            CompatDifference::EnumValuesMustMatch { .. } => "EnumValuesMustMatch",
            CompatDifference::CannotReduceVisibility { .. } => "CannotReduceVisibility",
            CompatDifference::CannotChangeGenericConstraint { .. } => {
                "CannotChangeGenericConstraint"
            }
        }
    }

    /// The addition/removal/change classification.
    #[must_use]
    pub fn difference_type(&self) -> DifferenceType {
        match self {
            CompatDifference::TypeMustExist { .. }
            | CompatDifference::MemberMustExist { .. } => DifferenceType::Removed,
            CompatDifference::CannotAddAbstractMember { .. }
            | CompatDifference::CannotAddMemberToInterface { .. }
            | CompatDifference::CannotAddSealedToInterfaceMember { .. } => DifferenceType::Added,
            CompatDifference::CannotRemoveVirtualFromMember { .. } => DifferenceType::Removed,
            CompatDifference::CannotChangeGenericConstraint { change, .. } => *change,
            _ => DifferenceType::Changed,
        }
    }

    /// Renders the one-line report form: `<name> : <message>`.
    #[must_use]
    pub fn render(&self, set: &AssemblySet) -> String {
        format!("{} : {}", self.name(), self.message(set))
    }

    /// Renders the human-readable message for this difference.
    #[must_use]
    pub fn message(&self, set: &AssemblySet) -> String {
        match self {
            CompatDifference::TypeMustExist { left } => format!(
                "Type '{}' exists on left but not on right",
                set.type_full_name(*left)
            ),
            CompatDifference::MemberMustExist { left } => format!(
                "Member '{}' exists on left but not on right",
                set.member_display(*left)
            ),
            CompatDifference::CannotAddAbstractMember { right }
            | CompatDifference::CannotAddMemberToInterface { right } => format!(
                "Cannot add abstract member '{}' to right because it does not exist on left",
                set.member_display(*right)
            ),
            CompatDifference::CannotAddSealedToInterfaceMember { right } => format!(
                "Cannot add sealed keyword to default interface member '{}'",
                set.member_display(*right)
            ),
            CompatDifference::CannotRemoveVirtualFromMember { right } => format!(
                "Cannot remove virtual keyword from member '{}'",
                set.member_display(*right)
            ),
            CompatDifference::CannotRemoveBaseType { left, base } => format!(
                "Type '{}' does not inherit from base type '{}' on right but it does on left",
                set.type_full_name(*left),
                base
            ),
            CompatDifference::CannotRemoveBaseInterface { left, interface } => format!(
                "Type '{}' does not implement interface '{}' on right but it does on left",
                set.type_full_name(*left),
                interface
            ),
            CompatDifference::CannotSealType { right } => {
                let name = set.type_full_name(*right);
                if set.type_def(*right).flags.contains(TypeFlags::SEALED) {
                    format!("Type '{name}' has the sealed modifier on right but not on left")
                } else {
                    format!(
                        "Type '{name}' is sealed because it has no visible constructor on right but it does on left"
                    )
                }
            }
            CompatDifference::EnumTypesMustMatch {
                left,
                left_underlying,
                right_underlying,
            } => format!(
                "Underlying type of enum '{}' changed from '{}' to '{}'",
                set.type_full_name(*left),
                left_underlying,
                right_underlying
            ),
            CompatDifference::EnumValuesMustMatch {
                left,
                field,
                left_value,
                right_value,
            } => format!(
                "Value of field '{}' in enum '{}' changed from '{}' to '{}'",
                field,
                set.type_full_name(*left),
                left_value,
                right_value
            ),
            CompatDifference::CannotReduceVisibility {
                left,
                left_access,
                right_access,
            } => format!(
                "Visibility of '{}' reduced from '{}' to '{}'",
                set.member_display(*left),
                left_access,
                right_access
            ),
            CompatDifference::CannotChangeGenericConstraint {
                change,
                left,
                param,
                constraint,
            } => format!(
                "Cannot {} constraint '{}' on type parameter '{}' of '{}'",
                if *change == DifferenceType::Added {
                    "add"
                } else {
                    "remove"
                },
                constraint,
                param,
                set.member_display(*left)
            ),
        }
    }
}

impl fmt::Display for CompatDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.difference_type())
    }
}
