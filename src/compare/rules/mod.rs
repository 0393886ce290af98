//! The binary-compatibility rule catalog.
//!
//! Each rule inspects one mapper node at a time and appends any violations it
//! finds. Rules are independent: a missing member is reported only by
//! [`MembersMustExist`], so every other rule bails out when a side it needs
//! is absent.
//!
//! [`default_rules`] returns the catalog in its fixed evaluation order, which
//! is also the order differences appear in for any single mapper node.

mod cannot_add_abstract_member;
mod cannot_add_member_to_interface;
mod cannot_add_or_remove_virtual_keyword;
mod cannot_change_generic_constraints;
mod cannot_change_visibility;
mod cannot_remove_base_type_or_interface;
mod cannot_seal_type;
mod enums_must_match;
mod members_must_exist;

pub use cannot_add_abstract_member::CannotAddAbstractMember;
pub use cannot_add_member_to_interface::CannotAddMemberToInterface;
pub use cannot_add_or_remove_virtual_keyword::CannotAddOrRemoveVirtualKeyword;
pub use cannot_change_generic_constraints::CannotChangeGenericConstraints;
pub use cannot_change_visibility::CannotChangeVisibility;
pub use cannot_remove_base_type_or_interface::CannotRemoveBaseTypeOrInterface;
pub use cannot_seal_type::CannotSealType;
pub use enums_must_match::EnumsMustMatch;
pub use members_must_exist::MembersMustExist;

use crate::compare::difference::CompatDifference;
use crate::compare::mapper::{AssemblyMapper, MemberMapper, TypeMapper};
use crate::metadata::types::AssemblySet;

/// A single compatibility rule.
///
/// The default implementations do nothing; rules override the levels they
/// care about.
pub trait CompatRule {
    /// Runs against the assembly pair.
    fn run_assembly(
        &self,
        set: &AssemblySet,
        mapper: &AssemblyMapper,
        differences: &mut Vec<CompatDifference>,
    ) {
        let _ = (set, mapper, differences);
    }

    /// Runs against a type pair.
    fn run_type(&self, set: &AssemblySet, mapper: &TypeMapper, differences: &mut Vec<CompatDifference>) {
        let _ = (set, mapper, differences);
    }

    /// Runs against a member pair. `declaring` is the mapper of the type both
    /// sides of the member belong to.
    fn run_member(
        &self,
        set: &AssemblySet,
        declaring: &TypeMapper,
        mapper: &MemberMapper,
        differences: &mut Vec<CompatDifference>,
    ) {
        let _ = (set, declaring, mapper, differences);
    }
}

/// The rule catalog in evaluation order.
#[must_use]
pub fn default_rules() -> Vec<Box<dyn CompatRule>> {
    vec![
        Box::new(CannotAddAbstractMember),
        Box::new(CannotAddMemberToInterface),
        Box::new(CannotAddOrRemoveVirtualKeyword),
        Box::new(CannotRemoveBaseTypeOrInterface),
        Box::new(CannotSealType),
        Box::new(EnumsMustMatch),
        Box::new(MembersMustExist),
        Box::new(CannotChangeVisibility),
        Box::new(CannotChangeGenericConstraints),
    ]
}
