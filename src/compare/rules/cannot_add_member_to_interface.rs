//! Interface surfaces may not grow members that implementers must provide.

use crate::compare::difference::CompatDifference;
use crate::compare::mapper::{MemberMapper, TypeMapper};
use crate::compare::modifiers::{has_default_implementation, is_accessor};
use crate::compare::rules::CompatRule;
use crate::metadata::types::{AssemblySet, MemberId};

/// Reports members added to an interface without a default implementation.
///
/// Fields are exempt (interface fields are static), accessors are exempt
/// (covered through their property or event), and a member carrying a default
/// implementation binds fine for existing implementers.
pub struct CannotAddMemberToInterface;

impl CompatRule for CannotAddMemberToInterface {
    fn run_member(
        &self,
        set: &AssemblySet,
        _declaring: &TypeMapper,
        mapper: &MemberMapper,
        differences: &mut Vec<CompatDifference>,
    ) {
        let (None, Some(right)) = (mapper.element.left(), mapper.element.right()) else {
            return;
        };
        let Some(right_declaring) = set.declaring_type(right) else {
            return;
        };
        if !set.type_def(right_declaring).is_interface() {
            return;
        }
        if matches!(right, MemberId::Field(_)) {
            return;
        }
        if matches!(right, MemberId::Method(method) if is_accessor(set, method)) {
            return;
        }
        if has_default_implementation(set, right) {
            return;
        }
        differences.push(CompatDifference::CannotAddMemberToInterface { right });
    }
}
