//! Everything visible on the left surface must still exist on the right.

use crate::compare::difference::CompatDifference;
use crate::compare::mapper::{MemberMapper, TypeMapper};
use crate::compare::modifiers::{is_explicit_interface_implementation, is_override};
use crate::compare::rules::CompatRule;
use crate::metadata::identity::MemberIdentity;
use crate::metadata::types::{AssemblySet, MemberId, TypeId};

/// Reports left types and members with no counterpart on the right.
pub struct MembersMustExist;

impl CompatRule for MembersMustExist {
    fn run_type(
        &self,
        _set: &AssemblySet,
        mapper: &TypeMapper,
        differences: &mut Vec<CompatDifference>,
    ) {
        if let (Some(left), None) = (mapper.element.left(), mapper.element.right()) {
            differences.push(CompatDifference::TypeMustExist { left });
        }
    }

    fn run_member(
        &self,
        set: &AssemblySet,
        declaring: &TypeMapper,
        mapper: &MemberMapper,
        differences: &mut Vec<CompatDifference>,
    ) {
        if let (Some(left), None) = (mapper.element.left(), mapper.element.right()) {
            if should_report(set, left, declaring.element.right()) {
                differences.push(CompatDifference::MemberMustExist { left });
            }
        }
    }
}

fn should_report(set: &AssemblySet, left: MemberId, right_declaring: Option<TypeId>) -> bool {
    if let MemberId::Method(method) = left {
        // explicit implementations surface through interface mapping, not here
        if is_explicit_interface_implementation(set, method) {
            return false;
        }
        // overrides and members promoted to a base type still bind
        if is_override(set, left) || promoted_to_base(set, left, right_declaring) {
            return false;
        }
    }
    true
}

fn promoted_to_base(set: &AssemblySet, left: MemberId, right_declaring: Option<TypeId>) -> bool {
    let MemberId::Method(method) = left else {
        return false;
    };
    if set.method_def(method).is_constructor() {
        // constructors cannot be promoted
        return false;
    }
    let Some(declaring) = right_declaring else {
        return false;
    };
    let wanted = MemberIdentity::of_member(set, left);
    for base in set.all_base_types(declaring) {
        for &candidate in &set.type_def(base).methods {
            if MemberIdentity::of_member(set, MemberId::Method(candidate)) == wanted {
                return true;
            }
        }
    }
    false
}
