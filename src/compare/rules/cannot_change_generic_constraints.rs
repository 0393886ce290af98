//! Generic-parameter constraints are part of the binding contract.

use crate::compare::difference::{CompatDifference, DifferenceType};
use crate::compare::mapper::{MemberMapper, TypeMapper};
use crate::compare::rules::CompatRule;
use crate::metadata::types::{
    AssemblySet, GenericParam, GenericParamFlags, MemberId, MethodFlags, TypeFlags,
};

/// Reports added or removed constraints on type parameters.
///
/// Additions always break: callers instantiating with a previously valid
/// argument stop compiling. Removals only break where code can observe the
/// broader parameter set, so they are permitted on sealed types and
/// non-virtual methods.
pub struct CannotChangeGenericConstraints;

impl CompatRule for CannotChangeGenericConstraints {
    fn run_type(
        &self,
        set: &AssemblySet,
        mapper: &TypeMapper,
        differences: &mut Vec<CompatDifference>,
    ) {
        let (Some(left), Some(right)) = (mapper.element.left(), mapper.element.right()) else {
            return;
        };
        let permit_removal = set.type_def(left).flags.contains(TypeFlags::SEALED);
        compare_params(
            &set.type_def(left).generic_params,
            &set.type_def(right).generic_params,
            MemberId::Type(left),
            permit_removal,
            differences,
        );
    }

    fn run_member(
        &self,
        set: &AssemblySet,
        _declaring: &TypeMapper,
        mapper: &MemberMapper,
        differences: &mut Vec<CompatDifference>,
    ) {
        let (Some(MemberId::Method(left)), Some(MemberId::Method(right))) =
            (mapper.element.left(), mapper.element.right())
        else {
            return;
        };
        let left_def = set.method_def(left);
        let permit_removal = !left_def.flags.contains(MethodFlags::VIRTUAL);
        compare_params(
            &left_def.generic_params,
            &set.method_def(right).generic_params,
            MemberId::Method(left),
            permit_removal,
            differences,
        );
    }
}

fn compare_params(
    left_params: &[GenericParam],
    right_params: &[GenericParam],
    owner: MemberId,
    permit_removal: bool,
    differences: &mut Vec<CompatDifference>,
) {
    for (left, right) in left_params.iter().zip(right_params) {
        compare_flag_constraint(
            left,
            right,
            GenericParamFlags::REFERENCE_TYPE,
            "class",
            owner,
            permit_removal,
            differences,
        );
        compare_flag_constraint(
            left,
            right,
            GenericParamFlags::NOT_NULLABLE_VALUE_TYPE,
            "struct",
            owner,
            permit_removal,
            differences,
        );
        compare_flag_constraint(
            left,
            right,
            GenericParamFlags::DEFAULT_CONSTRUCTOR,
            "new()",
            owner,
            permit_removal,
            differences,
        );

        // type constraints are compared version-agnostically
        for constraint in &right.constraints {
            let stripped = constraint.strip_versions();
            if !left.constraints.iter().any(|c| c.strip_versions() == stripped) {
                differences.push(CompatDifference::CannotChangeGenericConstraint {
                    change: DifferenceType::Added,
                    left: owner,
                    param: left.name.clone(),
                    constraint: constraint.to_string(),
                });
            }
        }

        if !permit_removal {
            for constraint in &left.constraints {
                let stripped = constraint.strip_versions();
                if !right.constraints.iter().any(|c| c.strip_versions() == stripped) {
                    differences.push(CompatDifference::CannotChangeGenericConstraint {
                        change: DifferenceType::Removed,
                        left: owner,
                        param: left.name.clone(),
                        constraint: constraint.to_string(),
                    });
                }
            }
        }
    }
}

fn compare_flag_constraint(
    left: &GenericParam,
    right: &GenericParam,
    flag: GenericParamFlags,
    name: &str,
    owner: MemberId,
    permit_removal: bool,
    differences: &mut Vec<CompatDifference>,
) {
    let on_left = left.flags.contains(flag);
    let on_right = right.flags.contains(flag);
    if !on_left && on_right {
        differences.push(CompatDifference::CannotChangeGenericConstraint {
            change: DifferenceType::Added,
            left: owner,
            param: left.name.clone(),
            constraint: name.to_string(),
        });
    } else if !permit_removal && on_left && !on_right {
        differences.push(CompatDifference::CannotChangeGenericConstraint {
            change: DifferenceType::Removed,
            left: owner,
            param: left.name.clone(),
            constraint: name.to_string(),
        });
    }
}
