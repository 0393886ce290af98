//! Visibility of a paired declaration may widen but never narrow.

use crate::compare::difference::CompatDifference;
use crate::compare::mapper::{MemberMapper, TypeMapper};
use crate::compare::rules::CompatRule;
use crate::metadata::types::{AssemblySet, MemberId};
use crate::metadata::visibility::member_access;

/// Reports declarations whose visibility was reduced.
///
/// Comparison happens on normalized accessibilities, so changes that are
/// invisible to external consumers (`internal` to `private`, or
/// `protected internal` to `protected`) pass.
pub struct CannotChangeVisibility;

impl CannotChangeVisibility {
    fn check(
        set: &AssemblySet,
        left: Option<MemberId>,
        right: Option<MemberId>,
        differences: &mut Vec<CompatDifference>,
    ) {
        let (Some(left), Some(right)) = (left, right) else {
            return;
        };
        let left_access = member_access(set, left);
        let right_access = member_access(set, right);
        if left_access.normalize() > right_access.normalize() {
            differences.push(CompatDifference::CannotReduceVisibility {
                left,
                left_access,
                right_access,
            });
        }
    }
}

impl CompatRule for CannotChangeVisibility {
    fn run_type(
        &self,
        set: &AssemblySet,
        mapper: &TypeMapper,
        differences: &mut Vec<CompatDifference>,
    ) {
        Self::check(
            set,
            mapper.element.left().map(MemberId::Type),
            mapper.element.right().map(MemberId::Type),
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
        Self::check(
            set,
            mapper.element.left(),
            mapper.element.right(),
            differences,
        );
    }
}
