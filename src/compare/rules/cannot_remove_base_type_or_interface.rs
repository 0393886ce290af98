//! Base types and implemented interfaces may not disappear from a type.

use crate::compare::difference::CompatDifference;
use crate::compare::mapper::TypeMapper;
use crate::compare::rules::CompatRule;
use crate::metadata::resolver::sig_identity;
use crate::metadata::types::{AssemblySet, MemberId, TypeId};
use crate::metadata::visibility::is_member_visible_outside;

/// Reports removed base types and removed interface implementations.
///
/// Moving the base type further up the hierarchy is allowed as long as the
/// left's immediate base still appears somewhere on the right's chain; any
/// break higher up is reported on the type whose base actually changed.
pub struct CannotRemoveBaseTypeOrInterface;

impl CompatRule for CannotRemoveBaseTypeOrInterface {
    fn run_type(
        &self,
        set: &AssemblySet,
        mapper: &TypeMapper,
        differences: &mut Vec<CompatDifference>,
    ) {
        let (Some(left), Some(right)) = (mapper.element.left(), mapper.element.right()) else {
            return;
        };

        if !set.type_def(left).is_interface() && !set.type_def(right).is_interface() {
            validate_base_type(set, left, right, differences);
        }
        validate_interfaces(set, left, right, differences);
    }
}

fn validate_base_type(
    set: &AssemblySet,
    left: TypeId,
    right: TypeId,
    differences: &mut Vec<CompatDifference>,
) {
    let Some(left_base) = set.type_def(left).base_type.clone() else {
        return;
    };
    let Some(left_identity) = sig_identity(&left_base) else {
        return;
    };

    let mut right_base = set.type_def(right).base_type.clone();
    while let Some(base) = right_base {
        if sig_identity(&base).as_ref() == Some(&left_identity) {
            return;
        }
        right_base = set
            .try_resolve_sig(&base)
            .and_then(|id| set.type_def(id).base_type.clone());
    }

    differences.push(CompatDifference::CannotRemoveBaseType {
        left,
        base: left_base.to_string(),
    });
}

fn validate_interfaces(
    set: &AssemblySet,
    left: TypeId,
    right: TypeId,
    differences: &mut Vec<CompatDifference>,
) {
    let right_interfaces = set.all_interface_identities(right);

    for left_interface in set.all_interface_identities(left) {
        // interfaces invisible to external consumers are not part of the
        // contract; resolution failures keep the identity in play
        if let Some(resolved) = set.find_type_anywhere(&left_interface) {
            if !is_member_visible_outside(set, MemberId::Type(resolved)) {
                return;
            }
        }

        if !right_interfaces.contains(&left_interface) {
            differences.push(CompatDifference::CannotRemoveBaseInterface {
                left,
                interface: left_interface,
            });
            return;
        }
    }
}
