//! Overridability of a member is part of the contract.

use crate::compare::difference::CompatDifference;
use crate::compare::mapper::{MemberMapper, TypeMapper};
use crate::compare::modifiers::{is_roslyn_abstract, is_roslyn_sealed, is_roslyn_virtual};
use crate::compare::rules::CompatRule;
use crate::metadata::types::{AssemblySet, MemberId};
use crate::metadata::visibility::is_effectively_sealed;

/// Reports virtual members that stopped being virtual, and default interface
/// members that gained the sealed keyword.
pub struct CannotAddOrRemoveVirtualKeyword;

fn is_sealed_member(set: &AssemblySet, member: MemberId) -> bool {
    is_roslyn_sealed(set, member)
        || (!is_roslyn_virtual(set, member) && !is_roslyn_abstract(set, member))
}

impl CompatRule for CannotAddOrRemoveVirtualKeyword {
    fn run_member(
        &self,
        set: &AssemblySet,
        _declaring: &TypeMapper,
        mapper: &MemberMapper,
        differences: &mut Vec<CompatDifference>,
    ) {
        let (Some(left), Some(right)) = (mapper.element.left(), mapper.element.right()) else {
            return;
        };

        let left_declaring = set.declaring_type(left);
        let right_declaring = set.declaring_type(right);
        let on_interface = left_declaring
            .map_or(false, |t| set.type_def(t).is_interface())
            || right_declaring.map_or(false, |t| set.type_def(t).is_interface());

        if on_interface {
            if !is_sealed_member(set, left) && is_sealed_member(set, right) {
                differences.push(CompatDifference::CannotAddSealedToInterfaceMember { right });
            }
            return;
        }

        if is_roslyn_virtual(set, left) {
            // a sealed declaring type has no overriders to break
            if left_declaring.map_or(false, |t| is_effectively_sealed(set, t)) {
                return;
            }
            if !is_roslyn_virtual(set, right) {
                differences.push(CompatDifference::CannotRemoveVirtualFromMember { right });
            }
        }
    }
}
