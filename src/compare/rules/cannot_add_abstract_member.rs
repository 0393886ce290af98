//! Abstract members may not appear on types external code can derive from.

use crate::compare::difference::CompatDifference;
use crate::compare::mapper::{MemberMapper, TypeMapper};
use crate::compare::modifiers::is_roslyn_abstract;
use crate::compare::rules::CompatRule;
use crate::metadata::types::AssemblySet;
use crate::metadata::visibility::is_effectively_sealed;

/// Reports abstract members added to an unsealed, non-interface type.
///
/// Existing subclasses compiled against the left surface do not implement the
/// new member, so loading them against the right surface fails. If the left
/// type was sealed (or had no visible constructor) nothing could derive from
/// it, and the addition is allowed. Interface additions are covered by their
/// own rule.
pub struct CannotAddAbstractMember;

impl CompatRule for CannotAddAbstractMember {
    fn run_member(
        &self,
        set: &AssemblySet,
        declaring: &TypeMapper,
        mapper: &MemberMapper,
        differences: &mut Vec<CompatDifference>,
    ) {
        let (None, Some(right)) = (mapper.element.left(), mapper.element.right()) else {
            return;
        };
        if !is_roslyn_abstract(set, right) {
            return;
        }
        if let Some(left_declaring) = declaring.element.left() {
            if !set.type_def(left_declaring).is_interface()
                && !is_effectively_sealed(set, left_declaring)
            {
                differences.push(CompatDifference::CannotAddAbstractMember { right });
            }
        }
    }
}
