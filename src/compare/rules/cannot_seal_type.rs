//! Types open for derivation must stay open.

use crate::compare::difference::CompatDifference;
use crate::compare::mapper::TypeMapper;
use crate::compare::rules::CompatRule;
use crate::metadata::types::AssemblySet;
use crate::metadata::visibility::is_effectively_sealed;

/// Reports types that became sealed, either through the sealed modifier or by
/// losing their last visible constructor.
pub struct CannotSealType;

impl CompatRule for CannotSealType {
    fn run_type(
        &self,
        set: &AssemblySet,
        mapper: &TypeMapper,
        differences: &mut Vec<CompatDifference>,
    ) {
        let (Some(left), Some(right)) = (mapper.element.left(), mapper.element.right()) else {
            return;
        };
        if set.type_def(left).is_interface() || set.type_def(right).is_interface() {
            return;
        }
        if !is_effectively_sealed(set, left) && is_effectively_sealed(set, right) {
            differences.push(CompatDifference::CannotSealType { right });
        }
    }
}
