//! Enums are value contracts: underlying type and member values must match.

use std::collections::HashMap;

use crate::compare::difference::CompatDifference;
use crate::compare::mapper::TypeMapper;
use crate::compare::modifiers::enum_underlying_type;
use crate::compare::rules::CompatRule;
use crate::metadata::resolver::sig_identity;
use crate::metadata::signatures::TypeSig;
use crate::metadata::types::{AssemblySet, FieldDef, TypeId};

/// Reports enums whose underlying type or member constants changed.
///
/// Enum values are compiled into consumers as raw constants, so a changed
/// value silently changes consumer behavior even though everything still
/// binds. Members removed from the enum are reported by the member-existence
/// rule, not here.
pub struct EnumsMustMatch;

impl CompatRule for EnumsMustMatch {
    fn run_type(
        &self,
        set: &AssemblySet,
        mapper: &TypeMapper,
        differences: &mut Vec<CompatDifference>,
    ) {
        let (Some(left), Some(right)) = (mapper.element.left(), mapper.element.right()) else {
            return;
        };
        if !set.type_def(left).is_enum() || !set.type_def(right).is_enum() {
            return;
        }

        let (Some(left_underlying), Some(right_underlying)) = (
            enum_underlying_type(set, left),
            enum_underlying_type(set, right),
        ) else {
            return;
        };

        if !underlying_matches(&left_underlying, &right_underlying) {
            differences.push(CompatDifference::EnumTypesMustMatch {
                left,
                left_underlying: left_underlying.to_string(),
                right_underlying: right_underlying.to_string(),
            });
            return;
        }

        let right_members: HashMap<&str, &FieldDef> = static_fields(set, right)
            .map(|field| (field.name.as_str(), field))
            .collect();

        for left_field in static_fields(set, left) {
            let Some(right_field) = right_members.get(left_field.name.as_str()) else {
                continue;
            };
            let values_match = match (&left_field.constant, &right_field.constant) {
                (Some(l), Some(r)) => l.matches(r),
                _ => false,
            };
            if !values_match {
                differences.push(CompatDifference::EnumValuesMustMatch {
                    left,
                    field: left_field.name.clone(),
                    left_value: left_field
                        .constant
                        .clone()
                        .unwrap_or(crate::metadata::types::Constant::Null),
                    right_value: right_field
                        .constant
                        .clone()
                        .unwrap_or(crate::metadata::types::Constant::Null),
                });
            }
        }
    }
}

fn underlying_matches(left: &TypeSig, right: &TypeSig) -> bool {
    match (left, right) {
        (TypeSig::Primitive(l), TypeSig::Primitive(r)) => l == r,
        _ => sig_identity(left).is_some() && sig_identity(left) == sig_identity(right),
    }
}

fn static_fields<'a>(
    set: &'a AssemblySet,
    id: TypeId,
) -> impl Iterator<Item = &'a FieldDef> + 'a {
    set.type_def(id)
        .fields
        .iter()
        .map(move |&f| set.field_def(f))
        .filter(|f| f.is_static())
}
