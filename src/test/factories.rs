//! Shared assembly factories for unit tests.

use crate::metadata::attributes::{AttrValue, CustomAttribute};
use crate::metadata::builder::AssemblyBuilder;
use crate::metadata::identity::{AssemblyName, Version};
use crate::metadata::signatures::TypeRefPath;
use crate::metadata::types::{AsmId, AssemblySet};
use crate::shim::markers;

// Creates a declarative marker attribute the way a shim assembly carries it.
pub(crate) fn marker(name: &str, args: Vec<AttrValue>) -> CustomAttribute {
    CustomAttribute::new(
        TypeRefPath::new(
            AssemblyName::unversioned("Shim"),
            markers::MARKER_NAMESPACE,
            name,
        ),
        args,
    )
}

// Creates a v2 target assembly and a shim assembly declared against it.
pub(crate) fn shim_pair(set: &mut AssemblySet) -> (AsmId, AsmId) {
    let target = AssemblyBuilder::new("Contoso.Core", Version::new(2, 0, 0, 0)).build(set);
    let shim = AssemblyBuilder::new("Contoso.Core.Shims", Version::new(1, 0, 0, 0))
        .attribute(marker(
            "ShimAttribute",
            vec![AttrValue::String("Contoso.Core".into())],
        ))
        .build(set);
    (target, shim)
}
