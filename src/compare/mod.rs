//! API surface comparison between two versions of an assembly.
//!
//! The pipeline has two stages: [`mapper`] pairs declarations from the left
//! (old) and right (new) assembly by version-agnostic identity, and
//! [`ApiComparer`] runs the rule catalog over the paired tree, collecting
//! [`CompatDifference`]s. Source-level modifier decoding lives in
//! [`modifiers`], the rules themselves in [`rules`].
//!
//! ```
//! use unbreaker::compare::{compare_assemblies, MapperSettings};
//! use unbreaker::metadata::builder::{AssemblyBuilder, TypeBuilder};
//! use unbreaker::metadata::diagnostics::Diagnostics;
//! use unbreaker::metadata::identity::Version;
//! use unbreaker::metadata::types::AssemblySet;
//!
//! let mut set = AssemblySet::new();
//! let left = AssemblyBuilder::new("Lib", Version::new(1, 0, 0, 0)).build(&mut set);
//! let right = AssemblyBuilder::new("Lib", Version::new(2, 0, 0, 0)).build(&mut set);
//! TypeBuilder::new(left, "Contoso", "Widget").build(&mut set);
//!
//! let mut diagnostics = Diagnostics::new();
//! let differences =
//!     compare_assemblies(&set, left, right, MapperSettings::default(), &mut diagnostics)?;
//! assert_eq!(differences.len(), 1); // Contoso.Widget is missing on the right
//! # Ok::<(), unbreaker::Error>(())
//! ```

pub mod difference;
pub mod mapper;
pub mod modifiers;
pub mod rules;

pub use difference::{CompatDifference, DifferenceType};
pub use mapper::{AssemblyMapper, ElementMapper, MapperSettings, MemberMapper, Side, TypeMapper};

use crate::metadata::diagnostics::Diagnostics;
use crate::metadata::types::{AsmId, AssemblySet};
use crate::Result;
use rules::{default_rules, CompatRule};

/// Runs a rule catalog over a mapped assembly pair.
pub struct ApiComparer {
    rules: Vec<Box<dyn CompatRule>>,
}

impl Default for ApiComparer {
    fn default() -> Self {
        ApiComparer::new()
    }
}

impl ApiComparer {
    /// A comparer with the default rule catalog.
    #[must_use]
    pub fn new() -> Self {
        ApiComparer {
            rules: default_rules(),
        }
    }

    /// A comparer with a custom rule catalog.
    #[must_use]
    pub fn with_rules(rules: Vec<Box<dyn CompatRule>>) -> Self {
        ApiComparer { rules }
    }

    /// Walks the mapper tree and collects every difference the rules report.
    ///
    /// Children of a type pair are only visited when both sides of the type
    /// exist; a missing type already covers everything beneath it.
    #[must_use]
    pub fn compare(&self, set: &AssemblySet, mapper: &AssemblyMapper) -> Vec<CompatDifference> {
        let mut differences = Vec::new();

        for rule in &self.rules {
            rule.run_assembly(set, mapper, &mut differences);
        }
        for type_mapper in mapper.types() {
            self.compare_type(set, type_mapper, &mut differences);
        }

        differences
    }

    fn compare_type(
        &self,
        set: &AssemblySet,
        mapper: &TypeMapper,
        differences: &mut Vec<CompatDifference>,
    ) {
        for rule in &self.rules {
            rule.run_type(set, mapper, differences);
        }

        if mapper.element.left().is_none() || mapper.element.right().is_none() {
            return;
        }

        for nested in mapper.nested_types() {
            self.compare_type(set, nested, differences);
        }
        for member in mapper.members() {
            for rule in &self.rules {
                rule.run_member(set, mapper, member, differences);
            }
        }
    }
}

/// Maps and compares two assemblies in one step.
///
/// # Errors
/// Fails when mapping produces colliding identities, see
/// [`mapper::ElementMapper::add`].
pub fn compare_assemblies(
    set: &AssemblySet,
    left: AsmId,
    right: AsmId,
    settings: MapperSettings,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<CompatDifference>> {
    let mapper = AssemblyMapper::create(set, left, right, settings, diagnostics)?;
    Ok(ApiComparer::new().compare(set, &mapper))
}
