//! Element mapping between two assembly surfaces.
//!
//! A mapper pairs declarations from a left (old) and right (new) assembly by
//! version-agnostic identity. Each node holds at most one element per side;
//! children are created on first sight from either side, so a declaration
//! present on only one side produces a half-filled mapper that the rules
//! interpret as an addition or removal.
//!
//! Traversal of pairs is insertion-ordered: results come out in the order the
//! left assembly declares things, with right-only additions after them.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::metadata::diagnostics::{DiagnosticCategory, Diagnostics};
use crate::metadata::identity::{MemberIdentity, TypeIdentity};
use crate::metadata::types::{AsmId, AssemblySet, MemberId, TypeId};
use crate::metadata::visibility::is_member_visible_outside;
use crate::{Error, Result};

/// Which side of a comparison an element belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Side {
    /// The old (contract) surface
    #[strum(serialize = "left")]
    Left,
    /// The new (implementation) surface
    #[strum(serialize = "right")]
    Right,
}

/// Controls which declarations participate in mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapperSettings {
    /// Include internal and private declarations instead of only the
    /// externally visible surface.
    pub include_internals: bool,
}

impl MapperSettings {
    fn includes_type(&self, set: &AssemblySet, id: TypeId) -> bool {
        let def = set.type_def(id);
        if def.namespace == "System.Runtime.CompilerServices" {
            return false;
        }
        self.include_internals || is_member_visible_outside(set, MemberId::Type(id))
    }

    fn includes_member(&self, set: &AssemblySet, member: MemberId) -> bool {
        self.include_internals || is_member_visible_outside(set, member)
    }
}

/// A pair of optional elements, one per side. Each side can be set at most
/// once.
#[derive(Debug, Clone, Copy)]
pub struct ElementMapper<T> {
    left: Option<T>,
    right: Option<T>,
}

impl<T> Default for ElementMapper<T> {
    fn default() -> Self {
        ElementMapper {
            left: None,
            right: None,
        }
    }
}

impl<T: Copy> ElementMapper<T> {
    /// The left element, if present.
    #[must_use]
    pub fn left(&self) -> Option<T> {
        self.left
    }

    /// The right element, if present.
    #[must_use]
    pub fn right(&self) -> Option<T> {
        self.right
    }

    /// The element on the given side, if present.
    #[must_use]
    pub fn get(&self, side: Side) -> Option<T> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Assigns the element for a side.
    ///
    /// # Errors
    /// Returns [`Error::SideAlreadySet`] when the side already holds a value.
    pub fn add(&mut self, value: T, side: Side) -> Result<()> {
        let slot = match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        if slot.is_some() {
            return Err(Error::SideAlreadySet(side));
        }
        *slot = Some(value);
        Ok(())
    }
}

/// A hash map that preserves insertion order for iteration.
#[derive(Debug)]
struct IdentityMap<K, V> {
    order: Vec<K>,
    entries: HashMap<K, V>,
}

impl<K: Eq + Hash + Clone, V> Default for IdentityMap<K, V> {
    fn default() -> Self {
        IdentityMap {
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, V> IdentityMap<K, V> {
    fn get_or_insert_with(&mut self, key: K, create: impl FnOnce() -> V) -> &mut V {
        if !self.entries.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.entries.entry(key).or_insert_with(create)
    }

    fn values(&self) -> impl Iterator<Item = &V> {
        self.order.iter().map(|key| &self.entries[key])
    }
}

/// Maps a member declaration between the two sides.
#[derive(Debug)]
pub struct MemberMapper {
    /// The paired elements
    pub element: ElementMapper<MemberId>,
    identity: MemberIdentity,
}

impl MemberMapper {
    /// The identity both sides share.
    #[must_use]
    pub fn identity(&self) -> &MemberIdentity {
        &self.identity
    }
}

/// Maps a type declaration between the two sides, with mappers for its nested
/// types and members.
#[derive(Debug)]
pub struct TypeMapper {
    /// The paired elements
    pub element: ElementMapper<TypeId>,
    identity: TypeIdentity,
    nested: IdentityMap<TypeIdentity, TypeMapper>,
    members: IdentityMap<MemberIdentity, MemberMapper>,
}

impl TypeMapper {
    fn new(identity: TypeIdentity) -> Self {
        TypeMapper {
            element: ElementMapper::default(),
            identity,
            nested: IdentityMap::default(),
            members: IdentityMap::default(),
        }
    }

    /// The identity both sides share.
    #[must_use]
    pub fn identity(&self) -> &TypeIdentity {
        &self.identity
    }

    /// Nested-type mappers in insertion order.
    pub fn nested_types(&self) -> impl Iterator<Item = &TypeMapper> {
        self.nested.values()
    }

    /// Member mappers in insertion order.
    pub fn members(&self) -> impl Iterator<Item = &MemberMapper> {
        self.members.values()
    }

    fn add(
        &mut self,
        set: &AssemblySet,
        id: TypeId,
        side: Side,
        settings: &MapperSettings,
    ) -> Result<()> {
        self.element.add(id, side)?;

        for member in set.members_of(id) {
            if settings.includes_member(set, member) {
                self.members
                    .get_or_insert_with(MemberIdentity::of_member(set, member), || MemberMapper {
                        element: ElementMapper::default(),
                        identity: MemberIdentity::of_member(set, member),
                    })
                    .element
                    .add(member, side)?;
            }
        }

        for &nested in &set.type_def(id).nested_types {
            if settings.includes_type(set, nested) {
                let identity = TypeIdentity::of_def(set, nested);
                self.nested
                    .get_or_insert_with(identity.clone(), || TypeMapper::new(identity))
                    .add(set, nested, side, settings)?;
            }
        }

        Ok(())
    }
}

/// The root mapper pairing two assemblies.
#[derive(Debug)]
pub struct AssemblyMapper {
    /// The paired elements
    pub element: ElementMapper<AsmId>,
    settings: MapperSettings,
    types: IdentityMap<TypeIdentity, TypeMapper>,
}

impl AssemblyMapper {
    /// Creates an empty mapper with the given settings.
    #[must_use]
    pub fn new(settings: MapperSettings) -> Self {
        AssemblyMapper {
            element: ElementMapper::default(),
            settings,
            types: IdentityMap::default(),
        }
    }

    /// Builds the mapper for a left/right assembly pair.
    ///
    /// # Errors
    /// Fails when either assembly produces colliding identities, see
    /// [`ElementMapper::add`].
    pub fn create(
        set: &AssemblySet,
        left: AsmId,
        right: AsmId,
        settings: MapperSettings,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let mut mapper = AssemblyMapper::new(settings);
        mapper.add(set, left, Side::Left, diagnostics)?;
        mapper.add(set, right, Side::Right, diagnostics)?;
        Ok(mapper)
    }

    /// Type mappers in insertion order.
    pub fn types(&self) -> impl Iterator<Item = &TypeMapper> {
        self.types.values()
    }

    /// Adds one assembly's surface to the given side: its top-level types
    /// plus the definitions behind its exported-type forwarders.
    ///
    /// A forwarder that cannot be resolved inside the loaded set aborts the
    /// forwarder scan with a diagnostic; the types mapped so far stay valid.
    ///
    /// # Errors
    /// See [`ElementMapper::add`].
    pub fn add(
        &mut self,
        set: &AssemblySet,
        assembly: AsmId,
        side: Side,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        self.element.add(assembly, side)?;

        let settings = self.settings;
        for &type_id in &set.assembly(assembly).types {
            if settings.includes_type(set, type_id) {
                self.add_type(set, type_id, side)?;
            }
        }

        for exported in &set.assembly(assembly).exported_types {
            let Some(resolved) = set.resolve_exported(exported) else {
                diagnostics.warn(
                    DiagnosticCategory::Resolution,
                    format!(
                        "failed to resolve exported type '{}.{}' forwarded to '{}'",
                        exported.namespace, exported.name, exported.forwarded_to
                    ),
                );
                return Ok(());
            };
            if settings.includes_type(set, resolved) {
                self.add_type(set, resolved, side)?;
            }
        }

        Ok(())
    }

    fn add_type(&mut self, set: &AssemblySet, id: TypeId, side: Side) -> Result<()> {
        let settings = self.settings;
        let identity = TypeIdentity::of_def(set, id);
        self.types
            .get_or_insert_with(identity.clone(), || TypeMapper::new(identity))
            .add(set, id, side, &settings)
    }
}

impl fmt::Display for MemberMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.identity {
            MemberIdentity::Method { name, sig } => write!(f, "{name}{sig}"),
            MemberIdentity::Field { name, .. }
            | MemberIdentity::Property { name, .. }
            | MemberIdentity::Event { name } => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::builder::{AssemblyBuilder, FieldBuilder, MethodBuilder, TypeBuilder};
    use crate::metadata::identity::Version;
    use crate::metadata::signatures::{MethodSig, Primitive, TypeSig};
    use crate::metadata::visibility::Accessibility;

    fn void_method() -> MethodSig {
        MethodSig::instance(TypeSig::Primitive(Primitive::Void), Vec::new())
    }

    #[test]
    fn test_element_mapper_defaults_empty_for_id_types() {
        // ids carry no Default of their own; the mapper must not require one
        let types = ElementMapper::<TypeId>::default();
        assert!(types.left().is_none());
        assert!(types.right().is_none());
        let members = ElementMapper::<MemberId>::default();
        assert!(members.get(Side::Left).is_none());
        assert!(members.get(Side::Right).is_none());
    }

    #[test]
    fn test_element_mapper_rejects_double_add() {
        let mut mapper = ElementMapper::default();
        mapper.add(1u32, Side::Left).unwrap();
        assert!(matches!(
            mapper.add(2u32, Side::Left),
            Err(Error::SideAlreadySet(Side::Left))
        ));
        mapper.add(2u32, Side::Right).unwrap();
        assert_eq!(mapper.left(), Some(1));
        assert_eq!(mapper.right(), Some(2));
    }

    #[test]
    fn test_pairs_types_across_versions() {
        let mut set = AssemblySet::new();
        let left = AssemblyBuilder::new("Lib", Version::new(1, 0, 0, 0)).build(&mut set);
        let right = AssemblyBuilder::new("Lib", Version::new(2, 0, 0, 0)).build(&mut set);

        let left_widget = TypeBuilder::new(left, "Contoso", "Widget").build(&mut set);
        MethodBuilder::new(left_widget, "Frob", void_method()).build(&mut set);
        let right_widget = TypeBuilder::new(right, "Contoso", "Widget").build(&mut set);
        MethodBuilder::new(right_widget, "Frob", void_method()).build(&mut set);

        let mut diagnostics = Diagnostics::new();
        let mapper = AssemblyMapper::create(
            &set,
            left,
            right,
            MapperSettings::default(),
            &mut diagnostics,
        )
        .unwrap();

        let types: Vec<_> = mapper.types().collect();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].element.left(), Some(left_widget));
        assert_eq!(types[0].element.right(), Some(right_widget));

        let members: Vec<_> = types[0].members().collect();
        assert_eq!(members.len(), 1);
        assert!(members[0].element.left().is_some() && members[0].element.right().is_some());
    }

    #[test]
    fn test_invisible_members_are_filtered() {
        let mut set = AssemblySet::new();
        let left = AssemblyBuilder::new("Lib", Version::new(1, 0, 0, 0)).build(&mut set);
        let right = AssemblyBuilder::new("Lib", Version::new(2, 0, 0, 0)).build(&mut set);

        let left_widget = TypeBuilder::new(left, "Contoso", "Widget").build(&mut set);
        MethodBuilder::constructor(left_widget, Vec::new()).build(&mut set);
        FieldBuilder::new(left_widget, "_state", TypeSig::Primitive(Primitive::I4))
            .access(Accessibility::Private)
            .build(&mut set);
        let right_widget = TypeBuilder::new(right, "Contoso", "Widget").build(&mut set);
        MethodBuilder::constructor(right_widget, Vec::new()).build(&mut set);

        let mut diagnostics = Diagnostics::new();
        let mapper = AssemblyMapper::create(
            &set,
            left,
            right,
            MapperSettings::default(),
            &mut diagnostics,
        )
        .unwrap();

        let types: Vec<_> = mapper.types().collect();
        let members: Vec<_> = types[0].members().collect();
        // only the constructors map; the private field is filtered out
        assert_eq!(members.len(), 1);
    }

    #[test]
    fn test_exported_type_forwarder_resolves_into_pair() {
        let mut set = AssemblySet::new();
        let facade = AssemblyBuilder::new("Facade", Version::new(1, 0, 0, 0))
            .exported_type(
                "Contoso",
                "Widget",
                crate::metadata::identity::AssemblyName::unversioned("Impl"),
            )
            .build(&mut set);
        let impl_asm = AssemblyBuilder::new("Impl", Version::new(1, 0, 0, 0)).build(&mut set);
        let widget = TypeBuilder::new(impl_asm, "Contoso", "Widget").build(&mut set);
        MethodBuilder::constructor(widget, Vec::new()).build(&mut set);

        let right = AssemblyBuilder::new("Facade", Version::new(2, 0, 0, 0)).build(&mut set);
        let right_widget = TypeBuilder::new(right, "Contoso", "Widget").build(&mut set);
        MethodBuilder::constructor(right_widget, Vec::new()).build(&mut set);

        let mut diagnostics = Diagnostics::new();
        let mapper = AssemblyMapper::create(
            &set,
            facade,
            right,
            MapperSettings::default(),
            &mut diagnostics,
        )
        .unwrap();

        let types: Vec<_> = mapper.types().collect();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].element.left(), Some(widget));
        assert_eq!(types[0].element.right(), Some(right_widget));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unresolvable_forwarder_records_diagnostic() {
        let mut set = AssemblySet::new();
        let facade = AssemblyBuilder::new("Facade", Version::new(1, 0, 0, 0))
            .exported_type(
                "Contoso",
                "Widget",
                crate::metadata::identity::AssemblyName::unversioned("Missing"),
            )
            .build(&mut set);
        let right = AssemblyBuilder::new("Facade", Version::new(2, 0, 0, 0)).build(&mut set);

        let mut diagnostics = Diagnostics::new();
        AssemblyMapper::create(
            &set,
            facade,
            right,
            MapperSettings::default(),
            &mut diagnostics,
        )
        .unwrap();

        assert!(diagnostics.has_warnings());
    }
}
