//! Reference resolution over an [`AssemblySet`].
//!
//! Resolution is version-agnostic throughout: a reference carrying
//! `Lib, Version=1.0.0.0` resolves against whichever `Lib` is loaded.
//! Exported-type forwarders are followed transitively, so a reference into a
//! facade assembly lands on the real definition.
//!
//! Strict (`Result`-returning) entry points serve the rewriting passes, where
//! an unresolvable reference makes the output wrong; analysis passes use the
//! `try_` variants and degrade through diagnostics instead.

use crate::metadata::identity::{MemberIdentity, TypeIdentity};
use crate::metadata::signatures::{MemberRef, MemberRefSig, TypeRefPath, TypeSig};
use crate::metadata::types::{AsmId, AssemblySet, ExportedType, FieldId, MemberId, MethodId, TypeId};
use crate::{Error, Result};

impl AssemblySet {
    /// Finds a type definition by identity within one assembly, following the
    /// assembly's exported-type forwarders when the definition lives elsewhere.
    #[must_use]
    pub fn find_type(&self, assembly: AsmId, identity: &TypeIdentity) -> Option<TypeId> {
        if let Some(found) = self.find_type_def(assembly, identity) {
            return Some(found);
        }
        let forwarder = self
            .assembly(assembly)
            .exported_types
            .iter()
            .find(|e| e.namespace == identity.namespace && Some(&e.name) == identity.names.first())?;
        let target = self.find_assembly(&forwarder.forwarded_to.name)?;
        self.find_type(target, identity)
    }

    fn find_type_def(&self, assembly: AsmId, identity: &TypeIdentity) -> Option<TypeId> {
        let (first, rest) = identity.names.split_first()?;
        let mut current = *self.assembly(assembly).types.iter().find(|&&id| {
            let def = self.type_def(id);
            def.namespace == identity.namespace && def.name == *first
        })?;
        for name in rest {
            current = *self
                .type_def(current)
                .nested_types
                .iter()
                .find(|&&id| self.type_def(id).name == *name)?;
        }
        Some(current)
    }

    /// Resolves a type reference to its definition, or `None` when the
    /// assembly or type is not part of the set.
    #[must_use]
    pub fn try_resolve_type(&self, path: &TypeRefPath) -> Option<TypeId> {
        let mut scope = path;
        while let Some(parent) = scope.declaring.as_deref() {
            scope = parent;
        }
        let assembly = self.find_assembly(&scope.assembly.name)?;
        self.find_type(assembly, &TypeIdentity::of_ref(path))
    }

    /// Resolves a type reference to its definition.
    ///
    /// # Errors
    /// Returns [`Error::UnresolvedType`] when the reference has no matching
    /// definition in the set.
    pub fn resolve_type(&self, path: &TypeRefPath) -> Result<TypeId> {
        self.try_resolve_type(path)
            .ok_or_else(|| Error::UnresolvedType(path.full_name()))
    }

    /// Resolves the definition behind a type signature: the named type itself,
    /// or the open type of a generic instantiation. Signatures with no named
    /// root (primitives, arrays, generic parameters) resolve to `None`.
    #[must_use]
    pub fn try_resolve_sig(&self, sig: &TypeSig) -> Option<TypeId> {
        match sig {
            TypeSig::Named(path) | TypeSig::GenericInst { base: path, .. } => {
                self.try_resolve_type(path)
            }
            _ => None,
        }
    }

    /// Resolves a member reference to its definition.
    ///
    /// Candidates are matched by version-agnostic identity against the
    /// resolved parent type's direct members. Property and event accessors
    /// participate as ordinary methods.
    ///
    /// # Errors
    /// - [`Error::UnresolvedType`] when the parent type cannot be resolved
    /// - [`Error::UnresolvedMember`] when no member matches
    /// - [`Error::AmbiguousMember`] when more than one member matches
    pub fn resolve_member(&self, reference: &MemberRef) -> Result<MemberId> {
        let parent = self.resolve_type(&reference.parent)?;
        let wanted = MemberIdentity::of_ref(reference);
        let def = self.type_def(parent);

        let mut matches = Vec::new();
        match &reference.signature {
            MemberRefSig::Method(_) => {
                for &method in &def.methods {
                    let candidate = MemberId::Method(method);
                    if MemberIdentity::of_member(self, candidate) == wanted {
                        matches.push(candidate);
                    }
                }
            }
            MemberRefSig::Field(_) => {
                for &field in &def.fields {
                    let candidate = MemberId::Field(field);
                    if MemberIdentity::of_member(self, candidate) == wanted {
                        matches.push(candidate);
                    }
                }
            }
        }

        match matches.len() {
            0 => Err(Error::UnresolvedMember(reference.to_string())),
            1 => Ok(matches[0]),
            _ => Err(Error::AmbiguousMember(reference.to_string())),
        }
    }

    /// Resolves an exported-type forwarder row to the definition it forwards
    /// to, or `None` when the target assembly is not loaded or the type does
    /// not exist there.
    #[must_use]
    pub fn resolve_exported(&self, exported: &ExportedType) -> Option<TypeId> {
        let target = self.find_assembly(&exported.forwarded_to.name)?;
        self.find_type(
            target,
            &TypeIdentity {
                namespace: exported.namespace.clone(),
                names: vec![exported.name.clone()],
            },
        )
    }

    /// Walks the base-type chain of a type, innermost base first.
    ///
    /// Unresolvable base references (types outside the loaded set, such as
    /// `System.Object` when no core library is loaded) end the walk silently.
    #[must_use]
    pub fn base_chain(&self, id: TypeId) -> Vec<TypeId> {
        let mut chain = Vec::new();
        let mut current = id;
        while let Some(base) = &self.type_def(current).base_type {
            match self.try_resolve_sig(base) {
                Some(base_id) => {
                    chain.push(base_id);
                    current = base_id;
                }
                None => break,
            }
        }
        chain
    }

    /// All base types of a type: for interfaces the transitive set of base
    /// interfaces, for classes the base-type chain. Unresolvable references
    /// are skipped.
    #[must_use]
    pub fn all_base_types(&self, id: TypeId) -> Vec<TypeId> {
        if !self.type_def(id).is_interface() {
            return self.base_chain(id);
        }
        let mut result = Vec::new();
        let mut pending = self.resolved_interfaces(id);
        while let Some(interface) = pending.pop() {
            if !result.contains(&interface) {
                pending.extend(self.resolved_interfaces(interface));
                result.push(interface);
            }
        }
        result
    }

    /// Collects the identities of all interfaces a type implements:
    /// direct interfaces, interfaces of its base types, and the base
    /// interfaces of those, transitively.
    #[must_use]
    pub fn all_interface_identities(&self, id: TypeId) -> Vec<TypeIdentity> {
        let mut result = Vec::new();
        let mut pending = vec![id];
        pending.extend(self.base_chain(id));
        let mut seen = Vec::new();
        while let Some(type_id) = pending.pop() {
            if seen.contains(&type_id) {
                continue;
            }
            seen.push(type_id);
            for interface in &self.type_def(type_id).interfaces {
                if let Some(identity) = sig_identity(interface) {
                    if !result.contains(&identity) {
                        result.push(identity);
                    }
                }
                if let Some(resolved) = self.try_resolve_sig(interface) {
                    pending.push(resolved);
                }
            }
        }
        result
    }

    /// Finds a type definition by identity in any loaded assembly, searching
    /// in load order.
    #[must_use]
    pub fn find_type_anywhere(&self, identity: &TypeIdentity) -> Option<TypeId> {
        self.assemblies()
            .find_map(|(id, _)| self.find_type_def(id, identity))
    }

    /// Builds a reference to a type definition, chaining through its declaring
    /// types.
    #[must_use]
    pub fn type_ref(&self, id: TypeId) -> TypeRefPath {
        let def = self.type_def(id);
        match def.declaring_type {
            Some(parent) => self.type_ref(parent).nested(def.name.clone()),
            None => TypeRefPath::new(
                self.assembly(def.assembly).name.clone(),
                def.namespace.clone(),
                def.name.clone(),
            ),
        }
    }

    /// Builds a reference to a method definition.
    #[must_use]
    pub fn method_ref(&self, id: MethodId) -> MemberRef {
        let def = self.method_def(id);
        MemberRef::method(
            self.type_ref(def.declaring_type),
            def.name.clone(),
            def.signature.clone(),
        )
    }

    /// Builds a reference to a field definition.
    #[must_use]
    pub fn field_ref(&self, id: FieldId) -> MemberRef {
        let def = self.field_def(id);
        MemberRef::field(
            self.type_ref(def.declaring_type),
            def.name.clone(),
            def.signature.clone(),
        )
    }

    fn resolved_interfaces(&self, id: TypeId) -> Vec<TypeId> {
        self.type_def(id)
            .interfaces
            .iter()
            .filter_map(|sig| self.try_resolve_sig(sig))
            .collect()
    }
}

/// Identity of the named root of a type signature, if it has one.
#[must_use]
pub fn sig_identity(sig: &TypeSig) -> Option<TypeIdentity> {
    match sig {
        TypeSig::Named(path) | TypeSig::GenericInst { base: path, .. } => {
            Some(TypeIdentity::of_ref(path))
        }
        _ => None,
    }
}
