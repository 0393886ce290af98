//! # unbreaker Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! from the unbreaker library. Import this module to get quick access to the
//! essential types for surface comparison and shim rewriting.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all unbreaker operations
pub use crate::Error;

/// The result type used throughout unbreaker
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// One-step comparison, reference rewriting and consumer rewriting
pub use crate::{compare_assemblies, process_consumer, process_reference};

// ================================================================================================
// Metadata Model
// ================================================================================================

/// Arena storage for assembly graphs and the ids addressing it
pub use crate::metadata::types::{
    AsmId, AssemblySet, EventId, FieldId, MemberId, MethodId, PropertyId, TypeId,
};

/// Definition structures and their flag sets
pub use crate::metadata::types::{
    Assembly, Constant, EventDef, FieldDef, FieldFlags, GenericParam, GenericParamFlags, MethodDef,
    MethodFlags, ParamDef, PropertyDef, TypeDef, TypeFlags, TypeVisibility,
};

/// Fluent builders for constructing in-memory assemblies
pub use crate::metadata::builder::{
    AssemblyBuilder, EventBuilder, FieldBuilder, MethodBuilder, PropertyBuilder, TypeBuilder,
};

/// Version-agnostic identity keys
pub use crate::metadata::identity::{
    AssemblyName, MemberIdentity, MemberKey, TypeIdentity, Version,
};

/// Signature shapes for types, methods, properties and member references
pub use crate::metadata::signatures::{
    MemberRef, MemberRefSig, MethodSig, Primitive, PropertySig, TypeRefPath, TypeSig,
};

/// Method bodies and instructions
pub use crate::metadata::body::{ExceptionHandler, Instruction, MethodBody, OpCode, Operand};

/// Custom attributes, security declarations and their decoded arguments
pub use crate::metadata::attributes::{
    AttrValue, CustomAttribute, NamedArg, SecurityAction, SecurityDecl,
};

/// Accessibility lattice
pub use crate::metadata::visibility::Accessibility;

/// Non-fatal observations collected during a run
pub use crate::metadata::diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics};

// ================================================================================================
// Comparison
// ================================================================================================

/// Surface mapping and rule evaluation
pub use crate::compare::{
    ApiComparer, AssemblyMapper, CompatDifference, DifferenceType, MapperSettings, Side,
};

// ================================================================================================
// Shim Model and Rewriting
// ================================================================================================

/// Validated shim assembly model
pub use crate::shim::{ShimFieldSource, ShimMember, ShimModel, ShimTypeKind, ShimTypeModel};

/// Rewriting processors
pub use crate::rewrite::{ConsumerProcessor, ReferenceProcessor};
