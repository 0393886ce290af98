// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![allow(dead_code)]

//! # unbreaker
//!
//! [![Crates.io](https://img.shields.io/crates/v/unbreaker.svg)](https://crates.io/crates/unbreaker)
//! [![Documentation](https://docs.rs/unbreaker/badge.svg)](https://docs.rs/unbreaker)
//! [![License](https://img.shields.io/badge/license-Apache--2.0-blue.svg)](https://github.com/BinFlip/unbreaker/blob/main/LICENSE-APACHE)
//!
//! Binary API-compatibility analysis and shim rewriting for managed assemblies.
//! `unbreaker` compares two versions of an assembly's public surface, reports every
//! binary-breaking difference, and rewrites shim assemblies so that consumers compiled
//! against the old surface keep running against the new one.
//!
//! ## Features
//!
//! - **🔍 Surface comparison** - Map two assembly versions element by element and
//!   report binary-incompatible changes through a fixed rule catalog
//! - **🧩 Shim modeling** - Scan a marker-annotated shim assembly into a validated
//!   model of new, replaced and extension declarations
//! - **🔧 Reference rewriting** - Materialize the shimmed surface into a stubbed
//!   reference assembly consumers can compile against
//! - **⚡ Consumer rewriting** - Redirect a consumer's metadata and IL from the old
//!   surface onto the shim definitions, including field-to-property indirection
//! - **🛡️ Version-agnostic identity** - All matching ignores assembly versions, so
//!   upgraded references never break the mapping
//!
//! ## Quick Start
//!
//! Add `unbreaker` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! unbreaker = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! For convenient access to the most commonly used types, import the prelude:
//!
//! ```rust
//! use unbreaker::prelude::*;
//!
//! let mut set = AssemblySet::new();
//! let v1 = AssemblyBuilder::new("Contoso.Core", Version::new(1, 0, 0, 0)).build(&mut set);
//! let v2 = AssemblyBuilder::new("Contoso.Core", Version::new(2, 0, 0, 0)).build(&mut set);
//! TypeBuilder::new(v1, "Contoso", "Widget")
//!     .visibility(TypeVisibility::Public)
//!     .build(&mut set);
//!
//! // The type exists in v1 but not in v2, which breaks consumers.
//! let (differences, _diagnostics) = unbreaker::compare_assemblies(&set, v1, v2)?;
//! assert!(!differences.is_empty());
//! # Ok::<(), unbreaker::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `unbreaker` is organized into several key modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types
//! - [`metadata`] - In-memory assembly model, identity and visibility computation
//! - [`compare`] - Element mapping and the compatibility rule catalog
//! - [`shim`] - Shim assembly scanning and model validation
//! - [`rewrite`] - Reference-surface and consumer rewriting passes
//! - [`Error`] and [`Result`] - Comprehensive error handling
//!
//! ### Comparison Pipeline
//!
//! [`compare::AssemblyMapper`] pairs the declarations of two assemblies by
//! version-agnostic identity, then [`compare::ApiComparer`] runs every rule of the
//! catalog over the mapped tree and collects [`compare::CompatDifference`] records.
//! Conditions that do not invalidate the comparison (such as an unresolvable
//! exported-type forwarder) are reported through
//! [`metadata::diagnostics::Diagnostics`] instead of failing the run.
//!
//! ### Shim Pipeline
//!
//! [`shim::ShimModel::from_assembly`] scans a shim assembly's marker attributes into
//! a validated model. [`rewrite::ReferenceProcessor`] then materializes the shimmed
//! surface into the target assembly as a throw-stub reference, and
//! [`rewrite::ConsumerProcessor`] redirects consumer assemblies onto the shim's
//! definitions.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). Every [`Error`] variant is a
//! fatal input or configuration problem; recoverable observations are collected as
//! diagnostics and never abort a run.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// This module provides a curated selection of the most frequently used types
/// from across the unbreaker library, allowing for convenient glob imports.
///
/// # Example
///
/// ```rust
/// use unbreaker::prelude::*;
///
/// let mut set = AssemblySet::new();
/// let assembly = AssemblyBuilder::new("Contoso.Core", Version::new(1, 0, 0, 0)).build(&mut set);
/// assert_eq!(set.assembly(assembly).name.name, "Contoso.Core");
/// ```
pub mod prelude;

/// In-memory assembly model: definitions, identity, signatures, visibility
///
/// This module provides the metadata facade every other part of the crate works
/// against. Assemblies, types and members live in arena storage inside an
/// [`metadata::types::AssemblySet`] and are addressed by copyable ids.
///
/// # Key Components
///
/// ## Storage and Construction
/// - [`metadata::types::AssemblySet`] - Arena storage for whole assembly graphs
/// - [`metadata::builder`] - Fluent builders that keep parent/child links consistent
///
/// ## Identity and Resolution
/// - [`metadata::identity`] - Version-agnostic type and member identities
/// - [`metadata::resolver`] - Reference-to-definition resolution with forwarder support
///
/// ## Shapes and Semantics
/// - [`metadata::signatures`] - Type, method and property signature shapes
/// - [`metadata::body`] - Method bodies as decoded instruction lists
/// - [`metadata::visibility`] - Accessibility lattice and effective visibility
/// - [`metadata::diagnostics`] - Non-fatal observations collected during a run
pub mod metadata;

/// Surface mapping and the binary-compatibility rule catalog
///
/// Pairs the declarations of two assembly versions by version-agnostic identity
/// and evaluates a fixed catalog of compatibility rules over the mapped tree.
///
/// # Key Components
///
/// - [`compare::AssemblyMapper`] - Identity-keyed element mapping of two surfaces
/// - [`compare::ApiComparer`] - Rule-catalog evaluation over a mapped tree
/// - [`compare::CompatDifference`] - One reported binary-breaking difference
/// - [`compare::compare_assemblies`] - Mapping and comparison in one step
pub mod compare;

/// Shim assembly scanning and model validation
///
/// Reads the marker attributes of a shim assembly and produces the validated
/// [`shim::ShimModel`] both rewriting processors consume.
///
/// # Key Components
///
/// - [`shim::markers`] - Marker attribute recognition and argument decoding
/// - [`shim::ShimModel`] - Validated model of every shim type and member
pub mod shim;

/// Assembly rewriting passes driven by a shim model
///
/// # Key Components
///
/// - [`rewrite::ReferenceProcessor`] - Shim surface materialization into the target
/// - [`rewrite::ConsumerProcessor`] - Consumer metadata and IL redirection
/// - [`rewrite::RedirectImporter`] - Pure reference substitution over signatures
/// - [`rewrite::MemberCloner`] - Deep copies of definitions through an importer
pub mod rewrite;

/// `unbreaker` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always
/// [`Error`]. This is used consistently throughout the crate for all fallible
/// operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `unbreaker` Error type
///
/// The main error type for all operations in this crate. Provides detailed error
/// information for mapping, resolution, shim validation and rewriting.
pub use error::Error;

use crate::compare::{CompatDifference, MapperSettings};
use crate::metadata::diagnostics::Diagnostics;
use crate::metadata::types::{AsmId, AssemblySet};
use crate::shim::ShimModel;

/// Compares the externally visible surfaces of two assemblies.
///
/// Convenience wrapper over [`compare::compare_assemblies`] with default mapper
/// settings, returning the collected diagnostics alongside the differences.
///
/// # Errors
/// Fails when mapping produces colliding identities.
pub fn compare_assemblies(
    set: &AssemblySet,
    left: AsmId,
    right: AsmId,
) -> Result<(Vec<CompatDifference>, Diagnostics)> {
    let mut diagnostics = Diagnostics::new();
    let differences =
        compare::compare_assemblies(set, left, right, MapperSettings::default(), &mut diagnostics)?;
    Ok((differences, diagnostics))
}

/// Rewrites the target assembly `reference` into the stubbed reference surface
/// described by the shim assembly `shim`.
///
/// Builds the shim model from `shim` and runs [`rewrite::ReferenceProcessor`]
/// over it. `reference` must be the assembly the shim declares as its target.
///
/// # Errors
/// Fails when the shim assembly does not validate into a model, or when the
/// reference rewrite cannot resolve a rename or nesting attachment.
pub fn process_reference(set: &mut AssemblySet, shim: AsmId, reference: AsmId) -> Result<()> {
    let model = ShimModel::from_assembly(set, shim)?;
    rewrite::ReferenceProcessor::process(set, &model, reference)
}

/// Redirects the consumer assembly `consumer` from the shimmed target surface
/// onto the definitions of the shim assembly `shim`.
///
/// Builds the shim model from `shim` and runs [`rewrite::ConsumerProcessor`]
/// over it.
///
/// # Errors
/// Fails when the shim assembly does not validate into a model, or when a
/// shimmed field access needs an accessor the shim property does not declare.
pub fn process_consumer(set: &mut AssemblySet, shim: AsmId, consumer: AsmId) -> Result<()> {
    let model = ShimModel::from_assembly(set, shim)?;
    rewrite::ConsumerProcessor::process(set, &model, consumer)
}
