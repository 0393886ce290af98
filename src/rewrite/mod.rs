//! Assembly rewriting passes.
//!
//! Two processors consume a [`crate::shim::ShimModel`] and mutate one assembly
//! each: [`ReferenceProcessor`] turns the target assembly into the stubbed
//! reference surface consumers compile against, and [`ConsumerProcessor`]
//! redirects a consumer's metadata and IL from that surface onto the shim
//! assembly's definitions. Both build on [`RedirectImporter`] for reference
//! substitution and [`MemberCloner`] for structural copies.
//!
//! # Key Components
//!
//! - [`RedirectImporter`] - Pure reference substitution over signature shapes
//! - [`MemberCloner`] - Deep copies of definitions through an importer
//! - [`ReferenceProcessor`] - Shim surface materialization into the target
//! - [`ConsumerProcessor`] - Consumer metadata and IL redirection

pub mod cloner;
pub mod consumer;
pub mod importer;
pub mod reference;

pub use cloner::MemberCloner;
pub use consumer::ConsumerProcessor;
pub use importer::RedirectImporter;
pub use reference::ReferenceProcessor;
