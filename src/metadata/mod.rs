//! In-memory model of managed assembly metadata.
//!
//! Everything the comparison and rewriting passes consume lives behind this
//! facade: an arena-backed universe of assemblies ([`types::AssemblySet`]),
//! version-agnostic identity keys ([`identity`]), signature shapes
//! ([`signatures`]), decoded custom attributes ([`attributes`]), method
//! bodies ([`body`]) and the accessibility lattice ([`visibility`]).
//! Reference resolution ([`resolver`]) and fluent construction ([`builder`])
//! round out the surface; non-fatal conditions flow into [`diagnostics`].

pub mod attributes;
pub mod body;
pub mod builder;
pub mod diagnostics;
pub mod identity;
pub mod resolver;
pub mod signatures;
pub mod types;
pub mod visibility;
