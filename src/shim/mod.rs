//! Shim assembly scanning.
//!
//! A shim assembly re-declares parts of a target assembly's surface and
//! relates each declaration to the target through marker attributes. The
//! [`markers`] module reads those attributes; [`model`] turns a scanned
//! assembly into the [`model::ShimModel`] both rewriting processors consume.

pub mod markers;
pub mod model;

pub use markers::RenameData;
pub use model::{
    ShimFieldModel, ShimFieldSource, ShimMember, ShimMethodModel, ShimModel, ShimTypeKind,
    ShimTypeModel,
};
