use thiserror::Error;

macro_rules! invalid_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Invalid {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Invalid {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every fatal condition is an input/configuration error in the sense of a malformed
/// shim/target pairing: none of these are retried and none leave a partially processed
/// run behind. Best-effort conditions (for example an exported-type forwarder that cannot
/// be resolved during mapping) are not errors; they are recorded through
/// [`crate::metadata::diagnostics::Diagnostics`] and the run continues.
///
/// # Error Categories
///
/// ## Mapping Errors
/// - [`Error::SideAlreadySet`] - A mapper side was assigned twice
///
/// ## Resolution Errors
/// - [`Error::UnresolvedAssembly`] - A referenced assembly is not part of the set
/// - [`Error::UnresolvedType`] - A type reference has no matching definition
/// - [`Error::UnresolvedMember`] - A member reference has no matching definition
/// - [`Error::AmbiguousMember`] - A member reference matched more than one definition
///
/// ## Shim Model Errors
/// - [`Error::MissingShimMarker`] / [`Error::DuplicateShimMarker`] - The assembly-level
///   shim marker is absent or present more than once
/// - [`Error::MalformedMarker`] - A marker attribute has an unexpected signature
/// - [`Error::TypeCollision`] - A `New` shim type collides with an existing target type
/// - [`Error::ShimTypeNotPublic`] - A non-`New` shim type is not externally visible
/// - [`Error::ShimTargetOutsideAssembly`] - A shim type targets a foreign assembly
/// - [`Error::ExtensionNotStatic`] - An extension container type is not static
/// - [`Error::ExtensionImplementationNotFound`] - No implementation method matches an
///   extension shim method
#[derive(Error, Debug)]
pub enum Error {
    /// A mapper side that was already populated was assigned a second value.
    ///
    /// Each side of an element mapper may be set at most once; two declarations
    /// from the same assembly collapsing onto one identity key indicates either
    /// duplicate metadata or an identity computation bug.
    #[error("{0} element already set")]
    SideAlreadySet(crate::compare::Side),

    /// An assembly referenced by name could not be found in the assembly set.
    #[error("Could not resolve assembly '{0}'")]
    UnresolvedAssembly(String),

    /// A type reference could not be resolved to a definition.
    #[error("Could not resolve type '{0}'")]
    UnresolvedType(String),

    /// A member reference could not be resolved to a definition.
    #[error("Could not resolve member '{0}'")]
    UnresolvedMember(String),

    /// A member reference matched more than one definition.
    ///
    /// Identity comparison is version-agnostic; two definitions that collapse
    /// onto the same identity make the reference unprocessable.
    #[error("Member reference '{0}' is ambiguous")]
    AmbiguousMember(String),

    /// The shim assembly does not carry the required assembly-level shim marker.
    #[error("Shim assembly doesn't have the required Shim marker attribute")]
    MissingShimMarker,

    /// The shim assembly carries more than one assembly-level shim marker.
    #[error("Shim assembly has more than one Shim marker attribute")]
    DuplicateShimMarker,

    /// A declarative marker attribute has an argument list that does not match
    /// any of its known constructor signatures.
    #[error("Invalid signature for marker attribute '{0}'")]
    MalformedMarker(String),

    /// A `New` shim type resolves to an already existing, visible target type.
    #[error("Shim type '{0}' conflicts with target type and doesn't specify the Replace marker")]
    TypeCollision(String),

    /// A shim type that is not of kind `New` is not externally visible.
    #[error("Shim type '{0}' isn't public")]
    ShimTypeNotPublic(String),

    /// A shim type targets a type outside the declared target assembly.
    #[error("Shim type '{0}' targets type '{1}', which is not in the target assembly")]
    ShimTargetOutsideAssembly(String, String),

    /// An extension shim container type is not static.
    #[error("Extension shim type '{0}' is not static")]
    ExtensionNotStatic(String),

    /// No implementation method could be located for an extension shim method.
    #[error("Couldn't find corresponding implementation method for '{0}'")]
    ExtensionImplementationNotFound(String),

    /// Generic error for miscellaneous failures.
    ///
    /// Used for invariant violations that don't fit into other categories,
    /// annotated with the source location where they were detected.
    #[error("Invalid - {file}:{line}: {message}")]
    Invalid {
        /// The message to be printed for the Invalid error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },
}
