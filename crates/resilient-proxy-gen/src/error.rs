// crates/resilient-proxy-gen/src/error.rs
// ============================================================================
// Module: Generator Errors
// Description: Error type shared by loading, synthesis, and output stages.
// Purpose: Give every generation failure a stable, typed variant.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`GenerateError`] is the single error type returned by the generator. It
//! wraps the stage-specific [`IntrospectError`] and [`NamingError`] so callers
//! can match on the precondition that failed.

use thiserror::Error;

use crate::introspect::IntrospectError;
use crate::naming::NamingError;

/// Errors raised by the resilient proxy generator.
///
/// # Invariants
/// - Variant meanings are stable for automation and tests.
///
/// # Examples
/// ```
/// use resilient_proxy_gen::GenerateError;
///
/// let err = GenerateError::ContractNotFound("Acme.IWidget".to_string());
/// assert_eq!(err.to_string(), "contract not found: Acme.IWidget");
/// ```
#[derive(Debug, Error)]
pub enum GenerateError {
    /// IO error while reading or writing files.
    #[error("io error: {0}")]
    Io(String),
    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(String),
    /// Assembly metadata failed a structural check.
    #[error("metadata error: {0}")]
    Metadata(String),
    /// The requested contract is not an exported type of the assembly.
    #[error("contract not found: {0}")]
    ContractNotFound(String),
    /// The contract cannot be represented as a proxy.
    #[error(transparent)]
    Introspect(#[from] IntrospectError),
    /// The contract name violates the naming convention.
    #[error(transparent)]
    Naming(#[from] NamingError),
    /// Rendering options or names are invalid.
    #[error("synthesis error: {0}")]
    Synthesis(String),
    /// Two contracts of one batch map to the same output file.
    #[error("'{second}' would overwrite {file}, already generated for '{first}'")]
    DuplicateOutput {
        /// Shared output file name.
        file: String,
        /// Contract that claimed the file first.
        first: String,
        /// Contract rejected for the collision.
        second: String,
    },
    /// On-disk output does not match the generated output.
    #[error("generated output drift detected for {path}: {detail}")]
    Drift {
        /// Output file that drifted.
        path: String,
        /// Description of the first difference.
        detail: String,
    },
}
