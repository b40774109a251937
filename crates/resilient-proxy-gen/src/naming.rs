// crates/resilient-proxy-gen/src/naming.rs
// ============================================================================
// Module: Naming Rule
// Description: Derives generated class and file names from contract names.
// Purpose: Enforce the contract-marker naming convention.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A contract name must begin with the contract marker (default `I`, matched
//! case-insensitively). The generated class name is the configured prefix
//! followed by the contract name without its marker: `IThing` becomes
//! `RestartableThing`.

use thiserror::Error;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default contract-marker character.
pub const DEFAULT_CONTRACT_MARKER: char = 'I';

/// Default prefix of generated class names.
pub const DEFAULT_PROXY_PREFIX: &str = "Restartable";

/// Extension of generated source files.
pub const SOURCE_FILE_EXTENSION: &str = "cs";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Naming-convention violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    /// The contract name does not start with the marker.
    #[error("contract name '{contract}' must begin with '{marker}'")]
    MissingMarker {
        /// Offending contract name.
        contract: String,
        /// Expected marker.
        marker: char,
    },
    /// Stripping the marker leaves nothing to name the class after.
    #[error("contract name '{contract}' has nothing after the '{marker}' marker")]
    EmptyName {
        /// Offending contract name.
        contract: String,
        /// Expected marker.
        marker: char,
    },
}

// ============================================================================
// SECTION: Naming Rule
// ============================================================================

/// Textual transformation from contract name to generated class name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingRule {
    /// Contract-marker character.
    marker: char,
    /// Prefix prepended to the stripped contract name.
    prefix: String,
}

impl Default for NamingRule {
    fn default() -> Self {
        Self::new(DEFAULT_CONTRACT_MARKER, DEFAULT_PROXY_PREFIX)
    }
}

impl NamingRule {
    /// Creates a naming rule.
    #[must_use]
    pub fn new(marker: char, prefix: impl Into<String>) -> Self {
        Self {
            marker,
            prefix: prefix.into(),
        }
    }

    /// Returns the contract-marker character.
    #[must_use]
    pub const fn marker(&self) -> char {
        self.marker
    }

    /// Returns the generated class prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Derives the generated class name for `contract`.
    ///
    /// # Errors
    ///
    /// Returns [`NamingError`] when the marker is missing or nothing follows it.
    ///
    /// # Examples
    /// ```
    /// use resilient_proxy_gen::NamingRule;
    ///
    /// let rule = NamingRule::default();
    /// assert_eq!(rule.generated_name("IThing").ok().as_deref(), Some("RestartableThing"));
    /// assert!(rule.generated_name("Thing").is_err());
    /// ```
    pub fn generated_name(&self, contract: &str) -> Result<String, NamingError> {
        let mut chars = contract.chars();
        let starts_with_marker =
            chars.next().is_some_and(|first| first.to_lowercase().eq(self.marker.to_lowercase()));
        if !starts_with_marker {
            return Err(NamingError::MissingMarker {
                contract: contract.to_string(),
                marker: self.marker,
            });
        }
        let rest = chars.as_str();
        if rest.is_empty() {
            return Err(NamingError::EmptyName {
                contract: contract.to_string(),
                marker: self.marker,
            });
        }
        Ok(format!("{}{rest}", self.prefix))
    }

    /// Derives the generated source file name for `contract`.
    ///
    /// # Errors
    ///
    /// Same as [`NamingRule::generated_name`].
    pub fn file_name(&self, contract: &str) -> Result<String, NamingError> {
        Ok(format!("{}.{SOURCE_FILE_EXTENSION}", self.generated_name(contract)?))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
