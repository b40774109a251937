// crates/resilient-proxy-core/src/activation.rs
// ============================================================================
// Module: Activation Interfaces
// Description: Narrow interface to the external activation service.
// Purpose: Discover and activate delegate instances for a contract.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The activation service that hosts delegate instances is an external
//! collaborator. This module defines the surface the retry engine and the
//! generated proxies depend on: an [`ActivationFacade`] that discovers
//! [`ActivationToken`] values and activates an instance on a [`Platform`].
//!
//! The three-argument construction contract (facade, token, platform) is the
//! fixed ABI between generated proxies and the activation layer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::events::Event;
use crate::events::EventKind;
use crate::events::EventSink;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Qualification data key selecting the execution platform of a candidate.
pub const PLATFORM_QUALIFICATION_KEY: &str = "Platform";

// ============================================================================
// SECTION: Platform
// ============================================================================

/// Execution platform an instance is activated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Same platform as the host process.
    #[default]
    Host,
    /// Any processor architecture.
    AnyCpu,
    /// 32-bit x86.
    X86,
    /// 64-bit x86.
    X64,
    /// ARM.
    Arm,
}

impl Platform {
    /// Returns the canonical platform name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Host => "Host",
            Self::AnyCpu => "AnyCpu",
            Self::X86 => "X86",
            Self::X64 => "X64",
            Self::Arm => "Arm",
        }
    }

    /// Parses a platform name, falling back to [`Platform::Host`].
    #[must_use]
    pub fn parse_or_host(value: &str) -> Self {
        value.parse().unwrap_or(Self::Host)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Error returned when a platform name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        [Self::Host, Self::AnyCpu, Self::X86, Self::X64, Self::Arm]
            .into_iter()
            .find(|platform| platform.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownPlatform(value.to_string()))
    }
}

// ============================================================================
// SECTION: Activation Token
// ============================================================================

/// Identity of a discovered candidate instance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActivationToken {
    /// Candidate name.
    pub name: String,
    /// Candidate publisher.
    #[serde(default)]
    pub publisher: String,
    /// Candidate version string.
    #[serde(default)]
    pub version: String,
    /// Candidate description.
    #[serde(default)]
    pub description: String,
    /// Qualification data published by the candidate.
    #[serde(default)]
    pub qualification_data: BTreeMap<String, String>,
}

impl ActivationToken {
    /// Creates a token with only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a qualification data entry.
    #[must_use]
    pub fn with_qualification(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.qualification_data.insert(key.into(), value.into());
        self
    }

    /// Resolves the execution platform from qualification data.
    ///
    /// Missing or unparseable values resolve to [`Platform::Host`].
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.qualification_data
            .get(PLATFORM_QUALIFICATION_KEY)
            .map_or(Platform::Host, |value| Platform::parse_or_host(value))
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while discovering or activating delegate instances.
///
/// # Invariants
/// - Variant meanings are stable for automation and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivationError {
    /// The activation service reported an error.
    #[error("activation service error: {0}")]
    Service(String),
    /// Discovery failed for the contract.
    #[error("unable to discover candidates for {contract}: {cause}")]
    Discovery {
        /// Contract being discovered.
        contract: String,
        /// Underlying failure.
        cause: String,
    },
    /// Activation of a specific candidate failed.
    #[error(
        "unable to activate {contract} named '{name}', version {version}, published by \
         '{publisher}' under platform {platform}: {cause}"
    )]
    Failed {
        /// Contract being activated.
        contract: String,
        /// Candidate name.
        name: String,
        /// Candidate version.
        version: String,
        /// Candidate publisher.
        publisher: String,
        /// Platform the activation targeted.
        platform: Platform,
        /// Underlying failure.
        cause: String,
    },
}

// ============================================================================
// SECTION: Facade
// ============================================================================

/// Activation service surface for contract `T`.
///
/// `T` is the delegate representation, typically `Box<dyn Contract + Send>`.
pub trait ActivationFacade<T>: Send + Sync {
    /// Discovers candidate instances for the contract.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError`] when discovery fails.
    fn discover(&self) -> Result<Vec<ActivationToken>, ActivationError>;

    /// Activates the candidate identified by `token` under `platform`.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError`] when the instance cannot be activated.
    fn activate(&self, token: &ActivationToken, platform: Platform) -> Result<T, ActivationError>;
}

/// Activates one instance, naming the contract and candidate on failure.
///
/// # Errors
///
/// Returns [`ActivationError::Failed`] wrapping the facade's error.
pub fn activate_instance<T, F>(
    contract: &str,
    facade: &F,
    token: &ActivationToken,
    platform: Platform,
) -> Result<T, ActivationError>
where
    F: ActivationFacade<T> + ?Sized,
{
    facade.activate(token, platform).map_err(|err| ActivationError::Failed {
        contract: contract.to_string(),
        name: token.name.clone(),
        version: token.version.clone(),
        publisher: token.publisher.clone(),
        platform,
        cause: err.to_string(),
    })
}

/// Activates every discovered candidate through `factory`.
///
/// # Errors
///
/// Returns [`ActivationError`] only when discovery itself fails.
pub fn activate_all<T, P, F, B>(
    contract: &str,
    facade: &Arc<F>,
    factory: B,
    sink: &dyn EventSink,
) -> Result<Vec<P>, ActivationError>
where
    F: ActivationFacade<T> + ?Sized,
    B: Fn(Arc<F>, ActivationToken, Platform) -> Result<P, ActivationError>,
{
    activate_matching(contract, facade, factory, |_| true, sink)
}

/// Activates discovered candidates accepted by `predicate` through `factory`.
///
/// Candidates whose activation fails are reported through `sink` and skipped.
/// The returned proxies keep discovery order.
///
/// # Errors
///
/// Returns [`ActivationError`] only when discovery itself fails.
pub fn activate_matching<T, P, F, B, Q>(
    contract: &str,
    facade: &Arc<F>,
    factory: B,
    predicate: Q,
    sink: &dyn EventSink,
) -> Result<Vec<P>, ActivationError>
where
    F: ActivationFacade<T> + ?Sized,
    B: Fn(Arc<F>, ActivationToken, Platform) -> Result<P, ActivationError>,
    Q: Fn(&ActivationToken) -> bool,
{
    let tokens = facade.discover().map_err(|err| ActivationError::Discovery {
        contract: contract.to_string(),
        cause: err.to_string(),
    })?;
    if tokens.is_empty() {
        sink.record(
            &Event::warn(EventKind::NoCandidates, format!("no candidates of {contract} were found"))
                .with_contract(contract),
        );
    }
    let mut activated = Vec::new();
    for token in tokens.into_iter().filter(|token| predicate(token)) {
        let platform = token.platform();
        sink.record(
            &Event::info(
                EventKind::Activating,
                format!(
                    "candidate named '{}', version {}, published by '{}' and described as '{}' \
                     will be activated under platform {platform}",
                    token.name, token.version, token.publisher, token.description
                ),
            )
            .with_contract(contract),
        );
        match factory(Arc::clone(facade), token, platform) {
            Ok(proxy) => activated.push(proxy),
            Err(err) => {
                sink.record(
                    &Event::error(EventKind::ActivationSkipped, err.to_string())
                        .with_contract(contract),
                );
            }
        }
    }
    Ok(activated)
}
