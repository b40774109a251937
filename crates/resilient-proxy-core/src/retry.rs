// crates/resilient-proxy-core/src/retry.rs
// ============================================================================
// Module: Retry Engine
// Description: Bounded retry with reactivation of the delegate instance.
// Purpose: Make every call through a proxy tolerant of transient failures.
// Dependencies: crate::{activation, events}, serde, thiserror
// ============================================================================

//! ## Overview
//! [`ResilientCall`] owns the current delegate instance and the factory that
//! produces replacements. Generated proxies compose one `ResilientCall` and
//! route every contract member through [`ResilientCall::invoke_func`] or
//! [`ResilientCall::invoke_action`].
//!
//! Per invocation the engine moves through three states: `Active` while an
//! attempt runs, `Reactivating` after a transient failure, and `Exhausted`
//! once [`RetryPolicy::max_attempts`] attempts have failed transiently.
//!
//! Invariants:
//! - The factory runs once at construction; that failure is not retried.
//! - Every transient failure replaces the delegate wholesale.
//! - Fatal failures propagate on the first occurrence, unmodified.
//! - Invocations are serialized by a mutex around the delegate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::activation::ActivationError;
use crate::activation::ActivationFacade;
use crate::activation::ActivationToken;
use crate::activation::Platform;
use crate::activation::activate_instance;
use crate::events::Event;
use crate::events::EventKind;
use crate::events::EventSink;
use crate::events::NoopSink;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum number of attempts per invocation.
pub const MAXIMUM_ATTEMPTS: u32 = 3;

// ============================================================================
// SECTION: Policy and Classification
// ============================================================================

/// Retry bound applied to every invocation.
///
/// Serializes as the bare attempt count; deserialization goes through
/// [`RetryPolicy::new`].
///
/// # Invariants
/// - `max_attempts` is at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct RetryPolicy {
    /// Maximum attempts per invocation.
    max_attempts: u32,
}

impl RetryPolicy {
    /// Creates a policy; zero is raised to one attempt.
    #[must_use]
    pub const fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
        }
    }

    /// Returns the maximum attempts per invocation.
    #[must_use]
    pub const fn max_attempts(self) -> u32 {
        self.max_attempts
    }
}

impl From<u32> for RetryPolicy {
    fn from(max_attempts: u32) -> Self {
        Self::new(max_attempts)
    }
}

impl From<RetryPolicy> for u32 {
    fn from(policy: RetryPolicy) -> Self {
        policy.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAXIMUM_ATTEMPTS)
    }
}

/// Classification of an invocation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Retry-worthy; triggers reactivation.
    Transient,
    /// Propagates immediately.
    Fatal,
}

/// Factory producing delegate instances.
type Factory<T> = dyn Fn() -> Result<T, ActivationError> + Send + Sync;

/// Classifier deciding whether a failure is transient.
type Classifier<E> = dyn Fn(&E) -> FailureClass + Send + Sync;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors surfaced by [`ResilientCall`] invocations.
///
/// # Invariants
/// - `Fatal` carries the original failure unmodified.
/// - `Exhausted` carries the last transient failure as its source.
#[derive(Debug, Error)]
pub enum InvokeError<E> {
    /// A non-transient failure raised by the delegate.
    #[error(transparent)]
    Fatal(E),
    /// Every attempt failed transiently.
    #[error("exceeded maximum reactivations ({attempts}) trying to execute operation")]
    Exhausted {
        /// Configured maximum attempts.
        attempts: u32,
        /// Last transient failure.
        #[source]
        last: E,
    },
    /// Reactivation failed after a transient failure.
    #[error(transparent)]
    Activation(ActivationError),
    /// A previous caller panicked while holding the delegate.
    #[error("delegate for {0} is unavailable after a panic")]
    Poisoned(String),
}

impl<E> InvokeError<E> {
    /// Returns the delegate's failure for `Fatal`, otherwise `None`.
    #[must_use]
    pub fn into_fatal(self) -> Option<E> {
        match self {
            Self::Fatal(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true when the retry bound was exhausted.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

// ============================================================================
// SECTION: Resilient Call
// ============================================================================

/// Runtime retry state for one proxy object.
///
/// # Deadlocks
///
/// The delegate mutex stays locked for the whole of
/// [`ResilientCall::invoke_func`], including every run of the caller's
/// operation and any reactivation. An operation must not invoke the same
/// `ResilientCall` again, directly or through another proxy member: the
/// nested call blocks on the mutex forever. Other threads wait until the
/// running invocation returns.
pub struct ResilientCall<T, E> {
    /// Contract name used in events and errors.
    contract: String,
    /// Current delegate instance.
    current: Mutex<T>,
    /// Produces replacement delegates.
    factory: Box<Factory<T>>,
    /// Retry bound.
    policy: RetryPolicy,
    /// Transient-failure classifier.
    classifier: Box<Classifier<E>>,
    /// Event sink for reactivation warnings.
    sink: Arc<dyn EventSink>,
}

impl<T, E> fmt::Debug for ResilientCall<T, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ResilientCall")
            .field("contract", &self.contract)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<T, E> ResilientCall<T, E>
where
    E: fmt::Display,
{
    /// Starts building a resilient call for `contract`.
    pub fn builder<F, C>(
        contract: impl Into<String>,
        factory: F,
        classifier: C,
    ) -> ResilientCallBuilder<T, E>
    where
        F: Fn() -> Result<T, ActivationError> + Send + Sync + 'static,
        C: Fn(&E) -> FailureClass + Send + Sync + 'static,
    {
        ResilientCallBuilder {
            contract: contract.into(),
            factory: Box::new(factory),
            classifier: Box::new(classifier),
            policy: RetryPolicy::default(),
            sink: Arc::new(NoopSink),
        }
    }

    /// Builds a resilient call whose factory activates `token` through `facade`.
    ///
    /// This is the three-argument construction contract generated proxies use.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError::Failed`] when the initial activation fails.
    pub fn activated<F, C>(
        contract: impl Into<String>,
        facade: Arc<F>,
        token: ActivationToken,
        platform: Platform,
        classifier: C,
    ) -> Result<Self, ActivationError>
    where
        F: ActivationFacade<T> + ?Sized + 'static,
        C: Fn(&E) -> FailureClass + Send + Sync + 'static,
        T: 'static,
    {
        Self::activated_builder(contract, facade, token, platform, classifier).build()
    }

    /// Starts building a resilient call backed by an activation facade.
    pub fn activated_builder<F, C>(
        contract: impl Into<String>,
        facade: Arc<F>,
        token: ActivationToken,
        platform: Platform,
        classifier: C,
    ) -> ResilientCallBuilder<T, E>
    where
        F: ActivationFacade<T> + ?Sized + 'static,
        C: Fn(&E) -> FailureClass + Send + Sync + 'static,
        T: 'static,
    {
        let contract = contract.into();
        let factory_contract = contract.clone();
        let factory =
            move || activate_instance(&factory_contract, facade.as_ref(), &token, platform);
        Self::builder(contract, factory, classifier)
    }

    /// Returns the contract name.
    #[must_use]
    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Applies `op` to the delegate, reactivating on transient failures.
    ///
    /// The delegate stays locked while `op` runs; `op` must not call back
    /// into this `ResilientCall` (see [Deadlocks](ResilientCall#deadlocks)).
    ///
    /// # Errors
    ///
    /// - [`InvokeError::Fatal`] for the first non-transient failure.
    /// - [`InvokeError::Exhausted`] when every attempt failed transiently.
    /// - [`InvokeError::Activation`] when a replacement cannot be produced.
    /// - [`InvokeError::Poisoned`] when a previous caller panicked mid-call.
    pub fn invoke_func<R, O>(&self, mut op: O) -> Result<R, InvokeError<E>>
    where
        O: FnMut(&T) -> Result<R, E>,
    {
        let mut current =
            self.current.lock().map_err(|_| InvokeError::Poisoned(self.contract.clone()))?;
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;
        loop {
            let instance: &T = &current;
            let failure = match op(instance) {
                Ok(value) => return Ok(value),
                Err(failure) => failure,
            };
            if (self.classifier)(&failure) == FailureClass::Fatal {
                return Err(InvokeError::Fatal(failure));
            }
            self.sink.record(
                &Event::warn(
                    EventKind::Reactivating,
                    format!(
                        "reactivating {} (attempt {attempt} of {max_attempts}) due to: {failure}",
                        self.contract
                    ),
                )
                .with_contract(self.contract.clone()),
            );
            *current = (self.factory)().map_err(InvokeError::Activation)?;
            if attempt >= max_attempts {
                return Err(InvokeError::Exhausted {
                    attempts: max_attempts,
                    last: failure,
                });
            }
            attempt += 1;
        }
    }

    /// Applies a unit-returning `op` through [`ResilientCall::invoke_func`].
    ///
    /// # Errors
    ///
    /// Same as [`ResilientCall::invoke_func`].
    pub fn invoke_action<O>(&self, mut op: O) -> Result<(), InvokeError<E>>
    where
        O: FnMut(&T) -> Result<(), E>,
    {
        self.invoke_func(|instance| {
            op(instance)?;
            Ok(())
        })
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder for [`ResilientCall`].
pub struct ResilientCallBuilder<T, E> {
    /// Contract name.
    contract: String,
    /// Delegate factory.
    factory: Box<Factory<T>>,
    /// Transient-failure classifier.
    classifier: Box<Classifier<E>>,
    /// Retry bound.
    policy: RetryPolicy,
    /// Event sink.
    sink: Arc<dyn EventSink>,
}

impl<T, E> ResilientCallBuilder<T, E> {
    /// Overrides the retry policy.
    #[must_use]
    pub fn policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Overrides the event sink.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Runs the factory once and returns the resilient call.
    ///
    /// # Errors
    ///
    /// Returns the factory's [`ActivationError`] unchanged.
    pub fn build(self) -> Result<ResilientCall<T, E>, ActivationError> {
        let initial = (self.factory)()?;
        Ok(ResilientCall {
            contract: self.contract,
            current: Mutex::new(initial),
            factory: self.factory,
            policy: self.policy,
            classifier: self.classifier,
            sink: self.sink,
        })
    }
}
