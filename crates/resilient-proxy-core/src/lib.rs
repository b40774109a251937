// crates/resilient-proxy-core/src/lib.rs
// ============================================================================
// Module: Resilient Proxy Core Library
// Description: Retry engine and activation interfaces for resilient proxies.
// Purpose: Runtime that generated proxies delegate every contract call to.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Resilient Proxy Core owns the runtime half of the system: the
//! [`ResilientCall`] retry engine, the [`ActivationFacade`] interface to the
//! external activation service, and the [`EventSink`] used to report
//! reactivations.
//! Invariants:
//! - A single invocation performs at most [`RetryPolicy::max_attempts`] attempts.
//! - Fatal failures are never retried or wrapped.
//! - Activation failures during batch activation are reported and skipped.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod activation;
pub mod events;
pub mod retry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use activation::ActivationError;
pub use activation::ActivationFacade;
pub use activation::ActivationToken;
pub use activation::PLATFORM_QUALIFICATION_KEY;
pub use activation::Platform;
pub use activation::UnknownPlatform;
pub use activation::activate_all;
pub use activation::activate_instance;
pub use activation::activate_matching;
pub use events::Event;
pub use events::EventKind;
pub use events::EventSink;
pub use events::Level;
pub use events::LogSink;
pub use events::MemorySink;
pub use events::NoopSink;
pub use retry::FailureClass;
pub use retry::InvokeError;
pub use retry::MAXIMUM_ATTEMPTS;
pub use retry::ResilientCall;
pub use retry::ResilientCallBuilder;
pub use retry::RetryPolicy;
