// crates/resilient-proxy-config/src/lib.rs
// ============================================================================
// Module: Resilient Proxy Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for resilient-proxy.toml semantics.
// Dependencies: resilient-proxy-gen, serde, toml
// ============================================================================

//! ## Overview
//! `resilient-proxy-config` defines the configuration model for the resilient
//! proxy generator. Loading is strict and fail-closed; a validated config
//! converts into a [`resilient_proxy_gen::Synthesizer`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
