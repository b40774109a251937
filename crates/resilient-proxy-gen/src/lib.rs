// crates/resilient-proxy-gen/src/lib.rs
// ============================================================================
// Module: Resilient Proxy Generator Library
// Description: Deterministic generator for resilient proxy source files.
// Purpose: Render C# proxy classes from assembly metadata.
// Dependencies: resilient-proxy-core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This crate generates resilient proxy classes from an assembly metadata
//! document. Data flows one way: [`AssemblyMetadata`] is introspected into a
//! [`ContractDescriptor`], the [`Synthesizer`] renders a [`GeneratedUnit`],
//! and the [`ProxyGenerator`] writes one source file per contract.
//!
//! ### Design Notes
//! - Output is deterministic: members follow contract declaration order and
//!   only the header's tool-version line varies between generator builds.
//! - Contracts that cannot be proxied fail before anything is written for them.
//!
//! ### Security Posture
//! Assembly metadata is treated as untrusted input. The generator enforces a
//! hard input size limit ([`MAX_METADATA_BYTES`]) and fails closed on parsing
//! errors.
//!
//! ## Index
//! - Input: [`AssemblyMetadata`], [`TypeRef`]
//! - Analysis: [`introspect`], [`NamingRule`]
//! - Rendering: [`Synthesizer`], [`SynthesisOptions`], [`compare_generated`]
//! - Batch: [`ProxyGenerator`], [`BatchReport`]

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod compare;
pub mod contract;
pub mod csharp;
pub mod error;
pub mod generator;
pub mod introspect;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod synth;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use compare::GeneratedDiff;
pub use compare::IGNORED_LINE;
pub use compare::compare_generated;
pub use contract::ContractDescriptor;
pub use contract::MemberDescriptor;
pub use contract::MethodMember;
pub use contract::Parameter;
pub use contract::PropertyMember;
pub use error::GenerateError;
pub use generator::BatchReport;
pub use generator::ContractFailure;
pub use generator::GeneratedBatch;
pub use generator::ProxyGenerator;
pub use introspect::IntrospectError;
pub use introspect::introspect;
pub use metadata::AssemblyMetadata;
pub use metadata::MAX_ARRAY_RANK;
pub use metadata::MAX_METADATA_BYTES;
pub use metadata::MemberMetadata;
pub use metadata::ParameterMetadata;
pub use metadata::TypeKind;
pub use metadata::TypeMetadata;
pub use metadata::TypeRef;
pub use naming::DEFAULT_CONTRACT_MARKER;
pub use naming::DEFAULT_PROXY_PREFIX;
pub use naming::NamingError;
pub use naming::NamingRule;
pub use synth::FragmentKind;
pub use synth::GeneratedUnit;
pub use synth::MemberFragment;
pub use synth::SynthesisOptions;
pub use synth::Synthesizer;
