// crates/resilient-proxy-gen/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared helpers for resilient-proxy-gen tests.
// Purpose: Locate fixtures and build generators and contracts for tests.
// Dependencies: resilient-proxy-gen
// ============================================================================

//! ## Overview
//! Provides fixture loading and small metadata builders for generator tests.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

use std::path::PathBuf;

use resilient_proxy_gen::AssemblyMetadata;
use resilient_proxy_gen::MemberMetadata;
use resilient_proxy_gen::ParameterMetadata;
use resilient_proxy_gen::ProxyGenerator;
use resilient_proxy_gen::Synthesizer;
use resilient_proxy_gen::TypeKind;
use resilient_proxy_gen::TypeMetadata;
use resilient_proxy_gen::TypeRef;

/// Namespace used by the reference output.
pub const SAMPLE_NAMESPACE: &str = "Solink.Sample";

/// Fully-qualified name of the reference contract.
pub const THING_CONTRACT: &str = "Solink.AddIn.Helpers.Test.IThing";

/// Returns the path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

/// Reads a fixture file as UTF-8 text.
pub fn read_fixture(name: &str) -> Result<String, String> {
    std::fs::read_to_string(fixture_path(name)).map_err(|err| err.to_string())
}

/// Loads the reference assembly metadata.
pub fn sample_assembly() -> Result<AssemblyMetadata, String> {
    AssemblyMetadata::read(&fixture_path("helpers_test_assembly.json"))
        .map_err(|err| err.to_string())
}

/// Builds a generator over the reference assembly with default options.
pub fn sample_generator() -> Result<ProxyGenerator, String> {
    Ok(ProxyGenerator::new(sample_assembly()?, SAMPLE_NAMESPACE, Synthesizer::default()))
}

/// Builds an exported interface with the given members.
pub fn interface(name: &str, members: Vec<MemberMetadata>) -> TypeMetadata {
    TypeMetadata {
        namespace: "Acme.Contracts".to_string(),
        name: name.to_string(),
        kind: TypeKind::Interface,
        exported: true,
        members,
    }
}

/// Builds a method member.
pub fn method(
    name: &str,
    parameters: &[(&str, &str)],
    return_type: Option<&str>,
) -> MemberMetadata {
    MemberMetadata::Method {
        name: name.to_string(),
        parameters: parameters
            .iter()
            .map(|(param, ty)| ParameterMetadata {
                name: (*param).to_string(),
                ty: TypeRef::parse(ty),
            })
            .collect(),
        return_type: return_type.map(TypeRef::parse),
        special_name: false,
    }
}

/// Builds a property member.
pub fn property(name: &str, ty: &str, can_write: bool) -> MemberMetadata {
    MemberMetadata::Property {
        name: name.to_string(),
        value_type: TypeRef::parse(ty),
        can_read: true,
        can_write,
    }
}
