//! Naming rule property-based tests.
//!
//! ## What is covered
//! - Marker-prefixed names map to `prefix + rest`.
//! - Names lacking the marker fail.
//! - Rendering is idempotent for arbitrary method shapes.
// crates/resilient-proxy-gen/tests/proptest_naming.rs
// ============================================================================
// Module: Naming and Rendering Property-Based Tests
// Description: Randomized checks for the naming rule and render stability.
// Purpose: Ensure naming is a pure textual transformation.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use proptest::prelude::*;
use resilient_proxy_gen::NamingError;
use resilient_proxy_gen::NamingRule;
use resilient_proxy_gen::Synthesizer;
use resilient_proxy_gen::introspect;

mod common;
use crate::common::interface;
use crate::common::method;

proptest! {
    #[test]
    fn marker_prefixed_names_map_to_prefix_plus_rest(
        rest in "[A-Za-z][A-Za-z0-9_]{0,24}",
        prefix in "[A-Z][a-z]{0,12}",
    ) {
        let rule = NamingRule::new('I', prefix.clone());
        prop_assert_eq!(rule.generated_name(&format!("I{rest}")), Ok(format!("{prefix}{rest}")));
        prop_assert_eq!(rule.generated_name(&format!("i{rest}")), Ok(format!("{prefix}{rest}")));
    }

    #[test]
    fn names_without_marker_fail(name in "[A-HJ-Za-hj-z_][A-Za-z0-9_]{0,24}") {
        let rule = NamingRule::default();
        let is_missing_marker =
            matches!(rule.generated_name(&name), Err(NamingError::MissingMarker { .. }));
        prop_assert!(is_missing_marker);
    }

    #[test]
    fn rendering_is_stable_for_arbitrary_methods(
        names in proptest::collection::btree_set("[A-Z][A-Za-z0-9]{0,12}", 1 .. 6),
        returns in any::<bool>(),
    ) {
        let return_type = returns.then_some("System.Int32");
        let members = names
            .iter()
            .map(|name| method(name, &[("input", "System.String")], return_type))
            .collect();
        let descriptor = introspect(&interface("IGenerated", members)).unwrap();
        let synthesizer = Synthesizer::default();
        let first = synthesizer.synthesize("Acme.Proxies", &descriptor).unwrap();
        let second = synthesizer.synthesize("Acme.Proxies", &descriptor).unwrap();
        prop_assert_eq!(first.render(), second.render());
        prop_assert_eq!(first.members().len(), names.len());
    }
}
