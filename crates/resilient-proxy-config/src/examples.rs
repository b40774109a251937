// crates/resilient-proxy-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic starting point for resilient-proxy.toml.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for resilient proxy configuration. Every key is shown
//! with its built-in default except the generation inputs, which have none.

/// Returns a canonical example `resilient-proxy.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[generator]
namespace = "Solink.Sample"
source_assembly = "Solink.AddIn.Helpers.Test.json"
base_type = "Solink.AddIn.Helpers.RestartableAddIn"
facade_type = "Solink.AddIn.Helpers.AddInFacade"
token_type = "System.AddIn.Hosting.AddInToken"
platform_type = "System.AddIn.Hosting.Platform"
factory_method = "Factory"
invoke_func = "Func"
invoke_action = "Action"
class_visibility = "public"

[naming]
marker = "I"
prefix = "Restartable"

[output]
target_folder = "generated"
"#,
    )
}
