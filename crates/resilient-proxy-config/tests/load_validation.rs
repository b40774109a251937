//! Config load validation tests for resilient-proxy-config.
// crates/resilient-proxy-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards and section rules.
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use resilient_proxy_config::ConfigError;
use resilient_proxy_config::ProxyGenConfig;
use resilient_proxy_config::config_toml_example;
use resilient_proxy_gen::DEFAULT_PROXY_PREFIX;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<ProxyGenConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn parse(toml: &str) -> Result<ProxyGenConfig, ConfigError> {
    ProxyGenConfig::from_bytes(toml.as_bytes())
}

// ============================================================================
// SECTION: Load Guards
// ============================================================================

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(ProxyGenConfig::load(Some(path)), "config path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(ProxyGenConfig::load(Some(path)), "config path component too long")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'#'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(ProxyGenConfig::load(Some(file.path())), "config file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(ProxyGenConfig::load(Some(file.path())), "config file must be utf-8")?;
    Ok(())
}

#[test]
fn load_rejects_missing_explicit_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let missing = dir.path().join("absent.toml");
    match ProxyGenConfig::load(Some(&missing)) {
        Err(ConfigError::Io(message)) if message.contains("absent.toml") => Ok(()),
        Err(other) => Err(format!("unexpected error: {other}")),
        Ok(_) => Err("expected missing explicit config to fail".to_string()),
    }
}

#[test]
fn load_reads_file_from_disk() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(b"[naming]\nmarker = \"C\"\n").map_err(|err| err.to_string())?;

    let config = ProxyGenConfig::load(Some(file.path())).map_err(|err| err.to_string())?;

    assert_eq!(config.naming.marker, "C");
    assert_eq!(config.naming.prefix, DEFAULT_PROXY_PREFIX);
    Ok(())
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn empty_document_yields_defaults() -> TestResult {
    let config = parse("").map_err(|err| err.to_string())?;

    assert_eq!(config, ProxyGenConfig::default());
    assert_eq!(config.generator.namespace, None);
    assert_eq!(config.output.target_folder, None);
    Ok(())
}

#[test]
fn example_config_parses_and_validates() -> TestResult {
    let config = parse(&config_toml_example()).map_err(|err| err.to_string())?;

    assert_eq!(config.generator.namespace.as_deref(), Some("Solink.Sample"));
    assert_eq!(
        config.generator.source_assembly,
        Some(PathBuf::from("Solink.AddIn.Helpers.Test.json"))
    );
    assert_eq!(config.output.target_folder, Some(PathBuf::from("generated")));
    let synthesizer = config.to_synthesizer();
    assert_eq!(synthesizer.naming().prefix(), "Restartable");
    assert_eq!(synthesizer.options().factory_method, "Factory");
    Ok(())
}

#[test]
fn unknown_keys_are_rejected() -> TestResult {
    assert_invalid(parse("[naming]\nsuffix = \"Proxy\"\n"), "config parse error")?;
    assert_invalid(parse("[telemetry]\nenabled = true\n"), "config parse error")?;
    assert_invalid(parse("[retry]\nmax_attempts = 3\n"), "config parse error")?;
    Ok(())
}

#[test]
fn malformed_toml_is_a_parse_error() -> TestResult {
    match parse("[naming\nprefix = \"Restartable\"") {
        Err(ConfigError::Parse(_)) => Ok(()),
        Err(other) => Err(format!("unexpected error: {other}")),
        Ok(_) => Err("expected parse failure".to_string()),
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

#[test]
fn marker_must_be_single_ascii_letter() -> TestResult {
    for marker in ["", "IX", "1", "É"] {
        assert_invalid(
            parse(&format!("[naming]\nmarker = \"{marker}\"\n")),
            "naming.marker must be a single ascii letter",
        )?;
    }
    let config = parse("[naming]\nmarker = \"C\"\nprefix = \"Resilient\"\n")
        .map_err(|err| err.to_string())?;
    let synthesizer = config.to_synthesizer();
    assert_eq!(synthesizer.naming().marker(), 'C');
    assert_eq!(synthesizer.naming().prefix(), "Resilient");
    Ok(())
}

#[test]
fn prefix_must_be_an_identifier() -> TestResult {
    assert_invalid(parse("[naming]\nprefix = \"Re start\"\n"), "naming.prefix")?;
    assert_invalid(parse("[naming]\nprefix = \"\"\n"), "naming.prefix")?;
    Ok(())
}

#[test]
fn generator_names_are_validated() -> TestResult {
    assert_invalid(parse("[generator]\nnamespace = \"Acme..Proxies\"\n"), "generator.namespace")?;
    assert_invalid(parse("[generator]\nfacade_type = \"\"\n"), "generator.facade_type")?;
    assert_invalid(parse("[generator]\nfactory_method = \"new\"\n"), "generator.factory_method")?;
    assert_invalid(parse("[generator]\ninvoke_func = \"Do It\"\n"), "generator.invoke_func")?;
    assert_invalid(parse("[generator]\nclass_visibility = \"private\"\n"), "class_visibility")?;
    assert_invalid(parse("[generator]\ntoken_type = \"Acme.-Token\"\n"), "token_type")?;
    Ok(())
}

#[test]
fn output_paths_are_validated() -> TestResult {
    assert_invalid(parse("[output]\ntarget_folder = \"  \"\n"), "output.target_folder")?;
    let long_component = "a".repeat(300);
    assert_invalid(
        parse(&format!("[output]\ntarget_folder = \"{long_component}\"\n")),
        "output.target_folder path component too long",
    )?;
    assert_invalid(
        parse("[generator]\nsource_assembly = \"\"\n"),
        "generator.source_assembly must be non-empty",
    )?;
    Ok(())
}
