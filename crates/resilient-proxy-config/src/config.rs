// crates/resilient-proxy-config/src/config.rs
// ============================================================================
// Module: Resilient Proxy Configuration
// Description: Configuration loading and validation for the proxy generator.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: resilient-proxy-gen, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, then [`CONFIG_ENV_VAR`], then
//! `resilient-proxy.toml` in the working directory. Only the implicit default
//! file may be absent; an explicitly named file that cannot be read is an
//! error. Unknown keys are rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use resilient_proxy_gen::DEFAULT_CONTRACT_MARKER;
use resilient_proxy_gen::DEFAULT_PROXY_PREFIX;
use resilient_proxy_gen::NamingRule;
use resilient_proxy_gen::SynthesisOptions;
use resilient_proxy_gen::Synthesizer;
use resilient_proxy_gen::csharp::is_identifier;
use resilient_proxy_gen::csharp::is_keyword;
use resilient_proxy_gen::csharp::is_qualified_name;
use resilient_proxy_gen::synth::DEFAULT_BASE_TYPE;
use resilient_proxy_gen::synth::DEFAULT_CLASS_VISIBILITY;
use resilient_proxy_gen::synth::DEFAULT_FACADE_TYPE;
use resilient_proxy_gen::synth::DEFAULT_FACTORY_METHOD;
use resilient_proxy_gen::synth::DEFAULT_INVOKE_ACTION;
use resilient_proxy_gen::synth::DEFAULT_INVOKE_FUNC;
use resilient_proxy_gen::synth::DEFAULT_PLATFORM_TYPE;
use resilient_proxy_gen::synth::DEFAULT_TOKEN_TYPE;
use resilient_proxy_gen::synth::TOOL_VERSION;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "resilient-proxy.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "RESILIENT_PROXY_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Top-level `resilient-proxy.toml` model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProxyGenConfig {
    /// Generation inputs and rendered type names.
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Contract-to-class naming rule.
    #[serde(default)]
    pub naming: NamingConfig,
    /// Output location.
    #[serde(default)]
    pub output: OutputConfig,
}

impl ProxyGenConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Returns built-in defaults when no path is given, the environment
    /// override is unset, and the default file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved.path)?;
        let bytes = match fs::read(&resolved.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound && !resolved.explicit => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(ConfigError::Io(format!("{}: {err}", resolved.path.display())));
            }
        };
        Self::from_bytes(&bytes)
    }

    /// Parses and validates configuration from raw file contents.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the contents are oversized, not UTF-8,
    /// malformed, or invalid.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator.validate()?;
        self.naming.validate()?;
        self.output.validate()?;
        Ok(())
    }

    /// Builds the synthesizer described by `[generator]` and `[naming]`.
    #[must_use]
    pub fn to_synthesizer(&self) -> Synthesizer {
        Synthesizer::new(self.generator.synthesis_options(), self.naming.rule())
    }
}

/// `[generator]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Namespace that generated classes are placed in.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Assembly metadata document to read contracts from.
    #[serde(default)]
    pub source_assembly: Option<PathBuf>,
    /// Generic retry base type.
    #[serde(default = "default_base_type")]
    pub base_type: String,
    /// Activation facade type.
    #[serde(default = "default_facade_type")]
    pub facade_type: String,
    /// Activation token type.
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Execution platform type.
    #[serde(default = "default_platform_type")]
    pub platform_type: String,
    /// Static factory method name.
    #[serde(default = "default_factory_method")]
    pub factory_method: String,
    /// Value-returning invoke primitive.
    #[serde(default = "default_invoke_func")]
    pub invoke_func: String,
    /// Unit-returning invoke primitive.
    #[serde(default = "default_invoke_action")]
    pub invoke_action: String,
    /// Class visibility keyword (`public` or `internal`).
    #[serde(default = "default_class_visibility")]
    pub class_visibility: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            source_assembly: None,
            base_type: default_base_type(),
            facade_type: default_facade_type(),
            token_type: default_token_type(),
            platform_type: default_platform_type(),
            factory_method: default_factory_method(),
            invoke_func: default_invoke_func(),
            invoke_action: default_invoke_action(),
            class_visibility: default_class_visibility(),
        }
    }
}

impl GeneratorConfig {
    /// Validates generator configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(namespace) = &self.namespace
            && !is_qualified_name(namespace)
        {
            return Err(ConfigError::Invalid(format!(
                "generator.namespace must be a dotted identifier: '{namespace}'"
            )));
        }
        if let Some(source) = &self.source_assembly {
            validate_path_string("generator.source_assembly", &source.to_string_lossy())?;
        }
        for (field, value) in [
            ("generator.base_type", &self.base_type),
            ("generator.facade_type", &self.facade_type),
            ("generator.token_type", &self.token_type),
            ("generator.platform_type", &self.platform_type),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
            }
        }
        for (field, value) in [
            ("generator.factory_method", &self.factory_method),
            ("generator.invoke_func", &self.invoke_func),
            ("generator.invoke_action", &self.invoke_action),
        ] {
            if !is_identifier(value) || is_keyword(value) {
                return Err(ConfigError::Invalid(format!(
                    "{field} must be an identifier: '{value}'"
                )));
            }
        }
        self.synthesis_options()
            .validate()
            .map_err(|err| ConfigError::Invalid(format!("generator: {err}")))
    }

    /// Converts the section into synthesis options.
    fn synthesis_options(&self) -> SynthesisOptions {
        SynthesisOptions {
            base_type: self.base_type.clone(),
            facade_type: self.facade_type.clone(),
            token_type: self.token_type.clone(),
            platform_type: self.platform_type.clone(),
            factory_method: self.factory_method.clone(),
            invoke_func: self.invoke_func.clone(),
            invoke_action: self.invoke_action.clone(),
            class_visibility: self.class_visibility.clone(),
            tool_version: TOOL_VERSION.to_string(),
        }
    }
}

/// `[naming]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamingConfig {
    /// Leading character stripped from contract names.
    #[serde(default = "default_marker")]
    pub marker: String,
    /// Prefix prepended to the stripped name.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            prefix: default_prefix(),
        }
    }
}

impl NamingConfig {
    /// Validates naming configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let mut chars = self.marker.chars();
        let single_letter = matches!(
            (chars.next(), chars.next()),
            (Some(marker), None) if marker.is_ascii_alphabetic()
        );
        if !single_letter {
            return Err(ConfigError::Invalid(
                "naming.marker must be a single ascii letter".to_string(),
            ));
        }
        if !is_identifier(&self.prefix) {
            return Err(ConfigError::Invalid(format!(
                "naming.prefix must be an identifier: '{}'",
                self.prefix
            )));
        }
        Ok(())
    }

    /// Builds the naming rule.
    fn rule(&self) -> NamingRule {
        let marker = self.marker.chars().next().unwrap_or(DEFAULT_CONTRACT_MARKER);
        NamingRule::new(marker, self.prefix.clone())
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory generated sources are written to.
    #[serde(default)]
    pub target_folder: Option<PathBuf>,
}

impl OutputConfig {
    /// Validates output configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(folder) = &self.target_folder {
            validate_path_string("output.target_folder", &folder.to_string_lossy())?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default generic retry base type.
fn default_base_type() -> String {
    DEFAULT_BASE_TYPE.to_string()
}

/// Default facade type.
fn default_facade_type() -> String {
    DEFAULT_FACADE_TYPE.to_string()
}

/// Default token type.
fn default_token_type() -> String {
    DEFAULT_TOKEN_TYPE.to_string()
}

/// Default platform type.
fn default_platform_type() -> String {
    DEFAULT_PLATFORM_TYPE.to_string()
}

/// Default factory method name.
fn default_factory_method() -> String {
    DEFAULT_FACTORY_METHOD.to_string()
}

/// Default value-returning primitive.
fn default_invoke_func() -> String {
    DEFAULT_INVOKE_FUNC.to_string()
}

/// Default unit-returning primitive.
fn default_invoke_action() -> String {
    DEFAULT_INVOKE_ACTION.to_string()
}

/// Default class visibility.
fn default_class_visibility() -> String {
    DEFAULT_CLASS_VISIBILITY.to_string()
}

/// Default contract marker.
fn default_marker() -> String {
    DEFAULT_CONTRACT_MARKER.to_string()
}

/// Default proxy prefix.
fn default_prefix() -> String {
    DEFAULT_PROXY_PREFIX.to_string()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Config path plus whether the caller or environment named it.
struct ResolvedPath {
    /// Path to read.
    path: PathBuf,
    /// False only for the implicit default file name.
    explicit: bool,
}

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<ResolvedPath, ConfigError> {
    if let Some(path) = path {
        return Ok(ResolvedPath {
            path: path.to_path_buf(),
            explicit: true,
        });
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(ResolvedPath {
            path: PathBuf::from(env_path),
            explicit: true,
        });
    }
    Ok(ResolvedPath {
        path: PathBuf::from(DEFAULT_CONFIG_NAME),
        explicit: false,
    })
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}
