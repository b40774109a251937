// crates/resilient-proxy-gen/src/synth.rs
// ============================================================================
// Module: Proxy Synthesizer
// Description: Renders a contract descriptor into a resilient proxy class.
// Purpose: Produce byte-stable C# source for one contract.
// Dependencies: crate::{contract, csharp, error, naming}
// ============================================================================

//! ## Overview
//! [`Synthesizer::synthesize`] turns a [`ContractDescriptor`] into a
//! [`GeneratedUnit`]: a sealed class that derives from the retry base
//! instantiated with the contract, implements the contract, forwards the
//! three construction parameters to the base, and wraps every member in the
//! base's invoke primitives.
//!
//! ### Layout
//! The rendering follows the "C" bracing style with four-space indentation.
//! Separator lines keep the indentation of their level. Members are laid out
//! as: constructor, properties, static factory, methods.
//!
//! ### Determinism
//! Output depends only on the descriptor, the namespace, and
//! [`SynthesisOptions`]. The tool-version header line is the only part that
//! may change between generator builds.

use std::fmt::Write;

use crate::contract::ContractDescriptor;
use crate::contract::MemberDescriptor;
use crate::contract::MethodMember;
use crate::contract::PropertyMember;
use crate::csharp::escape_identifier;
use crate::csharp::is_identifier;
use crate::csharp::is_keyword;
use crate::csharp::is_qualified_name;
use crate::error::GenerateError;
use crate::naming::NamingRule;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default generic retry base type.
pub const DEFAULT_BASE_TYPE: &str = "Solink.AddIn.Helpers.RestartableAddIn";
/// Default activation facade parameter type.
pub const DEFAULT_FACADE_TYPE: &str = "Solink.AddIn.Helpers.AddInFacade";
/// Default activation token parameter type.
pub const DEFAULT_TOKEN_TYPE: &str = "System.AddIn.Hosting.AddInToken";
/// Default execution platform parameter type.
pub const DEFAULT_PLATFORM_TYPE: &str = "System.AddIn.Hosting.Platform";
/// Default static factory method name.
pub const DEFAULT_FACTORY_METHOD: &str = "Factory";
/// Default name of the base's value-returning invoke primitive.
pub const DEFAULT_INVOKE_FUNC: &str = "Func";
/// Default name of the base's unit-returning invoke primitive.
pub const DEFAULT_INVOKE_ACTION: &str = "Action";
/// Default class visibility.
pub const DEFAULT_CLASS_VISIBILITY: &str = "public";
/// Tool version written into the header.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Placeholder in the base type replaced by the contract type.
pub const CONTRACT_PLACEHOLDER: &str = "{contract}";

/// Class visibilities accepted for generated classes.
pub const CLASS_VISIBILITIES: [&str; 2] = ["public", "internal"];

/// Construction parameter names fixed by the runtime ABI.
const CONSTRUCTION_PARAMETERS: [&str; 3] = ["facade", "token", "platform"];

/// Single parameter of every forwarding closure.
const CLOSURE_PARAMETER: &str = "_";

/// Indentation unit.
const INDENT: &str = "    ";

// ============================================================================
// SECTION: Options
// ============================================================================

/// Names used while rendering proxies.
///
/// # Invariants
/// - Type names are dot-qualified identifiers, except that `base_type` may
///   carry the [`CONTRACT_PLACEHOLDER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisOptions {
    /// Generic retry base type; rendered as `Base<Contract>` unless it
    /// contains [`CONTRACT_PLACEHOLDER`].
    pub base_type: String,
    /// Activation facade parameter type.
    pub facade_type: String,
    /// Activation token parameter type.
    pub token_type: String,
    /// Execution platform parameter type.
    pub platform_type: String,
    /// Static factory method name.
    pub factory_method: String,
    /// Value-returning invoke primitive.
    pub invoke_func: String,
    /// Unit-returning invoke primitive.
    pub invoke_action: String,
    /// Class visibility keyword.
    pub class_visibility: String,
    /// Version written on the header's runtime line.
    pub tool_version: String,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            base_type: DEFAULT_BASE_TYPE.to_string(),
            facade_type: DEFAULT_FACADE_TYPE.to_string(),
            token_type: DEFAULT_TOKEN_TYPE.to_string(),
            platform_type: DEFAULT_PLATFORM_TYPE.to_string(),
            factory_method: DEFAULT_FACTORY_METHOD.to_string(),
            invoke_func: DEFAULT_INVOKE_FUNC.to_string(),
            invoke_action: DEFAULT_INVOKE_ACTION.to_string(),
            class_visibility: DEFAULT_CLASS_VISIBILITY.to_string(),
            tool_version: TOOL_VERSION.to_string(),
        }
    }
}

impl SynthesisOptions {
    /// Checks that every configured name renders to valid source.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Synthesis`] naming the first invalid option.
    pub fn validate(&self) -> Result<(), GenerateError> {
        let base = self.base_type.replace(CONTRACT_PLACEHOLDER, "Contract");
        let base_ok = if self.base_type.contains(CONTRACT_PLACEHOLDER) {
            base.split(['<', '>', ',', ' ']).filter(|part| !part.is_empty()).all(is_qualified_name)
        } else {
            is_qualified_name(&base)
        };
        if !base_ok {
            return Err(invalid_option("base_type", &self.base_type));
        }
        for (field, value) in [
            ("facade_type", &self.facade_type),
            ("token_type", &self.token_type),
            ("platform_type", &self.platform_type),
        ] {
            if !is_qualified_name(value) {
                return Err(invalid_option(field, value));
            }
        }
        for (field, value) in [
            ("factory_method", &self.factory_method),
            ("invoke_func", &self.invoke_func),
            ("invoke_action", &self.invoke_action),
        ] {
            if !is_identifier(value) || is_keyword(value) {
                return Err(invalid_option(field, value));
            }
        }
        if !CLASS_VISIBILITIES.contains(&self.class_visibility.as_str()) {
            return Err(invalid_option("class_visibility", &self.class_visibility));
        }
        if self.tool_version.contains(['\n', '\r']) {
            return Err(invalid_option("tool_version", &self.tool_version));
        }
        Ok(())
    }

    /// Renders the base type instantiated with `contract`.
    fn base_for(&self, contract: &str) -> String {
        if self.base_type.contains(CONTRACT_PLACEHOLDER) {
            self.base_type.replace(CONTRACT_PLACEHOLDER, contract)
        } else {
            format!("{}<{contract}>", self.base_type)
        }
    }

    /// Renders the three construction parameters as a parameter list.
    fn construction_parameters(&self) -> String {
        let [facade, token, platform] = CONSTRUCTION_PARAMETERS;
        format!(
            "{} {facade}, {} {token}, {} {platform}",
            self.facade_type, self.token_type, self.platform_type
        )
    }
}

/// Builds an invalid-option error.
fn invalid_option(field: &str, value: &str) -> GenerateError {
    GenerateError::Synthesis(format!("invalid {field}: '{value}'"))
}

// ============================================================================
// SECTION: Generated Unit
// ============================================================================

/// Kind of a rendered member fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// Property wrapper.
    Property,
    /// Method wrapper.
    Method,
}

/// One rendered member wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberFragment {
    /// Wrapped member name.
    pub name: String,
    /// Wrapper kind.
    pub kind: FragmentKind,
    /// Rendered lines at class-member indentation, each ending in `\n`.
    pub text: String,
}

/// Rendered source artifact for one contract.
///
/// # Invariants
/// - Immutable once produced; [`GeneratedUnit::render`] is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    /// Header comment lines, each ending in `\n`.
    header: String,
    /// Target namespace.
    namespace: String,
    /// Generated class name.
    class_name: String,
    /// Namespace-qualified contract name.
    contract: String,
    /// Class declaration line at namespace-member indentation.
    declaration: String,
    /// Constructor fragment.
    constructor: String,
    /// Static factory fragment.
    factory: String,
    /// Member wrappers in contract declaration order.
    members: Vec<MemberFragment>,
}

impl GeneratedUnit {
    /// Returns the target namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the generated class name.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Returns the namespace-qualified contract name.
    #[must_use]
    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// Returns the constructor fragment.
    #[must_use]
    pub fn constructor(&self) -> &str {
        &self.constructor
    }

    /// Returns the static factory fragment.
    #[must_use]
    pub fn factory(&self) -> &str {
        &self.factory
    }

    /// Returns member wrappers in contract declaration order.
    #[must_use]
    pub fn members(&self) -> &[MemberFragment] {
        &self.members
    }

    /// Returns the output file name.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.class_name, crate::naming::SOURCE_FILE_EXTENSION)
    }

    /// Renders the complete source file.
    #[must_use]
    pub fn render(&self) -> String {
        let class_blank = INDENT.repeat(2);
        let mut out = String::new();
        out.push_str(&self.header);
        out.push('\n');
        out.push_str("namespace ");
        out.push_str(&self.namespace);
        out.push_str("\n{\n");
        out.push_str(INDENT);
        out.push('\n');
        out.push_str(INDENT);
        out.push('\n');
        out.push_str(&self.declaration);
        out.push_str(INDENT);
        out.push_str("{\n");

        let properties = self.members.iter().filter(|member| member.kind == FragmentKind::Property);
        let methods = self.members.iter().filter(|member| member.kind == FragmentKind::Method);
        let fragments = std::iter::once(self.constructor.as_str())
            .chain(properties.map(|member| member.text.as_str()))
            .chain(std::iter::once(self.factory.as_str()))
            .chain(methods.map(|member| member.text.as_str()));
        for fragment in fragments {
            out.push_str(&class_blank);
            out.push('\n');
            out.push_str(fragment);
        }

        out.push_str(INDENT);
        out.push_str("}\n}\n");
        out
    }
}

// ============================================================================
// SECTION: Synthesizer
// ============================================================================

/// Renders contracts into resilient proxy classes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Synthesizer {
    /// Rendering names.
    options: SynthesisOptions,
    /// Class naming rule.
    naming: NamingRule,
}

impl Synthesizer {
    /// Creates a synthesizer.
    #[must_use]
    pub const fn new(options: SynthesisOptions, naming: NamingRule) -> Self {
        Self {
            options,
            naming,
        }
    }

    /// Returns the rendering options.
    #[must_use]
    pub const fn options(&self) -> &SynthesisOptions {
        &self.options
    }

    /// Returns the naming rule.
    #[must_use]
    pub const fn naming(&self) -> &NamingRule {
        &self.naming
    }

    /// Renders `contract` into a generated unit in `namespace`.
    ///
    /// # Errors
    ///
    /// - [`GenerateError::Naming`] when the contract name lacks the marker.
    /// - [`GenerateError::Synthesis`] for an invalid namespace or option, or
    ///   a parameter that collides with the forwarding closure.
    pub fn synthesize(
        &self,
        namespace: &str,
        contract: &ContractDescriptor,
    ) -> Result<GeneratedUnit, GenerateError> {
        if !is_qualified_name(namespace) {
            return Err(GenerateError::Synthesis(format!("invalid namespace: '{namespace}'")));
        }
        self.options.validate()?;
        let class_name = self.naming.generated_name(&contract.name)?;
        let contract_type = contract.full_name.clone();

        let mut members = Vec::with_capacity(contract.members.len());
        for member in &contract.members {
            let fragment = match member {
                MemberDescriptor::Property(property) => MemberFragment {
                    name: property.name.clone(),
                    kind: FragmentKind::Property,
                    text: self.render_property(property),
                },
                MemberDescriptor::Method(method) => MemberFragment {
                    name: method.name.clone(),
                    kind: FragmentKind::Method,
                    text: self.render_method(&contract.full_name, method)?,
                },
            };
            members.push(fragment);
        }

        Ok(GeneratedUnit {
            header: render_header(&self.options.tool_version),
            namespace: namespace.to_string(),
            declaration: format!(
                "{INDENT}{} sealed class {class_name} : {}, {contract_type}\n",
                self.options.class_visibility,
                self.options.base_for(&contract_type)
            ),
            constructor: self.render_constructor(&class_name),
            factory: self.render_factory(&class_name, &contract_type),
            class_name,
            contract: contract_type,
            members,
        })
    }

    /// Renders the constructor forwarding the construction parameters.
    fn render_constructor(&self, class_name: &str) -> String {
        let member = INDENT.repeat(2);
        let wrapped = INDENT.repeat(4);
        let arguments = CONSTRUCTION_PARAMETERS.join(", ");
        format!(
            "{member}public {class_name}({}) : \n{wrapped}base({arguments})\n{member}{{\n\
             {member}}}\n",
            self.options.construction_parameters()
        )
    }

    /// Renders the static factory method.
    fn render_factory(&self, class_name: &str, contract_type: &str) -> String {
        let member = INDENT.repeat(2);
        let body = INDENT.repeat(3);
        let arguments = CONSTRUCTION_PARAMETERS.join(", ");
        format!(
            "{member}public static {contract_type} {}({})\n{member}{{\n{body}return new \
             {class_name}({arguments});\n{member}}}\n",
            self.options.factory_method,
            self.options.construction_parameters()
        )
    }

    /// Renders a property wrapper.
    fn render_property(&self, property: &PropertyMember) -> String {
        let member = INDENT.repeat(2);
        let accessor = INDENT.repeat(3);
        let body = INDENT.repeat(4);
        let name = escape_identifier(&property.name);
        let mut out = String::new();
        let _ = writeln!(out, "{member}public {} {name}", property.value_type.to_csharp());
        let _ = writeln!(out, "{member}{{");
        let _ = writeln!(out, "{accessor}get");
        let _ = writeln!(out, "{accessor}{{");
        let _ = writeln!(
            out,
            "{body}return base.{}({CLOSURE_PARAMETER} => {CLOSURE_PARAMETER}.{name});",
            self.options.invoke_func
        );
        let _ = writeln!(out, "{accessor}}}");
        if property.writable {
            let _ = writeln!(out, "{accessor}set");
            let _ = writeln!(out, "{accessor}{{");
            let _ = writeln!(
                out,
                "{body}base.{}({CLOSURE_PARAMETER} => {CLOSURE_PARAMETER}.{name} = value);",
                self.options.invoke_action
            );
            let _ = writeln!(out, "{accessor}}}");
        }
        let _ = writeln!(out, "{member}}}");
        out
    }

    /// Renders a method wrapper.
    fn render_method(
        &self,
        contract: &str,
        method: &MethodMember,
    ) -> Result<String, GenerateError> {
        let member = INDENT.repeat(2);
        let body = INDENT.repeat(3);
        let name = escape_identifier(&method.name);
        let mut declared = Vec::with_capacity(method.parameters.len());
        let mut forwarded = Vec::with_capacity(method.parameters.len());
        for parameter in &method.parameters {
            if parameter.name == CLOSURE_PARAMETER {
                return Err(GenerateError::Synthesis(format!(
                    "parameter '{CLOSURE_PARAMETER}' of '{contract}.{}' collides with the \
                     forwarding closure parameter",
                    method.name
                )));
            }
            let parameter_name = escape_identifier(&parameter.name);
            declared.push(format!("{} {parameter_name}", parameter.ty.to_csharp()));
            forwarded.push(parameter_name);
        }
        let return_type =
            method.return_type.as_ref().map_or_else(|| "void".to_string(), |ty| ty.to_csharp());
        let call = format!(
            "{CLOSURE_PARAMETER} => {CLOSURE_PARAMETER}.{name}({})",
            forwarded.join(", ")
        );
        let statement = if method.return_type.is_some() {
            format!("return base.{}({call});", self.options.invoke_func)
        } else {
            format!("base.{}({call});", self.options.invoke_action)
        };
        let mut out = String::new();
        let _ = writeln!(out, "{member}public {return_type} {name}({})", declared.join(", "));
        let _ = writeln!(out, "{member}{{");
        let _ = writeln!(out, "{body}{statement}");
        let _ = writeln!(out, "{member}}}");
        Ok(out)
    }
}

/// Renders the machine-generated-file header.
fn render_header(tool_version: &str) -> String {
    let rule = format!("//{}", "-".repeat(78));
    let mut out = String::new();
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "// <auto-generated>");
    let _ = writeln!(out, "//     This code was generated by a tool.");
    let _ = writeln!(out, "//     Runtime Version:{tool_version}");
    let _ = writeln!(out, "//");
    let _ = writeln!(
        out,
        "//     Changes to this file may cause incorrect behavior and will be lost if"
    );
    let _ = writeln!(out, "//     the code is regenerated.");
    let _ = writeln!(out, "// </auto-generated>");
    let _ = writeln!(out, "{rule}");
    out
}
