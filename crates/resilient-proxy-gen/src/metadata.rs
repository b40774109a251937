// crates/resilient-proxy-gen/src/metadata.rs
// ============================================================================
// Module: Assembly Metadata
// Description: Input model describing the exported types of one assembly.
// Purpose: Supply contract shapes to the introspector without runtime reflection.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Contracts are read from an assembly metadata document: a JSON dump of the
//! exported types of one assembly, their members, and type references. The
//! document is untrusted input and is read with a hard size limit
//! ([`MAX_METADATA_BYTES`]) before parsing.
//!
//! Type references accept two spellings:
//! - a plain string such as `"System.Int32"` or `"System.String[]"`;
//! - an object `{ "name", "arguments", "array_rank" }` for generic types.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::error::GenerateError;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum assembly metadata size accepted by the generator.
pub const MAX_METADATA_BYTES: u64 = 4 * 1024 * 1024;

/// Full name of the CLR type meaning "no value".
pub const VOID_TYPE: &str = "System.Void";

/// Largest array rank a C# array type may declare.
pub const MAX_ARRAY_RANK: u32 = 32;

// ============================================================================
// SECTION: Assembly
// ============================================================================

/// Exported types of one assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyMetadata {
    /// Assembly simple name.
    pub name: String,
    /// Exported and non-exported types, in declaration order.
    #[serde(default)]
    pub types: Vec<TypeMetadata>,
}

impl AssemblyMetadata {
    /// Reads assembly metadata from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError`] when the file cannot be read, exceeds
    /// [`MAX_METADATA_BYTES`], or is not valid metadata JSON.
    pub fn read(path: &Path) -> Result<Self, GenerateError> {
        let bytes = read_metadata_bytes(path)?;
        Self::from_slice(&bytes)
    }

    /// Parses assembly metadata from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Json`] for malformed input.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, GenerateError> {
        serde_json::from_slice(bytes).map_err(|err| GenerateError::Json(err.to_string()))
    }

    /// Finds a type by its fully-qualified name.
    #[must_use]
    pub fn find(&self, full_name: &str) -> Option<&TypeMetadata> {
        self.types.iter().find(|ty| ty.full_name() == full_name)
    }

    /// Returns the exported interfaces in declaration order.
    pub fn contracts(&self) -> impl Iterator<Item = &TypeMetadata> {
        self.types.iter().filter(|ty| ty.is_contract_shaped())
    }
}

/// Reads the metadata document with size limits to avoid memory exhaustion.
fn read_metadata_bytes(path: &Path) -> Result<Vec<u8>, GenerateError> {
    let file = fs::File::open(path).map_err(|err| GenerateError::Io(err.to_string()))?;
    let metadata = file.metadata().map_err(|err| GenerateError::Io(err.to_string()))?;
    if metadata.len() > MAX_METADATA_BYTES {
        return Err(GenerateError::Metadata(format!(
            "assembly metadata exceeds {MAX_METADATA_BYTES} bytes"
        )));
    }
    let mut bytes = Vec::new();
    let mut limited = file.take(MAX_METADATA_BYTES + 1);
    limited.read_to_end(&mut bytes).map_err(|err| GenerateError::Io(err.to_string()))?;
    let size = u64::try_from(bytes.len()).map_err(|_| {
        GenerateError::Metadata("assembly metadata size exceeds addressable memory".to_string())
    })?;
    if size > MAX_METADATA_BYTES {
        return Err(GenerateError::Metadata(format!(
            "assembly metadata exceeds {MAX_METADATA_BYTES} bytes"
        )));
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Category of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// Interface; the only contract-shaped kind.
    Interface,
    /// Reference type.
    Class,
    /// Value type.
    Struct,
    /// Enumeration.
    Enum,
    /// Delegate type.
    Delegate,
}

impl TypeKind {
    /// Returns the lowercase kind label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Interface => "interface",
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Delegate => "delegate",
        }
    }
}

/// Returns true for serde defaults that start enabled.
const fn enabled() -> bool {
    true
}

/// One declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMetadata {
    /// Declaring namespace; empty for the global namespace.
    #[serde(default)]
    pub namespace: String,
    /// Simple type name.
    pub name: String,
    /// Type category.
    pub kind: TypeKind,
    /// True when the type is visible outside the assembly.
    #[serde(default = "enabled")]
    pub exported: bool,
    /// Members in declaration order.
    #[serde(default)]
    pub members: Vec<MemberMetadata>,
}

impl TypeMetadata {
    /// Returns the namespace-qualified name.
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Returns true for exported interfaces.
    #[must_use]
    pub fn is_contract_shaped(&self) -> bool {
        self.exported && self.kind == TypeKind::Interface
    }
}

// ============================================================================
// SECTION: Members
// ============================================================================

/// One declared member of a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemberMetadata {
    /// Method, including compiler-generated accessors.
    Method {
        /// Method name.
        name: String,
        /// Parameters in declaration order.
        #[serde(default)]
        parameters: Vec<ParameterMetadata>,
        /// Return type; `None` or `System.Void` means no value.
        #[serde(default)]
        return_type: Option<TypeRef>,
        /// True for compiler-generated methods such as accessors.
        #[serde(default)]
        special_name: bool,
    },
    /// Property.
    Property {
        /// Property name.
        name: String,
        /// Property value type.
        #[serde(rename = "type")]
        value_type: TypeRef,
        /// True when the property has a getter.
        #[serde(default = "enabled")]
        can_read: bool,
        /// True when the property has a setter.
        #[serde(default)]
        can_write: bool,
    },
    /// Event.
    Event {
        /// Event name.
        name: String,
    },
    /// Field.
    Field {
        /// Field name.
        name: String,
    },
    /// Constructor.
    Constructor {
        /// Constructor name.
        name: String,
    },
    /// Nested type.
    NestedType {
        /// Nested type name.
        name: String,
    },
}

impl MemberMetadata {
    /// Returns the member name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Method { name, .. }
            | Self::Property { name, .. }
            | Self::Event { name }
            | Self::Field { name }
            | Self::Constructor { name }
            | Self::NestedType { name } => name,
        }
    }

    /// Returns the member kind label.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Method { .. } => "method",
            Self::Property { .. } => "property",
            Self::Event { .. } => "event",
            Self::Field { .. } => "field",
            Self::Constructor { .. } => "constructor",
            Self::NestedType { .. } => "nested type",
        }
    }
}

/// One method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterMetadata {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

// ============================================================================
// SECTION: Type References
// ============================================================================

/// Reference to a type as written in a signature.
///
/// # Invariants
/// - `name` carries no outermost array suffix; that rank is `array_rank`.
///   Jagged arrays keep their inner suffixes in `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TypeRefRepr")]
pub struct TypeRef {
    /// Full type name, possibly with a generic arity suffix (`` IList`1 ``).
    pub name: String,
    /// Generic type arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<Self>,
    /// Array rank; zero for non-array types.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub array_rank: u32,
}

/// Returns true for a zero array rank.
#[allow(clippy::trivially_copy_pass_by_ref, reason = "Signature required by serde.")]
const fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// Accepted spellings of a type reference.
#[derive(Deserialize)]
#[serde(untagged)]
enum TypeRefRepr {
    /// Plain type name, optionally with an array suffix.
    Name(String),
    /// Structured reference.
    Structured {
        /// Full type name.
        name: String,
        /// Generic type arguments.
        #[serde(default)]
        arguments: Vec<TypeRef>,
        /// Array rank.
        #[serde(default)]
        array_rank: u32,
    },
}

impl From<TypeRefRepr> for TypeRef {
    fn from(repr: TypeRefRepr) -> Self {
        match repr {
            TypeRefRepr::Name(name) => Self::parse(&name),
            TypeRefRepr::Structured {
                name,
                arguments,
                array_rank,
            } => Self {
                name,
                arguments,
                array_rank,
            },
        }
    }
}

impl TypeRef {
    /// Creates a non-generic, non-array reference.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            array_rank: 0,
        }
    }

    /// Creates a generic reference.
    #[must_use]
    pub fn generic(name: impl Into<String>, arguments: Vec<Self>) -> Self {
        Self {
            name: name.into(),
            arguments,
            array_rank: 0,
        }
    }

    /// Parses a plain name with optional trailing array suffixes (`[]`, `[,]`).
    ///
    /// Only the outermost suffix is folded into `array_rank`; jagged arrays
    /// keep their inner suffixes in the name.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if let Some(body) = trimmed.strip_suffix(']')
            && let Some(open) = body.rfind('[')
        {
            let inside = &body[open + 1 ..];
            if inside.chars().all(|ch| ch == ',') && open > 0 {
                let commas = u32::try_from(inside.len()).unwrap_or(u32::MAX - 1);
                return Self {
                    name: body[.. open].to_string(),
                    arguments: Vec::new(),
                    array_rank: commas + 1,
                };
            }
        }
        Self::named(trimmed)
    }

    /// Splits the name into its base and any jagged array suffixes
    /// (`System.Int32[][,]` yields `System.Int32` and ranks `[1, 2]`).
    ///
    /// Returns `None` when a trailing bracket group is not an array suffix.
    #[must_use]
    pub fn jagged_parts(&self) -> Option<(&str, Vec<usize>)> {
        let mut base = self.name.as_str();
        let mut ranks = Vec::new();
        while let Some(body) = base.strip_suffix(']') {
            let open = body.rfind('[')?;
            let inside = &body[open + 1 ..];
            if !inside.chars().all(|ch| ch == ',') {
                return None;
            }
            ranks.push(inside.len() + 1);
            base = &body[.. open];
        }
        ranks.reverse();
        Some((base, ranks))
    }

    /// Returns true when the reference denotes "no value".
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.array_rank == 0 && self.arguments.is_empty() && self.name == VOID_TYPE
    }

    /// Renders the reference as C# source text.
    ///
    /// CLR primitive types render as their C# keywords, nested type
    /// separators (`+`) render as `.`, and generic arity suffixes are dropped.
    #[must_use]
    pub fn to_csharp(&self) -> String {
        let mut out = String::new();
        self.write_csharp(&mut out);
        out
    }

    /// Appends the C# rendering to `out`.
    fn write_csharp(&self, out: &mut String) {
        match primitive_keyword(&self.name) {
            Some(keyword) => out.push_str(keyword),
            None => {
                let base = self.name.split('`').next().unwrap_or(&self.name);
                out.push_str(&base.replace('+', "."));
            }
        }
        if !self.arguments.is_empty() {
            out.push('<');
            for (index, argument) in self.arguments.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                argument.write_csharp(out);
            }
            out.push('>');
        }
        if self.array_rank > 0 {
            out.push('[');
            for _ in 1 .. self.array_rank {
                out.push(',');
            }
            out.push(']');
        }
    }
}

/// Maps CLR primitive type names to C# keywords.
fn primitive_keyword(name: &str) -> Option<&'static str> {
    let keyword = match name {
        "System.Boolean" => "bool",
        "System.Byte" => "byte",
        "System.SByte" => "sbyte",
        "System.Char" => "char",
        "System.Decimal" => "decimal",
        "System.Double" => "double",
        "System.Single" => "float",
        "System.Int16" => "short",
        "System.UInt16" => "ushort",
        "System.Int32" => "int",
        "System.UInt32" => "uint",
        "System.Int64" => "long",
        "System.UInt64" => "ulong",
        "System.Object" => "object",
        "System.String" => "string",
        "System.Void" => "void",
        _ => return None,
    };
    Some(keyword)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
