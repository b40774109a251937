// crates/resilient-proxy-gen/src/csharp.rs
// ============================================================================
// Module: C# Lexical Helpers
// Description: Identifier validation and keyword escaping for C# output.
// Purpose: Keep rendered names syntactically valid.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Helpers shared by the introspector, the synthesizer, and configuration
//! validation. Identifiers that collide with reserved keywords are rendered
//! with a verbatim `@` prefix.

/// Reserved C# keywords.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Returns true when `name` is a reserved keyword.
#[must_use]
pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Returns true when `name` is a syntactically valid identifier.
///
/// A leading `@` is not accepted; escaping is applied at render time.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|first| first == '_' || first.is_alphabetic())
        && chars.all(|ch| ch == '_' || ch.is_alphanumeric())
}

/// Returns true when `name` is a dot-separated sequence of identifiers.
#[must_use]
pub fn is_qualified_name(name: &str) -> bool {
    name.split('.').all(|segment| is_identifier(segment) && !is_keyword(segment))
}

/// Renders an identifier, escaping reserved keywords.
#[must_use]
pub fn escape_identifier(name: &str) -> String {
    if is_keyword(name) { format!("@{name}") } else { name.to_string() }
}
