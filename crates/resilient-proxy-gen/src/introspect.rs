// crates/resilient-proxy-gen/src/introspect.rs
// ============================================================================
// Module: Contract Introspector
// Description: Turns type metadata into an ordered contract descriptor.
// Purpose: Enumerate proxied members and reject unsupported contract shapes.
// Dependencies: crate::{contract, csharp, metadata}, thiserror
// ============================================================================

//! ## Overview
//! [`introspect`] walks a contract's members in declaration order and yields
//! one [`MemberDescriptor`] per method or property. Accessor methods named
//! `get_X`/`set_X` are folded into property `X` when that property is
//! declared on the same contract; otherwise they are ordinary methods.
//!
//! Anything the synthesizer cannot express fails the whole contract: events,
//! fields, constructors, nested types, write-only properties, duplicate
//! parameter names, invalid identifiers, and non-interface types.
//!
//! Every type reference in a signature is checked before it reaches the
//! renderer: names and generic arguments must be qualified C# names, arity
//! suffixes must match the argument count, array ranks stay within
//! [`MAX_ARRAY_RANK`], and `System.Void` is accepted only as a return type.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::contract::ContractDescriptor;
use crate::contract::MemberDescriptor;
use crate::contract::MethodMember;
use crate::contract::Parameter;
use crate::contract::PropertyMember;
use crate::csharp::is_identifier;
use crate::csharp::is_qualified_name;
use crate::metadata::MAX_ARRAY_RANK;
use crate::metadata::MemberMetadata;
use crate::metadata::TypeMetadata;
use crate::metadata::TypeRef;
use crate::metadata::VOID_TYPE;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Contract shapes the introspector rejects.
///
/// # Invariants
/// - Every variant names the contract; member-level variants name the member.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntrospectError {
    /// The type is not an exported interface.
    #[error("'{contract}' is not an exported interface (found {kind})")]
    NotContractShaped {
        /// Contract name.
        contract: String,
        /// Actual type kind and visibility.
        kind: String,
    },
    /// Generic contracts cannot be proxied by name.
    #[error("'{contract}' is generic; generic contracts are not supported")]
    GenericContract {
        /// Contract name.
        contract: String,
    },
    /// The contract declares a member kind the proxy cannot forward.
    #[error("'{contract}' declares {kind} '{member}', which a proxy cannot forward")]
    UnsupportedMember {
        /// Contract name.
        contract: String,
        /// Member name.
        member: String,
        /// Member kind label.
        kind: &'static str,
    },
    /// A method declares the same parameter name twice.
    #[error("'{contract}.{method}' declares parameter '{parameter}' more than once")]
    DuplicateParameter {
        /// Contract name.
        contract: String,
        /// Method name.
        method: String,
        /// Repeated parameter name.
        parameter: String,
    },
    /// A property without a getter.
    #[error("'{contract}.{property}' is write-only; properties must be readable")]
    WriteOnlyProperty {
        /// Contract name.
        contract: String,
        /// Property name.
        property: String,
    },
    /// A name that is not a valid identifier.
    #[error("'{contract}' uses '{identifier}', which is not a valid identifier")]
    InvalidIdentifier {
        /// Contract name.
        contract: String,
        /// Offending name.
        identifier: String,
    },
    /// The declaring namespace is not a qualified name.
    #[error("'{contract}' is declared in '{namespace}', which is not a valid namespace")]
    InvalidNamespace {
        /// Contract name.
        contract: String,
        /// Offending namespace.
        namespace: String,
    },
    /// A signature uses a type name the renderer cannot express.
    #[error("'{contract}.{member}' uses type '{type_name}', which is not a valid type name")]
    InvalidType {
        /// Contract name.
        contract: String,
        /// Member whose signature carries the type.
        member: String,
        /// Offending type name.
        type_name: String,
    },
    /// `System.Void` used as a parameter, property, or argument type.
    #[error("'{contract}.{member}' uses System.Void where a value type is required")]
    VoidType {
        /// Contract name.
        contract: String,
        /// Member whose signature carries the type.
        member: String,
    },
    /// An array rank beyond [`MAX_ARRAY_RANK`].
    #[error("'{contract}.{member}' declares an array of rank {rank}, beyond the C# maximum")]
    ArrayRankTooLarge {
        /// Contract name.
        contract: String,
        /// Member whose signature carries the type.
        member: String,
        /// Declared rank.
        rank: u32,
    },
}

// ============================================================================
// SECTION: Introspection
// ============================================================================

/// Accessor prefixes folded into properties.
const ACCESSOR_PREFIXES: [&str; 2] = ["get_", "set_"];

/// Builds the descriptor for `contract`.
///
/// # Errors
///
/// Returns [`IntrospectError`] for any shape the proxy cannot express.
pub fn introspect(contract: &TypeMetadata) -> Result<ContractDescriptor, IntrospectError> {
    let contract_name = contract.full_name();
    if !contract.is_contract_shaped() {
        let visibility = if contract.exported { "exported" } else { "non-exported" };
        return Err(IntrospectError::NotContractShaped {
            contract: contract_name,
            kind: format!("{visibility} {}", contract.kind.as_str()),
        });
    }
    if contract.name.contains('`') {
        return Err(IntrospectError::GenericContract {
            contract: contract_name,
        });
    }
    ensure_identifier(&contract_name, &contract.name)?;
    if !contract.namespace.is_empty() && !is_qualified_name(&contract.namespace) {
        return Err(IntrospectError::InvalidNamespace {
            contract: contract_name,
            namespace: contract.namespace.clone(),
        });
    }

    let property_names: BTreeSet<&str> = contract
        .members
        .iter()
        .filter_map(|member| match member {
            MemberMetadata::Property { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();

    let mut members = Vec::new();
    for member in &contract.members {
        match member {
            MemberMetadata::Method {
                name,
                parameters,
                return_type,
                ..
            } => {
                if is_accessor(name, &property_names) {
                    continue;
                }
                ensure_identifier(&contract_name, name)?;
                let mut seen = BTreeSet::new();
                let mut rendered = Vec::with_capacity(parameters.len());
                for parameter in parameters {
                    ensure_identifier(&contract_name, &parameter.name)?;
                    ensure_type(&contract_name, name, &parameter.ty)?;
                    if !seen.insert(parameter.name.as_str()) {
                        return Err(IntrospectError::DuplicateParameter {
                            contract: contract_name,
                            method: name.clone(),
                            parameter: parameter.name.clone(),
                        });
                    }
                    rendered.push(Parameter {
                        name: parameter.name.clone(),
                        ty: parameter.ty.clone(),
                    });
                }
                let return_type = match return_type {
                    Some(ty) if !ty.is_void() => {
                        ensure_type(&contract_name, name, ty)?;
                        Some(ty.clone())
                    }
                    _ => None,
                };
                members.push(MemberDescriptor::Method(MethodMember {
                    name: name.clone(),
                    parameters: rendered,
                    return_type,
                }));
            }
            MemberMetadata::Property {
                name,
                value_type,
                can_read,
                can_write,
            } => {
                ensure_identifier(&contract_name, name)?;
                if !can_read {
                    return Err(IntrospectError::WriteOnlyProperty {
                        contract: contract_name,
                        property: name.clone(),
                    });
                }
                ensure_type(&contract_name, name, value_type)?;
                members.push(MemberDescriptor::Property(PropertyMember {
                    name: name.clone(),
                    value_type: value_type.clone(),
                    writable: *can_write,
                }));
            }
            MemberMetadata::Event { .. }
            | MemberMetadata::Field { .. }
            | MemberMetadata::Constructor { .. }
            | MemberMetadata::NestedType { .. } => {
                return Err(IntrospectError::UnsupportedMember {
                    contract: contract_name,
                    member: member.name().to_string(),
                    kind: member.kind_label(),
                });
            }
        }
    }

    Ok(ContractDescriptor {
        name: contract.name.clone(),
        full_name: contract_name,
        members,
    })
}

/// Returns true when `name` is an accessor of a declared property.
fn is_accessor(name: &str, properties: &BTreeSet<&str>) -> bool {
    ACCESSOR_PREFIXES
        .iter()
        .filter_map(|prefix| name.strip_prefix(prefix))
        .any(|property| properties.contains(property))
}

/// Fails when `identifier` is not a valid identifier.
fn ensure_identifier(contract: &str, identifier: &str) -> Result<(), IntrospectError> {
    if is_identifier(identifier) {
        Ok(())
    } else {
        Err(IntrospectError::InvalidIdentifier {
            contract: contract.to_string(),
            identifier: identifier.to_string(),
        })
    }
}

/// Fails when `ty`, or any of its generic arguments, cannot be rendered as a
/// C# value type.
fn ensure_type(contract: &str, member: &str, ty: &TypeRef) -> Result<(), IntrospectError> {
    let invalid = || IntrospectError::InvalidType {
        contract: contract.to_string(),
        member: member.to_string(),
        type_name: ty.name.clone(),
    };
    let (base, jagged) = ty.jagged_parts().ok_or_else(invalid)?;
    let widest = jagged
        .iter()
        .map(|rank| u32::try_from(*rank).unwrap_or(u32::MAX))
        .chain(std::iter::once(ty.array_rank))
        .max()
        .unwrap_or(0);
    if widest > MAX_ARRAY_RANK {
        return Err(IntrospectError::ArrayRankTooLarge {
            contract: contract.to_string(),
            member: member.to_string(),
            rank: widest,
        });
    }
    let (name, arity) = match base.split_once('`') {
        Some((name, digits)) => {
            if !digits.bytes().all(|byte| byte.is_ascii_digit()) {
                return Err(invalid());
            }
            (name, Some(digits.parse::<usize>().map_err(|_| invalid())?))
        }
        None => (base, None),
    };
    if name == VOID_TYPE {
        return Err(IntrospectError::VoidType {
            contract: contract.to_string(),
            member: member.to_string(),
        });
    }
    if !is_qualified_name(&name.replace('+', ".")) {
        return Err(invalid());
    }
    if arity.is_some_and(|arity| arity != ty.arguments.len()) {
        return Err(invalid());
    }
    ty.arguments.iter().try_for_each(|argument| ensure_type(contract, member, argument))
}
