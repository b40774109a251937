// crates/resilient-proxy-gen/src/contract.rs
// ============================================================================
// Module: Contract Descriptors
// Description: Normalized member model consumed by the synthesizer.
// Purpose: Represent a contract as ordered method and property members.
// Dependencies: crate::metadata
// ============================================================================

//! ## Overview
//! A [`ContractDescriptor`] is the introspector's output: the contract's
//! names plus its members in declaration order. Accessor methods backing a
//! property never appear as separate [`MethodMember`] values.

use crate::metadata::TypeRef;

/// Normalized view of one contract.
///
/// # Invariants
/// - `members` follow declaration order.
/// - Member names are unique per kind; accessors are folded into properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDescriptor {
    /// Simple contract name, e.g. `IThing`.
    pub name: String,
    /// Namespace-qualified contract name.
    pub full_name: String,
    /// Members in declaration order.
    pub members: Vec<MemberDescriptor>,
}

impl ContractDescriptor {
    /// Returns the method members in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodMember> {
        self.members.iter().filter_map(|member| match member {
            MemberDescriptor::Method(method) => Some(method),
            MemberDescriptor::Property(_) => None,
        })
    }

    /// Returns the property members in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyMember> {
        self.members.iter().filter_map(|member| match member {
            MemberDescriptor::Property(property) => Some(property),
            MemberDescriptor::Method(_) => None,
        })
    }
}

/// One proxied member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberDescriptor {
    /// Ordinary method.
    Method(MethodMember),
    /// Property with a getter and an optional setter.
    Property(PropertyMember),
}

impl MemberDescriptor {
    /// Returns the member name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Method(method) => &method.name,
            Self::Property(property) => &property.name,
        }
    }
}

/// Method member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodMember {
    /// Method name.
    pub name: String,
    /// Parameters in declaration order; names are unique.
    pub parameters: Vec<Parameter>,
    /// Return type; `None` when the method returns no value.
    pub return_type: Option<TypeRef>,
}

/// Method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    pub ty: TypeRef,
}

/// Property member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMember {
    /// Property name.
    pub name: String,
    /// Value type.
    pub value_type: TypeRef,
    /// True when the property supports assignment.
    pub writable: bool,
}
