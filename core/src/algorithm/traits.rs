//! Core algorithm trait definitions for AUGFLOW
//!
//! This module establishes the shared vocabulary for algorithm
//! implementations: the vertex identifier, the string-typed parameter
//! surface used to configure solvers at runtime, and the error type
//! reported by that surface.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque vertex identifier. Carries no attributes beyond identity.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Algorithm parameter description exposed through [`Algorithm::parameters`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmParameter {
    pub name: String,
    pub value: String,
    pub value_type: ParameterType,
}

/// Parameter type enumeration for type-safe parameter handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterType {
    Boolean,
    Enum(Vec<String>),
}

/// Errors raised by the parameter and configuration surface
#[derive(Debug, thiserror::Error)]
pub enum AlgorithmError {
    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AlgorithmError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        AlgorithmError::InvalidParameter {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Main algorithm trait
///
/// # Invariants
/// - Parameters round-trip: a value accepted by `set_parameter` is
///   returned verbatim by `get_parameter`
/// - Deterministic behavior for given inputs and parameters
pub trait Algorithm: fmt::Debug + Send + Sync {
    /// Returns the algorithm's descriptive name
    fn name(&self) -> &'static str;

    /// Returns the algorithm's category (e.g., max_flow)
    fn category(&self) -> &'static str;

    /// Returns the algorithm's description with complexity notes
    fn description(&self) -> &'static str;

    /// Returns supported parameters with their current values
    fn parameters(&self) -> Vec<AlgorithmParameter>;

    /// Sets algorithm parameter with type validation
    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError>;

    /// Gets algorithm parameter value
    fn get_parameter(&self, name: &str) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_type_safety() {
        let node1 = NodeId(42);
        let node2 = NodeId::from(42);
        let node3 = NodeId(43);

        assert_eq!(node1, node2);
        assert_ne!(node1, node3);
        assert!(node1 < node3);
        assert_eq!(node1.as_u32(), 42);
        assert_eq!(node3.to_string(), "43");
    }

    #[test]
    fn test_node_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&NodeId(7)).unwrap();
        assert_eq!(json, "7");

        let back: NodeId = serde_json::from_str("7").unwrap();
        assert_eq!(back, NodeId(7));
    }

    #[test]
    fn test_invalid_parameter_message() {
        let err = AlgorithmError::invalid("strategy", "unknown value");
        assert_eq!(err.to_string(), "Invalid parameter: strategy - unknown value");
    }
}
