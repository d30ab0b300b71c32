//! Core algorithm trait definitions
//!
//! Algorithms expose a uniform, string-keyed parameter surface with typed
//! metadata, so drivers can be configured without knowing the concrete type.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

/// Algorithm configuration errors
#[derive(Debug, thiserror::Error)]
pub enum AlgorithmError {
    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Configuration(#[from] serde_json::Error),
}

/// Algorithm parameter with typed metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmParameter {
    pub name: String,
    pub value: String,
    pub value_type: ParameterType,
    pub description: String,
}

/// Parameter type enumeration for type-safe parameter handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    Boolean,
}

/// Algorithm complexity information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmComplexity {
    pub time_complexity: String,
    pub space_complexity: String,
}

/// Common surface of configurable algorithms
pub trait Algorithm: Debug {
    /// Returns the algorithm's descriptive name
    fn name(&self) -> &'static str;

    /// Returns the algorithm's category (e.g., graph, sorting)
    fn category(&self) -> &'static str;

    fn description(&self) -> String;

    fn complexity(&self) -> AlgorithmComplexity;

    /// Returns supported parameters with their current values
    fn parameters(&self) -> Vec<AlgorithmParameter>;

    /// Sets algorithm parameter with type validation
    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError>;

    fn get_parameter(&self, name: &str) -> Option<String>;
}

/// Parses a boolean parameter value, accepting only `true` and `false`
pub fn parse_bool_parameter(name: &str, value: &str) -> Result<bool, AlgorithmError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(AlgorithmError::InvalidParameter {
            name: name.to_string(),
            reason: format!("invalid boolean value '{value}', use 'true' or 'false'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_parameter() {
        assert!(parse_bool_parameter("flag", "true").unwrap());
        assert!(!parse_bool_parameter("flag", "false").unwrap());

        let err = parse_bool_parameter("flag", "maybe").unwrap_err();
        assert!(matches!(
            err,
            AlgorithmError::InvalidParameter { ref name, .. } if name == "flag"
        ));
        assert!(err.to_string().contains("maybe"));
    }

    #[test]
    fn test_configuration_error_wraps_json() {
        let json_err = serde_json::from_str::<bool>("not json").unwrap_err();
        let err = AlgorithmError::from(json_err);
        assert!(err.to_string().starts_with("Invalid configuration"));
    }
}
