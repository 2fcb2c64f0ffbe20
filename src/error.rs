//! Error types for the PIT engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the engine, its policy configuration and its
//! boundaries can report.

use rust_decimal::Decimal;
use thiserror::Error;

/// The main error type for the PIT engine.
///
/// All fallible operations in the crate return this error type, making it
/// easy to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use pit_engine::error::EngineError;
///
/// let error = EngineError::PresetNotFound {
///     id: "2019".to_string(),
/// };
/// assert_eq!(error.to_string(), "Policy preset not found: 2019");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Policy file or directory was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Policy file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A policy failed validation and cannot be used for calculation.
    #[error("Invalid policy field '{field}': {message}")]
    ConfigurationError {
        /// The policy field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// No policy preset exists with the requested id.
    #[error("Policy preset not found: {id}")]
    PresetNotFound {
        /// The requested preset id.
        id: String,
    },

    /// Calculation input violated a caller precondition.
    #[error("Invalid input field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The net to gross search could not bracket or converge on the target.
    #[error(
        "Net to gross search did not converge for target {target} after {iterations} iterations (best interval [{lower}, {upper}])"
    )]
    NotConverged {
        /// The requested net salary.
        target: Decimal,
        /// Lower end of the best bracketing interval found.
        lower: Decimal,
        /// Upper end of the best bracketing interval found.
        upper: Decimal,
        /// Number of search iterations performed.
        iterations: u32,
    },

    /// The advisory collaborator failed to answer.
    #[error("Tax advisor unavailable: {message}")]
    AdvisorUnavailable {
        /// A description of the failure.
        message: String,
    },

    /// The advisory collaborator did not answer in time.
    #[error("Tax advisor timed out after {seconds}s")]
    AdvisorTimeout {
        /// The timeout that elapsed, in seconds.
        seconds: u64,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/2025.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/2025.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_configuration_error_displays_field_and_message() {
        let error = EngineError::ConfigurationError {
            field: "brackets[2].rate".to_string(),
            message: "rates must strictly increase".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid policy field 'brackets[2].rate': rates must strictly increase"
        );
    }

    #[test]
    fn test_invalid_input_displays_field_and_message() {
        let error = EngineError::InvalidInput {
            field: "income".to_string(),
            message: "must be positive".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid input field 'income': must be positive"
        );
    }

    #[test]
    fn test_not_converged_displays_interval() {
        let error = EngineError::NotConverged {
            target: Decimal::from_str("1000").unwrap(),
            lower: Decimal::from_str("0").unwrap(),
            upper: Decimal::from_str("100000").unwrap(),
            iterations: 7,
        };
        let message = error.to_string();
        assert!(message.contains("target 1000"));
        assert!(message.contains("after 7 iterations"));
        assert!(message.contains("[0, 100000]"));
    }

    #[test]
    fn test_advisor_timeout_displays_seconds() {
        let error = EngineError::AdvisorTimeout { seconds: 30 };
        assert_eq!(error.to_string(), "Tax advisor timed out after 30s");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_preset_not_found() -> EngineResult<()> {
            Err(EngineError::PresetNotFound {
                id: "1999".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_preset_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
