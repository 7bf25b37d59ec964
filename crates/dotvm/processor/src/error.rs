// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Error handling for the round processor
//!
//! Deferral is not an error: elements that are not ready are carried into the
//! next round silently. The variants here are configuration problems and
//! violated invariants of the host's element model, which abort a round.

use thiserror::Error;

/// Errors that can occur while configuring or driving the processor
#[derive(Error, Debug)]
pub enum ProcessorError {
    // Configuration Errors
    #[error("Configuration validation failed: {field} - {details}")]
    ConfigurationValidation { field: String, details: String },

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    // Element Model Invariants
    #[error("{element} is not enclosed in any type")]
    NotEnclosedInType { element: String },

    #[error("Did not find {element} among its same-named siblings {siblings:?}")]
    ExecutableNotFound { element: String, siblings: Vec<String> },

    // Lifecycle Errors
    #[error("Round {round} received after processing was already over")]
    RoundAfterCompletion { round: usize },

    // Internal Errors
    #[error("Internal processor error: {0}")]
    Internal(String),
}

impl ProcessorError {
    /// Create a configuration validation error
    pub fn configuration_validation(field: impl Into<String>, details: impl Into<String>) -> Self {
        Self::ConfigurationValidation {
            field: field.into(),
            details: details.into(),
        }
    }

    /// Create an error for an element that has no enclosing type
    pub fn not_enclosed_in_type(element: impl ToString) -> Self {
        Self::NotEnclosedInType { element: element.to_string() }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if the caller can reasonably continue after this error
    pub fn is_recoverable(&self) -> bool {
        match self.category() {
            ErrorCategory::Configuration => true,
            ErrorCategory::Lifecycle => true,
            ErrorCategory::Invariant | ErrorCategory::Internal => false,
        }
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationValidation { .. } | Self::ConfigParse(_) => ErrorCategory::Configuration,
            Self::NotEnclosedInType { .. } | Self::ExecutableNotFound { .. } => ErrorCategory::Invariant,
            Self::RoundAfterCompletion { .. } => ErrorCategory::Lifecycle,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }
}

/// Error categories for better error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Invariant,
    Lifecycle,
    Internal,
}

impl ErrorCategory {
    /// Get the category name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Invariant => "invariant",
            Self::Lifecycle => "lifecycle",
            Self::Internal => "internal",
        }
    }
}

/// Result type alias for processor operations
pub type ProcessorResult<T> = Result<T, ProcessorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let error = ProcessorError::not_enclosed_in_type("com.example");
        assert_eq!(error.category(), ErrorCategory::Invariant);
        assert!(!error.is_recoverable());

        let error = ProcessorError::configuration_validation("simple_name", "must not be empty");
        assert_eq!(error.category(), ErrorCategory::Configuration);
        assert!(error.is_recoverable());

        let error = ProcessorError::RoundAfterCompletion { round: 4 };
        assert_eq!(error.category().as_str(), "lifecycle");
    }

    #[test]
    fn test_error_messages() {
        let error = ProcessorError::ExecutableNotFound {
            element: "m(int)".to_string(),
            siblings: vec!["m()".to_string()],
        };
        assert_eq!(error.to_string(), "Did not find m(int) among its same-named siblings [\"m()\"]");

        let error = ProcessorError::internal_error("boom");
        assert_eq!(error.to_string(), "Internal processor error: boom");
    }
}
