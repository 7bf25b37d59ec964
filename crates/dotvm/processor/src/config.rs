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

//! Processor configuration

use serde::{Deserialize, Serialize};

use crate::error::{ProcessorError, ProcessorResult};

/// Configuration for a [`RoundProcessor`](crate::RoundProcessor)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Short processor name, used as the diagnostic prefix
    pub simple_name: String,
    /// Fully qualified processor name, used as the subject of diagnostics
    pub qualified_name: String,
    /// Tag printed next to the simple name in unresolved-element errors
    pub error_tag: String,
    /// Whether elements still outstanding on the final round are reported
    pub report_unresolved: bool,
    /// Whether a warning is reported for elements with no re-resolution strategy
    pub warn_unsupported_kinds: bool,
    /// Ignore annotation names the round's symbol table cannot resolve as a type
    ///
    /// Off by default: many symbol tables only index program types and never
    /// the annotation declarations themselves. Hosts that do index them should
    /// turn this on to skip names that are not declared anywhere.
    pub require_resolvable_annotations: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            simple_name: "RoundProcessor".to_string(),
            qualified_name: "dotvm_processor::RoundProcessor".to_string(),
            error_tag: "MiscError".to_string(),
            report_unresolved: true,
            warn_unsupported_kinds: true,
            require_resolvable_annotations: false,
        }
    }
}

impl ProcessorConfig {
    /// Create a configuration for a processor with the given names
    pub fn new(simple_name: impl Into<String>, qualified_name: impl Into<String>) -> Self {
        Self {
            simple_name: simple_name.into(),
            qualified_name: qualified_name.into(),
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> ProcessorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_error_tag(mut self, tag: impl Into<String>) -> Self {
        self.error_tag = tag.into();
        self
    }

    pub fn with_report_unresolved(mut self, enabled: bool) -> Self {
        self.report_unresolved = enabled;
        self
    }

    pub fn with_warn_unsupported_kinds(mut self, enabled: bool) -> Self {
        self.warn_unsupported_kinds = enabled;
        self
    }

    pub fn with_require_resolvable_annotations(mut self, enabled: bool) -> Self {
        self.require_resolvable_annotations = enabled;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ProcessorResult<()> {
        for (field, value) in [("simple_name", &self.simple_name), ("qualified_name", &self.qualified_name), ("error_tag", &self.error_tag)] {
            if value.is_empty() {
                return Err(ProcessorError::configuration_validation(field, "must not be empty"));
            }
            if value.chars().any(char::is_whitespace) {
                return Err(ProcessorError::configuration_validation(field, format!("must not contain whitespace: {:?}", value)));
            }
        }
        Ok(())
    }

    /// Message for an element that could not be processed before the final round
    pub fn unresolved_message(&self, subject: &str) -> String {
        format!(
            "[{}:{}] {} was unable to process {} because not all of its dependencies could be resolved. Check for compilation errors or a circular dependency with generated code.",
            self.simple_name, self.error_tag, self.qualified_name, subject
        )
    }

    /// Message for an element kind without a re-resolution strategy
    pub fn unsupported_message(&self, kind: &str) -> String {
        format!("{} does not support element kind {}.", self.qualified_name, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ProcessorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = ProcessorConfig::new("", "x::Y");
        assert!(matches!(config.validate(), Err(ProcessorError::ConfigurationValidation { field, .. }) if field == "simple_name"));

        let config = ProcessorConfig::new("Y", "x::Y").with_error_tag("Misc Error");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = ProcessorConfig::from_json(r#"{"simple_name": "Gen", "qualified_name": "tools::Gen", "report_unresolved": false}"#).unwrap();
        assert_eq!(config.simple_name, "Gen");
        assert_eq!(config.error_tag, "MiscError");
        assert!(!config.report_unresolved);
        assert!(config.warn_unsupported_kinds);

        assert!(matches!(ProcessorConfig::from_json("{not json"), Err(ProcessorError::ConfigParse(_))));
        assert!(ProcessorConfig::from_json(r#"{"simple_name": ""}"#).is_err());
    }

    #[test]
    fn test_resolvable_annotations_opt_in() {
        assert!(!ProcessorConfig::default().require_resolvable_annotations);
        let config = ProcessorConfig::from_json(r#"{"require_resolvable_annotations": true}"#).unwrap();
        assert!(config.require_resolvable_annotations);
        assert!(ProcessorConfig::default().with_require_resolvable_annotations(true).require_resolvable_annotations);
    }

    #[test]
    fn test_unresolved_message() {
        let config = ProcessorConfig::new("Gen", "tools::Gen");
        assert_eq!(
            config.unresolved_message("this method"),
            "[Gen:MiscError] tools::Gen was unable to process this method because not all of its dependencies could be resolved. Check for compilation errors or a circular dependency with generated code."
        );
        assert_eq!(config.unsupported_message("module"), "tools::Gen does not support element kind module.");
    }
}
