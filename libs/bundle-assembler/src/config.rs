//! Assembly configuration

use crate::error::ConfigError;
use casebridge_models::{BundleType, ResourceKind};
use serde::{Deserialize, Serialize};

/// Settings for care-plan mapping and transaction rendering
///
/// Every field has a default, so a partial YAML document only needs to name
/// what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Kinds a new care plan links to as supporting information
    pub supporting_info_kinds: Vec<ResourceKind>,

    /// Type of the rendered bundle
    pub bundle_type: BundleType,

    /// HTTP method used for each transaction entry
    pub request_method: String,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            supporting_info_kinds: vec![
                ResourceKind::QuestionnaireResponse,
                ResourceKind::Observation,
            ],
            bundle_type: BundleType::Transaction,
            request_method: "POST".to_string(),
        }
    }
}

impl AssemblerConfig {
    /// Parse and validate a YAML configuration document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_method.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "request_method must not be empty".to_string(),
            ));
        }
        if self.supporting_info_kinds.contains(&ResourceKind::List) {
            return Err(ConfigError::InvalidConfig(
                "manifest lists cannot be linked as supporting information".to_string(),
            ));
        }
        Ok(())
    }
}
