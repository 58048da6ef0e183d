//! Classifier configuration
//!
//! Every designated name the classifier compares against lives here so a
//! project using other component library prefixes can override it from TOML.
//! Missing keys fall back to the defaults below.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Which result shape a pass produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractMode {
    /// Region-bucketed records for documentation
    #[default]
    Documentation,
    /// One flat, source-ordered list annotated with permission flags
    Permission,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Wrapper tag whose first attribute marks a region
    pub root_wrapper: String,
    pub search_marker: String,
    pub data_marker: String,
    pub form_item_tag: String,
    pub button_tag: String,
    pub table_column_tag: String,
    pub dynamic_component_tag: String,
    pub button_auth_attribute: String,
    pub table_column_auth_attribute: String,
    pub table_column_legacy_auth_attribute: String,
    /// Closing markup of the icon that may precede a button label
    pub icon_closer: String,
    /// Script object keys whose array value names dynamically rendered sub-components
    pub component_registry_keys: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            root_wrapper: "template".to_string(),
            search_marker: "#search".to_string(),
            data_marker: "#table".to_string(),
            form_item_tag: "el-form-item".to_string(),
            button_tag: "el-button".to_string(),
            table_column_tag: "el-table-column".to_string(),
            dynamic_component_tag: "component".to_string(),
            button_auth_attribute: "v-auth".to_string(),
            table_column_auth_attribute: "v-auth".to_string(),
            table_column_legacy_auth_attribute: "v-permission".to_string(),
            icon_closer: "</i>".to_string(),
            component_registry_keys: vec!["components".to_string()],
        }
    }
}

impl ClassifierConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}
