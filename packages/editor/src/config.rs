use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::EditorError;
use crate::undo_stack::UndoStack;
use crate::utils::Attrs;

pub const DEFAULT_CONFIG_NAME: &str = "carbon.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum undo levels kept (0 = unlimited)
    #[serde(default = "default_max_undo_levels")]
    pub max_undo_levels: usize,

    /// Seed for generated component names; derived from the clock when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_seed: Option<String>,

    /// Default attributes per component class
    #[serde(default)]
    pub class_defaults: BTreeMap<String, Attrs>,
}

fn default_max_undo_levels() -> usize {
    UndoStack::DEFAULT_MAX_LEVELS
}

impl EditorConfig {
    /// Load config from a directory
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, EditorError> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json_str(&content)
        } else {
            // Return default config if none exists
            Ok(EditorConfig::default())
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self, EditorError> {
        let config: EditorConfig = serde_json::from_str(content)?;
        if let Some(seed) = &config.id_seed {
            if seed.trim().is_empty() {
                return Err(EditorError::Config("idSeed must not be empty".to_string()));
            }
        }
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_undo_levels: default_max_undo_levels(),
            id_seed: None,
            class_defaults: BTreeMap::new(),
        }
    }
}
