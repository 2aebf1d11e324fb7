use serde::{Deserialize, Serialize};

use crate::core::Action;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub action: Action,
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub change_paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<String>,
}

impl Evidence {
    pub fn new(action: Action, resource_type: impl Into<String>) -> Self {
        Self {
            action,
            resource_type: resource_type.into(),
            change_paths: Vec::new(),
            matches: Vec::new(),
        }
    }

    pub fn with_paths(mut self, change_paths: Vec<String>) -> Self {
        self.change_paths = change_paths;
        self
    }

    pub fn with_matches(mut self, matches: Vec<String>) -> Self {
        self.matches = matches;
        self
    }
}
