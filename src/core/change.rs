use serde::Serialize;
use serde_json::Value;

use crate::core::Action;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceChange {
    pub address: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    pub action: Action,
    #[serde(skip)]
    pub before: Value,
    #[serde(skip)]
    pub after: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub change_paths: Vec<String>,
}

impl ResourceChange {
    pub fn new(address: impl Into<String>, resource_type: impl Into<String>, action: Action) -> Self {
        Self {
            address: address.into(),
            resource_type: resource_type.into(),
            provider_name: None,
            action,
            before: Value::Null,
            after: Value::Null,
            change_paths: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub replace: usize,
    pub total: usize,
}

impl Counts {
    pub fn from_changes(changes: &[ResourceChange]) -> Self {
        let mut counts = Counts::default();
        for change in changes {
            match change.action {
                Action::Create => counts.create += 1,
                Action::Update => counts.update += 1,
                Action::Delete => counts.delete += 1,
                Action::Replace => counts.replace += 1,
                Action::NoOp => {}
            }
        }
        counts.total = counts.create + counts.update + counts.delete + counts.replace;
        counts
    }
}
