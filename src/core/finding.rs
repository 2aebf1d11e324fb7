use crate::core::{Evidence, Severity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub title: String,
    pub description: String,
    #[serde(rename = "resource_address")]
    pub address: String,
    pub evidence: Evidence,
}
