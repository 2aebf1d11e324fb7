use crate::core::{Action, Finding, ResourceChange, Severity};

use super::classify::is_stateful;
use super::new_finding;

pub const REPLACE_TITLE: &str = "Resource replacement detected";
pub const DELETE_TITLE: &str = "Resource deletion detected";

pub(super) fn detect(ch: &ResourceChange) -> Vec<Finding> {
    let stateful = is_stateful(&ch.resource_type);
    let (title, severity, description) = match (ch.action, stateful) {
        (Action::Replace, false) => (
            REPLACE_TITLE,
            Severity::High,
            format!(
                "Resource {} will be replaced (destroyed and recreated). This may cause downtime or data loss.",
                ch.address
            ),
        ),
        (Action::Replace, true) => (
            REPLACE_TITLE,
            Severity::Critical,
            format!(
                "Stateful resource {} will be replaced (destroyed and recreated). This will likely cause data loss.",
                ch.address
            ),
        ),
        (Action::Delete, false) => (
            DELETE_TITLE,
            Severity::High,
            format!("Resource {} will be deleted.", ch.address),
        ),
        (Action::Delete, true) => (
            DELETE_TITLE,
            Severity::Critical,
            format!(
                "Stateful resource {} will be deleted. This will likely cause data loss.",
                ch.address
            ),
        ),
        _ => return Vec::new(),
    };

    vec![new_finding(
        severity,
        title,
        description,
        ch,
        ch.change_paths.clone(),
        Vec::new(),
    )]
}
