use crate::core::{Action, Finding, ResourceChange, Severity, dedupe_findings};

use super::classify::{STATEFUL_IMPACTFUL_PATH_HINTS, TAG_FIELDS, is_network_routing, is_stateful};
use super::{filter_paths, new_finding};

pub const TAG_ONLY_TITLE: &str = "Tag-only update detected";
pub const IMPACTFUL_STATEFUL_UPDATE_TITLE: &str = "Impactful stateful update detected";
pub const NETWORK_ROUTING_TITLE: &str = "Network routing change detected";

pub(super) fn detect(ch: &ResourceChange) -> Vec<Finding> {
    if !matches!(ch.action, Action::Create | Action::Update | Action::Replace) {
        return Vec::new();
    }

    let mut findings = Vec::new();

    if ch.action == Action::Update && is_tag_only_change(&ch.change_paths) {
        findings.push(new_finding(
            Severity::Low,
            TAG_ONLY_TITLE,
            format!("Resource {} only changed tags.", ch.address),
            ch,
            filter_paths(&ch.change_paths, TAG_FIELDS),
            Vec::new(),
        ));
    }

    if ch.action == Action::Update && is_stateful(&ch.resource_type) {
        let matched = filter_paths(&ch.change_paths, STATEFUL_IMPACTFUL_PATH_HINTS);
        if !matched.is_empty() {
            findings.push(new_finding(
                Severity::Medium,
                IMPACTFUL_STATEFUL_UPDATE_TITLE,
                format!(
                    "Stateful resource {} has impactful configuration updates.",
                    ch.address
                ),
                ch,
                matched,
                Vec::new(),
            ));
        }
    }

    if is_network_routing(&ch.resource_type) {
        findings.push(new_finding(
            Severity::Medium,
            NETWORK_ROUTING_TITLE,
            format!(
                "Resource {} changes network routing/gateway behavior.",
                ch.address
            ),
            ch,
            ch.change_paths.clone(),
            Vec::new(),
        ));
    }

    dedupe_findings(findings)
}

fn is_tag_only_change(paths: &[String]) -> bool {
    !paths.is_empty()
        && paths
            .iter()
            .all(|p| TAG_FIELDS.contains(&top_level_segment(p)))
}

/// `tags.env` and `tags[0]` both reduce to `tags`.
fn top_level_segment(path: &str) -> &str {
    let end = path.find(['.', '[']).unwrap_or(path.len());
    &path[..end]
}
