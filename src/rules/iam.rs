use crate::core::{Action, Finding, ResourceChange, Severity, dedupe_findings};

use super::classify::{IAM_POLICY_PATH_HINTS, is_iam, is_iam_attachment, is_iam_policy_document};
use super::{filter_paths, has_path_hint, new_finding};

pub const IAM_ATTACHMENT_TITLE: &str = "IAM policy attachment change detected";
pub const IAM_POLICY_DOC_TITLE: &str = "IAM policy document change detected";

const ATTACHMENT_PATH_HINTS: &[&str] = &["policy", "role", "group", "user"];

// Deletions are left to the destructive-action rule.
pub(super) fn detect(ch: &ResourceChange) -> Vec<Finding> {
    if !is_iam(&ch.resource_type) || ch.action == Action::Delete {
        return Vec::new();
    }

    let mut findings = Vec::new();

    if is_iam_attachment(&ch.resource_type) {
        findings.push(new_finding(
            Severity::High,
            IAM_ATTACHMENT_TITLE,
            format!(
                "IAM attachment resource {} is being created or modified.",
                ch.address
            ),
            ch,
            filter_paths(&ch.change_paths, ATTACHMENT_PATH_HINTS),
            vec![ch.resource_type.clone()],
        ));
    }

    let touches_policy = is_iam_policy_document(&ch.resource_type)
        || has_path_hint(&ch.change_paths, IAM_POLICY_PATH_HINTS);
    if touches_policy && matches!(ch.action, Action::Create | Action::Update | Action::Replace) {
        findings.push(new_finding(
            Severity::High,
            IAM_POLICY_DOC_TITLE,
            format!(
                "Policy document fields changed for {}. Review policy scope carefully.",
                ch.address
            ),
            ch,
            filter_paths(&ch.change_paths, IAM_POLICY_PATH_HINTS),
            Vec::new(),
        ));
    }

    dedupe_findings(findings)
}
