use serde_json::Value;

use crate::core::{Evidence, Finding, ResourceChange, Severity};

pub mod classify;
mod destructive;
mod exposure;
mod iam;
mod update;

pub use destructive::{DELETE_TITLE, REPLACE_TITLE};
pub use exposure::{INTERNET_FACING_LB_TITLE, PUBLIC_INGRESS_TITLE, PUBLIC_IP_TITLE};
pub use iam::{IAM_ATTACHMENT_TITLE, IAM_POLICY_DOC_TITLE};
pub use update::{IMPACTFUL_STATEFUL_UPDATE_TITLE, NETWORK_ROUTING_TITLE, TAG_ONLY_TITLE};

/// A rule examines one change and reports zero or more findings. Rules never
/// fail: after-state they cannot interpret is treated as "no match".
pub type Detector = fn(&ResourceChange) -> Vec<Finding>;

/// Registration order is the per-change emission order.
pub const DETECTORS: &[(&str, Detector)] = &[
    ("destructive-action", destructive::detect),
    ("public-ingress", exposure::public_ingress),
    ("internet-facing-lb", exposure::internet_facing_lb),
    ("public-ip-association", exposure::public_ip_association),
    ("iam", iam::detect),
    ("update-risk", update::detect),
];

pub fn analyze(changes: &[ResourceChange]) -> Vec<Finding> {
    changes.iter().flat_map(analyze_change).collect()
}

pub fn analyze_change(change: &ResourceChange) -> Vec<Finding> {
    let mut out = Vec::new();
    for (name, detect) in DETECTORS {
        let found = detect(change);
        if !found.is_empty() {
            tracing::debug!(
                detector = *name,
                address = %change.address,
                count = found.len(),
                "rule matched"
            );
        }
        out.extend(found);
    }
    out
}

fn new_finding(
    severity: Severity,
    title: &str,
    description: String,
    change: &ResourceChange,
    change_paths: Vec<String>,
    matches: Vec<String>,
) -> Finding {
    Finding {
        severity,
        title: title.to_string(),
        description,
        address: change.address.clone(),
        evidence: Evidence::new(change.action, change.resource_type.clone())
            .with_paths(change_paths)
            .with_matches(matches),
    }
}

/// Paths containing any of `hints` as a substring, sorted.
fn filter_paths(paths: &[String], hints: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = paths
        .iter()
        .filter(|p| hints.iter().any(|h| p.contains(h)))
        .cloned()
        .collect();
    out.sort();
    out
}

fn has_path_hint(paths: &[String], hints: &[&str]) -> bool {
    paths.iter().any(|p| hints.iter().any(|h| p.contains(h)))
}

fn as_str(v: &Value) -> Option<&str> {
    v.as_str()
}

// Accepts JSON booleans and the string spellings providers sometimes emit.
fn as_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_int(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Action;
    use serde_json::json;

    pub(super) fn change(address: &str, resource_type: &str, action: Action) -> ResourceChange {
        ResourceChange::new(address, resource_type, action)
    }

    pub(super) fn titles(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.title.as_str()).collect()
    }

    #[test]
    fn replace_on_plain_type_yields_single_high() {
        let findings = analyze(&[change("aws_instance.web", "aws_instance", Action::Replace)]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
        assert_eq!(findings[0].title, REPLACE_TITLE);
    }

    #[test]
    fn plain_create_and_update_yield_nothing() {
        let findings = analyze(&[
            change("aws_instance.a", "aws_instance", Action::Create),
            change("aws_instance.b", "aws_instance", Action::Update),
        ]);
        assert!(findings.is_empty(), "{findings:?}");
    }

    #[test]
    fn analyze_preserves_change_order_and_detector_order() {
        let mut sg = change("aws_security_group.web", "aws_security_group", Action::Replace);
        sg.after = json!({
            "ingress": [{"from_port": 22, "to_port": 22, "protocol": "tcp", "cidr_blocks": ["0.0.0.0/0"]}]
        });
        let findings = analyze(&[
            change("aws_route.a", "aws_route", Action::Delete),
            sg,
        ]);
        assert_eq!(
            titles(&findings),
            vec![DELETE_TITLE, REPLACE_TITLE, PUBLIC_INGRESS_TITLE]
        );
        assert_eq!(findings[0].address, "aws_route.a");
        assert_eq!(findings[2].address, "aws_security_group.web");
    }

    #[test]
    fn iam_attachment_and_policy_doc_fire_on_separate_resources_once_each() {
        let mut attach = change(
            "aws_iam_role_policy_attachment.app",
            "aws_iam_role_policy_attachment",
            Action::Create,
        );
        attach.after = json!({"role": "app-role", "policy_arn": "arn:aws:iam::aws:policy/ReadOnlyAccess"});
        let mut policy = change("aws_iam_policy.custom", "aws_iam_policy", Action::Update);
        policy.change_paths = vec!["policy".to_string()];

        let findings = analyze(&[attach, policy]);
        let attach_hits = findings.iter().filter(|f| f.title == IAM_ATTACHMENT_TITLE).count();
        let doc_hits = findings.iter().filter(|f| f.title == IAM_POLICY_DOC_TITLE).count();
        assert_eq!(attach_hits, 1);
        assert_eq!(doc_hits, 1);
        let doc = findings
            .iter()
            .find(|f| f.title == IAM_POLICY_DOC_TITLE)
            .expect("policy doc finding");
        assert_eq!(doc.address, "aws_iam_policy.custom");
    }

    #[test]
    fn filter_paths_is_substring_and_sorted() {
        let paths = vec![
            "tags.env".to_string(),
            "ingress[0].to_port".to_string(),
            "ingress[0].cidr_blocks".to_string(),
        ];
        assert_eq!(
            filter_paths(&paths, &["ingress"]),
            vec!["ingress[0].cidr_blocks", "ingress[0].to_port"]
        );
        assert!(filter_paths(&paths, &["scheme"]).is_empty());
        assert!(filter_paths(&[], &["x"]).is_empty());
        assert!(has_path_hint(&paths, &["env"]));
    }

    #[test]
    fn loose_scalar_accessors() {
        assert_eq!(as_int(&json!(22)), Some(22));
        assert_eq!(as_int(&json!(22.6)), Some(23));
        assert_eq!(as_int(&json!("443")), Some(443));
        assert_eq!(as_int(&json!("http")), None);
        assert_eq!(as_int(&json!(" 22")), None);
        assert_eq!(as_int(&json!("22 ")), None);
        assert_eq!(as_int(&json!(null)), None);
        assert_eq!(as_bool(&json!(true)), Some(true));
        assert_eq!(as_bool(&json!("false")), Some(false));
        assert_eq!(as_bool(&json!("yes")), None);
        assert_eq!(as_bool(&json!(1)), None);
        assert_eq!(as_str(&json!("x")), Some("x"));
        assert_eq!(as_str(&json!(1)), None);
    }
}
