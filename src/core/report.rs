use serde::{Serialize, Serializer};
use std::fmt;

use crate::core::{Counts, Finding, ResourceChange, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Pass,
    Fail,
}

impl Decision {
    pub fn evaluate(findings: &[Finding], threshold: Option<Severity>) -> Self {
        match threshold {
            Some(t) if crate::core::exceeds_threshold(findings, t) => Decision::Fail,
            _ => Decision::Pass,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Decision::Pass => "pass",
            Decision::Fail => "fail",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub schema_version: String,
    pub tool_version: String,
    pub generated_at: String,
    pub counts: Counts,
    pub changes: Vec<ResourceChange>,
    #[serde(serialize_with = "serialize_findings")]
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Severity>,
    pub decision: Decision,
}

#[derive(Serialize)]
struct FlatFinding<'a> {
    severity: Severity,
    title: &'a str,
    description: &'a str,
    resource_address: &'a str,
    action: crate::core::Action,
    resource_type: &'a str,
    #[serde(skip_serializing_if = "is_empty")]
    change_paths: &'a [String],
    #[serde(skip_serializing_if = "is_empty")]
    matches: &'a [String],
}

fn is_empty(items: &&[String]) -> bool {
    items.is_empty()
}

fn serialize_findings<S: Serializer>(findings: &[Finding], s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(findings.iter().map(|f| FlatFinding {
        severity: f.severity,
        title: &f.title,
        description: &f.description,
        resource_address: &f.address,
        action: f.evidence.action,
        resource_type: &f.evidence.resource_type,
        change_paths: &f.evidence.change_paths,
        matches: &f.evidence.matches,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Action, Evidence};

    fn high() -> Finding {
        Finding {
            severity: Severity::High,
            title: "Resource replacement detected".to_string(),
            description: "d".to_string(),
            address: "aws_instance.web".to_string(),
            evidence: Evidence::new(Action::Replace, "aws_instance"),
        }
    }

    #[test]
    fn no_threshold_always_passes() {
        assert_eq!(Decision::evaluate(&[high()], None), Decision::Pass);
    }

    #[test]
    fn decision_fails_at_or_above_threshold() {
        assert_eq!(
            Decision::evaluate(&[high()], Some(Severity::High)),
            Decision::Fail
        );
        assert_eq!(
            Decision::evaluate(&[high()], Some(Severity::Critical)),
            Decision::Pass
        );
    }
}
