use std::collections::HashSet;

use crate::core::{Finding, Severity};

/// Drops findings that repeat an earlier `(title, address, severity)`,
/// keeping the first occurrence in place.
pub fn dedupe_findings(findings: Vec<Finding>) -> Vec<Finding> {
    if findings.len() < 2 {
        return findings;
    }
    let mut seen: HashSet<(String, String, Severity)> = HashSet::with_capacity(findings.len());
    findings
        .into_iter()
        .filter(|f| seen.insert((f.title.clone(), f.address.clone(), f.severity)))
        .collect()
}

pub fn max_severity(findings: &[Finding]) -> Severity {
    findings
        .iter()
        .map(|f| f.severity)
        .max()
        .unwrap_or(Severity::Info)
}

/// True when any finding sits at or above `threshold`.
pub fn exceeds_threshold(findings: &[Finding], threshold: Severity) -> bool {
    findings.iter().any(|f| f.severity >= threshold)
}

/// Highest severity first, then by address.
pub fn sort_findings(findings: &[Finding]) -> Vec<Finding> {
    let mut sorted = findings.to_vec();
    sorted.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.address.cmp(&b.address))
    });
    sorted
}
