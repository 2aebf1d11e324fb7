use std::collections::HashMap;

use crate::core::{Counts, Decision, Finding, Report, ResourceChange, Severity};

pub fn render_markdown(report: &Report) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();

    let _ = writeln!(out, "# Diffy Summary");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "**{}** total changes: {}",
        report.counts.total,
        summarize_counts(&report.counts)
    );
    let _ = writeln!(out);

    if !report.changes.is_empty() {
        let summaries = summarize_change_findings(&report.changes, &report.findings);
        let _ = writeln!(out, "## Changes");
        let _ = writeln!(out);
        let _ = writeln!(out, "| Action | Resource | Severity | Notes |");
        let _ = writeln!(out, "|--------|----------|----------|-------|");
        for ch in &report.changes {
            let (severity, notes) = summaries
                .get(ch.address.as_str())
                .cloned()
                .unwrap_or_else(|| ("-".to_string(), ch.resource_type.clone()));
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} |",
                ch.action,
                escape_cell(&ch.address),
                severity,
                escape_cell(&notes)
            );
        }
        let _ = writeln!(out);
    }

    if report.findings.is_empty() {
        let _ = writeln!(out, "No findings.");
    } else {
        let _ = writeln!(out, "## Findings");
        let _ = writeln!(out);

        let mut by_address = report.findings.clone();
        by_address.sort_by(|a, b| a.address.cmp(&b.address));
        for severity in Severity::ALL.iter().rev() {
            let group: Vec<&Finding> = by_address
                .iter()
                .filter(|f| f.severity == *severity)
                .collect();
            if group.is_empty() {
                continue;
            }
            let _ = writeln!(out, "### {}", severity.as_str().to_ascii_uppercase());
            let _ = writeln!(out);
            for f in group {
                let _ = writeln!(out, "- **{}** — `{}`", f.title, f.address);
                let _ = writeln!(out, "  {}", f.description);
                let _ = writeln!(
                    out,
                    "  _(action: {}, type: {})_",
                    f.evidence.action, f.evidence.resource_type
                );
                if !f.evidence.matches.is_empty() {
                    let _ = writeln!(out, "  matches: `{}`", f.evidence.matches.join("`, `"));
                }
                let _ = writeln!(out);
            }
        }
    }

    if let Some(threshold) = report.threshold {
        let _ = writeln!(out, "---");
        let _ = writeln!(out);
        match report.decision {
            Decision::Fail => {
                let _ = writeln!(
                    out,
                    "**FAIL**: findings at or above `{threshold}` threshold detected."
                );
            }
            Decision::Pass => {
                let _ = writeln!(
                    out,
                    "**PASS**: no findings at or above `{threshold}` threshold."
                );
            }
        }
    }

    out
}

fn summarize_counts(counts: &Counts) -> String {
    let parts: Vec<String> = [
        (counts.create, "create"),
        (counts.update, "update"),
        (counts.delete, "delete"),
        (counts.replace, "replace"),
    ]
    .into_iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, verb)| format!("{n} to {verb}"))
    .collect();

    if parts.is_empty() {
        "no changes".to_string()
    } else {
        parts.join(", ")
    }
}

// Worst finding per address, ties broken by title.
fn summarize_change_findings<'a>(
    changes: &'a [ResourceChange],
    findings: &[Finding],
) -> HashMap<&'a str, (String, String)> {
    let mut out = HashMap::with_capacity(changes.len());
    for ch in changes {
        let worst = findings
            .iter()
            .filter(|f| f.address == ch.address)
            .min_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.title.cmp(&b.title)));
        if let Some(f) = worst {
            out.insert(
                ch.address.as_str(),
                (f.severity.as_str().to_ascii_uppercase(), f.title.clone()),
            );
        }
    }
    out
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}
