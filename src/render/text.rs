use crate::core::{Decision, Report, sort_findings};
use crate::ui::{format_severity, pad_end_display};

pub fn render_text(report: &Report, color: bool) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();

    let _ = writeln!(out, "Diffy Summary");
    let _ = writeln!(out, "{}", "=".repeat(40));
    let _ = writeln!(out);

    let counts = &report.counts;
    let _ = writeln!(out, "Total changes: {}", counts.total);
    for (label, n) in [
        ("Create:", counts.create),
        ("Update:", counts.update),
        ("Delete:", counts.delete),
        ("Replace:", counts.replace),
    ] {
        if n > 0 {
            let _ = writeln!(out, "  {} {n}", pad_end_display(label, 8));
        }
    }
    let _ = writeln!(out);

    if !report.changes.is_empty() {
        let _ = writeln!(out, "Changes:");
        for ch in &report.changes {
            let _ = writeln!(out, "  [{}] {} ({})", ch.action, ch.address, ch.resource_type);
        }
        let _ = writeln!(out);
    }

    if report.findings.is_empty() {
        let _ = writeln!(out, "No findings.");
        let _ = writeln!(out);
    } else {
        let _ = writeln!(out, "Findings:");
        for f in sort_findings(&report.findings) {
            let _ = writeln!(
                out,
                "  [{}] {} - {}",
                format_severity(f.severity, color),
                f.title,
                f.address
            );
            let _ = writeln!(out, "    {}", f.description);
            let _ = writeln!(
                out,
                "    (action: {}, type: {})",
                f.evidence.action, f.evidence.resource_type
            );
            if !f.evidence.change_paths.is_empty() {
                let _ = writeln!(out, "    paths: {}", f.evidence.change_paths.join(", "));
            }
            if !f.evidence.matches.is_empty() {
                let _ = writeln!(out, "    matches: {}", f.evidence.matches.join("; "));
            }
            let _ = writeln!(out);
        }
    }

    if let Some(threshold) = report.threshold {
        match report.decision {
            Decision::Fail => {
                let _ = writeln!(
                    out,
                    "FAIL: findings at or above '{threshold}' threshold detected."
                );
            }
            Decision::Pass => {
                let _ = writeln!(out, "PASS: no findings at or above '{threshold}' threshold.");
            }
        }
    }

    out
}
