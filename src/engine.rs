use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::{Counts, Decision, Report, ResourceChange, Severity};

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub timeout: Duration,
    pub terraform_bin: String,
    pub show_progress: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanSource {
    /// A plan already rendered with `terraform show -json`.
    Json(PathBuf),
    /// A binary plan file that still needs converting.
    Binary(PathBuf),
}

#[derive(Clone)]
pub struct Engine {
    opts: EngineOptions,
}

impl Engine {
    pub fn new(opts: EngineOptions) -> Self {
        Self { opts }
    }

    pub fn load(&self, source: &PlanSource) -> Result<Vec<ResourceChange>> {
        match source {
            PlanSource::Json(path) => {
                crate::plan::from_file(path).map_err(crate::exit::plan_failed_err)
            }
            PlanSource::Binary(path) => {
                use std::io::IsTerminal;
                let progress_enabled = self.opts.show_progress && std::io::stderr().is_terminal();
                let pb = if progress_enabled {
                    let pb = indicatif::ProgressBar::new_spinner();
                    pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
                    pb.set_message(format!("{} show -json {}", self.opts.terraform_bin, path.display()));
                    pb.enable_steady_tick(Duration::from_millis(120));
                    Some(pb)
                } else {
                    None
                };

                let result =
                    crate::plan::from_plan_binary(path, &self.opts.terraform_bin, self.opts.timeout);

                if let Some(pb) = pb {
                    pb.finish_and_clear();
                }
                result.map_err(classify_plan_binary_error)
            }
        }
    }

    pub fn explain(&self, source: &PlanSource, threshold: Option<Severity>) -> Result<Report> {
        let changes = self.load(source)?;
        Ok(build_report(changes, threshold))
    }
}

// A conversion that ran but produced unreadable output is a plan failure;
// everything else about invoking terraform is an external-command failure.
fn classify_plan_binary_error(err: anyhow::Error) -> anyhow::Error {
    let parse_failure = err
        .chain()
        .any(|cause| cause.downcast_ref::<serde_json::Error>().is_some());
    if parse_failure {
        crate::exit::plan_failed_err(err)
    } else {
        crate::exit::external_cmd_err(err)
    }
}

/// Runs the rules over `changes` and assembles the report.
pub fn build_report(changes: Vec<ResourceChange>, threshold: Option<Severity>) -> Report {
    let counts = Counts::from_changes(&changes);
    let findings = crate::rules::analyze(&changes);
    let decision = Decision::evaluate(&findings, threshold);

    tracing::debug!(
        changes = counts.total,
        findings = findings.len(),
        max_severity = %crate::core::max_severity(&findings),
        threshold = ?threshold,
        decision = %decision,
        "analysis complete"
    );

    let generated_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    Report {
        schema_version: "1.0".to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        generated_at,
        counts,
        changes,
        findings,
        threshold,
        decision,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Action;

    #[test]
    fn report_counts_and_decides() {
        let changes = vec![
            ResourceChange::new("aws_db_instance.main", "aws_db_instance", Action::Delete),
            ResourceChange::new("aws_instance.web", "aws_instance", Action::Create),
        ];
        let report = build_report(changes, Some(Severity::Critical));
        assert_eq!(report.counts.total, 2);
        assert_eq!(report.counts.delete, 1);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].severity, Severity::Critical);
        assert_eq!(report.decision, Decision::Fail);
        assert_eq!(report.schema_version, "1.0");
    }

    #[test]
    fn report_without_threshold_passes() {
        let changes = vec![ResourceChange::new(
            "aws_db_instance.main",
            "aws_db_instance",
            Action::Delete,
        )];
        let report = build_report(changes, None);
        assert_eq!(report.decision, Decision::Pass);
        assert_eq!(report.threshold, None);
    }

    #[test]
    fn missing_json_plan_is_a_plan_failure() {
        let engine = Engine::new(EngineOptions {
            timeout: Duration::from_secs(1),
            terraform_bin: "terraform".to_string(),
            show_progress: false,
        });
        let err = engine
            .explain(&PlanSource::Json(PathBuf::from("/nonexistent/plan.json")), None)
            .expect_err("missing file");
        assert_eq!(crate::exit::exit_code(&err), crate::exit::ExitCode::PlanFailed.as_i32());
    }

    #[test]
    fn missing_terraform_is_an_external_command_failure() {
        let engine = Engine::new(EngineOptions {
            timeout: Duration::from_secs(1),
            terraform_bin: "diffy-test-no-such-terraform".to_string(),
            show_progress: false,
        });
        let err = engine
            .explain(&PlanSource::Binary(PathBuf::from("plan.out")), None)
            .expect_err("missing terraform");
        assert_eq!(
            crate::exit::exit_code(&err),
            crate::exit::ExitCode::ExternalCommandFailed.as_i32()
        );
    }
}
