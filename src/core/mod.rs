mod action;
mod aggregate;
mod change;
mod evidence;
mod finding;
mod report;
mod severity;

pub use action::Action;
pub use aggregate::{dedupe_findings, exceeds_threshold, max_severity, sort_findings};
pub use change::{Counts, ResourceChange};
pub use evidence::Evidence;
pub use finding::Finding;
pub use report::{Decision, Report};
pub use severity::{ParseSeverityError, Severity};
