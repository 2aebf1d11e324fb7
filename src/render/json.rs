use anyhow::Result;

use crate::core::Report;

pub fn render_json(report: &Report) -> Result<String> {
    let mut out = serde_json::to_string_pretty(report)?;
    out.push('\n');
    Ok(out)
}
