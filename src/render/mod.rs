use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::Report;

mod json;
mod markdown;
mod text;

pub use json::render_json;
pub use markdown::render_markdown;
pub use text::render_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    #[serde(alias = "markdown")]
    Md,
    Text,
    Json,
}

impl Format {
    pub const fn as_str(self) -> &'static str {
        match self {
            Format::Md => "md",
            Format::Text => "text",
            Format::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid format {input:?}: must be md, text, or json")]
pub struct ParseFormatError {
    pub input: String,
}

impl FromStr for Format {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(Format::Md),
            "text" | "txt" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            _ => Err(ParseFormatError {
                input: s.to_string(),
            }),
        }
    }
}

pub fn render(report: &Report, format: Format, color: bool) -> anyhow::Result<String> {
    Ok(match format {
        Format::Md => render_markdown(report),
        Format::Text => render_text(report, color),
        Format::Json => render_json(report)?,
    })
}
