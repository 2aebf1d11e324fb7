use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::Severity;
use crate::render::Format;

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
    pub output: OutputConfig,
    pub analyze: AnalyzeConfig,
    pub terraform: TerraformConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputConfig {
    pub format: Format,
    pub color: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_on: Option<Severity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TerraformConfig {
    pub binary: String,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            output: OutputConfig {
                format: Format::Md,
                color: true,
            },
            analyze: AnalyzeConfig { fail_on: None },
            terraform: TerraformConfig {
                binary: "terraform".to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    output: Option<RawOutputConfig>,
    analyze: Option<RawAnalyzeConfig>,
    terraform: Option<RawTerraformConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOutputConfig {
    format: Option<String>,
    color: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAnalyzeConfig {
    fail_on: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTerraformConfig {
    binary: Option<String>,
}

pub fn default_config_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/diffy/config.toml")
}

/// Layers defaults, then the TOML file, then `DIFFY_*` environment variables.
pub fn load(config_path: Option<&Path>, home_dir: Option<&Path>) -> Result<EffectiveConfig> {
    let mut cfg = EffectiveConfig::default();

    let explicit = config_path.is_some();
    let path = config_path
        .map(ToOwned::to_owned)
        .or_else(|| home_dir.map(default_config_path));

    if let Some(path) = path {
        if path.exists() {
            let s = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file: {}", path.display()))?;
            let raw: RawConfig = toml::from_str(&s)
                .with_context(|| format!("parsing config file (TOML): {}", path.display()))?;
            apply_raw_config(&mut cfg, raw)
                .with_context(|| format!("config file: {}", path.display()))?;
            cfg.config_path = Some(path.display().to_string());
        } else if explicit {
            anyhow::bail!("config file not found: {}", path.display());
        }
    }

    apply_env_overrides(&mut cfg)?;

    Ok(cfg)
}

fn apply_raw_config(cfg: &mut EffectiveConfig, raw: RawConfig) -> Result<()> {
    if let Some(output) = raw.output {
        if let Some(format) = output.format {
            cfg.output.format = format.parse().context("output.format")?;
        }
        if let Some(color) = output.color {
            cfg.output.color = color;
        }
    }

    if let Some(analyze) = raw.analyze {
        if let Some(fail_on) = analyze.fail_on {
            cfg.analyze.fail_on = Some(fail_on.parse().context("analyze.fail_on")?);
        }
    }

    if let Some(terraform) = raw.terraform {
        if let Some(binary) = terraform.binary.filter(|b| !b.trim().is_empty()) {
            cfg.terraform.binary = binary;
        }
    }

    Ok(())
}

fn apply_env_overrides(cfg: &mut EffectiveConfig) -> Result<()> {
    if let Ok(v) = std::env::var("DIFFY_OUTPUT_FORMAT") {
        cfg.output.format = v.parse().context("DIFFY_OUTPUT_FORMAT")?;
    }
    if let Ok(v) = std::env::var("DIFFY_OUTPUT_COLOR") {
        cfg.output.color = parse_bool(&v).context("DIFFY_OUTPUT_COLOR")?;
    }
    if let Ok(v) = std::env::var("DIFFY_FAIL_ON") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.analyze.fail_on = Some(v.parse().context("DIFFY_FAIL_ON")?);
        }
    }
    if let Ok(v) = std::env::var("DIFFY_TERRAFORM_BIN") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.terraform.binary = v.to_string();
        }
    }

    Ok(())
}

fn parse_bool(s: &str) -> Result<bool> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!(
            "invalid boolean {s:?}: use true|false|1|0|yes|no|on|off"
        )),
    }
}
