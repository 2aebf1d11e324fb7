use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::core::{Action, ResourceChange};
use crate::platform::{self, CommandNotFound};

#[derive(Debug, Deserialize)]
struct RawPlan {
    #[serde(default, deserialize_with = "null_as_default")]
    resource_changes: Vec<RawResourceChange>,
}

#[derive(Debug, Deserialize)]
struct RawResourceChange {
    #[serde(default, deserialize_with = "null_as_default")]
    address: String,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    resource_type: String,
    #[serde(default)]
    provider_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    change: RawChange,
}

#[derive(Debug, Default, Deserialize)]
struct RawChange {
    #[serde(default)]
    actions: Value,
    #[serde(default)]
    before: Value,
    #[serde(default)]
    after: Value,
}

// Explicit `null` reads the same as an absent key.
fn null_as_default<'de, D, T>(d: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

pub fn from_file(path: &Path) -> Result<Vec<ResourceChange>> {
    let data = std::fs::read(path)
        .with_context(|| format!("reading plan file: {}", path.display()))?;
    parse_plan(&data).with_context(|| format!("plan file: {}", path.display()))
}

#[derive(Debug, thiserror::Error)]
pub enum PlanCommandError {
    #[error(
        "{0} not found in PATH; install Terraform from https://developer.hashicorp.com/terraform/install and try again"
    )]
    NotFound(String),
    #[error("{cmd} show failed (exit_code={exit_code}): {stderr}")]
    Failed {
        cmd: String,
        exit_code: i32,
        stderr: String,
    },
}

/// Converts a binary plan with `terraform show -json` and parses the result.
pub fn from_plan_binary(path: &Path, terraform: &str, timeout: Duration) -> Result<Vec<ResourceChange>> {
    let plan_arg = path.to_string_lossy();
    tracing::debug!(terraform, plan = %plan_arg, "running terraform show -json");
    let output = match platform::run_command(terraform, &["show", "-json", plan_arg.as_ref()], timeout) {
        Ok(output) => output,
        Err(err) if err.downcast_ref::<CommandNotFound>().is_some() => {
            return Err(PlanCommandError::NotFound(terraform.to_string()).into());
        }
        Err(err) => return Err(err.context(format!("running {terraform} show"))),
    };
    if output.exit_code != 0 {
        return Err(PlanCommandError::Failed {
            cmd: terraform.to_string(),
            exit_code: output.exit_code,
            stderr: output.stderr.trim().to_string(),
        }
        .into());
    }
    parse_plan(output.stdout.as_bytes())
        .with_context(|| format!("output of {terraform} show -json {plan_arg}"))
}

/// Decodes a JSON plan into normalized changes, dropping no-op entries.
pub fn parse_plan(data: &[u8]) -> Result<Vec<ResourceChange>> {
    let plan: RawPlan = serde_json::from_slice(data).context("parsing plan JSON")?;

    let mut changes = Vec::with_capacity(plan.resource_changes.len());
    for rc in plan.resource_changes {
        let action = Action::resolve(&rc.change.actions);
        if action.is_noop() {
            tracing::debug!(address = %rc.address, "skipping no-op change");
            continue;
        }
        let change_paths = if action.has_both_sides() {
            crate::diff::change_paths(&rc.change.before, &rc.change.after).unwrap_or_default()
        } else {
            Vec::new()
        };
        changes.push(ResourceChange {
            address: rc.address,
            resource_type: rc.resource_type,
            provider_name: rc.provider_name.filter(|p| !p.is_empty()),
            action,
            before: rc.change.before,
            after: rc.change.after,
            change_paths,
        });
    }
    Ok(changes)
}
