use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::core::{Decision, Severity};
use crate::engine::{Engine, EngineOptions, PlanSource};
use crate::exit::ExitCode;
use crate::render::Format;
use crate::ui::UiConfig;

#[derive(Debug, Parser)]
#[command(
    name = "diffy",
    version,
    about = "Summarize a Terraform plan and flag risky infrastructure changes"
)]
pub struct Cli {
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Seconds to wait for `terraform show -json`.
    #[arg(long, default_value_t = 30, global = true)]
    pub timeout: u64,
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
    #[arg(long, global = true)]
    pub verbose: bool,
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Analyze a plan and print the report.
    Explain(ExplainArgs),
    Config(ConfigArgs),
    Completion(CompletionArgs),
}

#[derive(Debug, Args)]
pub struct ExplainArgs {
    /// Plan rendered by `terraform show -json`.
    pub plan: Option<PathBuf>,
    /// Binary plan file to convert with `terraform show -json`.
    #[arg(long = "from-plan", value_name = "PLAN_BIN")]
    pub from_plan: Option<PathBuf>,
    #[arg(long)]
    pub format: Option<Format>,
    /// Fail with exit code 2 when a finding is at or above this severity.
    #[arg(long = "fail-on", value_name = "SEVERITY")]
    pub fail_on: Option<Severity>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[arg(long)]
    pub show: bool,
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CompletionArgs {
    pub shell: String,
}

pub fn run() -> Result<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => return Err(usage_error(&err)),
        },
    };

    crate::logging::init(cli.verbose, cli.quiet);

    let stdout_is_tty = std::io::stdout().is_terminal();
    let stderr_is_tty = std::io::stderr().is_terminal();

    let home_dir = crate::platform::home_dir();
    let env_config_path = std::env::var_os("DIFFY_CONFIG").map(PathBuf::from);
    let cfg = crate::config::load(
        cli.config.as_deref().or(env_config_path.as_deref()),
        home_dir.as_deref(),
    )
    .map_err(crate::exit::invalid_args_err)?;

    let ui_cfg = ui_config(&cli, &cfg, stdout_is_tty, stderr_is_tty);

    match cli.command {
        Commands::Explain(args) => {
            let source = plan_source(&args)?;
            let threshold = args.fail_on.or(cfg.analyze.fail_on);
            let format = args.format.unwrap_or(cfg.output.format);

            let engine = Engine::new(EngineOptions {
                timeout: Duration::from_secs(cli.timeout),
                terraform_bin: cfg.terraform.binary.clone(),
                show_progress: ui_cfg.stderr_is_tty && !ui_cfg.quiet,
            });
            let report = engine.explain(&source, threshold)?;

            let out = crate::render::render(&report, format, ui_cfg.color)?;
            crate::ui::write_stdout(&out)?;

            if report.decision == Decision::Fail {
                return Ok(ExitCode::ThresholdExceeded);
            }
        }
        Commands::Config(args) => {
            if args.show {
                let out = if args.json {
                    format!("{}\n", serde_json::to_string_pretty(&cfg)?)
                } else {
                    toml::to_string_pretty(&cfg)?
                };
                crate::ui::write_stdout(&out)?;
            } else if !ui_cfg.quiet {
                eprintln!("config: use `diffy config --show` to print the effective configuration");
            }
        }
        Commands::Completion(args) => {
            let shell = parse_shell(&args.shell)?;
            let mut cmd = Cli::command();
            let mut out = std::io::stdout().lock();
            clap_complete::generate(shell, &mut cmd, "diffy", &mut out);
        }
    }

    Ok(ExitCode::Success)
}

fn ui_config(
    cli: &Cli,
    cfg: &crate::config::EffectiveConfig,
    stdout_is_tty: bool,
    stderr_is_tty: bool,
) -> UiConfig {
    UiConfig {
        color: stdout_is_tty && cfg.output.color && !cli.no_color,
        stderr_is_tty,
        quiet: cli.quiet,
    }
}

fn usage_error(err: &clap::Error) -> anyhow::Error {
    let rendered = err.render().to_string();
    let message = rendered.trim().trim_start_matches("error: ").to_string();
    crate::exit::invalid_args(message)
}

fn plan_source(args: &ExplainArgs) -> Result<PlanSource> {
    match (&args.plan, &args.from_plan) {
        (Some(path), None) => Ok(PlanSource::Json(path.clone())),
        (None, Some(path)) => Ok(PlanSource::Binary(path.clone())),
        (Some(_), Some(_)) => Err(crate::exit::invalid_args(
            "pass either PLAN_JSON or --from-plan, not both",
        )),
        (None, None) => Err(crate::exit::invalid_args(
            "missing plan: pass PLAN_JSON or --from-plan PLAN_BIN",
        )),
    }
}

fn parse_shell(s: &str) -> Result<clap_complete::Shell> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "bash" => Ok(clap_complete::Shell::Bash),
        "zsh" => Ok(clap_complete::Shell::Zsh),
        "fish" => Ok(clap_complete::Shell::Fish),
        other => Err(crate::exit::invalid_args(format!(
            "unsupported shell: {other} (use bash, zsh, or fish)"
        ))),
    }
}
