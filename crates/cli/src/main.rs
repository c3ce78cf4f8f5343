// provcmp - compare commission tables from two sales partners

mod compare;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use provcmp_config::{OutputFormat, Settings};
use provcmp_recon::ReconError;
use tracing_subscriber::EnvFilter;

use exit_codes::{recon_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "provcmp")]
#[command(about = "Compare two commission tables and render a highlighted report")]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/provcmp/settings.json)
    #[arg(long, global = true, env = "PROVCMP_SETTINGS", value_name = "FILE")]
    settings: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile two tables and write the comparison report
    #[command(after_help = "\
Examples:
  provcmp compare ennux.csv newsales24.csv
  provcmp compare a.csv b.csv --format xlsx --out-dir reports
  provcmp compare a.csv b.csv --config partners.toml --json
  provcmp compare a.csv b.csv -o vergleich.pdf")]
    Compare {
        /// Table from partner A (';'-delimited)
        table_a: PathBuf,

        /// Table from partner B (';'-delimited)
        table_b: PathBuf,

        /// Recon config (TOML) with labels, column aliases and policies
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Report format (default from settings)
        #[arg(long, short = 'f')]
        format: Option<FormatArg>,

        /// Directory for the generated report (default from settings)
        #[arg(long, value_name = "DIR", conflicts_with = "output")]
        out_dir: Option<PathBuf>,

        /// Write the report to exactly this path (refuses to replace an existing file)
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,

        /// Replace the -o file if it already exists
        #[arg(long, requires = "output")]
        force: bool,

        /// Print the run summary as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Suppress the human summary on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Validate a recon config without running
    #[command(after_help = "\
Examples:
  provcmp validate partners.toml")]
    Validate {
        /// Path to the recon config (TOML)
        config: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Pdf,
    Xlsx,
}

impl From<FormatArg> for OutputFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Pdf => OutputFormat::Pdf,
            FormatArg::Xlsx => OutputFormat::Xlsx,
        }
    }
}

/// RUST_LOG wins, then -v, then the settings file level.
fn init_logging(verbose: u8, settings_level: &str) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let level = match verbose {
                0 => settings_level,
                1 => "info",
                2 => "debug",
                _ => "trace",
            };
            EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
        }
    };
    // log records from the library crates reach the subscriber via tracing-log
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings_path = cli.settings.clone().unwrap_or_else(Settings::config_path);
    let loaded = match &cli.settings {
        Some(path) => Settings::try_load_from(path),
        None => Settings::try_load(),
    };
    let (settings, problem) = match loaded {
        Ok(settings) => (settings, None),
        Err(problem) => (Settings::default(), Some(problem)),
    };
    init_logging(cli.verbose, &settings.log_level);
    if let Some(problem) = problem {
        eprintln!("warning: settings {}; using defaults", problem);
    }

    let result = match cli.command {
        Commands::Compare { table_a, table_b, config, format, out_dir, output, force, json, quiet } => {
            compare::cmd_compare(
                compare::CompareArgs {
                    table_a,
                    table_b,
                    config,
                    format: format.map(OutputFormat::from),
                    out_dir,
                    output,
                    force,
                    json,
                    quiet,
                },
                &settings,
                &settings_path,
            )
        }
        Commands::Validate { config } => compare::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Create error from an engine error with its category's exit code.
    pub fn recon(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::Schema { .. } => {
                Some("check the header row, or map the names under [columns] in a recon config".to_string())
            }
            ReconError::DuplicateKeys(_) => Some(
                "set policy.duplicates = \"pair_in_order\" or \"cartesian\" in a recon config to accept repeats"
                    .to_string(),
            ),
            ReconError::Parse { .. } => Some("inputs must be ';'-delimited text with a header row".to_string()),
            _ => None,
        };
        Self { code: recon_exit_code(err.category()), message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
