// bankrec CLI - reconcile a bank statement against the books

mod combine;
mod exit_codes;
mod gate;
mod preview;
mod recon;
mod usage;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bankrec_io::IoError;
use bankrec_recon::gate::DEFAULT_USAGE_LIMIT;
use bankrec_recon::ReconError;

use exit_codes::{recon_exit_code, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "bankrec")]
#[command(about = "Reconcile a bank statement against the books")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log more to stderr (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match bank records against book records
    #[command(after_help = "\
Examples:
  bankrec run --bank statement.xlsx --books ledger.csv --config march.recon.toml
  bankrec run --bank bank.csv --books books.csv --bank-amount Amount --books-amount Debit
  bankrec run --bank bank.csv --books books.csv --config m.toml --output result.xlsx
  bankrec run --bank bank.csv --books books.csv --config m.toml --output out/ --json")]
    Run(recon::RunArgs),

    /// Stack two or more files with the same header row
    #[command(after_help = "\
Examples:
  bankrec combine jan.xlsx feb.xlsx mar.xlsx --output q1.xlsx
  bankrec combine branch-a.csv branch-b.csv --output all.csv
  bankrec combine jan.xlsx feb.xlsx --sheet Ledger --json")]
    Combine(combine::CombineArgs),

    /// Check a column mapping file without running
    #[command(after_help = "\
Examples:
  bankrec validate march.recon.toml")]
    Validate {
        /// Path to the mapping file
        config: PathBuf,
    },

    /// List the column headers of a data file
    #[command(after_help = "\
Examples:
  bankrec columns statement.xlsx
  bankrec columns statement.xlsx --sheet Feb --json")]
    Columns {
        /// CSV, TSV or spreadsheet file
        file: PathBuf,

        /// Sheet name for multi-sheet files
        #[arg(long)]
        sheet: Option<String>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Show or reset the run counter
    #[command(after_help = "\
Examples:
  bankrec usage
  bankrec usage --json
  bankrec usage --reset")]
    Usage {
        #[command(flatten)]
        gate: GateArgs,

        /// Zero the counter
        #[arg(long)]
        reset: bool,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

/// Where runs are counted and how many are allowed.
#[derive(Args, Clone, Debug)]
pub struct GateArgs {
    /// Usage ledger file [default: <data dir>/bankrec/usage.json]
    #[arg(long, env = "BANKREC_USAGE_FILE", value_name = "FILE")]
    pub usage_file: Option<PathBuf>,

    /// Maximum number of runs
    #[arg(long, env = "BANKREC_USAGE_LIMIT", default_value_t = DEFAULT_USAGE_LIMIT)]
    pub limit: u32,
}

impl GateArgs {
    pub fn open(&self) -> Result<gate::FileGate, CliError> {
        let path = match &self.usage_file {
            Some(path) => path.clone(),
            None => gate::default_usage_path().ok_or_else(|| {
                CliError::args("cannot determine a data directory for the usage file")
                    .with_hint("pass --usage-file or set BANKREC_USAGE_FILE")
            })?,
        };
        Ok(gate::FileGate::new(path, self.limit))
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  bankrec-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => recon::cmd_run(args),
        Commands::Combine(args) => combine::cmd_combine(args),
        Commands::Validate { config } => recon::cmd_validate(config),
        Commands::Columns { file, sheet, json } => recon::cmd_columns(file, sheet, json),
        Commands::Usage { gate, reset, json } => usage::cmd_usage(gate, reset, json),
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

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    /// Engine error with its registry exit code and a hint where one helps.
    pub fn recon(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::MissingColumn { side, .. } => {
                Some(format!("run `bankrec columns` on the {side} file to see its headers"))
            }
            ReconError::AmountNotMapped { .. } => {
                Some("map amount on both sides with [bank]/[books] or --bank-amount/--books-amount".to_string())
            }
            ReconError::HeaderMismatch { .. } => {
                Some("every file must have the same header row, in the same order".to_string())
            }
            ReconError::QuotaExceeded { .. } => {
                Some("check `bankrec usage`; raise the limit with --limit or BANKREC_USAGE_LIMIT".to_string())
            }
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        let hint = match &err {
            IoError::UnsupportedFormat { .. } => {
                Some("inputs: .csv .tsv .txt .xlsx .xlsm .xls .xlsb .ods; --output: .xlsx or a directory".to_string())
            }
            _ => None,
        };
        Self { code: EXIT_IO, message: err.to_string(), hint }
    }
}
