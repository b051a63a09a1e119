//! `bankrec run` / `validate` / `columns`: mapping-driven bank-vs-books
//! reconciliation.

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::debug;

use bankrec_io::{FileFormat, LoadOptions};
use bankrec_recon::{ReconConfig, ReconInput, ReconResult};

use crate::preview::render_table;
use crate::{CliError, GateArgs};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Bank statement (CSV, TSV or spreadsheet)
    #[arg(long, value_name = "FILE")]
    pub bank: PathBuf,

    /// Books export (CSV, TSV or spreadsheet)
    #[arg(long, value_name = "FILE")]
    pub books: PathBuf,

    /// Column mapping file (.recon.toml)
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Bank amount column (overrides the mapping file)
    #[arg(long, value_name = "COL")]
    pub bank_amount: Option<String>,

    /// Books amount column
    #[arg(long, value_name = "COL")]
    pub books_amount: Option<String>,

    /// Bank date column
    #[arg(long, value_name = "COL")]
    pub bank_date: Option<String>,

    /// Books date column
    #[arg(long, value_name = "COL")]
    pub books_date: Option<String>,

    /// Bank narration column
    #[arg(long, value_name = "COL")]
    pub bank_narration: Option<String>,

    /// Books narration column
    #[arg(long, value_name = "COL")]
    pub books_narration: Option<String>,

    /// Sheet to read from a multi-sheet bank file
    #[arg(long, value_name = "SHEET")]
    pub bank_sheet: Option<String>,

    /// Sheet to read from a multi-sheet books file
    #[arg(long, value_name = "SHEET")]
    pub books_sheet: Option<String>,

    /// Output the full report as JSON to stdout instead of previews
    #[arg(long)]
    pub json: bool,

    /// Write the partitions: FILE.xlsx (three sheets) or a directory (three CSVs)
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Rows shown per partition preview (mapping file default: 50)
    #[arg(long, value_name = "N")]
    pub preview: Option<usize>,

    #[command(flatten)]
    pub gate: GateArgs,
}

impl RunArgs {
    /// Command-line columns replace whatever the mapping file says.
    fn apply_overrides(&self, config: &mut ReconConfig) {
        let overrides = [
            (&mut config.columns.bank.amount, &self.bank_amount),
            (&mut config.columns.books.amount, &self.books_amount),
            (&mut config.columns.bank.date, &self.bank_date),
            (&mut config.columns.books.date, &self.books_date),
            (&mut config.columns.bank.narration, &self.bank_narration),
            (&mut config.columns.books.narration, &self.books_narration),
        ];
        for (slot, value) in overrides {
            if let Some(value) = value {
                *slot = Some(value.clone());
            }
        }
    }
}

fn load_config(path: &Path) -> Result<ReconConfig, CliError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
    ReconConfig::parse(&contents).map_err(CliError::recon)
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ReconConfig::default(),
    };
    args.apply_overrides(&mut config);
    config.validate().map_err(CliError::recon)?;

    // Refuse an unwritable target before the run is counted
    if let Some(output) = &args.output {
        if FileFormat::from_path(output) == Some(FileFormat::Delimited) {
            return Err(CliError::args(format!(
                "--output {} must be an .xlsx file or a directory",
                output.display()
            )));
        }
        bankrec_io::prepare_output(output)?;
    }

    let bank = bankrec_io::load_record_set(
        &args.bank,
        &LoadOptions { sheet: args.bank_sheet.clone(), ..Default::default() },
    )?;
    let books = bankrec_io::load_record_set(
        &args.books,
        &LoadOptions { sheet: args.books_sheet.clone(), ..Default::default() },
    )?;

    let mut gate = args.gate.open()?;
    debug!(ledger = %gate.path().display(), "usage gate");
    let result = bankrec_recon::run(&config, ReconInput { bank, books }, &mut gate)
        .map_err(CliError::recon)?;

    if let Some(output) = &args.output {
        bankrec_io::export_result(&result, output)?;
        eprintln!("wrote {}", output.display());
    }

    eprintln!("{}", summary_line(&result));

    if args.json {
        let json = serde_json::to_string_pretty(&result.report())
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json}");
    } else {
        let limit = args.preview.unwrap_or(config.output.preview_rows);
        if limit > 0 {
            let tables: Vec<String> = result.tables().iter().map(|t| render_table(t, limit)).collect();
            print!("{}", tables.join("\n"));
        }
    }

    Ok(())
}

fn summary_line(result: &ReconResult) -> String {
    let s = &result.summary;
    let active = result.meta.active_fields;
    let mut keys = vec!["amount"];
    if active.date {
        keys.push("date");
    }
    if active.narration {
        keys.push("narration");
    }

    let mut line = format!(
        "reconciled on {}: {} matched, {} bank only, {} books only ({} bank rows, {} books rows)",
        keys.join("+"),
        s.matched,
        s.bank_only,
        s.books_only,
        s.bank_total,
        s.books_total,
    );
    if s.bank_unmatchable + s.books_unmatchable > 0 {
        line.push_str(&format!(
            "\nunmatchable: {} bank, {} books (amount or date could not be read)",
            s.bank_unmatchable, s.books_unmatchable,
        ));
    }
    line
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", config_path.display())))?;
    let config = ReconConfig::from_toml(&contents).map_err(CliError::recon)?;

    let active = config.columns.active_fields();
    eprintln!(
        "valid: recon '{}' keyed on amount{}{}",
        config.name,
        if active.date { "+date" } else { "" },
        if active.narration { "+narration" } else { "" },
    );
    Ok(())
}

pub fn cmd_columns(file: PathBuf, sheet: Option<String>, json: bool) -> Result<(), CliError> {
    let set = bankrec_io::load_record_set(&file, &LoadOptions { sheet, ..Default::default() })?;

    if json {
        let out = serde_json::json!({ "columns": set.columns, "rows": set.len() });
        println!("{out}");
    } else {
        for column in &set.columns {
            println!("{column}");
        }
        eprintln!("{} columns, {} rows", set.columns.len(), set.len());
    }
    Ok(())
}
