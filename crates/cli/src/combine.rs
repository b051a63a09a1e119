//! `bankrec combine`: stack files that share one header row.

use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use bankrec_io::{FileFormat, LoadOptions};
use bankrec_recon::CombineResult;

use crate::preview::render_table;
use crate::{CliError, GateArgs};

#[derive(Args, Debug)]
pub struct CombineArgs {
    /// Files to stack, in order (CSV, TSV or spreadsheet; same header row)
    #[arg(required = true, num_args = 2.., value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Sheet to read from each workbook
    #[arg(long, value_name = "SHEET")]
    pub sheet: Option<String>,

    /// Write the combined rows: FILE.xlsx (sheet `Combined`) or FILE.csv
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output the combined table as JSON to stdout instead of a preview
    #[arg(long)]
    pub json: bool,

    /// Rows shown in the preview
    #[arg(long, value_name = "N", default_value_t = 50)]
    pub preview: usize,

    #[command(flatten)]
    pub gate: GateArgs,
}

pub fn cmd_combine(args: CombineArgs) -> Result<(), CliError> {
    if let Some(output) = &args.output {
        if FileFormat::from_path(output).is_none() {
            return Err(CliError::args(format!(
                "--output {} must be an .xlsx or .csv file",
                output.display()
            )));
        }
        bankrec_io::prepare_output(output)?;
    }

    let options = LoadOptions { sheet: args.sheet.clone(), ..Default::default() };
    let sets = args
        .files
        .iter()
        .map(|file| bankrec_io::load_record_set(file, &options))
        .collect::<Result<Vec<_>, _>>()?;

    let mut gate = args.gate.open()?;
    debug!(ledger = %gate.path().display(), "usage gate");
    let result = bankrec_recon::combine(sets, &mut gate).map_err(CliError::recon)?;

    if let Some(output) = &args.output {
        bankrec_io::export_table(&result.table, output)?;
        eprintln!("wrote {}", output.display());
    }

    eprintln!("{}", summary_line(&result));

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json}");
    } else if args.preview > 0 {
        print!("{}", render_table(&result.table, args.preview));
    }

    Ok(())
}

fn summary_line(result: &CombineResult) -> String {
    let parts: Vec<String> = result.source_rows.iter().map(ToString::to_string).collect();
    format!(
        "combined {} files: {} rows ({})",
        result.source_rows.len(),
        result.len(),
        parts.join(" + ")
    )
}
