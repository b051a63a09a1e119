use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: std::io::Error },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Opening or reading a workbook failed.
    #[error("failed to open {}: {message}", .path.display())]
    Workbook { path: PathBuf, message: String },

    #[error("sheet '{sheet}' not found (available: {})", .available.join(", "))]
    SheetNotFound { sheet: String, available: Vec<String> },

    #[error("XLSX export error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("unsupported file type: {}", .path.display())]
    UnsupportedFormat { path: PathBuf },
}
