//! IO implementations for [`CaseLog`]
//!
//! Loading case logs is the job of a [`LogSource`]: either an already loaded [`CaseLog`] or a
//! file path whose format is inferred from its extension (see [`Importable`]).

use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::case_log_struct::{CaseLog, CaseLogBuilder, SerializedCaseLog, UnknownCasePolicy};
use super::constants::{CSV_ACTIVITY_COLUMN, CSV_CASE_ID_COLUMN};
use crate::core::io::{ExtensionWithMime, Importable};

/// Error type for [`CaseLog`] import operations
#[derive(Debug, Error)]
pub enum LogImportError {
    /// IO Error
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON Parsing Error
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    /// CSV Parsing Error
    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
    /// A required column is missing in a CSV event table
    #[error("Missing column `{0}` in CSV header")]
    MissingColumn(&'static str),
    /// Unsupported Format
    #[error("Unsupported Format: {0}")]
    UnsupportedFormat(String),
}

/// Options for importing a [`CaseLog`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// How cases without a case identifier are stored
    pub unknown_case_policy: UnknownCasePolicy,
}

impl Importable for CaseLog {
    type Error = LogImportError;
    type ImportOptions = ImportOptions;

    fn import_from_reader_with_options<R: Read>(
        reader: R,
        format: &str,
        options: Self::ImportOptions,
    ) -> Result<Self, Self::Error> {
        match format {
            _ if format.ends_with("json") => import_json(reader, options),
            _ if format.ends_with("json.gz") => {
                let gz = flate2::read::GzDecoder::new(reader);
                import_json(gz, options)
            }
            _ if format.ends_with("csv") => import_csv(reader, options),
            _ => Err(LogImportError::UnsupportedFormat(format.to_string())),
        }
    }

    fn known_import_formats() -> Vec<ExtensionWithMime> {
        vec![
            ExtensionWithMime::new("json", "application/json"),
            ExtensionWithMime::new("json.gz", "application/gzip"),
            ExtensionWithMime::new("csv", "text/csv"),
        ]
    }
}

fn import_json<R: Read>(reader: R, options: ImportOptions) -> Result<CaseLog, LogImportError> {
    let serialized: SerializedCaseLog = serde_json::from_reader(BufReader::new(reader))?;
    Ok(serialized.into_case_log(options.unknown_case_policy))
}

/// Import a flat event table (one row per event, in recorded order)
///
/// An empty `case_id` cell denotes an event without case identifier.
fn import_csv<R: Read>(reader: R, options: ImportOptions) -> Result<CaseLog, LogImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(LogImportError::MissingColumn(name))
    };
    let case_id_col = column(CSV_CASE_ID_COLUMN)?;
    let activity_col = column(CSV_ACTIVITY_COLUMN)?;

    let mut builder = CaseLogBuilder::new(options.unknown_case_policy);
    for record in csv_reader.records() {
        let record = record?;
        let case_id = record
            .get(case_id_col)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        let activity = record.get(activity_col).unwrap_or_default();
        builder.add_event(case_id, activity);
    }
    Ok(builder.build())
}

///
/// Supplies a [`CaseLog`] for analysis
///
/// Any format-specific failure is reported as a [`LogImportError`].
pub trait LogSource {
    /// Load the case log
    fn load_case_log(&self) -> Result<CaseLog, LogImportError>;
}

impl LogSource for CaseLog {
    fn load_case_log(&self) -> Result<CaseLog, LogImportError> {
        Ok(self.clone())
    }
}

impl LogSource for Path {
    fn load_case_log(&self) -> Result<CaseLog, LogImportError> {
        FileLogSource::new(self).load_case_log()
    }
}

impl LogSource for PathBuf {
    fn load_case_log(&self) -> Result<CaseLog, LogImportError> {
        self.as_path().load_case_log()
    }
}

impl<T: LogSource + ?Sized> LogSource for &T {
    fn load_case_log(&self) -> Result<CaseLog, LogImportError> {
        (**self).load_case_log()
    }
}

/// [`LogSource`] reading a log file with explicit [`ImportOptions`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLogSource {
    /// Path of the log file (format is inferred from the extension)
    pub path: PathBuf,
    /// Import options
    pub options: ImportOptions,
}

impl FileLogSource {
    /// Create a new [`FileLogSource`] with default [`ImportOptions`]
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            options: ImportOptions::default(),
        }
    }

    /// Use the given [`ImportOptions`]
    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }
}

impl LogSource for FileLogSource {
    fn load_case_log(&self) -> Result<CaseLog, LogImportError> {
        debug!(path = %self.path.display(), "Importing case log");
        CaseLog::import_from_path_with_options(&self.path, self.options)
    }
}
