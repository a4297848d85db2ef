use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BurndownError {
    #[error("Invalid sprint window: end {end} is before start {start}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    #[error("Invalid issue {id}: {reason}")]
    InvalidIssue { id: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("GraphQL errors: {}", messages.join(", "))]
    GraphQL { messages: Vec<String> },

    #[error("Empty response from API")]
    EmptyResponse,

    #[error("Failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write config file at {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error(
        "No API key found. Set LINEAR_API_KEY env var or add api_key to ~/.config/burndown/config.toml"
    )]
    MissingApiKey,

    #[error("Failed to initialize logger: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("Cycle not found: {0}")]
    CycleNotFound(String),

    #[error("Cycle {id} has more issues than {pages} pages can hold; refusing a partial burndown")]
    CycleTruncated { id: String, pages: usize },

    #[error("Failed to read CSV file {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("File name does not encode a sprint window (expected sprint_YYYY-MM-DD_to_YYYY-MM-DD.csv): {0}")]
    SprintFileName(PathBuf),

    #[error("No sprint window given. Pass --start and --end or name the file sprint_<start>_to_<end>.csv")]
    MissingWindow,

    #[error("Failed to write report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {path} to backup: {source}")]
    BackupMove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BurndownError>;
