use std::path::PathBuf;

use thiserror::Error;

use crate::data::parser::TableSchema;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures that abort reading a field of view.
///
/// A folder that simply is not a field of view is *not* an error; see
/// [`crate::fileset::Classification::Rejected`].
#[derive(Error, Debug)]
pub enum LociError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: expected record of length {expected} but got {found}: {fields:?}")]
    LengthMismatch {
        row: usize,
        expected: usize,
        found: usize,
        fields: Vec<String>,
    },

    #[error("row {row}: missing column '{column}'")]
    MissingColumn { row: usize, column: String },

    #[error("row {row}: cannot parse '{value}' in column '{column}' as {expected}")]
    BadValue {
        row: usize,
        column: String,
        value: String,
        expected: &'static str,
    },

    #[error("cannot create point record: {0}")]
    InvalidRecord(String),

    #[error("table schema {0} is not enabled")]
    UnsupportedSchema(TableSchema),

    #[error("max z ({z_max}) must be at least as great as central z ({z_center})")]
    ZBelowCenter { z_center: i64, z_max: i64 },

    #[error("z slice {z} is outside the supported range -{limit}..={limit}")]
    ZOutOfRange { z: i64, limit: i64 },

    #[error(
        "number of points generated from spot center at z={z_center} isn't as expected: \
         z_max={z_max}, expected {expected}, got {found}"
    )]
    ExpansionCount {
        z_center: i64,
        z_max: i64,
        expected: usize,
        found: usize,
    },

    #[error("more than one file matched QC status '{status}': {paths:?}")]
    DuplicateStatus { status: String, paths: Vec<PathBuf> },

    #[error("after finding 2 QC files among 3 files of interest, 1 should remain but got {0:?}")]
    LeftoverCount(Vec<PathBuf>),

    #[error("could not infer QC status from file name: {0}")]
    UnknownQcStatus(PathBuf),

    #[error("cannot read volume {path}: {message}")]
    Volume { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid color '{value}': {message}")]
    InvalidColor { value: String, message: String },
}

/// Result type for all library operations.
pub type Result<T> = std::result::Result<T, LociError>;

impl LociError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LociError::Io {
            path: path.into(),
            source,
        }
    }
}
