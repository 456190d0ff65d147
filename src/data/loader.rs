use std::path::Path;

use super::model::{FailReasons, PointRecord};
use super::parser::SupportedSchemas;
use crate::error::{LociError, Result};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read and parse a QC-pass table. The schema is sniffed from its first line.
pub fn load_qcpass(path: &Path, schemas: &SupportedSchemas) -> Result<Vec<PointRecord>> {
    log::debug!("Reading as QC-pass: {}", path.display());
    let text = read_table(path)?;
    parse_qcpass(&text, schemas)
}

/// Read and parse a QC-fail table. The schema is sniffed from its first line.
pub fn load_qcfail(
    path: &Path,
    schemas: &SupportedSchemas,
) -> Result<Vec<(PointRecord, FailReasons)>> {
    log::debug!("Reading as QC-fail: {}", path.display());
    let text = read_table(path)?;
    parse_qcfail(&text, schemas)
}

pub fn parse_qcpass(text: &str, schemas: &SupportedSchemas) -> Result<Vec<PointRecord>> {
    let schema = schemas.select(text)?;
    log::debug!("Parsing QC-pass table as {schema}");
    schema.parse_all_qcpass(text)
}

pub fn parse_qcfail(
    text: &str,
    schemas: &SupportedSchemas,
) -> Result<Vec<(PointRecord, FailReasons)>> {
    let schema = schemas.select(text)?;
    log::debug!("Parsing QC-fail table as {schema}");
    schema.parse_all_qcfail(text)
}

fn read_table(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| LociError::io(path, e))
}
