use std::fmt;

use csv::{ReaderBuilder, StringRecord, Trim};

use super::model::{FailReasons, PointRecord};
use crate::error::{LociError, Result};

// ---------------------------------------------------------------------------
// Row access – one capability, two adapters
// ---------------------------------------------------------------------------

/// Read access to the fields of a single table row.
pub trait RowAccess {
    /// How a field is addressed: a column name or a position.
    type Key: Copy + fmt::Display;

    fn get(&self, key: Self::Key) -> Option<&str>;

    /// Number of fields actually present in the row.
    fn width(&self) -> usize;

    fn fields(&self) -> Vec<String>;
}

/// A row from a table with a header, addressed by column name.
pub struct HeadedRow<'a> {
    headers: &'a StringRecord,
    record: &'a StringRecord,
}

impl<'a> HeadedRow<'a> {
    pub fn new(headers: &'a StringRecord, record: &'a StringRecord) -> Self {
        HeadedRow { headers, record }
    }
}

impl<'a> RowAccess for HeadedRow<'a> {
    type Key = &'a str;

    fn get(&self, key: &'a str) -> Option<&str> {
        let idx = self.headers.iter().position(|h| h == key)?;
        self.record.get(idx)
    }

    fn width(&self) -> usize {
        self.record.len()
    }

    fn fields(&self) -> Vec<String> {
        self.record.iter().map(str::to_string).collect()
    }
}

/// A row from a headerless table, addressed by position.
pub struct PositionalRow<'a> {
    record: &'a StringRecord,
}

impl<'a> PositionalRow<'a> {
    pub fn new(record: &'a StringRecord) -> Self {
        PositionalRow { record }
    }
}

impl RowAccess for PositionalRow<'_> {
    type Key = usize;

    fn get(&self, key: usize) -> Option<&str> {
        self.record.get(key)
    }

    fn width(&self) -> usize {
        self.record.len()
    }

    fn fields(&self) -> Vec<String> {
        self.record.iter().map(str::to_string).collect()
    }
}

// ---------------------------------------------------------------------------
// Column layouts
// ---------------------------------------------------------------------------

/// Where each field of a [`PointRecord`] lives in a row.
struct Columns<K> {
    trace: K,
    region: Option<K>,
    timepoint: K,
    z: K,
    y: K,
    x: K,
}

/// Column names of the headed schema.
pub mod headed {
    pub const TRACE_COLUMNS: [&str; 2] = ["traceIndex", "traceId"];
    pub const REGION_COLUMN: &str = "regionIndex";
    pub const TIME_INDEX_COLUMN: &str = "timeIndex";
    pub const FAIL_CODE_COLUMN: &str = "failCode";
}

/// Column positions of the headerless schema.
pub mod headless {
    pub const TRACE: usize = 0;
    pub const TIMEPOINT: usize = 1;
    pub const Z: usize = 2;
    pub const Y: usize = 3;
    pub const X: usize = 4;
    pub const QC: usize = 5;

    pub const QCPASS_WIDTH: usize = QC;
    pub const QCFAIL_WIDTH: usize = QC + 1;
}

fn headed_columns(headers: &StringRecord) -> Columns<&'static str> {
    let has = |name: &str| headers.iter().any(|h| h == name);
    let trace = headed::TRACE_COLUMNS
        .into_iter()
        .find(|&c| has(c))
        .unwrap_or(headed::TRACE_COLUMNS[0]);
    Columns {
        trace,
        region: has(headed::REGION_COLUMN).then_some(headed::REGION_COLUMN),
        timepoint: headed::TIME_INDEX_COLUMN,
        z: "z",
        y: "y",
        x: "x",
    }
}

const HEADLESS_COLUMNS: Columns<usize> = Columns {
    trace: headless::TRACE,
    region: None,
    timepoint: headless::TIMEPOINT,
    z: headless::Z,
    y: headless::Y,
    x: headless::X,
};

// ---------------------------------------------------------------------------
// Field parsing
// ---------------------------------------------------------------------------

fn field<R: RowAccess>(row: &R, key: R::Key, row_no: usize) -> Result<&str> {
    row.get(key).ok_or_else(|| LociError::MissingColumn {
        row: row_no,
        column: key.to_string(),
    })
}

fn parse_int<R: RowAccess>(row: &R, key: R::Key, row_no: usize) -> Result<i64> {
    let raw = field(row, key, row_no)?;
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(v);
    }
    // Integer columns sometimes get written as floats, e.g. "3.0".
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        _ => Err(bad_value(raw, key, row_no, "integer")),
    }
}

fn parse_float<R: RowAccess>(row: &R, key: R::Key, row_no: usize) -> Result<f64> {
    let raw = field(row, key, row_no)?;
    raw.parse::<f64>()
        .map_err(|_| bad_value(raw, key, row_no, "float"))
}

fn bad_value(raw: &str, key: impl fmt::Display, row_no: usize, expected: &'static str) -> LociError {
    LociError::BadValue {
        row: row_no,
        column: key.to_string(),
        value: raw.to_string(),
        expected,
    }
}

fn parse_record<R: RowAccess>(
    row: &R,
    columns: &Columns<R::Key>,
    row_no: usize,
) -> Result<PointRecord> {
    let trace = parse_int(row, columns.trace, row_no)?;
    let region = columns
        .region
        .map(|key| parse_int(row, key, row_no))
        .transpose()?;
    let timepoint = parse_int(row, columns.timepoint, row_no)?;
    let z = parse_float(row, columns.z, row_no)?;
    let y = parse_float(row, columns.y, row_no)?;
    let x = parse_float(row, columns.x, row_no)?;
    PointRecord::try_from_raw(trace, region, timepoint, (x, y, z))
}

fn require_width<R: RowAccess>(row: &R, expected: usize, row_no: usize) -> Result<()> {
    if row.width() != expected {
        return Err(LociError::LengthMismatch {
            row: row_no,
            expected,
            found: row.width(),
            fields: row.fields(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// TableSchema – the two supported encodings
// ---------------------------------------------------------------------------

/// Encoding of a points table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableSchema {
    /// Named columns: `traceIndex`/`traceId`, optional `regionIndex`,
    /// `timeIndex`, `z`, `y`, `x`, plus `failCode` for QC-fail tables.
    Headed,
    /// No header; `trace,timepoint,z,y,x` with a QC code sixth for QC-fail.
    Headless,
}

impl fmt::Display for TableSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableSchema::Headed => write!(f, "headed"),
            TableSchema::Headless => write!(f, "headless"),
        }
    }
}

impl TableSchema {
    /// Choose the schema from the first line of a table.
    pub fn sniff(first_line: &str) -> TableSchema {
        if first_line.contains(headed::TIME_INDEX_COLUMN) {
            TableSchema::Headed
        } else {
            TableSchema::Headless
        }
    }

    /// Choose the schema for a whole table's text.
    pub fn sniff_text(text: &str) -> TableSchema {
        TableSchema::sniff(text.lines().next().unwrap_or(""))
    }

    /// Parse every row of a QC-pass table.
    pub fn parse_all_qcpass(self, text: &str) -> Result<Vec<PointRecord>> {
        match self {
            TableSchema::Headed => {
                let mut reader = reader_for(self, text);
                let headers = reader.headers()?.clone();
                let columns = headed_columns(&headers);
                let mut records = Vec::new();
                for (row_no, result) in reader.records().enumerate() {
                    let record = result?;
                    let row = HeadedRow::new(&headers, &record);
                    records.push(parse_record(&row, &columns, row_no)?);
                }
                Ok(records)
            }
            TableSchema::Headless => {
                let mut reader = reader_for(self, text);
                let mut records = Vec::new();
                for (row_no, result) in reader.records().enumerate() {
                    let record = result?;
                    let row = PositionalRow::new(&record);
                    require_width(&row, headless::QCPASS_WIDTH, row_no)?;
                    records.push(parse_record(&row, &HEADLESS_COLUMNS, row_no)?);
                }
                Ok(records)
            }
        }
    }

    /// Parse every row of a QC-fail table: a pass record plus its fail codes.
    pub fn parse_all_qcfail(self, text: &str) -> Result<Vec<(PointRecord, FailReasons)>> {
        match self {
            TableSchema::Headed => {
                let mut reader = reader_for(self, text);
                let headers = reader.headers()?.clone();
                let columns = headed_columns(&headers);
                let mut records = Vec::new();
                for (row_no, result) in reader.records().enumerate() {
                    let record = result?;
                    let row = HeadedRow::new(&headers, &record);
                    let rec = parse_record(&row, &columns, row_no)?;
                    let codes = field(&row, headed::FAIL_CODE_COLUMN, row_no)?;
                    records.push((rec, codes.to_string()));
                }
                Ok(records)
            }
            TableSchema::Headless => {
                let mut reader = reader_for(self, text);
                let mut records = Vec::new();
                for (row_no, result) in reader.records().enumerate() {
                    let record = result?;
                    let row = PositionalRow::new(&record);
                    if let Err(e) = require_width(&row, headless::QCFAIL_WIDTH, row_no) {
                        log::error!("Bad row: {:?}", row.fields());
                        return Err(e);
                    }
                    let rec = parse_record(&row, &HEADLESS_COLUMNS, row_no)?;
                    let codes = field(&row, headless::QC, row_no)?;
                    records.push((rec, codes.to_string()));
                }
                Ok(records)
            }
        }
    }
}

fn reader_for(schema: TableSchema, text: &str) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .has_headers(schema == TableSchema::Headed)
        .flexible(schema == TableSchema::Headless)
        .trim(Trim::All)
        .from_reader(text.as_bytes())
}

// ---------------------------------------------------------------------------
// SupportedSchemas
// ---------------------------------------------------------------------------

/// The set of table encodings a reader accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportedSchemas {
    headed: bool,
    headless: bool,
}

impl Default for SupportedSchemas {
    fn default() -> Self {
        SupportedSchemas::all()
    }
}

impl SupportedSchemas {
    pub fn all() -> Self {
        SupportedSchemas {
            headed: true,
            headless: true,
        }
    }

    pub fn headed_only() -> Self {
        SupportedSchemas {
            headed: true,
            headless: false,
        }
    }

    pub fn contains(&self, schema: TableSchema) -> bool {
        match schema {
            TableSchema::Headed => self.headed,
            TableSchema::Headless => self.headless,
        }
    }

    /// Sniff the schema of `text` and check that it is enabled.
    pub fn select(&self, text: &str) -> Result<TableSchema> {
        let schema = TableSchema::sniff_text(text);
        if self.contains(schema) {
            Ok(schema)
        } else {
            Err(LociError::UnsupportedSchema(schema))
        }
    }
}
