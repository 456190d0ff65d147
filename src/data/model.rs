use std::fmt;
use std::path::Path;

use crate::error::{LociError, Result};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Identity of a trace, counted from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TraceId(pub u32);

/// Imaging timepoint (round), counted from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timepoint(pub u32);

impl TraceId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Timepoint {
    pub fn get(self) -> u32 {
        self.0
    }
}

/// QC fail codes for one spot, e.g. `"R;S;xy"`. Kept as opaque text.
pub type FailReasons = String;

// ---------------------------------------------------------------------------
// ZCoordinate / ImagePoint3D
// ---------------------------------------------------------------------------

/// A z position: either the sub-pixel fit from the table, or a whole slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZCoordinate {
    Fit(f64),
    Slice(i64),
}

impl ZCoordinate {
    pub fn as_f64(self) -> f64 {
        match self {
            ZCoordinate::Fit(z) => z,
            ZCoordinate::Slice(z) => z as f64,
        }
    }

    /// Index of the slice containing this position.
    pub fn slice(self) -> i64 {
        match self {
            ZCoordinate::Fit(z) => z.floor() as i64,
            ZCoordinate::Slice(z) => z,
        }
    }
}

impl fmt::Display for ZCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZCoordinate::Fit(z) => write!(f, "{z}"),
            ZCoordinate::Slice(z) => write!(f, "{z}"),
        }
    }
}

/// Centroid of the Gaussian fit to a spot, in pixel units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePoint3D {
    pub x: f64,
    pub y: f64,
    pub z: ZCoordinate,
}

// ---------------------------------------------------------------------------
// PointRecord – one spot from a points table
// ---------------------------------------------------------------------------

/// A sub-pixel localization placed within the imaging experiment.
///
/// `region_time` is only present for tables in the newer, headed schema
/// that carry a `regionIndex` column; it changes the shape of
/// [`PointRecord::flatten`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRecord {
    pub trace_id: TraceId,
    pub region_time: Option<Timepoint>,
    pub timepoint: Timepoint,
    pub point: ImagePoint3D,
}

impl PointRecord {
    pub fn new(
        trace_id: TraceId,
        region_time: Option<Timepoint>,
        timepoint: Timepoint,
        point: ImagePoint3D,
    ) -> Self {
        PointRecord {
            trace_id,
            region_time,
            timepoint,
            point,
        }
    }

    /// Build a record from untyped values, reporting every bad field at once.
    pub fn try_from_raw(
        trace: i64,
        region: Option<i64>,
        timepoint: i64,
        (x, y, z): (f64, f64, f64),
    ) -> Result<Self> {
        let mut bads: Vec<String> = Vec::new();

        let trace_id = non_negative(trace, "trace ID", &mut bads).map(TraceId);
        let region_time = match region {
            Some(r) => non_negative(r, "region index", &mut bads).map(|r| Some(Timepoint(r))),
            None => Some(None),
        };
        let timepoint = non_negative(timepoint, "time index", &mut bads).map(Timepoint);
        for (name, value) in [("x", x), ("y", y), ("z", z)] {
            if !value.is_finite() {
                bads.push(format!("Bad value ({value}) for {name}"));
            }
        }

        match (trace_id, region_time, timepoint) {
            (Some(trace_id), Some(region_time), Some(timepoint)) if bads.is_empty() => {
                Ok(PointRecord::new(
                    trace_id,
                    region_time,
                    timepoint,
                    ImagePoint3D {
                        x,
                        y,
                        z: ZCoordinate::Fit(z),
                    },
                ))
            }
            _ => Err(LociError::InvalidRecord(bads.join("; "))),
        }
    }

    pub fn x(&self) -> f64 {
        self.point.x
    }

    pub fn y(&self) -> f64 {
        self.point.y
    }

    pub fn z(&self) -> ZCoordinate {
        self.point.z
    }

    /// Snap the point down onto the slice that contains it.
    pub fn with_truncated_z(&self) -> PointRecord {
        self.with_new_z(self.point.z.slice())
    }

    /// Copy of this record with z replaced by a slice index.
    pub fn with_new_z(&self, z: i64) -> PointRecord {
        PointRecord {
            point: ImagePoint3D {
                z: ZCoordinate::Slice(z),
                ..self.point
            },
            ..*self
        }
    }

    /// Row of layer data: `[trace, (region,) timepoint, z, y, x]`.
    pub fn flatten(&self) -> Vec<f64> {
        let mut row = Vec::with_capacity(6);
        row.push(f64::from(self.trace_id.get()));
        if let Some(region) = self.region_time {
            row.push(f64::from(region.get()));
        }
        row.push(f64::from(self.timepoint.get()));
        row.push(self.z().as_f64());
        row.push(self.y());
        row.push(self.x());
        row
    }
}

fn non_negative(value: i64, name: &str, bads: &mut Vec<String>) -> Option<u32> {
    match u32::try_from(value) {
        Ok(v) => Some(v),
        Err(_) if value > 0 => {
            bads.push(format!(
                "Bad value ({value}) for {name}: larger than {}",
                u32::MAX
            ));
            None
        }
        Err(_) => {
            bads.push(format!("Bad value ({value}) for {name}"));
            None
        }
    }
}

// ---------------------------------------------------------------------------
// ExpandedRecord – one slice of a z pillar
// ---------------------------------------------------------------------------

/// A record placed on a single z-slice, flagged when that slice holds the fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpandedRecord {
    pub record: PointRecord,
    pub is_center: bool,
}

// ---------------------------------------------------------------------------
// QcStatus
// ---------------------------------------------------------------------------

/// Binary classification of QC status, read off a table's file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QcStatus {
    Pass,
    Fail,
}

impl QcStatus {
    pub const ALL: [QcStatus; 2] = [QcStatus::Pass, QcStatus::Fail];

    /// File name suffix, e.g. `.qcpass.csv`.
    pub fn filename_extension(self) -> &'static str {
        match self {
            QcStatus::Pass => ".qcpass.csv",
            QcStatus::Fail => ".qcfail.csv",
        }
    }

    pub fn from_file_name(name: &str) -> Option<QcStatus> {
        QcStatus::ALL
            .into_iter()
            .find(|qc| name.ends_with(qc.filename_extension()))
    }

    pub fn from_path(path: &Path) -> Option<QcStatus> {
        path.file_name()
            .and_then(|n| n.to_str())
            .and_then(QcStatus::from_file_name)
    }
}

impl fmt::Display for QcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QcStatus::Pass => write!(f, "pass"),
            QcStatus::Fail => write!(f, "fail"),
        }
    }
}
