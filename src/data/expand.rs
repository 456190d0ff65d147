use super::model::{ExpandedRecord, PointRecord};
use crate::error::{LociError, Result};

// ---------------------------------------------------------------------------
// Z-expansion: one spot → a pillar of points, one per slice
// ---------------------------------------------------------------------------

/// Largest slice index, in either direction, that a pillar may reach.
pub const MAX_Z_SLICE: i64 = 1 << 16;

fn check_slice(z: i64) -> Result<i64> {
    if !(-MAX_Z_SLICE..=MAX_Z_SLICE).contains(&z) {
        return Err(LociError::ZOutOfRange {
            z,
            limit: MAX_Z_SLICE,
        });
    }
    Ok(z)
}

/// Materialize `record` on every slice `0..=z_max`.
///
/// Exactly one output is flagged as the center: the record with its z
/// truncated to the containing slice. All others are copies placed on the
/// remaining slices, in ascending z order.
pub fn expand_along_z(record: &PointRecord, z_max: i64) -> Result<Vec<ExpandedRecord>> {
    let center = record.with_truncated_z();
    let z_center = check_slice(center.z().slice())?;
    let z_max = check_slice(z_max)?;

    if z_max < z_center {
        return Err(LociError::ZBelowCenter { z_center, z_max });
    }

    let pillar = |z: i64| ExpandedRecord {
        record: center.with_new_z(z),
        is_center: false,
    };
    let points: Vec<ExpandedRecord> = (0..z_center)
        .map(pillar)
        .chain(std::iter::once(ExpandedRecord {
            record: center,
            is_center: true,
        }))
        .chain((z_center + 1..=z_max).map(pillar))
        .collect();

    // Slices are numbered from 0, so a spot yields 1 + z_max points.
    let expected = usize::try_from(z_max).map_or(0, |z| z + 1);
    if points.len() != expected {
        return Err(LociError::ExpansionCount {
            z_center,
            z_max,
            expected,
            found: points.len(),
        });
    }
    Ok(points)
}

/// The highest slice index among the records, if there are any.
pub fn max_z_slice<'a, I>(records: I) -> Option<i64>
where
    I: IntoIterator<Item = &'a PointRecord>,
{
    records
        .into_iter()
        .map(|r| r.z().as_f64())
        .fold(None, |acc: Option<f64>, z| Some(acc.map_or(z, |m| m.max(z))))
        .map(|z| z.floor() as i64)
}

/// Expand every record against the shared maximum slice of the whole set.
pub fn expand_all(records: &[PointRecord]) -> Result<Vec<ExpandedRecord>> {
    let Some(z_max) = max_z_slice(records) else {
        return Ok(Vec::new());
    };
    let z_max = check_slice(z_max)?;
    let capacity = usize::try_from(z_max.max(0))
        .ok()
        .and_then(|z| z.checked_add(1))
        .and_then(|per_record| per_record.checked_mul(records.len()))
        .ok_or(LociError::ZOutOfRange {
            z: z_max,
            limit: MAX_Z_SLICE,
        })?;
    let mut expanded = Vec::with_capacity(capacity);
    for rec in records {
        expanded.extend(expand_along_z(rec, z_max)?);
    }
    Ok(expanded)
}
