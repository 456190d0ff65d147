//! Recognize a folder holding exactly one field of view.
//!
//! A qualifying folder has three entries sharing one key:
//! `<key><volume suffix>`, `<key>.qcpass.csv` and `<key>.qcfail.csv`.
//! Anything else in the folder is ignored.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::data::model::QcStatus;
use crate::error::{LociError, Result};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The resolved files of one field of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOfView {
    pub key: String,
    pub volume_path: PathBuf,
    pub pass_path: PathBuf,
    pub fail_path: PathBuf,
}

impl FieldOfView {
    pub fn table_path(&self, status: QcStatus) -> &Path {
        match status {
            QcStatus::Pass => &self.pass_path,
            QcStatus::Fail => &self.fail_path,
        }
    }
}

/// Why a folder is not a field of view. Not an error: the host skips it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NotADirectory,
    KeyCount(usize),
    FileCount { key: String, count: usize },
    MissingQcStatus,
    MissingVolume { key: String },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotADirectory => write!(f, "Not a folder/directory"),
            Rejection::KeyCount(n) => {
                write!(f, "Not exactly 1 field of view found, but rather {n}")
            }
            Rejection::FileCount { key, count } => {
                write!(f, "Not exactly 3 files, but rather {count}, found for {key}")
            }
            Rejection::MissingQcStatus => {
                write!(f, "Could not find 1 each of QC status (pass/fail)")
            }
            Rejection::MissingVolume { key } => write!(f, "Could not find volume for {key}"),
        }
    }
}

/// Outcome of looking at a candidate folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Accepted(FieldOfView),
    Rejected(Rejection),
}

impl Classification {
    pub fn accepted(self) -> Option<FieldOfView> {
        match self {
            Classification::Accepted(fov) => Some(fov),
            Classification::Rejected(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Decide whether `path` holds exactly one field of view.
///
/// Folders that merely don't match are `Ok(Rejected(..))` and logged at
/// debug level. Layouts the grouping rules say cannot happen are errors.
pub fn classify_folder(path: &Path, volume_suffix: &str) -> Result<Classification> {
    if !path.is_dir() {
        return Ok(reject(path, Rejection::NotADirectory));
    }

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(path).map_err(|e| LociError::io(path, e))? {
        let entry = entry.map_err(|e| LociError::io(path, e))?;
        entries.push(entry.path());
    }

    let groups = group_by_key(entries, volume_suffix);
    if groups.len() != 1 {
        return Ok(reject(path, Rejection::KeyCount(groups.len())));
    }
    let Some((key, files)) = groups.into_iter().next() else {
        return Ok(reject(path, Rejection::KeyCount(0)));
    };
    if files.len() != 3 {
        let count = files.len();
        return Ok(reject(path, Rejection::FileCount { key, count }));
    }

    match resolve_group(&key, files, volume_suffix)? {
        Classification::Rejected(why) => Ok(reject(path, why)),
        accepted => Ok(accepted),
    }
}

/// Split one key's files into pass table, fail table and volume.
pub fn resolve_group(key: &str, files: Vec<PathBuf>, volume_suffix: &str) -> Result<Classification> {
    let mut by_status: BTreeMap<QcStatus, Vec<PathBuf>> = BTreeMap::new();
    let mut leftover = Vec::new();
    for fp in files {
        match QcStatus::from_path(&fp) {
            Some(qc) => by_status.entry(qc).or_default().push(fp),
            None => leftover.push(fp),
        }
    }

    for (status, paths) in &by_status {
        if paths.len() > 1 {
            log::error!("Extra QC status/path pairs for {key}: {paths:?}");
            return Err(LociError::DuplicateStatus {
                status: status.to_string(),
                paths: paths.clone(),
            });
        }
    }
    let (Some(mut pass), Some(mut fail)) = (
        by_status.remove(&QcStatus::Pass),
        by_status.remove(&QcStatus::Fail),
    ) else {
        return Ok(Classification::Rejected(Rejection::MissingQcStatus));
    };

    if leftover.len() != 1 {
        log::error!("Expected 1 file besides the QC tables for {key}, got {leftover:?}");
        return Err(LociError::LeftoverCount(leftover));
    }
    let volume_path = leftover.remove(0);
    let volume_key = file_name(&volume_path)
        .and_then(|name| name.strip_suffix(volume_suffix))
        .filter(|k| !k.is_empty());
    if volume_key != Some(key) {
        return Ok(Classification::Rejected(Rejection::MissingVolume {
            key: key.to_string(),
        }));
    }

    Ok(Classification::Accepted(FieldOfView {
        key: key.to_string(),
        volume_path,
        pass_path: pass.remove(0),
        fail_path: fail.remove(0),
    }))
}

/// Group paths by the key left after stripping a recognized suffix.
/// Paths without a recognized suffix are dropped.
pub fn group_by_key<I>(paths: I, volume_suffix: &str) -> BTreeMap<String, Vec<PathBuf>>
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut groups: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for path in paths {
        if let Some(key) = file_name(&path).and_then(|n| file_key(n, volume_suffix)) {
            groups.entry(key).or_default().push(path);
        }
    }
    for files in groups.values_mut() {
        files.sort();
    }
    groups
}

/// Key of a file name, e.g. `P0001` for `P0001.qcpass.csv`.
pub fn file_key(name: &str, volume_suffix: &str) -> Option<String> {
    QcStatus::ALL
        .iter()
        .map(|qc| qc.filename_extension())
        .chain(std::iter::once(volume_suffix))
        .find_map(|suffix| name.strip_suffix(suffix))
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

fn reject(path: &Path, why: Rejection) -> Classification {
    log::debug!(
        "{why}, cannot be read as locus-specific points: {}",
        path.display()
    );
    Classification::Rejected(why)
}
