//! Build viewer layers from the locus spots of one imaging field of view.
//!
//! A field of view folder holds an image volume and two tables of detected
//! spots, one for spots that passed QC and one for those that failed.
//! [`LociReader`] recognizes such a folder and turns it into three layers:
//! the volume, the QC-fail points and the QC-pass points. Each spot becomes a
//! pillar of points, one per z-slice, so it shows on every slice of a 2-D
//! slice view with its true slice marked.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod fileset;
pub mod layer;
pub mod reader;
pub mod volume;

pub use config::ReaderConfig;
pub use data::model::{ExpandedRecord, FailReasons, PointRecord, QcStatus};
pub use error::{LociError, Result};
pub use fileset::{Classification, FieldOfView, Rejection};
pub use layer::{Layer, LayerKind, PointsLayer};
pub use reader::LociReader;
pub use volume::{NpyVolumeReader, Volume, VolumeReader};
