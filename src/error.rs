use std::path::PathBuf;
use thiserror::Error;

use crate::relabel::LabelDtype;

/// The main error type for labelmerge operations.
#[derive(Debug, Error)]
pub enum LabelmergeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read groups file {path}: {source}")]
    GroupsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid group specification: {message}")]
    SpecFormat { message: String },

    #[error("Original label {label} is claimed by new label {first} and new label {second}")]
    LabelCollision { label: i64, first: i64, second: i64 },

    #[error(
        "Label value {value} does not fit in output dtype {dtype} (range {min}..={max})",
        min = .dtype.min_value(),
        max = .dtype.max_value()
    )]
    DtypeRange { value: i64, dtype: LabelDtype },

    #[error("Unsupported output dtype: {0}")]
    UnsupportedDtype(String),

    #[error("Failed to read label volume {path}: {source}")]
    VolumeRead {
        path: PathBuf,
        #[source]
        source: nifti::error::NiftiError,
    },

    #[error("Failed to write label volume {path}: {source}")]
    VolumeWrite {
        path: PathBuf,
        #[source]
        source: nifti::error::NiftiError,
    },

    #[error("Unsupported voxel type {datatype} in {path} (expected an integer or float volume)")]
    UnsupportedVoxelType { path: PathBuf, datatype: String },

    #[error("Volume {path} is not a label volume: voxel value {value} is not an integer")]
    NonIntegerVoxel { path: PathBuf, value: f64 },

    #[error(
        "Volume {path} holds label {value}, above the largest supported label {max}",
        max = i64::MAX
    )]
    LabelOutOfRange { path: PathBuf, value: u64 },

    #[error("Failed to serialize relabel report: {0}")]
    ReportSerialize(#[source] serde_json::Error),
}

impl LabelmergeError {
    /// The pipeline stage the error belongs to.
    pub fn stage(&self) -> &'static str {
        match self {
            LabelmergeError::GroupsRead { .. } | LabelmergeError::SpecFormat { .. } => "parse",
            LabelmergeError::LabelCollision { .. } => "resolve",
            LabelmergeError::VolumeRead { .. }
            | LabelmergeError::UnsupportedVoxelType { .. }
            | LabelmergeError::NonIntegerVoxel { .. }
            | LabelmergeError::LabelOutOfRange { .. } => "read",
            LabelmergeError::DtypeRange { .. }
            | LabelmergeError::UnsupportedDtype(_)
            | LabelmergeError::ReportSerialize(_) => "apply",
            LabelmergeError::VolumeWrite { .. } | LabelmergeError::Io(_) => "write",
        }
    }

    pub(crate) fn spec_format(message: impl Into<String>) -> Self {
        LabelmergeError::SpecFormat {
            message: message.into(),
        }
    }
}
