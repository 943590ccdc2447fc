//! NIfTI reading and writing for label volumes.
//!
//! Voxels are loaded into an `i64` array regardless of the stored type; the
//! header is kept so the output carries the same affine, orientation and
//! voxel sizes as the input.

use std::fs;
use std::path::Path;

use ndarray::ArrayD;
use nifti::typedef::NiftiType;
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::error::LabelmergeError;
use crate::relabel::{LabelDtype, VoxelType};

/// A label volume read from disk.
#[derive(Clone, Debug)]
pub struct LabelVolume {
    /// Voxel labels in the array order produced by the reader.
    pub data: ArrayD<i64>,
    /// The header of the source file, passed through to the output.
    pub header: NiftiHeader,
    /// How the voxels were stored on disk.
    pub voxel_type: VoxelType,
}

/// Reads a NIfTI label volume (`.nii` or `.nii.gz`).
///
/// # Errors
/// Fails when the file cannot be read, when it stores a non-numeric type,
/// when a float volume holds a non-integral value, or when a uint64 volume
/// holds a label above `i64::MAX`.
pub fn read_label_volume(path: &Path) -> Result<LabelVolume, LabelmergeError> {
    let read_err = |source| LabelmergeError::VolumeRead {
        path: path.to_path_buf(),
        source,
    };

    let object = ReaderOptions::new().read_file(path).map_err(read_err)?;
    let header = object.header().clone();
    let datatype = header.data_type().map_err(read_err)?;
    let voxel_type = voxel_type(datatype).ok_or_else(|| LabelmergeError::UnsupportedVoxelType {
        path: path.to_path_buf(),
        datatype: format!("{:?}", datatype),
    })?;

    let volume = object.into_volume();
    let data = match voxel_type {
        VoxelType::Integer(LabelDtype::UInt64) => {
            let wide = volume.into_ndarray::<u64>().map_err(read_err)?;
            if let Some(&big) = wide.iter().find(|&&v| i64::try_from(v).is_err()) {
                return Err(LabelmergeError::LabelOutOfRange {
                    path: path.to_path_buf(),
                    value: big,
                });
            }
            wide.mapv(|v| v as i64)
        }
        VoxelType::Integer(_) => volume.into_ndarray::<i64>().map_err(read_err)?,
        VoxelType::Float { .. } => {
            let floats = volume.into_ndarray::<f64>().map_err(read_err)?;
            if let Some(&bad) = floats.iter().find(|v| !v.is_finite() || v.fract() != 0.0) {
                return Err(LabelmergeError::NonIntegerVoxel {
                    path: path.to_path_buf(),
                    value: bad,
                });
            }
            floats.mapv(|v| v as i64)
        }
    };

    Ok(LabelVolume {
        data,
        header,
        voxel_type,
    })
}

fn voxel_type(datatype: NiftiType) -> Option<VoxelType> {
    let integer = |dtype| Some(VoxelType::Integer(dtype));
    match datatype {
        NiftiType::Int8 => integer(LabelDtype::Int8),
        NiftiType::Int16 => integer(LabelDtype::Int16),
        NiftiType::Int32 => integer(LabelDtype::Int32),
        NiftiType::Int64 => integer(LabelDtype::Int64),
        NiftiType::Uint8 => integer(LabelDtype::UInt8),
        NiftiType::Uint16 => integer(LabelDtype::UInt16),
        NiftiType::Uint32 => integer(LabelDtype::UInt32),
        NiftiType::Uint64 => integer(LabelDtype::UInt64),
        NiftiType::Float32 => Some(VoxelType::Float { bits: 32 }),
        NiftiType::Float64 => Some(VoxelType::Float { bits: 64 }),
        _ => None,
    }
}

/// Writes `data` as a NIfTI volume of type `dtype`, using `header` as the
/// reference header. Missing parent directories are created.
///
/// Every value of `data` must already fit in `dtype`; the relabel engine
/// guarantees this for its output.
pub fn write_label_volume(
    path: &Path,
    header: &NiftiHeader,
    data: &ArrayD<i64>,
    dtype: LabelDtype,
) -> Result<(), LabelmergeError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut header = header.clone();
    // Labels are stored verbatim, never scaled.
    header.scl_slope = 1.0;
    header.scl_inter = 0.0;

    let writer = WriterOptions::new(path).reference_header(&header);
    let written = match dtype {
        LabelDtype::Int8 => writer.write_nifti(&data.mapv(|v| v as i8)),
        LabelDtype::Int16 => writer.write_nifti(&data.mapv(|v| v as i16)),
        LabelDtype::Int32 => writer.write_nifti(&data.mapv(|v| v as i32)),
        LabelDtype::Int64 => writer.write_nifti(data),
        LabelDtype::UInt8 => writer.write_nifti(&data.mapv(|v| v as u8)),
        LabelDtype::UInt16 => writer.write_nifti(&data.mapv(|v| v as u16)),
        LabelDtype::UInt32 => writer.write_nifti(&data.mapv(|v| v as u32)),
        LabelDtype::UInt64 => writer.write_nifti(&data.mapv(|v| v as u64)),
    };

    written.map_err(|source| LabelmergeError::VolumeWrite {
        path: path.to_path_buf(),
        source,
    })
}
