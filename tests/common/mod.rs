#![allow(dead_code)]

use std::path::Path;

use labelmerge::volume::write_label_volume;
use labelmerge::LabelDtype;
use ndarray::{ArrayD, IxDyn};
use nifti::NiftiHeader;

/// Header with a recognizable affine so pass-through can be checked.
pub fn sample_header() -> NiftiHeader {
    NiftiHeader {
        sform_code: 1,
        srow_x: [2.0, 0.0, 0.0, -90.0],
        srow_y: [0.0, 2.0, 0.0, -126.0],
        srow_z: [0.0, 0.0, 2.0, -72.0],
        pixdim: [1.0, 2.0, 2.0, 2.0, 1.0, 1.0, 1.0, 1.0],
        ..NiftiHeader::default()
    }
}

/// A 4x3x2 volume holding labels 0, 1, 2 and 5.
pub fn sample_labels() -> ArrayD<i64> {
    let values = [0, 1, 2, 5, 0, 2, 1, 1, 5, 0, 2, 2];
    ArrayD::from_shape_vec(
        IxDyn(&[4, 3, 2]),
        values.iter().cycle().take(24).copied().collect(),
    )
    .expect("shape matches")
}

pub fn write_volume(path: &Path, data: &ArrayD<i64>, dtype: LabelDtype) {
    write_label_volume(path, &sample_header(), data, dtype).expect("write fixture volume");
}
