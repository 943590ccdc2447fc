//! The relabel engine.
//!
//! [`relabel`] applies a [`CanonicalMapping`] to every voxel of a label
//! array. The distinct input values are collected first and translated once,
//! so the voxel pass is a single table lookup per voxel and its cost does
//! not depend on how many groups the specification has.

pub mod dtype;
mod report;

pub use dtype::{LabelDtype, VoxelType, INFERENCE_LADDER};
pub use report::{Disposition, LabelOutcome, RelabelReport};

use std::collections::{BTreeMap, HashMap};

use ndarray::{Array, ArrayBase, Data, Dimension};

use crate::error::LabelmergeError;
use crate::groups::{CanonicalMapping, ZeroPolicy};

/// The output of a relabel pass.
#[derive(Clone, Debug)]
pub struct Relabeled<D: Dimension> {
    /// Output labels, same shape as the input.
    pub data: Array<i64, D>,
    /// Storage type every value in `data` fits in.
    pub dtype: LabelDtype,
    pub report: RelabelReport,
}

/// Applies `mapping` to `data`.
///
/// With `out_dtype` set, every output label must fit in it. Without it, the
/// narrowest signed type that holds all output labels and is at least as
/// wide as `input` is chosen.
///
/// # Errors
/// Returns [`LabelmergeError::DtypeRange`] with the smallest offending output
/// label when `out_dtype` cannot represent it. Nothing is transformed in
/// that case.
pub fn relabel<S, D>(
    data: &ArrayBase<S, D>,
    mapping: &CanonicalMapping,
    input: VoxelType,
    out_dtype: Option<LabelDtype>,
) -> Result<Relabeled<D>, LabelmergeError>
where
    S: Data<Elem = i64>,
    D: Dimension,
{
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for &value in data.iter() {
        *counts.entry(value).or_insert(0) += 1;
    }

    let table: BTreeMap<i64, i64> = counts
        .keys()
        .map(|&old| (old, mapping.lookup(old)))
        .collect();

    let dtype = select_dtype(&table, input, out_dtype)?;

    let lookup: HashMap<i64, i64> = table.iter().map(|(&old, &new)| (old, new)).collect();
    let out = data.mapv(|value| lookup.get(&value).copied().unwrap_or(value));

    let mut report = RelabelReport::new(input, dtype);
    report.voxel_count = data.len();
    report.labels = table
        .iter()
        .map(|(&old, &new)| LabelOutcome {
            input: old,
            output: new,
            voxels: counts.get(&old).copied().unwrap_or(0),
            disposition: disposition(mapping, old),
        })
        .collect();
    report.absent_labels = mapping
        .iter()
        .map(|(old, _)| old)
        .filter(|old| !counts.contains_key(old))
        .collect();

    Ok(Relabeled {
        data: out,
        dtype,
        report,
    })
}

fn select_dtype(
    table: &BTreeMap<i64, i64>,
    input: VoxelType,
    requested: Option<LabelDtype>,
) -> Result<LabelDtype, LabelmergeError> {
    let mut outputs: Vec<i64> = table.values().copied().collect();
    outputs.sort_unstable();

    match requested {
        Some(dtype) => {
            outputs.iter().try_for_each(|&value| dtype.check(value))?;
            Ok(dtype)
        }
        None => {
            let floor = input.width_floor();
            match (outputs.first(), outputs.last()) {
                (Some(&min), Some(&max)) => Ok(LabelDtype::infer(min, max, floor)),
                _ => Ok(floor),
            }
        }
    }
}

fn disposition(mapping: &CanonicalMapping, old: i64) -> Disposition {
    if old == 0 && mapping.zero_policy() == ZeroPolicy::Preserve {
        Disposition::PreservedZero
    } else if mapping.get(old).is_some() {
        Disposition::Mapped
    } else {
        Disposition::Passthrough
    }
}
