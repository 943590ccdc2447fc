//! Summary of what a relabel pass did to each label.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use super::dtype::{LabelDtype, VoxelType};

/// A report generated by a relabel pass.
///
/// Lists every distinct input label with its output label and voxel count,
/// plus the labels the specification names that never occur in the volume.
#[derive(Clone, Debug, Serialize)]
pub struct RelabelReport {
    /// Storage type of the input volume (`int16`, `float32`, ...).
    pub input_type: String,
    /// Storage type chosen for the output.
    pub output_dtype: LabelDtype,
    /// Total number of voxels processed.
    pub voxel_count: usize,
    /// One entry per distinct input label, ascending.
    pub labels: Vec<LabelOutcome>,
    /// Labels listed in groups but absent from the volume, ascending.
    pub absent_labels: Vec<i64>,
}

impl RelabelReport {
    pub(crate) fn new(input: VoxelType, output_dtype: LabelDtype) -> Self {
        Self {
            input_type: input.to_string(),
            output_dtype,
            voxel_count: 0,
            labels: Vec::new(),
            absent_labels: Vec::new(),
        }
    }

    /// Number of distinct input labels that were remapped by a group.
    pub fn mapped_count(&self) -> usize {
        self.count(Disposition::Mapped)
    }

    /// Number of distinct input labels that passed through unchanged.
    pub fn passthrough_count(&self) -> usize {
        self.count(Disposition::Passthrough)
    }

    fn count(&self, disposition: Disposition) -> usize {
        self.labels
            .iter()
            .filter(|l| l.disposition == disposition)
            .count()
    }

    /// The distinct labels present in the output.
    pub fn output_labels(&self) -> BTreeSet<i64> {
        self.labels.iter().map(|l| l.output).collect()
    }
}

impl fmt::Display for RelabelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Relabeled {} voxels: {} input label(s) -> {} output label(s) ({} -> {})",
            self.voxel_count,
            self.labels.len(),
            self.output_labels().len(),
            self.input_type,
            self.output_dtype
        )?;

        for outcome in &self.labels {
            let note = match outcome.disposition {
                Disposition::Mapped => "",
                Disposition::Passthrough => ", unchanged",
                Disposition::PreservedZero => ", background",
            };
            writeln!(
                f,
                "  {} -> {} ({} voxels{})",
                outcome.input, outcome.output, outcome.voxels, note
            )?;
        }

        if !self.absent_labels.is_empty() {
            let absent: Vec<String> = self.absent_labels.iter().map(|l| l.to_string()).collect();
            writeln!(f)?;
            writeln!(
                f,
                "Labels listed in groups but absent from the volume: {}",
                absent.join(", ")
            )?;
        }

        Ok(())
    }
}

/// The fate of one distinct input label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LabelOutcome {
    pub input: i64,
    pub output: i64,
    pub voxels: usize,
    pub disposition: Disposition,
}

/// Why a label ended up with its output value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Listed in a group.
    Mapped,
    /// Not listed anywhere; kept as is.
    Passthrough,
    /// Background kept at 0.
    PreservedZero,
}
