#![allow(dead_code)]

use std::collections::BTreeSet;

use labelmerge::GroupSpec;
use ndarray::{Array1, ArrayD, IxDyn};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// A small label volume drawn from labels `0..max_label`.
pub fn arb_volume(max_label: i64, max_voxels: usize) -> impl Strategy<Value = ArrayD<i64>> {
    prop::collection::vec(0..max_label, 1..=max_voxels).prop_map(|values| {
        let len = values.len();
        ArrayD::from_shape_vec(IxDyn(&[len]), values).expect("1-d shape matches")
    })
}

/// A sequence-form spec whose groups are disjoint subsets of `0..max_label`.
pub fn arb_disjoint_groups(max_label: i64) -> impl Strategy<Value = GroupSpec> {
    prop::collection::vec(0..max_label, 0..(max_label as usize))
        .prop_flat_map(|labels| {
            let unique: Vec<i64> = labels
                .into_iter()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            let len = unique.len();
            (Just(unique), prop::collection::vec(0usize..4, len))
        })
        .prop_map(|(labels, buckets)| {
            let mut groups = vec![Vec::new(); 4];
            for (label, bucket) in labels.into_iter().zip(buckets) {
                groups[bucket].push(label);
            }
            groups.retain(|g: &Vec<i64>| !g.is_empty());
            GroupSpec::Sequence(groups)
        })
}

/// Reverses the voxel order of a 1-d volume.
pub fn reversed(volume: &ArrayD<i64>) -> ArrayD<i64> {
    let mut values: Vec<i64> = volume.iter().copied().collect();
    values.reverse();
    Array1::from(values).into_dyn()
}
