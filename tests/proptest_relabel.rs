use std::collections::BTreeSet;

use labelmerge::{relabel, resolve, GroupSpec, LabelDtype, ResolveOptions, VoxelType};
use proptest::prelude::*;

mod proptest_helpers;

const INPUT: VoxelType = VoxelType::Integer(LabelDtype::Int16);

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn zero_voxels_stay_zero_when_preserved(
        volume in proptest_helpers::arb_volume(12, 64),
        spec in proptest_helpers::arb_disjoint_groups(12),
        start_label in -20i64..20,
    ) {
        let opts = ResolveOptions { start_label, preserve_zero: true };
        let mapping = resolve(&spec, &opts).expect("disjoint groups resolve");
        let out = relabel(&volume, &mapping, INPUT, None).expect("relabel");

        for (before, after) in volume.iter().zip(out.data.iter()) {
            if *before == 0 {
                prop_assert_eq!(*after, 0);
            }
        }
    }

    #[test]
    fn unlisted_labels_pass_through(
        volume in proptest_helpers::arb_volume(12, 64),
        spec in proptest_helpers::arb_disjoint_groups(12),
    ) {
        let listed: BTreeSet<i64> = match &spec {
            GroupSpec::Sequence(groups) => groups.iter().flatten().copied().collect(),
            GroupSpec::Mapping(_) => unreachable!("strategy only builds sequences"),
        };
        let mapping = resolve(&spec, &ResolveOptions::default()).expect("resolve");
        let out = relabel(&volume, &mapping, INPUT, None).expect("relabel");

        for (before, after) in volume.iter().zip(out.data.iter()) {
            if !listed.contains(before) {
                prop_assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn grouped_labels_share_their_group_label(
        volume in proptest_helpers::arb_volume(12, 64),
        spec in proptest_helpers::arb_disjoint_groups(12),
        start_label in 1i64..50,
    ) {
        let opts = ResolveOptions { start_label, preserve_zero: false };
        let mapping = resolve(&spec, &opts).expect("resolve");
        let out = relabel(&volume, &mapping, INPUT, None).expect("relabel");

        if let GroupSpec::Sequence(groups) = &spec {
            for (index, group) in groups.iter().enumerate() {
                let expected = start_label + index as i64;
                for (before, after) in volume.iter().zip(out.data.iter()) {
                    if group.contains(before) {
                        prop_assert_eq!(*after, expected);
                    }
                }
            }
        }
    }

    #[test]
    fn voxel_order_does_not_change_the_result(
        volume in proptest_helpers::arb_volume(12, 64),
        spec in proptest_helpers::arb_disjoint_groups(12),
    ) {
        let mapping = resolve(&spec, &ResolveOptions::default()).expect("resolve");
        let forward = relabel(&volume, &mapping, INPUT, None).expect("relabel");
        let backward = relabel(
            &proptest_helpers::reversed(&volume),
            &mapping,
            INPUT,
            None,
        )
        .expect("relabel reversed");

        prop_assert_eq!(proptest_helpers::reversed(&forward.data), backward.data);
        prop_assert_eq!(forward.dtype, backward.dtype);
    }

    #[test]
    fn singleton_identity_groups_leave_volume_unchanged(
        volume in proptest_helpers::arb_volume(12, 64),
        preserve_zero in any::<bool>(),
    ) {
        // Group i holds label i, so start_label 0 maps every label to itself.
        let spec = GroupSpec::Sequence((0..12).map(|label| vec![label]).collect());
        let opts = ResolveOptions { start_label: 0, preserve_zero };
        let mapping = resolve(&spec, &opts).expect("resolve");
        let out = relabel(&volume, &mapping, INPUT, None).expect("relabel");

        prop_assert_eq!(out.data, volume);
    }

    #[test]
    fn inferred_dtype_holds_every_output_label(
        volume in proptest_helpers::arb_volume(12, 64),
        start_label in -40_000i64..40_000,
    ) {
        let spec = GroupSpec::Sequence(vec![vec![1, 2], vec![3]]);
        let opts = ResolveOptions { start_label, preserve_zero: true };
        let mapping = resolve(&spec, &opts).expect("resolve");
        let out = relabel(&volume, &mapping, INPUT, None).expect("relabel");

        prop_assert!(out.dtype.bits() >= 16);
        for value in out.data.iter() {
            prop_assert!(out.dtype.fits(*value));
        }
    }
}
