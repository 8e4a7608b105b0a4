mod util;
use insitu_viz::prelude::*;
use insitu_viz::runtime::{TilePoint, UnitOfWork};
use proptest::prelude::*;
use std::io::Write;
use util::*;

#[test]
fn two_samples_fill_the_allocation_in_order() {
    let p = SamplePlacementPolicy::from_configs(&[sample_cfg(0, 2, 2, 1), sample_cfg(1, 1, 1, 3)], 7)
        .expect("fits");
    let ranges: Vec<_> = p.samples().iter().map(|s| s.rank_range()).collect();
    assert_eq!(ranges, vec![0..4, 4..7]);
    assert_eq!(p.allocated_ranks(), 7);
}

#[test]
fn capacity_error_names_required_and_supplied() {
    let err = SamplePlacementPolicy::from_configs(&[sample_cfg(0, 2, 2, 2)], 7).unwrap_err();
    assert_eq!(err.to_string(), "8 rank(s) required, but 7 rank(s) supplied");
}

#[test]
fn spare_ranks_are_tolerated_and_reported() {
    let logs = captured_logs();
    let p = SamplePlacementPolicy::from_configs(&[sample_cfg(0, 1, 1, 1)], 4).unwrap();
    assert_eq!(p.unused_ranks(), 3);
    assert!(logs.contains(log::Level::Warn, "3 rank(s) are unused"));
}

#[test]
fn non_positive_tiling_is_invalid() {
    let err = SamplePlacementPolicy::from_configs(&[sample_cfg(2, 1, 0, 1)], 4).unwrap_err();
    assert!(matches!(err, VisError::InvalidTiling { sample: SampleId(2), y: 0, .. }));
}

#[test]
fn startup_args_mix_single_and_list_flags() {
    let dir = tempfile::tempdir().unwrap();
    let write = |name: &str, id: u32, z: i64| {
        let path = dir.path().join(name);
        std::fs::write(
            &path,
            format!(r#"{{"Mapping": {{"sampleId": {id}, "xTiles": 1, "yTiles": 1, "zTiles": {z}}}}}"#),
        )
        .unwrap();
        path
    };
    let a = write("a.json", 0, 2);
    let b = write("b.json", 1, 1);
    let c = write("c.json", 2, 3);
    let list = dir.path().join("list.csv");
    let mut f = std::fs::File::create(&list).unwrap();
    writeln!(f, "{}\n\n{}", b.display(), c.display()).unwrap();

    struct Six;
    impl ClusterAllocation for Six {
        fn total_ranks(&self) -> usize {
            6
        }
    }
    let args = vec![
        "solver".to_string(),
        "-i".into(),
        a.display().to_string(),
        "--steps".into(),
        "10".into(),
        "-I".into(),
        list.display().to_string(),
    ];
    let p = SamplePlacementPolicy::from_startup_args(args, &Six).expect("valid startup");
    let firsts: Vec<_> = p.samples().iter().map(|s| (s.id, s.first_rank)).collect();
    assert_eq!(firsts, vec![(SampleId(0), 0), (SampleId(1), 2), (SampleId(2), 3)]);
}

#[test]
fn missing_config_file_is_reported() {
    struct One;
    impl ClusterAllocation for One {
        fn total_ranks(&self) -> usize {
            1
        }
    }
    let err = SamplePlacementPolicy::from_startup_args(["-i", "/nonexistent/sample.json"], &One)
        .unwrap_err();
    assert!(matches!(err, VisError::ConfigIo { .. }));
}

#[test]
fn tile_work_launched_from_root_lands_on_its_own_rank() {
    let p = SamplePlacementPolicy::from_configs(&[sample_cfg(0, 1, 1, 2), sample_cfg(1, 2, 2, 1)], 6)
        .unwrap();
    let s = *p.sample(SampleId(1)).unwrap();
    for (index, coord) in s.tiling.tiles().enumerate() {
        let work = UnitOfWork::new(WorkKind::TileRender, s.id, s.first_rank)
            .at_tile(TilePoint { coord, index });
        assert_eq!(p.select_initial_rank(&work).unwrap(), s.rank_of(coord).unwrap());
    }
}

proptest! {
    #[test]
    fn ranges_are_disjoint_and_contiguous(
        tilings in prop::collection::vec((1i64..4, 1i64..4, 1i64..4), 1..6),
        spare in 0usize..5,
    ) {
        let configs: Vec<_> = tilings
            .iter()
            .enumerate()
            .map(|(i, &(x, y, z))| sample_cfg(i as u32, x, y, z))
            .collect();
        let need: usize = tilings.iter().map(|&(x, y, z)| (x * y * z) as usize).sum();

        let p = SamplePlacementPolicy::from_configs(&configs, need + spare).unwrap();
        let mut next = 0;
        for s in p.samples() {
            prop_assert_eq!(s.first_rank, next);
            next = s.rank_range().end;
            let root = UnitOfWork::new(WorkKind::SampleRoot, s.id, 0);
            prop_assert_eq!(p.select_initial_rank(&root).unwrap(), s.first_rank);
        }
        prop_assert_eq!(next, need);

        if need > 1 {
            let short = SamplePlacementPolicy::from_configs(&configs, need - 1);
            let is_capacity_error = matches!(short, Err(VisError::RankCapacityExceeded { .. }));
            prop_assert!(is_capacity_error);
        }
    }
}
