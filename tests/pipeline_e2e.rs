mod util;
use insitu_viz::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use util::*;

type Pipeline = VisPipeline<ThreadScheduler<SamplePlacementPolicy>, FlatRasterizer>;

fn pipeline(dir: &std::path::Path, total_ranks: usize) -> Arc<Pipeline> {
    let policy = Arc::new(
        SamplePlacementPolicy::from_configs(&[sample_cfg(0, 2, 1, 1), sample_cfg(1, 1, 2, 2)], total_ranks)
            .expect("placement"),
    );
    let config = VisConfig {
        image_width: 16,
        image_height: 8,
        output_dir: Some(dir.to_path_buf()),
        ..VisConfig::default()
    };
    let scheduler = ThreadScheduler::new(total_ranks, Arc::clone(&policy));
    Arc::new(VisPipeline::new(
        config,
        policy,
        scheduler,
        Arc::new(FlatRasterizer { depth: depth_by_distance }),
    ))
}

#[test]
fn two_samples_render_and_save_concurrently() {
    let dir = tempfile::tempdir().unwrap();
    let vis = pipeline(dir.path(), 7);

    let mut roots = Vec::new();
    for id in [SampleId(0), SampleId(1)] {
        let regions = vis.initialize(id).unwrap();
        assert_eq!(regions.composite.tile, Some(TileCoord::ORIGIN));
        let tiling = regions.domain;
        let fluid = fluid_partition(tiling, [2, 2, 1]);
        let particles = particle_partition(tiling);
        let args = RenderArguments::new(ImageDescriptor::new(16, 8), [0.0; 3], [1.0; 3]);
        let v = Arc::clone(&vis);
        roots.push(
            vis.run_sample(id, move |ctx| {
                let mut frames = Vec::new();
                for _ in 0..2 {
                    v.render(id, &fluid, &particles, &args)?;
                    frames.push(v.reduce(id)?);
                }
                Ok((ctx.rank, frames))
            })
            .unwrap(),
        );
    }

    let mut numbers = BTreeSet::new();
    for (id, root) in [SampleId(0), SampleId(1)].into_iter().zip(roots) {
        let (rank, frames) = root.wait().expect("sample root");
        assert_eq!(rank, vis.policy().sample(id).unwrap().first_rank);
        for f in frames {
            match f {
                FrameOutcome::Saved { frame, path } => {
                    assert!(path.exists());
                    numbers.insert(frame);
                }
                lost => panic!("frame not saved: {lost:?}"),
            }
        }
    }
    assert_eq!(numbers, (0..4).collect::<BTreeSet<_>>());

    for rec in vis.scheduler().placements() {
        let sample = *vis.policy().sample(rec.sample).unwrap();
        match rec.kind {
            WorkKind::SampleRoot | WorkKind::SaveImage => assert_eq!(rec.rank, sample.first_rank),
            WorkKind::TileRender => {
                assert_eq!(rec.rank, sample.rank_of(rec.tile.unwrap()).unwrap())
            }
            WorkKind::CompositeMerge => assert!(sample.rank_range().contains(&rec.rank)),
        }
    }
}

#[test]
fn composite_shows_the_nearest_tile() {
    let dir = tempfile::tempdir().unwrap();
    let vis = pipeline(dir.path(), 6);
    let id = SampleId(1);
    let tiling = vis.initialize(id).unwrap().domain;
    vis.render(
        id,
        &fluid_partition(tiling, [1, 1, 1]),
        &particle_partition(tiling),
        &RenderArguments::new(ImageDescriptor::new(16, 8), [0.0; 3], [1.0; 3]),
    )
    .unwrap();
    assert!(vis.reduce(id).unwrap().is_saved());

    let compositor = vis.compositor(id).unwrap();
    let composite = compositor.image_partition().slice_at(TileCoord::ORIGIN).unwrap().read();
    assert!(composite.provenance.iter().all(|&p| p == 0));
    assert_eq!(compositor.depth_test(), DepthTest::Less);
}

#[test]
fn entry_points_require_initialization() {
    let dir = tempfile::tempdir().unwrap();
    let vis = pipeline(dir.path(), 6);
    assert_eq!(vis.reduce(SampleId(0)).unwrap_err(), VisError::MissingCompositor(SampleId(0)));
    assert_eq!(vis.initialize(SampleId(9)).unwrap_err(), VisError::UnknownSample(SampleId(9)));

    let first = vis.initialize(SampleId(0)).unwrap();
    assert_eq!(vis.initialize(SampleId(0)).unwrap(), first, "compositor is reused");
}
