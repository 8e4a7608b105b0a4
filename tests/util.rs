#![allow(dead_code)]
use insitu_viz::config::MappingConfig;
use insitu_viz::prelude::*;
use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

pub fn sample_cfg(id: u32, x: i64, y: i64, z: i64) -> SampleConfig {
    SampleConfig {
        mapping: MappingConfig {
            sample_id: id,
            x_tiles: x,
            y_tiles: y,
            z_tiles: z,
        },
    }
}

/// Fluid partition with `cells` per tile; every field of a tile holds its
/// linear index.
pub fn fluid_partition(tiling: Tiling, cells: [usize; 3]) -> Partition<FluidSlice> {
    Partition::from_fn(tiling, |tile| {
        let v = tiling.linear_index(tile).unwrap() as f64;
        let mut f = FluidSlice::zeroed(cells);
        f.density.fill(v);
        f.temperature.fill(v);
        f
    })
}

/// One particle per tile, id = linear index of the tile.
pub fn particle_partition(tiling: Tiling) -> Partition<ParticleSlice> {
    Partition::from_fn(tiling, |tile| {
        let i = tiling.linear_index(tile).unwrap();
        let mut p = ParticleSlice::default();
        p.push(i as i64, [tile.x as f64, tile.y as f64, tile.z as f64], 300.0, 1.0);
        p
    })
}

/// Paints a whole tile in one color derived from the fluid density it was
/// handed, at a depth chosen per tile.
pub struct FlatRasterizer {
    pub depth: fn(TileCoord) -> f32,
}

impl FlatRasterizer {
    pub fn color_of(index: u8) -> [u8; 4] {
        [index.wrapping_mul(40), 255 - index, index, 255]
    }
}

impl Rasterizer for FlatRasterizer {
    fn render(&self, req: &RasterRequest<'_>) -> Result<RasterOutput, VisError> {
        let n = req.args.image.pixel_count();
        let index = req.fluid.density.first().copied().unwrap_or(0.0) as u8;
        Ok(RasterOutput {
            rgba: FlatRasterizer::color_of(index).repeat(n),
            depth: vec![(self.depth)(req.tile); n],
        })
    }
}

/// Depth grows with x + y + z, so tile (0,0,0) is nearest.
pub fn depth_by_distance(tile: TileCoord) -> f32 {
    0.1 * (tile.x + tile.y + tile.z) as f32 + 0.05
}

pub fn flat_depth(_: TileCoord) -> f32 {
    0.5
}

/// Process-wide logger that keeps every record for inspection.
pub struct CapturedLogs {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CapturedLogs {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        self.records
            .lock()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

impl CapturedLogs {
    /// Was `message` logged at `level` since the process started?
    pub fn contains(&self, level: Level, message: &str) -> bool {
        self.records
            .lock()
            .iter()
            .any(|(l, m)| *l == level && m == message)
    }
}

static LOGS: CapturedLogs = CapturedLogs {
    records: Mutex::new(Vec::new()),
};

/// Install the capturing logger (once per test binary) and return it.
pub fn captured_logs() -> &'static CapturedLogs {
    if log::set_logger(&LOGS).is_ok() {
        log::set_max_level(LevelFilter::Trace);
    }
    &LOGS
}
