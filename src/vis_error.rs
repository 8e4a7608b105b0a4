//! VisError: Unified error type for insitu-viz public APIs
//!
//! Every fallible operation in the crate (placement, dispatch, compositing,
//! persistence) reports through this one enum so callers can decide whether
//! a failure is fatal for the process or only for one frame.

use std::path::PathBuf;
use thiserror::Error;

use crate::placement::sample::SampleId;
use crate::placement::tiling::TileCoord;
use crate::runtime::Rank;

/// Unified error type for insitu-viz operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VisError {
    /// A sample configuration requested a non-positive tile count.
    #[error("Invalid tiling for sample {sample}: ({x}, {y}, {z}) tiles (all counts must be > 0)")]
    InvalidTiling { sample: SampleId, x: i64, y: i64, z: i64 },
    /// A tiling has a zero extent on some axis.
    #[error("Tiling ({nx}, {ny}, {nz}) has an empty axis")]
    EmptyTiling { nx: usize, ny: usize, nz: usize },
    /// The tile count of a tiling does not fit in `usize`.
    #[error("Tiling ({nx}, {ny}, {nz}) has too many tiles")]
    TileCountOverflow { nx: usize, ny: usize, nz: usize },
    /// The summed tile counts of all samples do not fit in `usize`.
    #[error("Rank count overflows while allocating sample {0}")]
    RankCountOverflow(SampleId),
    /// More ranks were requested by the samples than the allocation supplies.
    #[error("{required} rank(s) required, but {available} rank(s) supplied")]
    RankCapacityExceeded { required: usize, available: usize },
    /// Two configurations declared the same sample id.
    #[error("Sample {0} is configured more than once")]
    DuplicateSample(SampleId),
    /// No sample with this id was registered at startup.
    #[error("Unknown sample {0}")]
    UnknownSample(SampleId),
    /// `render`/`reduce` was called before `initialize` for this sample.
    #[error("No compositor initialized for sample {0}")]
    MissingCompositor(SampleId),
    /// A configuration file could not be read.
    #[error("Cannot read configuration `{path}`: {reason}")]
    ConfigIo { path: PathBuf, reason: String },
    /// A configuration file could not be parsed.
    #[error("Cannot parse configuration `{path}`: {reason}")]
    ConfigParse { path: PathBuf, reason: String },
    /// A tile coordinate lies outside the tiling it was routed against.
    #[error("Tile {tile} is outside the ({nx}, {ny}, {nz}) tiling")]
    TileOutOfRange { tile: TileCoord, nx: usize, ny: usize, nz: usize },
    /// A routing function was asked to project into a partition it does not serve.
    #[error("Routing error: {0}")]
    Routing(String),
    /// The placement policy widened a region instead of binding the exact slice.
    #[error("Instance region for tile {0} was widened beyond its slice")]
    AliasedRegion(TileCoord),
    /// A placement decision produced a rank outside the allocation.
    #[error("Rank {rank} is outside the allocation of {total} rank(s)")]
    RankOutOfRange { rank: Rank, total: usize },
    /// The render argument payload could not be encoded or decoded.
    #[error("Render argument payload error: {0}")]
    ArgumentCodec(String),
    /// The rasterizer could not acquire its drawing context or buffers.
    #[error("Render context unavailable: {0}")]
    RenderContext(String),
    /// A buffer did not have the length implied by the image descriptor.
    #[error("{what}: expected {expected} element(s), got {actual}")]
    BufferSizeMismatch { what: &'static str, expected: usize, actual: usize },
    /// An image is too large for the 16-bit dimensions of a TGA header.
    #[error("Image of {width}x{height} exceeds the TGA limit of {max} pixels per side")]
    ImageTooLarge { width: u32, height: u32, max: u32 },
    /// A debug dump file could not be created.
    #[error("Could not create dump file {path}: {reason}")]
    DumpCreate { path: PathBuf, reason: String },
    /// The output image file could not be created.
    #[error("Could not create file {path}: {reason}")]
    ImageCreate { path: PathBuf, reason: String },
    /// Writing to an already created file failed.
    #[error("I/O error: {0}")]
    Io(String),
    /// A unit of work panicked or its handle was dropped.
    #[error("Unit of work on rank {rank} failed: {reason}")]
    TaskFailed { rank: Rank, reason: String },
    /// Runtime bootstrap failure (e.g. MPI could not be initialized).
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl From<std::io::Error> for VisError {
    fn from(err: std::io::Error) -> Self {
        VisError::Io(err.to_string())
    }
}

impl VisError {
    /// True for failures that only cost the current frame's output file.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(self, VisError::ImageCreate { .. } | VisError::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_message_names_both_counts() {
        let err = VisError::RankCapacityExceeded {
            required: 9,
            available: 4,
        };
        assert_eq!(
            err.to_string(),
            "9 rank(s) required, but 4 rank(s) supplied"
        );
    }

    #[test]
    fn io_errors_convert_and_classify() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: VisError = io.into();
        assert!(err.is_persistence_failure());
        assert!(!VisError::UnknownSample(SampleId(3)).is_persistence_failure());
    }
}
