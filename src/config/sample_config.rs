//! JSON sample configuration (only the fields placement needs).
//!
//! Simulation configurations carry many more sections; unknown keys are
//! ignored so the same file can be handed to the solver unchanged.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::placement::sample::SampleId;
use crate::placement::tiling::Tiling;
use crate::vis_error::VisError;

/// The `Mapping` section of a sample configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingConfig {
    pub sample_id: u32,
    pub x_tiles: i64,
    pub y_tiles: i64,
    pub z_tiles: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleConfig {
    #[serde(rename = "Mapping")]
    pub mapping: MappingConfig,
}

impl SampleConfig {
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Read and parse one configuration file.
    pub fn load(path: &Path) -> Result<Self, VisError> {
        let text = fs::read_to_string(path).map_err(|e| VisError::ConfigIo {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&text).map_err(|e| VisError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn sample_id(&self) -> SampleId {
        SampleId(self.mapping.sample_id)
    }

    /// Tiling declared by the configuration; every count must be positive.
    pub fn tiling(&self) -> Result<Tiling, VisError> {
        let m = &self.mapping;
        let invalid = || VisError::InvalidTiling {
            sample: self.sample_id(),
            x: m.x_tiles,
            y: m.y_tiles,
            z: m.z_tiles,
        };
        let axis = |n: i64| usize::try_from(n).ok().filter(|&n| n > 0);
        match (axis(m.x_tiles), axis(m.y_tiles), axis(m.z_tiles)) {
            (Some(x), Some(y), Some(z)) => Tiling::new(x, y, z).map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "Case": { "maxIter": 100 },
        "Mapping": { "sampleId": 3, "xTiles": 2, "yTiles": 1, "zTiles": 4, "wallTime": 60 }
    }"#;

    #[test]
    fn parses_mapping_and_ignores_other_sections() {
        let cfg = SampleConfig::from_json_str(CONFIG).unwrap();
        assert_eq!(cfg.sample_id(), SampleId(3));
        assert_eq!(cfg.tiling().unwrap().extents(), (2, 1, 4));
    }

    #[test]
    fn non_positive_tiles_are_invalid() {
        for (x, y, z) in [(0, 1, 1), (1, -2, 1), (1, 1, 0)] {
            let cfg = SampleConfig {
                mapping: MappingConfig {
                    sample_id: 0,
                    x_tiles: x,
                    y_tiles: y,
                    z_tiles: z,
                },
            };
            assert_eq!(
                cfg.tiling().unwrap_err(),
                VisError::InvalidTiling {
                    sample: SampleId(0),
                    x,
                    y,
                    z
                }
            );
        }
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut f, b"{ \"Mapping\": {} }").unwrap();
        let err = SampleConfig::load(f.path()).unwrap_err();
        assert!(matches!(err, VisError::ConfigParse { .. }));
    }
}
