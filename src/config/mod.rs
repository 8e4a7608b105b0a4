//! Startup configuration: sample discovery and pipeline settings.

pub mod args;
pub mod sample_config;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::data::image::ImageDescriptor;

pub use args::{read_config_list, scan_startup_args};
pub use sample_config::{MappingConfig, SampleConfig};

/// Environment variable naming the directory composite images go to.
pub const SCRATCH_ENV: &str = "SCRATCH";

/// Settings of one visualization pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisConfig {
    pub image_width: u32,
    pub image_height: u32,
    /// Directory for composite images; `None` means the working directory.
    pub output_dir: Option<PathBuf>,
    /// Also write every tile's partial image and depth buffer.
    pub save_intermediate_images: bool,
    /// Dump every tile's fluid and particle inputs as text before rendering.
    pub dump_render_data: bool,
}

impl Default for VisConfig {
    fn default() -> Self {
        let d = ImageDescriptor::default();
        Self {
            image_width: d.width,
            image_height: d.height,
            output_dir: None,
            save_intermediate_images: false,
            dump_render_data: false,
        }
    }
}

impl VisConfig {
    /// Defaults, with the output directory taken from `SCRATCH` when set.
    pub fn from_env() -> Self {
        Self {
            output_dir: std::env::var_os(SCRATCH_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            ..Self::default()
        }
    }

    pub fn image_descriptor(&self) -> ImageDescriptor {
        ImageDescriptor::new(self.image_width, self.image_height)
    }

    /// Directory images are written to.
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn from_env_reads_scratch() {
        unsafe { std::env::set_var(SCRATCH_ENV, "/tmp/vis-scratch") };
        let cfg = VisConfig::from_env();
        unsafe { std::env::remove_var(SCRATCH_ENV) };
        assert_eq!(cfg.resolved_output_dir(), PathBuf::from("/tmp/vis-scratch"));
    }

    #[test]
    #[serial]
    fn from_env_defaults_to_working_directory() {
        unsafe { std::env::remove_var(SCRATCH_ENV) };
        let cfg = VisConfig::from_env();
        assert_eq!(cfg.resolved_output_dir(), PathBuf::from("."));
        assert_eq!(cfg.image_descriptor(), ImageDescriptor::default());
    }
}
