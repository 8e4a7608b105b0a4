//! Composite image persistence: one numbered TGA file per saved frame.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::VisConfig;
use crate::data::image::PartialImage;
use crate::persist::tga::write_tga;
use crate::vis_error::VisError;

/// Monotonic frame number source. Starts at 0; a number once handed out is
/// never reused, whether or not its frame was written.
#[derive(Debug, Default)]
pub struct FrameCounter(AtomicU32);

impl FrameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next frame number.
    pub fn next(&self) -> u32 {
        self.0.fetch_add(1, Ordering::SeqCst)
    }

    /// Number the next call to [`FrameCounter::next`] returns.
    pub fn peek(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }
}

/// File name of frame `frame`.
pub fn frame_file_name(frame: u32) -> String {
    format!("image.{frame:05}.tga")
}

/// A frame that reached disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedImage {
    pub frame: u32,
    pub path: PathBuf,
}

/// A frame whose file could not be written; its number is consumed anyway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveFailure {
    pub frame: u32,
    pub error: VisError,
}

/// Writes composite images into one directory, numbering them with a
/// counter shared by every sample of the process.
#[derive(Debug)]
pub struct ImageWriter {
    dir: PathBuf,
    counter: FrameCounter,
}

impl ImageWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ImageWriter {
            dir: dir.into(),
            counter: FrameCounter::new(),
        }
    }

    /// Writer for `config`'s resolved output directory.
    pub fn from_config(config: &VisConfig) -> Self {
        Self::new(config.resolved_output_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn counter(&self) -> &FrameCounter {
        &self.counter
    }

    /// Write `image` as the next numbered frame.
    ///
    /// If the file cannot be created nothing is written; if a later write
    /// fails the partial file is removed. Either way the frame number is
    /// consumed.
    pub fn save(&self, image: &PartialImage) -> Result<SavedImage, SaveFailure> {
        let frame = self.counter.next();
        let path = self.dir.join(frame_file_name(frame));
        let fail = |error| SaveFailure { frame, error };

        let file = File::create(&path).map_err(|e| {
            fail(VisError::ImageCreate {
                path: path.clone(),
                reason: e.to_string(),
            })
        })?;
        let mut out = BufWriter::new(file);
        let written = write_tga(&mut out, image).and_then(|()| out.flush().map_err(VisError::from));
        if let Err(error) = written {
            drop(out);
            if let Err(e) = fs::remove_file(&path) {
                log::warn!("could not remove partial image {}: {e}", path.display());
            }
            return Err(fail(error));
        }
        log::info!("wrote image {}", path.display());
        Ok(SavedImage { frame, path })
    }
}
