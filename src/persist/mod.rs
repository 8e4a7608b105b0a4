//! Image persistence: composite frames and optional debug dumps.

pub mod debug_dump;
pub mod tga;
pub mod writer;

pub use debug_dump::DebugDump;
pub use tga::{TgaHeader, write_tga};
pub use writer::{FrameCounter, ImageWriter, SaveFailure, SavedImage, frame_file_name};
