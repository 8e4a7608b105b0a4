//! Image compositing: depth-tested tree reduction of per-tile images.

pub mod compositor;
pub mod coordinator;
pub mod depth;

pub use compositor::{ImageCompositor, ImageRegions};
pub use coordinator::{CompositingCoordinator, FrameOutcome};
pub use depth::DepthTest;
