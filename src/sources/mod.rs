//! Frame sources.
//!
//! The engine pulls one bitmap per tick. A source that has nothing to offer yet
//! returns `Ok(None)` and the pass is skipped.

pub mod file;
pub mod memory;

pub use file::FileFrameSource;
pub use memory::StaticFrameSource;

use image::RgbaImage;

use crate::error::Result;

/// Delivers chart frames to the processor.
pub trait FrameSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetch the current frame. `Ok(None)` means not ready yet.
    fn next_frame(&self) -> Result<Option<RgbaImage>>;
}
