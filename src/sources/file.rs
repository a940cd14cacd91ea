use std::path::{Path, PathBuf};

use image::RgbaImage;
use tracing::trace;

use crate::error::Result;

use super::FrameSource;

/// Reads a screenshot from disk on every call.
///
/// A missing file reports not-ready. A file caught mid-write fails to decode and
/// surfaces as a transient image error.
#[derive(Debug, Clone)]
pub struct FileFrameSource {
    path: PathBuf,
}

impl FileFrameSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for FileFrameSource {
    fn name(&self) -> &str {
        "file"
    }

    fn next_frame(&self) -> Result<Option<RgbaImage>> {
        if !self.path.is_file() {
            trace!("Frame file {} not present", self.path.display());
            return Ok(None);
        }
        let frame = image::open(&self.path)?.to_rgba8();
        Ok(Some(frame))
    }
}
