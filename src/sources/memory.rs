use std::sync::RwLock;

use image::RgbaImage;

use crate::error::{AppError, Result};

use super::FrameSource;

/// Serves whatever frame was last stored. Empty until the first `set`.
#[derive(Debug, Default)]
pub struct StaticFrameSource {
    frame: RwLock<Option<RgbaImage>>,
}

impl StaticFrameSource {
    pub fn new(frame: RgbaImage) -> Self {
        Self {
            frame: RwLock::new(Some(frame)),
        }
    }

    /// Replace the served frame.
    pub fn set(&self, frame: RgbaImage) -> Result<()> {
        let mut slot = self
            .frame
            .write()
            .map_err(|_| AppError::Internal("frame slot poisoned".to_string()))?;
        *slot = Some(frame);
        Ok(())
    }
}

impl FrameSource for StaticFrameSource {
    fn name(&self) -> &str {
        "static"
    }

    fn next_frame(&self) -> Result<Option<RgbaImage>> {
        let slot = self
            .frame
            .read()
            .map_err(|_| AppError::Internal("frame slot poisoned".to_string()))?;
        Ok(slot.clone())
    }
}
