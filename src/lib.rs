//! Prisma - Chart frame analysis and signal strategy engine

pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

pub use config::EngineConfig;
pub use error::{AppError, Result};
pub use services::{
    EngineSnapshot, FrameProcessor, SignalClassifier, SignalHistory, SignalTracker,
    StructureAnalyzer,
};
pub use sources::{FileFrameSource, FrameSource, StaticFrameSource};
pub use types::*;
