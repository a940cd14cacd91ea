pub mod history;
pub mod processor;
pub mod strategy;
pub mod structure;
pub mod vision;

pub use history::{SignalHistory, SignalTracker};
pub use processor::{EngineSnapshot, FrameProcessor};
pub use strategy::{seconds_to_next_minute, SignalClassifier, SignalWindow, Strategy};
pub use structure::StructureAnalyzer;
pub use vision::{render_overlay, CandleDetector, PriceReader};
