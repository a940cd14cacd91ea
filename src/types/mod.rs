pub mod candle;
pub mod history;
pub mod signal;
pub mod structure;

pub use candle::*;
pub use history::*;
pub use signal::*;
pub use structure::*;
