//! Core domain types and logic.

pub mod candle;
pub mod indicator;
pub mod snapshot;
pub mod stops;
pub mod regime;
pub mod screen;
pub mod sizing;
pub mod error;
