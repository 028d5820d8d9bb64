//! History of past analyses.

pub mod model;

pub use model::{HistoryEntry, HistoryRecord, ScoreBand};
