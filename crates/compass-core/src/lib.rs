//! Domain types and seams for the Compass review workflow.

pub mod analysis;
pub mod config;
pub mod error;
pub mod gateway;
pub mod history;
pub mod navigation;
pub mod session;

// Re-export common error type
pub use error::CompassError;
