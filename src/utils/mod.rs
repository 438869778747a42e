//! Utility modules for logging and progress reporting

pub mod logger;
pub mod progress;
