// Main library entry point for hotgraph.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;

pub use application::{analyze, AnalysisReport, AnalyzeOptions};
pub use error::{Error, Result};
