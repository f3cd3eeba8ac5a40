//! Shared data types for the extraction pipeline.

pub mod config;

pub use config::{PipelineConfig, RequestOptions};
