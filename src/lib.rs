//! postcheck -- contract checks for a public posts REST API.
//!
//! This crate provides the check catalog, a typed client for the posts
//! resource, fixture loading, and the CSV result sink the checks log to.

pub mod checks;
pub mod client;
pub mod config;
pub mod fixtures;
pub mod sink;
pub mod suite;

pub use config::SuiteConfig;
pub use sink::{CsvSink, MemorySink, Outcome, RequestType, ResultRecord, ResultSink};
pub use suite::{run_suite, SuiteReport};
