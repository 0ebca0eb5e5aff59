//! Shootout - Markdown Implementation Benchmarking
//!
//! This library drives a fixed set of Markdown implementations over a corpus
//! of sample documents under a profiler and collects their artifacts.
//!
//! # Features
//!
//! - Pluggable runners behind the [`benchmark::BenchmarkRunner`] trait
//! - Node.js runner profiling with `node --prof`
//! - V8 trace normalization and `--prof-process` reports
//! - Deterministic, collision-free artifact layout
//!
//! # Architecture
//!
//! A run moves through three phases:
//! - **Initialize**: runners prepare, concurrently; any failure aborts the run
//! - **Benchmark**: one profiled run at a time; failures stay with their runner
//! - **Analyze**: runners post-process their traces, concurrently

pub mod benchmark;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod reporter;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
