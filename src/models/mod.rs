//! Domain models
//!
//! This module contains all domain models used throughout the application.

pub mod benchmark;
pub mod sample;

pub use benchmark::*;
pub use sample::*;
