//! Utility functions

pub mod crypto;

pub use crypto::hash_string;
