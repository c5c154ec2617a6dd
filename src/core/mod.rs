//! # Core Module
//!
//! Crate-wide building blocks that every subsystem leans on: the error type
//! and the generation configuration.

pub mod config;
pub mod error;

pub use config::GenerationConfig;
pub use error::{Error, Result};
