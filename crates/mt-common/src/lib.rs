//! Markov Tagger common types and errors.
//!
//! This crate provides the foundational types shared across mt-core modules:
//! - The unified error type with stable codes and categories
//! - The sample abstraction consumed by counting and training

pub mod error;
pub mod sample;

pub use error::{Error, ErrorCategory, Result};
pub use sample::{Sample, VecSampleStream};
