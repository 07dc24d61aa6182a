//! Markov Tagger math utilities.

pub mod regression;
pub mod stable;

pub use regression::*;
pub use stable::*;
