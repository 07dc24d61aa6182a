//! The sample abstraction consumed by counting and training.
//!
//! A supervised sample pairs a state sequence and an observation sequence of
//! equal length; an unsupervised sample carries observations only. Sample
//! streams yield successive samples and surface IO/parse failures as stream
//! errors, never from the consuming core.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// One training sample: symbolic observations, optionally paired with the
/// state labels that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sample {
    /// Supervised sample: equal-length state and observation symbol vectors.
    Labeled {
        states: Vec<String>,
        observations: Vec<String>,
    },
    /// Unsupervised sample: observations only.
    Unlabeled { observations: Vec<String> },
}

impl Sample {
    /// Build a labeled sample, rejecting mismatched lengths.
    pub fn labeled<S: Into<String>>(states: Vec<S>, observations: Vec<S>) -> Result<Self> {
        if states.len() != observations.len() {
            return Err(Error::SampleLengthMismatch {
                states: states.len(),
                observations: observations.len(),
            });
        }
        Ok(Sample::Labeled {
            states: states.into_iter().map(Into::into).collect(),
            observations: observations.into_iter().map(Into::into).collect(),
        })
    }

    /// Build an unlabeled sample.
    pub fn unlabeled<S: Into<String>>(observations: Vec<S>) -> Self {
        Sample::Unlabeled {
            observations: observations.into_iter().map(Into::into).collect(),
        }
    }

    /// Observation symbols of this sample.
    pub fn observations(&self) -> &[String] {
        match self {
            Sample::Labeled { observations, .. } => observations,
            Sample::Unlabeled { observations } => observations,
        }
    }

    /// State symbols, if this sample is labeled.
    pub fn states(&self) -> Option<&[String]> {
        match self {
            Sample::Labeled { states, .. } => Some(states),
            Sample::Unlabeled { .. } => None,
        }
    }

    /// Number of positions in the sample.
    pub fn len(&self) -> usize {
        self.observations().len()
    }

    /// Whether the sample has no positions.
    pub fn is_empty(&self) -> bool {
        self.observations().is_empty()
    }
}

/// In-memory sample stream over an owned vector.
///
/// File- or network-backed streams implement the same shape
/// (`Iterator<Item = Result<Sample>>`) and report parse failures through the
/// item error; this one never fails.
#[derive(Debug, Clone, Default)]
pub struct VecSampleStream {
    samples: std::vec::IntoIter<Sample>,
}

impl VecSampleStream {
    /// Wrap an owned vector of samples.
    pub fn new(samples: Vec<Sample>) -> Self {
        Self {
            samples: samples.into_iter(),
        }
    }
}

impl Iterator for VecSampleStream {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        self.samples.next().map(Ok)
    }
}
