//! Decoding algorithms over an immutable model.
//!
//! All decoders sweep left to right over an observation sequence of length
//! T with N states, terminal at t = T; runtime is O(T*N^2) per decode
//! (times the frontier width for the search variants). Accumulation is
//! log-domain throughout via `mt_math::log10_sum_exp`. The only rejected
//! inputs are an empty observation sequence, an empty state space, and a
//! mismatched state/observation pair when scoring an explicit path.

mod backward;
mod beam;
mod forward;
mod kbest;
mod viterbi;

pub use backward::{backward, BackwardLattice};
pub use beam::beam_search;
pub use forward::{forward, ForwardLattice};
pub use kbest::k_best;
pub use viterbi::viterbi;

use crate::model::Model;
use mt_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// A decoded state sequence with its exact log10 probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedPath {
    pub states: Vec<u32>,
    pub log10_prob: f64,
}

pub(crate) fn validate(model: &Model, observations: &[u32]) -> Result<()> {
    if observations.is_empty() {
        return Err(Error::EmptyObservationSequence);
    }
    if model.num_states() == 0 {
        return Err(Error::EmptyStateSpace);
    }
    Ok(())
}

/// Exact log10 probability of one explicit (state, observation) path:
/// the initial term, then per position the transition term over the
/// available context (up to the model order) and the emission term.
pub fn score_path(model: &Model, states: &[u32], observations: &[u32]) -> Result<f64> {
    validate(model, observations)?;
    if states.len() != observations.len() {
        return Err(Error::PathLengthMismatch {
            states: states.len(),
            observations: observations.len(),
        });
    }

    let order = model.order();
    let mut score = model.initial_log10(states[0]) + model.emission_log10(states[0], observations[0]);
    for t in 1..states.len() {
        let start = t.saturating_sub(order);
        score += model.transition_log10(&states[start..t], states[t])
            + model.emission_log10(states[t], observations[t]);
    }
    Ok(score)
}
