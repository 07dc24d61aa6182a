//! Backward algorithm.
//!
//! Mirror recursion of Forward, from t = T-1 down to 0:
//!
//! ```text
//! beta[T-1][i] = 0 (log 1)
//! beta[t][i]   = lse_j(transition(i, j) + emission(j, obs[t+1]) + beta[t+1][j])
//! ```
//!
//! Combining beta with the initial vector and the first emission column
//! yields the same total sequence probability as Forward, which serves as a
//! numerical cross-check.

use crate::decode::validate;
use crate::model::Model;
use mt_common::Result;
use mt_math::log10_sum_exp;
use serde::{Deserialize, Serialize};

/// The beta lattice and the total sequence log10 probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackwardLattice {
    /// `beta[t][state]`.
    pub beta: Vec<Vec<f64>>,
    pub log10_prob: f64,
}

/// Run the Backward algorithm over an observation sequence.
pub fn backward(model: &Model, observations: &[u32]) -> Result<BackwardLattice> {
    validate(model, observations)?;
    let n = model.num_states();
    let t_max = observations.len();

    let mut beta = vec![vec![0.0; n]; t_max];
    let mut terms = vec![0.0; n];
    for t in (0..t_max - 1).rev() {
        for i in 0..n as u32 {
            for j in 0..n {
                terms[j] = model.transition_log10(&[i], j as u32)
                    + model.emission_log10(j as u32, observations[t + 1])
                    + beta[t + 1][j];
            }
            beta[t][i as usize] = log10_sum_exp(&terms);
        }
    }

    let totals: Vec<f64> = (0..n as u32)
        .map(|i| {
            model.initial_log10(i) + model.emission_log10(i, observations[0]) + beta[0][i as usize]
        })
        .collect();
    let log10_prob = log10_sum_exp(&totals);
    Ok(BackwardLattice { beta, log10_prob })
}
