//! Forward algorithm.
//!
//! `alpha[t][j]` is the log10 probability of emitting the first t+1
//! observations and being in state j at time t:
//!
//! ```text
//! alpha[0][i] = initial(i) + emission(i, obs[0])
//! alpha[t][j] = lse_i(alpha[t-1][i] + transition(i, j)) + emission(j, obs[t])
//! ```
//!
//! The total sequence probability is `lse_i(alpha[T-1][i])`.

use crate::decode::validate;
use crate::model::Model;
use mt_common::Result;
use mt_math::log10_sum_exp;
use serde::{Deserialize, Serialize};

/// The alpha lattice and the total sequence log10 probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardLattice {
    /// `alpha[t][state]`.
    pub alpha: Vec<Vec<f64>>,
    pub log10_prob: f64,
}

/// Run the Forward algorithm over an observation sequence.
pub fn forward(model: &Model, observations: &[u32]) -> Result<ForwardLattice> {
    validate(model, observations)?;
    let n = model.num_states();
    let t_max = observations.len();

    let mut alpha = vec![vec![0.0; n]; t_max];
    for i in 0..n as u32 {
        alpha[0][i as usize] =
            model.initial_log10(i) + model.emission_log10(i, observations[0]);
    }

    let mut terms = vec![0.0; n];
    for t in 1..t_max {
        for j in 0..n as u32 {
            for i in 0..n {
                terms[i] = alpha[t - 1][i] + model.transition_log10(&[i as u32], j);
            }
            alpha[t][j as usize] =
                log10_sum_exp(&terms) + model.emission_log10(j, observations[t]);
        }
    }

    let log10_prob = log10_sum_exp(&alpha[t_max - 1]);
    Ok(ForwardLattice { alpha, log10_prob })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::testutil::{obs_ids, reference_model};
    use crate::decode::score_path;
    use mt_common::Error;
    use mt_math::log10_sum_exp;

    #[test]
    fn test_empty_sequence_rejected() {
        let m = reference_model(1);
        assert!(matches!(
            forward(&m, &[]),
            Err(Error::EmptyObservationSequence)
        ));
    }

    #[test]
    fn test_single_observation() {
        let m = reference_model(1);
        let obs = obs_ids(&m, &["1"]);
        let lattice = forward(&m, &obs).unwrap();
        assert_eq!(lattice.alpha.len(), 1);
        // Total = lse over initial+emission terms.
        let expected = log10_sum_exp(
            &(0..m.num_states() as u32)
                .map(|i| m.initial_log10(i) + m.emission_log10(i, obs[0]))
                .collect::<Vec<_>>(),
        );
        assert!((lattice.log10_prob - expected).abs() < 1e-12);
    }

    #[test]
    fn test_total_matches_brute_force_path_sum() {
        let m = reference_model(1);
        let obs = obs_ids(&m, &["1", "2", "3"]);
        let lattice = forward(&m, &obs).unwrap();

        // Enumerate all 8 explicit paths and sum their probabilities.
        let n = m.num_states() as u32;
        let mut path_scores = Vec::new();
        for s0 in 0..n {
            for s1 in 0..n {
                for s2 in 0..n {
                    path_scores.push(score_path(&m, &[s0, s1, s2], &obs).unwrap());
                }
            }
        }
        let brute = log10_sum_exp(&path_scores);
        assert!(
            (lattice.log10_prob - brute).abs() < 1e-12,
            "forward {} vs brute {}",
            lattice.log10_prob,
            brute
        );
    }
}
