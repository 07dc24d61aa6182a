//! Viterbi algorithm (order-1, exact).
//!
//! ```text
//! delta[0][i] = initial(i) + emission(i, obs[0])
//! delta[t][j] = max_i(delta[t-1][i] + transition(i, j)) + emission(j, obs[t])
//! ```
//!
//! `psi[t][j]` records the argmax; the best path is recovered by following
//! backpointers from `argmax_i delta[T-1][i]`. O(T*N^2).

use crate::decode::{validate, DecodedPath};
use crate::model::Model;
use mt_common::Result;

/// Most probable state sequence for the observations.
pub fn viterbi(model: &Model, observations: &[u32]) -> Result<DecodedPath> {
    validate(model, observations)?;
    let n = model.num_states();
    let t_max = observations.len();

    let mut delta = vec![vec![0.0; n]; t_max];
    let mut psi = vec![vec![0u32; n]; t_max];

    for i in 0..n as u32 {
        delta[0][i as usize] =
            model.initial_log10(i) + model.emission_log10(i, observations[0]);
    }

    for t in 1..t_max {
        for j in 0..n as u32 {
            let mut best_score = f64::NEG_INFINITY;
            let mut best_prev = 0u32;
            for i in 0..n as u32 {
                let score = delta[t - 1][i as usize] + model.transition_log10(&[i], j);
                if score > best_score {
                    best_score = score;
                    best_prev = i;
                }
            }
            delta[t][j as usize] = best_score + model.emission_log10(j, observations[t]);
            psi[t][j as usize] = best_prev;
        }
    }

    let mut best_last = 0usize;
    for i in 1..n {
        if delta[t_max - 1][i] > delta[t_max - 1][best_last] {
            best_last = i;
        }
    }

    let mut states = vec![0u32; t_max];
    states[t_max - 1] = best_last as u32;
    for t in (1..t_max).rev() {
        states[t - 1] = psi[t][states[t] as usize];
    }

    Ok(DecodedPath {
        log10_prob: delta[t_max - 1][best_last],
        states,
    })
}
