//! Beam search (order-1, approximate).
//!
//! Same frontier mechanics as k-best but restricted to order-1 transitions,
//! used as a faster alternative to exact Viterbi for large state spaces.
//! Returns the single best surviving sequence; a beam at least as wide as
//! the state count makes it exact.

use crate::decode::{validate, DecodedPath};
use crate::model::Model;
use mt_common::{Error, Result};
use std::cmp::Ordering;

/// Best state sequence found within the beam.
pub fn beam_search(model: &Model, observations: &[u32], width: usize) -> Result<DecodedPath> {
    validate(model, observations)?;
    if width == 0 {
        return Err(Error::InvalidSearchWidth { width: 0 });
    }
    let n = model.num_states() as u32;

    let mut frontier: Vec<DecodedPath> = (0..n)
        .map(|i| DecodedPath {
            log10_prob: model.initial_log10(i) + model.emission_log10(i, observations[0]),
            states: vec![i],
        })
        .collect();
    truncate(&mut frontier, width);

    for t in 1..observations.len() {
        let mut expanded = Vec::with_capacity(frontier.len() * n as usize);
        for hyp in &frontier {
            // Every hypothesis in the frontier has length t.
            let last = hyp.states[t - 1];
            for j in 0..n {
                let log10_prob = hyp.log10_prob
                    + model.transition_log10(&[last], j)
                    + model.emission_log10(j, observations[t]);
                let mut states = hyp.states.clone();
                states.push(j);
                expanded.push(DecodedPath { states, log10_prob });
            }
        }
        truncate(&mut expanded, width);
        frontier = expanded;
    }

    Ok(frontier.swap_remove(0))
}

fn truncate(frontier: &mut Vec<DecodedPath>, width: usize) {
    frontier.sort_by(|a, b| {
        b.log10_prob
            .partial_cmp(&a.log10_prob)
            .unwrap_or(Ordering::Equal)
    });
    frontier.truncate(width);
}
