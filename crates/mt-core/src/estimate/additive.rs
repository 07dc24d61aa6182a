//! Additive (Lidstone/Laplace) smoothing.
//!
//! `(count + delta) / (total + delta * |alphabet|)` for a configurable
//! pseudo-count. Rows normalize by construction, with no separate
//! renormalization pass. Emission rows are complete over the observation
//! vocabulary, so the unseen-observation mass lands on the reserved UNKNOWN
//! symbol (and every other unseen pair) up front.

use crate::counter::NgramCounter;
use crate::model::{DenseModel, Model};
use mt_common::Result;
use mt_math::log10_floor;
use std::collections::HashMap;

pub(crate) fn estimate(counter: &NgramCounter, delta: f64) -> Result<Model> {
    let dict = counter.dictionary().clone();
    let n = dict.state_count();
    let v = dict.observation_count();

    let init_total = counter.initial_counts().total() as f64;
    let init_denom = init_total + delta * n as f64;
    let initial: Vec<f64> = (0..n as u32)
        .map(|s| {
            let c = counter.initial_counts().count(s) as f64;
            ((c + delta) / init_denom).log10()
        })
        .collect();

    let mut transitions = HashMap::new();
    for (context, counts) in counter.contexts() {
        let denom = counts.total() as f64 + delta * n as f64;
        let row: Vec<f64> = (0..n as u32)
            .map(|t| ((counts.count(t) as f64 + delta) / denom).log10())
            .collect();
        transitions.insert(context.clone(), row);
    }

    let emissions: Vec<HashMap<u32, f64>> = (0..n as u32)
        .map(|s| {
            let total = counter
                .emission_counts(s)
                .map(|em| em.total())
                .unwrap_or(0) as f64;
            let denom = total + delta * v as f64;
            (0..v as u32)
                .map(|o| {
                    let c = counter
                        .emission_counts(s)
                        .map(|em| em.count(o))
                        .unwrap_or(0) as f64;
                    (o, ((c + delta) / denom).log10())
                })
                .collect()
        })
        .collect();

    Ok(Model::Dense(DenseModel::new(
        counter.order(),
        dict,
        initial,
        transitions,
        emissions,
        log10_floor(),
    )))
}
