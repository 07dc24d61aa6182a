//! Held-out interpolation across orders.
//!
//! Blends maximum-likelihood estimates from every context length 0..=k,
//! weighted by per-order mixing weights. Each top-order n-gram in the
//! weight source votes its count for whichever order predicts it best;
//! with a separate held-out counter the votes use training-data relative
//! frequencies directly, otherwise the training counts vote on themselves
//! with the n-gram's own occurrence removed (leaving-one-out).

use crate::counter::NgramCounter;
use crate::model::{DenseModel, Model};
use mt_common::Result;
use mt_math::log10_floor;
use std::collections::HashMap;
use tracing::debug;

pub(crate) fn estimate(counter: &NgramCounter, held_out: Option<&NgramCounter>) -> Result<Model> {
    let floor = log10_floor();
    let dict = counter.dictionary().clone();
    let n = dict.state_count();
    let order = counter.order();

    let lambdas = mixing_weights(counter, held_out);
    debug!(?lambdas, order, "interpolation weights");

    let mut transitions = HashMap::new();
    for (context, own_counts) in counter.contexts() {
        let available = context.len();
        // Weights for orders the context cannot supply are renormalized
        // away; a context whose available orders carry no weight at all
        // falls back to its own maximum-likelihood row.
        let scale: f64 = lambdas[..=available].iter().sum();
        let row: Vec<f64> = (0..n as u32)
            .map(|t| {
                let p = if scale > 0.0 {
                    let mut blended = 0.0;
                    for (j, &lambda) in lambdas.iter().enumerate().take(available + 1) {
                        let sub = &context.ids()[available - j..];
                        if let Some(counts) = counter.context(sub) {
                            if counts.total() > 0 {
                                blended +=
                                    lambda * counts.count(t) as f64 / counts.total() as f64;
                            }
                        }
                    }
                    blended / scale
                } else {
                    own_counts.count(t) as f64 / own_counts.total() as f64
                };
                if p <= 0.0 {
                    floor
                } else {
                    p.log10()
                }
            })
            .collect();
        transitions.insert(context.clone(), row);
    }

    Ok(Model::Dense(DenseModel::new(
        order,
        dict,
        super::ml_initial(counter, floor),
        transitions,
        super::ml_emissions(counter),
        floor,
    )))
}

/// Per-order mixing weights over context lengths 0..=order, normalized to
/// sum to 1. Uniform when the corpus is too small to cast any votes.
fn mixing_weights(counter: &NgramCounter, held_out: Option<&NgramCounter>) -> Vec<f64> {
    let order = counter.order();
    let weight_src = held_out.unwrap_or(counter);
    let leave_one_out = held_out.is_none();

    let mut lambdas = vec![0.0; order + 1];
    for (context, counts) in weight_src.contexts() {
        if context.len() != order {
            continue;
        }
        for (target, c) in counts.iter() {
            let mut best_j = 0;
            let mut best_value = -1.0;
            for j in 0..=order {
                let sub = &context.ids()[order - j..];
                let Some(train) = counter.context(sub) else {
                    continue;
                };
                let ngram_count = train.count(target) as f64;
                let context_total = train.total() as f64;
                let value = if leave_one_out {
                    if context_total <= 1.0 {
                        0.0
                    } else {
                        (ngram_count - 1.0) / (context_total - 1.0)
                    }
                } else if context_total > 0.0 {
                    ngram_count / context_total
                } else {
                    0.0
                };
                if value > best_value {
                    best_value = value;
                    best_j = j;
                }
            }
            lambdas[best_j] += c as f64;
        }
    }

    let total: f64 = lambdas.iter().sum();
    if total <= 0.0 {
        return vec![1.0 / (order + 1) as f64; order + 1];
    }
    for lambda in &mut lambdas {
        *lambda /= total;
    }
    lambdas
}

/// Convenience trainer: split the samples into an estimation set and a
/// held-out set (every tenth sample), count both, and estimate with the
/// held-out weights. Falls back to leaving-one-out when the split leaves
/// either side empty.
pub fn estimate_from_split_samples(
    order: usize,
    samples: Vec<mt_common::Sample>,
) -> Result<Model> {
    let mut estimation = Vec::new();
    let mut held_out = Vec::new();
    for (i, sample) in samples.into_iter().enumerate() {
        if (i + 1) % 10 == 0 {
            held_out.push(Ok(sample));
        } else {
            estimation.push(Ok(sample));
        }
    }
    if estimation.is_empty() || held_out.is_empty() {
        let all: Vec<_> = estimation.into_iter().chain(held_out).collect();
        let counter = NgramCounter::from_samples(order, all)?;
        super::check_nonempty(&counter)?;
        return estimate(&counter, None);
    }
    let counter = NgramCounter::from_samples(order, estimation)?;
    super::check_nonempty(&counter)?;
    let held_out_counter = NgramCounter::from_samples(order, held_out)?;
    estimate(&counter, Some(&held_out_counter))
}
