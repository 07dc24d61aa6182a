//! Reverse-emission estimation.
//!
//! Emission probabilities are estimated as P(state | observation), inverted
//! via Bayes-style counting over the per-observation state tallies, rather
//! than the usual P(observation | state). The table is indexed primarily by
//! observation, which is why this is a separate estimator and not a flag.
//! Transitions and the initial vector are plain maximum likelihood.

use crate::counter::NgramCounter;
use crate::model::{DenseModel, Model};
use mt_common::Result;
use mt_math::log10_floor;
use std::collections::HashMap;

pub(crate) fn estimate(counter: &NgramCounter) -> Result<Model> {
    let floor = log10_floor();
    let dict = counter.dictionary().clone();
    let n = dict.state_count();

    let mut transitions = HashMap::new();
    for (context, counts) in counter.contexts() {
        let total = counts.total() as f64;
        let row: Vec<f64> = (0..n as u32)
            .map(|t| {
                let c = counts.count(t);
                if c == 0 {
                    floor
                } else {
                    (c as f64 / total).log10()
                }
            })
            .collect();
        transitions.insert(context.clone(), row);
    }

    // State priors for the unknown bucket: an observation never seen in
    // training has no inverted distribution, so it falls back to P(state).
    let unigrams = counter.context(&[]);
    let unigram_total = unigrams.map(|u| u.total()).unwrap_or(0) as f64;

    let mut emissions: Vec<HashMap<u32, f64>> = vec![HashMap::new(); n];
    for (state, row) in emissions.iter_mut().enumerate() {
        let state = state as u32;
        for o in 0..dict.observation_count() as u32 {
            if let Some(rev) = counter.reverse_counts(o) {
                let c = rev.count(state);
                if c > 0 {
                    row.insert(o, (c as f64 / rev.total() as f64).log10());
                }
            }
        }
        let prior = unigrams.map(|u| u.count(state)).unwrap_or(0) as f64;
        let unk = if prior > 0.0 && unigram_total > 0.0 {
            (prior / unigram_total).log10()
        } else {
            floor
        };
        row.insert(dict.unknown_id(), unk);
    }

    Ok(Model::Dense(DenseModel::new(
        counter.order(),
        dict,
        super::ml_initial(counter, floor),
        transitions,
        emissions,
        floor,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mt_common::Sample;
    use mt_math::pow10;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    fn model() -> Model {
        let samples = vec![
            Ok(Sample::labeled(vec!["a", "b", "a"], vec!["1", "2", "1"]).unwrap()),
            Ok(Sample::labeled(vec!["b", "a"], vec!["1", "1"]).unwrap()),
        ];
        let counter = NgramCounter::from_samples(1, samples).unwrap();
        estimate(&counter).unwrap()
    }

    #[test]
    fn test_inverted_probabilities() {
        let m = model();
        let dict = m.dictionary();
        let a = dict.state_id("a").unwrap();
        let b = dict.state_id("b").unwrap();
        let one = dict.observation_id("1").unwrap();
        // "1" was emitted 4 times: 3 by a, 1 by b.
        assert!(approx_eq(m.emission_log10(a, one), 0.75f64.log10(), 1e-12));
        assert!(approx_eq(m.emission_log10(b, one), 0.25f64.log10(), 1e-12));
    }

    #[test]
    fn test_normalizes_over_states_per_observation() {
        let m = model();
        let dict = m.dictionary();
        for sym in ["1", "2"] {
            let o = dict.observation_id(sym).unwrap();
            let sum: f64 = (0..m.num_states() as u32)
                .map(|s| pow10(m.emission_log10(s, o)))
                .sum();
            assert!(approx_eq(sum, 1.0, 1e-9), "observation {sym} sums {sum}");
        }
    }

    #[test]
    fn test_unknown_falls_back_to_state_prior() {
        let m = model();
        let dict = m.dictionary();
        let a = dict.state_id("a").unwrap();
        // State unigram prior: a occurs 3 of 5 times.
        assert!(approx_eq(
            m.emission_log10_sym("a", "never-seen"),
            0.6f64.log10(),
            1e-12
        ));
        assert!(approx_eq(
            m.emission_log10(a, dict.unknown_id()),
            0.6f64.log10(),
            1e-12
        ));
    }
}
