//! Maximum-likelihood estimation.
//!
//! Raw relative frequencies `count/total`. Zero counts map to the floor
//! value (log10 of the smallest representable probability) rather than
//! -inf, keeping downstream log-domain sums finite.

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

    Ok(Model::Dense(DenseModel::new(
        counter.order(),
        dict,
        super::ml_initial(counter, floor),
        transitions,
        super::ml_emissions(counter),
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
            Ok(Sample::labeled(vec!["a", "a"], vec!["1", "2"]).unwrap()),
        ];
        let counter = NgramCounter::from_samples(1, samples).unwrap();
        estimate(&counter).unwrap()
    }

    #[test]
    fn test_relative_frequencies() {
        let m = model();
        let dict = m.dictionary();
        let a = dict.state_id("a").unwrap();
        let b = dict.state_id("b").unwrap();

        // Both samples start with "a".
        assert!(approx_eq(m.initial_log10(a), 0.0, 1e-12));
        // After "a": one "b", one "a" (of two continuations).
        assert!(approx_eq(m.transition_log10(&[a], b), 0.5f64.log10(), 1e-12));
    }

    #[test]
    fn test_zero_count_floors() {
        let m = model();
        let dict = m.dictionary();
        let b = dict.state_id("b").unwrap();
        // "b" never starts a sample: floored, not -inf.
        assert!(m.initial_log10(b).is_finite());
        assert!(m.initial_log10(b) < -300.0);
    }

    #[test]
    fn test_rows_normalize() {
        let m = model();
        let n = m.num_states() as u32;
        let dict = m.dictionary();
        let a = dict.state_id("a").unwrap();
        let sum: f64 = (0..n).map(|t| pow10(m.transition_log10(&[a], t))).sum();
        assert!(approx_eq(sum, 1.0, 1e-9));
    }
}
