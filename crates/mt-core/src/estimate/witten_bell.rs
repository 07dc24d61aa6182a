//! Witten-Bell discounting.
//!
//! For each context, interpolates the maximum-likelihood estimate with the
//! backed-off Witten-Bell estimate of the shortened context, weighted by
//! `lambda = total / (distinct_successors + total)`: contexts with many
//! distinct successors keep less of their own mass. The recursion bottoms
//! out at the unigram level, interpolated with the uniform distribution.

use crate::counter::NgramCounter;
use crate::model::{DenseModel, Model};
use mt_common::Result;
use mt_math::log10_floor;
use std::collections::HashMap;

pub(crate) fn estimate(counter: &NgramCounter) -> Result<Model> {
    let dict = counter.dictionary().clone();
    let n = dict.state_count();
    let v = dict.observation_count();

    let mut transitions = HashMap::new();
    for (context, _) in counter.contexts() {
        let row: Vec<f64> = (0..n as u32)
            .map(|t| wb_transition(counter, n, context.ids(), t).log10())
            .collect();
        transitions.insert(context.clone(), row);
    }

    let init = counter.initial_counts();
    let init_lambda = lambda(init.distinct(), init.total());
    let initial: Vec<f64> = (0..n as u32)
        .map(|s| {
            let ml = init.count(s) as f64 / init.total() as f64;
            (init_lambda * ml + (1.0 - init_lambda) / n as f64).log10()
        })
        .collect();

    let emissions: Vec<HashMap<u32, f64>> = (0..n as u32)
        .map(|s| match counter.emission_counts(s) {
            Some(em) => {
                let lam = lambda(em.distinct(), em.total());
                (0..v as u32)
                    .map(|o| {
                        let ml = em.count(o) as f64 / em.total() as f64;
                        (o, (lam * ml + (1.0 - lam) / v as f64).log10())
                    })
                    .collect()
            }
            None => (0..v as u32).map(|o| (o, (1.0 / v as f64).log10())).collect(),
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

fn lambda(distinct: usize, total: u64) -> f64 {
    total as f64 / (distinct as f64 + total as f64)
}

/// Linear-domain Witten-Bell transition probability.
fn wb_transition(counter: &NgramCounter, n: usize, context: &[u32], target: u32) -> f64 {
    match counter.context(context) {
        Some(counts) => {
            let lam = lambda(counts.distinct(), counts.total());
            let ml = counts.count(target) as f64 / counts.total() as f64;
            let lower = if context.is_empty() {
                1.0 / n as f64
            } else {
                wb_transition(counter, n, &context[1..], target)
            };
            lam * ml + (1.0 - lam) * lower
        }
        None if context.is_empty() => 1.0 / n as f64,
        None => wb_transition(counter, n, &context[1..], target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mt_common::Sample;
    use mt_math::pow10;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    fn counter(order: usize) -> NgramCounter {
        let samples = vec![
            Ok(Sample::labeled(vec!["a", "b", "a", "b"], vec!["1", "2", "1", "3"]).unwrap()),
            Ok(Sample::labeled(vec!["a", "a", "b"], vec!["1", "1", "2"]).unwrap()),
        ];
        NgramCounter::from_samples(order, samples).unwrap()
    }

    #[test]
    fn test_lambda_weighting() {
        // 2 distinct successors over 4 total: lambda = 4/6.
        assert!(approx_eq(lambda(2, 4), 4.0 / 6.0, 1e-12));
        // Many distinct successors pull lambda down.
        assert!(lambda(4, 4) < lambda(1, 4));
    }

    #[test]
    fn test_rows_normalize() {
        for order in [1, 2] {
            let c = counter(order);
            let m = estimate(&c).unwrap();
            let n = m.num_states() as u32;
            for (context, _) in c.contexts() {
                let sum: f64 = (0..n)
                    .map(|t| pow10(m.transition_log10(context.ids(), t)))
                    .sum();
                assert!(
                    approx_eq(sum, 1.0, 1e-9),
                    "context {:?} sums to {sum}",
                    context.ids()
                );
            }
        }
    }

    #[test]
    fn test_emissions_normalize() {
        let c = counter(1);
        let m = estimate(&c).unwrap();
        let v = m.dictionary().observation_count() as u32;
        for s in 0..m.num_states() as u32 {
            let sum: f64 = (0..v).map(|o| pow10(m.emission_log10(s, o))).sum();
            assert!(approx_eq(sum, 1.0, 1e-9));
        }
    }

    #[test]
    fn test_unseen_target_backs_off() {
        let c = counter(2);
        let m = estimate(&c).unwrap();
        let dict = m.dictionary();
        let a = dict.state_id("a").unwrap();
        let b = dict.state_id("b").unwrap();
        // (b,a) was observed but never followed by a. The backed-off
        // estimate still gives that continuation real mass.
        assert_eq!(c.context(&[b, a]).unwrap().count(a), 0);
        let p = m.transition_log10(&[b, a], a);
        assert!(p > -10.0);
        assert!(pow10(p) > 0.0);
    }

    #[test]
    fn test_initial_smoothing() {
        let c = counter(1);
        let m = estimate(&c).unwrap();
        let b = m.dictionary().state_id("b").unwrap();
        // "b" never starts a sentence but gets interpolated uniform mass.
        assert!(pow10(m.initial_log10(b)) > 0.0);
        let sum: f64 = (0..m.num_states() as u32)
            .map(|s| pow10(m.initial_log10(s)))
            .sum();
        assert!(approx_eq(sum, 1.0, 1e-9));
    }
}
