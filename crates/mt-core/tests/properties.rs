//! Property tests over randomly generated small corpora: normalization of
//! the dense estimators, Forward/Backward agreement, and Good-Turing
//! discount bounds.

use mt_core::{
    backward, estimate_katz_with_stats, forward, Estimator, NgramCounter, Sample,
};
use mt_math::pow10;
use proptest::prelude::*;

const STATES: [&str; 3] = ["det", "noun", "verb"];
const OBSERVATIONS: [&str; 5] = ["the", "dog", "barks", "cat", "sleeps"];

/// A random labeled sample over the fixed alphabets, length 1..=8.
fn sample_strategy() -> impl Strategy<Value = Sample> {
    proptest::collection::vec((0..STATES.len(), 0..OBSERVATIONS.len()), 1..=8).prop_map(|pairs| {
        let (states, observations): (Vec<&str>, Vec<&str>) = pairs
            .into_iter()
            .map(|(s, o)| (STATES[s], OBSERVATIONS[o]))
            .unzip();
        Sample::labeled(states, observations).unwrap()
    })
}

fn corpus_strategy() -> impl Strategy<Value = Vec<Sample>> {
    proptest::collection::vec(sample_strategy(), 1..=6)
}

proptest! {
    #[test]
    fn additive_rows_normalize(corpus in corpus_strategy(), order in 1usize..=2) {
        let counter =
            NgramCounter::from_samples(order, corpus.into_iter().map(Ok)).unwrap();
        let model = Estimator::Additive { delta: 1.0 }.estimate(&counter).unwrap();
        let n = model.num_states() as u32;

        let init_sum: f64 = (0..n).map(|s| pow10(model.initial_log10(s))).sum();
        prop_assert!((init_sum - 1.0).abs() < 1e-9);

        for (context, _) in counter.contexts() {
            let sum: f64 = (0..n)
                .map(|t| pow10(model.transition_log10(context.ids(), t)))
                .sum();
            prop_assert!((sum - 1.0).abs() < 1e-9, "context {:?} sums {sum}", context.ids());
        }

        let v = model.dictionary().observation_count() as u32;
        for s in 0..n {
            let sum: f64 = (0..v).map(|o| pow10(model.emission_log10(s, o))).sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn witten_bell_rows_normalize(corpus in corpus_strategy(), order in 1usize..=2) {
        let counter =
            NgramCounter::from_samples(order, corpus.into_iter().map(Ok)).unwrap();
        let model = Estimator::WittenBell.estimate(&counter).unwrap();
        let n = model.num_states() as u32;
        for (context, _) in counter.contexts() {
            let sum: f64 = (0..n)
                .map(|t| pow10(model.transition_log10(context.ids(), t)))
                .sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn interpolated_rows_normalize(corpus in corpus_strategy()) {
        let counter =
            NgramCounter::from_samples(2, corpus.into_iter().map(Ok)).unwrap();
        let model = Estimator::Interpolated.estimate(&counter).unwrap();
        let n = model.num_states() as u32;
        for (context, _) in counter.contexts() {
            let sum: f64 = (0..n)
                .map(|t| pow10(model.transition_log10(context.ids(), t)))
                .sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn forward_backward_agree(corpus in corpus_strategy(), obs in proptest::collection::vec(0..OBSERVATIONS.len(), 1..=10)) {
        let counter =
            NgramCounter::from_samples(1, corpus.into_iter().map(Ok)).unwrap();
        let model = Estimator::Additive { delta: 1.0 }.estimate(&counter).unwrap();

        let ids: Vec<u32> = obs
            .into_iter()
            .map(|o| model.dictionary().observation_id_or_unknown(OBSERVATIONS[o]))
            .collect();
        let fwd = forward(&model, &ids).unwrap();
        let bwd = backward(&model, &ids).unwrap();
        prop_assert!(
            (fwd.log10_prob - bwd.log10_prob).abs() < 1e-9,
            "forward {} vs backward {}",
            fwd.log10_prob,
            bwd.log10_prob
        );
    }

    #[test]
    fn katz_discount_policies_hold(corpus in corpus_strategy()) {
        // Order 1: every bigram keeps an exact entry (the drop rule only
        // applies above length 2), so the discounted seen mass is directly
        // observable.
        let counter =
            NgramCounter::from_samples(1, corpus.into_iter().map(Ok)).unwrap();
        let (model, stats) = estimate_katz_with_stats(&counter).unwrap();

        let eps = 1e-9;
        for (context, counts) in counter.contexts() {
            if context.is_empty() {
                continue;
            }
            let seen_mass: f64 = counts
                .iter()
                .map(|(t, _)| pow10(model.transition_log10(context.ids(), t)))
                .sum();
            prop_assert!(seen_mass <= 1.0 + eps, "context {:?} mass {seen_mass}", context.ids());
        }
        // The clamp counter stays within the bigram bucket count.
        prop_assert!(stats.discount_clamps <= 7);
        prop_assert_eq!(stats.dropped_contexts, 0);
    }
}
