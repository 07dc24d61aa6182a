//! Good-Turing discounting with Katz backoff.
//!
//! Discount coefficients `disc(r)` for count buckets `r = 1..=KATZ_MAX_COUNT`
//! come from a log-log linear regression over the count-of-counts
//! histogram; larger counts stay undiscounted. The discounted mass funds the
//! backoff weight of each context, solved so that the context's total
//! outgoing probability (own-order discounted mass plus recursively
//! backed-off mass) sums to 1:
//!
//! ```text
//! bow(c) = (1 - sum_seen P(t|c)) / (1 - sum_seen P(t|c[1..]))
//! ```
//!
//! Named numerical policies, each observable through [`KatzStats`]:
//! - a discount outside (0, 1] clamps to 1.0 (`discount_clamps`);
//! - contexts seen fewer than twice at n-gram lengths above 2 are dropped
//!   (`dropped_contexts`);
//! - a non-finite or non-positive backoff weight, or a denominator
//!   underflow, stores no weight at all — the neutral identity — instead of
//!   propagating NaN (`missing_backoffs`).
//!
//! The unigram level stays undiscounted so the recursion terminates on a
//! distribution that sums to 1; reallocation happens through the weights of
//! the higher-order contexts.

use crate::counter::NgramCounter;
use crate::model::{ArpaEntry, BackoffModel, Model};
use crate::sequence::Seq;
use mt_common::Result;
use mt_math::{fit_log_log, log10_floor, pow10};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Largest count bucket that gets discounted.
pub const KATZ_MAX_COUNT: u64 = 7;

/// Denominators smaller than this are treated as underflowed.
const BOW_DENOM_EPS: f64 = 1e-12;

/// Observable counters for the named numerical policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KatzStats {
    /// Discount coefficients clamped to 1.0 for falling outside (0, 1].
    pub discount_clamps: usize,
    /// Contexts dropped for having fewer than 2 occurrences at order > 2.
    pub dropped_contexts: usize,
    /// Contexts left without a backoff weight by the non-finite guard.
    pub missing_backoffs: usize,
}

/// Discount coefficients for buckets 1..=KATZ_MAX_COUNT from a
/// count-of-counts histogram, plus the number of clamps applied.
///
/// A histogram too sparse to fit (fewer than two populated buckets) yields
/// the neutral coefficients, all 1.0.
pub fn discount_coefficients(histogram: &BTreeMap<u64, u64>) -> (Vec<f64>, usize) {
    let k = KATZ_MAX_COUNT as usize;
    let points: Vec<(f64, f64)> = histogram
        .iter()
        .map(|(&r, &n)| (r as f64, n as f64))
        .collect();
    let Some(line) = fit_log_log(&points) else {
        return (vec![1.0; k], 0);
    };

    // Smoothed bucket size off the fitted line.
    let smoothed = |r: f64| pow10(line.at(r.log10()));

    let mut discounts = Vec::with_capacity(k);
    let mut clamps = 0;
    for r in 1..=KATZ_MAX_COUNT {
        let rf = r as f64;
        // r* = (r+1) S(r+1) / S(r); disc(r) = r*/r.
        let d = (rf + 1.0) * smoothed(rf + 1.0) / (rf * smoothed(rf));
        if d.is_finite() && d > 0.0 && d <= 1.0 {
            discounts.push(d);
        } else {
            discounts.push(1.0);
            clamps += 1;
        }
    }
    (discounts, clamps)
}

pub(crate) fn estimate_with_stats(counter: &NgramCounter) -> Result<(Model, KatzStats)> {
    let floor = log10_floor();
    let dict = counter.dictionary().clone();
    let order = counter.order();
    let mut stats = KatzStats::default();

    // Per-length discount tables for n-gram lengths 2..=order+1.
    let mut discounts: HashMap<usize, Vec<f64>> = HashMap::new();
    for len in 2..=order + 1 {
        let (d, clamps) = discount_coefficients(&counter.count_of_counts(len));
        stats.discount_clamps += clamps;
        discounts.insert(len, d);
    }

    let mut ngrams: HashMap<Seq, ArpaEntry> = HashMap::new();

    // Undiscounted unigram level.
    if let Some(unigrams) = counter.context(&[]) {
        let total = unigrams.total() as f64;
        for (t, c) in unigrams.iter() {
            let p = (c as f64 / total).log10();
            ngrams.insert(Seq::from_ids(vec![t]), ArpaEntry::prob(p));
        }
    }

    // Discounted higher orders.
    for (context, counts) in counter.contexts() {
        let len = context.len() + 1;
        if len < 2 {
            continue;
        }
        if len > 2 && counts.total() < 2 {
            stats.dropped_contexts += 1;
            continue;
        }
        let total = counts.total() as f64;
        let table = &discounts[&len];
        for (t, c) in counts.iter() {
            let disc = if c <= KATZ_MAX_COUNT {
                table[(c - 1) as usize]
            } else {
                1.0
            };
            let p = (disc * c as f64 / total).log10();
            ngrams.insert(context.append(t), ArpaEntry::prob(p));
        }
    }

    // Backoff weights, shortest contexts first so lower levels are complete
    // (including their own weights) before they are read.
    for ctx_len in 1..=order {
        let contexts: Vec<Seq> = counter
            .contexts()
            .filter(|(c, _)| c.len() == ctx_len)
            .map(|(c, _)| c.clone())
            .collect();
        for context in contexts {
            let seen: Vec<u32> = counter
                .context(context.ids())
                .map(|cc| {
                    cc.iter()
                        .map(|(t, _)| t)
                        .filter(|&t| ngrams.contains_key(&context.append(t)))
                        .collect()
                })
                .unwrap_or_default();
            if seen.is_empty() {
                continue;
            }

            let own_mass: f64 = seen
                .iter()
                .map(|&t| pow10(ngrams[&context.append(t)].log10_prob))
                .sum();
            let lower_mass: f64 = seen
                .iter()
                .map(|&t| pow10(lookup(&ngrams, floor, &context.ids()[1..], t)))
                .sum();

            let num = 1.0 - own_mass;
            let den = 1.0 - lower_mass;
            let bow = num / den;
            if den.abs() < BOW_DENOM_EPS || !bow.is_finite() || bow <= 0.0 {
                stats.missing_backoffs += 1;
                warn!(
                    context = ?context.ids(),
                    num, den,
                    "backoff weight not representable; storing none"
                );
                continue;
            }
            let log_bow = bow.log10();
            ngrams
                .entry(context.clone())
                .or_insert_with(|| ArpaEntry::prob(floor))
                .log10_backoff = Some(log_bow);
        }
    }

    let initial: Vec<ArpaEntry> = super::ml_initial(counter, floor)
        .into_iter()
        .map(ArpaEntry::prob)
        .collect();

    let model = Model::Backoff(BackoffModel::new(
        order,
        dict,
        initial,
        ngrams,
        super::ml_emissions(counter),
        floor,
    ));
    Ok((model, stats))
}

/// Backoff lookup against a partially built table (same recursion the
/// finished model uses).
fn lookup(ngrams: &HashMap<Seq, ArpaEntry>, floor: f64, context: &[u32], target: u32) -> f64 {
    let mut key = context.to_vec();
    key.push(target);
    if let Some(entry) = ngrams.get(&Seq::from_ids(key)) {
        return entry.log10_prob;
    }
    if context.is_empty() {
        return floor;
    }
    let bow = ngrams
        .get(&Seq::from(context))
        .and_then(|e| e.log10_backoff)
        .unwrap_or(0.0);
    bow + lookup(ngrams, floor, &context[1..], target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mt_common::Sample;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    fn counter(order: usize) -> NgramCounter {
        // Zipf-like bigram counts (many singletons, a few repeats) so the
        // count-of-counts regression yields discounts below 1 and real
        // backoff weights get stored.
        let samples = vec![
            Ok(Sample::labeled(
                vec!["a", "a", "a", "a", "b", "c", "a", "c", "b", "a"],
                vec!["1", "1", "1", "1", "2", "3", "1", "3", "2", "1"],
            )
            .unwrap()),
            Ok(Sample::labeled(
                vec!["a", "c", "b", "b", "a"],
                vec!["1", "3", "2", "2", "1"],
            )
            .unwrap()),
        ];
        NgramCounter::from_samples(order, samples).unwrap()
    }

    fn bow_of(model: &Model, context: &[u32]) -> Option<f64> {
        let Model::Backoff(m) = model else {
            panic!("katz produces a backoff model");
        };
        m.ngram_entries()
            .find(|(key, _)| key.ids() == context)
            .and_then(|(_, e)| e.log10_backoff)
    }

    #[test]
    fn test_discounts_in_unit_interval() {
        let c = counter(1);
        let (discounts, _) = discount_coefficients(&c.count_of_counts(2));
        for d in &discounts {
            assert!(*d > 0.0 && *d <= 1.0, "discount {d} outside (0,1]");
        }
        // This histogram decays, so at least the low buckets discount.
        assert!(discounts[0] < 1.0);
    }

    #[test]
    fn test_clamps_observable() {
        // A flat histogram pushes every disc(r) above 1, clamping all of
        // them.
        let mut histogram = BTreeMap::new();
        histogram.insert(1, 3);
        histogram.insert(2, 3);
        histogram.insert(3, 3);
        let (discounts, clamps) = discount_coefficients(&histogram);
        assert!(discounts.iter().all(|&d| d == 1.0));
        assert_eq!(clamps, KATZ_MAX_COUNT as usize);
    }

    #[test]
    fn test_sparse_histogram_neutral() {
        let mut histogram = BTreeMap::new();
        histogram.insert(1, 5);
        let (discounts, clamps) = discount_coefficients(&histogram);
        assert!(discounts.iter().all(|&d| d == 1.0));
        assert_eq!(clamps, 0);
    }

    #[test]
    fn test_outgoing_mass_sums_to_one() {
        // For every context carrying a backoff weight, the total outgoing
        // probability (own discounted mass plus recursively backed-off
        // mass) sums to 1.
        for order in [1, 2] {
            let c = counter(order);
            let (model, _) = estimate_with_stats(&c).unwrap();
            let n = model.num_states() as u32;
            let mut checked = 0;
            for (context, _) in c.contexts() {
                if context.is_empty() || bow_of(&model, context.ids()).is_none() {
                    continue;
                }
                let sum: f64 = (0..n)
                    .map(|t| pow10(model.transition_log10(context.ids(), t)))
                    .sum();
                assert!(
                    approx_eq(sum, 1.0, 1e-6),
                    "context {:?} mass {sum}",
                    context.ids()
                );
                checked += 1;
            }
            assert!(checked > 0, "no backoff weights stored at order {order}");
        }
    }

    #[test]
    fn test_guarded_contexts_keep_seen_mass() {
        let c = counter(2);
        let (model, _) = estimate_with_stats(&c).unwrap();
        for (context, counts) in c.contexts() {
            if context.is_empty() || bow_of(&model, context.ids()).is_some() {
                continue;
            }
            let seen_mass: f64 = counts
                .iter()
                .map(|(t, _)| pow10(model.transition_log10(context.ids(), t)))
                .sum();
            assert!(seen_mass <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn test_top_order_carries_no_backoff() {
        let c = counter(2);
        let (model, _) = estimate_with_stats(&c).unwrap();
        let Model::Backoff(m) = &model else {
            panic!("katz produces a backoff model");
        };
        for (key, entry) in m.ngram_entries() {
            if key.len() == 3 {
                assert!(entry.log10_backoff.is_none());
            }
        }
    }

    #[test]
    fn test_rare_long_contexts_dropped() {
        let c = counter(2);
        let (model, stats) = estimate_with_stats(&c).unwrap();
        // The singleton trigram contexts of the corpus were dropped.
        assert!(stats.dropped_contexts > 0);
        // Dropped contexts still answer through the backoff recursion.
        let dict = model.dictionary();
        let a = dict.state_id("a").unwrap();
        let b = dict.state_id("b").unwrap();
        assert!(model.transition_log10(&[b, a], a).is_finite());
    }

    #[test]
    fn test_unseen_target_backs_off_to_unigram() {
        let c = counter(1);
        let (model, _) = estimate_with_stats(&c).unwrap();
        let dict = model.dictionary();
        let cc = dict.state_id("c").unwrap();
        // c->c never occurs; the query resolves through bow(c) + P(c).
        let p = model.transition_log10(&[cc], cc);
        assert!(p.is_finite());
        assert!(p > model.floor());
    }
}
