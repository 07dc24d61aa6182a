//! Smoothing estimators: counts in, model out.
//!
//! Six interchangeable strategies share the contract
//! `estimate(&NgramCounter) -> Model`. Each computes three artifacts — the
//! initial vector, the transition table, and the emission table — as log10
//! probabilities. One tagged variant per method; an unrecognized method
//! name is a configuration error, never a silent default.

mod additive;
mod interpolated;
mod katz;
mod mle;
mod reverse;
mod witten_bell;

pub use interpolated::estimate_from_split_samples;
pub use katz::{discount_coefficients, KatzStats, KATZ_MAX_COUNT};

use crate::counter::NgramCounter;
use crate::model::Model;
use mt_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// A smoothing strategy, selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Estimator {
    /// Raw relative frequencies; zero counts floor instead of -inf.
    MaximumLikelihood,
    /// Lidstone/Laplace additive smoothing with pseudo-count `delta`.
    Additive { delta: f64 },
    /// Witten-Bell discounting: recursive interpolation weighted by
    /// distinct-successor counts.
    WittenBell,
    /// Good-Turing discounting with Katz backoff weights.
    Katz,
    /// Held-out interpolation across orders 0..=k.
    Interpolated,
    /// Emission table estimated as P(state | observation).
    ReverseEmission,
}

impl Estimator {
    /// Parse a configured method name. Unknown names fail fast.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "maximum-likelihood" | "mle" => Ok(Estimator::MaximumLikelihood),
            "laplace" | "additive" => Ok(Estimator::Additive { delta: 1.0 }),
            "lidstone" => Ok(Estimator::Additive { delta: 0.01 }),
            "witten-bell" => Ok(Estimator::WittenBell),
            "katz" | "good-turing" => Ok(Estimator::Katz),
            "interpolated" => Ok(Estimator::Interpolated),
            "reverse-emission" => Ok(Estimator::ReverseEmission),
            other => Err(Error::UnknownSmoothingMethod(other.to_string())),
        }
    }

    /// Canonical method name.
    pub fn name(&self) -> &'static str {
        match self {
            Estimator::MaximumLikelihood => "maximum-likelihood",
            Estimator::Additive { .. } => "additive",
            Estimator::WittenBell => "witten-bell",
            Estimator::Katz => "katz",
            Estimator::Interpolated => "interpolated",
            Estimator::ReverseEmission => "reverse-emission",
        }
    }

    /// Turn counts into a model.
    pub fn estimate(&self, counter: &NgramCounter) -> Result<Model> {
        check_nonempty(counter)?;
        let model = match self {
            Estimator::MaximumLikelihood => mle::estimate(counter)?,
            Estimator::Additive { delta } => additive::estimate(counter, *delta)?,
            Estimator::WittenBell => witten_bell::estimate(counter)?,
            Estimator::Katz => {
                let (model, stats) = katz::estimate_with_stats(counter)?;
                debug!(
                    discount_clamps = stats.discount_clamps,
                    dropped_contexts = stats.dropped_contexts,
                    missing_backoffs = stats.missing_backoffs,
                    "katz estimation finished"
                );
                model
            }
            Estimator::Interpolated => interpolated::estimate(counter, None)?,
            Estimator::ReverseEmission => reverse::estimate(counter)?,
        };
        debug!(
            method = self.name(),
            order = counter.order(),
            states = counter.dictionary().state_count(),
            observations = counter.dictionary().observation_count(),
            "estimated model"
        );
        Ok(model)
    }
}

/// Estimate an interpolated model with mixing weights taken from a separate
/// held-out counter instead of leaving-one-out on the training counts.
pub fn estimate_interpolated_with_held_out(
    counter: &NgramCounter,
    held_out: &NgramCounter,
) -> Result<Model> {
    check_nonempty(counter)?;
    interpolated::estimate(counter, Some(held_out))
}

/// Katz estimation that also returns the numerical-policy counters
/// (discount clamps, dropped contexts, missing backoff weights).
pub fn estimate_katz_with_stats(counter: &NgramCounter) -> Result<(Model, KatzStats)> {
    check_nonempty(counter)?;
    katz::estimate_with_stats(counter)
}

fn check_nonempty(counter: &NgramCounter) -> Result<()> {
    if counter.initial_counts().total() == 0 {
        return Err(Error::EmptyTrainingData);
    }
    Ok(())
}

/// Maximum-likelihood initial vector: count/total, floored.
pub(crate) fn ml_initial(counter: &NgramCounter, floor: f64) -> Vec<f64> {
    let n = counter.dictionary().state_count();
    let total = counter.initial_counts().total() as f64;
    (0..n as u32)
        .map(|s| {
            let c = counter.initial_counts().count(s);
            if c == 0 {
                floor
            } else {
                (c as f64 / total).log10()
            }
        })
        .collect()
}

/// Maximum-likelihood emission tables: observed entries only, count/total.
pub(crate) fn ml_emissions(counter: &NgramCounter) -> Vec<HashMap<u32, f64>> {
    let n = counter.dictionary().state_count();
    (0..n as u32)
        .map(|s| {
            let mut row = HashMap::new();
            if let Some(em) = counter.emission_counts(s) {
                let total = em.total() as f64;
                for (o, c) in em.iter() {
                    row.insert(o, (c as f64 / total).log10());
                }
            }
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mt_common::Sample;

    #[test]
    fn test_from_name_known() {
        assert_eq!(
            Estimator::from_name("mle").unwrap(),
            Estimator::MaximumLikelihood
        );
        assert_eq!(
            Estimator::from_name("laplace").unwrap(),
            Estimator::Additive { delta: 1.0 }
        );
        assert_eq!(
            Estimator::from_name("lidstone").unwrap(),
            Estimator::Additive { delta: 0.01 }
        );
        assert_eq!(Estimator::from_name("katz").unwrap(), Estimator::Katz);
    }

    #[test]
    fn test_from_name_unknown_fails_fast() {
        let err = Estimator::from_name("kneser-ney").unwrap_err();
        assert!(matches!(err, Error::UnknownSmoothingMethod(_)));
        assert!(err.to_string().contains("kneser-ney"));
    }

    #[test]
    fn test_empty_counter_rejected() {
        let counter = NgramCounter::new(1).unwrap();
        let err = Estimator::MaximumLikelihood.estimate(&counter).unwrap_err();
        assert!(matches!(err, Error::EmptyTrainingData));
    }

    #[test]
    fn test_every_method_estimates() {
        let samples = vec![
            Ok(Sample::labeled(vec!["a", "b", "a"], vec!["1", "2", "1"]).unwrap()),
            Ok(Sample::labeled(vec!["b", "a"], vec!["2", "1"]).unwrap()),
        ];
        let counter = NgramCounter::from_samples(1, samples).unwrap();
        for method in [
            Estimator::MaximumLikelihood,
            Estimator::Additive { delta: 1.0 },
            Estimator::WittenBell,
            Estimator::Katz,
            Estimator::Interpolated,
            Estimator::ReverseEmission,
        ] {
            let model = method.estimate(&counter).unwrap();
            assert_eq!(model.num_states(), 2);
            assert_eq!(model.is_backoff(), method == Estimator::Katz);
        }
    }
}
