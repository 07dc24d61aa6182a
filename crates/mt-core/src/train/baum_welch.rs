//! Baum-Welch expectation-maximization.
//!
//! Each iteration runs Forward and Backward over the current model, computes
//! the posterior state occupancies (`gamma`) and transition occupancies
//! (`xi`), and re-estimates the initial vector, transition table, and
//! emission table from their normalized sums. A new model instance is built
//! every iteration — the previous one is never mutated, so decoders holding
//! it keep a consistent snapshot.
//!
//! Re-estimation consumes any model through order-1 queries and emits an
//! order-1 dense model (the gamma/xi recursions are defined over state
//! pairs). Reaching the iteration cap is a soft termination, not an error.

use crate::decode::{backward, forward};
use crate::dictionary::Dictionary;
use crate::model::{DenseModel, Model};
use crate::sequence::Seq;
use mt_common::{Error, Result};
use mt_math::{log10_floor, pow10};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

/// Additive floor applied to every re-estimated probability before row
/// renormalization, so no parameter locks at zero between iterations.
pub const REESTIMATION_FLOOR: f64 = 0.001;

/// Convergence and flooring knobs for EM.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Iteration cap; reaching it returns the last model (soft stop).
    pub max_iterations: usize,
    /// Stop once the total log10-likelihood changes less than this between
    /// iterations.
    pub convergence_delta: f64,
    /// Additive probability floor used during re-estimation.
    pub reestimation_floor: f64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 30,
            convergence_delta: 0.01,
            reestimation_floor: REESTIMATION_FLOOR,
        }
    }
}

impl TrainerConfig {
    fn validate(&self) -> Result<()> {
        if self.max_iterations < 1 {
            return Err(Error::InvalidTrainerConfig(
                "max_iterations must be at least 1".into(),
            ));
        }
        if !self.convergence_delta.is_finite() || self.convergence_delta <= 0.0 {
            return Err(Error::InvalidTrainerConfig(format!(
                "convergence_delta must be positive and finite, got {}",
                self.convergence_delta
            )));
        }
        if !self.reestimation_floor.is_finite() || self.reestimation_floor < 0.0 {
            return Err(Error::InvalidTrainerConfig(format!(
                "reestimation_floor must be non-negative and finite, got {}",
                self.reestimation_floor
            )));
        }
        Ok(())
    }
}

/// Outcome of one refinement run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Re-estimation steps performed.
    pub iterations: usize,
    /// Total log10-likelihood of the starting model.
    pub initial_log10_likelihood: f64,
    /// Total log10-likelihood of the returned model.
    pub final_log10_likelihood: f64,
    /// Whether the likelihood delta fell under the threshold before the
    /// iteration cap.
    pub converged: bool,
}

/// Baum-Welch trainer with validated configuration.
#[derive(Debug, Clone)]
pub struct BaumWelchTrainer {
    config: TrainerConfig,
}

impl BaumWelchTrainer {
    /// Create a trainer, rejecting invalid configuration.
    pub fn new(config: TrainerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Trainer with the default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: TrainerConfig::default(),
        }
    }

    /// Refine a model against an unlabeled observation sequence.
    pub fn refine(&self, model: &Model, observations: &[u32]) -> Result<(Model, TrainingReport)> {
        let mut current = model.clone();
        let mut initial_ll = f64::NAN;
        let mut prev_ll: Option<f64> = None;
        let mut iterations = 0;
        let mut converged = false;

        for iteration in 1..=self.config.max_iterations {
            let fwd = forward(&current, observations)?;
            let bwd = backward(&current, observations)?;
            let ll = fwd.log10_prob;
            trace!(iteration, log10_likelihood = ll, "em iteration");

            if prev_ll.is_none() {
                initial_ll = ll;
            }
            if let Some(prev) = prev_ll {
                if (ll - prev).abs() < self.config.convergence_delta {
                    converged = true;
                    break;
                }
            }
            prev_ll = Some(ll);

            current = self.reestimate(&current, observations, &fwd.alpha, &bwd.beta, ll);
            iterations = iteration;
        }

        let final_ll = forward(&current, observations)?.log10_prob;
        Ok((
            current,
            TrainingReport {
                iterations,
                initial_log10_likelihood: initial_ll,
                final_log10_likelihood: final_ll,
                converged,
            },
        ))
    }

    /// Build the next model from the posterior sums of one iteration.
    fn reestimate(
        &self,
        model: &Model,
        observations: &[u32],
        alpha: &[Vec<f64>],
        beta: &[Vec<f64>],
        log10_total: f64,
    ) -> Model {
        let dict = model.dictionary().clone();
        let n = dict.state_count();
        let v = dict.observation_count();
        let t_max = observations.len();
        let floor = self.config.reestimation_floor;

        // gamma[t][i]: posterior state occupancy, linear domain.
        let mut gamma = vec![vec![0.0; n]; t_max];
        for t in 0..t_max {
            for i in 0..n {
                gamma[t][i] = pow10(alpha[t][i] + beta[t][i] - log10_total);
            }
        }

        // xi sums over t for each (i, j): posterior transition occupancy.
        let mut xi_sum = vec![vec![0.0; n]; n];
        for t in 0..t_max.saturating_sub(1) {
            for (i, xi_row) in xi_sum.iter_mut().enumerate() {
                for (j, cell) in xi_row.iter_mut().enumerate() {
                    *cell += pow10(
                        alpha[t][i]
                            + model.transition_log10(&[i as u32], j as u32)
                            + model.emission_log10(j as u32, observations[t + 1])
                            + beta[t + 1][j]
                            - log10_total,
                    );
                }
            }
        }

        let initial = normalize_floored(&gamma[0], floor);

        let mut transitions = HashMap::new();
        for (i, xi_row) in xi_sum.iter().enumerate() {
            transitions.insert(Seq::from_ids(vec![i as u32]), normalize_floored(xi_row, floor));
        }

        let mut emissions: Vec<HashMap<u32, f64>> = Vec::with_capacity(n);
        for i in 0..n {
            let mut num = vec![0.0; v];
            for t in 0..t_max {
                num[observations[t] as usize] += gamma[t][i];
            }
            let row = normalize_floored(&num, floor);
            emissions.push((0..v as u32).map(|o| (o, row[o as usize])).collect());
        }

        Model::Dense(DenseModel::new(
            1,
            dict,
            initial,
            transitions,
            emissions,
            log10_floor(),
        ))
    }
}

/// Floor each weight, normalize to sum 1, return log10 values.
fn normalize_floored(weights: &[f64], floor: f64) -> Vec<f64> {
    let total: f64 = weights.iter().map(|w| w + floor).sum();
    weights
        .iter()
        .map(|w| {
            if total > 0.0 {
                ((w + floor) / total).log10()
            } else {
                // All-zero row with a zero floor: fall back to uniform.
                (1.0 / weights.len() as f64).log10()
            }
        })
        .collect()
}

/// Seeded random order-1 model: each row of the initial vector, transition
/// matrix, and emission matrix is drawn uniformly and renormalized to 1.
pub fn random_model(dict: &Dictionary, seed: u64) -> Model {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = dict.state_count();
    let v = dict.observation_count();

    let mut random_row = |len: usize| -> Vec<f64> {
        let raw: Vec<f64> = (0..len).map(|_| rng.random::<f64>()).collect();
        let total: f64 = raw.iter().sum();
        raw.iter().map(|r| (r / total).log10()).collect()
    };

    let initial = random_row(n);
    let mut transitions = HashMap::new();
    for i in 0..n as u32 {
        transitions.insert(Seq::from_ids(vec![i]), random_row(n));
    }
    let emissions: Vec<HashMap<u32, f64>> = (0..n)
        .map(|_| {
            let row = random_row(v);
            (0..v as u32).map(|o| (o, row[o as usize])).collect()
        })
        .collect();

    Model::Dense(DenseModel::new(
        1,
        dict.clone(),
        initial,
        transitions,
        emissions,
        log10_floor(),
    ))
}
