//! Model representations behind one query contract.
//!
//! Two shapes share the contract: a dense/map-based model where every
//! observed context carries a complete target distribution (misses return a
//! floor value), and a sparse backoff model holding ARPA-style entries that
//! recursively fall back to shorter contexts. The variant is chosen at
//! construction time by the estimator that produced the tables; a model is
//! read-only afterward.
//!
//! All probabilities are log10. Unknown observations at emission time route
//! to the reserved UNKNOWN bucket, never an error.

mod backoff;
mod dense;

pub use backoff::BackoffModel;
pub use dense::DenseModel;

use crate::dictionary::Dictionary;
use serde::{Deserialize, Serialize};

/// An ARPA-style probability entry: a log10 probability plus an optional
/// log10 backoff weight.
///
/// The backoff weight is present only for sequences shorter than the
/// model's top n-gram length; top-order entries never carry one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArpaEntry {
    pub log10_prob: f64,
    pub log10_backoff: Option<f64>,
}

impl ArpaEntry {
    /// Entry with no backoff weight.
    pub fn prob(log10_prob: f64) -> Self {
        Self {
            log10_prob,
            log10_backoff: None,
        }
    }

    /// Entry with a backoff weight.
    pub fn with_backoff(log10_prob: f64, log10_backoff: f64) -> Self {
        Self {
            log10_prob,
            log10_backoff: Some(log10_backoff),
        }
    }
}

/// A trained HMM: either dense or backoff-based, queried uniformly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Model {
    Dense(DenseModel),
    Backoff(BackoffModel),
}

impl Model {
    /// The Markov order (transition context length at the top level).
    pub fn order(&self) -> usize {
        match self {
            Model::Dense(m) => m.order(),
            Model::Backoff(m) => m.order(),
        }
    }

    /// The dictionary this model's ids refer to.
    pub fn dictionary(&self) -> &Dictionary {
        match self {
            Model::Dense(m) => m.dictionary(),
            Model::Backoff(m) => m.dictionary(),
        }
    }

    /// Number of states.
    pub fn num_states(&self) -> usize {
        self.dictionary().state_count()
    }

    /// Whether this is the sparse backoff representation.
    pub fn is_backoff(&self) -> bool {
        matches!(self, Model::Backoff(_))
    }

    /// log10 P(initial state).
    pub fn initial_log10(&self, state: u32) -> f64 {
        match self {
            Model::Dense(m) => m.initial_log10(state),
            Model::Backoff(m) => m.initial_log10(state),
        }
    }

    /// log10 P(target | context). Contexts longer than the model order are
    /// truncated to their most recent `order` states.
    pub fn transition_log10(&self, context: &[u32], target: u32) -> f64 {
        match self {
            Model::Dense(m) => m.transition_log10(context, target),
            Model::Backoff(m) => m.transition_log10(context, target),
        }
    }

    /// log10 P(observation | state).
    pub fn emission_log10(&self, state: u32, observation: u32) -> f64 {
        match self {
            Model::Dense(m) => m.emission_log10(state, observation),
            Model::Backoff(m) => m.emission_log10(state, observation),
        }
    }

    /// Symbolic overload of [`Model::initial_log10`]; an unregistered state
    /// returns the floor value.
    pub fn initial_log10_sym(&self, state: &str) -> f64 {
        match self.dictionary().state_id(state) {
            Some(id) => self.initial_log10(id),
            None => self.floor(),
        }
    }

    /// Symbolic overload of [`Model::transition_log10`]; unregistered
    /// states return the floor value.
    pub fn transition_log10_sym(&self, context: &[&str], target: &str) -> f64 {
        let dict = self.dictionary();
        let Some(target_id) = dict.state_id(target) else {
            return self.floor();
        };
        let mut ids = Vec::with_capacity(context.len());
        for sym in context {
            match dict.state_id(sym) {
                Some(id) => ids.push(id),
                None => return self.floor(),
            }
        }
        self.transition_log10(&ids, target_id)
    }

    /// Symbolic overload of [`Model::emission_log10`]; an unseen
    /// observation symbol maps to the reserved UNKNOWN bucket.
    pub fn emission_log10_sym(&self, state: &str, observation: &str) -> f64 {
        let dict = self.dictionary();
        let Some(state_id) = dict.state_id(state) else {
            return self.floor();
        };
        let obs_id = dict.observation_id_or_unknown(observation);
        self.emission_log10(state_id, obs_id)
    }

    /// The floor value this model substitutes for missing entries.
    pub fn floor(&self) -> f64 {
        match self {
            Model::Dense(m) => m.floor(),
            Model::Backoff(m) => m.floor(),
        }
    }
}
