//! Sparse backoff model representation.
//!
//! Stores ARPA-style entries keyed by n-gram (context plus target). A query
//! that misses at length n folds to length n-1: the stored backoff weight
//! of the context is added and the context drops its oldest state, until the
//! recursion terminates at the unigram level. Produced by Good-Turing/Katz
//! estimation.

use crate::dictionary::Dictionary;
use crate::model::ArpaEntry;
use crate::sequence::Seq;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackoffModel {
    order: usize,
    dict: Dictionary,
    /// Initial-vector entries, indexed by state id.
    initial: Vec<ArpaEntry>,
    /// N-gram (context + target, length 1..=order+1) -> entry. Entries of
    /// the top length never carry a backoff weight.
    ngrams: HashMap<Seq, ArpaEntry>,
    /// Per-state log10 emission table.
    emissions: Vec<HashMap<u32, f64>>,
    floor: f64,
}

impl BackoffModel {
    /// Assemble a backoff model from estimator-produced tables.
    pub fn new(
        order: usize,
        dict: Dictionary,
        initial: Vec<ArpaEntry>,
        ngrams: HashMap<Seq, ArpaEntry>,
        emissions: Vec<HashMap<u32, f64>>,
        floor: f64,
    ) -> Self {
        debug_assert_eq!(initial.len(), dict.state_count());
        debug_assert_eq!(emissions.len(), dict.state_count());
        debug_assert!(ngrams
            .iter()
            .all(|(k, e)| k.len() <= order || e.log10_backoff.is_none()));
        Self {
            order,
            dict,
            initial,
            ngrams,
            emissions,
            floor,
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    pub fn initial_log10(&self, state: u32) -> f64 {
        self.initial
            .get(state as usize)
            .map(|e| e.log10_prob)
            .unwrap_or(self.floor)
    }

    pub fn transition_log10(&self, context: &[u32], target: u32) -> f64 {
        let start = context.len().saturating_sub(self.order);
        self.lookup(&context[start..], target)
    }

    fn lookup(&self, context: &[u32], target: u32) -> f64 {
        let mut key = context.to_vec();
        key.push(target);
        if let Some(entry) = self.ngrams.get(&Seq::from_ids(key)) {
            return entry.log10_prob;
        }
        if context.is_empty() {
            // Unseen unigram: nothing left to fall back to.
            return self.floor;
        }
        // A missing backoff weight is the neutral identity (log10 1 = 0).
        let bow = self
            .ngrams
            .get(&Seq::from(context))
            .and_then(|e| e.log10_backoff)
            .unwrap_or(0.0);
        bow + self.lookup(&context[1..], target)
    }

    pub fn emission_log10(&self, state: u32, observation: u32) -> f64 {
        self.emissions
            .get(state as usize)
            .and_then(|row| row.get(&observation))
            .copied()
            .unwrap_or(self.floor)
    }

    /// Initial-vector entries, indexed by state id.
    pub fn initial_entries(&self) -> &[ArpaEntry] {
        &self.initial
    }

    /// Iterate over (n-gram, entry) pairs.
    pub fn ngram_entries(&self) -> impl Iterator<Item = (&Seq, &ArpaEntry)> {
        self.ngrams.iter()
    }

    /// Per-state emission tables, indexed by state id.
    pub fn emission_rows(&self) -> &[HashMap<u32, f64>] {
        &self.emissions
    }
}
