//! Dense/map-based model representation.
//!
//! Every observed context carries a complete log10 distribution over all
//! target states; queries for contexts the training data never produced
//! return the floor value. Used by the maximum-likelihood, additive,
//! Witten-Bell, interpolation, and reverse-emission estimators, and by the
//! Baum-Welch trainer.

use crate::dictionary::Dictionary;
use crate::sequence::Seq;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseModel {
    order: usize,
    dict: Dictionary,
    /// log10 P(initial state), indexed by state id.
    initial: Vec<f64>,
    /// Context -> complete log10 row over all target states.
    transitions: HashMap<Seq, Vec<f64>>,
    /// Per-state log10 emission table, indexed by state id. Estimators that
    /// reserve mass for unseen observations store a complete row including
    /// the UNKNOWN id; the others store observed entries only.
    emissions: Vec<HashMap<u32, f64>>,
    floor: f64,
}

impl DenseModel {
    /// Assemble a dense model from estimator-produced tables.
    pub fn new(
        order: usize,
        dict: Dictionary,
        initial: Vec<f64>,
        transitions: HashMap<Seq, Vec<f64>>,
        emissions: Vec<HashMap<u32, f64>>,
        floor: f64,
    ) -> Self {
        debug_assert_eq!(initial.len(), dict.state_count());
        debug_assert_eq!(emissions.len(), dict.state_count());
        Self {
            order,
            dict,
            initial,
            transitions,
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
            .copied()
            .unwrap_or(self.floor)
    }

    pub fn transition_log10(&self, context: &[u32], target: u32) -> f64 {
        let start = context.len().saturating_sub(self.order);
        let key = Seq::from(&context[start..]);
        self.transitions
            .get(&key)
            .and_then(|row| row.get(target as usize))
            .copied()
            .unwrap_or(self.floor)
    }

    pub fn emission_log10(&self, state: u32, observation: u32) -> f64 {
        self.emissions
            .get(state as usize)
            .and_then(|row| row.get(&observation))
            .copied()
            .unwrap_or(self.floor)
    }

    /// The initial vector, indexed by state id.
    pub fn initial_vector(&self) -> &[f64] {
        &self.initial
    }

    /// Iterate over (context, row) pairs.
    pub fn transition_rows(&self) -> impl Iterator<Item = (&Seq, &[f64])> {
        self.transitions.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Per-state emission tables, indexed by state id.
    pub fn emission_rows(&self) -> &[HashMap<u32, f64>] {
        &self.emissions
    }
}
