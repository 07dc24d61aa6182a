//! Bijective mapping between symbols and dense integer ids.
//!
//! The dictionary is the only authority for id assignment. Ids start at 0,
//! are assigned monotonically on first registration, and never change
//! afterward; decoders rely on the density to index arrays of size
//! `|states|` and `|observations|`. The state space and the observation
//! space carry independent id sequences.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reserved observation symbol that unseen observations map to at query
/// time. Pre-registered at construction so every model carries a bucket
/// for it.
pub const UNKNOWN_OBSERVATION: &str = "<unk>";

/// Symbol <-> id registry for one training run.
///
/// Owned and explicitly passed through counting and estimation; there is no
/// global registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dictionary {
    state_ids: HashMap<String, u32>,
    states: Vec<String>,
    observation_ids: HashMap<String, u32>,
    observations: Vec<String>,
}

impl Dictionary {
    /// Create an empty dictionary with the UNKNOWN observation
    /// pre-registered at id 0.
    pub fn new() -> Self {
        let mut dict = Self {
            state_ids: HashMap::new(),
            states: Vec::new(),
            observation_ids: HashMap::new(),
            observations: Vec::new(),
        };
        dict.register_observation(UNKNOWN_OBSERVATION);
        dict
    }

    /// Register a state symbol, returning its id. Idempotent: a symbol seen
    /// before returns its existing id.
    pub fn register_state(&mut self, symbol: &str) -> u32 {
        if let Some(&id) = self.state_ids.get(symbol) {
            return id;
        }
        let id = self.states.len() as u32;
        self.states.push(symbol.to_string());
        self.state_ids.insert(symbol.to_string(), id);
        id
    }

    /// Register an observation symbol, returning its id. Idempotent.
    pub fn register_observation(&mut self, symbol: &str) -> u32 {
        if let Some(&id) = self.observation_ids.get(symbol) {
            return id;
        }
        let id = self.observations.len() as u32;
        self.observations.push(symbol.to_string());
        self.observation_ids.insert(symbol.to_string(), id);
        id
    }

    /// Look up a state id without registering.
    pub fn state_id(&self, symbol: &str) -> Option<u32> {
        self.state_ids.get(symbol).copied()
    }

    /// Look up an observation id without registering.
    pub fn observation_id(&self, symbol: &str) -> Option<u32> {
        self.observation_ids.get(symbol).copied()
    }

    /// Observation id for a symbol, routing unseen symbols to the UNKNOWN
    /// bucket. This is a modeling decision, not an error.
    pub fn observation_id_or_unknown(&self, symbol: &str) -> u32 {
        self.observation_id(symbol).unwrap_or(self.unknown_id())
    }

    /// Id of the reserved UNKNOWN observation.
    pub fn unknown_id(&self) -> u32 {
        // Registered first in new(); reconstruction from records preserves it.
        self.observation_ids
            .get(UNKNOWN_OBSERVATION)
            .copied()
            .unwrap_or(0)
    }

    /// Resolve a state id back to its symbol.
    pub fn resolve_state(&self, id: u32) -> Option<&str> {
        self.states.get(id as usize).map(String::as_str)
    }

    /// Resolve an observation id back to its symbol.
    pub fn resolve_observation(&self, id: u32) -> Option<&str> {
        self.observations.get(id as usize).map(String::as_str)
    }

    /// Number of registered states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Number of registered observations (including UNKNOWN).
    pub fn observation_count(&self) -> usize {
        self.observations.len()
    }

    /// State symbols in id order.
    pub fn state_symbols(&self) -> &[String] {
        &self.states
    }

    /// Observation symbols in id order.
    pub fn observation_symbols(&self) -> &[String] {
        &self.observations
    }

    /// Rebuild a dictionary from persisted symbol lists, already in id
    /// order. Used by the model record reader.
    pub(crate) fn from_parts(states: Vec<String>, observations: Vec<String>) -> Self {
        let state_ids = states
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i as u32))
            .collect();
        let observation_ids = observations
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i as u32))
            .collect();
        Self {
            state_ids,
            states,
            observation_ids,
            observations,
        }
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}
