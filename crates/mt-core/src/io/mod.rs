//! Persisted-model records and physical encodings.
//!
//! The logical record set is fixed: a header of six counts (order,
//! state-dictionary size, observation-dictionary size, initial-vector size,
//! transition-entry count, emission-entry count), followed by that many
//! dictionary entries, initial-vector entries, transition entries, and
//! emission entries. Two physical encodings — line-oriented text and tagged
//! binary — carry byte-identical logical content: decoding either encoding
//! of the same model yields equal [`ModelRecords`].
//!
//! A record set containing any backoff weight reloads as a backoff model;
//! otherwise it reloads dense.

pub mod binary;
pub mod text;

use crate::dictionary::Dictionary;
use crate::model::{ArpaEntry, BackoffModel, DenseModel, Model};
use crate::sequence::Seq;
use mt_common::{Error, Result};
use mt_math::log10_floor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Initial-vector entry: state, log-prob, optional log-backoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialRecord {
    pub state: u32,
    pub log10_prob: f64,
    pub log10_backoff: Option<f64>,
}

/// Transition entry: context sequence, target, log-prob, optional
/// log-backoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub context: Vec<u32>,
    pub target: u32,
    pub log10_prob: f64,
    pub log10_backoff: Option<f64>,
}

/// Emission entry: state, observation, log-prob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionRecord {
    pub state: u32,
    pub observation: u32,
    pub log10_prob: f64,
}

/// The complete logical record set for one persisted model.
///
/// Dictionary entries are (symbol, id) pairs in id order; entry vectors are
/// deterministically ordered (by id, then lexicographically by context), so
/// equal models produce equal record sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecords {
    pub order: usize,
    pub states: Vec<(String, u32)>,
    pub observations: Vec<(String, u32)>,
    pub initial: Vec<InitialRecord>,
    pub transitions: Vec<TransitionRecord>,
    pub emissions: Vec<EmissionRecord>,
}

impl ModelRecords {
    /// Extract the record set from a model.
    pub fn from_model(model: &Model) -> Self {
        let dict = model.dictionary();
        let states = dict
            .state_symbols()
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i as u32))
            .collect();
        let observations = dict
            .observation_symbols()
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i as u32))
            .collect();

        let (initial, transitions, emissions) = match model {
            Model::Dense(m) => dense_entries(m),
            Model::Backoff(m) => backoff_entries(m),
        };

        Self {
            order: model.order(),
            states,
            observations,
            initial,
            transitions,
            emissions,
        }
    }

    /// Rebuild the model. The representation follows the records: any
    /// backoff weight anywhere selects the backoff shape.
    pub fn into_model(self) -> Result<Model> {
        let n = self.states.len();
        self.validate(n)?;

        let dict = Dictionary::from_parts(
            self.states.into_iter().map(|(s, _)| s).collect(),
            self.observations.into_iter().map(|(s, _)| s).collect(),
        );
        let floor = log10_floor();

        let mut emissions: Vec<HashMap<u32, f64>> = vec![HashMap::new(); n];
        for e in &self.emissions {
            emissions[e.state as usize].insert(e.observation, e.log10_prob);
        }

        let has_backoff = self.initial.iter().any(|r| r.log10_backoff.is_some())
            || self.transitions.iter().any(|r| r.log10_backoff.is_some());

        if has_backoff {
            let mut initial = vec![ArpaEntry::prob(floor); n];
            for r in &self.initial {
                initial[r.state as usize] = ArpaEntry {
                    log10_prob: r.log10_prob,
                    log10_backoff: r.log10_backoff,
                };
            }
            let mut ngrams = HashMap::new();
            for r in &self.transitions {
                let mut key = r.context.clone();
                key.push(r.target);
                ngrams.insert(
                    Seq::from_ids(key),
                    ArpaEntry {
                        log10_prob: r.log10_prob,
                        log10_backoff: r.log10_backoff,
                    },
                );
            }
            Ok(Model::Backoff(BackoffModel::new(
                self.order, dict, initial, ngrams, emissions, floor,
            )))
        } else {
            let mut initial = vec![floor; n];
            for r in &self.initial {
                initial[r.state as usize] = r.log10_prob;
            }
            let mut transitions: HashMap<Seq, Vec<f64>> = HashMap::new();
            for r in &self.transitions {
                let row = transitions
                    .entry(Seq::from(r.context.as_slice()))
                    .or_insert_with(|| vec![floor; n]);
                row[r.target as usize] = r.log10_prob;
            }
            Ok(Model::Dense(DenseModel::new(
                self.order, dict, initial, transitions, emissions, floor,
            )))
        }
    }

    /// JSON rendering for structured debugging output.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn validate(&self, n: usize) -> Result<()> {
        if self.order < 1 {
            return Err(Error::InvalidOrder { order: self.order });
        }
        for (expected, (_, id)) in self.states.iter().enumerate() {
            if *id != expected as u32 {
                return Err(Error::MalformedRecord(format!(
                    "state ids not dense: expected {expected}, found {id}"
                )));
            }
        }
        for (expected, (_, id)) in self.observations.iter().enumerate() {
            if *id != expected as u32 {
                return Err(Error::MalformedRecord(format!(
                    "observation ids not dense: expected {expected}, found {id}"
                )));
            }
        }
        let v = self.observations.len();
        for r in &self.initial {
            if r.state as usize >= n {
                return Err(Error::MalformedRecord(format!(
                    "initial entry references unknown state {}",
                    r.state
                )));
            }
        }
        for r in &self.transitions {
            if r.target as usize >= n || r.context.iter().any(|&c| c as usize >= n) {
                return Err(Error::MalformedRecord(
                    "transition entry references unknown state".into(),
                ));
            }
            if r.context.len() > self.order {
                return Err(Error::MalformedRecord(format!(
                    "transition context of length {} exceeds model order {}",
                    r.context.len(),
                    self.order
                )));
            }
            if r.log10_backoff.is_some() && r.context.len() == self.order {
                return Err(Error::MalformedRecord(
                    "top-order transition entry carries a backoff weight".into(),
                ));
            }
        }
        for r in &self.emissions {
            if r.state as usize >= n || r.observation as usize >= v {
                return Err(Error::MalformedRecord(
                    "emission entry references unknown symbol".into(),
                ));
            }
        }
        Ok(())
    }
}

fn dense_entries(
    m: &DenseModel,
) -> (Vec<InitialRecord>, Vec<TransitionRecord>, Vec<EmissionRecord>) {
    let initial = m
        .initial_vector()
        .iter()
        .enumerate()
        .map(|(s, &p)| InitialRecord {
            state: s as u32,
            log10_prob: p,
            log10_backoff: None,
        })
        .collect();

    let mut rows: Vec<(&Seq, &[f64])> = m.transition_rows().collect();
    rows.sort_by(|(a, _), (b, _)| a.ids().cmp(b.ids()));
    let mut transitions = Vec::new();
    for (context, row) in rows {
        for (target, &p) in row.iter().enumerate() {
            transitions.push(TransitionRecord {
                context: context.ids().to_vec(),
                target: target as u32,
                log10_prob: p,
                log10_backoff: None,
            });
        }
    }

    (initial, transitions, emission_entries(m.emission_rows()))
}

fn backoff_entries(
    m: &BackoffModel,
) -> (Vec<InitialRecord>, Vec<TransitionRecord>, Vec<EmissionRecord>) {
    let initial = m
        .initial_entries()
        .iter()
        .enumerate()
        .map(|(s, e)| InitialRecord {
            state: s as u32,
            log10_prob: e.log10_prob,
            log10_backoff: e.log10_backoff,
        })
        .collect();

    let mut ngrams: Vec<(&Seq, &ArpaEntry)> = m.ngram_entries().collect();
    ngrams.sort_by(|(a, _), (b, _)| a.ids().cmp(b.ids()));
    let transitions = ngrams
        .into_iter()
        .map(|(key, entry)| {
            let ids = key.ids();
            TransitionRecord {
                context: ids[..ids.len() - 1].to_vec(),
                target: ids[ids.len() - 1],
                log10_prob: entry.log10_prob,
                log10_backoff: entry.log10_backoff,
            }
        })
        .collect();

    (initial, transitions, emission_entries(m.emission_rows()))
}

fn emission_entries(rows: &[HashMap<u32, f64>]) -> Vec<EmissionRecord> {
    let mut out = Vec::new();
    for (state, row) in rows.iter().enumerate() {
        let mut entries: Vec<(u32, f64)> = row.iter().map(|(&o, &p)| (o, p)).collect();
        entries.sort_by_key(|(o, _)| *o);
        for (observation, log10_prob) in entries {
            out.push(EmissionRecord {
                state: state as u32,
                observation,
                log10_prob,
            });
        }
    }
    out
}
