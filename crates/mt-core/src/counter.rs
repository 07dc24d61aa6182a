//! N-gram transition and emission counting over labeled samples.
//!
//! For a configured order `k`, every sample contributes:
//! 1. its first state to the sentence-initial tally,
//! 2. one emission count per (state, observation) position,
//! 3. for every window length 1..=k+1, one transition count of
//!    (context-of-length-(len-1) -> final state) per window position.
//!
//! Contexts therefore range from the empty context (unigram targets) up to
//! length `k`. The counter owns the dictionary it registers symbols into;
//! both are built once per training run and read-only afterward.

use crate::dictionary::Dictionary;
use crate::sequence::Seq;
use mt_common::{Error, Result, Sample};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Target-occurrence counts under one context, with a running total.
///
/// Also reused for emission counts (targets = observations emitted by one
/// state), reverse-emission counts (targets = states that emitted one
/// observation), and the sentence-initial tally (targets = first states).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextCounts {
    targets: HashMap<u32, u64>,
    total: u64,
}

impl ContextCounts {
    /// Occurrence count for one target.
    pub fn count(&self, target: u32) -> u64 {
        self.targets.get(&target).copied().unwrap_or(0)
    }

    /// Total occurrences under this context.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct targets seen under this context.
    pub fn distinct(&self) -> usize {
        self.targets.len()
    }

    /// Iterate over (target, count) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.targets.iter().map(|(&t, &c)| (t, c))
    }

    fn increment(&mut self, target: u32) {
        *self.targets.entry(target).or_insert(0) += 1;
        self.total += 1;
    }
}

/// N-gram counts built from labeled samples for a configured order.
#[derive(Debug, Clone)]
pub struct NgramCounter {
    order: usize,
    dict: Dictionary,
    /// Context (length 0..=order) -> target-state counts.
    transitions: HashMap<Seq, ContextCounts>,
    /// State -> emitted-observation counts.
    emissions: HashMap<u32, ContextCounts>,
    /// Observation -> emitting-state counts (for reverse-emission).
    reverse: HashMap<u32, ContextCounts>,
    /// First-state counts across samples.
    initial: ContextCounts,
    /// Total emitted positions across all samples.
    emission_total: u64,
    num_samples: usize,
}

impl NgramCounter {
    /// Create an empty counter for `order >= 1`.
    pub fn new(order: usize) -> Result<Self> {
        if order < 1 {
            return Err(Error::InvalidOrder { order });
        }
        Ok(Self {
            order,
            dict: Dictionary::new(),
            transitions: HashMap::new(),
            emissions: HashMap::new(),
            reverse: HashMap::new(),
            initial: ContextCounts::default(),
            emission_total: 0,
            num_samples: 0,
        })
    }

    /// Build a counter from a fallible sample stream.
    pub fn from_samples<I>(order: usize, samples: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<Sample>>,
    {
        let mut counter = Self::new(order)?;
        for sample in samples {
            counter.count_sample(&sample?)?;
        }
        Ok(counter)
    }

    /// Count one labeled sample. Empty samples contribute nothing;
    /// unlabeled samples are an error (counting needs state labels).
    pub fn count_sample(&mut self, sample: &Sample) -> Result<()> {
        let (states, observations) = match sample {
            Sample::Labeled {
                states,
                observations,
            } => (states, observations),
            Sample::Unlabeled { .. } => {
                return Err(Error::Estimation(
                    "cannot count an unlabeled sample; supervised counting needs state labels"
                        .into(),
                ))
            }
        };
        if states.len() != observations.len() {
            return Err(Error::SampleLengthMismatch {
                states: states.len(),
                observations: observations.len(),
            });
        }
        if states.is_empty() {
            return Ok(());
        }

        let state_ids: Vec<u32> = states.iter().map(|s| self.dict.register_state(s)).collect();
        let obs_ids: Vec<u32> = observations
            .iter()
            .map(|o| self.dict.register_observation(o))
            .collect();

        self.initial.increment(state_ids[0]);

        for (&s, &o) in state_ids.iter().zip(obs_ids.iter()) {
            self.emissions.entry(s).or_default().increment(o);
            self.reverse.entry(o).or_default().increment(s);
            self.emission_total += 1;
        }

        for window in 1..=self.order + 1 {
            for end in window..=state_ids.len() {
                let context = Seq::from(&state_ids[end - window..end - 1]);
                let target = state_ids[end - 1];
                self.transitions
                    .entry(context)
                    .or_default()
                    .increment(target);
            }
        }

        self.num_samples += 1;
        Ok(())
    }

    /// The configured Markov order.
    pub fn order(&self) -> usize {
        self.order
    }

    /// The dictionary symbols were registered into.
    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// Counts under one context (empty slice = unigram targets).
    pub fn context(&self, context: &[u32]) -> Option<&ContextCounts> {
        self.transitions.get(&Seq::from(context))
    }

    /// Iterate over all (context, counts) pairs.
    pub fn contexts(&self) -> impl Iterator<Item = (&Seq, &ContextCounts)> {
        self.transitions.iter()
    }

    /// Emission counts for one state.
    pub fn emission_counts(&self, state: u32) -> Option<&ContextCounts> {
        self.emissions.get(&state)
    }

    /// Reverse emission counts for one observation.
    pub fn reverse_counts(&self, observation: u32) -> Option<&ContextCounts> {
        self.reverse.get(&observation)
    }

    /// Sentence-initial state counts.
    pub fn initial_counts(&self) -> &ContextCounts {
        &self.initial
    }

    /// Total emitted positions across all samples.
    pub fn emission_total(&self) -> u64 {
        self.emission_total
    }

    /// Number of non-empty samples counted.
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Count-of-counts `r -> n_r` over n-grams of the given length
    /// (context length + 1). Used by Good-Turing discounting.
    pub fn count_of_counts(&self, ngram_len: usize) -> BTreeMap<u64, u64> {
        let mut histogram = BTreeMap::new();
        for (context, counts) in &self.transitions {
            if context.len() + 1 != ngram_len {
                continue;
            }
            for (_, c) in counts.iter() {
                *histogram.entry(c).or_insert(0) += 1;
            }
        }
        histogram
    }
}
