//! Markov Tagger estimation and decoding engine.
//!
//! Hidden Markov Models over discrete state/observation alphabets: n-gram
//! counting, six smoothing estimators, dense and backoff model
//! representations behind one query contract, the standard decoders
//! (Forward, Backward, Viterbi, k-best, beam), and Baum-Welch refinement.
//!
//! Everything is single-threaded and CPU-bound. Decoders are re-entrant over
//! an immutable model; the EM trainer builds a fresh model per iteration and
//! never mutates the one it was given.

pub mod counter;
pub mod decode;
pub mod dictionary;
pub mod estimate;
pub mod io;
pub mod model;
pub mod sequence;
pub mod train;

pub use counter::{ContextCounts, NgramCounter};
pub use decode::{
    backward, beam_search, forward, k_best, score_path, viterbi, BackwardLattice, DecodedPath,
    ForwardLattice,
};
pub use dictionary::{Dictionary, UNKNOWN_OBSERVATION};
pub use estimate::{
    estimate_from_split_samples, estimate_interpolated_with_held_out, estimate_katz_with_stats,
    Estimator, KatzStats,
};
pub use io::ModelRecords;
pub use model::{ArpaEntry, BackoffModel, DenseModel, Model};
pub use sequence::{ObsSeq, Seq, StateSeq};
pub use train::{random_model, BaumWelchTrainer, TrainerConfig, TrainingReport};

pub use mt_common::{Error, Result, Sample, VecSampleStream};
