//! Unsupervised training.

mod baum_welch;

pub use baum_welch::{
    random_model, BaumWelchTrainer, TrainerConfig, TrainingReport, REESTIMATION_FLOOR,
};
