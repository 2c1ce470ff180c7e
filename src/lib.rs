//! Empirical MDP models built from observed transitions.
//!
//! An [`ExperienceTable`] tallies visits and reward sums per
//! (state, next state, action). [`derive_model`] turns those tallies into
//! transition probabilities and mean rewards for a downstream solver.

pub mod config;
pub mod error;
pub mod experience;
pub mod model;
pub mod report;

pub use error::{ConfigError, ExperienceError};
pub use experience::ExperienceTable;
pub use model::{derive_model, Model, RewardTensor, TransitionTensor};
