//! Player action learning for NPC opponents.
//!
//! This crate records, per player, the sequence of actions observed during
//! each bout with an NPC and predicts the player's next action in the bout
//! currently in progress. Host glue looks up a player's [`Predictor`] through
//! the [`SubjectStore`], pushes [`Event`]s as they happen, closes the bout with
//! `end_sequence`, and reads back `expected_next_event` (or its counter
//! action) to pick the NPC's response.
//!
//! Modules are organized by responsibility:
//! - [`event`] and [`row`] hold the value types
//! - [`vote`] implements the per-position majority vote
//! - [`predictor`] owns one player's history and prediction
//! - [`store`] maps player ids to predictors with idle expiry
//! - [`config`] carries tunables and the environment loader
pub mod config;
pub mod error;
pub mod event;
pub mod predictor;
pub mod row;
pub mod store;
pub mod vote;

pub use config::LearningConfig;
pub use error::{LearningError, Result};
pub use event::{ActionKind, Event, Timestamp};
pub use predictor::{HISTORY_CAPACITY, Predictor};
pub use row::Row;
pub use store::{PredictorHandle, SubjectStore};
pub use vote::{Tally, VoteKey};
