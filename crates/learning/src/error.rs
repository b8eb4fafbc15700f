//! Error types raised when building learner inputs.
//!
//! Predictors and the subject store never fail at runtime; these errors only
//! surface while translating host-supplied names into typed values.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LearningError {
    #[error("unknown action kind: {name}")]
    UnknownActionKind { name: String },

    #[error("unknown vote key: {name} (expected `event` or `kind`)")]
    UnknownVoteKey { name: String },
}

pub type Result<T> = std::result::Result<T, LearningError>;
