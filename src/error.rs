//! Errors raised while loading exercise sets or wiring a session.
//!
//! Learner input never produces one of these; it is classified as invalid instead.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::ExerciseId;

#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("failed to read exercise set {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse exercise set {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("exercise set '{set}' has no exercises")]
  Empty { set: String },

  #[error("exercise set '{set}' declares exercise id {id} more than once")]
  DuplicateId { set: String, id: ExerciseId },

  #[error("exercise {id} names unknown {slot} strategy '{name}'")]
  UnknownStrategy { id: ExerciseId, slot: &'static str, name: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
  #[error("unknown exercise id {0}")]
  UnknownExercise(ExerciseId),

  #[error("exercise {0} is not attached to a render surface")]
  Detached(ExerciseId),

  #[error("exercise {id} has no field named '{field}'")]
  UnknownField { id: ExerciseId, field: String },
}

/// Why a one-shot evaluation (no session) could not run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvaluateError {
  #[error("unknown exercise set '{0}'")]
  UnknownSet(String),

  #[error("unknown exercise id {0}")]
  UnknownExercise(ExerciseId),

  #[error("exercise {0} is disabled")]
  Disabled(ExerciseId),
}
