//! Runtime configuration and exercise-set loading from TOML.
//!
//! One file describes one set (see `exercises/*.toml` for the schema). Sets
//! are read once at startup; the host then picks one by name.

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::domain::ExerciseSet;
use crate::error::CatalogError;
use crate::strategy::StrategyRegistry;

/// Settings read from the environment.
#[derive(Clone, Debug)]
pub struct AppConfig {
  pub port: u16,
  /// Directory scanned for `*.toml` exercise sets.
  pub exercise_dir: Option<PathBuf>,
  /// Set served when a client does not name one.
  pub default_exercise: Option<String>,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self { port: 3000, exercise_dir: None, default_exercise: None }
  }
}

impl AppConfig {
  pub fn from_env() -> Self {
    let defaults = Self::default();
    Self {
      port: std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(defaults.port),
      exercise_dir: std::env::var("EXERCISE_DIR").ok().filter(|s| !s.is_empty()).map(PathBuf::from),
      default_exercise: std::env::var("DEFAULT_EXERCISE").ok().filter(|s| !s.is_empty()),
    }
  }
}

/// Parse and validate one set. `name` is used when the file does not set one.
pub fn parse_set(name: &str, text: &str, path: &Path, registry: &StrategyRegistry) -> Result<ExerciseSet, CatalogError> {
  let mut set: ExerciseSet = toml::from_str(text).map_err(|source| CatalogError::Parse {
    path: path.to_path_buf(),
    source,
  })?;
  if set.name.is_empty() {
    set.name = name.to_string();
  }
  validate_set(&set, registry)?;
  Ok(set)
}

/// Structural checks: non-empty, unique ids, resolvable strategy names.
pub fn validate_set(set: &ExerciseSet, registry: &StrategyRegistry) -> Result<(), CatalogError> {
  if set.exercises.is_empty() {
    return Err(CatalogError::Empty { set: set.name.clone() });
  }
  let mut seen = std::collections::HashSet::new();
  for ex in &set.exercises {
    if !seen.insert(ex.id) {
      return Err(CatalogError::DuplicateId { set: set.name.clone(), id: ex.id });
    }
    registry.validate(ex)?;
  }
  Ok(())
}

pub fn load_set_file(path: &Path, registry: &StrategyRegistry) -> Result<ExerciseSet, CatalogError> {
  let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
  parse_set(stem, &text, path, registry)
}

/// Load every `*.toml` in `dir`, sorted by file name. Broken files are
/// logged and skipped so one bad set does not take the others down.
pub fn load_sets_from_dir(dir: &Path, registry: &StrategyRegistry) -> Vec<ExerciseSet> {
  let entries = match std::fs::read_dir(dir) {
    Ok(e) => e,
    Err(e) => {
      error!(target: "markup_trainer", dir = %dir.display(), error = %e, "Failed to read exercise directory");
      return Vec::new();
    }
  };
  let mut paths: Vec<PathBuf> = entries
    .filter_map(|e| e.ok().map(|e| e.path()))
    .filter(|p| p.extension().and_then(|x| x.to_str()) == Some("toml"))
    .collect();
  paths.sort();

  let mut sets = Vec::new();
  for path in paths {
    match load_set_file(&path, registry) {
      Ok(set) => {
        info!(target: "markup_trainer", path = %path.display(), set = %set.name, exercises = set.exercises.len(), "Loaded exercise set");
        sets.push(set);
      }
      Err(e) => error!(target: "markup_trainer", error = %e, "Skipping exercise set"),
    }
  }
  sets
}
