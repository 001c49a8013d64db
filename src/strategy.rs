//! Per-exercise capability substitution.
//!
//! Exercise definitions name their overrides (`normalizer = "wrap_bare_declarations"`);
//! the registry resolves those names to strategy objects. Anything left unnamed
//! falls back to the defaults.

use std::collections::HashMap;
use std::sync::Arc;

use crate::compare::{Comparator, ComparisonResult, PolicyComparator};
use crate::domain::ExerciseDefinition;
use crate::error::CatalogError;
use crate::normalize::{DefaultNormalizer, Normalizer, WrapBareDeclarations};
use crate::render::{BoxModelRenderer, PreviewRenderer};

pub const WRAP_BARE_DECLARATIONS: &str = "wrap_bare_declarations";
pub const BOX_MODEL: &str = "box_model";

/// Resolved strategies for one exercise.
#[derive(Clone)]
pub struct ExerciseHooks {
  pub normalizer: Arc<dyn Normalizer>,
  pub comparator: Arc<dyn Comparator>,
  pub preview: Option<Arc<dyn PreviewRenderer>>,
  pub example: Option<Arc<dyn PreviewRenderer>>,
}

impl ExerciseHooks {
  /// Defaults only: per-kind normalizer, the exercise's declared policy, no custom renderers.
  pub fn defaults(exercise: &ExerciseDefinition) -> Self {
    Self {
      normalizer: Arc::new(DefaultNormalizer),
      comparator: Arc::new(PolicyComparator(exercise.policy)),
      preview: None,
      example: None,
    }
  }

  /// Normalize and score `raw` without rendering anything.
  pub fn evaluate(&self, exercise: &ExerciseDefinition, raw: &str) -> ComparisonResult {
    let normalized = self.normalizer.normalize(raw, exercise.kind);
    self.comparator.compare(&normalized, &exercise.solution, exercise.max_score)
  }
}

#[derive(Clone, Default)]
pub struct StrategyRegistry {
  normalizers: HashMap<String, Arc<dyn Normalizer>>,
  comparators: HashMap<String, Arc<dyn Comparator>>,
  renderers: HashMap<String, Arc<dyn PreviewRenderer>>,
}

impl StrategyRegistry {
  /// Registry preloaded with the built-in strategies.
  pub fn with_builtins() -> Self {
    let mut r = Self::default();
    r.register_normalizer(WRAP_BARE_DECLARATIONS, WrapBareDeclarations::default());
    r.register_renderer(BOX_MODEL, BoxModelRenderer);
    r
  }

  pub fn register_normalizer(&mut self, name: &str, n: impl Normalizer + 'static) {
    self.normalizers.insert(name.to_string(), Arc::new(n));
  }

  pub fn register_comparator(&mut self, name: &str, c: impl Comparator + 'static) {
    self.comparators.insert(name.to_string(), Arc::new(c));
  }

  pub fn register_renderer(&mut self, name: &str, r: impl PreviewRenderer + 'static) {
    self.renderers.insert(name.to_string(), Arc::new(r));
  }

  /// Resolve every named override of `exercise`. An unknown name is an error.
  pub fn hooks_for(&self, exercise: &ExerciseDefinition) -> Result<ExerciseHooks, CatalogError> {
    let mut hooks = ExerciseHooks::defaults(exercise);
    if let Some(name) = &exercise.normalizer {
      hooks.normalizer = lookup(&self.normalizers, name, exercise, "normalizer")?;
    }
    if let Some(name) = &exercise.comparator {
      hooks.comparator = lookup(&self.comparators, name, exercise, "comparator")?;
    }
    if let Some(name) = &exercise.preview {
      hooks.preview = Some(lookup(&self.renderers, name, exercise, "preview")?);
    }
    if let Some(name) = &exercise.example {
      hooks.example = Some(lookup(&self.renderers, name, exercise, "example")?);
    }
    Ok(hooks)
  }

  /// Check that every override named by `exercise` exists.
  pub fn validate(&self, exercise: &ExerciseDefinition) -> Result<(), CatalogError> {
    self.hooks_for(exercise).map(|_| ())
  }
}

fn lookup<T: ?Sized>(
  table: &HashMap<String, Arc<T>>,
  name: &str,
  exercise: &ExerciseDefinition,
  slot: &'static str,
) -> Result<Arc<T>, CatalogError> {
  table.get(name).cloned().ok_or_else(|| CatalogError::UnknownStrategy {
    id: exercise.id,
    slot,
    name: name.to_string(),
  })
}
