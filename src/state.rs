//! Application state: the exercise-set catalog and the strategy registry.
//!
//! The catalog is built once at startup (built-in sets, then `EXERCISE_DIR`
//! overrides) and is read-only afterwards. Per-learner progress lives in the
//! WebSocket connection's own `ExerciseSession`, never here.

use std::{collections::HashMap, sync::Arc};

use tracing::{info, instrument, warn};

use crate::compare::ComparisonResult;
use crate::config::{load_sets_from_dir, AppConfig};
use crate::domain::{ExerciseId, ExerciseSet};
use crate::error::EvaluateError;
use crate::seeds::{builtin_sets, DEFAULT_SET};
use crate::strategy::StrategyRegistry;

#[derive(Clone)]
pub struct AppState {
    sets: HashMap<String, Arc<ExerciseSet>>,
    /// Set names in load order, for listings.
    order: Vec<String>,
    pub registry: StrategyRegistry,
    pub default_set: String,
}

impl AppState {
    /// Build state from config: built-in sets first, then directory sets
    /// (same name replaces the built-in).
    #[instrument(level = "info", skip_all)]
    pub fn new(config: &AppConfig) -> Self {
        let registry = StrategyRegistry::with_builtins();
        let mut sets = builtin_sets(&registry);
        if let Some(dir) = &config.exercise_dir {
            sets.extend(load_sets_from_dir(dir, &registry));
        }
        let default = config.default_exercise.clone().unwrap_or_else(|| DEFAULT_SET.to_string());
        Self::from_sets(sets, registry, default)
    }

    pub fn from_sets(sets: Vec<ExerciseSet>, registry: StrategyRegistry, default_set: String) -> Self {
        let mut by_name = HashMap::<String, Arc<ExerciseSet>>::new();
        let mut order = Vec::<String>::new();
        for set in sets {
            let name = set.name.clone();
            if by_name.insert(name.clone(), Arc::new(set)).is_some() {
                info!(target: "markup_trainer", set = %name, "Exercise set overridden");
            } else {
                order.push(name);
            }
        }
        if !by_name.contains_key(&default_set) {
            warn!(target: "markup_trainer", set = %default_set, "Default exercise set is not in the catalog");
        }
        for name in &order {
            let count = by_name.get(name).map(|s| s.exercises.len()).unwrap_or_default();
            info!(target: "markup_trainer", set = %name, exercises = count, "Startup exercise inventory");
        }
        Self { sets: by_name, order, registry, default_set }
    }

    /// Look up a set; `None` selects the default.
    pub fn set(&self, name: Option<&str>) -> Option<Arc<ExerciseSet>> {
        let name = name.filter(|n| !n.is_empty()).unwrap_or(&self.default_set);
        self.sets.get(name).cloned()
    }

    /// All sets in load order.
    pub fn sets(&self) -> impl Iterator<Item = &Arc<ExerciseSet>> {
        self.order.iter().filter_map(|n| self.sets.get(n))
    }

    /// Score one answer with the exercise's strategies; no session involved.
    #[instrument(level = "debug", skip(self, answer), fields(answer_len = answer.len()))]
    pub fn evaluate(
        &self,
        set_name: Option<&str>,
        id: ExerciseId,
        answer: &str,
    ) -> Result<(ComparisonResult, u32), EvaluateError> {
        let set = self
            .set(set_name)
            .ok_or_else(|| EvaluateError::UnknownSet(set_name.unwrap_or(&self.default_set).to_string()))?;
        let ex = set.exercise(id).ok_or(EvaluateError::UnknownExercise(id))?;
        let hooks = self.registry.hooks_for(ex).map_err(|_| EvaluateError::Disabled(id))?;
        Ok((hooks.evaluate(ex, answer), ex.max_score))
    }
}
