//! Completion tracking and per-tab / overall score aggregation.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{ExerciseId, ExerciseSet};

/// Scores after a completion change.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreUpdate {
  pub tab_index: usize,
  pub tab_completed: usize,
  pub tab_total: usize,
  pub global_completed: usize,
  pub global_total: usize,
}

/// Owns the completion set for one session.
///
/// Tab scores are derived from the set on every change and never stored.
#[derive(Clone, Debug, Default)]
pub struct ScoreAggregator {
  /// exercise -> index of its tab
  tab_of: HashMap<ExerciseId, usize>,
  /// exercise ids per tab, in set order
  tabs: Vec<Vec<ExerciseId>>,
  completed: HashSet<ExerciseId>,
}

impl ScoreAggregator {
  /// Build the roster from a set; tab indices follow `ExerciseSet::tab_order`.
  pub fn for_set(set: &ExerciseSet) -> Self {
    let order = set.tab_order();
    let mut tabs: Vec<Vec<ExerciseId>> = vec![Vec::new(); order.len()];
    let mut tab_of = HashMap::new();
    for ex in &set.exercises {
      if let Some(idx) = order.iter().position(|k| *k == ex.tab) {
        tabs[idx].push(ex.id);
        tab_of.insert(ex.id, idx);
      }
    }
    Self { tab_of, tabs, completed: HashSet::new() }
  }

  /// Apply a verdict. Returns `None` when completion did not change.
  pub fn record_result(&mut self, id: ExerciseId, is_correct: bool) -> Option<ScoreUpdate> {
    let Some(&tab_index) = self.tab_of.get(&id) else {
      debug!(target: "exercise", id, "verdict for unknown exercise ignored");
      return None;
    };
    let changed = if is_correct { self.completed.insert(id) } else { self.completed.remove(&id) };
    if !changed {
      return None;
    }
    let (tab_completed, tab_total) = self.tab_score(tab_index);
    let (global_completed, global_total) = self.totals();
    info!(
      target: "exercise",
      id, is_correct, tab_index, tab_completed, tab_total, global_completed, global_total,
      "completion changed"
    );
    Some(ScoreUpdate { tab_index, tab_completed, tab_total, global_completed, global_total })
  }

  /// `(completed, total)` for a tab; `(0, 0)` for an unknown index.
  pub fn tab_score(&self, tab_index: usize) -> (usize, usize) {
    self.tabs.get(tab_index).map_or((0, 0), |ids| {
      (ids.iter().filter(|id| self.completed.contains(*id)).count(), ids.len())
    })
  }

  /// `(completed, total)` over the whole set.
  pub fn totals(&self) -> (usize, usize) {
    let completed = self.completed.iter().filter(|id| self.tab_of.contains_key(*id)).count();
    (completed, self.tab_of.len())
  }

  pub fn is_completed(&self, id: ExerciseId) -> bool { self.completed.contains(&id) }
}
