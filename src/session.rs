//! Exercise session: wires every exercise of a set through
//! normalize -> render -> compare -> aggregate on each input event.
//!
//! Initialisation is two-phase. `build` lays out the tabs; `attach` binds the
//! render surfaces and runs each exercise once on its initial input. Nothing
//! is evaluated before its surfaces exist.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::compare::ComparisonResult;
use crate::declarations::DeclarationMap;
use crate::domain::{ExerciseDefinition, ExerciseId, ExerciseSet, InputMode};
use crate::error::SessionError;
use crate::layout::{explanation_html, tab_content_html, EXPLANATION_TAB};
use crate::render::{render_exercise, RenderRequest, RenderTarget, Surface};
use crate::score::{ScoreAggregator, ScoreUpdate};
use crate::strategy::{ExerciseHooks, StrategyRegistry};

/// Selector used when field values are combined into one stylesheet.
pub const FIELDS_SELECTOR: &str = ".test-box";

/// The tab strip owned by the host.
pub trait TabDisplay {
  fn create_tabs(&mut self, count: usize, names: &[String], totals: &[usize]);
  fn set_tab_content(&mut self, index: usize, content: &str);
  fn update_tab_score(&mut self, index: usize, completed: usize);
  /// Overall `(completed/total)` next to the set title.
  fn update_total_score(&mut self, _completed: usize, _total: usize) {}
}

/// The two render targets of one exercise.
#[derive(Clone, Debug, Default)]
pub struct ExerciseSurfaces<T> {
  pub preview: T,
  pub example: T,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
  Unanswered,
  Correct,
}

/// Outcome of one pipeline run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
  pub exercise_id: ExerciseId,
  pub status: Status,
  pub result: ComparisonResult,
  pub max_score: u32,
  /// Markup for the feedback area.
  pub feedback: String,
  /// Present only when the completion set changed.
  pub score_update: Option<ScoreUpdate>,
}

/// What the learner's input controls should currently show.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputValue {
  Text(String),
  Fields(BTreeMap<String, String>),
}

#[derive(Clone, Debug)]
enum Answer {
  Text(String),
  /// Field values in display order.
  Fields(Vec<(String, String)>),
}

impl Answer {
  fn initial(ex: &ExerciseDefinition) -> Self {
    match ex.input {
      InputMode::Textarea => Answer::Text(ex.initial.as_text().to_string()),
      InputMode::Fields => Answer::Fields(
        ex.field_names()
          .into_iter()
          .map(|f| (f.to_string(), ex.initial.field(f).to_string()))
          .collect(),
      ),
    }
  }

  /// Raw text handed to the normalizer.
  fn raw(&self) -> String {
    match self {
      Answer::Text(s) => s.clone(),
      Answer::Fields(values) => {
        let css = values
          .iter()
          .filter(|(_, v)| !v.trim().is_empty())
          .map(|(f, v)| format!("{f}: {};", v.trim()))
          .collect::<Vec<_>>()
          .join(" ");
        if css.is_empty() { String::new() } else { format!("{FIELDS_SELECTOR} {{ {css} }}") }
      }
    }
  }

  fn value(&self) -> InputValue {
    match self {
      Answer::Text(s) => InputValue::Text(s.clone()),
      Answer::Fields(values) => InputValue::Fields(values.iter().cloned().collect()),
    }
  }

  fn field_map(&self) -> Option<DeclarationMap> {
    match self {
      Answer::Text(_) => None,
      Answer::Fields(values) => Some(values.iter().map(|(f, v)| (f.as_str(), v.as_str())).collect()),
    }
  }
}

struct Slot<T> {
  /// `None` when the exercise's strategies failed to resolve.
  hooks: Option<ExerciseHooks>,
  answer: Answer,
  status: Status,
  surfaces: Option<ExerciseSurfaces<T>>,
}

/// One learner working through one exercise set.
pub struct ExerciseSession<T> {
  set: Arc<ExerciseSet>,
  slots: Vec<Slot<T>>,
  scores: ScoreAggregator,
}

impl<T: RenderTarget> ExerciseSession<T> {
  /// Phase one: resolve strategies and lay out the tabs.
  #[instrument(level = "info", skip_all, fields(set = %set.name))]
  pub fn build(set: Arc<ExerciseSet>, registry: &StrategyRegistry, display: &mut dyn TabDisplay) -> Self {
    let slots = set
      .exercises
      .iter()
      .map(|ex| {
        let hooks = match registry.hooks_for(ex) {
          Ok(h) => Some(h),
          Err(e) => {
            error!(target: "exercise", id = ex.id, error = %e, "Exercise disabled: strategy lookup failed");
            None
          }
        };
        Slot { hooks, answer: Answer::initial(ex), status: Status::Unanswered, surfaces: None }
      })
      .collect();
    let scores = ScoreAggregator::for_set(&set);

    let order = set.tab_order();
    let mut names: Vec<String> = Vec::with_capacity(order.len() + 1);
    let mut totals: Vec<usize> = Vec::with_capacity(order.len() + 1);
    for (i, key) in order.iter().enumerate() {
      names.push(set.tab_info(key).name);
      totals.push(scores.tab_score(i).1);
    }
    names.push(EXPLANATION_TAB.to_string());
    totals.push(0);
    display.create_tabs(names.len(), &names, &totals);

    for (i, key) in order.iter().enumerate() {
      display.set_tab_content(i, &tab_content_html(&set, i, &set.tab_info(key)));
    }
    display.set_tab_content(order.len(), &explanation_html(&set));

    let (_, total) = scores.totals();
    display.update_total_score(0, total);
    info!(target: "exercise", tabs = order.len(), exercises = total, "Session built");

    Self { set, slots, scores }
  }

  /// Phase two: bind surfaces, draw the worked examples, evaluate initial input.
  ///
  /// An exercise whose surfaces cannot be provided is logged and left
  /// detached; the rest of the set still works.
  #[instrument(level = "info", skip_all)]
  pub fn attach<F>(&mut self, mut provide: F, display: &mut dyn TabDisplay) -> Vec<Evaluation>
  where
    F: FnMut(ExerciseId) -> Option<ExerciseSurfaces<T>>,
  {
    let set = Arc::clone(&self.set);
    let mut evaluations = Vec::new();
    for (idx, ex) in set.exercises.iter().enumerate() {
      let slot = &mut self.slots[idx];
      let Some(hooks) = &slot.hooks else { continue };
      let Some(mut surfaces) = provide(ex.id) else {
        error!(target: "exercise", id = ex.id, "Render surfaces missing; exercise not attached");
        continue;
      };
      let request = RenderRequest { exercise: ex, surface: Surface::Example, content: &ex.solution, fields: None };
      render_exercise(hooks.example.as_deref(), &request, &mut surfaces.example);
      slot.surfaces = Some(surfaces);
      match self.run(idx, display) {
        Ok(e) => evaluations.push(e),
        Err(e) => error!(target: "exercise", id = ex.id, error = %e, "Initial evaluation failed"),
      }
    }
    info!(target: "exercise", attached = evaluations.len(), "Session attached");
    evaluations
  }

  /// Learner edited a textarea (or the composed field text).
  pub fn input_text(&mut self, id: ExerciseId, text: &str, display: &mut dyn TabDisplay) -> Result<Evaluation, SessionError> {
    let idx = self.attached_index(id)?;
    self.slots[idx].answer = Answer::Text(text.to_string());
    self.run(idx, display)
  }

  /// Learner edited one field of a field-mode exercise.
  pub fn input_field(
    &mut self,
    id: ExerciseId,
    field: &str,
    value: &str,
    display: &mut dyn TabDisplay,
  ) -> Result<Evaluation, SessionError> {
    let idx = self.attached_index(id)?;
    let Answer::Fields(values) = &mut self.slots[idx].answer else {
      return Err(SessionError::UnknownField { id, field: field.to_string() });
    };
    let Some(slot) = values.iter_mut().find(|(f, _)| f == field) else {
      return Err(SessionError::UnknownField { id, field: field.to_string() });
    };
    slot.1 = value.to_string();
    self.run(idx, display)
  }

  /// Restore the initial input and evaluate it like any other edit.
  pub fn reset(&mut self, id: ExerciseId, display: &mut dyn TabDisplay) -> Result<Evaluation, SessionError> {
    let idx = self.attached_index(id)?;
    self.slots[idx].answer = Answer::initial(&self.set.exercises[idx]);
    info!(target: "exercise", id, "Exercise reset");
    self.run(idx, display)
  }

  pub fn set(&self) -> &ExerciseSet { &self.set }

  pub fn scores(&self) -> &ScoreAggregator { &self.scores }

  pub fn status(&self, id: ExerciseId) -> Option<Status> {
    self.index_of(id).map(|i| self.slots[i].status)
  }

  pub fn surfaces(&self, id: ExerciseId) -> Option<&ExerciseSurfaces<T>> {
    self.index_of(id).and_then(|i| self.slots[i].surfaces.as_ref())
  }

  /// Current raw input, as the normalizer would see it.
  pub fn current_input(&self, id: ExerciseId) -> Option<String> {
    self.index_of(id).map(|i| self.slots[i].answer.raw())
  }

  /// Current input in the shape of the exercise's controls.
  pub fn input_value(&self, id: ExerciseId) -> Option<InputValue> {
    self.index_of(id).map(|i| self.slots[i].answer.value())
  }

  fn index_of(&self, id: ExerciseId) -> Option<usize> {
    self.set.exercises.iter().position(|e| e.id == id)
  }

  fn attached_index(&self, id: ExerciseId) -> Result<usize, SessionError> {
    let idx = self.index_of(id).ok_or(SessionError::UnknownExercise(id))?;
    if self.slots[idx].surfaces.is_none() {
      warn!(target: "exercise", id, "Input for detached exercise ignored");
      return Err(SessionError::Detached(id));
    }
    Ok(idx)
  }

  #[instrument(level = "debug", skip(self, display))]
  fn run(&mut self, idx: usize, display: &mut dyn TabDisplay) -> Result<Evaluation, SessionError> {
    let set = Arc::clone(&self.set);
    let ex = &set.exercises[idx];
    let slot = &mut self.slots[idx];
    let (Some(hooks), Some(surfaces)) = (&slot.hooks, &mut slot.surfaces) else {
      return Err(SessionError::Detached(ex.id));
    };

    let raw = slot.answer.raw();
    let fields = slot.answer.field_map();
    let normalized = hooks.normalizer.normalize(&raw, ex.kind);
    let request = RenderRequest {
      exercise: ex,
      surface: Surface::Preview,
      content: normalized.content().unwrap_or(raw.as_str()),
      fields: fields.as_ref(),
    };
    render_exercise(hooks.preview.as_deref(), &request, &mut surfaces.preview);
    let result = hooks.comparator.compare(&normalized, &ex.solution, ex.max_score);

    slot.status = if result.is_correct { Status::Correct } else { Status::Unanswered };
    let status = slot.status;

    let score_update = self.scores.record_result(ex.id, result.is_correct);
    if let Some(u) = score_update {
      display.update_tab_score(u.tab_index, u.tab_completed);
      display.update_total_score(u.global_completed, u.global_total);
    }
    tracing::debug!(
      target: "exercise",
      id = ex.id, valid = normalized.is_valid(), correct = result.is_correct, score = result.score,
      "Evaluated input"
    );

    Ok(Evaluation {
      exercise_id: ex.id,
      status,
      feedback: feedback_html(&result),
      result,
      max_score: ex.max_score,
      score_update,
    })
  }
}

/// Markup for the feedback area: a check mark when correct, plus any message.
pub fn feedback_html(result: &ComparisonResult) -> String {
  match (result.is_correct, &result.message) {
    (true, None) => "<span class=\"party-check\">&#10003;</span>".into(),
    (true, Some(m)) => format!("<span class=\"party-check\">&#10003;</span><p class=\"feedback-message\">{m}</p>"),
    (false, Some(m)) => format!("<p class=\"feedback-hint\">{m}</p>"),
    (false, None) => String::new(),
  }
}
