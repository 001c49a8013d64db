//! Domain models: exercise kinds, scoring policies, exercise definitions and sets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type ExerciseId = u32;

/// What the learner is writing.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
  /// Markup, previewed as HTML.
  Html,
  /// A stylesheet applied to the exercise's HTML fragment.
  Css,
  /// Anything else; previewed verbatim.
  #[default]
  Generic,
}

/// How the learner enters an answer.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
  #[default]
  Textarea,
  /// One text field per CSS property (see `ExerciseDefinition::fields`).
  Fields,
}

/// Comparison policy used when no custom comparator is installed.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
  /// Whitespace-insensitive text equality, with a case-insensitive fallback.
  #[default]
  Structural,
  /// Same declarations, same values, nothing extra. All-or-nothing.
  PropertySet,
  /// Partial credit per matching solution property.
  Proportional,
}

/// Initial answer: plain text, or a value per field for field-mode exercises.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum InitialInput {
  Text(String),
  Fields(BTreeMap<String, String>),
}
impl Default for InitialInput {
  fn default() -> Self { InitialInput::Text(String::new()) }
}

impl InitialInput {
  pub fn as_text(&self) -> &str {
    match self {
      InitialInput::Text(s) => s,
      InitialInput::Fields(_) => "",
    }
  }

  pub fn field(&self, name: &str) -> &str {
    match self {
      InitialInput::Fields(m) => m.get(name).map(String::as_str).unwrap_or(""),
      InitialInput::Text(_) => "",
    }
  }
}

/// Properties shown when a field-mode exercise names none.
pub const DEFAULT_FIELDS: [&str; 5] = ["width", "height", "margin", "padding", "border"];

/// One exercise, immutable once loaded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExerciseDefinition {
  pub id: ExerciseId,
  #[serde(default)] pub kind: ExerciseKind,
  pub tab: String,
  #[serde(default)] pub title: Option<String>,
  #[serde(default)] pub description: Option<String>,
  #[serde(default)] pub initial: InitialInput,
  pub solution: String,
  /// Markup the learner's CSS is applied to (css exercises).
  #[serde(default)] pub html: Option<String>,
  #[serde(default)] pub input: InputMode,
  #[serde(default)] pub fields: Vec<String>,
  #[serde(default)] pub field_labels: BTreeMap<String, String>,
  #[serde(default)] pub placeholder: Option<String>,
  #[serde(default = "default_max_score")] pub max_score: u32,
  #[serde(default)] pub policy: ScoringPolicy,

  // Named strategy overrides, resolved through `strategy::StrategyRegistry`.
  #[serde(default)] pub normalizer: Option<String>,
  #[serde(default)] pub comparator: Option<String>,
  #[serde(default)] pub preview: Option<String>,
  #[serde(default)] pub example: Option<String>,
}

fn default_max_score() -> u32 { 1 }

impl ExerciseDefinition {
  /// Minimal textarea exercise; remaining fields take their defaults.
  pub fn new(id: ExerciseId, kind: ExerciseKind, tab: &str, initial: &str, solution: &str) -> Self {
    Self {
      id,
      kind,
      tab: tab.to_string(),
      title: None,
      description: None,
      initial: InitialInput::Text(initial.to_string()),
      solution: solution.to_string(),
      html: None,
      input: InputMode::Textarea,
      fields: Vec::new(),
      field_labels: BTreeMap::new(),
      placeholder: None,
      max_score: 1,
      policy: ScoringPolicy::Structural,
      normalizer: None,
      comparator: None,
      preview: None,
      example: None,
    }
  }

  /// Field names in display order.
  pub fn field_names(&self) -> Vec<&str> {
    if self.fields.is_empty() {
      DEFAULT_FIELDS.to_vec()
    } else {
      self.fields.iter().map(String::as_str).collect()
    }
  }

  pub fn field_label(&self, field: &str) -> String {
    self
      .field_labels
      .get(field)
      .cloned()
      .unwrap_or_else(|| format!("{field}:"))
  }
}

/// A tab header: display name plus instructions shown above its exercises.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TabInfo {
  pub key: String,
  pub name: String,
  #[serde(default)] pub instructions: String,
}

/// A complete exercise set, selected by name at startup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExerciseSet {
  #[serde(default)] pub name: String,
  pub title: String,
  #[serde(default)] pub tabs: Vec<TabInfo>,
  pub exercises: Vec<ExerciseDefinition>,
  /// HTML for a trailing, unscored explanation tab.
  #[serde(default)] pub explanation: Option<String>,
}

impl ExerciseSet {
  /// Tab keys in order of first use by an exercise.
  pub fn tab_order(&self) -> Vec<&str> {
    let mut keys: Vec<&str> = Vec::new();
    for ex in &self.exercises {
      if !keys.contains(&ex.tab.as_str()) {
        keys.push(&ex.tab);
      }
    }
    keys
  }

  /// Header for `key`. Tabs without an entry are named after their key.
  pub fn tab_info(&self, key: &str) -> TabInfo {
    self
      .tabs
      .iter()
      .find(|t| t.key == key)
      .cloned()
      .unwrap_or_else(|| TabInfo { key: key.to_string(), name: key.to_string(), instructions: String::new() })
  }

  pub fn exercise(&self, id: ExerciseId) -> Option<&ExerciseDefinition> {
    self.exercises.iter().find(|e| e.id == id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tab_order_follows_first_use() {
    let set = ExerciseSet {
      name: "t".into(),
      title: "T".into(),
      tabs: vec![],
      exercises: vec![
        ExerciseDefinition::new(1, ExerciseKind::Html, "b", "", ""),
        ExerciseDefinition::new(2, ExerciseKind::Html, "a", "", ""),
        ExerciseDefinition::new(3, ExerciseKind::Html, "b", "", ""),
      ],
      explanation: None,
    };
    assert_eq!(set.tab_order(), vec!["b", "a"]);
    assert_eq!(set.tab_info("a").name, "a");
  }

  #[test]
  fn field_defaults() {
    let ex = ExerciseDefinition::new(1, ExerciseKind::Css, "t", "", "");
    assert_eq!(ex.field_names(), DEFAULT_FIELDS.to_vec());
    assert_eq!(ex.field_label("width"), "width:");
  }

  #[test]
  fn initial_input_accepts_text_or_table() {
    #[derive(Deserialize)]
    struct Wrap { initial: InitialInput }
    let w: Wrap = toml::from_str("initial = 'width: ;'").unwrap();
    assert_eq!(w.initial.as_text(), "width: ;");
    let w: Wrap = toml::from_str("initial = { width = '150px' }").unwrap();
    assert_eq!(w.initial.field("width"), "150px");
    assert_eq!(w.initial.field("height"), "");
  }
}
