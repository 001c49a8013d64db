//! Answer comparison under the three scoring policies.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::declarations::{parse, DeclarationMap};
use crate::domain::ScoringPolicy;
use crate::normalize::NormalizedInput;
use crate::util::strip_whitespace;

pub const CASE_WARNING: &str = "Correct! Mind upper- and lowercase letters.";

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
  pub is_correct: bool,
  pub score: u32,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl ComparisonResult {
  pub fn correct(score: u32) -> Self { Self { is_correct: true, score, message: None } }
  pub fn incorrect() -> Self { Self { is_correct: false, score: 0, message: None } }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = Some(message.into());
    self
  }
}

/// Replaceable comparison step.
pub trait Comparator: Send + Sync {
  fn compare(&self, input: &NormalizedInput, solution: &str, max_score: u32) -> ComparisonResult;
}

impl<F> Comparator for F
where
  F: Fn(&NormalizedInput, &str, u32) -> ComparisonResult + Send + Sync,
{
  fn compare(&self, input: &NormalizedInput, solution: &str, max_score: u32) -> ComparisonResult {
    self(input, solution, max_score)
  }
}

/// Comparator backed by one of the built-in policies.
#[derive(Clone, Copy, Debug, Default)]
pub struct PolicyComparator(pub ScoringPolicy);

impl Comparator for PolicyComparator {
  fn compare(&self, input: &NormalizedInput, solution: &str, max_score: u32) -> ComparisonResult {
    compare(input, solution, self.0, max_score)
  }
}

#[instrument(level = "debug", skip(input, solution), fields(solution_len = solution.len()))]
pub fn compare(
  input: &NormalizedInput,
  solution: &str,
  policy: ScoringPolicy,
  max_score: u32,
) -> ComparisonResult {
  let content = match input {
    NormalizedInput::Valid { content } => content,
    NormalizedInput::Invalid { reason } => {
      return ComparisonResult::incorrect().with_message(reason.clone());
    }
  };
  let result = match policy {
    ScoringPolicy::Structural => structural(content, solution, max_score),
    ScoringPolicy::PropertySet => property_set(content, solution, max_score),
    ScoringPolicy::Proportional => proportional(content, solution, max_score),
  };
  debug!(target: "exercise", correct = result.is_correct, score = result.score, "compared answer");
  result
}

/// Whitespace-insensitive equality; a case-only difference still passes with a warning.
pub fn structural(content: &str, solution: &str, max_score: u32) -> ComparisonResult {
  let input = strip_whitespace(content);
  let expected = strip_whitespace(solution);
  if input == expected {
    return ComparisonResult::correct(max_score);
  }
  if input.to_lowercase() == expected.to_lowercase() {
    return ComparisonResult::correct(max_score).with_message(CASE_WARNING);
  }
  ComparisonResult::incorrect()
}

/// Same property set with identical values. No partial credit.
pub fn property_set(content: &str, solution: &str, max_score: u32) -> ComparisonResult {
  let input = parse(content);
  let expected = parse(solution);
  if same_declarations(&input, &expected) {
    ComparisonResult::correct(max_score)
  } else {
    ComparisonResult::incorrect()
  }
}

fn same_declarations(input: &DeclarationMap, expected: &DeclarationMap) -> bool {
  // the parser already drops empty values on both sides
  input.len() == expected.len()
    && expected.iter().all(|(k, v)| input.get(k) == Some(v))
}

/// Score proportional to the share of solution properties matched.
pub fn proportional(content: &str, solution: &str, max_score: u32) -> ComparisonResult {
  let input = parse(content);
  let expected = parse(solution);
  let total = expected.len();
  let matched = expected.iter().filter(|(k, v)| input.get(k) == Some(*v)).count();

  if matched == total {
    return ComparisonResult::correct(max_score);
  }
  let score = (matched as f64 / total as f64 * f64::from(max_score)).round() as u32;
  ComparisonResult {
    is_correct: false,
    score,
    message: Some(format!("Correct: {matched}/{total} properties. Try again!")),
  }
}
