//! Input classification: decides whether raw learner text is worth comparing.
//!
//! Checks are intentionally shallow (character presence, not tag matching).

use serde::Serialize;
use tracing::debug;

use crate::domain::ExerciseKind;

/// Result of normalizing one input event.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NormalizedInput {
  Valid { content: String },
  Invalid { reason: String },
}

impl NormalizedInput {
  pub fn valid(content: impl Into<String>) -> Self { Self::Valid { content: content.into() } }
  pub fn invalid(reason: impl Into<String>) -> Self { Self::Invalid { reason: reason.into() } }

  pub fn is_valid(&self) -> bool { matches!(self, Self::Valid { .. }) }

  pub fn content(&self) -> Option<&str> {
    match self {
      Self::Valid { content } => Some(content),
      Self::Invalid { .. } => None,
    }
  }
}

/// Replaceable normalization step. Closures with the same shape qualify.
pub trait Normalizer: Send + Sync {
  fn normalize(&self, raw: &str, kind: ExerciseKind) -> NormalizedInput;
}

impl<F> Normalizer for F
where
  F: Fn(&str, ExerciseKind) -> NormalizedInput + Send + Sync,
{
  fn normalize(&self, raw: &str, kind: ExerciseKind) -> NormalizedInput { self(raw, kind) }
}

/// Per-kind validation used when an exercise brings no normalizer of its own.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultNormalizer;

impl Normalizer for DefaultNormalizer {
  fn normalize(&self, raw: &str, kind: ExerciseKind) -> NormalizedInput { normalize(raw, kind) }
}

pub fn normalize(raw: &str, kind: ExerciseKind) -> NormalizedInput {
  let cleaned = raw.trim();
  let out = match kind {
    ExerciseKind::Html => normalize_html(cleaned),
    ExerciseKind::Css => normalize_css(cleaned),
    ExerciseKind::Generic => NormalizedInput::valid(cleaned),
  };
  debug!(target: "exercise", ?kind, raw_len = raw.len(), valid = out.is_valid(), "normalized input");
  out
}

fn normalize_html(input: &str) -> NormalizedInput {
  if !input.contains('<') || !input.contains('>') {
    return NormalizedInput::invalid("HTML must contain valid tags");
  }
  let opens = input.matches('<').count();
  let closes = input.matches('>').count();
  if opens == 0 || closes == 0 {
    return NormalizedInput::invalid("HTML must contain opening and closing tags");
  }
  NormalizedInput::valid(input)
}

fn normalize_css(input: &str) -> NormalizedInput {
  if input.is_empty() {
    return NormalizedInput::invalid("CSS must not be empty");
  }
  if !input.contains('{') || !input.contains('}') {
    return NormalizedInput::invalid("CSS must contain a selector and a declaration block");
  }
  NormalizedInput::valid(input)
}

/// Accepts bare declarations (`width: 10px;`) by wrapping them in a selector.
/// Text that already has a block passes through unchanged.
#[derive(Clone, Debug)]
pub struct WrapBareDeclarations {
  pub selector: String,
}

impl Default for WrapBareDeclarations {
  fn default() -> Self { Self { selector: ".box".into() } }
}

impl Normalizer for WrapBareDeclarations {
  fn normalize(&self, raw: &str, _kind: ExerciseKind) -> NormalizedInput {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
      return NormalizedInput::invalid("CSS must not be empty");
    }
    if cleaned.contains('{') && cleaned.contains('}') {
      return NormalizedInput::valid(raw);
    }
    NormalizedInput::valid(format!("{} {{ {} }}", self.selector, cleaned))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn html_needs_angle_brackets() {
    assert!(!normalize("plain text", ExerciseKind::Html).is_valid());
    assert!(!normalize("<div", ExerciseKind::Html).is_valid());
    assert!(!normalize("   ", ExerciseKind::Html).is_valid());
    assert_eq!(
      normalize("  <p>hi</p>\n", ExerciseKind::Html),
      NormalizedInput::valid("<p>hi</p>")
    );
  }

  #[test]
  fn html_check_is_count_based_only() {
    // unbalanced tags still pass
    assert!(normalize("<div><span>", ExerciseKind::Html).is_valid());
  }

  #[test]
  fn css_needs_a_block() {
    assert_eq!(
      normalize("", ExerciseKind::Css),
      NormalizedInput::invalid("CSS must not be empty")
    );
    assert!(!normalize("width: 10px;", ExerciseKind::Css).is_valid());
    assert!(!normalize(".a { width: 10px;", ExerciseKind::Css).is_valid());
    assert!(normalize(".a { width: 10px; }", ExerciseKind::Css).is_valid());
  }

  #[test]
  fn generic_is_always_valid() {
    assert_eq!(normalize(" x ", ExerciseKind::Generic).content(), Some("x"));
  }

  #[test]
  fn wraps_bare_declarations() {
    let n = WrapBareDeclarations::default();
    assert_eq!(
      n.normalize(" width: 50px; ", ExerciseKind::Css).content(),
      Some(".box { width: 50px; }")
    );
    assert_eq!(
      n.normalize(".x { a: b }", ExerciseKind::Css).content(),
      Some(".x { a: b }")
    );
    assert!(!n.normalize("  ", ExerciseKind::Css).is_valid());
  }

  #[test]
  fn closures_are_normalizers() {
    let upper = |raw: &str, _: ExerciseKind| NormalizedInput::valid(raw.to_uppercase());
    let n: &dyn Normalizer = &upper;
    assert_eq!(n.normalize("ab", ExerciseKind::Generic).content(), Some("AB"));
  }
}
