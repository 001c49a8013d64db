//! Tab panel markup handed to the tab display.
//!
//! Element ids follow one scheme so hosts can find each exercise's surfaces:
//! `input{id}`, `{field}{id}`, `preview{id}`, `example{id}`, `feedback{id}`.

use crate::domain::{ExerciseDefinition, ExerciseSet, InputMode, TabInfo};
use crate::util::escape_attr;

pub const EXPLANATION_TAB: &str = "Explanation";

/// Panel for one scored tab: heading, instructions, then every exercise in it.
pub fn tab_content_html(set: &ExerciseSet, tab_index: usize, tab: &TabInfo) -> String {
  let questions: String = set
    .exercises
    .iter()
    .filter(|ex| ex.tab == tab.key)
    .enumerate()
    .map(|(i, ex)| exercise_html(ex, &format!("{}.{}", tab_index + 1, i + 1)))
    .collect();
  format!(
    "<div class=\"exercise-explanation\"><h2>{}</h2><p>{}</p></div><div class=\"tab-panel active\">{}</div>",
    tab.name, tab.instructions, questions
  )
}

/// Panel for the trailing explanation tab.
pub fn explanation_html(set: &ExerciseSet) -> String {
  match &set.explanation {
    Some(html) => format!(
      "<div class=\"exercise-explanation\"><h2>{EXPLANATION_TAB}</h2></div><div class=\"tab-panel active\"><div class=\"html-content\">{html}</div></div>"
    ),
    None => format!(
      "<div class=\"exercise-explanation\"><h2>{} - {EXPLANATION_TAB}</h2></div><div class=\"tab-panel active\"><p>No explanation available</p></div>",
      set.title
    ),
  }
}

fn exercise_html(ex: &ExerciseDefinition, number: &str) -> String {
  let id = ex.id;
  let input = match ex.input {
    InputMode::Textarea => format!(
      "<h3>Your code</h3><textarea id=\"input{id}\" class=\"code-input\" placeholder=\"{}\">{}</textarea>",
      escape_attr(ex.placeholder.as_deref().unwrap_or("Write your code here...")),
      escape_attr(ex.initial.as_text())
    ),
    InputMode::Fields => {
      let fields: String = ex
        .field_names()
        .into_iter()
        .map(|f| {
          format!(
            "<label data-label=\"{}\"><input type=\"text\" id=\"{f}{id}\" value=\"{}\" data-field=\"{f}\" class=\"field-input\" placeholder=\"e.g. 100px\"></label>",
            escape_attr(&ex.field_label(f)),
            escape_attr(ex.initial.field(f))
          )
        })
        .collect();
      format!("<h3>Your CSS properties</h3><div class=\"fields-container\">{fields}</div>")
    }
  };
  let title = ex
    .title
    .as_deref()
    .map(|t| format!("<p class=\"question-title\">{t}</p>"))
    .unwrap_or_default();
  let description = ex
    .description
    .as_deref()
    .map(|d| format!("<p class=\"question-description\">{d}</p>"))
    .unwrap_or_default();

  format!(
    concat!(
      "<div class=\"question-container\" data-exercise=\"{id}\">",
      "<div><h3>Question {number}</h3>{title}{description}</div>",
      "<div class=\"question-area\">",
      "<div class=\"input-area\">{input}<button class=\"reset-button\" data-reset=\"{id}\">Reset</button></div>",
      "<div class=\"preview-area\"><h3>Preview</h3><div class=\"preview-content\" id=\"preview{id}\"></div></div>",
      "<div class=\"example-area\"><h3>Example</h3><div class=\"example-content\" id=\"example{id}\"></div></div>",
      "<div class=\"feedback-area\"><h3>Feedback</h3><div class=\"feedback-content\" id=\"feedback{id}\"></div></div>",
      "</div></div>"
    ),
    id = id,
    number = number,
    title = title,
    description = description,
    input = input,
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{ExerciseKind, InitialInput};

  fn set() -> ExerciseSet {
    let mut fields = ExerciseDefinition::new(2, ExerciseKind::Css, "b", "", "");
    fields.input = InputMode::Fields;
    fields.fields = vec!["width".into(), "height".into()];
    fields.field_labels.insert("width".into(), "Width:".into());
    ExerciseSet {
      name: "s".into(),
      title: "Set".into(),
      tabs: vec![],
      exercises: vec![ExerciseDefinition::new(1, ExerciseKind::Html, "a", "", ""), fields],
      explanation: None,
    }
  }

  #[test]
  fn numbers_questions_per_tab() {
    let s = set();
    let html = tab_content_html(&s, 1, &s.tab_info("b"));
    assert!(html.contains("Question 2.1"));
    assert!(html.contains("id=\"width2\""));
    assert!(html.contains("data-label=\"Width:\""));
    assert!(html.contains("data-label=\"height:\""));
    assert!(html.contains("id=\"preview2\""));
    assert!(!html.contains("preview1"));
  }

  #[test]
  fn controls_start_with_the_initial_input() {
    let mut s = set();
    s.exercises[0].initial = InitialInput::Text("<td>\"a\" & b</td>".into());
    s.exercises[1].initial = InitialInput::Fields([("width".to_string(), "150px".to_string())].into_iter().collect());

    let html = tab_content_html(&s, 0, &s.tab_info("a"));
    assert!(html.contains("\">&lt;td&gt;&quot;a&quot; &amp; b&lt;/td&gt;</textarea>"));

    let html = tab_content_html(&s, 1, &s.tab_info("b"));
    assert!(html.contains("id=\"width2\" value=\"150px\""));
    assert!(html.contains("id=\"height2\" value=\"\""));
  }

  #[test]
  fn explanation_fallback() {
    assert!(explanation_html(&set()).contains("No explanation available"));
  }
}
