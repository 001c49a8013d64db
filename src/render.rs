//! Preview rendering into opaque render targets.
//!
//! The engine only ever clears a target and appends HTML to it. What a target
//! does with that HTML (DOM, string buffer, websocket frame) is the host's
//! business.

use tracing::{debug, instrument};

use crate::declarations::{parse, DeclarationMap};
use crate::domain::{ExerciseDefinition, ExerciseKind, InputMode};
use crate::scoping::{scope, ScopeIds};
use crate::util::escape_attr;

/// A surface the engine can repopulate.
pub trait RenderTarget {
  fn clear(&mut self);
  fn append_html(&mut self, html: &str);
}

/// In-memory target holding the rendered HTML.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HtmlSurface {
  html: String,
}

impl HtmlSurface {
  pub fn new() -> Self { Self::default() }
  pub fn html(&self) -> &str { &self.html }
}

impl RenderTarget for HtmlSurface {
  fn clear(&mut self) { self.html.clear(); }
  fn append_html(&mut self, html: &str) { self.html.push_str(html); }
}

/// Which of the two per-exercise surfaces is being drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Surface {
  /// Live preview of the learner's input.
  Preview,
  /// Static worked example built from the solution.
  Example,
}

impl Surface {
  fn scope_ids(self) -> &'static ScopeIds {
    match self {
      Surface::Preview => &ScopeIds::PREVIEW,
      Surface::Example => &ScopeIds::EXAMPLE,
    }
  }
}

/// Everything a renderer may look at for one draw.
#[derive(Clone, Copy, Debug)]
pub struct RenderRequest<'a> {
  pub exercise: &'a ExerciseDefinition,
  pub surface: Surface,
  /// Normalized input (preview) or solution (example).
  pub content: &'a str,
  /// Current field values for field-mode previews.
  pub fields: Option<&'a DeclarationMap>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
  Handled,
  /// The renderer does not apply; the default rendering runs instead.
  Declined,
}

/// Replaceable renderer for css exercises.
pub trait PreviewRenderer: Send + Sync {
  fn render(&self, request: &RenderRequest<'_>, target: &mut dyn RenderTarget) -> RenderOutcome;
}

/// Draw `request` into `target`, giving `custom` the first chance on css exercises.
#[instrument(level = "debug", skip_all, fields(id = request.exercise.id, surface = ?request.surface))]
pub fn render_exercise(
  custom: Option<&dyn PreviewRenderer>,
  request: &RenderRequest<'_>,
  target: &mut dyn RenderTarget,
) {
  let kind = request.exercise.kind;
  if kind == ExerciseKind::Css {
    if let Some(renderer) = custom {
      if renderer.render(request, target) == RenderOutcome::Handled {
        return;
      }
      debug!(target: "exercise", id = request.exercise.id, "custom renderer declined; using scoped css");
    }
  }
  render(
    kind,
    request.exercise.html.as_deref(),
    request.content,
    target,
    request.surface.scope_ids(),
  );
}

/// Default rendering per exercise kind. Never fails; garbage renders as garbage.
pub fn render(
  kind: ExerciseKind,
  html_fragment: Option<&str>,
  content: &str,
  target: &mut dyn RenderTarget,
  ids: &ScopeIds,
) {
  target.clear();
  match kind {
    ExerciseKind::Html => match extract_table(content) {
      Some(table) => target.append_html(table),
      None => target.append_html(content),
    },
    ExerciseKind::Css => {
      let id = ids.next_id();
      let css = scope(content, &format!("#{id}"));
      target.append_html(&format!("<style>{css}</style>"));
      target.append_html(&format!(
        "<div id=\"{id}\">{}</div>",
        html_fragment.unwrap_or_default()
      ));
    }
    ExerciseKind::Generic => target.append_html(content),
  }
}

/// The outermost `<table>` element in `html`, if any.
///
/// Nested tables are matched by depth. An unclosed table runs to the end of
/// the input, the way a browser would auto-close it.
pub fn extract_table(html: &str) -> Option<&str> {
  let lower = html.to_ascii_lowercase();
  let start = find_open_tag(&lower, 0)?;

  let mut depth = 0usize;
  let mut pos = start;
  loop {
    let next_open = find_open_tag(&lower, pos);
    let next_close = lower[pos..].find("</table").map(|i| pos + i);
    match (next_open, next_close) {
      (Some(o), Some(c)) if o < c => {
        depth += 1;
        pos = o + "<table".len();
      }
      (_, Some(c)) => {
        depth = depth.saturating_sub(1);
        let end = lower[c..].find('>').map(|i| c + i + 1).unwrap_or(html.len());
        if depth == 0 {
          return Some(&html[start..end]);
        }
        pos = end;
      }
      (Some(o), None) => {
        depth += 1;
        pos = o + "<table".len();
      }
      (None, None) => return Some(&html[start..]),
    }
  }
}

fn find_open_tag(lower: &str, from: usize) -> Option<usize> {
  let mut pos = from;
  while let Some(i) = lower[pos..].find("<table") {
    let at = pos + i;
    let after = lower[at + "<table".len()..].chars().next();
    match after {
      None => return Some(at),
      Some(c) if c == '>' || c == '/' || c.is_whitespace() => return Some(at),
      _ => pos = at + "<table".len(),
    }
  }
  None
}

/// Four nested layers (margin, border, padding, content), each sized from a
/// named value rather than from applied CSS.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoxModelRenderer;

pub const MARGIN_COLOR: &str = "#F9CC9D";
pub const BORDER_COLOR: &str = "#FDDD9B";
pub const PADDING_COLOR: &str = "#C3D08B";
pub const CONTENT_COLOR: &str = "#8CB6C0";

impl PreviewRenderer for BoxModelRenderer {
  fn render(&self, request: &RenderRequest<'_>, target: &mut dyn RenderTarget) -> RenderOutcome {
    let parsed;
    let values = match (request.surface, request.fields) {
      (Surface::Preview, Some(fields)) => fields,
      (Surface::Preview, None) if request.exercise.input == InputMode::Fields => {
        parsed = DeclarationMap::new();
        &parsed
      }
      (Surface::Preview, None) => return RenderOutcome::Declined,
      (Surface::Example, _) => {
        parsed = parse(request.content);
        &parsed
      }
    };
    target.clear();
    target.append_html(&box_model_html(values));
    RenderOutcome::Handled
  }
}

pub fn box_model_html(values: &DeclarationMap) -> String {
  let v = |name: &str, fallback: &str| escape_attr(values.get(name).unwrap_or(fallback));
  format!(
    concat!(
      "<div class=\"box-model\" style=\"display: flex; align-items: center; justify-content: center; ",
      "width: 100%; height: 200px; background-color: #f0f0f0; border: 1px solid #ccc;\">",
      "<div class=\"box-margin\" style=\"background-color: {mc}; padding: {margin}; display: inline-block;\">",
      "<div class=\"box-border\" style=\"background-color: {bc}; padding: {border};\">",
      "<div class=\"box-padding\" style=\"background-color: {pc}; padding: {padding};\">",
      "<div class=\"box-content\" style=\"background-color: {cc}; width: {width}; height: {height}; ",
      "display: flex; align-items: center; justify-content: center; color: white; ",
      "font-weight: bold; font-size: 12px;\">Content</div>",
      "</div></div></div></div>"
    ),
    mc = MARGIN_COLOR,
    bc = BORDER_COLOR,
    pc = PADDING_COLOR,
    cc = CONTENT_COLOR,
    margin = v("margin", "0"),
    border = v("border", "0"),
    padding = v("padding", "0"),
    width = v("width", "50px"),
    height = v("height", "50px"),
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  fn exercise(kind: ExerciseKind) -> ExerciseDefinition {
    ExerciseDefinition::new(1, kind, "t", "", "")
  }

  #[test]
  fn html_renders_only_the_table() {
    let mut t = HtmlSurface::new();
    render(
      ExerciseKind::Html,
      None,
      "junk <b> <table><tr><td>x</td></tr></table> trailing",
      &mut t,
      &ScopeIds::PREVIEW,
    );
    assert_eq!(t.html(), "<table><tr><td>x</td></tr></table>");
  }

  #[test]
  fn html_without_table_is_verbatim() {
    let mut t = HtmlSurface::new();
    t.append_html("stale");
    render(ExerciseKind::Html, None, "<div>a</div>", &mut t, &ScopeIds::PREVIEW);
    assert_eq!(t.html(), "<div>a</div>");
  }

  #[test]
  fn nested_and_unclosed_tables() {
    let nested = "<TABLE class=\"a\"><tr><td><table><tr></tr></table></td></tr></TABLE><p>";
    assert_eq!(
      extract_table(nested),
      Some("<TABLE class=\"a\"><tr><td><table><tr></tr></table></td></tr></TABLE>")
    );
    assert_eq!(extract_table("x<table><tr>"), Some("<table><tr>"));
    assert_eq!(extract_table("<tablet>"), None);
    assert_eq!(extract_table("no markup"), None);
  }

  #[test]
  fn css_is_scoped_to_a_fresh_container() {
    let mut t = HtmlSurface::new();
    render(
      ExerciseKind::Css,
      Some("<div class=\"box\">Box</div>"),
      ".box { color: red; }",
      &mut t,
      &ScopeIds::PREVIEW,
    );
    let html = t.html();
    let id_start = html.find("id=\"").unwrap() + 4;
    let id_end = html[id_start..].find('"').unwrap() + id_start;
    let id = &html[id_start..id_end];
    assert!(id.starts_with("preview-"));
    assert!(html.starts_with(&format!("<style>#{id} .box {{ color: red; }}</style>")));
    assert!(html.ends_with("<div class=\"box\">Box</div></div>"));
  }

  #[test]
  fn generic_is_verbatim() {
    let mut t = HtmlSurface::new();
    render(ExerciseKind::Generic, None, "hello <i>", &mut t, &ScopeIds::PREVIEW);
    assert_eq!(t.html(), "hello <i>");
  }

  #[test]
  fn box_model_uses_field_values() {
    let mut ex = exercise(ExerciseKind::Css);
    ex.input = InputMode::Fields;
    let fields = parse("width: 50px; margin: 10px;");
    let req = RenderRequest { exercise: &ex, surface: Surface::Preview, content: "", fields: Some(&fields) };
    let mut t = HtmlSurface::new();
    assert_eq!(BoxModelRenderer.render(&req, &mut t), RenderOutcome::Handled);
    assert!(t.html().contains("padding: 10px; display: inline-block"));
    assert!(t.html().contains("width: 50px; height: 50px"));
    assert!(t.html().contains(BORDER_COLOR));
  }

  #[test]
  fn box_model_declines_textarea_previews() {
    let mut ex = exercise(ExerciseKind::Css);
    ex.html = Some("<div class=\"box\">Box</div>".into());
    let req = RenderRequest {
      exercise: &ex,
      surface: Surface::Preview,
      content: ".box { width: 5px; }",
      fields: None,
    };
    let mut t = HtmlSurface::new();
    assert_eq!(BoxModelRenderer.render(&req, &mut t), RenderOutcome::Declined);

    // falls back to scoped css
    render_exercise(Some(&BoxModelRenderer), &req, &mut t);
    assert!(t.html().contains(".box { width: 5px; }"));
    assert!(t.html().contains("<div class=\"box\">Box</div>"));
  }

  #[test]
  fn box_model_example_reads_solution() {
    let ex = exercise(ExerciseKind::Css);
    let req = RenderRequest {
      exercise: &ex,
      surface: Surface::Example,
      content: "width: 80px; border: 3px;",
      fields: None,
    };
    let mut t = HtmlSurface::new();
    render_exercise(Some(&BoxModelRenderer), &req, &mut t);
    assert!(t.html().contains("width: 80px"));
    assert!(t.html().contains("padding: 3px;\"><div class=\"box-padding\""));
  }

  #[test]
  fn custom_renderer_ignored_for_html() {
    let ex = exercise(ExerciseKind::Html);
    let req = RenderRequest { exercise: &ex, surface: Surface::Example, content: "<p>x</p>", fields: None };
    let mut t = HtmlSurface::new();
    render_exercise(Some(&BoxModelRenderer), &req, &mut t);
    assert_eq!(t.html(), "<p>x</p>");
  }
}
