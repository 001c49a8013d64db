use std::sync::Arc;

use markup_trainer::declarations::parse;
use markup_trainer::domain::{ExerciseDefinition, ExerciseKind, ExerciseSet};
use markup_trainer::error::SessionError;
use markup_trainer::render::HtmlSurface;
use markup_trainer::seeds::builtin_sets;
use markup_trainer::session::{ExerciseSession, ExerciseSurfaces, Status, TabDisplay};
use markup_trainer::strategy::StrategyRegistry;

#[derive(Default)]
struct Tabs {
  names: Vec<String>,
  totals: Vec<usize>,
  completed: Vec<usize>,
  overall: (usize, usize),
}

impl TabDisplay for Tabs {
  fn create_tabs(&mut self, count: usize, names: &[String], totals: &[usize]) {
    self.names = names.to_vec();
    self.totals = totals.to_vec();
    self.completed = vec![0; count];
  }
  fn set_tab_content(&mut self, _index: usize, _content: &str) {}
  fn update_tab_score(&mut self, index: usize, completed: usize) {
    self.completed[index] = completed;
  }
  fn update_total_score(&mut self, completed: usize, total: usize) {
    self.overall = (completed, total);
  }
}

fn surfaces(_: u32) -> Option<ExerciseSurfaces<HtmlSurface>> {
  Some(ExerciseSurfaces::default())
}

fn single(ex: ExerciseDefinition) -> Arc<ExerciseSet> {
  Arc::new(ExerciseSet { name: "one".into(), title: "One".into(), tabs: vec![], exercises: vec![ex], explanation: None })
}

fn start(set: Arc<ExerciseSet>, tabs: &mut Tabs) -> ExerciseSession<HtmlSurface> {
  let mut session = ExerciseSession::build(set, &StrategyRegistry::with_builtins(), tabs);
  session.attach(surfaces, tabs);
  session
}

#[test]
fn correct_answer_scores_full_marks_and_completes_the_tab() {
  let mut ex = ExerciseDefinition::new(1, ExerciseKind::Generic, "sizes", "width: ; height: ;", "width: 100px; height: 50px;");
  ex.max_score = 5;
  let mut tabs = Tabs::default();
  let mut session = start(single(ex), &mut tabs);
  assert_eq!(tabs.completed[0], 0);

  let e = session.input_text(1, "width: 100px; height: 50px;", &mut tabs).unwrap();
  assert!(e.result.is_correct);
  assert_eq!(e.result.score, 5);
  assert!(session.scores().is_completed(1));
  assert_eq!((tabs.completed[0], tabs.totals[0]), (1, 1));
  assert_eq!(tabs.overall, (1, 1));
}

#[test]
fn reset_reverts_a_completed_exercise() {
  let ex = ExerciseDefinition::new(1, ExerciseKind::Generic, "sizes", "width: ;", "width: 100px;");
  let mut tabs = Tabs::default();
  let mut session = start(single(ex), &mut tabs);
  session.input_text(1, "width:100px;", &mut tabs).unwrap();
  assert_eq!(tabs.completed[0], 1);

  let e = session.reset(1, &mut tabs).unwrap();
  assert_eq!(e.status, Status::Unanswered);
  assert_eq!(session.current_input(1).as_deref(), Some("width: ;"));
  assert_eq!(tabs.completed[0], 0);
  assert_eq!(tabs.overall, (0, 1));
}

#[test]
fn case_only_difference_passes_with_warning() {
  let ex = ExerciseDefinition::new(1, ExerciseKind::Generic, "t", "", "width: 10px;");
  let mut tabs = Tabs::default();
  let mut session = start(single(ex), &mut tabs);
  let e = session.input_text(1, "WIDTH:10PX;", &mut tabs).unwrap();
  assert!(e.result.is_correct);
  assert!(e.feedback.contains("upper- and lowercase"));
}

#[test]
fn builtin_box_sizes_awards_partial_credit() {
  let set = builtin_sets(&StrategyRegistry::with_builtins())
    .into_iter()
    .find(|s| s.name == "box_sizes")
    .unwrap();
  let mut tabs = Tabs::default();
  let mut session = start(Arc::new(set), &mut tabs);

  let e = session.input_text(1, "width: 100px; height: 10px;", &mut tabs).unwrap();
  assert!(!e.result.is_correct);
  assert_eq!(e.result.score, 3);
  let preview = session.surfaces(1).unwrap().preview.html().to_string();
  assert!(preview.contains("<style>"));
  assert!(preview.contains(".box { width: 100px; height: 10px; }"));

  let e = session.input_text(1, "width: 100px; height: 50px;", &mut tabs).unwrap();
  assert!(e.result.is_correct);
  assert_eq!(e.result.score, 5);
  assert_eq!(tabs.completed[0], 1);
}

#[test]
fn builtin_box_model_fields_reach_completion() {
  let set = builtin_sets(&StrategyRegistry::with_builtins())
    .into_iter()
    .find(|s| s.name == "box_model")
    .unwrap();
  let solution = parse(&set.exercise(1).unwrap().solution);
  let mut tabs = Tabs::default();
  let mut session = start(Arc::new(set), &mut tabs);
  assert_eq!(tabs.names.last().map(String::as_str), Some("Explanation"));

  let mut last = None;
  for (field, value) in solution.iter() {
    last = Some(session.input_field(1, field, value, &mut tabs).unwrap());
  }
  assert_eq!(last.map(|e| e.status), Some(Status::Correct));
  assert!(session.surfaces(1).unwrap().preview.html().contains("#C3D08B"));

  let err = session.input_field(1, "colour", "red", &mut tabs).unwrap_err();
  assert_eq!(err, SessionError::UnknownField { id: 1, field: "colour".into() });
}
