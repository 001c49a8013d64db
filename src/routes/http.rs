//! HTTP endpoint handlers: catalog browsing and stateless evaluation.

use std::sync::Arc;
use axum::{extract::{State, Query}, http::StatusCode, Json, response::IntoResponse};
use tracing::{info, instrument, warn};

use crate::error::EvaluateError;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_list_sets(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let sets: Vec<SetSummary> = state
    .sets()
    .map(|s| SetSummary { name: s.name.clone(), title: s.title.clone(), exercises: s.exercises.len() })
    .collect();
  Json(sets)
}

#[instrument(level = "info", skip(state), fields(exercise = ?q.exercise))]
pub async fn http_get_set(
  State(state): State<Arc<AppState>>,
  Query(q): Query<SetQuery>,
) -> axum::response::Response {
  match state.set(q.exercise.as_deref()) {
    Some(set) => {
      info!(target: "markup_trainer", set = %set.name, "HTTP set served");
      Json(to_set_out(&set)).into_response()
    }
    None => {
      let name = q.exercise.unwrap_or_else(|| state.default_set.clone());
      warn!(target: "markup_trainer", set = %name, "HTTP unknown set requested");
      (StatusCode::NOT_FOUND, Json(ErrorOut { message: format!("Unknown exercise set: {name}") })).into_response()
    }
  }
}

#[instrument(level = "info", skip(state, body), fields(exercise = ?body.exercise, id = body.exercise_id, answer_len = body.answer.len()))]
pub async fn http_post_evaluate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<EvaluateIn>,
) -> axum::response::Response {
  match state.evaluate(body.exercise.as_deref(), body.exercise_id, &body.answer) {
    Ok((result, max_score)) => {
      info!(target: "exercise", id = body.exercise_id, correct = result.is_correct, score = result.score, "HTTP answer evaluated");
      Json(EvaluateOut { correct: result.is_correct, score: result.score, max_score, message: result.message })
        .into_response()
    }
    Err(e) => {
      let status = match e {
        EvaluateError::Disabled(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::NOT_FOUND,
      };
      warn!(target: "exercise", id = body.exercise_id, error = %e, "HTTP evaluation rejected");
      (status, Json(ErrorOut { message: e.to_string() })).into_response()
    }
  }
}
