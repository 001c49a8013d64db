//! WebSocket upgrade + message loop. Each connection owns one exercise session;
//! every client message may produce several server messages (tab scores,
//! previews, feedback), sent in order.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug, warn};
use uuid::Uuid;

use crate::domain::ExerciseId;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::render::HtmlSurface;
use crate::session::{Evaluation, ExerciseSession, ExerciseSurfaces, TabDisplay};
use crate::state::AppState;
use crate::util::trunc_for_log;

/// Collects display calls as outgoing messages.
#[derive(Default)]
pub struct Outbox {
  title: String,
  pub messages: Vec<ServerWsMessage>,
}

impl TabDisplay for Outbox {
  fn create_tabs(&mut self, _count: usize, names: &[String], totals: &[usize]) {
    self.messages.push(ServerWsMessage::Tabs {
      title: self.title.clone(),
      names: names.to_vec(),
      totals: totals.to_vec(),
    });
  }

  fn set_tab_content(&mut self, index: usize, content: &str) {
    self.messages.push(ServerWsMessage::TabContent { index, html: content.to_string() });
  }

  fn update_tab_score(&mut self, index: usize, completed: usize) {
    self.messages.push(ServerWsMessage::TabScore { index, completed });
  }

  fn update_total_score(&mut self, completed: usize, total: usize) {
    self.messages.push(ServerWsMessage::TotalScore { completed, total });
  }
}

/// Per-connection state.
#[derive(Default)]
pub struct Connection {
  session: Option<ExerciseSession<HtmlSurface>>,
}

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "markup_trainer", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state), fields(conn = %Uuid::new_v4()))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "markup_trainer", "WebSocket connected");
  let mut conn = Connection::default();
  'recv: while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let replies = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "markup_trainer", msg = %trunc_for_log(&txt, 120), "WS received");
            handle_client_ws(incoming, &state, &mut conn)
          }
          Err(e) => vec![ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }],
        };

        for reply in replies {
          let out = serde_json::to_string(&reply).unwrap_or_else(|e| {
            serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
          });
          if let Err(e) = socket.send(Message::Text(out)).await {
            error!(target: "markup_trainer", error = %e, "WS send error");
            break 'recv;
          }
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "markup_trainer", "WebSocket disconnected");
}

/// Dispatch one client message against the connection's session.
pub fn handle_client_ws(msg: ClientWsMessage, state: &AppState, conn: &mut Connection) -> Vec<ServerWsMessage> {
  match msg {
    ClientWsMessage::Ping => vec![ServerWsMessage::Pong],

    ClientWsMessage::LoadSet { exercise } => {
      let Some(set) = state.set(exercise.as_deref()) else {
        let name = exercise.unwrap_or_else(|| state.default_set.clone());
        warn!(target: "markup_trainer", set = %name, "WS unknown set requested");
        return vec![ServerWsMessage::Error { message: format!("Unknown exercise set: {name}") }];
      };
      let mut out = Outbox { title: set.title.clone(), messages: Vec::new() };
      let mut session: ExerciseSession<HtmlSurface> = ExerciseSession::build(Arc::clone(&set), &state.registry, &mut out);
      let evaluations = session.attach(|_| Some(ExerciseSurfaces::default()), &mut out);
      for ex in &set.exercises {
        if let Some(s) = session.surfaces(ex.id) {
          out.messages.push(ServerWsMessage::Example { exercise_id: ex.id, html: s.example.html().to_string() });
        }
      }
      for evaluation in evaluations {
        push_evaluation(&session, evaluation, &mut out);
      }
      info!(target: "markup_trainer", set = %set.name, "WS set loaded");
      conn.session = Some(session);
      out.messages
    }

    ClientWsMessage::Input { exercise_id, text } => {
      with_session(conn, exercise_id, false, |session, out| session.input_text(exercise_id, &text, out))
    }

    ClientWsMessage::FieldInput { exercise_id, field, value } => {
      with_session(conn, exercise_id, false, |session, out| session.input_field(exercise_id, &field, &value, out))
    }

    ClientWsMessage::Reset { exercise_id } => {
      // the client's controls still hold the edited text, so send the restored value back
      with_session(conn, exercise_id, true, |session, out| session.reset(exercise_id, out))
    }
  }
}

fn with_session<F>(conn: &mut Connection, id: ExerciseId, echo_input: bool, f: F) -> Vec<ServerWsMessage>
where
  F: FnOnce(&mut ExerciseSession<HtmlSurface>, &mut Outbox) -> Result<Evaluation, crate::error::SessionError>,
{
  let Some(session) = conn.session.as_mut() else {
    return vec![ServerWsMessage::Error { message: "No exercise set loaded".into() }];
  };
  let mut out = Outbox::default();
  match f(session, &mut out) {
    Ok(evaluation) => {
      if echo_input {
        if let Some(value) = session.input_value(id) {
          out.messages.push(ServerWsMessage::Input { exercise_id: id, value });
        }
      }
      push_evaluation(session, evaluation, &mut out);
    }
    Err(e) => {
      warn!(target: "exercise", id, error = %e, "WS input rejected");
      out.messages.push(ServerWsMessage::Error { message: e.to_string() });
    }
  }
  out.messages
}

/// Preview for the evaluated exercise, then its feedback.
fn push_evaluation(session: &ExerciseSession<HtmlSurface>, evaluation: Evaluation, out: &mut Outbox) {
  let id = evaluation.exercise_id;
  if let Some(s) = session.surfaces(id) {
    out.messages.push(ServerWsMessage::Preview { exercise_id: id, html: s.preview.html().to_string() });
  }
  out.messages.push(ServerWsMessage::Feedback { evaluation });
}
