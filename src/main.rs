//! Markup Trainer backend
//!
//! - Axum HTTP + WebSocket API, one exercise session per WebSocket connection
//! - Built-in exercise sets, optionally overridden from a directory of TOML files
//! - Static frontend fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT             : u16 (default 3000)
//!   EXERCISE_DIR     : directory of `*.toml` exercise sets
//!   DEFAULT_EXERCISE : set served when a client names none (default "tables")
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use markup_trainer::config::AppConfig;
use markup_trainer::routes::build_router;
use markup_trainer::state::AppState;
use markup_trainer::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let config = AppConfig::from_env();
  info!(target: "markup_trainer", port = config.port, exercise_dir = ?config.exercise_dir, "Configuration loaded");

  // Catalog is built once; sessions live per WebSocket connection.
  let state = Arc::new(AppState::new(&config));
  let app = build_router(state);

  let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
  let listener = TcpListener::bind(addr).await?;
  info!(target: "markup_trainer", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
