//! Markup Trainer: an interactive HTML/CSS exercise engine.
//!
//! The core (parse, normalize, render, compare, score, session) performs no
//! I/O; the host drives it through the `TabDisplay` and `RenderTarget` traits.
//! The `routes` module is the axum host used by the `markup-trainer` binary.

pub mod compare;
pub mod config;
pub mod declarations;
pub mod domain;
pub mod error;
pub mod layout;
pub mod normalize;
pub mod protocol;
pub mod render;
pub mod routes;
pub mod score;
pub mod scoping;
pub mod seeds;
pub mod session;
pub mod state;
pub mod strategy;
pub mod telemetry;
pub mod util;
