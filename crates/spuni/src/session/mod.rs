//! Stateful next-token inference sessions.
//!
//! A [`Session`] owns one loaded model and the decoding state for one
//! logical generation stream. Callers hand it the full token sequence on
//! every call; the session feeds the model only what the previous call
//! did not already cover.

mod builder;
mod model;
mod types;

pub use builder::SessionBuilder;
pub use model::Session;
pub use types::{InferOptions, SessionError, SessionResult, DEFAULT_TEMPERATURE};
