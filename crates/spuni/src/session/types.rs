//! Session types and error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// Sampling temperature used when a call does not specify one.
///
/// Zero selects greedy decoding.
pub const DEFAULT_TEMPERATURE: f32 = 0.0;

/// Errors that can occur when building or using a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No checkpoint path was configured before `build`.
    #[error("no checkpoint configured; call .checkpoint(path) before building")]
    MissingCheckpoint,

    /// The loader failed to produce a model.
    #[error("failed to load model from '{}': {source}", .checkpoint.display())]
    LoadFailed {
        checkpoint: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// Inference failed in the model.
    #[error("inference failed: {0}")]
    InferenceFailed(#[from] anyhow::Error),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Per-call options for [`Session::infer_next_token`].
///
/// [`Session::infer_next_token`]: crate::session::Session::infer_next_token
#[derive(Debug, Clone, Copy, Default)]
pub struct InferOptions {
    /// Sampling temperature for this call; falls back to the session
    /// default when unset.
    pub temperature: Option<f32>,

    /// Marks the start of a generation unrelated to any previous call.
    pub new_request: bool,
}

impl InferOptions {
    /// Options for the first call of a fresh generation.
    pub fn new_request() -> Self {
        Self {
            temperature: None,
            new_request: true,
        }
    }

    /// Options with an explicit temperature.
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            new_request: false,
        }
    }
}
