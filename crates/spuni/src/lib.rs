//! spuni - incremental next-token inference with explicit device selection
//!
//! This crate wraps a decoder language model behind a small stateful
//! session: the caller supplies the full token sequence on every call and
//! gets the next token back, while the session tracks how much of the
//! previous call's sequence is still valid and avoids resending it.
//!
//! The model itself is pluggable: anything implementing
//! [`DecoderModel`] can be driven, and a [`ModelLoader`] binds a
//! checkpoint to an explicitly chosen [`Device`] before any inference
//! happens.
//!
//! ```ignore
//! use spuni::{InferOptions, Session};
//!
//! let mut session = Session::builder()
//!     .checkpoint("/models/my-model")
//!     .cpu()
//!     .build(&loader)?;
//!
//! let next = session.infer_next_token(&[1, 2, 3], InferOptions::new_request())?;
//! ```

pub mod common;
pub mod session;

// Re-export main API
pub use common::{forced_device, DeviceRequest, DEVICE_ENV_VAR};
pub use session::{
    InferOptions, Session, SessionBuilder, SessionError, SessionResult, DEFAULT_TEMPERATURE,
};

// Re-export core engine types
pub use spuni_decoder::{
    Cache, CpuKVCache, DecoderModel, DecodingStrategy, Device, GenerateOutput, GenerateRequest,
    ModelLoader, SamplingParams, StepDecoder,
};
