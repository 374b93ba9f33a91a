//! Engine components for incremental next-token inference.
//!
//! This crate provides the pieces that sit below the user-facing session
//! API: the execution [`Device`] tag, type-erased [`Cache`] state, sampling
//! strategies, the [`DecoderModel`] boundary to a loaded model, and the
//! [`StepDecoder`] that drives one-token-at-a-time decoding while reusing
//! previously computed state across calls.

pub mod cache;
pub mod common;
pub mod decoder;
pub mod traits;

// Re-export commonly used items
pub use cache::{Cache, CpuKVCache};
pub use common::{sample_token, DecodingStrategy, SamplingParams};
pub use decoder::{DecoderModel, GenerateOutput, GenerateRequest, ModelLoader, StepDecoder};
pub use traits::Device;
