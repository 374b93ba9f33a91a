//! Core Session implementation.

use std::sync::Arc;

use spuni_decoder::{DecoderModel, Device, StepDecoder};

use super::builder::SessionBuilder;
use super::types::{InferOptions, SessionResult};

/// A single generation stream over one loaded model.
///
/// The session carries mutable decoding state between calls, so the
/// operation takes `&mut self` and one session serves one logical caller
/// at a time. Wrap it in a mutex or create one session per stream if
/// multiple tasks need to generate concurrently.
pub struct Session {
    decoder: StepDecoder,
    device: Device,
    default_temperature: f32,
}

impl Session {
    /// Creates a builder for custom configuration.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    pub(crate) fn from_parts(model: Arc<dyn DecoderModel>, default_temperature: f32) -> Self {
        let device = model.device();
        Self {
            decoder: StepDecoder::new(model),
            device,
            default_temperature,
        }
    }

    /// Compute the next token for the full sequence `tokens`.
    ///
    /// The caller re-supplies the complete sequence on every call; the
    /// session works out which suffix is actually new. After a failed
    /// call, pass [`InferOptions::new_request`] on the next one to discard
    /// whatever state the failure left behind.
    pub fn infer_next_token(&mut self, tokens: &[u32], opts: InferOptions) -> SessionResult<u32> {
        let temperature = opts.temperature.unwrap_or(self.default_temperature);
        let token = self
            .decoder
            .infer_next_token(tokens, temperature, opts.new_request)?;
        Ok(token)
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn default_temperature(&self) -> f32 {
        self.default_temperature
    }

    /// Returns a reference to the underlying decoder.
    pub fn decoder(&self) -> &StepDecoder {
        &self.decoder
    }
}
