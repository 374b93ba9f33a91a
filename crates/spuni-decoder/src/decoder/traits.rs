//! The boundary to a loaded decoder model.
//!
//! Everything past this seam is opaque: how the model computes logits, on
//! which device, with which kernels, is the implementation's business. The
//! decoding loop only needs a handle it can ask for tokens.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::cache::Cache;
use crate::common::DecodingStrategy;
use crate::traits::Device;

/// A single generation call against a loaded model.
#[derive(Debug)]
pub struct GenerateRequest<'a> {
    /// New input token IDs: only the tokens not already reflected in any
    /// cache state lent alongside the request.
    pub input_ids: &'a [u32],

    /// Whether the model may read and extend lent cache state.
    pub use_cache: bool,

    /// How many tokens to generate.
    pub max_new_tokens: usize,

    /// Token selection behavior.
    pub strategy: DecodingStrategy,
}

/// What a generation call returns.
///
/// Carries the newly generated tokens only. The entry point does not hand
/// back refreshed cache state; callers that lend a cache get whatever the
/// model left in it, and a single-token call leaves lent state untouched.
#[derive(Debug, Clone)]
pub struct GenerateOutput {
    /// Newly generated token IDs, oldest first.
    pub tokens: Vec<u32>,
}

/// A loaded model bound to a device.
pub trait DecoderModel: Send + Sync {
    /// The device this model instance runs on.
    fn device(&self) -> Device;

    /// Run generation for the request, optionally reading lent cache state.
    ///
    /// Failures (device errors, out of memory, bad weights) surface
    /// unmodified to the caller; nothing here retries or recovers.
    fn generate(
        &self,
        request: &GenerateRequest<'_>,
        past: Option<&mut (dyn Cache + 'static)>,
    ) -> Result<GenerateOutput>;
}

/// Loads a model checkpoint bound to a specific device.
///
/// The device is fixed before loading; implementations must not fall back
/// to a different device on their own.
pub trait ModelLoader: Send + Sync {
    fn load(&self, checkpoint: &Path, device: Device) -> Result<Arc<dyn DecoderModel>>;
}
