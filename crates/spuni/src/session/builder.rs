//! Builder pattern for Session configuration.

use std::path::PathBuf;
use std::sync::Arc;

use spuni_decoder::{DecoderModel, ModelLoader};

use crate::common::DeviceRequest;

use super::model::Session;
use super::types::{SessionError, SessionResult, DEFAULT_TEMPERATURE};

/// Builder for configuring a [`Session`].
///
/// # Example
///
/// ```ignore
/// let session = Session::builder()
///     .checkpoint("/models/my-model")
///     .cpu()
///     .default_temperature(0.7)
///     .build(&loader)?;
/// ```
pub struct SessionBuilder {
    pub(crate) checkpoint: Option<PathBuf>,
    pub(crate) device: DeviceRequest,
    pub(crate) default_temperature: f32,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self {
            checkpoint: None,
            device: DeviceRequest::default(),
            default_temperature: DEFAULT_TEMPERATURE,
        }
    }

    // =========================================================================
    // Model Selection
    // =========================================================================

    /// Path of the checkpoint to load.
    pub fn checkpoint(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint = Some(path.into());
        self
    }

    // =========================================================================
    // Device Configuration
    // =========================================================================

    /// Set the device for inference.
    pub fn device(mut self, device: DeviceRequest) -> Self {
        self.device = device;
        self
    }

    /// Use CPU for inference.
    pub fn cpu(self) -> Self {
        self.device(DeviceRequest::Cpu)
    }

    /// Use the accelerator backend for inference.
    pub fn gpu(self) -> Self {
        self.device(DeviceRequest::Gpu)
    }

    // =========================================================================
    // Generation Defaults
    // =========================================================================

    /// Temperature applied when a call does not specify one.
    ///
    /// Zero (the default) selects greedy decoding.
    pub fn default_temperature(mut self, temperature: f32) -> Self {
        self.default_temperature = temperature;
        self
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Resolve the device, load the checkpoint through `loader`, and build
    /// the session.
    ///
    /// The device is resolved first (honoring the process-wide override)
    /// and handed to the loader, so the model is bound to its device
    /// before any inference happens.
    pub fn build(self, loader: &dyn ModelLoader) -> SessionResult<Session> {
        let checkpoint = self.checkpoint.ok_or(SessionError::MissingCheckpoint)?;
        let device = self.device.to_device();

        let model = loader
            .load(&checkpoint, device)
            .map_err(|source| SessionError::LoadFailed { checkpoint, source })?;

        Ok(Session::from_parts(model, self.default_temperature))
    }

    /// Build the session around an already-loaded model.
    pub fn build_with_model(self, model: Arc<dyn DecoderModel>) -> Session {
        Session::from_parts(model, self.default_temperature)
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
