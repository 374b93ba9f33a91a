//! Device selection.
//!
//! The execution device is fixed before a model loads and never changes
//! afterwards. Callers pick a device through [`DeviceRequest`]; a
//! process-wide override read once from the environment wins over any
//! request, which is how a hosting process forces CPU-only (or
//! accelerator-only) execution without touching the model implementation.

use std::env;
use std::sync::OnceLock;

use log::warn;

use spuni_decoder::Device;

/// Environment variable holding the process-wide device override.
///
/// Recognized values are `cpu` and `gpu` (case-insensitive). Read once,
/// before the first device resolution; later changes to the environment
/// have no effect.
pub const DEVICE_ENV_VAR: &str = "SPUNI_DEVICE";

/// Requested execution device for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceRequest {
    /// Pick automatically. Resolves to CPU, which is always available;
    /// callers that know an accelerator works should request it outright.
    #[default]
    Auto,

    /// Run on CPU.
    Cpu,

    /// Run on the accelerator backend.
    Gpu,
}

impl DeviceRequest {
    /// Resolve Auto to a concrete request.
    pub fn resolve(self) -> Self {
        match self {
            Self::Auto => Self::Cpu,
            other => other,
        }
    }

    /// Convert to the engine-level device, honoring the process-wide
    /// override.
    pub fn to_device(self) -> Device {
        if let Some(forced) = forced_device() {
            return forced;
        }
        match self.resolve() {
            Self::Cpu | Self::Auto => Device::Cpu,
            Self::Gpu => Device::Gpu,
        }
    }

    pub fn is_cpu(&self) -> bool {
        matches!(self.resolve(), Self::Cpu)
    }

    pub fn is_gpu(&self) -> bool {
        matches!(self.resolve(), Self::Gpu)
    }
}

impl From<DeviceRequest> for Device {
    fn from(request: DeviceRequest) -> Self {
        request.to_device()
    }
}

static FORCED_DEVICE: OnceLock<Option<Device>> = OnceLock::new();

/// The process-wide device override, if one is configured.
///
/// Reads [`DEVICE_ENV_VAR`] on first use and caches the result for the
/// lifetime of the process. Unrecognized values are ignored with a
/// warning rather than treated as errors.
pub fn forced_device() -> Option<Device> {
    *FORCED_DEVICE.get_or_init(|| {
        let value = env::var(DEVICE_ENV_VAR).ok()?;
        let parsed = parse_device(&value);
        if parsed.is_none() {
            warn!("ignoring unrecognized {} value '{}'", DEVICE_ENV_VAR, value);
        }
        parsed
    })
}

fn parse_device(value: &str) -> Option<Device> {
    match value.trim().to_ascii_lowercase().as_str() {
        "cpu" => Some(Device::Cpu),
        "gpu" => Some(Device::Gpu),
        _ => None,
    }
}
