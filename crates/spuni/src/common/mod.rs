//! Shared configuration types.

mod device;

pub use device::{forced_device, DeviceRequest, DEVICE_ENV_VAR};
