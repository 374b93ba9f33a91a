//! Shared runtime types for the decoding engine.

/// Execution device a model is bound to.
///
/// `Gpu` stands for whichever accelerator backend the model implementation
/// targets; the decoding loop behaves identically on either device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cpu,
    Gpu,
}

impl Device {
    pub fn is_cpu(&self) -> bool {
        matches!(self, Device::Cpu)
    }

    pub fn is_gpu(&self) -> bool {
        matches!(self, Device::Gpu)
    }
}
