//! The model boundary and the incremental decoding loop.

pub mod step;
pub mod traits;

pub use step::StepDecoder;
pub use traits::{DecoderModel, GenerateOutput, GenerateRequest, ModelLoader};

#[cfg(test)]
mod test_step;
