pub mod sampling;

pub use sampling::*;

/// Parameters for sampling-based decoding.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_k: Option<usize>,
    pub top_p: Option<f32>,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: Some(50),
            top_p: Some(0.9),
        }
    }
}

/// The token selection behavior requested from a model.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodingStrategy {
    /// Select the most likely token (argmax).
    Greedy,
    /// Sample from the distribution.
    Sample(SamplingParams),
}

impl DecodingStrategy {
    /// Map a temperature to a strategy: exactly zero means greedy, any
    /// other value means stochastic sampling at that temperature.
    pub fn from_temperature(temperature: f32) -> Self {
        if temperature == 0.0 {
            DecodingStrategy::Greedy
        } else {
            DecodingStrategy::Sample(SamplingParams {
                temperature,
                top_k: None,
                top_p: None,
            })
        }
    }

    pub fn is_greedy(&self) -> bool {
        matches!(self, DecodingStrategy::Greedy)
    }
}
