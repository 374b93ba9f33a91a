//! One-token-at-a-time decoding with prefix-based state reuse.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use log::debug;

use crate::cache::Cache;
use crate::common::DecodingStrategy;
use crate::decoder::traits::{DecoderModel, GenerateRequest};

/// Produces the next token for a growing token sequence, feeding the model
/// only the tokens that extend the sequence seen on the previous call.
///
/// Two pieces of state persist across calls: cache state lent to the model
/// during generation, and the token sequence recorded after the previous
/// call (that call's input plus the token it produced). Each call computes
/// the common prefix between the recorded sequence and the incoming one;
/// tokens inside the prefix are assumed already covered by the cache and
/// are not resent.
///
/// Calls take `&mut self` and run to completion. For concurrent generation
/// streams, use one decoder per stream or serialize calls externally.
pub struct StepDecoder {
    model: Arc<dyn DecoderModel>,
    past: Option<Box<dyn Cache>>,
    last_tokens: Option<Vec<u32>>,
}

impl StepDecoder {
    pub fn new(model: Arc<dyn DecoderModel>) -> Self {
        Self {
            model,
            past: None,
            last_tokens: None,
        }
    }

    pub fn model(&self) -> &Arc<dyn DecoderModel> {
        &self.model
    }

    /// Length of the sequence recorded from the previous call.
    pub fn seen_len(&self) -> usize {
        self.last_tokens.as_ref().map_or(0, Vec::len)
    }

    /// Compute the next token for `tokens`.
    ///
    /// A temperature of exactly zero requests greedy decoding; any other
    /// value requests sampling at that temperature. `new_request` marks
    /// the start of an unrelated generation and resets all recorded state
    /// first.
    ///
    /// If the incoming sequence adds nothing beyond the recorded one, the
    /// last input token is returned without touching the model. A model
    /// failure propagates as-is and leaves this decoder's state where the
    /// call brought it; issue the next call with `new_request` to
    /// resynchronize after a failure.
    pub fn infer_next_token(
        &mut self,
        tokens: &[u32],
        temperature: f32,
        new_request: bool,
    ) -> Result<u32> {
        if new_request || self.last_tokens.is_none() {
            self.past = None;
            self.last_tokens = Some(Vec::new());
        }
        let last_tokens = self.last_tokens.get_or_insert_with(Vec::new);

        let mut prefix_len = common_prefix_len(last_tokens, tokens);

        // The recorded sequence already covers the whole input: nothing
        // new to compute.
        if prefix_len == tokens.len() {
            return Ok(tokens.last().copied().unwrap_or(0));
        }

        // The caller walked away from part of the recorded sequence; the
        // cache reflects a history that is no longer being pursued.
        if prefix_len < last_tokens.len() {
            self.past = None;
            prefix_len = 0;
        }

        let new_tokens = &tokens[prefix_len..];

        debug!(
            "decoding {} new tokens ({} reused as prefix)",
            new_tokens.len(),
            prefix_len
        );

        let request = GenerateRequest {
            input_ids: new_tokens,
            use_cache: true,
            max_new_tokens: 1,
            strategy: DecodingStrategy::from_temperature(temperature),
        };

        let output = self.model.generate(&request, self.past.as_deref_mut())?;

        let next_token = output.tokens.last().copied().ok_or_else(|| {
            anyhow!(
                "model returned no tokens for a {}-token input",
                new_tokens.len()
            )
        })?;

        // The generate entry point returns no refreshed cache state for a
        // single-token call, so `past` stays as it was. The prefix rule
        // above still trims resent tokens on the next call.
        let mut seen = Vec::with_capacity(tokens.len() + 1);
        seen.extend_from_slice(tokens);
        seen.push(next_token);
        self.last_tokens = Some(seen);

        Ok(next_token)
    }
}

/// Number of leading positions at which the two sequences agree.
fn common_prefix_len(a: &[u32], b: &[u32]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
