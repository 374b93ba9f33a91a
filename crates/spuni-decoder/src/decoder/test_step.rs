use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};

use crate::cache::Cache;
use crate::common::DecodingStrategy;
use crate::decoder::step::StepDecoder;
use crate::decoder::traits::{DecoderModel, GenerateOutput, GenerateRequest};
use crate::traits::Device;

// =========================================================================
//  Recording mock model
// =========================================================================

#[derive(Debug, Clone)]
struct RecordedCall {
    input_ids: Vec<u32>,
    use_cache: bool,
    max_new_tokens: usize,
    strategy: DecodingStrategy,
    had_past: bool,
}

/// Returns scripted tokens and records every call it receives.
struct RecordingModel {
    device: Device,
    responses: Mutex<VecDeque<u32>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingModel {
    fn new(responses: &[u32]) -> Arc<Self> {
        Arc::new(Self {
            device: Device::Cpu,
            responses: Mutex::new(responses.iter().copied().collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl DecoderModel for RecordingModel {
    fn device(&self) -> Device {
        self.device
    }

    fn generate(
        &self,
        request: &GenerateRequest<'_>,
        past: Option<&mut (dyn Cache + 'static)>,
    ) -> Result<GenerateOutput> {
        self.calls.lock().unwrap().push(RecordedCall {
            input_ids: request.input_ids.to_vec(),
            use_cache: request.use_cache,
            max_new_tokens: request.max_new_tokens,
            strategy: request.strategy.clone(),
            had_past: past.is_some(),
        });

        let token = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("mock model ran out of scripted responses"))?;

        Ok(GenerateOutput {
            tokens: vec![token],
        })
    }
}

/// Fails every call.
struct FailingModel;

impl DecoderModel for FailingModel {
    fn device(&self) -> Device {
        Device::Cpu
    }

    fn generate(
        &self,
        _request: &GenerateRequest<'_>,
        _past: Option<&mut (dyn Cache + 'static)>,
    ) -> Result<GenerateOutput> {
        Err(anyhow!("device out of memory"))
    }
}

/// Answers calls but returns an empty token list.
struct SilentModel;

impl DecoderModel for SilentModel {
    fn device(&self) -> Device {
        Device::Cpu
    }

    fn generate(
        &self,
        _request: &GenerateRequest<'_>,
        _past: Option<&mut (dyn Cache + 'static)>,
    ) -> Result<GenerateOutput> {
        Ok(GenerateOutput { tokens: Vec::new() })
    }
}

// =========================================================================
//  Canonical trace
// =========================================================================

#[test]
fn test_canonical_two_call_trace() {
    let model = RecordingModel::new(&[42]);
    let mut decoder = StepDecoder::new(model.clone());

    // Fresh request: nothing recorded, the whole sequence is new.
    let t = decoder.infer_next_token(&[1, 2, 3], 0.0, true).unwrap();
    assert_eq!(t, 42);

    let calls = model.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].input_ids, vec![1, 2, 3]);
    assert_eq!(calls[0].max_new_tokens, 1);
    assert!(calls[0].use_cache);
    assert!(!calls[0].had_past);
    assert_eq!(decoder.seen_len(), 4);

    // Same sequence extended by the token just produced: fully covered by
    // the recorded sequence, so the model is not consulted at all.
    let t2 = decoder.infer_next_token(&[1, 2, 3, 42], 0.0, false).unwrap();
    assert_eq!(t2, 42);
    assert_eq!(model.call_count(), 1);
}

#[test]
fn test_extension_feeds_only_new_tokens() {
    let model = RecordingModel::new(&[10, 11, 12]);
    let mut decoder = StepDecoder::new(model.clone());

    decoder.infer_next_token(&[1, 2, 3], 0.0, true).unwrap();
    // recorded: [1, 2, 3, 10]

    // The caller keeps the produced token and appends one more of its own;
    // only the token past the recorded sequence reaches the model.
    decoder.infer_next_token(&[1, 2, 3, 10, 5], 0.0, false).unwrap();
    // recorded: [1, 2, 3, 10, 5, 11]

    decoder
        .infer_next_token(&[1, 2, 3, 10, 5, 11, 6], 0.0, false)
        .unwrap();

    let calls = model.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].input_ids, vec![1, 2, 3]);
    assert_eq!(calls[1].input_ids, vec![5]);
    assert_eq!(calls[2].input_ids, vec![6]);

    // Refreshed cache state never comes back from a single-token call, so
    // no call ever sees lent state.
    assert!(calls.iter().all(|c| !c.had_past));
}

// =========================================================================
//  Resets
// =========================================================================

#[test]
fn test_new_request_isolates_sequences() {
    let model = RecordingModel::new(&[10, 20]);
    let mut decoder = StepDecoder::new(model.clone());

    decoder.infer_next_token(&[1, 2, 3], 0.0, true).unwrap();
    decoder.infer_next_token(&[7, 8], 0.0, true).unwrap();

    let calls = model.calls();
    // The second sequence shares nothing with the first: every one of its
    // tokens is fed as new.
    assert_eq!(calls[1].input_ids, vec![7, 8]);
    assert_eq!(decoder.seen_len(), 3); // [7, 8, 20]
}

#[test]
fn test_divergence_discards_prefix_entirely() {
    let model = RecordingModel::new(&[10, 20]);
    let mut decoder = StepDecoder::new(model.clone());

    decoder.infer_next_token(&[1, 2, 3], 0.0, true).unwrap();
    // recorded: [1, 2, 3, 10]

    // Diverges at position 2: the common prefix is [1, 2], strictly
    // shorter than the recorded sequence, so nothing is reused and the
    // full incoming sequence is treated as new.
    decoder.infer_next_token(&[1, 2, 9, 9], 0.0, false).unwrap();

    let calls = model.calls();
    assert_eq!(calls[1].input_ids, vec![1, 2, 9, 9]);
    assert_eq!(decoder.seen_len(), 5); // [1, 2, 9, 9, 20]
}

#[test]
fn test_shorter_replay_short_circuits() {
    let model = RecordingModel::new(&[10]);
    let mut decoder = StepDecoder::new(model.clone());

    decoder.infer_next_token(&[1, 2, 3], 0.0, true).unwrap();

    // Replaying the previous input exactly adds nothing new.
    let t = decoder.infer_next_token(&[1, 2, 3], 0.0, false).unwrap();
    assert_eq!(t, 3);
    assert_eq!(model.call_count(), 1);
}

// =========================================================================
//  Degenerate inputs
// =========================================================================

#[test]
fn test_empty_input_returns_zero_without_model_call() {
    let model = RecordingModel::new(&[]);
    let mut decoder = StepDecoder::new(model.clone());

    let t = decoder.infer_next_token(&[], 0.0, true).unwrap();
    assert_eq!(t, 0);
    assert_eq!(model.call_count(), 0);
}

// =========================================================================
//  Sampling contract
// =========================================================================

#[test]
fn test_zero_temperature_requests_greedy() {
    let model = RecordingModel::new(&[10]);
    let mut decoder = StepDecoder::new(model.clone());

    decoder.infer_next_token(&[1], 0.0, true).unwrap();

    assert!(model.calls()[0].strategy.is_greedy());
}

#[test]
fn test_nonzero_temperature_requests_sampling_at_that_temperature() {
    let model = RecordingModel::new(&[10]);
    let mut decoder = StepDecoder::new(model.clone());

    decoder.infer_next_token(&[1], 0.8, true).unwrap();

    match &model.calls()[0].strategy {
        DecodingStrategy::Sample(params) => assert_eq!(params.temperature, 0.8),
        other => panic!("expected Sample, got {:?}", other),
    }
}

// =========================================================================
//  Failure propagation
// =========================================================================

#[test]
fn test_model_failure_propagates() {
    let mut decoder = StepDecoder::new(Arc::new(FailingModel));

    let err = decoder.infer_next_token(&[1, 2], 0.0, true).unwrap_err();
    assert!(err.to_string().contains("out of memory"));

    // The failed call recorded nothing, so the caller's resync with
    // new_request starts clean.
    assert_eq!(decoder.seen_len(), 0);
}

#[test]
fn test_resync_after_failure() {
    struct FlakyModel {
        failed_once: Mutex<bool>,
    }

    impl DecoderModel for FlakyModel {
        fn device(&self) -> Device {
            Device::Cpu
        }

        fn generate(
            &self,
            _request: &GenerateRequest<'_>,
            _past: Option<&mut (dyn Cache + 'static)>,
        ) -> Result<GenerateOutput> {
            let mut failed = self.failed_once.lock().unwrap();
            if !*failed {
                *failed = true;
                return Err(anyhow!("transient device error"));
            }
            Ok(GenerateOutput { tokens: vec![99] })
        }
    }

    let mut decoder = StepDecoder::new(Arc::new(FlakyModel {
        failed_once: Mutex::new(false),
    }));

    assert!(decoder.infer_next_token(&[1, 2], 0.0, true).is_err());

    let t = decoder.infer_next_token(&[1, 2], 0.0, true).unwrap();
    assert_eq!(t, 99);
}

#[test]
fn test_empty_model_output_is_an_error() {
    let mut decoder = StepDecoder::new(Arc::new(SilentModel));

    let err = decoder.infer_next_token(&[1, 2], 0.0, true).unwrap_err();
    assert!(err.to_string().contains("no tokens"));
}
