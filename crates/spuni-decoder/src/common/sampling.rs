//! Token selection helpers for model implementations.
//!
//! The decoding loop never samples by itself; it hands a
//! [`DecodingStrategy`] to the model. These helpers let model
//! implementations honor that strategy uniformly.

use anyhow::Result;
use ndarray::Array1;
use rand::Rng;

use crate::common::DecodingStrategy;

/// Select a token from raw logits according to the strategy.
pub fn sample_token(mut logits: Array1<f32>, strategy: &DecodingStrategy) -> Result<u32> {
    match strategy {
        DecodingStrategy::Greedy => Ok(argmax(&logits)),
        DecodingStrategy::Sample(params) => {
            if let Some(k) = params.top_k {
                logits = top_k_filtering(logits, k);
            }
            if let Some(p) = params.top_p {
                logits = top_p_filtering(logits, p);
            }

            // Temperature applies before softmax; guard the division.
            let temp = if params.temperature < 1e-5 {
                1.0
            } else {
                params.temperature
            };
            logits /= temp;

            softmax_1d_inplace(&mut logits);
            sample_from_probs(&logits)
        }
    }
}

/// Index of the highest logit.
pub fn argmax(logits: &Array1<f32>) -> u32 {
    logits
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(idx, _)| idx as u32)
        .unwrap_or(0)
}

pub fn softmax_1d_inplace(logits: &mut Array1<f32>) {
    let max = logits.fold(f32::NEG_INFINITY, |acc, &x| acc.max(x));
    logits.mapv_inplace(|x| (x - max).exp());
    let sum = logits.sum();
    if sum > 0.0 {
        *logits /= sum;
    }
}

/// Keep the k highest logits, push the rest to negative infinity.
pub fn top_k_filtering(mut logits: Array1<f32>, k: usize) -> Array1<f32> {
    if k >= logits.len() {
        return logits;
    }
    let mut indices: Vec<usize> = (0..logits.len()).collect();
    indices.sort_by(|&a, &b| logits[b].total_cmp(&logits[a]));
    for &idx in &indices[k..] {
        logits[idx] = f32::NEG_INFINITY;
    }
    logits
}

/// Nucleus filtering: keep the smallest set of tokens whose cumulative
/// probability exceeds p, push the rest to negative infinity.
pub fn top_p_filtering(mut logits: Array1<f32>, p: f32) -> Array1<f32> {
    let mut indices: Vec<usize> = (0..logits.len()).collect();
    indices.sort_by(|&a, &b| logits[b].total_cmp(&logits[a]));

    let mut probs = logits.clone();
    softmax_1d_inplace(&mut probs);

    let mut cumulative = 0.0;
    for (i, &idx) in indices.iter().enumerate() {
        cumulative += probs[idx];
        if cumulative > p {
            for &tail_idx in &indices[i + 1..] {
                logits[tail_idx] = f32::NEG_INFINITY;
            }
            break;
        }
    }
    logits
}

/// Draw one index from a probability vector.
pub fn sample_from_probs(probs: &Array1<f32>) -> Result<u32> {
    let mut rng = rand::thread_rng();
    let uniform: f32 = rng.r#gen();
    let mut cumulative = 0.0;
    for (idx, &prob) in probs.iter().enumerate() {
        cumulative += prob;
        if cumulative >= uniform {
            return Ok(idx as u32);
        }
    }
    Ok((probs.len().saturating_sub(1)) as u32)
}
