//! CPU key/value cache for decoder models.

use std::any::Any;

use ndarray::{s, Array3, ArrayView3};

use crate::cache::Cache;

/// Per-layer key/value store backing CPU model implementations.
///
/// Each layer holds a pre-allocated `[batch, capacity, hidden]` pair of
/// tensors; `current_len` marks how many positions are live. Appends write
/// past the watermark, reads slice up to it.
#[derive(Clone)]
pub struct CpuKVCache {
    layers: Vec<(Array3<f32>, Array3<f32>)>,
    current_len: usize,
}

impl CpuKVCache {
    pub fn new(num_layers: usize, batch_size: usize, capacity: usize, hidden_size: usize) -> Self {
        let mut layers = Vec::with_capacity(num_layers);
        for _ in 0..num_layers {
            let keys = Array3::zeros((batch_size, capacity, hidden_size));
            let values = Array3::zeros((batch_size, capacity, hidden_size));
            layers.push((keys, values));
        }

        Self {
            layers,
            current_len: 0,
        }
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn capacity(&self) -> usize {
        self.layers.first().map(|(k, _)| k.shape()[1]).unwrap_or(0)
    }

    pub fn batch_size(&self) -> usize {
        self.layers.first().map(|(k, _)| k.shape()[0]).unwrap_or(0)
    }

    pub fn hidden_size(&self) -> usize {
        self.layers.first().map(|(k, _)| k.shape()[2]).unwrap_or(0)
    }

    /// Write new key/value rows for one layer at the current watermark.
    ///
    /// The watermark itself moves only via `increment_len`, once all layers
    /// of a step have been written.
    pub fn append(
        &mut self,
        layer_idx: usize,
        new_keys: &Array3<f32>,
        new_values: &Array3<f32>,
    ) -> anyhow::Result<()> {
        if layer_idx >= self.layers.len() {
            anyhow::bail!(
                "layer index {} out of bounds (num_layers={})",
                layer_idx,
                self.layers.len()
            );
        }

        let new_tokens_len = new_keys.shape()[1];
        let end_pos = self.current_len + new_tokens_len;

        if end_pos > self.capacity() {
            anyhow::bail!(
                "cache overflow: current_len={}, new_tokens={}, capacity={}",
                self.current_len,
                new_tokens_len,
                self.capacity()
            );
        }

        let target = s![.., self.current_len..end_pos, ..];

        let (keys, values) = &mut self.layers[layer_idx];
        keys.slice_mut(target).assign(new_keys);
        values.slice_mut(target).assign(new_values);

        Ok(())
    }

    /// Views of the live portion of one layer's key/value tensors.
    pub fn view(&self, layer_idx: usize) -> Option<(ArrayView3<'_, f32>, ArrayView3<'_, f32>)> {
        let (keys, values) = self.layers.get(layer_idx)?;
        let live = s![.., 0..self.current_len, ..];

        Some((keys.slice(live), values.slice(live)))
    }
}

impl Cache for CpuKVCache {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn get_seq_length(&self) -> usize {
        self.current_len
    }

    fn set_seq_length(&mut self, len: usize) {
        self.current_len = len;
    }

    fn increment_len(&mut self, new_tokens_len: usize) {
        self.current_len += new_tokens_len;
    }

    fn clear(&mut self) {
        self.current_len = 0;
    }

    fn clone_box(&self) -> Box<dyn Cache> {
        Box::new(self.clone())
    }
}
