//! Recording batch detection.
//!
//! A gait recording is usually a concatenation of several walking passes.
//! Between passes the sensor keeps its clock but stops sampling, which shows
//! up as a jump in the time column. This module splits a signal at every such
//! jump and numbers the resulting batches in time order.
//!
//! Batch ids start at 0 and grow by exactly 1 at each gap, so the id array is
//! monotone and can be rebuilt from the time column alone.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

use crate::error::{GaitError, Result};
use crate::types::{BatchId, Signal};

/// Configuration for batch detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// A time step strictly larger than this starts a new batch.
    /// Same unit as the signal's time column. Typical: 1.0 s.
    pub gap_threshold: f64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { gap_threshold: 1.0 }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.gap_threshold.is_finite() || self.gap_threshold < 0.0 {
            return Err(GaitError::configuration(format!(
                "gap_threshold must be finite and >= 0, got {}",
                self.gap_threshold
            )));
        }
        Ok(())
    }
}

/// The index range covered by one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSpan {
    pub id: BatchId,
    /// Sample indices of the batch, end-exclusive.
    pub range: Range<usize>,
}

impl BatchSpan {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Splits a signal into contiguous recording batches.
#[derive(Debug, Clone, Default)]
pub struct BatchDetector {
    config: BatchConfig,
}

impl BatchDetector {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Assign a batch id to every sample.
    ///
    /// `id[0] = 0`, and `id[i] = id[i-1] + 1` exactly when
    /// `time[i] - time[i-1] > gap_threshold`. An empty signal yields an
    /// empty array.
    pub fn detect(&self, signal: &Signal) -> Vec<BatchId> {
        let samples = signal.samples();
        let mut ids = Vec::with_capacity(samples.len());
        let mut current: BatchId = 0;

        for (i, sample) in samples.iter().enumerate() {
            if i > 0 && sample.time - samples[i - 1].time > self.config.gap_threshold {
                current += 1;
            }
            ids.push(current);
        }

        debug!(
            samples = ids.len(),
            batches = ids.last().map_or(0, |&last| last + 1),
            gap_threshold = self.config.gap_threshold,
            "batch detection complete"
        );
        ids
    }

    /// Detect batches and return them as index spans.
    pub fn spans(&self, signal: &Signal) -> Vec<BatchSpan> {
        spans_from_ids(&self.detect(signal))
    }
}

/// Check that a batch id array is non-decreasing, so every batch is one
/// contiguous run of samples.
pub fn validate_ids(ids: &[BatchId]) -> Result<()> {
    match ids.windows(2).position(|pair| pair[1] < pair[0]) {
        Some(i) => Err(GaitError::validation(format!(
            "batch ids must be non-decreasing, id {} at index {} follows {}",
            ids[i + 1],
            i + 1,
            ids[i]
        ))),
        None => Ok(()),
    }
}

/// Collapse a monotone batch id array into index spans.
///
/// Consecutive equal ids form one span. Callers holding ids that did not
/// come from [`BatchDetector`] should run [`validate_ids`] first.
pub fn spans_from_ids(ids: &[BatchId]) -> Vec<BatchSpan> {
    let mut spans = Vec::new();
    let mut start = 0;

    for i in 1..=ids.len() {
        if i == ids.len() || ids[i] != ids[start] {
            spans.push(BatchSpan {
                id: ids[start],
                range: start..i,
            });
            start = i;
        }
    }
    spans
}
