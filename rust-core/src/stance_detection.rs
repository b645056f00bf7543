//! Stance Detection Module.
//!
//! Labels single-leg stance phases on a roll-angle recording. With the
//! sensor on the pelvis, the body rolls towards the stance leg: a trough in
//! roll below a negative threshold marks the right foot going down, a peak
//! above a positive threshold marks the left foot going down. The stance
//! lasts until roll comes back across zero.
//!
//! Rules, per batch, with `diff[k] = value[k] - value[k-1]`:
//! - Right start at `k`: `diff[k+1] > 0`, `diff[k] <= 0`, `value[k] < right_entry`.
//!   The stance runs to the first `j >= k` with `value[j] >= 0`.
//! - Left start at `k`: `diff[k+1] <= 0`, `diff[k] > 0`, `value[k] > left_entry`.
//!   The stance runs to the first `j >= k` with `value[j] <= 0`.
//!
//! A start whose trailing scan never finds an end leaves its samples
//! unlabeled. The first sample of a batch has no `diff` and the last has no
//! next `diff`, so neither can start a stance.
//!
//! The two labels are painted in two full passes, Right first and Left
//! second. Where ranges overlap the Left label wins because it is written
//! last. Whether that precedence reflects gait (double-support windows read
//! as Left) or is an artifact of pass order is unresolved, so the two-pass
//! structure is kept as is.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::batch::{spans_from_ids, validate_ids};
use crate::error::{GaitError, Result};
use crate::types::{BatchId, Sample, Signal, StanceLabel};

/// Configuration for stance detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StanceConfig {
    /// Roll trough (degrees) a right stance must start below. Typical: -1.5.
    pub right_entry_threshold: f64,
    /// Roll peak (degrees) a left stance must start above. Typical: 2.5.
    pub left_entry_threshold: f64,
}

impl Default for StanceConfig {
    fn default() -> Self {
        Self {
            right_entry_threshold: -1.5,
            left_entry_threshold: 2.5,
        }
    }
}

impl StanceConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.right_entry_threshold.is_finite() {
            return Err(GaitError::configuration(format!(
                "right_entry_threshold must be finite, got {}",
                self.right_entry_threshold
            )));
        }
        if !self.left_entry_threshold.is_finite() {
            return Err(GaitError::configuration(format!(
                "left_entry_threshold must be finite, got {}",
                self.left_entry_threshold
            )));
        }
        Ok(())
    }
}

/// Roll-angle stance segmenter.
#[derive(Debug, Clone, Default)]
pub struct StanceSegmenter {
    config: StanceConfig,
}

impl StanceSegmenter {
    /// Create a new segmenter with the given configuration.
    pub fn new(config: StanceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StanceConfig {
        &self.config
    }

    /// Label every sample of a whole signal, batch by batch.
    ///
    /// `batch_ids` must have one non-decreasing entry per sample (see
    /// [`crate::batch::BatchDetector::detect`]). No rule looks across a
    /// batch boundary.
    pub fn label_signal(&self, signal: &Signal, batch_ids: &[BatchId]) -> Result<Vec<StanceLabel>> {
        if batch_ids.len() != signal.len() {
            return Err(GaitError::validation(format!(
                "batch id array has {} entries, signal has {} samples",
                batch_ids.len(),
                signal.len()
            )));
        }
        validate_ids(batch_ids)?;

        let mut labels = Vec::with_capacity(signal.len());
        for span in spans_from_ids(batch_ids) {
            let batch_labels = self.label_batch(signal.slice(span.range.clone()));
            trace!(
                batch = span.id,
                samples = span.len(),
                stance_samples = batch_labels.iter().filter(|l| l.is_stance()).count(),
                "labeled batch"
            );
            labels.extend(batch_labels);
        }

        debug!(
            samples = labels.len(),
            left = labels.iter().filter(|&&l| l == StanceLabel::Left).count(),
            right = labels.iter().filter(|&&l| l == StanceLabel::Right).count(),
            "stance labeling complete"
        );
        Ok(labels)
    }

    /// Label the samples of a single batch.
    pub fn label_batch(&self, batch: &[Sample]) -> Vec<StanceLabel> {
        let values: Vec<f64> = batch.iter().map(|s| s.value).collect();
        let mut labels = vec![StanceLabel::None; values.len()];

        // Right pass, then Left pass. Order matters: Left overwrites Right.
        for start in self.right_starts(&values) {
            if let Some(end) = find_end(&values, start, |v| v >= 0.0) {
                labels[start..=end].fill(StanceLabel::Right);
            }
        }
        for start in self.left_starts(&values) {
            if let Some(end) = find_end(&values, start, |v| v <= 0.0) {
                labels[start..=end].fill(StanceLabel::Left);
            }
        }

        labels
    }

    /// Local roll minima below the right entry threshold.
    fn right_starts(&self, values: &[f64]) -> Vec<usize> {
        let threshold = self.config.right_entry_threshold;
        candidate_indices(values)
            .filter(|&k| {
                let (falling_in, next) = (diff(values, k), diff(values, k + 1));
                next > 0.0 && falling_in <= 0.0 && values[k] < threshold
            })
            .collect()
    }

    /// Local roll maxima above the left entry threshold.
    fn left_starts(&self, values: &[f64]) -> Vec<usize> {
        let threshold = self.config.left_entry_threshold;
        candidate_indices(values)
            .filter(|&k| {
                let (rising_in, next) = (diff(values, k), diff(values, k + 1));
                next <= 0.0 && rising_in > 0.0 && values[k] > threshold
            })
            .collect()
    }
}

/// Indices that have both a previous and a next difference.
fn candidate_indices(values: &[f64]) -> impl Iterator<Item = usize> {
    1..values.len().saturating_sub(1)
}

/// Backward difference at `k >= 1`. NaN inputs give NaN, which fails every
/// comparison.
fn diff(values: &[f64], k: usize) -> f64 {
    values[k] - values[k - 1]
}

/// First index at or after `start` whose value satisfies `is_end`.
fn find_end(values: &[f64], start: usize, is_end: impl Fn(f64) -> bool) -> Option<usize> {
    values[start..]
        .iter()
        .position(|&v| is_end(v))
        .map(|offset| start + offset)
}

// ============================================================================
// TESTS
// ============================================================================
