//! Stance segment aggregation.
//!
//! Turns the per-sample (batch, stance) annotation into a table of stance
//! segments: maximal runs of contiguous samples sharing a batch and a label,
//! each summarised by its time bounds and its peak absolute roll.
//!
//! Design: explicit run-length encoding
//! - Split the sample indices into batches (contiguous runs of one id)
//! - Within a batch, filter the indices carrying one label
//! - Walk the filtered list and start a new run whenever the gap to the
//!   previous kept index is not exactly 1
//!
//! Only Left and Right runs are emitted by default. Unlabeled runs can be
//! requested through [`AggregatorConfig::include_unlabeled`].

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::debug;

use crate::batch::{spans_from_ids, validate_ids};
use crate::error::{GaitError, Result};
use crate::types::{BatchId, Segment, Signal, StanceLabel};

/// Configuration for segment aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Also emit runs of unlabeled samples (after Right and Left runs).
    pub include_unlabeled: bool,
}

/// Builds the stance segment table from a labeled signal.
#[derive(Debug, Clone, Default)]
pub struct SegmentAggregator {
    config: AggregatorConfig,
}

impl SegmentAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Labels aggregated for each batch, in emission order.
    fn labels(&self) -> &'static [StanceLabel] {
        if self.config.include_unlabeled {
            &[StanceLabel::Right, StanceLabel::Left, StanceLabel::None]
        } else {
            &[StanceLabel::Right, StanceLabel::Left]
        }
    }

    /// Aggregate segments.
    ///
    /// `batch_ids` must be non-decreasing, as produced by
    /// [`crate::batch::BatchDetector::detect`].
    ///
    /// Output order: batches in ascending id; within a batch,
    /// Right runs, then Left runs (then unlabeled runs if enabled); within a
    /// label, runs in time order with ordinals counting from 1. A batch/label
    /// combination with no samples produces no segment at all.
    pub fn aggregate(
        &self,
        signal: &Signal,
        batch_ids: &[BatchId],
        labels: &[StanceLabel],
    ) -> Result<Vec<Segment>> {
        if batch_ids.len() != signal.len() || labels.len() != signal.len() {
            return Err(GaitError::validation(format!(
                "annotation length mismatch: {} samples, {} batch ids, {} labels",
                signal.len(),
                batch_ids.len(),
                labels.len()
            )));
        }
        validate_ids(batch_ids)?;

        let mut segments = Vec::new();
        for span in spans_from_ids(batch_ids) {
            for &label in self.labels() {
                let kept: Vec<usize> = span
                    .range
                    .clone()
                    .filter(|&i| labels[i] == label)
                    .collect();

                for (n, run) in contiguous_runs(&kept).into_iter().enumerate() {
                    segments.push(summarise(signal, span.id, label, n + 1, run));
                }
            }
        }

        debug!(
            samples = signal.len(),
            segments = segments.len(),
            "segment aggregation complete"
        );
        Ok(segments)
    }
}

/// Split an ascending index list into maximal runs of consecutive indices.
fn contiguous_runs(indices: &[usize]) -> Vec<RangeInclusive<usize>> {
    let mut runs = Vec::new();
    let Some(&first) = indices.first() else {
        return runs;
    };

    let mut start = first;
    let mut prev = first;
    for &i in &indices[1..] {
        if i != prev + 1 {
            runs.push(start..=prev);
            start = i;
        }
        prev = i;
    }
    runs.push(start..=prev);
    runs
}

fn summarise(
    signal: &Signal,
    batch_id: BatchId,
    label: StanceLabel,
    ordinal: usize,
    run: RangeInclusive<usize>,
) -> Segment {
    let (start, end) = (*run.start(), *run.end());
    let samples = signal.slice(start..end + 1);

    // f64::max skips NaN, so a run that is all NaN stays NaN.
    let max_deviation = samples
        .iter()
        .map(|s| s.value.abs())
        .fold(f64::NAN, f64::max);

    Segment {
        batch_id,
        label,
        ordinal,
        start_index: start,
        end_index: end,
        time_start: samples[0].time,
        time_end: samples[samples.len() - 1].time,
        max_deviation,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use StanceLabel::{Left as L, None as N, Right as R};

    fn signal(values: &[f64]) -> Signal {
        let times: Vec<f64> = (0..values.len()).map(|i| i as f64 * 0.1).collect();
        Signal::from_columns(&times, values).unwrap()
    }

    #[test]
    fn test_contiguous_runs() {
        assert!(contiguous_runs(&[]).is_empty());
        assert_eq!(contiguous_runs(&[4]), vec![4..=4]);
        assert_eq!(
            contiguous_runs(&[1, 2, 3, 7, 8, 10]),
            vec![1..=3, 7..=8, 10..=10]
        );
    }

    #[test]
    fn test_single_right_segment() {
        let values = [0.0, -1.0, -2.0, -2.2, -1.0, 0.0, 1.0];
        let sig = signal(&values);
        let labels = vec![N, N, N, R, R, R, N];
        let ids = vec![0; values.len()];

        let segments = SegmentAggregator::default()
            .aggregate(&sig, &ids, &labels)
            .unwrap();

        assert_eq!(segments.len(), 1);
        let seg = &segments[0];
        assert_eq!(seg.label, R);
        assert_eq!(seg.ordinal, 1);
        assert_eq!((seg.start_index, seg.end_index), (3, 5));
        assert_abs_diff_eq!(seg.time_start, 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(seg.time_end, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(seg.max_deviation, 2.2, epsilon = 1e-12);
    }

    #[test]
    fn test_runs_split_on_index_gaps_and_batches() {
        let values = [1.0, -3.0, -2.0, 0.0, -4.0, 5.0, 6.0, -7.0, -1.0];
        let sig = signal(&values);
        let labels = vec![N, R, R, N, R, L, L, R, R];
        let ids = vec![0, 0, 0, 0, 0, 0, 1, 1, 1];

        let segments = SegmentAggregator::default()
            .aggregate(&sig, &ids, &labels)
            .unwrap();

        let summary: Vec<(BatchId, StanceLabel, usize, usize, usize)> = segments
            .iter()
            .map(|s| (s.batch_id, s.label, s.ordinal, s.start_index, s.end_index))
            .collect();
        assert_eq!(
            summary,
            vec![
                (0, R, 1, 1, 2),
                (0, R, 2, 4, 4),
                (0, L, 1, 5, 5),
                // Index 6 is Left but in batch 1: its own run, not merged with 5.
                (1, R, 1, 7, 8),
                (1, L, 1, 6, 6),
            ]
        );
        assert_abs_diff_eq!(segments[0].max_deviation, 3.0);
        assert_abs_diff_eq!(segments[3].max_deviation, 7.0);
    }

    #[test]
    fn test_max_deviation_matches_run_values() {
        let values = [0.5, -2.0, 3.5, -4.5, 1.0];
        let sig = signal(&values);
        let labels = vec![L, L, L, L, L];
        let ids = vec![0; 5];

        let segments = SegmentAggregator::default()
            .aggregate(&sig, &ids, &labels)
            .unwrap();
        let seg = &segments[0];
        let expected = sig
            .slice(seg.index_range())
            .iter()
            .map(|s| s.value.abs())
            .fold(0.0, f64::max);
        assert_abs_diff_eq!(seg.max_deviation, expected);
        assert_abs_diff_eq!(seg.max_deviation, 4.5);
    }

    #[test]
    fn test_unlabeled_runs_hidden_by_default() {
        let sig = signal(&[0.0, 1.0, 2.0]);
        let labels = vec![N, N, N];
        let ids = vec![0, 0, 0];

        let default_segments = SegmentAggregator::default()
            .aggregate(&sig, &ids, &labels)
            .unwrap();
        assert!(default_segments.is_empty(), "no Left/Right samples, no segments");

        let with_none = SegmentAggregator::new(AggregatorConfig {
            include_unlabeled: true,
        })
        .aggregate(&sig, &ids, &labels)
        .unwrap();
        assert_eq!(with_none.len(), 1);
        assert_eq!(with_none[0].label, N);
        assert_eq!(with_none[0].sample_count(), 3);
    }

    #[test]
    fn test_nan_values_in_run() {
        let sig = signal(&[f64::NAN, -2.0, f64::NAN]);
        let ids = vec![0, 0, 0];

        let segments = SegmentAggregator::default()
            .aggregate(&sig, &ids, &[R, R, R])
            .unwrap();
        assert_abs_diff_eq!(segments[0].max_deviation, 2.0);

        let all_nan = signal(&[f64::NAN]);
        let segments = SegmentAggregator::default()
            .aggregate(&all_nan, &[0], &[L])
            .unwrap();
        assert!(segments[0].max_deviation.is_nan());
    }

    #[test]
    fn test_non_monotone_batch_ids_rejected() {
        let sig = signal(&[-3.0, -2.0, -3.0]);
        let err = SegmentAggregator::default()
            .aggregate(&sig, &[0, 1, 0], &[R, R, R])
            .unwrap_err();
        assert!(err.is_validation(), "batch 0 split in two, got {err:?}");
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let sig = signal(&[0.0, 1.0]);
        let err = SegmentAggregator::default()
            .aggregate(&sig, &[0, 0], &[N])
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_empty_signal() {
        let segments = SegmentAggregator::default()
            .aggregate(&Signal::empty(), &[], &[])
            .unwrap();
        assert!(segments.is_empty());
    }
}
