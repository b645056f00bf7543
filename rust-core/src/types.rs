//! Core data types for the gait segmentation engine.
//!
//! This module defines the records that flow between the stages of the
//! segmentation pipeline: raw samples, validated signals, per-sample stance
//! labels, and the terminal outputs (stance segments and phase events).
//!
//! Design principle: Types should make intent obvious. A recording column is
//! never passed around as an untyped row; every attribute a consumer relies on
//! is a named, typed field.
//!
//! A [`Signal`] is read once and never mutated in place. Every stage produces
//! a new, independently owned output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

use crate::error::{GaitError, Result};

/// Identifier of a contiguous recording batch. Assigned in time order from 0.
pub type BatchId = usize;

/// A single scalar measurement.
///
/// `time` is in the recording's native unit (seconds for the gait sheets),
/// `value` is whatever the channel carries (roll in degrees, forward
/// acceleration in cm/s²). NaN values are allowed and simply never match a
/// threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub value: f64,
}

impl Sample {
    pub fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

/// An ordered sequence of samples, non-decreasing in time.
///
/// The ascending-time invariant is load-bearing for every component (batch
/// gap math, zero-crossing direction), so it is checked once here and can be
/// relied on everywhere else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signal {
    samples: Vec<Sample>,
}

impl Signal {
    /// Build a signal, rejecting any sample whose time is lower than its
    /// predecessor's. A NaN time is rejected as well.
    ///
    /// Equal consecutive times are allowed.
    pub fn new(samples: Vec<Sample>) -> Result<Self> {
        if let Some(first) = samples.first() {
            if first.time.is_nan() {
                return Err(GaitError::validation("time is NaN at index 0"));
            }
        }
        for (i, pair) in samples.windows(2).enumerate() {
            if pair[1].time.is_nan() || pair[1].time < pair[0].time {
                return Err(GaitError::validation(format!(
                    "time must be non-decreasing: index {} has {} after {}",
                    i + 1,
                    pair[1].time,
                    pair[0].time
                )));
            }
        }
        Ok(Self { samples })
    }

    /// Build a signal from parallel time and value columns.
    pub fn from_columns(times: &[f64], values: &[f64]) -> Result<Self> {
        if times.len() != values.len() {
            return Err(GaitError::validation(format!(
                "column length mismatch: {} times, {} values",
                times.len(),
                values.len()
            )));
        }
        let samples = times
            .iter()
            .zip(values)
            .map(|(&time, &value)| Sample::new(time, value))
            .collect();
        Self::new(samples)
    }

    /// The empty signal. Every stage maps it to an empty result.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Copy of the time column.
    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time).collect()
    }

    /// Copy of the value column.
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    /// A contiguous sub-slice of the samples (e.g. one batch).
    ///
    /// # Panics
    ///
    /// Panics if `range` is decreasing or ends past [`Signal::len`], like
    /// slice indexing.
    pub fn slice(&self, range: Range<usize>) -> &[Sample] {
        &self.samples[range]
    }

    /// New signal on the same time base with replaced values.
    ///
    /// Used by transforming stages (smoothing) whose output must keep the
    /// input's length and timing.
    pub fn with_values(&self, values: Vec<f64>) -> Result<Self> {
        if values.len() != self.samples.len() {
            return Err(GaitError::validation(format!(
                "value column has {} entries, signal has {} samples",
                values.len(),
                self.samples.len()
            )));
        }
        let samples = self
            .samples
            .iter()
            .zip(values)
            .map(|(s, value)| Sample::new(s.time, value))
            .collect();
        // Times are copied from an already validated signal.
        Ok(Self { samples })
    }

    /// Keep only the samples inside the given inclusive time windows,
    /// concatenated in the order the windows are listed.
    ///
    /// The gaps left between windows are what the batch detector later picks
    /// up as recording boundaries. Windows must be listed in ascending,
    /// non-overlapping order or the concatenation breaks the time invariant.
    pub fn select_time_ranges(&self, ranges: &[(f64, f64)]) -> Result<Signal> {
        let mut selected = Vec::new();
        for &(start, end) in ranges {
            if !start.is_finite() || !end.is_finite() {
                return Err(GaitError::validation(format!(
                    "time range bounds must be finite, got ({start}, {end})"
                )));
            }
            if start > end {
                return Err(GaitError::validation(format!(
                    "time range start {start} is after end {end}"
                )));
            }
            selected.extend(
                self.samples
                    .iter()
                    .filter(|s| s.time >= start && s.time <= end)
                    .copied(),
            );
        }
        Signal::new(selected)
    }
}

impl<'a> IntoIterator for &'a Signal {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Which leg, if any, is in single-leg stance at a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StanceLabel {
    /// No stance detected.
    #[default]
    None,
    /// Left foot down (roll peak above the left entry threshold).
    Left,
    /// Right foot down (roll trough below the right entry threshold).
    Right,
}

impl StanceLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StanceLabel::None => "None",
            StanceLabel::Left => "Left",
            StanceLabel::Right => "Right",
        }
    }

    pub fn is_stance(&self) -> bool {
        !matches!(self, StanceLabel::None)
    }
}

impl fmt::Display for StanceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A maximal contiguous run of samples sharing one (batch, label) pair.
///
/// `time_start`/`time_end` are the inclusive first and last sample times of
/// the run; `max_deviation` is the largest absolute value inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub batch_id: BatchId,
    pub label: StanceLabel,
    /// 1-based position of this run among the runs of the same batch and label.
    pub ordinal: usize,
    /// Index of the first sample of the run in the source signal.
    pub start_index: usize,
    /// Index of the last sample of the run in the source signal (inclusive).
    pub end_index: usize,
    pub time_start: f64,
    pub time_end: f64,
    pub max_deviation: f64,
}

impl Segment {
    /// Number of samples in the run.
    pub fn sample_count(&self) -> usize {
        self.end_index - self.start_index + 1
    }

    /// Elapsed time covered by the run.
    pub fn duration(&self) -> f64 {
        self.time_end - self.time_start
    }

    /// Index range of the run, usable with [`Signal::slice`].
    pub fn index_range(&self) -> Range<usize> {
        self.start_index..self.end_index + 1
    }
}

/// Kind of forward-acceleration phase onset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    /// Derivative turns from positive to non-positive.
    Braking,
    /// Derivative turns from negative to non-negative.
    Propulsion,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseKind::Braking => f.pad("Braking"),
            PhaseKind::Propulsion => f.pad("Propulsion"),
        }
    }
}

/// A point event marking the onset of a braking or propulsion phase.
/// Never emitted at index 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseEvent {
    pub kind: PhaseKind,
    pub time: f64,
    pub index: usize,
}

/// One row of the annotated recording: a sample with its batch and stance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    pub time: f64,
    pub value: f64,
    pub batch_id: BatchId,
    pub label: StanceLabel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_accepts_non_decreasing_time() {
        let signal = Signal::from_columns(&[0.0, 0.5, 0.5, 1.0], &[1.0, 2.0, 3.0, 4.0])
            .expect("equal consecutive times are allowed");
        assert_eq!(signal.len(), 4);
        assert_eq!(signal.values(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_signal_rejects_decreasing_time() {
        let err = Signal::from_columns(&[0.0, 1.0, 0.9], &[0.0, 0.0, 0.0]).unwrap_err();
        assert!(err.is_validation(), "expected validation error, got {err:?}");
    }

    #[test]
    fn test_signal_rejects_nan_time() {
        assert!(Signal::from_columns(&[f64::NAN, 1.0], &[0.0, 0.0]).is_err());
        assert!(Signal::from_columns(&[0.0, f64::NAN], &[0.0, 0.0]).is_err());
    }

    #[test]
    fn test_signal_accepts_nan_values() {
        let signal = Signal::from_columns(&[0.0, 1.0], &[f64::NAN, 2.0]).unwrap();
        assert!(signal.values()[0].is_nan());
    }

    #[test]
    fn test_signal_rejects_column_mismatch() {
        assert!(Signal::from_columns(&[0.0, 1.0], &[0.0]).is_err());
    }

    #[test]
    fn test_with_values_keeps_time_base() {
        let signal = Signal::from_columns(&[0.0, 1.0, 2.0], &[1.0, 1.0, 1.0]).unwrap();
        let replaced = signal.with_values(vec![5.0, 6.0, 7.0]).unwrap();
        assert_eq!(replaced.times(), signal.times());
        assert_eq!(replaced.values(), vec![5.0, 6.0, 7.0]);
        assert!(signal.with_values(vec![1.0]).is_err());
    }

    #[test]
    fn test_select_time_ranges_concatenates_in_order() {
        let times: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let values = vec![0.0; times.len()];
        let signal = Signal::from_columns(&times, &values).unwrap();

        let selected = signal
            .select_time_ranges(&[(15.0, 19.0), (22.0, 26.0)])
            .unwrap();
        assert_eq!(
            selected.times(),
            vec![15.0, 16.0, 17.0, 18.0, 19.0, 22.0, 23.0, 24.0, 25.0, 26.0]
        );
    }

    #[test]
    fn test_select_time_ranges_rejects_bad_ranges() {
        let signal = Signal::from_columns(&[0.0, 1.0, 2.0], &[0.0, 0.0, 0.0]).unwrap();
        assert!(signal.select_time_ranges(&[(2.0, 1.0)]).is_err());
        assert!(signal.select_time_ranges(&[(0.0, f64::INFINITY)]).is_err());
        // Out-of-order windows break the time invariant.
        assert!(signal.select_time_ranges(&[(2.0, 2.0), (0.0, 0.0)]).is_err());
        assert!(signal.select_time_ranges(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_label_display() {
        assert_eq!(StanceLabel::Left.to_string(), "Left");
        assert_eq!(StanceLabel::default(), StanceLabel::None);
        assert!(StanceLabel::Right.is_stance());
        assert!(!StanceLabel::None.is_stance());
        assert_eq!(PhaseKind::Propulsion.to_string(), "Propulsion");
    }

    #[test]
    fn test_segment_helpers() {
        let segment = Segment {
            batch_id: 0,
            label: StanceLabel::Right,
            ordinal: 1,
            start_index: 3,
            end_index: 5,
            time_start: 3.0,
            time_end: 5.0,
            max_deviation: 2.2,
        };
        assert_eq!(segment.sample_count(), 3);
        assert_eq!(segment.duration(), 2.0);
        assert_eq!(segment.index_range(), 3..6);
    }

    #[test]
    fn test_slice_within_bounds() {
        let signal = Signal::from_columns(&[0.0, 1.0, 2.0], &[5.0, 6.0, 7.0]).unwrap();
        assert_eq!(signal.slice(1..3), &[Sample::new(1.0, 6.0), Sample::new(2.0, 7.0)]);
        assert!(signal.slice(3..3).is_empty());
    }

    #[test]
    #[should_panic]
    fn test_slice_past_end_panics() {
        let signal = Signal::from_columns(&[0.0, 1.0], &[5.0, 6.0]).unwrap();
        let _ = signal.slice(1..4);
    }

    #[test]
    fn test_label_display_honours_width() {
        assert_eq!(format!("{:>5}", StanceLabel::Left), " Left");
        assert_eq!(format!("{:<10}|", PhaseKind::Braking), "Braking   |");
    }
}
