//! Complete gait segmentation pipeline integrating all processing stages.
//!
//! This module wires the stateless components into the two analyses the
//! engine offers:
//!
//! ```text
//! roll signal ──► BatchDetector ──► StanceSegmenter (per batch) ──► SegmentAggregator
//!                     batch ids          stance labels                 segment table
//!
//! forward acceleration ──► SignalSmoother ──► PhaseEventDetector
//!                              smoothed          derivative + events
//! ```
//!
//! # Architecture
//!
//! Each stage takes an immutable input and returns a new, owned output. The
//! pipeline holds nothing but configuration, so one instance can analyze
//! any number of recordings.

use tracing::info;

use crate::batch::{spans_from_ids, BatchDetector, BatchSpan};
use crate::config::AnalysisConfig;
use crate::error::{GaitError, Result};
use crate::phase_detection::PhaseEventDetector;
use crate::segmentation::SegmentAggregator;
use crate::signal::SignalSmoother;
use crate::stance_detection::StanceSegmenter;
use crate::types::{BatchId, LabeledSample, PhaseEvent, Segment, Signal, StanceLabel};

/// Output of the stance analysis on a roll-angle signal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StanceAnalysis {
    /// Batch id of every sample.
    pub batch_ids: Vec<BatchId>,
    /// Stance label of every sample.
    pub labels: Vec<StanceLabel>,
    /// Left/Right stance segments (plus unlabeled runs if configured).
    pub segments: Vec<Segment>,
}

impl StanceAnalysis {
    /// Number of distinct batches.
    pub fn batch_count(&self) -> usize {
        self.batch_ids.last().map_or(0, |&last| last + 1)
    }

    /// Index spans of the batches.
    pub fn batch_spans(&self) -> Vec<BatchSpan> {
        spans_from_ids(&self.batch_ids)
    }

    /// Segments carrying the given label.
    pub fn segments_with(&self, label: StanceLabel) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(move |s| s.label == label)
    }

    /// Join the annotation back onto the analyzed signal, one row per sample.
    ///
    /// `signal` must be the signal this analysis was produced from.
    pub fn labeled_samples(&self, signal: &Signal) -> Result<Vec<LabeledSample>> {
        if signal.len() != self.labels.len() {
            return Err(GaitError::validation(format!(
                "analysis covers {} samples, signal has {}",
                self.labels.len(),
                signal.len()
            )));
        }
        Ok(signal
            .iter()
            .zip(&self.batch_ids)
            .zip(&self.labels)
            .map(|((sample, &batch_id), &label)| LabeledSample {
                time: sample.time,
                value: sample.value,
                batch_id,
                label,
            })
            .collect())
    }
}

/// Output of the braking/propulsion analysis on an acceleration signal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseAnalysis {
    /// Savitzky–Golay smoothed signal, same time base as the input.
    pub smoothed: Signal,
    /// Derivative of the smoothed signal against time.
    pub derivative: Vec<f64>,
    /// Braking and propulsion onsets in time order.
    pub events: Vec<PhaseEvent>,
}

/// Complete gait segmentation pipeline.
#[derive(Debug, Clone)]
pub struct GaitPipeline {
    config: AnalysisConfig,
    batch_detector: BatchDetector,
    stance_segmenter: StanceSegmenter,
    aggregator: SegmentAggregator,
    smoother: SignalSmoother,
    phase_detector: PhaseEventDetector,
}

impl GaitPipeline {
    /// Creates a new pipeline, validating the configuration first.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Pipeline with the default configuration.
    pub fn with_defaults() -> Self {
        Self::build(AnalysisConfig::default())
    }

    fn build(config: AnalysisConfig) -> Self {
        Self {
            batch_detector: BatchDetector::new(config.batch.clone()),
            stance_segmenter: StanceSegmenter::new(config.stance.clone()),
            aggregator: SegmentAggregator::new(config.aggregator.clone()),
            smoother: SignalSmoother::new(config.smoother.clone()),
            phase_detector: PhaseEventDetector::new(),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Batch → stance → segment table on a roll-angle signal.
    pub fn analyze_stance(&self, roll: &Signal) -> Result<StanceAnalysis> {
        let batch_ids = self.batch_detector.detect(roll);
        let labels = self.stance_segmenter.label_signal(roll, &batch_ids)?;
        let segments = self.aggregator.aggregate(roll, &batch_ids, &labels)?;

        let analysis = StanceAnalysis {
            batch_ids,
            labels,
            segments,
        };
        info!(
            samples = roll.len(),
            batches = analysis.batch_count(),
            left_segments = analysis.segments_with(StanceLabel::Left).count(),
            right_segments = analysis.segments_with(StanceLabel::Right).count(),
            "stance analysis complete"
        );
        Ok(analysis)
    }

    /// Smooth → differentiate → zero-crossings on a forward-acceleration signal.
    pub fn analyze_phases(&self, acceleration: &Signal) -> Result<PhaseAnalysis> {
        let smoothed = self.smoother.smooth(acceleration)?;
        let derivative = PhaseEventDetector::gradient(&smoothed);
        let events = PhaseEventDetector::zero_crossings(&smoothed.times(), &derivative)?;

        info!(
            samples = acceleration.len(),
            events = events.len(),
            "phase analysis complete"
        );
        Ok(PhaseAnalysis {
            smoothed,
            derivative,
            events,
        })
    }

    /// Phase events without smoothing, for signals that are already clean.
    pub fn detect_phases_unsmoothed(&self, acceleration: &Signal) -> Vec<PhaseEvent> {
        self.phase_detector.detect(acceleration)
    }
}

impl Default for GaitPipeline {
    fn default() -> Self {
        Self::with_defaults()
    }
}
