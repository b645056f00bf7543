//! Gait Segmentation Engine Library
//!
//! Turns gait-analysis sensor recordings (roll angle and forward
//! acceleration against time) into labeled intervals and discrete events:
//! contiguous recording batches, single-leg stance segments with their peak
//! roll deviation, and braking / propulsion phase onsets.
//!
//! # Design Philosophy
//!
//! - **Batch, not streaming**: every stage sees the whole, already loaded
//!   signal and returns a new owned result.
//! - **Pure stages**: no component holds state beyond its configuration.
//!   Stages compose by explicit sequencing (see [`pipeline`]).
//! - **Fail loud on structure, quiet on values**: time going backwards or an
//!   unusable configuration is an error; a NaN reading is not, it simply
//!   never matches a threshold.
//!
//! # Example
//!
//! ```no_run
//! use gait_segmentation::{GaitPipeline, Signal};
//!
//! let times: Vec<f64> = (0..7).map(|i| i as f64).collect();
//! let roll = Signal::from_columns(&times, &[0.0, -1.0, -2.0, -2.2, -1.0, 0.0, 1.0])?;
//!
//! let analysis = GaitPipeline::default().analyze_stance(&roll)?;
//! for segment in &analysis.segments {
//!     println!("{} stance {:.2}-{:.2}s, max {:.2}°",
//!         segment.label, segment.time_start, segment.time_end, segment.max_deviation);
//! }
//! # Ok::<(), gait_segmentation::GaitError>(())
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod phase_detection;
pub mod pipeline;
pub mod segmentation;
pub mod signal;
pub mod stance_detection;
pub mod types;


// Re-export commonly used types
pub use batch::{BatchConfig, BatchDetector, BatchSpan};
pub use config::AnalysisConfig;
pub use error::{GaitError, Result};
pub use phase_detection::PhaseEventDetector;
pub use pipeline::{GaitPipeline, PhaseAnalysis, StanceAnalysis};
pub use segmentation::{AggregatorConfig, SegmentAggregator};
pub use signal::{SignalSmoother, SmootherConfig};
pub use stance_detection::{StanceConfig, StanceSegmenter};
pub use types::{
    BatchId, LabeledSample, PhaseEvent, PhaseKind, Sample, Segment, Signal, StanceLabel,
};
