//! Flat tabular export.
//!
//! Writes the engine's outputs as CSV for the consumers downstream of the
//! core (plotting, spreadsheets):
//! - **Segments**: the stance deviation table
//! - **Phase events**: braking / propulsion onsets
//! - **Labeled samples**: the recording annotated with batch and stance
//!
//! Column names are part of the output contract and are written even when
//! there are no rows, so an empty result is still a well-formed table.

use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::types::{LabeledSample, PhaseEvent, Segment};

/// Header of the segment table.
pub const SEGMENT_COLUMNS: [&str; 8] = [
    "batch_id",
    "label",
    "ordinal",
    "start_index",
    "end_index",
    "time_start",
    "time_end",
    "max_deviation",
];

/// Header of the phase event table.
pub const PHASE_EVENT_COLUMNS: [&str; 3] = ["kind", "time", "index"];

/// Header of the annotated sample table.
pub const LABELED_SAMPLE_COLUMNS: [&str; 4] = ["time", "value", "batch_id", "label"];

fn write_records<W, T>(writer: W, columns: &[&str], records: &[T]) -> Result<()>
where
    W: Write,
    T: Serialize,
{
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(columns)?;
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

fn create(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(File::create(path)?)
}

/// Write the stance segment table.
pub fn write_segments<W: Write>(writer: W, segments: &[Segment]) -> Result<()> {
    write_records(writer, &SEGMENT_COLUMNS, segments)
}

/// Write the phase event list.
pub fn write_phase_events<W: Write>(writer: W, events: &[PhaseEvent]) -> Result<()> {
    write_records(writer, &PHASE_EVENT_COLUMNS, events)
}

/// Write the annotated recording.
pub fn write_labeled_samples<W: Write>(writer: W, rows: &[LabeledSample]) -> Result<()> {
    write_records(writer, &LABELED_SAMPLE_COLUMNS, rows)
}

pub fn segments_to_path(path: impl AsRef<Path>, segments: &[Segment]) -> Result<()> {
    write_segments(create(path.as_ref())?, segments)
}

pub fn phase_events_to_path(path: impl AsRef<Path>, events: &[PhaseEvent]) -> Result<()> {
    write_phase_events(create(path.as_ref())?, events)
}

pub fn labeled_samples_to_path(path: impl AsRef<Path>, rows: &[LabeledSample]) -> Result<()> {
    write_labeled_samples(create(path.as_ref())?, rows)
}

// ============================================================================
// TESTS
// ============================================================================
