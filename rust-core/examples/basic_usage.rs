/// Basic usage example: segment a synthetic two-pass walk
use std::f64::consts::PI;

use gait_segmentation::{GaitPipeline, PhaseAnalysis, Sample, Signal, StanceAnalysis};
use tracing_subscriber::EnvFilter;

fn main() -> gait_segmentation::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Gait Segmentation Engine: Basic Example ===\n");

    // Two 3-second passes down the walkway at 100 Hz, 10 s apart.
    let mut roll = Vec::new();
    let mut accel = Vec::new();
    for pass in 0..2 {
        let t0 = pass as f64 * 10.0;
        for i in 0..300 {
            let local = i as f64 / 100.0;
            let stride = 2.0 * PI * local;
            roll.push(Sample::new(t0 + local, 4.0 * stride.sin()));
            // Braking/propulsion cycle plus a little sensor jitter.
            let jitter = if i % 2 == 0 { 1.5 } else { -1.5 };
            accel.push(Sample::new(t0 + local, 50.0 * stride.sin() + jitter));
        }
    }
    let roll = Signal::new(roll)?;
    let accel = Signal::new(accel)?;

    let pipeline = GaitPipeline::default();

    println!("Processing {} roll samples...", roll.len());
    let stance = pipeline.analyze_stance(&roll)?;
    print_stance(&stance);

    println!("\nProcessing {} acceleration samples...", accel.len());
    let phases = pipeline.analyze_phases(&accel)?;
    print_phases(&phases);

    println!("\nAnalysis complete.");
    Ok(())
}

fn print_stance(analysis: &StanceAnalysis) {
    println!("\n--- Stance ---");
    println!("Batches: {}", analysis.batch_count());
    for seg in &analysis.segments {
        println!(
            "  batch {} {:>5} #{}: {:.2}-{:.2}s ({} samples), max {:.2}°",
            seg.batch_id,
            seg.label,
            seg.ordinal,
            seg.time_start,
            seg.time_end,
            seg.sample_count(),
            seg.max_deviation
        );
    }
}

fn print_phases(analysis: &PhaseAnalysis) {
    println!("\n--- Braking / Propulsion ---");
    for event in &analysis.events {
        println!("  {:>10} at {:.2}s (sample {})", event.kind, event.time, event.index);
    }
}
