//! Signal smoothing.
//!
//! This module provides the low-pass stage that runs before any
//! derivative-based analysis: a Savitzky–Golay filter. Each output value is
//! the value, at the window center, of the least-squares polynomial of degree
//! `polyorder` fitted to `window_length` consecutive samples.
//!
//! Design note: the filter works on sample positions, not on the time
//! column. Recordings are sampled at a fixed rate inside a batch, and the
//! fitted weights only depend on the window shape, so they are computed once
//! and applied as a convolution.
//!
//! Boundary policy: the first and last `window_length / 2` samples cannot sit
//! at the center of a full window. For those, the polynomial fitted to the
//! first (or last) full window is evaluated at the sample's own position.
//! Output length always equals input length.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GaitError, Result};
use crate::types::Signal;

/// Parameters for Savitzky–Golay smoothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmootherConfig {
    /// Number of samples in each fit window. Must be odd. Typical: 51.
    pub window_length: usize,

    /// Degree of the fitted polynomial. Must be below `window_length`.
    /// Typical: 3.
    pub polyorder: usize,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            window_length: 51,
            polyorder: 3,
        }
    }
}

impl SmootherConfig {
    /// Checks that do not depend on the signal.
    pub fn validate(&self) -> Result<()> {
        if self.window_length % 2 == 0 {
            return Err(GaitError::configuration(format!(
                "window_length must be odd, got {}",
                self.window_length
            )));
        }
        if self.polyorder >= self.window_length {
            return Err(GaitError::configuration(format!(
                "polyorder ({}) must be less than window_length ({})",
                self.polyorder, self.window_length
            )));
        }
        Ok(())
    }

    fn half_window(&self) -> usize {
        self.window_length / 2
    }
}

/// Savitzky–Golay smoother.
#[derive(Debug, Clone, Default)]
pub struct SignalSmoother {
    config: SmootherConfig,
}

impl SignalSmoother {
    pub fn new(config: SmootherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SmootherConfig {
        &self.config
    }

    /// Smooth a signal, keeping its time base.
    ///
    /// Fails with a configuration error if the window is even, longer than
    /// the signal, or not longer than the polynomial order. All checks run
    /// before any output is produced.
    pub fn smooth(&self, signal: &Signal) -> Result<Signal> {
        let smoothed = self.smooth_values(&signal.values())?;
        signal.with_values(smoothed)
    }

    /// Smooth a bare value column.
    pub fn smooth_values(&self, values: &[f64]) -> Result<Vec<f64>> {
        self.config.validate()?;
        if values.is_empty() {
            return Ok(Vec::new());
        }

        let n = values.len();
        let window = self.config.window_length;
        if window > n {
            return Err(GaitError::configuration(format!(
                "window_length ({window}) exceeds signal length ({n})"
            )));
        }

        let half = self.config.half_window();
        let order = self.config.polyorder;
        let mut out = vec![0.0; n];

        // Interior: one set of centered weights for every full window.
        let center = fit_weights(window, order, 0.0);
        for i in half..n - half {
            out[i] = dot(&center, &values[i - half..=i + half]);
        }

        // Edges: evaluate the first/last window's fit away from its center.
        let head = &values[..window];
        let tail = &values[n - window..];
        for offset in 1..=half {
            let weights = fit_weights(window, order, offset as f64);
            // Mirrored weights evaluate at -offset.
            out[half - offset] = weights.iter().rev().zip(head).map(|(w, v)| w * v).sum();
            out[n - 1 - half + offset] = dot(&weights, tail);
        }

        debug!(
            samples = n,
            window_length = window,
            polyorder = order,
            "savitzky-golay smoothing complete"
        );
        Ok(out)
    }
}

fn dot(weights: &[f64], values: &[f64]) -> f64 {
    weights.iter().zip(values).map(|(w, v)| w * v).sum()
}

/// Convolution weights that evaluate, at `offset` samples from the window
/// center, the least-squares polynomial of degree `order` over a window of
/// `window` samples.
///
/// The fit is expressed in a basis of polynomials orthonormal over the
/// window positions, built column by column with Gram–Schmidt on `x·q_k`
/// (Vandermonde with Arnoldi). In that basis the least-squares projection is
/// diagonal, so the weight of sample `j` is `Σ_k q_k(x0) q_k(x_j) / window`.
/// Accurate for every `order < window`, up to pure interpolation.
fn fit_weights(window: usize, order: usize, offset: f64) -> Vec<f64> {
    let half = (window / 2) as f64;
    let scale = if half > 0.0 { half } else { 1.0 };
    let count = window as f64;

    let positions: Vec<f64> = (0..window).map(|j| (j as f64 - half) / scale).collect();
    let x0 = offset / scale;

    // basis[k] holds q_k at every window position, at_x0[k] holds q_k(x0).
    let mut basis: Vec<Vec<f64>> = vec![vec![1.0; window]];
    let mut at_x0 = vec![1.0];

    for k in 0..order {
        let mut next: Vec<f64> = positions
            .iter()
            .zip(&basis[k])
            .map(|(x, q)| x * q)
            .collect();
        let mut next_x0 = x0 * at_x0[k];

        // Second sweep removes what rounding left after the first.
        for _ in 0..2 {
            for (q, q_x0) in basis.iter().zip(&at_x0) {
                let h = dot(&next, q) / count;
                for (v, qj) in next.iter_mut().zip(q) {
                    *v -= h * qj;
                }
                next_x0 -= h * q_x0;
            }
        }

        // Non-zero: a polynomial of degree below `window` cannot vanish on
        // `window` distinct points.
        let norm = (dot(&next, &next) / count).sqrt();
        basis.push(next.iter().map(|v| v / norm).collect());
        at_x0.push(next_x0 / norm);
    }

    (0..window)
        .map(|j| {
            basis
                .iter()
                .zip(&at_x0)
                .map(|(q, q_x0)| q_x0 * q[j])
                .sum::<f64>()
                / count
        })
        .collect()
}
