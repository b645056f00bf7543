//! Braking / Propulsion Phase Detection Module.
//!
//! Marks the onset of braking and propulsion phases on a forward-acceleration
//! recording:
//! - Numerical derivative of the (smoothed) acceleration against time
//! - Zero-crossing detection on the derivative
//!
//! A crossing from positive to non-positive starts a braking phase; a
//! crossing from negative to non-negative starts a propulsion phase. Both
//! rules are inclusive at zero on one side only, so a derivative that stays
//! at exactly zero for several samples yields one event when it enters the
//! flat run and none while it stays there.

use tracing::debug;

use crate::error::{GaitError, Result};
use crate::types::{PhaseEvent, PhaseKind, Signal};

/// Zero-crossing phase event detector. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseEventDetector;

impl PhaseEventDetector {
    pub fn new() -> Self {
        Self
    }

    /// Detect phase events on a signal.
    pub fn detect(&self, signal: &Signal) -> Vec<PhaseEvent> {
        let derivative = Self::gradient(signal);
        let events = Self::crossings(&signal.times(), &derivative);

        debug!(
            samples = signal.len(),
            braking = events.iter().filter(|e| e.kind == PhaseKind::Braking).count(),
            propulsion = events.iter().filter(|e| e.kind == PhaseKind::Propulsion).count(),
            "phase detection complete"
        );
        events
    }

    /// Derivative of the signal's values with respect to its time column.
    ///
    /// One-sided first-order differences at the two endpoints; second-order
    /// central differences for non-uniform spacing everywhere else:
    ///
    /// `d[i] = (hs² f[i+1] + (hd² - hs²) f[i] - hd² f[i-1]) / (hs hd (hs + hd))`
    ///
    /// with `hs = t[i] - t[i-1]` and `hd = t[i+1] - t[i]`. Repeated
    /// timestamps divide by zero and give ±inf (which still take part in
    /// zero crossings) or NaN (which never does). A signal with fewer than
    /// two samples has an all-zero derivative.
    pub fn gradient(signal: &Signal) -> Vec<f64> {
        let samples = signal.samples();
        let n = samples.len();
        if n < 2 {
            return vec![0.0; n];
        }

        let mut d = Vec::with_capacity(n);
        d.push((samples[1].value - samples[0].value) / (samples[1].time - samples[0].time));

        for i in 1..n - 1 {
            let (prev, cur, next) = (samples[i - 1], samples[i], samples[i + 1]);
            let hs = cur.time - prev.time;
            let hd = next.time - cur.time;
            let numerator =
                hs * hs * next.value + (hd * hd - hs * hs) * cur.value - hd * hd * prev.value;
            d.push(numerator / (hs * hd * (hs + hd)));
        }

        d.push(
            (samples[n - 1].value - samples[n - 2].value)
                / (samples[n - 1].time - samples[n - 2].time),
        );
        d
    }

    /// Zero-crossing events of a precomputed derivative.
    ///
    /// `times` and `derivative` must have the same length.
    pub fn zero_crossings(times: &[f64], derivative: &[f64]) -> Result<Vec<PhaseEvent>> {
        if times.len() != derivative.len() {
            return Err(GaitError::validation(format!(
                "derivative has {} entries, time column has {}",
                derivative.len(),
                times.len()
            )));
        }
        Ok(Self::crossings(times, derivative))
    }

    fn crossings(times: &[f64], derivative: &[f64]) -> Vec<PhaseEvent> {
        let mut events = Vec::new();

        for i in 1..derivative.len() {
            let (before, now) = (derivative[i - 1], derivative[i]);
            let kind = if before > 0.0 && now <= 0.0 {
                PhaseKind::Braking
            } else if before < 0.0 && now >= 0.0 {
                PhaseKind::Propulsion
            } else {
                // Same sign, a flat run, or NaN.
                continue;
            };
            events.push(PhaseEvent {
                kind,
                time: times[i],
                index: i,
            });
        }
        events
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn uniform_times(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    fn kinds(events: &[PhaseEvent]) -> Vec<(PhaseKind, usize)> {
        events.iter().map(|e| (e.kind, e.index)).collect()
    }

    #[test]
    fn test_crossings_on_sign_changes() {
        let derivative = [5.0, 3.0, -1.0, -4.0, -2.0, 1.0, 4.0];
        let events = PhaseEventDetector::zero_crossings(&uniform_times(7), &derivative).unwrap();
        assert_eq!(
            kinds(&events),
            vec![(PhaseKind::Braking, 2), (PhaseKind::Propulsion, 5)]
        );
        assert_abs_diff_eq!(events[0].time, 2.0);
        assert_abs_diff_eq!(events[1].time, 5.0);
    }

    #[test]
    fn test_flat_zero_run_fires_once() {
        let derivative = [1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 2.0];
        let events = PhaseEventDetector::zero_crossings(&uniform_times(8), &derivative).unwrap();
        assert_eq!(
            kinds(&events),
            vec![(PhaseKind::Braking, 1), (PhaseKind::Propulsion, 5)],
            "entering a zero run fires once, leaving it does not fire again"
        );
    }

    #[test]
    fn test_no_event_at_index_zero() {
        let derivative = [-1.0, 1.0];
        let events = PhaseEventDetector::zero_crossings(&[0.0, 1.0], &derivative).unwrap();
        assert_eq!(kinds(&events), vec![(PhaseKind::Propulsion, 1)]);
        assert!(PhaseEventDetector::zero_crossings(&[0.0], &[3.0]).unwrap().is_empty());
    }

    #[test]
    fn test_nan_derivative_never_fires() {
        let derivative = [1.0, f64::NAN, -1.0, f64::NAN, 1.0];
        let events = PhaseEventDetector::zero_crossings(&uniform_times(5), &derivative).unwrap();
        assert!(events.is_empty(), "got {events:?}");
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = PhaseEventDetector::zero_crossings(&[0.0, 1.0], &[1.0]).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_gradient_uniform_spacing() {
        let signal = Signal::from_columns(&uniform_times(5), &[0.0, 1.0, 4.0, 9.0, 16.0]).unwrap();
        let d = PhaseEventDetector::gradient(&signal);
        let expected = [1.0, 2.0, 4.0, 6.0, 7.0];
        for (got, want) in d.iter().zip(expected) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_gradient_non_uniform_spacing_exact_for_quadratic() {
        // Second-order interior formula is exact for quadratics on any grid.
        let times = [0.0, 0.1, 0.35, 0.4, 1.0];
        let values: Vec<f64> = times.iter().map(|t| 3.0 * t * t - t).collect();
        let signal = Signal::from_columns(&times, &values).unwrap();

        let d = PhaseEventDetector::gradient(&signal);
        for i in 1..times.len() - 1 {
            assert_abs_diff_eq!(d[i], 6.0 * times[i] - 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_infinite_derivative_fires() {
        // A repeated timestamp gives +inf, which compares as positive.
        let times = [0.0, 1.0, 1.0, 2.0, 3.0];
        let signal = Signal::from_columns(&times, &[0.0, 1.0, 2.0, 1.0, 0.0]).unwrap();
        let d = PhaseEventDetector::gradient(&signal);
        assert_eq!(d[1], f64::INFINITY);
        assert_eq!(d[2], f64::INFINITY);

        let events = PhaseEventDetector::new().detect(&signal);
        assert_eq!(kinds(&events), vec![(PhaseKind::Braking, 3)]);
    }

    #[test]
    fn test_gradient_short_signals() {
        assert!(PhaseEventDetector::gradient(&Signal::empty()).is_empty());
        let single = Signal::from_columns(&[1.0], &[5.0]).unwrap();
        assert_eq!(PhaseEventDetector::gradient(&single), vec![0.0]);
    }

    #[test]
    fn test_detect_on_acceleration_peak() {
        // Rises to a peak at t=3 then falls into a trough at t=7 and recovers.
        let values = [0.0, 2.0, 3.5, 4.0, 3.5, 2.0, 0.0, -1.0, 0.0, 2.0];
        let signal = Signal::from_columns(&uniform_times(10), &values).unwrap();

        let events = PhaseEventDetector::new().detect(&signal);
        assert_eq!(
            kinds(&events),
            vec![(PhaseKind::Braking, 3), (PhaseKind::Propulsion, 7)]
        );
    }

    #[test]
    fn test_events_alternate() {
        let values: Vec<f64> = (0..200).map(|i| (i as f64 * 0.1).sin()).collect();
        let signal = Signal::from_columns(&uniform_times(200), &values).unwrap();
        let events = PhaseEventDetector::new().detect(&signal);

        assert!(!events.is_empty());
        for pair in events.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind, "same kind twice in a row: {pair:?}");
        }
    }

    #[test]
    fn test_empty_signal() {
        assert!(PhaseEventDetector::new().detect(&Signal::empty()).is_empty());
    }
}
