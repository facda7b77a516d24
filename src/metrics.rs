//! Synchronization metrics and observability module.
//!
//! This module tracks how language switches actually happen at runtime:
//! live control activations vs. cookie-and-reload switches, drift events
//! noticed by the poller, and widget script failures.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Global synchronization metrics singleton.
pub struct SyncMetrics {
    /// Number of language switches applied through the live control
    activations: AtomicUsize,

    /// Number of activation attempts that found no control in the page
    control_misses: AtomicUsize,

    /// Number of switches that went through the cookie-and-reload path
    cookie_writes: AtomicUsize,

    /// Number of times the poller saw the widget report a different language
    drift_events: AtomicUsize,

    /// Number of widget script load failures
    script_failures: AtomicUsize,
}

/// Global metrics instance (initialized lazily)
static METRICS: OnceLock<SyncMetrics> = OnceLock::new();

impl SyncMetrics {
    /// Get the global synchronization metrics instance.
    ///
    /// This method initializes the metrics on first call and returns a reference
    /// to the singleton instance on subsequent calls.
    pub fn global() -> &'static SyncMetrics {
        METRICS.get_or_init(|| SyncMetrics {
            activations: AtomicUsize::new(0),
            control_misses: AtomicUsize::new(0),
            cookie_writes: AtomicUsize::new(0),
            drift_events: AtomicUsize::new(0),
            script_failures: AtomicUsize::new(0),
        })
    }

    /// Record a language switch applied through the live control.
    pub fn record_activation(&self) {
        self.activations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an activation attempt that found no control.
    pub fn record_control_miss(&self) {
        self.control_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a switch through the cookie-and-reload path.
    pub fn record_cookie_write(&self) {
        self.cookie_writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a drift event (widget and UI disagreed).
    pub fn record_drift_event(&self) {
        self.drift_events.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a widget script load failure.
    pub fn record_script_failure(&self) {
        self.script_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current live activation count.
    pub fn activations(&self) -> usize {
        self.activations.load(Ordering::Relaxed)
    }

    /// Get the current control miss count.
    pub fn control_misses(&self) -> usize {
        self.control_misses.load(Ordering::Relaxed)
    }

    /// Get the current cookie write count.
    pub fn cookie_writes(&self) -> usize {
        self.cookie_writes.load(Ordering::Relaxed)
    }

    /// Get the current drift event count.
    pub fn drift_events(&self) -> usize {
        self.drift_events.load(Ordering::Relaxed)
    }

    /// Get the current script failure count.
    pub fn script_failures(&self) -> usize {
        self.script_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let activations = self.activations();
        let misses = self.control_misses();
        let attempts = activations + misses;
        let activation_success_rate = if attempts > 0 {
            (activations as f64 / attempts as f64) * 100.0
        } else {
            0.0
        };

        let cookie_writes = self.cookie_writes();
        let switches = activations + cookie_writes;
        let live_switch_rate = if switches > 0 {
            (activations as f64 / switches as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            activations,
            control_misses: misses,
            activation_success_rate,
            cookie_writes,
            live_switch_rate,
            drift_events: self.drift_events(),
            script_failures: self.script_failures(),
        }
    }

    /// Reset all metrics to zero (useful for testing).
    #[cfg(test)]
    pub fn reset(&self) {
        self.activations.store(0, Ordering::Relaxed);
        self.control_misses.store(0, Ordering::Relaxed);
        self.cookie_writes.store(0, Ordering::Relaxed);
        self.drift_events.store(0, Ordering::Relaxed);
        self.script_failures.store(0, Ordering::Relaxed);
    }
}

/// Metrics report containing current synchronization statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    /// Number of switches applied through the live control
    pub activations: usize,

    /// Number of activation attempts that found no control
    pub control_misses: usize,

    /// Share of activation attempts that found the control, as a percentage (0-100)
    pub activation_success_rate: f64,

    /// Number of switches through the cookie-and-reload path
    pub cookie_writes: usize,

    /// Share of switches that avoided a reload, as a percentage (0-100)
    pub live_switch_rate: f64,

    /// Number of drift events noticed by the poller
    pub drift_events: usize,

    /// Number of widget script load failures
    pub script_failures: usize,
}
