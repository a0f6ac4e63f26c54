//! Runtime counters and busy-time statistics.
//!
//! Busy time is the wall time the controller spends on one classified
//! frame, including every scheduled key delay. A rolling window keeps
//! the most recent samples for percentile reporting.

use std::collections::BTreeMap;

/// Counters and rolling busy-time samples for one run.
#[derive(Debug)]
pub struct RuntimeStats {
    /// Per-frame busy time (ms), most recent `window_size` frames.
    pub busy_times: Vec<f64>,
    pub window_size: usize,
    pub frames_seen: u64,
    pub frames_classified: u64,
    /// Frames whose delivery time passed while a sequence was playing.
    pub frames_dropped: u64,
    /// Frames skipped inside the mode-toggle debounce window.
    pub frames_suppressed: u64,
    pub key_events: u64,
    pub sink_failures: u64,
    pub mode_toggles: u64,
    /// Gesture name -> times fired.
    pub gestures: BTreeMap<&'static str, u64>,
}

impl Default for RuntimeStats {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl RuntimeStats {
    pub fn new(window_size: usize) -> Self {
        Self {
            busy_times: Vec::with_capacity(window_size),
            window_size,
            frames_seen: 0,
            frames_classified: 0,
            frames_dropped: 0,
            frames_suppressed: 0,
            key_events: 0,
            sink_failures: 0,
            mode_toggles: 0,
            gestures: BTreeMap::new(),
        }
    }

    /// Record the busy time of one classified frame.
    pub fn record_busy(&mut self, busy_ms: f64) {
        self.busy_times.push(busy_ms);
        if self.busy_times.len() > self.window_size {
            self.busy_times.remove(0);
        }
        self.frames_classified += 1;
    }

    pub fn record_gesture(&mut self, name: &'static str) {
        *self.gestures.entry(name).or_insert(0) += 1;
    }

    fn percentile(sorted: &[f64], p: f64) -> f64 {
        if sorted.is_empty() {
            return 0.0;
        }
        let idx = ((sorted.len() as f64 - 1.0) * p / 100.0).round() as usize;
        sorted[idx.min(sorted.len() - 1)]
    }

    /// Busy-time percentiles over the current window.
    pub fn busy(&self) -> BusyStats {
        let mut sorted = self.busy_times.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        BusyStats {
            p50: Self::percentile(&sorted, 50.0),
            p95: Self::percentile(&sorted, 95.0),
            p99: Self::percentile(&sorted, 99.0),
            max: sorted.last().copied().unwrap_or(0.0),
        }
    }

    /// Format counters and percentiles as an s-expression.
    pub fn stats_sexp(&self) -> String {
        let b = self.busy();
        let mut gestures = String::from("(");
        for (i, (name, count)) in self.gestures.iter().enumerate() {
            if i > 0 {
                gestures.push(' ');
            }
            gestures.push_str(&format!(":{} {}", name, count));
        }
        gestures.push(')');
        format!(
            "(:frames-seen {} :frames-classified {} :frames-dropped {} :frames-suppressed {} :key-events {} :sink-failures {} :mode-toggles {} :busy-p50 {:.1} :busy-p95 {:.1} :busy-p99 {:.1} :busy-max {:.1} :gestures {})",
            self.frames_seen,
            self.frames_classified,
            self.frames_dropped,
            self.frames_suppressed,
            self.key_events,
            self.sink_failures,
            self.mode_toggles,
            b.p50,
            b.p95,
            b.p99,
            b.max,
            gestures,
        )
    }
}

/// Computed busy-time percentiles (ms).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BusyStats {
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub max: f64,
}
