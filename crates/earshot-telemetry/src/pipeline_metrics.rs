use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Shared counters for cross-thread pipeline monitoring.
///
/// RMS is stored scaled by 10_000 so the atomics stay integer-only.
#[derive(Clone, Default)]
pub struct PipelineMetrics {
    pub capture_frames: Arc<AtomicU64>,
    pub capture_dropped_samples: Arc<AtomicU64>,
    pub windows_classified: Arc<AtomicU64>,
    pub session_restarts: Arc<AtomicU64>,
    pub watchdog_fires: Arc<AtomicU64>,
    pub utterances_dispatched: Arc<AtomicU64>,
    pub current_rms: Arc<AtomicU64>,
    pub is_collecting: Arc<AtomicBool>,
}

/// Point-in-time copy of the counters, for logging or status output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub capture_frames: u64,
    pub capture_dropped_samples: u64,
    pub windows_classified: u64,
    pub session_restarts: u64,
    pub watchdog_fires: u64,
    pub utterances_dispatched: u64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_capture_frames(&self) {
        self.capture_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_dropped_samples(&self, count: u64) {
        self.capture_dropped_samples.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_windows_classified(&self) {
        self.windows_classified.fetch_add(1, Ordering::Relaxed);
    }

    /// Session restarts and watchdog fires are counted by the session
    /// supervisor; the worker mirrors them here each tick.
    pub fn set_session_restarts(&self, count: u64) {
        self.session_restarts.store(count, Ordering::Relaxed);
    }

    pub fn set_watchdog_fires(&self, count: u64) {
        self.watchdog_fires.store(count, Ordering::Relaxed);
    }

    pub fn increment_utterances(&self) {
        self.utterances_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn update_rms(&self, rms: f32) {
        self.current_rms
            .store((rms.max(0.0) * 10_000.0) as u64, Ordering::Relaxed);
    }

    pub fn rms(&self) -> f32 {
        self.current_rms.load(Ordering::Relaxed) as f32 / 10_000.0
    }

    pub fn set_collecting(&self, collecting: bool) {
        self.is_collecting.store(collecting, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            capture_frames: self.capture_frames.load(Ordering::Relaxed),
            capture_dropped_samples: self.capture_dropped_samples.load(Ordering::Relaxed),
            windows_classified: self.windows_classified.load(Ordering::Relaxed),
            session_restarts: self.session_restarts.load(Ordering::Relaxed),
            watchdog_fires: self.watchdog_fires.load(Ordering::Relaxed),
            utterances_dispatched: self.utterances_dispatched.load(Ordering::Relaxed),
        }
    }
}
