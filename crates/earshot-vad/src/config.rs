use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::constants::{SAMPLE_RATE_HZ, WINDOW_SIZE_SAMPLES};

/// Tunables for the per-window speech decision and segmentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VadConfig {
    /// Silence span that ends a speech segment. Long enough to ride out
    /// mid-sentence pauses.
    pub silence_timeout_ms: u32,
    /// Minimum RMS for a classifier speech label to count as speech.
    pub min_volume: f32,
    /// RMS below this plus a silence label is unconditional silence.
    pub very_low_volume: f32,
    pub window_size_samples: usize,
    pub sample_rate_hz: u32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            silence_timeout_ms: 1_500,
            min_volume: 0.03,
            very_low_volume: 0.001,
            window_size_samples: WINDOW_SIZE_SAMPLES,
            sample_rate_hz: SAMPLE_RATE_HZ,
        }
    }
}

impl VadConfig {
    pub fn silence_timeout(&self) -> Duration {
        Duration::from_millis(self.silence_timeout_ms as u64)
    }

    pub fn window_duration_ms(&self) -> f32 {
        (self.window_size_samples as f32 * 1000.0) / self.sample_rate_hz as f32
    }
}
