//! Audio constants for the detection pipeline

/// Standard sample rate for all detection processing (Hz)
pub const SAMPLE_RATE_HZ: u32 = 16_000;

/// Classifier input length (samples).
/// At 16 kHz, 15600 samples = 975 ms, one classifier invocation per window.
pub const WINDOW_SIZE_SAMPLES: usize = 15_600;

/// Window duration in milliseconds (derived constant)
pub const WINDOW_DURATION_MS: f32 = (WINDOW_SIZE_SAMPLES as f32 * 1000.0) / SAMPLE_RATE_HZ as f32;
