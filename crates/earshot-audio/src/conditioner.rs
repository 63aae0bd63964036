use serde::{Deserialize, Serialize};

/// Gain and soft noise-gate settings applied to every captured sample.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConditionerConfig {
    pub gain: f32,
    /// Post-gain amplitude below which a sample counts as noise.
    pub gate_threshold: f32,
    /// Noise samples are scaled by this factor, not zeroed, so RMS
    /// estimation downstream stays continuous.
    pub gate_attenuation: f32,
}

impl Default for ConditionerConfig {
    fn default() -> Self {
        Self {
            gain: 1.5,
            gate_threshold: 0.02,
            gate_attenuation: 0.1,
        }
    }
}

/// Stateless per-sample conditioning: gain, soft gate, clamp to [-1, 1].
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleConditioner {
    cfg: ConditionerConfig,
}

impl SampleConditioner {
    pub fn new(cfg: ConditionerConfig) -> Self {
        Self { cfg }
    }

    pub fn condition(&self, sample: f32) -> f32 {
        let amplified = sample * self.cfg.gain;
        let gated = if amplified.abs() < self.cfg.gate_threshold {
            amplified * self.cfg.gate_attenuation
        } else {
            amplified
        };
        gated.clamp(-1.0, 1.0)
    }

    pub fn process(&self, samples: &mut [f32]) {
        for sample in samples {
            *sample = self.condition(*sample);
        }
    }
}

/// Convert interleaved i16 PCM to mono f32 in [-1, 1], averaging channels.
pub fn downmix_to_mono_f32(samples: &[i16], channels: u16) -> Vec<f32> {
    let channels = channels.max(1) as usize;
    if channels == 1 {
        return samples.iter().map(|&s| s as f32 / 32768.0).collect();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as f32 / 32768.0
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_is_applied() {
        let c = SampleConditioner::default();
        assert!((c.condition(0.1) - 0.15).abs() < 1e-6);
    }

    #[test]
    fn quiet_samples_are_attenuated_not_zeroed() {
        let c = SampleConditioner::default();
        // 0.01 * 1.5 = 0.015, below the 0.02 gate.
        let out = c.condition(0.01);
        assert!((out - 0.0015).abs() < 1e-6);
        assert!(out != 0.0);
    }

    #[test]
    fn loud_samples_clamp_to_unit_range() {
        let c = SampleConditioner::default();
        assert_eq!(c.condition(0.9), 1.0);
        assert_eq!(c.condition(-0.9), -1.0);
    }

    #[test]
    fn stereo_downmix_averages_pairs() {
        let out = downmix_to_mono_f32(&[16_384, -16_384, 8_192, 8_192], 2);
        assert_eq!(out.len(), 2);
        assert!((out[0] - 0.0).abs() < 1e-6);
        assert!((out[1] - 0.25).abs() < 1e-3);
    }

    #[test]
    fn mono_passthrough_scales_to_float() {
        let out = downmix_to_mono_f32(&[-32_768, 0, 16_384], 1);
        assert!((out[0] + 1.0).abs() < 1e-6);
        assert_eq!(out[1], 0.0);
        assert!((out[2] - 0.5).abs() < 1e-3);
    }
}
